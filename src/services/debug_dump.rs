//! 调试输出服务 - 业务能力层
//!
//! 只负责把登录后的页面写到调试目录，便于排查页面结构变化。

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::FileError;

/// 调试输出服务
pub struct DebugDump {
    dir: PathBuf,
}

impl DebugDump {
    /// 使用指定目录创建
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 写入登录后的页面
    ///
    /// # 返回
    /// 写入的文件路径
    pub async fn write_landing_page(&self, html: &str) -> Result<PathBuf, FileError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: self.dir.display().to_string(),
                source,
            })?;

        let path = self.dir.join("index.html");
        debug!("Writing landing page ({} bytes) to {}", html.len(), path.display());

        fs::write(&path, html)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;

        Ok(path)
    }
}
