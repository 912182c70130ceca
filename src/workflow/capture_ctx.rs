//! 提交上下文
//!
//! 封装"我正在提交哪位教师、第几轮"这一信息

use std::fmt::Display;

/// 提交上下文
#[derive(Debug, Clone)]
pub struct CaptureCtx {
    /// 教师编号
    pub teacher_code: String,

    /// 记录索引（仅用于日志显示，从 1 开始）
    pub record_index: usize,

    /// 第几轮提交（第 1 轮为首次提交，之后为失败日期的重提）
    pub generation: usize,
}

impl CaptureCtx {
    /// 创建新的提交上下文
    pub fn new(teacher_code: impl Into<String>, record_index: usize, generation: usize) -> Self {
        Self {
            teacher_code: teacher_code.into(),
            record_index,
            generation,
        }
    }
}

impl Display for CaptureCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[record #{} teacher #{} round #{}]",
            self.record_index, self.teacher_code, self.generation
        )
    }
}
