//! 会话服务 - 业务能力层
//!
//! 只负责"登录并拿到机构代码"能力，整个过程由退避执行器包装。

use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::portal::{AttendancePortal, ROOT_ENDPOINT};
use crate::error::SessionError;
use crate::infrastructure::Backoff;
use crate::models::{Credentials, LoginProfile, Session};
use crate::services::login_page::parse_landing_page;

/// 会话服务
///
/// 职责：
/// - 获取会话 cookie
/// - 提交登录表单
/// - 从登录后的页面读取机构代码
pub struct SessionService {
    portal: Arc<dyn AttendancePortal>,
    backoff: Backoff,
}

impl SessionService {
    /// 创建新的会话服务
    pub fn new(portal: Arc<dyn AttendancePortal>, backoff: Backoff) -> Self {
        Self { portal, backoff }
    }

    /// 登录
    ///
    /// 传输错误按退避策略重试；没有 cookie 或页面无法解析时立即失败。
    pub async fn acquire(
        &self,
        credentials: &Credentials,
    ) -> Result<(Session, LoginProfile), SessionError> {
        debug!("Logging in with the provided details: {:?}", credentials);

        let (session, profile) = self
            .backoff
            .retry("login", || self.login_once(credentials))
            .await?;

        info!(
            "🔐 Logged in user's details:\n\t{}",
            profile.details.join("\n\t")
        );
        Ok((session, profile))
    }

    async fn login_once(
        &self,
        credentials: &Credentials,
    ) -> Result<(Session, LoginProfile), SessionError> {
        let cookie = self
            .portal
            .open_session()
            .await?
            .ok_or_else(|| SessionError::SessionUnavailable {
                endpoint: ROOT_ENDPOINT.to_string(),
            })?;

        let html = self.portal.login(&cookie, credentials).await?;
        let profile = parse_landing_page(&html)?;

        Ok((Session::new(cookie, profile.institution_id.clone()), profile))
    }
}
