//! 考勤门户接口
//!
//! 业务层只依赖这个 trait，真实实现为 [`TpadClient`](crate::clients::TpadClient)，
//! 测试中可以替换为内存实现。

use async_trait::async_trait;

use crate::error::TransportError;
use crate::models::{AttendanceForm, Credentials};

pub const ROOT_ENDPOINT: &str = "/";
pub const LOGIN_ENDPOINT: &str = "/auth/login_user";
pub const SAVE_ATTENDANCE_ENDPOINT: &str = "/teacher/save_attendance";

/// 考勤门户
#[async_trait]
pub trait AttendancePortal: Send + Sync {
    /// 未认证访问首页，返回 `Cookie` 请求头的值
    ///
    /// 服务器没有设置任何 cookie 时返回 `Ok(None)`。
    async fn open_session(&self) -> Result<Option<String>, TransportError>;

    /// 提交登录表单，返回登录后的页面 HTML
    async fn login(&self, cookie: &str, credentials: &Credentials) -> Result<String, TransportError>;

    /// 保存一周的考勤，返回响应体
    async fn save_attendance(
        &self,
        cookie: &str,
        form: &AttendanceForm,
    ) -> Result<String, TransportError>;
}
