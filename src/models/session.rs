use std::fmt;

/// 登录凭据
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub id_number: String,
    pub password: String,
    pub tsc_number: String,
}

impl Credentials {
    pub fn new(
        id_number: impl Into<String>,
        password: impl Into<String>,
        tsc_number: impl Into<String>,
    ) -> Self {
        Self {
            id_number: id_number.into(),
            password: password.into(),
            tsc_number: tsc_number.into(),
        }
    }
}

// 密码不出现在日志里
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id_number", &self.id_number)
            .field("password", &"********")
            .field("tsc_number", &self.tsc_number)
            .finish()
    }
}

/// 已认证的会话
///
/// 一次运行只创建一次，之后所有并发提交只读共享。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// `Cookie` 请求头的值
    pub cookie: String,
    /// 机构代码，每次提交都需要
    pub institution_id: String,
}

impl Session {
    pub fn new(cookie: impl Into<String>, institution_id: impl Into<String>) -> Self {
        Self {
            cookie: cookie.into(),
            institution_id: institution_id.into(),
        }
    }
}

/// 登录后首页上的用户信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginProfile {
    /// 页面上显示的用户信息（姓名、问候语、机构等），按日志顺序排列
    pub details: Vec<String>,
    pub institution_id: String,
    /// 原始页面，用于可选的调试输出
    pub html: String,
}
