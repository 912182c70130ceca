/// T-PAD 门户 HTTP 客户端
///
/// 封装所有与门户相关的请求，保持浏览器一致的请求头
use crate::clients::portal::{
    AttendancePortal, LOGIN_ENDPOINT, ROOT_ENDPOINT, SAVE_ATTENDANCE_ENDPOINT,
};
use crate::config::Config;
use crate::error::TransportError;
use crate::models::{AttendanceForm, Credentials, LoginForm};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "sec-ch-ua",
        r#""Google Chrome";v="123", "Not:A-Brand";v="8", "Chromium";v="123""#,
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""Windows""#),
    ("DNT", "1"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Content-Type", "application/x-www-form-urlencoded"),
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    ),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("Sec-Fetch-Site", "same-origin"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-User", "?1"),
    ("Sec-Fetch-Dest", "document"),
];

/// T-PAD 门户客户端
#[derive(Debug, Clone)]
pub struct TpadClient {
    http: Client,
    base_url: String,
}

impl TpadClient {
    /// 创建新的门户客户端
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .default_headers(browser_headers())
            .build()
            .map_err(|e| TransportError::from_reqwest(config.base_url.as_str(), &e))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn post(&self, endpoint: &str, cookie: &str) -> RequestBuilder {
        self.http.post(self.url(endpoint)).header(COOKIE, cookie)
    }

    /// 发送请求并读取响应体，非 2xx 状态视为失败
    async fn send_text(endpoint: &str, request: RequestBuilder) -> Result<String, TransportError> {
        let response = request
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|e| TransportError::from_reqwest(endpoint, &e))?;

        response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(endpoint, &e))
    }
}

#[async_trait]
impl AttendancePortal for TpadClient {
    async fn open_session(&self) -> Result<Option<String>, TransportError> {
        let response = self
            .http
            .get(self.url(ROOT_ENDPOINT))
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|e| TransportError::from_reqwest(ROOT_ENDPOINT, &e))?;

        let cookie = cookie_header(response.headers());
        debug!("Session cookie received: {}", cookie.is_some());
        Ok(cookie)
    }

    async fn login(&self, cookie: &str, credentials: &Credentials) -> Result<String, TransportError> {
        let request = self
            .post(LOGIN_ENDPOINT, cookie)
            .form(&LoginForm::from(credentials));
        Self::send_text(LOGIN_ENDPOINT, request).await
    }

    async fn save_attendance(
        &self,
        cookie: &str,
        form: &AttendanceForm,
    ) -> Result<String, TransportError> {
        debug!(
            "Saving attendance for teacher {} week ending {}",
            form.teacher, form.week_ending
        );
        let request = self.post(SAVE_ATTENDANCE_ENDPOINT, cookie).form(form);
        let body = Self::send_text(SAVE_ATTENDANCE_ENDPOINT, request).await?;

        // 空响应说明服务器没有处理请求
        if body.trim().is_empty() {
            return Err(TransportError::new(
                SAVE_ATTENDANCE_ENDPOINT,
                Some("empty_response"),
                "portal did not respond to the submission",
            ));
        }
        Ok(body)
    }
}

fn browser_headers() -> HeaderMap {
    BROWSER_HEADERS
        .iter()
        .filter_map(|(name, value)| {
            let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
            Some((name, HeaderValue::from_static(*value)))
        })
        .collect()
}

/// 把所有 `Set-Cookie` 的 `name=value` 部分拼成一个 `Cookie` 请求头
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}
