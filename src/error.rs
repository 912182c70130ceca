//! 错误类型定义
//!
//! 按层次划分：日期规则错误、会话错误、提交错误、配置错误、文件错误，
//! 最外层由 [`AppError`] 统一包装。

use std::time::Duration;

use chrono::{NaiveDate, Weekday};
use thiserror::Error;

use crate::infrastructure::backoff::Retryable;
use crate::models::CapturedDate;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// 文件错误
    #[error("file error: {0}")]
    File(#[from] FileError),
    /// 日期表达式错误
    #[error("date error: {0}")]
    Date(#[from] DateRuleError),
    /// 登录 / 会话错误（致命）
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    /// 提交错误
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    /// 没有任何可提交的记录
    #[error("no valid entry was found, {errors} error(s) were encountered while parsing dates")]
    NoValidRecords { errors: usize },
}

/// 日期规则错误
///
/// 全部可恢复：出错的记录被跳过，其余记录继续处理。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRuleError {
    #[error(
        "invalid date format `{expression}`, use `dd/mm/yyyy - dd/mm/yyyy` for a range or `dd/mm/yyyy, dd/mm/yyyy` for specific dates"
    )]
    InvalidFormat { expression: String },

    #[error("`{token}` is not a valid date, dates should be in the format DD/MM/YYYY")]
    InvalidDate { token: String },

    #[error("the provided date ({token}) is in the future")]
    FutureDate { token: String },

    #[error("start date ({start}) is after end date ({end})")]
    OrderError { start: String, end: String },

    #[error("{token} is not on a {weekday:?}, weekly observations only happen on that day")]
    WeekdayMismatch { token: String, weekday: Weekday },

    /// 仅在列表模式下作为单个日期的拒绝原因出现
    #[error("the week of {token} was already supplied")]
    DuplicateWeek { token: String },

    #[error("no observation dates could be derived from `{expression}`")]
    NoDatesProduced { expression: String },
}

/// HTTP 传输错误
///
/// `code` 为可选的错误码（HTTP 状态码、`timeout`、`connect` 等），
/// 用于重试日志。
#[derive(Debug, Clone, Error)]
#[error("request to {endpoint} failed: {message}")]
pub struct TransportError {
    pub endpoint: String,
    pub code: Option<String>,
    pub message: String,
    pub retryable: bool,
}

impl TransportError {
    /// 创建可重试的传输错误
    pub fn new(
        endpoint: impl Into<String>,
        code: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            code: code.map(str::to_string),
            message: message.into(),
            retryable: true,
        }
    }

    /// 从 reqwest 错误转换
    ///
    /// 请求构造失败（非法 header 等）不可重试，其余都视为瞬时故障。
    pub fn from_reqwest(endpoint: impl Into<String>, err: &reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            "timeout".to_string()
        } else if err.is_connect() {
            "connect".to_string()
        } else if let Some(status) = err.status() {
            status.as_u16().to_string()
        } else if err.is_builder() {
            "builder".to_string()
        } else {
            "request".to_string()
        };

        Self {
            endpoint: endpoint.into(),
            code: Some(code),
            message: err.to_string(),
            retryable: !err.is_builder(),
        }
    }
}

impl Retryable for TransportError {
    fn is_retryable(&self) -> bool {
        self.retryable
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

/// 登录 / 会话错误
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// 首页没有返回会话 cookie，说明远端服务不可用
    #[error("session cookie was not set by {endpoint}, rerun the capture to resubmit")]
    SessionUnavailable { endpoint: String },

    /// 登录后的页面中找不到机构代码
    #[error("failed to read the institution code from the landing page: {reason}")]
    SessionParseError { reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SessionError {
    pub fn parse(reason: impl Into<String>) -> Self {
        SessionError::SessionParseError {
            reason: reason.into(),
        }
    }
}

impl Retryable for SessionError {
    fn is_retryable(&self) -> bool {
        match self {
            SessionError::Transport(e) => e.is_retryable(),
            SessionError::SessionUnavailable { .. } | SessionError::SessionParseError { .. } => {
                false
            }
        }
    }

    fn code(&self) -> Option<&str> {
        match self {
            SessionError::Transport(e) => e.code(),
            _ => None,
        }
    }
}

/// 考勤提交错误
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// 重试耗尽后的传输错误
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// 整个重试链超过全局时限
    ///
    /// 携带已经提交成功的日期和仍未完成的日期，供上层报告。
    #[error(
        "retrying capture for teacher {teacher_code} took longer than {timeout:?}, {} date(s) still pending",
        .pending.len()
    )]
    RetryTimeoutExceeded {
        teacher_code: String,
        timeout: Duration,
        captured: Vec<CapturedDate>,
        pending: Vec<NaiveDate>,
    },

    /// 提交任务异常退出
    #[error("submission task for week ending {date} did not complete: {message}")]
    TaskJoin { date: NaiveDate, message: String },
}

impl Retryable for CaptureError {
    fn is_retryable(&self) -> bool {
        match self {
            CaptureError::Transport(e) => e.is_retryable(),
            CaptureError::RetryTimeoutExceeded { .. } => false,
            CaptureError::TaskJoin { .. } => true,
        }
    }

    fn code(&self) -> Option<&str> {
        match self {
            CaptureError::Transport(e) => e.code(),
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("environment variable {var_name} is not set")]
    EnvVarNotFound { var_name: String },

    /// 环境变量解析失败
    #[error("environment variable {var_name}: value '{value}' is not a valid {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file does not exist: {path}")]
    NotFound { path: String },

    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML file {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse CSV file {path}: {source}")]
    CsvParseFailed {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read workbook {path}: {message}")]
    SpreadsheetParseFailed { path: String, message: String },

    #[error("No sheets found in {path}")]
    NoSheets { path: String },

    #[error("{path} has more than one sheet: {}", .sheets.join(", "))]
    MultipleSheets { path: String, sheets: Vec<String> },

    #[error("unsupported record file {path}, expected an Excel workbook, a .csv or a .toml file")]
    UnsupportedFormat { path: String },

    #[error("no data found in {path}")]
    Empty { path: String },

    #[error("errors were found while parsing {path}:\n  {}", .rows.join("\n  "))]
    MissingFields { path: String, rows: Vec<String> },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_are_fatal_except_transport() {
        let unavailable = SessionError::SessionUnavailable {
            endpoint: "/".to_string(),
        };
        assert!(!unavailable.is_retryable());
        assert!(!SessionError::parse("missing table").is_retryable());

        let transport = SessionError::from(TransportError::new("/auth/login_user", Some("502"), "bad gateway"));
        assert!(transport.is_retryable());
        assert_eq!(transport.code(), Some("502"));
    }

    #[test]
    fn test_timeout_message_counts_pending_dates() {
        let err = CaptureError::RetryTimeoutExceeded {
            teacher_code: "T-100".to_string(),
            timeout: Duration::from_secs(300),
            captured: Vec::new(),
            pending: vec![
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("T-100"));
        assert!(message.contains("2 date(s) still pending"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_missing_fields_lists_every_row() {
        let err = FileError::MissingFields {
            path: "records.csv".to_string(),
            rows: vec!["row 1: missing dates".to_string(), "row 3: missing code".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("row 1: missing dates"));
        assert!(message.contains("row 3: missing code"));
    }
}
