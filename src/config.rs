use crate::error::ConfigError;
use crate::models::Credentials;
use chrono::Weekday;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// 程序配置
///
/// 只从环境变量读取（可以由 `.env` 预先填充），运行期间不回写任何文件。
#[derive(Clone, Debug)]
pub struct Config {
    /// 门户地址
    pub base_url: String,
    /// 考勤表格路径（.toml / .csv）
    pub records_file: String,
    /// 单个 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 每个请求的最大尝试次数
    pub backoff_max_attempts: u32,
    /// 首次重试等待时间（毫秒）
    pub backoff_initial_delay_ms: u64,
    /// 失败日期整批重提的总时限（秒）
    pub retry_chain_timeout_secs: u64,
    /// 观察日（只接受这一天的日期）
    pub observation_weekday: Weekday,
    /// 登录页调试输出目录，不设置则不输出
    pub debug_dump_dir: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 登录凭据 ---
    pub id_number: Option<String>,
    pub password: Option<String>,
    pub tsc_number: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://tpad2.tsc.go.ke".to_string(),
            records_file: "attendance.toml".to_string(),
            request_timeout_secs: 30,
            backoff_max_attempts: 15,
            backoff_initial_delay_ms: 1000,
            retry_chain_timeout_secs: 300,
            observation_weekday: Weekday::Fri,
            debug_dump_dir: None,
            verbose_logging: false,
            id_number: None,
            password: None,
            tsc_number: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 用任意键值来源构造配置，未设置或无法解析的值使用默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            base_url: non_empty("TPAD_BASE_URL").unwrap_or(default.base_url),
            records_file: non_empty("RECORDS_FILE")
                .or_else(|| non_empty("PREVIOUS_FILE_CAPTURED"))
                .unwrap_or(default.records_file),
            request_timeout_secs: parsed(&non_empty, "REQUEST_TIMEOUT_SECS", "integer", default.request_timeout_secs),
            backoff_max_attempts: parsed(&non_empty, "BACKOFF_MAX_ATTEMPTS", "integer", default.backoff_max_attempts),
            backoff_initial_delay_ms: parsed(&non_empty, "BACKOFF_INITIAL_DELAY_MS", "integer", default.backoff_initial_delay_ms),
            retry_chain_timeout_secs: parsed(&non_empty, "RETRY_CHAIN_TIMEOUT_SECS", "integer", default.retry_chain_timeout_secs),
            observation_weekday: parsed(&non_empty, "OBSERVATION_WEEKDAY", "weekday", default.observation_weekday),
            debug_dump_dir: non_empty("DEBUG_DUMP_DIR"),
            verbose_logging: parsed(&non_empty, "VERBOSE_LOGGING", "boolean", default.verbose_logging),
            // 也接受旧版 `.env` 中不带前缀的变量名
            id_number: non_empty("TPAD_ID_NUMBER").or_else(|| non_empty("ID_NUMBER")),
            password: non_empty("TPAD_PASSWORD").or_else(|| non_empty("PASSWORD")),
            tsc_number: non_empty("TPAD_TSC_NUMBER").or_else(|| non_empty("TSC_NUMBER")),
        }
    }

    /// 登录凭据，三项都必须存在
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let require = |value: &Option<String>, var_name: &str| {
            value.clone().ok_or_else(|| ConfigError::EnvVarNotFound {
                var_name: var_name.to_string(),
            })
        };
        Ok(Credentials::new(
            require(&self.id_number, "TPAD_ID_NUMBER")?,
            require(&self.password, "TPAD_PASSWORD")?,
            require(&self.tsc_number, "TPAD_TSC_NUMBER")?,
        ))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_chain_timeout(&self) -> Duration {
        Duration::from_secs(self.retry_chain_timeout_secs)
    }
}

/// 解析一个环境变量，未设置时使用默认值，无法解析时警告并使用默认值
fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
    default: T,
) -> T {
    let Some(value) = lookup(var_name) else {
        return default;
    };
    match parse_var(var_name, &value, expected_type) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("{}, using the default", e);
            default
        }
    }
}

fn parse_var<T: FromStr>(var_name: &str, value: &str, expected_type: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::EnvVarParseFailed {
        var_name: var_name.to_string(),
        value: value.to_string(),
        expected_type: expected_type.to_string(),
    })
}

/// 如果当前目录有 `.env`，先把它加载进环境变量（只读）
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.base_url, "https://tpad2.tsc.go.ke");
        assert_eq!(config.backoff_max_attempts, 15);
        assert_eq!(config.retry_chain_timeout(), Duration::from_secs(300));
        assert!(config.debug_dump_dir.is_none());
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("REQUEST_TIMEOUT_SECS", "soon"),
            ("BACKOFF_MAX_ATTEMPTS", "4"),
            ("RECORDS_FILE", "term1.csv"),
            ("OBSERVATION_WEEKDAY", "someday"),
        ]));
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.observation_weekday, Weekday::Fri);
        assert_eq!(config.backoff_max_attempts, 4);
        assert_eq!(config.records_file, "term1.csv");
    }

    #[test]
    fn test_parse_error_names_the_variable() {
        let err = parse_var::<u64>("REQUEST_TIMEOUT_SECS", "soon", "integer").unwrap_err();
        assert_eq!(
            err.to_string(),
            "environment variable REQUEST_TIMEOUT_SECS: value 'soon' is not a valid integer"
        );
    }

    #[test]
    fn test_observation_weekday_accepts_day_names() {
        let config = Config::from_lookup(lookup(&[("OBSERVATION_WEEKDAY", "thursday")]));
        assert_eq!(config.observation_weekday, Weekday::Thu);
    }

    #[test]
    fn test_unprefixed_variables_are_fallbacks() {
        let config = Config::from_lookup(lookup(&[
            ("ID_NUMBER", "12345678"),
            ("PASSWORD", "secret"),
            ("TSC_NUMBER", "TSC-998"),
            ("TPAD_TSC_NUMBER", "TSC-001"),
            ("PREVIOUS_FILE_CAPTURED", "week3.xlsx"),
        ]));
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.id_number, "12345678");
        assert_eq!(credentials.password, "secret");
        assert_eq!(credentials.tsc_number, "TSC-001");
        assert_eq!(config.records_file, "week3.xlsx");
    }

    #[test]
    fn test_credentials_require_all_three_values() {
        let config = Config::from_lookup(lookup(&[
            ("TPAD_ID_NUMBER", "12345678"),
            ("TPAD_PASSWORD", "secret"),
        ]));
        assert_eq!(
            config.credentials().unwrap_err(),
            ConfigError::EnvVarNotFound {
                var_name: "TPAD_TSC_NUMBER".to_string()
            }
        );

        let config = Config::from_lookup(lookup(&[
            ("TPAD_ID_NUMBER", "12345678"),
            ("TPAD_PASSWORD", "secret"),
            ("TPAD_TSC_NUMBER", "TSC-998"),
        ]));
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.tsc_number, "TSC-998");
    }
}
