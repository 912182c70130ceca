//! 指数退避执行器 - 基础设施层
//!
//! 对任意可重试的异步操作进行包装：失败后等待 `delay`，
//! 每次失败后 `delay` 乘以固定系数，直到达到最大尝试次数。
//!
//! 没有抖动，也没有单次等待上限，唯一的上限是尝试次数。

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, error, warn};

use crate::config::Config;

/// 默认最大尝试次数（包含第一次调用）
pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;
/// 默认首次等待时间
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);
/// 默认等待时间增长系数
pub const DEFAULT_FACTOR: f64 = 1.5;

/// 可重试错误
///
/// 致命错误（如没有会话 cookie）返回 `false`，执行器会立刻把它交还给调用方。
pub trait Retryable {
    fn is_retryable(&self) -> bool;

    /// 可选的错误码，仅用于日志
    fn code(&self) -> Option<&str> {
        None
    }
}

/// 指数退避执行器
#[derive(Debug, Clone)]
pub struct Backoff {
    max_attempts: u32,
    initial_delay: Duration,
    factor: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            factor: DEFAULT_FACTOR,
        }
    }
}

/// 单次调用的重试状态
#[derive(Debug)]
struct RetryState {
    attempt: u32,
    delay: Duration,
}

impl RetryState {
    fn new(initial_delay: Duration) -> Self {
        Self {
            attempt: 1,
            delay: initial_delay,
        }
    }

    /// 等待时间溢出时保持为 `Duration::MAX`
    fn advance(&mut self, factor: f64) {
        self.attempt += 1;
        self.delay = Duration::try_from_secs_f64(self.delay.as_secs_f64() * factor)
            .unwrap_or(Duration::MAX);
    }
}

impl Backoff {
    /// 创建自定义参数的执行器
    ///
    /// `max_attempts` 至少为 1。
    pub fn new(max_attempts: u32, initial_delay: Duration, factor: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            factor,
        }
    }

    /// 从配置创建
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.backoff_max_attempts,
            Duration::from_millis(config.backoff_initial_delay_ms),
            DEFAULT_FACTOR,
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// 执行操作，失败时按指数退避重试
    ///
    /// # 参数
    /// - `label`: 日志中显示的操作名
    /// - `op`: 每次尝试都会重新调用的操作
    ///
    /// # 返回
    /// 成功结果，或最后一次失败的原始错误
    pub async fn retry<T, E, F, Fut>(&self, label: &str, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        self.retry_until(label, None, op).await
    }

    /// 与 [`Backoff::retry`] 相同，但超过 `deadline` 后不再安排新的尝试
    pub async fn retry_until<T, E, F, Fut>(
        &self,
        label: &str,
        deadline: Option<Instant>,
        mut op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut state = RetryState::new(self.initial_delay);

        loop {
            let err = match op().await {
                Ok(value) => {
                    if state.attempt > 1 {
                        debug!("{} succeeded on attempt {}", label, state.attempt);
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if state.attempt >= self.max_attempts {
                error!(
                    "{}: maximum number of retries reached ({} attempts): {}",
                    label, state.attempt, err
                );
                return Err(err);
            }

            if let Some(deadline) = deadline {
                let next_attempt = Instant::now().checked_add(state.delay);
                if next_attempt.map_or(true, |at| at >= deadline) {
                    warn!("{}: retry deadline reached, giving up: {}", label, err);
                    return Err(err);
                }
            }

            warn!(
                "{}: error {}. Retrying, attempt number: {}.",
                label,
                err.code().unwrap_or("unknown"),
                state.attempt
            );
            sleep(state.delay).await;
            state.advance(self.factor);
        }
    }
}
