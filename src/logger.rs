//! 日志初始化
//!
//! 日志级别由 `RUST_LOG` 控制，未设置时为 `info`。
//! `RUST_LOG` 可以写在 `.env` 中，前提是 `.env` 在 [`init`] 之前加载。

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// 初始化全局日志订阅者
///
/// 重复调用时保留第一次的设置。
pub fn init() {
    let directive = filter_directive(|key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}

/// 日志过滤规则，`RUST_LOG` 为空时使用默认级别
fn filter_directive(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup(EnvFilter::DEFAULT_ENV)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}
