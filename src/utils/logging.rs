/// 日志工具模块
///
/// 提供运行横幅和统计输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::orchestrator::RunStats;

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 本次运行的配置（不输出凭据）
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 T-PAD weekly attendance capture");
    info!("🌐 Portal: {}", config.base_url);
    info!("📄 Records: {}", config.records_file);
    info!(
        "🔁 Backoff: {} attempts from {} ms, retry chain limit {} s",
        config.backoff_max_attempts, config.backoff_initial_delay_ms, config.retry_chain_timeout_secs
    );
    info!("{}", "=".repeat(60));
}

/// 记录加载信息
///
/// # 参数
/// - `total`: 表格中的记录数
/// - `valid`: 日期有效、将要提交的记录数
pub fn log_records_loaded(total: usize, valid: usize) {
    info!("✓ Found {} record(s), {} with valid dates", total, valid);
    info!("💡 Records are captured one at a time, dates of a record in parallel\n");
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &RunStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 Capture summary");
    info!(
        "Finished at: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ Records completed: {}/{}", stats.completed, stats.total);
    info!("❌ Records failed: {}", stats.failed);
    info!("⏭️ Records skipped: {}", stats.skipped);
    info!(
        "📅 Dates captured: {}, not captured: {}",
        stats.dates_captured, stats.dates_not_captured
    );
    info!("{}", "=".repeat(60));
}
