//! 批量记录处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次运行的全部调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建 HTTP 客户端和各项服务
//! 2. **加载记录**：读取考勤表格（`Vec<TeacherRecord>`）
//! 3. **解析日期**：提前解析所有记录的日期，无效记录跳过
//! 4. **登录**：获取会话和机构代码，可选输出登录页
//! 5. **逐条提交**：记录之间顺序执行，委托 record_processor 处理单条记录
//! 6. **全局统计**：汇总所有记录的提交结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个日期的细节
//! - **会话所有者**：唯一创建 `Session` 的模块，之后只读共享
//! - **向下委托**：委托 record_processor 处理单条记录

use crate::clients::{AttendancePortal, TpadClient};
use crate::config::Config;
use crate::error::{AppError, CaptureError};
use crate::infrastructure::Backoff;
use crate::models::{self, AttendanceRecord, CaptureStatus, CapturedResult, TeacherRecord};
use crate::orchestrator::record_processor::RecordProcessor;
use crate::services::{DateRules, DebugDump, SessionService};
use crate::utils::logging::{log_records_loaded, log_startup, print_final_stats};
use crate::workflow::CaptureFlow;
use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    portal: Arc<dyn AttendancePortal>,
}

/// 运行统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// 表格中的记录数
    pub total: usize,
    /// 日期无效而跳过的记录
    pub skipped: usize,
    /// 所有日期都已完成的记录
    pub completed: usize,
    /// 超时或失败的记录
    pub failed: usize,
    /// 状态为 Captured 的日期数
    pub dates_captured: usize,
    /// 状态为 Not captured 的日期数
    pub dates_not_captured: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let client = TpadClient::new(&config)?;
        Ok(Self::with_portal(config, Arc::new(client)))
    }

    /// 使用指定的门户实现创建应用
    pub fn with_portal(config: Config, portal: Arc<dyn AttendancePortal>) -> Self {
        Self { config, portal }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunStats> {
        let credentials = self.config.credentials().map_err(AppError::from)?;

        // 加载并校验记录
        let teachers = self.load_records().await?;
        let today = Local::now().date_naive();
        let mut stats = RunStats {
            total: teachers.len(),
            ..Default::default()
        };

        // 提前解析日期
        let records = self.resolve_records(teachers, today, &mut stats)?;
        log_records_loaded(stats.total, records.len());

        // 登录
        let backoff = self.backoff();
        let session_service = SessionService::new(Arc::clone(&self.portal), backoff.clone());
        let (session, profile) = session_service
            .acquire(&credentials)
            .await
            .map_err(AppError::from)?;

        if let Some(dir) = &self.config.debug_dump_dir {
            let dump = DebugDump::with_dir(dir);
            match dump.write_landing_page(&profile.html).await {
                Ok(path) => info!("📝 Landing page saved to {}", path.display()),
                Err(e) => warn!("⚠️ Could not save landing page: {}", e),
            }
        }

        let session = Arc::new(session);
        let flow = CaptureFlow::new(Arc::clone(&self.portal), backoff, today.year());
        let processor = RecordProcessor::new(flow, self.config.retry_chain_timeout());

        // ========== 逐条提交 ==========
        for (index, record) in records.into_iter().enumerate() {
            let record_index = index + 1;
            info!("Capturing weekly attendance for : {}", record.teacher);

            let record = Arc::new(record);
            match processor
                .capture_attendance(&session, &record, record_index)
                .await
            {
                Ok(result) => {
                    self.log_result(&result);
                    stats.completed += 1;
                    self.count_dates(&result, &mut stats);
                }
                Err(CaptureError::RetryTimeoutExceeded {
                    captured, pending, ..
                }) => {
                    error!(
                        "❌ {} timed out, {} date(s) were not submitted",
                        record.teacher,
                        pending.len()
                    );
                    let partial = CapturedResult::new(&record.teacher, captured);
                    self.log_result(&partial);
                    stats.failed += 1;
                    self.count_dates(&partial, &mut stats);
                }
                Err(e) => {
                    error!("❌ {} could not be captured: {}", record.teacher, e);
                    stats.failed += 1;
                }
            }
        }

        print_final_stats(&stats);
        Ok(stats)
    }

    /// 加载记录
    async fn load_records(&self) -> Result<Vec<TeacherRecord>> {
        let records = models::load_records(Path::new(&self.config.records_file))
            .await
            .map_err(AppError::from)?;
        Ok(records)
    }

    /// 解析所有记录的日期
    ///
    /// 日期无效或解析结果为空的记录被跳过；全部被跳过时返回 `NoValidRecords`。
    fn resolve_records(
        &self,
        teachers: Vec<TeacherRecord>,
        today: NaiveDate,
        stats: &mut RunStats,
    ) -> Result<Vec<AttendanceRecord>> {
        let rules = DateRules::new(self.config.observation_weekday);
        let mut errors = 0;
        let mut records = Vec::with_capacity(teachers.len());

        for teacher in teachers {
            match rules.resolve(&teacher.dates, today) {
                Ok(resolution) if resolution.dates.is_empty() => {
                    warn!("⚠️ {} has no valid dates, skipping", teacher);
                    stats.skipped += 1;
                }
                Ok(resolution) => {
                    let dates = resolution.dates;
                    records.push(AttendanceRecord::new(teacher, dates));
                }
                Err(e) => {
                    error!("❌ {}: {}", teacher, e);
                    errors += 1;
                    stats.skipped += 1;
                }
            }
        }

        if records.is_empty() {
            return Err(AppError::NoValidRecords { errors }.into());
        }
        Ok(records)
    }

    fn backoff(&self) -> Backoff {
        Backoff::from_config(&self.config)
    }

    fn log_result(&self, result: &CapturedResult) {
        let json = if self.config.verbose_logging {
            serde_json::to_string_pretty(result)
        } else {
            serde_json::to_string(result)
        };
        match json {
            Ok(json) => info!("{}", json),
            Err(e) => warn!("Could not serialize result for {}: {}", result.name, e),
        }
    }

    fn count_dates(&self, result: &CapturedResult, stats: &mut RunStats) {
        for entry in &result.captured {
            match entry.status {
                CaptureStatus::Captured => stats.dates_captured += 1,
                CaptureStatus::NotCaptured => stats.dates_not_captured += 1,
            }
        }
    }
}
