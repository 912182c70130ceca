//! 单条记录处理器 - 编排层
//!
//! ## 职责
//!
//! 提交一位教师的所有观察日期，是记录级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **并发提交**：每一轮为每个待提交日期启动一个任务，按输入顺序等待全部完成
//! 2. **失败重提**：上一轮失败的日期组成下一轮，直到没有失败的日期
//! 3. **总时限**：从第一次重提开始计时，超时后不再安排新的重提
//! 4. **结果汇总**：每个日期在结果中只出现一次

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

use crate::error::CaptureError;
use crate::models::{AttendanceRecord, CapturedDate, CapturedResult, Session, SubmissionOutcome};
use crate::workflow::{CaptureCtx, CaptureFlow};

/// 一轮提交的结果（按输入顺序）
type Generation = Vec<(NaiveDate, SubmissionOutcome)>;

/// 单条记录处理器
pub struct RecordProcessor {
    flow: CaptureFlow,
    retry_chain_timeout: Duration,
}

impl RecordProcessor {
    /// 创建新的记录处理器
    ///
    /// # 参数
    /// - `flow`: 单周提交流程，每个任务各克隆一份
    /// - `retry_chain_timeout`: 失败日期重提的总时限
    pub fn new(flow: CaptureFlow, retry_chain_timeout: Duration) -> Self {
        Self {
            flow,
            retry_chain_timeout,
        }
    }

    /// 提交一位教师的全部日期
    ///
    /// # 参数
    /// - `session`: 已登录的会话（只读共享）
    /// - `record`: 日期已解析的记录（只读共享）
    /// - `record_index`: 记录索引（用于日志）
    ///
    /// # 返回
    /// 每个日期的状态；重提超过总时限时返回 `RetryTimeoutExceeded`，其中带有已完成和未完成的日期
    pub async fn capture_attendance(
        &self,
        session: &Arc<Session>,
        record: &Arc<AttendanceRecord>,
        record_index: usize,
    ) -> Result<CapturedResult, CaptureError> {
        let teacher = &record.teacher;
        let mut captured: Vec<CapturedDate> = Vec::with_capacity(record.dates.len());
        let mut pending: Vec<NaiveDate> = record.dates.clone();
        let mut deadline: Option<Instant> = None;
        let mut generation = 1;

        // ========== 逐轮提交，直到没有失败的日期 ==========
        while !pending.is_empty() {
            if generation > 1 {
                if generation == 2 {
                    // 时限过大时视为没有时限
                    deadline = Instant::now().checked_add(self.retry_chain_timeout);
                }
                // 剩余时间不足一次退避等待时结束，新一轮不会在截止前空转
                if let Some(chain_deadline) = deadline {
                    let next_retry = Instant::now().checked_add(self.flow.initial_delay());
                    if next_retry.map_or(true, |at| at >= chain_deadline) {
                        return Err(self.timeout_error(&teacher.code, captured, pending));
                    }
                }
            }

            debug!(
                "[record #{}] round #{}: submitting {} date(s)",
                record_index,
                generation,
                pending.len()
            );

            let handles =
                self.spawn_generation(session, record, &pending, record_index, generation, deadline);

            // 超时时丢弃 JoinHandle，正在进行的请求继续在后台运行，但不会再被重提
            let settled = match deadline {
                None => join_generation(handles).await,
                Some(at) => match timeout_at(at, join_generation(handles)).await {
                    Ok(settled) => settled,
                    Err(_) => {
                        return Err(self.timeout_error(&teacher.code, captured, pending));
                    }
                },
            };

            let mut failed = Vec::new();
            for (date, outcome) in settled {
                match outcome {
                    SubmissionOutcome::Completed(status) => {
                        captured.push(CapturedDate { date, status })
                    }
                    SubmissionOutcome::Failed(e) => {
                        debug!("[record #{}] {} failed: {}", record_index, date, e);
                        failed.push(date);
                    }
                }
            }

            if !failed.is_empty() {
                warn!(
                    "Following dates failed to capture: {} retrying.",
                    format_dates(&failed)
                );
            }

            pending = failed;
            generation += 1;
        }

        captured.sort_by_key(|c| c.date);
        info!(
            "[record #{}] ✓ {} finished after {} round(s)",
            record_index,
            teacher,
            generation - 1
        );
        Ok(CapturedResult::new(teacher, captured))
    }

    /// 为每个待提交日期启动一个任务，句柄按输入顺序保存
    fn spawn_generation(
        &self,
        session: &Arc<Session>,
        record: &Arc<AttendanceRecord>,
        pending: &[NaiveDate],
        record_index: usize,
        generation: usize,
        deadline: Option<Instant>,
    ) -> Vec<(NaiveDate, JoinHandle<SubmissionOutcome>)> {
        pending
            .iter()
            .map(|&date| {
                let flow = self.flow.clone();
                let session = Arc::clone(session);
                let record = Arc::clone(record);
                let ctx = CaptureCtx::new(record.teacher.code.clone(), record_index, generation);

                let handle = tokio::spawn(async move {
                    flow.run(&session, &record.teacher, date, &ctx, deadline)
                        .await
                });
                (date, handle)
            })
            .collect()
    }

    fn timeout_error(
        &self,
        teacher_code: &str,
        mut captured: Vec<CapturedDate>,
        pending: Vec<NaiveDate>,
    ) -> CaptureError {
        captured.sort_by_key(|c| c.date);
        error!(
            "⏱️ Retry chain for teacher {} exceeded {:?}, giving up on: {}",
            teacher_code,
            self.retry_chain_timeout,
            format_dates(&pending)
        );
        CaptureError::RetryTimeoutExceeded {
            teacher_code: teacher_code.to_string(),
            timeout: self.retry_chain_timeout,
            captured,
            pending,
        }
    }
}

/// 等待一轮中的所有任务
///
/// 任务异常退出（panic）视为该日期提交失败。
async fn join_generation(handles: Vec<(NaiveDate, JoinHandle<SubmissionOutcome>)>) -> Generation {
    join_all(handles.into_iter().map(|(date, handle)| async move {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Submission task for {} did not complete: {}", date, e);
                SubmissionOutcome::Failed(CaptureError::TaskJoin {
                    date,
                    message: e.to_string(),
                })
            }
        };
        (date, outcome)
    }))
    .await
}

fn format_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
