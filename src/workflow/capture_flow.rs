//! 单周提交流程 - 流程层
//!
//! 核心职责：定义"一位教师的一周"如何提交
//!
//! 流程顺序：
//! 1. 构建保存表单
//! 2. 退避重试提交
//! 3. 解释响应体（`0`/`1` 为成功，其他为未保存）

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::clients::AttendancePortal;
use crate::error::CaptureError;
use crate::infrastructure::Backoff;
use crate::models::{AttendanceForm, CaptureStatus, Session, SubmissionOutcome, TeacherRecord};
use crate::workflow::capture_ctx::CaptureCtx;

/// 单周提交流程
///
/// - 不持有会话，会话由调用方传入
/// - 可以廉价克隆，供并发任务各持一份
#[derive(Clone)]
pub struct CaptureFlow {
    portal: Arc<dyn AttendancePortal>,
    backoff: Backoff,
    year: i32,
}

impl CaptureFlow {
    /// 创建新的提交流程
    ///
    /// `year` 为表单中的 `year` 字段（运行当年）。
    pub fn new(portal: Arc<dyn AttendancePortal>, backoff: Backoff, year: i32) -> Self {
        Self {
            portal,
            backoff,
            year,
        }
    }

    /// 第一次重试前的等待时间
    pub fn initial_delay(&self) -> Duration {
        self.backoff.initial_delay()
    }

    /// 提交一周考勤
    ///
    /// 传输错误在退避重试耗尽后才变成 `Failed`；超过 `deadline` 后不再安排新的重试。
    pub async fn run(
        &self,
        session: &Session,
        teacher: &TeacherRecord,
        week_ending: NaiveDate,
        ctx: &CaptureCtx,
        deadline: Option<Instant>,
    ) -> SubmissionOutcome {
        let form = AttendanceForm::new(teacher, &session.institution_id, week_ending, self.year);
        let label = format!("{} week ending {}", ctx, week_ending);

        let result = self
            .backoff
            .retry_until(&label, deadline, || {
                self.portal.save_attendance(&session.cookie, &form)
            })
            .await;

        match result {
            Ok(body) => {
                let status = CaptureStatus::from_response(&body);
                match status {
                    CaptureStatus::Captured => debug!("{} ✓ {}", label, status),
                    CaptureStatus::NotCaptured => {
                        warn!("{} ⚠️ {} (portal replied `{}`)", label, status, body.trim())
                    }
                }
                SubmissionOutcome::Completed(status)
            }
            Err(e) => {
                error!("{} ❌ {}", label, e);
                SubmissionOutcome::Failed(CaptureError::Transport(e))
            }
        }
    }
}
