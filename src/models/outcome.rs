use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CaptureError;
use crate::models::record::TeacherRecord;

/// 单个日期的提交状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureStatus {
    /// 服务器返回 `0`（本次保存）或 `1`（之前已保存）
    Captured,
    /// 服务器返回了其他内容，请求本身已完成
    #[serde(rename = "Not captured")]
    NotCaptured,
}

impl CaptureStatus {
    /// 根据保存接口的响应体判断状态
    pub fn from_response(body: &str) -> Self {
        match body.trim() {
            "0" | "1" => CaptureStatus::Captured,
            _ => CaptureStatus::NotCaptured,
        }
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureStatus::Captured => write!(f, "Captured"),
            CaptureStatus::NotCaptured => write!(f, "Not captured"),
        }
    }
}

/// 一次提交尝试（含退避重试）的结果
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// 服务器给出了答复
    Completed(CaptureStatus),
    /// 重试耗尽后仍然是传输错误
    Failed(CaptureError),
}

/// 某一周的提交结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedDate {
    pub date: NaiveDate,
    pub status: CaptureStatus,
}

/// 一位教师的提交结果
///
/// 保留记录信息但不包含原始日期列表，只报告每个日期的结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedResult {
    pub teacher_code: String,
    pub name: String,
    pub term: String,
    pub lessons_taught: String,
    pub lessons_recovered: String,
    pub to_be_taught: String,
    pub remarks: String,
    pub captured: Vec<CapturedDate>,
}

impl CapturedResult {
    pub fn new(teacher: &TeacherRecord, captured: Vec<CapturedDate>) -> Self {
        Self {
            teacher_code: teacher.code.clone(),
            name: teacher.name.clone(),
            term: teacher.term.clone(),
            lessons_taught: teacher.lessons_taught.clone(),
            lessons_recovered: teacher.lessons_recovered.clone(),
            to_be_taught: teacher.to_be_taught.clone(),
            remarks: teacher.remarks.clone(),
            captured,
        }
    }

    /// 状态为 `Captured` 的日期数
    pub fn captured_count(&self) -> usize {
        self.captured
            .iter()
            .filter(|c| c.status == CaptureStatus::Captured)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_response() {
        assert_eq!(CaptureStatus::from_response("0"), CaptureStatus::Captured);
        assert_eq!(CaptureStatus::from_response("1"), CaptureStatus::Captured);
        assert_eq!(CaptureStatus::from_response(" 1\n"), CaptureStatus::Captured);
        assert_eq!(CaptureStatus::from_response("5"), CaptureStatus::NotCaptured);
        assert_eq!(
            CaptureStatus::from_response("<html>error</html>"),
            CaptureStatus::NotCaptured
        );
    }

    #[test]
    fn test_result_serializes_without_dates_field() {
        let teacher = TeacherRecord {
            code: "4521".to_string(),
            name: "Jane Wanjiru".to_string(),
            term: "1".to_string(),
            lessons_taught: "18".to_string(),
            lessons_recovered: "2".to_string(),
            to_be_taught: "20".to_string(),
            remarks: "ok".to_string(),
            dates: "05/01/2024 - 19/01/2024".to_string(),
        };
        let result = CapturedResult::new(
            &teacher,
            vec![
                CapturedDate {
                    date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                    status: CaptureStatus::Captured,
                },
                CapturedDate {
                    date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
                    status: CaptureStatus::NotCaptured,
                },
            ],
        );

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("dates").is_none());
        assert_eq!(json["captured"][0]["date"], "2024-01-05");
        assert_eq!(json["captured"][0]["status"], "Captured");
        assert_eq!(json["captured"][1]["status"], "Not captured");
        assert_eq!(result.captured_count(), 1);
    }
}
