use chrono::NaiveDate;
use serde::Serialize;

use crate::models::record::TeacherRecord;
use crate::models::session::Credentials;

/// 登录表单（`/auth/login_user`）
#[derive(Debug, Clone, Serialize)]
pub struct LoginForm<'a> {
    pub hp: &'a str,
    pub idno: &'a str,
    pub password: &'a str,
    pub tscno: &'a str,
}

impl<'a> From<&'a Credentials> for LoginForm<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            hp: "",
            idno: &credentials.id_number,
            password: &credentials.password,
            tscno: &credentials.tsc_number,
        }
    }
}

/// 周考勤保存表单（`/teacher/save_attendance`）
///
/// 字段顺序与门户期望的表单一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceForm {
    pub institution: String,
    pub lesson_attended: String,
    pub lesson_recovered: String,
    pub summary: String,
    pub teacher: String,
    pub term: String,
    pub to_be_taught: String,
    /// ISO 日期，如 `2024-01-12`
    pub week_ending: String,
    pub year: i32,
}

impl AttendanceForm {
    pub fn new(teacher: &TeacherRecord, institution: &str, week_ending: NaiveDate, year: i32) -> Self {
        Self {
            institution: institution.to_string(),
            lesson_attended: teacher.lessons_taught.clone(),
            lesson_recovered: teacher.lessons_recovered.clone(),
            summary: teacher.remarks.clone(),
            teacher: teacher.code.clone(),
            term: teacher.term.clone(),
            to_be_taught: teacher.to_be_taught.clone(),
            week_ending: week_ending.format("%Y-%m-%d").to_string(),
            year,
        }
    }
}
