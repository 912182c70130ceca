//! 测试用的内存门户

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tpad_capture::clients::portal::SAVE_ATTENDANCE_ENDPOINT;
use tpad_capture::error::TransportError;
use tpad_capture::models::{AttendanceForm, Credentials, TeacherRecord};
use tpad_capture::AttendancePortal;

pub const COOKIE: &str = "ci_session=abc123; tpad_csrf=xyz";

pub const LANDING_PAGE: &str = r#"
<html><body>
  <div class="row page-titles">
    <table class="table">
      <tr><td>MWANGAZA SECONDARY SCHOOL</td><td>Code: 31205</td></tr>
      <tr><td>Good Morning,</td><td>JANE WANJIRU</td></tr>
    </table>
  </div>
</body></html>
"#;

/// 可配置失败次数和响应的门户
pub struct FakePortal {
    cookie: Option<String>,
    landing_page: String,
    save_body: String,
    open_failures: AtomicUsize,
    save_failures: Mutex<HashMap<String, usize>>,
    retry_delay: Option<Duration>,
    failed_once: Mutex<HashSet<String>>,
    pub open_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub saves: Mutex<Vec<AttendanceForm>>,
}

impl FakePortal {
    pub fn new() -> Self {
        Self {
            cookie: Some(COOKIE.to_string()),
            landing_page: LANDING_PAGE.to_string(),
            save_body: "0".to_string(),
            open_failures: AtomicUsize::new(0),
            save_failures: Mutex::new(HashMap::new()),
            retry_delay: None,
            failed_once: Mutex::new(HashSet::new()),
            open_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            saves: Mutex::new(Vec::new()),
        }
    }

    pub fn without_cookie(mut self) -> Self {
        self.cookie = None;
        self
    }

    pub fn with_landing_page(mut self, html: &str) -> Self {
        self.landing_page = html.to_string();
        self
    }

    pub fn with_save_body(mut self, body: &str) -> Self {
        self.save_body = body.to_string();
        self
    }

    /// 前 `times` 次打开会话返回传输错误
    pub fn failing_open(self, times: usize) -> Self {
        self.open_failures.store(times, Ordering::SeqCst);
        self
    }

    /// 指定周（ISO 日期）的前 `times` 次保存返回传输错误
    pub fn failing_save(self, week_ending: &str, times: usize) -> Self {
        self.save_failures
            .lock()
            .unwrap()
            .insert(week_ending.to_string(), times);
        self
    }

    /// 曾经失败过的周再次提交时先等待 `delay`
    pub fn slow_on_retry(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn saves_for(&self, week_ending: &str) -> usize {
        self.saves
            .lock()
            .unwrap()
            .iter()
            .filter(|form| form.week_ending == week_ending)
            .count()
    }
}

#[async_trait]
impl AttendancePortal for FakePortal {
    async fn open_session(&self) -> Result<Option<String>, TransportError> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.open_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.open_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(TransportError::new("/", None, "connection reset"));
        }
        Ok(self.cookie.clone())
    }

    async fn login(&self, cookie: &str, _credentials: &Credentials) -> Result<String, TransportError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(cookie, COOKIE);
        Ok(self.landing_page.clone())
    }

    async fn save_attendance(
        &self,
        cookie: &str,
        form: &AttendanceForm,
    ) -> Result<String, TransportError> {
        assert_eq!(cookie, COOKIE);
        self.saves.lock().unwrap().push(form.clone());

        let should_fail = {
            let mut failures = self.save_failures.lock().unwrap();
            match failures.get_mut(&form.week_ending) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if should_fail {
            self.failed_once
                .lock()
                .unwrap()
                .insert(form.week_ending.clone());
            return Err(TransportError::new(
                SAVE_ATTENDANCE_ENDPOINT,
                Some("timeout"),
                "operation timed out",
            ));
        }

        let retried = self.failed_once.lock().unwrap().contains(&form.week_ending);
        if let (true, Some(delay)) = (retried, self.retry_delay) {
            tokio::time::sleep(delay).await;
        }

        Ok(self.save_body.clone())
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("12345678", "secret", "TSC-998")
}

pub fn teacher(dates: &str) -> TeacherRecord {
    TeacherRecord {
        code: "4521".to_string(),
        name: "Jane Wanjiru".to_string(),
        term: "1".to_string(),
        lessons_taught: "18".to_string(),
        lessons_recovered: "2".to_string(),
        to_be_taught: "20".to_string(),
        remarks: "Good progress".to_string(),
        dates: dates.to_string(),
    }
}
