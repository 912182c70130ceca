pub mod form;
pub mod loaders;
pub mod outcome;
pub mod record;
pub mod session;

pub use form::{AttendanceForm, LoginForm};
pub use loaders::load_records;
pub use outcome::{CaptureStatus, CapturedDate, CapturedResult, SubmissionOutcome};
pub use record::{AttendanceRecord, RawTeacherRow, TeacherRecord};
pub use session::{Credentials, LoginProfile, Session};
