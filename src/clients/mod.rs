pub mod portal;
pub mod tpad_client;

pub use portal::AttendancePortal;
pub use tpad_client::TpadClient;
