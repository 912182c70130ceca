pub mod date_rules;
pub mod debug_dump;
pub mod login_page;
pub mod session_service;

pub use date_rules::{resolve_dates, DateResolution, DateRules};
pub use debug_dump::DebugDump;
pub use login_page::parse_landing_page;
pub use session_service::SessionService;
