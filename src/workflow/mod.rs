pub mod capture_ctx;
pub mod capture_flow;

pub use capture_ctx::CaptureCtx;
pub use capture_flow::CaptureFlow;
