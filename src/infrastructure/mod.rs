//! 基础设施层
//!
//! 只暴露与业务无关的通用能力。

pub mod backoff;

pub use backoff::{Backoff, Retryable};
