//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责记录调度和重提控制，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 运行控制
//! - 加载记录、解析日期、登录
//! - 按顺序处理每条记录
//! - 输出全局统计信息
//!
//! ### `record_processor` - 单条记录处理器
//! - 每个日期一个并发任务
//! - 失败日期逐轮重提，受总时限约束
//! - 汇总单条记录的结果
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<AttendanceRecord>)
//!     ↓
//! record_processor (处理 Vec<NaiveDate>)
//!     ↓
//! workflow::CaptureFlow (处理单个日期)
//!     ↓
//! clients (AttendancePortal)
//!     ↓
//! infrastructure (Backoff)
//! ```

pub mod batch_processor;
pub mod record_processor;

// 重新导出主要类型
pub use batch_processor::{App, RunStats};
pub use record_processor::RecordProcessor;
