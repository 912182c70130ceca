//! # T-PAD Capture
//!
//! 一个用于批量提交教师周考勤（课堂观察）记录的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 与业务无关的通用能力
//! - `Backoff` - 指数退避重试执行器，可设置截止时间
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - 门户的 HTTP 接口
//! - `AttendancePortal` - 门户能力接口（打开会话、登录、保存考勤）
//! - `TpadClient` - 基于 reqwest 的实现
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `DateRules` - 日期表达式解析
//! - `SessionService` - 登录并读取机构代码
//! - `DebugDump` - 输出登录页
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一周考勤"的提交流程
//! - `CaptureCtx` - 上下文封装（教师 + 轮次）
//! - `CaptureFlow` - 流程编排（表单 → 退避提交 → 判断状态）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 运行控制，按顺序处理记录
//! - `orchestrator/record_processor` - 单条记录处理器，并发提交并重提失败日期
//!
//! ### 入口
//! - `cli` - 命令行参数，覆盖环境变量中的配置
//! - `config` - 环境变量 / `.env` 配置
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use cli::Cli;
pub use clients::{AttendancePortal, TpadClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{Backoff, Retryable};
pub use models::{AttendanceRecord, CaptureStatus, CapturedResult, Session, TeacherRecord};
pub use orchestrator::{App, RecordProcessor, RunStats};
pub use services::{resolve_dates, DateRules};
pub use workflow::{CaptureCtx, CaptureFlow};
