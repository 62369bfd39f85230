//! # Result Desk
//!
//! 考务成绩录入客户端：邮箱 + OTP 登录，按批次拉取考生，录入理论成绩，
//! 并通过 xlsx 表格批量导出 / 导入实操和口试分数。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有会话 token 的存储，只暴露读写能力
//!
//! ### ② 客户端（Clients）
//! - `clients/` - `ExamBackend` trait 与基于 reqwest 的 `ExamClient`
//!
//! ### ③ 业务能力层（Services）
//! - `SessionGate` - 邮箱 → OTP → 已登录
//! - `workbook_export` / `workbook_import` - 表格导出与导入
//! - `theory_result` - 理论成绩组装
//!
//! ### ④ 流程层（Workflow）
//! - `ResultDesk` - 一次会话内的页面状态，编排每个操作员动作
//!
//! ### ⑤ 编排层
//! - `app` - CLI 子命令到操作员动作的映射
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{ExamBackend, ExamClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{FileSessionStore, MemorySessionStore, SessionStore};
pub use services::{GateState, SessionGate};
pub use workflow::{DeskState, ResultDesk};
