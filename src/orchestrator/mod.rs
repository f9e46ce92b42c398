//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行、清理）
//! - 创建所有客户端并注入流程
//! - 顺序处理输入目录中的提交，输出全局统计信息
//!
//! ### `graph_manager` - 流程编排器
//! - 按阶段注册节点、按种类注册 agent
//! - 执行固定的四阶段流程
//! - 按名称调用单个 agent
//!
//! ## 层次关系
//!
//! ```text
//! app (处理 Vec<Submission>)
//!     ↓
//! graph_manager (处理单个提交的上下文)
//!     ↓
//! workflow::nodes / agents (单个阶段)
//!     ↓
//! services (能力层：persistence / prompt / memory)
//!     ↓
//! clients (基础设施：LLM / 翻译 / 存储 / 邮件)
//! ```

pub mod app;
pub mod graph_manager;

pub use app::{App, ProcessingStats};
pub use graph_manager::{GraphManager, WorkflowDeps};
