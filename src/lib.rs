//! # RTI Agent
//!
//! 把公民的非正式查询整理成正式的 RTI（信息公开）申请：
//! 分类到政府部门、改写为正式申请信、分配跟踪号并保存。
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 外部服务的薄封装，只暴露能力
//! - `LlmClient` - Groq / Gemini（兼容 OpenAI 的端点）
//! - `GoogleTranslator` - 语言检测与翻译
//! - `MongoStore` / `InMemoryDocumentStore` - RTI 请求存储
//! - `EmailClient` - 模拟邮件通知
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `PersistenceClient` - 先校验再写入，错误只记录不抛出
//! - `PromptLoader` - 提示词模板
//! - `AgentMemory` - 按 agent 隔离的记忆
//! - `FailureWriter` - 写失败记录
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 上下文、阶段和四个节点
//! - `agents/` - 包装节点、返回统一结构的 agent
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/graph_manager` - 固定顺序执行四个阶段
//! - `orchestrator/app` - 组装依赖、批量处理提交
//!
//! ## 模块结构

pub mod agents;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AgentResponse, RtiRequest};
pub use orchestrator::{App, GraphManager, WorkflowDeps};
pub use workflow::{Stage, WorkflowContext};
