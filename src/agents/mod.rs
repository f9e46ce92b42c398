//! agent 层
//!
//! agent 包装单个节点：校验输入、调用节点、写入记忆，并返回统一的 [`AgentResponse`]。
//! 输入不合法时直接返回校验错误；节点执行失败则包装成失败的 `AgentResponse`。

use async_trait::async_trait;
use phf::phf_map;

use crate::error::AppResult;
use crate::models::AgentResponse;
use crate::workflow::WorkflowContext;

pub mod classifier_agent;
pub mod formatter_agent;

pub use classifier_agent::ClassifierAgent;
pub use formatter_agent::FormatterAgent;

/// agent 种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Classifier,
    Formatter,
}

/// 格式化 agent 只接收这些键
const FORMATTER_INPUT_KEYS: &[&str] = &["query_text"];

static AGENTS_BY_NAME: phf::Map<&'static str, AgentKind> = phf_map! {
    "classifier" => AgentKind::Classifier,
    "formatter" => AgentKind::Formatter,
};

impl AgentKind {
    pub fn name(self) -> &'static str {
        match self {
            AgentKind::Classifier => "classifier",
            AgentKind::Formatter => "formatter",
        }
    }

    /// 从名称解析；未知名称返回 `None`
    pub fn from_name(name: &str) -> Option<Self> {
        AGENTS_BY_NAME.get(name).copied()
    }

    /// 调用时允许传入的上下文键；`None` 表示整个上下文
    pub fn input_keys(self) -> Option<&'static [&'static str]> {
        match self {
            AgentKind::Classifier => None,
            AgentKind::Formatter => Some(FORMATTER_INPUT_KEYS),
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// agent
#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    async fn run(&self, ctx: &WorkflowContext) -> AppResult<AgentResponse>;
}
