use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info};

use super::{Agent, AgentKind};
use crate::error::{AppError, AppResult};
use crate::models::AgentResponse;
use crate::services::AgentMemory;
use crate::workflow::{Node, WorkflowContext};

/// 格式化 agent
pub struct FormatterAgent {
    node: Arc<dyn Node>,
    memory: Arc<AgentMemory>,
}

impl FormatterAgent {
    pub const NAME: &'static str = "formatter_agent";

    pub fn new(node: Arc<dyn Node>, memory: Arc<AgentMemory>) -> Self {
        info!("🧩 {} 已创建", Self::NAME);
        Self { node, memory }
    }
}

#[async_trait]
impl Agent for FormatterAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Formatter
    }

    async fn run(&self, ctx: &WorkflowContext) -> AppResult<AgentResponse> {
        let query_text = match ctx.get("query_text") {
            Some(Value::String(text)) if !text.is_empty() => text.clone(),
            Some(Value::String(_)) | Some(Value::Null) | None => {
                return Err(AppError::missing_field("query_text"))
            }
            Some(_) => {
                return Err(AppError::invalid_field("query_text", "应为字符串"));
            }
        };

        info!("[{}] 正在格式化用户查询...", Self::NAME);

        let node_input = WorkflowContext::new().with("query_text", query_text);
        match self.node.run(&node_input).await {
            Ok(result) => {
                let formatted = result.get("formatted_query").cloned().unwrap_or(Value::Null);
                self.memory
                    .save(Self::NAME, "last_formatted_query", formatted);
                info!("[{}] ✓ 正式 RTI 申请已生成", Self::NAME);
                Ok(AgentResponse::success(
                    Self::NAME,
                    "正式 RTI 申请已生成",
                    result.into_map(),
                ))
            }
            Err(e) => {
                error!("[{}] ❌ 格式化失败: {}", Self::NAME, e);
                Err(e)
            }
        }
    }
}
