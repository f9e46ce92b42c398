//! 格式化节点
//!
//! 把 `query_text` 改写为正式的 RTI 申请信，LLM 输出原样返回。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::Node;
use crate::clients::TextGenerator;
use crate::error::{AppError, AppResult};
use crate::services::{AgentMemory, PromptTemplate};
use crate::workflow::WorkflowContext;

const SYSTEM_PROMPT: &str = "You are a legal drafting assistant who writes formal applications \
under India's Right to Information Act.";

/// 格式化节点
pub struct FormatterNode {
    llm: Arc<dyn TextGenerator>,
    prompt: PromptTemplate,
    memory: Arc<AgentMemory>,
}

impl FormatterNode {
    pub const NAME: &'static str = "formatter";

    pub fn new(
        llm: Arc<dyn TextGenerator>,
        prompt: PromptTemplate,
        memory: Arc<AgentMemory>,
    ) -> Self {
        Self {
            llm,
            prompt,
            memory,
        }
    }
}

/// 读取 `query_text`：缺失、为空或不是字符串都是校验错误
fn query_text(ctx: &WorkflowContext) -> AppResult<&str> {
    match ctx.get("query_text") {
        Some(Value::String(text)) if !text.is_empty() => Ok(text.as_str()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            Err(AppError::missing_field("query_text"))
        }
        Some(other) => Err(AppError::invalid_field(
            "query_text",
            format!("应为字符串，实际为 {}", other),
        )),
    }
}

#[async_trait]
impl Node for FormatterNode {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self, ctx: &WorkflowContext) -> AppResult<WorkflowContext> {
        let query_text = query_text(ctx)?;

        info!("[{}] 正在生成正式 RTI 申请 (模型: {})", Self::NAME, self.llm.model_name());

        let prompt = self.prompt.render(query_text);
        let formatted = self.llm.generate(SYSTEM_PROMPT, &prompt).await?;

        self.memory
            .save(Self::NAME, "last_formatted_query", formatted.as_str());
        info!("[{}] ✓ 正式 RTI 申请已生成", Self::NAME);

        Ok(WorkflowContext::new().with("formatted_query", formatted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::PromptLoader;
    use crate::workflow::nodes::test_support::FakeLlm;

    const LETTER: &str = "To,\nThe Public Information Officer,\nPublic Works Department\n\n1. Expenditure on road repair in 2023.";

    fn node(llm: Arc<FakeLlm>) -> (FormatterNode, Arc<AgentMemory>) {
        let memory = Arc::new(AgentMemory::new());
        let prompt = PromptLoader::new("/nonexistent").load("formatter").unwrap();
        (FormatterNode::new(llm, prompt, memory.clone()), memory)
    }

    #[tokio::test]
    async fn test_run_returns_llm_text_verbatim() {
        let llm = Arc::new(FakeLlm::new(LETTER));
        let (node, memory) = node(llm.clone());

        let ctx = WorkflowContext::new().with("query_text", "Road repair expenditure");
        let result = node.run(&ctx).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get_str("formatted_query"), Some(LETTER));
        assert!(llm.last_prompt().unwrap().contains("Road repair expenditure"));
        assert_eq!(
            memory
                .load_str(FormatterNode::NAME, "last_formatted_query")
                .as_deref(),
            Some(LETTER)
        );
    }

    #[tokio::test]
    async fn test_run_rejects_bad_query_text() {
        let llm = Arc::new(FakeLlm::new(LETTER));
        let (node, _) = node(llm.clone());

        for ctx in [
            WorkflowContext::new(),
            WorkflowContext::new().with("query_text", ""),
            WorkflowContext::new().with("query_text", Value::Null),
            WorkflowContext::new().with("query_text", serde_json::json!(["a", "b"])),
            WorkflowContext::new().with("query", "only the raw query"),
        ] {
            let err = node.run(&ctx).await.unwrap_err();
            assert!(err.is_validation(), "应为校验错误: {}", err);
        }
        assert_eq!(llm.call_count(), 0);
    }
}
