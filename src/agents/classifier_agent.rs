use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info};

use super::{Agent, AgentKind};
use crate::error::{AppError, AppResult};
use crate::models::AgentResponse;
use crate::services::AgentMemory;
use crate::workflow::{Node, WorkflowContext};

/// 分类 agent
pub struct ClassifierAgent {
    node: Arc<dyn Node>,
    memory: Arc<AgentMemory>,
}

impl ClassifierAgent {
    pub const NAME: &'static str = "classifier_agent";

    pub fn new(node: Arc<dyn Node>, memory: Arc<AgentMemory>) -> Self {
        info!("🧩 {} 已创建", Self::NAME);
        Self { node, memory }
    }
}

#[async_trait]
impl Agent for ClassifierAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Classifier
    }

    async fn run(&self, ctx: &WorkflowContext) -> AppResult<AgentResponse> {
        if ctx.get_non_empty_str("query").is_none() {
            return Err(AppError::missing_field("query"));
        }

        info!(
            "[{}] 开始分类，提交人: {}",
            Self::NAME,
            ctx.get_str("name").unwrap_or("-")
        );

        match self.node.run(ctx).await {
            Ok(result) => {
                self.memory.save(
                    Self::NAME,
                    "last_classification",
                    Value::from(result.clone()),
                );
                info!(
                    "[{}] ✓ 分类完成: {}",
                    Self::NAME,
                    result.get_str("department").unwrap_or("-")
                );
                Ok(AgentResponse::success(
                    Self::NAME,
                    "分类完成",
                    result.into_map(),
                ))
            }
            Err(e) => {
                error!("[{}] ❌ 分类失败: {}", Self::NAME, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::TextGenerator;
    use crate::services::PromptLoader;
    use crate::workflow::nodes::test_support::{EmptyLlm, FakeLlm, FakeTranslator};
    use crate::workflow::ClassifierNode;

    fn agent(llm: Arc<dyn TextGenerator>) -> (ClassifierAgent, Arc<AgentMemory>) {
        let memory = Arc::new(AgentMemory::new());
        let node = ClassifierNode::new(
            Arc::new(FakeTranslator::english()),
            llm,
            PromptLoader::new("/nonexistent").load("classifier").unwrap(),
            memory.clone(),
        );
        (ClassifierAgent::new(Arc::new(node), memory.clone()), memory)
    }

    #[tokio::test]
    async fn test_success_response_and_memory() {
        let (agent, memory) = agent(Arc::new(FakeLlm::new(
            r#"{"department": "Ministry of Education", "formal_query": "Provide the school teacher vacancy list."}"#,
        )));

        let ctx = WorkflowContext::new()
            .with("name", "Asha")
            .with("query", "teacher vacancies in our school");
        let response = agent.run(&ctx).await.unwrap();

        assert!(response.success);
        assert_eq!(response.agent_name, ClassifierAgent::NAME);
        assert_eq!(response.data_str("department"), Some("Ministry of Education"));

        let saved = memory
            .load(ClassifierAgent::NAME, "last_classification")
            .unwrap();
        assert_eq!(saved["department"], "Ministry of Education");
    }

    #[tokio::test]
    async fn test_missing_query_is_validation_error() {
        let (agent, _) = agent(Arc::new(FakeLlm::new("{}")));
        let err = agent.run(&WorkflowContext::new()).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let (agent, memory) = agent(Arc::new(EmptyLlm));

        let err = agent
            .run(&WorkflowContext::new().with("query", "pension arrears"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Llm(_)));
        assert!(err.to_string().contains("empty-llm"));
        assert!(memory
            .load(ClassifierAgent::NAME, "last_classification")
            .is_none());
    }
}
