//! 流程编排器 - 编排层
//!
//! ## 职责
//!
//! - 按 [`Stage`] 注册节点、按 [`AgentKind`] 注册 agent
//! - 严格按 classifier → formatter → info_fetcher → tracker 的顺序执行
//! - 每个阶段结束后只把该阶段声明的键写回上下文
//! - 按名称调用单个 agent
//!
//! 任何阶段出错都会记录阶段名并原样返回，流程立即终止，不重试。

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::agents::{Agent, AgentKind, ClassifierAgent, FormatterAgent};
use crate::clients::{EmailClient, TextGenerator, Translator};
use crate::error::{AppResult, PromptError, WorkflowError};
use crate::models::AgentResponse;
use crate::services::{AgentMemory, PersistenceClient, PromptLoader};
use crate::workflow::{
    ClassifierNode, FormatterNode, InfoFetcherNode, Node, Stage, TrackerNode, WorkflowContext,
};

/// 默认流程所需的依赖
///
/// 所有客户端只创建一次，由调用方注入。
pub struct WorkflowDeps {
    /// 分类使用的 LLM
    pub classifier_llm: Arc<dyn TextGenerator>,
    /// 格式化使用的 LLM
    pub formatter_llm: Arc<dyn TextGenerator>,
    pub translator: Arc<dyn Translator>,
    pub prompts: PromptLoader,
    pub memory: Arc<AgentMemory>,
    pub persistence: Option<PersistenceClient>,
    pub email: Option<EmailClient>,
}

/// 流程编排器
#[derive(Default)]
pub struct GraphManager {
    nodes: HashMap<Stage, Arc<dyn Node>>,
    agents: HashMap<AgentKind, Arc<dyn Agent>>,
}

impl GraphManager {
    /// 创建空的编排器
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册四个默认节点和两个 agent
    pub fn with_defaults(deps: WorkflowDeps) -> Result<Self, PromptError> {
        let classifier: Arc<dyn Node> = Arc::new(ClassifierNode::new(
            deps.translator,
            deps.classifier_llm,
            deps.prompts.load(ClassifierNode::NAME)?,
            deps.memory.clone(),
        ));
        let formatter: Arc<dyn Node> = Arc::new(FormatterNode::new(
            deps.formatter_llm,
            deps.prompts.load(FormatterNode::NAME)?,
            deps.memory.clone(),
        ));

        let mut tracker = TrackerNode::new();
        if let Some(persistence) = deps.persistence {
            tracker = tracker.with_persistence(persistence);
        }
        if let Some(email) = deps.email {
            tracker = tracker.with_email(email);
        }

        let mut graph = Self::new();
        graph.add_node(Stage::Classifier, classifier.clone());
        graph.add_node(Stage::Formatter, formatter.clone());
        graph.add_node(Stage::InfoFetcher, Arc::new(InfoFetcherNode::new()));
        graph.add_node(Stage::Tracker, Arc::new(tracker));
        graph.add_agent(Arc::new(ClassifierAgent::new(
            classifier,
            deps.memory.clone(),
        )));
        graph.add_agent(Arc::new(FormatterAgent::new(formatter, deps.memory)));

        info!(
            "✅ 流程节点已注册: {}",
            Stage::PIPELINE
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(graph)
    }

    /// 注册（或替换）某阶段的节点
    pub fn add_node(&mut self, stage: Stage, node: Arc<dyn Node>) {
        info!("➕ 注册节点: {} ({})", stage, node.name());
        self.nodes.insert(stage, node);
    }

    pub fn get_node(&self, stage: Stage) -> Option<Arc<dyn Node>> {
        self.nodes.get(&stage).cloned()
    }

    /// 按名称取节点，未知名称返回 `None`
    pub fn get_node_by_name(&self, name: &str) -> Option<Arc<dyn Node>> {
        Stage::from_name(name).and_then(|stage| self.get_node(stage))
    }

    /// 注册（或替换）agent
    pub fn add_agent(&mut self, agent: Arc<dyn Agent>) {
        info!("➕ 注册 agent: {}", agent.kind());
        self.agents.insert(agent.kind(), agent);
    }

    pub fn get_agent(&self, kind: AgentKind) -> Option<Arc<dyn Agent>> {
        self.agents.get(&kind).cloned()
    }

    /// 执行完整流程
    ///
    /// 返回的上下文包含调用方的全部输入键，以及四个阶段声明的结果键。
    pub async fn run_workflow(&self, input: &WorkflowContext) -> AppResult<WorkflowContext> {
        info!("🚀 开始执行 RTI 流程: {}", input);

        let mut context = input.clone();

        for stage in Stage::PIPELINE {
            let node = self
                .get_node(stage)
                .ok_or_else(|| WorkflowError::NodeNotRegistered {
                    stage: stage.name().to_string(),
                })?;

            info!("🔹 执行阶段: {}", stage);

            let outcome = match stage {
                Stage::Formatter => node.run(&formatter_view(&context)).await,
                _ => node.run(&context).await,
            };

            let result = outcome.map_err(|e| {
                error!("❌ 阶段 {} 执行失败: {}", stage, e);
                e
            })?;

            context.merge_keys(&result, stage.result_keys());
        }

        info!(
            "✅ RTI 流程完成: {}",
            context.get_str("tracking_id").unwrap_or("-")
        );
        Ok(context)
    }

    /// 按名称调用 agent
    ///
    /// 格式化 agent 只会收到 `query_text`，其余 agent 收到完整上下文。
    pub async fn run_agent(&self, name: &str, ctx: &WorkflowContext) -> AppResult<AgentResponse> {
        let not_found = || WorkflowError::AgentNotFound {
            name: name.to_string(),
        };

        let kind = AgentKind::from_name(name).ok_or_else(not_found)?;
        let agent = self.get_agent(kind).ok_or_else(not_found)?;

        info!("🤖 调用 agent: {}", kind);
        match kind.input_keys() {
            Some(keys) => agent.run(&ctx.narrow(keys)).await,
            None => agent.run(ctx).await,
        }
    }
}

/// 格式化阶段看到的上下文：完整上下文加上 `query_text = formal_query`
fn formatter_view(context: &WorkflowContext) -> WorkflowContext {
    let formal_query = context.get("formal_query").cloned().unwrap_or(Value::Null);
    context.clone().with("query_text", formal_query)
}
