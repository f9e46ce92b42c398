//! 分类节点
//!
//! 流程：
//! 1. 把查询翻译成英语（已是英语时不变）
//! 2. 用分类模板调用主 LLM
//! 3. 解析出部门和正式查询（解析不了就走兜底分支）

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::Node;
use crate::clients::{TextGenerator, Translator};
use crate::error::{AppError, AppResult};
use crate::services::{AgentMemory, PromptTemplate};
use crate::utils::truncate_text;
use crate::workflow::WorkflowContext;

const SYSTEM_PROMPT: &str = "You are an expert on Indian government administration. \
You classify Right to Information queries and always answer with valid JSON.";

/// 部门未知时使用的值
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

const FENCED_JSON_PATTERN: &str = r"(?s)```(?:json)?\s*(\{.*?\})\s*```";

/// 分类 LLM 输出的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierOutput {
    /// 输出是 JSON 对象
    Structured {
        department: String,
        formal_query: String,
    },
    /// 输出无法解析，使用默认值
    Fallback,
}

impl ClassifierOutput {
    /// 解析 LLM 原始输出
    ///
    /// 接受裸 JSON 对象或 Markdown 代码块里的 JSON 对象。
    /// 缺少 `department` 时取 `Unknown`，缺少 `formal_query` 时取翻译后的查询。
    pub fn parse(raw: &str, translated_query: &str) -> Self {
        let Some(object) = extract_json_object(raw) else {
            return ClassifierOutput::Fallback;
        };

        // 空串和纯空白与缺失同样处理，部门不会落库为空
        let field = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        ClassifierOutput::Structured {
            department: field("department").unwrap_or_else(|| UNKNOWN_DEPARTMENT.to_string()),
            formal_query: field("formal_query").unwrap_or_else(|| translated_query.to_string()),
        }
    }

    /// 展开为 (部门, 正式查询)
    pub fn resolve(self, translated_query: &str) -> (String, String) {
        match self {
            ClassifierOutput::Structured {
                department,
                formal_query,
            } => (department, formal_query),
            ClassifierOutput::Fallback => (
                UNKNOWN_DEPARTMENT.to_string(),
                translated_query.to_string(),
            ),
        }
    }
}

fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    let raw = raw.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        return Some(map);
    }

    let fenced = Regex::new(FENCED_JSON_PATTERN)
        .ok()?
        .captures(raw)?
        .get(1)?
        .as_str();

    match serde_json::from_str::<Value>(fenced) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// 分类节点
pub struct ClassifierNode {
    translator: Arc<dyn Translator>,
    llm: Arc<dyn TextGenerator>,
    prompt: PromptTemplate,
    memory: Arc<AgentMemory>,
}

impl ClassifierNode {
    pub const NAME: &'static str = "classifier";

    pub fn new(
        translator: Arc<dyn Translator>,
        llm: Arc<dyn TextGenerator>,
        prompt: PromptTemplate,
        memory: Arc<AgentMemory>,
    ) -> Self {
        Self {
            translator,
            llm,
            prompt,
            memory,
        }
    }
}

#[async_trait]
impl Node for ClassifierNode {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self, ctx: &WorkflowContext) -> AppResult<WorkflowContext> {
        let query = ctx
            .get_non_empty_str("query")
            .ok_or_else(|| AppError::missing_field("query"))?;

        info!("[{}] 原始查询: {}", Self::NAME, truncate_text(query, 80));

        // 步骤 1: 翻译
        let translated_query = self.translator.translate_to_english(query).await?;

        // 步骤 2: 调用 LLM
        let prompt = self.prompt.render(&translated_query);
        let raw_output = self.llm.generate(SYSTEM_PROMPT, &prompt).await?;
        info!(
            "[{}] LLM 响应: {}",
            Self::NAME,
            truncate_text(&raw_output, 120)
        );

        // 步骤 3: 解析
        let output = ClassifierOutput::parse(&raw_output, &translated_query);
        if output == ClassifierOutput::Fallback {
            warn!("[{}] ⚠️ 无法解析 LLM 输出为 JSON，使用默认值", Self::NAME);
        }
        let (department, formal_query) = output.resolve(&translated_query);

        self.memory.save(Self::NAME, "last_query", query);
        self.memory
            .save(Self::NAME, "last_formal_query", formal_query.as_str());
        self.memory
            .save(Self::NAME, "last_department", department.as_str());

        info!("[{}] ✓ 分类结果: {}", Self::NAME, department);

        Ok(WorkflowContext::new()
            .with("raw_query", query)
            .with("translated_query", translated_query)
            .with("formal_query", formal_query)
            .with("department", department))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::PromptLoader;
    use crate::workflow::nodes::test_support::{EmptyLlm, FakeLlm, FakeTranslator};

    fn node(translator: FakeTranslator, llm: Arc<dyn TextGenerator>) -> (ClassifierNode, Arc<AgentMemory>) {
        let memory = Arc::new(AgentMemory::new());
        let prompt = PromptLoader::new("/nonexistent").load("classifier").unwrap();
        (
            ClassifierNode::new(Arc::new(translator), llm, prompt, memory.clone()),
            memory,
        )
    }

    #[test]
    fn test_parse_plain_json() {
        let output = ClassifierOutput::parse(
            r#"{"department": "Ministry of Railways", "formal_query": "Provide the train delay records."}"#,
            "train delays",
        );
        assert_eq!(
            output,
            ClassifierOutput::Structured {
                department: "Ministry of Railways".to_string(),
                formal_query: "Provide the train delay records.".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_fenced_json_with_missing_keys() {
        let raw = "Here is the answer:\n```json\n{\"department\": \"Ministry of Health\"}\n```";
        let (department, formal_query) =
            ClassifierOutput::parse(raw, "hospital staff list").resolve("hospital staff list");

        assert_eq!(department, "Ministry of Health");
        assert_eq!(formal_query, "hospital staff list");
    }

    #[test]
    fn test_parse_blank_department_is_unknown() {
        let raw = r#"{"department": "   ", "formal_query": ""}"#;
        let (department, formal_query) =
            ClassifierOutput::parse(raw, "ration card status").resolve("ration card status");

        assert_eq!(department, UNKNOWN_DEPARTMENT);
        assert_eq!(formal_query, "ration card status");
    }

    #[test]
    fn test_parse_non_json_falls_back() {
        let output = ClassifierOutput::parse("This looks like a railway query.", "x");
        assert_eq!(output, ClassifierOutput::Fallback);
        assert_eq!(
            output.resolve("x"),
            (UNKNOWN_DEPARTMENT.to_string(), "x".to_string())
        );

        assert_eq!(ClassifierOutput::parse("[1, 2, 3]", "x"), ClassifierOutput::Fallback);
    }

    #[tokio::test]
    async fn test_run_returns_all_keys_and_saves_memory() {
        let llm = Arc::new(FakeLlm::new(
            r#"{"department": "Public Works Department", "formal_query": "Please provide road repair expenditure."}"#,
        ));
        let (node, memory) = node(FakeTranslator::english(), llm.clone());

        let ctx = WorkflowContext::new().with("query", "road repair money in my village");
        let result = node.run(&ctx).await.unwrap();

        assert_eq!(result.get_str("raw_query"), Some("road repair money in my village"));
        assert_eq!(result.get_str("translated_query"), Some("road repair money in my village"));
        assert_eq!(result.get_str("department"), Some("Public Works Department"));
        assert_eq!(
            result.get_str("formal_query"),
            Some("Please provide road repair expenditure.")
        );
        assert!(llm
            .last_prompt()
            .unwrap()
            .contains("road repair money in my village"));
        assert_eq!(
            memory.load_str(ClassifierNode::NAME, "last_department").as_deref(),
            Some("Public Works Department")
        );
    }

    #[tokio::test]
    async fn test_run_translates_before_prompting() {
        let llm = Arc::new(FakeLlm::new("not json at all"));
        let (node, _) = node(FakeTranslator::detecting("hi"), llm.clone());

        let ctx = WorkflowContext::new().with("query", "सड़क मरम्मत");
        let result = node.run(&ctx).await.unwrap();

        assert_eq!(result.get_str("translated_query"), Some("[en] सड़क मरम्मत"));
        assert_eq!(result.get_str("formal_query"), Some("[en] सड़क मरम्मत"));
        assert_eq!(result.get_str("department"), Some(UNKNOWN_DEPARTMENT));
        assert!(llm.last_prompt().unwrap().contains("[en] सड़क मरम्मत"));
    }

    #[tokio::test]
    async fn test_run_requires_query() {
        let llm = Arc::new(FakeLlm::new("{}"));
        let (node, _) = node(FakeTranslator::english(), llm.clone());

        for ctx in [
            WorkflowContext::new(),
            WorkflowContext::new().with("query", ""),
            WorkflowContext::new().with("query", 7),
        ] {
            let err = node.run(&ctx).await.unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let (node, _) = node(FakeTranslator::english(), Arc::new(EmptyLlm));

        let err = node
            .run(&WorkflowContext::new().with("query", "pension status"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
