//! 流程节点
//!
//! 每个节点接收当前上下文（只读），返回自己的结果表。
//! 结果中哪些键写回上下文由编排层按 [`Stage::result_keys`](crate::workflow::Stage::result_keys) 决定。

use async_trait::async_trait;

use crate::error::AppResult;
use crate::workflow::WorkflowContext;

pub mod classifier;
pub mod formatter;
pub mod info_fetcher;
pub mod tracker;

pub use classifier::{ClassifierNode, ClassifierOutput};
pub use formatter::FormatterNode;
pub use info_fetcher::InfoFetcherNode;
pub use tracker::TrackerNode;

/// 流程节点
#[async_trait]
pub trait Node: Send + Sync {
    /// 节点名称（用于日志和 agent 记忆的作用域）
    fn name(&self) -> &'static str;

    /// 执行节点
    async fn run(&self, ctx: &WorkflowContext) -> AppResult<WorkflowContext>;
}

/// 测试用的假客户端
#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::clients::{TextGenerator, Translator};
    use crate::error::{LlmError, TranslateError};

    /// 返回固定文本，并记录收到的用户提示词
    pub struct FakeLlm {
        reply: String,
        pub prompts: Mutex<Vec<String>>,
    }

    impl FakeLlm {
        pub fn new(reply: impl Into<String>) -> Self {
            Self {
                reply: reply.into(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }

        pub fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for FakeLlm {
        fn model_name(&self) -> &str {
            "fake-llm"
        }

        async fn generate(&self, _system: &str, user: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(user.to_string());
            Ok(self.reply.clone())
        }
    }

    /// 总是返回空内容的 LLM
    pub struct EmptyLlm;

    #[async_trait]
    impl TextGenerator for EmptyLlm {
        fn model_name(&self) -> &str {
            "empty-llm"
        }

        async fn generate(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent {
                model: "empty-llm".to_string(),
            })
        }
    }

    /// 固定的语言检测结果；非英语文本翻译成 `[en] 原文`
    pub struct FakeTranslator {
        pub detected: String,
    }

    impl FakeTranslator {
        pub fn english() -> Self {
            Self {
                detected: "en".to_string(),
            }
        }

        pub fn detecting(lang: &str) -> Self {
            Self {
                detected: lang.to_string(),
            }
        }
    }

    #[async_trait]
    impl Translator for FakeTranslator {
        async fn detect_language(&self, _text: &str) -> Result<String, TranslateError> {
            Ok(self.detected.clone())
        }

        async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
            Ok(format!("[{}] {}", target_lang, text))
        }
    }
}
