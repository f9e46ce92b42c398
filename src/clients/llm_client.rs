//! LLM 客户端 - 基础设施层
//!
//! 只负责"把 (system, user) 消息对发给模型并拿回文本"这一能力
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - Groq 和 Gemini 都通过各自兼容 OpenAI 的端点访问
//! - 模型名和温度在创建客户端时固定

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{Config, LlmProvider};
use crate::error::LlmError;

/// 文本生成能力
///
/// 节点只依赖这个 trait，测试时可以替换成假实现。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 模型名称（用于日志）
    fn model_name(&self) -> &str;

    /// 根据系统提示词和用户提示词生成文本
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    provider: LlmProvider,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    /// 创建自定义配置的 LLM 客户端
    pub fn new(
        provider: LlmProvider,
        api_key: &str,
        api_base_url: &str,
        model_name: impl Into<String>,
        temperature: f32,
    ) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base_url);

        let model_name = model_name.into();
        info!(
            "✅ LLM 客户端已创建: {:?} / {} (temperature={})",
            provider, model_name, temperature
        );

        Self {
            client: Client::with_config(openai_config),
            provider,
            model_name,
            temperature,
            max_tokens: 2048,
        }
    }

    /// 主 LLM（Groq）
    pub fn groq(config: &Config) -> Self {
        Self::new(
            LlmProvider::Groq,
            &config.groq_api_key,
            &config.groq_api_base_url,
            config.groq_model_name.clone(),
            config.groq_temperature,
        )
    }

    /// 次 LLM（Gemini）
    pub fn gemini(config: &Config) -> Self {
        Self::new(
            LlmProvider::Gemini,
            &config.google_api_key,
            &config.gemini_api_base_url,
            config.gemini_model_name.clone(),
            config.gemini_temperature,
        )
    }

    /// 按提供方创建
    pub fn for_provider(provider: LlmProvider, config: &Config) -> Self {
        match provider {
            LlmProvider::Groq => Self::groq(config),
            LlmProvider::Gemini => Self::gemini(config),
        }
    }

    fn build_error(&self, source: async_openai::error::OpenAIError) -> LlmError {
        LlmError::RequestBuildFailed {
            model: self.model_name.clone(),
            source,
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_prompt.len());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| self.build_error(e))?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_prompt)
            .build()
            .map_err(|e| self.build_error(e))?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| self.build_error(e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::ApiCallFailed {
                model: self.model_name.clone(),
                source: e,
            }
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        info!("🤖 {:?} 响应生成成功", self.provider);
        Ok(content)
    }
}
