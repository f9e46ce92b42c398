//! 翻译客户端 - 基础设施层
//!
//! 检测文本语言，并在英语和印度各地方语言之间互译。

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::TranslateError;

/// 翻译能力
#[async_trait]
pub trait Translator: Send + Sync {
    /// 检测语言，返回 ISO 代码（如 `en`、`hi`、`mr`）
    async fn detect_language(&self, text: &str) -> Result<String, TranslateError>;

    /// 翻译到目标语言
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError>;

    /// 翻译成英语；已经是英语时原样返回
    async fn translate_to_english(&self, text: &str) -> Result<String, TranslateError> {
        if self.detect_language(text).await? == "en" {
            return Ok(text.to_string());
        }
        self.translate(text, "en").await
    }

    /// 从英语翻译到目标语言
    async fn translate_from_english(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<String, TranslateError> {
        if target_lang == "en" {
            return Ok(text.to_string());
        }
        self.translate(text, target_lang).await
    }
}

/// 一次翻译调用的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub text: String,
    /// 服务检测到的源语言
    pub source_lang: String,
}

/// 基于 Google Translate 网页端点的翻译客户端
pub struct GoogleTranslator {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleTranslator {
    const ENDPOINT: &'static str = "/translate_a/single";

    /// 创建翻译客户端
    pub fn new(base_url: impl Into<String>) -> Result<Self, TranslateError> {
        let base_url = base_url.into();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| TranslateError::RequestFailed {
                endpoint: base_url.clone(),
                source,
            })?;

        info!("✅ 翻译客户端已创建: {}", base_url);
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, TranslateError> {
        Self::new(config.translate_api_base_url.clone())
    }

    /// 调用一次翻译，同时拿到译文和检测到的源语言
    pub async fn translate_with_detection(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<Translation, TranslateError> {
        let endpoint = format!("{}{}", self.base_url, Self::ENDPOINT);
        debug!("调用翻译 API: 目标语言 {}", target_lang);

        let response = self
            .http
            .get(&endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|source| TranslateError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("翻译 API 返回错误状态: {}", status);
            return Err(TranslateError::BadStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|source| TranslateError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;

        parse_translation(&body)
    }
}

/// 解析端点返回的嵌套数组：
/// `[[["译文片段", "原文片段", ...], ...], null, "源语言", ...]`
fn parse_translation(body: &Value) -> Result<Translation, TranslateError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::MalformedResponse {
            reason: "缺少译文片段数组".to_string(),
        })?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    let source_lang = body
        .get(2)
        .and_then(Value::as_str)
        .ok_or_else(|| TranslateError::MalformedResponse {
            reason: "缺少源语言代码".to_string(),
        })?
        .to_string();

    Ok(Translation { text, source_lang })
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn detect_language(&self, text: &str) -> Result<String, TranslateError> {
        let lang = self.translate_with_detection(text, "en").await?.source_lang;
        info!("🌐 检测到语言: {}", lang);
        Ok(lang)
    }

    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        let translation = self.translate_with_detection(text, target_lang).await?;
        info!(
            "✅ 翻译完成: {} → {}",
            translation.source_lang, target_lang
        );
        Ok(translation.text)
    }

    /// 一次调用同时完成检测和翻译
    async fn translate_to_english(&self, text: &str) -> Result<String, TranslateError> {
        let translation = self.translate_with_detection(text, "en").await?;
        if translation.source_lang == "en" {
            debug!("文本已是英语，跳过翻译");
            return Ok(text.to_string());
        }
        info!("✅ 已从 {} 翻译为英语", translation.source_lang);
        Ok(translation.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_translation_joins_segments() {
        let body = json!([
            [
                ["I want information ", "मला माहिती ", null, null, 10],
                ["about the water project.", "जलसंपदा प्रकल्पाविषयी हवी आहे", null, null, 10]
            ],
            null,
            "mr"
        ]);

        let translation = parse_translation(&body).unwrap();
        assert_eq!(translation.text, "I want information about the water project.");
        assert_eq!(translation.source_lang, "mr");
    }

    #[test]
    fn test_parse_translation_rejects_unexpected_shape() {
        let err = parse_translation(&json!({"text": "hello"})).unwrap_err();
        assert!(matches!(err, TranslateError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_translate_to_english_keeps_english_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("tl", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                [["Road repair funds", "Road repair funds", null, null, 1]],
                null,
                "en"
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new(server.uri()).unwrap();
        let text = translator
            .translate_to_english("Road repair funds")
            .await
            .unwrap();

        assert_eq!(text, "Road repair funds");
    }

    #[tokio::test]
    async fn test_translate_to_english_from_hindi() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("sl", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                [["I want information about road repair", "मुझे सड़क मरम्मत के बारे में जानकारी चाहिए", null, null, 10]],
                null,
                "hi"
            ])))
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new(server.uri()).unwrap();

        assert_eq!(translator.detect_language("मुझे सड़क मरम्मत के बारे में जानकारी चाहिए").await.unwrap(), "hi");
        assert_eq!(
            translator
                .translate_to_english("मुझे सड़क मरम्मत के बारे में जानकारी चाहिए")
                .await
                .unwrap(),
            "I want information about road repair"
        );
    }

    #[tokio::test]
    async fn test_bad_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new(server.uri()).unwrap();
        let err = translator.translate("hello", "hi").await.unwrap_err();

        assert!(matches!(err, TranslateError::BadStatus { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_translate_from_english_to_english_is_noop() {
        let translator = GoogleTranslator::new("http://127.0.0.1:9").unwrap();
        let text = translator
            .translate_from_english("already english", "en")
            .await
            .unwrap();
        assert_eq!(text, "already english");
    }
}
