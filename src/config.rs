use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// LLM 提供方
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Groq（主 LLM）
    Groq,
    /// Google Gemini（次 LLM）
    Gemini,
}

impl std::str::FromStr for LlmProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(LlmProvider::Groq),
            "gemini" => Ok(LlmProvider::Gemini),
            _ => Err(()),
        }
    }
}

/// 存储后端
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// MongoDB
    Mongo,
    /// 进程内存（离线运行、测试）
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- Groq（主 LLM）---
    pub groq_api_key: String,
    pub groq_api_base_url: String,
    pub groq_model_name: String,
    pub groq_temperature: f32,
    // --- Gemini（次 LLM）---
    pub google_api_key: String,
    pub gemini_api_base_url: String,
    pub gemini_model_name: String,
    pub gemini_temperature: f32,
    /// 格式化节点使用的 LLM
    pub formatter_provider: LlmProvider,
    // --- 翻译 ---
    pub translate_api_base_url: String,
    // --- 存储 ---
    pub storage_backend: StorageBackend,
    pub mongo_uri: String,
    pub mongo_db_name: String,
    pub mongo_collection: String,
    // --- 邮件 ---
    pub sender_email: String,
    pub admin_email: String,
    // --- 运行 ---
    /// 提示词模板目录
    pub prompts_dir: String,
    /// 待处理的 RTI 提交文件目录
    pub input_folder: String,
    /// 处理失败的提交记录文件
    pub failure_log_file: String,
    /// 日志目录
    pub logs_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groq_api_key: String::new(),
            groq_api_base_url: "https://api.groq.com/openai/v1".to_string(),
            groq_model_name: "llama-3.1-70b-versatile".to_string(),
            groq_temperature: 0.3,
            google_api_key: String::new(),
            gemini_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai"
                .to_string(),
            gemini_model_name: "gemini-1.5-pro".to_string(),
            gemini_temperature: 0.4,
            formatter_provider: LlmProvider::Groq,
            translate_api_base_url: "https://translate.googleapis.com".to_string(),
            storage_backend: StorageBackend::Mongo,
            mongo_uri: "mongodb://localhost:27017/".to_string(),
            mongo_db_name: "rti_db".to_string(),
            mongo_collection: "rti_requests".to_string(),
            sender_email: "rti-system@example.com".to_string(),
            admin_email: "admin@example.com".to_string(),
            prompts_dir: "prompts".to_string(),
            input_folder: "submissions".to_string(),
            failure_log_file: "failed.txt".to_string(),
            logs_dir: "logs".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从 TOML 文件加载配置，未出现的字段取默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: origin.to_string(),
            source,
        })
    }

    /// 仅从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 加载配置：先读文件（如果给出），再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 把 `.env` 中的变量加载进进程环境，已设置的环境变量不会被覆盖
    ///
    /// 未给出路径时从当前目录向上查找 `.env`。返回实际加载的文件；没有文件时返回 `None`。
    pub fn load_dotenv(path: Option<&Path>) -> Option<PathBuf> {
        match path {
            Some(p) => dotenvy::from_path(p).ok().map(|_| p.to_path_buf()),
            None => dotenvy::dotenv().ok(),
        }
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let c = self;
        Ok(Self {
            groq_api_key: env_string("GROQ_API_KEY").unwrap_or(c.groq_api_key),
            groq_api_base_url: env_string("GROQ_API_BASE_URL").unwrap_or(c.groq_api_base_url),
            groq_model_name: env_string("GROQ_MODEL_NAME").unwrap_or(c.groq_model_name),
            groq_temperature: env_parsed("GROQ_TEMPERATURE", "f32")?.unwrap_or(c.groq_temperature),
            google_api_key: env_string("GOOGLE_API_KEY").unwrap_or(c.google_api_key),
            gemini_api_base_url: env_string("GEMINI_API_BASE_URL")
                .unwrap_or(c.gemini_api_base_url),
            gemini_model_name: env_string("GEMINI_MODEL_NAME").unwrap_or(c.gemini_model_name),
            gemini_temperature: env_parsed("GEMINI_TEMPERATURE", "f32")?
                .unwrap_or(c.gemini_temperature),
            formatter_provider: env_parsed("FORMATTER_PROVIDER", "groq|gemini")?
                .unwrap_or(c.formatter_provider),
            translate_api_base_url: env_string("TRANSLATE_API_BASE_URL")
                .unwrap_or(c.translate_api_base_url),
            storage_backend: env_parsed("STORAGE_BACKEND", "mongo|memory")?
                .unwrap_or(c.storage_backend),
            mongo_uri: env_string("MONGO_URI").unwrap_or(c.mongo_uri),
            mongo_db_name: env_string("MONGO_DB_NAME").unwrap_or(c.mongo_db_name),
            mongo_collection: env_string("MONGO_COLLECTION").unwrap_or(c.mongo_collection),
            sender_email: env_string("SENDER_EMAIL").unwrap_or(c.sender_email),
            admin_email: env_string("ADMIN_EMAIL").unwrap_or(c.admin_email),
            prompts_dir: env_string("PROMPTS_DIR").unwrap_or(c.prompts_dir),
            input_folder: env_string("INPUT_FOLDER").unwrap_or(c.input_folder),
            failure_log_file: env_string("FAILURE_LOG_FILE").unwrap_or(c.failure_log_file),
            logs_dir: env_string("LOGS_DIR").unwrap_or(c.logs_dir),
            verbose_logging: env_parsed("VERBOSE_LOGGING", "bool")?.unwrap_or(c.verbose_logging),
        })
    }

    /// 检查必需配置项
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.groq_api_key.trim().is_empty() {
            return Err(ConfigError::MissingValue {
                key: "GROQ_API_KEY".to_string(),
            });
        }
        if self.formatter_provider == LlmProvider::Gemini && self.google_api_key.trim().is_empty()
        {
            return Err(ConfigError::MissingValue {
                key: "GOOGLE_API_KEY".to_string(),
            });
        }
        Ok(())
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
