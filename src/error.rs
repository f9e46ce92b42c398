use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入校验错误
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 翻译服务错误
    #[error("翻译错误: {0}")]
    Translate(#[from] TranslateError),
    /// 存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 提示词模板错误
    #[error("提示词错误: {0}")]
    Prompt(#[from] PromptError),
    /// 流程编排错误
    #[error("流程错误: {0}")]
    Workflow(#[from] WorkflowError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 输入校验错误
///
/// 节点缺少必需输入，或记录不符合 RTI 请求结构时产生，不会触达任何外部服务。
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 缺少必需字段（或字段为空）
    #[error("缺少必需字段: {field}")]
    MissingField { field: String },
    /// 字段类型或取值不合法
    #[error("字段 {field} 不合法: {reason}")]
    InvalidField { field: String, reason: String },
    /// 记录无法按 RTI 请求结构解析
    #[error("记录不符合 RTI 请求结构: {source}")]
    Schema {
        #[source]
        source: serde_json::Error,
    },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 请求构建失败
    #[error("LLM 请求构建失败 (模型: {model}): {source}")]
    RequestBuildFailed {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 翻译服务错误
#[derive(Debug, Error)]
pub enum TranslateError {
    /// 网络请求失败
    #[error("翻译请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务返回非成功状态码
    #[error("翻译服务返回错误状态 ({endpoint}): {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 响应结构无法识别
    #[error("无法解析翻译响应: {reason}")]
    MalformedResponse { reason: String },
}

/// 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// MongoDB 驱动错误（连接失败、写冲突等）
    #[error("MongoDB 操作失败: {0}")]
    Mongo(#[from] mongodb::error::Error),
    /// 记录 ID 格式不正确
    #[error("记录ID格式不正确: {id}")]
    InvalidId { id: String },
    /// 文档与记录之间转换失败
    #[error("文档转换失败: {message}")]
    Conversion { message: String },
}

/// 提示词模板错误
#[derive(Debug, Error)]
pub enum PromptError {
    /// 模板不存在（既无文件也无内置模板）
    #[error("提示词模板不存在: {name}")]
    NotFound { name: String },
    /// 模板缺少 `{{query}}` 占位符
    #[error("提示词模板 {name} 缺少 {{query}} 占位符")]
    MissingPlaceholder { name: String },
    /// 读取模板文件失败
    #[error("读取提示词模板失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 流程编排错误
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// 阶段没有注册节点
    #[error("阶段 {stage} 未注册节点")]
    NodeNotRegistered { stage: String },
    /// 按名称找不到 agent
    #[error("找不到 agent: {name}")]
    AgentNotFound { name: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 必需配置项缺失
    #[error("必需配置项 {key} 未设置")]
    MissingValue { key: String },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建缺少字段的校验错误
    pub fn missing_field(field: impl Into<String>) -> Self {
        AppError::Validation(ValidationError::MissingField {
            field: field.into(),
        })
    }

    /// 创建字段不合法的校验错误
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation(ValidationError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// 是否为校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_is_validation() {
        let err = AppError::missing_field("query");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "校验错误: 缺少必需字段: query");
    }

    #[test]
    fn test_workflow_error_is_not_validation() {
        let err: AppError = WorkflowError::AgentNotFound {
            name: "nobody".to_string(),
        }
        .into();
        assert!(!err.is_validation());
        assert!(err.to_string().contains("nobody"));
    }
}
