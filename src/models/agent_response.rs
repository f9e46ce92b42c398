use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// agent 的统一返回结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// 产生该结果的 agent 名称
    pub agent_name: String,
    /// 是否成功完成
    pub success: bool,
    /// 结果说明
    pub message: Option<String>,
    /// 结构化输出
    pub data: Option<Map<String, Value>>,
    /// 生成时间
    pub timestamp: DateTime<Utc>,
    /// 错误信息
    pub error: Option<String>,
}

impl AgentResponse {
    /// 成功结果
    pub fn success(
        agent_name: impl Into<String>,
        message: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            success: true,
            message: Some(message.into()),
            data: Some(data),
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// 读取 data 中的字符串字段
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}
