//! agent 记忆 - 业务能力层
//!
//! 按 agent 名称隔离的键值表，只在进程内保存，不参与流程数据流。

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use tracing::debug;

/// agent 记忆
#[derive(Debug, Default)]
pub struct AgentMemory {
    entries: Mutex<HashMap<(String, String), Value>>,
}

impl AgentMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存一条记忆（覆盖同名键）
    pub fn save(&self, agent: &str, key: &str, value: impl Into<Value>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert((agent.to_string(), key.to_string()), value.into());
        debug!("[{}] 已保存记忆: {}", agent, key);
    }

    /// 读取一条记忆
    pub fn load(&self, agent: &str, key: &str) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(&(agent.to_string(), key.to_string())).cloned()
    }

    /// 读取字符串记忆
    pub fn load_str(&self, agent: &str, key: &str) -> Option<String> {
        self.load(agent, key)
            .and_then(|v| v.as_str().map(str::to_string))
    }
}
