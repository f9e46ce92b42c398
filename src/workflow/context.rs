//! 流程上下文
//!
//! 在各节点之间传递的开放式键值表：调用方的输入加上每个阶段写回的结果。
//! 节点的返回值也用同一类型表示。

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::logging::truncate_text;

/// 流程上下文
///
/// 先前阶段写入的键对后续阶段保持可读，除非被显式覆盖。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowContext(Map<String, Value>);

impl WorkflowContext {
    /// 创建空上下文
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// 读取任意值
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 读取字符串值；键不存在或不是字符串时返回 `None`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// 读取非空字符串值
    pub fn get_non_empty_str(&self, key: &str) -> Option<&str> {
        self.get_str(key).filter(|s| !s.is_empty())
    }

    /// 写入（或覆盖）一个键
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// 链式写入
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 只保留给定的键，返回新的上下文（缺失的键不会补 null）
    pub fn narrow(&self, keys: &[&str]) -> Self {
        let mut narrowed = Map::new();
        for key in keys {
            if let Some(value) = self.0.get(*key) {
                narrowed.insert((*key).to_string(), value.clone());
            }
        }
        Self(narrowed)
    }

    /// 从阶段结果中拷贝固定的一组键；结果里缺失的键写入 null
    pub fn merge_keys(&mut self, result: &WorkflowContext, keys: &[&str]) {
        for key in keys {
            let value = result.get(key).cloned().unwrap_or(Value::Null);
            self.0.insert((*key).to_string(), value);
        }
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for WorkflowContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<WorkflowContext> for Value {
    fn from(ctx: WorkflowContext) -> Self {
        Value::Object(ctx.0)
    }
}

impl Display for WorkflowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let query = self
            .get_str("query")
            .or_else(|| self.get_str("query_text"))
            .unwrap_or("-");
        write!(
            f,
            "[RTI 查询: {} | 字段数#{}]",
            truncate_text(query, 40),
            self.len()
        )
    }
}
