//! 文档存储 - 基础设施层
//!
//! RTI 请求记录的存取接口，以及进程内存实现。
//! MongoDB 实现见 [`crate::clients::mongo_client`]。

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{RequestStatus, RtiRequest};

/// RTI 请求存储后端
///
/// 所有错误都原样返回，由持久化服务统一处理。
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 写入一条记录，返回生成的文档 ID
    async fn insert(&self, request: &RtiRequest) -> Result<String, StoreError>;

    /// 按 ID 更新部分字段，返回修改条数
    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<u64, StoreError>;

    /// 按 ID 查找
    async fn find(&self, id: &str) -> Result<Option<RtiRequest>, StoreError>;

    /// 按状态查找
    async fn find_by_status(&self, status: RequestStatus) -> Result<Vec<RtiRequest>, StoreError>;

    /// 释放连接
    async fn close(&self) {}
}

/// 进程内存存储
///
/// ID 为 UUID 字符串；非 UUID 格式的 ID 视为格式错误。
#[derive(Default)]
pub struct InMemoryDocumentStore {
    records: RwLock<HashMap<Uuid, RtiRequest>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn parse_id(id: &str) -> Result<Uuid, StoreError> {
        Uuid::parse_str(id).map_err(|_| StoreError::InvalidId { id: id.to_string() })
    }
}

/// 把字段合并进记录：先转成 JSON，覆盖字段后再转回来
fn apply_fields(
    request: &RtiRequest,
    fields: Map<String, Value>,
) -> Result<RtiRequest, StoreError> {
    let mut value = serde_json::to_value(request).map_err(|e| StoreError::Conversion {
        message: e.to_string(),
    })?;

    if let Value::Object(ref mut map) = value {
        map.extend(fields);
    }

    serde_json::from_value(value).map_err(|e| StoreError::Conversion {
        message: e.to_string(),
    })
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, request: &RtiRequest) -> Result<String, StoreError> {
        let id = Uuid::new_v4();
        self.records.write().await.insert(id, request.clone());
        Ok(id.to_string())
    }

    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<u64, StoreError> {
        let id = Self::parse_id(id)?;
        let mut records = self.records.write().await;

        let Some(existing) = records.get(&id) else {
            return Ok(0);
        };

        let updated = apply_fields(existing, fields)?;
        records.insert(id, updated);
        Ok(1)
    }

    async fn find(&self, id: &str) -> Result<Option<RtiRequest>, StoreError> {
        let id = Self::parse_id(id)?;
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_status(&self, status: RequestStatus) -> Result<Vec<RtiRequest>, StoreError> {
        let records = self.records.read().await;
        let mut matched: Vec<RtiRequest> = records
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.created_at);
        Ok(matched)
    }
}
