//! 持久化服务 - 业务能力层
//!
//! 先按 RTI 请求结构校验，再写入存储后端。
//! 所有错误都在这里记录并吞掉：写入失败返回 `None`，更新失败返回 0，查询失败返回空。

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::clients::DocumentStore;
use crate::models::{validate_record, RequestStatus, RtiRequest};

/// 持久化服务
#[derive(Clone)]
pub struct PersistenceClient {
    store: Arc<dyn DocumentStore>,
}

impl PersistenceClient {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// 校验并写入一条未定型的记录，返回文档 ID
    ///
    /// 校验失败时不会触达存储后端。
    pub async fn insert(&self, record: &Map<String, Value>) -> Option<String> {
        match validate_record(record) {
            Ok(request) => self.insert_request(&request).await,
            Err(e) => {
                error!("❌ RTI 请求校验失败，未写入: {}", e);
                None
            }
        }
    }

    /// 校验并写入一条已定型的记录
    pub async fn insert_request(&self, request: &RtiRequest) -> Option<String> {
        if let Err(e) = request.validate() {
            error!("❌ RTI 请求校验失败，未写入: {}", e);
            return None;
        }

        match self.store.insert(request).await {
            Ok(id) => {
                info!("💾 已写入 RTI 请求: {} ({})", id, request.tracking_id);
                Some(id)
            }
            Err(e) => {
                error!("❌ 写入 RTI 请求失败: {}", e);
                None
            }
        }
    }

    /// 更新单个字段，同时刷新 `updated_at`，返回修改条数
    pub async fn update(&self, id: &str, field: &str, value: impl Into<Value>) -> u64 {
        let mut fields = Map::new();
        fields.insert(field.to_string(), value.into());
        fields.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));

        match self.store.update(id, fields).await {
            Ok(count) => {
                info!("💾 已更新 {} 的 {} 字段，修改 {} 条", id, field, count);
                count
            }
            Err(e) => {
                error!("❌ 更新 {} 的 {} 字段失败: {}", id, field, e);
                0
            }
        }
    }

    pub async fn update_formatted_query(&self, id: &str, formatted_query: &str) -> u64 {
        self.update(id, "formatted_query", formatted_query).await
    }

    pub async fn update_department(&self, id: &str, department: &str) -> u64 {
        self.update(id, "department", department).await
    }

    /// 按 ID 读取
    pub async fn get(&self, id: &str) -> Option<RtiRequest> {
        match self.store.find(id).await {
            Ok(Some(request)) => {
                info!("📄 已读取 RTI 请求: {}", id);
                Some(request)
            }
            Ok(None) => {
                warn!("⚠️ 未找到 RTI 请求: {}", id);
                None
            }
            Err(e) => {
                error!("❌ 读取 RTI 请求 {} 失败: {}", id, e);
                None
            }
        }
    }

    /// 所有待处理的请求
    pub async fn pending_requests(&self) -> Vec<RtiRequest> {
        match self.store.find_by_status(RequestStatus::Pending).await {
            Ok(requests) => {
                info!("📋 共有 {} 个待处理的 RTI 请求", requests.len());
                requests
            }
            Err(e) => {
                error!("❌ 查询待处理的 RTI 请求失败: {}", e);
                Vec::new()
            }
        }
    }

    /// 释放后端连接
    pub async fn close(&self) {
        self.store.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::InMemoryDocumentStore;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 只计数、不存储的后端
    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        async fn insert(&self, _request: &RtiRequest) -> Result<String, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("counted".to_string())
        }

        async fn update(&self, _id: &str, _fields: Map<String, Value>) -> Result<u64, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        }

        async fn find(&self, _id: &str) -> Result<Option<RtiRequest>, StoreError> {
            Err(StoreError::Conversion {
                message: "broken document".to_string(),
            })
        }

        async fn find_by_status(
            &self,
            _status: RequestStatus,
        ) -> Result<Vec<RtiRequest>, StoreError> {
            Err(StoreError::Conversion {
                message: "broken cursor".to_string(),
            })
        }
    }

    fn record() -> Map<String, Value> {
        json!({
            "name": "Meena Sharma",
            "address": "12 Civil Lines, Jaipur",
            "email": "meena@example.com",
            "raw_query": "How much was spent on the new bus stand?",
            "language": "hi",
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[tokio::test]
    async fn test_invalid_record_never_reaches_store() {
        let store = Arc::new(CountingStore::default());
        let client = PersistenceClient::new(store.clone());

        let mut missing_name = record();
        missing_name.remove("name");

        assert_eq!(client.insert(&missing_name).await, None);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);

        assert_eq!(client.insert(&record()).await.as_deref(), Some("counted"));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backend_errors_are_swallowed() {
        let client = PersistenceClient::new(Arc::new(CountingStore::default()));

        assert!(client.get("anything").await.is_none());
        assert!(client.pending_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_refreshes_updated_at() {
        let client = PersistenceClient::new(Arc::new(InMemoryDocumentStore::new()));
        let id = client.insert(&record()).await.unwrap();

        assert!(client.get(&id).await.unwrap().updated_at.is_none());

        assert_eq!(
            client
                .update_department(&id, "Ministry of Road Transport and Highways")
                .await,
            1
        );
        assert_eq!(
            client
                .update_formatted_query(&id, "To the PIO, ...")
                .await,
            1
        );

        let stored = client.get(&id).await.unwrap();
        assert_eq!(
            stored.department.as_deref(),
            Some("Ministry of Road Transport and Highways")
        );
        assert_eq!(stored.formatted_query.as_deref(), Some("To the PIO, ..."));
        assert!(stored.updated_at.is_some());
        assert_eq!(client.pending_requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_id_returns_zero() {
        let client = PersistenceClient::new(Arc::new(InMemoryDocumentStore::new()));

        assert_eq!(client.update_department("bad-id", "X").await, 0);
        assert!(client.get("bad-id").await.is_none());
    }
}
