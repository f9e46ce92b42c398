//! MongoDB 存储 - 基础设施层

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde_json::{Map, Value};
use tracing::info;

use super::document_store::DocumentStore;
use crate::config::Config;
use crate::error::StoreError;
use crate::models::{RequestStatus, RtiRequest};

/// 服务器选择和连接超时
const TIMEOUT: Duration = Duration::from_secs(5);

/// 在库中以 BSON 日期保存的时间字段
const DATE_FIELDS: [&str; 2] = ["created_at", "updated_at"];

/// 基于 MongoDB 的 RTI 请求存储
pub struct MongoStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoStore {
    /// 连接数据库
    ///
    /// 驱动是惰性连接的，这里只解析连接串并创建客户端。
    pub async fn connect(uri: &str, db_name: &str, collection: &str) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.server_selection_timeout = Some(TIMEOUT);
        options.connect_timeout = Some(TIMEOUT);
        options.retry_writes = Some(true);
        options.app_name = Some("rti-agent".to_string());

        let client = Client::with_options(options)?;
        let collection = client.database(db_name).collection::<Document>(collection);

        info!("✅ MongoDB 客户端已创建: {}/{}", db_name, collection.name());
        Ok(Self { client, collection })
    }

    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::connect(
            &config.mongo_uri,
            &config.mongo_db_name,
            &config.mongo_collection,
        )
        .await
    }

    fn parse_id(id: &str) -> Result<ObjectId, StoreError> {
        ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId { id: id.to_string() })
    }
}

fn to_document(request: &RtiRequest) -> Result<Document, StoreError> {
    let mut document = bson::to_document(request).map_err(|e| StoreError::Conversion {
        message: e.to_string(),
    })?;
    dates_to_bson(&mut document);
    Ok(document)
}

fn from_document(mut document: Document) -> Result<RtiRequest, StoreError> {
    document.remove("_id");
    dates_from_bson(&mut document)?;
    bson::from_document(document).map_err(|e| StoreError::Conversion {
        message: e.to_string(),
    })
}

fn fields_to_document(fields: Map<String, Value>) -> Result<Document, StoreError> {
    let mut document = Document::new();
    for (key, value) in fields {
        let value = bson::to_bson(&value).map_err(|e| StoreError::Conversion {
            message: e.to_string(),
        })?;
        document.insert(key, value);
    }
    dates_to_bson(&mut document);
    Ok(document)
}

/// RFC 3339 字符串转为 BSON 日期，便于在库中按时间查询
fn dates_to_bson(document: &mut Document) {
    for key in DATE_FIELDS {
        let parsed = match document.get(key) {
            Some(Bson::String(text)) => bson::DateTime::parse_rfc3339_str(text).ok(),
            _ => None,
        };
        if let Some(date) = parsed {
            document.insert(key, date);
        }
    }
}

fn dates_from_bson(document: &mut Document) -> Result<(), StoreError> {
    for key in DATE_FIELDS {
        let text = match document.get(key) {
            Some(Bson::DateTime(date)) => {
                date.try_to_rfc3339_string().map_err(|e| StoreError::Conversion {
                    message: e.to_string(),
                })?
            }
            _ => continue,
        };
        document.insert(key, text);
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, request: &RtiRequest) -> Result<String, StoreError> {
        let result = self
            .collection
            .insert_one(to_document(request)?, None)
            .await?;

        match result.inserted_id.as_object_id() {
            Some(oid) => Ok(oid.to_hex()),
            None => Ok(result.inserted_id.to_string()),
        }
    }

    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<u64, StoreError> {
        let oid = Self::parse_id(id)?;
        let update = doc! { "$set": fields_to_document(fields)? };

        let result = self
            .collection
            .update_one(doc! { "_id": oid }, update, None)
            .await?;
        Ok(result.modified_count)
    }

    async fn find(&self, id: &str) -> Result<Option<RtiRequest>, StoreError> {
        let oid = Self::parse_id(id)?;
        match self.collection.find_one(doc! { "_id": oid }, None).await? {
            Some(document) => Ok(Some(from_document(document)?)),
            None => Ok(None),
        }
    }

    async fn find_by_status(&self, status: RequestStatus) -> Result<Vec<RtiRequest>, StoreError> {
        let cursor = self
            .collection
            .find(doc! { "status": status.as_str() }, None)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        documents.into_iter().map(from_document).collect()
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        info!("🔌 MongoDB 连接已关闭");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_malformed_object_id() {
        let err = MongoStore::parse_id("12345").unwrap_err();
        assert!(matches!(err, StoreError::InvalidId { ref id } if id == "12345"));
    }

    #[test]
    fn test_fields_to_document() {
        let mut fields = Map::new();
        fields.insert("department".to_string(), json!("Ministry of Education"));
        fields.insert("updated_at".to_string(), json!("2024-05-01T10:00:00Z"));

        let document = fields_to_document(fields).unwrap();
        assert_eq!(
            document.get_str("department").unwrap(),
            "Ministry of Education"
        );
        assert_eq!(
            document.get_datetime("updated_at").unwrap().timestamp_millis(),
            1_714_557_600_000
        );
    }

    #[test]
    fn test_timestamps_stored_as_bson_dates() {
        let record = json!({
            "name": "Sunita Devi",
            "address": "Ward 4, Rampur",
            "email": "sunita@example.com",
            "raw_query": "road repair funds",
        });
        let request = crate::models::validate_record(record.as_object().unwrap()).unwrap();

        let document = to_document(&request).unwrap();
        assert_eq!(
            document.get_datetime("created_at").unwrap().timestamp_millis(),
            request.created_at.timestamp_millis()
        );

        let restored = from_document(document).unwrap();
        assert_eq!(restored.tracking_id, request.tracking_id);
        assert_eq!(
            restored.created_at.timestamp_millis(),
            request.created_at.timestamp_millis()
        );
        assert!(restored.updated_at.is_none());
    }

    /// 需要本地 MongoDB
    ///
    /// ```bash
    /// cargo test test_mongo_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_mongo_live() {
        let store = MongoStore::connect("mongodb://localhost:27017/", "rti_db_test", "rti_requests")
            .await
            .unwrap();

        let record = json!({
            "name": "Live Test",
            "address": "Test Road",
            "email": "live@example.com",
            "raw_query": "live query",
        });
        let request = crate::models::validate_record(record.as_object().unwrap()).unwrap();

        let id = store.insert(&request).await.unwrap();
        let found = store.find(&id).await.unwrap().unwrap();
        assert_eq!(found.tracking_id, request.tracking_id);

        store.close().await;
    }
}
