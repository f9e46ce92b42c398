//! 跟踪节点
//!
//! 分配跟踪号，状态固定为 `pending`。
//! 注入了持久化服务时写入 RTI 请求记录；注入了邮件客户端时发送受理回执。

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::Node;
use crate::clients::EmailClient;
use crate::error::AppResult;
use crate::models::{generate_tracking_id, RequestStatus};
use crate::services::PersistenceClient;
use crate::workflow::WorkflowContext;

/// 从上下文原样拷贝到请求记录的字段
const RECORD_FIELDS: &[&str] = &[
    "name",
    "gender",
    "address",
    "pincode",
    "country",
    "state",
    "district",
    "tehsil",
    "village",
    "location_type",
    "education_status",
    "phone_number",
    "email",
    "language",
    "formatted_query",
    "department",
];

/// 写入记录至少需要的个人信息
const REQUIRED_PERSONAL_FIELDS: &[&str] = &["name", "address", "email"];

/// 跟踪节点
#[derive(Default)]
pub struct TrackerNode {
    persistence: Option<PersistenceClient>,
    email: Option<EmailClient>,
}

impl TrackerNode {
    pub const NAME: &'static str = "tracker";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_persistence(mut self, persistence: PersistenceClient) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_email(mut self, email: EmailClient) -> Self {
        self.email = Some(email);
        self
    }

    async fn persist(&self, ctx: &WorkflowContext, tracking_id: &str) -> Option<String> {
        let persistence = self.persistence.as_ref()?;

        let missing: Vec<&str> = REQUIRED_PERSONAL_FIELDS
            .iter()
            .copied()
            .filter(|key| ctx.get_non_empty_str(key).is_none())
            .collect();
        if !missing.is_empty() {
            debug!(
                "[{}] 上下文缺少个人信息 {:?}，跳过写入",
                Self::NAME,
                missing
            );
            return None;
        }

        persistence
            .insert(&build_record(ctx, tracking_id))
            .await
    }

    async fn notify(&self, ctx: &WorkflowContext, tracking_id: &str) {
        let (Some(email_client), Some(recipient)) =
            (self.email.as_ref(), ctx.get_non_empty_str("email"))
        else {
            return;
        };

        let name = ctx.get_non_empty_str("name").unwrap_or("Citizen");
        email_client
            .send_acknowledgement(recipient, name, tracking_id)
            .await;
    }
}

/// 由上下文构造 RTI 请求记录
fn build_record(ctx: &WorkflowContext, tracking_id: &str) -> Map<String, Value> {
    let mut record = Map::new();

    for key in RECORD_FIELDS {
        if let Some(value) = ctx.get(key).filter(|v| !v.is_null()) {
            record.insert((*key).to_string(), value.clone());
        }
    }

    let raw_query = ctx
        .get_non_empty_str("raw_query")
        .or_else(|| ctx.get_non_empty_str("query"))
        .unwrap_or_default();
    record.insert("raw_query".to_string(), Value::from(raw_query));
    record.insert("tracking_id".to_string(), Value::from(tracking_id));
    record.insert(
        "status".to_string(),
        Value::from(RequestStatus::Pending.as_str()),
    );

    record
}

#[async_trait]
impl Node for TrackerNode {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self, ctx: &WorkflowContext) -> AppResult<WorkflowContext> {
        let tracking_id = generate_tracking_id();
        info!("[{}] 🏷️ 分配跟踪号: {}", Self::NAME, tracking_id);

        let mut result = WorkflowContext::new()
            .with("tracking_id", tracking_id.as_str())
            .with("status", RequestStatus::Pending.as_str());

        match self.persist(ctx, &tracking_id).await {
            Some(request_id) => result.insert("request_id", request_id),
            None if self.persistence.is_some() => {
                warn!("[{}] ⚠️ RTI 请求未写入存储 ({})", Self::NAME, tracking_id)
            }
            None => {}
        }

        self.notify(ctx, &tracking_id).await;

        Ok(result)
    }
}
