//! RTI 请求记录
//!
//! 首次提交时创建；分类阶段写入部门，格式化阶段写入正式信函。

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ValidationError;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const TRACKING_ID_PATTERN: &str = r"^RTI-[0-9A-F]{8}$";

/// 请求状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// 待处理（创建时的状态）
    #[default]
    Pending,
    /// 已分类
    Classified,
    /// 已提交
    Submitted,
    /// 处理中
    InProgress,
    /// 已答复
    Resolved,
    /// 已驳回
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Classified => "classified",
            RequestStatus::Submitted => "submitted",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Resolved => "resolved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Rural,
    Urban,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EducationStatus {
    Literate,
    Illiterate,
}

/// RTI 请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtiRequest {
    // --- 个人信息 ---
    pub name: String,
    pub gender: Option<Gender>,
    pub address: String,
    pub pincode: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
    pub state: Option<String>,
    pub district: Option<String>,
    pub tehsil: Option<String>,
    pub village: Option<String>,
    pub location_type: Option<LocationType>,
    pub education_status: Option<EducationStatus>,
    pub phone_number: Option<String>,
    pub email: String,

    // --- 查询内容 ---
    /// 用户原始的非正式查询
    pub raw_query: String,
    /// LLM 生成的正式查询
    pub formatted_query: Option<String>,
    /// 查询语言代码
    pub language: Option<String>,

    // --- AI 处理结果 ---
    /// 预测的部门
    pub department: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,

    // --- 跟踪与审计 ---
    #[serde(default = "generate_tracking_id")]
    pub tracking_id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_country() -> String {
    "India".to_string()
}

/// 生成跟踪号：`RTI-` + 8 位大写十六进制
pub fn generate_tracking_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("RTI-{}", hex[..8].to_uppercase())
}

impl RtiRequest {
    /// 校验字段取值
    ///
    /// 结构层面（缺字段、枚举值不合法）的问题在反序列化时已经排除。
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("address", &self.address),
            ("email", &self.email),
            ("raw_query", &self.raw_query),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField {
                    field: field.to_string(),
                });
            }
        }

        let email_ok = Regex::new(EMAIL_PATTERN)
            .map(|re| re.is_match(&self.email))
            .unwrap_or(false);
        if !email_ok {
            return Err(ValidationError::InvalidField {
                field: "email".to_string(),
                reason: format!("'{}' 不是合法的邮箱地址", self.email),
            });
        }

        let tracking_ok = Regex::new(TRACKING_ID_PATTERN)
            .map(|re| re.is_match(&self.tracking_id))
            .unwrap_or(false);
        if !tracking_ok {
            return Err(ValidationError::InvalidField {
                field: "tracking_id".to_string(),
                reason: format!("'{}' 不符合 RTI-XXXXXXXX 格式", self.tracking_id),
            });
        }

        Ok(())
    }
}

/// 按 RTI 请求结构校验一条未定型的记录
pub fn validate_record(record: &Map<String, Value>) -> Result<RtiRequest, ValidationError> {
    let request: RtiRequest = serde_json::from_value(Value::Object(record.clone()))
        .map_err(|source| ValidationError::Schema { source })?;
    request.validate()?;
    Ok(request)
}
