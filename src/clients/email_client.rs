//! 邮件客户端 - 基础设施层
//!
//! 目前只有模拟模式：记录日志并返回回执，不连接任何 SMTP 服务。

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::utils::truncate_text;

/// 发送回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailReceipt {
    /// 发送状态，模拟模式下固定为 `simulated`
    pub status: String,
    pub recipient: String,
    pub subject: String,
}

/// 模拟邮件客户端
#[derive(Debug, Clone)]
pub struct EmailClient {
    sender: String,
}

impl EmailClient {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sender_email.clone())
    }

    /// 发送邮件（模拟）
    pub async fn send_email(&self, recipient: &str, subject: &str, body: &str) -> EmailReceipt {
        info!("📧 [模拟] {} → {}", self.sender, recipient);
        info!("📧 主题: {}", subject);
        info!("📧 正文: {}", truncate_text(body, 80));

        EmailReceipt {
            status: "simulated".to_string(),
            recipient: recipient.to_string(),
            subject: subject.to_string(),
        }
    }

    /// 发送 RTI 受理回执
    pub async fn send_acknowledgement(
        &self,
        recipient: &str,
        name: &str,
        tracking_id: &str,
    ) -> EmailReceipt {
        let subject = format!("RTI 请求已受理: {}", tracking_id);
        let body = format!(
            "Dear {},\n\nYour RTI request has been received.\nTracking ID: {}\n\nYou can use this ID to check the status of your request.",
            name, tracking_id
        );
        self.send_email(recipient, &subject, &body).await
    }

    /// 通知管理员某个提交处理失败
    pub async fn send_error_notification(
        &self,
        admin: &str,
        submission: &str,
        error: &str,
    ) -> EmailReceipt {
        let subject = format!("RTI 处理失败: {}", submission);
        let body = format!(
            "Processing of RTI submission '{}' failed.\n\nError: {}",
            submission, error
        );
        self.send_email(admin, &subject, &body).await
    }
}
