//! 信息获取节点
//!
//! 还没有接入任何信息源：总是返回 `info_available = false`、`info_data = null`。

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::Node;
use crate::error::AppResult;
use crate::workflow::WorkflowContext;

#[derive(Debug, Default)]
pub struct InfoFetcherNode;

impl InfoFetcherNode {
    pub const NAME: &'static str = "info_fetcher";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Node for InfoFetcherNode {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self, ctx: &WorkflowContext) -> AppResult<WorkflowContext> {
        let department = ctx.get_str("department").unwrap_or("-");
        info!("[{}] 部门 {} 暂无可用的公开信息", Self::NAME, department);

        Ok(WorkflowContext::new()
            .with("info_available", false)
            .with("info_data", Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_information_source() {
        let ctx = WorkflowContext::new().with("department", "Ministry of Coal");
        let result = tokio_test::block_on(InfoFetcherNode::new().run(&ctx)).unwrap();

        assert_eq!(result.get("info_available"), Some(&Value::Bool(false)));
        assert_eq!(result.get("info_data"), Some(&Value::Null));
    }
}
