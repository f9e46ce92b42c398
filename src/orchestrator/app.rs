//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建所有客户端（LLM、翻译、存储、邮件），只创建一次并注入流程
//! 2. **批量加载**：扫描输入目录中的所有 TOML 提交
//! 3. **顺序处理**：逐个执行流程，单个提交失败只记录，不影响后续提交
//! 4. **全局统计**：汇总成功/失败数量
//!
//! 单条查询模式见 [`App::process_query`]。

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::clients::{
    DocumentStore, EmailClient, EmailReceipt, GoogleTranslator, InMemoryDocumentStore, LlmClient,
    MongoStore,
};
use crate::config::{Config, StorageBackend};
use crate::models::{load_all_submissions, Submission};
use crate::orchestrator::graph_manager::{GraphManager, WorkflowDeps};
use crate::services::{AgentMemory, FailureWriter, PersistenceClient, PromptLoader};
use crate::utils::logging;
use crate::workflow::WorkflowContext;

/// 应用主结构
pub struct App {
    config: Config,
    graph: GraphManager,
    persistence: PersistenceClient,
    failure_writer: FailureWriter,
    email: EmailClient,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);
        config.validate().context("配置检查失败")?;

        let store = build_store(&config).await?;
        let persistence = PersistenceClient::new(store);

        let classifier_llm = Arc::new(LlmClient::groq(&config));
        let formatter_llm = Arc::new(LlmClient::for_provider(config.formatter_provider, &config));
        let translator =
            Arc::new(GoogleTranslator::from_config(&config).context("创建翻译客户端失败")?);

        let deps = WorkflowDeps {
            classifier_llm,
            formatter_llm,
            translator,
            prompts: PromptLoader::new(&config.prompts_dir),
            memory: Arc::new(AgentMemory::new()),
            persistence: Some(persistence.clone()),
            email: Some(EmailClient::from_config(&config)),
        };
        let graph = GraphManager::with_defaults(deps).context("加载提示词模板失败")?;

        Ok(Self::from_parts(config, graph, persistence))
    }

    /// 用已经组装好的流程创建应用
    pub fn from_parts(config: Config, graph: GraphManager, persistence: PersistenceClient) -> Self {
        let failure_writer = FailureWriter::with_path(config.failure_log_file.clone());
        let email = EmailClient::from_config(&config);
        Self {
            config,
            graph,
            persistence,
            failure_writer,
            email,
        }
    }

    pub fn graph(&self) -> &GraphManager {
        &self.graph
    }

    pub fn persistence(&self) -> &PersistenceClient {
        &self.persistence
    }

    /// 处理单条查询
    pub async fn process_query(&self, query: &str) -> Result<WorkflowContext> {
        let input = WorkflowContext::new().with("query", query);
        let result = self.graph.run_workflow(&input).await?;
        Ok(result)
    }

    /// 处理输入目录中的所有提交
    pub async fn run(&self) -> Result<ProcessingStats> {
        logging::init_failure_log(&self.config.failure_log_file)?;

        info!("\n📁 正在扫描待处理的 RTI 提交...");
        let submissions = load_all_submissions(&self.config.input_folder).await?;

        if submissions.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_submissions_loaded(submissions.len());

        let stats = self.process_all(&submissions).await;

        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.failure_log_file,
        );

        Ok(stats)
    }

    /// 顺序处理所有提交
    async fn process_all(&self, submissions: &[Submission]) -> ProcessingStats {
        let mut stats = ProcessingStats {
            total: submissions.len(),
            ..Default::default()
        };

        for (idx, submission) in submissions.iter().enumerate() {
            logging::log_submission_start(idx + 1, stats.total, &submission.name);

            match self.graph.run_workflow(&submission.context).await {
                Ok(result) => {
                    info!(
                        "[{}] ✅ 处理完成: 部门 {} | 跟踪号 {}",
                        submission.name,
                        result.get_str("department").unwrap_or("-"),
                        result.get_str("tracking_id").unwrap_or("-")
                    );
                    stats.success += 1;
                }
                Err(e) => {
                    error!("[{}] ❌ 处理过程中发生错误: {}", submission.name, e);
                    self.report_failure(submission, &e.to_string()).await;
                    stats.failed += 1;
                }
            }
        }

        stats
    }

    /// 记录失败的提交并通知管理员
    async fn report_failure(&self, submission: &Submission, reason: &str) -> EmailReceipt {
        let query = submission.context.get_str("query").unwrap_or_default();
        if let Err(write_err) = self.failure_writer.write(&submission.name, query, reason) {
            error!("写入失败记录失败: {}", write_err);
        }

        self.email
            .send_error_notification(&self.config.admin_email, &submission.name, reason)
            .await
    }

    /// 释放资源
    pub async fn shutdown(&self) {
        self.persistence.close().await;
        info!("👋 程序结束");
    }
}

async fn build_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    match config.storage_backend {
        StorageBackend::Mongo => {
            let store = MongoStore::from_config(config)
                .await
                .context("创建 MongoDB 客户端失败")?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            info!("🗄️ 使用内存存储，记录不会保存到磁盘");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}
