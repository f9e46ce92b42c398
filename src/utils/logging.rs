/// 日志工具模块
///
/// 初始化 tracing（控制台文本 + 滚动 JSON 文件），并提供日志格式化的辅助函数
use std::fs;

use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::error::FileError;

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "rti_system";
/// 保留的日志文件数量
const MAX_LOG_FILES: usize = 3;

/// 初始化日志
///
/// - 控制台：纯文本
/// - 文件：`{logs_dir}/rti_system.*.log`，每行一条 JSON，按天滚动
///
/// 过滤级别优先取 `RUST_LOG`，否则为 `info`（`verbose_logging` 时为 `debug`）。
///
/// # 返回
/// 返回文件写入线程的 guard，调用方需要在程序结束前一直持有
pub fn init(config: &Config) -> Result<WorkerGuard, FileError> {
    fs::create_dir_all(&config.logs_dir).map_err(|source| FileError::WriteFailed {
        path: config.logs_dir.clone(),
        source,
    })?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&config.logs_dir)
        .map_err(|e| FileError::WriteFailed {
            path: config.logs_dir.clone(),
            source: std::io::Error::other(e.to_string()),
        })?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer().with_target(false);
    let file_layer = fmt::layer()
        .json()
        .with_current_span(false)
        .with_writer(non_blocking);

    if tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        debug!("全局日志订阅者已存在，跳过初始化");
    }

    Ok(guard)
}

/// 初始化失败记录文件
///
/// # 参数
/// - `failure_log_path`: 失败记录文件路径
pub fn init_failure_log(failure_log_path: &str) -> Result<(), FileError> {
    let header = format!(
        "{}\nRTI 提交失败记录 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(failure_log_path, header).map_err(|source| FileError::WriteFailed {
        path: failure_log_path.to_string(),
        source,
    })
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - RTI 请求处理流程");
    info!(
        "🤖 LLM: {} | 格式化使用: {:?}",
        config.groq_model_name, config.formatter_provider
    );
    info!("🗄️ 存储后端: {:?}", config.storage_backend);
    info!("{}", "=".repeat(60));
}

/// 记录提交加载信息
///
/// # 参数
/// - `total`: 提交总数
pub fn log_submissions_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的 RTI 提交", total);
    info!("📋 将按顺序逐个处理\n");
}

/// 记录单个提交开始处理
///
/// # 参数
/// - `index`: 提交编号（从1开始）
/// - `total`: 提交总数
/// - `name`: 提交名称
pub fn log_submission_start(index: usize, total: usize, name: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📄 开始处理第 {}/{} 个提交: {}", index, total, name);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `failure_log_path`: 失败记录文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, failure_log_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    if failed > 0 {
        info!("\n失败记录已保存至: {}", failure_log_path);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("मला माहिती हवी आहे", 3), "मला...");
    }

    #[test]
    fn test_init_failure_log_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.txt");
        let path_str = path.to_string_lossy().to_string();

        init_failure_log(&path_str).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("RTI 提交失败记录"));
    }
}
