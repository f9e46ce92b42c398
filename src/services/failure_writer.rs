//! 失败记录服务 - 业务能力层
//!
//! 只负责"写失败日志"能力，不关心流程

use std::fs::OpenOptions;
use std::io::Write;

use tracing::debug;

use crate::error::FileError;
use crate::utils::truncate_text;

/// 失败记录服务
///
/// 把处理失败的提交追加写入失败日志，一次一条。
pub struct FailureWriter {
    failure_file_path: String,
}

impl FailureWriter {
    pub fn new() -> Self {
        Self {
            failure_file_path: "failed.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            failure_file_path: path.into(),
        }
    }

    /// 追加一条失败记录
    ///
    /// # 参数
    /// - `submission`: 提交名称
    /// - `query`: 原始查询（截断后写入）
    /// - `reason`: 失败原因
    pub fn write(&self, submission: &str, query: &str, reason: &str) -> Result<(), FileError> {
        debug!("写入失败记录: {} | {}", submission, reason);

        let write_failed = |source| FileError::WriteFailed {
            path: self.failure_file_path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.failure_file_path)
            .map_err(write_failed)?;

        let line = format!(
            "[{}] 提交 {} | 查询: {} | 原因: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            submission,
            truncate_text(query, 60),
            reason
        );

        file.write_all(line.as_bytes()).map_err(write_failed)?;

        Ok(())
    }
}

impl Default for FailureWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.txt");
        let writer = FailureWriter::with_path(path.to_string_lossy());

        writer.write("village_a", "road repair", "LLM 不可用").unwrap();
        writer.write("village_b", "ration card", "翻译失败").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("village_a"));
        assert!(lines[1].contains("翻译失败"));
    }
}
