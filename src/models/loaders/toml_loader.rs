use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::fs;

use crate::error::FileError;
use crate::workflow::WorkflowContext;

/// 一个待处理的 RTI 提交
#[derive(Debug, Clone)]
pub struct Submission {
    /// 文件名（不含扩展名）
    pub name: String,
    /// 文件路径
    pub path: PathBuf,
    /// 作为流程初始输入的上下文
    pub context: WorkflowContext,
}

/// 从 TOML 文件加载一个提交，顶层键即为初始上下文的键
pub async fn load_submission(toml_file_path: &Path) -> Result<Submission, FileError> {
    let path_str = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: path_str.clone(),
            source,
        })?;

    let map: Map<String, Value> =
        toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: path_str,
            source,
        })?;

    let name = toml_file_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    Ok(Submission {
        name,
        path: toml_file_path.to_path_buf(),
        context: WorkflowContext::from(map),
    })
}

/// 从文件夹中加载所有 TOML 提交（按文件名排序）
///
/// 单个文件解析失败只记录警告，不影响其余文件。
pub async fn load_all_submissions(folder_path: &str) -> Result<Vec<Submission>, FileError> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        });
    }

    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: folder_path.to_string(),
            source,
        })?;

    let mut toml_files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| FileError::ReadFailed {
            path: folder_path.to_string(),
            source,
        })?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut submissions = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_submission(&path).await {
            Ok(submission) => {
                tracing::info!("成功加载 {} 个字段", submission.context.len());
                submissions.push(submission);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(submissions)
}
