//! 提示词加载服务 - 业务能力层
//!
//! 从 `<prompts_dir>/<name>_prompt.txt` 读取模板，文件不存在时使用内置模板。

use std::path::PathBuf;

use phf::phf_map;
use tracing::{debug, info};

use crate::error::PromptError;

/// 模板中的查询占位符
pub const QUERY_PLACEHOLDER: &str = "{query}";

static BUILTIN_PROMPTS: phf::Map<&'static str, &'static str> = phf_map! {
    "classifier" => include_str!("../../prompts/classifier_prompt.txt"),
    "formatter" => include_str!("../../prompts/formatter_prompt.txt"),
};

/// 已校验的提示词模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    template: String,
}

impl PromptTemplate {
    /// 创建模板；没有 `{query}` 占位符的模板会被拒绝
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self, PromptError> {
        let name = name.into();
        let template = template.into();

        if !template.contains(QUERY_PLACEHOLDER) {
            return Err(PromptError::MissingPlaceholder { name });
        }

        Ok(Self { name, template })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 替换所有 `{query}` 占位符
    pub fn render(&self, query: &str) -> String {
        self.template.replace(QUERY_PLACEHOLDER, query)
    }
}

/// 提示词加载器
#[derive(Debug, Clone)]
pub struct PromptLoader {
    prompts_dir: PathBuf,
}

impl PromptLoader {
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
        }
    }

    /// 加载指定名称的模板
    pub fn load(&self, name: &str) -> Result<PromptTemplate, PromptError> {
        let path = self.prompts_dir.join(format!("{}_prompt.txt", name));

        if path.is_file() {
            let content =
                std::fs::read_to_string(&path).map_err(|source| PromptError::ReadFailed {
                    path: path.display().to_string(),
                    source,
                })?;
            info!("📝 已加载提示词模板: {}", path.display());
            return PromptTemplate::new(name, content);
        }

        match BUILTIN_PROMPTS.get(name) {
            Some(builtin) => {
                debug!("未找到 {}，使用内置模板 {}", path.display(), name);
                PromptTemplate::new(name, *builtin)
            }
            None => Err(PromptError::NotFound {
                name: name.to_string(),
            }),
        }
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::new("prompts")
    }
}
