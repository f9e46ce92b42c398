//! 流程阶段
//!
//! 固定的四个阶段，以及每个阶段写回上下文的键。
//! 按名称查找是封闭的：未知名称直接返回 `None`。

use phf::phf_map;

/// 流程阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// 分类：翻译 + LLM 判断部门
    Classifier,
    /// 格式化：生成正式 RTI 信函
    Formatter,
    /// 信息获取
    InfoFetcher,
    /// 跟踪：分配跟踪号和状态
    Tracker,
}

static STAGES_BY_NAME: phf::Map<&'static str, Stage> = phf_map! {
    "classifier" => Stage::Classifier,
    "formatter" => Stage::Formatter,
    "info_fetcher" => Stage::InfoFetcher,
    "tracker" => Stage::Tracker,
};

impl Stage {
    /// 流程执行顺序
    pub const PIPELINE: [Stage; 4] = [
        Stage::Classifier,
        Stage::Formatter,
        Stage::InfoFetcher,
        Stage::Tracker,
    ];

    /// 阶段名称
    pub fn name(self) -> &'static str {
        match self {
            Stage::Classifier => "classifier",
            Stage::Formatter => "formatter",
            Stage::InfoFetcher => "info_fetcher",
            Stage::Tracker => "tracker",
        }
    }

    /// 从名称解析阶段
    pub fn from_name(name: &str) -> Option<Self> {
        STAGES_BY_NAME.get(name).copied()
    }

    /// 该阶段执行后写回上下文的键
    pub fn result_keys(self) -> &'static [&'static str] {
        match self {
            Stage::Classifier => &["department", "formal_query", "raw_query"],
            Stage::Formatter => &["formatted_query"],
            Stage::InfoFetcher => &["info_available", "info_data"],
            Stage::Tracker => &["tracking_id", "status"],
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
