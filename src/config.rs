//! 匹配配置
//!
//! 控制遍历深度、步数上限以及搜索前缀中几处语法本身未规定的行为。

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 默认最大路径长度（边数）
pub const DEFAULT_MAX_PATH_LENGTH: usize = 32;

/// SHORTEST k 在边界长度上出现并列时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// 边界长度上的并列路径全部返回（结果可能多于 k）
    #[default]
    IncludeAll,
    /// 恰好返回 k 条，按发现顺序截断
    Truncate,
}

/// 搜索前缀的计数范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// 对整个结果序列计数
    #[default]
    Global,
    /// 按 (起点, 终点) 分组计数
    ///
    /// SHORTEST 系列逐层加深，直到所有可能的端点对都已满足。
    /// 图中有环且存在不可达的端点对时，搜索会一直加深到
    /// `max_path_length`，结果被标记为截断。
    PerEndpoints,
}

/// 匹配配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// 候选路径的最大边数（无界量词的遍历深度上限）
    pub max_path_length: usize,
    /// 每次匹配最多展开的边数，`None` 表示不限制
    pub max_steps: Option<u64>,
    /// SHORTEST k 的并列处理
    pub shortest_ties: TiePolicy,
    /// 搜索前缀计数范围
    pub search_scope: SearchScope,
    /// 是否拒绝图中不存在的标签和属性名
    pub strict_catalog: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_steps: None,
            shortest_ties: TiePolicy::default(),
            search_scope: SearchScope::default(),
            strict_catalog: true,
        }
    }
}

impl MatchConfig {
    /// 从 JSON 文件加载配置，缺省字段取默认值
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
