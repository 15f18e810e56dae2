//! 图模式匹配模块
//!
//! 在 `GraphStore` 之上惰性地枚举 GQL 图模式的匹配结果：
//! - 标签表达式求值
//! - 量词展开（回溯引擎中的重复循环）
//! - 路径模式约束: WALK, TRAIL, SIMPLE, ACYCLIC
//! - 搜索前缀控制: ALL, ANY, SHORTEST 系列
//! - WHERE 表达式求值（三值逻辑）

mod bindings;
mod expr;
mod label;
mod matcher;
mod mode;
mod program;
mod search;
mod vm;

pub use bindings::{Bindings, BoundElement, PathBinding};
pub use matcher::{MatchIter, MatchResult, MatchStats, PathMatcher};
pub use mode::{admissible, PartialPath};
pub use search::{SearchController, SearchState};
