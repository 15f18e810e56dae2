//! gqlpath - GQL 图模式匹配与路径搜索
//!
//! 在内存属性图上惰性地求值 ISO GQL 图模式，支持：
//! - 节点、边模式与标签表达式
//! - 量词、括号子路径与路径模式联合
//! - 路径模式约束 (WALK, TRAIL, SIMPLE, ACYCLIC)
//! - 搜索前缀 (ALL, ANY k, SHORTEST 系列)
//! - 从 JSON 图文档导入数据

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod import;
pub mod logging;
pub mod matcher;
pub mod query;
pub mod types;

// 重导出常用类型
pub use config::{MatchConfig, SearchScope, TiePolicy};
pub use error::{Error, Result};
pub use graph::{Edge, EdgeId, ElementId, Graph, GraphStore, Vertex, VertexId};
pub use matcher::{Bindings, BoundElement, MatchIter, MatchResult, PathBinding, PathMatcher};
pub use query::{parse, parse_path, GraphPattern, PathPattern};
pub use types::{label_set, EdgeDirection, LabelSet, Properties, PropertyValue};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
