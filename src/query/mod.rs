//! GQL 图模式模块
//!
//! 基于 ISO GQL 39075 标准的图模式语法:
//! - 路径模式: WALK, TRAIL, SIMPLE, ACYCLIC
//! - 路径搜索前缀: ALL, ANY, ANY k, SHORTEST 系列
//! - 匹配模式: REPEATABLE ELEMENTS, DIFFERENT EDGES
//! - 完整的标签表达式支持
//! - 量化路径模式与括号子路径

mod ast;
mod parser;
mod validate;

// 导出 AST 类型
pub use ast::{
    BinaryOperator,
    EdgeDirection,
    EdgePattern,
    // 表达式
    Expression,
    GraphPattern,
    LabelExpression,
    MatchMode,
    NodePattern,
    ParenthesizedPathPattern,
    PathElement,
    PathFactor,
    PathMode,
    PathPattern,
    PathPatternExpression,
    PathSearchPrefix,
    PathTerm,
    PatternQuantifier,
    UnaryOperator,
};

// 导出解析器
pub use parser::{parse, parse_path, GqlParser};

// 导出校验器
pub use validate::{PatternValidator, PatternVariables, VariableKind};
