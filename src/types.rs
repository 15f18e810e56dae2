//! 通用类型定义：属性值、属性映射、标签集合

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 属性值
///
/// JSON 中直接写字面量即可（`null`、`true`、`42`、`1.5`、`"text"`、`[...]`）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// 值相等比较，整数与浮点数按数值比较
    pub fn loose_eq(&self, other: &PropertyValue) -> bool {
        match (self, other) {
            (PropertyValue::Integer(a), PropertyValue::Float(b))
            | (PropertyValue::Float(b), PropertyValue::Integer(a)) => (*a as f64) == *b,
            (PropertyValue::List(a), PropertyValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            _ => self == other,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "NULL"),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(x) => write!(f, "{}", x),
            PropertyValue::String(s) => write!(f, "'{}'", s),
            PropertyValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Boolean(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

/// 边方向（GQL 的七种边模式方向）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeDirection {
    /// 指向右侧: -[...]->
    Right,
    /// 指向左侧: <-[...]-
    Left,
    /// 无向: ~[...]~
    Undirected,
    /// 任意方向: -[...]-
    AnyDirection,
    /// 左向或无向: <~[...]~
    LeftOrUndirected,
    /// 无向或右向: ~[...]~>
    UndirectedOrRight,
    /// 左向或右向（不含无向）: <-[...]->
    LeftOrRight,
}

impl EdgeDirection {
    /// 是否接受从当前顶点出发的有向边
    pub fn allows_right(&self) -> bool {
        matches!(
            self,
            EdgeDirection::Right
                | EdgeDirection::AnyDirection
                | EdgeDirection::UndirectedOrRight
                | EdgeDirection::LeftOrRight
        )
    }

    /// 是否接受指向当前顶点的有向边
    pub fn allows_left(&self) -> bool {
        matches!(
            self,
            EdgeDirection::Left
                | EdgeDirection::AnyDirection
                | EdgeDirection::LeftOrUndirected
                | EdgeDirection::LeftOrRight
        )
    }

    /// 是否接受无向边
    pub fn allows_undirected(&self) -> bool {
        matches!(
            self,
            EdgeDirection::Undirected
                | EdgeDirection::AnyDirection
                | EdgeDirection::LeftOrUndirected
                | EdgeDirection::UndirectedOrRight
        )
    }
}

impl fmt::Display for EdgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeDirection::Right => write!(f, "->"),
            EdgeDirection::Left => write!(f, "<-"),
            EdgeDirection::Undirected => write!(f, "~"),
            EdgeDirection::AnyDirection => write!(f, "-"),
            EdgeDirection::LeftOrUndirected => write!(f, "<~"),
            EdgeDirection::UndirectedOrRight => write!(f, "~>"),
            EdgeDirection::LeftOrRight => write!(f, "<->"),
        }
    }
}

/// 属性映射
pub type Properties = HashMap<String, PropertyValue>;

/// 标签集合（保持插入顺序）
pub type LabelSet = IndexSet<String>;

/// 由标签名构造标签集合
pub fn label_set<I, S>(labels: I) -> LabelSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    labels.into_iter().map(Into::into).collect()
}
