//! 顶点定义

use crate::types::{LabelSet, Properties, PropertyValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 顶点 ID（全局唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u64);

impl VertexId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VertexId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// 顶点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// 顶点 ID
    id: VertexId,
    /// 标签集合（一个顶点可以有多个标签）
    labels: LabelSet,
    /// 属性
    properties: Properties,
}

impl Vertex {
    /// 创建新顶点
    pub fn new(id: VertexId, labels: LabelSet) -> Self {
        Self {
            id,
            labels,
            properties: Properties::new(),
        }
    }

    /// 创建带属性的顶点
    pub fn with_properties(id: VertexId, labels: LabelSet, properties: Properties) -> Self {
        Self {
            id,
            labels,
            properties,
        }
    }

    /// 获取顶点 ID
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// 获取标签集合
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// 是否带有某个标签
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// 添加标签
    pub fn add_label(&mut self, label: impl Into<String>) {
        self.labels.insert(label.into());
    }

    /// 获取属性
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// 设置属性
    pub fn set_property(&mut self, key: String, value: PropertyValue) {
        self.properties.insert(key, value);
    }

    /// 移除属性
    pub fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.properties.remove(key)
    }

    /// 获取所有属性
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::label_set;

    #[test]
    fn test_vertex_labels() {
        let mut v = Vertex::new(VertexId::new(1), label_set(["Person"]));
        v.add_label("Employee");

        assert_eq!(v.id().as_u64(), 1);
        assert!(v.has_label("Person"));
        assert!(v.has_label("Employee"));
        assert!(!v.has_label("Company"));
    }

    #[test]
    fn test_vertex_properties() {
        let mut v = Vertex::new(VertexId::new(7), label_set(["Person"]));
        v.set_property("name".to_string(), PropertyValue::from("Alice"));

        assert_eq!(v.property("name"), Some(&PropertyValue::from("Alice")));
        assert_eq!(v.remove_property("name"), Some(PropertyValue::from("Alice")));
        assert!(v.property("name").is_none());
    }
}
