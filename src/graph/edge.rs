//! 边定义
//!
//! 边可以是有向的（src -> dst）或无向的（src ~ dst）

use crate::graph::vertex::VertexId;
use crate::types::{LabelSet, Properties, PropertyValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 边 ID（全局唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// 边
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// 边 ID
    id: EdgeId,
    /// 标签集合
    labels: LabelSet,
    /// 源顶点 ID（无向边中为第一个端点）
    src: VertexId,
    /// 目标顶点 ID（无向边中为第二个端点）
    dst: VertexId,
    /// 是否有向
    directed: bool,
    /// 属性
    properties: Properties,
}

impl Edge {
    /// 创建有向边
    pub fn new(id: EdgeId, labels: LabelSet, src: VertexId, dst: VertexId) -> Self {
        Self {
            id,
            labels,
            src,
            dst,
            directed: true,
            properties: Properties::new(),
        }
    }

    /// 创建无向边
    pub fn new_undirected(id: EdgeId, labels: LabelSet, a: VertexId, b: VertexId) -> Self {
        Self {
            directed: false,
            ..Self::new(id, labels, a, b)
        }
    }

    /// 设置属性（构造时使用）
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// 获取边 ID
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// 获取标签集合
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// 获取源顶点 ID
    pub fn src(&self) -> VertexId {
        self.src
    }

    /// 获取目标顶点 ID
    pub fn dst(&self) -> VertexId {
        self.dst
    }

    /// 是否有向
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// 是否自环
    pub fn is_self_loop(&self) -> bool {
        self.src == self.dst
    }

    /// 给定一个端点，返回另一个端点
    pub fn other_endpoint(&self, vertex: VertexId) -> Option<VertexId> {
        if vertex == self.src {
            Some(self.dst)
        } else if vertex == self.dst {
            Some(self.src)
        } else {
            None
        }
    }

    /// 获取属性
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// 设置属性
    pub fn set_property(&mut self, key: String, value: PropertyValue) {
        self.properties.insert(key, value);
    }

    /// 获取所有属性
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}
