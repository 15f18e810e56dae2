//! 图存储读接口
//!
//! 模式匹配只依赖这里定义的只读操作。任何实现了 `GraphStore` 的存储
//! 都可以作为匹配的数据源；实现方需保证一次匹配期间视图稳定。

use crate::graph::edge::EdgeId;
use crate::graph::vertex::VertexId;
use crate::types::{EdgeDirection, LabelSet, Properties};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 图元素标识（顶点或边）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementId {
    Vertex(VertexId),
    Edge(EdgeId),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Vertex(v) => write!(f, "{}", v),
            ElementId::Edge(e) => write!(f, "{}", e),
        }
    }
}

impl From<VertexId> for ElementId {
    fn from(id: VertexId) -> Self {
        ElementId::Vertex(id)
    }
}

impl From<EdgeId> for ElementId {
    fn from(id: EdgeId) -> Self {
        ElementId::Edge(id)
    }
}

/// 图存储只读接口
pub trait GraphStore {
    /// 所有顶点（迭代顺序即匹配的起点发现顺序）
    fn vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_>;

    /// 带某个标签的顶点
    fn vertices_with_label<'a>(&'a self, label: &'a str) -> Box<dyn Iterator<Item = VertexId> + 'a> {
        Box::new(self.vertices().filter(move |&v| {
            self.labels_of(ElementId::Vertex(v))
                .map_or(false, |labels| labels.contains(label))
        }))
    }

    /// 顶点是否存在
    fn contains_vertex(&self, vertex: VertexId) -> bool;

    /// 沿给定方向的邻接边：(边 ID, 另一端顶点 ID)
    fn neighbors(
        &self,
        vertex: VertexId,
        direction: EdgeDirection,
    ) -> Box<dyn Iterator<Item = (EdgeId, VertexId)> + '_>;

    /// 边的两个端点 (src, dst)；无向边按插入时的顺序
    fn edge_endpoints(&self, edge: EdgeId) -> Option<(VertexId, VertexId)>;

    /// 元素的标签集合
    fn labels_of(&self, element: ElementId) -> Option<&LabelSet>;

    /// 元素的属性
    fn properties_of(&self, element: ElementId) -> Option<&Properties>;

    /// 标签是否在目录中（用于语义校验）
    fn has_label(&self, _label: &str) -> bool {
        true
    }

    /// 属性名是否在目录中（用于语义校验）
    fn has_property_key(&self, _key: &str) -> bool {
        true
    }
}

impl<G: GraphStore + ?Sized> GraphStore for &G {
    fn vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        (**self).vertices()
    }

    fn vertices_with_label<'a>(&'a self, label: &'a str) -> Box<dyn Iterator<Item = VertexId> + 'a> {
        (**self).vertices_with_label(label)
    }

    fn contains_vertex(&self, vertex: VertexId) -> bool {
        (**self).contains_vertex(vertex)
    }

    fn neighbors(
        &self,
        vertex: VertexId,
        direction: EdgeDirection,
    ) -> Box<dyn Iterator<Item = (EdgeId, VertexId)> + '_> {
        (**self).neighbors(vertex, direction)
    }

    fn edge_endpoints(&self, edge: EdgeId) -> Option<(VertexId, VertexId)> {
        (**self).edge_endpoints(edge)
    }

    fn labels_of(&self, element: ElementId) -> Option<&LabelSet> {
        (**self).labels_of(element)
    }

    fn properties_of(&self, element: ElementId) -> Option<&Properties> {
        (**self).properties_of(element)
    }

    fn has_label(&self, label: &str) -> bool {
        (**self).has_label(label)
    }

    fn has_property_key(&self, key: &str) -> bool {
        (**self).has_property_key(key)
    }
}
