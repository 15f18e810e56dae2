//! 图数据结构
//!
//! 内存属性图：顶点和边都可以带多个标签和任意属性，边可以是有向或无向的。
//! 所有数据放在一把读写锁后面，匹配时通过 `snapshot()` 取得稳定的只读视图。

use super::edge::{Edge, EdgeId};
use super::index::{EdgeIndex, VertexIndex};
use super::store::{ElementId, GraphStore};
use super::vertex::{Vertex, VertexId};
use crate::error::{Error, Result};
use crate::types::{EdgeDirection, LabelSet, Properties};
use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// 声明的属性
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPropertySpec {
    pub name: String,
    #[serde(default)]
    pub data_type: String,
}

/// 声明的图 schema：标签以及每个标签下的属性
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredGraphSchema {
    /// node label -> properties
    #[serde(default)]
    pub node_types: HashMap<String, Vec<StoredPropertySpec>>,
    /// edge label -> properties
    #[serde(default)]
    pub edge_types: HashMap<String, Vec<StoredPropertySpec>>,
}

impl StoredGraphSchema {
    fn declares_label(&self, label: &str) -> bool {
        self.node_types.contains_key(label) || self.edge_types.contains_key(label)
    }

    fn declares_property(&self, key: &str) -> bool {
        self.node_types
            .values()
            .chain(self.edge_types.values())
            .flatten()
            .any(|p| p.name == key)
    }
}

/// 锁内的图数据
#[derive(Debug, Default)]
struct GraphData {
    /// 顶点（保持插入顺序）
    vertices: IndexMap<VertexId, Vertex>,
    /// 边（保持插入顺序）
    edges: IndexMap<EdgeId, Edge>,
    vertex_index: VertexIndex,
    edge_index: EdgeIndex,
    schema: Option<StoredGraphSchema>,
}

/// 内存属性图
pub struct Graph {
    data: RwLock<GraphData>,
    /// 下一个顶点 ID
    next_vertex_id: AtomicU64,
    /// 下一个边 ID
    next_edge_id: AtomicU64,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// 创建空图
    pub fn new() -> Self {
        Self {
            data: RwLock::new(GraphData::default()),
            next_vertex_id: AtomicU64::new(1),
            next_edge_id: AtomicU64::new(1),
        }
    }

    /// 设置图 schema
    pub fn set_schema(&self, s: StoredGraphSchema) {
        self.data.write().schema = Some(s);
    }

    /// 获取当前图的 schema（如果有）
    pub fn get_schema(&self) -> Option<StoredGraphSchema> {
        self.data.read().schema.clone()
    }

    /// 获取只读快照，快照存活期间图不会被修改
    pub fn snapshot(&self) -> GraphSnapshot<'_> {
        GraphSnapshot {
            data: self.data.read(),
        }
    }

    // ==================== 顶点操作 ====================

    /// 添加顶点
    pub fn add_vertex(&self, labels: LabelSet) -> VertexId {
        self.add_vertex_with_properties(labels, Properties::new())
    }

    /// 添加带属性的顶点
    pub fn add_vertex_with_properties(&self, labels: LabelSet, properties: Properties) -> VertexId {
        let id = VertexId::new(self.next_vertex_id.fetch_add(1, Ordering::SeqCst));
        let mut data = self.data.write();
        for label in &labels {
            data.vertex_index.add_label(label, id);
        }
        data.vertices
            .insert(id, Vertex::with_properties(id, labels, properties));
        id
    }

    /// 获取顶点
    pub fn get_vertex(&self, id: VertexId) -> Option<Vertex> {
        self.data.read().vertices.get(&id).cloned()
    }

    /// 删除顶点及其关联的边
    pub fn remove_vertex(&self, id: VertexId) -> Result<()> {
        let mut data = self.data.write();
        let vertex = data
            .vertices
            .shift_remove(&id)
            .ok_or_else(|| Error::VertexNotFound(id.to_string()))?;
        data.vertex_index.remove(id, vertex.labels());

        let incident: Vec<EdgeId> = data
            .edge_index
            .get_outgoing(id)
            .iter()
            .chain(data.edge_index.get_incoming(id))
            .chain(data.edge_index.get_undirected(id))
            .copied()
            .collect();
        for edge_id in incident {
            data.detach_edge(edge_id);
        }
        Ok(())
    }

    /// 获取顶点数量
    pub fn vertex_count(&self) -> usize {
        self.data.read().vertices.len()
    }

    // ==================== 边操作 ====================

    /// 添加有向边
    pub fn add_edge(
        &self,
        src: VertexId,
        dst: VertexId,
        labels: LabelSet,
        properties: Properties,
    ) -> Result<EdgeId> {
        self.insert_edge(src, dst, labels, properties, true)
    }

    /// 添加无向边
    pub fn add_undirected_edge(
        &self,
        a: VertexId,
        b: VertexId,
        labels: LabelSet,
        properties: Properties,
    ) -> Result<EdgeId> {
        self.insert_edge(a, b, labels, properties, false)
    }

    fn insert_edge(
        &self,
        src: VertexId,
        dst: VertexId,
        labels: LabelSet,
        properties: Properties,
        directed: bool,
    ) -> Result<EdgeId> {
        let mut data = self.data.write();
        // 验证顶点存在
        if !data.vertices.contains_key(&src) {
            return Err(Error::VertexNotFound(format!("源顶点 {} 不存在", src)));
        }
        if !data.vertices.contains_key(&dst) {
            return Err(Error::VertexNotFound(format!("目标顶点 {} 不存在", dst)));
        }

        let id = EdgeId::new(self.next_edge_id.fetch_add(1, Ordering::SeqCst));
        let edge = if directed {
            data.edge_index.add_directed(id, src, dst);
            Edge::new(id, labels, src, dst)
        } else {
            data.edge_index.add_undirected(id, src, dst);
            Edge::new_undirected(id, labels, src, dst)
        };
        for label in edge.labels() {
            data.edge_index.add_label(label, id);
        }
        data.edges.insert(id, edge.with_properties(properties));
        Ok(id)
    }

    /// 获取边
    pub fn get_edge(&self, id: EdgeId) -> Option<Edge> {
        self.data.read().edges.get(&id).cloned()
    }

    /// 删除边
    pub fn remove_edge(&self, id: EdgeId) -> Result<()> {
        if self.data.write().detach_edge(id) {
            Ok(())
        } else {
            Err(Error::EdgeNotFound(id.to_string()))
        }
    }

    /// 获取边数量
    pub fn edge_count(&self) -> usize {
        self.data.read().edges.len()
    }

    /// 获取顶点的出度（有向）
    pub fn out_degree(&self, vertex_id: VertexId) -> usize {
        self.data.read().edge_index.out_degree(vertex_id)
    }

    /// 获取顶点的入度（有向）
    pub fn in_degree(&self, vertex_id: VertexId) -> usize {
        self.data.read().edge_index.in_degree(vertex_id)
    }
}

impl GraphData {
    fn detach_edge(&mut self, id: EdgeId) -> bool {
        match self.edges.shift_remove(&id) {
            Some(edge) => {
                self.edge_index
                    .remove(id, edge.src(), edge.dst(), edge.is_directed(), edge.labels());
                true
            }
            None => false,
        }
    }
}

/// 图的只读快照（持有读锁）
pub struct GraphSnapshot<'g> {
    data: RwLockReadGuard<'g, GraphData>,
}

impl GraphSnapshot<'_> {
    /// 获取顶点引用
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.data.vertices.get(&id)
    }

    /// 获取边引用
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.data.edges.get(&id)
    }
}

impl GraphStore for GraphSnapshot<'_> {
    fn vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new(self.data.vertices.keys().copied())
    }

    fn vertices_with_label<'a>(&'a self, label: &'a str) -> Box<dyn Iterator<Item = VertexId> + 'a> {
        Box::new(self.data.vertex_index.get_by_label(label))
    }

    fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.data.vertices.contains_key(&vertex)
    }

    fn neighbors(
        &self,
        vertex: VertexId,
        direction: EdgeDirection,
    ) -> Box<dyn Iterator<Item = (EdgeId, VertexId)> + '_> {
        let data = &*self.data;
        let index = &data.edge_index;
        let endpoint = move |id: &EdgeId| data.edges.get(id);

        let outgoing = direction
            .allows_right()
            .then(|| index.get_outgoing(vertex))
            .unwrap_or(&[])
            .iter()
            .filter_map(endpoint)
            .map(|e| (e.id(), e.dst()));

        // 同时接受两个方向时，有向自环已经作为出边列出
        let skip_self_loops = direction.allows_right();
        let incoming = direction
            .allows_left()
            .then(|| index.get_incoming(vertex))
            .unwrap_or(&[])
            .iter()
            .filter_map(endpoint)
            .filter(move |e| !(skip_self_loops && e.is_self_loop()))
            .map(|e| (e.id(), e.src()));

        let undirected = direction
            .allows_undirected()
            .then(|| index.get_undirected(vertex))
            .unwrap_or(&[])
            .iter()
            .filter_map(endpoint)
            .filter_map(move |e| e.other_endpoint(vertex).map(|other| (e.id(), other)));

        Box::new(outgoing.chain(incoming).chain(undirected))
    }

    fn edge_endpoints(&self, edge: EdgeId) -> Option<(VertexId, VertexId)> {
        self.data.edges.get(&edge).map(|e| (e.src(), e.dst()))
    }

    fn labels_of(&self, element: ElementId) -> Option<&LabelSet> {
        match element {
            ElementId::Vertex(id) => self.data.vertices.get(&id).map(Vertex::labels),
            ElementId::Edge(id) => self.data.edges.get(&id).map(Edge::labels),
        }
    }

    fn properties_of(&self, element: ElementId) -> Option<&Properties> {
        match element {
            ElementId::Vertex(id) => self.data.vertices.get(&id).map(Vertex::properties),
            ElementId::Edge(id) => self.data.edges.get(&id).map(Edge::properties),
        }
    }

    fn has_label(&self, label: &str) -> bool {
        self.data.vertex_index.has_label(label)
            || self.data.edge_index.has_label(label)
            || self
                .data
                .schema
                .as_ref()
                .map_or(false, |s| s.declares_label(label))
    }

    fn has_property_key(&self, key: &str) -> bool {
        self.data.schema.as_ref().map_or(false, |s| s.declares_property(key))
            || self.data.vertices.values().any(|v| v.property(key).is_some())
            || self.data.edges.values().any(|e| e.property(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{label_set, PropertyValue};

    fn neighbor_ids(snap: &GraphSnapshot<'_>, v: VertexId, dir: EdgeDirection) -> Vec<EdgeId> {
        snap.neighbors(v, dir).map(|(e, _)| e).collect()
    }

    #[test]
    fn test_graph_basic() {
        let graph = Graph::new();

        let mut props = Properties::new();
        props.insert("name".to_string(), PropertyValue::from("Alice"));
        let v1 = graph.add_vertex_with_properties(label_set(["Person"]), props);
        let v2 = graph.add_vertex(label_set(["Person", "Employee"]));
        assert_eq!(graph.vertex_count(), 2);

        let e1 = graph
            .add_edge(v1, v2, label_set(["KNOWS"]), Properties::new())
            .unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.get_edge(e1).unwrap().dst(), v2);
        assert_eq!(
            graph.get_vertex(v1).unwrap().property("name"),
            Some(&PropertyValue::from("Alice"))
        );

        let missing = graph.add_edge(v1, VertexId::new(99), LabelSet::new(), Properties::new());
        assert!(matches!(missing, Err(Error::VertexNotFound(_))));
    }

    #[test]
    fn test_graph_degrees() {
        let graph = Graph::new();

        let v1 = graph.add_vertex(label_set(["Account"]));
        let v2 = graph.add_vertex(label_set(["Account"]));
        let v3 = graph.add_vertex(label_set(["Account"]));

        graph.add_edge(v1, v2, label_set(["TRANSFER"]), Properties::new()).unwrap();
        graph.add_edge(v1, v3, label_set(["TRANSFER"]), Properties::new()).unwrap();
        graph.add_edge(v2, v3, label_set(["TRANSFER"]), Properties::new()).unwrap();

        assert_eq!(graph.out_degree(v1), 2);
        assert_eq!(graph.in_degree(v3), 2);
    }

    #[test]
    fn test_neighbors_by_direction() {
        let graph = Graph::new();
        let a = graph.add_vertex(LabelSet::new());
        let b = graph.add_vertex(LabelSet::new());

        let ab = graph.add_edge(a, b, LabelSet::new(), Properties::new()).unwrap();
        let ba = graph.add_edge(b, a, LabelSet::new(), Properties::new()).unwrap();
        let u = graph.add_undirected_edge(a, b, LabelSet::new(), Properties::new()).unwrap();
        let aa = graph.add_edge(a, a, LabelSet::new(), Properties::new()).unwrap();

        let snap = graph.snapshot();
        assert_eq!(neighbor_ids(&snap, a, EdgeDirection::Right), vec![ab, aa]);
        assert_eq!(neighbor_ids(&snap, a, EdgeDirection::Left), vec![ba, aa]);
        assert_eq!(neighbor_ids(&snap, a, EdgeDirection::Undirected), vec![u]);
        // 任意方向时自环只出现一次
        assert_eq!(neighbor_ids(&snap, a, EdgeDirection::AnyDirection), vec![ab, aa, ba, u]);
        assert_eq!(neighbor_ids(&snap, a, EdgeDirection::LeftOrRight), vec![ab, aa, ba]);
        assert_eq!(neighbor_ids(&snap, b, EdgeDirection::LeftOrUndirected), vec![ab, u]);
        assert_eq!(snap.edge_endpoints(ba), Some((b, a)));
    }

    #[test]
    fn test_remove_vertex_detaches_edges() {
        let graph = Graph::new();
        let a = graph.add_vertex(label_set(["A"]));
        let b = graph.add_vertex(label_set(["B"]));
        let ab = graph.add_edge(a, b, LabelSet::new(), Properties::new()).unwrap();
        graph.add_undirected_edge(b, a, LabelSet::new(), Properties::new()).unwrap();
        graph.add_edge(b, b, LabelSet::new(), Properties::new()).unwrap();

        graph.remove_edge(ab).unwrap();
        assert!(graph.remove_edge(ab).is_err());
        assert_eq!(graph.out_degree(a), 0);
        assert_eq!(graph.edge_count(), 2);

        graph.remove_vertex(b).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.remove_vertex(b).is_err());

        let snap = graph.snapshot();
        assert_eq!(snap.neighbors(a, EdgeDirection::AnyDirection).count(), 0);
        assert_eq!(snap.vertices_with_label("B").count(), 0);
    }

    #[test]
    fn test_catalog_lookup() {
        let graph = Graph::new();
        let mut props = Properties::new();
        props.insert("age".to_string(), PropertyValue::Integer(30));
        graph.add_vertex_with_properties(label_set(["Person"]), props);

        let mut schema = StoredGraphSchema::default();
        schema.edge_types.insert(
            "WORKS_AT".to_string(),
            vec![StoredPropertySpec {
                name: "since".to_string(),
                data_type: "INT".to_string(),
            }],
        );
        graph.set_schema(schema);

        let snap = graph.snapshot();
        assert!(snap.has_label("Person"));
        assert!(snap.has_label("WORKS_AT"));
        assert!(!snap.has_label("City"));
        assert!(snap.has_property_key("age"));
        assert!(snap.has_property_key("since"));
        assert!(!snap.has_property_key("salary"));
    }
}
