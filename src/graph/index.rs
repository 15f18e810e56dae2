//! 图索引
//!
//! 顶点和边的内存索引，支持按标签查找和邻接遍历。
//! 索引本身不加锁，由 `Graph` 外层的读写锁统一保护。

use crate::graph::edge::EdgeId;
use crate::graph::vertex::VertexId;
use indexmap::IndexSet;
use std::collections::HashMap;

/// 顶点索引
#[derive(Debug, Default)]
pub struct VertexIndex {
    /// 标签到顶点 ID 集合的映射（保持插入顺序）
    label_to_ids: HashMap<String, IndexSet<VertexId>>,
}

impl VertexIndex {
    /// 创建新索引
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加标签索引
    pub fn add_label(&mut self, label: &str, vertex_id: VertexId) {
        self.label_to_ids
            .entry(label.to_string())
            .or_default()
            .insert(vertex_id);
    }

    /// 获取标签下的所有顶点
    pub fn get_by_label(&self, label: &str) -> impl Iterator<Item = VertexId> + '_ {
        self.label_to_ids
            .get(label)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// 是否存在带该标签的顶点
    pub fn has_label(&self, label: &str) -> bool {
        self.label_to_ids
            .get(label)
            .map_or(false, |set| !set.is_empty())
    }

    /// 移除顶点的标签索引
    pub fn remove<'a>(&mut self, vertex_id: VertexId, labels: impl IntoIterator<Item = &'a String>) {
        for label in labels {
            if let Some(set) = self.label_to_ids.get_mut(label) {
                set.shift_remove(&vertex_id);
            }
        }
    }
}

/// 边索引
#[derive(Debug, Default)]
pub struct EdgeIndex {
    /// 源顶点到有向出边的映射
    outgoing: HashMap<VertexId, Vec<EdgeId>>,
    /// 目标顶点到有向入边的映射
    incoming: HashMap<VertexId, Vec<EdgeId>>,
    /// 顶点到关联无向边的映射（自环只记录一次）
    undirected: HashMap<VertexId, Vec<EdgeId>>,
    /// 边标签到边 ID 集合的映射
    label_to_ids: HashMap<String, IndexSet<EdgeId>>,
}

impl EdgeIndex {
    /// 创建新索引
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加有向边
    pub fn add_directed(&mut self, edge_id: EdgeId, src: VertexId, dst: VertexId) {
        self.outgoing.entry(src).or_default().push(edge_id);
        self.incoming.entry(dst).or_default().push(edge_id);
    }

    /// 添加无向边
    pub fn add_undirected(&mut self, edge_id: EdgeId, a: VertexId, b: VertexId) {
        self.undirected.entry(a).or_default().push(edge_id);
        if a != b {
            self.undirected.entry(b).or_default().push(edge_id);
        }
    }

    /// 添加标签索引
    pub fn add_label(&mut self, label: &str, edge_id: EdgeId) {
        self.label_to_ids
            .entry(label.to_string())
            .or_default()
            .insert(edge_id);
    }

    /// 是否存在带该标签的边
    pub fn has_label(&self, label: &str) -> bool {
        self.label_to_ids
            .get(label)
            .map_or(false, |set| !set.is_empty())
    }

    /// 获取顶点的有向出边
    pub fn get_outgoing(&self, vertex_id: VertexId) -> &[EdgeId] {
        self.outgoing.get(&vertex_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 获取顶点的有向入边
    pub fn get_incoming(&self, vertex_id: VertexId) -> &[EdgeId] {
        self.incoming.get(&vertex_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 获取顶点的无向边
    pub fn get_undirected(&self, vertex_id: VertexId) -> &[EdgeId] {
        self.undirected.get(&vertex_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 获取顶点的出度（有向）
    pub fn out_degree(&self, vertex_id: VertexId) -> usize {
        self.get_outgoing(vertex_id).len()
    }

    /// 获取顶点的入度（有向）
    pub fn in_degree(&self, vertex_id: VertexId) -> usize {
        self.get_incoming(vertex_id).len()
    }

    /// 移除边
    pub fn remove<'a>(
        &mut self,
        edge_id: EdgeId,
        src: VertexId,
        dst: VertexId,
        directed: bool,
        labels: impl IntoIterator<Item = &'a String>,
    ) {
        let drop_from = |map: &mut HashMap<VertexId, Vec<EdgeId>>, v: VertexId| {
            if let Some(list) = map.get_mut(&v) {
                list.retain(|&e| e != edge_id);
            }
        };
        if directed {
            drop_from(&mut self.outgoing, src);
            drop_from(&mut self.incoming, dst);
        } else {
            drop_from(&mut self.undirected, src);
            drop_from(&mut self.undirected, dst);
        }
        for label in labels {
            if let Some(set) = self.label_to_ids.get_mut(label) {
                set.shift_remove(&edge_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_index() {
        let mut index = VertexIndex::new();
        index.add_label("Person", VertexId::new(1));
        index.add_label("Person", VertexId::new(2));

        let ids: Vec<VertexId> = index.get_by_label("Person").collect();
        assert_eq!(ids, vec![VertexId::new(1), VertexId::new(2)]);
        assert!(index.has_label("Person"));
        assert!(!index.has_label("City"));

        let label = "Person".to_string();
        index.remove(VertexId::new(1), [&label]);
        assert_eq!(index.get_by_label("Person").count(), 1);
    }

    #[test]
    fn test_edge_index() {
        let mut index = EdgeIndex::new();
        let v1 = VertexId::new(1);
        let v2 = VertexId::new(2);

        index.add_directed(EdgeId::new(1), v1, v2);
        index.add_undirected(EdgeId::new(2), v1, v2);
        index.add_undirected(EdgeId::new(3), v2, v2);

        assert_eq!(index.get_outgoing(v1), &[EdgeId::new(1)]);
        assert_eq!(index.get_incoming(v2), &[EdgeId::new(1)]);
        assert_eq!(index.get_undirected(v1), &[EdgeId::new(2)]);
        assert_eq!(index.get_undirected(v2), &[EdgeId::new(2), EdgeId::new(3)]);
        assert_eq!(index.out_degree(v1), 1);
        assert_eq!(index.in_degree(v1), 0);

        index.remove(EdgeId::new(1), v1, v2, true, std::iter::empty());
        assert!(index.get_outgoing(v1).is_empty());
    }
}
