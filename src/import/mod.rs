//! 数据导入模块
//!
//! 从 JSON 图文档加载顶点、边以及可选的 schema

use crate::error::{Error, Result};
use crate::graph::{Graph, StoredGraphSchema, VertexId};
use crate::types::{label_set, Properties};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// 导入统计
#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    pub vertices_imported: usize,
    pub edges_imported: usize,
    pub duration_ms: u64,
}

/// 顶点记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexRecord {
    /// 文档内的顶点键，仅用于边引用
    pub id: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Properties,
}

/// 边记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub src: String,
    pub dst: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Properties,
    /// 缺省为有向边
    #[serde(default = "default_directed")]
    pub directed: bool,
}

fn default_directed() -> bool {
    true
}

/// JSON 图文档
///
/// ```json
/// {
///   "vertices": [{"id": "a", "labels": ["Person"], "properties": {"age": 30}}],
///   "edges": [{"src": "a", "dst": "a", "labels": ["KNOWS"], "directed": false}]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub vertices: Vec<VertexRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
    /// 声明的标签和属性，严格目录检查时与图中实际出现的一并接受
    #[serde(default)]
    pub schema: Option<StoredGraphSchema>,
}

impl GraphDocument {
    /// 从 JSON 文件读取文档
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// 将文档写入图，返回文档键到顶点 ID 的映射
    pub fn import_into(&self, graph: &Graph) -> Result<(HashMap<String, VertexId>, ImportStats)> {
        let start = std::time::Instant::now();
        let mut stats = ImportStats::default();
        let mut keys = HashMap::with_capacity(self.vertices.len());

        for record in &self.vertices {
            if keys.contains_key(&record.id) {
                return Err(Error::ImportError(format!("重复的顶点键: {}", record.id)));
            }
            let id = graph.add_vertex_with_properties(
                label_set(&record.labels),
                record.properties.clone(),
            );
            keys.insert(record.id.clone(), id);
            stats.vertices_imported += 1;
        }

        for (i, record) in self.edges.iter().enumerate() {
            let endpoint = |key: &str| {
                keys.get(key).copied().ok_or_else(|| {
                    Error::ImportError(format!("第 {} 条边引用了不存在的顶点: {}", i, key))
                })
            };
            let src = endpoint(&record.src)?;
            let dst = endpoint(&record.dst)?;
            let labels = label_set(&record.labels);
            if record.directed {
                graph.add_edge(src, dst, labels, record.properties.clone())?;
            } else {
                graph.add_undirected_edge(src, dst, labels, record.properties.clone())?;
            }
            stats.edges_imported += 1;
        }

        if let Some(schema) = &self.schema {
            debug!(
                node_types = schema.node_types.len(),
                edge_types = schema.edge_types.len(),
                "schema loaded"
            );
            graph.set_schema(schema.clone());
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok((keys, stats))
    }
}

/// 从 JSON 文件加载完整的图
pub fn load_graph_json<P: AsRef<Path>>(path: P) -> Result<Graph> {
    let path = path.as_ref();
    let document = GraphDocument::from_json_file(path)?;
    let graph = Graph::new();
    let (_, stats) = document.import_into(&graph)?;
    info!(
        path = %path.display(),
        vertices = stats.vertices_imported,
        edges = stats.edges_imported,
        duration_ms = stats.duration_ms,
        "graph imported"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ElementId, GraphStore};
    use crate::types::{EdgeDirection, PropertyValue};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOCUMENT: &str = r#"{
        "vertices": [
            {"id": "alice", "labels": ["Person"], "properties": {"name": "Alice", "age": 30}},
            {"id": "bob", "labels": ["Person", "Admin"]},
            {"id": "acme", "labels": ["Company"]}
        ],
        "edges": [
            {"src": "alice", "dst": "bob", "labels": ["KNOWS"], "properties": {"since": 2020}},
            {"src": "bob", "dst": "acme", "labels": ["WORKS_AT"], "directed": false}
        ]
    }"#;

    #[test]
    fn test_import_document() {
        let document: GraphDocument = serde_json::from_str(DOCUMENT).unwrap();
        let graph = Graph::new();
        let (keys, stats) = document.import_into(&graph).unwrap();
        assert_eq!(stats.vertices_imported, 3);
        assert_eq!(stats.edges_imported, 2);

        let alice = keys["alice"];
        let bob = keys["bob"];
        let acme = keys["acme"];
        let snap = graph.snapshot();
        assert_eq!(
            snap.properties_of(ElementId::Vertex(alice))
                .and_then(|p| p.get("age"))
                .cloned(),
            Some(PropertyValue::Integer(30))
        );
        assert!(snap.labels_of(ElementId::Vertex(bob)).unwrap().contains("Admin"));

        let out: Vec<_> = snap.neighbors(alice, EdgeDirection::Right).collect();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].1, bob);
        // 无向边两个方向都可走
        assert_eq!(snap.neighbors(acme, EdgeDirection::Undirected).count(), 1);
        assert_eq!(snap.neighbors(acme, EdgeDirection::Right).count(), 0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", DOCUMENT).unwrap();

        let graph = load_graph_json(file.path()).unwrap();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.snapshot().vertices_with_label("Person").count(), 2);
    }

    #[test]
    fn test_unknown_endpoint() {
        let document: GraphDocument = serde_json::from_str(
            r#"{"vertices": [{"id": "a"}], "edges": [{"src": "a", "dst": "b"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            document.import_into(&Graph::new()),
            Err(Error::ImportError(_))
        ));
    }

    #[test]
    fn test_duplicate_key() {
        let document: GraphDocument =
            serde_json::from_str(r#"{"vertices": [{"id": "a"}, {"id": "a"}]}"#).unwrap();
        assert!(matches!(
            document.import_into(&Graph::new()),
            Err(Error::ImportError(_))
        ));
    }

    #[test]
    fn test_schema_extends_catalog() {
        let document: GraphDocument = serde_json::from_str(
            r#"{
                "vertices": [{"id": "a", "labels": ["Person"]}],
                "schema": {"node_types": {"City": [{"name": "population"}]}}
            }"#,
        )
        .unwrap();
        let graph = Graph::new();
        document.import_into(&graph).unwrap();
        assert!(graph.get_schema().unwrap().node_types.contains_key("City"));
        let snap = graph.snapshot();
        assert!(snap.has_label("City"));
        assert!(snap.has_property_key("population"));
        assert!(!snap.has_label("Country"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_graph_json("/nonexistent/graph.json"),
            Err(Error::IoError(_))
        ));
    }
}
