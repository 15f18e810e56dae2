//! 图核心模块
//!
//! 定义顶点、边、内存图以及匹配所依赖的只读存储接口

mod edge;
mod graph;
mod index;
mod store;
mod vertex;

pub use edge::{Edge, EdgeId};
pub use graph::{Graph, GraphSnapshot, StoredGraphSchema, StoredPropertySpec};
pub use index::{EdgeIndex, VertexIndex};
pub use store::{ElementId, GraphStore};
pub use vertex::{Vertex, VertexId};
