//! Path mode constraints
//!
//! Checked before an edge and its target vertex are appended, so a rejected
//! step never allocates a branch.

use crate::graph::{EdgeId, VertexId};
use crate::query::PathMode;

/// Borrowed view of a path under construction.
///
/// `vertices` always holds one more entry than `edges`.
#[derive(Debug, Clone, Copy)]
pub struct PartialPath<'p> {
    pub vertices: &'p [VertexId],
    pub edges: &'p [EdgeId],
}

impl<'p> PartialPath<'p> {
    pub fn new(vertices: &'p [VertexId], edges: &'p [EdgeId]) -> Self {
        Self { vertices, edges }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// A non-empty path whose last vertex is its first
    pub fn is_closed(&self) -> bool {
        !self.edges.is_empty() && self.vertices.first() == self.vertices.last()
    }
}

/// Whether `path` extended by `next_edge` to `next_vertex` is still allowed
pub fn admissible(
    path: PartialPath<'_>,
    mode: PathMode,
    next_edge: EdgeId,
    next_vertex: VertexId,
) -> bool {
    match mode {
        PathMode::Walk => true,
        PathMode::Trail => !path.edges.contains(&next_edge),
        PathMode::Simple => {
            if path.is_closed() {
                return false;
            }
            // The first vertex may be revisited once, closing the path
            !path.vertices.iter().skip(1).any(|&v| v == next_vertex)
        }
        PathMode::Acyclic => !path.vertices.contains(&next_vertex),
    }
}
