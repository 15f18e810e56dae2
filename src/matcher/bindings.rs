//! Variable bindings produced by the matcher

use crate::graph::{EdgeId, ElementId, VertexId};
use crate::query::VariableKind;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A matched path: `vertices.len() == edges.len() + 1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PathBinding {
    pub vertices: Vec<VertexId>,
    pub edges: Vec<EdgeId>,
}

impl PathBinding {
    pub fn new(vertices: Vec<VertexId>, edges: Vec<EdgeId>) -> Self {
        Self { vertices, edges }
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn start(&self) -> Option<VertexId> {
        self.vertices.first().copied()
    }

    pub fn end(&self) -> Option<VertexId> {
        self.vertices.last().copied()
    }

    /// Elements in path order: vertex, edge, vertex, ...
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        let mut edges = self.edges.iter();
        self.vertices.iter().flat_map(move |&v| {
            std::iter::once(ElementId::Vertex(v)).chain(edges.next().map(|&e| ElementId::Edge(e)))
        })
    }
}

impl fmt::Display for PathBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, "-[{}]-", self.edges[i - 1])?;
            }
            write!(f, "({})", v)?;
        }
        Ok(())
    }
}

/// What a variable is bound to in one match result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundElement {
    Vertex(VertexId),
    Edge(EdgeId),
    /// Group variable: one element per quantifier iteration
    Group(Vec<ElementId>),
    /// Path or sub-path variable
    Path(PathBinding),
}

impl BoundElement {
    pub fn as_vertex(&self) -> Option<VertexId> {
        match self {
            BoundElement::Vertex(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<EdgeId> {
        match self {
            BoundElement::Edge(e) => Some(*e),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&[ElementId]> {
        match self {
            BoundElement::Group(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&PathBinding> {
        match self {
            BoundElement::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Variable kind implied by this binding. An empty group says nothing.
    pub fn kind(&self) -> Option<VariableKind> {
        match self {
            BoundElement::Vertex(_) => Some(VariableKind::Node),
            BoundElement::Edge(_) => Some(VariableKind::Edge),
            BoundElement::Group(items) => items.first().map(|e| match e {
                ElementId::Vertex(_) => VariableKind::NodeGroup,
                ElementId::Edge(_) => VariableKind::EdgeGroup,
            }),
            BoundElement::Path(_) => Some(VariableKind::Path),
        }
    }
}

impl From<ElementId> for BoundElement {
    fn from(id: ElementId) -> Self {
        match id {
            ElementId::Vertex(v) => BoundElement::Vertex(v),
            ElementId::Edge(e) => BoundElement::Edge(e),
        }
    }
}

impl fmt::Display for BoundElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundElement::Vertex(v) => write!(f, "{}", v),
            BoundElement::Edge(e) => write!(f, "{}", e),
            BoundElement::Group(items) => {
                let parts: Vec<String> = items.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            BoundElement::Path(p) => write!(f, "{}", p),
        }
    }
}

/// Caller-visible bindings, in binding order
pub type Bindings = IndexMap<String, BoundElement>;

/// Bindings held by a search thread, keyed by names borrowed from the pattern
pub(crate) type LocalBindings<'a> = IndexMap<&'a str, BoundElement>;

/// Variable lookup used while evaluating predicates
pub(crate) struct Scope<'s, 'a> {
    /// Bindings accumulated by the current thread
    pub local: &'s LocalBindings<'a>,
    /// Bindings supplied by the caller
    pub seed: &'s Bindings,
    /// Element being tested, visible under its own variable
    pub candidate: Option<(&'s str, ElementId)>,
    /// Group variables resolve to their latest element (inside an iteration)
    pub latest: bool,
}

impl<'s, 'a> Scope<'s, 'a> {
    pub fn new(local: &'s LocalBindings<'a>, seed: &'s Bindings) -> Self {
        Self {
            local,
            seed,
            candidate: None,
            latest: false,
        }
    }

    pub fn with_candidate(mut self, name: Option<&'s str>, element: ElementId) -> Self {
        self.candidate = name.map(|n| (n, element));
        self
    }

    pub fn latest(mut self, latest: bool) -> Self {
        self.latest = latest;
        self
    }

    pub fn lookup(&self, name: &str) -> Option<Resolved<'s>> {
        if let Some((candidate, element)) = self.candidate {
            if candidate == name {
                return Some(Resolved::Element(element));
            }
        }
        let bound = self.local.get(name).or_else(|| self.seed.get(name))?;
        Some(match bound {
            BoundElement::Vertex(v) => Resolved::Element(ElementId::Vertex(*v)),
            BoundElement::Edge(e) => Resolved::Element(ElementId::Edge(*e)),
            BoundElement::Group(items) if self.latest => match items.last() {
                Some(&last) => Resolved::Element(last),
                None => return None,
            },
            BoundElement::Group(items) => Resolved::Group(items),
            BoundElement::Path(p) => Resolved::Path(p),
        })
    }
}

/// A variable as seen by an expression
pub(crate) enum Resolved<'s> {
    Element(ElementId),
    Group(&'s [ElementId]),
    Path(&'s PathBinding),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_binding_elements() {
        let path = PathBinding::new(
            vec![VertexId::new(1), VertexId::new(2), VertexId::new(3)],
            vec![EdgeId::new(10), EdgeId::new(11)],
        );
        let elements: Vec<ElementId> = path.elements().collect();
        assert_eq!(
            elements,
            vec![
                VertexId::new(1).into(),
                EdgeId::new(10).into(),
                VertexId::new(2).into(),
                EdgeId::new(11).into(),
                VertexId::new(3).into(),
            ]
        );
        assert_eq!(path.to_string(), "(v1)-[e10]-(v2)-[e11]-(v3)");
        assert_eq!(path.len(), 2);
        assert_eq!(path.end(), Some(VertexId::new(3)));
    }

    #[test]
    fn test_scope_lookup_order() {
        let mut local = LocalBindings::new();
        local.insert("a", BoundElement::Vertex(VertexId::new(1)));
        local.insert(
            "g",
            BoundElement::Group(vec![EdgeId::new(5).into(), EdgeId::new(6).into()]),
        );
        let mut seed = Bindings::new();
        seed.insert("a".to_string(), BoundElement::Vertex(VertexId::new(9)));
        seed.insert("s".to_string(), BoundElement::Vertex(VertexId::new(7)));

        let scope = Scope::new(&local, &seed).with_candidate(Some("c"), EdgeId::new(3).into());
        assert!(matches!(
            scope.lookup("a"),
            Some(Resolved::Element(ElementId::Vertex(v))) if v == VertexId::new(1)
        ));
        assert!(matches!(
            scope.lookup("s"),
            Some(Resolved::Element(ElementId::Vertex(v))) if v == VertexId::new(7)
        ));
        assert!(matches!(
            scope.lookup("c"),
            Some(Resolved::Element(ElementId::Edge(e))) if e == EdgeId::new(3)
        ));
        assert!(matches!(scope.lookup("g"), Some(Resolved::Group(items)) if items.len() == 2));
        assert!(scope.lookup("missing").is_none());

        let scope = Scope::new(&local, &seed).latest(true);
        assert!(matches!(
            scope.lookup("g"),
            Some(Resolved::Element(ElementId::Edge(e))) if e == EdgeId::new(6)
        ));
    }

    #[test]
    fn test_bound_element_kind() {
        assert_eq!(
            BoundElement::Vertex(VertexId::new(1)).kind(),
            Some(VariableKind::Node)
        );
        assert_eq!(BoundElement::Group(vec![]).kind(), None);
        assert_eq!(
            BoundElement::Group(vec![EdgeId::new(1).into()]).kind(),
            Some(VariableKind::EdgeGroup)
        );
    }
}
