//! Pattern validation
//!
//! Runs before any matching starts. Errors raised here are fatal:
//! - quantifier bounds with lower > upper: `ConfigurationError`
//! - variable kind conflicts, undefined WHERE variables, unknown labels or
//!   property keys (when the catalog is strict): `SemanticError`

use crate::error::{Error, Result};
use crate::graph::GraphStore;
use crate::query::ast::*;
use crate::types::PropertyValue;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

/// What a pattern variable binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// A single vertex
    Node,
    /// A single edge
    Edge,
    /// List of vertices (declared inside a quantified factor)
    NodeGroup,
    /// List of edges (declared inside a quantified factor)
    EdgeGroup,
    /// A path or sub-path
    Path,
}

impl VariableKind {
    fn grouped(self) -> Self {
        match self {
            VariableKind::Node => VariableKind::NodeGroup,
            VariableKind::Edge => VariableKind::EdgeGroup,
            other => other,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, VariableKind::NodeGroup | VariableKind::EdgeGroup)
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableKind::Node => write!(f, "node"),
            VariableKind::Edge => write!(f, "edge"),
            VariableKind::NodeGroup => write!(f, "node group"),
            VariableKind::EdgeGroup => write!(f, "edge group"),
            VariableKind::Path => write!(f, "path"),
        }
    }
}

/// Variables declared by a validated pattern, in declaration order
#[derive(Debug, Clone, Default)]
pub struct PatternVariables {
    kinds: IndexMap<String, VariableKind>,
}

impl PatternVariables {
    pub fn kind(&self, name: &str) -> Option<VariableKind> {
        self.kinds.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, VariableKind)> {
        self.kinds.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Group variables in declaration order
    pub fn groups(&self) -> impl Iterator<Item = (&str, VariableKind)> {
        self.iter().filter(|(_, kind)| kind.is_group())
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    fn declare(&mut self, name: &str, kind: VariableKind) -> Result<()> {
        match self.kinds.get(name) {
            Some(&existing) if existing != kind => Err(Error::SemanticError(format!(
                "Variable '{}' is declared as both {} and {}",
                name, existing, kind
            ))),
            Some(_) => Ok(()),
            None => {
                self.kinds.insert(name.to_string(), kind);
                Ok(())
            }
        }
    }
}

/// Pattern validator
pub struct PatternValidator<'a, G: ?Sized> {
    store: &'a G,
    strict_catalog: bool,
    /// Variables bound by the caller before matching
    pre_bound: HashMap<&'a str, VariableKind>,
}

impl<'a, G: GraphStore + ?Sized> PatternValidator<'a, G> {
    pub fn new(store: &'a G, strict_catalog: bool) -> Self {
        Self {
            store,
            strict_catalog,
            pre_bound: HashMap::new(),
        }
    }

    /// Register a variable bound by the caller
    pub fn with_bound(mut self, name: &'a str, kind: VariableKind) -> Self {
        self.pre_bound.insert(name, kind);
        self
    }

    /// Validate a graph pattern and return its declared variables
    pub fn validate(&self, pattern: &GraphPattern) -> Result<PatternVariables> {
        // Quantifier bounds are checked over the whole pattern first
        for path in &pattern.paths {
            check_quantifiers(&path.expression)?;
        }

        let mut vars = PatternVariables::default();
        for path in &pattern.paths {
            if let Some(name) = &path.variable {
                vars.declare(name, VariableKind::Path)?;
            }
            self.declare_expression(&path.expression, false, &mut vars)?;
        }

        for (name, &kind) in &self.pre_bound {
            if let Some(declared) = vars.kind(name) {
                if declared != kind {
                    return Err(Error::SemanticError(format!(
                        "Variable '{}' is bound to a {} but the pattern declares a {}",
                        name, kind, declared
                    )));
                }
            }
        }

        for path in &pattern.paths {
            self.check_expression_references(&path.expression, &vars)?;
        }
        if let Some(expr) = &pattern.where_clause {
            self.check_where(expr, &vars)?;
        }

        Ok(vars)
    }

    fn declare_expression(
        &self,
        expr: &PathPatternExpression,
        in_group: bool,
        vars: &mut PatternVariables,
    ) -> Result<()> {
        for term in expr.alternatives() {
            for factor in &term.factors {
                let grouped = in_group || factor.quantifier.is_some();
                match &factor.element {
                    PathElement::Node(node) => {
                        if let Some(name) = &node.variable {
                            let kind = VariableKind::Node;
                            vars.declare(name, if grouped { kind.grouped() } else { kind })?;
                        }
                    }
                    PathElement::Edge(edge) => {
                        if let Some(name) = &edge.variable {
                            let kind = VariableKind::Edge;
                            vars.declare(name, if grouped { kind.grouped() } else { kind })?;
                        }
                    }
                    PathElement::Parenthesized(paren) => {
                        if let Some(name) = &paren.subpath_variable {
                            if grouped {
                                return Err(Error::SemanticError(format!(
                                    "Subpath variable '{}' cannot be declared inside a quantified pattern",
                                    name
                                )));
                            }
                            vars.declare(name, VariableKind::Path)?;
                        }
                        self.declare_expression(&paren.expression, grouped, vars)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_expression_references(
        &self,
        expr: &PathPatternExpression,
        vars: &PatternVariables,
    ) -> Result<()> {
        for term in expr.alternatives() {
            for factor in &term.factors {
                match &factor.element {
                    PathElement::Node(node) => self.check_filler(
                        node.label_expr.as_ref(),
                        &node.properties,
                        node.where_clause.as_deref(),
                        vars,
                    )?,
                    PathElement::Edge(edge) => self.check_filler(
                        edge.label_expr.as_ref(),
                        &edge.properties,
                        edge.where_clause.as_deref(),
                        vars,
                    )?,
                    PathElement::Parenthesized(paren) => {
                        self.check_expression_references(&paren.expression, vars)?;
                        if let Some(expr) = &paren.where_clause {
                            self.check_where(expr, vars)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn check_filler(
        &self,
        label_expr: Option<&LabelExpression>,
        properties: &[(String, PropertyValue)],
        where_clause: Option<&Expression>,
        vars: &PatternVariables,
    ) -> Result<()> {
        if let Some(label_expr) = label_expr {
            self.check_labels(label_expr)?;
        }
        for (key, _) in properties {
            self.check_property_key(key)?;
        }
        if let Some(expr) = where_clause {
            self.check_where(expr, vars)?;
        }
        Ok(())
    }

    fn check_labels(&self, expr: &LabelExpression) -> Result<()> {
        if !self.strict_catalog {
            return Ok(());
        }
        match expr.label_names().into_iter().find(|l| !self.store.has_label(l)) {
            Some(label) => Err(Error::SemanticError(format!("Unknown label '{}'", label))),
            None => Ok(()),
        }
    }

    fn check_property_key(&self, key: &str) -> Result<()> {
        if self.strict_catalog && !self.store.has_property_key(key) {
            return Err(Error::SemanticError(format!("Unknown property key '{}'", key)));
        }
        Ok(())
    }

    fn check_where(&self, expr: &Expression, vars: &PatternVariables) -> Result<()> {
        let mut undefined = None;
        expr.for_each_variable(&mut |name| {
            if undefined.is_none() && vars.kind(name).is_none() && !self.pre_bound.contains_key(name)
            {
                undefined = Some(name);
            }
        });
        if let Some(name) = undefined {
            return Err(Error::SemanticError(format!(
                "Variable '{}' is not defined",
                name
            )));
        }

        let mut unknown_key = Ok(());
        expr.for_each_property_key(&mut |key| {
            if unknown_key.is_ok() {
                unknown_key = self.check_property_key(key);
            }
        });
        unknown_key
    }
}

/// Reject quantifiers whose lower bound exceeds the upper bound
fn check_quantifiers(expr: &PathPatternExpression) -> Result<()> {
    for term in expr.alternatives() {
        for factor in &term.factors {
            if let Some(PatternQuantifier::Range(min, max)) = factor.quantifier {
                if min > max {
                    return Err(Error::ConfigurationError(format!(
                        "Quantifier {{{},{}}} has lower bound greater than upper bound",
                        min, max
                    )));
                }
            }
            if let PathElement::Parenthesized(paren) = &factor.element {
                check_quantifiers(&paren.expression)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::query::parse;
    use crate::types::{label_set, Properties};

    fn sample_graph() -> Graph {
        let graph = Graph::new();
        let mut props = Properties::new();
        props.insert("name".to_string(), PropertyValue::from("Alice"));
        let a = graph.add_vertex_with_properties(label_set(["Person"]), props);
        let b = graph.add_vertex(label_set(["City"]));
        graph
            .add_edge(a, b, label_set(["LIVES_IN"]), Properties::new())
            .unwrap();
        graph
    }

    fn validate(text: &str, strict: bool) -> Result<PatternVariables> {
        let graph = sample_graph();
        let snapshot = graph.snapshot();
        let pattern = parse(text).unwrap();
        PatternValidator::new(&snapshot, strict).validate(&pattern)
    }

    #[test]
    fn test_declared_variable_kinds() {
        let vars = validate("p = (a:Person)-[e:LIVES_IN]->(b) ((x)-[r]->(y)){1,3}(z)", true).unwrap();
        assert_eq!(vars.kind("p"), Some(VariableKind::Path));
        assert_eq!(vars.kind("a"), Some(VariableKind::Node));
        assert_eq!(vars.kind("e"), Some(VariableKind::Edge));
        assert_eq!(vars.kind("x"), Some(VariableKind::NodeGroup));
        assert_eq!(vars.kind("r"), Some(VariableKind::EdgeGroup));
        let groups: Vec<&str> = vars.groups().map(|(n, _)| n).collect();
        assert_eq!(groups, vec!["x", "r", "y"]);
    }

    #[test]
    fn test_quantifier_bounds_rejected() {
        let err = validate("(a)-[]->{5,2}(b)", true).unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));

        // Bounds are checked before any semantic check
        let err = validate("((a:Missing)-[]->(b)){3,1}", true).unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }

    #[test]
    fn test_kind_conflicts() {
        assert!(matches!(
            validate("(a)-[a]->(b)", true),
            Err(Error::SemanticError(_))
        ));
        assert!(matches!(
            validate("(a)-[]->(b), (a)-[e]->*(c), (x)-[e]->(y)", true),
            Err(Error::SemanticError(_))
        ));
        assert!(matches!(
            validate("(a) (p = (b)-[]->(c))+", true),
            Err(Error::SemanticError(_))
        ));
        // Repeating a singleton variable is a join, not a conflict
        assert!(validate("(a)-[]->(b)-[]->(a)", true).is_ok());
    }

    #[test]
    fn test_unknown_catalog_entries() {
        assert!(matches!(
            validate("(a:Planet)", true),
            Err(Error::SemanticError(_))
        ));
        assert!(matches!(
            validate("(a {age: 3})", true),
            Err(Error::SemanticError(_))
        ));
        assert!(matches!(
            validate("(a) WHERE a.salary > 3", true),
            Err(Error::SemanticError(_))
        ));
        assert!(validate("(a:Planet {age: 3})", false).is_ok());
        assert!(validate("(a:!City WHERE a.name = 'Alice')-[:LIVES_IN|%]->(b)", true).is_ok());
    }

    #[test]
    fn test_undefined_where_variable() {
        assert!(matches!(
            validate("(a)-[]->(b) WHERE c.name = 'x'", false),
            Err(Error::SemanticError(_))
        ));

        let graph = sample_graph();
        let snapshot = graph.snapshot();
        let pattern = parse("(a)-[]->(b) WHERE c = a").unwrap();
        let result = PatternValidator::new(&snapshot, true)
            .with_bound("c", VariableKind::Node)
            .validate(&pattern);
        assert!(result.is_ok());

        let result = PatternValidator::new(&snapshot, true)
            .with_bound("a", VariableKind::Edge)
            .validate(&pattern);
        assert!(matches!(result, Err(Error::SemanticError(_))));
    }
}
