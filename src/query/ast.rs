//! GQL graph pattern Abstract Syntax Tree (AST) - ISO/IEC 39075 subset
//!
//! This module defines the pattern-matching part of the GQL syntax tree:
//! graph patterns, path patterns with mode and search prefixes, quantified
//! path factors, element patterns, label expressions and the small WHERE
//! expression language evaluated against bound elements.
//!
//! Key GQL features:
//! - Path modes: WALK, TRAIL, SIMPLE, ACYCLIC
//! - Path search prefixes: ALL, ANY, ANY k, ALL SHORTEST, ANY SHORTEST, SHORTEST k [GROUPS]
//! - Match modes: REPEATABLE ELEMENTS, DIFFERENT EDGES
//! - Full label expressions with negation, conjunction, disjunction and wildcard
//! - Quantified edges and quantified parenthesized path patterns

use crate::types::PropertyValue;
use std::fmt;

pub use crate::types::EdgeDirection;

// ============================================================================
// Graph Pattern (ISO GQL 39075)
// ============================================================================

/// Graph pattern containing comma-separated path patterns
/// graphPattern: matchMode? pathPatternList graphPatternWhereClause?
#[derive(Debug, Clone, Default)]
pub struct GraphPattern {
    /// Match mode (REPEATABLE ELEMENTS or DIFFERENT EDGES)
    pub match_mode: Option<MatchMode>,
    /// List of path patterns (comma-separated in GQL)
    pub paths: Vec<PathPattern>,
    /// WHERE clause applied to joined results
    pub where_clause: Option<Expression>,
}

impl GraphPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: PathPattern) -> Self {
        self.paths.push(path);
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = Some(mode);
        self
    }

    pub fn with_where(mut self, expr: Expression) -> Self {
        self.where_clause = Some(expr);
        self
    }
}

impl fmt::Display for GraphPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(mode) = &self.match_mode {
            write!(f, "{} ", mode)?;
        }
        let paths: Vec<String> = self.paths.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", paths.join(", "))?;
        if let Some(expr) = &self.where_clause {
            write!(f, " WHERE {}", expr)?;
        }
        Ok(())
    }
}

/// Match mode (ISO GQL 39075)
/// matchMode: repeatableElementsMatchMode | differentEdgesMatchMode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// REPEATABLE ELEMENTS - allows repeated vertices and edges
    RepeatableElements,
    /// DIFFERENT EDGES - one edge may be bound at most once per result
    DifferentEdges,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::RepeatableElements => write!(f, "REPEATABLE ELEMENTS"),
            MatchMode::DifferentEdges => write!(f, "DIFFERENT EDGES"),
        }
    }
}

// ============================================================================
// Path Pattern (ISO GQL 39075)
// ============================================================================

/// Path pattern with optional prefixes
/// pathPattern: pathVariableDeclaration? pathPatternPrefix? pathPatternExpression
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// Path variable name (e.g., p = ...)
    pub variable: Option<String>,
    /// Path mode prefix (WALK, TRAIL, SIMPLE, ACYCLIC)
    pub path_mode: Option<PathMode>,
    /// Path search prefix (ALL, ANY, SHORTEST)
    pub search_prefix: Option<PathSearchPrefix>,
    /// Pattern body
    pub expression: PathPatternExpression,
}

impl PathPattern {
    pub fn new(expression: PathPatternExpression) -> Self {
        PathPattern {
            variable: None,
            path_mode: None,
            search_prefix: None,
            expression,
        }
    }

    pub fn with_variable(mut self, var: impl Into<String>) -> Self {
        self.variable = Some(var.into());
        self
    }

    pub fn with_mode(mut self, mode: PathMode) -> Self {
        self.path_mode = Some(mode);
        self
    }

    pub fn with_search(mut self, search: PathSearchPrefix) -> Self {
        self.search_prefix = Some(search);
        self
    }

    /// Effective path mode (absent = WALK)
    pub fn mode(&self) -> PathMode {
        self.path_mode.unwrap_or_default()
    }

    /// Effective search prefix (absent = ALL)
    pub fn search(&self) -> PathSearchPrefix {
        self.search_prefix.clone().unwrap_or(PathSearchPrefix::All)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(var) = &self.variable {
            write!(f, "{} = ", var)?;
        }
        if let Some(search) = &self.search_prefix {
            write!(f, "{} ", search)?;
        }
        if let Some(mode) = &self.path_mode {
            write!(f, "{} ", mode)?;
        }
        write!(f, "{}", self.expression)
    }
}

/// Path pattern expression (ISO GQL 39075)
/// pathPatternExpression: pathTerm | pathTerm (MULTISET_ALTERNATION_OPERATOR pathTerm)+ | pathTerm (VERTICAL_BAR pathTerm)+
#[derive(Debug, Clone)]
pub enum PathPatternExpression {
    /// Single path term
    Term(PathTerm),
    /// Pattern union (|): matches any of the path terms
    Union(Vec<PathTerm>),
    /// Multiset alternation (|+|): returns all matches from all alternatives
    MultisetAlternation(Vec<PathTerm>),
}

impl PathPatternExpression {
    /// Alternatives in left-to-right order (a single term is one alternative)
    pub fn alternatives(&self) -> &[PathTerm] {
        match self {
            PathPatternExpression::Term(term) => std::slice::from_ref(term),
            PathPatternExpression::Union(terms)
            | PathPatternExpression::MultisetAlternation(terms) => terms,
        }
    }
}

impl Default for PathPatternExpression {
    fn default() -> Self {
        PathPatternExpression::Term(PathTerm::default())
    }
}

impl From<PathTerm> for PathPatternExpression {
    fn from(term: PathTerm) -> Self {
        PathPatternExpression::Term(term)
    }
}

impl fmt::Display for PathPatternExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |terms: &[PathTerm], sep: &str| {
            terms
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(sep)
        };
        match self {
            PathPatternExpression::Term(term) => write!(f, "{}", term),
            PathPatternExpression::Union(terms) => write!(f, "{}", join(terms, " | ")),
            PathPatternExpression::MultisetAlternation(terms) => {
                write!(f, "{}", join(terms, " |+| "))
            }
        }
    }
}

/// Path term: concatenation of path factors
/// pathTerm: pathFactor+
#[derive(Debug, Clone, Default)]
pub struct PathTerm {
    pub factors: Vec<PathFactor>,
}

impl PathTerm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, node: NodePattern) -> Self {
        self.factors.push(PathFactor::new(PathElement::Node(node)));
        self
    }

    pub fn edge(mut self, edge: EdgePattern) -> Self {
        self.factors.push(PathFactor::new(PathElement::Edge(edge)));
        self
    }

    pub fn factor(mut self, factor: PathFactor) -> Self {
        self.factors.push(factor);
        self
    }
}

impl fmt::Display for PathTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for factor in &self.factors {
            write!(f, "{}", factor)?;
        }
        Ok(())
    }
}

/// Path factor: a path primary with an optional quantifier
/// pathFactor: pathPrimary | quantifiedPathPrimary | questionedPathPrimary
#[derive(Debug, Clone)]
pub struct PathFactor {
    pub element: PathElement,
    pub quantifier: Option<PatternQuantifier>,
}

impl PathFactor {
    pub fn new(element: PathElement) -> Self {
        PathFactor {
            element,
            quantifier: None,
        }
    }

    pub fn with_quantifier(mut self, quantifier: PatternQuantifier) -> Self {
        self.quantifier = Some(quantifier);
        self
    }
}

impl fmt::Display for PathFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element)?;
        if let Some(q) = &self.quantifier {
            write!(f, "{}", q)?;
        }
        Ok(())
    }
}

/// Path element: node, edge, or parenthesized path pattern
#[derive(Debug, Clone)]
pub enum PathElement {
    Node(NodePattern),
    Edge(EdgePattern),
    /// Parenthesized path pattern expression (ISO GQL 39075)
    Parenthesized(Box<ParenthesizedPathPattern>),
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Node(n) => write!(f, "{}", n),
            PathElement::Edge(e) => write!(f, "{}", e),
            PathElement::Parenthesized(p) => write!(f, "{}", p),
        }
    }
}

/// Parenthesized path pattern expression (ISO GQL 39075)
/// parenthesizedPathPatternExpression: LEFT_PAREN subpathVariableDeclaration? pathModePrefix? pathPatternExpression parenthesizedPathPatternWhereClause? RIGHT_PAREN
#[derive(Debug, Clone)]
pub struct ParenthesizedPathPattern {
    /// Subpath variable name (e.g., p = ...)
    pub subpath_variable: Option<String>,
    /// Path mode prefix applying to the sub-path only
    pub path_mode: Option<PathMode>,
    /// Inner path pattern expression
    pub expression: PathPatternExpression,
    /// WHERE clause inside the parenthesized path pattern
    pub where_clause: Option<Expression>,
}

impl ParenthesizedPathPattern {
    pub fn new(expression: PathPatternExpression) -> Self {
        ParenthesizedPathPattern {
            subpath_variable: None,
            path_mode: None,
            expression,
            where_clause: None,
        }
    }

    pub fn with_subpath_variable(mut self, var: impl Into<String>) -> Self {
        self.subpath_variable = Some(var.into());
        self
    }

    pub fn with_mode(mut self, mode: PathMode) -> Self {
        self.path_mode = Some(mode);
        self
    }

    pub fn with_where(mut self, expr: Expression) -> Self {
        self.where_clause = Some(expr);
        self
    }
}

impl fmt::Display for ParenthesizedPathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        if let Some(var) = &self.subpath_variable {
            write!(f, "{} = ", var)?;
        }
        if let Some(mode) = &self.path_mode {
            write!(f, "{} ", mode)?;
        }
        write!(f, "{}", self.expression)?;
        if let Some(expr) = &self.where_clause {
            write!(f, " WHERE {}", expr)?;
        }
        write!(f, ")")
    }
}

/// Path mode prefix (ISO GQL 39075)
/// pathModePrefix: WALK | TRAIL | SIMPLE | ACYCLIC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathMode {
    /// WALK - any path, vertices and edges can repeat (default)
    #[default]
    Walk,
    /// TRAIL - edges must be distinct, vertices may repeat
    Trail,
    /// SIMPLE - vertices must be distinct (except start/end for cycles)
    Simple,
    /// ACYCLIC - vertices must be distinct, no cycles allowed
    Acyclic,
}

impl fmt::Display for PathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathMode::Walk => write!(f, "WALK"),
            PathMode::Trail => write!(f, "TRAIL"),
            PathMode::Simple => write!(f, "SIMPLE"),
            PathMode::Acyclic => write!(f, "ACYCLIC"),
        }
    }
}

/// Path search prefix (ISO GQL 39075)
/// pathSearchPrefix: ALL | ANY | allShortestPathSearch | anyShortestPathSearch | countedShortestPathSearch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSearchPrefix {
    /// ALL PATH - return all matching paths
    All,
    /// ANY - return any single matching path
    Any,
    /// ANY k - return k matching paths
    AnyK(u64),
    /// ALL SHORTEST - return all shortest paths
    AllShortest,
    /// ANY SHORTEST (or bare SHORTEST) - return any single shortest path
    AnyShortest,
    /// SHORTEST k - return k shortest paths
    ShortestK(u64),
    /// SHORTEST k GROUPS - return shortest paths grouped by length
    ShortestKGroups(u64),
}

impl PathSearchPrefix {
    /// Whether results must be produced in non-decreasing length order
    pub fn is_shortest(&self) -> bool {
        matches!(
            self,
            PathSearchPrefix::AllShortest
                | PathSearchPrefix::AnyShortest
                | PathSearchPrefix::ShortestK(_)
                | PathSearchPrefix::ShortestKGroups(_)
        )
    }
}

impl fmt::Display for PathSearchPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSearchPrefix::All => write!(f, "ALL"),
            PathSearchPrefix::Any => write!(f, "ANY"),
            PathSearchPrefix::AnyK(k) => write!(f, "ANY {}", k),
            PathSearchPrefix::AllShortest => write!(f, "ALL SHORTEST"),
            PathSearchPrefix::AnyShortest => write!(f, "ANY SHORTEST"),
            PathSearchPrefix::ShortestK(k) => write!(f, "SHORTEST {}", k),
            PathSearchPrefix::ShortestKGroups(k) => write!(f, "SHORTEST {} GROUPS", k),
        }
    }
}

/// Pattern quantifier (ISO GQL 39075)
/// graphPatternQuantifier: ASTERISK | PLUS_SIGN | fixedQuantifier | generalQuantifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternQuantifier {
    /// * - zero or more
    ZeroOrMore,
    /// + - one or more
    OneOrMore,
    /// ? - zero or one
    ZeroOrOne,
    /// {n} - exactly n times
    Exactly(u64),
    /// {n,} - at least n times
    AtLeast(u64),
    /// {,m} - at most m times
    AtMost(u64),
    /// {n,m} - between n and m times
    Range(u64, u64),
}

impl PatternQuantifier {
    /// Lower bound on repetitions
    pub fn lower(&self) -> u64 {
        match self {
            PatternQuantifier::ZeroOrMore
            | PatternQuantifier::ZeroOrOne
            | PatternQuantifier::AtMost(_) => 0,
            PatternQuantifier::OneOrMore => 1,
            PatternQuantifier::Exactly(n)
            | PatternQuantifier::AtLeast(n)
            | PatternQuantifier::Range(n, _) => *n,
        }
    }

    /// Upper bound on repetitions (`None` = unbounded)
    pub fn upper(&self) -> Option<u64> {
        match self {
            PatternQuantifier::ZeroOrMore
            | PatternQuantifier::OneOrMore
            | PatternQuantifier::AtLeast(_) => None,
            PatternQuantifier::ZeroOrOne => Some(1),
            PatternQuantifier::Exactly(n)
            | PatternQuantifier::AtMost(n)
            | PatternQuantifier::Range(_, n) => Some(*n),
        }
    }
}

impl fmt::Display for PatternQuantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternQuantifier::ZeroOrMore => write!(f, "*"),
            PatternQuantifier::OneOrMore => write!(f, "+"),
            PatternQuantifier::ZeroOrOne => write!(f, "?"),
            PatternQuantifier::Exactly(n) => write!(f, "{{{}}}", n),
            PatternQuantifier::AtLeast(n) => write!(f, "{{{},}}", n),
            PatternQuantifier::AtMost(m) => write!(f, "{{,{}}}", m),
            PatternQuantifier::Range(n, m) => write!(f, "{{{},{}}}", n, m),
        }
    }
}

// ============================================================================
// Node Pattern (ISO GQL 39075)
// ============================================================================

/// Node pattern
/// nodePattern: LEFT_PAREN elementPatternFiller RIGHT_PAREN
#[derive(Debug, Clone, Default)]
pub struct NodePattern {
    /// Variable name
    pub variable: Option<String>,
    /// Label expression
    pub label_expr: Option<LabelExpression>,
    /// Property filter
    pub properties: Vec<(String, PropertyValue)>,
    /// WHERE predicate within the pattern
    pub where_clause: Option<Box<Expression>>,
}

impl NodePattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, var: impl Into<String>) -> Self {
        self.variable = Some(var.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let new_label = LabelExpression::Label(label.into());
        self.label_expr = Some(match self.label_expr {
            Some(expr) => LabelExpression::Conjunction(vec![expr, new_label]),
            None => new_label,
        });
        self
    }

    pub fn with_label_expr(mut self, expr: LabelExpression) -> Self {
        self.label_expr = Some(expr);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.push((key.into(), value));
        self
    }

    pub fn with_where(mut self, expr: Expression) -> Self {
        self.where_clause = Some(Box::new(expr));
        self
    }
}

impl fmt::Display for NodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        write_filler(
            f,
            self.variable.as_deref(),
            self.label_expr.as_ref(),
            &self.properties,
            self.where_clause.as_deref(),
        )?;
        write!(f, ")")
    }
}

// ============================================================================
// Edge Pattern (ISO GQL 39075)
// ============================================================================

/// Edge pattern
/// edgePattern: fullEdgePattern | abbreviatedEdgePattern
#[derive(Debug, Clone)]
pub struct EdgePattern {
    /// Variable name
    pub variable: Option<String>,
    /// Label expression
    pub label_expr: Option<LabelExpression>,
    /// Edge direction
    pub direction: EdgeDirection,
    /// Abbreviated form (`->`, `~`, ...) carries no filler
    pub abbreviated: bool,
    /// Property filter
    pub properties: Vec<(String, PropertyValue)>,
    /// WHERE predicate within the pattern
    pub where_clause: Option<Box<Expression>>,
}

impl EdgePattern {
    pub fn new(direction: EdgeDirection) -> Self {
        EdgePattern {
            variable: None,
            label_expr: None,
            direction,
            abbreviated: false,
            properties: Vec::new(),
            where_clause: None,
        }
    }

    pub fn abbreviated(direction: EdgeDirection) -> Self {
        EdgePattern {
            abbreviated: true,
            ..Self::new(direction)
        }
    }

    pub fn with_variable(mut self, var: impl Into<String>) -> Self {
        self.variable = Some(var.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let new_label = LabelExpression::Label(label.into());
        // Edge types use disjunction (OR) by default: :TYPE1|TYPE2
        self.label_expr = Some(match self.label_expr {
            Some(expr) => LabelExpression::Disjunction(vec![expr, new_label]),
            None => new_label,
        });
        self
    }

    pub fn with_label_expr(mut self, expr: LabelExpression) -> Self {
        self.label_expr = Some(expr);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.push((key.into(), value));
        self
    }

    pub fn with_where(mut self, expr: Expression) -> Self {
        self.where_clause = Some(Box::new(expr));
        self
    }
}

impl fmt::Display for EdgePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.direction {
            EdgeDirection::Right => ("-[", "]->"),
            EdgeDirection::Left => ("<-[", "]-"),
            EdgeDirection::Undirected => ("~[", "]~"),
            EdgeDirection::AnyDirection => ("-[", "]-"),
            EdgeDirection::LeftOrUndirected => ("<~[", "]~"),
            EdgeDirection::UndirectedOrRight => ("~[", "]~>"),
            EdgeDirection::LeftOrRight => ("<-[", "]->"),
        };
        if self.abbreviated {
            return write!(f, "{}", self.direction);
        }
        write!(f, "{}", open)?;
        write_filler(
            f,
            self.variable.as_deref(),
            self.label_expr.as_ref(),
            &self.properties,
            self.where_clause.as_deref(),
        )?;
        write!(f, "{}", close)
    }
}

fn write_filler(
    f: &mut fmt::Formatter<'_>,
    variable: Option<&str>,
    label_expr: Option<&LabelExpression>,
    properties: &[(String, PropertyValue)],
    where_clause: Option<&Expression>,
) -> fmt::Result {
    if let Some(var) = variable {
        write!(f, "{}", var)?;
    }
    if let Some(label) = label_expr {
        write!(f, ":{}", label)?;
    }
    if !properties.is_empty() {
        let props: Vec<String> = properties
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        write!(f, " {{{}}}", props.join(", "))?;
    }
    if let Some(expr) = where_clause {
        write!(f, " WHERE {}", expr)?;
    }
    Ok(())
}

// ============================================================================
// Label Expression (ISO GQL 39075)
// ============================================================================

/// Label expression supporting negation, conjunction, and disjunction
/// labelExpression: labelTerm (VERTICAL_BAR labelTerm)*
/// labelTerm: labelFactor (AMPERSAND labelFactor)*
/// labelFactor: labelNegation | labelPrimary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelExpression {
    /// Single label name
    Label(String),
    /// Wildcard (%) - matches any label set
    Wildcard,
    /// Negation (!label)
    Negation(Box<LabelExpression>),
    /// Conjunction (label1 & label2) - must have all labels
    Conjunction(Vec<LabelExpression>),
    /// Disjunction (label1 | label2) - must have any of the labels
    Disjunction(Vec<LabelExpression>),
}

impl LabelExpression {
    /// All label names referenced by this expression
    pub fn label_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            LabelExpression::Label(name) => out.push(name),
            LabelExpression::Wildcard => {}
            LabelExpression::Negation(inner) => inner.collect_names(out),
            LabelExpression::Conjunction(exprs) | LabelExpression::Disjunction(exprs) => {
                for e in exprs {
                    e.collect_names(out);
                }
            }
        }
    }
}

impl fmt::Display for LabelExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelExpression::Label(label) => write!(f, "{}", label),
            LabelExpression::Wildcard => write!(f, "%"),
            LabelExpression::Negation(expr) => match expr.as_ref() {
                LabelExpression::Conjunction(_) | LabelExpression::Disjunction(_) => {
                    write!(f, "!({})", expr)
                }
                _ => write!(f, "!{}", expr),
            },
            LabelExpression::Conjunction(exprs) => {
                let labels: Vec<String> = exprs
                    .iter()
                    .map(|e| match e {
                        LabelExpression::Disjunction(_) => format!("({})", e),
                        _ => e.to_string(),
                    })
                    .collect();
                write!(f, "{}", labels.join("&"))
            }
            LabelExpression::Disjunction(exprs) => {
                let labels: Vec<String> = exprs.iter().map(|e| e.to_string()).collect();
                write!(f, "{}", labels.join("|"))
            }
        }
    }
}

// ============================================================================
// Expression (ISO GQL 39075)
// ============================================================================

/// GQL value expression used by WHERE clauses
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value
    Literal(PropertyValue),
    /// Variable reference
    Variable(String),
    /// Property access (variable, property_name)
    Property(String, String),
    /// Binary operation
    BinaryOp(Box<Expression>, BinaryOperator, Box<Expression>),
    /// Unary operation
    UnaryOp(UnaryOperator, Box<Expression>),
    /// List expression
    List(Vec<Expression>),
}

impl Expression {
    pub fn literal(value: impl Into<PropertyValue>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn property(var: impl Into<String>, key: impl Into<String>) -> Self {
        Expression::Property(var.into(), key.into())
    }

    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::BinaryOp(Box::new(left), op, Box::new(right))
    }

    /// Visit every variable name referenced in this expression
    pub fn for_each_variable<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Expression::Literal(_) => {}
            Expression::Variable(v) | Expression::Property(v, _) => f(v),
            Expression::BinaryOp(l, _, r) => {
                l.for_each_variable(f);
                r.for_each_variable(f);
            }
            Expression::UnaryOp(_, e) => e.for_each_variable(f),
            Expression::List(items) => {
                for item in items {
                    item.for_each_variable(f);
                }
            }
        }
    }

    /// Visit every property key referenced in this expression
    pub fn for_each_property_key<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Expression::Property(_, key) => f(key),
            Expression::BinaryOp(l, _, r) => {
                l.for_each_property_key(f);
                r.for_each_property_key(f);
            }
            Expression::UnaryOp(_, e) => e.for_each_property_key(f),
            Expression::List(items) => {
                for item in items {
                    item.for_each_property_key(f);
                }
            }
            Expression::Literal(_) | Expression::Variable(_) => {}
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(v) => write!(f, "{}", v),
            Expression::Variable(v) => write!(f, "{}", v),
            Expression::Property(v, k) => write!(f, "{}.{}", v, k),
            Expression::BinaryOp(l, op, r) => write!(f, "({} {} {})", l, op, r),
            Expression::UnaryOp(op @ (UnaryOperator::IsNull | UnaryOperator::IsNotNull), e) => {
                write!(f, "({} {})", e, op)
            }
            Expression::UnaryOp(op, e) => write!(f, "{} {}", op, e),
            Expression::List(items) => {
                let parts: Vec<String> = items.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    Xor,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // String
    Contains,
    StartsWith,
    EndsWith,
    // List
    In,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOperator::Eq => write!(f, "="),
            BinaryOperator::Ne => write!(f, "<>"),
            BinaryOperator::Lt => write!(f, "<"),
            BinaryOperator::Le => write!(f, "<="),
            BinaryOperator::Gt => write!(f, ">"),
            BinaryOperator::Ge => write!(f, ">="),
            BinaryOperator::And => write!(f, "AND"),
            BinaryOperator::Or => write!(f, "OR"),
            BinaryOperator::Xor => write!(f, "XOR"),
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Sub => write!(f, "-"),
            BinaryOperator::Mul => write!(f, "*"),
            BinaryOperator::Div => write!(f, "/"),
            BinaryOperator::Mod => write!(f, "%"),
            BinaryOperator::Contains => write!(f, "CONTAINS"),
            BinaryOperator::StartsWith => write!(f, "STARTS WITH"),
            BinaryOperator::EndsWith => write!(f, "ENDS WITH"),
            BinaryOperator::In => write!(f, "IN"),
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Neg,
    IsNull,
    IsNotNull,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Not => write!(f, "NOT"),
            UnaryOperator::Neg => write!(f, "-"),
            UnaryOperator::IsNull => write!(f, "IS NULL"),
            UnaryOperator::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantifier_bounds() {
        assert_eq!(PatternQuantifier::ZeroOrMore.lower(), 0);
        assert_eq!(PatternQuantifier::ZeroOrMore.upper(), None);
        assert_eq!(PatternQuantifier::OneOrMore.lower(), 1);
        assert_eq!(PatternQuantifier::ZeroOrOne.upper(), Some(1));
        assert_eq!(PatternQuantifier::AtMost(4).lower(), 0);
        assert_eq!(PatternQuantifier::Range(2, 5).upper(), Some(5));
    }

    #[test]
    fn test_pattern_display() {
        let term = PathTerm::new()
            .node(NodePattern::new().with_variable("a").with_label("Person"))
            .edge(EdgePattern::new(EdgeDirection::Right).with_label("KNOWS"))
            .node(NodePattern::new().with_variable("b"));
        let path = PathPattern::new(term.into())
            .with_search(PathSearchPrefix::AllShortest)
            .with_mode(PathMode::Trail);

        assert_eq!(path.to_string(), "ALL SHORTEST TRAIL (a:Person)-[:KNOWS]->(b)");
        assert_eq!(path.mode(), PathMode::Trail);
    }

    #[test]
    fn test_label_names() {
        let expr = LabelExpression::Conjunction(vec![
            LabelExpression::Label("A".into()),
            LabelExpression::Negation(Box::new(LabelExpression::Disjunction(vec![
                LabelExpression::Label("B".into()),
                LabelExpression::Wildcard,
            ]))),
        ]);
        assert_eq!(expr.label_names(), vec!["A", "B"]);
        assert_eq!(expr.to_string(), "A&!(B|%)");
    }
}
