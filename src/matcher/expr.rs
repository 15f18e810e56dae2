//! WHERE expression evaluation
//!
//! Three-valued logic: any comparison involving NULL, and any operation on
//! mismatched types, yields NULL. A predicate passes only when it evaluates
//! to TRUE.

use crate::graph::{ElementId, GraphStore};
use crate::matcher::bindings::{Resolved, Scope};
use crate::query::{BinaryOperator, Expression, UnaryOperator};
use crate::types::PropertyValue;
use std::cmp::Ordering;

/// Runtime value of an expression
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Element(ElementId),
}

impl From<&PropertyValue> for Value {
    fn from(v: &PropertyValue) -> Self {
        match v {
            PropertyValue::Null => Value::Null,
            PropertyValue::Boolean(b) => Value::Bool(*b),
            PropertyValue::Integer(i) => Value::Int(*i),
            PropertyValue::Float(x) => Value::Float(*x),
            PropertyValue::String(s) => Value::Str(s.clone()),
            PropertyValue::List(items) => Value::List(items.iter().map(Value::from).collect()),
        }
    }
}

impl Value {
    fn truth(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn from_truth(t: Option<bool>) -> Value {
        t.map_or(Value::Null, Value::Bool)
    }
}

/// Whether `expr` evaluates to TRUE
pub(crate) fn holds<G: GraphStore + ?Sized>(expr: &Expression, scope: &Scope<'_, '_>, store: &G) -> bool {
    matches!(evaluate(expr, scope, store), Value::Bool(true))
}

pub(crate) fn evaluate<G: GraphStore + ?Sized>(
    expr: &Expression,
    scope: &Scope<'_, '_>,
    store: &G,
) -> Value {
    match expr {
        Expression::Literal(v) => Value::from(v),
        Expression::Variable(name) => match scope.lookup(name) {
            Some(Resolved::Element(e)) => Value::Element(e),
            Some(Resolved::Group(items)) => {
                Value::List(items.iter().map(|&e| Value::Element(e)).collect())
            }
            Some(Resolved::Path(path)) => Value::List(path.elements().map(Value::Element).collect()),
            None => Value::Null,
        },
        Expression::Property(name, key) => match scope.lookup(name) {
            Some(Resolved::Element(e)) => store
                .properties_of(e)
                .and_then(|props| props.get(key))
                .map_or(Value::Null, Value::from),
            _ => Value::Null,
        },
        Expression::List(items) => {
            Value::List(items.iter().map(|e| evaluate(e, scope, store)).collect())
        }
        Expression::UnaryOp(op, inner) => {
            let v = evaluate(inner, scope, store);
            match op {
                UnaryOperator::Not => Value::from_truth(v.truth().map(|b| !b)),
                UnaryOperator::Neg => match v {
                    Value::Int(i) => i.checked_neg().map_or(Value::Null, Value::Int),
                    Value::Float(x) => Value::Float(-x),
                    _ => Value::Null,
                },
                UnaryOperator::IsNull => Value::Bool(v == Value::Null),
                UnaryOperator::IsNotNull => Value::Bool(v != Value::Null),
            }
        }
        Expression::BinaryOp(left, op, right) => match op {
            BinaryOperator::And => {
                let l = evaluate(left, scope, store).truth();
                if l == Some(false) {
                    return Value::Bool(false);
                }
                match (l, evaluate(right, scope, store).truth()) {
                    (_, Some(false)) => Value::Bool(false),
                    (Some(true), Some(true)) => Value::Bool(true),
                    _ => Value::Null,
                }
            }
            BinaryOperator::Or => {
                let l = evaluate(left, scope, store).truth();
                if l == Some(true) {
                    return Value::Bool(true);
                }
                match (l, evaluate(right, scope, store).truth()) {
                    (_, Some(true)) => Value::Bool(true),
                    (Some(false), Some(false)) => Value::Bool(false),
                    _ => Value::Null,
                }
            }
            _ => {
                let l = evaluate(left, scope, store);
                let r = evaluate(right, scope, store);
                apply(*op, l, r)
            }
        },
    }
}

fn apply(op: BinaryOperator, l: Value, r: Value) -> Value {
    use BinaryOperator::*;
    match op {
        Xor => match (l.truth(), r.truth()) {
            (Some(a), Some(b)) => Value::Bool(a != b),
            _ => Value::Null,
        },
        Eq => Value::from_truth(equals(&l, &r)),
        Ne => Value::from_truth(equals(&l, &r).map(|b| !b)),
        Lt => Value::from_truth(compare(&l, &r).map(|o| o == Ordering::Less)),
        Le => Value::from_truth(compare(&l, &r).map(|o| o != Ordering::Greater)),
        Gt => Value::from_truth(compare(&l, &r).map(|o| o == Ordering::Greater)),
        Ge => Value::from_truth(compare(&l, &r).map(|o| o != Ordering::Less)),
        Add | Sub | Mul | Div | Mod => arithmetic(op, l, r),
        Contains | StartsWith | EndsWith => match (&l, &r) {
            (Value::Str(a), Value::Str(b)) => Value::Bool(match op {
                Contains => a.contains(b.as_str()),
                StartsWith => a.starts_with(b.as_str()),
                _ => a.ends_with(b.as_str()),
            }),
            _ => Value::Null,
        },
        In => match r {
            Value::List(items) => {
                let mut saw_null = false;
                for item in &items {
                    match equals(&l, item) {
                        Some(true) => return Value::Bool(true),
                        Some(false) => {}
                        None => saw_null = true,
                    }
                }
                if saw_null {
                    Value::Null
                } else {
                    Value::Bool(false)
                }
            }
            _ => Value::Null,
        },
        And | Or => Value::from_truth(match (l.truth(), r.truth()) {
            (Some(a), Some(b)) if op == And => Some(a && b),
            (Some(a), Some(b)) => Some(a || b),
            _ => None,
        }),
    }
}

/// Equality under three-valued logic; `None` is NULL
fn equals(l: &Value, r: &Value) -> Option<bool> {
    match (l, r) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
            Some((*a as f64) == *b)
        }
        (Value::List(a), Value::List(b)) => {
            if a.len() != b.len() {
                return Some(false);
            }
            let mut result = Some(true);
            for (x, y) in a.iter().zip(b) {
                match equals(x, y) {
                    Some(false) => return Some(false),
                    Some(true) => {}
                    None => result = None,
                }
            }
            result
        }
        (Value::Bool(a), Value::Bool(b)) => Some(a == b),
        (Value::Int(a), Value::Int(b)) => Some(a == b),
        (Value::Float(a), Value::Float(b)) => Some(a == b),
        (Value::Str(a), Value::Str(b)) => Some(a == b),
        (Value::Element(a), Value::Element(b)) => Some(a == b),
        _ => None,
    }
}

fn compare(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn arithmetic(op: BinaryOperator, l: Value, r: Value) -> Value {
    use BinaryOperator::*;
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                Add => a.checked_add(b),
                Sub => a.checked_sub(b),
                Mul => a.checked_mul(b),
                Div => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            result.map_or(Value::Null, Value::Int)
        }
        (Value::Str(a), Value::Str(b)) if op == Add => Value::Str(a + &b),
        (l, r) => {
            let (Some(a), Some(b)) = (as_float(&l), as_float(&r)) else {
                return Value::Null;
            };
            match op {
                Add => Value::Float(a + b),
                Sub => Value::Float(a - b),
                Mul => Value::Float(a * b),
                Div if b == 0.0 => Value::Null,
                Div => Value::Float(a / b),
                _ if b == 0.0 => Value::Null,
                _ => Value::Float(a % b),
            }
        }
    }
}

fn as_float(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(x) => Some(*x),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, VertexId};
    use crate::matcher::bindings::{Bindings, BoundElement, LocalBindings};
    use crate::query::parse;
    use crate::types::{label_set, Properties};

    fn eval_where(text: &str, graph: &Graph, local: &LocalBindings<'_>) -> Value {
        let pattern = parse(&format!("(a) WHERE {}", text)).unwrap();
        let expr = pattern.where_clause.unwrap();
        let seed = Bindings::new();
        let snapshot = graph.snapshot();
        let scope = Scope::new(local, &seed);
        evaluate(&expr, &scope, &snapshot)
    }

    fn person_graph() -> (Graph, VertexId) {
        let graph = Graph::new();
        let mut props = Properties::new();
        props.insert("name".to_string(), PropertyValue::from("Alice"));
        props.insert("age".to_string(), PropertyValue::from(30i64));
        props.insert("score".to_string(), PropertyValue::from(1.5f64));
        let a = graph.add_vertex_with_properties(label_set(["Person"]), props);
        (graph, a)
    }

    #[test]
    fn test_property_comparisons() {
        let (graph, a) = person_graph();
        let mut local = LocalBindings::new();
        local.insert("a", BoundElement::Vertex(a));

        assert_eq!(eval_where("a.age > 18", &graph, &local), Value::Bool(true));
        assert_eq!(eval_where("a.age = 30.0", &graph, &local), Value::Bool(true));
        assert_eq!(eval_where("a.score * 2 = 3", &graph, &local), Value::Bool(true));
        assert_eq!(
            eval_where("a.name STARTS WITH 'Al' AND a.name ENDS WITH 'ce'", &graph, &local),
            Value::Bool(true)
        );
        assert_eq!(eval_where("a.name CONTAINS 'z'", &graph, &local), Value::Bool(false));
        assert_eq!(eval_where("a.age IN [1, 30, 5]", &graph, &local), Value::Bool(true));
        assert_eq!(eval_where("a.age + 1 = 31", &graph, &local), Value::Bool(true));
        assert_eq!(eval_where("a.age % 7 = 2", &graph, &local), Value::Bool(true));
    }

    #[test]
    fn test_null_and_mismatch() {
        let (graph, a) = person_graph();
        let mut local = LocalBindings::new();
        local.insert("a", BoundElement::Vertex(a));

        assert_eq!(eval_where("a.missing = 1", &graph, &local), Value::Null);
        assert_eq!(eval_where("a.missing IS NULL", &graph, &local), Value::Bool(true));
        assert_eq!(eval_where("a.name IS NOT NULL", &graph, &local), Value::Bool(true));
        assert_eq!(eval_where("a.name > 3", &graph, &local), Value::Null);
        assert_eq!(eval_where("a.age / 0 = 1", &graph, &local), Value::Null);
        assert_eq!(eval_where("b.name = 'x'", &graph, &local), Value::Null);
        assert_eq!(eval_where("NOT (a.missing = 1)", &graph, &local), Value::Null);
    }

    #[test]
    fn test_three_valued_logic() {
        let (graph, a) = person_graph();
        let mut local = LocalBindings::new();
        local.insert("a", BoundElement::Vertex(a));

        assert_eq!(eval_where("a.missing = 1 AND false", &graph, &local), Value::Bool(false));
        assert_eq!(eval_where("a.missing = 1 AND true", &graph, &local), Value::Null);
        assert_eq!(eval_where("a.missing = 1 OR true", &graph, &local), Value::Bool(true));
        assert_eq!(eval_where("a.missing = 1 OR false", &graph, &local), Value::Null);
        assert_eq!(eval_where("true XOR false", &graph, &local), Value::Bool(true));
        assert_eq!(eval_where("a.age IN [1, null]", &graph, &local), Value::Null);
    }

    #[test]
    fn test_element_identity() {
        let (graph, a) = person_graph();
        let b = graph.add_vertex(label_set(["Person"]));
        let mut local = LocalBindings::new();
        local.insert("a", BoundElement::Vertex(a));
        local.insert("b", BoundElement::Vertex(b));
        local.insert("c", BoundElement::Vertex(a));

        assert_eq!(eval_where("a = c", &graph, &local), Value::Bool(true));
        assert_eq!(eval_where("a <> b", &graph, &local), Value::Bool(true));
        assert_eq!(eval_where("a = 1", &graph, &local), Value::Null);
    }
}
