//! Label expression evaluation

use crate::query::LabelExpression;
use crate::types::LabelSet;

impl LabelExpression {
    /// Evaluate against an element's label set
    pub fn matches(&self, labels: &LabelSet) -> bool {
        self.matches_with(&mut |label| labels.contains(label))
    }

    /// Evaluate with a caller-supplied membership test.
    ///
    /// Conjunction stops at the first false operand and disjunction at the
    /// first true one, so `has_label` is called only as often as needed.
    pub fn matches_with(&self, has_label: &mut impl FnMut(&str) -> bool) -> bool {
        match self {
            LabelExpression::Label(name) => has_label(name),
            LabelExpression::Wildcard => true,
            LabelExpression::Negation(inner) => !inner.matches_with(has_label),
            LabelExpression::Conjunction(exprs) => exprs.iter().all(|e| e.matches_with(has_label)),
            LabelExpression::Disjunction(exprs) => exprs.iter().any(|e| e.matches_with(has_label)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::label_set;

    fn label(name: &str) -> LabelExpression {
        LabelExpression::Label(name.to_string())
    }

    fn not(e: LabelExpression) -> LabelExpression {
        LabelExpression::Negation(Box::new(e))
    }

    fn and(a: LabelExpression, b: LabelExpression) -> LabelExpression {
        LabelExpression::Conjunction(vec![a, b])
    }

    fn or(a: LabelExpression, b: LabelExpression) -> LabelExpression {
        LabelExpression::Disjunction(vec![a, b])
    }

    #[test]
    fn test_basic_label_matching() {
        let labels = label_set(["Person", "Employee"]);
        assert!(label("Person").matches(&labels));
        assert!(!label("City").matches(&labels));
        assert!(LabelExpression::Wildcard.matches(&labels));
        assert!(LabelExpression::Wildcard.matches(&LabelSet::new()));
        assert!(not(label("City")).matches(&labels));
        assert!(and(label("Person"), label("Employee")).matches(&labels));
        assert!(!and(label("Person"), label("City")).matches(&labels));
        assert!(or(label("City"), label("Employee")).matches(&labels));
    }

    #[test]
    fn test_boolean_laws_over_all_label_sets() {
        let universe = ["A", "B", "C"];
        let operands = vec![
            label("A"),
            label("B"),
            not(label("C")),
            LabelExpression::Wildcard,
            or(label("A"), label("C")),
        ];

        for mask in 0..(1u8 << universe.len()) {
            let labels = label_set(
                universe
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, l)| *l),
            );
            for e1 in &operands {
                for e2 in &operands {
                    let (m1, m2) = (e1.matches(&labels), e2.matches(&labels));
                    assert_eq!(and(e1.clone(), e2.clone()).matches(&labels), m1 && m2);
                    assert_eq!(or(e1.clone(), e2.clone()).matches(&labels), m1 || m2);
                    assert_eq!(not(e1.clone()).matches(&labels), !m1);
                    // De Morgan
                    assert_eq!(
                        not(and(e1.clone(), e2.clone())).matches(&labels),
                        or(not(e1.clone()), not(e2.clone())).matches(&labels)
                    );
                    assert_eq!(
                        not(or(e1.clone(), e2.clone())).matches(&labels),
                        and(not(e1.clone()), not(e2.clone())).matches(&labels)
                    );
                }
            }
        }
    }

    #[test]
    fn test_short_circuit() {
        let labels = label_set(["A"]);
        let mut calls = 0;
        let mut has_label = |l: &str| {
            calls += 1;
            labels.contains(l)
        };

        let expr = LabelExpression::Disjunction(vec![label("A"), label("B"), label("C")]);
        assert!(expr.matches_with(&mut has_label));
        assert_eq!(calls, 1);

        calls = 0;
        let mut has_label = |l: &str| {
            calls += 1;
            labels.contains(l)
        };
        let expr = LabelExpression::Conjunction(vec![label("B"), label("A"), label("C")]);
        assert!(!expr.matches_with(&mut has_label));
        assert_eq!(calls, 1);
    }
}
