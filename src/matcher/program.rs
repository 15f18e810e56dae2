//! Path pattern compilation
//!
//! A path pattern is flattened into a small instruction list run by the
//! backtracking engine in `vm.rs`. Quantified factors become repeat loops
//! whose iteration counts are driven lazily, so unbounded quantifiers are
//! never expanded up front.

use crate::query::{
    EdgePattern, NodePattern, ParenthesizedPathPattern, PathElement, PathMode, PathPattern,
    PathPatternExpression, PathSearchPrefix, PatternQuantifier, VariableKind,
};

#[derive(Debug, Clone)]
pub(crate) enum Inst<'a> {
    /// Test the current vertex
    Node { pattern: &'a NodePattern, grouped: bool },
    /// Traverse one edge from the current vertex
    Edge { pattern: &'a EdgePattern, grouped: bool },
    /// Continue at the first target, retry the second on backtrack
    Split(usize, usize),
    Jump(usize),
    /// Push a repetition counter
    RepeatEnter,
    /// Loop head: fewer repetitions are tried first
    RepeatLoop {
        min: u64,
        max: Option<u64>,
        body: usize,
        exit: usize,
    },
    /// End of one iteration
    RepeatIter { head: usize, min: u64 },
    /// Pop the repetition counter
    RepeatExit,
    /// Start of a parenthesized sub-path
    GroupEnter { group: usize },
    /// End of a parenthesized sub-path
    GroupExit { group: usize },
    /// Whole pattern matched
    Match,
}

/// Parenthesized sub-path metadata
#[derive(Debug, Clone)]
pub(crate) struct Group<'a> {
    pub pattern: &'a ParenthesizedPathPattern,
    /// Inside a quantifier (its WHERE sees the latest iteration)
    pub grouped: bool,
}

impl Group<'_> {
    pub fn mode(&self) -> PathMode {
        self.pattern.path_mode.unwrap_or_default()
    }
}

/// Compiled path pattern
#[derive(Debug, Clone)]
pub(crate) struct Program<'a> {
    pub pattern: &'a PathPattern,
    pub insts: Vec<Inst<'a>>,
    pub groups: Vec<Group<'a>>,
    /// Group variables with their kinds, filled with empty lists when a
    /// match never reached them
    pub group_vars: Vec<(&'a str, VariableKind)>,
    /// Fewest edges any instantiation can have
    pub min_len: u64,
    /// Most edges any instantiation can have (`None` = unbounded)
    pub max_len: Option<u64>,
}

impl<'a> Program<'a> {
    pub fn compile(pattern: &'a PathPattern) -> Self {
        let mut compiler = Compiler {
            insts: Vec::new(),
            groups: Vec::new(),
            group_vars: Vec::new(),
        };
        compiler.expression(&pattern.expression, false);
        compiler.insts.push(Inst::Match);

        let (min_len, max_len) = length_bounds(&pattern.expression);
        Program {
            pattern,
            insts: compiler.insts,
            groups: compiler.groups,
            group_vars: compiler.group_vars,
            min_len,
            max_len,
        }
    }

    pub fn mode(&self) -> PathMode {
        self.pattern.mode()
    }

    pub fn search(&self) -> PathSearchPrefix {
        self.pattern.search()
    }

    /// Node pattern that every instantiation starts with, if any
    pub fn leading_node(&self) -> Option<&'a NodePattern> {
        match self.insts.first() {
            Some(Inst::Node { pattern, grouped: false }) => Some(*pattern),
            _ => None,
        }
    }
}

struct Compiler<'a> {
    insts: Vec<Inst<'a>>,
    groups: Vec<Group<'a>>,
    group_vars: Vec<(&'a str, VariableKind)>,
}

impl<'a> Compiler<'a> {
    fn emit(&mut self, inst: Inst<'a>) -> usize {
        self.insts.push(inst);
        self.insts.len() - 1
    }

    fn patch(&mut self, at: usize, inst: Inst<'a>) {
        self.insts[at] = inst;
    }

    fn group_var(&mut self, name: Option<&'a String>, kind: VariableKind) {
        if let Some(name) = name {
            if !self.group_vars.iter().any(|(n, _)| *n == name.as_str()) {
                self.group_vars.push((name.as_str(), kind));
            }
        }
    }

    fn expression(&mut self, expr: &'a PathPatternExpression, in_group: bool) {
        let alternatives = expr.alternatives();
        let mut jumps = Vec::new();
        for (i, term) in alternatives.iter().enumerate() {
            let split = (i + 1 < alternatives.len()).then(|| self.emit(Inst::Jump(0)));
            for factor in &term.factors {
                match factor.quantifier {
                    Some(q) => self.quantified(&factor.element, q),
                    None => self.element(&factor.element, in_group),
                }
            }
            if let Some(split) = split {
                jumps.push(self.emit(Inst::Jump(0)));
                let next = self.insts.len();
                self.patch(split, Inst::Split(split + 1, next));
            }
        }
        let end = self.insts.len();
        for at in jumps {
            self.patch(at, Inst::Jump(end));
        }
    }

    fn quantified(&mut self, element: &'a PathElement, quantifier: PatternQuantifier) {
        self.emit(Inst::RepeatEnter);
        let head = self.emit(Inst::Jump(0));
        self.element(element, true);
        self.emit(Inst::RepeatIter {
            head,
            min: quantifier.lower(),
        });
        let exit = self.emit(Inst::RepeatExit);
        self.patch(
            head,
            Inst::RepeatLoop {
                min: quantifier.lower(),
                max: quantifier.upper(),
                body: head + 1,
                exit,
            },
        );
    }

    fn element(&mut self, element: &'a PathElement, grouped: bool) {
        match element {
            PathElement::Node(pattern) => {
                if grouped {
                    self.group_var(pattern.variable.as_ref(), VariableKind::NodeGroup);
                }
                self.emit(Inst::Node { pattern, grouped });
            }
            PathElement::Edge(pattern) => {
                if grouped {
                    self.group_var(pattern.variable.as_ref(), VariableKind::EdgeGroup);
                }
                self.emit(Inst::Edge { pattern, grouped });
            }
            PathElement::Parenthesized(paren) => {
                let group = self.groups.len();
                self.groups.push(Group {
                    pattern: paren,
                    grouped,
                });
                self.emit(Inst::GroupEnter { group });
                self.expression(&paren.expression, grouped);
                self.emit(Inst::GroupExit { group });
            }
        }
    }
}

/// Static (min, max) edge counts of an expression
fn length_bounds(expr: &PathPatternExpression) -> (u64, Option<u64>) {
    let mut min = u64::MAX;
    let mut max = Some(0u64);
    for term in expr.alternatives() {
        let mut term_min = 0u64;
        let mut term_max = Some(0u64);
        for factor in &term.factors {
            let (f_min, f_max) = match &factor.element {
                PathElement::Node(_) => (0, Some(0)),
                PathElement::Edge(_) => (1, Some(1)),
                PathElement::Parenthesized(paren) => length_bounds(&paren.expression),
            };
            let (f_min, f_max) = match factor.quantifier {
                Some(q) => (
                    f_min.saturating_mul(q.lower()),
                    match (f_max, q.upper()) {
                        (Some(0), _) => Some(0),
                        (_, Some(0)) => Some(0),
                        (Some(m), Some(u)) => Some(m.saturating_mul(u)),
                        _ => None,
                    },
                ),
                None => (f_min, f_max),
            };
            term_min = term_min.saturating_add(f_min);
            term_max = match (term_max, f_max) {
                (Some(a), Some(b)) => Some(a.saturating_add(b)),
                _ => None,
            };
        }
        min = min.min(term_min);
        max = match (max, term_max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
    }
    (if min == u64::MAX { 0 } else { min }, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_path;

    fn bounds(text: &str) -> (u64, Option<u64>) {
        let path = parse_path(text).unwrap();
        let program = Program::compile(&path);
        (program.min_len, program.max_len)
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(bounds("(a)-[]->(b)-[]->(c)"), (2, Some(2)));
        assert_eq!(bounds("(a)-[]->*(b)"), (0, None));
        assert_eq!(bounds("(a)-[]->{2,4}(b)"), (2, Some(4)));
        assert_eq!(bounds("(a)((x)-[]->(y)-[]->(z)){1,3}(b)"), (2, Some(6)));
        assert_eq!(bounds("(a)-[]->(b) | (a)-[]->(b)-[]->(c)-[]->(d)"), (1, Some(3)));
        assert_eq!(bounds("(a)-[]->{0,0}(b)"), (0, Some(0)));
        assert_eq!(bounds("(a)((x))*(b)"), (0, Some(0)));
    }

    #[test]
    fn test_compiled_layout() {
        let path = parse_path("(a)-[e]->{1,2}(b)").unwrap();
        let program = Program::compile(&path);
        assert!(matches!(program.insts[0], Inst::Node { grouped: false, .. }));
        assert!(matches!(program.insts[1], Inst::RepeatEnter));
        assert!(matches!(
            program.insts[2],
            Inst::RepeatLoop { min: 1, max: Some(2), body: 3, exit: 5 }
        ));
        assert!(matches!(program.insts[3], Inst::Edge { grouped: true, .. }));
        assert!(matches!(program.insts[4], Inst::RepeatIter { head: 2, min: 1 }));
        assert!(matches!(program.insts[5], Inst::RepeatExit));
        assert!(matches!(program.insts[6], Inst::Node { .. }));
        assert!(matches!(program.insts[7], Inst::Match));
        assert_eq!(program.group_vars, vec![("e", VariableKind::EdgeGroup)]);
        assert!(program.leading_node().is_some());
    }

    #[test]
    fn test_union_layout() {
        let path = parse_path("(a)-[]->(b) | (c)").unwrap();
        let program = Program::compile(&path);
        // Split, first term, jump over the second term, second term, Match
        assert!(matches!(program.insts[0], Inst::Split(1, 5)));
        assert!(matches!(program.insts[4], Inst::Jump(6)));
        assert!(matches!(program.insts[5], Inst::Node { .. }));
        assert!(matches!(program.insts[6], Inst::Match));
        assert!(program.leading_node().is_none());
    }
}
