//! GQL Pattern Parser - ISO/IEC 39075 subset
//!
//! Parses GQL graph pattern text (the MATCH clause body) into AST structures.
//!
//! ```text
//! [MATCH] [REPEATABLE ELEMENTS | DIFFERENT EDGES]
//!     pathPattern (',' pathPattern)* [WHERE expression]
//! ```

use crate::error::{Error, Result};
use crate::query::ast::*;
use crate::types::PropertyValue;

/// GQL Parser
pub struct GqlParser {
    input: String,
    pos: usize,
}

impl GqlParser {
    /// Create a new parser
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            pos: 0,
        }
    }

    /// Parse a complete graph pattern; trailing input is an error
    pub fn parse(&mut self) -> Result<GraphPattern> {
        self.try_keyword("MATCH");
        let pattern = self.parse_graph_pattern()?;

        self.try_char(';');
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(format!(
                "Unexpected input '{}'",
                self.input[self.pos..].chars().take(16).collect::<String>()
            )));
        }
        Ok(pattern)
    }

    // ========================================================================
    // Graph Pattern Parsing (ISO GQL 39075)
    // ========================================================================

    /// Parse match mode
    fn parse_match_mode(&mut self) -> Result<Option<MatchMode>> {
        if self.try_keyword("REPEATABLE") {
            self.expect_keyword("ELEMENTS")?;
            Ok(Some(MatchMode::RepeatableElements))
        } else if self.try_keyword("DIFFERENT") {
            self.expect_keyword("EDGES")?;
            Ok(Some(MatchMode::DifferentEdges))
        } else {
            Ok(None)
        }
    }

    /// Parse graph pattern (comma-separated path patterns)
    /// graphPattern: matchMode? pathPatternList graphPatternWhereClause?
    fn parse_graph_pattern(&mut self) -> Result<GraphPattern> {
        let match_mode = self.parse_match_mode()?;

        let mut paths = vec![self.parse_path_pattern()?];
        while self.try_char(',') {
            paths.push(self.parse_path_pattern()?);
        }

        let where_clause = if self.try_keyword("WHERE") {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(GraphPattern {
            match_mode,
            paths,
            where_clause,
        })
    }

    /// Parse path pattern with optional prefix (ISO GQL 39075)
    /// pathPattern: pathVariableDeclaration? pathPatternPrefix? pathPatternExpression
    fn parse_path_pattern(&mut self) -> Result<PathPattern> {
        let variable = self.try_parse_variable_declaration()?;
        let (path_mode, search_prefix) = self.parse_path_prefixes()?;
        let expression = self.parse_path_pattern_expression()?;

        Ok(PathPattern {
            variable,
            path_mode,
            search_prefix,
            expression,
        })
    }

    /// Parse `name =` ahead of a path or subpath; backtracks if absent
    fn try_parse_variable_declaration(&mut self) -> Result<Option<String>> {
        self.skip_whitespace();
        if !self.peek_char_is_alpha() {
            return Ok(None);
        }

        let start_pos = self.pos;
        let ident = self.parse_identifier()?;
        if self.try_char('=') {
            return Ok(Some(ident));
        }
        // Not a variable declaration, backtrack
        self.pos = start_pos;
        Ok(None)
    }

    /// Path mode and search prefixes may appear in either order, each
    /// optionally followed by PATH or PATHS
    fn parse_path_prefixes(&mut self) -> Result<(Option<PathMode>, Option<PathSearchPrefix>)> {
        let mut mode = None;
        let mut search = None;

        loop {
            if search.is_none() {
                if let Some(prefix) = self.parse_path_search_prefix()? {
                    search = Some(prefix);
                    self.skip_path_keyword();
                    continue;
                }
            }
            if mode.is_none() {
                if let Some(m) = self.parse_path_mode()? {
                    mode = Some(m);
                    self.skip_path_keyword();
                    continue;
                }
            }
            break;
        }

        Ok((mode, search))
    }

    fn skip_path_keyword(&mut self) {
        let _ = self.try_keyword("PATHS") || self.try_keyword("PATH");
    }

    /// Parse path mode prefix
    fn parse_path_mode(&mut self) -> Result<Option<PathMode>> {
        if self.try_keyword("WALK") {
            Ok(Some(PathMode::Walk))
        } else if self.try_keyword("TRAIL") {
            Ok(Some(PathMode::Trail))
        } else if self.try_keyword("SIMPLE") {
            Ok(Some(PathMode::Simple))
        } else if self.try_keyword("ACYCLIC") {
            Ok(Some(PathMode::Acyclic))
        } else {
            Ok(None)
        }
    }

    /// Parse path search prefix
    fn parse_path_search_prefix(&mut self) -> Result<Option<PathSearchPrefix>> {
        if self.try_keyword("ALL") {
            if self.try_keyword("SHORTEST") {
                Ok(Some(PathSearchPrefix::AllShortest))
            } else {
                Ok(Some(PathSearchPrefix::All))
            }
        } else if self.try_keyword("ANY") {
            if self.try_keyword("SHORTEST") {
                Ok(Some(PathSearchPrefix::AnyShortest))
            } else {
                // Check for ANY k (k paths)
                self.skip_whitespace();
                if self.peek_char_is_digit() {
                    let k = self.parse_plain_integer()?;
                    Ok(Some(PathSearchPrefix::AnyK(k)))
                } else {
                    Ok(Some(PathSearchPrefix::Any))
                }
            }
        } else if self.try_keyword("SHORTEST") {
            // SHORTEST k or SHORTEST k GROUP/GROUPS
            self.skip_whitespace();
            if self.peek_char_is_digit() {
                let k = self.parse_plain_integer()?;
                // Support both GROUP and GROUPS
                if self.try_keyword("GROUPS") || self.try_keyword("GROUP") {
                    Ok(Some(PathSearchPrefix::ShortestKGroups(k)))
                } else {
                    Ok(Some(PathSearchPrefix::ShortestK(k)))
                }
            } else {
                // Bare SHORTEST is ANY SHORTEST
                Ok(Some(PathSearchPrefix::AnyShortest))
            }
        } else {
            Ok(None)
        }
    }

    /// Parse path pattern expression (ISO GQL 39075)
    /// pathPatternExpression: pathTerm | pathTerm (MULTISET_ALTERNATION_OPERATOR pathTerm)+ | pathTerm (VERTICAL_BAR pathTerm)+
    fn parse_path_pattern_expression(&mut self) -> Result<PathPatternExpression> {
        let first = self.parse_path_term()?;

        if self.try_str("|+|") {
            let mut alternatives = vec![first, self.parse_path_term()?];
            while self.try_str("|+|") {
                alternatives.push(self.parse_path_term()?);
            }
            self.skip_whitespace();
            if self.peek_str("|") {
                return Err(self.error("Cannot mix '|' and '|+|' without parentheses"));
            }
            Ok(PathPatternExpression::MultisetAlternation(alternatives))
        } else if self.try_char('|') {
            let mut alternatives = vec![first, self.parse_path_term()?];
            loop {
                self.skip_whitespace();
                if self.peek_str("|+|") {
                    return Err(self.error("Cannot mix '|' and '|+|' without parentheses"));
                }
                if !self.try_char('|') {
                    break;
                }
                alternatives.push(self.parse_path_term()?);
            }
            Ok(PathPatternExpression::Union(alternatives))
        } else {
            Ok(PathPatternExpression::Term(first))
        }
    }

    /// Parse a single path term (sequence of path factors)
    fn parse_path_term(&mut self) -> Result<PathTerm> {
        let mut term = PathTerm::new();

        loop {
            self.skip_whitespace();
            let factor = if self.peek_char_is('(') {
                // Could be a node pattern or parenthesized path pattern
                let start_pos = self.pos;
                match self.try_parse_parenthesized_path() {
                    Ok(paren) => {
                        let factor = PathFactor::new(PathElement::Parenthesized(Box::new(paren)));
                        self.parse_factor_quantifier(factor)?
                    }
                    Err(_) => {
                        // Backtrack and parse as node pattern
                        self.pos = start_pos;
                        PathFactor::new(PathElement::Node(self.parse_node_pattern()?))
                    }
                }
            } else if self.peek_edge_start() {
                let edge = PathFactor::new(PathElement::Edge(self.parse_edge_pattern()?));
                self.parse_factor_quantifier(edge)?
            } else {
                break;
            };
            term.factors.push(factor);
        }

        if term.factors.is_empty() {
            return Err(self.error("Expected '(' to start path pattern"));
        }
        Ok(term)
    }

    fn parse_factor_quantifier(&mut self, factor: PathFactor) -> Result<PathFactor> {
        Ok(match self.parse_quantifier()? {
            Some(q) => factor.with_quantifier(q),
            None => factor,
        })
    }

    /// Try to parse a parenthesized path pattern expression (ISO GQL 39075)
    /// parenthesizedPathPatternExpression: LEFT_PAREN subpathVariableDeclaration? pathModePrefix? pathPatternExpression parenthesizedPathPatternWhereClause? RIGHT_PAREN
    fn try_parse_parenthesized_path(&mut self) -> Result<ParenthesizedPathPattern> {
        self.expect_char('(')?;

        let subpath_variable = self.try_parse_variable_declaration()?;
        let path_mode = self.parse_path_mode()?;
        if path_mode.is_some() {
            self.skip_path_keyword();
        }

        // Inner expression must start with a node or a nested parenthesized path
        if self.try_peek_char('(').is_none() {
            return Err(self.error("Expected path pattern inside parentheses"));
        }
        let expression = self.parse_path_pattern_expression()?;

        let where_clause = if self.try_keyword("WHERE") {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect_char(')')?;

        Ok(ParenthesizedPathPattern {
            subpath_variable,
            path_mode,
            expression,
            where_clause,
        })
    }

    // ========================================================================
    // Element Pattern Parsing
    // ========================================================================

    /// Parse node pattern (n:Label {prop: value} WHERE expr)
    fn parse_node_pattern(&mut self) -> Result<NodePattern> {
        self.expect_char('(')?;

        let mut node = NodePattern::new();
        node.variable = self.parse_element_variable()?;
        node.label_expr = self.parse_label_expression()?;

        // Properties (optional)
        if self.try_char('{') {
            node.properties = self.parse_properties()?;
            self.expect_char('}')?;
        }

        // WHERE clause inside pattern (optional)
        if self.try_keyword("WHERE") {
            node.where_clause = Some(Box::new(self.parse_expression()?));
        }

        self.expect_char(')')?;
        Ok(node)
    }

    /// Element variable: any identifier that is not a filler keyword
    fn parse_element_variable(&mut self) -> Result<Option<String>> {
        self.skip_whitespace();
        if self.peek_char_is_alpha() && !self.peek_keyword_is("WHERE") && !self.peek_keyword_is("IS") {
            Ok(Some(self.parse_identifier()?))
        } else {
            Ok(None)
        }
    }

    /// Parse label expression with full operator support (ISO GQL 39075)
    /// isLabelExpression: (IS | COLON) labelExpression
    fn parse_label_expression(&mut self) -> Result<Option<LabelExpression>> {
        if self.try_char(':') || self.try_keyword("IS") {
            Ok(Some(self.parse_label_disjunction()?))
        } else {
            Ok(None)
        }
    }

    /// Parse label disjunction (lowest precedence): term | term | ...
    fn parse_label_disjunction(&mut self) -> Result<LabelExpression> {
        let mut terms = vec![self.parse_label_conjunction()?];

        while self.try_char('|') {
            terms.push(self.parse_label_conjunction()?);
        }

        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(LabelExpression::Disjunction(terms))
        }
    }

    /// Parse label conjunction (medium precedence): factor & factor & ...
    fn parse_label_conjunction(&mut self) -> Result<LabelExpression> {
        let mut factors = vec![self.parse_label_factor()?];

        while self.try_char('&') {
            factors.push(self.parse_label_factor()?);
        }

        if factors.len() == 1 {
            Ok(factors.remove(0))
        } else {
            Ok(LabelExpression::Conjunction(factors))
        }
    }

    /// Parse label factor (highest precedence): !factor | primary
    fn parse_label_factor(&mut self) -> Result<LabelExpression> {
        if self.try_char('!') {
            let inner = self.parse_label_factor()?;
            Ok(LabelExpression::Negation(Box::new(inner)))
        } else {
            self.parse_label_primary()
        }
    }

    /// Parse label primary: labelName | % | (labelExpression)
    fn parse_label_primary(&mut self) -> Result<LabelExpression> {
        if self.try_char('(') {
            let inner = self.parse_label_disjunction()?;
            self.expect_char(')')?;
            Ok(inner)
        } else if self.try_char('%') {
            Ok(LabelExpression::Wildcard)
        } else {
            Ok(LabelExpression::Label(self.parse_identifier()?))
        }
    }

    fn peek_edge_start(&self) -> bool {
        let rest = &self.input[self.pos..];
        rest.starts_with('-') || rest.starts_with('~') || rest.starts_with("<-") || rest.starts_with("<~")
    }

    /// Parse edge pattern (ISO GQL 39075)
    /// Supports all 7 edge direction types, full and abbreviated:
    ///   -[...]->  ->   : right
    ///   <-[...]-  <-   : left
    ///   ~[...]~   ~    : undirected
    ///   -[...]-   -    : any direction
    ///   <-[...]-> <->  : left or right
    ///   <~[...]~  <~   : left or undirected
    ///   ~[...]~>  ~>   : undirected or right
    fn parse_edge_pattern(&mut self) -> Result<EdgePattern> {
        self.skip_whitespace();

        if self.peek_str("<-[") || self.peek_str("<~[") || self.peek_str("~[") || self.peek_str("-[") {
            return self.parse_full_edge_pattern();
        }

        // Longer tokens first so that "<->" is not read as "<-"
        const ABBREVIATED: [(&str, EdgeDirection); 7] = [
            ("<->", EdgeDirection::LeftOrRight),
            ("<-", EdgeDirection::Left),
            ("<~", EdgeDirection::LeftOrUndirected),
            ("->", EdgeDirection::Right),
            ("~>", EdgeDirection::UndirectedOrRight),
            ("~", EdgeDirection::Undirected),
            ("-", EdgeDirection::AnyDirection),
        ];
        for (token, direction) in ABBREVIATED {
            if self.try_str(token) {
                return Ok(EdgePattern::abbreviated(direction));
            }
        }
        Err(self.error("Expected edge pattern"))
    }

    fn parse_full_edge_pattern(&mut self) -> Result<EdgePattern> {
        // Opening token: "<-[", "<~[", "~[" or "-["
        let opening = if self.try_str("<-[") {
            "<-"
        } else if self.try_str("<~[") {
            "<~"
        } else if self.try_str("~[") {
            "~"
        } else {
            self.expect_str("-[")?;
            "-"
        };

        let mut edge = EdgePattern::new(EdgeDirection::AnyDirection);
        edge.variable = self.parse_element_variable()?;
        edge.label_expr = self.parse_label_expression()?;

        if self.try_char('{') {
            edge.properties = self.parse_properties()?;
            self.expect_char('}')?;
        }

        if self.try_keyword("WHERE") {
            edge.where_clause = Some(Box::new(self.parse_expression()?));
        }

        self.expect_char(']')?;

        edge.direction = match opening {
            "<-" if self.try_str("->") => EdgeDirection::LeftOrRight,
            "<-" if self.try_str("-") => EdgeDirection::Left,
            "<~" if self.try_str("~") => EdgeDirection::LeftOrUndirected,
            "~" if self.try_str("~>") => EdgeDirection::UndirectedOrRight,
            "~" if self.try_str("~") => EdgeDirection::Undirected,
            "-" if self.try_str("->") => EdgeDirection::Right,
            "-" if self.try_str("-") => EdgeDirection::AnyDirection,
            _ => {
                return Err(self.error(format!(
                    "Edge pattern opened with '{}[' has no matching terminator",
                    opening
                )))
            }
        };

        Ok(edge)
    }

    /// Parse plain integer (digits only, no sign or decimals)
    fn parse_plain_integer(&mut self) -> Result<u64> {
        self.skip_whitespace();
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else {
                break;
            }
        }

        if self.pos == start {
            Err(self.error("Expected integer"))
        } else {
            self.input[start..self.pos]
                .parse()
                .map_err(|_| self.error("Invalid integer"))
        }
    }

    /// Parse quantifier {n,m} or *, +, ?
    /// ```text
    ///   {1,5}  : 1 to 5 repetitions
    ///   {3}    : exactly 3
    ///   {2,}   : at least 2
    ///   {,5}   : at most 5
    ///   +      : one or more (same as {1,})
    ///   *      : zero or more (same as {0,})
    ///   ?      : zero or one (same as {0,1})
    /// ```
    fn parse_quantifier(&mut self) -> Result<Option<PatternQuantifier>> {
        if self.try_char('*') {
            Ok(Some(PatternQuantifier::ZeroOrMore))
        } else if self.try_char('+') {
            Ok(Some(PatternQuantifier::OneOrMore))
        } else if self.try_char('?') {
            Ok(Some(PatternQuantifier::ZeroOrOne))
        } else if self.try_char('{') {
            self.skip_whitespace();

            let result = if self.peek_char_is_digit() {
                let min = self.parse_plain_integer()?;
                if self.try_char(',') {
                    self.skip_whitespace();
                    if self.peek_char_is_digit() {
                        let max = self.parse_plain_integer()?;
                        PatternQuantifier::Range(min, max)
                    } else {
                        PatternQuantifier::AtLeast(min)
                    }
                } else {
                    PatternQuantifier::Exactly(min)
                }
            } else if self.try_char(',') {
                let max = self.parse_plain_integer()?;
                PatternQuantifier::AtMost(max)
            } else {
                return Err(self.error("Invalid quantifier"));
            };

            self.expect_char('}')?;
            Ok(Some(result))
        } else {
            Ok(None)
        }
    }

    /// Parse properties list
    fn parse_properties(&mut self) -> Result<Vec<(String, PropertyValue)>> {
        let mut props = Vec::new();

        loop {
            self.skip_whitespace();
            if self.peek_char_is('}') {
                break;
            }

            let key = self.parse_identifier()?;
            self.expect_char(':')?;
            let value = self.parse_property_value()?;
            props.push((key, value));

            if !self.try_char(',') {
                break;
            }
        }

        Ok(props)
    }

    /// Parse property value
    fn parse_property_value(&mut self) -> Result<PropertyValue> {
        self.skip_whitespace();

        if self.peek_char_is('"') || self.peek_char_is('\'') {
            Ok(PropertyValue::String(self.parse_string()?))
        } else if self.peek_char_is_digit() || self.peek_char_is('-') {
            self.parse_numeric_literal()
        } else if self.try_char('[') {
            let mut items = Vec::new();
            loop {
                self.skip_whitespace();
                if self.peek_char_is(']') {
                    break;
                }
                items.push(self.parse_property_value()?);
                if !self.try_char(',') {
                    break;
                }
            }
            self.expect_char(']')?;
            Ok(PropertyValue::List(items))
        } else if self.try_keyword("true") {
            Ok(PropertyValue::Boolean(true))
        } else if self.try_keyword("false") {
            Ok(PropertyValue::Boolean(false))
        } else if self.try_keyword("null") {
            Ok(PropertyValue::Null)
        } else {
            Err(self.error("Invalid property value"))
        }
    }

    fn parse_numeric_literal(&mut self) -> Result<PropertyValue> {
        let num = self.parse_number()?;
        if num.contains(['.', 'e', 'E']) {
            num.parse()
                .map(PropertyValue::Float)
                .map_err(|_| self.error(format!("Invalid number '{}'", num)))
        } else {
            num.parse()
                .map(PropertyValue::Integer)
                .map_err(|_| self.error(format!("Invalid number '{}'", num)))
        }
    }

    // ========================================================================
    // Expression Parsing
    // ========================================================================

    /// Parse expression
    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_xor_expression()?;

        while self.try_keyword("OR") {
            let right = self.parse_xor_expression()?;
            left = Expression::binary(left, BinaryOperator::Or, right);
        }

        Ok(left)
    }

    fn parse_xor_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_and_expression()?;

        while self.try_keyword("XOR") {
            let right = self.parse_and_expression()?;
            left = Expression::binary(left, BinaryOperator::Xor, right);
        }

        Ok(left)
    }

    fn parse_and_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_not_expression()?;

        while self.try_keyword("AND") {
            let right = self.parse_not_expression()?;
            left = Expression::binary(left, BinaryOperator::And, right);
        }

        Ok(left)
    }

    fn parse_not_expression(&mut self) -> Result<Expression> {
        if self.try_keyword("NOT") {
            let expr = self.parse_not_expression()?;
            Ok(Expression::UnaryOp(UnaryOperator::Not, Box::new(expr)))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_additive()?;

        // IS NULL / IS NOT NULL
        if self.try_keyword("IS") {
            let op = if self.try_keyword("NOT") {
                UnaryOperator::IsNotNull
            } else {
                UnaryOperator::IsNull
            };
            self.expect_keyword("NULL")?;
            return Ok(Expression::UnaryOp(op, Box::new(left)));
        }

        let op = if self.try_str("<=") {
            Some(BinaryOperator::Le)
        } else if self.try_str(">=") {
            Some(BinaryOperator::Ge)
        } else if self.try_str("<>") || self.try_str("!=") {
            Some(BinaryOperator::Ne)
        } else if self.try_char('<') {
            Some(BinaryOperator::Lt)
        } else if self.try_char('>') {
            Some(BinaryOperator::Gt)
        } else if self.try_char('=') {
            Some(BinaryOperator::Eq)
        } else if self.try_keyword("CONTAINS") {
            Some(BinaryOperator::Contains)
        } else if self.try_keyword("STARTS") {
            self.expect_keyword("WITH")?;
            Some(BinaryOperator::StartsWith)
        } else if self.try_keyword("ENDS") {
            self.expect_keyword("WITH")?;
            Some(BinaryOperator::EndsWith)
        } else if self.try_keyword("IN") {
            Some(BinaryOperator::In)
        } else {
            None
        };

        match op {
            Some(operator) => {
                let right = self.parse_additive()?;
                Ok(Expression::binary(left, operator, right))
            }
            None => Ok(left),
        }
    }

    fn parse_additive(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative()?;

        loop {
            if self.try_char('+') {
                let right = self.parse_multiplicative()?;
                left = Expression::binary(left, BinaryOperator::Add, right);
            } else if self.try_char('-') {
                let right = self.parse_multiplicative()?;
                left = Expression::binary(left, BinaryOperator::Sub, right);
            } else {
                break;
            }
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let op = if self.try_char('*') {
                BinaryOperator::Mul
            } else if self.try_char('/') {
                BinaryOperator::Div
            } else if self.try_char('%') {
                BinaryOperator::Mod
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = Expression::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        if self.try_char('-') {
            let expr = self.parse_unary()?;
            return Ok(Expression::UnaryOp(UnaryOperator::Neg, Box::new(expr)));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        self.skip_whitespace();

        // Parenthesized expression
        if self.try_char('(') {
            let expr = self.parse_expression()?;
            self.expect_char(')')?;
            return Ok(expr);
        }

        // List expression
        if self.try_char('[') {
            let mut items = Vec::new();
            loop {
                self.skip_whitespace();
                if self.peek_char_is(']') {
                    break;
                }
                items.push(self.parse_expression()?);
                if !self.try_char(',') {
                    break;
                }
            }
            self.expect_char(']')?;
            return Ok(Expression::List(items));
        }

        // String literal
        if self.peek_char_is('"') || self.peek_char_is('\'') {
            let s = self.parse_string()?;
            return Ok(Expression::Literal(PropertyValue::String(s)));
        }

        // Number literal
        if self.peek_char_is_digit() {
            return Ok(Expression::Literal(self.parse_numeric_literal()?));
        }

        // Boolean literals and NULL
        if self.try_keyword("true") {
            return Ok(Expression::Literal(PropertyValue::Boolean(true)));
        }
        if self.try_keyword("false") {
            return Ok(Expression::Literal(PropertyValue::Boolean(false)));
        }
        if self.try_keyword("null") {
            return Ok(Expression::Literal(PropertyValue::Null));
        }

        // Identifier (variable or property access)
        let ident = self.parse_identifier()?;
        if self.try_char('.') {
            let prop = self.parse_identifier()?;
            Ok(Expression::Property(ident, prop))
        } else {
            Ok(Expression::Variable(ident))
        }
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    fn error(&self, message: impl Into<String>) -> Error {
        Error::ParseError(format!("{} at position {}", message.into(), self.pos))
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else if self.peek_str("//") {
                // Single-line comment
                match self.input[self.pos..].find('\n') {
                    Some(offset) => self.pos += offset,
                    None => self.pos = self.input.len(),
                }
            } else if self.peek_str("/*") {
                // Multi-line comment
                match self.input[self.pos + 2..].find("*/") {
                    Some(offset) => self.pos += offset + 4,
                    None => self.pos = self.input.len(),
                }
            } else {
                break;
            }
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_is(&self, c: char) -> bool {
        self.peek_char() == Some(c)
    }

    fn peek_char_is_alpha(&self) -> bool {
        self.peek_char()
            .map(|c| c.is_alphabetic() || c == '_')
            .unwrap_or(false)
    }

    fn peek_char_is_digit(&self) -> bool {
        self.peek_char()
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false)
    }

    /// Peek ahead to check if the input starts with a specific string
    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    /// Skip whitespace and report whether the next char is `c` (not consumed)
    fn try_peek_char(&mut self, c: char) -> Option<char> {
        self.skip_whitespace();
        self.peek_char().filter(|&next| next == c)
    }

    fn try_char(&mut self, c: char) -> bool {
        self.skip_whitespace();
        if self.peek_char() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, c: char) -> Result<()> {
        if self.try_char(c) {
            Ok(())
        } else {
            Err(self.error(format!("Expected '{}', got {:?}", c, self.peek_char())))
        }
    }

    fn try_str(&mut self, s: &str) -> bool {
        self.skip_whitespace();
        if self.peek_str(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect_str(&mut self, s: &str) -> Result<()> {
        if self.try_str(s) {
            Ok(())
        } else {
            Err(self.error(format!("Expected '{}'", s)))
        }
    }

    fn peek_keyword_is(&self, keyword: &str) -> bool {
        let rest = &self.input[self.pos..];
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        rest[..end].eq_ignore_ascii_case(keyword)
    }

    fn try_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        if self.peek_keyword_is(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.try_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(format!("Expected keyword '{}'", keyword)))
        }
    }

    fn parse_identifier(&mut self) -> Result<String> {
        self.skip_whitespace();
        let start = self.pos;

        match self.peek_char() {
            Some(c) if c.is_alphabetic() || c == '_' => self.pos += c.len_utf8(),
            _ => return Err(self.error("Expected identifier")),
        }

        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_string(&mut self) -> Result<String> {
        let quote = self
            .peek_char()
            .filter(|&c| c == '"' || c == '\'')
            .ok_or_else(|| self.error("Expected string quote"))?;
        self.pos += 1;

        let mut result = String::new();
        while let Some(c) = self.peek_char() {
            if c == quote {
                self.pos += 1;
                return Ok(result);
            } else if c == '\\' {
                self.pos += 1;
                if let Some(escaped) = self.peek_char() {
                    self.pos += escaped.len_utf8();
                    match escaped {
                        'n' => result.push('\n'),
                        't' => result.push('\t'),
                        'r' => result.push('\r'),
                        _ => result.push(escaped),
                    }
                }
            } else {
                self.pos += c.len_utf8();
                result.push(c);
            }
        }

        Err(self.error("Unclosed string"))
    }

    fn parse_number(&mut self) -> Result<String> {
        self.skip_whitespace();
        let start = self.pos;

        if self.peek_char() == Some('-') {
            self.pos += 1;
        }

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' {
                self.pos += 1;
            } else {
                break;
            }
        }

        if self.pos == start {
            Err(self.error("Expected number"))
        } else {
            Ok(self.input[start..self.pos].to_string())
        }
    }
}

/// Parse a graph pattern
pub fn parse(query: &str) -> Result<GraphPattern> {
    GqlParser::new(query).parse()
}

/// Parse text holding exactly one path pattern
pub fn parse_path(query: &str) -> Result<PathPattern> {
    let mut pattern = parse(query)?;
    if pattern.paths.len() != 1 || pattern.match_mode.is_some() || pattern.where_clause.is_some() {
        return Err(Error::ParseError(
            "Expected a single path pattern".to_string(),
        ));
    }
    Ok(pattern.paths.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_term(path: &PathPattern) -> &PathTerm {
        match &path.expression {
            PathPatternExpression::Term(t) => t,
            other => panic!("Expected single term, got {}", other),
        }
    }

    fn edge_at(path: &PathPattern, idx: usize) -> &EdgePattern {
        match &first_term(path).factors[idx].element {
            PathElement::Edge(e) => e,
            other => panic!("Expected edge, got {}", other),
        }
    }

    #[test]
    fn test_parse_simple_match() {
        let pattern = parse("MATCH (n:Account)").unwrap();
        assert_eq!(pattern.paths.len(), 1);
        assert!(pattern.match_mode.is_none());

        let term = first_term(&pattern.paths[0]);
        match &term.factors[0].element {
            PathElement::Node(n) => {
                assert_eq!(n.variable.as_deref(), Some("n"));
                assert_eq!(n.label_expr, Some(LabelExpression::Label("Account".into())));
            }
            _ => panic!("Expected node"),
        }
    }

    #[test]
    fn test_parse_path_pattern() {
        let path = parse_path("(a:Account)-[t:Transfer {amount: 10}]->(b:Account)").unwrap();
        let term = first_term(&path);
        assert_eq!(term.factors.len(), 3);

        let edge = edge_at(&path, 1);
        assert_eq!(edge.variable.as_deref(), Some("t"));
        assert_eq!(edge.direction, EdgeDirection::Right);
        assert!(!edge.abbreviated);
        assert_eq!(edge.properties, vec![("amount".to_string(), PropertyValue::Integer(10))]);
    }

    #[test]
    fn test_parse_prefixes_either_order() {
        let a = parse_path("TRAIL ALL SHORTEST PATHS (a)->*(b)").unwrap();
        let b = parse_path("ALL SHORTEST TRAIL PATH (a)->*(b)").unwrap();
        for path in [&a, &b] {
            assert_eq!(path.path_mode, Some(PathMode::Trail));
            assert_eq!(path.search_prefix, Some(PathSearchPrefix::AllShortest));
        }

        let bare = parse_path("SHORTEST (a)-[]->(b)").unwrap();
        assert_eq!(bare.search_prefix, Some(PathSearchPrefix::AnyShortest));
        assert_eq!(bare.path_mode, None);
    }

    #[test]
    fn test_parse_counted_prefixes() {
        let cases = [
            ("ANY 3 (a)->(b)", PathSearchPrefix::AnyK(3)),
            ("ANY (a)->(b)", PathSearchPrefix::Any),
            ("ANY SHORTEST (a)->(b)", PathSearchPrefix::AnyShortest),
            ("SHORTEST 2 (a)->(b)", PathSearchPrefix::ShortestK(2)),
            ("SHORTEST 2 GROUPS (a)->(b)", PathSearchPrefix::ShortestKGroups(2)),
            ("SHORTEST 4 GROUP (a)->(b)", PathSearchPrefix::ShortestKGroups(4)),
            ("ALL (a)->(b)", PathSearchPrefix::All),
        ];
        for (text, expected) in cases {
            assert_eq!(parse_path(text).unwrap().search_prefix, Some(expected), "{}", text);
        }
    }

    #[test]
    fn test_parse_quantifiers() {
        let cases = [
            ("(a)-[:T]->{2,5}(b)", PatternQuantifier::Range(2, 5)),
            ("(a)-[:T]->{3}(b)", PatternQuantifier::Exactly(3)),
            ("(a)-[:T]->{2,}(b)", PatternQuantifier::AtLeast(2)),
            ("(a)-[:T]->{,4}(b)", PatternQuantifier::AtMost(4)),
            ("(a)->+(b)", PatternQuantifier::OneOrMore),
            ("(a)~*(b)", PatternQuantifier::ZeroOrMore),
            ("(a)-[]-?(b)", PatternQuantifier::ZeroOrOne),
        ];
        for (text, expected) in cases {
            let path = parse_path(text).unwrap();
            assert_eq!(first_term(&path).factors[1].quantifier, Some(expected), "{}", text);
        }
    }

    #[test]
    fn test_parse_edge_directions() {
        let cases = [
            ("(a)-[e]->(b)", EdgeDirection::Right, false),
            ("(a)<-[e]-(b)", EdgeDirection::Left, false),
            ("(a)~[e]~(b)", EdgeDirection::Undirected, false),
            ("(a)-[e]-(b)", EdgeDirection::AnyDirection, false),
            ("(a)<~[e]~(b)", EdgeDirection::LeftOrUndirected, false),
            ("(a)~[e]~>(b)", EdgeDirection::UndirectedOrRight, false),
            ("(a)<-[e]->(b)", EdgeDirection::LeftOrRight, false),
            ("(a)->(b)", EdgeDirection::Right, true),
            ("(a)<-(b)", EdgeDirection::Left, true),
            ("(a)~(b)", EdgeDirection::Undirected, true),
            ("(a)-(b)", EdgeDirection::AnyDirection, true),
            ("(a)<~(b)", EdgeDirection::LeftOrUndirected, true),
            ("(a)~>(b)", EdgeDirection::UndirectedOrRight, true),
            ("(a)<->(b)", EdgeDirection::LeftOrRight, true),
        ];
        for (text, direction, abbreviated) in cases {
            let path = parse_path(text).unwrap();
            let edge = edge_at(&path, 1);
            assert_eq!(edge.direction, direction, "{}", text);
            assert_eq!(edge.abbreviated, abbreviated, "{}", text);
        }
    }

    #[test]
    fn test_parse_label_expressions() {
        let path = parse_path("(n:(A|B)&!C)-[:%]->(m IS D)").unwrap();
        let term = first_term(&path);
        match &term.factors[0].element {
            PathElement::Node(n) => assert_eq!(
                n.label_expr,
                Some(LabelExpression::Conjunction(vec![
                    LabelExpression::Disjunction(vec![
                        LabelExpression::Label("A".into()),
                        LabelExpression::Label("B".into()),
                    ]),
                    LabelExpression::Negation(Box::new(LabelExpression::Label("C".into()))),
                ]))
            ),
            _ => panic!("Expected node"),
        }
        assert_eq!(edge_at(&path, 1).label_expr, Some(LabelExpression::Wildcard));
        match &term.factors[2].element {
            PathElement::Node(n) => {
                assert_eq!(n.variable.as_deref(), Some("m"));
                assert_eq!(n.label_expr, Some(LabelExpression::Label("D".into())));
            }
            _ => panic!("Expected node"),
        }
    }

    #[test]
    fn test_parse_parenthesized_path_pattern() {
        let path = parse_path("(s)(p = TRAIL (a)-[:Transfer]->(b) WHERE a.x > 1){1,5}(t)").unwrap();
        let term = first_term(&path);
        assert_eq!(term.factors.len(), 3);
        assert_eq!(term.factors[1].quantifier, Some(PatternQuantifier::Range(1, 5)));
        match &term.factors[1].element {
            PathElement::Parenthesized(paren) => {
                assert_eq!(paren.subpath_variable.as_deref(), Some("p"));
                assert_eq!(paren.path_mode, Some(PathMode::Trail));
                assert!(paren.where_clause.is_some());
            }
            _ => panic!("Expected parenthesized path"),
        }
    }

    #[test]
    fn test_parse_union_and_multiset_alternation() {
        let union = parse_path("(a)->(b) | (a)<-(b) | (a)~(b)").unwrap();
        assert!(matches!(&union.expression, PathPatternExpression::Union(t) if t.len() == 3));

        let multiset = parse_path("(a)->(b) |+| (a)<-(b)").unwrap();
        assert!(matches!(
            &multiset.expression,
            PathPatternExpression::MultisetAlternation(t) if t.len() == 2
        ));

        assert!(parse_path("(a)->(b) | (a)<-(b) |+| (a)~(b)").is_err());
    }

    #[test]
    fn test_parse_graph_pattern() {
        let pattern = parse(
            "MATCH DIFFERENT EDGES p = (a:Person)-[:KNOWS]->(b), (b)-[:LIVES_IN]->(c:City) \
             WHERE a.age >= 18 AND c.name IN ['Paris', 'Rome']",
        )
        .unwrap();
        assert_eq!(pattern.match_mode, Some(MatchMode::DifferentEdges));
        assert_eq!(pattern.paths.len(), 2);
        assert_eq!(pattern.paths[0].variable.as_deref(), Some("p"));
        assert_eq!(
            pattern.where_clause.unwrap().to_string(),
            "((a.age >= 18) AND (c.name IN ['Paris', 'Rome']))"
        );
    }

    #[test]
    fn test_parse_element_where() {
        let path = parse_path("(a WHERE a.name STARTS WITH 'A')-[e WHERE e.w IS NOT NULL]->(b)").unwrap();
        let term = first_term(&path);
        match &term.factors[0].element {
            PathElement::Node(n) => {
                assert_eq!(n.variable.as_deref(), Some("a"));
                assert_eq!(n.where_clause.as_ref().unwrap().to_string(), "(a.name STARTS WITH 'A')");
            }
            _ => panic!("Expected node"),
        }
        assert_eq!(
            edge_at(&path, 1).where_clause.as_ref().unwrap().to_string(),
            "(e.w IS NOT NULL)"
        );
    }

    #[test]
    fn test_parse_expression_precedence() {
        let pattern = parse("(a) WHERE a.x + 2 * 3 = 8 OR NOT a.y < -1").unwrap();
        assert_eq!(
            pattern.where_clause.unwrap().to_string(),
            "(((a.x + (2 * 3)) = 8) OR NOT (a.y < - 1))"
        );
    }

    #[test]
    fn test_parse_errors() {
        for text in [
            "",
            "MATCH",
            "(a",
            "(a)-[e]~(b)",
            "(a)-[:]->(b)",
            "(a)->{x}(b)",
            "(a) RETURN a",
            "(a {name: })",
            "(a)->(b) |",
        ] {
            assert!(
                matches!(parse(text), Err(Error::ParseError(_))),
                "expected parse error for {:?}",
                text
            );
        }
    }
}
