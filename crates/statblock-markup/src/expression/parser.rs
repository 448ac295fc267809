//! Shunting-yard parser turning damage expressions into roll terms.

use crate::errors::ExpressionError;

use super::ast::{BinaryOp, ExpressionNode, Function, RollTerm};
use super::lexer::{Token, TokenKind, lex_expression};

#[derive(Debug, Clone, Copy)]
enum StackEntry {
    Operator(BinaryOp),
    /// Open parenthesis; `operand_base` is the operand-stack depth when it
    /// was pushed, so function arguments can be split off on `)`.
    Group {
        function: Option<Function>,
        operand_base: usize,
        offset: usize,
    },
}

struct Parser<'a> {
    source: &'a str,
    operands: Vec<ExpressionNode>,
    operators: Vec<StackEntry>,
    terms: Vec<RollTerm>,
    expect_operand: bool,
    pending_function: Option<(Function, Token<'a>)>,
    previous: Option<Token<'a>>,
    term_start: Option<usize>,
    term_end: usize,
}

/// Parse a damage expression into its roll terms.
///
/// Terms end at a `[damage type]` annotation, at a top-level comma, or at
/// the end of the input.
///
/// # Errors
/// Returns [`ExpressionError`] for unmatched parentheses, unknown functions,
/// wrong argument counts, missing operands or operators, unterminated
/// annotations, and empty expressions.
///
/// # Examples
/// ```
/// use statblock_markup::expression::parse_damage;
///
/// let terms = parse_damage("2d8[piercing],2d4[slashing]")
///     .unwrap_or_else(|err| panic!("{err}"));
/// assert_eq!(terms.len(), 2);
/// assert_eq!(terms.get(1).and_then(|t| t.annotation()), Some("slashing"));
/// ```
pub fn parse_damage(source: &str) -> Result<Vec<RollTerm>, ExpressionError> {
    let mut parser = Parser::new(source);
    for token in lex_expression(source)? {
        parser.feed(token)?;
    }
    parser.finish()
}

fn is_die(text: &str) -> bool {
    text.strip_prefix('d')
        .is_some_and(|size| !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()))
}

fn leaf(text: &str) -> ExpressionNode {
    let numeric = text.bytes().any(|b| b.is_ascii_digit())
        && text.bytes().all(|b| b.is_ascii_digit() || b == b'.');
    numeric
        .then(|| text.parse::<f64>().ok())
        .flatten()
        .map_or_else(
            || ExpressionNode::Identifier(text.to_owned()),
            ExpressionNode::Number,
        )
}

impl<'a> Parser<'a> {
    const fn new(source: &'a str) -> Self {
        Self {
            source,
            operands: Vec::new(),
            operators: Vec::new(),
            terms: Vec::new(),
            expect_operand: true,
            pending_function: None,
            previous: None,
            term_start: None,
            term_end: 0,
        }
    }

    fn feed(&mut self, token: Token<'a>) -> Result<(), ExpressionError> {
        if let Some((function, name)) = self
            .pending_function
            .filter(|_| token.kind != TokenKind::OpenParen)
        {
            return Err(ExpressionError::new(
                "expected '(' after function",
                function.name(),
                name.offset,
            ));
        }
        // An annotation closes its term; only a separator may follow.
        if self.closed_by_annotation() && token.kind != TokenKind::Comma {
            return Err(ExpressionError::new("missing operator", token.text, token.offset));
        }
        if !matches!(token.kind, TokenKind::Comma | TokenKind::Annotation(_)) {
            self.term_start.get_or_insert(token.offset);
            self.term_end = token.offset + token.text.len();
        }
        match token.kind {
            TokenKind::Atom(text) => self.atom(text, token)?,
            TokenKind::Operator(op) => self.operator(op, token)?,
            TokenKind::OpenParen => self.open_paren(token)?,
            TokenKind::CloseParen => self.close_paren(token)?,
            TokenKind::Comma => self.comma(token)?,
            TokenKind::Annotation(text) => self.annotation(text, token)?,
        }
        self.previous = Some(token);
        Ok(())
    }

    fn atom(&mut self, text: &str, token: Token<'a>) -> Result<(), ExpressionError> {
        if !self.expect_operand {
            let after_group = self
                .previous
                .is_some_and(|previous| previous.kind == TokenKind::CloseParen);
            if after_group && is_die(text) {
                let count = self.pop_operand(token)?;
                self.operands.push(ExpressionNode::DiceCount {
                    count: Box::new(count),
                    die: text.to_owned(),
                });
                return Ok(());
            }
            return Err(ExpressionError::new("missing operator", text, token.offset));
        }
        if let Some(function) = Function::from_name(text) {
            self.pending_function = Some((function, token));
            return Ok(());
        }
        self.operands.push(leaf(text));
        self.expect_operand = false;
        Ok(())
    }

    fn operator(&mut self, op: BinaryOp, token: Token<'a>) -> Result<(), ExpressionError> {
        if self.expect_operand {
            return Err(ExpressionError::new("missing operand", token.text, token.offset));
        }
        while let Some(StackEntry::Operator(top)) = self.operators.last().copied() {
            if top.precedence() < op.precedence() {
                break;
            }
            self.operators.pop();
            self.apply(top, token)?;
        }
        self.operators.push(StackEntry::Operator(op));
        self.expect_operand = true;
        Ok(())
    }

    fn open_paren(&mut self, token: Token<'a>) -> Result<(), ExpressionError> {
        if !self.expect_operand {
            return Err(match self.previous {
                Some(Token {
                    kind: TokenKind::Atom(name),
                    offset,
                    ..
                }) => ExpressionError::new("unknown function", name, offset),
                _ => ExpressionError::new("missing operator", token.text, token.offset),
            });
        }
        self.operators.push(StackEntry::Group {
            function: self.pending_function.take().map(|(function, _)| function),
            operand_base: self.operands.len(),
            offset: token.offset,
        });
        Ok(())
    }

    fn close_paren(&mut self, token: Token<'a>) -> Result<(), ExpressionError> {
        if self.expect_operand {
            return Err(ExpressionError::new("missing operand", token.text, token.offset));
        }
        let Some((function, operand_base)) = self.reduce_to_group(token)? else {
            return Err(ExpressionError::new("unmatched ')'", token.text, token.offset));
        };
        self.operators.pop();
        if let Some(function) = function {
            let args = self.operands.split_off(operand_base.min(self.operands.len()));
            if args.len() != function.arity() {
                return Err(ExpressionError::new(
                    "wrong number of arguments",
                    function.name(),
                    token.offset,
                ));
            }
            self.operands.push(ExpressionNode::FunctionCall { function, args });
        } else if self.operands.len() != operand_base + 1 {
            return Err(ExpressionError::new("missing operator", token.text, token.offset));
        }
        Ok(())
    }

    fn comma(&mut self, token: Token<'a>) -> Result<(), ExpressionError> {
        if self.operands.is_empty() && self.operators.is_empty() {
            if self.closed_by_annotation() {
                return Ok(());
            }
            return Err(ExpressionError::new("empty damage term", token.text, token.offset));
        }
        if self.expect_operand {
            return Err(ExpressionError::new("missing operand", token.text, token.offset));
        }
        match self.reduce_to_group(token)? {
            Some((Some(_), _)) => {
                self.expect_operand = true;
                Ok(())
            }
            Some((None, _)) => Err(ExpressionError::new(
                "unexpected ','",
                token.text,
                token.offset,
            )),
            None => self.finish_term(None, token),
        }
    }

    fn annotation(&mut self, text: &str, token: Token<'a>) -> Result<(), ExpressionError> {
        if self.expect_operand {
            return Err(ExpressionError::new(
                "missing roll before damage type",
                token.text,
                token.offset,
            ));
        }
        if self.reduce_to_group(token)?.is_some() {
            return Err(self.unclosed_group());
        }
        self.finish_term(Some(text), token)
    }

    fn finish(mut self) -> Result<Vec<RollTerm>, ExpressionError> {
        if let Some((function, name)) = self.pending_function {
            return Err(ExpressionError::new(
                "expected '(' after function",
                function.name(),
                name.offset,
            ));
        }
        if let Some(separator) = self
            .previous
            .filter(|previous| previous.kind == TokenKind::Comma && self.operators.is_empty())
        {
            return Err(ExpressionError::new(
                "empty damage term",
                separator.text,
                separator.offset,
            ));
        }
        if !self.operands.is_empty() || !self.operators.is_empty() {
            let end = Token {
                kind: TokenKind::Comma,
                text: "",
                offset: self.source.len(),
            };
            if self.expect_operand {
                return Err(ExpressionError::new("missing operand", self.source, 0));
            }
            if self.reduce_to_group(end)?.is_some() {
                return Err(self.unclosed_group());
            }
            self.finish_term(None, end)?;
        }
        if self.terms.is_empty() {
            return Err(ExpressionError::new("empty expression", self.source, 0));
        }
        Ok(self.terms)
    }

    fn closed_by_annotation(&self) -> bool {
        self.previous
            .is_some_and(|previous| matches!(previous.kind, TokenKind::Annotation(_)))
    }

    /// Apply stacked operators down to the innermost open group, returning
    /// that group's function and operand base, or `None` at the top level.
    fn reduce_to_group(
        &mut self,
        token: Token<'a>,
    ) -> Result<Option<(Option<Function>, usize)>, ExpressionError> {
        while let Some(entry) = self.operators.last().copied() {
            match entry {
                StackEntry::Operator(op) => {
                    self.operators.pop();
                    self.apply(op, token)?;
                }
                StackEntry::Group {
                    function,
                    operand_base,
                    ..
                } => return Ok(Some((function, operand_base))),
            }
        }
        Ok(None)
    }

    fn unclosed_group(&self) -> ExpressionError {
        let offset = self
            .operators
            .iter()
            .rev()
            .find_map(|entry| match entry {
                StackEntry::Group { offset, .. } => Some(*offset),
                StackEntry::Operator(_) => None,
            })
            .unwrap_or_default();
        ExpressionError::new(
            "unclosed '('",
            self.source.get(offset..).unwrap_or_default(),
            offset,
        )
    }

    fn apply(&mut self, op: BinaryOp, token: Token<'a>) -> Result<(), ExpressionError> {
        let right = self.pop_operand(token)?;
        let left = self.pop_operand(token)?;
        self.operands.push(ExpressionNode::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        });
        Ok(())
    }

    fn pop_operand(&mut self, token: Token<'a>) -> Result<ExpressionNode, ExpressionError> {
        self.operands
            .pop()
            .ok_or_else(|| ExpressionError::new("missing operand", token.text, token.offset))
    }

    fn finish_term(
        &mut self,
        annotation: Option<&str>,
        token: Token<'a>,
    ) -> Result<(), ExpressionError> {
        let expression = self.pop_operand(token)?;
        if !self.operands.is_empty() {
            return Err(ExpressionError::new("missing operator", token.text, token.offset));
        }
        let start = self.term_start.take().unwrap_or(token.offset);
        self.terms.push(RollTerm {
            expression,
            annotation: annotation.map(str::to_owned),
            source: self
                .source
                .get(start..self.term_end.max(start))
                .unwrap_or_default()
                .to_owned(),
            offset: start,
        });
        self.expect_operand = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Vec<RollTerm> {
        parse_damage(source).unwrap_or_else(|err| panic!("{source:?} should parse: {err}"))
    }

    fn parse_err(source: &str) -> ExpressionError {
        match parse_damage(source) {
            Ok(terms) => panic!("{source:?} should fail, got {terms:?}"),
            Err(err) => err,
        }
    }

    fn single(source: &str) -> String {
        let terms = parse_ok(source);
        assert_eq!(terms.len(), 1, "expected one term in {source:?}");
        terms
            .first()
            .map(|term| term.expression().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(single("1+2*3"), "(1 + (2 * 3))");
    }

    #[test]
    fn equal_precedence_is_left_associative() {
        assert_eq!(single("8-2-1"), "((8 - 2) - 1)");
        assert_eq!(single("8/2*4"), "((8 / 2) * 4)");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(single("(1+2)*3"), "((1 + 2) * 3)");
    }

    #[test]
    fn parses_function_calls() {
        assert_eq!(
            single("2*ceil(@item.rank/2)-1"),
            "((2 * ceil((@item.rank / 2))) - 1)"
        );
        assert_eq!(
            single("ternary(gte(@item.level,5),2d6,1d6)"),
            "ternary(gte(@item.level, 5), 2d6, 1d6)"
        );
    }

    #[test]
    fn applies_parenthesised_die_counts() {
        let terms = parse_ok("(@item.level)d4[persistent,mental]");
        let Some(term) = terms.first() else {
            panic!("expected a term");
        };
        assert_eq!(term.expression().to_string(), "(@item.level)d4");
        assert_eq!(term.annotation(), Some("persistent,mental"));
        assert_eq!(term.source(), "(@item.level)d4");
    }

    #[test]
    fn splits_terms_on_annotations_and_commas() {
        let terms = parse_ok("2d8[piercing],2d4[slashing]");
        let sources: Vec<_> = terms.iter().map(RollTerm::source).collect();
        assert_eq!(sources, vec!["2d8", "2d4"]);
        assert_eq!(terms.get(1).map(RollTerm::offset), Some(14));

        let terms = parse_ok("1d6,1d4[fire]");
        assert_eq!(terms.len(), 2);
        assert_eq!(terms.first().and_then(RollTerm::annotation), None);
    }

    #[test]
    fn reports_unknown_function() {
        let err = parse_err("sqrt(4)");
        assert_eq!(err, ExpressionError::new("unknown function", "sqrt", 0));
    }

    #[test]
    fn reports_unmatched_parentheses() {
        assert_eq!(parse_err("(1+2").message, "unclosed '('");
        assert_eq!(parse_err("(1+2[fire]").message, "unclosed '('");
        assert_eq!(parse_err("1+2)").message, "unmatched ')'");
    }

    #[test]
    fn reports_arity_mismatch() {
        let err = parse_err("max(1)");
        assert_eq!(err.message, "wrong number of arguments");
        assert_eq!(err.fragment, "max");
    }

    #[test]
    fn reports_missing_operands_and_operators() {
        assert_eq!(parse_err("1+").message, "missing operand");
        assert_eq!(parse_err("*2").message, "missing operand");
        assert_eq!(parse_err("2 3").message, "missing operator");
        assert_eq!(parse_err("ceil 3").message, "expected '(' after function");
        assert_eq!(parse_err("[fire]").message, "missing roll before damage type");
    }

    #[test]
    fn annotated_terms_need_a_separator() {
        let err = parse_err("2d6[fire] 1d6");
        assert_eq!(err, ExpressionError::new("missing operator", "1d6", 10));
        assert_eq!(parse_err("2d6[fire](1)").message, "missing operator");
        assert_eq!(parse_err("2d6[fire][cold]").message, "missing operator");
        assert_eq!(parse_err("2d6[fire]+1").fragment, "+");
    }

    #[test]
    fn rejects_empty_terms_between_separators() {
        assert_eq!(
            parse_err(",1d6[fire]"),
            ExpressionError::new("empty damage term", ",", 0)
        );
        assert_eq!(
            parse_err("1d6[fire],,1d4[cold]"),
            ExpressionError::new("empty damage term", ",", 10)
        );
        assert_eq!(parse_err("1d6,").message, "empty damage term");
        assert_eq!(parse_err("1d6[fire],").offset, 9);
    }

    #[test]
    fn reports_empty_expression() {
        assert_eq!(parse_err("  ").message, "empty expression");
    }
}
