//! Damage-expression lexer.

use crate::errors::ExpressionError;

use super::ast::BinaryOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    /// Run of letters, digits, `@` and `.`.
    Atom(&'a str),
    Operator(BinaryOp),
    OpenParen,
    CloseParen,
    Comma,
    /// Text between `[` and `]`, attached to the preceding roll.
    Annotation(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Exact source text of the token.
    pub text: &'a str,
    pub offset: usize,
}

const fn is_atom_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'@' || b == b'.'
}

pub(crate) fn lex_expression(expr: &str) -> Result<Vec<Token<'_>>, ExpressionError> {
    let bytes = expr.as_bytes();
    let slice = |start: usize, end: usize| expr.get(start..end).unwrap_or_default();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(&b) = bytes.get(pos) {
        let start = pos;
        let kind = match b {
            b'[' => {
                let Some(len) = expr.get(start + 1..).and_then(|rest| rest.find(']')) else {
                    return Err(ExpressionError::new(
                        "unterminated damage type",
                        slice(start, expr.len()),
                        start,
                    ));
                };
                pos = start + 1 + len + 1;
                TokenKind::Annotation(slice(start + 1, start + 1 + len))
            }
            b'(' => {
                pos += 1;
                TokenKind::OpenParen
            }
            b')' => {
                pos += 1;
                TokenKind::CloseParen
            }
            b',' => {
                pos += 1;
                TokenKind::Comma
            }
            _ if b.is_ascii_whitespace() => {
                pos += 1;
                continue;
            }
            _ if is_atom_byte(b) => {
                while bytes.get(pos).copied().is_some_and(is_atom_byte) {
                    pos += 1;
                }
                TokenKind::Atom(slice(start, pos))
            }
            _ => {
                let Some(op) = BinaryOp::from_byte(b) else {
                    let unexpected = expr
                        .get(start..)
                        .and_then(|rest| rest.chars().next())
                        .map_or_else(String::new, String::from);
                    return Err(ExpressionError::new(
                        "unexpected character",
                        unexpected,
                        start,
                    ));
                };
                pos += 1;
                TokenKind::Operator(op)
            }
        };
        tokens.push(Token {
            kind,
            text: slice(start, pos),
            offset: start,
        });
    }

    Ok(tokens)
}
