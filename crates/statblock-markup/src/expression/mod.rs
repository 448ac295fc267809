//! Arithmetic evaluation of damage-roll expressions.
//!
//! Expressions combine numeric literals, opaque dice rolls such as `2d8`, the
//! rank references `@item.level` and `@item.rank`, the operators `+ - * /`,
//! parentheses and the functions `ceil`, `floor`, `ternary`, `gte` and `max`.
//! A `[type]` suffix closes a roll term and labels it with a damage type.
//!
//! Operands that cannot be combined numerically are kept as text: a numeric
//! zero on either side of an operator yields the other operand unchanged,
//! and any other mix renders as `"<lhs> <op> <rhs>"`.

mod ast;
mod eval;
mod lexer;
mod parser;
mod value;

use crate::context::RenderContext;
use crate::errors::ExpressionError;

pub use ast::{BinaryOp, ExpressionNode, Function, RollTerm};
pub use parser::parse_damage;
pub use value::Value;

/// Evaluate a damage expression, joining its roll terms with `" and "`.
///
/// # Errors
/// Returns [`ExpressionError`] when the expression cannot be parsed or one of
/// its terms cannot be evaluated.
///
/// # Examples
/// ```
/// use statblock_markup::{RenderContext, evaluate};
///
/// let ctx = RenderContext::new(2);
/// assert_eq!(
///     evaluate("(@item.level)d4[persistent,mental]", &ctx).as_deref(),
///     Ok("2d4 persistent mental")
/// );
/// assert_eq!(
///     evaluate("2d8[piercing],2d4[slashing]", &ctx).as_deref(),
///     Ok("2d8 piercing and 2d4 slashing")
/// );
/// ```
pub fn evaluate(expr: &str, ctx: &RenderContext) -> Result<String, ExpressionError> {
    let terms = parse_damage(expr)?;
    let rendered = terms
        .iter()
        .map(|term| term.render(ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rendered.join(" and "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1d4+((3)-1)", 3, "1d4 + 2")]
    #[case("@item.level[persistent,acid]", 3, "3 persistent acid")]
    #[case("(1d4+((@item.level)-1))[persistent,electricity]", 1, "1d4 persistent electricity")]
    #[case("(1d4+((@item.level)-1))[persistent,electricity]", 3, "1d4 + 2 persistent electricity")]
    #[case("(2*ceil(@item.rank/2)-1)[bleed]", 3, "3 persistent bleed")]
    #[case("(@item.level)d8[healing]", 4, "4d8")]
    #[case("1d6,1d4[fire]", 0, "1d6 and 1d4 fire")]
    fn renders_damage_expressions(#[case] expr: &str, #[case] rank: i32, #[case] expected: &str) {
        assert_eq!(
            evaluate(expr, &RenderContext::new(rank)).as_deref(),
            Ok(expected)
        );
    }

    #[test]
    fn surfaces_the_offending_fragment() {
        let Err(err) = evaluate("2d6[fire]+", &RenderContext::default()) else {
            panic!("expected failure");
        };
        assert_eq!(err.fragment, "+");
        assert_eq!(err.offset, 9);
    }
}
