//! Values produced while evaluating a damage expression.

use std::fmt;

/// Result of evaluating an [`ExpressionNode`](super::ExpressionNode).
///
/// # Examples
/// ```
/// use statblock_markup::expression::Value;
///
/// assert_eq!(Value::Numeric(2.5).to_string(), "2");
/// assert_eq!(Value::Numeric(3.5).to_string(), "4");
/// assert_eq!(Value::Symbolic("1d4 + 2".into()).to_string(), "1d4 + 2");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain number.
    Numeric(f64),
    /// Dice roll or any other text carried opaquely.
    Symbolic(String),
    /// Comparison result; only consumable by `ternary`.
    Boolean(bool),
}

impl Value {
    pub(crate) const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Numeric(value) => Some(*value),
            Self::Symbolic(_) | Self::Boolean(_) => None,
        }
    }

    #[expect(clippy::float_cmp, reason = "only an exact zero acts as identity")]
    pub(crate) fn is_zero(&self) -> bool {
        matches!(self, Self::Numeric(value) if *value == 0.0)
    }
}

/// Numbers render rounded half-to-even to an integer.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(value) => write!(f, "{}", format_number(*value)),
            Self::Symbolic(text) => f.write_str(text),
            Self::Boolean(flag) => write!(f, "{flag}"),
        }
    }
}

#[expect(clippy::float_cmp, reason = "matches both signed zeroes")]
fn format_number(value: f64) -> f64 {
    let rounded = value.round_ties_even();
    // -0.0 would otherwise print as "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(3.0, "3")]
    #[case(1.5, "2")]
    #[case(0.5, "0")]
    #[case(-0.2, "0")]
    #[case(-2.5, "-2")]
    fn rounds_numbers_half_to_even(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(Value::Numeric(value).to_string(), expected);
    }

    #[test]
    fn only_numeric_zero_is_zero() {
        assert!(Value::Numeric(0.0).is_zero());
        assert!(!Value::Symbolic("0d4".into()).is_zero());
        assert!(!Value::Boolean(false).is_zero());
    }

    #[test]
    fn booleans_are_not_numbers() {
        assert_eq!(Value::Boolean(true).as_number(), None);
        assert_eq!(Value::Numeric(4.0).as_number(), Some(4.0));
    }
}
