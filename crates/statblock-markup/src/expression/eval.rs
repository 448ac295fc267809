//! Tree evaluation of parsed damage expressions.

use crate::context::RenderContext;
use crate::errors::ExpressionError;

use super::ast::{BinaryOp, ExpressionNode, Function, RollTerm};
use super::value::Value;

/// Atoms standing for the caster rank.
const RANK_REFERENCES: [&str; 2] = ["@item.level", "@item.rank"];

/// Damage-type annotations rendered differently from their source text.
const DAMAGE_TYPE_REWRITES: [(&str, &str); 2] = [
    // Bleed damage is always persistent in the source data.
    ("bleed", "persistent bleed"),
    ("healing", ""),
];

impl BinaryOp {
    #[expect(clippy::float_arithmetic, reason = "numeric operands of a damage roll")]
    fn apply_numeric(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Add => left + right,
            Self::Subtract => left - right,
            Self::Multiply => left * right,
            // Zero divisors are not guarded; source data never divides by zero.
            Self::Divide => left / right,
        }
    }

    fn apply(self, left: Value, right: Value) -> Result<Value, &'static str> {
        match (left, right) {
            (Value::Boolean(_), _) | (_, Value::Boolean(_)) => {
                Err("comparison result used in arithmetic")
            }
            (Value::Numeric(l), Value::Numeric(r)) => Ok(Value::Numeric(self.apply_numeric(l, r))),
            (zero, other) | (other, zero) if zero.is_zero() => {
                if matches!(self, Self::Multiply | Self::Divide) {
                    log::warn!(
                        "treating zero as identity for '{}' with operand `{other}`",
                        self.symbol()
                    );
                }
                Ok(other)
            }
            (left, right) => Ok(Value::Symbolic(format!("{left} {} {right}", self.symbol()))),
        }
    }
}

impl Function {
    fn call(
        self,
        args: &[ExpressionNode],
        ctx: &RenderContext,
    ) -> Result<Value, ExpressionError> {
        let numeric = |node: &ExpressionNode| -> Result<f64, ExpressionError> {
            node.evaluate(ctx)?.as_number().ok_or_else(|| {
                ExpressionError::new("expected a number", node.to_string(), 0)
            })
        };
        match (self, args) {
            (Self::Ceil, [x]) => Ok(Value::Numeric(numeric(x)?.ceil())),
            (Self::Floor, [x]) => Ok(Value::Numeric(numeric(x)?.floor())),
            (Self::Gte, [a, b]) => Ok(Value::Boolean(numeric(a)? >= numeric(b)?)),
            (Self::Max, [a, b]) => Ok(Value::Numeric(numeric(a)?.max(numeric(b)?))),
            (Self::Ternary, [condition, when_true, when_false]) => {
                match condition.evaluate(ctx)? {
                    Value::Boolean(true) => when_true.evaluate(ctx),
                    Value::Boolean(false) => when_false.evaluate(ctx),
                    Value::Numeric(_) | Value::Symbolic(_) => Err(ExpressionError::new(
                        "ternary condition must be a comparison",
                        condition.to_string(),
                        0,
                    )),
                }
            }
            _ => Err(ExpressionError::new(
                "wrong number of arguments",
                self.name(),
                0,
            )),
        }
    }
}

impl ExpressionNode {
    /// Evaluate this tree against `ctx`.
    ///
    /// Rank references evaluate to the context rank; other identifiers stay
    /// symbolic. Errors carry the failing sub-expression as their fragment.
    ///
    /// # Errors
    /// Returns [`ExpressionError`] when a function receives a value of the
    /// wrong kind or a comparison result is used in arithmetic.
    ///
    /// # Examples
    /// ```
    /// use statblock_markup::RenderContext;
    /// use statblock_markup::expression::{ExpressionNode, Value};
    ///
    /// let node = ExpressionNode::Identifier("@item.rank".into());
    /// let value = node.evaluate(&RenderContext::new(4));
    /// assert_eq!(value, Ok(Value::Numeric(4.0)));
    /// ```
    pub fn evaluate(&self, ctx: &RenderContext) -> Result<Value, ExpressionError> {
        match self {
            Self::Number(value) => Ok(Value::Numeric(*value)),
            Self::Identifier(text) if RANK_REFERENCES.contains(&text.as_str()) => {
                Ok(Value::Numeric(f64::from(ctx.rank())))
            }
            Self::Identifier(text) => Ok(Value::Symbolic(text.clone())),
            Self::BinaryOp { op, left, right } => op
                .apply(left.evaluate(ctx)?, right.evaluate(ctx)?)
                .map_err(|message| ExpressionError::new(message, self.to_string(), 0)),
            Self::FunctionCall { function, args } => function.call(args, ctx),
            Self::DiceCount { count, die } => match count.evaluate(ctx)? {
                Value::Boolean(_) => Err(ExpressionError::new(
                    "comparison result used as a die count",
                    self.to_string(),
                    0,
                )),
                count => Ok(Value::Symbolic(format!("{count}{die}"))),
            },
        }
    }
}

impl RollTerm {
    /// Render the term as `"<roll> <damage type>"`.
    ///
    /// Commas in the damage type become spaces; `bleed` renders as
    /// `persistent bleed` and `healing` renders as the roll alone.
    ///
    /// # Errors
    /// Returns [`ExpressionError`] (located at the term's offset) when the
    /// expression cannot be evaluated or evaluates to a comparison result.
    pub fn render(&self, ctx: &RenderContext) -> Result<String, ExpressionError> {
        let value = self
            .expression
            .evaluate(ctx)
            .map_err(|err| err.at_offset(self.offset))?;
        if matches!(value, Value::Boolean(_)) {
            return Err(ExpressionError::new(
                "comparison result used as a roll",
                self.source.clone(),
                self.offset,
            ));
        }
        let label = self.annotation.as_deref().map(damage_type_label);
        Ok(match label.as_deref() {
            Some(label) if !label.is_empty() => format!("{value} {label}"),
            _ => value.to_string(),
        })
    }
}

fn damage_type_label(raw: &str) -> String {
    let label = raw.replace(',', " ");
    DAMAGE_TYPE_REWRITES
        .iter()
        .find_map(|&(from, to)| (from == label).then(|| to.to_owned()))
        .unwrap_or(label)
}
