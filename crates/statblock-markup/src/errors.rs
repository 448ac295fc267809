//! Error types shared by the scanner, renderer and expression evaluator.

use thiserror::Error;

/// Failure raised while parsing or evaluating a damage-roll expression.
///
/// # Examples
/// ```
/// use statblock_markup::ExpressionError;
/// let err = ExpressionError::new("unknown function", "sqrt", 4);
/// assert_eq!(err.fragment, "sqrt");
/// assert_eq!(err.to_string(), "unknown function at byte 4 in `sqrt`");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {offset} in `{fragment}`")]
pub struct ExpressionError {
    /// Short description of what went wrong.
    pub message: &'static str,
    /// The offending part of the expression.
    pub fragment: String,
    /// Byte offset of the fragment inside the expression (zero-based).
    pub offset: usize,
}

impl ExpressionError {
    /// Create a new expression error.
    #[must_use]
    pub fn new(message: &'static str, fragment: impl Into<String>, offset: usize) -> Self {
        Self {
            message,
            fragment: fragment.into(),
            offset,
        }
    }

    pub(crate) fn at_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Errors produced when rendering a single, already isolated tag.
///
/// The renderer has no view of the surrounding text, so these errors carry no
/// position; [`expand`](crate::expand) lifts them into [`ExpandError`] values
/// that do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The tag name is not one of the known families.
    #[error("unknown tag `{name}`")]
    UnknownTag {
        /// Name found between `@` and `[`.
        name: String,
    },
    /// A known family with missing or unrecognised parameters.
    #[error("{family} tag {reason}")]
    UnknownTagVariant {
        /// Family name as written in source text.
        family: &'static str,
        /// What was missing or unrecognised.
        reason: &'static str,
    },
    /// The damage expression could not be evaluated.
    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

impl RenderError {
    pub(crate) fn at(self, tag: &str, offset: usize) -> ExpandError {
        let tag = tag.to_owned();
        match self {
            Self::UnknownTag { .. } => ExpandError::UnknownTag { tag, offset },
            Self::UnknownTagVariant { family, reason } => ExpandError::UnknownTagVariant {
                family,
                reason,
                tag,
                offset,
            },
            Self::Expression(source) => ExpandError::Expression {
                source,
                tag,
                offset,
            },
        }
    }
}

/// Errors surfaced while expanding a block of rules text.
///
/// Every variant records the byte offset (zero-based, relative to the text
/// handed to the expansion call) of the construct that failed.
///
/// # Examples
/// ```
/// use statblock_markup::{expand, ExpandError, RenderContext};
/// let Err(err) = expand("deal @Damage[2d8[piercing]", &RenderContext::default()) else {
///     panic!("unterminated tag must fail");
/// };
/// assert!(matches!(err, ExpandError::MalformedTag { offset: 5, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// Unterminated tag or override, or unbalanced brackets.
    #[error("malformed tag at byte {offset}: {message}")]
    MalformedTag {
        /// What the scanner was looking for.
        message: &'static str,
        /// Offset of the `@` (or `{`) that was never closed.
        offset: usize,
    },
    /// Known tag family, unusable parameter combination.
    #[error("unsupported {family} tag `{tag}` at byte {offset}: {reason}")]
    UnknownTagVariant {
        /// Family name as written in source text.
        family: &'static str,
        /// What was missing or unrecognised.
        reason: &'static str,
        /// Full text of the offending tag.
        tag: String,
        /// Offset of the tag.
        offset: usize,
    },
    /// Tag name outside the dispatch table.
    #[error("unknown tag `{tag}` at byte {offset}")]
    UnknownTag {
        /// Full text of the offending tag.
        tag: String,
        /// Offset of the tag.
        offset: usize,
    },
    /// Unparseable or ill-typed damage expression.
    #[error("invalid expression in tag `{tag}` at byte {offset}: {source}")]
    Expression {
        /// Underlying evaluator failure.
        source: ExpressionError,
        /// Full text of the offending tag.
        tag: String,
        /// Offset of the tag.
        offset: usize,
    },
}

impl ExpandError {
    /// Byte offset of the construct that failed.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::MalformedTag { offset, .. }
            | Self::UnknownTagVariant { offset, .. }
            | Self::UnknownTag { offset, .. }
            | Self::Expression { offset, .. } => *offset,
        }
    }

    /// Full text of the failing tag, when the tag was closed.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::MalformedTag { .. } => None,
            Self::UnknownTagVariant { tag, .. }
            | Self::UnknownTag { tag, .. }
            | Self::Expression { tag, .. } => Some(tag),
        }
    }
}

pub(crate) const fn malformed(message: &'static str, offset: usize) -> ExpandError {
    ExpandError::MalformedTag { message, offset }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_expression_error_with_fragment() {
        let err = ExpressionError::new("missing operand", "+", 3);
        assert_eq!(err.to_string(), "missing operand at byte 3 in `+`");
    }

    #[test]
    fn lifts_render_error_with_position() {
        let err = RenderError::UnknownTagVariant {
            family: "Template",
            reason: "has no distance",
        }
        .at("@Template[burst]", 12);
        assert_eq!(err.offset(), 12);
        assert_eq!(err.tag(), Some("@Template[burst]"));
        assert_eq!(
            err.to_string(),
            "unsupported Template tag `@Template[burst]` at byte 12: has no distance"
        );
    }

    #[test]
    fn keeps_expression_error_as_source() {
        let err = RenderError::from(ExpressionError::new("unknown function", "sqrt", 0))
            .at("@Damage[sqrt(4)]", 0);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("unknown function at byte 0 in `sqrt`")
        );
    }

    #[test]
    fn malformed_tag_has_no_tag_text() {
        let err = malformed("unterminated tag", 7);
        assert_eq!(err.tag(), None);
        assert_eq!(err.offset(), 7);
    }
}
