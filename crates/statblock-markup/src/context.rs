//! Per-call rendering state.

/// Numeric context threaded through one expansion call.
///
/// The rank stands in for the reserved `@item.level` and `@item.rank`
/// references inside damage expressions. Callers supply it from the enclosing
/// spell or feature; use the default (rank 0) when no rank applies.
///
/// # Examples
/// ```
/// use statblock_markup::RenderContext;
///
/// assert_eq!(RenderContext::new(3).rank(), 3);
/// assert_eq!(RenderContext::default().rank(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderContext {
    rank: i32,
}

impl RenderContext {
    /// Create a context for the given rank.
    #[must_use]
    pub const fn new(rank: i32) -> Self {
        Self { rank }
    }

    /// Rank substituted for the reserved rank references.
    #[must_use]
    pub const fn rank(self) -> i32 {
        self.rank
    }
}

impl From<i32> for RenderContext {
    fn from(rank: i32) -> Self {
        Self::new(rank)
    }
}
