//! Inline macro-tag expansion for tabletop rules text.
//!
//! Spell and creature descriptions embed directives such as
//! `@Damage[2d6[fire]]`, `@Check[reflex|dc:20]` or
//! `@Template[burst|distance:20]`. [`expand`] resolves every such tag into
//! plain text, evaluating damage expressions against the caster rank held in
//! a [`RenderContext`]. Records using the `{@atk mw}` brace dialect go
//! through [`expand_brace_tags`] instead.
//!
//! ```
//! use statblock_markup::{RenderContext, expand};
//!
//! let text = "@Damage[(@item.level)d4[persistent,mental]] and a \
//!             @Check[will|dc:25] against @UUID[Compendium.pf2e.conditionitems.Item.Frightened]";
//! assert_eq!(
//!     expand(text, &RenderContext::new(2)).as_deref(),
//!     Ok("2d4 persistent mental and a DC 25 Will save against Frightened")
//! );
//! ```

mod brace_tags;
mod context;
mod errors;
mod expand;
pub mod expression;
mod params;
mod render;
mod scanner;
mod tag;

pub use brace_tags::expand_brace_tags;
pub use context::RenderContext;
pub use errors::{ExpandError, ExpressionError, RenderError};
pub use expand::expand;
pub use expression::evaluate;
pub use params::{ParameterSet, parse_parameters};
pub use render::render;
pub use tag::{Tag, TagFamily};
