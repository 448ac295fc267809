//! Expansion driver: scans a text block and replaces every tag with its
//! rendering.

use crate::context::RenderContext;
use crate::errors::ExpandError;
use crate::render::render;
use crate::scanner::{ScanMode, Scanner, Segment, TagSpan};
use crate::tag::Tag;

/// Expand every inline tag in `text`.
///
/// Nested tags inside a body are expanded before the enclosing tag is
/// rendered. A `{...}` block directly after a tag replaces that tag's
/// rendering. Text without tags is returned unchanged.
///
/// # Errors
/// Returns the first [`ExpandError`] encountered; no partial output is
/// produced.
///
/// # Examples
/// ```
/// use statblock_markup::{RenderContext, expand};
///
/// let ctx = RenderContext::new(3);
/// let text = "takes @Damage[(@item.level)d6[fire]] damage (@Check[reflex|dc:20] halves)";
/// assert_eq!(
///     expand(text, &ctx).as_deref(),
///     Ok("takes 3d6 fire damage (DC 20 Reflex save halves)")
/// );
/// assert_eq!(
///     expand("@UUID[Compendium.pf2e.conditionitems.Item.Grabbed]{restrained}", &ctx).as_deref(),
///     Ok("restrained")
/// );
/// ```
pub fn expand(text: &str, ctx: &RenderContext) -> Result<String, ExpandError> {
    let mut stack = vec![Frame::root(text)];
    while let Some(frame) = stack.last_mut() {
        if let Some(segment) = frame.scanner.next() {
            match segment? {
                Segment::Text(literal) => frame.output.push_literal(literal),
                Segment::Override(replacement) => frame.output.override_pending(replacement),
                Segment::Tag(span) => stack.push(Frame::body_of(span)),
            }
            continue;
        }
        let Some(Frame { output, tag, .. }) = stack.pop() else {
            break;
        };
        let body = output.finish();
        let Some(span) = tag else {
            return Ok(body);
        };
        let rendered = resolve_tag(&span, body, ctx)?;
        if let Some(parent) = stack.last_mut() {
            parent.output.stage(rendered);
        }
    }
    Ok(String::new())
}

/// A text block being expanded: the outermost text, or the body of a tag
/// whose nested tags are still being resolved.
///
/// Open frames live on an explicit stack; expansion never recurses.
struct Frame<'a> {
    scanner: Scanner<'a>,
    output: Output,
    /// Tag owning this body; `None` for the outermost text.
    tag: Option<TagSpan<'a>>,
}

impl<'a> Frame<'a> {
    fn root(text: &'a str) -> Self {
        Self {
            scanner: Scanner::new(text, 0, ScanMode::TopLevel),
            output: Output::with_capacity(text.len()),
            tag: None,
        }
    }

    fn body_of(span: TagSpan<'a>) -> Self {
        Self {
            scanner: Scanner::new(span.body, span.body_start, ScanMode::Body),
            output: Output::with_capacity(span.body.len()),
            tag: Some(span),
        }
    }
}

fn resolve_tag(
    span: &TagSpan<'_>,
    body: String,
    ctx: &RenderContext,
) -> Result<String, ExpandError> {
    let tag = Tag::new(span.name, body);
    render(&tag, ctx)
        .inspect(|text| log::trace!("resolved @{} at byte {} to `{text}`", span.name, span.start))
        .map_err(|err| {
            log::debug!("failed to render `{}` at byte {}: {err}", span.source, span.start);
            err.at(span.source, span.start)
        })
}

/// Accumulated output plus the rendering of the most recent tag.
///
/// The latest rendering stays pending until the next segment arrives, so an
/// override can replace it without searching the output.
#[derive(Debug, Default)]
struct Output {
    text: String,
    pending: Option<String>,
}

impl Output {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            pending: None,
        }
    }

    fn commit(&mut self) {
        if let Some(rendered) = self.pending.take() {
            self.text.push_str(&rendered);
        }
    }

    fn push_literal(&mut self, literal: &str) {
        self.commit();
        self.text.push_str(literal);
    }

    fn stage(&mut self, rendered: String) {
        self.commit();
        self.pending = Some(rendered);
    }

    fn override_pending(&mut self, replacement: &str) {
        self.pending = Some(replacement.to_owned());
    }

    fn finish(mut self) -> String {
        self.commit();
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn expand_ok(text: &str, rank: i32) -> String {
        expand(text, &RenderContext::new(rank))
            .unwrap_or_else(|err| panic!("{text:?} should expand: {err}"))
    }

    #[test]
    fn override_replaces_only_the_pending_rendering() {
        let mut output = Output::default();
        output.push_literal("Grabbed and ");
        output.stage("Grabbed".to_owned());
        output.override_pending("restrained");
        output.push_literal(".");
        assert_eq!(output.finish(), "Grabbed and restrained.");
    }

    #[rstest]
    #[case("@Damage[@item.level[persistent,acid]]", 3, "3 persistent acid")]
    #[case("@Template[burst|distance:@Damage[20]]", 0, "20-foot burst")]
    #[case("@Check[flat|dc:@Damage[3]{5}]", 0, "DC 5 flat check")]
    #[case("@UUID[Compendium.pf2e.spells-srd.Item.Fireball]{}!", 0, "!")]
    fn resolves_nested_tags_first(#[case] text: &str, #[case] rank: i32, #[case] expected: &str) {
        assert_eq!(expand_ok(text, rank), expected);
    }

    #[test]
    fn reports_nested_offsets_in_outer_text() {
        let Err(err) = expand("ab @Check[flat|dc:@Template[burst]]", &RenderContext::default())
        else {
            panic!("template without distance must fail");
        };
        assert_eq!(err.offset(), 18);
        assert_eq!(err.tag(), Some("@Template[burst]"));
    }

    #[test]
    fn survives_thousands_of_nesting_levels() {
        let depth = 3000;
        let text = format!("{}1{}", "@Damage[".repeat(depth), "]".repeat(depth));
        assert_eq!(expand_ok(&text, 0), "1");
    }

    #[test]
    fn deep_failures_keep_their_offset() {
        let depth = 2000;
        let text = format!(
            "{}@Check[dc:4]{}",
            "@Template[burst|distance:".repeat(depth),
            "]".repeat(depth)
        );
        let Err(err) = expand(&text, &RenderContext::default()) else {
            panic!("check without a kind must fail");
        };
        assert_eq!(err.offset(), depth * "@Template[burst|distance:".len());
        assert_eq!(err.tag(), Some("@Check[dc:4]"));
    }

    #[test]
    fn override_does_not_mask_render_failures() {
        let err = expand("@Check[dc:5]{a check}", &RenderContext::default());
        assert!(matches!(err, Err(ExpandError::UnknownTagVariant { offset: 0, .. })));
    }
}
