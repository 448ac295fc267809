//! Tag renderer dispatching on tag family.

mod check;
mod template;

use crate::context::RenderContext;
use crate::errors::RenderError;
use crate::expression::evaluate;
use crate::tag::{Tag, TagFamily};

/// Render a closed tag to plain text.
///
/// Nested tags in the body must already be expanded; [`expand`](crate::expand)
/// takes care of that before calling this function.
///
/// # Errors
/// Returns [`RenderError::UnknownTag`] for names outside the dispatch table,
/// [`RenderError::UnknownTagVariant`] when required parameters are missing or
/// unrecognised, and [`RenderError::Expression`] for invalid damage rolls.
///
/// # Examples
/// ```
/// use statblock_markup::{RenderContext, Tag, render};
///
/// let ctx = RenderContext::default();
/// assert_eq!(render(&Tag::new("Check", "flat|dc:3"), &ctx).as_deref(), Ok("DC 3 flat check"));
/// assert_eq!(render(&Tag::new("Template", "burst|distance:20"), &ctx).as_deref(), Ok("20-foot burst"));
/// ```
pub fn render(tag: &Tag<'_>, ctx: &RenderContext) -> Result<String, RenderError> {
    let family = tag.family().ok_or_else(|| RenderError::UnknownTag {
        name: tag.name().to_owned(),
    })?;
    match family {
        TagFamily::Uuid => render_uuid(tag.body()),
        TagFamily::Damage => render_damage(tag.body(), ctx),
        TagFamily::Check => check::render_check(tag.body()),
        TagFamily::Template => template::render_template(tag.body()),
    }
}

pub(crate) const fn unsupported(family: TagFamily, reason: &'static str) -> RenderError {
    RenderError::UnknownTagVariant {
        family: family.as_str(),
        reason,
    }
}

/// The last `.`-separated segment of a compendium link is its readable name.
fn render_uuid(body: &str) -> Result<String, RenderError> {
    body.rsplit('.')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| unsupported(TagFamily::Uuid, "has an empty identifier"))
}

/// Roll options after the first `|` do not affect the rendered text.
fn render_damage(body: &str, ctx: &RenderContext) -> Result<String, RenderError> {
    let expression = body.split_once('|').map_or(body, |(expression, _)| expression);
    evaluate(expression, ctx).map_err(RenderError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn render_ok(name: &str, body: &str, rank: i32) -> String {
        render(&Tag::new(name, body), &RenderContext::new(rank))
            .unwrap_or_else(|err| panic!("@{name}[{body}] should render: {err}"))
    }

    #[rstest]
    #[case("Compendium.pf2e.conditionitems.Item.Grabbed", "Grabbed")]
    #[case("Grabbed", "Grabbed")]
    fn renders_uuid_names(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(render_ok("UUID", body, 0), expected);
    }

    #[test]
    fn rejects_empty_uuid() {
        let err = render(&Tag::new("UUID", "Compendium.pf2e."), &RenderContext::default());
        assert_eq!(err, Err(unsupported(TagFamily::Uuid, "has an empty identifier")));
    }

    #[test]
    fn drops_damage_roll_options() {
        assert_eq!(
            render_ok("Damage", "2d8[piercing],2d4[slashing]|options:area-damage", 0),
            "2d8 piercing and 2d4 slashing"
        );
    }

    #[test]
    fn wraps_expression_errors() {
        let err = render(&Tag::new("Damage", "sqrt(4)[fire]"), &RenderContext::default());
        assert!(matches!(err, Err(RenderError::Expression(_))));
    }

    #[test]
    fn rejects_unknown_families() {
        let err = render(&Tag::new("Localize", "PF2E.x"), &RenderContext::default());
        assert_eq!(
            err,
            Err(RenderError::UnknownTag {
                name: "Localize".into()
            })
        );
    }
}
