//! `@Template[...]` rendering.

use crate::errors::RenderError;
use crate::params::ParameterSet;
use crate::tag::TagFamily;

use super::unsupported;

/// Shapes recognised as bare flags, in resolution order.
const SHAPES: [&str; 4] = ["emanation", "burst", "line", "cone"];

pub(super) fn render_template(body: &str) -> Result<String, RenderError> {
    let params = ParameterSet::parse(body);
    let non_empty = |key: &str| params.get(key).filter(|value| !value.is_empty());
    let shape = SHAPES
        .into_iter()
        .find(|shape| params.contains(shape))
        .or_else(|| non_empty("type"))
        .ok_or_else(|| unsupported(TagFamily::Template, "has no template shape"))?;
    let distance = non_empty("distance")
        .ok_or_else(|| unsupported(TagFamily::Template, "has no distance"))?;
    Ok(format!("{distance}-foot {shape}"))
}
