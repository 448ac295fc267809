//! Tag families and the closed tag handed to the renderer.

use std::borrow::Cow;
use std::fmt;

/// Inline tag families understood by the renderer.
///
/// # Examples
/// ```
/// use statblock_markup::TagFamily;
///
/// assert_eq!(TagFamily::from_name("Damage"), Some(TagFamily::Damage));
/// assert_eq!(TagFamily::from_name("damage"), None);
/// assert_eq!(TagFamily::Uuid.as_str(), "UUID");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagFamily {
    /// Link to a compendium entry; renders its readable name.
    Uuid,
    /// Damage roll expression.
    Damage,
    /// Flat check, saving throw or skill check.
    Check,
    /// Area-effect template.
    Template,
}

impl TagFamily {
    /// Every family, in dispatch-table order.
    pub const ALL: [Self; 4] = [Self::Uuid, Self::Damage, Self::Check, Self::Template];

    /// Name as written in source text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uuid => "UUID",
            Self::Damage => "Damage",
            Self::Check => "Check",
            Self::Template => "Template",
        }
    }

    /// Look up a family by its exact source name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.as_str() == name)
    }
}

impl fmt::Display for TagFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed tag: its name and body with nested tags already expanded.
///
/// # Examples
/// ```
/// use statblock_markup::Tag;
///
/// let tag = Tag::new("Check", "flat|dc:3");
/// assert_eq!(tag.name(), "Check");
/// assert_eq!(tag.body(), "flat|dc:3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    name: &'a str,
    body: Cow<'a, str>,
}

impl<'a> Tag<'a> {
    /// Create a tag from its name and body.
    #[must_use]
    pub fn new(name: &'a str, body: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name,
            body: body.into(),
        }
    }

    /// Name between `@` and `[`.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Body between the outer brackets.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Family of this tag, if the name is known.
    #[must_use]
    pub fn family(&self) -> Option<TagFamily> {
        TagFamily::from_name(self.name)
    }
}
