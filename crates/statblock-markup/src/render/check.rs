//! `@Check[...]` rendering.

use crate::errors::RenderError;
use crate::params::ParameterSet;
use crate::tag::TagFamily;

use super::unsupported;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Save {
    Fortitude,
    Reflex,
    Will,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skill {
    Acrobatics,
    Arcana,
    Athletics,
    Crafting,
    Deception,
    Diplomacy,
    Intimidation,
    Medicine,
    Nature,
    Occultism,
    Perception,
    Performance,
    Religion,
    Society,
    Stealth,
    Survival,
    Thievery,
}

impl Skill {
    const fn label(self) -> &'static str {
        match self {
            Self::Acrobatics => "Acrobatics",
            Self::Arcana => "Arcana",
            Self::Athletics => "Athletics",
            Self::Crafting => "Crafting",
            Self::Deception => "Deception",
            Self::Diplomacy => "Diplomacy",
            Self::Intimidation => "Intimidation",
            Self::Medicine => "Medicine",
            Self::Nature => "Nature",
            Self::Occultism => "Occultism",
            Self::Perception => "Perception",
            Self::Performance => "Performance",
            Self::Religion => "Religion",
            Self::Society => "Society",
            Self::Stealth => "Stealth",
            Self::Survival => "Survival",
            Self::Thievery => "Thievery",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckKind {
    Flat,
    Save(Save),
    Skill(Skill),
}

/// Recognised kinds in resolution order, with the key that selects each.
const CHECK_KINDS: [(&str, CheckKind); 21] = [
    ("flat", CheckKind::Flat),
    ("fortitude", CheckKind::Save(Save::Fortitude)),
    ("reflex", CheckKind::Save(Save::Reflex)),
    ("will", CheckKind::Save(Save::Will)),
    ("acrobatics", CheckKind::Skill(Skill::Acrobatics)),
    ("arcana", CheckKind::Skill(Skill::Arcana)),
    ("athletics", CheckKind::Skill(Skill::Athletics)),
    ("crafting", CheckKind::Skill(Skill::Crafting)),
    ("deception", CheckKind::Skill(Skill::Deception)),
    ("diplomacy", CheckKind::Skill(Skill::Diplomacy)),
    ("intimidation", CheckKind::Skill(Skill::Intimidation)),
    ("medicine", CheckKind::Skill(Skill::Medicine)),
    ("nature", CheckKind::Skill(Skill::Nature)),
    ("occultism", CheckKind::Skill(Skill::Occultism)),
    ("perception", CheckKind::Skill(Skill::Perception)),
    ("performance", CheckKind::Skill(Skill::Performance)),
    ("religion", CheckKind::Skill(Skill::Religion)),
    ("society", CheckKind::Skill(Skill::Society)),
    ("stealth", CheckKind::Skill(Skill::Stealth)),
    ("survival", CheckKind::Skill(Skill::Survival)),
    ("thievery", CheckKind::Skill(Skill::Thievery)),
];

impl CheckKind {
    /// Flags win over an explicit `type:` parameter.
    fn resolve(params: &ParameterSet<'_>) -> Option<Self> {
        let by_key = |key: &str| {
            CHECK_KINDS
                .iter()
                .find_map(|&(name, kind)| (name == key).then_some(kind))
        };
        CHECK_KINDS
            .iter()
            .find_map(|&(name, kind)| params.contains(name).then_some(kind))
            .or_else(|| params.get("type").and_then(by_key))
    }

    fn label(self) -> String {
        match self {
            Self::Flat => "flat check".to_owned(),
            Self::Save(Save::Fortitude) => "Fortitude save".to_owned(),
            Self::Save(Save::Reflex) => "Reflex save".to_owned(),
            Self::Save(Save::Will) => "Will save".to_owned(),
            Self::Skill(skill) => format!("{} check", skill.label()),
        }
    }
}

pub(super) fn render_check(body: &str) -> Result<String, RenderError> {
    let params = ParameterSet::parse(body);
    let kind = CheckKind::resolve(&params)
        .ok_or_else(|| unsupported(TagFamily::Check, "has no recognised check kind"))?;
    let label = kind.label();
    let Some(dc) = params.get("dc") else {
        return Ok(label);
    };
    Ok(format!("DC {dc} {label}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("flat|dc:3", "DC 3 flat check")]
    #[case("fortitude", "Fortitude save")]
    #[case("reflex|dc:20|against:spell", "DC 20 Reflex save")]
    #[case("will|dc:18", "DC 18 Will save")]
    #[case("athletics|dc:25", "DC 25 Athletics check")]
    #[case("type:thievery", "Thievery check")]
    #[case("type:reflex|dc:22", "DC 22 Reflex save")]
    #[case("perception|flat", "flat check")]
    fn renders_checks(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(render_check(body).as_deref(), Ok(expected));
    }

    #[rstest]
    #[case("dc:15")]
    #[case("lore|dc:15")]
    #[case("type:cooking")]
    fn rejects_unknown_kinds(#[case] body: &str) {
        assert_eq!(
            render_check(body),
            Err(unsupported(TagFamily::Check, "has no recognised check kind"))
        );
    }
}
