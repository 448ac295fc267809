//! The `{@name args}` dialect used by creature and spell records from the
//! second source family.
//!
//! Fields inside a brace tag are separated by `|`. Unlike the `@Name[...]`
//! dialect this one is lenient: anything that does not look like a complete
//! brace tag is left in place.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::errors::{ExpandError, RenderError};

/// Matches a brace tag whose arguments contain no other brace, so every match
/// is an innermost tag.
///
/// The `unreachable!()` is safe here because the pattern is a compile-time
/// constant that is known to be valid.
static BRACE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{@([A-Za-z]+)(?:\s+([^{}]*))?\}")
        .unwrap_or_else(|_| unreachable!("brace tag regex is valid"))
});

/// `rs {@hitYourSpellAttack}` and `ms {@hitYourSpellAttack}` name the attack
/// as well as its modifier.
static SPELL_ATTACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([mr])s \{@hitYourSpellAttack\}")
        .unwrap_or_else(|_| unreachable!("spell attack regex is valid"))
});

/// Typography replaced before any tag is resolved.
const TYPOGRAPHY: [(char, &str); 4] = [
    ('\u{2014}', " - "),
    ('\u{2013}', " - "),
    ('\u{2212}', "-"),
    ('\u{00d7}', "x"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BraceTag {
    Attack,
    OnHit,
    HitBonus,
    DifficultyClass,
    Recharge,
    SpellAttack,
    Chance,
    Dice,
    Table,
    /// Cross-reference that may carry display text in its third field.
    Link,
    /// Any other tag; renders its first field.
    Label,
}

impl BraceTag {
    fn from_name(name: &str) -> Self {
        match name {
            "atk" => Self::Attack,
            "h" => Self::OnHit,
            "hit" => Self::HitBonus,
            "dc" => Self::DifficultyClass,
            "recharge" => Self::Recharge,
            "hitYourSpellAttack" => Self::SpellAttack,
            "chance" => Self::Chance,
            "dice" => Self::Dice,
            "table" => Self::Table,
            "creature" | "item" | "spell" | "race" => Self::Link,
            _ => Self::Label,
        }
    }

    fn render(self, args: &str) -> Result<String, RenderError> {
        let fields: Vec<&str> = args.split('|').collect();
        let field = |index: usize| fields.get(index).copied().unwrap_or_default();
        Ok(match self {
            Self::Attack => render_attack(args)?,
            Self::OnHit => "On hit: ".to_owned(),
            Self::HitBonus => format!("+{args}"),
            Self::DifficultyClass => format!("DC {args}"),
            Self::Recharge if args.is_empty() => "(recharge on 6)".to_owned(),
            Self::Recharge => format!("(recharge {args}-6)"),
            Self::SpellAttack => "your spell attack modifier".to_owned(),
            Self::Chance => match fields.len() {
                2 => field(1).to_owned(),
                1 => field(0).to_owned(),
                _ => format!("{}%", field(0)),
            },
            Self::Dice if field(1).is_empty() => field(0).to_owned(),
            Self::Dice => format!("{} ({})", field(0), field(1)),
            Self::Table => format!("{} table", field(0)),
            Self::Link if !field(2).is_empty() => field(2).to_owned(),
            Self::Link | Self::Label => field(0).to_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    Melee,
    Ranged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttackKind {
    Weapon,
    Spell,
}

fn attack_code(code: &str) -> Option<(Reach, AttackKind)> {
    match code {
        "mw" => Some((Reach::Melee, AttackKind::Weapon)),
        "rw" => Some((Reach::Ranged, AttackKind::Weapon)),
        "ms" => Some((Reach::Melee, AttackKind::Spell)),
        "rs" => Some((Reach::Ranged, AttackKind::Spell)),
        _ => None,
    }
}

const fn reach_word(reach: Reach) -> &'static str {
    match reach {
        Reach::Melee => "melee",
        Reach::Ranged => "ranged",
    }
}

const fn kind_word(kind: AttackKind) -> &'static str {
    match kind {
        AttackKind::Weapon => "weapon",
        AttackKind::Spell => "spell",
    }
}

/// `mw,rw` reads "Melee or ranged weapon attack"; mixed kinds spell out
/// each alternative.
fn render_attack(args: &str) -> Result<String, RenderError> {
    let unsupported = |reason| RenderError::UnknownTagVariant {
        family: "atk",
        reason,
    };
    let mut codes: Vec<(Reach, AttackKind)> = Vec::new();
    for code in args.split(',').map(str::trim).filter(|code| !code.is_empty()) {
        let parsed = attack_code(code).ok_or_else(|| unsupported("has an unknown attack code"))?;
        if !codes.contains(&parsed) {
            codes.push(parsed);
        }
    }
    let Some(&(_, first_kind)) = codes.first() else {
        return Err(unsupported("has no attack code"));
    };
    let phrase = if codes.iter().all(|&(_, kind)| kind == first_kind) {
        let reaches: Vec<&str> = codes.iter().map(|&(reach, _)| reach_word(reach)).collect();
        format!("{} {}", reaches.join(" or "), kind_word(first_kind))
    } else {
        codes
            .iter()
            .map(|&(reach, kind)| format!("{} {}", reach_word(reach), kind_word(kind)))
            .collect::<Vec<_>>()
            .join(" or ")
    };
    Ok(format!("{} attack", capitalise(&phrase)))
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

fn normalise_typography(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let replacement = TYPOGRAPHY
            .iter()
            .find_map(|&(from, to)| (from == ch).then_some(to));
        if let Some(replacement) = replacement {
            out.push_str(replacement);
            continue;
        }
        out.push(ch);
    }
    out
}

fn spell_attack(caps: &Captures<'_>) -> String {
    let reach = if caps.get(1).is_some_and(|m| m.as_str() == "m") {
        Reach::Melee
    } else {
        Reach::Ranged
    };
    format!(
        "{} spell attack: your spell attack modifier",
        capitalise(reach_word(reach))
    )
}

fn resolve(caps: &Captures<'_>) -> Result<String, ExpandError> {
    let name = caps.get(1).map_or("", |m| m.as_str());
    let args = caps.get(2).map_or("", |m| m.as_str().trim());
    let whole = caps.get(0);
    let tag = whole.map_or("", |m| m.as_str());
    let offset = whole.map_or(0, |m| m.start());
    BraceTag::from_name(name)
        .render(args)
        .inspect(|text| log::trace!("resolved {tag} at byte {offset} to `{text}`"))
        .map_err(|err| {
            log::debug!("failed to render `{tag}` at byte {offset}: {err}");
            err.at(tag, offset)
        })
}

/// Resolve every `{@name args}` tag in `text`.
///
/// Dashes, the minus sign and the multiplication sign are normalised to
/// ASCII first, and a spell attack announced as `rs` or `ms` before
/// `{@hitYourSpellAttack}` is spelled out. Tags are then resolved innermost
/// first until none remain.
/// Reported offsets refer to the normalised text.
///
/// # Errors
/// Returns [`ExpandError::UnknownTagVariant`] for an `atk` tag with an
/// unrecognised attack code.
///
/// # Examples
/// ```
/// use statblock_markup::expand_brace_tags;
///
/// let text = "{@atk mw} {@hit 5} to hit, reach 5 ft. {@h}7 ({@damage 1d8 + 3}) piercing damage.";
/// assert_eq!(
///     expand_brace_tags(text).as_deref(),
///     Ok("Melee weapon attack +5 to hit, reach 5 ft. On hit: 7 (1d8 + 3) piercing damage.")
/// );
/// ```
pub fn expand_brace_tags(text: &str) -> Result<String, ExpandError> {
    let mut current = SPELL_ATTACK_RE
        .replace_all(&normalise_typography(text), spell_attack)
        .into_owned();
    while BRACE_TAG_RE.is_match(&current) {
        let mut next = String::with_capacity(current.len());
        let mut last = 0;
        for caps in BRACE_TAG_RE.captures_iter(&current) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            next.push_str(current.get(last..whole.start()).unwrap_or_default());
            next.push_str(&resolve(&caps)?);
            last = whole.end();
        }
        next.push_str(current.get(last..).unwrap_or_default());
        current = next;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn expand_ok(text: &str) -> String {
        expand_brace_tags(text).unwrap_or_else(|err| panic!("{text:?} should expand: {err}"))
    }

    #[rstest]
    #[case("{@atk mw}", "Melee weapon attack")]
    #[case("{@atk rw}", "Ranged weapon attack")]
    #[case("{@atk mw,rw}", "Melee or ranged weapon attack")]
    #[case("{@atk ms,rs}", "Melee or ranged spell attack")]
    #[case("{@atk rs}", "Ranged spell attack")]
    #[case("{@atk mw,rs}", "Melee weapon or ranged spell attack")]
    fn renders_attack_codes(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(expand_ok(text), expected);
    }

    #[rstest]
    #[case("{@hit 7}", "+7")]
    #[case("{@dc 15}", "DC 15")]
    #[case("{@recharge}", "(recharge on 6)")]
    #[case("{@recharge 5}", "(recharge 5-6)")]
    #[case("{@hitYourSpellAttack}", "your spell attack modifier")]
    #[case("{@chance 25|25 percent|Roll}", "25%")]
    #[case("{@chance 50|half the time}", "half the time")]
    #[case("{@dice 2d6 + 3|10}", "2d6 + 3 (10)")]
    #[case("{@dice 1d4}", "1d4")]
    #[case("{@table Wild Magic Surge|phb}", "Wild Magic Surge table")]
    #[case("{@creature goblin|mm}", "goblin")]
    #[case("{@creature ghoul|mm|ghouls}", "ghouls")]
    #[case("{@spell fireball}", "fireball")]
    #[case("{@race dwarf (hill)||Hill Dwarf}", "Hill Dwarf")]
    #[case("{@condition frightened||Frightened}", "frightened")]
    #[case("{@skill Perception}", "Perception")]
    fn renders_tags(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(expand_ok(text), expected);
    }

    #[rstest]
    #[case(
        "rs {@hitYourSpellAttack} to hit",
        "Ranged spell attack: your spell attack modifier to hit"
    )]
    #[case(
        "ms {@hitYourSpellAttack} to hit",
        "Melee spell attack: your spell attack modifier to hit"
    )]
    #[case("Spells {@hitYourSpellAttack}", "Spells your spell attack modifier")]
    #[case("hers {@hitYourSpellAttack}", "hers your spell attack modifier")]
    fn names_announced_spell_attacks(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(expand_ok(text), expected);
    }

    #[test]
    fn resolves_inner_tags_first() {
        assert_eq!(
            expand_ok("{@note see {@spell fireball|phb} page}"),
            "see fireball page"
        );
    }

    #[rstest]
    #[case("no tags here")]
    #[case("{@} and {not a tag}")]
    #[case("broken {@hit 5")]
    fn leaves_other_braces_untouched(#[case] text: &str) {
        assert_eq!(expand_ok(text), text);
    }

    #[test]
    fn normalises_typography() {
        assert_eq!(
            expand_ok("Hit: 10\u{2014}15 \u{2212}2 \u{00d7}3 5\u{2013}6"),
            "Hit: 10 - 15 -2 x3 5 - 6"
        );
    }

    #[test]
    fn rejects_attack_without_codes() {
        let err = expand_brace_tags("{@atk}");
        assert!(matches!(
            err,
            Err(ExpandError::UnknownTagVariant {
                reason: "has no attack code",
                ..
            })
        ));
    }

    #[test]
    fn rejects_unknown_attack_codes() {
        let Err(err) = expand_brace_tags("a {@atk xw} b") else {
            panic!("unknown attack code must fail");
        };
        assert_eq!(
            err,
            ExpandError::UnknownTagVariant {
                family: "atk",
                reason: "has an unknown attack code",
                tag: "{@atk xw}".into(),
                offset: 2,
            }
        );
    }
}
