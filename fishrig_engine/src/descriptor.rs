//! Descriptor line grammar.
//!
//! `<name>[;damage:<int>][;enchant:<mod>[<lvl>](,<mod>[<lvl>])*]`
//!
//! Fields after the name may come in any order. The grammar is permissive on
//! purpose so that files written for older or newer versions keep loading:
//! unrecognized fields are ignored, repeated `damage:`/`enchant:` fields let
//! the last one win, and malformed `enchant:` pairs are skipped. Only numbers
//! that don't fit and modifier names the registry doesn't know are errors.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::modifier::{ModifierKey, ModifierRegistry};

static DAMAGE_FIELD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"damage:(\d+)").expect("damage pattern compiles"));
static MODIFIER_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\[(\d+)\]").expect("modifier pattern compiles"));

const ENCHANT_PREFIX: &str = "enchant:";

/// Structured form of one descriptor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDescriptor {
    pub name: String,
    pub attribute: Option<i64>,
    /// Never `Some` of an empty map.
    pub modifiers: Option<BTreeMap<ModifierKey, u32>>,
}

impl ParsedDescriptor {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attribute: None,
            modifiers: None,
        }
    }

    /// Modifier levels keyed by plain name, as stored on a reward.
    pub fn modifier_levels(&self) -> Option<BTreeMap<String, u32>> {
        self.modifiers.as_ref().map(|mods| {
            mods.iter()
                .map(|(key, level)| (key.as_str().to_string(), *level))
                .collect()
        })
    }
}

/// Why a descriptor line could not be read at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Can't read enchantment: {0}")]
    UnknownModifier(String),
    #[error("Can't read number: {0}")]
    InvalidNumber(String),
}

/// Parse descriptor text (inline comment already removed) into a [`ParsedDescriptor`].
///
/// # Errors
/// [`ParseError::UnknownModifier`] when an `enchant:` pair names a modifier the
/// registry can't resolve, [`ParseError::InvalidNumber`] when a damage value or
/// level doesn't fit its integer type.
pub fn parse_descriptor<M>(text: &str, registry: &M) -> Result<ParsedDescriptor, ParseError>
where
    M: ModifierRegistry + ?Sized,
{
    let mut fields = text.split(';').map(str::trim);
    let name = fields.next().unwrap_or_default();
    let mut parsed = ParsedDescriptor::named(name);

    for field in fields {
        if let Some(caps) = DAMAGE_FIELD.captures(field) {
            parsed.attribute = Some(parse_number(&caps[1])?);
        } else if let Some(list) = field.strip_prefix(ENCHANT_PREFIX) {
            parsed.modifiers = parse_modifier_list(list, registry)?;
        }
        // any other field is ignored
    }

    Ok(parsed)
}

fn parse_modifier_list<M>(list: &str, registry: &M) -> Result<Option<BTreeMap<ModifierKey, u32>>, ParseError>
where
    M: ModifierRegistry + ?Sized,
{
    let mut modifiers = BTreeMap::new();
    for pair in list.split(',') {
        let Some(caps) = MODIFIER_PAIR.captures(pair) else {
            continue;
        };
        let name = &caps[1];
        let key = registry
            .resolve(name)
            .ok_or_else(|| ParseError::UnknownModifier(name.to_string()))?;
        modifiers.insert(key, parse_number(&caps[2])?);
    }
    Ok((!modifiers.is_empty()).then_some(modifiers))
}

fn parse_number<T: std::str::FromStr>(digits: &str) -> Result<T, ParseError> {
    digits
        .parse()
        .map_err(|_| ParseError::InvalidNumber(digits.to_string()))
}
