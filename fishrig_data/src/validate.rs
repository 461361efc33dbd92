use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::*;

/// Problem found in a [`CatalogDef`] before it is turned into a live catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefError {
    DuplicateName { kind: &'static str, name: String },
    EmptyName { kind: &'static str },
    UnknownModifier { name: String, context: String },
    InvalidRange { context: String },
}

impl fmt::Display for DefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefError::DuplicateName { kind, name } => write!(f, "duplicate {kind} name '{name}'"),
            DefError::EmptyName { kind } => write!(f, "{kind} with an empty name"),
            DefError::UnknownModifier { name, context } => write!(f, "unknown modifier '{name}' ({context})"),
            DefError::InvalidRange { context } => write!(f, "invalid range ({context})"),
        }
    }
}

impl std::error::Error for DefError {}

/// Check a catalog definition for duplicate names, inverted ranges, and dangling modifier references.
///
/// ```
/// use fishrig_data::{builtin_catalog, validate_catalog_def};
///
/// assert!(validate_catalog_def(&builtin_catalog()).is_empty());
/// ```
pub fn validate_catalog_def(def: &CatalogDef) -> Vec<DefError> {
    let mut errors = Vec::new();

    track_names("reward", def.rewards.iter().map(|r| r.name.as_str()), &mut errors);
    let modifiers = track_names("modifier", def.modifiers.iter().map(|m| m.name.as_str()), &mut errors);

    for reward in &def.rewards {
        if reward.name.trim().is_empty() {
            errors.push(DefError::EmptyName { kind: "reward" });
        }
        if let Some(range) = reward.damage
            && range.min > range.max
        {
            errors.push(DefError::InvalidRange {
                context: format!("reward '{}' damage {}-{}", reward.name, range.min, range.max),
            });
        }
        for (name, bounds) in &reward.level_bounds {
            if !modifiers.contains(name.as_str()) {
                errors.push(DefError::UnknownModifier {
                    name: name.clone(),
                    context: format!("reward '{}' level bounds", reward.name),
                });
            }
            if bounds.min > bounds.max {
                errors.push(DefError::InvalidRange {
                    context: format!("reward '{}' level of {name} {}-{}", reward.name, bounds.min, bounds.max),
                });
            }
        }
    }

    // queue lines name modifiers case-insensitively
    let mut folded: HashMap<String, &str> = HashMap::new();
    for modifier in &def.modifiers {
        let first = *folded.entry(modifier.name.to_lowercase()).or_insert(modifier.name.as_str());
        if first != modifier.name {
            errors.push(DefError::DuplicateName {
                kind: "modifier",
                name: modifier.name.clone(),
            });
        }
        if modifier.name.trim().is_empty() {
            errors.push(DefError::EmptyName { kind: "modifier" });
        }
        if modifier.min_level > modifier.max_level {
            errors.push(DefError::InvalidRange {
                context: format!(
                    "modifier '{}' levels {}-{}",
                    modifier.name, modifier.min_level, modifier.max_level
                ),
            });
        }
        for other in &modifier.incompatible_with {
            if !modifiers.contains(other.as_str()) {
                errors.push(DefError::UnknownModifier {
                    name: other.clone(),
                    context: format!("modifier '{}' incompatibility list", modifier.name),
                });
            }
        }
    }

    errors
}

fn track_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
    errors: &mut Vec<DefError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            errors.push(DefError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn reward(name: &str) -> RewardDef {
        RewardDef {
            name: name.to_string(),
            template: ItemTemplate::new("minecraft:stick", ItemCategory::Misc),
            damage: None,
            modifiers: ModifierPolicy::Forbidden,
            level_bounds: BTreeMap::new(),
            note: None,
        }
    }

    #[test]
    fn duplicate_names_are_reported() {
        let def = CatalogDef {
            rewards: vec![reward("stick"), reward("stick")],
            modifiers: Vec::new(),
        };

        let errors = validate_catalog_def(&def);
        assert!(
            errors
                .iter()
                .any(|err| matches!(err, DefError::DuplicateName { kind, name } if *kind == "reward" && name == "stick"))
        );
    }

    #[test]
    fn blank_names_are_reported_for_rewards_and_modifiers() {
        let def = CatalogDef {
            rewards: vec![reward("  ")],
            modifiers: vec![ModifierDef::new("", 1, &[ItemCategory::Misc])],
        };
        let errors = validate_catalog_def(&def);
        assert!(errors.contains(&DefError::EmptyName { kind: "reward" }));
        assert!(errors.contains(&DefError::EmptyName { kind: "modifier" }));
    }

    #[test]
    fn modifier_names_differing_only_in_case_clash() {
        let def = CatalogDef {
            rewards: vec![],
            modifiers: vec![
                ModifierDef::new("lure", 3, &[]),
                ModifierDef::new("Lure", 3, &[]),
                ModifierDef::new("lure", 3, &[]),
            ],
        };
        let errors = validate_catalog_def(&def);
        assert_eq!(
            errors,
            vec![
                DefError::DuplicateName {
                    kind: "modifier",
                    name: "lure".into(),
                },
                DefError::DuplicateName {
                    kind: "modifier",
                    name: "Lure".into(),
                },
            ]
        );
    }

    #[test]
    fn inverted_damage_range_is_reported() {
        let mut bad = reward("stick");
        bad.damage = Some(AttributeRange::new(10, 2));
        let def = CatalogDef {
            rewards: vec![bad],
            modifiers: Vec::new(),
        };

        let errors = validate_catalog_def(&def);
        assert!(matches!(errors.as_slice(), [DefError::InvalidRange { .. }]));
    }

    #[test]
    fn dangling_modifier_references_are_reported() {
        let mut bounded = reward("rod");
        bounded.level_bounds.insert("lure".into(), LevelBounds::new(1, 2));
        let def = CatalogDef {
            rewards: vec![bounded],
            modifiers: vec![ModifierDef::new("luck_of_the_sea", 3, &[]).excluding(&["lure"])],
        };

        let errors = validate_catalog_def(&def);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|err| matches!(err, DefError::UnknownModifier { name, .. } if name == "lure")));
    }

    #[test]
    fn errors_render_readable_messages() {
        let err = DefError::UnknownModifier {
            name: "lure".into(),
            context: "reward 'rod' level bounds".into(),
        };
        assert_eq!(err.to_string(), "unknown modifier 'lure' (reward 'rod' level bounds)");
    }
}
