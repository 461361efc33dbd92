//! Catalog rules applied to a parsed descriptor.
//!
//! Checks run in a fixed order and stop at the first failure: catalog
//! lookup, damage attribute, modifier presence, modifier applicability and
//! pairwise compatibility, then modifier levels.

use fishrig_data::{LevelBounds, ModifierPolicy};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogEntry};
use crate::descriptor::ParsedDescriptor;
use crate::modifier::{ModifierKey, ModifierRegistry};

/// Reason a well-formed descriptor is not a legal reward.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Couldn't find this in the list of possible items")]
    UnknownItem,
    #[error("The damage property is mandatory for this item. It has to be within {min}-{max}")]
    MissingAttribute { min: i64, max: i64 },
    #[error("The damage is not within {min}-{max}")]
    AttributeOutOfRange { min: i64, max: i64 },
    #[error("This item doesn't accept a damage property")]
    AttributeNotAllowed,
    #[error("The enchantment property is mandatory for this item")]
    MissingModifiers,
    #[error("This item doesn't accept an enchantment property")]
    ModifiersNotAllowed,
    #[error("This item can't be enchanted with {name}")]
    ModifierRejected { name: String },
    #[error("Enchantment {a} is incompatible with {b}")]
    IncompatibleModifiers { a: String, b: String },
    #[error("The level of {name} is too low. Min: {min}")]
    LevelTooLow { name: String, min: u32 },
    #[error("The level of {name} is too high. Max: {max}")]
    LevelTooHigh { name: String, max: u32 },
}

/// Check `descriptor` against the catalog and return the entry it names.
///
/// # Errors
/// The first [`ValidationError`] encountered; nothing is mutated either way.
pub fn validate<'c, M>(
    descriptor: &ParsedDescriptor,
    catalog: &'c Catalog,
    registry: &M,
) -> Result<&'c CatalogEntry, ValidationError>
where
    M: ModifierRegistry + ?Sized,
{
    let entry = catalog
        .lookup(&descriptor.name)
        .ok_or(ValidationError::UnknownItem)?;

    check_attribute(entry, descriptor.attribute)?;

    match (entry.modifier_policy, &descriptor.modifiers) {
        (ModifierPolicy::Mandatory, None) => return Err(ValidationError::MissingModifiers),
        (ModifierPolicy::Forbidden, Some(_)) => return Err(ValidationError::ModifiersNotAllowed),
        (_, None) => {},
        (_, Some(modifiers)) => {
            let keys: Vec<&ModifierKey> = modifiers.keys().collect();
            check_combination(entry, &keys, registry)?;
            for (key, level) in modifiers {
                check_level(key, *level, level_bounds(entry, key, registry))?;
            }
        },
    }

    Ok(entry)
}

fn check_attribute(entry: &CatalogEntry, attribute: Option<i64>) -> Result<(), ValidationError> {
    match (entry.attribute_range, attribute) {
        (Some(range), None) => Err(ValidationError::MissingAttribute {
            min: range.min,
            max: range.max,
        }),
        (Some(range), Some(value)) if !range.contains(value) => Err(ValidationError::AttributeOutOfRange {
            min: range.min,
            max: range.max,
        }),
        (None, Some(_)) => Err(ValidationError::AttributeNotAllowed),
        _ => Ok(()),
    }
}

/// Every modifier must fit the entry's base item and get along with every other one.
fn check_combination<M>(entry: &CatalogEntry, keys: &[&ModifierKey], registry: &M) -> Result<(), ValidationError>
where
    M: ModifierRegistry + ?Sized,
{
    for first in keys {
        if !registry.applicable(first, &entry.template) {
            return Err(ValidationError::ModifierRejected {
                name: first.to_string(),
            });
        }
        for second in keys {
            if first == second {
                continue;
            }
            if !registry.compatible(first, second) {
                return Err(ValidationError::IncompatibleModifiers {
                    a: first.to_string(),
                    b: second.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn level_bounds<M>(entry: &CatalogEntry, key: &ModifierKey, registry: &M) -> LevelBounds
where
    M: ModifierRegistry + ?Sized,
{
    entry
        .level_bounds
        .get(key)
        .copied()
        .unwrap_or_else(|| registry.level_bounds(key))
}

fn check_level(key: &ModifierKey, level: u32, bounds: LevelBounds) -> Result<(), ValidationError> {
    if level < bounds.min {
        return Err(ValidationError::LevelTooLow {
            name: key.to_string(),
            min: bounds.min,
        });
    }
    if level > bounds.max {
        return Err(ValidationError::LevelTooHigh {
            name: key.to_string(),
            max: bounds.max,
        });
    }
    Ok(())
}
