//! Modifier (enchantment) registry.
//!
//! The queue engine never hard-codes which enchantments exist or how they
//! interact. It asks a [`ModifierRegistry`] instead, so the game side (or a
//! test) can supply its own rules. [`TableModifiers`] is the table-driven
//! implementation built from [`ModifierDef`] records.

use std::collections::HashMap;
use std::fmt::Display;

use fishrig_data::{ItemCategory, ItemTemplate, LevelBounds, ModifierDef};

/// Canonical handle for a modifier the registry knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModifierKey(String);

impl ModifierKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ModifierKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Oracle answering every modifier question the parser and validator need.
pub trait ModifierRegistry {
    /// Map a name typed in the queue file to a known modifier.
    fn resolve(&self, name: &str) -> Option<ModifierKey>;
    /// Whether `modifier` can be put on an item cloned from `template`.
    fn applicable(&self, modifier: &ModifierKey, template: &ItemTemplate) -> bool;
    /// Whether two modifiers may share one item. Must be symmetric.
    fn compatible(&self, a: &ModifierKey, b: &ModifierKey) -> bool;
    /// Default legal level range of a modifier.
    fn level_bounds(&self, modifier: &ModifierKey) -> LevelBounds;
}

/// Registry backed by a table of [`ModifierDef`]s.
///
/// Names match case-insensitively, like game resource ids.
#[derive(Debug, Clone, Default)]
pub struct TableModifiers {
    by_name: HashMap<String, ModifierDef>,
}

impl TableModifiers {
    pub fn new(defs: impl IntoIterator<Item = ModifierDef>) -> Self {
        Self {
            by_name: defs.into_iter().map(|def| (def.name.to_lowercase(), def)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    fn def(&self, name: &str) -> Option<&ModifierDef> {
        self.by_name.get(&name.to_lowercase())
    }

    fn excludes(&self, a: &ModifierKey, b: &ModifierKey) -> bool {
        self.def(a.as_str()).is_some_and(|def| {
            def.incompatible_with
                .iter()
                .any(|other| other.to_lowercase() == b.as_str().to_lowercase())
        })
    }
}

impl ModifierRegistry for TableModifiers {
    fn resolve(&self, name: &str) -> Option<ModifierKey> {
        self.def(name).map(|def| ModifierKey::new(def.name.clone()))
    }

    fn applicable(&self, modifier: &ModifierKey, template: &ItemTemplate) -> bool {
        if template.category == ItemCategory::EnchantedBook {
            return true;
        }
        self.def(modifier.as_str())
            .is_some_and(|def| def.applies_to.contains(&template.category))
    }

    fn compatible(&self, a: &ModifierKey, b: &ModifierKey) -> bool {
        a == b || !(self.excludes(a, b) || self.excludes(b, a))
    }

    fn level_bounds(&self, modifier: &ModifierKey) -> LevelBounds {
        // unknown keys can't come out of `resolve`, so this fallback only guards foreign keys
        self.def(modifier.as_str())
            .map_or(LevelBounds::new(1, 1), ModifierDef::level_bounds)
    }
}
