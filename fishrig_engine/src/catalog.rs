//! The reward catalog: every name a queue line may legally use, with its rules.
//!
//! Catalogs are built once at startup from a [`CatalogDef`] (either the
//! built-in table or a TOML catalog file) and never change afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fishrig_data::{AttributeRange, CatalogDef, DefError, ItemTemplate, LevelBounds, ModifierPolicy, RewardDef};
use log::info;
use thiserror::Error;

use crate::modifier::{ModifierKey, TableModifiers};

/// One legal reward and the rules a queue line naming it has to satisfy.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    /// Base item cloned for every reward handed out for this entry.
    pub template: ItemTemplate,
    /// `None` forbids the damage field, `Some` requires it within range.
    pub attribute_range: Option<AttributeRange>,
    pub modifier_policy: ModifierPolicy,
    /// Level bounds that replace the registry defaults for this entry only.
    pub level_bounds: HashMap<ModifierKey, LevelBounds>,
    pub note: Option<String>,
}

impl From<&RewardDef> for CatalogEntry {
    fn from(def: &RewardDef) -> Self {
        Self {
            name: def.name.clone(),
            template: def.template.clone(),
            attribute_range: def.damage,
            modifier_policy: def.modifiers,
            level_bounds: def
                .level_bounds
                .iter()
                .map(|(name, bounds)| (ModifierKey::new(name.clone()), *bounds))
                .collect(),
            note: def.note.clone(),
        }
    }
}

/// Reasons a catalog definition can't be turned into a [`Catalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog definition is invalid:\n{}", render_def_errors(.0))]
    Invalid(Vec<DefError>),
}

fn render_def_errors(errors: &[DefError]) -> String {
    errors.iter().map(|err| format!("- {err}")).collect::<Vec<_>>().join("\n")
}

/// Immutable registry of legal rewards, kept in definition order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog (and the matching modifier table) from a validated definition.
    ///
    /// # Errors
    /// Returns [`CatalogError::Invalid`] listing every problem `validate_catalog_def` found.
    pub fn from_def(def: &CatalogDef) -> Result<(Catalog, TableModifiers), CatalogError> {
        let errors = fishrig_data::validate_catalog_def(def);
        if !errors.is_empty() {
            return Err(CatalogError::Invalid(errors));
        }
        let catalog = Catalog::from_entries(def.rewards.iter().map(CatalogEntry::from));
        let modifiers = TableModifiers::new(def.modifiers.iter().cloned());
        Ok((catalog, modifiers))
    }

    /// The built-in fishing catalog and enchantment table.
    pub fn builtin() -> (Catalog, TableModifiers) {
        let def = fishrig_data::builtin_catalog();
        let catalog = Catalog::from_entries(def.rewards.iter().map(CatalogEntry::from));
        (catalog, TableModifiers::new(def.modifiers))
    }

    /// Assemble a catalog from ready-made entries. Later duplicates shadow earlier ones on lookup.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Catalog {
        let entries: Vec<CatalogEntry> = entries.into_iter().collect();
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.name.clone(), idx))
            .collect();
        Catalog { entries, by_name }
    }

    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        self.by_name.get(name).map(|idx| &self.entries[*idx])
    }

    /// All entries in definition order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read a [`CatalogDef`] from a TOML file.
///
/// # Errors
/// Returns an error if the file can't be read or isn't a valid catalog document.
pub fn load_catalog_def(path: &Path) -> Result<CatalogDef> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading catalog file {}", path.display()))?;
    let def: CatalogDef =
        toml::from_str(&raw).with_context(|| format!("parsing catalog file {}", path.display()))?;
    info!(
        "catalog file {} declares {} rewards and {} modifiers",
        path.display(),
        def.rewards.len(),
        def.modifiers.len()
    );
    Ok(def)
}
