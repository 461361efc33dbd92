//! Engine configuration and startup wiring.
//!
//! Settings live in a small TOML file. A missing or unreadable config is not
//! fatal: the engine falls back to defaults and logs why.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;

use crate::catalog::{Catalog, load_catalog_def};
use crate::queue::{FrontPolicy, QueueEngine};
use crate::storage::FileStorage;

pub const CONFIG_FILE: &str = "fishrig.toml";
pub const DEFAULT_QUEUE_FILE: &str = "fishrig.txt";

/// Settings read from `fishrig.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The human-edited queue file.
    pub queue_file: PathBuf,
    /// TOML catalog replacing the built-in rewards and enchantments.
    pub catalog_file: Option<PathBuf>,
    /// Write the commented scaffold when the queue file is missing.
    pub scaffold_missing: bool,
    pub front_policy: FrontPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_file: PathBuf::from(DEFAULT_QUEUE_FILE),
            catalog_file: None,
            scaffold_missing: true,
            front_policy: FrontPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Anchor relative paths at `base` (normally the config file's directory).
    #[must_use]
    pub fn resolve_relative(mut self, base: &Path) -> Self {
        if self.queue_file.is_relative() {
            self.queue_file = base.join(&self.queue_file);
        }
        if let Some(catalog) = self.catalog_file.as_mut()
            && catalog.is_relative()
        {
            *catalog = base.join(&*catalog);
        }
        self
    }

    /// Build a queue engine over the configured file and catalog.
    ///
    /// # Errors
    /// Returns an error if a configured catalog file can't be loaded or is invalid.
    pub fn open_engine(&self) -> Result<QueueEngine<FileStorage>> {
        let (catalog, modifiers) = match &self.catalog_file {
            Some(path) => {
                let def = load_catalog_def(path)?;
                Catalog::from_def(&def).with_context(|| format!("while building catalog from {}", path.display()))?
            },
            None => Catalog::builtin(),
        };
        info!(
            "{} rewards and {} modifiers available for {}",
            catalog.len(),
            modifiers.len(),
            self.queue_file.display()
        );
        Ok(QueueEngine::new(FileStorage::new(&self.queue_file), catalog, modifiers)
            .with_scaffold(self.scaffold_missing)
            .with_front_policy(self.front_policy))
    }
}

/// Default config location: `<config dir>/fishrig/fishrig.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| build_config_path(&base))
}

fn build_config_path(base: &Path) -> PathBuf {
    let mut path = base.to_path_buf();
    path.push("fishrig");
    path.push(CONFIG_FILE);
    path
}

/// Load the config at `path`, falling back to defaults if it is missing or malformed.
pub fn load_config(path: &Path) -> EngineConfig {
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    match try_load_config(path) {
        Ok(Some(config)) => {
            info!("loaded config from {}", path.display());
            config.resolve_relative(base)
        },
        Ok(None) => {
            info!("no config at {}, using defaults", path.display());
            EngineConfig::default().resolve_relative(base)
        },
        Err(err) => {
            warn!("failed to load config from {}: {err:#}; using defaults", path.display());
            EngineConfig::default().resolve_relative(base)
        },
    }
}

fn try_load_config(path: &Path) -> Result<Option<EngineConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(config))
}
