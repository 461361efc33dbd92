#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const FISHRIG_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod line;
pub mod modifier;
pub mod queue;
pub mod scaffold;
pub mod storage;
pub mod validator;

// Re-exports for convenience
pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use config::{EngineConfig, default_config_path, load_config};
pub use descriptor::{ParseError, ParsedDescriptor, parse_descriptor};
pub use modifier::{ModifierKey, ModifierRegistry, TableModifiers};
pub use queue::{CheckReport, Dequeued, FrontPolicy, LineError, QueueEngine, SentinelReason};
pub use storage::{FileStorage, MemoryStorage, QueueStorage, StorageError};
pub use validator::{ValidationError, validate};
