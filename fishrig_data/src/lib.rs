//! Shared data model for fishrig reward catalogs.

pub mod builtin;
pub mod defs;
pub mod validate;

pub use builtin::builtin_catalog;
pub use defs::*;
pub use validate::{DefError, validate_catalog_def};
