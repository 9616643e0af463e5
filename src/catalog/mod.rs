//! Dump catalog module
//!
//! Matching one profile against a directory of dump files.
//!
//! # Submodules
//!
//! - `index` - Parallel catalog build, lookup, and statistics

pub mod index;

pub use index::{CatalogEntry, CatalogIndex, CatalogProgress, CatalogStats};
