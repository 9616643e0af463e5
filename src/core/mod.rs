//! Core functionality module
//!
//! Profile model, digest, builder and comparator, plus the configuration,
//! error types, file loading and session state around them.
//!
//! # Submodules
//!
//! - `digest` - 16-byte content digest
//! - `profile` - The normalized card [`Profile`](profile::Profile)
//! - `builder` - Profiles from dump files and scans
//! - `compare` - Profile equivalence
//! - `loader` - Reading dump files
//! - `session` - Slots and status for interactive use
//! - `config` - Configuration loading, saving, and management
//! - `error` - Error types and result aliases

pub mod builder;
pub mod compare;
pub mod config;
pub mod digest;
pub mod error;
pub mod loader;
pub mod profile;
pub mod session;
