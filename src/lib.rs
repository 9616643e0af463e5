//! NFC Compare Library
//!
//! Reduces contactless card data from two very different sources (tag dump
//! files and live reader scans) to one normalized [`Profile`](core::profile::Profile)
//! and decides whether two profiles describe the same card.
//!
//! # Architecture
//!
//! - [`core`] - Profile model, digest, builder, comparator, configuration,
//!   errors, file loading and session state
//! - [`reader`] - The [`CardReader`](reader::CardReader) seam and capture replay
//! - [`catalog`] - Matching one profile against a directory of dumps
//! - [`cli`] - Command-line interface (only used by the binary)
//! - [`testdb`] - Mock reader and end-to-end scenarios
//!
//! # Example Usage
//!
//! ```rust
//! use nfc_compare::core::builder::{build_from_file, build_from_scan};
//! use nfc_compare::core::compare::{compare, Comparison};
//! use nfc_compare::reader::ScanResult;
//!
//! let dump = build_from_file(b"UID: 04 A1 B2 C3\n").unwrap();
//! let card = build_from_scan(&ScanResult::with_uid(&[0x04, 0xA1, 0xB2, 0xC3]));
//!
//! assert_eq!(compare(Some(&dump), Some(&card)).unwrap(), Comparison::Equal);
//! ```
//!
//! # Testing Without a Reader
//!
//! ```rust,no_run
//! use nfc_compare::testdb::TestRunner;
//!
//! let mut runner = TestRunner::new();
//! let summary = runner.run_all();
//! println!("Passed: {}/{}", summary.passed, summary.total);
//! ```

pub mod catalog;
pub mod cli;
pub mod core;
pub mod reader;
pub mod testdb;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
