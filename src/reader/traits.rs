//! Card reader abstraction traits for testability
//!
//! This module defines the seam between the profile core and whatever
//! transport produces a card read. Capture-file replay and the mock reader
//! used by the scenario tests both implement [`CardReader`], so the scan
//! pipeline works with either.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use nfc_compare::reader::{CardReader, CaptureReader};
//! use std::time::Duration;
//!
//! let mut reader = CaptureReader::new("scan.json");
//! let scan = reader.poll(Duration::from_secs(5)).map_err(|e| e.to_string())?;
//! println!("UID length: {}", scan.uid.len());
//! # Ok::<(), String>(())
//! ```

use crate::core::error::{NfcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::time::Duration;

/// Kind of transport behind a reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReaderKind {
    /// Replays a previously recorded scan from disk
    Capture,
    /// Simulated reader used by tests and scenarios
    Mock,
    #[default]
    Unknown,
}

impl ReaderKind {
    /// Get a human-readable name for this reader kind
    pub fn display_name(&self) -> &'static str {
        match self {
            ReaderKind::Capture => "Capture file",
            ReaderKind::Mock => "Mock reader",
            ReaderKind::Unknown => "Unknown",
        }
    }
}

impl Display for ReaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Descriptive information about a reader
#[derive(Debug, Clone, Default)]
pub struct ReaderInfo {
    /// Stable identifier (capture path, mock id)
    pub reader_id: String,
    /// User-friendly name
    pub name: String,
    pub kind: ReaderKind,
}

impl ReaderInfo {
    pub fn new(reader_id: &str, name: &str, kind: ReaderKind) -> Self {
        Self {
            reader_id: reader_id.to_string(),
            name: name.to_string(),
            kind,
        }
    }
}

/// Raw fields of a successful card read, as produced by the transport
///
/// Nothing here is normalized yet: the UID may be longer than a profile
/// keeps, and ATQA/SAK/NDEF are present only when the transport saw them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// UID bytes from anti-collision
    pub uid: Vec<u8>,
    /// ATQA pair, if reported
    pub atqa: Option<[u8; 2]>,
    /// SAK byte, if reported
    pub sak: Option<u8>,
    /// NDEF message bytes, if the tag carried one
    pub ndef: Option<Vec<u8>>,
}

impl ScanResult {
    /// A read that only produced a UID
    pub fn with_uid(uid: &[u8]) -> Self {
        Self {
            uid: uid.to_vec(),
            ..Default::default()
        }
    }

    pub fn atqa_sak(mut self, atqa: [u8; 2], sak: u8) -> Self {
        self.atqa = Some(atqa);
        self.sak = Some(sak);
        self
    }

    pub fn ndef(mut self, ndef: &[u8]) -> Self {
        self.ndef = Some(ndef.to_vec());
        self
    }
}

/// Trait for a card reader
///
/// A failed poll (no card in the field, timeout, broken capture) is reported
/// as [`NfcError::ScanFailed`](crate::core::error::NfcError::ScanFailed).
/// Retrying is left to the caller.
pub trait CardReader: Send {
    /// Information about this reader
    fn info(&self) -> ReaderInfo;

    /// Wait up to `timeout` for a card and return its raw fields
    fn poll(&mut self, timeout: Duration) -> Result<ScanResult>;
}

/// A boxed card reader for dynamic dispatch
pub type BoxedCardReader = Box<dyn CardReader>;

/// Stand-in used when no transport is configured; every poll fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReader;

impl CardReader for NoReader {
    fn info(&self) -> ReaderInfo {
        ReaderInfo::new("none", "No reader configured", ReaderKind::Unknown)
    }

    fn poll(&mut self, _timeout: Duration) -> Result<ScanResult> {
        Err(NfcError::ScanFailed("no reader configured".to_string()))
    }
}
