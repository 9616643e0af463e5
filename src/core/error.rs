//! Error types for the card profile tool
//!
//! Parsing and digesting never fail. Failures come from the I/O boundary
//! (loading a dump, polling a reader), contract violations at the
//! comparator, and a catalog build cut short by Ctrl+C.

use thiserror::Error;

/// Main error type for profile building and comparison
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NfcError {
    /// The dump file was missing, unreadable, or empty
    #[error("Failed to load profile: {0}")]
    LoadFailed(String),

    /// The reader timed out, found no card, or returned an unusable capture
    #[error("Card scan failed: {0}")]
    ScanFailed(String),

    /// A profile slot handed to the comparator was empty
    #[error("Invalid comparison input: {0}")]
    InvalidComparisonInput(String),

    /// The shutdown flag was raised before the operation finished
    #[error("Interrupted: {0}")]
    Interrupted(String),
}

impl NfcError {
    /// Short machine-friendly name of the variant, used by scenario expectations
    pub fn kind(&self) -> &'static str {
        match self {
            NfcError::LoadFailed(_) => "LoadFailed",
            NfcError::ScanFailed(_) => "ScanFailed",
            NfcError::InvalidComparisonInput(_) => "InvalidComparisonInput",
            NfcError::Interrupted(_) => "Interrupted",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, NfcError>;

impl From<std::io::Error> for NfcError {
    fn from(err: std::io::Error) -> Self {
        NfcError::LoadFailed(err.to_string())
    }
}
