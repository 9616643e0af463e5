//! Card reader module
//!
//! # Submodules
//!
//! - `traits` - [`CardReader`] trait and the raw [`ScanResult`] it yields
//! - `capture` - Reader replaying a JSON capture file
//!
//! The profile core only ever sees a [`ScanResult`] or a
//! [`NfcError::ScanFailed`](crate::core::error::NfcError::ScanFailed);
//! timeouts and retries belong to the reader and the caller.

pub mod capture;
pub mod traits;

pub use capture::{CaptureReader, ScanCapture};
pub use traits::{BoxedCardReader, CardReader, NoReader, ReaderInfo, ReaderKind, ScanResult};

use crate::core::builder::ProfileBuilder;
use crate::core::error::Result;
use crate::core::profile::Profile;
use log::info;
use std::time::Duration;

/// Poll a reader once and build the profile of the card it returned
pub fn scan_profile(
    reader: &mut dyn CardReader,
    timeout: Duration,
    builder: &ProfileBuilder,
) -> Result<Profile> {
    let info = reader.info();
    info!("Waiting for a card on {} ({})", info.name, info.kind);

    let scan = reader.poll(timeout)?;
    let profile = builder.from_scan(&scan);
    info!("Card scanned: UID {}", profile.uid_display());
    Ok(profile)
}
