//! Dump file loading
//!
//! Reads the head of a dump file and feeds it to the profile builder. A
//! missing, unreadable, or empty file is a [`NfcError::LoadFailed`] and the
//! builder is never reached.

use super::builder::ProfileBuilder;
use super::config::LoaderConfig;
use super::error::{NfcError, Result};
use super::profile::Profile;
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read at most `max_bytes` from the start of `path` (0 = whole file)
pub fn load_file(path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
    let file = File::open(path)
        .map_err(|e| NfcError::LoadFailed(format!("{}: {}", path.display(), e)))?;

    let limit = if max_bytes == 0 {
        u64::MAX
    } else {
        max_bytes as u64
    };

    let mut buffer = Vec::new();
    let read = file
        .take(limit)
        .read_to_end(&mut buffer)
        .map_err(|e| NfcError::LoadFailed(format!("{}: {}", path.display(), e)))?;

    debug!("Read {} byte(s) from {}", read, path.display());

    if read == 0 {
        return Err(NfcError::LoadFailed(format!(
            "{}: no data",
            path.display()
        )));
    }

    Ok(buffer)
}

/// Load a dump file and build its profile
pub fn load_profile(path: &Path, config: &LoaderConfig, builder: &ProfileBuilder) -> Result<Profile> {
    let raw = load_file(path, config.max_read_bytes)?;
    let profile = builder.from_file(&raw)?;
    info!("Loaded profile from {} ({})", path.display(), profile.source());
    Ok(profile)
}
