//! Comparison session state
//!
//! A [`Session`] owns the three profile slots a user works with (dump A,
//! dump B, and the last scanned card) together with a one-line status. The
//! status is a plain owned value that the front end renders after every
//! action; nothing here is global.

use super::builder::ProfileBuilder;
use super::compare::{compare, Comparison};
use super::config::Config;
use super::error::NfcError;
use super::loader::load_profile;
use super::profile::Profile;
use crate::reader::{scan_profile, CardReader};
use log::{info, warn};
use std::path::PathBuf;

/// Status shown before any action
pub const STATUS_READY: &str = "Ready";

/// One user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Load dump A from a file
    LoadA(PathBuf),
    /// Load dump B from a file
    LoadB(PathBuf),
    /// Poll the reader for a card
    Scan,
    CompareAWithCard,
    CompareAWithB,
}

/// Slots and status of an interactive comparison session
#[derive(Debug)]
pub struct Session {
    file_a: Option<Profile>,
    file_b: Option<Profile>,
    scanned: Option<Profile>,
    status: String,
    builder: ProfileBuilder,
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self::with_builder(config, ProfileBuilder::new())
    }

    pub fn with_builder(config: Config, builder: ProfileBuilder) -> Self {
        Self {
            file_a: None,
            file_b: None,
            scanned: None,
            status: STATUS_READY.to_string(),
            builder,
            config,
        }
    }

    /// Current status line
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn file_a(&self) -> Option<&Profile> {
        self.file_a.as_ref()
    }

    pub fn file_b(&self) -> Option<&Profile> {
        self.file_b.as_ref()
    }

    pub fn scanned(&self) -> Option<&Profile> {
        self.scanned.as_ref()
    }

    /// Apply an action and update the status line
    ///
    /// Returns the comparison outcome for compare actions. A failed load or
    /// scan clears the target slot.
    pub fn apply(&mut self, action: Action, reader: &mut dyn CardReader) -> Option<Comparison> {
        match action {
            Action::LoadA(path) => {
                self.file_a = self.load(&path);
                self.set_status(if self.file_a.is_some() {
                    "A: file loaded"
                } else {
                    "Failed to load A"
                });
                None
            }
            Action::LoadB(path) => {
                self.file_b = self.load(&path);
                self.set_status(if self.file_b.is_some() {
                    "B: file loaded"
                } else {
                    "Failed to load B"
                });
                None
            }
            Action::Scan => {
                match scan_profile(reader, self.config.scan.timeout(), &self.builder) {
                    Ok(profile) => {
                        self.scanned = Some(profile);
                        self.set_status("Card scanned");
                    }
                    Err(e) => {
                        warn!("{}", e);
                        self.scanned = None;
                        self.set_status("Scan failed");
                    }
                }
                None
            }
            Action::CompareAWithCard => {
                let (status, outcome) = compare_status(
                    self.file_a.as_ref(),
                    self.scanned.as_ref(),
                    "A vs card",
                    "A not loaded",
                    "No card scanned",
                );
                self.set_status(&status);
                outcome
            }
            Action::CompareAWithB => {
                let (status, outcome) = compare_status(
                    self.file_a.as_ref(),
                    self.file_b.as_ref(),
                    "A vs B",
                    "A not loaded",
                    "B not loaded",
                );
                self.set_status(&status);
                outcome
            }
        }
    }

    fn load(&self, path: &std::path::Path) -> Option<Profile> {
        match load_profile(path, &self.config.loader, &self.builder) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    fn set_status(&mut self, msg: &str) {
        info!("{}", msg);
        self.status = msg.to_string();
    }
}

/// Status line and outcome for comparing two slots
///
/// An empty slot is an invalid comparison input; it is reported by naming
/// the missing slot rather than comparing a zeroed record.
fn compare_status(
    a: Option<&Profile>,
    b: Option<&Profile>,
    label: &str,
    missing_a: &str,
    missing_b: &str,
) -> (String, Option<Comparison>) {
    match compare(a, b) {
        Ok(Comparison::Equal) => (format!("Match {}", label), Some(Comparison::Equal)),
        Ok(Comparison::Different) => (format!("Diff {}", label), Some(Comparison::Different)),
        Err(NfcError::InvalidComparisonInput(_)) if a.is_none() => (missing_a.to_string(), None),
        Err(_) => (missing_b.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ScanResult;
    use crate::testdb::MockCardReader;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_initial_state() {
        let session = Session::new(Config::default());
        assert_eq!(session.status(), STATUS_READY);
        assert!(session.file_a().is_none());
        assert!(session.file_b().is_none());
        assert!(session.scanned().is_none());
    }

    #[test]
    fn test_load_and_compare_files() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.nfc", b"UID: 04 A1 B2 C3");
        let b = write(&dir, "b.nfc", b"UID: 04 A1 B2 C4");
        let mut reader = MockCardReader::no_card();
        let mut session = Session::new(Config::default());

        session.apply(Action::LoadA(a.clone()), &mut reader);
        assert_eq!(session.status(), "A: file loaded");
        session.apply(Action::LoadB(b), &mut reader);
        assert_eq!(session.status(), "B: file loaded");

        let outcome = session.apply(Action::CompareAWithB, &mut reader);
        assert_eq!(outcome, Some(Comparison::Different));
        assert_eq!(session.status(), "Diff A vs B");

        session.apply(Action::LoadB(a), &mut reader);
        let outcome = session.apply(Action::CompareAWithB, &mut reader);
        assert_eq!(outcome, Some(Comparison::Equal));
        assert_eq!(session.status(), "Match A vs B");
    }

    #[test]
    fn test_compare_a_with_card() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.nfc", b"UID: 04 A1 B2 C3");
        let mut reader = MockCardReader::with_card(ScanResult::with_uid(&[0x04, 0xA1, 0xB2, 0xC3]));
        let mut session = Session::new(Config::default());

        session.apply(Action::LoadA(a), &mut reader);
        session.apply(Action::Scan, &mut reader);
        assert_eq!(session.status(), "Card scanned");
        assert!(session.scanned().is_some());

        let outcome = session.apply(Action::CompareAWithCard, &mut reader);
        assert_eq!(outcome, Some(Comparison::Equal));
        assert_eq!(session.status(), "Match A vs card");
    }

    #[test]
    fn test_failed_load_clears_slot() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "a.nfc", b"UID: 01 02");
        let empty = write(&dir, "empty.nfc", b"");
        let mut reader = MockCardReader::no_card();
        let mut session = Session::new(Config::default());

        session.apply(Action::LoadA(good), &mut reader);
        assert!(session.file_a().is_some());

        session.apply(Action::LoadA(empty), &mut reader);
        assert_eq!(session.status(), "Failed to load A");
        assert!(session.file_a().is_none());

        session.apply(Action::LoadB(dir.path().join("missing.nfc")), &mut reader);
        assert_eq!(session.status(), "Failed to load B");
    }

    #[test]
    fn test_failed_scan() {
        let mut reader = MockCardReader::no_card();
        let mut session = Session::new(Config::default());
        session.apply(Action::Scan, &mut reader);
        assert_eq!(session.status(), "Scan failed");
        assert!(session.scanned().is_none());
    }

    #[test]
    fn test_compare_with_empty_slots() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.nfc", b"UID: 01 02");
        let mut reader = MockCardReader::no_card();
        let mut session = Session::new(Config::default());

        assert_eq!(session.apply(Action::CompareAWithB, &mut reader), None);
        assert_eq!(session.status(), "A not loaded");

        session.apply(Action::LoadA(a), &mut reader);
        assert_eq!(session.apply(Action::CompareAWithB, &mut reader), None);
        assert_eq!(session.status(), "B not loaded");
        assert_eq!(session.apply(Action::CompareAWithCard, &mut reader), None);
        assert_eq!(session.status(), "No card scanned");
    }
}
