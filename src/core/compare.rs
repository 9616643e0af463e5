//! Structural equivalence between two profiles
//!
//! Comparison is an ordered AND of checks that stops at the first mismatch:
//!
//! 1. UID - only when both profiles carry one
//! 2. NDEF digest - when either profile carries one, both must, and equal
//! 3. ATQA - exact, "not recorded" (`00 00`) included
//! 4. SAK - exact, "not recorded" (`00`) included
//!
//! There is no partial score. Two profiles with nothing recorded are Equal.

use super::error::{NfcError, Result};
use super::profile::Profile;
use serde::Serialize;
use std::fmt::{self, Display};

/// Outcome of comparing two profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Equal,
    Different,
}

impl Comparison {
    pub fn is_equal(&self) -> bool {
        matches!(self, Comparison::Equal)
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Equal => write!(f, "Equal"),
            Comparison::Different => write!(f, "Different"),
        }
    }
}

/// The first check that failed when two profiles differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mismatch {
    /// Both UIDs present with different lengths
    UidLength,
    /// Both UIDs present, same length, different bytes
    UidBytes,
    /// Only one side has an NDEF digest
    NdefPresence,
    NdefDigest,
    Atqa,
    Sak,
}

impl Mismatch {
    pub fn description(&self) -> &'static str {
        match self {
            Mismatch::UidLength => "UID lengths differ",
            Mismatch::UidBytes => "UID bytes differ",
            Mismatch::NdefPresence => "NDEF present on only one side",
            Mismatch::NdefDigest => "NDEF digests differ",
            Mismatch::Atqa => "ATQA differs",
            Mismatch::Sak => "SAK differs",
        }
    }
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Find the first failing check, or `None` when the profiles are equivalent
pub fn first_mismatch(a: &Profile, b: &Profile) -> Option<Mismatch> {
    if !a.uid().is_empty() && !b.uid().is_empty() {
        if a.uid_len() != b.uid_len() {
            return Some(Mismatch::UidLength);
        }
        if a.uid() != b.uid() {
            return Some(Mismatch::UidBytes);
        }
    }

    if a.ndef_present() || b.ndef_present() {
        match (a.ndef_digest(), b.ndef_digest()) {
            (Some(da), Some(db)) if da != db => return Some(Mismatch::NdefDigest),
            (Some(_), Some(_)) => {}
            _ => return Some(Mismatch::NdefPresence),
        }
    }

    if a.atqa() != b.atqa() {
        return Some(Mismatch::Atqa);
    }

    if a.sak() != b.sak() {
        return Some(Mismatch::Sak);
    }

    None
}

impl Profile {
    /// Compare against another profile
    pub fn compare(&self, other: &Profile) -> Comparison {
        match first_mismatch(self, other) {
            None => Comparison::Equal,
            Some(_) => Comparison::Different,
        }
    }
}

/// Compare two possibly-absent profiles
///
/// An absent side is a caller bug and is reported as
/// [`NfcError::InvalidComparisonInput`], never as `Different`.
pub fn compare(a: Option<&Profile>, b: Option<&Profile>) -> Result<Comparison> {
    match (a, b) {
        (Some(a), Some(b)) => Ok(a.compare(b)),
        (None, Some(_)) => Err(NfcError::InvalidComparisonInput(
            "first profile is absent".to_string(),
        )),
        (Some(_), None) => Err(NfcError::InvalidComparisonInput(
            "second profile is absent".to_string(),
        )),
        (None, None) => Err(NfcError::InvalidComparisonInput(
            "both profiles are absent".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::{build_from_file, build_from_scan};
    use crate::core::digest::digest;
    use crate::core::profile::ProfileSource;
    use crate::reader::ScanResult;

    fn profile(uid: &[u8], atqa: [u8; 2], sak: u8, ndef: Option<&[u8]>) -> Profile {
        Profile::from_parts(uid, atqa, sak, ndef.map(digest), ProfileSource::Manual)
    }

    fn sample_profiles() -> Vec<Profile> {
        vec![
            Profile::default(),
            profile(&[0x04, 0xA1, 0xB2, 0xC3], [0x44, 0x00], 0x08, None),
            profile(&[0x04, 0xA1, 0xB2, 0xC4], [0x44, 0x00], 0x08, None),
            profile(&[0x04, 0xA1, 0xB2], [0x44, 0x00], 0x08, None),
            profile(&[], [0x44, 0x00], 0x08, None),
            profile(&[], [0, 0], 0, Some(&[1, 2, 3])),
            profile(&[], [0, 0], 0, Some(&[1, 2, 4])),
            profile(&[0x04, 0xA1, 0xB2, 0xC3], [0x44, 0x00], 0x08, Some(&[9])),
            profile(&[0x04, 0xA1, 0xB2, 0xC3], [0x04, 0x00], 0x08, None),
            profile(&[0x04, 0xA1, 0xB2, 0xC3], [0x44, 0x00], 0x20, None),
        ]
    }

    #[test]
    fn test_reflexive_on_full_profile() {
        let p = profile(&[0x04, 0xA1, 0xB2, 0xC3], [0x44, 0x00], 0x08, Some(b"hello"));
        let copy = p.clone();
        assert_eq!(p.compare(&copy), Comparison::Equal);
        assert_eq!(first_mismatch(&p, &copy), None);
    }

    #[test]
    fn test_symmetric() {
        let profiles = sample_profiles();
        for a in &profiles {
            for b in &profiles {
                assert_eq!(a.compare(b), b.compare(a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_uid_mismatch_from_file() {
        let from_file = build_from_file(b"UID: 04A1B2C3").unwrap();
        let other = profile(&[0x04, 0xA1, 0xB2, 0xC4], [0, 0], 0, None);
        assert_eq!(from_file.compare(&other), Comparison::Different);
        assert_eq!(first_mismatch(&from_file, &other), Some(Mismatch::UidBytes));
    }

    #[test]
    fn test_uid_length_mismatch() {
        let a = profile(&[0x04, 0xA1, 0xB2, 0xC3], [0, 0], 0, None);
        let b = profile(&[0x04, 0xA1, 0xB2], [0, 0], 0, None);
        assert_eq!(first_mismatch(&a, &b), Some(Mismatch::UidLength));
    }

    #[test]
    fn test_empty_uid_skips_uid_check() {
        let a = profile(&[0x04, 0xA1], [0, 0], 0, None);
        let b = Profile::default();
        assert_eq!(a.compare(&b), Comparison::Equal);
    }

    #[test]
    fn test_binary_content() {
        let a = build_from_file(&[0x01, 0x02, 0x03]).unwrap();
        let b = build_from_file(&[0x01, 0x02, 0x03]).unwrap();
        let c = build_from_file(&[0x01, 0x02, 0x04]).unwrap();
        assert_eq!(a.compare(&b), Comparison::Equal);
        assert_eq!(a.compare(&c), Comparison::Different);
        assert_eq!(first_mismatch(&a, &c), Some(Mismatch::NdefDigest));
    }

    #[test]
    fn test_ndef_on_one_side_only() {
        let a = profile(&[0x01], [0, 0], 0, Some(&[1]));
        let b = profile(&[0x01], [0, 0], 0, None);
        assert_eq!(first_mismatch(&a, &b), Some(Mismatch::NdefPresence));
        assert_eq!(first_mismatch(&b, &a), Some(Mismatch::NdefPresence));
    }

    #[test]
    fn test_blank_profiles_are_equal() {
        // Nothing recorded on either side still compares Equal
        assert_eq!(
            Profile::default().compare(&Profile::default()),
            Comparison::Equal
        );
    }

    #[test]
    fn test_recorded_zero_equals_unrecorded() {
        let recorded = build_from_scan(&ScanResult::with_uid(&[0x01]).atqa_sak([0, 0], 0));
        let unrecorded = build_from_scan(&ScanResult::with_uid(&[0x01]));
        assert_eq!(recorded.compare(&unrecorded), Comparison::Equal);
    }

    #[test]
    fn test_atqa_and_sak_checked_in_order() {
        let base = profile(&[0x01], [0x44, 0x00], 0x08, None);
        let atqa = profile(&[0x01], [0x04, 0x00], 0x20, None);
        let sak = profile(&[0x01], [0x44, 0x00], 0x20, None);
        assert_eq!(first_mismatch(&base, &atqa), Some(Mismatch::Atqa));
        assert_eq!(first_mismatch(&base, &sak), Some(Mismatch::Sak));
    }

    #[test]
    fn test_file_uid_vs_scan_with_atqa_is_different() {
        // A text dump never records ATQA, so a scan that did is Different
        let file = build_from_file(b"UID: 04A1B2C3").unwrap();
        let scan =
            build_from_scan(&ScanResult::with_uid(&[0x04, 0xA1, 0xB2, 0xC3]).atqa_sak([0x44, 0], 0));
        assert_eq!(first_mismatch(&file, &scan), Some(Mismatch::Atqa));
    }

    #[test]
    fn test_absent_input_is_error() {
        let p = Profile::default();
        assert_eq!(compare(Some(&p), Some(&p)), Ok(Comparison::Equal));
        for (a, b) in [(None, Some(&p)), (Some(&p), None), (None, None)] {
            let err = compare(a, b).unwrap_err();
            assert_eq!(err.kind(), "InvalidComparisonInput");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Comparison::Equal.to_string(), "Equal");
        assert_eq!(Comparison::Different.to_string(), "Different");
        assert_eq!(Mismatch::Atqa.to_string(), "ATQA differs");
    }
}
