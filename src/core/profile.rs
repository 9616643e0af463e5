//! Normalized card identity profile
//!
//! A [`Profile`] is the fixed-shape record both sources (tag dump files and
//! live scans) are reduced to. Fields are private: a profile is built in
//! one pass by the builder and is read-only afterwards.

use super::digest::{bytes_to_hex, NdefDigest};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt::{self, Display};

/// Maximum number of UID bytes kept in a profile
pub const MAX_UID_LEN: usize = 16;

/// Where a profile came from (display only, never compared)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileSource {
    /// Built from a dump file by the named extractor
    File { extractor: String },
    /// Built from a reader scan
    Scan,
    /// Assembled directly from field values
    #[default]
    Manual,
}

impl Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileSource::File { extractor } => write!(f, "file ({})", extractor),
            ProfileSource::Scan => write!(f, "scan"),
            ProfileSource::Manual => write!(f, "manual"),
        }
    }
}

/// Identity record of a contactless card
///
/// `atqa == [0, 0]` and `sak == 0` mean "not recorded". A card that really
/// reports zero for these fields cannot be told apart from one whose values
/// were never captured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Profile {
    uid: Vec<u8>,
    atqa: [u8; 2],
    sak: u8,
    ndef_digest: Option<NdefDigest>,
    source: ProfileSource,
}

impl Profile {
    /// Assemble a profile from field values
    ///
    /// UID bytes beyond [`MAX_UID_LEN`] are dropped.
    pub fn from_parts(
        uid: &[u8],
        atqa: [u8; 2],
        sak: u8,
        ndef_digest: Option<NdefDigest>,
        source: ProfileSource,
    ) -> Self {
        let keep = uid.len().min(MAX_UID_LEN);
        Self {
            uid: uid[..keep].to_vec(),
            atqa,
            sak,
            ndef_digest,
            source,
        }
    }

    /// UID bytes (empty when no UID was recovered)
    pub fn uid(&self) -> &[u8] {
        &self.uid
    }

    /// Number of UID bytes
    pub fn uid_len(&self) -> usize {
        self.uid.len()
    }

    pub fn atqa(&self) -> [u8; 2] {
        self.atqa
    }

    pub fn sak(&self) -> u8 {
        self.sak
    }

    /// Whether an NDEF payload (or opaque content) digest is recorded
    pub fn ndef_present(&self) -> bool {
        self.ndef_digest.is_some()
    }

    /// Digest of the NDEF payload, if one was recorded
    pub fn ndef_digest(&self) -> Option<&NdefDigest> {
        self.ndef_digest.as_ref()
    }

    pub fn source(&self) -> &ProfileSource {
        &self.source
    }

    /// True when none of the identity fields carries a value
    pub fn is_blank(&self) -> bool {
        self.uid.is_empty() && self.atqa == [0, 0] && self.sak == 0 && self.ndef_digest.is_none()
    }

    /// UID as spaced uppercase hex, e.g. `04 A1 B2 C3`
    pub fn uid_display(&self) -> String {
        self.uid
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uid.is_empty() {
            writeln!(f, "UID:    (none)")?;
        } else {
            writeln!(f, "UID:    {} ({} bytes)", self.uid_display(), self.uid.len())?;
        }

        if self.atqa == [0, 0] {
            writeln!(f, "ATQA:   (not recorded)")?;
        } else {
            writeln!(f, "ATQA:   {:02X} {:02X}", self.atqa[0], self.atqa[1])?;
        }

        if self.sak == 0 {
            writeln!(f, "SAK:    (not recorded)")?;
        } else {
            writeln!(f, "SAK:    {:02X}", self.sak)?;
        }

        match &self.ndef_digest {
            Some(d) => writeln!(f, "NDEF:   {}", d)?,
            None => writeln!(f, "NDEF:   (none)")?,
        }

        write!(f, "Source: {}", self.source)
    }
}

impl Serialize for Profile {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Profile", 7)?;
        state.serialize_field("uid", &bytes_to_hex(&self.uid))?;
        state.serialize_field("uid_len", &self.uid.len())?;
        state.serialize_field("atqa", &bytes_to_hex(&self.atqa))?;
        state.serialize_field("sak", &format!("{:02X}", self.sak))?;
        state.serialize_field("ndef_present", &self.ndef_present())?;
        state.serialize_field("ndef_digest", &self.ndef_digest)?;
        state.serialize_field("source", &self.source)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::digest::digest;

    #[test]
    fn test_default_profile_is_blank() {
        let p = Profile::default();
        assert!(p.is_blank());
        assert_eq!(p.uid_len(), 0);
        assert!(!p.ndef_present());
        assert!(p.ndef_digest().is_none());
    }

    #[test]
    fn test_from_parts_truncates_uid() {
        let long: Vec<u8> = (0..20).collect();
        let p = Profile::from_parts(&long, [0, 0], 0, None, ProfileSource::Manual);
        assert_eq!(p.uid_len(), MAX_UID_LEN);
        assert_eq!(p.uid(), &long[..MAX_UID_LEN]);
    }

    #[test]
    fn test_ndef_present_tracks_digest() {
        let p = Profile::from_parts(&[], [0, 0], 0, Some(digest(b"x")), ProfileSource::Scan);
        assert!(p.ndef_present());
        assert!(!p.is_blank());
    }

    #[test]
    fn test_display() {
        let p = Profile::from_parts(
            &[0x04, 0xA1, 0xB2, 0xC3],
            [0x44, 0x00],
            0x08,
            None,
            ProfileSource::Scan,
        );
        let text = p.to_string();
        assert!(text.contains("04 A1 B2 C3 (4 bytes)"));
        assert!(text.contains("ATQA:   44 00"));
        assert!(text.contains("SAK:    08"));
        assert!(text.contains("NDEF:   (none)"));
        assert!(text.contains("Source: scan"));
    }

    #[test]
    fn test_serialize_json() {
        let p = Profile::from_parts(
            &[0x04, 0xA1],
            [0, 0],
            0,
            Some(digest(&[1, 2, 3])),
            ProfileSource::File {
                extractor: "binary-digest".to_string(),
            },
        );
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["uid"], "04A1");
        assert_eq!(value["uid_len"], 2);
        assert_eq!(value["atqa"], "0000");
        assert_eq!(value["sak"], "00");
        assert_eq!(value["ndef_present"], true);
        assert_eq!(value["ndef_digest"], digest(&[1, 2, 3]).to_hex());
        assert_eq!(value["source"]["kind"], "file");
        assert_eq!(value["source"]["extractor"], "binary-digest");
    }
}
