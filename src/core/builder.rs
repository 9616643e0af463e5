//! Profile building from dump files and scans
//!
//! Dump files have no declared format, so the builder sniffs the buffer and
//! hands it to the first [`ProfileExtractor`] that claims it. The default
//! chain is:
//!
//! 1. [`UidTextExtractor`] - the buffer mentions `UID`: pull hex byte pairs
//!    out of the text.
//! 2. [`BinaryDigestExtractor`] - anything else: digest the whole buffer.
//!
//! Extraction never fails. A structured dump parser can be slotted in ahead
//! of the defaults with [`ExtractorChain::with_extractor`].

use super::digest::digest;
use super::error::{NfcError, Result};
use super::profile::{Profile, ProfileSource, MAX_UID_LEN};
use crate::reader::ScanResult;
use log::{debug, trace};

/// Marker that switches the builder to text UID extraction
pub const UID_MARKER: &[u8] = b"UID";

/// A strategy for turning a raw dump buffer into a profile
pub trait ProfileExtractor: Send + Sync {
    /// Short identifier recorded in the profile source
    fn name(&self) -> &'static str;

    /// Whether this extractor should handle `raw`
    fn sniff(&self, raw: &[u8]) -> bool;

    /// Build a profile; must not fail on any input
    fn extract(&self, raw: &[u8]) -> Profile;
}

/// Text dumps: collect uppercase hex pairs once a `UID` marker is seen
///
/// The scan starts at offset 0, not at the marker, so hex-looking text
/// before the marker (header fields and the like) is also collected. Only
/// `0-9` and `A-F` count as hex digits. Lowercase is never matched.
#[derive(Debug, Clone, Copy, Default)]
pub struct UidTextExtractor;

impl UidTextExtractor {
    fn is_hex_digit(c: u8) -> bool {
        c.is_ascii_digit() || (b'A'..=b'F').contains(&c)
    }

    fn nibble(c: u8) -> u8 {
        if c > b'9' {
            c - b'A' + 10
        } else {
            c - b'0'
        }
    }

    /// Collect up to [`MAX_UID_LEN`] bytes from adjacent hex digit pairs
    pub fn scan_uid(raw: &[u8]) -> Vec<u8> {
        let mut uid = Vec::with_capacity(MAX_UID_LEN);
        let mut i = 0;

        while i + 1 < raw.len() && uid.len() < MAX_UID_LEN {
            let (hi, lo) = (raw[i], raw[i + 1]);
            if Self::is_hex_digit(hi) && Self::is_hex_digit(lo) {
                uid.push((Self::nibble(hi) << 4) | Self::nibble(lo));
                i += 2;
            } else {
                i += 1;
            }
        }

        uid
    }
}

impl ProfileExtractor for UidTextExtractor {
    fn name(&self) -> &'static str {
        "uid-text"
    }

    fn sniff(&self, raw: &[u8]) -> bool {
        raw.windows(UID_MARKER.len()).any(|w| w == UID_MARKER)
    }

    fn extract(&self, raw: &[u8]) -> Profile {
        let uid = Self::scan_uid(raw);
        trace!("uid-text extractor collected {} byte(s)", uid.len());
        Profile::from_parts(
            &uid,
            [0, 0],
            0,
            None,
            ProfileSource::File {
                extractor: self.name().to_string(),
            },
        )
    }
}

/// Opaque dumps: the whole buffer becomes the content digest
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryDigestExtractor;

impl ProfileExtractor for BinaryDigestExtractor {
    fn name(&self) -> &'static str {
        "binary-digest"
    }

    fn sniff(&self, _raw: &[u8]) -> bool {
        true
    }

    fn extract(&self, raw: &[u8]) -> Profile {
        Profile::from_parts(
            &[],
            [0, 0],
            0,
            Some(digest(raw)),
            ProfileSource::File {
                extractor: self.name().to_string(),
            },
        )
    }
}

/// Ordered list of extractors; the first whose `sniff` accepts wins
pub struct ExtractorChain {
    extractors: Vec<Box<dyn ProfileExtractor>>,
    custom_count: usize,
}

impl ExtractorChain {
    /// The default chain: text UID extraction, then binary digest
    pub fn new() -> Self {
        Self {
            extractors: vec![Box::new(UidTextExtractor), Box::new(BinaryDigestExtractor)],
            custom_count: 0,
        }
    }

    /// Add an extractor ahead of the defaults (after previously added ones)
    pub fn with_extractor(mut self, extractor: Box<dyn ProfileExtractor>) -> Self {
        self.extractors.insert(self.custom_count, extractor);
        self.custom_count += 1;
        self
    }

    /// Pick the extractor for a buffer
    pub fn select(&self, raw: &[u8]) -> &dyn ProfileExtractor {
        self.extractors
            .iter()
            .map(|e| e.as_ref())
            .find(|e| e.sniff(raw))
            .unwrap_or(&BinaryDigestExtractor)
    }

    /// Names of the extractors in priority order
    pub fn names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }
}

impl Default for ExtractorChain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExtractorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorChain")
            .field("extractors", &self.names())
            .finish()
    }
}

/// Builds profiles from either source
#[derive(Debug, Default)]
pub struct ProfileBuilder {
    chain: ExtractorChain,
}

impl ProfileBuilder {
    /// Builder with the default extractor chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with a custom extractor chain
    pub fn with_chain(chain: ExtractorChain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &ExtractorChain {
        &self.chain
    }

    /// Build a profile from a dump file buffer
    ///
    /// An empty buffer is a load failure ("no data"). Any non-empty buffer
    /// produces a profile, possibly with nothing recovered.
    pub fn from_file(&self, raw: &[u8]) -> Result<Profile> {
        if raw.is_empty() {
            return Err(NfcError::LoadFailed("no data".to_string()));
        }

        let extractor = self.chain.select(raw);
        debug!(
            "Building profile from {} byte(s) with '{}' extractor",
            raw.len(),
            extractor.name()
        );
        Ok(extractor.extract(raw))
    }

    /// Build a profile from a successful scan
    ///
    /// - UID bytes past the profile capacity are dropped.
    /// - ATQA/SAK are kept only when an ATQA was reported and is not `00 00`.
    /// - A non-empty NDEF message is reduced to its digest.
    pub fn from_scan(&self, scan: &ScanResult) -> Profile {
        if scan.uid.len() > MAX_UID_LEN {
            debug!(
                "Scan UID is {} bytes, keeping the first {}",
                scan.uid.len(),
                MAX_UID_LEN
            );
        }

        let (atqa, sak) = match scan.atqa {
            Some(atqa) if atqa != [0, 0] => (atqa, scan.sak.unwrap_or(0)),
            _ => ([0, 0], 0),
        };

        let ndef_digest = scan
            .ndef
            .as_deref()
            .filter(|ndef| !ndef.is_empty())
            .map(digest);

        Profile::from_parts(&scan.uid, atqa, sak, ndef_digest, ProfileSource::Scan)
    }
}

/// Build a profile from a dump buffer with the default extractor chain
pub fn build_from_file(raw: &[u8]) -> Result<Profile> {
    ProfileBuilder::new().from_file(raw)
}

/// Build a profile from scan fields
pub fn build_from_scan(scan: &ScanResult) -> Profile {
    ProfileBuilder::new().from_scan(scan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_text_basic() {
        let p = build_from_file(b"UID: 04A1B2C3").unwrap();
        assert_eq!(p.uid(), &[0x04, 0xA1, 0xB2, 0xC3]);
        assert_eq!(p.uid_len(), 4);
        assert!(!p.ndef_present());
        assert_eq!(p.atqa(), [0, 0]);
        assert_eq!(p.sak(), 0);
        assert_eq!(
            p.source(),
            &ProfileSource::File {
                extractor: "uid-text".to_string()
            }
        );
    }

    #[test]
    fn test_uid_text_lowercase_is_not_recognized() {
        let p = build_from_file(b"UID: 0a1b").unwrap();
        assert_eq!(p.uid_len(), 0);
        assert!(!p.ndef_present());

        let p = build_from_file(b"UID: a1b2c3d4").unwrap();
        assert_eq!(p.uid_len(), 0);

        // "04" is two decimal digits and still decodes; only "a1" is rejected
        let p = build_from_file(b"UID 04a1").unwrap();
        assert_eq!(p.uid(), &[0x04]);
    }

    #[test]
    fn test_uid_text_marker_d_pairs_with_following_digit() {
        // The scan starts at offset 0, so the marker's own "D" is a hex digit
        let p = build_from_file(b"UID04a1").unwrap();
        assert_eq!(p.uid(), &[0xD0]);
        assert_eq!(p.uid_len(), 1);
    }

    #[test]
    fn test_uid_text_scans_from_buffer_start() {
        // Hex pairs before the marker are collected too.
        let p = build_from_file(b"AB\nUID: 04 11").unwrap();
        assert_eq!(p.uid(), &[0xAB, 0x04, 0x11]);
    }

    #[test]
    fn test_uid_text_flipper_style_dump() {
        let dump = b"Device type: ISO14443-3A\nUID: 04 A1 B2 C3\n";
        let p = build_from_file(dump).unwrap();
        // "14443" yields 0x14 and 0x44, "3A" yields 0x3A.
        assert_eq!(p.uid(), &[0x14, 0x44, 0x3A, 0x04, 0xA1, 0xB2, 0xC3]);
    }

    #[test]
    fn test_uid_text_consumed_pairs_do_not_overlap() {
        // "ABC" -> one byte 0xAB, then 'C' alone; "123" -> 0x12, then '3' alone
        assert_eq!(UidTextExtractor::scan_uid(b"ABC"), vec![0xAB]);
        assert_eq!(UidTextExtractor::scan_uid(b"1234"), vec![0x12, 0x34]);
        assert_eq!(UidTextExtractor::scan_uid(b"1 23"), vec![0x23]);
    }

    #[test]
    fn test_uid_text_caps_at_sixteen_bytes() {
        let mut dump = b"UID ".to_vec();
        dump.extend("AA".repeat(20).as_bytes());
        let p = build_from_file(&dump).unwrap();
        assert_eq!(p.uid_len(), MAX_UID_LEN);
        assert!(p.uid().iter().all(|b| *b == 0xAA));
    }

    #[test]
    fn test_uid_marker_is_case_sensitive() {
        let p = build_from_file(b"uid: 04A1").unwrap();
        assert!(p.ndef_present());
        assert_eq!(p.uid_len(), 0);
    }

    #[test]
    fn test_binary_content() {
        let p = build_from_file(&[0x01, 0x02, 0x03]).unwrap();
        assert!(p.ndef_present());
        assert_eq!(p.ndef_digest(), Some(&digest(&[0x01, 0x02, 0x03])));
        assert_eq!(p.uid_len(), 0);
        assert_eq!(p.atqa(), [0, 0]);
        assert_eq!(p.sak(), 0);
    }

    #[test]
    fn test_empty_file_is_load_failure() {
        let err = build_from_file(&[]).unwrap_err();
        assert_eq!(err, NfcError::LoadFailed("no data".to_string()));
    }

    #[test]
    fn test_marker_without_hex_gives_blank_profile() {
        let p = build_from_file(b"UID: none").unwrap();
        assert!(p.is_blank());
    }

    #[test]
    fn test_scan_copies_fields() {
        let scan = ScanResult::with_uid(&[0x04, 0xA1, 0xB2, 0xC3]).atqa_sak([0x44, 0x00], 0x08);
        let p = build_from_scan(&scan);
        assert_eq!(p.uid(), &[0x04, 0xA1, 0xB2, 0xC3]);
        assert_eq!(p.atqa(), [0x44, 0x00]);
        assert_eq!(p.sak(), 0x08);
        assert!(!p.ndef_present());
        assert_eq!(p.source(), &ProfileSource::Scan);
    }

    #[test]
    fn test_scan_truncates_long_uid() {
        let uid: Vec<u8> = (1..=20).collect();
        let p = build_from_scan(&ScanResult::with_uid(&uid));
        assert_eq!(p.uid_len(), MAX_UID_LEN);
        assert_eq!(p.uid(), &uid[..MAX_UID_LEN]);
    }

    #[test]
    fn test_scan_zero_atqa_drops_sak() {
        let scan = ScanResult::with_uid(&[0x01]).atqa_sak([0, 0], 0x20);
        let p = build_from_scan(&scan);
        assert_eq!(p.atqa(), [0, 0]);
        assert_eq!(p.sak(), 0);
    }

    #[test]
    fn test_scan_atqa_without_sak() {
        let scan = ScanResult {
            uid: vec![0x01],
            atqa: Some([0x04, 0x00]),
            sak: None,
            ndef: None,
        };
        let p = build_from_scan(&scan);
        assert_eq!(p.atqa(), [0x04, 0x00]);
        assert_eq!(p.sak(), 0);
    }

    #[test]
    fn test_scan_ndef() {
        let p = build_from_scan(&ScanResult::with_uid(&[0x01]).ndef(&[0xD1, 0x01, 0x00]));
        assert_eq!(p.ndef_digest(), Some(&digest(&[0xD1, 0x01, 0x00])));

        let empty = build_from_scan(&ScanResult::with_uid(&[0x01]).ndef(&[]));
        assert!(!empty.ndef_present());
    }

    struct MagicExtractor;

    impl ProfileExtractor for MagicExtractor {
        fn name(&self) -> &'static str {
            "magic"
        }

        fn sniff(&self, raw: &[u8]) -> bool {
            raw.starts_with(b"MAGIC")
        }

        fn extract(&self, _raw: &[u8]) -> Profile {
            Profile::from_parts(
                &[0xCA, 0xFE],
                [0x44, 0x00],
                0x20,
                None,
                ProfileSource::File {
                    extractor: self.name().to_string(),
                },
            )
        }
    }

    #[test]
    fn test_custom_extractor_takes_priority() {
        let chain = ExtractorChain::new().with_extractor(Box::new(MagicExtractor));
        assert_eq!(chain.names(), vec!["magic", "uid-text", "binary-digest"]);

        let builder = ProfileBuilder::with_chain(chain);
        let p = builder.from_file(b"MAGIC UID 0102").unwrap();
        assert_eq!(p.uid(), &[0xCA, 0xFE]);

        // Buffers the custom extractor rejects still reach the defaults
        let p = builder.from_file(b"UID 0102").unwrap();
        assert_eq!(p.uid(), &[0x01, 0x02]);
    }
}
