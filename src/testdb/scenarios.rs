//! Predefined end-to-end scenarios
//!
//! Each scenario builds two profiles (from dump bytes, a mock reader, or
//! both), compares them, and states the expected outcome.

use super::mock_reader::MockReaderConfig;
use crate::core::compare::Comparison;
use crate::reader::ScanResult;

/// Where one side of a comparison comes from
#[derive(Debug, Clone)]
pub enum ProfileInput {
    /// Dump file contents
    Dump(Vec<u8>),
    /// A mock reader with this card (or none) and behavior
    Card {
        card: Option<ScanResult>,
        reader: MockReaderConfig,
    },
}

impl ProfileInput {
    pub fn dump(bytes: &[u8]) -> Self {
        ProfileInput::Dump(bytes.to_vec())
    }

    pub fn card(card: ScanResult) -> Self {
        ProfileInput::Card {
            card: Some(card),
            reader: MockReaderConfig::default(),
        }
    }

    pub fn empty_field() -> Self {
        ProfileInput::Card {
            card: None,
            reader: MockReaderConfig::default(),
        }
    }
}

/// Expected result of running a scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedOutcome {
    /// Both profiles build and compare to this
    Compare(Comparison),
    /// Building fails with this error kind (see `NfcError::kind`)
    Error(String),
}

/// A complete test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    /// Scenario name for identification
    pub name: String,
    /// Description of what this scenario tests
    pub description: String,
    pub left: ProfileInput,
    pub right: ProfileInput,
    pub expected: ExpectedOutcome,
    /// Tags for filtering scenarios
    pub tags: Vec<String>,
}

impl TestScenario {
    pub fn new(
        name: &str,
        description: &str,
        left: ProfileInput,
        right: ProfileInput,
        expected: ExpectedOutcome,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            left,
            right,
            expected,
            tags: Vec::new(),
        }
    }

    /// Add tags to the scenario
    pub fn with_tags(mut self, tags: Vec<&str>) -> Self {
        self.tags = tags.into_iter().map(String::from).collect();
        self
    }
}

const UID_C3: &[u8] = &[0x04, 0xA1, 0xB2, 0xC3];
const NDEF_URI: &[u8] = &[
    0xD1, 0x01, 0x0B, 0x55, 0x04, b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'.', b'c', b'o',
];

/// Collection of all predefined test scenarios
pub struct ScenarioLibrary;

impl ScenarioLibrary {
    // =========================================================================
    // FILE VS FILE
    // =========================================================================

    pub fn text_uid_match() -> TestScenario {
        TestScenario::new(
            "text_uid_match",
            "Two text dumps with the same UID",
            ProfileInput::dump(b"Filetype: NFC\nUID: 04 A1 B2 C3\n"),
            ProfileInput::dump(b"Filetype: NFC\nUID: 04 A1 B2 C3\n"),
            ExpectedOutcome::Compare(Comparison::Equal),
        )
        .with_tags(vec!["file", "text", "basic"])
    }

    pub fn text_uid_mismatch() -> TestScenario {
        TestScenario::new(
            "text_uid_mismatch",
            "Text dumps whose UIDs differ in the last byte",
            ProfileInput::dump(b"UID: 04A1B2C3"),
            ProfileInput::dump(b"UID: 04A1B2C4"),
            ExpectedOutcome::Compare(Comparison::Different),
        )
        .with_tags(vec!["file", "text", "basic"])
    }

    pub fn binary_identical() -> TestScenario {
        TestScenario::new(
            "binary_identical",
            "Identical opaque dumps compare by digest",
            ProfileInput::dump(&[0x01, 0x02, 0x03]),
            ProfileInput::dump(&[0x01, 0x02, 0x03]),
            ExpectedOutcome::Compare(Comparison::Equal),
        )
        .with_tags(vec!["file", "binary", "basic"])
    }

    pub fn binary_one_byte_changed() -> TestScenario {
        TestScenario::new(
            "binary_one_byte_changed",
            "Opaque dumps differing in one byte",
            ProfileInput::dump(&[0x01, 0x02, 0x03]),
            ProfileInput::dump(&[0x01, 0x02, 0x04]),
            ExpectedOutcome::Compare(Comparison::Different),
        )
        .with_tags(vec!["file", "binary"])
    }

    pub fn text_vs_binary() -> TestScenario {
        TestScenario::new(
            "text_vs_binary",
            "A text dump never matches an opaque dump (NDEF on one side only)",
            ProfileInput::dump(b"UID: 04A1B2C3"),
            ProfileInput::dump(&[0x04, 0xA1, 0xB2, 0xC3]),
            ExpectedOutcome::Compare(Comparison::Different),
        )
        .with_tags(vec!["file", "text", "binary"])
    }

    pub fn lowercase_dumps_are_blank() -> TestScenario {
        TestScenario::new(
            "lowercase_dumps_are_blank",
            "Lowercase hex recovers nothing, so two unrelated dumps compare Equal",
            ProfileInput::dump(b"UID: a1b2c3d4"),
            ProfileInput::dump(b"UID: ffeeddcc"),
            ExpectedOutcome::Compare(Comparison::Equal),
        )
        .with_tags(vec!["file", "text", "ambiguity"])
    }

    pub fn empty_dump() -> TestScenario {
        TestScenario::new(
            "empty_dump",
            "An empty dump fails to load",
            ProfileInput::dump(&[]),
            ProfileInput::dump(b"UID: 01"),
            ExpectedOutcome::Error("LoadFailed".to_string()),
        )
        .with_tags(vec!["file", "error"])
    }

    // =========================================================================
    // FILE VS CARD
    // =========================================================================

    pub fn file_matches_card() -> TestScenario {
        TestScenario::new(
            "file_matches_card",
            "Text dump UID matches a card that reports only its UID",
            ProfileInput::dump(b"UID: 04 A1 B2 C3"),
            ProfileInput::card(ScanResult::with_uid(UID_C3)),
            ExpectedOutcome::Compare(Comparison::Equal),
        )
        .with_tags(vec!["scan", "file", "basic"])
    }

    pub fn file_vs_card_with_atqa() -> TestScenario {
        TestScenario::new(
            "file_vs_card_with_atqa",
            "Same UID but the card reports ATQA/SAK the dump never records",
            ProfileInput::dump(b"UID: 04 A1 B2 C3"),
            ProfileInput::card(ScanResult::with_uid(UID_C3).atqa_sak([0x44, 0x00], 0x08)),
            ExpectedOutcome::Compare(Comparison::Different),
        )
        .with_tags(vec!["scan", "file", "ambiguity"])
    }

    pub fn binary_dump_matches_card_ndef() -> TestScenario {
        TestScenario::new(
            "binary_dump_matches_card_ndef",
            "Opaque dump equals the NDEF message read from the card",
            ProfileInput::dump(NDEF_URI),
            ProfileInput::card(ScanResult::with_uid(UID_C3).ndef(NDEF_URI)),
            ExpectedOutcome::Compare(Comparison::Equal),
        )
        .with_tags(vec!["scan", "binary"])
    }

    pub fn long_uid_truncated() -> TestScenario {
        let uid: Vec<u8> = (0x10..0x24).collect();
        let mut dump = b"UID: ".to_vec();
        dump.extend(
            uid[..16]
                .iter()
                .map(|b| format!("{:02X} ", b))
                .collect::<String>()
                .as_bytes(),
        );
        TestScenario::new(
            "long_uid_truncated",
            "A 20-byte card UID is cut to 16 bytes and matches the dump",
            ProfileInput::Dump(dump),
            ProfileInput::card(ScanResult::with_uid(&uid)),
            ExpectedOutcome::Compare(Comparison::Equal),
        )
        .with_tags(vec!["scan", "edge-case"])
    }

    pub fn card_vs_card_same_uid() -> TestScenario {
        TestScenario::new(
            "card_vs_card_same_uid",
            "Two reads of the same card",
            ProfileInput::card(ScanResult::with_uid(UID_C3).atqa_sak([0x44, 0x00], 0x08)),
            ProfileInput::card(ScanResult::with_uid(UID_C3).atqa_sak([0x44, 0x00], 0x08)),
            ExpectedOutcome::Compare(Comparison::Equal),
        )
        .with_tags(vec!["scan", "basic"])
    }

    // =========================================================================
    // READER ERRORS
    // =========================================================================

    pub fn no_card_present() -> TestScenario {
        TestScenario::new(
            "no_card_present",
            "Polling an empty field fails the scan",
            ProfileInput::dump(b"UID: 01"),
            ProfileInput::empty_field(),
            ExpectedOutcome::Error("ScanFailed".to_string()),
        )
        .with_tags(vec!["scan", "error"])
    }

    pub fn card_too_slow() -> TestScenario {
        TestScenario::new(
            "card_too_slow",
            "A card answering after the scan timeout fails the scan",
            ProfileInput::dump(b"UID: 01"),
            ProfileInput::Card {
                card: Some(ScanResult::with_uid(&[0x01])),
                reader: MockReaderConfig::slow(60_000),
            },
            ExpectedOutcome::Error("ScanFailed".to_string()),
        )
        .with_tags(vec!["scan", "error"])
    }

    // =========================================================================
    // COLLECTIONS
    // =========================================================================

    /// Get all available scenarios
    pub fn all_scenarios() -> Vec<TestScenario> {
        vec![
            Self::text_uid_match(),
            Self::text_uid_mismatch(),
            Self::binary_identical(),
            Self::binary_one_byte_changed(),
            Self::text_vs_binary(),
            Self::lowercase_dumps_are_blank(),
            Self::empty_dump(),
            Self::file_matches_card(),
            Self::file_vs_card_with_atqa(),
            Self::binary_dump_matches_card_ndef(),
            Self::long_uid_truncated(),
            Self::card_vs_card_same_uid(),
            Self::no_card_present(),
            Self::card_too_slow(),
        ]
    }

    /// Get scenarios filtered by tag
    pub fn scenarios_by_tag(tag: &str) -> Vec<TestScenario> {
        Self::all_scenarios()
            .into_iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Get a scenario by name
    pub fn get_by_name(name: &str) -> Option<TestScenario> {
        Self::all_scenarios().into_iter().find(|s| s.name == name)
    }
}
