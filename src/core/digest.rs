//! Lightweight content fingerprint for NDEF payloads and opaque dumps
//!
//! Four independent 32-bit multiplicative/XOR lanes are rolled over the
//! input in a single pass. The result is a 16-byte value that is cheap to
//! compute and good enough to tell distinct payloads apart. It is NOT a
//! cryptographic hash and makes no claim of collision resistance against a
//! crafted input.
//!
//! # Example
//!
//! ```rust
//! use nfc_compare::core::digest::{digest, DigestEngine};
//!
//! let one_shot = digest(b"hello card");
//!
//! let mut engine = DigestEngine::new();
//! engine.update(b"hello ");
//! engine.update(b"card");
//! assert_eq!(engine.finalize(), one_shot);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Size of a digest in bytes
pub const DIGEST_LEN: usize = 16;

const SEED_0: u32 = 0x1234_5678;
const SEED_1: u32 = 0x9abc_def0;
const SEED_2: u32 = 0x0fed_cba9;
const SEED_3: u32 = 0x8765_4321;

const MUL_0: u32 = 2_654_435_761;
const MUL_1: u32 = 2_246_822_519;
const MUL_2: u32 = 3_266_489_917;
const MUL_3: u32 = 668_265_263;

/// Fixed 16-byte fingerprint of a byte sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NdefDigest([u8; DIGEST_LEN]);

impl NdefDigest {
    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Uppercase hex, 32 characters
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    /// Parse a 32-character hex string (either case)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex_to_bytes(hex)?;
        let array: [u8; DIGEST_LEN] = bytes.try_into().ok()?;
        Some(Self(array))
    }
}

impl fmt::Display for NdefDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for NdefDigest {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for NdefDigest {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NdefDigest::from_hex(&s).ok_or_else(|| serde::de::Error::custom("Invalid digest"))
    }
}

/// Streaming digest state
///
/// Holds only the four lanes, so memory use does not depend on input size.
/// Feeding the same bytes in any chunking yields the same digest.
#[derive(Debug, Clone)]
pub struct DigestEngine {
    lanes: [u32; 4],
}

impl DigestEngine {
    /// Create an engine with the fixed seeds
    pub fn new() -> Self {
        Self {
            lanes: [SEED_0, SEED_1, SEED_2, SEED_3],
        }
    }

    /// Mix more bytes into the state
    pub fn update(&mut self, data: &[u8]) {
        let [mut h0, mut h1, mut h2, mut h3] = self.lanes;
        for &byte in data {
            let b = u32::from(byte);
            h0 = (h0 ^ b).wrapping_mul(MUL_0);
            h1 = h1.wrapping_add(b).wrapping_mul(MUL_1);
            h2 = (h2 ^ (b << 1)).wrapping_mul(MUL_2);
            h3 = h3.wrapping_add(b << 2).wrapping_mul(MUL_3);
        }
        self.lanes = [h0, h1, h2, h3];
    }

    /// Emit the digest: lanes in order, each little-endian
    pub fn finalize(self) -> NdefDigest {
        let mut out = [0u8; DIGEST_LEN];
        for (chunk, lane) in out.chunks_exact_mut(4).zip(self.lanes) {
            chunk.copy_from_slice(&lane.to_le_bytes());
        }
        NdefDigest(out)
    }
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the digest of in-memory data
pub fn digest(data: &[u8]) -> NdefDigest {
    let mut engine = DigestEngine::new();
    engine.update(data);
    engine.finalize()
}

/// Convert bytes to an uppercase hexadecimal string
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Parse a hexadecimal string into bytes
///
/// Accepts either case. Whitespace, `:` and `-` separators are skipped, so
/// `"04 A1 B2"` and `"04:a1:b2"` both parse. Returns `None` on an odd digit
/// count or a non-hex character.
pub fn hex_to_bytes(hex: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = hex
        .bytes()
        .filter(|c| !c.is_ascii_whitespace() && *c != b':' && *c != b'-')
        .collect();

    if digits.len() % 2 != 0 {
        return None;
    }

    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}
