//! Capture-file reader
//!
//! A capture is a JSON record of a card read taken elsewhere (a phone app, a
//! bench reader, an earlier session). Replaying it through [`CaptureReader`]
//! lets the scan pipeline run without radio hardware.
//!
//! ```json
//! {
//!   "uid": "04 A1 B2 C3",
//!   "atqa": "4400",
//!   "sak": "08",
//!   "ndef": "D1010B5504..."
//! }
//! ```
//!
//! Only `uid` is required. Hex is case-insensitive; spaces, `:` and `-` are
//! ignored.

use super::traits::{CardReader, ReaderInfo, ReaderKind, ScanResult};
use crate::core::digest::{bytes_to_hex, hex_to_bytes};
use crate::core::error::{NfcError, Result};
use chrono::{DateTime, Utc};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// On-disk form of a recorded scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanCapture {
    /// UID as hex
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atqa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sak: Option<String>,
    /// NDEF message as hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndef: Option<String>,
    /// When the read was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl ScanCapture {
    /// Record a scan result, stamped with the current time
    pub fn from_scan(scan: &ScanResult) -> Self {
        Self {
            uid: bytes_to_hex(&scan.uid),
            atqa: scan.atqa.map(|a| bytes_to_hex(&a)),
            sak: scan.sak.map(|s| format!("{:02X}", s)),
            ndef: scan.ndef.as_deref().map(bytes_to_hex),
            captured_at: Some(Utc::now()),
        }
    }

    /// Decode the hex fields into a scan result
    pub fn to_scan_result(&self) -> Result<ScanResult> {
        let uid = decode_field("uid", &self.uid)?;

        let atqa = match &self.atqa {
            Some(hex) => {
                let bytes = decode_field("atqa", hex)?;
                let pair: [u8; 2] = bytes.try_into().map_err(|b: Vec<u8>| {
                    NfcError::ScanFailed(format!("atqa must be 2 bytes, got {}", b.len()))
                })?;
                Some(pair)
            }
            None => None,
        };

        let sak = match &self.sak {
            Some(hex) => {
                let bytes = decode_field("sak", hex)?;
                match bytes.as_slice() {
                    [sak] => Some(*sak),
                    _ => {
                        return Err(NfcError::ScanFailed(format!(
                            "sak must be 1 byte, got {}",
                            bytes.len()
                        )))
                    }
                }
            }
            None => None,
        };

        let ndef = match &self.ndef {
            Some(hex) => Some(decode_field("ndef", hex)?),
            None => None,
        };

        Ok(ScanResult {
            uid,
            atqa,
            sak,
            ndef,
        })
    }

    /// Parse a capture from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| NfcError::ScanFailed(format!("invalid capture: {}", e)))
    }

    /// Write the capture as pretty JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}

fn decode_field(name: &str, hex: &str) -> Result<Vec<u8>> {
    hex_to_bytes(hex).ok_or_else(|| NfcError::ScanFailed(format!("{} is not valid hex: {:?}", name, hex)))
}

/// Reader that replays a capture file on every poll
#[derive(Debug, Clone)]
pub struct CaptureReader {
    path: PathBuf,
}

impl CaptureReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CardReader for CaptureReader {
    fn info(&self) -> ReaderInfo {
        ReaderInfo::new(
            &self.path.display().to_string(),
            "Capture replay",
            ReaderKind::Capture,
        )
    }

    fn poll(&mut self, timeout: Duration) -> Result<ScanResult> {
        trace!(
            "Replaying capture {} (timeout {:?} not applicable)",
            self.path.display(),
            timeout
        );

        let json = fs::read_to_string(&self.path).map_err(|e| {
            NfcError::ScanFailed(format!(
                "no card present (capture {}: {})",
                self.path.display(),
                e
            ))
        })?;

        let capture = ScanCapture::from_json(&json)?;
        let scan = capture.to_scan_result()?;
        debug!(
            "Capture {} holds a {}-byte UID",
            self.path.display(),
            scan.uid.len()
        );
        Ok(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_capture_full() {
        let capture = ScanCapture::from_json(
            r#"{"uid": "04 a1:B2 c3", "atqa": "4400", "sak": "08", "ndef": "D10100"}"#,
        )
        .unwrap();
        let scan = capture.to_scan_result().unwrap();
        assert_eq!(scan.uid, vec![0x04, 0xA1, 0xB2, 0xC3]);
        assert_eq!(scan.atqa, Some([0x44, 0x00]));
        assert_eq!(scan.sak, Some(0x08));
        assert_eq!(scan.ndef, Some(vec![0xD1, 0x01, 0x00]));
    }

    #[test]
    fn test_capture_uid_only() {
        let scan = ScanCapture::from_json(r#"{"uid": "0102"}"#)
            .unwrap()
            .to_scan_result()
            .unwrap();
        assert_eq!(scan, ScanResult::with_uid(&[0x01, 0x02]));
    }

    #[test]
    fn test_capture_bad_fields() {
        let bad_atqa = ScanCapture::from_json(r#"{"uid": "01", "atqa": "44"}"#).unwrap();
        assert_eq!(bad_atqa.to_scan_result().unwrap_err().kind(), "ScanFailed");

        let bad_sak = ScanCapture::from_json(r#"{"uid": "01", "sak": "0808"}"#).unwrap();
        assert!(bad_sak.to_scan_result().is_err());

        let bad_hex = ScanCapture::from_json(r#"{"uid": "XYZ"}"#).unwrap();
        assert!(bad_hex.to_scan_result().is_err());

        assert!(ScanCapture::from_json("not json").is_err());
        assert!(ScanCapture::from_json("{}").is_err());
    }

    #[test]
    fn test_reader_replays_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.json");
        let scan = ScanResult::with_uid(&[0x04, 0x22]).atqa_sak([0x44, 0x00], 0x00);
        ScanCapture::from_scan(&scan).save(&path).unwrap();

        let mut reader = CaptureReader::new(&path);
        assert_eq!(reader.info().kind, ReaderKind::Capture);
        assert_eq!(reader.poll(Duration::from_millis(10)).unwrap(), scan);
        // Replays the same read every time
        assert_eq!(reader.poll(Duration::from_millis(10)).unwrap(), scan);
    }

    #[test]
    fn test_reader_missing_file_is_scan_failure() {
        let dir = TempDir::new().unwrap();
        let mut reader = CaptureReader::new(dir.path().join("absent.json"));
        let err = reader.poll(Duration::from_millis(10)).unwrap_err();
        assert_eq!(err.kind(), "ScanFailed");
        assert!(err.to_string().contains("no card present"));
    }
}
