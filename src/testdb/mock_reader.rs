//! Mock card reader for testing without radio hardware
//!
//! [`MockCardReader`] implements [`CardReader`] and can simulate a card in
//! the field, an empty field, slow cards that miss the timeout, a card that
//! is pulled away after a number of polls, and random read failures.

use crate::core::error::{NfcError, Result};
use crate::reader::{CardReader, ReaderInfo, ReaderKind, ScanResult};
use std::time::Duration;

/// Configuration for mock reader behavior
#[derive(Debug, Clone, Default)]
pub struct MockReaderConfig {
    /// Simulated time the card takes to answer, in milliseconds
    pub response_delay_ms: u64,
    /// The card leaves the field after N successful polls
    pub remove_after_polls: Option<usize>,
    /// Simulate random read failures (percentage 0-100)
    pub random_failure_rate: u8,
}

impl MockReaderConfig {
    /// Card that answers after `ms` milliseconds
    pub fn slow(ms: u64) -> Self {
        Self {
            response_delay_ms: ms,
            ..Default::default()
        }
    }

    /// Card that is removed after `polls` successful reads
    pub fn removed_after(polls: usize) -> Self {
        Self {
            remove_after_polls: Some(polls),
            ..Default::default()
        }
    }

    /// Reader with random failures
    pub fn flaky(failure_rate: u8) -> Self {
        Self {
            random_failure_rate: failure_rate.min(100),
            ..Default::default()
        }
    }
}

/// Simulated reader
#[derive(Debug, Clone)]
pub struct MockCardReader {
    info: ReaderInfo,
    card: Option<ScanResult>,
    config: MockReaderConfig,
    poll_count: usize,
}

impl MockCardReader {
    /// Reader with a card permanently in the field
    pub fn with_card(card: ScanResult) -> Self {
        Self::with_config(Some(card), MockReaderConfig::default())
    }

    /// Reader with an empty field
    pub fn no_card() -> Self {
        Self::with_config(None, MockReaderConfig::default())
    }

    pub fn with_config(card: Option<ScanResult>, config: MockReaderConfig) -> Self {
        Self {
            info: ReaderInfo::new("mock-reader-001", "Mock NFC reader", ReaderKind::Mock),
            card,
            config,
            poll_count: 0,
        }
    }

    /// Place a different card (or none) in the field
    pub fn set_card(&mut self, card: Option<ScanResult>) {
        self.card = card;
        self.poll_count = 0;
    }

    /// Number of polls so far
    pub fn poll_count(&self) -> usize {
        self.poll_count
    }
}

impl CardReader for MockCardReader {
    fn info(&self) -> ReaderInfo {
        self.info.clone()
    }

    fn poll(&mut self, timeout: Duration) -> Result<ScanResult> {
        self.poll_count += 1;

        let card = self
            .card
            .clone()
            .ok_or_else(|| NfcError::ScanFailed("no card present".to_string()))?;

        if let Some(limit) = self.config.remove_after_polls {
            if self.poll_count > limit {
                return Err(NfcError::ScanFailed("card left the field".to_string()));
            }
        }

        let delay = Duration::from_millis(self.config.response_delay_ms);
        if delay > timeout {
            std::thread::sleep(timeout);
            return Err(NfcError::ScanFailed(format!(
                "timed out after {} ms",
                timeout.as_millis()
            )));
        }
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        if self.config.random_failure_rate > 0 {
            let roll = rand::random::<u8>() % 100;
            if roll < self.config.random_failure_rate {
                return Err(NfcError::ScanFailed("Random simulated failure".to_string()));
            }
        }

        Ok(card)
    }
}
