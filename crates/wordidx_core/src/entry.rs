//! Leaf payload: a token and how often it occurred.

use crate::error::{CoreError, CoreResult};
use wordidx_codec::{CodecResult, WordRecord};

/// A token paired with its occurrence count.
///
/// The token never changes once the entry exists; the frequency is bumped
/// in place by [`Index::add`](crate::Index::add).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WordEntry {
    token: String,
    frequency: u32,
}

impl WordEntry {
    /// Creates an entry seen once.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_frequency(token, 1)
    }

    /// Creates an entry with a known count.
    pub fn with_frequency(token: impl Into<String>, frequency: u32) -> Self {
        Self {
            token: token.into(),
            frequency,
        }
    }

    /// Returns the token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the occurrence count.
    #[must_use]
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Counts one more occurrence. Saturates at `u32::MAX`.
    pub(crate) fn increment(&mut self) {
        self.frequency = self.frequency.saturating_add(1);
    }

    /// Appends this entry's encoded record to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> CodecResult<()> {
        wordidx_codec::encode_record(&self.token, self.frequency, buf)
    }

    /// Returns `(token, frequency)`.
    #[must_use]
    pub fn into_parts(self) -> (String, u32) {
        (self.token, self.frequency)
    }
}

impl From<WordRecord> for WordEntry {
    fn from(record: WordRecord) -> Self {
        Self::with_frequency(record.token, record.frequency)
    }
}

impl From<WordEntry> for WordRecord {
    fn from(entry: WordEntry) -> Self {
        WordRecord::new(entry.token, entry.frequency)
    }
}

/// Rejects keys the tree cannot hold.
pub(crate) fn check_key(token: &str) -> CoreResult<()> {
    if token.is_empty() {
        return Err(CoreError::InvalidKey);
    }
    Ok(())
}
