//! Error types for the codec crate.

use std::fmt;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Bytes found where a sentinel or field was expected.
///
/// Rendered as space-separated hex so that a mismatch between writer and
/// reader versions is readable straight from the error message.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Found(pub Vec<u8>);

impl fmt::Debug for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<eof>");
        }
        f.write_str("[")?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02x}")?;
        }
        f.write_str("]")
    }
}

impl From<&[u8]> for Found {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A single word record is damaged.
    ///
    /// Aborts reconstruction of the tree the record belongs to.
    #[error("malformed record at offset {offset}: {reason} (expected {expected}, found {found})")]
    MalformedRecord {
        /// Byte offset of the problem, relative to the start of the tree blob.
        offset: usize,
        /// What was expected at `offset`.
        expected: Found,
        /// What was actually there.
        found: Found,
        /// Short description of the check that failed.
        reason: &'static str,
    },

    /// The container framing is damaged.
    ///
    /// Aborts the whole collection load.
    #[error(
        "corrupt container at offset {offset}: {reason} (expected {expected}, found {found})"
    )]
    CorruptContainer {
        /// Byte offset of the problem, relative to the start of the container.
        offset: usize,
        /// What was expected at `offset`.
        expected: Found,
        /// What was actually there.
        found: Found,
        /// Short description of the check that failed.
        reason: &'static str,
    },

    /// A string field is not valid UTF-8.
    #[error("invalid UTF-8 in {field} at offset {offset}")]
    InvalidUtf8 {
        /// Which field was being decoded.
        field: &'static str,
        /// Byte offset of the field.
        offset: usize,
    },

    /// A value does not fit in its length-prefixed field.
    #[error("{field} too large: {len} bytes exceeds maximum of {max}")]
    FieldTooLarge {
        /// Which field overflowed.
        field: &'static str,
        /// Actual length.
        len: usize,
        /// Largest encodable length.
        max: usize,
    },

    /// A section's leading bytes would read back as FILE_TERM.
    #[error("{field} of {len} bytes would be read back as FILE_TERM")]
    SentinelCollision {
        /// Which field collides.
        field: &'static str,
        /// Length of the field.
        len: usize,
    },
}

impl CodecError {
    /// Creates a malformed record error.
    pub fn malformed_record(
        offset: usize,
        expected: impl Into<Found>,
        found: impl Into<Found>,
        reason: &'static str,
    ) -> Self {
        Self::MalformedRecord {
            offset,
            expected: expected.into(),
            found: found.into(),
            reason,
        }
    }

    /// Creates a corrupt container error.
    pub fn corrupt_container(
        offset: usize,
        expected: impl Into<Found>,
        found: impl Into<Found>,
        reason: &'static str,
    ) -> Self {
        Self::CorruptContainer {
            offset,
            expected: expected.into(),
            found: found.into(),
            reason,
        }
    }

    /// Returns true if this error concerns a single record only.
    #[must_use]
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            Self::MalformedRecord { .. } | Self::InvalidUtf8 { field: "token", .. }
        )
    }

    /// Shifts the reported offset by `base`.
    ///
    /// Used when a tree blob nested inside a container is decoded on its own.
    #[must_use]
    pub fn offset_by(mut self, base: usize) -> Self {
        match &mut self {
            Self::MalformedRecord { offset, .. }
            | Self::CorruptContainer { offset, .. }
            | Self::InvalidUtf8 { offset, .. } => *offset += base,
            Self::FieldTooLarge { .. } | Self::SentinelCollision { .. } => {}
        }
        self
    }
}
