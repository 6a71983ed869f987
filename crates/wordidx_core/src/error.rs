//! Error types for wordidx core.

use thiserror::Error;
use wordidx_codec::CodecError;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in wordidx core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The key is empty.
    ///
    /// Caller bug; never retried.
    #[error("invalid key: tokens must not be empty")]
    InvalidKey,

    /// Record or container codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Container store error.
    #[error("storage error: {0}")]
    Storage(#[from] wordidx_storage::StorageError),

    /// A document's tree could not be rebuilt from its section.
    #[error("document {url}: {source}")]
    Document {
        /// The document url.
        url: String,
        /// The record-level failure.
        #[source]
        source: CodecError,
    },

    /// A tree invariant does not hold.
    ///
    /// Never expected in a correct build; always surfaced, never retried.
    #[error("structural invariant violated: {message}")]
    StructuralInvariant {
        /// Which invariant failed, and where.
        message: String,
    },

    /// A bulk operation ran past its deadline.
    #[error("deadline exceeded after {completed} of {total} items")]
    DeadlineExceeded {
        /// Items finished before the deadline.
        completed: usize,
        /// Items submitted.
        total: usize,
    },

    /// Configuration values are out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// The worker pool could not be started.
    #[error("thread pool error: {message}")]
    ThreadPool {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates a structural invariant error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralInvariant {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a document reconstruction error.
    pub fn document(url: impl Into<String>, source: CodecError) -> Self {
        Self::Document {
            url: url.into(),
            source,
        }
    }

    /// Returns true if this error came from a damaged record rather than
    /// damaged container framing.
    #[must_use]
    pub fn is_record_level(&self) -> bool {
        match self {
            Self::Document { .. } => true,
            Self::Codec(e) => e.is_record_level(),
            _ => false,
        }
    }
}
