//! Index and persistence configuration.

use crate::error::{CoreError, CoreResult};
use std::time::{Duration, Instant};

/// Default fan-out bound of a tree node.
pub const DEFAULT_FAN_OUT: usize = 4;

/// Smallest fan-out that still leaves two slots per half after a split.
pub const MIN_FAN_OUT: usize = 4;

/// What the collection loader does when one document's records are damaged.
///
/// Container-level damage always aborts the load regardless of this policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordErrorPolicy {
    /// Fail the whole load.
    #[default]
    Abort,
    /// Leave the document out, log it, and list it in the load report.
    SkipDocument,
}

/// Configuration for trees, traversal, loading and ingestion.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum children or entries per node.
    pub fan_out: usize,

    /// Worker threads for traversal, reconstruction, collection loading and
    /// ingestion.
    ///
    /// `None` uses rayon's default (one per logical CPU).
    pub worker_threads: Option<usize>,

    /// Policy for damaged records while loading a collection.
    pub record_errors: RecordErrorPolicy,

    /// Overall budget for one bulk operation (ingest or load).
    pub deadline: Option<Duration>,

    /// Tokens fed to a tree per lock acquisition during ingestion.
    pub ingest_chunk: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fan_out: DEFAULT_FAN_OUT,
            worker_threads: None,
            record_errors: RecordErrorPolicy::Abort,
            deadline: None,
            ingest_chunk: 256,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node fan-out bound.
    #[must_use]
    pub const fn fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Sets the number of worker threads.
    #[must_use]
    pub const fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Sets the damaged-record policy.
    #[must_use]
    pub const fn record_errors(mut self, policy: RecordErrorPolicy) -> Self {
        self.record_errors = policy;
        self
    }

    /// Sets the bulk operation deadline.
    #[must_use]
    pub const fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the ingestion chunk size.
    #[must_use]
    pub const fn ingest_chunk(mut self, tokens: usize) -> Self {
        self.ingest_chunk = tokens;
        self
    }

    /// Checks that all values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> CoreResult<()> {
        if self.fan_out < MIN_FAN_OUT {
            return Err(CoreError::invalid_config(format!(
                "fan_out must be at least {MIN_FAN_OUT}, got {}",
                self.fan_out
            )));
        }
        if self.worker_threads == Some(0) {
            return Err(CoreError::invalid_config("worker_threads must be non-zero"));
        }
        if self.ingest_chunk == 0 {
            return Err(CoreError::invalid_config("ingest_chunk must be non-zero"));
        }
        Ok(())
    }

    /// Returns the instant at which a bulk operation started now must stop.
    #[must_use]
    pub fn deadline_from(&self, start: Instant) -> Option<Instant> {
        self.deadline.and_then(|d| start.checked_add(d))
    }
}
