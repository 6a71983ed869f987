//! # wordidx Testkit
//!
//! Test utilities for wordidx.
//!
//! This crate provides:
//! - Fixtures for indexes, collections and temporary file stores
//! - Property-based test generators using proptest
//! - Concurrent stress harnesses
//! - Fixed byte vectors for the record and container formats
//!
//! ## Usage
//!
//! ```rust
//! use wordidx_testkit::prelude::*;
//!
//! let index = index_from_tokens(&["the", "fox", "the"]);
//! assert_eq!(entries(&index), vec![("fox".to_string(), 1), ("the".to_string(), 2)]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
pub use vectors::*;
