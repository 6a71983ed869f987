//! # wordidx Codec
//!
//! Binary framing for persisted word-frequency trees.
//!
//! This crate knows nothing about trees. It provides:
//! - The word record format (token + frequency between two sentinels)
//! - Record framing over a tree blob
//! - The multi-tree container format (url + tree blob per document)
//!
//! All integers are big-endian. Every decode path is a pure function over
//! a byte slice, and every sentinel mismatch or truncation is an error that
//! carries the byte offset plus expected and found bytes.
//!
//! ## Usage
//!
//! ```
//! use wordidx_codec::{decode_all, encode_record, ContainerWriter, read_sections};
//!
//! let mut tree = Vec::new();
//! encode_record("cat", 2, &mut tree).unwrap();
//!
//! let mut writer = ContainerWriter::new();
//! writer.push_section("a.com", &tree).unwrap();
//! let bytes = writer.finish();
//!
//! let sections = read_sections(&bytes).unwrap();
//! assert_eq!(sections[0].url, "a.com");
//! let records = decode_all(sections[0].tree).unwrap();
//! assert_eq!(records[0].token, "cat");
//! assert_eq!(records[0].frequency, 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod container;
mod error;
mod record;
pub mod sentinel;

pub use container::{read_sections, ContainerReader, ContainerWriter, Section};
pub use error::{CodecError, CodecResult, Found};
pub use record::{
    decode_all, decode_frame, decode_record, encode_record, encoded_len, RecordFrames, WordRecord,
};
