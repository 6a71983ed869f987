//! Fixed byte vectors for the record and container formats.
//!
//! Any reader or writer of the format, in any language, must agree with
//! these. [`vectors_json`] exports them for tooling outside this workspace.

use serde::{Deserialize, Serialize};

/// A named input and its expected encoding or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Logical input, as `token:frequency` pairs or `url=token:frequency` sections.
    pub input: Vec<String>,
    /// Encoded bytes (hex).
    pub expected_hex: String,
    /// Expected error kind when `expected_hex` is fed to the decoder.
    pub expected_error: Option<String>,
}

impl TestVector {
    fn ok(id: &str, description: &str, input: &[&str], hex: &str) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input: input.iter().map(|s| (*s).to_owned()).collect(),
            expected_hex: hex.into(),
            expected_error: None,
        }
    }

    fn err(id: &str, description: &str, hex: &str, error: &str) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input: Vec::new(),
            expected_hex: hex.into(),
            expected_error: Some(error.into()),
        }
    }

    /// Decodes `expected_hex`.
    pub fn bytes(&self) -> Vec<u8> {
        hex_decode(&self.expected_hex).expect("Vector hex must be valid")
    }
}

/// Word record vectors.
pub fn record_vectors() -> Vec<TestVector> {
    vec![
        TestVector::ok(
            "record_test_41",
            "Token with a capital letter and a small count",
            &["Test:41"],
            "0a0a0a000000045465737400000029010101",
        ),
        TestVector::ok(
            "record_single_letter",
            "Shortest valid token",
            &["a:1"],
            "0a0a0a000000016100000001010101",
        ),
        TestVector::ok(
            "record_sentinel_frequency",
            "Frequency whose bytes look like both sentinels",
            &["x:168427777"],
            "0a0a0a00000001780a0a0101010101",
        ),
        TestVector::ok(
            "record_two_in_order",
            "Tree blob holding two records",
            &["cat:2", "dog:1"],
            "0a0a0a0000000363617400000002010101\
             0a0a0a00000003646f6700000001010101",
        ),
    ]
}

/// Container vectors.
pub fn container_vectors() -> Vec<TestVector> {
    vec![
        TestVector::ok(
            "container_empty",
            "No documents: FILE_INIT then FILE_TERM",
            &[],
            "0102030405060707060504030201",
        ),
        TestVector::ok(
            "container_one_document",
            "a.com holding cat twice",
            &["a.com=cat:2"],
            "01020304050607\
             0005612e636f6d\
             00000011\
             0a0a0a0000000363617400000002010101\
             fe00fe\
             07060504030201",
        ),
        TestVector::ok(
            "container_empty_tree",
            "Document with no words",
            &["e.com="],
            "01020304050607\
             0005652e636f6d\
             00000000\
             fe00fe\
             07060504030201",
        ),
    ]
}

/// Inputs every decoder must reject.
pub fn malformed_vectors() -> Vec<TestVector> {
    vec![
        TestVector::err(
            "record_bad_init",
            "First INIT byte flipped",
            "0b0a0a000000016100000001010101",
            "MalformedRecord",
        ),
        TestVector::err(
            "record_bad_term",
            "Last TERM byte flipped",
            "0a0a0a000000016100000001010102",
            "MalformedRecord",
        ),
        TestVector::err(
            "record_truncated",
            "Record cut inside the frequency",
            "0a0a0a00000001610000",
            "MalformedRecord",
        ),
        TestVector::err(
            "record_invalid_utf8",
            "Token bytes are not UTF-8",
            "0a0a0a00000001ff00000001010101",
            "InvalidUtf8",
        ),
        TestVector::err(
            "container_bad_init",
            "FILE_INIT damaged",
            "0102030405060807060504030201",
            "CorruptContainer",
        ),
        TestVector::err(
            "container_missing_term",
            "FILE_TERM missing",
            "01020304050607",
            "CorruptContainer",
        ),
        TestVector::err(
            "container_trailing_bytes",
            "Bytes after FILE_TERM",
            "010203040506070706050403020100",
            "CorruptContainer",
        ),
        TestVector::err(
            "container_bad_separator",
            "TREE_SEPARATOR damaged",
            "01020304050607\
             0005652e636f6d\
             00000000\
             fe01fe\
             07060504030201",
            "CorruptContainer",
        ),
    ]
}

/// Every vector as pretty-printed JSON.
pub fn vectors_json() -> String {
    let all: Vec<TestVector> = record_vectors()
        .into_iter()
        .chain(container_vectors())
        .chain(malformed_vectors())
        .collect();
    serde_json::to_string_pretty(&all).expect("Vectors always serialize")
}

/// Lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Parses hex, ignoring whitespace.
pub fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(s, 16).ok()
        })
        .collect()
}
