//! Word record encoding and decoding.
//!
//! ## Format
//!
//! ```text
//! WordRecord {
//!     init: [10, 10, 10]
//!     token_len: u32 (big-endian)
//!     token: [u8; token_len] (UTF-8)
//!     frequency: u32 (big-endian)
//!     term: [1, 1, 1]
//! }
//! ```
//!
//! A tree blob is a plain concatenation of records. Boundaries are found
//! from the INIT sentinel and the length field and then confirmed against
//! TERM, so token or frequency bytes that happen to equal a sentinel never
//! split a record.

use crate::error::{CodecError, CodecResult};
use crate::sentinel::{read_u32, window, RECORD_INIT, RECORD_OVERHEAD, RECORD_TERM};
use std::ops::Range;

/// A decoded word record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    /// The token.
    pub token: String,
    /// How often the token occurred.
    pub frequency: u32,
}

impl WordRecord {
    /// Creates a new record.
    pub fn new(token: impl Into<String>, frequency: u32) -> Self {
        Self {
            token: token.into(),
            frequency,
        }
    }

    /// Appends the encoded record to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> CodecResult<()> {
        encode_record(&self.token, self.frequency, buf)
    }
}

/// Returns the encoded size of a record holding `token`.
#[must_use]
pub fn encoded_len(token: &str) -> usize {
    RECORD_OVERHEAD + token.len()
}

/// Appends one encoded record to `buf`.
///
/// # Errors
///
/// Returns [`CodecError::FieldTooLarge`] if the token is longer than
/// `u32::MAX` bytes.
pub fn encode_record(token: &str, frequency: u32, buf: &mut Vec<u8>) -> CodecResult<()> {
    let token_bytes = token.as_bytes();
    let len = u32::try_from(token_bytes.len()).map_err(|_| CodecError::FieldTooLarge {
        field: "token",
        len: token_bytes.len(),
        max: u32::MAX as usize,
    })?;

    buf.reserve(encoded_len(token));
    buf.extend_from_slice(&RECORD_INIT);
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(token_bytes);
    buf.extend_from_slice(&frequency.to_be_bytes());
    buf.extend_from_slice(&RECORD_TERM);
    Ok(())
}

/// Validates the framing of the record starting at `pos` and returns its
/// total length.
fn frame_at(data: &[u8], pos: usize) -> CodecResult<usize> {
    let init = window(data, pos, RECORD_INIT.len());
    if init != RECORD_INIT {
        let reason = if init.len() < RECORD_INIT.len() {
            "truncated record INIT"
        } else {
            "record INIT mismatch"
        };
        return Err(CodecError::malformed_record(pos, &RECORD_INIT[..], init, reason));
    }

    let len_pos = pos + RECORD_INIT.len();
    let token_len = read_u32(data, len_pos).ok_or_else(|| {
        CodecError::malformed_record(
            len_pos,
            &[0u8; 4][..],
            window(data, len_pos, 4),
            "truncated token length",
        )
    })? as usize;

    let total = token_len
        .checked_add(RECORD_OVERHEAD)
        .filter(|total| pos.checked_add(*total).is_some_and(|end| end <= data.len()))
        .ok_or_else(|| {
            CodecError::malformed_record(
                len_pos,
                &RECORD_TERM[..],
                &[] as &[u8],
                "token length runs past end of input",
            )
        })?;

    let term_pos = pos + total - RECORD_TERM.len();
    let term = &data[term_pos..pos + total];
    if term != RECORD_TERM {
        return Err(CodecError::malformed_record(
            term_pos,
            &RECORD_TERM[..],
            term,
            "record TERM mismatch",
        ));
    }

    Ok(total)
}

/// Decodes the record at the start of `data`.
///
/// Returns the record and the number of bytes it occupied. Offsets in
/// errors are relative to the start of `data`.
///
/// # Errors
///
/// - [`CodecError::MalformedRecord`] if INIT or TERM do not match or the
///   input is truncated.
/// - [`CodecError::InvalidUtf8`] if the token bytes are not UTF-8.
pub fn decode_record(data: &[u8]) -> CodecResult<(WordRecord, usize)> {
    let total = frame_at(data, 0)?;

    let token_start = RECORD_INIT.len() + 4;
    let token_end = total - RECORD_TERM.len() - 4;
    let token = std::str::from_utf8(&data[token_start..token_end])
        .map_err(|_| CodecError::InvalidUtf8 {
            field: "token",
            offset: token_start,
        })?
        .to_owned();

    let frequency = read_u32(data, token_end).ok_or_else(|| {
        CodecError::malformed_record(token_end, &[0u8; 4][..], window(data, token_end, 4), "truncated frequency")
    })?;

    Ok((WordRecord { token, frequency }, total))
}

/// Decodes the record occupying `range` inside `blob`.
///
/// Error offsets are reported relative to the start of `blob`.
pub fn decode_frame(blob: &[u8], range: Range<usize>) -> CodecResult<WordRecord> {
    let start = range.start;
    let slice = blob.get(range).ok_or_else(|| {
        CodecError::malformed_record(start, &RECORD_INIT[..], &[] as &[u8], "frame outside blob")
    })?;
    decode_record(slice)
        .map(|(record, _)| record)
        .map_err(|e| e.offset_by(start))
}

/// Iterator over the byte ranges of the records in a tree blob.
///
/// Stops after the first framing error, which it yields.
#[derive(Debug, Clone)]
pub struct RecordFrames<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> RecordFrames<'a> {
    /// Creates an iterator over the records in `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            failed: false,
        }
    }

    /// Collects all frame ranges, failing on the first framing error.
    pub fn collect_ranges(self) -> CodecResult<Vec<Range<usize>>> {
        self.collect()
    }
}

impl Iterator for RecordFrames<'_> {
    type Item = CodecResult<Range<usize>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        match frame_at(self.data, self.pos) {
            Ok(total) => {
                let range = self.pos..self.pos + total;
                self.pos += total;
                Some(Ok(range))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Decodes every record in a tree blob, sequentially.
pub fn decode_all(blob: &[u8]) -> CodecResult<Vec<WordRecord>> {
    RecordFrames::new(blob)
        .map(|range| decode_frame(blob, range?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(token: &str, frequency: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_record(token, frequency, &mut buf).unwrap();
        buf
    }

    #[test]
    fn layout_matches_format() {
        let buf = encoded("Test", 41);
        let mut expected = vec![10, 10, 10, 0, 0, 0, 4];
        expected.extend_from_slice(b"Test");
        expected.extend_from_slice(&[0, 0, 0, 41, 1, 1, 1]);
        assert_eq!(buf, expected);
        assert_eq!(buf.len(), encoded_len("Test"));
    }

    #[test]
    fn decode_reads_back() {
        let buf = encoded("fox", 7);
        let (record, used) = decode_record(&buf).unwrap();
        assert_eq!(record, WordRecord::new("fox", 7));
        assert_eq!(used, buf.len());
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let mut buf = encoded("a", 1);
        let len = buf.len();
        buf.extend_from_slice(&[9, 9, 9]);
        let (_, used) = decode_record(&buf).unwrap();
        assert_eq!(used, len);
    }

    #[test]
    fn flipped_init_is_malformed() {
        let mut buf = encoded("dog", 1);
        buf[1] ^= 0xff;
        let err = decode_record(&buf).unwrap_err();
        assert!(matches!(err, CodecError::MalformedRecord { offset: 0, .. }));
    }

    #[test]
    fn flipped_term_is_malformed() {
        let mut buf = encoded("dog", 1);
        let last = buf.len() - 1;
        buf[last] = 0;
        let err = decode_record(&buf).unwrap_err();
        match err {
            CodecError::MalformedRecord { offset, reason, .. } => {
                assert_eq!(offset, buf.len() - 3);
                assert_eq!(reason, "record TERM mismatch");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncated_record_is_malformed() {
        let buf = encoded("truncated", 3);
        for cut in 0..buf.len() {
            let res = decode_record(&buf[..cut]);
            assert!(
                matches!(res, Err(CodecError::MalformedRecord { .. })),
                "cut at {cut} decoded as {res:?}"
            );
        }
    }

    #[test]
    fn oversized_length_is_malformed() {
        let mut buf = encoded("ab", 1);
        buf[3..7].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            decode_record(&buf),
            Err(CodecError::MalformedRecord { offset: 3, .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let mut buf = encoded("ab", 1);
        buf[7] = 0xff;
        assert!(matches!(
            decode_record(&buf),
            Err(CodecError::InvalidUtf8 { offset: 7, .. })
        ));
    }

    #[test]
    fn frames_survive_sentinel_bytes_in_payload() {
        // Frequency 0x00010101 ends in the TERM byte pattern; token holds INIT bytes.
        let mut blob = encoded("\n\n\n", 0x0001_0101);
        blob.extend(encoded("zebra", 2));

        let records = decode_all(&blob).unwrap();
        assert_eq!(
            records,
            vec![WordRecord::new("\n\n\n", 0x0001_0101), WordRecord::new("zebra", 2)]
        );
    }

    #[test]
    fn frame_error_offset_is_blob_relative() {
        let mut blob = encoded("one", 1);
        let second = blob.len();
        blob.extend(encoded("two", 2));
        blob[second + 2] = 0;

        let err = decode_all(&blob).unwrap_err();
        assert!(matches!(err, CodecError::MalformedRecord { offset, .. } if offset == second));
    }

    #[test]
    fn empty_blob_has_no_frames() {
        assert!(RecordFrames::new(&[]).next().is_none());
        assert!(decode_all(&[]).unwrap().is_empty());
    }

    #[test]
    fn frames_stop_after_error() {
        let mut frames = RecordFrames::new(&[0, 0, 0, 0]);
        assert!(matches!(frames.next(), Some(Err(_))));
        assert!(frames.next().is_none());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_record_decodes_to_itself(token in "\\PC{0,40}", frequency in any::<u32>()) {
                let buf = encoded(&token, frequency);
                let (record, used) = decode_record(&buf).unwrap();
                prop_assert_eq!(record, WordRecord::new(token, frequency));
                prop_assert_eq!(used, buf.len());
            }

            #[test]
            fn garbage_never_panics(data in proptest::collection::vec(any::<u8>(), 0..64)) {
                let _ = decode_all(&data);
            }
        }
    }
}
