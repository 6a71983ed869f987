//! Multi-tree container framing.
//!
//! ## Format
//!
//! ```text
//! Container {
//!     file_init: [1, 2, 3, 4, 5, 6, 7]
//!     sections: [Section]
//!     file_term: [7, 6, 5, 4, 3, 2, 1]
//! }
//!
//! Section {
//!     url_len: u16 (big-endian)
//!     url: [u8; url_len] (UTF-8)
//!     tree_len: u32 (big-endian)
//!     tree: [u8; tree_len]      // concatenated word records
//!     separator: [0xFE, 0x00, 0xFE]
//! }
//! ```
//!
//! ## Invariants
//!
//! - FILE_INIT and FILE_TERM are always present, even with zero sections
//! - Any sentinel mismatch or truncation is a [`CodecError::CorruptContainer`]
//! - Nothing may follow FILE_TERM

use crate::error::{CodecError, CodecResult};
use crate::sentinel::{read_u16, read_u32, window, FILE_INIT, FILE_TERM, TREE_SEPARATOR};

/// Builds a container in memory.
///
/// FILE_INIT is written on construction and FILE_TERM by [`finish`](Self::finish).
#[derive(Debug)]
pub struct ContainerWriter {
    buf: Vec<u8>,
    sections: usize,
}

impl Default for ContainerWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerWriter {
    /// Starts a new container.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(FILE_INIT.len() + FILE_TERM.len())
    }

    /// Starts a new container with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buf = Vec::with_capacity(capacity);
        buf.extend_from_slice(&FILE_INIT);
        Self { buf, sections: 0 }
    }

    /// Appends one document's section.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FieldTooLarge`] if the url exceeds `u16::MAX`
    /// bytes or the tree exceeds `u32::MAX` bytes, and
    /// [`CodecError::SentinelCollision`] if the url's length prefix and first
    /// bytes spell FILE_TERM. Nothing is written in either case.
    pub fn push_section(&mut self, url: &str, tree: &[u8]) -> CodecResult<()> {
        let url_len = u16::try_from(url.len()).map_err(|_| CodecError::FieldTooLarge {
            field: "document url",
            len: url.len(),
            max: u16::MAX as usize,
        })?;
        if spells_file_term(url_len, url.as_bytes()) {
            return Err(CodecError::SentinelCollision {
                field: "document url",
                len: url.len(),
            });
        }
        let tree_len = u32::try_from(tree.len()).map_err(|_| CodecError::FieldTooLarge {
            field: "tree",
            len: tree.len(),
            max: u32::MAX as usize,
        })?;

        self.buf
            .reserve(2 + url.len() + 4 + tree.len() + TREE_SEPARATOR.len());
        self.buf.extend_from_slice(&url_len.to_be_bytes());
        self.buf.extend_from_slice(url.as_bytes());
        self.buf.extend_from_slice(&tree_len.to_be_bytes());
        self.buf.extend_from_slice(tree);
        self.buf.extend_from_slice(&TREE_SEPARATOR);
        self.sections += 1;
        Ok(())
    }

    /// Returns the number of sections written so far.
    #[must_use]
    pub fn sections(&self) -> usize {
        self.sections
    }

    /// Writes FILE_TERM and returns the container bytes.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.buf.extend_from_slice(&FILE_TERM);
        self.buf
    }
}

// The reader peeks for FILE_TERM before each section.
fn spells_file_term(url_len: u16, url: &[u8]) -> bool {
    url_len.to_be_bytes()[..] == FILE_TERM[..2] && url.starts_with(&FILE_TERM[2..])
}

/// One document's section, borrowed from the container bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// The document url.
    pub url: String,
    /// The document's tree blob.
    pub tree: &'a [u8],
    /// Offset of `tree` inside the container.
    pub tree_offset: usize,
}

/// Reads sections out of a container.
///
/// Yields sections in file order and stops at FILE_TERM. After the first
/// error the reader yields nothing more.
#[derive(Debug, Clone)]
pub struct ContainerReader<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> ContainerReader<'a> {
    /// Checks FILE_INIT and positions the reader at the first section.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::CorruptContainer`] if the data does not start
    /// with FILE_INIT.
    pub fn new(data: &'a [u8]) -> CodecResult<Self> {
        let init = window(data, 0, FILE_INIT.len());
        if init != FILE_INIT {
            return Err(CodecError::corrupt_container(
                0,
                &FILE_INIT[..],
                init,
                "FILE_INIT mismatch",
            ));
        }
        Ok(Self {
            data,
            pos: FILE_INIT.len(),
            done: false,
        })
    }

    /// Returns the current read offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    fn truncated(&self, pos: usize, expected: &[u8], reason: &'static str) -> CodecError {
        CodecError::corrupt_container(pos, expected, window(self.data, pos, expected.len()), reason)
    }

    fn read_section(&mut self) -> CodecResult<Option<Section<'a>>> {
        let data = self.data;
        let start = self.pos;

        if window(data, start, FILE_TERM.len()) == FILE_TERM {
            let end = start + FILE_TERM.len();
            if end != data.len() {
                return Err(CodecError::corrupt_container(
                    end,
                    &[] as &[u8],
                    window(data, end, 8),
                    "trailing bytes after FILE_TERM",
                ));
            }
            self.pos = end;
            return Ok(None);
        }

        let url_len = read_u16(data, start)
            .ok_or_else(|| self.truncated(start, &FILE_TERM, "truncated before FILE_TERM"))?
            as usize;
        let url_start = start + 2;
        let url_bytes = data
            .get(url_start..url_start + url_len)
            .ok_or_else(|| self.truncated(url_start, &[], "truncated document url"))?;
        let url = std::str::from_utf8(url_bytes)
            .map_err(|_| CodecError::InvalidUtf8 {
                field: "document url",
                offset: url_start,
            })?
            .to_owned();

        let len_pos = url_start + url_len;
        let tree_len = read_u32(data, len_pos)
            .ok_or_else(|| self.truncated(len_pos, &[0u8; 4], "truncated tree length"))?
            as usize;
        let tree_offset = len_pos + 4;
        let tree = tree_offset
            .checked_add(tree_len)
            .and_then(|end| data.get(tree_offset..end))
            .ok_or_else(|| {
                CodecError::corrupt_container(
                    len_pos,
                    &TREE_SEPARATOR[..],
                    &[] as &[u8],
                    "tree length runs past end of container",
                )
            })?;

        let sep_pos = tree_offset + tree_len;
        let sep = window(data, sep_pos, TREE_SEPARATOR.len());
        if sep != TREE_SEPARATOR {
            return Err(CodecError::corrupt_container(
                sep_pos,
                &TREE_SEPARATOR[..],
                sep,
                "TREE_SEPARATOR mismatch",
            ));
        }

        self.pos = sep_pos + TREE_SEPARATOR.len();
        Ok(Some(Section {
            url,
            tree,
            tree_offset,
        }))
    }
}

impl<'a> Iterator for ContainerReader<'a> {
    type Item = CodecResult<Section<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_section() {
            Ok(Some(section)) => Some(Ok(section)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Reads every section of a container, failing on the first error.
pub fn read_sections(data: &[u8]) -> CodecResult<Vec<Section<'_>>> {
    ContainerReader::new(data)?.collect()
}
