//! Fixed byte markers bracketing records, trees and containers.

/// Opens every word record.
pub const RECORD_INIT: [u8; 3] = [10, 10, 10];

/// Closes every word record.
pub const RECORD_TERM: [u8; 3] = [1, 1, 1];

/// Opens a container file.
pub const FILE_INIT: [u8; 7] = [1, 2, 3, 4, 5, 6, 7];

/// Closes a container file.
pub const FILE_TERM: [u8; 7] = [7, 6, 5, 4, 3, 2, 1];

/// Follows every tree section inside a container.
pub const TREE_SEPARATOR: [u8; 3] = [0xFE, 0x00, 0xFE];

/// Fixed bytes in a record besides the token: sentinels plus two `u32` fields.
pub const RECORD_OVERHEAD: usize = RECORD_INIT.len() + 4 + 4 + RECORD_TERM.len();

/// Returns the bytes at `pos..pos + len`, or as many as remain.
///
/// Used to report what was found when a sentinel check fails near the end
/// of the input.
pub(crate) fn window(data: &[u8], pos: usize, len: usize) -> &[u8] {
    let start = pos.min(data.len());
    let end = pos.saturating_add(len).min(data.len());
    &data[start..end]
}

/// Reads a big-endian `u32` at `pos`, if four bytes remain.
pub(crate) fn read_u32(data: &[u8], pos: usize) -> Option<u32> {
    let bytes: [u8; 4] = data.get(pos..pos.checked_add(4)?)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

/// Reads a big-endian `u16` at `pos`, if two bytes remain.
pub(crate) fn read_u16(data: &[u8], pos: usize) -> Option<u16> {
    let bytes: [u8; 2] = data.get(pos..pos.checked_add(2)?)?.try_into().ok()?;
    Some(u16::from_be_bytes(bytes))
}
