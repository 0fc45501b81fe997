//! Record blocks and field lines.

use crate::constants::{BLOCK_SEPARATOR, FIELD_SEPARATOR};

/// Splits raw text into blocks without dropping or trimming anything, so
/// that joining the pieces with [`BLOCK_SEPARATOR`] gives back the input.
pub fn split_blocks(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split(BLOCK_SEPARATOR)
}

/// Yields the record blocks of `text` for parsing.
///
/// The whole text and each block are trimmed, and blocks left empty are
/// skipped.
pub fn record_blocks(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.trim()
        .split(BLOCK_SEPARATOR)
        .map(str::trim)
        .filter(|block| !block.is_empty())
}

/// Yields each `\n`-separated line of `block` together with its byte offset.
///
/// Lines do not include their `\n`; a `\r` before it is left in place.
pub fn lines_with_offsets(block: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    let mut offset = 0;
    block.split('\n').map(move |line| {
        let start = offset;
        offset += line.len() + 1;
        (start, line)
    })
}

/// One logical `Key: Value` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLine<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> FieldLine<'a> {
    /// Splits `line` at the first `": "` and trims both halves.
    ///
    /// A line without the separator becomes a key with an empty value.
    pub fn parse(line: &'a str) -> Self {
        match line.split_once(FIELD_SEPARATOR) {
            Some((key, value)) => {
                FieldLine {
                    key: key.trim(),
                    value: value.trim(),
                }
            }
            None => {
                FieldLine {
                    key: line.trim(),
                    value: "",
                }
            }
        }
    }
}
