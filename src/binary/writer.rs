//! Binary table writer.

use super::format::{node_words, MAX_TABLE_WORDS};
use crate::trie::NodeTable;
use crate::{Error, Result};

/// Serializes a [`NodeTable`] into the flat word-table format.
///
/// Each node becomes `has_child`, `set_child`, then one word per set bit of
/// `has_child` holding the absolute word offset of the child's first word,
/// in ascending nibble order. All words are little-endian. The table carries
/// no header; the root starts at word 0.
pub struct TableWriter {
    buffer: Vec<u8>,
}

impl TableWriter {
    /// Create a new writer.
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64 * 1024),
        }
    }

    /// Encode a table to bytes.
    pub fn write(&mut self, table: &NodeTable) -> Result<Vec<u8>> {
        if table.is_empty() {
            return Err(Error::EmptyTable);
        }

        // First pass: word offset of every node.
        let mut offsets = Vec::with_capacity(table.len());
        let mut words = 0usize;
        for node in table.nodes() {
            offsets.push(words);
            words += node_words(node.has_child);
        }
        if words > MAX_TABLE_WORDS {
            return Err(Error::TableTooLarge { words });
        }

        self.buffer.clear();
        self.buffer.reserve(words * 2);
        for node in table.nodes() {
            debug_assert_eq!(node.children.len(), node.has_child.count_ones() as usize);
            self.push_word(node.has_child);
            self.push_word(node.set_child);
            for &child in &node.children {
                self.push_word(offsets[child as usize] as u16);
            }
        }

        log::debug!("encoded {} nodes into {} words", table.len(), words);

        Ok(std::mem::take(&mut self.buffer))
    }

    fn push_word(&mut self, word: u16) {
        self.buffer.extend_from_slice(&word.to_le_bytes());
    }
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new()
    }
}
