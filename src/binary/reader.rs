//! Binary table reader and query engine.

use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

use super::format::{MAX_NIBBLE_DEPTH, NODE_HEADER_WORDS};
use crate::{Error, Result};

/// Backing storage for an encoded table.
enum TableSource {
    /// Memory-mapped file.
    Mapped(Mmap),
    /// Blob embedded in the binary, e.g. via `include_bytes!`.
    Embedded(&'static [u8]),
}

impl AsRef<[u8]> for TableSource {
    fn as_ref(&self) -> &[u8] {
        match self {
            TableSource::Mapped(mmap) => mmap,
            TableSource::Embedded(bytes) => bytes,
        }
    }
}

/// Validated reader over one family's encoded table.
///
/// Every structural property the walk relies on is checked once at load
/// time: word alignment, node and child bounds, mask disjointness, absence
/// of cycles and a bounded chain depth. Queries afterwards are pure reads
/// with no allocation, safe for unbounded concurrent callers.
pub struct IndexReader {
    data: TableSource,
    word_count: usize,
    node_count: usize,
}

impl IndexReader {
    /// Open and validate a table file via memory map.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // A zero-length file cannot be mapped.
        if file.metadata()?.len() == 0 {
            return Err(Error::EmptyTable);
        }
        let mmap = unsafe { Mmap::map(&file)? };
        Self::new(TableSource::Mapped(mmap))
    }

    /// Validate a table held in an owned buffer.
    ///
    /// The data is written to a temp file and memory-mapped, keeping one
    /// access path for all sources.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        use std::io::Write;

        if data.is_empty() {
            return Err(Error::EmptyTable);
        }

        let mut temp_file = tempfile::tempfile()?;
        temp_file.write_all(&data)?;

        let mmap = unsafe { Mmap::map(&temp_file)? };
        Self::new(TableSource::Mapped(mmap))
    }

    /// Validate a table embedded in the binary.
    pub fn from_static(data: &'static [u8]) -> Result<Self> {
        Self::new(TableSource::Embedded(data))
    }

    fn new(data: TableSource) -> Result<Self> {
        let (word_count, node_count) = validate(data.as_ref())?;
        Ok(Self {
            data,
            word_count,
            node_count,
        })
    }

    /// Total table size in 16-bit words.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Number of reachable nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Membership test for a raw address.
    ///
    /// Walks the table one nibble at a time, most significant first. The
    /// caller selects the table matching the address family; a walk that
    /// consumes every nibble without a verdict answers `false`.
    pub fn contains(&self, addr: &[u8]) -> bool {
        let mut p = 0usize;
        for &byte in addr {
            for nibble in [byte >> 4, byte & 0xf] {
                let has_child = self.word(p);
                #[cfg(feature = "query-trace")]
                log::trace!(
                    "nibble {:x} word {:#x}: has_child {:04x} set_child {:04x}",
                    nibble,
                    p,
                    has_child,
                    self.word(p + 1)
                );
                if has_child & (1 << nibble) != 0 {
                    let slot = (has_child & ((1u32 << nibble) - 1) as u16).count_ones() as usize;
                    p = self.word(p + NODE_HEADER_WORDS + slot) as usize;
                    continue;
                }
                if self.word(p + 1) & (1 << nibble) != 0 {
                    return true;
                }
                return false;
            }
        }
        false
    }

    /// Word at a validated offset.
    #[inline]
    fn word(&self, index: usize) -> u16 {
        let bytes = self.data.as_ref();
        u16::from_le_bytes([bytes[2 * index], bytes[2 * index + 1]])
    }
}

/// Check the table before any query is served.
///
/// Walks every node reachable from word 0 with an explicit stack, verifying
/// bounds, mask disjointness and acyclicity, and computing the longest node
/// chain so a corrupt table can never send a query out of bounds or into an
/// unbounded loop. Returns the word count and reachable node count.
fn validate(bytes: &[u8]) -> Result<(usize, usize)> {
    if bytes.len() % 2 != 0 {
        return Err(Error::OddLength { len: bytes.len() });
    }
    let word_count = bytes.len() / 2;
    if word_count == 0 {
        return Err(Error::EmptyTable);
    }

    let word = |index: usize| u16::from_le_bytes([bytes[2 * index], bytes[2 * index + 1]]);

    const UNSEEN: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![UNSEEN; word_count];
    // Longest chain rooted at each finished node, in nodes.
    let mut height = vec![0u32; word_count];
    let mut node_count = 0usize;

    // (node offset, next child slot to visit)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    check_node_header(bytes, word_count, 0)?;
    state[0] = ON_PATH;
    stack.push((0, 0));

    while let Some(top) = stack.last_mut() {
        let (offset, cursor) = (top.0, top.1);
        top.1 += 1;
        let child_total = word(offset).count_ones() as usize;

        if cursor < child_total {
            let child = word(offset + NODE_HEADER_WORDS + cursor) as usize;
            match state[child] {
                DONE => continue,
                ON_PATH => return Err(Error::CycleDetected { offset }),
                _ => {}
            }
            check_node_header(bytes, word_count, child)?;
            state[child] = ON_PATH;
            stack.push((child, 0));
            continue;
        }

        // All children finished: settle this node's height.
        let mut max_child = 0u32;
        for slot in 0..child_total {
            let child = word(offset + NODE_HEADER_WORDS + slot) as usize;
            max_child = max_child.max(height[child]);
        }
        height[offset] = 1 + max_child;
        if height[offset] as usize > MAX_NIBBLE_DEPTH {
            return Err(Error::DepthExceeded {
                max: MAX_NIBBLE_DEPTH,
            });
        }
        state[offset] = DONE;
        node_count += 1;
        stack.pop();
    }

    Ok((word_count, node_count))
}

/// Verify one node's header and child slots fit the table.
fn check_node_header(bytes: &[u8], word_count: usize, offset: usize) -> Result<()> {
    let word = |index: usize| u16::from_le_bytes([bytes[2 * index], bytes[2 * index + 1]]);

    if offset + NODE_HEADER_WORDS > word_count {
        return Err(Error::Truncated { offset });
    }
    let has_child = word(offset);
    let set_child = word(offset + 1);
    if has_child & set_child != 0 {
        return Err(Error::MaskOverlap { offset });
    }
    let children = has_child.count_ones() as usize;
    if offset + NODE_HEADER_WORDS + children > word_count {
        return Err(Error::Truncated { offset });
    }
    for slot in 0..children {
        let child = word(offset + NODE_HEADER_WORDS + slot) as usize;
        // A child must leave room for at least its own header.
        if child + NODE_HEADER_WORDS > word_count {
            return Err(Error::ChildOutOfBounds { offset, child });
        }
    }
    Ok(())
}
