//! Two-family table pair with family dispatch.

use std::net::IpAddr;
use std::path::Path;

use crate::binary::{IndexReader, TableWriter};
use crate::converter::RangeList;
use crate::trie::{compress, Family, TrieBuilder};
use crate::Result;

/// A complete membership index: one table per address family.
///
/// The pair is immutable once constructed; queries are pure reads and may
/// run from any number of threads without coordination.
pub struct IpSet {
    v4: IndexReader,
    v6: IndexReader,
}

impl IpSet {
    /// Pair two already-validated readers.
    pub fn new(v4: IndexReader, v6: IndexReader) -> Self {
        Self { v4, v6 }
    }

    /// Open both table files.
    pub fn open(v4_path: &Path, v6_path: &Path) -> Result<Self> {
        Ok(Self {
            v4: IndexReader::open(v4_path)?,
            v6: IndexReader::open(v6_path)?,
        })
    }

    /// Build an index directly from a range list.
    ///
    /// Runs the full offline pipeline in memory; ranges are used as given,
    /// aggregate first if the source lists sibling prefixes separately.
    pub fn from_ranges(ranges: &RangeList) -> Result<Self> {
        let (v4, v6) = Self::build_tables(ranges)?;
        Ok(Self {
            v4: IndexReader::from_bytes(v4)?,
            v6: IndexReader::from_bytes(v6)?,
        })
    }

    /// Encode both family tables for a range list.
    ///
    /// This is the build-time artifact pair: each buffer is a
    /// self-contained flat table suitable for writing to a file or
    /// embedding as a constant.
    pub fn build_tables(ranges: &RangeList) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut v4_builder = TrieBuilder::new(Family::V4);
        for net in &ranges.v4 {
            v4_builder.insert_v4(net)?;
        }
        let mut v6_builder = TrieBuilder::new(Family::V6);
        for net in &ranges.v6 {
            v6_builder.insert_v6(net)?;
        }

        let mut writer = TableWriter::new();
        let v4 = writer.write(&compress(&v4_builder))?;
        let v6 = writer.write(&compress(&v6_builder))?;
        Ok((v4, v6))
    }

    /// Membership test for an address.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => self.v4.contains(&v4.octets()),
            IpAddr::V6(v6) => self.v6.contains(&v6.octets()),
        }
    }

    /// Membership test for raw address bytes.
    ///
    /// The family is keyed by byte length; an unrecognized length answers
    /// `false`, never an error.
    pub fn contains_bytes(&self, addr: &[u8]) -> bool {
        match Family::of_addr_len(addr.len()) {
            Some(Family::V4) => self.v4.contains(addr),
            Some(Family::V6) => self.v6.contains(addr),
            None => false,
        }
    }

    /// The IPv4 table.
    pub fn v4(&self) -> &IndexReader {
        &self.v4
    }

    /// The IPv6 table.
    pub fn v6(&self) -> &IndexReader {
        &self.v6
    }
}
