//! K2IpSet - a compact immutable IP-set membership index.
//!
//! This crate answers one question: does an IP address fall inside a large,
//! fixed set of network ranges? The ranges are baked offline into a minimal
//! bitset DAG encoded as a flat word table; at run time the table is walked
//! one nibble at a time with no allocation and no I/O.
//!
//! # Features
//!
//! - **Nibble bitset trie**: 16-way branching with per-node `has_child` /
//!   `set_child` masks
//! - **Subtree deduplication**: identical subtrees are shared, turning the
//!   trie into a minimal DAG
//! - **Flat binary tables**: one headerless word table per address family,
//!   memory-mappable and embeddable
//! - **Validated loading**: bounds, mask and cycle checks run once before
//!   any query is served
//! - **Thread-safe queries**: read-only state, unbounded concurrent callers
//!
//! # Quick Start
//!
//! ```ignore
//! use k2ipset::{IpSet, RangeListParser};
//!
//! // Offline: build the index from a range list.
//! let ranges = RangeListParser::parse(std::fs::File::open("euro.txt")?)?.aggregate();
//! let (v4, v6) = IpSet::build_tables(&ranges)?;
//! std::fs::write("ipset_v4.k2s", &v4)?;
//! std::fs::write("ipset_v6.k2s", &v6)?;
//!
//! // At run time: load once, query forever.
//! k2ipset::init_from_files(Path::new("ipset_v4.k2s"), Path::new("ipset_v6.k2s"))?;
//! assert!(k2ipset::contains_ip("2.0.0.1".parse()?));
//! ```
//!
//! # Membership Semantics
//!
//! Only include-ranges exist; overlapping ranges union together. An absent,
//! wrong-length or unrecognized address always answers `false` - not
//! provably covered means not covered.

mod error;
mod global;
mod ipset;

pub mod binary;
pub mod converter;
pub mod trie;

// Re-export core types
pub use error::{Error, Result};
pub use ipset::IpSet;
pub use trie::{compress, Family, Node, NodeTable, TrieBuilder};

// Re-export codec types
pub use binary::{IndexReader, TableWriter};

// Re-export converter types
pub use converter::{RangeList, RangeListParser};

// Re-export global API functions
pub use global::{
    contains_bytes, contains_ip, init_embedded, init_from_bytes, init_from_files, is_initialized,
};
