//! Error types for k2ipset.

use thiserror::Error;

/// Error type for k2ipset operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Prefix length exceeds the address width
    #[error("invalid prefix length {prefix_len} for {width}-bit address")]
    InvalidPrefixLen { prefix_len: u8, width: u8 },

    /// Address family does not match the table being built
    #[error("address family mismatch: {0}")]
    FamilyMismatch(ipnet::IpNet),

    /// Unparsable entry in a range list
    #[error("invalid range entry: {0}")]
    InvalidRange(String),

    /// Encoded table would exceed 16-bit word addressing
    #[error("table too large: {words} words exceeds 16-bit addressing")]
    TableTooLarge { words: usize },

    /// Table byte length is not a whole number of words
    #[error("odd table length: {len} bytes")]
    OddLength { len: usize },

    /// Table contains no nodes
    #[error("empty table")]
    EmptyTable,

    /// Node extends past the end of the table
    #[error("truncated node at word {offset}")]
    Truncated { offset: usize },

    /// Child reference points outside the table
    #[error("child reference {child} out of bounds at word {offset}")]
    ChildOutOfBounds { offset: usize, child: usize },

    /// has_child and set_child masks share a bit
    #[error("overlapping child masks at word {offset}")]
    MaskOverlap { offset: usize },

    /// Child references form a cycle
    #[error("cyclic child reference at word {offset}")]
    CycleDetected { offset: usize },

    /// Table is deeper than any address can traverse
    #[error("table depth exceeds {max} nibbles")]
    DepthExceeded { max: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for k2ipset operations.
pub type Result<T> = std::result::Result<T, Error>;
