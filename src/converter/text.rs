//! Range-list text format parser.
//!
//! One CIDR per line, `#` starts a comment, blank lines ignored. This is
//! the interchange format produced by the country-range extraction
//! pipeline.

use std::io::{BufRead, BufReader, Read};

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use crate::{Error, Result};

/// Include-ranges split by address family.
#[derive(Debug, Clone, Default)]
pub struct RangeList {
    pub v4: Vec<Ipv4Net>,
    pub v6: Vec<Ipv6Net>,
}

impl RangeList {
    /// Create an empty range list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a range to the matching family.
    pub fn add(&mut self, net: IpNet) {
        match net {
            IpNet::V4(v4) => self.v4.push(v4),
            IpNet::V6(v6) => self.v6.push(v6),
        }
    }

    /// Total number of ranges across both families.
    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v4.is_empty() && self.v6.is_empty()
    }

    /// Collapse adjacent and overlapping ranges per family.
    ///
    /// Aggregating before building keeps the raw tree small and merges
    /// sibling prefixes the source data lists separately.
    pub fn aggregate(&self) -> Self {
        Self {
            v4: Ipv4Net::aggregate(&self.v4),
            v6: Ipv6Net::aggregate(&self.v6),
        }
    }
}

/// Range-list text parser.
pub struct RangeListParser;

impl RangeListParser {
    /// Parse ranges from a reader.
    ///
    /// A line that is neither empty, a comment, nor a valid CIDR is an
    /// error; malformed entries are never silently dropped.
    pub fn parse<R: Read>(reader: R) -> Result<RangeList> {
        let mut ranges = RangeList::new();
        let buf_reader = BufReader::new(reader);

        for line in buf_reader.lines() {
            let line = line?;

            let line = match line.find('#') {
                Some(idx) => &line[..idx],
                None => &line,
            };
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            let net = line
                .parse::<IpNet>()
                .map_err(|_| Error::InvalidRange(line.to_string()))?;
            ranges.add(net);
        }

        Ok(ranges)
    }
}
