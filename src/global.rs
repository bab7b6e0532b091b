//! Process-wide table state and public query API.

use once_cell::sync::OnceCell;
use std::net::IpAddr;
use std::path::Path;

use crate::binary::IndexReader;
use crate::ipset::IpSet;
use crate::Result;

/// Global table pair; set once, read-only for the process lifetime.
static TABLES: OnceCell<IpSet> = OnceCell::new();

/// Initialize the global tables from two artifact files.
///
/// Idempotent: a second initialization is a no-op, the first loaded pair
/// stays in place until process exit.
pub fn init_from_files(v4_path: &Path, v6_path: &Path) -> Result<()> {
    install(IpSet::open(v4_path, v6_path)?)
}

/// Initialize the global tables from owned table buffers.
pub fn init_from_bytes(v4: Vec<u8>, v6: Vec<u8>) -> Result<()> {
    install(IpSet::new(
        IndexReader::from_bytes(v4)?,
        IndexReader::from_bytes(v6)?,
    ))
}

/// Initialize the global tables from blobs embedded in the binary.
///
/// # Examples
/// ```ignore
/// k2ipset::init_embedded(
///     include_bytes!("../data/ipset_v4.k2s"),
///     include_bytes!("../data/ipset_v6.k2s"),
/// )?;
/// ```
pub fn init_embedded(v4: &'static [u8], v6: &'static [u8]) -> Result<()> {
    install(IpSet::new(
        IndexReader::from_static(v4)?,
        IndexReader::from_static(v6)?,
    ))
}

fn install(set: IpSet) -> Result<()> {
    if TABLES.set(set).is_err() {
        log::debug!("global tables already initialized, keeping existing pair");
    }
    Ok(())
}

/// Check whether the global tables are initialized.
pub fn is_initialized() -> bool {
    TABLES.get().is_some()
}

/// Membership test against the global tables.
///
/// Answers `false` when the process has not been initialized: not provably
/// covered is treated as not covered.
pub fn contains_ip(ip: IpAddr) -> bool {
    match TABLES.get() {
        Some(set) => set.contains(ip),
        None => {
            log::warn!("membership query before initialization, answering false");
            false
        }
    }
}

/// Membership test for raw address bytes against the global tables.
///
/// Unrecognized byte lengths and an uninitialized process both answer
/// `false`.
pub fn contains_bytes(addr: &[u8]) -> bool {
    match TABLES.get() {
        Some(set) => set.contains_bytes(addr),
        None => false,
    }
}
