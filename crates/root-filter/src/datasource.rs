//! Backing bytes for a scanned ROOT file.

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use crate::error::Result;

/// File contents, either owned or memory-mapped.
///
/// Payload reads slice directly into this, so one mapping serves every
/// `data()` call made while the `RootData` is alive.
pub enum DataSource {
    /// Bytes owned in a `Vec<u8>` (`RootData::from_bytes`, tests).
    Owned(Vec<u8>),
    /// Memory-mapped file.
    Mmap(memmap2::Mmap),
}

impl DataSource {
    /// Map the file at `path` read-only.
    pub fn map(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            // Zero-length mappings are rejected on some platforms.
            return Ok(DataSource::Owned(Vec::new()));
        }
        // SAFETY: the mapping is only read. Concurrent truncation of the file
        // by another process is outside what this reader guards against.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Ok(DataSource::Mmap(mmap))
    }

    /// Bytes `[start, start + len)`, or `None` if the range leaves the file.
    pub fn range(&self, start: u64, len: usize) -> Option<&[u8]> {
        let start = usize::try_from(start).ok()?;
        let end = start.checked_add(len)?;
        self.get(start..end)
    }
}

impl Deref for DataSource {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            DataSource::Owned(v) => v,
            DataSource::Mmap(m) => m,
        }
    }
}
