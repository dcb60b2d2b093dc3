//! File scanner and the query surface over a catalogued ROOT file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::datasource::DataSource;
use crate::decompress;
use crate::directory::{Directory, DirectoryIndex};
use crate::error::{Result, RootError};
use crate::histogram::BinPars;
use crate::key::{ContentType, KeyBuffer, KeyHeader};
use crate::objects::{th1, ttree};
use crate::rbuffer::{Numeric, RBuffer};
use crate::streamer::{self, StreamerInfo, StreamerRegistry};
use crate::tree::LeafInfo;

/// ROOT file magic bytes.
const ROOT_MAGIC: &[u8; 4] = b"root";

/// Format versions from this one on use 64-bit `fEND` and seek pointers.
const LARGE_FILE_VERSION: i32 = 1_000_000;

/// Header fields summarized by [`RootData::file_info`].
///
/// ```text
/// offset  size  field
///    0      4   magic "root"
///    4      4   fVersion
///    8      4   fBEGIN
///   12    4|8   fEND
///   20      4   fNbytesFree
///   33      4   fCompress
///   41      4   fNbytesInfo
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    /// Format version (`fVersion`).
    pub version: i32,
    /// Offset of the first key record (`fBEGIN`).
    pub begin: u64,
    /// Offset of the first byte past the last record (`fEND`).
    pub end: u64,
    /// Bytes held by free-segment records.
    pub nbytes_free: i32,
    /// Compression algorithm (`fCompress / 100`).
    pub compression_algorithm: i32,
    /// Compression level (`fCompress % 100`).
    pub compression_level: i32,
    /// Size of the streamer info record.
    pub nbytes_info: i32,
    /// Number of catalogued histograms.
    pub histograms: usize,
    /// Number of catalogued trees.
    pub trees: usize,
    /// Number of catalogued baskets.
    pub baskets: usize,
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version: {}", self.version)?;
        writeln!(f, "begin: {}", self.begin)?;
        writeln!(f, "end: {}", self.end)?;
        writeln!(f, "free bytes: {}", self.nbytes_free)?;
        writeln!(f, "compression algorithm: {}", self.compression_algorithm)?;
        writeln!(f, "compression level: {}", self.compression_level)?;
        writeln!(f, "streamer info bytes: {}", self.nbytes_info)?;
        writeln!(f, "histograms: {}", self.histograms)?;
        writeln!(f, "trees: {}", self.trees)?;
        write!(f, "baskets: {}", self.baskets)
    }
}

/// Everything the scan learned about the file.
#[derive(Debug, Clone)]
struct Catalog {
    info: FileInfo,
    hist_dirs: DirectoryIndex,
    tree_dirs: DirectoryIndex,
    hist_keys: BTreeMap<u64, KeyBuffer>,
    tree_keys: BTreeMap<u64, KeyBuffer>,
    basket_keys: BTreeMap<u64, KeyBuffer>,
    streamers: StreamerRegistry,
}

impl Catalog {
    fn new(root: u64) -> Self {
        Self {
            info: FileInfo::default(),
            hist_dirs: DirectoryIndex::new(root),
            tree_dirs: DirectoryIndex::new(root),
            hist_keys: BTreeMap::new(),
            tree_keys: BTreeMap::new(),
            basket_keys: BTreeMap::new(),
            streamers: StreamerRegistry::default(),
        }
    }
}

/// A ROOT file scanned into catalogs of histograms, trees and baskets.
///
/// The scan runs once, at construction. Every query afterwards works on the
/// catalogs plus the file bytes and never fails: malformed objects produce
/// empty results and a `log::warn!`.
pub struct RootData {
    data: DataSource,
    valid: bool,
    catalog: Catalog,
}

impl RootData {
    /// Map and scan the file at `path`.
    ///
    /// Only I/O failures are errors. A file that is not a ROOT file gives a
    /// `RootData` with empty catalogs and `is_valid() == false`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = DataSource::map(path.as_ref())?;
        Ok(Self::from_source(data))
    }

    /// Scan a file image held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::from_source(DataSource::Owned(data))
    }

    fn from_source(data: DataSource) -> Self {
        let (valid, catalog) = match scan(&data) {
            Ok(catalog) => (true, catalog),
            Err(e) => {
                log::warn!("cannot catalog file: {}", e);
                (false, Catalog::new(0))
            }
        };
        Self { data, valid, catalog }
    }

    /// Whether the file carried the ROOT magic and its header could be read.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Header summary and catalog sizes.
    pub fn file_info(&self) -> FileInfo {
        self.catalog.info.clone()
    }

    /// Directory tree of histograms.
    pub fn list_histograms(&self) -> Directory {
        self.catalog.hist_dirs.build()
    }

    /// Directory tree of trees and ntuples.
    pub fn list_trees(&self) -> Directory {
        self.catalog.tree_dirs.build()
    }

    /// Catalog entry of the histogram whose key record is at `pos`.
    pub fn histogram_key(&self, pos: u64) -> Option<&KeyBuffer> {
        self.catalog.hist_keys.get(&pos)
    }

    /// Catalog entry of the tree whose key record is at `pos`.
    pub fn tree_key(&self, pos: u64) -> Option<&KeyBuffer> {
        self.catalog.tree_keys.get(&pos)
    }

    /// Cells (bins plus underflow and overflow) of the histogram at `pos`, 0 if unknown.
    pub fn histogram_bins(&self, pos: u64) -> usize {
        self.histogram_key(pos).map_or(0, |k| k.nrows)
    }

    /// Entries of the tree at `pos`, 0 if unknown.
    pub fn tree_entries(&self, pos: u64) -> usize {
        self.tree_key(pos).map_or(0, |k| k.nrows)
    }

    /// Layout of `class` as known to this file (or installed as fallback).
    pub fn streamer_info(&self, class: &str) -> Option<&[StreamerInfo]> {
        self.catalog.streamers.get(class)
    }

    /// Decompressed payload of a catalogued key, empty on failure.
    pub fn data(&self, buffer: &KeyBuffer) -> Vec<u8> {
        decompress::data(&self.data, buffer)
    }

    /// All cells of the histogram at `pos`, empty on failure.
    pub fn read_histogram(&self, pos: u64) -> Vec<BinPars> {
        let Some(key) = self.histogram_key(pos) else {
            log::warn!("no histogram at offset {}", pos);
            return Vec::new();
        };
        let payload = self.data(key);
        match th1::read_histogram(&payload, key.content_type, &self.catalog.streamers) {
            Ok(bins) => bins,
            Err(e) => {
                log::warn!("cannot read histogram '{}': {}", key.name, e);
                Vec::new()
            }
        }
    }

    /// Leaves of every branch of the tree at `pos`, empty on failure.
    pub fn list_leaves(&self, pos: u64) -> Vec<LeafInfo> {
        let Some(key) = self.tree_key(pos) else {
            log::warn!("no tree at offset {}", pos);
            return Vec::new();
        };
        let payload = self.data(key);
        match ttree::list_leaves(&payload, key, &self.catalog.streamers) {
            Ok(leaves) => leaves,
            Err(e) => {
                log::warn!("cannot list leaves of '{}': {}", key.name, e);
                Vec::new()
            }
        }
    }

    /// Up to `max_entries` values of element `element` of `branch`/`leaf` in
    /// the tree at `pos`, converted to `T`.
    ///
    /// Values read before a failure are kept.
    pub fn list_entries<T: Numeric>(
        &self,
        pos: u64,
        branch: &str,
        leaf: &str,
        element: usize,
        max_entries: usize,
    ) -> Vec<T> {
        let mut out = Vec::new();
        let Some(key) = self.tree_key(pos) else {
            log::warn!("no tree at offset {}", pos);
            return out;
        };
        let payload = self.data(key);
        let selection = ttree::EntrySelection { branch, leaf, element, max_entries };
        let basket = |seek: u64| self.catalog.basket_keys.get(&seek).map(|b| self.data(b));
        if let Err(e) =
            ttree::list_entries(&payload, key, &self.catalog.streamers, &selection, basket, &mut out)
        {
            log::warn!("cannot read {}/{} of '{}': {}", branch, leaf, key.name, e);
        }
        out
    }
}

/// Walk the key records from `fBEGIN` to `fEND` and build the catalogs.
fn scan(data: &DataSource) -> Result<Catalog> {
    if data.len() < ROOT_MAGIC.len() || &data[..ROOT_MAGIC.len()] != ROOT_MAGIC {
        return Err(RootError::BadMagic);
    }

    let mut r = RBuffer::new(data);
    r.set_pos(ROOT_MAGIC.len());
    let version = r.read::<i32>()?;
    let begin = r.read::<i32>()?.max(0) as u64;
    let end = if version < LARGE_FILE_VERSION {
        r.read::<i32>()?.max(0) as u64
    } else {
        r.read::<i64>()?.max(0) as u64
    };
    r.set_pos(20);
    let nbytes_free = r.read::<i32>()?;
    r.set_pos(33);
    let compress = r.read::<i32>()?;
    r.set_pos(41);
    let nbytes_info = r.read::<i32>()?;

    let mut catalog = Catalog::new(begin);
    catalog.info = FileInfo {
        version,
        begin,
        end,
        nbytes_free,
        compression_algorithm: compress / 100,
        compression_level: compress % 100,
        nbytes_info,
        ..FileInfo::default()
    };

    if let Err(e) = scan_keys(data, &mut catalog, begin, end, compress > 0) {
        log::warn!("key scan stopped early: {}", e);
    }

    if !catalog.tree_keys.is_empty() {
        catalog.streamers.install_tree_fallback();
    }
    if !catalog.hist_keys.is_empty() {
        catalog.streamers.install_histogram_fallback();
    }
    count_rows(data, &mut catalog);

    catalog.info.histograms = catalog.hist_keys.len();
    catalog.info.trees = catalog.tree_keys.len();
    catalog.info.baskets = catalog.basket_keys.len();
    Ok(catalog)
}

fn scan_keys(
    data: &DataSource,
    catalog: &mut Catalog,
    begin: u64,
    end: u64,
    compressed: bool,
) -> Result<()> {
    let mut r = RBuffer::new(data);
    let mut pos = begin;
    while pos < end {
        r.set_pos(pos as usize);
        let n_bytes = r.read::<i32>()?;
        if n_bytes == 0 {
            break;
        }
        if n_bytes < 0 {
            // free segment
            pos += n_bytes.unsigned_abs() as u64;
            continue;
        }

        r.set_pos(pos as usize);
        match KeyHeader::read(&mut r) {
            Ok(header) => catalog_key(data, catalog, &mut r, header, pos, compressed),
            Err(e) => log::debug!("skipping unreadable key at {}: {}", pos, e),
        }
        pos += n_bytes as u64;
    }
    Ok(())
}

fn catalog_key(
    data: &DataSource,
    catalog: &mut Catalog,
    r: &mut RBuffer,
    header: KeyHeader,
    pos: u64,
    compressed: bool,
) {
    if header.class_name == "TDirectory" || header.class_name == "TDirectoryFile" {
        catalog.hist_dirs.add_directory(pos, &header.name, header.seek_pdir);
        catalog.tree_dirs.add_directory(pos, &header.name, header.seek_pdir);
        return;
    }

    let content_type = ContentType::classify(&header.class_name, &header.name);
    if content_type == ContentType::Invalid {
        log::debug!("skipping {} '{}' at {}", header.class_name, header.name, pos);
        return;
    }
    let buffer = match header.to_buffer(content_type, pos, r, compressed) {
        Ok(b) if b.content_type != ContentType::Invalid => b,
        Ok(_) => return,
        Err(e) => {
            log::debug!("dropping key '{}' at {}: {}", header.name, pos, e);
            return;
        }
    };

    match content_type {
        ContentType::Basket => {
            catalog.basket_keys.insert(pos, buffer);
        }
        ContentType::Streamer => {
            let payload = decompress::data(data, &buffer);
            if payload.is_empty() {
                return;
            }
            if let Err(e) =
                streamer::read_streamer_list(&payload, buffer.keylength, &mut catalog.streamers)
            {
                log::warn!("streamer info incomplete: {}", e);
            }
        }
        t if t.is_tree() => {
            let dir = catalog.tree_dirs.resolve(header.seek_pdir);
            file_under(&mut catalog.tree_dirs, &mut catalog.tree_keys, dir, pos, buffer);
        }
        t if t.is_histogram() => {
            let dir = catalog.hist_dirs.resolve(header.seek_pdir);
            file_under(&mut catalog.hist_dirs, &mut catalog.hist_keys, dir, pos, buffer);
        }
        _ => {}
    }
}

/// File `buffer` under directory `dir`, keeping only the highest cycle of each name.
fn file_under(
    dirs: &mut DirectoryIndex,
    keys: &mut BTreeMap<u64, KeyBuffer>,
    dir: u64,
    pos: u64,
    buffer: KeyBuffer,
) {
    let content = dirs.content_mut(dir);
    match content.iter_mut().find(|(name, _)| *name == buffer.name) {
        Some(slot) => {
            let kept = keys.get(&slot.1).map_or(i16::MIN, |k| k.cycle);
            if kept >= buffer.cycle {
                log::debug!("'{}' cycle {} superseded by cycle {}", buffer.name, buffer.cycle, kept);
                return;
            }
            log::debug!("'{}' cycle {} replaces cycle {}", buffer.name, buffer.cycle, kept);
            keys.remove(&slot.1);
            slot.1 = pos;
        }
        None => content.push((buffer.name.clone(), pos)),
    }
    keys.insert(pos, buffer);
}

/// Cache bin and entry counts on the catalogued keys.
fn count_rows(data: &DataSource, catalog: &mut Catalog) {
    let streamers = &catalog.streamers;
    for key in catalog.hist_keys.values_mut() {
        let payload = decompress::data(data, key);
        key.nrows = th1::read_n_bins(&payload, streamers).unwrap_or_else(|e| {
            log::warn!("cannot read bin count of '{}': {}", key.name, e);
            0
        });
    }
    for key in catalog.tree_keys.values_mut() {
        let payload = decompress::data(data, key);
        key.nrows = match ttree::read_n_entries(&payload, key, streamers) {
            Ok(n) => n as usize,
            Err(e) => {
                log::warn!("cannot read entry count of '{}': {}", key.name, e);
                0
            }
        };
    }
}
