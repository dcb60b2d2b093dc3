//! # root-filter
//!
//! Native reader for CERN ROOT files, built to import 1D histograms and
//! flat trees as tables.
//!
//! A file is scanned once into catalogs of histograms, trees and data
//! baskets, organized by directory. Object layouts are taken from the
//! file's own streamer info, with built-in layouts for files that lack it.
//! Payloads may be stored raw, zlib- or LZ4-compressed.
//!
//! ## Example
//!
//! ```no_run
//! use root_filter::RootData;
//!
//! let rd = RootData::open("data.root").unwrap();
//! println!("{}", rd.file_info());
//! for (path, pos) in rd.list_histograms().flatten() {
//!     let bins = rd.read_histogram(pos);
//!     println!("{}: {} cells", path, bins.len());
//! }
//! for (path, pos) in rd.list_trees().flatten() {
//!     for leaf in rd.list_leaves(pos) {
//!         let values: Vec<f64> = rd.list_entries(pos, &leaf.branch, &leaf.leaf, 0, 10);
//!         println!("{} {}/{}: {:?}", path, leaf.branch, leaf.leaf, values);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod datasource;
pub mod decompress;
pub mod directory;
pub mod error;
pub mod file;
pub mod filter;
pub mod histogram;
pub mod key;
pub mod layout;
pub mod objects;
pub mod rbuffer;
pub mod streamer;
pub mod tree;

pub use directory::Directory;
pub use error::{Result, RootError};
pub use file::{FileInfo, RootData};
pub use filter::{ColumnSpec, CurrentObject, DataSink, FilterConfig, HistColumn, RootFilter, Table};
pub use histogram::BinPars;
pub use key::{Compression, ContentType, KeyBuffer};
pub use rbuffer::Numeric;
pub use streamer::{FieldKind, StreamerInfo};
pub use tree::LeafInfo;
