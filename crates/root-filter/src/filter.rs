//! Import facade: select a histogram or tree, choose columns and a row
//! range, and copy the values into a table.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::directory::Directory;
use crate::error::{Result, RootError};
use crate::file::RootData;
use crate::histogram::{bin_center, is_weighted, BinPars};

/// What to import, and how much of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// `"Hist:<path>"` or `"Tree:<path>"`, path relative to the top directory.
    pub current_object: String,
    /// First row to import, 1-based.
    pub start_row: usize,
    /// Last row to import (inclusive); `None` imports up to the last row.
    pub end_row: Option<usize>,
    /// Column specifiers; empty selects the default columns.
    pub columns: Vec<String>,
    /// Rows shown by a preview when the caller does not ask for a count.
    pub preview_rows: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            current_object: String::new(),
            start_row: 1,
            end_row: None,
            columns: Vec::new(),
            preview_rows: 100,
        }
    }
}

impl FilterConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The object named by [`FilterConfig::current_object`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentObject {
    /// A histogram path.
    Histogram(String),
    /// A tree path.
    Tree(String),
}

impl CurrentObject {
    /// Parse `"Hist:<path>"` / `"Tree:<path>"`.
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(path) = s.strip_prefix("Hist:") {
            Ok(CurrentObject::Histogram(path.to_string()))
        } else if let Some(path) = s.strip_prefix("Tree:") {
            Ok(CurrentObject::Tree(path.to_string()))
        } else {
            Err(RootError::InvalidColumn(format!("object selector '{}'", s)))
        }
    }
}

/// Derived histogram columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistColumn {
    /// Bin center.
    Center,
    /// Bin lower edge.
    Low,
    /// Bin content.
    Content,
    /// Bin error.
    Error,
}

/// One configured column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    /// A derived histogram column.
    Histogram {
        /// Which value.
        column: HistColumn,
        /// Display name.
        name: String,
    },
    /// One element of a tree leaf.
    Leaf {
        /// Branch name.
        branch: String,
        /// Leaf name.
        leaf: String,
        /// Element index.
        element: usize,
        /// Display name.
        name: String,
    },
}

impl ColumnSpec {
    /// Parse `center`, `low`, `content` or `error`, optionally `:<display name>`.
    pub fn histogram(spec: &str) -> Result<Self> {
        let (kind, name) = match spec.split_once(':') {
            Some((kind, name)) => (kind, name),
            None => (spec, spec),
        };
        let column = match kind {
            "center" => HistColumn::Center,
            "low" => HistColumn::Low,
            "content" => HistColumn::Content,
            "error" => HistColumn::Error,
            _ => return Err(RootError::InvalidColumn(spec.to_string())),
        };
        Ok(ColumnSpec::Histogram { column, name: name.to_string() })
    }

    /// Parse `branch`, `branch/leaf`, either optionally followed by `[index]`.
    pub fn leaf(spec: &str) -> Result<Self> {
        let invalid = || RootError::InvalidColumn(spec.to_string());
        let (path, element) = match spec.strip_suffix(']').and_then(|s| s.rsplit_once('[')) {
            Some((path, index)) => (path, index.parse::<usize>().map_err(|_| invalid())?),
            None => (spec, 0),
        };
        let (branch, leaf) = path.split_once('/').unwrap_or((path, path));
        if branch.is_empty() || leaf.is_empty() {
            return Err(invalid());
        }
        Ok(ColumnSpec::Leaf {
            branch: branch.to_string(),
            leaf: leaf.to_string(),
            element,
            name: spec.to_string(),
        })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            ColumnSpec::Histogram { name, .. } | ColumnSpec::Leaf { name, .. } => name,
        }
    }
}

/// Receiver of imported columns.
pub trait DataSink {
    /// Called once before any column, with the column names and the row count.
    fn prepare(&mut self, names: &[String], rows: usize);

    /// Values of column `index`.
    fn set_column(&mut self, index: usize, values: Vec<f64>);
}

/// In-memory column table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names.
    pub names: Vec<String>,
    /// Column values, one vector per name.
    pub columns: Vec<Vec<f64>>,
}

impl Table {
    /// Length of the longest column.
    pub fn rows(&self) -> usize {
        self.columns.iter().map(Vec::len).max().unwrap_or(0)
    }
}

impl DataSink for Table {
    fn prepare(&mut self, names: &[String], rows: usize) {
        self.names = names.to_vec();
        self.columns = vec![Vec::with_capacity(rows); names.len()];
    }

    fn set_column(&mut self, index: usize, values: Vec<f64>) {
        if let Some(column) = self.columns.get_mut(index) {
            *column = values;
        }
    }
}

/// ROOT import filter.
///
/// Holds the import configuration and the scan of the last file it touched;
/// a different path triggers a new scan.
pub struct RootFilter {
    config: FilterConfig,
    cache: Option<(PathBuf, RootData)>,
}

impl RootFilter {
    /// Filter with the given configuration.
    pub fn new(config: FilterConfig) -> Self {
        Self { config, cache: None }
    }

    /// Current configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Mutable configuration.
    pub fn config_mut(&mut self) -> &mut FilterConfig {
        &mut self.config
    }

    /// Histogram directory tree of the file at `path`.
    pub fn list_histograms(&mut self, path: &Path) -> Result<Directory> {
        Ok(cached(&mut self.cache, path)?.list_histograms())
    }

    /// Tree directory tree of the file at `path`.
    pub fn list_trees(&mut self, path: &Path) -> Result<Directory> {
        Ok(cached(&mut self.cache, path)?.list_trees())
    }

    /// Column names of the tree whose key record is at `pos`.
    pub fn list_leaves(&mut self, path: &Path, pos: u64) -> Result<Vec<String>> {
        let rd = cached(&mut self.cache, path)?;
        Ok(rd.list_leaves(pos).iter().flat_map(|l| l.column_names()).collect())
    }

    /// Rows of the current object: histogram cells or tree entries.
    pub fn rows(&mut self, path: &Path) -> Result<usize> {
        let rd = cached(&mut self.cache, path)?;
        let (object, pos) = locate(rd, &self.config)?;
        Ok(match object {
            CurrentObject::Histogram(_) => rd.histogram_bins(pos),
            CurrentObject::Tree(_) => rd.tree_entries(pos),
        })
    }

    /// Header row followed by up to `lines` rows of the configured columns,
    /// or [`FilterConfig::preview_rows`] rows when `lines` is `None`.
    pub fn preview(&mut self, path: &Path, lines: Option<usize>) -> Result<Vec<Vec<String>>> {
        let lines = lines.unwrap_or(self.config.preview_rows);
        let rd = cached(&mut self.cache, path)?;
        let (object, pos) = locate(rd, &self.config)?;
        let specs = column_specs(rd, &self.config, &object, pos)?;
        let (first, last) = row_range(&self.config, rows_of(rd, &object, pos));
        let last = last.min(first.saturating_add(lines));
        let columns = read_columns(rd, &object, pos, &specs, first, last);

        let mut out = vec![specs.iter().map(|s| s.name().to_string()).collect::<Vec<_>>()];
        for row in 0..last - first {
            out.push(
                columns
                    .iter()
                    .map(|c| c.get(row).map(|v| v.to_string()).unwrap_or_default())
                    .collect(),
            );
        }
        Ok(out)
    }

    /// Import the configured rows and columns into `sink`; returns the row count.
    pub fn read_data_from_file(&mut self, path: &Path, sink: &mut dyn DataSink) -> Result<usize> {
        let rd = cached(&mut self.cache, path)?;
        let (object, pos) = locate(rd, &self.config)?;
        let specs = column_specs(rd, &self.config, &object, pos)?;
        let (first, last) = row_range(&self.config, rows_of(rd, &object, pos));
        let columns = read_columns(rd, &object, pos, &specs, first, last);

        let names: Vec<String> = specs.iter().map(|s| s.name().to_string()).collect();
        let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
        sink.prepare(&names, rows);
        for (i, values) in columns.into_iter().enumerate() {
            sink.set_column(i, values);
        }
        log::debug!("imported {} rows x {} columns from {}", rows, names.len(), path.display());
        Ok(rows)
    }
}

/// Scan of `path`, reusing the cached one when the path is unchanged.
fn cached<'c>(cache: &'c mut Option<(PathBuf, RootData)>, path: &Path) -> Result<&'c RootData> {
    let stale = cache.as_ref().map_or(true, |(p, _)| p != path);
    if stale {
        let rd = RootData::open(path)?;
        if !rd.is_valid() {
            log::warn!("{} is not a ROOT file", path.display());
        }
        return Ok(&cache.insert((path.to_path_buf(), rd)).1);
    }
    cache
        .as_ref()
        .map(|(_, rd)| rd)
        .ok_or_else(|| RootError::KeyNotFound(path.display().to_string()))
}

/// Resolve the configured object to its key offset.
fn locate(rd: &RootData, config: &FilterConfig) -> Result<(CurrentObject, u64)> {
    let object = CurrentObject::parse(&config.current_object)?;
    let pos = match &object {
        CurrentObject::Histogram(p) => rd.list_histograms().find(p),
        CurrentObject::Tree(p) => rd.list_trees().find(p),
    };
    match pos {
        Some(pos) => Ok((object, pos)),
        None => Err(RootError::KeyNotFound(config.current_object.clone())),
    }
}

fn rows_of(rd: &RootData, object: &CurrentObject, pos: u64) -> usize {
    match object {
        CurrentObject::Histogram(_) => rd.histogram_bins(pos),
        CurrentObject::Tree(_) => rd.tree_entries(pos),
    }
}

/// 0-based half-open row range for `rows` available rows.
fn row_range(config: &FilterConfig, rows: usize) -> (usize, usize) {
    let last = config.end_row.map_or(rows, |e| e.min(rows));
    let first = config.start_row.max(1) - 1;
    (first.min(last), last)
}

fn column_specs(
    rd: &RootData,
    config: &FilterConfig,
    object: &CurrentObject,
    pos: u64,
) -> Result<Vec<ColumnSpec>> {
    match object {
        CurrentObject::Histogram(_) if config.columns.is_empty() => {
            ["center", "content", "error"].iter().map(|c| ColumnSpec::histogram(c)).collect()
        }
        CurrentObject::Histogram(_) => {
            config.columns.iter().map(|c| ColumnSpec::histogram(c)).collect()
        }
        CurrentObject::Tree(_) if config.columns.is_empty() => rd
            .list_leaves(pos)
            .iter()
            .flat_map(|l| l.column_names())
            .map(|c| ColumnSpec::leaf(&c))
            .collect(),
        CurrentObject::Tree(_) => config.columns.iter().map(|c| ColumnSpec::leaf(c)).collect(),
    }
}

fn read_columns(
    rd: &RootData,
    object: &CurrentObject,
    pos: u64,
    specs: &[ColumnSpec],
    first: usize,
    last: usize,
) -> Vec<Vec<f64>> {
    match object {
        CurrentObject::Histogram(_) => {
            let bins = rd.read_histogram(pos);
            let last = last.min(bins.len());
            let first = first.min(last);
            specs.iter().map(|s| histogram_column(&bins, s, first, last)).collect()
        }
        CurrentObject::Tree(_) => specs
            .iter()
            .map(|s| match s {
                ColumnSpec::Leaf { branch, leaf, element, .. } => {
                    let mut values = rd.list_entries::<f64>(pos, branch, leaf, *element, last);
                    values.drain(..first.min(values.len()));
                    values
                }
                ColumnSpec::Histogram { .. } => Vec::new(),
            })
            .collect(),
    }
}

fn histogram_column(bins: &[BinPars], spec: &ColumnSpec, first: usize, last: usize) -> Vec<f64> {
    let ColumnSpec::Histogram { column, .. } = spec else {
        return Vec::new();
    };
    let weighted = is_weighted(bins);
    (first..last)
        .map(|i| match column {
            HistColumn::Center => bin_center(bins, i),
            HistColumn::Low => bins[i].lowedge,
            HistColumn::Content => bins[i].content,
            HistColumn::Error => bins[i].error(weighted),
        })
        .collect()
}
