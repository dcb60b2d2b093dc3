//! Streamer info: the on-disk field layout of ROOT classes.
//!
//! Layouts are data, discovered from the file's `StreamerInfo` key. Each
//! class maps to its fields in on-disk order; the layout walker interprets
//! that list to find a named field inside an object payload. Files without
//! streamer info get built-in layouts for the four classes the readers need.

use std::collections::HashMap;

use crate::error::{Result, RootError};
use crate::rbuffer::{RBuffer, TagTable};

/// `kCounter`: a basic-type element whose value sizes a later array.
const K_COUNTER: i32 = 6;
/// `kOffsetP`: basic pointer type codes are the basic code plus this.
const K_OFFSET_P: i32 = 40;

/// Element classes kept as fields; all others are skipped.
const RETAINED_ELEMENTS: [&str; 8] = [
    "TStreamerBase",
    "TStreamerBasicType",
    "TStreamerObject",
    "TStreamerObjectAny",
    "TStreamerString",
    "TStreamerSTL",
    "TStreamerBasicPointer",
    "TStreamerObjectPointer",
];

/// How a field occupies the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A nested object that carries its own version header and length.
    Object,
    /// `size` raw bytes.
    Scalar {
        /// Width in bytes.
        size: usize,
    },
    /// A 32-bit integer whose value is the length of a later array.
    Counter,
    /// A heap flag byte, then one element or `counter` elements of `size` bytes.
    Pointer {
        /// Width of one element.
        size: usize,
        /// Name of the counter field giving the element count.
        counter: Option<String>,
    },
}

/// One field of a class layout. An empty name marks bytes nobody reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamerInfo {
    /// Field name (empty for anonymous filler).
    pub name: String,
    /// Storage form.
    pub kind: FieldKind,
}

impl StreamerInfo {
    /// Nested object field.
    pub fn object(name: &str) -> Self {
        Self { name: name.to_string(), kind: FieldKind::Object }
    }

    /// Fixed-width field.
    pub fn scalar(name: &str, size: usize) -> Self {
        Self { name: name.to_string(), kind: FieldKind::Scalar { size } }
    }

    /// Array-length counter field.
    pub fn counter(name: &str) -> Self {
        Self { name: name.to_string(), kind: FieldKind::Counter }
    }

    /// Pointer field; `counter` names the length field of a variable array.
    pub fn pointer(name: &str, size: usize, counter: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Pointer { size, counter: counter.map(str::to_string) },
        }
    }

    /// Build a field from the attributes stored in a `TStreamerElement`.
    ///
    /// A zero size wins over everything else, then the counter flag, then the
    /// pointer flag.
    pub fn from_element(
        name: String,
        size: usize,
        counter: Option<String>,
        is_counter: bool,
        is_pointer: bool,
    ) -> Self {
        let kind = if size == 0 {
            FieldKind::Object
        } else if is_counter {
            FieldKind::Counter
        } else if is_pointer {
            FieldKind::Pointer { size, counter }
        } else {
            FieldKind::Scalar { size }
        };
        Self { name, kind }
    }
}

/// Class name → field layout.
#[derive(Debug, Clone, Default)]
pub struct StreamerRegistry {
    classes: HashMap<String, Vec<StreamerInfo>>,
}

impl StreamerRegistry {
    /// Layout of `class`, if known.
    pub fn get(&self, class: &str) -> Option<&[StreamerInfo]> {
        self.classes.get(class).map(Vec::as_slice)
    }

    /// Layout of `class`, or an error naming it.
    pub fn require(&self, class: &str) -> Result<&[StreamerInfo]> {
        self.get(class)
            .ok_or_else(|| RootError::UnsupportedClass(format!("no streamer info for {}", class)))
    }

    /// Whether `class` has a layout.
    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    /// Register (or replace) the layout of `class`.
    pub fn insert(&mut self, class: String, fields: Vec<StreamerInfo>) {
        self.classes.insert(class, fields);
    }

    /// Number of classes with a layout.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no layout is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Install the built-in `TTree` and `TBranch` layouts where missing.
    pub fn install_tree_fallback(&mut self) {
        self.classes.entry("TTree".into()).or_insert_with(fallback_ttree);
        self.classes.entry("TBranch".into()).or_insert_with(fallback_tbranch);
    }

    /// Install the built-in `TH1` and `TAxis` layouts where missing.
    pub fn install_histogram_fallback(&mut self) {
        self.classes.entry("TH1".into()).or_insert_with(fallback_th1);
        self.classes.entry("TAxis".into()).or_insert_with(fallback_taxis);
    }
}

/// Decode a `TList` of `TStreamerInfo` (the payload of the `StreamerInfo` key).
///
/// `keylength` is the key header length of that record; class-tag
/// references inside the list are relative to the start of the key.
pub fn read_streamer_list(
    payload: &[u8],
    keylength: usize,
    registry: &mut StreamerRegistry,
) -> Result<()> {
    let mut r = RBuffer::new(payload);
    let mut tags = TagTable::for_key(keylength);

    r.read_version()?; // TList
    r.skip_tobject()?;
    r.read_string()?; // fName
    let n = r.read::<i32>()?;

    for _ in 0..n {
        let class = r.read_object(&mut tags)?;
        if class.is_empty() {
            continue;
        }
        let v = r.read_version()?;
        if class == "TStreamerInfo" {
            if let Err(e) = read_streamer_info(&mut r, &mut tags, registry) {
                log::debug!("skipping unreadable TStreamerInfo: {}", e);
            }
        }
        r.seek_end(v.end)?;
        r.read_string()?; // link option
    }
    Ok(())
}

fn read_streamer_info(
    r: &mut RBuffer,
    tags: &mut TagTable,
    registry: &mut StreamerRegistry,
) -> Result<()> {
    r.read_version()?; // TNamed
    r.skip_tobject()?;
    let class = r.read_string()?;
    r.read_string()?; // title
    r.skip(8)?; // fCheckSum, fClassVersion

    let array = r.read_object(tags)?;
    if array != "TObjArray" {
        log::debug!("streamer info for {} has no element array ({:?})", class, array);
        return Ok(());
    }
    r.read_version()?;
    r.skip_tobject()?;
    r.read_string()?;
    let n = r.read::<i32>()?;
    r.read::<i32>()?; // lower bound

    let mut fields = Vec::with_capacity((n.max(0) as usize).min(r.remaining()));
    for _ in 0..n {
        let element = r.read_object(tags)?;
        if element.is_empty() {
            continue;
        }
        let v = r.read_version()?;
        if RETAINED_ELEMENTS.contains(&element.as_str()) {
            fields.push(read_element(r, &element)?);
        }
        r.seek_end(v.end)?;
    }
    log::debug!("streamer info for {}: {} fields", class, fields.len());
    registry.insert(class, fields);
    Ok(())
}

fn read_element(r: &mut RBuffer, element: &str) -> Result<StreamerInfo> {
    r.read_version()?; // TStreamerElement
    r.read_version()?; // TNamed
    r.skip_tobject()?;
    let name = r.read_string()?;
    let title = r.read_string()?;
    let type_code = r.read::<i32>()?;
    let mut size = r.read::<i32>()?.max(0) as usize;

    // These carry their own version header on disk.
    if element.starts_with("TStreamerObject")
        || element == "TStreamerBase"
        || element == "TStreamerSTL"
    {
        size = 0;
    }

    let is_pointer = element == "TStreamerBasicPointer" || element == "TStreamerObjectPointer";
    let mut counter = None;
    if is_pointer {
        counter = counter_name(&title);
        if element == "TStreamerBasicPointer" {
            if let Some(width) = basic_type_size(type_code - K_OFFSET_P) {
                size = width;
            }
        }
    }
    let is_counter = element == "TStreamerBasicType" && type_code == K_COUNTER;

    Ok(StreamerInfo::from_element(name, size, counter, is_counter, is_pointer))
}

/// `"[fN] comment"` → `fN`.
fn counter_name(title: &str) -> Option<String> {
    let rest = title.strip_prefix('[')?;
    let end = rest.find(']')?;
    Some(rest[..end].to_string())
}

/// Width of a ROOT basic type code (`EDataType`).
fn basic_type_size(code: i32) -> Option<usize> {
    match code {
        1 | 11 => Some(1),
        2 | 12 | 19 => Some(2),
        3 | 5 | 9 | 13 => Some(4),
        4 | 8 | 14 | 16 | 17 => Some(8),
        _ => None,
    }
}

fn fallback_ttree() -> Vec<StreamerInfo> {
    vec![
        StreamerInfo::object(""), // TNamed
        StreamerInfo::object(""), // TAttLine
        StreamerInfo::object(""), // TAttFill
        StreamerInfo::object(""), // TAttMarker
        StreamerInfo::scalar("fEntries", 8),
        StreamerInfo::scalar("", 5 * 8 + 4 * 4),
        StreamerInfo::counter("fNClusterRange"),
        StreamerInfo::scalar("", 6 * 8),
        StreamerInfo::pointer("fClusterRangeEnd", 8, Some("fNClusterRange")),
        StreamerInfo::pointer("fClusterSize", 8, Some("fNClusterRange")),
        StreamerInfo::object("fIOFeatures"),
        StreamerInfo::object("fBranches"),
    ]
}

fn fallback_tbranch() -> Vec<StreamerInfo> {
    vec![
        StreamerInfo::object("TNamed"),
        StreamerInfo::object(""), // TAttFill
        StreamerInfo::scalar("", 3 * 4),
        StreamerInfo::scalar("fWriteBasket", 4),
        StreamerInfo::scalar("", 8),
        StreamerInfo::object("fIOFeatures"),
        StreamerInfo::scalar("", 4),
        StreamerInfo::counter("fMaxBaskets"),
        StreamerInfo::scalar("", 4),
        StreamerInfo::scalar("fEntries", 8),
        StreamerInfo::scalar("", 3 * 8),
        StreamerInfo::object("fBranches"),
        StreamerInfo::object("fLeaves"),
        StreamerInfo::object("fBaskets"),
        StreamerInfo::pointer("fBasketBytes", 4, Some("fMaxBaskets")),
        StreamerInfo::pointer("fBasketEntry", 8, Some("fMaxBaskets")),
        StreamerInfo::pointer("fBasketSeek", 8, Some("fMaxBaskets")),
    ]
}

fn fallback_th1() -> Vec<StreamerInfo> {
    vec![
        StreamerInfo::object(""), // TNamed
        StreamerInfo::object(""), // TAttLine
        StreamerInfo::object(""), // TAttFill
        StreamerInfo::object(""), // TAttMarker
        StreamerInfo::scalar("fNcells", 4),
        StreamerInfo::object("fXaxis"),
        StreamerInfo::object("fYaxis"),
        StreamerInfo::object("fZaxis"),
        StreamerInfo::scalar("", 2 * 2 + 8 * 8),
        StreamerInfo::object("fContour"),
        StreamerInfo::object("fSumw2"),
    ]
}

fn fallback_taxis() -> Vec<StreamerInfo> {
    vec![
        StreamerInfo::object(""), // TNamed
        StreamerInfo::object(""), // TAttAxis
        StreamerInfo::scalar("fNbins", 4),
        StreamerInfo::scalar("fXmin", 8),
        StreamerInfo::scalar("fXmax", 8),
        StreamerInfo::object("fXbins"),
    ]
}
