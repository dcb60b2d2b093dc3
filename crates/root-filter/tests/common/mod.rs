//! Synthetic ROOT file writer for integration tests.
//!
//! Emits just enough of the on-disk format for the reader: the file header,
//! key records (optionally zlib/LZ4 framed), directories, TH1x and
//! TTree/TNtuple payloads laid out like ROOT writes them, TBasket keys and a
//! StreamerInfo list.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;

/// File offset of the first key record.
pub const BEGIN: u64 = 100;

const K_BYTE_COUNT_MASK: u32 = 0x4000_0000;
const K_NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
const K_CLASS_MASK: u32 = 0x8000_0000;

/// How a key payload is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Raw,
    Zlib,
    Lz4,
}

/// Big-endian object writer with class-tag bookkeeping.
pub struct ObjWriter {
    pub bytes: Vec<u8>,
    keylen: usize,
    tags: HashMap<String, u32>,
}

impl ObjWriter {
    pub fn new(keylen: usize) -> Self {
        Self { bytes: Vec::new(), keylen, tags: HashMap::new() }
    }

    pub fn u8(&mut self, v: u8) {
        self.bytes.push(v);
    }
    pub fn i16(&mut self, v: i16) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }
    pub fn u16(&mut self, v: u16) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }
    pub fn i32(&mut self, v: i32) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }
    pub fn u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }
    pub fn i64(&mut self, v: i64) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }
    pub fn f32(&mut self, v: f32) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }
    pub fn f64(&mut self, v: f64) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }
    pub fn zeros(&mut self, n: usize) {
        self.bytes.resize(self.bytes.len() + n, 0);
    }

    /// `TString`: one length byte, then the characters.
    pub fn tstring(&mut self, s: &str) {
        assert!(s.len() < 255);
        self.u8(s.len() as u8);
        self.bytes.extend_from_slice(s.as_bytes());
    }

    /// Open a version header with a byte count; close it with [`end`](Self::end).
    pub fn begin(&mut self, version: u16) -> usize {
        let at = self.bytes.len();
        self.u32(0);
        self.u16(version);
        at
    }

    pub fn end(&mut self, at: usize) {
        let count = (self.bytes.len() - at - 4) as u32 | K_BYTE_COUNT_MASK;
        self.bytes[at..at + 4].copy_from_slice(&count.to_be_bytes());
    }

    /// `TObject`: version without byte count, fUniqueID, fBits.
    pub fn tobject(&mut self) {
        self.u16(1);
        self.u32(0);
        self.u32(0x0300_0000);
    }

    pub fn tnamed(&mut self, name: &str, title: &str) {
        let at = self.begin(1);
        self.tobject();
        self.tstring(name);
        self.tstring(title);
        self.end(at);
    }

    /// A versioned base object holding `n` bytes nobody reads.
    pub fn opaque(&mut self, version: u16, n: usize) {
        let at = self.begin(version);
        self.zeros(n);
        self.end(at);
    }

    /// Class reference of a collection element; close with [`end`](Self::end)
    /// after writing the object.
    pub fn class_tag(&mut self, class: &str) -> usize {
        let at = self.bytes.len();
        self.u32(0);
        if let Some(&tag) = self.tags.get(class) {
            self.u32(tag | K_CLASS_MASK);
        } else {
            let tag = (self.bytes.len() + self.keylen + 2) as u32;
            self.tags.insert(class.to_string(), tag);
            self.u32(K_NEW_CLASS_TAG);
            self.bytes.extend_from_slice(class.as_bytes());
            self.u8(0);
        }
        at
    }

    /// `TObjArray` header for `n` elements; close with [`end`](Self::end).
    pub fn obj_array(&mut self, n: i32) -> usize {
        let at = self.begin(3);
        self.tobject();
        self.tstring("");
        self.i32(n);
        self.i32(0);
        at
    }

    pub fn empty_obj_array(&mut self) {
        let at = self.obj_array(0);
        self.end(at);
    }
}

/// Key header length for a record of `class`/`name`/`title`.
pub fn key_len(class: &str, name: &str, title: &str) -> usize {
    let fixed = 4 + 2 + 4 + 4 + 2 + 2 + 4 + 4;
    let extra = if class == "TBasket" { 19 } else { 0 };
    fixed + 3 + class.len() + name.len() + title.len() + extra
}

/// Builds a complete file image.
pub struct FileWriter {
    buf: Vec<u8>,
    compress: i32,
    nbytes_free: i32,
    nbytes_info: i32,
}

impl FileWriter {
    /// `compress` is ROOT's `fCompress` (e.g. 101 for zlib level 1, 404 for LZ4).
    pub fn new(compress: i32) -> Self {
        let mut w = Self { buf: vec![0u8; BEGIN as usize], compress, nbytes_free: 0, nbytes_info: 0 };
        w.add_key("TFile", "test.root", "", 1, None, &[0u8; 16], Frame::Raw);
        w
    }

    /// Append a key record; returns its offset.
    pub fn add_key(
        &mut self,
        class: &str,
        name: &str,
        title: &str,
        cycle: i16,
        pdir: Option<u64>,
        payload: &[u8],
        frame: Frame,
    ) -> u64 {
        let pos = self.buf.len() as u64;
        let keylen = key_len(class, name, title);
        let stored = frame_payload(payload, frame);
        let n_bytes = keylen + stored.len();

        let mut h = ObjWriter::new(0);
        h.i32(n_bytes as i32);
        h.i16(4);
        h.u32(payload.len() as u32);
        h.u32(0); // datime
        h.u16(keylen as u16);
        h.i16(cycle);
        h.u32(pos as u32);
        h.u32(pdir.unwrap_or(BEGIN) as u32);
        for s in [class, name, title] {
            h.tstring(s);
        }
        if class == "TBasket" {
            h.zeros(19);
        }
        assert_eq!(h.bytes.len(), keylen);

        self.buf.extend_from_slice(&h.bytes);
        self.buf.extend_from_slice(&stored);
        pos
    }

    pub fn add_directory(&mut self, name: &str, pdir: Option<u64>) -> u64 {
        self.add_key("TDirectoryFile", name, name, 1, pdir, &[0u8; 42], Frame::Raw)
    }

    pub fn add_basket(&mut self, branch: &str, payload: &[u8], frame: Frame) -> u64 {
        self.add_key("TBasket", branch, "tree", 1, None, payload, frame)
    }

    /// A free-segment record of `n` bytes.
    pub fn add_free(&mut self, n: usize) {
        self.buf.extend_from_slice(&(-(n as i32)).to_be_bytes());
        self.buf.resize(self.buf.len() + n - 4, 0xAB);
        self.nbytes_free += n as i32;
    }

    pub fn add_streamer_info(&mut self, payload: &[u8], frame: Frame) -> u64 {
        let start = self.buf.len();
        let pos = self.add_key("TList", "StreamerInfo", "Doubly linked list", 1, None, payload, frame);
        self.nbytes_info = (self.buf.len() - start) as i32;
        pos
    }

    pub fn finish(mut self) -> Vec<u8> {
        let end = self.buf.len() as i32;
        let mut h = ObjWriter::new(0);
        h.bytes.extend_from_slice(b"root");
        h.i32(62206);
        h.i32(BEGIN as i32);
        h.i32(end);
        h.i32(0); // fSeekFree
        h.i32(self.nbytes_free);
        h.i32(0); // nfree
        h.i32(0); // fNbytesName
        h.u8(4); // fUnits
        h.i32(self.compress);
        h.i32(0); // fSeekInfo
        h.i32(self.nbytes_info);
        self.buf[..h.bytes.len()].copy_from_slice(&h.bytes);
        self.buf
    }
}

fn le24(v: usize) -> [u8; 3] {
    [v as u8, (v >> 8) as u8, (v >> 16) as u8]
}

fn frame_payload(payload: &[u8], frame: Frame) -> Vec<u8> {
    match frame {
        Frame::Raw => payload.to_vec(),
        Frame::Zlib => {
            let mut enc =
                flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            enc.write_all(payload).unwrap();
            let stream = enc.finish().unwrap();
            let mut out = b"ZL\x08".to_vec();
            out.extend_from_slice(&le24(stream.len()));
            out.extend_from_slice(&le24(payload.len()));
            out.extend_from_slice(&stream);
            out
        }
        Frame::Lz4 => {
            let block = lz4_flex::block::compress(payload);
            let mut out = b"L4\x01".to_vec();
            out.extend_from_slice(&le24(block.len() + 8));
            out.extend_from_slice(&le24(payload.len()));
            out.extend_from_slice(&[0u8; 8]); // checksum, not verified
            out.extend_from_slice(&block);
            out
        }
    }
}

// ── histograms ──────────────────────────────────────────────────

/// A 1D histogram to write.
pub struct Hist<'a> {
    pub class: &'a str,
    pub name: &'a str,
    pub xmin: f64,
    pub xmax: f64,
    /// All cells, underflow and overflow included.
    pub cells: &'a [f64],
    pub sumw2: Option<&'a [f64]>,
    /// Explicit edges (bins + 1 values) for variable binning.
    pub edges: Option<&'a [f64]>,
}

impl<'a> Hist<'a> {
    pub fn uniform(name: &'a str, xmin: f64, xmax: f64, cells: &'a [f64]) -> Self {
        Self { class: "TH1D", name, xmin, xmax, cells, sumw2: None, edges: None }
    }
}

fn axis(w: &mut ObjWriter, name: &str, nbins: i32, xmin: f64, xmax: f64, edges: Option<&[f64]>) {
    let at = w.begin(10);
    w.tnamed(name, "");
    w.opaque(4, 26); // TAttAxis
    w.i32(nbins);
    w.f64(xmin);
    w.f64(xmax);
    match edges {
        Some(e) => {
            w.i32(e.len() as i32);
            for &v in e {
                w.f64(v);
            }
        }
        None => w.i32(0),
    }
    w.i32(1); // fFirst
    w.i32(nbins); // fLast
    w.u16(0); // fBits2
    w.u8(0); // fTimeDisplay
    w.tstring(""); // fTimeFormat
    w.u32(0); // fLabels
    w.u32(0); // fModLabs
    w.end(at);
}

pub fn th1_payload(h: &Hist) -> Vec<u8> {
    let ncells = h.cells.len();
    let mut w = ObjWriter::new(0);
    let outer = w.begin(3);
    let base = w.begin(8);
    w.tnamed(h.name, "test histogram");
    w.opaque(2, 6); // TAttLine
    w.opaque(2, 4); // TAttFill
    w.opaque(2, 8); // TAttMarker
    w.i32(ncells as i32);
    axis(&mut w, "xaxis", ncells as i32 - 2, h.xmin, h.xmax, h.edges);
    axis(&mut w, "yaxis", 1, 0.0, 1.0, None);
    axis(&mut w, "zaxis", 1, 0.0, 1.0, None);
    w.i16(1000); // fBarOffset
    w.i16(1000); // fBarWidth
    let total: f64 = h.cells.iter().sum();
    w.f64(total); // fEntries
    for _ in 0..7 {
        w.f64(0.0);
    }
    w.i32(0); // fContour
    match h.sumw2 {
        Some(s) => {
            w.i32(s.len() as i32);
            for &v in s {
                w.f64(v);
            }
        }
        None => w.i32(0),
    }
    w.tstring(""); // fOption
    w.opaque(5, 14); // fFunctions
    w.i32(0); // fBufferSize
    w.end(base);

    w.i32(ncells as i32);
    for &v in h.cells {
        match h.class {
            "TH1F" => w.f32(v as f32),
            "TH1I" => w.i32(v as i32),
            "TH1S" => w.i16(v as i16),
            "TH1C" => w.u8(v as i8 as u8),
            _ => w.f64(v),
        }
    }
    w.end(outer);
    w.bytes
}

pub fn add_histogram(
    f: &mut FileWriter,
    h: &Hist,
    cycle: i16,
    pdir: Option<u64>,
    frame: Frame,
) -> u64 {
    let payload = th1_payload(h);
    f.add_key(h.class, h.name, "test histogram", cycle, pdir, &payload, frame)
}

// ── trees ───────────────────────────────────────────────────────

/// A leaf to write.
pub struct Leaf<'a> {
    pub class: &'a str,
    pub name: &'a str,
    pub len: i32,
    pub len_type: i32,
    pub unsigned: bool,
}

impl<'a> Leaf<'a> {
    pub fn new(class: &'a str, name: &'a str, len_type: i32) -> Self {
        Self { class, name, len: 1, len_type, unsigned: false }
    }
}

/// A branch to write, with the baskets holding its data.
pub struct Branch<'a> {
    pub name: &'a str,
    pub element: bool,
    pub leaves: Vec<Leaf<'a>>,
    /// First entry number of each basket.
    pub basket_entry: Vec<i64>,
    /// Key offset of each basket.
    pub basket_seek: Vec<u64>,
}

fn leaf(w: &mut ObjWriter, l: &Leaf) {
    let tag = w.class_tag(l.class);
    let outer = w.begin(1);
    let base = w.begin(2);
    w.tnamed(l.name, l.name);
    w.i32(l.len);
    w.i32(l.len_type);
    w.i32(0); // fOffset
    w.u8(0); // fIsRange
    w.u8(l.unsigned as u8);
    w.u32(0); // fLeafCount
    w.end(base);
    w.zeros(2 * l.len_type as usize); // fMinimum, fMaximum
    w.end(outer);
    w.end(tag);
}

fn branch(w: &mut ObjWriter, b: &Branch, entries: i64) {
    let max_baskets = b.basket_seek.len().max(1) + 9;
    let tag = w.class_tag(if b.element { "TBranchElement" } else { "TBranch" });
    let element = if b.element { Some(w.begin(10)) } else { None };
    let at = w.begin(13);
    w.tnamed(b.name, b.name);
    w.opaque(2, 4); // TAttFill
    w.zeros(12); // fCompress, fBasketSize, fEntryOffsetLen
    w.i32(b.basket_seek.len() as i32); // fWriteBasket
    w.i64(entries); // fEntryNumber
    w.opaque(1, 1); // fIOFeatures
    w.i32(0); // fOffset
    w.i32(max_baskets as i32); // fMaxBaskets
    w.i32(1); // fSplitLevel
    w.i64(entries); // fEntries
    w.zeros(24); // fFirstEntry, fTotBytes, fZipBytes
    w.empty_obj_array(); // fBranches

    let leaves = w.obj_array(b.leaves.len() as i32);
    for l in &b.leaves {
        leaf(w, l);
    }
    w.end(leaves);

    w.empty_obj_array(); // fBaskets

    w.u8(1); // fBasketBytes
    for _ in 0..max_baskets {
        w.i32(0);
    }
    w.u8(1); // fBasketEntry
    for i in 0..max_baskets {
        w.i64(b.basket_entry.get(i).copied().unwrap_or(0));
    }
    w.u8(1); // fBasketSeek
    for i in 0..max_baskets {
        w.i64(b.basket_seek.get(i).copied().unwrap_or(0) as i64);
    }
    w.tstring(""); // fFileName
    w.end(at);
    if let Some(e) = element {
        w.tstring(""); // fClassName and the rest
        w.end(e);
    }
    w.end(tag);
}

/// TTree (or TNtuple when `ntuple`) payload for a key of header length `keylen`.
pub fn tree_payload(keylen: usize, name: &str, entries: i64, branches: &[Branch], ntuple: bool) -> Vec<u8> {
    let mut w = ObjWriter::new(keylen);
    let nt = if ntuple { Some(w.begin(2)) } else { None };
    let tree = w.begin(20);
    w.tnamed(name, "test tree");
    w.opaque(2, 6); // TAttLine
    w.opaque(2, 4); // TAttFill
    w.opaque(2, 8); // TAttMarker
    w.i64(entries);
    w.zeros(56);
    w.i32(1); // fNClusterRange
    w.zeros(48);
    w.u8(1); // fClusterRangeEnd
    w.i64(entries);
    w.u8(1); // fClusterSize
    w.i64(1000);
    w.opaque(1, 1); // fIOFeatures

    let arr = w.obj_array(branches.len() as i32);
    for b in branches {
        branch(&mut w, b, entries);
    }
    w.end(arr);
    w.empty_obj_array(); // fLeaves
    w.end(tree);
    if let Some(nt) = nt {
        w.i32(branches.len() as i32); // fNvar
        w.end(nt);
    }
    w.bytes
}

pub fn add_tree(
    f: &mut FileWriter,
    name: &str,
    cycle: i16,
    pdir: Option<u64>,
    entries: i64,
    branches: &[Branch],
    ntuple: bool,
    frame: Frame,
) -> u64 {
    let class = if ntuple { "TNtuple" } else { "TTree" };
    let title = "test tree";
    let payload = tree_payload(key_len(class, name, title), name, entries, branches, ntuple);
    f.add_key(class, name, title, cycle, pdir, &payload, frame)
}

/// Write one basket per chunk of `values` (big-endian `i32`) and return the
/// `(basket_entry, basket_seek)` lists for the branch.
pub fn i32_baskets(f: &mut FileWriter, branch: &str, chunks: &[&[i32]], frame: Frame) -> (Vec<i64>, Vec<u64>) {
    let mut entry = Vec::new();
    let mut seek = Vec::new();
    let mut first = 0i64;
    for chunk in chunks {
        let payload: Vec<u8> = chunk.iter().flat_map(|v| v.to_be_bytes()).collect();
        entry.push(first);
        seek.push(f.add_basket(branch, &payload, frame));
        first += chunk.len() as i64;
    }
    (entry, seek)
}

// ── streamer info ───────────────────────────────────────────────

/// One `TStreamerElement`: element class, name, title, type code, size.
pub type Element<'a> = (&'a str, &'a str, &'a str, i32, i32);

/// `TList` of `TStreamerInfo`, for a StreamerInfo key of header length `keylen`.
pub fn streamer_list(keylen: usize, classes: &[(&str, Vec<Element>)]) -> Vec<u8> {
    let mut w = ObjWriter::new(keylen);
    let list = w.begin(5);
    w.tobject();
    w.tstring("");
    w.i32(classes.len() as i32);
    for (class, elements) in classes {
        let tag = w.class_tag("TStreamerInfo");
        let info = w.begin(9);
        w.tnamed(class, "");
        w.u32(0x1234_5678); // fCheckSum
        w.i32(8); // fClassVersion
        let arr_tag = w.class_tag("TObjArray");
        let arr = w.obj_array(elements.len() as i32);
        for &(element, name, title, code, size) in elements {
            let etag = w.class_tag(element);
            let outer = w.begin(2);
            let base = w.begin(4);
            w.tnamed(name, title);
            w.i32(code);
            w.i32(size);
            w.i32(0); // fArrayLength
            w.i32(0); // fArrayDim
            w.zeros(20); // fMaxIndex
            w.tstring(""); // fTypeName
            w.end(base);
            if element == "TStreamerBase" {
                w.i32(1); // fBaseVersion
            }
            w.end(outer);
            w.end(etag);
        }
        w.end(arr);
        w.end(arr_tag);
        w.end(info);
        w.end(tag);
        w.tstring(""); // link option
    }
    w.end(list);
    w.bytes
}

/// TH1 layout as ROOT describes it, matching [`th1_payload`].
pub fn th1_elements() -> Vec<Element<'static>> {
    let mut e: Vec<Element> = vec![
        ("TStreamerBase", "TNamed", "The basis for a named object", 67, 0),
        ("TStreamerBase", "TAttLine", "Line attributes", 0, 0),
        ("TStreamerBase", "TAttFill", "Fill area attributes", 0, 0),
        ("TStreamerBase", "TAttMarker", "Marker attributes", 0, 0),
        ("TStreamerBasicType", "fNcells", "number of bins(1D)", 3, 4),
        ("TStreamerObject", "fXaxis", "X axis descriptor", 61, 216),
        ("TStreamerObject", "fYaxis", "Y axis descriptor", 61, 216),
        ("TStreamerObject", "fZaxis", "Z axis descriptor", 61, 216),
        ("TStreamerBasicType", "fBarOffset", "(1000*offset) for bar charts", 2, 2),
        ("TStreamerBasicType", "fBarWidth", "(1000*width) for bar charts", 2, 2),
    ];
    for name in
        ["fEntries", "fTsumw", "fTsumw2", "fTsumwx", "fTsumwx2", "fMaximum", "fMinimum", "fNormFactor"]
    {
        e.push(("TStreamerBasicType", name, "", 8, 8));
    }
    e.push(("TStreamerObjectAny", "fContour", "Array to display contour levels", 62, 24));
    e.push(("TStreamerObjectAny", "fSumw2", "Array of sum of squares of weights", 62, 24));
    e.push(("TStreamerString", "fOption", "histogram options", 65, 24));
    e
}

/// TTree layout as ROOT describes it, up to `fLeaves`, matching [`tree_payload`].
pub fn ttree_elements() -> Vec<Element<'static>> {
    let mut e: Vec<Element> = vec![
        ("TStreamerBase", "TNamed", "The basis for a named object", 67, 0),
        ("TStreamerBase", "TAttLine", "Line attributes", 0, 0),
        ("TStreamerBase", "TAttFill", "Fill area attributes", 0, 0),
        ("TStreamerBase", "TAttMarker", "Marker attributes", 0, 0),
        ("TStreamerBasicType", "fEntries", "Number of entries", 16, 8),
    ];
    for name in ["fTotBytes", "fZipBytes", "fSavedBytes", "fFlushedBytes"] {
        e.push(("TStreamerBasicType", name, "", 16, 8));
    }
    e.push(("TStreamerBasicType", "fWeight", "Tree weight", 8, 8));
    for name in ["fTimerInterval", "fScanField", "fUpdate", "fDefaultEntryOffsetLen"] {
        e.push(("TStreamerBasicType", name, "", 3, 4));
    }
    e.push(("TStreamerBasicType", "fNClusterRange", "Number of Cluster range", 6, 4));
    for name in ["fMaxEntries", "fMaxEntryLoop", "fMaxVirtualSize", "fAutoSave", "fAutoFlush", "fEstimate"] {
        e.push(("TStreamerBasicType", name, "", 16, 8));
    }
    e.push(("TStreamerBasicPointer", "fClusterRangeEnd", "[fNClusterRange] Last entry of a cluster range", 56, 8));
    e.push(("TStreamerBasicPointer", "fClusterSize", "[fNClusterRange] Number of entries in each cluster", 56, 8));
    e.push(("TStreamerObjectAny", "fIOFeatures", "IO features", 62, 1));
    e.push(("TStreamerObject", "fBranches", "List of Branches", 61, 64));
    e.push(("TStreamerObject", "fLeaves", "Direct pointers to individual branch leaves", 61, 64));
    e
}

/// TBranch layout as ROOT describes it, matching the branches of [`tree_payload`].
pub fn tbranch_elements() -> Vec<Element<'static>> {
    let mut e: Vec<Element> = vec![
        ("TStreamerBase", "TNamed", "The basis for a named object", 67, 0),
        ("TStreamerBase", "TAttFill", "Fill area attributes", 0, 0),
    ];
    for name in ["fCompress", "fBasketSize", "fEntryOffsetLen", "fWriteBasket"] {
        e.push(("TStreamerBasicType", name, "", 3, 4));
    }
    e.push(("TStreamerBasicType", "fEntryNumber", "Current entry number", 16, 8));
    e.push(("TStreamerObjectAny", "fIOFeatures", "IO features", 62, 1));
    e.push(("TStreamerBasicType", "fOffset", "Offset of this branch", 3, 4));
    e.push(("TStreamerBasicType", "fMaxBaskets", "Maximum number of Baskets so far", 6, 4));
    e.push(("TStreamerBasicType", "fSplitLevel", "Branch split level", 3, 4));
    for name in ["fEntries", "fFirstEntry", "fTotBytes", "fZipBytes"] {
        e.push(("TStreamerBasicType", name, "", 16, 8));
    }
    e.push(("TStreamerObject", "fBranches", "List of Branches of this branch", 61, 64));
    e.push(("TStreamerObject", "fLeaves", "List of leaves of this branch", 61, 64));
    e.push(("TStreamerObject", "fBaskets", "List of baskets of this branch", 61, 64));
    e.push(("TStreamerBasicPointer", "fBasketBytes", "[fMaxBaskets] Length of baskets on file", 43, 8));
    e.push(("TStreamerBasicPointer", "fBasketEntry", "[fMaxBaskets] Table of first entry in each basket", 56, 8));
    e.push(("TStreamerBasicPointer", "fBasketSeek", "[fMaxBaskets] Addresses of baskets on file", 56, 8));
    e.push(("TStreamerString", "fFileName", "Name of file where buffers are stored", 65, 24));
    e
}
