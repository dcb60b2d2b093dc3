//! TTree / TNtuple deserialization: entry count, leaf listing and value
//! extraction from baskets.
//!
//! Field positions come from the `TTree` and `TBranch` layouts in the
//! streamer registry. Only the branch list is decoded structurally:
//!
//! ```text
//! TTree
//!   ├─ fEntries (i64)
//!   └─ fBranches (TObjArray of TBranch / TBranchElement)
//!        └─ TBranch
//!             ├─ TNamed (name, title)
//!             ├─ fWriteBasket (i32)     baskets written
//!             ├─ fLeaves (TObjArray of TLeafX)
//!             ├─ fBaskets (TObjArray)   in-memory baskets, skipped
//!             ├─ fBasketEntry (i64[fMaxBaskets])
//!             └─ fBasketSeek (i64[fMaxBaskets])
//! ```

use crate::error::{Result, RootError};
use crate::key::{ContentType, KeyBuffer};
use crate::layout::{seek_field, CounterCache};
use crate::rbuffer::{Numeric, RBuffer, TagTable};
use crate::streamer::{StreamerInfo, StreamerRegistry};
use crate::tree::{read_value, LeafInfo};

/// Which values [`list_entries`] should extract.
#[derive(Debug, Clone, Copy)]
pub struct EntrySelection<'a> {
    /// Branch name.
    pub branch: &'a str,
    /// Leaf name within the branch.
    pub leaf: &'a str,
    /// Element index within the leaf.
    pub element: usize,
    /// Stop after this many values.
    pub max_entries: usize,
}

/// Header of a `TObjArray`: element count and lower bound.
struct ObjArray {
    n: i32,
    lowb: i32,
}

/// Decoded `TLeaf` fields.
struct Leaf {
    name: String,
    len: usize,
    len_type: usize,
    content_type: ContentType,
    signed: bool,
}

/// Read `fEntries`.
pub fn read_n_entries(payload: &[u8], key: &KeyBuffer, streamers: &StreamerRegistry) -> Result<u64> {
    let ttree = streamers.require("TTree")?;
    let mut r = RBuffer::new(payload);
    let mut counters = CounterCache::default();

    enter_tree(&mut r, key)?;
    seek_field(&mut r, ttree, "", "fEntries", &mut counters)?;
    Ok(r.read::<i64>()?.max(0) as u64)
}

/// Describe every leaf of every branch.
pub fn list_leaves(
    payload: &[u8],
    key: &KeyBuffer,
    streamers: &StreamerRegistry,
) -> Result<Vec<LeafInfo>> {
    let ttree = streamers.require("TTree")?;
    let tbranch = streamers.require("TBranch")?;
    let mut r = RBuffer::new(payload);
    let mut tags = TagTable::for_key(key.keylength);
    let mut counters = CounterCache::default();

    enter_tree(&mut r, key)?;
    seek_field(&mut r, ttree, "", "fEntries", &mut counters)?;
    r.skip(8)?;
    seek_field(&mut r, ttree, "fEntries", "fBranches", &mut counters)?;

    let mut out = Vec::new();
    let branches = read_obj_array(&mut r)?;
    for i in 0..branches.n {
        let class = r.read_object(&mut tags)?;
        if class.is_empty() {
            continue;
        }
        let v = r.read_version()?;
        if i < branches.lowb {
            r.seek_end(v.end)?;
            continue;
        }

        let mut counters = CounterCache::default();
        let branch = enter_branch(&mut r, &class, tbranch, &mut counters)?;
        seek_field(&mut r, tbranch, "TNamed", "fLeaves", &mut counters)?;

        let leaves = read_obj_array(&mut r)?;
        for j in 0..leaves.n {
            let leaf_class = r.read_object(&mut tags)?;
            if leaf_class.is_empty() {
                continue;
            }
            let lv = r.read_version()?;
            if j >= leaves.lowb && is_leaf_class(&leaf_class) {
                let leaf = read_leaf(&mut r, &leaf_class)?;
                out.push(LeafInfo {
                    branch: branch.clone(),
                    leaf: leaf.name,
                    content_type: leaf.content_type,
                    signed: leaf.signed,
                    elements: leaf.len,
                });
            }
            r.seek_end(lv.end)?;
        }
        r.seek_end(v.end)?;
    }
    Ok(out)
}

/// Append the selected leaf element of each entry to `out`.
///
/// `basket` returns the decompressed payload of the basket key at a file
/// offset, or `None` when no such basket was catalogued.
pub fn list_entries<T, F>(
    payload: &[u8],
    key: &KeyBuffer,
    streamers: &StreamerRegistry,
    selection: &EntrySelection,
    basket: F,
    out: &mut Vec<T>,
) -> Result<()>
where
    T: Numeric,
    F: Fn(u64) -> Option<Vec<u8>>,
{
    let ttree = streamers.require("TTree")?;
    let tbranch = streamers.require("TBranch")?;
    let mut r = RBuffer::new(payload);
    let mut tags = TagTable::for_key(key.keylength);
    let mut counters = CounterCache::default();

    enter_tree(&mut r, key)?;
    seek_field(&mut r, ttree, "", "fEntries", &mut counters)?;
    let entries = r.read::<i64>()?.max(0) as usize;
    out.reserve(entries.min(selection.max_entries).min(payload.len()));
    seek_field(&mut r, ttree, "fEntries", "fBranches", &mut counters)?;

    let branches = read_obj_array(&mut r)?;
    for i in 0..branches.n {
        let class = r.read_object(&mut tags)?;
        if class.is_empty() {
            continue;
        }
        let v = r.read_version()?;
        if i < branches.lowb {
            r.seek_end(v.end)?;
            continue;
        }

        let mut counters = CounterCache::default();
        let branch = enter_branch(&mut r, &class, tbranch, &mut counters)?;
        if branch != selection.branch {
            r.seek_end(v.end)?;
            continue;
        }

        seek_field(&mut r, tbranch, "TNamed", "fWriteBasket", &mut counters)?;
        let mut write_basket = r.read::<i32>()?.max(0) as usize;
        seek_field(&mut r, tbranch, "fWriteBasket", "fLeaves", &mut counters)?;

        // Byte layout of one entry across all leaves of the branch.
        let mut entry_size = 0usize;
        let mut slot: Option<(usize, usize, ContentType, bool)> = None;
        let mut slot_len = 0usize;
        let leaves = read_obj_array(&mut r)?;
        for j in 0..leaves.n {
            let leaf_class = r.read_object(&mut tags)?;
            if leaf_class.is_empty() {
                continue;
            }
            let lv = r.read_version()?;
            if j >= leaves.lowb && is_leaf_class(&leaf_class) {
                let leaf = read_leaf(&mut r, &leaf_class)?;
                let bytes = leaf.len * leaf.len_type;
                if leaf.name == selection.leaf {
                    slot = Some((entry_size, leaf.len_type, leaf.content_type, leaf.signed));
                    slot_len = bytes;
                }
                entry_size += bytes;
            }
            r.seek_end(lv.end)?;
        }

        let Some((offset, size, content_type, signed)) = slot else {
            r.seek_end(v.end)?;
            continue;
        };
        if slot_len == 0 {
            r.seek_end(v.end)?;
            continue;
        }
        let in_range = |b: &usize| *b < slot_len;
        let Some(element_at) = selection.element.checked_mul(size).filter(in_range) else {
            log::warn!(
                "element {} out of range for {}/{}",
                selection.element,
                selection.branch,
                selection.leaf
            );
            break;
        };
        let value_at = offset + element_at;

        seek_field(&mut r, tbranch, "fLeaves", "fBaskets", &mut counters)?;
        r.skip_objects(1)?;
        // fBasketBytes heap flag; each array skip below also eats the next flag.
        r.skip(1)?;
        let after_baskets = r.pos();

        seek_field(&mut r, tbranch, "fBaskets", "fBasketEntry", &mut counters)?;
        for b in 0..write_basket {
            let first = r.read::<i64>()?;
            if first > selection.max_entries as i64 {
                write_basket = b;
                break;
            }
        }

        r.set_pos(after_baskets);
        seek_field(&mut r, tbranch, "fBaskets", "fBasketSeek", &mut counters)?;
        for _ in 0..write_basket {
            let seek = r.read::<i64>()?.max(0) as u64;
            let Some(bytes) = basket(seek) else {
                log::warn!("no basket key at offset {} for branch {}", seek, branch);
                continue;
            };
            extract(&bytes, entry_size, value_at, content_type, signed, selection.max_entries, out)?;
        }
        r.seek_end(v.end)?;
    }
    Ok(())
}

/// Read one value per `entry_size`-byte entry, starting `value_at` bytes in.
fn extract<T: Numeric>(
    bytes: &[u8],
    entry_size: usize,
    value_at: usize,
    content_type: ContentType,
    signed: bool,
    max_entries: usize,
    out: &mut Vec<T>,
) -> Result<()> {
    if entry_size == 0 {
        return Ok(());
    }
    let mut br = RBuffer::new(bytes);
    let mut pos = 0;
    while bytes.len() - pos >= entry_size && out.len() < max_entries {
        br.set_pos(pos + value_at);
        out.push(read_value::<T>(&mut br, content_type, signed)?);
        pos += entry_size;
    }
    Ok(())
}

/// Consume the tree's leading version headers.
fn enter_tree(r: &mut RBuffer, key: &KeyBuffer) -> Result<()> {
    if key.content_type == ContentType::NTuple {
        r.read_version()?;
    }
    r.read_version()?;
    Ok(())
}

/// Position after the branch's `TNamed` and return the branch name.
fn enter_branch(
    r: &mut RBuffer,
    class: &str,
    tbranch: &[StreamerInfo],
    counters: &mut CounterCache,
) -> Result<String> {
    if class == "TBranchElement" {
        r.read_version()?; // TBranch
    }
    seek_field(r, tbranch, "", "TNamed", counters)?;
    r.read_version()?;
    r.skip_tobject()?;
    let name = r.read_string()?;
    r.read_string()?; // title
    Ok(name)
}

fn read_obj_array(r: &mut RBuffer) -> Result<ObjArray> {
    r.read_version()?;
    r.skip_tobject()?;
    r.read_string()?; // fName
    let n = r.read::<i32>()?;
    let lowb = r.read::<i32>()?;
    if n < 0 {
        return Err(RootError::Deserialization(format!("TObjArray of {} elements", n)));
    }
    Ok(ObjArray { n, lowb })
}

fn is_leaf_class(class: &str) -> bool {
    class.len() == 6 && class.starts_with("TLeaf")
}

/// Read the `TLeaf` base of a `TLeafX` whose own version header was consumed.
fn read_leaf(r: &mut RBuffer, class: &str) -> Result<Leaf> {
    r.read_version()?; // TLeaf
    r.read_version()?; // TNamed
    r.skip_tobject()?;
    let name = r.read_string()?;
    r.read_string()?; // title
    let len = r.read::<i32>()?.max(0) as usize;
    let len_type = r.read::<i32>()?.max(0) as usize;
    r.skip(5)?; // fOffset, fIsRange
    let unsigned = r.read::<bool>()?;

    let content_type = ContentType::from_leaf_class(class);
    if content_type.byte_size() != len_type {
        log::warn!(
            "leaf {} ({}) declares {} bytes per value, expected {}",
            name,
            class,
            len_type,
            content_type.byte_size()
        );
    }
    Ok(Leaf { name, len, len_type, content_type, signed: !unsigned })
}
