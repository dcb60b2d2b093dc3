//! Public types for tree leaves, and decoding of one leaf value.

use crate::error::Result;
use crate::key::ContentType;
use crate::rbuffer::{Numeric, RBuffer};

/// Description of one leaf of a tree branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafInfo {
    /// Branch name.
    pub branch: String,
    /// Leaf name.
    pub leaf: String,
    /// Value type.
    pub content_type: ContentType,
    /// Whether integer values are signed.
    pub signed: bool,
    /// Values per entry (`fLen`).
    pub elements: usize,
}

impl LeafInfo {
    /// Column names for this leaf: `branch` when the leaf is named after its
    /// branch, `branch/leaf` otherwise, with `[i]` appended per element when
    /// the leaf holds more than one value.
    pub fn column_names(&self) -> Vec<String> {
        let base = if self.leaf == self.branch {
            self.branch.clone()
        } else {
            format!("{}/{}", self.branch, self.leaf)
        };
        if self.elements > 1 {
            (0..self.elements).map(|i| format!("{}[{}]", base, i)).collect()
        } else {
            vec![base]
        }
    }
}

/// Read one value stored as `content_type` and convert it to `T`.
///
/// Types without a numeric reading (C strings) are read as a single char.
pub fn read_value<T: Numeric>(r: &mut RBuffer, content_type: ContentType, signed: bool) -> Result<T> {
    match (content_type, signed) {
        (ContentType::Double, _) => r.read_cast::<f64, T>(),
        (ContentType::Float, _) => r.read_cast::<f32, T>(),
        (ContentType::Long, true) => r.read_cast::<i64, T>(),
        (ContentType::Long, false) => r.read_cast::<u64, T>(),
        (ContentType::Int, true) => r.read_cast::<i32, T>(),
        (ContentType::Int, false) => r.read_cast::<u32, T>(),
        (ContentType::Short, true) => r.read_cast::<i16, T>(),
        (ContentType::Short, false) => r.read_cast::<u16, T>(),
        (ContentType::Byte, false) => r.read_cast::<u8, T>(),
        (ContentType::Bool, _) => r.read_cast::<bool, T>(),
        _ => r.read_cast::<i8, T>(),
    }
}
