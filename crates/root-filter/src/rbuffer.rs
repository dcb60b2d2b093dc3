//! Binary reader for ROOT's big-endian serialization format.
//!
//! Besides plain scalars this covers ROOT's variable-length encodings: the
//! object version header, `TString`, the key-record Pascal string and the
//! class-tag references used by `TObjArray`/`TList` elements.

use std::collections::HashMap;

use crate::error::{Result, RootError};

/// `kByteCountMask`: set on the first u32 of a versioned object that carries a byte count.
pub const K_BYTE_COUNT_MASK: u32 = 0x4000_0000;
/// `kNewClassTag`: a class name follows inline.
pub const K_NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
/// `kClassMask`: marks a back-reference to an already streamed class.
pub const K_CLASS_MASK: u32 = 0x8000_0000;
/// `kMapOffset`: ROOT shifts every map position by two so that zero stays the null tag.
pub const K_MAP_OFFSET: usize = 2;

/// A fixed-width value stored most-significant byte first.
pub trait Scalar: Copy {
    /// Width on disk.
    const SIZE: usize;

    /// Decode from exactly `SIZE` big-endian bytes.
    fn from_be(bytes: &[u8]) -> Self;

    /// Numeric conversion into an output type.
    fn cast<U: Numeric>(self) -> U;
}

/// Output types that any on-disk ROOT scalar can be converted into.
pub trait Numeric: Copy + Default {
    /// Convert from a signed integer.
    fn from_i64(v: i64) -> Self;
    /// Convert from an unsigned integer.
    fn from_u64(v: u64) -> Self;
    /// Convert from a floating-point value.
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_scalar {
    ($($t:ty => $from:ident as $wide:ty),* $(,)?) => {$(
        impl Scalar for $t {
            const SIZE: usize = std::mem::size_of::<$t>();

            #[inline]
            fn from_be(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(&bytes[..Self::SIZE]);
                <$t>::from_be_bytes(raw)
            }

            #[inline]
            fn cast<U: Numeric>(self) -> U {
                U::$from(self as $wide)
            }
        }
    )*};
}

impl_scalar! {
    i8 => from_i64 as i64,
    u8 => from_u64 as u64,
    i16 => from_i64 as i64,
    u16 => from_u64 as u64,
    i32 => from_i64 as i64,
    u32 => from_u64 as u64,
    i64 => from_i64 as i64,
    u64 => from_u64 as u64,
    f32 => from_f64 as f64,
    f64 => from_f64 as f64,
}

impl Scalar for bool {
    const SIZE: usize = 1;

    #[inline]
    fn from_be(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn cast<U: Numeric>(self) -> U {
        U::from_u64(self as u64)
    }
}

macro_rules! impl_numeric {
    ($($t:ty),* $(,)?) => {$(
        impl Numeric for $t {
            #[inline]
            fn from_i64(v: i64) -> Self { v as $t }
            #[inline]
            fn from_u64(v: u64) -> Self { v as $t }
            #[inline]
            fn from_f64(v: f64) -> Self { v as $t }
        }
    )*};
}

impl_numeric!(f64, f32, i64, u64, i32, u32, i16, u16, i8, u8);

/// Decoded object version header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectVersion {
    /// Class version of the streamed object.
    pub version: i16,
    /// Byte count as written (version bytes included), or 2 for headers without one.
    pub byte_count: usize,
    /// Absolute buffer position where the object ends.
    pub end: usize,
}

/// Class names seen so far in one buffer, keyed by their ROOT map position.
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    displacement: usize,
    classes: HashMap<usize, String>,
}

impl TagTable {
    /// Tag table for an object whose payload starts `displacement` bytes into ROOT's buffer.
    pub fn new(displacement: usize) -> Self {
        Self { displacement, classes: HashMap::new() }
    }

    /// Tag table for a key payload: ROOT positions count from the start of the key record.
    pub fn for_key(keylength: usize) -> Self {
        Self::new(keylength + K_MAP_OFFSET)
    }

    fn lookup(&self, tag: usize) -> Option<&str> {
        self.classes.get(&tag).map(String::as_str)
    }
}

/// A cursor-based reader over a byte slice, using ROOT's big-endian conventions.
pub struct RBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RBuffer<'a> {
    /// Create a new reader over the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Total length of underlying buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remaining bytes from current position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Set read position absolutely. Positions past the end make every later read fail.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Skip `n` bytes forward.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read a sub-slice of `n` bytes, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read one big-endian scalar.
    #[inline]
    pub fn read<T: Scalar>(&mut self) -> Result<T> {
        let bytes = self.read_bytes(T::SIZE)?;
        Ok(T::from_be(bytes))
    }

    /// Read a `T` and convert it numerically to `U`.
    #[inline]
    pub fn read_cast<T: Scalar, U: Numeric>(&mut self) -> Result<U> {
        Ok(self.read::<T>()?.cast())
    }

    /// Read `n` big-endian f64 values into a Vec.
    pub fn read_array_f64(&mut self, n: usize) -> Result<Vec<f64>> {
        self.ensure(n.saturating_mul(8))?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.read::<f64>()?);
        }
        Ok(out)
    }

    /// Read a ROOT `TString`.
    ///
    /// Format: length byte (if < 255), or 255 + u32 length, then the bytes.
    /// A zero length byte is the empty string and consumes nothing further.
    pub fn read_string(&mut self) -> Result<String> {
        let first = self.read::<u8>()?;
        let len = if first == 255 { self.read::<u32>()? as usize } else { first as usize };
        if len == 0 {
            return Ok(String::new());
        }
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a key-record string: one length byte and the raw bytes.
    pub fn read_pascal_string(&mut self) -> Result<String> {
        let len = self.read::<u8>()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a NUL-terminated string (class names in class tags).
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let len = rest.iter().position(|&b| b == 0).ok_or(RootError::BufferUnderflow {
            offset: self.pos,
            need: rest.len() + 1,
            have: rest.len(),
        })?;
        let s = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(s)
    }

    /// Read a ROOT streamer version header.
    ///
    /// If the first u32 has `kByteCountMask` set, its low 30 bits are the byte
    /// count (measured from right after the u32, version included) and a u16
    /// version follows. Otherwise there is no byte count: the cursor backs up
    /// to re-read the first two bytes as the version, and the object is taken
    /// to span two more bytes.
    pub fn read_version(&mut self) -> Result<ObjectVersion> {
        let start = self.pos;
        let raw = self.read::<u32>()?;
        if raw & K_BYTE_COUNT_MASK != 0 {
            let byte_count = (raw & !K_BYTE_COUNT_MASK) as usize;
            let version = self.read::<i16>()?;
            Ok(ObjectVersion { version, byte_count, end: start + 4 + byte_count })
        } else {
            self.pos = start;
            let version = self.read::<i16>()?;
            Ok(ObjectVersion { version, byte_count: 2, end: self.pos + 2 })
        }
    }

    /// Skip `n` consecutive versioned objects.
    pub fn skip_objects(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            let v = self.read_version()?;
            self.seek_end(v.end)?;
        }
        Ok(())
    }

    /// Skip a `TObject` header: version plus fUniqueID and fBits.
    pub fn skip_tobject(&mut self) -> Result<()> {
        self.read_version()?;
        self.skip(8)
    }

    /// Move to the end of an object, failing if it lies beyond the buffer.
    pub fn seek_end(&mut self, end: usize) -> Result<()> {
        if end > self.data.len() {
            return Err(RootError::BufferUnderflow {
                offset: self.pos,
                need: end.saturating_sub(self.pos),
                have: self.remaining(),
            });
        }
        self.pos = end;
        Ok(())
    }

    /// Read the class reference that precedes a polymorphic collection element.
    ///
    /// Returns the class name, or an empty string when no object follows.
    /// New class names are recorded in `tags` so later elements can refer back.
    pub fn read_object(&mut self, tags: &mut TagTable) -> Result<String> {
        let tag = self.read::<u32>()?;
        if tag & K_BYTE_COUNT_MASK == 0 {
            return Ok(String::new());
        }
        let tag_pos = self.pos;
        let class_tag = self.read::<u32>()?;
        if class_tag == K_NEW_CLASS_TAG {
            let name = self.read_cstring()?;
            tags.classes.insert(tag_pos + tags.displacement, name.clone());
            Ok(name)
        } else {
            let key = (class_tag & !K_CLASS_MASK) as usize;
            match tags.lookup(key) {
                Some(name) => Ok(name.to_string()),
                None => Err(RootError::Deserialization(format!(
                    "class reference {:#010x} at {} not seen before",
                    class_tag, tag_pos
                ))),
            }
        }
    }

    // ── internal ────────────────────────────────────────────────

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos.saturating_add(n) > self.data.len() {
            return Err(RootError::BufferUnderflow {
                offset: self.pos,
                need: n,
                have: self.data.len().saturating_sub(self.pos),
            });
        }
        Ok(())
    }
}
