//! TKey records: the header ROOT writes in front of every stored object, and
//! the `KeyBuffer` the scanner keeps to materialize the payload later.

use crate::error::Result;
use crate::rbuffer::RBuffer;

/// Extra header bytes a `TBasket` key carries after its title
/// (fVersion, fBufferSize, fNevBufSize, fNevBuf, fLast, flag).
pub const BASKET_HEADER_LEN: usize = 19;
/// Compression frame: algorithm tag, method byte, 3-byte compressed and uncompressed sizes.
pub const COMPRESSION_HEADER_LEN: usize = 9;
/// ROOT's LZ4 frames start with an xxhash64 checksum of the compressed block.
pub const LZ4_CHECKSUM_LEN: usize = 8;

/// What a key (or a leaf) holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Not something this reader understands.
    Invalid,
    /// 64-bit float (`TH1D`, `TLeafD`).
    Double,
    /// 32-bit float (`TH1F`, `TLeafF`).
    Float,
    /// 32-bit integer (`TH1I`, `TLeafI`).
    Int,
    /// 16-bit integer (`TH1S`, `TLeafS`).
    Short,
    /// 8-bit integer (`TH1C`, `TLeafB`).
    Byte,
    /// Boolean (`TLeafO`).
    Bool,
    /// C string (`TLeafC`).
    CString,
    /// 64-bit integer (`TLeafL`).
    Long,
    /// `TTree`.
    Tree,
    /// `TNtuple` / `TNtupleD`.
    NTuple,
    /// `TBasket`: a chunk of branch data.
    Basket,
    /// The file's `StreamerInfo` list.
    Streamer,
}

impl ContentType {
    /// Classify a key by its class name (and, for lists, its object name).
    pub fn classify(class_name: &str, name: &str) -> Self {
        match class_name {
            "TTree" => ContentType::Tree,
            "TBasket" => ContentType::Basket,
            "TList" if name == "StreamerInfo" => ContentType::Streamer,
            c if c.starts_with("TNtuple") => ContentType::NTuple,
            c if c.len() == 4 && c.starts_with("TH1") => match c.as_bytes()[3] {
                b'D' => ContentType::Double,
                b'F' => ContentType::Float,
                b'I' => ContentType::Int,
                b'S' => ContentType::Short,
                b'C' => ContentType::Byte,
                _ => ContentType::Invalid,
            },
            _ => ContentType::Invalid,
        }
    }

    /// Map a `TLeafX` class name to the type of its values.
    pub fn from_leaf_class(class_name: &str) -> Self {
        match class_name.strip_prefix("TLeaf") {
            Some("D") => ContentType::Double,
            Some("F") => ContentType::Float,
            Some("L") => ContentType::Long,
            Some("I") => ContentType::Int,
            Some("S") => ContentType::Short,
            Some("B") => ContentType::Byte,
            Some("O") => ContentType::Bool,
            Some("C") => ContentType::CString,
            _ => ContentType::Invalid,
        }
    }

    /// Width in bytes of one value, 0 for non-scalar types.
    pub fn byte_size(self) -> usize {
        match self {
            ContentType::Double | ContentType::Long => 8,
            ContentType::Float | ContentType::Int => 4,
            ContentType::Short => 2,
            ContentType::Byte | ContentType::Bool | ContentType::CString => 1,
            _ => 0,
        }
    }

    /// Whether this is one of the `TH1x` storage types.
    pub fn is_histogram(self) -> bool {
        matches!(
            self,
            ContentType::Double
                | ContentType::Float
                | ContentType::Int
                | ContentType::Short
                | ContentType::Byte
        )
    }

    /// Whether this is a `TTree` or `TNtuple`.
    pub fn is_tree(self) -> bool {
        matches!(self, ContentType::Tree | ContentType::NTuple)
    }
}

/// How a key payload is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Raw bytes.
    None,
    /// zlib stream (`"ZL"`).
    Zlib,
    /// LZ4 block (`"L4"`).
    Lz4,
}

/// Catalog entry for one stored object.
#[derive(Debug, Clone)]
pub struct KeyBuffer {
    /// Kind of object.
    pub content_type: ContentType,
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
    /// Cycle number; the highest cycle of a name is the current object.
    pub cycle: i16,
    /// Bytes of key header preceding the payload.
    pub keylength: usize,
    /// Payload storage.
    pub compression: Compression,
    /// Absolute file offset of the (possibly compressed) payload bytes.
    pub start: u64,
    /// Stored byte length.
    pub compressed_count: usize,
    /// Byte length after decompression.
    pub count: usize,
    /// Bins, entries or rows; filled once the scan is complete.
    pub nrows: usize,
}

/// The fixed part of a key record.
#[derive(Debug, Clone)]
pub struct KeyHeader {
    /// Total record length, key header included. Negative marks a free record.
    pub n_bytes: i32,
    /// Key class version; above 1000 the seek fields are 64-bit.
    pub version: i16,
    /// Uncompressed object length.
    pub obj_len: u32,
    /// Length of the key header itself.
    pub key_len: u16,
    /// Cycle number.
    pub cycle: i16,
    /// Position of this key.
    pub seek_key: u64,
    /// Position of the directory holding this key.
    pub seek_pdir: u64,
    /// Class name of the stored object.
    pub class_name: String,
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
}

impl KeyHeader {
    /// Read a key header at the current position.
    pub fn read(r: &mut RBuffer) -> Result<Self> {
        let n_bytes = r.read::<i32>()?;
        let version = r.read::<i16>()?;
        let obj_len = r.read::<u32>()?;
        r.skip(4)?; // fDatime
        let key_len = r.read::<u16>()?;
        let cycle = r.read::<i16>()?;

        let (seek_key, seek_pdir) = if version > 1000 {
            (r.read::<u64>()?, r.read::<u64>()?)
        } else {
            (r.read::<u32>()? as u64, r.read::<u32>()? as u64)
        };

        let class_name = r.read_pascal_string()?;
        let name = r.read_pascal_string()?;
        let title = r.read_pascal_string()?;

        Ok(KeyHeader {
            n_bytes,
            version,
            obj_len,
            key_len,
            cycle,
            seek_key,
            seek_pdir,
            class_name,
            name,
            title,
        })
    }

    /// Build the catalog entry for a classified key.
    ///
    /// `r` must sit right after the title. A compression frame that does not
    /// match the record's declared sizes, or uses an unsupported algorithm,
    /// yields an `Invalid` buffer so the scanner drops the key.
    pub fn to_buffer(
        &self,
        content_type: ContentType,
        offset: u64,
        r: &mut RBuffer,
        file_compressed: bool,
    ) -> Result<KeyBuffer> {
        if content_type == ContentType::Basket {
            r.skip(BASKET_HEADER_LEN)?;
        }

        let keylength = self.key_len as usize;
        let stored = (self.n_bytes as usize).saturating_sub(keylength);
        let count = self.obj_len as usize;
        let mut buffer = KeyBuffer {
            content_type,
            name: self.name.clone(),
            title: self.title.clone(),
            cycle: self.cycle,
            keylength,
            compression: Compression::None,
            start: offset + keylength as u64,
            compressed_count: count,
            count,
            nrows: 0,
        };

        if !file_compressed || stored == count {
            return Ok(buffer);
        }

        let tag = r.read_bytes(2)?;
        let compression = match tag {
            b"ZL" => Compression::Zlib,
            b"L4" => Compression::Lz4,
            other => {
                log::debug!(
                    "dropping key '{}': unsupported compression {:?}",
                    self.name,
                    String::from_utf8_lossy(other)
                );
                buffer.content_type = ContentType::Invalid;
                return Ok(buffer);
            }
        };

        let header = r.read_bytes(COMPRESSION_HEADER_LEN - 2)?;
        let c_size = read_le24(&header[1..4]);
        let u_size = read_le24(&header[4..7]);
        if c_size != stored.saturating_sub(COMPRESSION_HEADER_LEN) || u_size != count {
            log::debug!(
                "dropping key '{}': compression frame {}/{} does not match record {}/{}",
                self.name,
                c_size,
                u_size,
                stored.saturating_sub(COMPRESSION_HEADER_LEN),
                count
            );
            buffer.content_type = ContentType::Invalid;
            return Ok(buffer);
        }

        buffer.compression = compression;
        buffer.start = offset + (keylength + COMPRESSION_HEADER_LEN) as u64;
        buffer.compressed_count = c_size;
        if compression == Compression::Lz4 {
            buffer.start += LZ4_CHECKSUM_LEN as u64;
            buffer.compressed_count = c_size.saturating_sub(LZ4_CHECKSUM_LEN);
        }
        Ok(buffer)
    }
}

/// Read a 3-byte little-endian unsigned integer.
pub fn read_le24(b: &[u8]) -> usize {
    b[0] as usize | ((b[1] as usize) << 8) | ((b[2] as usize) << 16)
}
