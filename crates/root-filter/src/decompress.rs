//! Key payload materialization (passthrough, zlib, LZ4).
//!
//! The compression frame was already validated while scanning, so a
//! `KeyBuffer` knows exactly where its stored bytes start and how long the
//! payload must be once inflated. Anything other than an exact length match
//! is a failed read.

use std::io::Read;

use crate::datasource::DataSource;
use crate::error::{Result, RootError};
use crate::key::{Compression, ContentType, KeyBuffer};

/// Return the decompressed payload of `buffer`, or an empty vector on failure.
pub fn data(source: &DataSource, buffer: &KeyBuffer) -> Vec<u8> {
    match payload(source, buffer) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("cannot read payload of '{}': {}", buffer.name, e);
            Vec::new()
        }
    }
}

/// Fallible form of [`data`].
pub fn payload(source: &DataSource, buffer: &KeyBuffer) -> Result<Vec<u8>> {
    if buffer.content_type == ContentType::Invalid {
        return Err(RootError::Decompression("key has no payload bounds".into()));
    }

    let stored_len = match buffer.compression {
        Compression::None => buffer.count,
        Compression::Zlib | Compression::Lz4 => buffer.compressed_count,
    };
    let stored = source.range(buffer.start, stored_len).ok_or(RootError::BufferUnderflow {
        offset: buffer.start as usize,
        need: stored_len,
        have: source.len().saturating_sub(buffer.start as usize),
    })?;

    let out = match buffer.compression {
        Compression::None => return Ok(stored.to_vec()),
        Compression::Zlib => decompress_zlib(stored, buffer.count)?,
        Compression::Lz4 => decompress_lz4(stored, buffer.count)?,
    };

    if out.len() != buffer.count {
        return Err(RootError::Decompression(format!(
            "expected {} uncompressed bytes, got {}",
            buffer.count,
            out.len()
        )));
    }
    Ok(out)
}

fn decompress_zlib(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    use flate2::read::ZlibDecoder;

    // One byte of slack is enough to notice a stream that inflates too far.
    let mut decoder = ZlibDecoder::new(data).take(expected as u64 + 1);
    let mut out = Vec::with_capacity(expected);
    decoder.read_to_end(&mut out).map_err(|e| RootError::Decompression(format!("zlib: {}", e)))?;
    Ok(out)
}

fn decompress_lz4(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    lz4_flex::block::decompress(data, expected)
        .map_err(|e| RootError::Decompression(format!("lz4: {}", e)))
}
