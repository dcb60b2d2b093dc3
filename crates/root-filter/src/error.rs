//! Error types for ROOT file reading.

use thiserror::Error;

/// Errors that can occur reading ROOT files.
///
/// The `RootData` query surface never hands these to callers for malformed
/// data; they travel between the decoders and are turned into empty results
/// (plus a log line) at the component boundary.
#[derive(Error, Debug)]
pub enum RootError {
    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid ROOT file magic bytes.
    #[error("not a ROOT file (bad magic)")]
    BadMagic,

    /// Buffer underflow (tried to read past end).
    #[error("unexpected end of buffer at offset {offset}, need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Current offset in buffer.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes remaining.
        have: usize,
    },

    /// Key not found in the catalog.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Unsupported object class.
    #[error("unsupported class: {0}")]
    UnsupportedClass(String),

    /// Decompression failure.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Object deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Malformed column specifier or object selector.
    #[error("invalid column: {0}")]
    InvalidColumn(String),

    /// Filter configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias for ROOT operations.
pub type Result<T> = std::result::Result<T, RootError>;
