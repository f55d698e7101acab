//! Error types and handling for the chunked array storage engine.
//!
//! This module defines every failure mode the engine can raise, each tagged
//! to the layer that raises it (provider, writer, reader, cache tier, view).

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the chunked array storage engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A key was not present in the storage provider (or anywhere in a cache chain).
    #[error("key not found: {0}")]
    NotFound(String),

    /// The writer refused to overwrite an existing tensor.
    #[error("tensor already exists: {0}")]
    AlreadyExists(String),

    /// An operation the current revision does not implement (sliced assignment, partial overwrite).
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A tensor's meta record could not be decoded, or violates the data model's invariants.
    #[error("malformed tensor meta for {key}: {reason}")]
    MalformedMeta {
        /// Tensor key the meta record belongs to.
        key: String,
        /// Human-readable description of what was wrong.
        reason: String,
    },

    /// A tensor's index map could not be decoded, or violates the data model's invariants.
    #[error("malformed index map for {key}: {reason}")]
    MalformedIndex {
        /// Tensor key the index map belongs to.
        key: String,
        /// Human-readable description of what was wrong.
        reason: String,
    },

    /// A chunk's fetched length was inconsistent with the index entry referencing it.
    #[error("corrupt chunk {chunk_id} for {key}: expected at least {expected} bytes, got {actual}")]
    CorruptChunk {
        /// Tensor key the chunk belongs to.
        key: String,
        /// Chunk identifier.
        chunk_id: String,
        /// Minimum number of bytes the index entry requires from this chunk.
        expected: usize,
        /// Number of bytes actually returned by the provider.
        actual: usize,
    },

    /// A storage backend failure, wrapped for the caller to inspect or retry.
    #[error("storage transport error: {0}")]
    Transport(String),

    /// A configuration value could not be loaded or was invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error surfaced by a backend or by config-file loading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    /// Shorthand for [`Error::AlreadyExists`].
    pub fn already_exists(key: impl Into<String>) -> Self {
        Self::AlreadyExists(key.into())
    }

    /// Shorthand for [`Error::Unsupported`].
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Shorthand for [`Error::Transport`].
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Whether a caller may reasonably retry the operation that produced this error.
    ///
    /// Only backend transport failures are retryable; everything else reflects a
    /// structural problem (bad key, corrupt data, unsupported call) that retrying
    /// will not fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
