//! Tensor meta (C4) and index map (C3) records, and their on-disk encoding.
//!
//! Both records are serialized as a one-byte format version followed by a
//! `bincode` encoding of a `serde`-derived struct — an explicit, versioned,
//! field-tagged format, replacing the original implementation's
//! language-specific pickling.

use crate::dtype::DType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Current on-disk format version for meta and index-map records.
const FORMAT_VERSION: u8 = 1;

/// Per-tensor header: element type, sample count, shape bounds, chunk size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorMeta {
    /// Target chunk length used when this tensor was written.
    pub chunk_size: usize,
    /// Element type name (see [`DType::name`]).
    pub dtype: String,
    /// Number of samples in the tensor.
    pub length: usize,
    /// Component-wise minimum shape over all samples.
    pub min_shape: Vec<usize>,
    /// Component-wise maximum shape over all samples.
    pub max_shape: Vec<usize>,
}

impl TensorMeta {
    /// Build a new meta record for a freshly-written batch whose samples all
    /// share `sample_shape` (the writer updates `min_shape`/`max_shape` as
    /// further samples of differing shape are written).
    pub fn new(chunk_size: usize, dtype: DType, length: usize, sample_shape: Vec<usize>) -> Self {
        Self {
            chunk_size,
            dtype: dtype.name().to_string(),
            length,
            min_shape: sample_shape.clone(),
            max_shape: sample_shape,
        }
    }

    /// Parse this meta record's dtype name back into a [`DType`].
    pub fn parsed_dtype(&self, key: &str) -> Result<DType> {
        DType::from_name(&self.dtype).ok_or_else(|| Error::MalformedMeta {
            key: key.to_string(),
            reason: format!("unknown element type name {:?}", self.dtype),
        })
    }

    /// Whether every sample in this tensor shares an identical shape
    /// (`min_shape == max_shape`), the precondition for stacking a read
    /// into a single atomic array.
    pub fn has_uniform_shape(&self) -> bool {
        self.min_shape == self.max_shape
    }

    /// Serialize this record to its versioned on-disk bytes.
    pub fn encode(&self) -> Vec<u8> {
        encode_record(self)
    }

    /// Decode a meta record previously produced by [`TensorMeta::encode`].
    pub fn decode(key: &str, bytes: &[u8]) -> Result<Self> {
        decode_record(bytes).map_err(|reason| Error::MalformedMeta {
            key: key.to_string(),
            reason,
        })
    }
}

/// One sample's position within its tensor's chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Ordered list of chunk ids this sample's bytes span.
    pub chunk_names: Vec<String>,
    /// Byte offset within `chunk_names[0]` where this sample begins.
    pub start_byte: usize,
    /// Byte offset within `chunk_names[last]` where this sample ends (exclusive).
    pub end_byte: usize,
    /// This sample's logical shape.
    pub shape: Vec<usize>,
}

/// Ordered list of per-sample index entries, one per sample index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexMap {
    /// Entries in sample order.
    pub entries: Vec<IndexEntry>,
}

impl IndexMap {
    /// An empty index map.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Serialize this record to its versioned on-disk bytes.
    pub fn encode(&self) -> Vec<u8> {
        encode_record(self)
    }

    /// Decode an index map previously produced by [`IndexMap::encode`].
    pub fn decode(key: &str, bytes: &[u8]) -> Result<Self> {
        decode_record(bytes).map_err(|reason| Error::MalformedIndex {
            key: key.to_string(),
            reason,
        })
    }
}

fn encode_record<T: Serialize>(value: &T) -> Vec<u8> {
    let mut out = vec![FORMAT_VERSION];
    bincode::serialize_into(&mut out, value).expect("in-memory bincode serialization cannot fail");
    out
}

fn decode_record<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> std::result::Result<T, String> {
    let (version, body) = bytes
        .split_first()
        .ok_or_else(|| "empty record".to_string())?;
    if *version != FORMAT_VERSION {
        return Err(format!(
            "unsupported format version {} (expected {})",
            version, FORMAT_VERSION
        ));
    }
    bincode::deserialize(body).map_err(|e| e.to_string())
}

/// Key under which a tensor's meta record is stored, relative to its root key.
pub fn meta_key(key: &str) -> String {
    format!("{key}/meta.json")
}

/// Key under which a tensor's index map is stored, relative to its root key.
pub fn index_map_key(key: &str) -> String {
    format!("{key}/index_map.json")
}

/// Key under which one of a tensor's chunks is stored.
pub fn chunk_key(key: &str, chunk_id: &str) -> String {
    format!("{key}/chunks/{chunk_id}")
}
