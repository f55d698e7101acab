//! Writer (C5): chunks a batched array into chunk blobs, builds a tensor's
//! meta and index map, and persists all three via a storage provider.
//!
//! Grounded directly on the original implementation's `write_array` /
//! `_write_sample` / `_write_bytes` / `_get_last_chunk`.

use crate::array::Array;
use crate::chunk::{new_chunk_id, ChunkSplitter};
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::meta::{chunk_key, index_map_key, meta_key, IndexEntry, IndexMap, TensorMeta};
use crate::provider::StorageProvider;

/// Write a batch of samples to `key` via `provider`, chunked at `chunk_size` bytes.
///
/// `samples` must be non-empty; every sample is serialized with
/// [`Array::to_bytes`] (canonical little-endian, row-major).
///
/// # Errors
///
/// Returns [`Error::AlreadyExists`] if a tensor is already stored at `key`.
pub fn write_array<T: Element>(
    key: &str,
    provider: &dyn StorageProvider,
    chunk_size: usize,
    samples: &[Array<T>],
) -> Result<()> {
    assert!(!samples.is_empty(), "write_array requires at least one sample");
    assert!(chunk_size > 0, "chunk_size must be nonzero");

    let meta_k = meta_key(key);
    let index_k = index_map_key(key);
    if provider.contains(&meta_k)? || provider.contains(&index_k)? {
        return Err(Error::already_exists(key));
    }

    let mut index = IndexMap::new();
    let mut min_shape = samples[0].shape().to_vec();
    let mut max_shape = samples[0].shape().to_vec();

    for sample in samples {
        let entry = write_sample(key, provider, chunk_size, &index, sample)?;
        for (axis, len) in sample.shape().iter().enumerate() {
            if *len < min_shape[axis] {
                min_shape[axis] = *len;
            }
            if *len > max_shape[axis] {
                max_shape[axis] = *len;
            }
        }
        index.entries.push(entry);
    }

    let meta = TensorMeta {
        chunk_size,
        dtype: T::DTYPE.name().to_string(),
        length: samples.len(),
        min_shape,
        max_shape,
    };

    provider.put(&meta_k, meta.encode())?;
    provider.put(&index_k, index.encode())?;

    tracing::debug!(tensor = key, samples = samples.len(), chunk_size, "wrote tensor");
    Ok(())
}

/// Write a single sample's bytes, extending the tensor's tail chunk when it
/// has headroom, and return the index entry describing where it landed.
fn write_sample<T: Element>(
    key: &str,
    provider: &dyn StorageProvider,
    chunk_size: usize,
    index: &IndexMap,
    sample: &Array<T>,
) -> Result<IndexEntry> {
    let payload = sample.to_bytes();
    let (last_chunk_name, last_chunk) = load_last_chunk(key, provider, index)?;

    let mut extend_last_chunk = false;
    let mut bllc = 0;
    if !index.entries.is_empty() && last_chunk.len() < chunk_size {
        bllc = chunk_size - last_chunk.len();
        extend_last_chunk = true;
    }

    // The sample's start offset is fixed by whether it *begins* by extending
    // the tail chunk; this must not be overwritten by later slices of the
    // same sample, which always start fresh chunks at offset 0.
    let start_byte = if extend_last_chunk {
        index.entries.last().map(|e| e.end_byte).unwrap_or(0)
    } else {
        0
    };

    let mut chunk_names = Vec::new();
    let mut end_byte = 0usize;
    let mut pending_chunk = last_chunk;
    let mut pending_name = last_chunk_name;

    for slice in ChunkSplitter::new(&payload, chunk_size, bllc) {
        let (chunk_name, mut chunk_bytes) = if extend_last_chunk {
            (pending_name.clone(), pending_chunk.clone())
        } else {
            (new_chunk_id(), Vec::new())
        };

        chunk_bytes.extend_from_slice(slice);
        end_byte = chunk_bytes.len();

        if extend_last_chunk && chunk_bytes.len() >= chunk_size {
            extend_last_chunk = false;
        }

        provider.put(&chunk_key(key, &chunk_name), chunk_bytes.clone())?;
        tracing::trace!(
            tensor = key,
            chunk = %chunk_name,
            len = chunk_bytes.len(),
            "wrote chunk"
        );

        chunk_names.push(chunk_name.clone());
        pending_name = chunk_name;
        pending_chunk = chunk_bytes;
    }

    Ok(IndexEntry {
        chunk_names,
        start_byte,
        end_byte,
        shape: sample.shape().to_vec(),
    })
}

/// Load the name and current bytes of the tensor's trailing chunk, if any
/// sample has been written yet.
fn load_last_chunk(
    key: &str,
    provider: &dyn StorageProvider,
    index: &IndexMap,
) -> Result<(String, Vec<u8>)> {
    match index.entries.last() {
        None => Ok((String::new(), Vec::new())),
        Some(last_entry) => {
            let last_chunk_name = last_entry
                .chunk_names
                .last()
                .expect("index entries always have at least one chunk")
                .clone();
            let bytes = provider.get(&chunk_key(key, &last_chunk_name))?;
            Ok((last_chunk_name, bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;

    fn samples_of(bytes: &[&[u8]]) -> Vec<Array<u8>> {
        bytes
            .iter()
            .map(|b| Array::from_shape_vec(vec![b.len()], b.to_vec()))
            .collect()
    }

    #[test]
    fn s1_single_sample_spans_three_chunks() {
        let provider = MemoryProvider::new();
        let samples = samples_of(&[b"abcdefghij"]);
        write_array("t", &provider, 4, &samples).unwrap();

        let index = IndexMap::decode("t", &provider.get(&index_map_key("t")).unwrap()).unwrap();
        assert_eq!(index.entries.len(), 1);
        let entry = &index.entries[0];
        assert_eq!(entry.chunk_names.len(), 3);
        assert_eq!(entry.start_byte, 0);
        assert_eq!(entry.end_byte, 2);

        let sizes: Vec<usize> = entry
            .chunk_names
            .iter()
            .map(|c| provider.get(&chunk_key("t", c)).unwrap().len())
            .collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn s2_two_small_samples_share_a_chunk() {
        let provider = MemoryProvider::new();
        let samples = samples_of(&[b"abc", b"def"]);
        write_array("t", &provider, 4, &samples).unwrap();

        let index = IndexMap::decode("t", &provider.get(&index_map_key("t")).unwrap()).unwrap();
        assert_eq!(index.entries.len(), 2);

        let e1 = &index.entries[0];
        assert_eq!(e1.chunk_names.len(), 1);
        assert_eq!(e1.start_byte, 0);
        assert_eq!(e1.end_byte, 3);

        let e2 = &index.entries[1];
        assert_eq!(e2.chunk_names, vec![e1.chunk_names[0].clone(), {
            // second chunk name, whatever it is
            e2.chunk_names[1].clone()
        }]);
        assert_eq!(e2.start_byte, 3);
        assert_eq!(e2.end_byte, 2);

        let sizes: Vec<usize> = vec![
            provider.get(&chunk_key("t", &e2.chunk_names[0])).unwrap().len(),
            provider.get(&chunk_key("t", &e2.chunk_names[1])).unwrap().len(),
        ];
        assert_eq!(sizes, vec![4, 2]);
    }

    #[test]
    fn s3_exact_two_chunks() {
        let provider = MemoryProvider::new();
        let samples = samples_of(&[b"abcdefgh"]);
        write_array("t", &provider, 4, &samples).unwrap();

        let index = IndexMap::decode("t", &provider.get(&index_map_key("t")).unwrap()).unwrap();
        let entry = &index.entries[0];
        assert_eq!(entry.chunk_names.len(), 2);
        assert_eq!(entry.start_byte, 0);
        assert_eq!(entry.end_byte, 4);
    }

    #[test]
    fn refuses_to_overwrite_existing_tensor() {
        let provider = MemoryProvider::new();
        let samples = samples_of(&[b"abc"]);
        write_array("t", &provider, 4, &samples).unwrap();
        let err = write_array("t", &provider, 4, &samples).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[test]
    fn meta_tracks_min_max_shape() {
        let provider = MemoryProvider::new();
        let samples = vec![
            Array::from_shape_vec(vec![2], vec![1u8, 2]),
            Array::from_shape_vec(vec![4], vec![1u8, 2, 3, 4]),
        ];
        write_array("t", &provider, 4, &samples).unwrap();
        let meta = TensorMeta::decode("t", &provider.get(&meta_key("t")).unwrap()).unwrap();
        assert_eq!(meta.min_shape, vec![2]);
        assert_eq!(meta.max_shape, vec![4]);
        assert_eq!(meta.length, 2);
        assert!(!meta.has_uniform_shape());
    }
}
