//! In-memory reference storage provider.
//!
//! `MemoryProvider` is not one of the pluggable backends this crate ships
//! (memory map, local filesystem, and remote object storage are external
//! collaborators per the spec's scope) — it exists as the simple, fully
//! synchronous reference implementation of [`StorageProvider`] that the
//! chunk engine and cache tier are tested against, and as a natural front
//! tier when composing a cache chain.

use crate::error::{Error, Result};
use crate::provider::StorageProvider;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A `StorageProvider` backed by an in-memory `HashMap`, guarded by a
/// single `RwLock` (reads proceed concurrently; writes are serialized).
#[derive(Debug, Default)]
pub struct MemoryProvider {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }
}

impl StorageProvider for MemoryProvider {
    fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(key))
    }

    fn get_range(&self, key: &str, offset: usize, length: usize) -> Result<Vec<u8>> {
        let blobs = self.blobs.read();
        let blob = blobs.get(key).ok_or_else(|| Error::not_found(key))?;
        let end = (offset + length).min(blob.len());
        if offset >= blob.len() {
            return Ok(Vec::new());
        }
        Ok(blob[offset..end].to_vec())
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.blobs.write().insert(key.to_string(), bytes);
        Ok(())
    }

    fn put_range(&self, key: &str, bytes: &[u8], offset: usize, overwrite: bool) -> Result<()> {
        let mut blobs = self.blobs.write();
        if overwrite {
            blobs.insert(key.to_string(), bytes.to_vec());
            return Ok(());
        }
        let blob = blobs.entry(key.to_string()).or_default();
        if blob.len() < offset {
            blob.resize(offset, 0);
        }
        let end = offset + bytes.len();
        if blob.len() < end {
            blob.resize(end, 0);
        }
        blob[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.blobs.read().contains_key(key))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.blobs
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(key))
    }

    fn iter_keys(&self) -> Vec<String> {
        self.blobs.read().keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.blobs.read().len()
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
