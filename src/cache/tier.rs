//! LRU cache tier (C7): a write-back cache over a faster provider in front
//! of a slower, authoritative one, enforcing a byte budget on the front.
//!
//! Grounded on the original implementation's `LRUCache` and the exact state
//! transitions exercised by `detailed_check_lru` (dirty-key tracking, MRU
//! promotion on both read and write, eviction writing dirty bytes forward).

use crate::cache::lru_list::LruList;
use crate::error::{Error, Result};
use crate::provider::StorageProvider;
use parking_lot::Mutex;
use std::collections::HashSet;

/// A [`StorageProvider`] that fronts `next` with a byte-budgeted, write-back
/// `cache` tier. `cache` and `next` may themselves be tiers, letting chains
/// of arbitrary depth be built (see [`crate::cache::build_cache_chain`]).
pub struct LruCacheTier {
    cache: Box<dyn StorageProvider>,
    next: Box<dyn StorageProvider>,
    cache_size: u64,
    state: Mutex<LruList>,
}

impl LruCacheTier {
    /// Build a tier fronting `next` with `cache`, budgeted at `cache_size` bytes.
    pub fn new(cache: Box<dyn StorageProvider>, next: Box<dyn StorageProvider>, cache_size: u64) -> Self {
        Self {
            cache,
            next,
            cache_size,
            state: Mutex::new(LruList::new()),
        }
    }

    /// Current total bytes held in the cache tier.
    pub fn cache_used(&self) -> u64 {
        self.state.lock().total_size()
    }

    /// Keys currently cached whose bytes have not yet been flushed to `next`.
    pub fn dirty_keys(&self) -> HashSet<String> {
        self.state.lock().dirty_keys().into_iter().collect()
    }

    /// Number of keys currently held in the cache tier (not the union with `next`).
    pub fn cached_key_count(&self) -> usize {
        self.state.lock().len()
    }

    /// Number of keys currently stored directly in `next`.
    pub fn next_key_count(&self) -> usize {
        self.next.len()
    }

    /// Evict least-recently-used keys, writing dirty bytes forward to `next`,
    /// until `cache_used <= cache_size` or only one entry remains.
    fn evict(&self, state: &mut LruList) -> Result<()> {
        while state.total_size() > self.cache_size && state.len() > 1 {
            let (key, size, dirty) = state
                .pop_lru()
                .expect("len() > 1 guarantees a tail entry exists");
            if dirty {
                let bytes = self.cache.get(&key)?;
                self.next.put(&key, bytes)?;
                tracing::debug!(key = %key, size, "evicted dirty key to next tier");
            } else {
                tracing::debug!(key = %key, size, "evicted clean key from tier");
            }
            self.cache.delete(&key)?;
        }
        Ok(())
    }
}

impl StorageProvider for LruCacheTier {
    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let mut state = self.state.lock();
        if state.contains(key) {
            let bytes = self.cache.get(key)?;
            state.touch(key);
            return Ok(bytes);
        }
        let bytes = self.next.get(key)?;
        self.cache.put(key, bytes.clone())?;
        state.insert_mru(key, bytes.len() as u64, false);
        self.evict(&mut state)?;
        Ok(bytes)
    }

    fn get_range(&self, key: &str, offset: usize, length: usize) -> Result<Vec<u8>> {
        let blob = self.get(key)?;
        if offset >= blob.len() {
            return Ok(Vec::new());
        }
        let end = (offset + length).min(blob.len());
        Ok(blob[offset..end].to_vec())
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let mut state = self.state.lock();
        let size = bytes.len() as u64;
        self.cache.put(key, bytes)?;
        state.insert_mru(key, size, true);
        self.evict(&mut state)
    }

    fn put_range(&self, key: &str, bytes: &[u8], offset: usize, overwrite: bool) -> Result<()> {
        if overwrite {
            return self.put(key, bytes.to_vec());
        }
        let mut blob = match self.get(key) {
            Ok(b) => b,
            Err(Error::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        if blob.len() < offset {
            blob.resize(offset, 0);
        }
        let end = offset + bytes.len();
        if blob.len() < end {
            blob.resize(end, 0);
        }
        blob[offset..end].copy_from_slice(bytes);
        self.put(key, blob)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        if self.state.lock().contains(key) {
            return Ok(true);
        }
        self.next.contains(key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.state.lock();
        let in_cache = state.contains(key);
        if in_cache {
            state.remove(key);
            self.cache.delete(key)?;
        }
        let in_next = self.next.contains(key)?;
        if in_next {
            self.next.delete(key)?;
        }
        if !in_cache && !in_next {
            return Err(Error::not_found(key));
        }
        Ok(())
    }

    fn iter_keys(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut seen: HashSet<String> = state.keys().into_iter().collect();
        for key in self.next.iter_keys() {
            seen.insert(key);
        }
        seen.into_iter().collect()
    }

    fn len(&self) -> usize {
        self.iter_keys().len()
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        for key in state.dirty_keys() {
            let bytes = self.cache.get(&key)?;
            self.next.put(&key, bytes)?;
            state.mark_clean(&key);
            tracing::debug!(key = %key, "flushed dirty key to next tier");
        }
        drop(state);
        self.next.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;

    const CHUNK_SIZE: u64 = 16;
    const BUDGET: u64 = 32;

    fn chunk() -> Vec<u8> {
        b"0123456789123456".to_vec()
    }

    fn tier() -> LruCacheTier {
        LruCacheTier::new(
            Box::new(MemoryProvider::new()),
            Box::new(MemoryProvider::new()),
            BUDGET,
        )
    }

    /// Directly mirrors the original implementation's `detailed_check_lru`,
    /// at a 1-byte-per-MB scale (ratios preserved, sizes shrunk for speed).
    #[test]
    fn detailed_lru_lifecycle() {
        let lru = tier();
        assert_eq!(lru.dirty_keys(), HashSet::new());
        assert_eq!(lru.cached_key_count(), 0);
        assert_eq!(lru.next_key_count(), 0);
        assert_eq!(lru.cache_used(), 0);
        assert_eq!(lru.len(), 0);

        lru.put("file_1", chunk()).unwrap();
        assert_eq!(lru.dirty_keys(), HashSet::from(["file_1".to_string()]));
        assert_eq!(lru.cached_key_count(), 1);
        assert_eq!(lru.next_key_count(), 0);
        assert_eq!(lru.cache_used(), CHUNK_SIZE);
        assert_eq!(lru.len(), 1);

        lru.put("file_2", chunk()).unwrap();
        assert_eq!(
            lru.dirty_keys(),
            HashSet::from(["file_1".to_string(), "file_2".to_string()])
        );
        assert_eq!(lru.cached_key_count(), 2);
        assert_eq!(lru.next_key_count(), 0);
        assert_eq!(lru.cache_used(), 2 * CHUNK_SIZE);
        assert_eq!(lru.len(), 2);

        lru.put("file_3", chunk()).unwrap();
        assert_eq!(
            lru.dirty_keys(),
            HashSet::from(["file_3".to_string(), "file_2".to_string()])
        );
        assert_eq!(lru.cached_key_count(), 2);
        assert_eq!(lru.next_key_count(), 1);
        assert_eq!(lru.cache_used(), 2 * CHUNK_SIZE);
        assert_eq!(lru.len(), 3);

        lru.get("file_1").unwrap();
        assert_eq!(lru.dirty_keys(), HashSet::from(["file_3".to_string()]));
        assert_eq!(lru.cached_key_count(), 2);
        assert_eq!(lru.next_key_count(), 2);
        assert_eq!(lru.cache_used(), 2 * CHUNK_SIZE);
        assert_eq!(lru.len(), 3);

        lru.get("file_3").unwrap();
        assert_eq!(lru.dirty_keys(), HashSet::from(["file_3".to_string()]));
        assert_eq!(lru.cached_key_count(), 2);
        assert_eq!(lru.next_key_count(), 2);
        assert_eq!(lru.cache_used(), 2 * CHUNK_SIZE);
        assert_eq!(lru.len(), 3);

        lru.delete("file_3").unwrap();
        assert_eq!(lru.dirty_keys(), HashSet::new());
        assert_eq!(lru.cached_key_count(), 1);
        assert_eq!(lru.next_key_count(), 2);
        assert_eq!(lru.cache_used(), CHUNK_SIZE);
        assert_eq!(lru.len(), 2);

        lru.delete("file_1").unwrap();
        assert_eq!(lru.dirty_keys(), HashSet::new());
        assert_eq!(lru.cached_key_count(), 0);
        assert_eq!(lru.next_key_count(), 1);
        assert_eq!(lru.cache_used(), 0);
        assert_eq!(lru.len(), 1);

        lru.delete("file_2").unwrap();
        assert_eq!(lru.dirty_keys(), HashSet::new());
        assert_eq!(lru.cached_key_count(), 0);
        assert_eq!(lru.next_key_count(), 0);
        assert_eq!(lru.cache_used(), 0);
        assert_eq!(lru.len(), 0);

        assert!(matches!(lru.get("file_1"), Err(Error::NotFound(_))));

        lru.put("file_1", chunk()).unwrap();
        assert_eq!(lru.dirty_keys(), HashSet::from(["file_1".to_string()]));
        assert_eq!(lru.cached_key_count(), 1);
        assert_eq!(lru.next_key_count(), 0);
        assert_eq!(lru.cache_used(), CHUNK_SIZE);
        assert_eq!(lru.len(), 1);

        lru.put("file_2", chunk()).unwrap();
        assert_eq!(
            lru.dirty_keys(),
            HashSet::from(["file_1".to_string(), "file_2".to_string()])
        );
        assert_eq!(lru.cached_key_count(), 2);
        assert_eq!(lru.next_key_count(), 0);
        assert_eq!(lru.cache_used(), 2 * CHUNK_SIZE);
        assert_eq!(lru.len(), 2);

        lru.flush().unwrap();
        assert_eq!(lru.dirty_keys(), HashSet::new());
        assert_eq!(lru.cached_key_count(), 2);
        assert_eq!(lru.next_key_count(), 2);
        assert_eq!(lru.cache_used(), 2 * CHUNK_SIZE);
        assert_eq!(lru.len(), 2);

        lru.delete("file_1").unwrap();
        lru.delete("file_2").unwrap();
        assert_eq!(lru.dirty_keys(), HashSet::new());
        assert_eq!(lru.cached_key_count(), 0);
        assert_eq!(lru.next_key_count(), 0);
        assert_eq!(lru.cache_used(), 0);
        assert_eq!(lru.len(), 0);
    }

    #[test]
    fn oversized_single_entry_is_stored_despite_budget() {
        let lru = tier();
        let oversized = vec![0u8; (BUDGET as usize) * 4];
        lru.put("huge", oversized.clone()).unwrap();
        assert_eq!(lru.cache_used(), oversized.len() as u64);
        assert_eq!(lru.cached_key_count(), 1);
    }

    #[test]
    fn satisfies_storage_provider_contract() {
        let lru = tier();
        lru.put("abc.txt", b"hello world".to_vec()).unwrap();
        assert_eq!(lru.get("abc.txt").unwrap(), b"hello world");
        assert_eq!(lru.get_range("abc.txt", 2, 5).unwrap(), b"llo w");

        lru.put_range("abc.txt", b"abcde", 6, false).unwrap();
        assert_eq!(lru.get("abc.txt").unwrap(), b"hello abcde");

        lru.put_range("def.txt", b"hello world", 3, false).unwrap();
        assert_eq!(lru.get("def.txt").unwrap(), b"\x00\x00\x00hello world");
        lru.put_range("def.txt", b"new_text", 0, true).unwrap();
        assert_eq!(lru.get("def.txt").unwrap(), b"new_text");

        assert!(lru.len() >= 1);
        let _ = lru.iter_keys();

        lru.delete("abc.txt").unwrap();
        lru.delete("def.txt").unwrap();
        assert!(matches!(lru.get("abc.txt"), Err(Error::NotFound(_))));

        lru.flush().unwrap();
    }
}
