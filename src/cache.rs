//! Tiered write-back LRU cache over storage providers (C7/C8).

mod chain;
mod lru_list;
mod tier;

pub use chain::build_cache_chain;
pub use tier::LruCacheTier;
