//! Configuration for the chunk engine and cache chain.
//!
//! Mirrors the defaults called out in the external interface contract: a
//! 16 MB chunk size, 4-way read parallelism, and suggested minimum cache
//! tier budgets of 32 MB / 160 MB. Values can be overridden from a TOML
//! file and/or environment variables layered on top via the `config` crate.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default chunk size in bytes (16,000,000 — matches the spec's `16 * 10^6`).
pub const DEFAULT_CHUNK_SIZE: usize = 16_000_000;

/// Default number of workers used by the reader's parallel fetch path.
pub const DEFAULT_READ_WORKERS: usize = 4;

/// Suggested minimum byte budget for a tensor engine's first (fastest) cache tier.
pub const MIN_FIRST_TIER_CACHE_SIZE: u64 = 32_000_000;

/// Suggested minimum byte budget for a second cache tier.
pub const MIN_SECOND_TIER_CACHE_SIZE: u64 = 160_000_000;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Chunking behavior for writers.
    pub chunking: ChunkingConfig,
    /// Concurrency behavior for readers.
    pub reader: ReaderConfig,
}

/// Chunking-related settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Target length of each chunk, in bytes.
    pub chunk_size: usize,
}

/// Reader concurrency settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Number of worker threads used when fetching chunks in parallel.
    ///
    /// A value of `1` (or the [`ConcurrencyPolicy::Single`](crate::reader::ConcurrencyPolicy::Single) policy)
    /// disables the worker pool entirely.
    pub workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            reader: ReaderConfig::default(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_READ_WORKERS,
        }
    }
}

/// Budgets for a cache chain built from the deepest tier upward.
///
/// `budgets[0]` is the budget of the front-most (fastest, smallest) tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheChainConfig {
    /// Per-tier byte budgets, front tier first. Must have length `providers.len() - 1`
    /// when passed to [`crate::cache::build_cache_chain`].
    pub budgets: Vec<u64>,
}

impl Default for CacheChainConfig {
    /// Two tiers: a fast front tier and an authoritative backend, with the
    /// suggested minimum budgets from the external interface contract.
    fn default() -> Self {
        Self {
            budgets: vec![MIN_FIRST_TIER_CACHE_SIZE],
        }
    }
}

/// Load an [`EngineConfig`], optionally layering a TOML file and environment
/// variables (prefixed `TENSORCHUNK_`, double-underscore nested) on top of
/// the compiled-in defaults.
///
/// Falls back to [`EngineConfig::default`] entirely if `path` is `None` and
/// no relevant environment variables are set.
pub fn load_config_or_default(path: Option<&str>) -> Result<EngineConfig> {
    let defaults = EngineConfig::default();

    let mut builder = config::Config::builder()
        .set_default("chunking.chunk_size", defaults.chunking.chunk_size as i64)
        .map_err(|e| Error::Config(e.to_string()))?
        .set_default("reader.workers", defaults.reader.workers as i64)
        .map_err(|e| Error::Config(e.to_string()))?;

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(std::path::Path::new(path)).required(false));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("TENSORCHUNK")
            .separator("__")
            .try_parsing(true),
    );

    let built = builder.build().map_err(|e| Error::Config(e.to_string()))?;

    built
        .try_deserialize()
        .map_err(|e| Error::Config(e.to_string()))
}
