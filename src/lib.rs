//! tensorchunk - a chunked array storage engine with a tiered write-back LRU cache chain
//!
//! Large N-dimensional numeric arrays are persisted as sequences of
//! fixed-size byte chunks across a pluggable storage backend, and arbitrary
//! sample ranges are read back into contiguous in-memory arrays. The engine
//! itself performs no I/O directly; it is written purely against the
//! [`StorageProvider`] trait, so any backend — in-memory, memory-mapped,
//! local filesystem, or a remote object store — can sit underneath it.
#![warn(missing_docs)]

pub mod array;
pub mod cache;
pub mod chunk;
pub mod config;
pub mod dtype;
pub mod error;
pub mod meta;
pub mod provider;
pub mod reader;
pub mod view;
pub mod writer;

pub use array::{Array, Batch};
pub use cache::{build_cache_chain, LruCacheTier};
pub use config::EngineConfig;
pub use dtype::{DType, Element};
pub use error::{Error, Result};
pub use provider::{MemoryProvider, StorageProvider};
pub use reader::{read_array, ConcurrencyPolicy};
pub use view::TensorView;
pub use writer::write_array;

/// Crate version, as set in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name, as set in `Cargo.toml`.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Install the `tracing` subscriber this crate logs through, reading
/// verbosity from `RUST_LOG` (or the default filter if unset).
///
/// Not required to use the engine — callers with their own `tracing`
/// subscriber set up can skip this and the crate's events will flow into it.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("{} v{}", NAME, VERSION);
}
