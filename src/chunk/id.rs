//! Chunk identifier generation.
//!
//! Chunk ids only need to be unique within a tensor; this implementation
//! uses time-ordered UUIDv7 values, matching the reference implementation's
//! use of `uuid1()` (the Python original's time-based UUID).

use uuid::Uuid;

/// Mint a new, randomly-named chunk identifier.
pub fn new_chunk_id() -> String {
    Uuid::now_v7().to_string()
}
