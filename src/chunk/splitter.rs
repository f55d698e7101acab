//! Lazy chunk splitter (C2).
//!
//! Splits a single sample's payload into chunk-sized byte slices, aware of
//! any headroom left in a chunk the writer is about to extend. Grounded
//! directly on `generate_chunks`'s contract in the original implementation's
//! write path: the first slice is clipped to `bytes_left_in_last_chunk`
//! (BLLC) when nonzero, every subsequent slice is clipped to `chunk_size`,
//! no slice is ever empty, and at most the final slice is short.

/// An iterator that splits `payload` into chunk-sized slices.
///
/// If `bytes_left_in_last_chunk` (BLLC) is greater than zero, the first
/// yielded slice has length at most BLLC; every slice after that has length
/// at most `chunk_size`. The payload is always fully consumed, no empty
/// slice is ever produced, and at most one slice (necessarily the last) is
/// shorter than its target length.
pub struct ChunkSplitter<'a> {
    payload: &'a [u8],
    offset: usize,
    chunk_size: usize,
    bytes_left_in_last_chunk: usize,
}

impl<'a> ChunkSplitter<'a> {
    /// Build a splitter over `payload`.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(payload: &'a [u8], chunk_size: usize, bytes_left_in_last_chunk: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be nonzero");
        Self {
            payload,
            offset: 0,
            chunk_size,
            bytes_left_in_last_chunk,
        }
    }
}

impl<'a> Iterator for ChunkSplitter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.payload.len() {
            return None;
        }
        let remaining = self.payload.len() - self.offset;
        let limit = if self.bytes_left_in_last_chunk > 0 {
            self.bytes_left_in_last_chunk
        } else {
            self.chunk_size
        };
        let take = remaining.min(limit);
        let slice = &self.payload[self.offset..self.offset + take];
        self.offset += take;
        self.bytes_left_in_last_chunk = 0;
        Some(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bllc_splits_evenly() {
        let payload = b"abcdefghij";
        let slices: Vec<&[u8]> = ChunkSplitter::new(payload, 4, 0).collect();
        assert_eq!(slices, vec![&b"abcd"[..], &b"efgh"[..], &b"ij"[..]]);
    }

    #[test]
    fn bllc_clips_first_slice_only() {
        // 2 bytes left in the last chunk, chunk_size 4: first slice <= 2 bytes,
        // remaining slices <= 4 bytes each.
        let payload = b"abcdefg";
        let slices: Vec<&[u8]> = ChunkSplitter::new(payload, 4, 2).collect();
        assert_eq!(slices, vec![&b"ab"[..], &b"cdef"[..], &b"g"[..]]);
    }

    #[test]
    fn sample_smaller_than_bllc_yields_one_slice() {
        let payload = b"ab";
        let slices: Vec<&[u8]> = ChunkSplitter::new(payload, 4, 3).collect();
        assert_eq!(slices, vec![&b"ab"[..]]);
    }

    #[test]
    fn exact_multiple_of_chunk_size_has_no_short_slice() {
        let payload = b"abcdefgh";
        let slices: Vec<&[u8]> = ChunkSplitter::new(payload, 4, 0).collect();
        assert_eq!(slices, vec![&b"abcd"[..], &b"efgh"[..]]);
    }

    #[test]
    fn never_yields_empty_slice() {
        let payload = b"abcd";
        let slices: Vec<&[u8]> = ChunkSplitter::new(payload, 4, 0).collect();
        assert_eq!(slices, vec![&b"abcd"[..]]);
        assert!(slices.iter().all(|s| !s.is_empty()));
    }

    proptest::proptest! {
        #[test]
        fn reassembles_and_never_yields_empty_or_oversized(
            payload in proptest::collection::vec(proptest::num::u8::ANY, 0..500),
            chunk_size in 1usize..64,
            bllc in 0usize..64,
        ) {
            let slices: Vec<&[u8]> = ChunkSplitter::new(&payload, chunk_size, bllc).collect();

            let reassembled: Vec<u8> = slices.iter().flat_map(|s| s.iter().copied()).collect();
            proptest::prop_assert_eq!(reassembled, payload.clone());
            proptest::prop_assert!(slices.iter().all(|s| !s.is_empty()));

            let limit = if bllc > 0 { bllc } else { chunk_size };
            if let Some((first, rest)) = slices.split_first() {
                proptest::prop_assert!(first.len() <= limit);
                proptest::prop_assert!(rest.iter().all(|s| s.len() <= chunk_size));
            }

            let short_slices = slices.iter().filter(|s| s.len() < chunk_size).count();
            proptest::prop_assert!(short_slices <= 1 || (bllc > 0 && short_slices <= 2));
        }
    }
}
