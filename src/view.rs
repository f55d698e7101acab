//! Tensor view (A5, thin): the minimal external-facing handle over
//! `(key, provider, slice)` named for contract completeness in the external
//! interfaces section. Owns nothing persistent.
//!
//! Grounded on the original implementation's `Tensor` (`api/tensor.py`):
//! indexing composes slices rather than materializing, `__len__` always
//! reports the tensor's full, unsliced sample count, and assignment is
//! rejected on anything but a fresh, unsliced view.

use crate::array::{Array, Batch};
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::meta::{meta_key, TensorMeta};
use crate::provider::StorageProvider;
use crate::reader::{read_array, ConcurrencyPolicy};
use crate::writer::write_array;
use std::marker::PhantomData;
use std::ops::Range;

/// A lightweight handle over a tensor at `key`, optionally restricted to a
/// sub-range of its samples. Indexing a view composes its slice with the
/// parent's; materializing reads the composed range back into a [`Batch`].
pub struct TensorView<'p, T: Element> {
    key: String,
    provider: &'p dyn StorageProvider,
    slice: Option<Range<usize>>,
    _marker: PhantomData<T>,
}

impl<'p, T: Element> TensorView<'p, T> {
    /// An unsliced view over the tensor at `key`. Does not require the
    /// tensor to already exist — it may be the target of [`Self::assign`].
    pub fn new(key: &str, provider: &'p dyn StorageProvider) -> Self {
        Self {
            key: key.to_string(),
            provider,
            slice: None,
            _marker: PhantomData,
        }
    }

    /// The tensor's full sample count, independent of this view's own
    /// slice — matches the original, which reports unsliced meta length
    /// from every view.
    pub fn len(&self) -> Result<usize> {
        Ok(load_meta(&self.key, self.provider)?.length)
    }

    /// A view restricted to the single sample at `index` (relative to this
    /// view's own window).
    pub fn index(&self, index: usize) -> Self {
        self.slice_range(index..index + 1)
    }

    /// A view restricted to `child` (relative to this view's own window),
    /// composed with any slice this view already carries.
    pub fn slice_range(&self, child: Range<usize>) -> Self {
        let composed = match &self.slice {
            None => child,
            Some(parent) => {
                let start = parent.start + child.start;
                let end = (parent.start + child.end).min(parent.end).max(start);
                start..end
            }
        };
        Self {
            key: self.key.clone(),
            provider: self.provider,
            slice: Some(composed),
            _marker: PhantomData,
        }
    }

    /// Whether this view carries no slice (the root view over a tensor).
    pub fn is_unsliced(&self) -> bool {
        self.slice.is_none()
    }

    /// Read this view's sample range back into a [`Batch`].
    pub fn materialize(&self) -> Result<Batch<T>> {
        match &self.slice {
            Some(range) => read_array(&self.key, self.provider, range.clone(), ConcurrencyPolicy::default()),
            None => {
                let length = self.len()?;
                read_array(&self.key, self.provider, 0..length, ConcurrencyPolicy::default())
            }
        }
    }

    /// Populate this tensor with `samples`, chunked at `chunk_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if this view carries a slice, and
    /// [`Error::AlreadyExists`] (via [`write_array`]) if the tensor already
    /// has a meta record.
    pub fn assign(&self, chunk_size: usize, samples: &[Array<T>]) -> Result<()> {
        if !self.is_unsliced() {
            return Err(Error::unsupported("assignment to a sliced tensor view"));
        }
        write_array(&self.key, self.provider, chunk_size, samples)
    }
}

fn load_meta(key: &str, provider: &dyn StorageProvider) -> Result<TensorMeta> {
    let bytes = provider.get(&meta_key(key))?;
    TensorMeta::decode(key, &bytes)
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
    fn assign_then_materialize_round_trips() {
        let provider = MemoryProvider::new();
        let view: TensorView<u8> = TensorView::new("t", &provider);
        view.assign(4, &samples_of(&[b"abc", b"def"])).unwrap();

        assert_eq!(view.len().unwrap(), 2);
        match view.materialize().unwrap() {
            Batch::Uniform(arr) => assert_eq!(arr.data(), b"abcdef"),
            Batch::Ragged(_) => panic!("expected uniform batch"),
        }
    }

    #[test]
    fn reassign_is_already_exists() {
        let provider = MemoryProvider::new();
        let view: TensorView<u8> = TensorView::new("t", &provider);
        view.assign(4, &samples_of(&[b"abc"])).unwrap();
        let err = view.assign(4, &samples_of(&[b"def"])).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[test]
    fn index_composes_slices_and_rejects_assignment() {
        let provider = MemoryProvider::new();
        let root: TensorView<u8> = TensorView::new("t", &provider);
        root.assign(4, &samples_of(&[b"aa", b"bb", b"cc"])).unwrap();

        let sliced = root.index(1);
        assert!(!sliced.is_unsliced());
        let err = sliced.assign(4, &samples_of(&[b"zz"])).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));

        match sliced.materialize().unwrap() {
            Batch::Uniform(arr) => assert_eq!(arr.data(), b"bb"),
            Batch::Ragged(_) => panic!("expected uniform batch"),
        }
    }

    #[test]
    fn nested_slice_composes_relative_to_parent_window() {
        let provider = MemoryProvider::new();
        let root: TensorView<u8> = TensorView::new("t", &provider);
        root.assign(4, &samples_of(&[b"aa", b"bb", b"cc", b"dd"]))
            .unwrap();

        let window = root.slice_range(1..4);
        let inner = window.index(1);
        match inner.materialize().unwrap() {
            Batch::Uniform(arr) => assert_eq!(arr.data(), b"cc"),
            Batch::Ragged(_) => panic!("expected uniform batch"),
        }
    }
}
