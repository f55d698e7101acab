//! A minimal N-dimensional array: a flat buffer plus a shape.
//!
//! This is deliberately not a general-purpose tensor library — shape
//! normalization, broadcasting, and slicing sugar are external collaborators
//! per the spec's scope. `Array<T>` exists only to carry a batched sample
//! set (or a single reconstructed sample) between the engine's writer and
//! reader and the caller.

use crate::dtype::Element;

/// A dense, row-major N-dimensional array of a single element type.
#[derive(Debug, Clone, PartialEq)]
pub struct Array<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T: Element> Array<T> {
    /// Build an array from a shape and its row-major flat data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of `shape`.
    pub fn from_shape_vec(shape: Vec<usize>, data: Vec<T>) -> Self {
        let expected: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected,
            "array data length does not match shape {:?}",
            shape
        );
        Self { shape, data }
    }

    /// The array's shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The flat, row-major backing data.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consume the array, returning its shape and flat data.
    pub fn into_parts(self) -> (Vec<usize>, Vec<T>) {
        (self.shape, self.data)
    }

    /// Number of elements (product of `shape`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this array has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flatten this array's elements to their canonical little-endian byte
    /// representation, row-major. This is the default `to_bytes` flattener
    /// referenced by the writer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() * T::DTYPE.size_of());
        for element in &self.data {
            element.write_le_bytes(&mut out);
        }
        out
    }

    /// Reconstruct an array of the given `shape` from its canonical
    /// little-endian byte representation.
    ///
    /// `bytes.len()` must equal `shape.iter().product::<usize>() * size_of::<T>()`.
    pub fn from_bytes(shape: Vec<usize>, bytes: &[u8]) -> Self {
        let width = T::DTYPE.size_of();
        let count: usize = shape.iter().product();
        assert_eq!(
            bytes.len(),
            count * width,
            "byte length does not match shape {:?}",
            shape
        );
        let mut data = Vec::with_capacity(count);
        for chunk in bytes.chunks_exact(width) {
            data.push(T::from_le_bytes(chunk));
        }
        Self { shape, data }
    }
}

/// A batch of samples: either a single contiguous array (when every sample
/// shares a shape) or a ragged sequence of per-sample arrays.
///
/// The reader returns [`Batch::Ragged`] whenever the requested slice spans
/// samples of differing shape; stacking into one array is only valid when
/// shapes agree (see `TensorMeta::min_shape == max_shape`).
#[derive(Debug, Clone, PartialEq)]
pub enum Batch<T> {
    /// All samples share a shape and have been stacked along a new leading axis.
    Uniform(Array<T>),
    /// Samples have differing shapes; returned individually, in slice order.
    Ragged(Vec<Array<T>>),
}

impl<T: Element> Batch<T> {
    /// Stack a sequence of same-rank sample arrays into a [`Batch`].
    ///
    /// Produces [`Batch::Uniform`] when every sample shares an identical
    /// shape, [`Batch::Ragged`] otherwise.
    pub fn stack(samples: Vec<Array<T>>) -> Self {
        if samples.is_empty() {
            return Batch::Uniform(Array::from_shape_vec(vec![0], Vec::new()));
        }
        let first_shape = samples[0].shape().to_vec();
        let uniform = samples.iter().all(|s| s.shape() == first_shape.as_slice());
        if uniform {
            let mut shape = Vec::with_capacity(first_shape.len() + 1);
            shape.push(samples.len());
            shape.extend(first_shape);
            let mut data = Vec::new();
            for sample in &samples {
                data.extend_from_slice(sample.data());
            }
            Batch::Uniform(Array::from_shape_vec(shape, data))
        } else {
            Batch::Ragged(samples)
        }
    }
}
