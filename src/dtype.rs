//! Element type registry for tensor samples.
//!
//! A tensor's meta record stores its element type as a name (`"u8"`, `"f32"`, ...);
//! this module pins the canonical little-endian byte layout for each of the
//! fixed set of primitive types this engine supports, resolving the open
//! question in the source spec about cross-platform element-type mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A primitive numeric element type supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 64-bit integer.
    U64,
    /// Signed 64-bit integer.
    I64,
    /// 32-bit IEEE-754 float.
    F32,
    /// 64-bit IEEE-754 float.
    F64,
}

impl DType {
    /// Size in bytes of a single element of this type.
    pub fn size_of(self) -> usize {
        match self {
            DType::U8 | DType::I8 => 1,
            DType::U16 | DType::I16 => 2,
            DType::U32 | DType::I32 | DType::F32 => 4,
            DType::U64 | DType::I64 | DType::F64 => 8,
        }
    }

    /// The stable name stored in a tensor's meta record.
    pub fn name(self) -> &'static str {
        match self {
            DType::U8 => "u8",
            DType::I8 => "i8",
            DType::U16 => "u16",
            DType::I16 => "i16",
            DType::U32 => "u32",
            DType::I32 => "i32",
            DType::U64 => "u64",
            DType::I64 => "i64",
            DType::F32 => "f32",
            DType::F64 => "f64",
        }
    }

    /// Parse a name back into a [`DType`], as stored in a tensor's meta record.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "u8" => DType::U8,
            "i8" => DType::I8,
            "u16" => DType::U16,
            "i16" => DType::I16,
            "u32" => DType::U32,
            "i32" => DType::I32,
            "u64" => DType::U64,
            "i64" => DType::I64,
            "f32" => DType::F32,
            "f64" => DType::F64,
            _ => return None,
        })
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A type that can be flattened to and reconstructed from the engine's
/// canonical little-endian chunk byte layout.
///
/// Implemented for the fixed set of primitives named by [`DType`]. This is
/// the `to_bytes` flattener contract generalized to a static trait: a sample
/// array of `T` is serialized row-major, one `T::to_le_bytes()` at a time.
pub trait Element: Copy + PartialEq + fmt::Debug + 'static {
    /// The [`DType`] tag for this Rust type.
    const DTYPE: DType;

    /// Append this element's canonical byte representation to `out`.
    fn write_le_bytes(&self, out: &mut Vec<u8>);

    /// Reconstruct one element from a little-endian byte slice of exactly
    /// `DType::size_of()` bytes.
    fn from_le_bytes(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($ty:ty, $dtype:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;

            fn write_le_bytes(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn from_le_bytes(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                <$ty>::from_le_bytes(buf)
            }
        }
    };
}

impl_element!(u8, DType::U8);
impl_element!(i8, DType::I8);
impl_element!(u16, DType::U16);
impl_element!(i16, DType::I16);
impl_element!(u32, DType::U32);
impl_element!(i32, DType::I32);
impl_element!(u64, DType::U64);
impl_element!(i64, DType::I64);
impl_element!(f32, DType::F32);
impl_element!(f64, DType::F64);
