//! Element kinds and pixel storage.
//!
//! Images hold one of four element kinds. Storage is a closed tagged variant,
//! [`PixelData`], so every kernel dispatches once per call on the tag rather
//! than inspecting element types at runtime. [`PixelBuffer`] is the shared,
//! reference-counted handle that image views alias.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The element kind of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DType {
    I16,
    I32,
    #[default]
    F32,
    F64,
}

impl DType {
    /// Whether the kind is one of the integer kinds (bitwise operations allowed).
    pub fn is_integer(self) -> bool {
        matches!(self, DType::I16 | DType::I32)
    }

    pub fn name(self) -> &'static str {
        match self {
            DType::I16 => "int16",
            DType::I32 => "int32",
            DType::F32 => "float32",
            DType::F64 => "float64",
        }
    }

    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            DType::I16 => 2,
            DType::I32 | DType::F32 => 4,
            DType::F64 => 8,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = Error;

    /// Parse a dtype name. Unsigned names narrow to the signed kind of equal width.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int16" | "i16" | "short" | "uint16" | "u16" => Ok(DType::I16),
            "int32" | "i32" | "int" | "uint32" | "u32" => Ok(DType::I32),
            "float32" | "f32" | "float" => Ok(DType::F32),
            "float64" | "f64" | "double" => Ok(DType::F64),
            other => Err(Error::InvalidValue(format!("unknown dtype `{other}`"))),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A storage element type. Implemented for `i16`, `i32`, `f32` and `f64` only.
pub trait Pixel: sealed::Sealed + Copy + PartialEq + fmt::Debug + 'static {
    /// The kind stored for this element type.
    const DTYPE: DType;

    fn to_f64(self) -> f64;

    /// Convert with Rust `as` semantics: integers truncate toward zero and
    /// saturate, NaN becomes 0.
    fn from_f64(v: f64) -> Self;

    /// The typed slice when `data` holds this element type.
    fn slice(data: &PixelData) -> Option<&[Self]>;

    fn slice_mut(data: &mut PixelData) -> Option<&mut [Self]>;
}

macro_rules! impl_pixel {
    ($t:ty, $variant:ident) => {
        impl Pixel for $t {
            const DTYPE: DType = DType::$variant;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            fn slice(data: &PixelData) -> Option<&[Self]> {
                match data {
                    PixelData::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            fn slice_mut(data: &mut PixelData) -> Option<&mut [Self]> {
                match data {
                    PixelData::$variant(v) => Some(v.as_mut_slice()),
                    _ => None,
                }
            }
        }

        impl From<Vec<$t>> for PixelData {
            fn from(v: Vec<$t>) -> Self {
                PixelData::$variant(v)
            }
        }
    };
}

/// Pixel values typed by element kind, stored row-major.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PixelData {
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl_pixel!(i16, I16);
impl_pixel!(i32, I32);
impl_pixel!(f32, F32);
impl_pixel!(f64, F64);

// Unsigned input has no storage kind of its own: reinterpret the bits as the
// signed kind of equal width without copying.
impl From<Vec<u16>> for PixelData {
    fn from(v: Vec<u16>) -> Self {
        PixelData::I16(bytemuck::allocation::cast_vec(v))
    }
}

impl From<Vec<u32>> for PixelData {
    fn from(v: Vec<u32>) -> Self {
        PixelData::I32(bytemuck::allocation::cast_vec(v))
    }
}

impl PixelData {
    /// `len` elements of kind `dtype`, all equal to `value` (cast to the kind).
    pub fn filled(dtype: DType, len: usize, value: f64) -> Self {
        match dtype {
            DType::I16 => PixelData::I16(vec![i16::from_f64(value); len]),
            DType::I32 => PixelData::I32(vec![i32::from_f64(value); len]),
            DType::F32 => PixelData::F32(vec![f32::from_f64(value); len]),
            DType::F64 => PixelData::F64(vec![value; len]),
        }
    }

    pub fn zeros(dtype: DType, len: usize) -> Self {
        PixelData::filled(dtype, len, 0.0)
    }

    pub fn dtype(&self) -> DType {
        match self {
            PixelData::I16(_) => DType::I16,
            PixelData::I32(_) => DType::I32,
            PixelData::F32(_) => DType::F32,
            PixelData::F64(_) => DType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PixelData::I16(v) => v.len(),
            PixelData::I32(v) => v.len(),
            PixelData::F32(v) => v.len(),
            PixelData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at flat index `i` widened to `f64`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        match self {
            PixelData::I16(v) => v[i] as f64,
            PixelData::I32(v) => v[i] as f64,
            PixelData::F32(v) => v[i] as f64,
            PixelData::F64(v) => v[i],
        }
    }

    /// Store `value` at flat index `i`, cast to this kind.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    pub fn set(&mut self, i: usize, value: f64) {
        match self {
            PixelData::I16(v) => v[i] = i16::from_f64(value),
            PixelData::I32(v) => v[i] = i32::from_f64(value),
            PixelData::F32(v) => v[i] = f32::from_f64(value),
            PixelData::F64(v) => v[i] = value,
        }
    }

    /// A copy of these values converted to `dtype`.
    pub fn converted(&self, dtype: DType) -> PixelData {
        if dtype == self.dtype() {
            return self.clone();
        }
        let mut out = PixelData::zeros(dtype, self.len());
        for i in 0..self.len() {
            out.set(i, self.get(i));
        }
        out
    }

    pub fn to_vec_f64(&self) -> Vec<f64> {
        match self {
            PixelData::I16(v) => v.iter().map(|&p| p as f64).collect(),
            PixelData::I32(v) => v.iter().map(|&p| p as f64).collect(),
            PixelData::F32(v) => v.iter().map(|&p| p as f64).collect(),
            PixelData::F64(v) => v.clone(),
        }
    }
}

/// A shared, reference-counted pixel allocation.
///
/// Cloning a `PixelBuffer` aliases the same allocation, so a caller that
/// keeps a clone of a buffer handed to an image sees every write made through
/// that image, and the image sees the caller's writes.
#[derive(Debug, Clone)]
pub struct PixelBuffer(Rc<RefCell<PixelData>>);

impl PixelBuffer {
    pub fn new(data: impl Into<PixelData>) -> Self {
        PixelBuffer(Rc::new(RefCell::new(data.into())))
    }

    pub fn dtype(&self) -> DType {
        self.0.borrow().dtype()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at flat index `i`, if in range.
    pub fn get(&self, i: usize) -> Option<f64> {
        let data = self.0.borrow();
        (i < data.len()).then(|| data.get(i))
    }

    /// Store `value` at flat index `i`, cast to the buffer's kind.
    pub fn set(&self, i: usize, value: f64) -> Result<()> {
        let mut data = self.0.borrow_mut();
        if i >= data.len() {
            return Err(Error::OutOfBounds(format!(
                "buffer index {i}, length is {}",
                data.len()
            )));
        }
        data.set(i, value);
        Ok(())
    }

    pub fn to_vec_f64(&self) -> Vec<f64> {
        self.0.borrow().to_vec_f64()
    }

    /// Whether both handles alias the same allocation.
    pub fn ptr_eq(&self, other: &PixelBuffer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles (buffers and image views) on this allocation.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub(crate) fn borrow(&self) -> Ref<'_, PixelData> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, PixelData> {
        self.0.borrow_mut()
    }
}
