//! Element-wise arithmetic and bitwise operations.
//!
//! Every operation is computed in `f64` and cast back to the receiver's kind,
//! so integer images truncate toward zero and saturate at their limits.
//! Out-of-place forms copy the receiver and apply the in-place form, so the
//! result always has the receiver's dtype and bounds.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use super::{Access, Image, Mutable};
use crate::dtype::{DType, PixelData};
use crate::error::{Error, Result};

/// Values of an image operand, copied out when the operand is formed.
///
/// Because the copy is taken up front, an operand may alias the receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageValues {
    shape: (usize, usize),
    dtype: DType,
    values: Vec<f64>,
}

impl ImageValues {
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }
}

/// The right-hand side of an arithmetic operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Int(i64),
    Float(f64),
    Image(ImageValues),
}

impl Operand {
    fn is_integer(&self) -> bool {
        match self {
            Operand::Int(_) => true,
            Operand::Float(_) => false,
            Operand::Image(im) => im.dtype.is_integer(),
        }
    }

    fn dtype(&self) -> DType {
        match self {
            Operand::Int(_) => DType::I32,
            Operand::Float(_) => DType::F64,
            Operand::Image(im) => im.dtype,
        }
    }

    /// Integer value paired with the `k`-th pixel in row-major order.
    fn int_at(&self, k: usize) -> i64 {
        match self {
            Operand::Int(b) => *b,
            Operand::Float(b) => *b as i64,
            Operand::Image(im) => im.values[k] as i64,
        }
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Int(v as i64)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Int(v)
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Float(v)
    }
}

impl<A: Access> From<&Image<A>> for Operand {
    fn from(image: &Image<A>) -> Self {
        Operand::Image(ImageValues {
            shape: image.shape(),
            dtype: image.dtype(),
            values: image.pixels(),
        })
    }
}

impl Image<Mutable> {
    /// Apply `f(pixel, operand)` to every pixel after checking the operand shape.
    fn check_shape(&self, rhs: &Operand) -> Result<()> {
        if let Operand::Image(values) = rhs {
            if values.shape != self.shape() {
                return Err(Error::ShapeMismatch {
                    expected: self.shape(),
                    actual: values.shape,
                });
            }
        }
        Ok(())
    }

    fn combine(&mut self, rhs: Operand, f: impl Fn(f64, f64) -> f64) -> Result<()> {
        self.check_shape(&rhs)?;
        let Some(buffer) = &self.buffer else {
            return Ok(());
        };
        let mut data = buffer.borrow_mut();
        match &rhs {
            Operand::Image(values) => {
                for (i, &b) in self.indices().zip(&values.values) {
                    let a = data.get(i);
                    data.set(i, f(a, b));
                }
            }
            Operand::Int(b) => {
                let b = *b as f64;
                for i in self.indices() {
                    let a = data.get(i);
                    data.set(i, f(a, b));
                }
            }
            Operand::Float(b) => {
                for i in self.indices() {
                    let a = data.get(i);
                    data.set(i, f(a, *b));
                }
            }
        }
        Ok(())
    }

    fn combine_bits(
        &mut self,
        op: &'static str,
        rhs: Operand,
        f: impl Fn(i64, i64) -> i64,
    ) -> Result<()> {
        if !self.dtype.is_integer() {
            return Err(Error::UnsupportedDtype {
                op,
                dtype: self.dtype,
            });
        }
        if !rhs.is_integer() {
            return Err(Error::UnsupportedDtype {
                op,
                dtype: rhs.dtype(),
            });
        }
        self.check_shape(&rhs)?;
        let Some(buffer) = &self.buffer else {
            return Ok(());
        };
        // Results wrap to the pixel width like two's-complement integers.
        let mut data = buffer.borrow_mut();
        match &mut *data {
            PixelData::I16(v) => {
                for (k, i) in self.indices().enumerate() {
                    v[i] = f(v[i] as i64, rhs.int_at(k)) as i16;
                }
            }
            PixelData::I32(v) => {
                for (k, i) in self.indices().enumerate() {
                    v[i] = f(v[i] as i64, rhs.int_at(k)) as i32;
                }
            }
            PixelData::F32(_) | PixelData::F64(_) => {}
        }
        Ok(())
    }

    pub fn try_add_assign(&mut self, rhs: impl Into<Operand>) -> Result<()> {
        self.combine(rhs.into(), |a, b| a + b)
    }

    pub fn try_sub_assign(&mut self, rhs: impl Into<Operand>) -> Result<()> {
        self.combine(rhs.into(), |a, b| a - b)
    }

    pub fn try_mul_assign(&mut self, rhs: impl Into<Operand>) -> Result<()> {
        self.combine(rhs.into(), |a, b| a * b)
    }

    /// Division. On integer images a zero divisor saturates (`x / 0`) or
    /// yields zero (`0 / 0`).
    pub fn try_div_assign(&mut self, rhs: impl Into<Operand>) -> Result<()> {
        self.combine(rhs.into(), |a, b| a / b)
    }

    /// Replace each pixel `v` with `operand - v`.
    pub fn try_rsub_assign(&mut self, lhs: impl Into<Operand>) -> Result<()> {
        self.combine(lhs.into(), |a, b| b - a)
    }

    /// Replace each pixel `v` with `operand / v`.
    pub fn try_rdiv_assign(&mut self, lhs: impl Into<Operand>) -> Result<()> {
        self.combine(lhs.into(), |a, b| b / a)
    }

    /// Raise every pixel to the power `exponent`.
    pub fn pow_assign(&mut self, exponent: f64) {
        self.map_in_place(|v| v.powf(exponent));
    }

    pub fn try_bitand_assign(&mut self, rhs: impl Into<Operand>) -> Result<()> {
        self.combine_bits("bitand", rhs.into(), |a, b| a & b)
    }

    pub fn try_bitxor_assign(&mut self, rhs: impl Into<Operand>) -> Result<()> {
        self.combine_bits("bitxor", rhs.into(), |a, b| a ^ b)
    }

    pub fn try_bitor_assign(&mut self, rhs: impl Into<Operand>) -> Result<()> {
        self.combine_bits("bitor", rhs.into(), |a, b| a | b)
    }
}

impl<A: Access> Image<A> {
    pub fn try_add(&self, rhs: impl Into<Operand>) -> Result<Image> {
        let mut out = self.copy();
        out.try_add_assign(rhs)?;
        Ok(out)
    }

    pub fn try_sub(&self, rhs: impl Into<Operand>) -> Result<Image> {
        let mut out = self.copy();
        out.try_sub_assign(rhs)?;
        Ok(out)
    }

    /// `operand - self`, with this image's dtype.
    pub fn try_rsub(&self, lhs: impl Into<Operand>) -> Result<Image> {
        let mut out = self.copy();
        out.try_rsub_assign(lhs)?;
        Ok(out)
    }

    pub fn try_mul(&self, rhs: impl Into<Operand>) -> Result<Image> {
        let mut out = self.copy();
        out.try_mul_assign(rhs)?;
        Ok(out)
    }

    pub fn try_div(&self, rhs: impl Into<Operand>) -> Result<Image> {
        let mut out = self.copy();
        out.try_div_assign(rhs)?;
        Ok(out)
    }

    /// `operand / self`, with this image's dtype.
    pub fn try_rdiv(&self, lhs: impl Into<Operand>) -> Result<Image> {
        let mut out = self.copy();
        out.try_rdiv_assign(lhs)?;
        Ok(out)
    }

    pub fn pow(&self, exponent: f64) -> Image {
        let mut out = self.copy();
        out.pow_assign(exponent);
        out
    }

    pub fn try_bitand(&self, rhs: impl Into<Operand>) -> Result<Image> {
        let mut out = self.copy();
        out.try_bitand_assign(rhs)?;
        Ok(out)
    }

    pub fn try_bitxor(&self, rhs: impl Into<Operand>) -> Result<Image> {
        let mut out = self.copy();
        out.try_bitxor_assign(rhs)?;
        Ok(out)
    }

    pub fn try_bitor(&self, rhs: impl Into<Operand>) -> Result<Image> {
        let mut out = self.copy();
        out.try_bitor_assign(rhs)?;
        Ok(out)
    }
}

// Scalar operands never fail, so the std operators are provided for them.

macro_rules! scalar_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl<A: Access> $trait<f64> for &Image<A> {
            type Output = Image;

            fn $method(self, rhs: f64) -> Image {
                let mut out = self.copy();
                out.map_in_place(|v| v $op rhs);
                out
            }
        }

        impl $assign_trait<f64> for Image<Mutable> {
            fn $assign_method(&mut self, rhs: f64) {
                self.map_in_place(|v| v $op rhs);
            }
        }
    };
}

scalar_op!(Add, add, AddAssign, add_assign, +);
scalar_op!(Sub, sub, SubAssign, sub_assign, -);
scalar_op!(Mul, mul, MulAssign, mul_assign, *);
scalar_op!(Div, div, DivAssign, div_assign, /);

impl<A: Access> Neg for &Image<A> {
    type Output = Image;

    fn neg(self) -> Image {
        let mut out = self.copy();
        out.map_in_place(|v| -v);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundsI;
    use ndarray::array;

    fn ints() -> Image {
        Image::from_array(array![[1i32, 2, 3], [4, 5, 6]])
    }

    #[test]
    fn scalar_arithmetic_keeps_dtype() {
        let im = ints();
        let out = im.try_add(0.7).unwrap();
        assert_eq!(out.dtype(), DType::I32);
        assert_eq!(out.pixels(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let out = im.try_div(2).unwrap();
        assert_eq!(out.pixels(), vec![0.0, 1.0, 1.0, 2.0, 2.0, 3.0]);
        assert_eq!(im.get(2, 1).unwrap(), 2.0);
    }

    #[test]
    fn reflected_forms() {
        let im = Image::from_array(array![[1.0f64, 2.0, 4.0]]);
        assert_eq!(im.try_rsub(10).unwrap().pixels(), vec![9.0, 8.0, 6.0]);
        assert_eq!(im.try_rdiv(8.0).unwrap().pixels(), vec![8.0, 4.0, 2.0]);
        assert_eq!(im.pow(2.0).pixels(), vec![1.0, 4.0, 16.0]);
    }

    #[test]
    fn image_operand_must_match_shape() {
        let mut im = ints();
        let other = Image::new(2, 3, DType::I32).unwrap();
        let err = im.try_add_assign(&other).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                expected: (2, 3),
                actual: (3, 2)
            }
        ));
        assert_eq!(im, ints());
    }

    #[test]
    fn image_operand_ignores_origin() {
        let mut im = ints();
        let mut other = ints();
        other.set_origin(-10, 40);
        im.try_mul_assign(&other).unwrap();
        assert_eq!(im.pixels(), vec![1.0, 4.0, 9.0, 16.0, 25.0, 36.0]);
    }

    #[test]
    fn aliased_operand_uses_snapshot() {
        let mut im = Image::from_array(array![[1.0f64, 2.0], [3.0, 4.0]]);
        let shifted = im.sub_image(BoundsI::new(1, 2, 1, 1)).unwrap();
        let mut top = im.sub_image(BoundsI::new(1, 2, 2, 2)).unwrap();
        top.try_add_assign(&shifted).unwrap();
        assert_eq!(im.pixels(), vec![1.0, 2.0, 4.0, 6.0]);

        let alias = im.clone();
        im.try_sub_assign(&alias).unwrap();
        assert_eq!(im.pixels(), vec![0.0; 4]);
    }

    #[test]
    fn float_into_int_truncates() {
        let mut im = ints();
        let factor = Image::from_array(array![[0.5f32, 0.5, 0.5], [0.5, 0.5, 0.5]]);
        im.try_mul_assign(&factor).unwrap();
        assert_eq!(im.pixels(), vec![0.0, 1.0, 1.0, 2.0, 2.0, 3.0]);
    }

    #[test]
    fn integer_overflow_saturates() {
        let mut im = Image::from_array(array![[i16::MAX, i16::MIN]]);
        im.try_add_assign(10).unwrap();
        assert_eq!(im.pixels(), vec![i16::MAX as f64, (i16::MIN + 10) as f64]);
        im.try_div_assign(0).unwrap();
        assert_eq!(im.pixels(), vec![i16::MAX as f64, i16::MIN as f64]);
    }

    #[test]
    fn bitwise_requires_integers() {
        let mut im = Image::from_array(array![[0b1100i16, 0b1010]]);
        im.try_bitand_assign(0b0110).unwrap();
        assert_eq!(im.pixels(), vec![4.0, 2.0]);
        assert_eq!(im.try_bitor(1).unwrap().pixels(), vec![5.0, 3.0]);
        assert_eq!(im.try_bitxor(7).unwrap().pixels(), vec![3.0, 5.0]);

        assert!(matches!(
            im.try_bitor_assign(1.0),
            Err(Error::UnsupportedDtype { op: "bitor", .. })
        ));
        let mut floats = Image::new(2, 1, DType::F32).unwrap();
        assert!(matches!(
            floats.try_bitxor_assign(1),
            Err(Error::UnsupportedDtype {
                dtype: DType::F32,
                ..
            })
        ));
        let float_img = Image::new(2, 1, DType::F64).unwrap();
        assert!(im.try_bitand_assign(&float_img).is_err());
    }

    #[test]
    fn bitwise_wraps_to_pixel_width() {
        let mut im = Image::from_array(array![[-1i16, 0x7fff]]);
        im.try_bitand_assign(0xffff).unwrap();
        assert_eq!(im.pixels(), vec![-1.0, 32767.0]);
        im.try_bitor_assign(i16::MIN as i32).unwrap();
        assert_eq!(im.pixels(), vec![-1.0, -1.0]);

        let mut wide = Image::from_array(array![[7i32, 1]]);
        wide.try_bitand_assign((1i64 << 40) | 5).unwrap();
        assert_eq!(wide.pixels(), vec![5.0, 1.0]);
        wide.try_bitxor_assign((1i64 << 60) + 1).unwrap();
        assert_eq!(wide.pixels(), vec![4.0, 0.0]);

        let mask = Image::from_array(array![[0x00ffi16, -256]]);
        let mut im = Image::from_array(array![[0x1234i16, 0x1234]]);
        im.try_bitand_assign(&mask).unwrap();
        assert_eq!(im.pixels(), vec![0x34 as f64, 0x1200 as f64]);
    }

    #[test]
    fn std_operators() {
        let im = Image::from_array(array![[1.0f64, -2.0]]);
        assert_eq!((&im + 1.0).pixels(), vec![2.0, -1.0]);
        assert_eq!((&im - 1.0).pixels(), vec![0.0, -3.0]);
        assert_eq!((&im * 3.0).pixels(), vec![3.0, -6.0]);
        assert_eq!((&im / 2.0).pixels(), vec![0.5, -1.0]);
        assert_eq!((-&im).pixels(), vec![-1.0, 2.0]);

        let mut m = im.copy();
        m += 1.0;
        m *= 2.0;
        m -= 1.0;
        m /= 4.0;
        assert_eq!(m.pixels(), vec![0.75, -0.75]);
        assert_eq!(im.pixels(), vec![1.0, -2.0]);
    }

    #[test]
    fn const_images_support_out_of_place() {
        let c = ints().into_const();
        let doubled = c.try_mul(2).unwrap();
        assert!(!doubled.is_const());
        assert_eq!(doubled.get(3, 2).unwrap(), 12.0);
        assert_eq!((&c + 1.0).get(1, 1).unwrap(), 2.0);
    }
}
