//! Checked construction of images from the supported argument combinations.

use ndarray::Array2;

use super::{ConstImage, Image};
use crate::bounds::BoundsI;
use crate::dtype::{DType, PixelBuffer, PixelData};
use crate::error::{Error, Result};
use crate::wcs::Wcs;

/// Collects constructor arguments and validates their combination on `build`.
///
/// At most one source may be given: `size`, `bounds`, `array`/`buffer`, or
/// `image`. With none, the result is an empty placeholder without storage.
///
/// ```
/// use skybuf::{DType, Image};
///
/// let im = Image::builder()
///     .size(16, 8)
///     .dtype(DType::F64)
///     .init_value(1.0)
///     .scale(0.2)
///     .build()
///     .unwrap();
/// assert_eq!(im.shape(), (8, 16));
/// assert_eq!(im.get(16, 8).unwrap(), 1.0);
/// ```
#[derive(Debug, Default)]
pub struct ImageBuilder {
    size: Option<(i32, i32)>,
    bounds: Option<BoundsI>,
    array: Option<(PixelData, usize, usize)>,
    buffer: Option<(PixelBuffer, usize, usize)>,
    image: Option<Image>,
    dtype: Option<DType>,
    init_value: Option<f64>,
    origin: Option<(i32, i32)>,
    scale: Option<f64>,
    wcs: Option<Wcs>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        ImageBuilder::default()
    }

    /// Allocate `ncol` x `nrow` pixels with origin `(1, 1)`.
    pub fn size(mut self, ncol: i32, nrow: i32) -> Self {
        self.size = Some((ncol, nrow));
        self
    }

    /// Allocate storage covering `bounds`.
    pub fn bounds(mut self, bounds: BoundsI) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Take ownership of a `[row, col]` array.
    pub fn array<T>(mut self, array: Array2<T>) -> Self
    where
        T: Copy,
        Vec<T>: Into<PixelData>,
    {
        let (nrow, ncol) = array.dim();
        let data: Vec<T> = array.iter().copied().collect();
        self.array = Some((data.into(), ncol, nrow));
        self
    }

    /// Alias caller-held storage laid out row-major as `nrow` rows of `ncol`.
    pub fn buffer(mut self, buffer: PixelBuffer, ncol: usize, nrow: usize) -> Self {
        self.buffer = Some((buffer, ncol, nrow));
        self
    }

    /// Alias another image (or copy it when a different dtype is requested).
    pub fn image(mut self, image: &Image) -> Self {
        self.image = Some(image.clone());
        self
    }

    pub fn dtype(mut self, dtype: DType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    /// Initial value for every pixel of a `size` or `bounds` image.
    pub fn init_value(mut self, value: f64) -> Self {
        self.init_value = Some(value);
        self
    }

    /// Lower-left pixel of an `array` or `buffer` image.
    pub fn origin(mut self, xmin: i32, ymin: i32) -> Self {
        self.origin = Some((xmin, ymin));
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn wcs(mut self, wcs: Wcs) -> Self {
        self.wcs = Some(wcs);
        self
    }

    fn check(&self) -> Result<()> {
        if self.scale.is_some() && self.wcs.is_some() {
            return Err(Error::BadArguments("cannot provide both scale and wcs".into()));
        }
        let given: Vec<&str> = [
            ("size", self.size.is_some()),
            ("bounds", self.bounds.is_some()),
            ("array", self.array.is_some()),
            ("buffer", self.buffer.is_some()),
            ("image", self.image.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();
        if given.len() > 1 {
            return Err(Error::BadArguments(format!(
                "cannot specify both {}",
                given.join(" and ")
            )));
        }
        if self.init_value.is_some() && self.size.is_none() && self.bounds.is_none() {
            return Err(Error::BadArguments(
                "init_value is only valid with size or bounds".into(),
            ));
        }
        if self.origin.is_some() && self.array.is_none() && self.buffer.is_none() {
            return Err(Error::BadArguments(
                "origin is only valid with array or buffer".into(),
            ));
        }
        Ok(())
    }

    fn assemble(self) -> Result<Image> {
        self.check()?;
        let wcs = self.scale.map(Wcs::pixel_scale).or(self.wcs);
        let init = self.init_value.unwrap_or(0.0);
        let (x0, y0) = self.origin.unwrap_or((1, 1));

        let mut image = if let Some((ncol, nrow)) = self.size {
            if ncol <= 0 || nrow <= 0 {
                return Err(Error::BadArguments(format!(
                    "image size must be positive, got ncol={ncol}, nrow={nrow}"
                )));
            }
            let bounds = BoundsI::new(1, ncol, 1, nrow);
            Image::allocate(bounds, self.dtype.unwrap_or_default(), init)
        } else if let Some(bounds) = self.bounds {
            Image::allocate(bounds, self.dtype.unwrap_or_default(), init)
        } else if let Some((data, ncol, nrow)) = self.array {
            let bounds = BoundsI::new(x0, x0 + ncol as i32 - 1, y0, y0 + nrow as i32 - 1);
            let data = match self.dtype {
                Some(dt) if dt != data.dtype() => data.converted(dt),
                _ => data,
            };
            if bounds.is_defined() {
                Image::from_data(data, bounds)
            } else {
                Image::empty(data.dtype())
            }
        } else if let Some((buffer, ncol, nrow)) = self.buffer {
            if ncol == 0 || nrow == 0 {
                return Err(Error::BadArguments(format!(
                    "buffer image size must be positive, got ncol={ncol}, nrow={nrow}"
                )));
            }
            if buffer.len() != ncol * nrow {
                return Err(Error::ShapeMismatch {
                    expected: (nrow, ncol),
                    actual: (1, buffer.len()),
                });
            }
            let bounds = BoundsI::new(x0, x0 + ncol as i32 - 1, y0, y0 + nrow as i32 - 1);
            match self.dtype {
                Some(dt) if dt != buffer.dtype() => {
                    Image::from_data(buffer.borrow().converted(dt), bounds)
                }
                _ => {
                    let dtype = buffer.dtype();
                    Image::from_parts(Some(buffer), 0, ncol, bounds, dtype, None)
                }
            }
        } else if let Some(source) = self.image {
            Image::from_image(&source, self.dtype)
        } else {
            Image::empty(self.dtype.unwrap_or_default())
        };

        if wcs.is_some() {
            image.wcs = wcs;
        }
        Ok(image)
    }

    /// Build a mutable image.
    pub fn build(self) -> Result<Image> {
        self.assemble()
    }

    /// Build a read-only image.
    pub fn build_const(self) -> Result<ConstImage> {
        Ok(self.assemble()?.into_const())
    }
}
