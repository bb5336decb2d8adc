//! Image buffers with shared-storage views.
//!
//! An [`Image`] is a handle onto a rectangular region of a [`PixelBuffer`]:
//! an element offset, a row stride, integer [`BoundsI`] and an optional
//! [`Wcs`]. Several handles can alias one buffer; writes through any mutable
//! handle are visible through all of them. Only [`Image::copy`] (and a dtype
//! change) produces independent storage.
//!
//! Handles are typed by access. `Image` (`Image<Mutable>`) may write pixels;
//! [`ConstImage`] (`Image<ReadOnly>`) exposes only the reading half of the
//! API, so a const view can never be the target of a write.
//!
//! Pixel `(x, y)` lives at storage row `y - ymin`, column `x - xmin`: `x` is
//! the column and `y` the row, as in most astronomy tools.

mod arith;
mod builder;
#[cfg(feature = "serde")]
mod state;
mod stats;

use std::fmt;
use std::marker::PhantomData;

use log::{debug, trace};
use ndarray::{Array2, ArrayView2, ArrayViewMut2, ShapeBuilder};

use crate::bounds::{BoundsI, PositionD, PositionI};
use crate::dtype::{DType, Pixel, PixelBuffer, PixelData};
use crate::error::{Error, Result};
use crate::wcs::Wcs;

pub use arith::{ImageValues, Operand};
pub use builder::ImageBuilder;
pub use stats::{MomentRadius, RadiusKind};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Mutable {}
    impl Sealed for super::ReadOnly {}
}

/// Access marker for image handles. Implemented by [`Mutable`] and [`ReadOnly`].
pub trait Access: sealed::Sealed + 'static {
    const WRITABLE: bool;
}

/// Marker for handles that may write pixels.
#[derive(Debug)]
pub enum Mutable {}

/// Marker for read-only handles.
#[derive(Debug)]
pub enum ReadOnly {}

impl Access for Mutable {
    const WRITABLE: bool = true;
}

impl Access for ReadOnly {
    const WRITABLE: bool = false;
}

/// A read-only image handle.
pub type ConstImage = Image<ReadOnly>;

/// A handle onto a rectangular region of pixel storage.
pub struct Image<A: Access = Mutable> {
    buffer: Option<PixelBuffer>,
    offset: usize,
    stride: usize,
    bounds: BoundsI,
    dtype: DType,
    wcs: Option<Wcs>,
    access: PhantomData<A>,
}

/// Optional changes applied by [`Image::view`] and [`Image::const_view`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewOptions {
    /// Use a pixel-scale WCS with this scale.
    pub scale: Option<f64>,
    /// Use this WCS.
    pub wcs: Option<Wcs>,
    /// Move the view so its lower-left pixel is here.
    pub origin: Option<PositionI>,
    /// Move the view so its nominal center is here.
    pub center: Option<PositionI>,
}

/// Copy `nrow` rows of `ncol` elements out of strided storage.
fn gather_rows<T: Copy>(src: &[T], offset: usize, stride: usize, nrow: usize, ncol: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(nrow * ncol);
    for row in 0..nrow {
        let start = offset + row * stride;
        out.extend_from_slice(&src[start..start + ncol]);
    }
    out
}

impl<A: Access> Image<A> {
    fn from_parts(
        buffer: Option<PixelBuffer>,
        offset: usize,
        stride: usize,
        bounds: BoundsI,
        dtype: DType,
        wcs: Option<Wcs>,
    ) -> Self {
        Image {
            buffer,
            offset,
            stride,
            bounds,
            dtype,
            wcs,
            access: PhantomData,
        }
    }

    /// Owned, contiguous storage for `bounds`, every pixel set to `init`.
    fn allocate(bounds: BoundsI, dtype: DType, init: f64) -> Self {
        if !bounds.is_defined() {
            return Image::from_parts(None, 0, 0, bounds, dtype, None);
        }
        let data = PixelData::filled(dtype, bounds.area(), init);
        Image::from_parts(
            Some(PixelBuffer::new(data)),
            0,
            bounds.ncol(),
            bounds,
            dtype,
            None,
        )
    }

    /// Owned storage holding `data` laid out row-major over `bounds`.
    fn from_data(data: PixelData, bounds: BoundsI) -> Self {
        let dtype = data.dtype();
        Image::from_parts(
            Some(PixelBuffer::new(data)),
            0,
            bounds.ncol(),
            bounds,
            dtype,
            None,
        )
    }

    /// The same handle with a different access marker.
    fn with_access<B: Access>(&self) -> Image<B> {
        Image::from_parts(
            self.buffer.clone(),
            self.offset,
            self.stride,
            self.bounds,
            self.dtype,
            self.wcs,
        )
    }

    /// Owned copy converted to `dtype`.
    fn retyped(&self, dtype: DType) -> Image {
        let mut out = match self.gather() {
            Some(data) => Image::from_data(data.converted(dtype), self.bounds),
            None => Image::from_parts(None, 0, 0, self.bounds, dtype, None),
        };
        out.wcs = self.wcs;
        out
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn bounds(&self) -> BoundsI {
        self.bounds
    }

    pub fn xmin(&self) -> i32 {
        self.bounds.xmin()
    }

    pub fn xmax(&self) -> i32 {
        self.bounds.xmax()
    }

    pub fn ymin(&self) -> i32 {
        self.bounds.ymin()
    }

    pub fn ymax(&self) -> i32 {
        self.bounds.ymax()
    }

    pub fn ncol(&self) -> usize {
        self.bounds.ncol()
    }

    pub fn nrow(&self) -> usize {
        self.bounds.nrow()
    }

    /// Storage shape `(nrow, ncol)`.
    pub fn shape(&self) -> (usize, usize) {
        self.bounds.shape()
    }

    /// Whether the image has pixel storage.
    pub fn is_defined(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn is_const(&self) -> bool {
        !A::WRITABLE
    }

    /// Whether both handles alias the same allocation.
    pub fn shares_storage_with<B: Access>(&self, other: &Image<B>) -> bool {
        match (&self.buffer, &other.buffer) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn wcs(&self) -> Option<&Wcs> {
        self.wcs.as_ref()
    }

    pub fn set_wcs(&mut self, wcs: Option<Wcs>) {
        self.wcs = wcs;
    }

    /// The pixel scale, `None` without a WCS.
    ///
    /// Fails with [`Error::NotPixelScale`] when the WCS is not a pixel scale.
    pub fn scale(&self) -> Result<Option<f64>> {
        match &self.wcs {
            None => Ok(None),
            Some(w) => w.scale().map(Some).ok_or(Error::NotPixelScale),
        }
    }

    /// Replace the WCS with a pixel scale. Refused when the current WCS is
    /// something more general.
    pub fn set_scale(&mut self, scale: f64) -> Result<()> {
        if let Some(w) = &self.wcs {
            if !w.is_pixel_scale() {
                return Err(Error::NotPixelScale);
            }
        }
        self.wcs = Some(Wcs::pixel_scale(scale));
        Ok(())
    }

    /// The lower-left pixel `(xmin, ymin)`.
    pub fn origin(&self) -> PositionI {
        self.bounds.origin()
    }

    /// The nominal center pixel; even extents round up.
    pub fn center(&self) -> PositionI {
        self.bounds.center()
    }

    /// The exact center, half-integer along even extents.
    pub fn true_center(&self) -> PositionD {
        self.bounds.true_center()
    }

    fn storage(&self) -> Result<&PixelBuffer> {
        self.buffer.as_ref().ok_or(Error::Undefined)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        self.offset
            + (y - self.bounds.ymin()) as usize * self.stride
            + (x - self.bounds.xmin()) as usize
    }

    fn check_pixel(&self, x: i32, y: i32) -> Result<()> {
        if self.bounds.includes(x, y) {
            return Ok(());
        }
        let b = &self.bounds;
        let mut parts = Vec::new();
        if x < b.xmin() || x > b.xmax() {
            parts.push(format!(
                "column {x}, range is {} to {}",
                b.xmin(),
                b.xmax()
            ));
        }
        if y < b.ymin() || y > b.ymax() {
            parts.push(format!("row {y}, range is {} to {}", b.ymin(), b.ymax()));
        }
        Err(Error::OutOfBounds(format!(
            "attempt to access {}",
            parts.join(" and ")
        )))
    }

    /// Storage indices of every pixel in row-major order.
    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        let (nrow, ncol) = self.shape();
        (0..nrow).flat_map(move |row| {
            let start = self.offset + row * self.stride;
            start..start + ncol
        })
    }

    /// The value at `(x, y)`, bounds-checked.
    pub fn get(&self, x: i32, y: i32) -> Result<f64> {
        let buffer = self.storage()?;
        self.check_pixel(x, y)?;
        Ok(buffer.borrow().get(self.index(x, y)))
    }

    /// Every pixel value, row-major (`y` outer, `x` inner).
    pub fn pixels(&self) -> Vec<f64> {
        match &self.buffer {
            Some(buffer) => {
                let data = buffer.borrow();
                self.indices().map(|i| data.get(i)).collect()
            }
            None => Vec::new(),
        }
    }

    /// Contiguous copy of this handle's region, in its own kind.
    fn gather(&self) -> Option<PixelData> {
        let buffer = self.buffer.as_ref()?;
        let data = buffer.borrow();
        let (nrow, ncol) = self.shape();
        let (o, s) = (self.offset, self.stride);
        Some(match &*data {
            PixelData::I16(v) => PixelData::I16(gather_rows(v, o, s, nrow, ncol)),
            PixelData::I32(v) => PixelData::I32(gather_rows(v, o, s, nrow, ncol)),
            PixelData::F32(v) => PixelData::F32(gather_rows(v, o, s, nrow, ncol)),
            PixelData::F64(v) => PixelData::F64(gather_rows(v, o, s, nrow, ncol)),
        })
    }

    /// A `[row, col]` array of the pixel values widened to `f64`.
    pub fn to_array(&self) -> Array2<f64> {
        match &self.buffer {
            Some(buffer) => {
                let data = buffer.borrow();
                Array2::from_shape_fn(self.shape(), |(row, col)| {
                    data.get(self.offset + row * self.stride + col)
                })
            }
            None => Array2::zeros((0, 0)),
        }
    }

    /// Run `f` on a zero-copy `[row, col]` view of the storage.
    ///
    /// There is no per-pixel bounds checking inside `f`. `T` must be the
    /// image's element type.
    pub fn with_array<T: Pixel, R>(&self, f: impl FnOnce(ArrayView2<'_, T>) -> R) -> Result<R> {
        let buffer = self.storage()?;
        if T::DTYPE != self.dtype {
            return Err(Error::UnsupportedDtype {
                op: "with_array",
                dtype: self.dtype,
            });
        }
        let data = buffer.borrow();
        let slice = T::slice(&data).ok_or(Error::UnsupportedDtype {
            op: "with_array",
            dtype: data.dtype(),
        })?;
        let shape = self.shape().strides((self.stride, 1));
        let view = ArrayView2::from_shape(shape, &slice[self.offset..])
            .map_err(|e| Error::InvalidValue(e.to_string()))?;
        Ok(f(view))
    }

    /// Deep copy into new, independently owned storage. Bounds and WCS are kept.
    pub fn copy(&self) -> Image {
        let mut out = match self.gather() {
            Some(data) => Image::from_data(data, self.bounds),
            None => Image::from_parts(None, 0, 0, self.bounds, self.dtype, None),
        };
        out.wcs = self.wcs;
        out
    }

    fn view_as<B: Access>(&self, opts: ViewOptions) -> Result<Image<B>> {
        if opts.origin.is_some() && opts.center.is_some() {
            return Err(Error::BadArguments(
                "cannot provide both center and origin".into(),
            ));
        }
        let wcs = match (opts.scale, opts.wcs) {
            (Some(_), Some(_)) => {
                return Err(Error::BadArguments("cannot provide both scale and wcs".into()))
            }
            (Some(scale), None) => Some(Wcs::pixel_scale(scale)),
            (None, Some(wcs)) => Some(wcs),
            (None, None) => self.wcs,
        };
        let mut view: Image<B> = self.with_access();
        view.wcs = wcs;
        if let Some(origin) = opts.origin {
            view.set_origin(origin.x, origin.y);
        } else if let Some(center) = opts.center {
            view.set_center(center.x, center.y);
        }
        trace!("new view over {} (const: {})", view.bounds, !B::WRITABLE);
        Ok(view)
    }

    /// A new handle on the same storage, with the same access.
    ///
    /// At most one of `scale`/`wcs` and at most one of `origin`/`center` may
    /// be given. Without `scale`/`wcs` the view keeps this WCS.
    pub fn view(&self, opts: ViewOptions) -> Result<Image<A>> {
        self.view_as(opts)
    }

    /// A read-only handle on the same storage.
    pub fn const_view(&self, opts: ViewOptions) -> Result<ConstImage> {
        self.view_as(opts)
    }

    /// A view of the pixels inside `bounds`, aliasing this storage.
    ///
    /// The WCS is unchanged since the pixels keep their coordinates.
    pub fn sub_image(&self, bounds: BoundsI) -> Result<Image<A>> {
        self.storage()?;
        if !self.bounds.includes_bounds(&bounds) {
            return Err(Error::OutOfBounds(format!(
                "subimage bounds {bounds} are outside original image bounds {}",
                self.bounds
            )));
        }
        let mut sub: Image<A> = self.with_access();
        sub.offset = self.index(bounds.xmin(), bounds.ymin());
        sub.bounds = bounds;
        trace!("sub-image {} of {}", bounds, self.bounds);
        Ok(sub)
    }

    /// The single primitive behind every origin change: move the bounds by
    /// `delta` without touching storage, and re-origin the WCS by the same
    /// amount.
    fn apply_shift(&mut self, delta: PositionI) {
        if delta == PositionI::default() {
            return;
        }
        self.bounds = self.bounds.shifted(delta.x, delta.y);
        if let Some(wcs) = &self.wcs {
            self.wcs = Some(wcs.shifted(delta));
        }
    }

    /// Shift pixel coordinates by `(dx, dy)`: the pixel formerly at `(x, y)`
    /// is now at `(x + dx, y + dy)`.
    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.apply_shift(PositionI::new(dx, dy));
    }

    /// Move the image so the lower-left pixel is at `(x0, y0)`.
    pub fn set_origin(&mut self, x0: i32, y0: i32) {
        let delta = PositionI::new(x0, y0) - self.bounds.origin();
        self.apply_shift(delta);
    }

    /// Move the image so its nominal center (see [`BoundsI::center`]) is at
    /// `(xcen, ycen)`.
    pub fn set_center(&mut self, xcen: i32, ycen: i32) {
        let delta = PositionI::new(xcen, ycen) - self.bounds.center();
        self.apply_shift(delta);
    }
}

impl Image<Mutable> {
    /// A new `ncol` x `nrow` image with origin `(1, 1)`, filled with zeros.
    pub fn new(ncol: i32, nrow: i32, dtype: DType) -> Result<Image> {
        ImageBuilder::new().size(ncol, nrow).dtype(dtype).build()
    }

    /// A new zero-filled image covering `bounds`. Undefined bounds give an
    /// image without storage.
    pub fn with_bounds(bounds: BoundsI, dtype: DType) -> Image {
        Image::allocate(bounds, dtype, 0.0)
    }

    /// A placeholder with no storage and undefined bounds; see [`Image::resize`].
    pub fn empty(dtype: DType) -> Image {
        Image::from_parts(None, 0, 0, BoundsI::undefined(), dtype, None)
    }

    /// An image owning the elements of a `[row, col]` array, origin `(1, 1)`.
    /// Unsigned elements are narrowed to the signed kind of equal width.
    pub fn from_array<T>(array: Array2<T>) -> Image
    where
        T: Copy,
        Vec<T>: Into<PixelData>,
    {
        let (nrow, ncol) = array.dim();
        let data: Vec<T> = array.iter().copied().collect();
        let bounds = BoundsI::new(1, ncol as i32, 1, nrow as i32);
        if bounds.is_defined() {
            Image::from_data(data.into(), bounds)
        } else {
            let data: PixelData = data.into();
            Image::empty(data.dtype())
        }
    }

    /// A view over caller-held storage laid out row-major as `nrow` rows of
    /// `ncol` elements, origin `(1, 1)`.
    pub fn from_buffer(buffer: &PixelBuffer, ncol: usize, nrow: usize) -> Result<Image> {
        ImageBuilder::new().buffer(buffer.clone(), ncol, nrow).build()
    }

    /// An alias of `image` when `dtype` is absent or matches, otherwise an
    /// owned copy converted to `dtype`. The WCS is kept either way, and so is
    /// the access kind of `image`.
    pub fn from_image<B: Access>(image: &Image<B>, dtype: Option<DType>) -> Image<B> {
        match dtype {
            Some(dt) if dt != image.dtype => image.retyped(dt).with_access(),
            _ => image.with_access(),
        }
    }

    /// Start an [`ImageBuilder`].
    pub fn builder() -> ImageBuilder {
        ImageBuilder::new()
    }

    /// Give up write access.
    pub fn into_const(self) -> ConstImage {
        self.with_access()
    }

    /// The shared storage behind this handle.
    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }

    /// Store `value` at `(x, y)`, cast to the image's kind.
    pub fn set_value(&mut self, x: i32, y: i32, value: f64) -> Result<()> {
        let buffer = self.storage()?;
        self.check_pixel(x, y)?;
        buffer.borrow_mut().set(self.index(x, y), value);
        Ok(())
    }

    /// Apply `f` to every pixel value in place.
    fn map_in_place(&mut self, f: impl Fn(f64) -> f64) {
        if let Some(buffer) = &self.buffer {
            let mut data = buffer.borrow_mut();
            for i in self.indices() {
                let v = data.get(i);
                data.set(i, f(v));
            }
        }
    }

    /// Set every pixel to `value`.
    pub fn fill(&mut self, value: f64) {
        self.map_in_place(|_| value);
    }

    pub fn set_zero(&mut self) {
        self.fill(0.0);
    }

    /// Replace every value `v` with `1 / v`; zeros stay zero.
    pub fn invert_self(&mut self) {
        self.map_in_place(|v| if v == 0.0 { 0.0 } else { 1.0 / v });
    }

    /// Copy the values of `rhs` into this region. Shapes must match.
    pub fn copy_from<B: Access>(&mut self, rhs: &Image<B>) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(Error::ShapeMismatch {
                expected: self.shape(),
                actual: rhs.shape(),
            });
        }
        let values = rhs.pixels();
        if let Some(buffer) = &self.buffer {
            let mut data = buffer.borrow_mut();
            for (i, v) in self.indices().zip(values) {
                data.set(i, v);
            }
        }
        Ok(())
    }

    /// Copy `rhs` into the part of this image covered by `bounds`.
    pub fn set_sub_image<B: Access>(&mut self, bounds: BoundsI, rhs: &Image<B>) -> Result<()> {
        self.sub_image(bounds)?.copy_from(rhs)
    }

    /// Run `f` on a zero-copy, writable `[row, col]` view of the storage.
    pub fn with_array_mut<T: Pixel, R>(
        &mut self,
        f: impl FnOnce(ArrayViewMut2<'_, T>) -> R,
    ) -> Result<R> {
        let buffer = self.storage()?;
        if T::DTYPE != self.dtype {
            return Err(Error::UnsupportedDtype {
                op: "with_array_mut",
                dtype: self.dtype,
            });
        }
        let mut data = buffer.borrow_mut();
        let dtype = data.dtype();
        let slice = T::slice_mut(&mut data).ok_or(Error::UnsupportedDtype {
            op: "with_array_mut",
            dtype,
        })?;
        let shape = self.shape().strides((self.stride, 1));
        let view = ArrayViewMut2::from_shape(shape, &mut slice[self.offset..])
            .map_err(|e| Error::InvalidValue(e.to_string()))?;
        Ok(f(view))
    }

    /// Give this image storage for `bounds`.
    ///
    /// Pixel values after a resize are unspecified: when this handle is the
    /// only one on its allocation and the allocation is large enough it is
    /// reused as-is with the new geometry, otherwise fresh storage is
    /// allocated. Either way the image stops aliasing earlier views.
    /// Undefined bounds release the storage. A given `wcs` replaces the
    /// current one.
    pub fn resize(&mut self, bounds: BoundsI, wcs: Option<Wcs>) {
        if !bounds.is_defined() {
            debug!("releasing image storage");
            self.buffer = None;
            self.offset = 0;
            self.stride = 0;
        } else {
            let reusable = self
                .buffer
                .as_ref()
                .is_some_and(|b| b.handle_count() == 1 && b.len() >= bounds.area());
            if reusable {
                debug!("resize to {bounds} reuses existing allocation");
            } else {
                debug!("resize to {bounds} allocates {} pixels", bounds.area());
                self.buffer = Some(PixelBuffer::new(PixelData::zeros(self.dtype, bounds.area())));
            }
            self.offset = 0;
            self.stride = bounds.ncol();
        }
        self.bounds = bounds;
        if wcs.is_some() {
            self.wcs = wcs;
        }
    }
}

impl Default for Image<Mutable> {
    fn default() -> Self {
        Image::empty(DType::default())
    }
}

/// Cloning a handle aliases its storage, like a [`Image::view`] without options.
impl<A: Access> Clone for Image<A> {
    fn clone(&self) -> Self {
        self.with_access()
    }
}

impl<A: Access> fmt::Debug for Image<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("bounds", &self.bounds)
            .field("dtype", &self.dtype)
            .field("wcs", &self.wcs)
            .field("const", &!A::WRITABLE)
            .finish()
    }
}

impl<A: Access> fmt::Display for Image<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wcs.as_ref().and_then(|w| w.scale()) {
            Some(scale) => write!(f, "Image(bounds={}, scale={scale})", self.bounds),
            None => match &self.wcs {
                Some(wcs) => write!(f, "Image(bounds={}, wcs={wcs})", self.bounds),
                None => write!(f, "Image(bounds={}, wcs=None)", self.bounds),
            },
        }
    }
}

/// Value equality: same bounds, same WCS, numerically equal pixels
/// regardless of element kind.
impl<A: Access, B: Access> PartialEq<Image<B>> for Image<A> {
    fn eq(&self, other: &Image<B>) -> bool {
        self.bounds == other.bounds && self.wcs == other.wcs && self.pixels() == other.pixels()
    }
}
