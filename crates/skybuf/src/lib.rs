//! Pixel buffers with shared-storage views, and interpolation tables.
//!
//! [`Image`] is a handle onto a rectangular region of pixel storage with an
//! integer coordinate origin and an optional [`Wcs`]. Views, sub-images and
//! plain clones alias the same storage; [`ConstImage`] handles can only read.
//! The [`table`] module provides 1D and 2D lookup tables.

pub mod bounds;
pub mod dtype;
pub mod error;
pub mod image;
pub mod table;
pub mod wcs;

pub use bounds::{BoundsD, BoundsI, PositionD, PositionI};
pub use dtype::{DType, Pixel, PixelBuffer, PixelData};
pub use error::{Error, Result};
pub use image::{
    Access, ConstImage, Image, ImageBuilder, ImageValues, MomentRadius, Mutable, Operand,
    RadiusKind, ReadOnly, ViewOptions,
};
pub use table::{EdgeMode, Interpolant, LookupTable, LookupTable2D, TableOptions};
pub use wcs::{LinearTransform, Wcs};
