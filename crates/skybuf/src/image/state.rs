//! Serde support for images.
//!
//! An image is stored as its own pixels (contiguous, row-major), the shape,
//! the lower-left corner and the WCS. Deserializing always yields an image
//! with fresh, unshared storage.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Access, Image};
use crate::bounds::BoundsI;
use crate::dtype::PixelData;
use crate::error::{Error, Result};
use crate::wcs::Wcs;

#[derive(Serialize, Deserialize)]
#[serde(rename = "Image")]
struct ImageState {
    pixels: PixelData,
    ncol: usize,
    nrow: usize,
    xmin: i32,
    ymin: i32,
    wcs: Option<Wcs>,
}

impl ImageState {
    fn capture<A: Access>(image: &Image<A>) -> Self {
        let (nrow, ncol) = image.shape();
        ImageState {
            pixels: image
                .gather()
                .unwrap_or_else(|| PixelData::zeros(image.dtype(), 0)),
            ncol,
            nrow,
            xmin: image.xmin(),
            ymin: image.ymin(),
            wcs: image.wcs,
        }
    }

    fn restore<A: Access>(self) -> Result<Image<A>> {
        let count = self.ncol.checked_mul(self.nrow).ok_or_else(|| {
            Error::InvalidValue(format!("{} x {} pixels overflows", self.ncol, self.nrow))
        })?;
        if self.pixels.len() != count {
            return Err(Error::ShapeMismatch {
                expected: (self.nrow, self.ncol),
                actual: (1, self.pixels.len()),
            });
        }
        let mut image = if count == 0 {
            Image::from_parts(None, 0, 0, BoundsI::undefined(), self.pixels.dtype(), None)
        } else {
            let xmax = last_coord(self.xmin, self.ncol)?;
            let ymax = last_coord(self.ymin, self.nrow)?;
            Image::from_data(self.pixels, BoundsI::new(self.xmin, xmax, self.ymin, ymax))
        };
        image.wcs = self.wcs;
        Ok(image)
    }
}

/// Last coordinate of a run of `len` pixels starting at `min`.
fn last_coord(min: i32, len: usize) -> Result<i32> {
    i32::try_from(len - 1)
        .ok()
        .and_then(|span| min.checked_add(span))
        .ok_or_else(|| {
            Error::InvalidValue(format!("{len} pixels from {min} leave the i32 coordinate range"))
        })
}

impl<A: Access> Serialize for Image<A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ImageState::capture(self).serialize(serializer)
    }
}

impl<'de, A: Access> Deserialize<'de> for Image<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        ImageState::deserialize(deserializer)?
            .restore()
            .map_err(D::Error::custom)
    }
}
