//! World coordinate systems attached to images.
//!
//! Only uniform (affine) transforms are modelled: a pure pixel scale, or a
//! general 2x2 Jacobian. Each carries an image-plane origin and a world-plane
//! origin so that shifting an image can re-origin its WCS without changing
//! the world position of any pixel.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::{PositionD, PositionI};
use crate::error::{Error, Result};

/// The linear part of a uniform WCS.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LinearTransform {
    /// `u = scale * x`, `v = scale * y`.
    PixelScale(f64),
    /// `u = dudx * x + dudy * y`, `v = dvdx * x + dvdy * y`.
    Jacobian {
        dudx: f64,
        dudy: f64,
        dvdx: f64,
        dvdy: f64,
    },
}

/// A uniform world coordinate system.
///
/// `world = world_origin + J * (image - origin)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Wcs {
    transform: LinearTransform,
    origin: PositionD,
    world_origin: PositionD,
}

impl Wcs {
    /// A simple pixel scale with both origins at zero.
    pub fn pixel_scale(scale: f64) -> Self {
        Wcs {
            transform: LinearTransform::PixelScale(scale),
            origin: PositionD::default(),
            world_origin: PositionD::default(),
        }
    }

    pub fn jacobian(dudx: f64, dudy: f64, dvdx: f64, dvdy: f64) -> Self {
        Wcs {
            transform: LinearTransform::Jacobian {
                dudx,
                dudy,
                dvdx,
                dvdy,
            },
            origin: PositionD::default(),
            world_origin: PositionD::default(),
        }
    }

    /// Replace both origins.
    pub fn with_origin(mut self, origin: PositionD, world_origin: PositionD) -> Self {
        self.origin = origin;
        self.world_origin = world_origin;
        self
    }

    pub fn transform(&self) -> LinearTransform {
        self.transform
    }

    pub fn origin(&self) -> PositionD {
        self.origin
    }

    pub fn world_origin(&self) -> PositionD {
        self.world_origin
    }

    pub fn is_pixel_scale(&self) -> bool {
        matches!(self.transform, LinearTransform::PixelScale(_))
    }

    /// The pixel scale, when this WCS is one.
    pub fn scale(&self) -> Option<f64> {
        match self.transform {
            LinearTransform::PixelScale(s) => Some(s),
            LinearTransform::Jacobian { .. } => None,
        }
    }

    /// Matrix entries `(dudx, dudy, dvdx, dvdy)`.
    fn matrix(&self) -> (f64, f64, f64, f64) {
        match self.transform {
            LinearTransform::PixelScale(s) => (s, 0.0, 0.0, s),
            LinearTransform::Jacobian {
                dudx,
                dudy,
                dvdx,
                dvdy,
            } => (dudx, dudy, dvdx, dvdy),
        }
    }

    /// World area of one pixel.
    pub fn pixel_area(&self) -> f64 {
        let (a, b, c, d) = self.matrix();
        (a * d - b * c).abs()
    }

    pub fn to_world(&self, image_pos: PositionD) -> PositionD {
        let (a, b, c, d) = self.matrix();
        let p = image_pos - self.origin;
        PositionD::new(a * p.x + b * p.y, c * p.x + d * p.y) + self.world_origin
    }

    pub fn to_image(&self, world_pos: PositionD) -> Result<PositionD> {
        let (a, b, c, d) = self.matrix();
        let det = a * d - b * c;
        if det == 0.0 {
            return Err(Error::InvalidValue("WCS transform is singular".into()));
        }
        let w = world_pos - self.world_origin;
        let x = (d * w.x - b * w.y) / det;
        let y = (-c * w.x + a * w.y) / det;
        Ok(PositionD::new(x, y) + self.origin)
    }

    /// The WCS for an image whose pixel coordinates moved by `delta`, such
    /// that `shifted.to_world(p + delta) == self.to_world(p)`.
    pub fn shifted(&self, delta: PositionI) -> Wcs {
        let mut out = *self;
        out.origin = self.origin + PositionD::from(delta);
        out
    }
}

impl fmt::Display for Wcs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transform {
            LinearTransform::PixelScale(s) => write!(f, "PixelScale({s})")?,
            LinearTransform::Jacobian {
                dudx,
                dudy,
                dvdx,
                dvdy,
            } => write!(f, "Jacobian({dudx}, {dudy}, {dvdx}, {dvdy})")?,
        }
        if self.origin != PositionD::default() || self.world_origin != PositionD::default() {
            write!(f, " origin={} world_origin={}", self.origin, self.world_origin)?;
        }
        Ok(())
    }
}
