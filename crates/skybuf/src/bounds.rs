//! Integer and floating-point positions and rectangular bounds.
//!
//! Coordinates follow the astronomical convention: `x` is the column, `y` is
//! the row, and both bounds are inclusive.

use std::fmt;
use std::ops::{Add, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An integer pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PositionI {
    pub x: i32,
    pub y: i32,
}

impl PositionI {
    pub const fn new(x: i32, y: i32) -> Self {
        PositionI { x, y }
    }
}

impl Add for PositionI {
    type Output = PositionI;
    fn add(self, rhs: PositionI) -> PositionI {
        PositionI::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PositionI {
    type Output = PositionI;
    fn sub(self, rhs: PositionI) -> PositionI {
        PositionI::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for PositionI {
    type Output = PositionI;
    fn neg(self) -> PositionI {
        PositionI::new(-self.x, -self.y)
    }
}

impl fmt::Display for PositionI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A floating-point position, in pixel or world units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PositionD {
    pub x: f64,
    pub y: f64,
}

impl PositionD {
    pub const fn new(x: f64, y: f64) -> Self {
        PositionD { x, y }
    }
}

impl From<PositionI> for PositionD {
    fn from(p: PositionI) -> Self {
        PositionD::new(p.x as f64, p.y as f64)
    }
}

impl Add for PositionD {
    type Output = PositionD;
    fn add(self, rhs: PositionD) -> PositionD {
        PositionD::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PositionD {
    type Output = PositionD;
    fn sub(self, rhs: PositionD) -> PositionD {
        PositionD::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for PositionD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive integer rectangle `[xmin, xmax] x [ymin, ymax]`.
///
/// A bounds is either defined (non-empty) or undefined. All undefined bounds
/// compare equal regardless of their stored corners.
#[derive(Debug, Clone, Copy, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundsI {
    xmin: i32,
    xmax: i32,
    ymin: i32,
    ymax: i32,
    defined: bool,
}

impl BoundsI {
    /// Build a bounds; `xmin > xmax` or `ymin > ymax` yields an undefined bounds.
    pub fn new(xmin: i32, xmax: i32, ymin: i32, ymax: i32) -> Self {
        let defined = xmin <= xmax && ymin <= ymax;
        BoundsI {
            xmin,
            xmax,
            ymin,
            ymax,
            defined,
        }
    }

    /// The empty bounds.
    pub const fn undefined() -> Self {
        BoundsI {
            xmin: 0,
            xmax: 0,
            ymin: 0,
            ymax: 0,
            defined: false,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub fn xmin(&self) -> i32 {
        self.xmin
    }

    pub fn xmax(&self) -> i32 {
        self.xmax
    }

    pub fn ymin(&self) -> i32 {
        self.ymin
    }

    pub fn ymax(&self) -> i32 {
        self.ymax
    }

    /// Number of columns (x extent); 0 when undefined.
    pub fn ncol(&self) -> usize {
        if self.defined {
            (self.xmax - self.xmin + 1) as usize
        } else {
            0
        }
    }

    /// Number of rows (y extent); 0 when undefined.
    pub fn nrow(&self) -> usize {
        if self.defined {
            (self.ymax - self.ymin + 1) as usize
        } else {
            0
        }
    }

    /// Storage shape as `(nrow, ncol)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.nrow(), self.ncol())
    }

    pub fn area(&self) -> usize {
        self.ncol() * self.nrow()
    }

    /// The lower-left corner `(xmin, ymin)`.
    pub fn origin(&self) -> PositionI {
        PositionI::new(self.xmin, self.ymin)
    }

    /// The nominal central pixel. Even extents round up, so a 4-pixel axis
    /// starting at 1 has its center at 3.
    pub fn center(&self) -> PositionI {
        PositionI::new(
            (self.xmin + self.xmax + 1).div_euclid(2),
            (self.ymin + self.ymax + 1).div_euclid(2),
        )
    }

    /// The exact geometric center, half-integer for even extents.
    pub fn true_center(&self) -> PositionD {
        PositionD::new(
            (self.xmin as f64 + self.xmax as f64) / 2.0,
            (self.ymin as f64 + self.ymax as f64) / 2.0,
        )
    }

    pub fn includes(&self, x: i32, y: i32) -> bool {
        self.defined && x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    /// Whether `other` is defined and lies entirely inside `self`.
    pub fn includes_bounds(&self, other: &BoundsI) -> bool {
        self.defined
            && other.defined
            && other.xmin >= self.xmin
            && other.xmax <= self.xmax
            && other.ymin >= self.ymin
            && other.ymax <= self.ymax
    }

    pub fn same_shape_as(&self, other: &BoundsI) -> bool {
        self.shape() == other.shape()
    }

    /// The same rectangle translated by `(dx, dy)`.
    pub fn shifted(&self, dx: i32, dy: i32) -> BoundsI {
        if !self.defined {
            return *self;
        }
        BoundsI::new(self.xmin + dx, self.xmax + dx, self.ymin + dy, self.ymax + dy)
    }
}

impl Default for BoundsI {
    fn default() -> Self {
        BoundsI::undefined()
    }
}

impl PartialEq for BoundsI {
    fn eq(&self, other: &Self) -> bool {
        match (self.defined, other.defined) {
            (false, false) => true,
            (true, true) => {
                self.xmin == other.xmin
                    && self.xmax == other.xmax
                    && self.ymin == other.ymin
                    && self.ymax == other.ymax
            }
            _ => false,
        }
    }
}

impl fmt::Display for BoundsI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(
                f,
                "BoundsI(xmin={}, xmax={}, ymin={}, ymax={})",
                self.xmin, self.xmax, self.ymin, self.ymax
            )
        } else {
            write!(f, "BoundsI()")
        }
    }
}

/// Inclusive floating-point rectangle, used to report lookup-table domains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsD {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BoundsD {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        BoundsD {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    pub fn includes(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
}

impl fmt::Display for BoundsD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundsD(xmin={}, xmax={}, ymin={}, ymax={})",
            self.xmin, self.xmax, self.ymin, self.ymax
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_corners_are_undefined() {
        assert!(!BoundsI::new(3, 1, 1, 4).is_defined());
        assert!(!BoundsI::new(1, 3, 5, 4).is_defined());
        assert_eq!(BoundsI::new(3, 1, 1, 4), BoundsI::undefined());
        assert_eq!(BoundsI::undefined().area(), 0);
    }

    #[test]
    fn shape_and_area() {
        let b = BoundsI::new(1, 4, 1, 3);
        assert_eq!(b.ncol(), 4);
        assert_eq!(b.nrow(), 3);
        assert_eq!(b.shape(), (3, 4));
        assert_eq!(b.area(), 12);
    }

    #[test]
    fn center_rounds_up_on_even_extent() {
        let b = BoundsI::new(1, 4, 1, 4);
        assert_eq!(b.center(), PositionI::new(3, 3));
        assert_eq!(b.true_center(), PositionD::new(2.5, 2.5));

        let odd = BoundsI::new(1, 5, -2, 2);
        assert_eq!(odd.center(), PositionI::new(3, 0));
        assert_eq!(odd.true_center(), PositionD::new(3.0, 0.0));
    }

    #[test]
    fn center_with_negative_coordinates() {
        let b = BoundsI::new(-2, 1, -2, 1);
        assert_eq!(b.center(), PositionI::new(0, 0));
        let b = BoundsI::new(-5, -2, -5, -2);
        assert_eq!(b.center(), PositionI::new(-3, -3));
    }

    #[test]
    fn includes_points_and_bounds() {
        let b = BoundsI::new(1, 10, 1, 10);
        assert!(b.includes(1, 10));
        assert!(!b.includes(0, 5));
        assert!(b.includes_bounds(&BoundsI::new(2, 4, 3, 10)));
        assert!(!b.includes_bounds(&BoundsI::new(2, 11, 3, 4)));
        assert!(!b.includes_bounds(&BoundsI::undefined()));
        assert!(!BoundsI::undefined().includes(0, 0));
    }

    #[test]
    fn shifted_keeps_shape() {
        let b = BoundsI::new(1, 4, 1, 3).shifted(10, -1);
        assert_eq!(b, BoundsI::new(11, 14, 0, 2));
        assert!(b.same_shape_as(&BoundsI::new(1, 4, 1, 3)));
    }

    #[test]
    fn position_arithmetic() {
        let a = PositionI::new(3, 4);
        let b = PositionI::new(1, -2);
        assert_eq!(a - b, PositionI::new(2, 6));
        assert_eq!(a + b, PositionI::new(4, 2));
        assert_eq!(-b, PositionI::new(-1, 2));
        assert_eq!(PositionD::from(a), PositionD::new(3.0, 4.0));
    }

    #[test]
    fn display() {
        assert_eq!(
            BoundsI::new(1, 4, 2, 3).to_string(),
            "BoundsI(xmin=1, xmax=4, ymin=2, ymax=3)"
        );
        assert_eq!(BoundsI::undefined().to_string(), "BoundsI()");
    }
}
