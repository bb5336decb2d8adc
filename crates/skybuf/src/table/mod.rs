//! Interpolation tables for slowly computed functions.
//!
//! [`LookupTable`] interpolates a tabulated `f(x)`, optionally in `log(x)`
//! and/or `log(f)`. [`LookupTable2D`] interpolates a grid `f(x, y)` and can
//! extrapolate by constant fill or periodic wrap. Both build their kernel on
//! first evaluation and keep it for the life of the table.

mod io;
mod spline;
mod table1d;
mod table2d;

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use table1d::{LookupTable, TableOptions};
pub use table2d::LookupTable2D;

/// Relative width of the band outside `[x_min, x_max]` that a 1D table still
/// accepts (and clamps), as a fraction of `x_max - x_min`.
pub const RANGE_TOLERANCE: f64 = 1e-6;

/// Number of samples taken by [`LookupTable::from_func`] when asked for the default.
pub const DEFAULT_NPOINTS: usize = 2000;

/// Relative tolerance on step sizes for an axis to count as equally spaced.
pub const SPACING_TOLERANCE: f64 = 1e-9;

/// Interpolation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Interpolant {
    /// Natural cubic spline (1D only).
    #[default]
    Spline,
    Linear,
    /// Value at the greatest sample not above the argument.
    Floor,
    /// Value at the least sample not below the argument.
    Ceil,
    /// Value at the closer sample; an exact midpoint takes the upper one.
    Nearest,
}

impl Interpolant {
    pub fn name(self) -> &'static str {
        match self {
            Interpolant::Spline => "spline",
            Interpolant::Linear => "linear",
            Interpolant::Floor => "floor",
            Interpolant::Ceil => "ceil",
            Interpolant::Nearest => "nearest",
        }
    }

    /// Fewest samples the kernel can work with.
    pub fn min_points(self) -> usize {
        match self {
            Interpolant::Spline => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for Interpolant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interpolant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "spline" => Ok(Interpolant::Spline),
            "linear" => Ok(Interpolant::Linear),
            "floor" => Ok(Interpolant::Floor),
            "ceil" => Ok(Interpolant::Ceil),
            "nearest" => Ok(Interpolant::Nearest),
            other => Err(Error::InvalidValue(format!(
                "unknown interpolant `{other}`, expected one of spline, linear, floor, ceil, nearest"
            ))),
        }
    }
}

/// How a 2D table answers outside its grid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EdgeMode {
    /// Fail if any point is outside.
    #[default]
    Raise,
    /// Points outside take this value (and a zero gradient).
    Constant(f64),
    /// The grid repeats periodically in both directions.
    Wrap,
}

impl EdgeMode {
    pub fn name(&self) -> &'static str {
        match self {
            EdgeMode::Raise => "raise",
            EdgeMode::Constant(_) => "constant",
            EdgeMode::Wrap => "wrap",
        }
    }
}

impl fmt::Display for EdgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeMode::Constant(c) => write!(f, "constant({c})"),
            other => f.write_str(other.name()),
        }
    }
}

/// A sorted sample axis with a fast bracketing search.
#[derive(Debug, Clone)]
pub(crate) struct Axis {
    values: Vec<f64>,
    step: Option<f64>,
}

/// The common step of `values` if every step agrees to [`SPACING_TOLERANCE`].
pub(crate) fn equal_step(values: &[f64]) -> Option<f64> {
    let step = *values.get(1)? - values[0];
    values
        .windows(2)
        .all(|w| ((w[1] - w[0]) - step).abs() <= SPACING_TOLERANCE * step.abs())
        .then_some(step)
}

impl Axis {
    /// `values` must be sorted with at least two entries.
    pub(crate) fn new(values: Vec<f64>) -> Self {
        let step = equal_step(&values);
        Axis { values, step }
    }

    pub(crate) fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn is_equally_spaced(&self) -> bool {
        self.step.is_some()
    }

    /// Index `i` in `1..len` with `values[i - 1] <= v <= values[i]`, for `v`
    /// within the axis. Constant time on equally spaced axes.
    pub(crate) fn upper_index(&self, v: f64) -> usize {
        let v_s = &self.values;
        let last = v_s.len() - 1;
        match self.step {
            Some(step) => {
                let guess = ((v - v_s[0]) / step).floor() + 1.0;
                let mut i = if guess < 1.0 {
                    1
                } else {
                    (guess as usize).min(last)
                };
                while i > 1 && v < v_s[i - 1] {
                    i -= 1;
                }
                while i < last && v > v_s[i] {
                    i += 1;
                }
                i
            }
            None => v_s.partition_point(|&t| t < v).clamp(1, last),
        }
    }

    /// Sample index chosen by a step kernel for `v`, given its bracket `i`.
    pub(crate) fn step_index(&self, kind: Interpolant, v: f64, i: usize) -> usize {
        let (lo, hi) = (self.values[i - 1], self.values[i]);
        match kind {
            Interpolant::Floor => {
                if v == hi {
                    i
                } else {
                    i - 1
                }
            }
            Interpolant::Ceil => {
                if v == lo {
                    i - 1
                } else {
                    i
                }
            }
            _ => {
                if v - lo < hi - v {
                    i - 1
                } else {
                    i
                }
            }
        }
    }
}
