use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use std::fmt;

use log::debug;
use ndarray::{Array, Array1, ArrayBase, Data, Dimension};
use once_cell::sync::OnceCell;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::spline::NaturalSpline;
use super::{Axis, Interpolant, RANGE_TOLERANCE};
use crate::error::{Error, Result};

/// Construction options for [`LookupTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TableOptions {
    pub interpolant: Interpolant,
    /// Interpolate in `log(x)`; every `x` must be positive.
    pub x_log: bool,
    /// Interpolate in `log(f)`; every `f` must be positive.
    pub f_log: bool,
}

impl TableOptions {
    pub fn new(interpolant: Interpolant) -> Self {
        TableOptions {
            interpolant,
            ..Default::default()
        }
    }

    pub fn with_x_log(mut self, x_log: bool) -> Self {
        self.x_log = x_log;
        self
    }

    pub fn with_f_log(mut self, f_log: bool) -> Self {
        self.f_log = f_log;
        self
    }
}

/// The evaluation state, built from the (possibly log-remapped) samples.
#[derive(Debug, Clone)]
struct Kernel {
    axis: Axis,
    values: Vec<f64>,
    spline: Option<NaturalSpline>,
}

impl Kernel {
    fn eval(&self, interpolant: Interpolant, t: f64) -> f64 {
        let i = self.axis.upper_index(t);
        let xs = self.axis.values();
        match interpolant {
            Interpolant::Linear => {
                let a = (xs[i] - t) / (xs[i] - xs[i - 1]);
                a * self.values[i - 1] + (1.0 - a) * self.values[i]
            }
            Interpolant::Spline => match &self.spline {
                Some(spline) => spline.eval(i - 1, t - xs[i - 1]),
                None => f64::NAN,
            },
            step => self.values[self.axis.step_index(step, t, i)],
        }
    }
}

/// A tabulated function `f(x)` with interpolation between samples.
///
/// Samples are sorted by `x` on construction. Arguments up to
/// [`RANGE_TOLERANCE`] of the span outside `[x_min, x_max]` are clamped to
/// the nearest end; anything further out (or NaN) is a range error.
///
/// ```
/// use skybuf::table::{Interpolant, LookupTable, TableOptions};
///
/// let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
/// let f = vec![0.0, 1.0, 4.0, 9.0, 16.0];
/// let table = LookupTable::new(x, f, TableOptions::new(Interpolant::Linear)).unwrap();
/// assert_eq!(table.evaluate(0.5).unwrap(), 0.5);
/// assert!(table.evaluate(-1.0).is_err());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "TableState", into = "TableState")
)]
pub struct LookupTable {
    x: Vec<f64>,
    f: Vec<f64>,
    interpolant: Interpolant,
    x_log: bool,
    f_log: bool,
    kernel: OnceCell<Kernel>,
    hash: OnceCell<u64>,
}

impl LookupTable {
    pub fn new(x: Vec<f64>, f: Vec<f64>, options: TableOptions) -> Result<Self> {
        let TableOptions {
            interpolant,
            x_log,
            f_log,
        } = options;
        if x.len() != f.len() {
            return Err(Error::IncompatibleValues(format!(
                "input array lengths don't match: x has {}, f has {}",
                x.len(),
                f.len()
            )));
        }
        if x.len() < interpolant.min_points() {
            return Err(Error::InvalidValue(format!(
                "{} points are too few for {interpolant} interpolation, need at least {}",
                x.len(),
                interpolant.min_points()
            )));
        }
        if x.iter().any(|v| v.is_nan()) {
            return Err(Error::InvalidValue("x values contain NaN".into()));
        }

        let mut order: Vec<usize> = (0..x.len()).collect();
        order.sort_by(|&a, &b| x[a].total_cmp(&x[b]));
        let x: Vec<f64> = order.iter().map(|&i| x[i]).collect();
        let f: Vec<f64> = order.iter().map(|&i| f[i]).collect();

        if x[0] == x[x.len() - 1] {
            return Err(Error::InvalidValue(format!("all x values are equal to {}", x[0])));
        }
        if x.windows(2).any(|w| w[0] == w[1]) {
            return Err(Error::InvalidValue("x values must be distinct".into()));
        }
        if x_log && x[0] <= 0.0 {
            return Err(Error::InvalidValue(
                "cannot interpolate in log(x) when table contains x <= 0".into(),
            ));
        }
        if f_log && f.iter().any(|&v| v <= 0.0) {
            return Err(Error::InvalidValue(
                "cannot interpolate in log(f) when table contains f <= 0".into(),
            ));
        }

        Ok(LookupTable {
            x,
            f,
            interpolant,
            x_log,
            f_log,
            kernel: OnceCell::new(),
            hash: OnceCell::new(),
        })
    }

    /// Sample `func` at `npoints` abscissas spanning `[x_min, x_max]`,
    /// spaced evenly in `x`, or in `log(x)` when `options.x_log` is set.
    pub fn from_func(
        func: impl Fn(f64) -> f64,
        x_min: f64,
        x_max: f64,
        npoints: usize,
        options: TableOptions,
    ) -> Result<Self> {
        let x: Array1<f64> = if options.x_log {
            if x_min <= 0.0 || x_max <= 0.0 {
                return Err(Error::InvalidValue(format!(
                    "log spacing needs a positive range, got [{x_min}, {x_max}]"
                )));
            }
            Array1::linspace(x_min.ln(), x_max.ln(), npoints).mapv(f64::exp)
        } else {
            Array1::linspace(x_min, x_max, npoints)
        };
        let f: Vec<f64> = x.iter().map(|&v| func(v)).collect();
        LookupTable::new(x.to_vec(), f, options)
    }

    fn build_kernel(&self) -> Kernel {
        let xs: Vec<f64> = if self.x_log {
            self.x.iter().map(|v| v.ln()).collect()
        } else {
            self.x.clone()
        };
        let values: Vec<f64> = if self.f_log {
            self.f.iter().map(|v| v.ln()).collect()
        } else {
            self.f.clone()
        };
        let spline = (self.interpolant == Interpolant::Spline)
            .then(|| NaturalSpline::new(&xs, &values));
        let axis = Axis::new(xs);
        debug!(
            "built {} kernel over {} samples (equally spaced: {})",
            self.interpolant,
            self.x.len(),
            axis.is_equally_spaced()
        );
        Kernel {
            axis,
            values,
            spline,
        }
    }

    fn kernel(&self) -> &Kernel {
        self.kernel.get_or_init(|| self.build_kernel())
    }

    fn check_range(&self, v: f64) -> Result<()> {
        let slop = RANGE_TOLERANCE * (self.x_max() - self.x_min());
        if v >= self.x_min() - slop && v <= self.x_max() + slop {
            Ok(())
        } else {
            Err(Error::Range {
                value: v,
                min: self.x_min(),
                max: self.x_max(),
            })
        }
    }

    /// Interpolate at `v`, already range-checked.
    fn interp(&self, v: f64) -> f64 {
        let v = v.clamp(self.x_min(), self.x_max());
        let t = if self.x_log { v.ln() } else { v };
        let r = self.kernel().eval(self.interpolant, t);
        if self.f_log {
            r.exp()
        } else {
            r
        }
    }

    pub fn evaluate(&self, x: f64) -> Result<f64> {
        self.check_range(x)?;
        Ok(self.interp(x))
    }

    /// Evaluate at every point; fails without evaluating anything if any
    /// point is out of range.
    pub fn evaluate_many(&self, xs: &[f64]) -> Result<Vec<f64>> {
        xs.iter().try_for_each(|&v| self.check_range(v))?;
        Ok(xs.iter().map(|&v| self.interp(v)).collect())
    }

    /// Evaluate element-wise over an array of any shape.
    pub fn evaluate_array<S, D>(&self, xs: &ArrayBase<S, D>) -> Result<Array<f64, D>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        xs.iter().try_for_each(|&v| self.check_range(v))?;
        Ok(xs.mapv(|v| self.interp(v)))
    }

    /// Sorted abscissas.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Values matching [`LookupTable::x`].
    pub fn f(&self) -> &[f64] {
        &self.f
    }

    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn interpolant(&self) -> Interpolant {
        self.interpolant
    }

    pub fn x_log(&self) -> bool {
        self.x_log
    }

    pub fn f_log(&self) -> bool {
        self.f_log
    }

    fn compute_hash(&self) -> u64 {
        let mut h = DefaultHasher::new();
        "LookupTable".hash(&mut h);
        // +0.0 folds -0.0 into 0.0 so equal tables hash equally.
        for v in self.x.iter().chain(&self.f) {
            (v + 0.0).to_bits().hash(&mut h);
        }
        self.interpolant.hash(&mut h);
        self.x_log.hash(&mut h);
        self.f_log.hash(&mut h);
        h.finish()
    }
}

impl PartialEq for LookupTable {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
            && self.f == other.f
            && self.interpolant == other.interpolant
            && self.x_log == other.x_log
            && self.f_log == other.f_log
    }
}

impl Hash for LookupTable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(*self.hash.get_or_init(|| self.compute_hash()));
    }
}

impl fmt::Display for LookupTable {
    fn fmt(&self, fm: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fm,
            "LookupTable(x=[{},...,{}], f=[{},...,{}]",
            self.x_min(),
            self.x_max(),
            self.f[0],
            self.f[self.f.len() - 1]
        )?;
        if self.interpolant != Interpolant::Spline {
            write!(fm, ", interpolant={}", self.interpolant)?;
        }
        if self.x_log {
            fm.write_str(", x_log=true")?;
        }
        if self.f_log {
            fm.write_str(", f_log=true")?;
        }
        fm.write_str(")")
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct TableState {
    x: Vec<f64>,
    f: Vec<f64>,
    interpolant: Interpolant,
    x_log: bool,
    f_log: bool,
}

#[cfg(feature = "serde")]
impl From<LookupTable> for TableState {
    fn from(t: LookupTable) -> Self {
        TableState {
            x: t.x,
            f: t.f,
            interpolant: t.interpolant,
            x_log: t.x_log,
            f_log: t.f_log,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<TableState> for LookupTable {
    type Error = Error;

    fn try_from(s: TableState) -> Result<Self> {
        LookupTable::new(
            s.x,
            s.f,
            TableOptions {
                interpolant: s.interpolant,
                x_log: s.x_log,
                f_log: s.f_log,
            },
        )
    }
}
