use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use std::fmt;

use log::debug;
use ndarray::{Array, Array2, ArrayBase, Data, Dimension, Zip};
use once_cell::sync::OnceCell;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{equal_step, Axis, EdgeMode, Interpolant};
use crate::bounds::BoundsD;
use crate::error::{Error, Result};

/// Bracketing state for both axes, built on first use.
#[derive(Debug, Clone)]
struct Grid {
    x: Axis,
    y: Axis,
}

/// A function `f(x, y)` tabulated on a rectilinear grid.
///
/// `f[[i, j]]` is the value at `(x[i], y[j])`. Kernels are bilinear or one of
/// the step kernels applied per axis; cubic splines are not available in 2D.
///
/// With [`EdgeMode::Wrap`] the grid is periodic. If both axes are equally
/// spaced the grid is extended by one step in each direction, wrapping the
/// first row and column of `f` around; either way the first and last row
/// and column must then agree, and the period is the span of each axis.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Table2DState", into = "Table2DState")
)]
pub struct LookupTable2D {
    x: Vec<f64>,
    y: Vec<f64>,
    f: Array2<f64>,
    interpolant: Interpolant,
    edge_mode: EdgeMode,
    period: Option<(f64, f64)>,
    grid: OnceCell<Grid>,
    hash: OnceCell<u64>,
}

fn check_axis(name: &str, values: &[f64]) -> Result<()> {
    if values.len() < 2 {
        return Err(Error::InvalidValue(format!(
            "{name} input grid needs at least 2 points, got {}",
            values.len()
        )));
    }
    if !values.windows(2).all(|w| w[1] > w[0]) {
        return Err(Error::InvalidValue(format!(
            "{name} input grid is not strictly increasing"
        )));
    }
    Ok(())
}

fn check_grid(x: &[f64], y: &[f64], f: &Array2<f64>, interpolant: Interpolant) -> Result<()> {
    if interpolant == Interpolant::Spline {
        return Err(Error::InvalidValue(
            "spline interpolation is not available for 2D tables".into(),
        ));
    }
    check_axis("x", x)?;
    check_axis("y", y)?;
    if f.dim() != (x.len(), y.len()) {
        return Err(Error::IncompatibleValues(format!(
            "shape of f {:?} incompatible with lengths of x and y ({}, {})",
            f.dim(),
            x.len(),
            y.len()
        )));
    }
    Ok(())
}

/// The wrap period of a grid whose edges already agree.
fn wrap_period(x: &[f64], y: &[f64], f: &Array2<f64>) -> Result<(f64, f64)> {
    let (nx, ny) = f.dim();
    if f.row(0) != f.row(nx - 1) || f.column(0) != f.column(ny - 1) {
        return Err(Error::IncompatibleValues(
            "cannot wrap unless x and y are equally spaced or the first/last row and column \
             of f are identical"
                .into(),
        ));
    }
    Ok((x[nx - 1] - x[0], y[ny - 1] - y[0]))
}

impl LookupTable2D {
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        f: Array2<f64>,
        interpolant: Interpolant,
        edge_mode: EdgeMode,
    ) -> Result<Self> {
        check_grid(&x, &y, &f, interpolant)?;
        let (mut x, mut y, mut f) = (x, y, f);
        let mut period = None;
        if edge_mode == EdgeMode::Wrap {
            if let (Some(dx), Some(dy)) = (equal_step(&x), equal_step(&y)) {
                let (nx, ny) = f.dim();
                debug!("extending {nx}x{ny} grid by one wrapped row and column");
                x.push(x[nx - 1] + dx);
                y.push(y[ny - 1] + dy);
                f = Array2::from_shape_fn((nx + 1, ny + 1), |(i, j)| f[[i % nx, j % ny]]);
            }
            period = Some(wrap_period(&x, &y, &f)?);
        }
        Ok(LookupTable2D::assemble(x, y, f, interpolant, edge_mode, period))
    }

    fn assemble(
        x: Vec<f64>,
        y: Vec<f64>,
        f: Array2<f64>,
        interpolant: Interpolant,
        edge_mode: EdgeMode,
        period: Option<(f64, f64)>,
    ) -> Self {
        LookupTable2D {
            x,
            y,
            f,
            interpolant,
            edge_mode,
            period,
            grid: OnceCell::new(),
            hash: OnceCell::new(),
        }
    }

    fn grid(&self) -> &Grid {
        self.grid.get_or_init(|| {
            let grid = Grid {
                x: Axis::new(self.x.clone()),
                y: Axis::new(self.y.clone()),
            };
            debug!(
                "built {} 2D kernel over {}x{} grid (equally spaced: {}, {})",
                self.interpolant,
                self.x.len(),
                self.y.len(),
                grid.x.is_equally_spaced(),
                grid.y.is_equally_spaced()
            );
            grid
        })
    }

    fn x_last(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    fn y_last(&self) -> f64 {
        self.y[self.y.len() - 1]
    }

    fn in_grid(&self, x: f64, y: f64) -> bool {
        x >= self.x[0] && x <= self.x_last() && y >= self.y[0] && y <= self.y_last()
    }

    /// Grid coordinates for `(x, y)` under the edge mode, `None` if outside.
    fn locate(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (x, y) = match (self.edge_mode, self.period) {
            (EdgeMode::Wrap, Some(_)) if !(x.is_finite() && y.is_finite()) => return None,
            (EdgeMode::Wrap, Some((px, py))) => (
                ((x - self.x[0]).rem_euclid(px) + self.x[0]).min(self.x_last()),
                ((y - self.y[0]).rem_euclid(py) + self.y[0]).min(self.y_last()),
            ),
            _ => (x, y),
        };
        self.in_grid(x, y).then_some((x, y))
    }

    /// Fail if any point cannot be located, unless the edge mode fills.
    fn check<I: IntoIterator<Item = (f64, f64)>>(&self, points: I) -> Result<()> {
        if let EdgeMode::Constant(_) = self.edge_mode {
            return Ok(());
        }
        for (x, y) in points {
            if self.locate(x, y).is_none() {
                return Err(Error::OutOfBounds(format!(
                    "extrapolating beyond input range: ({x}, {y}) is outside {}",
                    self.bounds()
                )));
            }
        }
        Ok(())
    }

    fn fill(&self) -> f64 {
        match self.edge_mode {
            EdgeMode::Constant(c) => c,
            _ => f64::NAN,
        }
    }

    fn interp(&self, x: f64, y: f64) -> f64 {
        let grid = self.grid();
        let i = grid.x.upper_index(x);
        let j = grid.y.upper_index(y);
        match self.interpolant {
            Interpolant::Linear | Interpolant::Spline => {
                let ax = (self.x[i] - x) / (self.x[i] - self.x[i - 1]);
                let bx = 1.0 - ax;
                let ay = (self.y[j] - y) / (self.y[j] - self.y[j - 1]);
                let by = 1.0 - ay;
                let f = &self.f;
                f[[i - 1, j - 1]] * ax * ay
                    + f[[i, j - 1]] * bx * ay
                    + f[[i - 1, j]] * ax * by
                    + f[[i, j]] * bx * by
            }
            step => {
                let ii = grid.x.step_index(step, x, i);
                let jj = grid.y.step_index(step, y, j);
                self.f[[ii, jj]]
            }
        }
    }

    /// Partial derivatives at a located point. Step kernels are flat.
    fn grad(&self, x: f64, y: f64) -> (f64, f64) {
        if self.interpolant != Interpolant::Linear {
            return (0.0, 0.0);
        }
        let grid = self.grid();
        let i = grid.x.upper_index(x);
        let j = grid.y.upper_index(y);
        let dx = self.x[i] - self.x[i - 1];
        let dy = self.y[j] - self.y[j - 1];
        let ax = (self.x[i] - x) / dx;
        let bx = 1.0 - ax;
        let ay = (self.y[j] - y) / dy;
        let by = 1.0 - ay;
        let f = &self.f;
        let dfdx = ((f[[i, j - 1]] - f[[i - 1, j - 1]]) * ay + (f[[i, j]] - f[[i - 1, j]]) * by) / dx;
        let dfdy = ((f[[i - 1, j]] - f[[i - 1, j - 1]]) * ax + (f[[i, j]] - f[[i, j - 1]]) * bx) / dy;
        (dfdx, dfdy)
    }

    fn value_at(&self, x: f64, y: f64) -> f64 {
        match self.locate(x, y) {
            Some((x, y)) => self.interp(x, y),
            None => self.fill(),
        }
    }

    fn gradient_at(&self, x: f64, y: f64) -> (f64, f64) {
        match self.locate(x, y) {
            Some((x, y)) => self.grad(x, y),
            None => (0.0, 0.0),
        }
    }

    fn check_pairs(xs: &[f64], ys: &[f64]) -> Result<()> {
        if xs.len() != ys.len() {
            return Err(Error::IncompatibleValues(format!(
                "x and y have different lengths ({} and {})",
                xs.len(),
                ys.len()
            )));
        }
        Ok(())
    }

    fn check_shapes<S1, S2, D>(xs: &ArrayBase<S1, D>, ys: &ArrayBase<S2, D>) -> Result<()>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
        D: Dimension,
    {
        if xs.shape() != ys.shape() {
            return Err(Error::IncompatibleValues(format!(
                "x and y have different shapes ({:?} and {:?})",
                xs.shape(),
                ys.shape()
            )));
        }
        Ok(())
    }

    pub fn evaluate(&self, x: f64, y: f64) -> Result<f64> {
        self.check([(x, y)])?;
        Ok(self.value_at(x, y))
    }

    /// Evaluate at paired points `(xs[k], ys[k])`.
    pub fn evaluate_many(&self, xs: &[f64], ys: &[f64]) -> Result<Vec<f64>> {
        Self::check_pairs(xs, ys)?;
        let points = || xs.iter().copied().zip(ys.iter().copied());
        self.check(points())?;
        Ok(points().map(|(x, y)| self.value_at(x, y)).collect())
    }

    /// Evaluate element-wise over two arrays of the same shape.
    pub fn evaluate_array<S1, S2, D>(
        &self,
        xs: &ArrayBase<S1, D>,
        ys: &ArrayBase<S2, D>,
    ) -> Result<Array<f64, D>>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
        D: Dimension,
    {
        Self::check_shapes(xs, ys)?;
        self.check(xs.iter().copied().zip(ys.iter().copied()))?;
        Ok(Zip::from(xs)
            .and(ys)
            .map_collect(|&x, &y| self.value_at(x, y)))
    }

    /// `(df/dx, df/dy)` at `(x, y)`.
    pub fn gradient(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        self.check([(x, y)])?;
        Ok(self.gradient_at(x, y))
    }

    pub fn gradient_many(&self, xs: &[f64], ys: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        Self::check_pairs(xs, ys)?;
        let points = || xs.iter().copied().zip(ys.iter().copied());
        self.check(points())?;
        Ok(points().map(|(x, y)| self.gradient_at(x, y)).unzip())
    }

    pub fn gradient_array<S1, S2, D>(
        &self,
        xs: &ArrayBase<S1, D>,
        ys: &ArrayBase<S2, D>,
    ) -> Result<(Array<f64, D>, Array<f64, D>)>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
        D: Dimension,
    {
        Self::check_shapes(xs, ys)?;
        self.check(xs.iter().copied().zip(ys.iter().copied()))?;
        let dfdx = Zip::from(xs)
            .and(ys)
            .map_collect(|&x, &y| self.gradient_at(x, y).0);
        let dfdy = Zip::from(xs)
            .and(ys)
            .map_collect(|&x, &y| self.gradient_at(x, y).1);
        Ok((dfdx, dfdy))
    }

    /// Grid abscissas, including the wrap extension if one was added.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn f(&self) -> &Array2<f64> {
        &self.f
    }

    pub fn interpolant(&self) -> Interpolant {
        self.interpolant
    }

    pub fn edge_mode(&self) -> EdgeMode {
        self.edge_mode
    }

    /// `(x period, y period)` in wrap mode.
    pub fn period(&self) -> Option<(f64, f64)> {
        self.period
    }

    pub fn bounds(&self) -> BoundsD {
        BoundsD::new(self.x[0], self.x_last(), self.y[0], self.y_last())
    }

    fn compute_hash(&self) -> u64 {
        let mut h = DefaultHasher::new();
        "LookupTable2D".hash(&mut h);
        for v in self.x.iter().chain(&self.y).chain(self.f.iter()) {
            (v + 0.0).to_bits().hash(&mut h);
        }
        self.interpolant.hash(&mut h);
        self.edge_mode.name().hash(&mut h);
        if let EdgeMode::Constant(c) = self.edge_mode {
            (c + 0.0).to_bits().hash(&mut h);
        }
        h.finish()
    }
}

impl PartialEq for LookupTable2D {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.f == other.f
            && self.interpolant == other.interpolant
            && self.edge_mode == other.edge_mode
    }
}

impl Hash for LookupTable2D {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(*self.hash.get_or_init(|| self.compute_hash()));
    }
}

impl fmt::Display for LookupTable2D {
    fn fmt(&self, fm: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nx, ny) = self.f.dim();
        let f = &self.f;
        write!(
            fm,
            "LookupTable2D(x=[{},...,{}], y=[{},...,{}], f=[[{},...,{}],...,[{},...,{}]], \
             interpolant={}, edge_mode={})",
            self.x[0],
            self.x_last(),
            self.y[0],
            self.y_last(),
            f[[0, 0]],
            f[[0, ny - 1]],
            f[[nx - 1, 0]],
            f[[nx - 1, ny - 1]],
            self.interpolant,
            self.edge_mode
        )
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct Table2DState {
    x: Vec<f64>,
    y: Vec<f64>,
    f: Array2<f64>,
    interpolant: Interpolant,
    edge_mode: EdgeMode,
    period: Option<(f64, f64)>,
}

#[cfg(feature = "serde")]
impl From<LookupTable2D> for Table2DState {
    fn from(t: LookupTable2D) -> Self {
        Table2DState {
            x: t.x,
            y: t.y,
            f: t.f,
            interpolant: t.interpolant,
            edge_mode: t.edge_mode,
            period: t.period,
        }
    }
}

// The stored grid is already extended, so it is validated as-is.
#[cfg(feature = "serde")]
impl TryFrom<Table2DState> for LookupTable2D {
    type Error = Error;

    fn try_from(s: Table2DState) -> Result<Self> {
        check_grid(&s.x, &s.y, &s.f, s.interpolant)?;
        let period = match s.edge_mode {
            EdgeMode::Wrap => {
                let period = wrap_period(&s.x, &s.y, &s.f)?;
                if s.period != Some(period) {
                    return Err(Error::IncompatibleValues(format!(
                        "stored period {:?} does not match grid span {period:?}",
                        s.period
                    )));
                }
                Some(period)
            }
            _ => None,
        };
        Ok(LookupTable2D::assemble(
            s.x,
            s.y,
            s.f,
            s.interpolant,
            s.edge_mode,
            period,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// `f = x + y` on `x = 0..5`, `y = 0..8`.
    fn plane(interpolant: Interpolant, edge_mode: EdgeMode) -> LookupTable2D {
        let x: Vec<f64> = (0..5).map(|v| v as f64).collect();
        let y: Vec<f64> = (0..8).map(|v| v as f64).collect();
        let f = Array2::from_shape_fn((5, 8), |(i, j)| (i + j) as f64);
        LookupTable2D::new(x, y, f, interpolant, edge_mode).unwrap()
    }

    #[test]
    fn bilinear_reproduces_plane() {
        let t = plane(Interpolant::Linear, EdgeMode::Raise);
        assert_abs_diff_eq!(t.evaluate(2.2, 3.3).unwrap(), 5.5, epsilon = 1e-12);
        assert_eq!(t.evaluate(4.0, 7.0).unwrap(), 11.0);
        let (dx, dy) = t.gradient(1.5, 6.25).unwrap();
        assert_abs_diff_eq!(dx, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dy, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn step_kernels_per_axis() {
        let floor = plane(Interpolant::Floor, EdgeMode::Raise);
        let ceil = plane(Interpolant::Ceil, EdgeMode::Raise);
        let nearest = plane(Interpolant::Nearest, EdgeMode::Raise);
        assert_eq!(floor.evaluate(2.2, 3.7).unwrap(), 5.0);
        assert_eq!(ceil.evaluate(2.2, 3.7).unwrap(), 7.0);
        assert_eq!(nearest.evaluate(2.2, 3.7).unwrap(), 6.0);
        assert_eq!(floor.gradient(2.2, 3.7).unwrap(), (0.0, 0.0));
        assert_eq!(nearest.gradient(2.0, 3.0).unwrap(), (0.0, 0.0));
    }

    #[test]
    fn raise_rejects_any_outside_point() {
        let t = plane(Interpolant::Linear, EdgeMode::Raise);
        assert!(matches!(t.evaluate(7.0, 7.0), Err(Error::OutOfBounds(_))));
        assert!(matches!(
            t.evaluate_many(&[1.0, 5.5], &[1.0, 1.0]),
            Err(Error::OutOfBounds(_))
        ));
        assert!(t.gradient(-0.1, 0.0).is_err());
    }

    #[test]
    fn constant_fills_per_point() {
        let t = plane(Interpolant::Linear, EdgeMode::Constant(-1.0));
        let out = t.evaluate_many(&[1.0, 9.0, 2.0], &[1.0, 1.0, 3.5]).unwrap();
        assert_eq!(out, vec![2.0, -1.0, 5.5]);
        assert_eq!(t.gradient(9.0, 1.0).unwrap(), (0.0, 0.0));
        let (gx, _) = t.gradient_many(&[9.0, 1.5], &[1.0, 1.5]).unwrap();
        assert_eq!(gx[0], 0.0);
        assert_abs_diff_eq!(gx[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn wrap_extends_equally_spaced_grid() {
        let x: Vec<f64> = (0..4).map(|v| v as f64).collect();
        let y: Vec<f64> = (0..3).map(|v| v as f64 * 0.5).collect();
        let f = Array2::from_shape_fn((4, 3), |(i, j)| (i * 10 + j) as f64);
        let t = LookupTable2D::new(x, y, f, Interpolant::Linear, EdgeMode::Wrap).unwrap();
        assert_eq!(t.x().len(), 5);
        assert_eq!(t.y().len(), 4);
        assert_eq!(t.period(), Some((4.0, 1.5)));
        assert_eq!(t.f()[[4, 0]], 0.0);
        assert_eq!(t.f()[[1, 3]], 10.0);
        let v = t.evaluate(1.25, 0.25).unwrap();
        assert_abs_diff_eq!(t.evaluate(1.25 + 4.0, 0.25).unwrap(), v, epsilon = 1e-12);
        assert_abs_diff_eq!(t.evaluate(1.25 - 8.0, 0.25 + 3.0).unwrap(), v, epsilon = 1e-12);
    }

    #[test]
    fn wrap_rejects_non_finite_points() {
        let x: Vec<f64> = (0..4).map(|v| v as f64).collect();
        let y: Vec<f64> = (0..3).map(|v| v as f64 * 0.5).collect();
        let f = Array2::from_shape_fn((4, 3), |(i, j)| (i * 10 + j) as f64);
        let t = LookupTable2D::new(x, y, f, Interpolant::Linear, EdgeMode::Wrap).unwrap();
        for (px, py) in [(f64::NAN, 0.5), (f64::INFINITY, 0.5), (0.5, f64::NEG_INFINITY)] {
            assert!(matches!(t.evaluate(px, py), Err(Error::OutOfBounds(_))));
            assert!(matches!(t.gradient(px, py), Err(Error::OutOfBounds(_))));
        }
        assert!(t.evaluate_many(&[1.0, f64::NAN], &[0.5, 0.5]).is_err());
        assert!(t.gradient_many(&[1.0, 2.0], &[0.5, f64::INFINITY]).is_err());
        assert!(t.evaluate(1.0, 0.5).is_ok());
    }

    #[test]
    fn wrap_with_matching_edges_keeps_grid() {
        let x = vec![0.0, 1.0, 3.0];
        let y = vec![0.0, 2.0];
        let f = array![[1.0, 1.0], [2.0, 2.0], [1.0, 1.0]];
        let t = LookupTable2D::new(x, y, f, Interpolant::Linear, EdgeMode::Wrap).unwrap();
        assert_eq!(t.period(), Some((3.0, 2.0)));
        assert_eq!(t.x().len(), 3);
        assert_abs_diff_eq!(t.evaluate(4.0, 7.0).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn wrap_rejects_mismatched_edges() {
        let x = vec![0.0, 1.0, 3.0];
        let y = vec![0.0, 2.0];
        let f = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        assert!(matches!(
            LookupTable2D::new(x, y, f, Interpolant::Linear, EdgeMode::Wrap),
            Err(Error::IncompatibleValues(_))
        ));
    }

    #[test]
    fn construction_errors() {
        let f = Array2::zeros((3, 2));
        assert!(matches!(
            LookupTable2D::new(
                vec![0.0, 1.0, 2.0],
                vec![0.0, 1.0],
                f.clone(),
                Interpolant::Spline,
                EdgeMode::Raise
            ),
            Err(Error::InvalidValue(_))
        ));
        assert!(matches!(
            LookupTable2D::new(
                vec![0.0, 2.0, 1.0],
                vec![0.0, 1.0],
                f.clone(),
                Interpolant::Linear,
                EdgeMode::Raise
            ),
            Err(Error::InvalidValue(_))
        ));
        assert!(matches!(
            LookupTable2D::new(
                vec![0.0, 1.0],
                vec![0.0, 1.0],
                f,
                Interpolant::Linear,
                EdgeMode::Raise
            ),
            Err(Error::IncompatibleValues(_))
        ));
    }

    #[test]
    fn paired_inputs_must_agree() {
        let t = plane(Interpolant::Linear, EdgeMode::Raise);
        assert!(matches!(
            t.evaluate_many(&[1.0, 2.0], &[1.0]),
            Err(Error::IncompatibleValues(_))
        ));
        let xs = array![[1.0, 2.0]];
        let ys = array![[1.0], [2.0]];
        assert!(matches!(
            t.evaluate_array(&xs, &ys),
            Err(Error::IncompatibleValues(_))
        ));
        let ys = array![[0.5, 0.5]];
        assert_eq!(t.evaluate_array(&xs, &ys).unwrap(), array![[1.5, 2.5]]);
        let (gx, gy) = t.gradient_array(&xs, &ys).unwrap();
        assert_eq!(gx.dim(), (1, 2));
        assert_abs_diff_eq!(gy[[0, 1]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn display_and_bounds() {
        let t = plane(Interpolant::Nearest, EdgeMode::Raise);
        assert_eq!(t.bounds(), BoundsD::new(0.0, 4.0, 0.0, 7.0));
        assert_eq!(
            t.to_string(),
            "LookupTable2D(x=[0,...,4], y=[0,...,7], f=[[0,...,7],...,[4,...,11]], \
             interpolant=nearest, edge_mode=raise)"
        );
    }

    #[test]
    fn equality_includes_edge_mode() {
        let a = plane(Interpolant::Linear, EdgeMode::Constant(0.0));
        let b = plane(Interpolant::Linear, EdgeMode::Constant(0.0));
        let c = plane(Interpolant::Linear, EdgeMode::Constant(1.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
