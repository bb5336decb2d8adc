//! Natural cubic spline coefficients.

/// Per-segment cubic `a + b*dx + c*dx^2 + d*dx^3` with `dx = x - x[i]`,
/// zero second derivative at both ends.
#[derive(Debug, Clone)]
pub(crate) struct NaturalSpline {
    coeffs: Vec<[f64; 4]>,
}

impl NaturalSpline {
    /// `x` must be strictly increasing and at least three long, `y` the same length.
    pub(crate) fn new(x: &[f64], y: &[f64]) -> Self {
        let n = x.len();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        let mut alpha = vec![0.0; n - 1];
        for i in 1..n - 1 {
            alpha[i] = (3.0 / h[i]) * (y[i + 1] - y[i]) - (3.0 / h[i - 1]) * (y[i] - y[i - 1]);
        }

        // Thomas algorithm for the tridiagonal system in c = y'' / 2.
        let mut l = vec![1.0; n];
        let mut mu = vec![0.0; n];
        let mut z = vec![0.0; n];
        for i in 1..n - 1 {
            l[i] = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l[i];
            z[i] = (alpha[i] - h[i - 1] * z[i - 1]) / l[i];
        }

        let mut c = vec![0.0; n];
        let mut coeffs = vec![[0.0; 4]; n - 1];
        for j in (0..n - 1).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            let b = (y[j + 1] - y[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            let d = (c[j + 1] - c[j]) / (3.0 * h[j]);
            coeffs[j] = [y[j], b, c[j], d];
        }
        NaturalSpline { coeffs }
    }

    /// Evaluate on segment `seg` (between `x[seg]` and `x[seg + 1]`) at
    /// offset `dx` from its left end.
    #[inline]
    pub(crate) fn eval(&self, seg: usize, dx: f64) -> f64 {
        let [a, b, c, d] = self.coeffs[seg];
        a + dx * (b + dx * (c + dx * d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn passes_through_knots() {
        let x = [0.0, 1.0, 2.5, 3.0, 4.0];
        let y = [1.0, -2.0, 0.5, 4.0, 3.0];
        let s = NaturalSpline::new(&x, &y);
        for seg in 0..x.len() - 1 {
            assert_abs_diff_eq!(s.eval(seg, 0.0), y[seg], epsilon = 1e-12);
            assert_abs_diff_eq!(s.eval(seg, x[seg + 1] - x[seg]), y[seg + 1], epsilon = 1e-12);
        }
    }

    #[test]
    fn reproduces_straight_lines() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let s = NaturalSpline::new(&x, &y);
        assert_abs_diff_eq!(s.eval(1, 0.5), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.eval(2, 0.25), 5.5, epsilon = 1e-12);
    }

    #[test]
    fn natural_end_conditions() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 1.0, 4.0, 9.0, 16.0];
        let s = NaturalSpline::new(&x, &y);
        // Second derivative 2c vanishes at the first knot.
        assert_abs_diff_eq!(s.coeffs[0][2], 0.0, epsilon = 1e-12);
        // And at the last: c + 3 d h on the final segment.
        let [_, _, c, d] = s.coeffs[3];
        assert_abs_diff_eq!(c + 3.0 * d, 0.0, epsilon = 1e-12);
    }
}
