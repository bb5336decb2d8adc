//! Integration tests for 1D and 2D lookup tables.

use std::io::Write;

use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};
use skybuf::{EdgeMode, Error, Interpolant, LookupTable, LookupTable2D, TableOptions};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn squares(interpolant: Interpolant) -> LookupTable {
    LookupTable::new(
        vec![0.0, 1.0, 2.0, 3.0, 4.0],
        vec![0.0, 1.0, 4.0, 9.0, 16.0],
        TableOptions::new(interpolant),
    )
    .unwrap()
}

/// A 4x4 grid of `f = x + 10 y` on equally spaced axes.
fn plane(edge_mode: EdgeMode) -> LookupTable2D {
    let x = vec![0.0, 1.0, 2.0, 3.0];
    let y = vec![0.0, 0.5, 1.0, 1.5];
    let f = Array2::from_shape_fn((4, 4), |(i, j)| x[i] + 10.0 * y[j]);
    LookupTable2D::new(x, y, f, Interpolant::Linear, edge_mode).unwrap()
}

// ---------------------------------------------------------------------------
// 1D tables
// ---------------------------------------------------------------------------

#[test]
fn linear_and_spline_on_squares() {
    init_logging();
    let linear = squares(Interpolant::Linear);
    let spline = squares(Interpolant::Spline);
    assert_abs_diff_eq!(linear.evaluate(0.5).unwrap(), 0.5, epsilon = 1e-12);

    let s = spline.evaluate(0.5).unwrap();
    assert!((s - 0.5).abs() < 0.5, "spline value {s} strays from linear");
    // Continuity across a knot.
    let left = spline.evaluate(2.0 - 1e-9).unwrap();
    let right = spline.evaluate(2.0 + 1e-9).unwrap();
    assert_abs_diff_eq!(left, right, epsilon = 1e-6);
    assert_abs_diff_eq!(spline.evaluate(2.0).unwrap(), 4.0, epsilon = 1e-12);
}

#[test]
fn range_tolerance_band() {
    let t = squares(Interpolant::Linear);
    // The band is relative to the tabulated range, 1e-6 * 4 here.
    assert_abs_diff_eq!(t.evaluate(-1e-6).unwrap(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(t.evaluate(4.0 + 1e-6).unwrap(), 16.0, epsilon = 1e-12);
    let err = t.evaluate(-1.0).unwrap_err();
    assert!(matches!(err, Error::Range { value, .. } if value == -1.0));
    assert!(t.evaluate_many(&[1.0, 2.0, 5.0]).is_err());
}

#[test]
fn step_kernels() {
    let x = vec![0.0, 1.0, 2.0];
    let f = vec![10.0, 20.0, 30.0];
    let table = |i| LookupTable::new(x.clone(), f.clone(), TableOptions::new(i)).unwrap();
    assert_eq!(table(Interpolant::Floor).evaluate(1.7).unwrap(), 20.0);
    assert_eq!(table(Interpolant::Ceil).evaluate(1.2).unwrap(), 30.0);
    assert_eq!(table(Interpolant::Nearest).evaluate(1.2).unwrap(), 20.0);
    assert_eq!(table(Interpolant::Nearest).evaluate(1.5).unwrap(), 30.0);
    assert_eq!(table(Interpolant::Floor).evaluate(2.0).unwrap(), 30.0);
}

#[test]
fn unsorted_input_is_sorted() {
    let t = LookupTable::new(
        vec![3.0, 1.0, 2.0],
        vec![30.0, 10.0, 20.0],
        TableOptions::new(Interpolant::Linear),
    )
    .unwrap();
    assert_eq!(t.x(), &[1.0, 2.0, 3.0]);
    assert_abs_diff_eq!(t.evaluate(2.5).unwrap(), 25.0, epsilon = 1e-12);
}

#[test]
fn log_log_power_law_is_exact() {
    let options = TableOptions::new(Interpolant::Linear)
        .with_x_log(true)
        .with_f_log(true);
    let t = LookupTable::from_func(|x| x.powi(3), 1.0, 100.0, 50, options).unwrap();
    assert!(t.x_log() && t.f_log());
    assert_abs_diff_eq!(t.evaluate(7.3).unwrap(), 7.3f64.powi(3), epsilon = 1e-6);
}

#[test]
fn from_file_reads_two_columns() {
    init_logging();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# wavelength  throughput").unwrap();
    writeln!(file, "400  0.1").unwrap();
    writeln!(file, "500, 0.5").unwrap();
    writeln!(file, "600  0.3").unwrap();
    file.flush().unwrap();

    let t = LookupTable::from_file(file.path(), TableOptions::new(Interpolant::Linear), 2.0)
        .unwrap();
    assert_eq!(t.len(), 3);
    assert_eq!(t.f(), &[0.2, 1.0, 0.6]);
    assert_abs_diff_eq!(t.evaluate(450.0).unwrap(), 0.6, epsilon = 1e-12);
}

#[test]
fn bad_tables_are_rejected() {
    let opts = TableOptions::new(Interpolant::Spline);
    assert!(matches!(
        LookupTable::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0], opts),
        Err(Error::IncompatibleValues(_))
    ));
    assert!(matches!(
        LookupTable::new(vec![0.0, 1.0], vec![0.0, 1.0], opts),
        Err(Error::InvalidValue(_))
    ));
    assert!(matches!(
        LookupTable::new(vec![0.0, 1.0, 1.0], vec![0.0, 1.0, 2.0], opts),
        Err(Error::InvalidValue(_))
    ));
    let log = TableOptions::new(Interpolant::Linear).with_f_log(true);
    assert!(LookupTable::new(vec![0.0, 1.0], vec![0.0, 1.0], log).is_err());
}

// ---------------------------------------------------------------------------
// 2D tables
// ---------------------------------------------------------------------------

#[test]
fn bilinear_reproduces_a_plane() {
    let t = plane(EdgeMode::Raise);
    assert_abs_diff_eq!(t.evaluate(1.25, 0.75).unwrap(), 8.75, epsilon = 1e-12);
    let (dx, dy) = t.gradient(2.5, 0.2).unwrap();
    assert_abs_diff_eq!(dx, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(dy, 10.0, epsilon = 1e-12);
    assert!(matches!(t.evaluate(3.5, 0.0), Err(Error::OutOfBounds(_))));
}

#[test]
fn wrap_mode_is_periodic() {
    init_logging();
    let t = plane(EdgeMode::Wrap);
    let (px, py) = t.period().unwrap();
    assert_eq!((px, py), (4.0, 2.0));
    for &(x, y) in &[(0.3, 0.1), (1.7, 1.2), (3.4, 1.9), (2.0, 0.5)] {
        let v = t.evaluate(x, y).unwrap();
        assert_abs_diff_eq!(t.evaluate(x + px, y).unwrap(), v, epsilon = 1e-9);
        assert_abs_diff_eq!(t.evaluate(x, y + py).unwrap(), v, epsilon = 1e-9);
        assert_abs_diff_eq!(t.evaluate(x - px, y - py).unwrap(), v, epsilon = 1e-9);
    }
}

#[test]
fn constant_mode_fills_per_point() {
    let t = plane(EdgeMode::Constant(-1.0));
    for &(x, y) in &[(-0.5, 0.0), (0.0, 2.0), (10.0, 10.0)] {
        assert_eq!(t.evaluate(x, y).unwrap(), -1.0);
    }
    let values = t
        .evaluate_many(&[1.0, 5.0, 2.0, -3.0], &[0.5, 0.5, 1.5, 1.0])
        .unwrap();
    assert_eq!(values[1], -1.0);
    assert_eq!(values[3], -1.0);
    assert_abs_diff_eq!(values[0], 6.0, epsilon = 1e-12);
    assert_abs_diff_eq!(values[2], 17.0, epsilon = 1e-12);

    let xs = array![[0.5, 9.0], [1.0, 1.0]];
    let ys = array![[0.0, 0.0], [0.25, 9.0]];
    let out = t.evaluate_array(&xs, &ys).unwrap();
    assert_abs_diff_eq!(out[[0, 0]], 0.5, epsilon = 1e-12);
    assert_eq!(out[[0, 1]], -1.0);
    assert_abs_diff_eq!(out[[1, 0]], 3.5, epsilon = 1e-12);
    assert_eq!(out[[1, 1]], -1.0);
}

#[test]
fn mismatched_query_lengths_fail() {
    let t = plane(EdgeMode::Raise);
    assert!(matches!(
        t.evaluate_many(&[1.0, 2.0], &[1.0]),
        Err(Error::IncompatibleValues(_))
    ));
}
