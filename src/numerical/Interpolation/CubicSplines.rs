//! Natural cubic spline.
//!
//! On interval `j` the spline is `S_j(x) = a_j + b_j·(x - x_j) + c_j·(x - x_j)^2 + d_j·(x - x_j)^3`.
//! The second derivative coefficients `c` of the interior knots solve a tridiagonal system,
//! natural boundary conditions fix `c_0 = c_n = 0`.
//! ```
//! use RustedNumLab::numerical::Interpolation::CubicSplines::CubicSpline;
//! let x_data = [0.0, 1.0, 2.0, 3.0];
//! let y_data = [0.0, 1.0, 0.0, 1.0];
//! let spline = CubicSpline::new(&x_data, &y_data).unwrap();
//! assert!((spline.eval(1.0) - 1.0).abs() < 1e-14);
//! assert!(spline.eval_derivative(3.0, 2).unwrap().abs() < 1e-12);
//! ```
use crate::numerical::config::LinearSysMethod;
use crate::numerical::num_errors::{NumError, check_sample_set};
use crate::numerical::trace::{LogTrace, NoTrace, TraceSink};
use crate::somelinalg::dense_solvers::solve_linear_system;
use log::debug;
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    pub x_data: Vec<f64>,
    pub a: DVector<f64>,
    pub b: DVector<f64>,
    pub c: DVector<f64>,
    pub d: DVector<f64>,
}

fn check_strictly_increasing(x_data: &[f64]) -> Result<(), NumError> {
    for i in 1..x_data.len() {
        // also rejects NaN
        if !(x_data[i] > x_data[i - 1]) {
            return Err(NumError::NotStrictlyIncreasing { index: i });
        }
    }
    Ok(())
}

impl CubicSpline {
    pub fn new(x_data: &[f64], y_data: &[f64]) -> Result<Self, NumError> {
        Self::new_traced(x_data, y_data, &mut NoTrace)
    }

    pub fn new_traced(
        x_data: &[f64],
        y_data: &[f64],
        sink: &mut dyn TraceSink,
    ) -> Result<Self, NumError> {
        check_sample_set(x_data, y_data, 2)?;
        check_strictly_increasing(x_data)?;
        sink.section("CUBIC SPLINE");
        // number of intervals
        let n = x_data.len() - 1;
        let h = DVector::from_fn(n, |i, _| x_data[i + 1] - x_data[i]);
        let slope = DVector::from_fn(n, |i, _| (y_data[i + 1] - y_data[i]) / h[i]);
        sink.vector("h", &h);

        // c[0] = c[n] = 0
        let mut c_full: DVector<f64> = DVector::zeros(n + 1);
        let interior = n - 1;
        if interior > 0 {
            let mut A: DMatrix<f64> = DMatrix::zeros(interior, interior);
            let mut z: DVector<f64> = DVector::zeros(interior);
            for k in 0..interior {
                A[(k, k)] = 2.0 * (h[k] + h[k + 1]);
                if k + 1 < interior {
                    A[(k, k + 1)] = h[k + 1];
                    A[(k + 1, k)] = h[k + 1];
                }
                z[k] = 3.0 * (slope[k + 1] - slope[k]);
            }
            sink.matrix("A", &A);
            sink.vector("z", &z);
            let c_interior = solve_linear_system(LinearSysMethod::Lu, &A, &z)?;
            c_full.rows_mut(1, interior).copy_from(&c_interior);
        }
        sink.vector("c", &c_full);

        let a = DVector::from_fn(n, |i, _| y_data[i]);
        let b = DVector::from_fn(n, |i, _| {
            slope[i] - h[i] / 3.0 * (c_full[i + 1] + 2.0 * c_full[i])
        });
        let d = DVector::from_fn(n, |i, _| (c_full[i + 1] - c_full[i]) / (3.0 * h[i]));
        let c = c_full.rows(0, n).into_owned();
        sink.vector("a", &a);
        sink.vector("b", &b);
        sink.vector("d", &d);
        debug!("natural cubic spline with {} intervals built", n);
        Ok(CubicSpline {
            x_data: x_data.to_vec(),
            a,
            b,
            c,
            d,
        })
    }

    pub fn n_intervals(&self) -> usize {
        self.a.len()
    }

    /// Interval used for `x`: the first `j` with `x_j <= x <= x_{j+1}`, the first interval below
    /// the data range and the last one above it. A shared knot belongs to the lower interval.
    pub fn interval(&self, x: f64) -> usize {
        if x < self.x_data[0] {
            return 0;
        }
        let n = self.n_intervals();
        (0..n)
            .find(|&j| self.x_data[j] <= x && x <= self.x_data[j + 1])
            .unwrap_or(n - 1)
    }

    pub fn eval(&self, x: f64) -> f64 {
        let j = self.interval(x);
        let dx = x - self.x_data[j];
        self.a[j] + dx * (self.b[j] + dx * (self.c[j] + dx * self.d[j]))
    }

    pub fn eval_vec(&self, x: &[f64]) -> DVector<f64> {
        DVector::from_iterator(x.len(), x.iter().map(|&xi| self.eval(xi)))
    }

    /// derivative of order 0..=3 at `x`
    pub fn eval_derivative(&self, x: f64, order: usize) -> Result<f64, NumError> {
        let j = self.interval(x);
        let dx = x - self.x_data[j];
        let (b, c, d) = (self.b[j], self.c[j], self.d[j]);
        match order {
            0 => Ok(self.eval(x)),
            1 => Ok(b + dx * (2.0 * c + 3.0 * d * dx)),
            2 => Ok(2.0 * c + 6.0 * d * dx),
            3 => Ok(6.0 * d),
            _ => Err(NumError::InvalidArgument(format!(
                "derivative order must be between 0 and 3, got {}",
                order
            ))),
        }
    }
}

/// fits a natural cubic spline to `(x_data, y_data)` and evaluates it at every point of `x`
pub fn spline(x: &[f64], x_data: &[f64], y_data: &[f64]) -> Result<DVector<f64>, NumError> {
    Ok(CubicSpline::new(x_data, y_data)?.eval_vec(x))
}

pub fn spline_print(
    x: &[f64],
    x_data: &[f64],
    y_data: &[f64],
    digits: usize,
) -> Result<DVector<f64>, NumError> {
    let mut sink = LogTrace::new(digits);
    let spline = CubicSpline::new_traced(x_data, y_data, &mut sink)?;
    let y = spline.eval_vec(x);
    sink.vector("y", &y);
    sink.section("DONE");
    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::trace::TraceRecorder;
    use approx::assert_relative_eq;

    const X: [f64; 6] = [0.0, 0.5, 1.5, 2.0, 3.5, 4.0];
    const Y: [f64; 6] = [1.0, 2.0, 0.5, -1.0, 0.0, 3.0];

    #[test]
    fn test_spline_reproduces_knots() {
        let spline = CubicSpline::new(&X, &Y).unwrap();
        for i in 0..X.len() {
            assert_relative_eq!(spline.eval(X[i]), Y[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_natural_boundary_conditions() {
        let spline = CubicSpline::new(&X, &Y).unwrap();
        assert_relative_eq!(spline.eval_derivative(X[0], 2).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(spline.eval_derivative(X[5], 2).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_continuity_at_interior_knots() {
        let spline = CubicSpline::new(&X, &Y).unwrap();
        for j in 1..X.len() - 1 {
            // value, slope and curvature of the left cubic at its right end
            let h = X[j] - X[j - 1];
            let left = spline.a[j - 1]
                + spline.b[j - 1] * h
                + spline.c[j - 1] * h * h
                + spline.d[j - 1] * h * h * h;
            let left_slope = spline.b[j - 1] + 2.0 * spline.c[j - 1] * h + 3.0 * spline.d[j - 1] * h * h;
            let left_curv = 2.0 * spline.c[j - 1] + 6.0 * spline.d[j - 1] * h;
            assert_relative_eq!(left, spline.a[j], epsilon = 1e-12);
            assert_relative_eq!(left_slope, spline.b[j], epsilon = 1e-10);
            assert_relative_eq!(left_curv, 2.0 * spline.c[j], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_two_knots_give_straight_line() {
        let spline = CubicSpline::new(&[1.0, 3.0], &[2.0, 6.0]).unwrap();
        assert_relative_eq!(spline.eval(2.0), 4.0);
        assert_relative_eq!(spline.eval(0.0), 0.0);
        assert_relative_eq!(spline.eval(5.0), 10.0);
        assert_eq!(spline.c[0], 0.0);
        assert_eq!(spline.d[0], 0.0);
    }

    #[test]
    fn test_linear_data_is_reproduced_everywhere() {
        let x = [0.0, 1.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v - 1.0).collect();
        let values = spline(&[-1.0, 0.5, 2.0, 3.9, 6.0], &x, &y).unwrap();
        for (q, v) in [-1.0, 0.5, 2.0, 3.9, 6.0].iter().zip(values.iter()) {
            assert_relative_eq!(*v, 2.0 * q - 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_interval_selection() {
        let spline = CubicSpline::new(&X, &Y).unwrap();
        assert_eq!(spline.interval(-10.0), 0);
        assert_eq!(spline.interval(0.0), 0);
        // shared knot goes to the lower interval
        assert_eq!(spline.interval(0.5), 0);
        assert_eq!(spline.interval(0.6), 1);
        assert_eq!(spline.interval(4.0), 4);
        assert_eq!(spline.interval(10.0), 4);
        // extrapolation continues the outer cubics
        let below = spline.eval(-1.0);
        let dx = -1.0 - X[0];
        let expected = spline.a[0] + spline.b[0] * dx + spline.c[0] * dx * dx + spline.d[0] * dx.powi(3);
        assert_relative_eq!(below, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_sample_sets() {
        assert_eq!(
            CubicSpline::new(&[0.0, 1.0, 2.0], &[0.0, 1.0]),
            Err(NumError::LengthMismatch { x_len: 3, y_len: 2 })
        );
        assert_eq!(
            CubicSpline::new(&[0.0], &[0.0]),
            Err(NumError::TooFewPoints { required: 2, got: 1 })
        );
        assert_eq!(
            CubicSpline::new(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]),
            Err(NumError::NotStrictlyIncreasing { index: 2 })
        );
        assert_eq!(
            CubicSpline::new(&[0.0, 0.0, 1.0], &[0.0, 1.0, 2.0]),
            Err(NumError::NotStrictlyIncreasing { index: 1 })
        );
        let spline = CubicSpline::new(&X, &Y).unwrap();
        assert!(spline.eval_derivative(1.0, 4).is_err());
    }

    #[test]
    fn test_spline_trace() {
        let mut rec = TraceRecorder::new();
        CubicSpline::new_traced(&X, &Y, &mut rec).unwrap();
        assert_eq!(rec.matrices("A")[0].shape(), (4, 4));
        let c = &rec.vectors("c")[0];
        assert_eq!(c.len(), 6);
        assert_eq!(c[0], 0.0);
        assert_eq!(c[5], 0.0);
    }
}
