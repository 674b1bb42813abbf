//! One explicit fixed-step integrator for every tableau and both state kinds.
use super::tableaus::ExplicitTableau;
use crate::numerical::Integration::quadrature::segments;
use crate::numerical::num_errors::NumError;
use crate::numerical::trace::TraceSink;
use log::info;
use nalgebra::DVector;

/// State of the integrated system: a single `f64` or a `DVector<f64>`.
pub trait OdeState: Clone {
    /// `self + scale·direction`
    fn add_scaled(&self, scale: f64, direction: &Self) -> Self;

    /// `Σ w_j·k_j` over the nonzero weights, summed left to right
    fn weighted_sum(weights: &[f64], ks: &[Self]) -> Self;

    /// error if the right hand side returned a state of another shape
    fn check_shape(&self, slope: &Self) -> Result<(), NumError>;

    fn trace(&self, name: &str, sink: &mut dyn TraceSink);
}

impl OdeState for f64 {
    fn add_scaled(&self, scale: f64, direction: &Self) -> Self {
        self + scale * direction
    }

    fn weighted_sum(weights: &[f64], ks: &[Self]) -> Self {
        let mut terms = weights
            .iter()
            .zip(ks)
            .filter(|(w, _)| **w != 0.0)
            .map(|(w, k)| w * k);
        let first = terms.next().unwrap_or(0.0);
        terms.fold(first, |acc, term| acc + term)
    }

    fn check_shape(&self, _slope: &Self) -> Result<(), NumError> {
        Ok(())
    }

    fn trace(&self, name: &str, sink: &mut dyn TraceSink) {
        sink.scalar(name, *self);
    }
}

impl OdeState for DVector<f64> {
    fn add_scaled(&self, scale: f64, direction: &Self) -> Self {
        self + direction * scale
    }

    fn weighted_sum(weights: &[f64], ks: &[Self]) -> Self {
        let mut terms = weights
            .iter()
            .zip(ks)
            .filter(|(w, _)| **w != 0.0)
            .map(|(w, k)| k * *w);
        match terms.next() {
            Some(first) => terms.fold(first, |acc, term| acc + term),
            None => DVector::zeros(ks.first().map_or(0, |k| k.len())),
        }
    }

    fn check_shape(&self, slope: &Self) -> Result<(), NumError> {
        if self.len() != slope.len() {
            return Err(NumError::DimensionMismatch(format!(
                "right hand side returned {} components for a state of {}",
                slope.len(),
                self.len()
            )));
        }
        Ok(())
    }

    fn trace(&self, name: &str, sink: &mut dyn TraceSink) {
        sink.vector(name, self);
    }
}

/// One step of `tableau` from `(x, y)`; returns the new state and the stage slopes.
pub fn explicit_step<S, F>(
    tableau: &ExplicitTableau,
    f: &F,
    x: f64,
    y: &S,
    h: f64,
) -> Result<(S, Vec<S>), NumError>
where
    S: OdeState,
    F: Fn(f64, &S) -> S,
{
    let mut ks: Vec<S> = Vec::with_capacity(tableau.n_stages());
    for stage in tableau.stages {
        let y_stage = if stage.coefficients.is_empty() {
            y.clone()
        } else {
            let increment = S::weighted_sum(stage.coefficients, &ks);
            y.add_scaled(stage.scale.of(h), &increment)
        };
        let k = f(x + h * stage.node, &y_stage);
        y.check_shape(&k)?;
        ks.push(k);
    }
    let increment = S::weighted_sum(tableau.weights, &ks);
    Ok((y.add_scaled(tableau.weights_scale.of(h), &increment), ks))
}

/// Trajectory of `n + 1` points on `[a, b]` with `n = ceil((b - a)/h)`; the last point may
/// overshoot `b` when `h` does not divide the interval. A zero step is an `InvalidArgument` error.
pub fn integrate_traced<S, F>(
    tableau: &ExplicitTableau,
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: S,
    sink: &mut dyn TraceSink,
) -> Result<(Vec<f64>, Vec<S>), NumError>
where
    S: OdeState,
    F: Fn(f64, &S) -> S,
{
    let n = segments(a, b, h)?;
    sink.section(tableau.name);
    let mut x = Vec::with_capacity(n + 1);
    let mut y = Vec::with_capacity(n + 1);
    x.push(a);
    y.push(y0);
    for i in 0..n {
        let (y_next, ks) = explicit_step(tableau, &f, x[i], &y[i], h)?;
        let x_next = x[i] + h;
        if sink.enabled() {
            sink.iteration(i + 1);
            for (s, k) in ks.iter().enumerate() {
                k.trace(&format!("k{}", s + 1), sink);
            }
            sink.scalar("x", x_next);
            y_next.trace("y", sink);
        }
        x.push(x_next);
        y.push(y_next);
    }
    sink.section("DONE");
    info!(
        "{}: {} steps of h = {} from x = {} to x = {}",
        tableau.name,
        n,
        h,
        a,
        x[n]
    );
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::ODE_fixed_step::tableaus::{EULER, RK4, RK8};
    use crate::numerical::trace::NoTrace;
    use approx::assert_relative_eq;

    #[test]
    fn test_weighted_sum_skips_zero_weights() {
        let ks = [1.0, f64::NAN, 3.0];
        assert_eq!(f64::weighted_sum(&[2.0, 0.0, -1.0], &ks), -1.0);
        let vs = vec![DVector::from_vec(vec![1.0, 2.0]), DVector::from_vec(vec![3.0, 4.0])];
        assert_eq!(
            DVector::<f64>::weighted_sum(&[0.0, 2.0], &vs),
            DVector::from_vec(vec![6.0, 8.0])
        );
        assert_eq!(DVector::<f64>::weighted_sum(&[0.0, 0.0], &vs), DVector::zeros(2));
    }

    #[test]
    fn test_single_euler_step() {
        let (y1, ks) = explicit_step(&EULER, &|x: f64, y: &f64| x + y, 1.0, &2.0, 0.5).unwrap();
        assert_eq!(ks, vec![3.0]);
        assert_eq!(y1, 3.5);
    }

    #[test]
    fn test_rk4_step_matches_textbook_formula() {
        let f = |x: f64, y: &f64| x * x - 2.0 * y;
        let (x, y, h) = (0.3, 1.2, 0.1);
        let k1 = f(x, &y);
        let k2 = f(x + h / 2.0, &(y + h / 2.0 * k1));
        let k3 = f(x + h / 2.0, &(y + h / 2.0 * k2));
        let k4 = f(x + h, &(y + h * k3));
        let expected = y + h * (1.0 / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
        let (y1, _) = explicit_step(&RK4, &f, x, &y, h).unwrap();
        assert_eq!(y1, expected);
    }

    #[test]
    fn test_shape_mismatch() {
        let f = |_x: f64, _y: &DVector<f64>| DVector::from_vec(vec![1.0]);
        let result = integrate_traced(&RK8, f, 0.0, 1.0, 0.5, DVector::zeros(2), &mut NoTrace);
        assert!(matches!(result, Err(NumError::DimensionMismatch(_))));
    }

    #[test]
    fn test_grid() {
        let (x, y) = integrate_traced(&EULER, |_x: f64, _y: &f64| 0.0, 0.0, 1.0, 0.3, 5.0, &mut NoTrace)
            .unwrap();
        assert_eq!(x.len(), 5);
        assert_eq!(y.len(), 5);
        assert_relative_eq!(x[4], 1.2, epsilon = 1e-12);
        assert!(y.iter().all(|v| *v == 5.0));
    }

    #[test]
    fn test_zero_step_is_rejected() {
        let result = integrate_traced(&EULER, |_x: f64, y: &f64| *y, 0.0, 1.0, 0.0, 1.0, &mut NoTrace);
        assert!(matches!(result, Err(NumError::InvalidArgument(_))));
        let f = |_x: f64, y: &DVector<f64>| -y;
        let result = integrate_traced(&RK8, f, 0.0, 1.0, 0.0, DVector::from_vec(vec![1.0]), &mut NoTrace);
        assert!(matches!(result, Err(NumError::InvalidArgument(_))));
        // negative steps make no step at all
        let (x, _) = integrate_traced(&RK4, |_x: f64, y: &f64| *y, 0.0, 1.0, -0.1, 1.0, &mut NoTrace)
            .unwrap();
        assert_eq!(x, vec![0.0]);
    }
}
