//! Damped Newton-Raphson: the Newton step δ is halved until the residual norm does not grow.
//!
//! The halving search is shared with the damped Gauss-Newton fit.
use super::NR::{Damping, IterationResult, newton_raphson_traced};
use crate::numerical::config::LinearSysMethod;
use crate::numerical::num_errors::NumError;
use crate::numerical::trace::{LogTrace, NoTrace, TraceSink};
use log::{debug, error};
use nalgebra::DVector;

/// Finds the smallest `k >= 0` with `norm(x + δ/2^k) <= norm(x)` and returns `(k, x + δ/2^k)`.
///
/// Without a cap the search ends at the latest when δ/2^k underflows and the candidate equals `x`.
/// A NaN norm also ends it, NaN never compares greater.
pub(crate) fn halving_search<G>(
    residual: &str,
    norm: G,
    x: &DVector<f64>,
    delta: &DVector<f64>,
    iteration: usize,
    max_halvings: Option<usize>,
    sink: &mut dyn TraceSink,
) -> Result<(usize, DVector<f64>), NumError>
where
    G: Fn(&DVector<f64>) -> f64,
{
    let damped_label = format!("||{}(x + δ/2^k)||", residual);
    let undamped_label = format!("||{}(x)||", residual);
    let norm_undamped = norm(x);
    let mut k: usize = 0;
    let mut scale = 1.0;
    let mut candidate = x + delta;
    let mut norm_damped = norm(&candidate);
    while norm_damped > norm_undamped {
        sink.scalar("k", k as f64);
        sink.scalar(&damped_label, norm_damped);
        sink.scalar(&undamped_label, norm_undamped);
        k += 1;
        if let Some(cap) = max_halvings {
            if k > cap {
                error!(
                    "no damping coefficient found in iteration {} after {} halvings",
                    iteration, cap
                );
                return Err(NumError::DampingExhausted {
                    iteration,
                    halvings: cap,
                });
            }
        }
        scale *= 0.5;
        candidate = x + delta * scale;
        norm_damped = norm(&candidate);
    }
    debug!("iteration {}: damping coefficient 1/2^{}", iteration, k);
    sink.scalar("k", k as f64);
    sink.scalar(&damped_label, norm_damped);
    sink.scalar(&undamped_label, norm_undamped);
    Ok((k, candidate))
}

/// Newton-Raphson with step halving, unbounded search
pub fn newton_raphson_damped<F>(
    f: F,
    x0: &DVector<f64>,
    eps: f64,
    max_iterations: usize,
) -> Result<(DVector<f64>, usize), NumError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    newton_raphson_damped_traced(f, x0, eps, max_iterations, None, &mut NoTrace)
        .map(IterationResult::into_tuple)
}

pub fn newton_raphson_damped_print<F>(
    f: F,
    x0: &DVector<f64>,
    eps: f64,
    max_iterations: usize,
    digits: usize,
) -> Result<(DVector<f64>, usize), NumError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    newton_raphson_damped_traced(
        f,
        x0,
        eps,
        max_iterations,
        None,
        &mut LogTrace::new(digits),
    )
    .map(IterationResult::into_tuple)
}

/// `max_halvings = Some(m)` fails with `DampingExhausted` once more than `m` halvings would be needed
pub fn newton_raphson_damped_traced<F>(
    f: F,
    x0: &DVector<f64>,
    eps: f64,
    max_iterations: usize,
    max_halvings: Option<usize>,
    sink: &mut dyn TraceSink,
) -> Result<IterationResult, NumError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    newton_raphson_traced(
        f,
        x0,
        eps,
        max_iterations,
        LinearSysMethod::Lu,
        Damping::Halving { max_halvings },
        sink,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::NR::newton_raphson;
    use crate::numerical::trace::TraceRecorder;
    use approx::assert_relative_eq;

    fn himmelblau(x: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![
            x[0] * x[0] + x[1] - 11.0,
            x[0] + x[1] * x[1] - 7.0,
        ])
    }

    #[test]
    fn test_damped_himmelblau() {
        let x0 = DVector::from_vec(vec![5.0, 4.0]);
        let (x, _) = newton_raphson_damped(himmelblau, &x0, 1e-8, 100).unwrap();
        assert!(himmelblau(&x).norm() < 1e-8);
    }

    #[test]
    fn test_damped_residual_never_increases() {
        let mut rec = TraceRecorder::new();
        let x0 = DVector::from_vec(vec![-0.5, 0.3]);
        newton_raphson_damped_traced(himmelblau, &x0, 1e-10, 50, None, &mut rec).unwrap();
        let mut previous = himmelblau(&x0).norm();
        for x in rec.vectors("x") {
            let current = himmelblau(&x).norm();
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn test_damped_matches_undamped_when_full_steps_accepted() {
        // every full step of a linear system reaches the root
        let f = |x: &DVector<f64>| DVector::from_vec(vec![2.0 * x[0] + x[1] - 3.0, x[0] - x[1]]);
        let x0 = DVector::from_vec(vec![10.0, -10.0]);
        let (xd, nd) = newton_raphson_damped(f, &x0, 1e-9, 20).unwrap();
        let (xu, nu) = newton_raphson(f, &x0, 1e-9, 20).unwrap();
        assert_eq!(nd, nu);
        assert_relative_eq!(xd[0], xu[0], epsilon = 1e-12);
        assert_relative_eq!(xd[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_halving_search_picks_smallest_k() {
        // ||x + δ/2^k|| with x = 1, δ = -3: k = 0 gives 2 > 1, k = 1 gives 0.5
        let norm = |y: &DVector<f64>| y[0].abs();
        let x = DVector::from_vec(vec![1.0]);
        let delta = DVector::from_vec(vec![-3.0]);
        let (k, x_new) = halving_search("f", norm, &x, &delta, 1, None, &mut NoTrace).unwrap();
        assert_eq!(k, 1);
        assert_relative_eq!(x_new[0], -0.5);
    }

    #[test]
    fn test_halving_search_cap() {
        // residual grows in every direction, only δ/2^k -> 0 would stop the search
        let norm = |y: &DVector<f64>| 1.0 + y[0] * y[0];
        let x = DVector::from_vec(vec![0.0]);
        let delta = DVector::from_vec(vec![1.0]);
        let err = halving_search("f", norm, &x, &delta, 3, Some(5), &mut NoTrace).unwrap_err();
        assert_eq!(
            err,
            NumError::DampingExhausted {
                iteration: 3,
                halvings: 5
            }
        );
        // unbounded search stops once the step underflows
        let (k, x_new) = halving_search("f", norm, &x, &delta, 3, None, &mut NoTrace).unwrap();
        assert!(k > 5);
        assert!(x_new[0].abs() < 1e-7);
        assert_eq!(norm(&x_new), 1.0);
    }
}
