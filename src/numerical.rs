//! Classic numerical methods on closures: finite differences, root finding, interpolation,
//! curve fitting, quadrature and fixed-step ODE integration.
//!
//! Every engine has a plain form, a `_traced` form taking a [`trace::TraceSink`] and a `_print`
//! form narrating the intermediate quantities through the `log` crate.
/// error type shared by all engines
pub mod num_errors;
/// solver parameters and the choice of linear solver
pub mod config;
/// sinks for intermediate quantities of the engines
pub mod trace;

/// finite difference derivatives, partial derivatives and Jacobians
pub mod Differentiation;

/// Newton-Raphson method for scalar equations and for systems
pub mod NR;
/// damped Newton-Raphson: the step is halved until the residual norm stops growing
pub mod NR_damped;

/// Lagrange polynomial and natural cubic spline interpolation
pub mod Interpolation;

/// Gauss-Newton least squares fitting of a parametrized model
/// ```
/// use RustedNumLab::numerical::GaussNewton::GaussNewton;
/// use nalgebra::DVector;
/// let mut fit = GaussNewton::new();
/// fit.set_model(
///     |x: f64, p: &DVector<f64>| p[0] * (p[1] * x).exp(),
///     vec![0.0, 1.0, 2.0, 3.0, 4.0],
///     vec![3.0, 1.0, 0.5, 0.2, 0.05],
///     vec![1.0, -0.5],
///     1e-8,
///     100,
/// )
/// .unwrap();
/// fit.set_solver_params(Some("off".to_string()), None, None).unwrap();
/// let p = fit.solve().unwrap();
/// assert!((p[0] - 2.98166).abs() < 1e-4);
/// ```
pub mod GaussNewton;

/// composite rules and Romberg extrapolation
pub mod Integration;

/// fixed step ODE solvers
/// ```
/// use RustedNumLab::numerical::ODE_fixed_step::fixed_step_api::{solve_ivp_vec, OdeMethod};
/// use nalgebra::DVector;
/// // harmonic oscillator
/// let f = |_t: f64, y: &DVector<f64>| DVector::from_vec(vec![y[1], -y[0]]);
/// let y0 = DVector::from_vec(vec![1.0, 0.0]);
/// let (t, y) = solve_ivp_vec(OdeMethod::RK8, f, 0.0, 1.0, 0.1, &y0).unwrap();
/// assert_eq!(y.nrows(), t.len());
/// assert!((y[(10, 0)] - 1.0f64.cos()).abs() < 1e-8);
/// ```
pub mod ODE_fixed_step;
