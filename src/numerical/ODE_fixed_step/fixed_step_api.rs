//! Public fixed-step ODE solvers.
//!
//! Scalar problems `y' = f(x, y)` return `(x, y)` as two vectors of `n + 1` points.
//! Systems `y' = f(x, y)` with `y ∈ R^m` return `x` and an `(n + 1) × m` matrix whose row `i`
//! is the state at `x[i]`.
//! ```
//! use RustedNumLab::numerical::ODE_fixed_step::fixed_step_api::{runge_kutta_4, euler};
//! let (x, y) = runge_kutta_4(|_x, y| -y, 0.0, 1.0, 0.1, 1.0).unwrap();
//! assert_eq!(x.len(), 11);
//! assert!((y[10] - (-1.0f64).exp()).abs() < 1e-6);
//! let (_, y_euler) = euler(|_x, y| -y, 0.0, 1.0, 0.1, 1.0).unwrap();
//! assert!((y_euler[10] - (-1.0f64).exp()).abs() > 1e-3);
//! ```
use super::fixed_step_engine::integrate_traced;
use super::tableaus::{EULER, ExplicitTableau, MIDPOINT, MODIFIED_EULER, RK4, RK8};
use crate::numerical::num_errors::NumError;
use crate::numerical::trace::{LogTrace, NoTrace, TraceSink};
use nalgebra::{DMatrix, DVector};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum OdeMethod {
    Euler,
    Midpoint,
    /// Heun
    ModifiedEuler,
    RK4,
    RK8,
}

impl OdeMethod {
    pub fn tableau(&self) -> &'static ExplicitTableau {
        match self {
            OdeMethod::Euler => &EULER,
            OdeMethod::Midpoint => &MIDPOINT,
            OdeMethod::ModifiedEuler => &MODIFIED_EULER,
            OdeMethod::RK4 => &RK4,
            OdeMethod::RK8 => &RK8,
        }
    }

    pub fn order(&self) -> usize {
        self.tableau().order
    }
}

/// scalar trajectory
pub type Trajectory = (DVector<f64>, DVector<f64>);
/// system trajectory, one row per grid point
pub type SystemTrajectory = (DVector<f64>, DMatrix<f64>);

////////////////////////////////////////////////////////////////////////////////////////////////
//                     SCALAR PROBLEMS
////////////////////////////////////////////////////////////////////////////////////////////////
pub fn solve_ivp_traced<F>(
    method: OdeMethod,
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: f64,
    sink: &mut dyn TraceSink,
) -> Result<Trajectory, NumError>
where
    F: Fn(f64, f64) -> f64,
{
    let (x, y) = integrate_traced(method.tableau(), |x, y: &f64| f(x, *y), a, b, h, y0, sink)?;
    Ok((DVector::from_vec(x), DVector::from_vec(y)))
}

pub fn solve_ivp<F>(method: OdeMethod, f: F, a: f64, b: f64, h: f64, y0: f64) -> Result<Trajectory, NumError>
where
    F: Fn(f64, f64) -> f64,
{
    solve_ivp_traced(method, f, a, b, h, y0, &mut NoTrace)
}

/// logs every stage slope and every new point
pub fn solve_ivp_print<F>(
    method: OdeMethod,
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: f64,
    digits: usize,
) -> Result<Trajectory, NumError>
where
    F: Fn(f64, f64) -> f64,
{
    solve_ivp_traced(method, f, a, b, h, y0, &mut LogTrace::new(digits))
}

pub fn euler<F: Fn(f64, f64) -> f64>(f: F, a: f64, b: f64, h: f64, y0: f64) -> Result<Trajectory, NumError> {
    solve_ivp(OdeMethod::Euler, f, a, b, h, y0)
}

pub fn euler_print<F: Fn(f64, f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: f64,
    digits: usize,
) -> Result<Trajectory, NumError> {
    solve_ivp_print(OdeMethod::Euler, f, a, b, h, y0, digits)
}

pub fn midpoint<F: Fn(f64, f64) -> f64>(f: F, a: f64, b: f64, h: f64, y0: f64) -> Result<Trajectory, NumError> {
    solve_ivp(OdeMethod::Midpoint, f, a, b, h, y0)
}

pub fn midpoint_print<F: Fn(f64, f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: f64,
    digits: usize,
) -> Result<Trajectory, NumError> {
    solve_ivp_print(OdeMethod::Midpoint, f, a, b, h, y0, digits)
}

pub fn modified_euler<F: Fn(f64, f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: f64,
) -> Result<Trajectory, NumError> {
    solve_ivp(OdeMethod::ModifiedEuler, f, a, b, h, y0)
}

pub fn modified_euler_print<F: Fn(f64, f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: f64,
    digits: usize,
) -> Result<Trajectory, NumError> {
    solve_ivp_print(OdeMethod::ModifiedEuler, f, a, b, h, y0, digits)
}

pub fn runge_kutta_4<F: Fn(f64, f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: f64,
) -> Result<Trajectory, NumError> {
    solve_ivp(OdeMethod::RK4, f, a, b, h, y0)
}

pub fn runge_kutta_4_print<F: Fn(f64, f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: f64,
    digits: usize,
) -> Result<Trajectory, NumError> {
    solve_ivp_print(OdeMethod::RK4, f, a, b, h, y0, digits)
}

pub fn runge_kutta_8<F: Fn(f64, f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: f64,
) -> Result<Trajectory, NumError> {
    solve_ivp(OdeMethod::RK8, f, a, b, h, y0)
}

pub fn runge_kutta_8_print<F: Fn(f64, f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: f64,
    digits: usize,
) -> Result<Trajectory, NumError> {
    solve_ivp_print(OdeMethod::RK8, f, a, b, h, y0, digits)
}

////////////////////////////////////////////////////////////////////////////////////////////////
//                     SYSTEMS
////////////////////////////////////////////////////////////////////////////////////////////////
pub fn solve_ivp_vec_traced<F>(
    method: OdeMethod,
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: &DVector<f64>,
    sink: &mut dyn TraceSink,
) -> Result<SystemTrajectory, NumError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    if y0.is_empty() {
        return Err(NumError::DimensionMismatch(
            "initial state must have at least one component".to_string(),
        ));
    }
    let (x, y) = integrate_traced(method.tableau(), f, a, b, h, y0.clone(), sink)?;
    let Y = DMatrix::from_fn(y.len(), y0.len(), |i, j| y[i][j]);
    Ok((DVector::from_vec(x), Y))
}

pub fn solve_ivp_vec<F>(
    method: OdeMethod,
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: &DVector<f64>,
) -> Result<SystemTrajectory, NumError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    solve_ivp_vec_traced(method, f, a, b, h, y0, &mut NoTrace)
}

pub fn solve_ivp_vec_print<F>(
    method: OdeMethod,
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: &DVector<f64>,
    digits: usize,
) -> Result<SystemTrajectory, NumError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    solve_ivp_vec_traced(method, f, a, b, h, y0, &mut LogTrace::new(digits))
}

pub fn euler_vec<F>(f: F, a: f64, b: f64, h: f64, y0: &DVector<f64>) -> Result<SystemTrajectory, NumError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    solve_ivp_vec(OdeMethod::Euler, f, a, b, h, y0)
}

pub fn midpoint_vec<F>(f: F, a: f64, b: f64, h: f64, y0: &DVector<f64>) -> Result<SystemTrajectory, NumError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    solve_ivp_vec(OdeMethod::Midpoint, f, a, b, h, y0)
}

pub fn modified_euler_vec<F>(
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: &DVector<f64>,
) -> Result<SystemTrajectory, NumError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    solve_ivp_vec(OdeMethod::ModifiedEuler, f, a, b, h, y0)
}

pub fn runge_kutta_4_vec<F>(
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: &DVector<f64>,
) -> Result<SystemTrajectory, NumError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    solve_ivp_vec(OdeMethod::RK4, f, a, b, h, y0)
}

pub fn runge_kutta_8_vec<F>(
    f: F,
    a: f64,
    b: f64,
    h: f64,
    y0: &DVector<f64>,
) -> Result<SystemTrajectory, NumError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    solve_ivp_vec(OdeMethod::RK8, f, a, b, h, y0)
}
