//! Gauss-Newton method for nonlinear least squares, minimizes `||g(λ)||^2`.
//!
//! `g` is the residual, usually `g(λ) = y - model(x, λ)`. Every iteration factorizes the
//! Jacobian `Dg(λ) = QR` and solves `R δ = -Q^T g(λ)`.
//! ```
//! use RustedNumLab::numerical::GaussNewton::gauss_newton;
//! use nalgebra::DVector;
//! let x = [0.0, 1.0, 2.0, 3.0, 4.0];
//! let y = [3.0, 1.0, 0.5, 0.2, 0.05];
//! let g = |l: &DVector<f64>| DVector::from_fn(5, |i, _| y[i] - l[0] * (l[1] * x[i]).exp());
//! let (l, _iterations) = gauss_newton(g, &DVector::from_vec(vec![1.0, -0.5]), 1e-8, 100).unwrap();
//! assert!((l[0] - 2.98166).abs() < 1e-4);
//! ```
use crate::Utils::logger::{elapsed_time, init_logger};
use crate::numerical::Differentiation::jacobian_traced;
use crate::numerical::NR::{Damping, IterationResult, VectorFunction};
use crate::numerical::NR_damped::halving_search;
use crate::numerical::config::SolverConfig;
use crate::numerical::num_errors::NumError;
use crate::numerical::trace::{LogTrace, NoTrace, TraceSink};
use crate::somelinalg::dense_solvers::{norm2, qr_step};
use log::{info, warn};
use nalgebra::DVector;
use std::collections::HashMap;
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

/// Ẽ(λ) = ||g(λ)||^2
pub fn error_functional<G>(g: G, lambda: &DVector<f64>) -> f64
where
    G: Fn(&DVector<f64>) -> DVector<f64>,
{
    g(lambda).norm_squared()
}

pub fn gauss_newton<G>(
    g: G,
    lambda0: &DVector<f64>,
    eps: f64,
    max_iterations: usize,
) -> Result<(DVector<f64>, usize), NumError>
where
    G: Fn(&DVector<f64>) -> DVector<f64>,
{
    gauss_newton_traced(g, lambda0, eps, max_iterations, Damping::Undamped, &mut NoTrace)
        .map(IterationResult::into_tuple)
}

pub fn gauss_newton_print<G>(
    g: G,
    lambda0: &DVector<f64>,
    eps: f64,
    max_iterations: usize,
    digits: usize,
) -> Result<(DVector<f64>, usize), NumError>
where
    G: Fn(&DVector<f64>) -> DVector<f64>,
{
    gauss_newton_traced(
        g,
        lambda0,
        eps,
        max_iterations,
        Damping::Undamped,
        &mut LogTrace::new(digits),
    )
    .map(IterationResult::into_tuple)
}

/// damped variant, step δ/2^p with the smallest p that does not increase ||g||^2
pub fn gauss_newton_damped<G>(
    g: G,
    lambda0: &DVector<f64>,
    eps: f64,
    max_iterations: usize,
) -> Result<(DVector<f64>, usize), NumError>
where
    G: Fn(&DVector<f64>) -> DVector<f64>,
{
    gauss_newton_traced(
        g,
        lambda0,
        eps,
        max_iterations,
        Damping::Halving { max_halvings: None },
        &mut NoTrace,
    )
    .map(IterationResult::into_tuple)
}

pub fn gauss_newton_damped_print<G>(
    g: G,
    lambda0: &DVector<f64>,
    eps: f64,
    max_iterations: usize,
    digits: usize,
) -> Result<(DVector<f64>, usize), NumError>
where
    G: Fn(&DVector<f64>) -> DVector<f64>,
{
    gauss_newton_traced(
        g,
        lambda0,
        eps,
        max_iterations,
        Damping::Halving { max_halvings: None },
        &mut LogTrace::new(digits),
    )
    .map(IterationResult::into_tuple)
}

/// Stops when `||δ||_2 <= eps` or after `max_iterations` steps. In the damped variant the
/// increment is the norm of the undamped δ.
pub fn gauss_newton_traced<G>(
    g: G,
    lambda0: &DVector<f64>,
    eps: f64,
    max_iterations: usize,
    damping: Damping,
    sink: &mut dyn TraceSink,
) -> Result<IterationResult, NumError>
where
    G: Fn(&DVector<f64>) -> DVector<f64>,
{
    if lambda0.is_empty() {
        return Err(NumError::InvalidArgument(
            "Initial guess should not be empty.".to_string(),
        ));
    }
    match damping {
        Damping::Undamped => sink.section("GAUSS-NEWTON"),
        Damping::Halving { .. } => sink.section("GAUSS-NEWTON DAMPED"),
    }
    let mut lambda = lambda0.clone();
    let mut increment = eps + 1.0;
    let mut iter_count = 0;
    while iter_count < max_iterations && increment > eps {
        iter_count += 1;
        let Dg = jacobian_traced(&g, &lambda, eps, &mut NoTrace)?;
        let g_lambda = g(&lambda);
        let step = qr_step(&Dg, &g_lambda)?;
        sink.iteration(iter_count);
        sink.matrix("Dg(λ)", &Dg);
        sink.vector("g(λ)", &g_lambda);
        sink.matrix("Q", &step.q);
        sink.matrix("R", &step.r);
        sink.vector("δ", &step.delta);
        match damping {
            Damping::Undamped => lambda += &step.delta,
            Damping::Halving { max_halvings } => {
                let squared_norm = |l: &DVector<f64>| g(l).norm_squared();
                let (p, lambda_new) = halving_search(
                    "g",
                    squared_norm,
                    &lambda,
                    &step.delta,
                    iter_count,
                    max_halvings,
                    sink,
                )?;
                if sink.enabled() {
                    sink.vector("δ/2^p", &(&step.delta / 2f64.powi(p as i32)));
                }
                lambda = lambda_new;
            }
        }
        increment = norm2(&step.delta);
        sink.vector("λ", &lambda);
        sink.scalar("Ẽ(λ)", g_lambda.norm_squared());
        sink.scalar("increment", increment);
    }
    sink.section("DONE");
    let converged = increment <= eps;
    if !converged {
        warn!(
            "Gauss-Newton stopped after {} iterations with increment {} > {}",
            iter_count, increment, eps
        );
    }
    Ok(IterationResult {
        solution: lambda,
        iterations: iter_count,
        converged,
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////
//                     STRUCT BASED SOLVER
////////////////////////////////////////////////////////////////////////////////////////////////
pub struct GaussNewton {
    pub residual: VectorFunction, // g(λ)
    pub initial_guess: DVector<f64>,
    pub config: SolverConfig,
    pub damped: bool,
    pub log_to_file: bool,
    pub i: usize,
    pub converged: bool,
    pub result: Option<DVector<f64>>,
    pub error_functional: Option<f64>,
    calc_statistics: HashMap<String, usize>,
}

impl GaussNewton {
    pub fn new() -> GaussNewton {
        GaussNewton {
            residual: Box::new(|x: &DVector<f64>| DVector::zeros(x.len())),
            initial_guess: DVector::zeros(0),
            config: SolverConfig::default(),
            damped: false,
            log_to_file: false,
            i: 0,
            converged: false,
            result: None,
            error_functional: None,
            calc_statistics: HashMap::new(),
        }
    }

    pub fn set_problem(
        &mut self,
        residual: VectorFunction,
        initial_guess: Vec<f64>,
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<(), NumError> {
        if initial_guess.is_empty() {
            return Err(NumError::InvalidArgument(
                "Initial guess should not be empty.".to_string(),
            ));
        }
        self.config.set_tolerance(tolerance)?;
        self.config.set_max_iterations(max_iterations)?;
        self.residual = residual;
        self.initial_guess = DVector::from_vec(initial_guess);
        Ok(())
    }

    /// builds the residual `y_data - model(x_data, λ)` for a scalar model
    pub fn set_model<M>(
        &mut self,
        model: M,
        x_data: Vec<f64>,
        y_data: Vec<f64>,
        initial_guess: Vec<f64>,
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<(), NumError>
    where
        M: Fn(f64, &DVector<f64>) -> f64 + 'static,
    {
        crate::numerical::num_errors::check_sample_set(&x_data, &y_data, 1)?;
        let residual = move |l: &DVector<f64>| {
            DVector::from_fn(x_data.len(), |i, _| y_data[i] - model(x_data[i], l))
        };
        self.set_problem(Box::new(residual), initial_guess, tolerance, max_iterations)
    }

    pub fn set_solver_params(
        &mut self,
        loglevel: Option<String>,
        damped: Option<bool>,
        max_damping_halvings: Option<usize>,
    ) -> Result<(), NumError> {
        self.config
            .set_solver_params(loglevel, None, max_damping_halvings, None)?;
        if let Some(damped) = damped {
            self.damped = damped;
        }
        Ok(())
    }

    pub fn main_loop(&mut self) -> Result<DVector<f64>, NumError> {
        let damping = if self.damped {
            Damping::Halving {
                max_halvings: self.config.max_damping_halvings,
            }
        } else {
            Damping::Undamped
        };
        let residual = &self.residual;
        let res = if self.config.loglevel.as_deref() == Some("debug") {
            gauss_newton_traced(
                residual,
                &self.initial_guess,
                self.config.tolerance,
                self.config.max_iterations,
                damping,
                &mut LogTrace::new(self.config.digits),
            )
        } else {
            gauss_newton_traced(
                residual,
                &self.initial_guess,
                self.config.tolerance,
                self.config.max_iterations,
                damping,
                &mut NoTrace,
            )
        }?;
        let error = error_functional(residual, &res.solution);
        info!("Ẽ(λ) = {}", error);
        self.error_functional = Some(error);
        self.i = res.iterations;
        self.converged = res.converged;
        self.result = Some(res.solution.clone());
        Ok(res.solution)
    }

    pub fn solver(&mut self) -> Result<DVector<f64>, NumError> {
        let begin = Instant::now();
        let res = self.main_loop()?;
        let end = begin.elapsed();
        elapsed_time(end);
        self.calc_statistics
            .insert("time elapsed, ms".to_string(), end.as_millis() as usize);
        self.calc_statistics();
        Ok(res)
    }

    // wrapper around solver function to implement logging
    pub fn solve(&mut self) -> Result<DVector<f64>, NumError> {
        match self.config.level_filter()? {
            None => self.solver(),
            Some(level) => {
                init_logger(level, self.log_to_file);
                info!("Gauss-Newton fit started with loglevel: {}", level);
                let res = self.solver();
                info!("Gauss-Newton fit ended");
                res
            }
        }
    }

    pub fn get_result(&self) -> Option<DVector<f64>> {
        self.result.clone()
    }

    pub fn get_statistics(&self) -> HashMap<String, usize> {
        self.calc_statistics.clone()
    }

    fn calc_statistics(&mut self) {
        self.calc_statistics
            .insert("number of parameters".to_string(), self.initial_guess.len());
        self.calc_statistics
            .insert("number of iterations".to_string(), self.i);
        self.calc_statistics
            .insert("converged".to_string(), self.converged as usize);
        let mut table = Builder::from(self.calc_statistics.clone()).build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table.to_string());
    }
}

impl Default for GaussNewton {
    fn default() -> Self {
        Self::new()
    }
}
