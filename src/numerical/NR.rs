//! Newton's method for scalar equations and Newton-Raphson for systems `f(x) = 0`.
//!
//!  Example#1
//! ```
//!  use RustedNumLab::numerical::NR::newton_raphson;
//!  use nalgebra::DVector;
//!  let f = |x: &DVector<f64>| {
//!      DVector::from_vec(vec![x[0] * x[0] + x[1] - 11.0, x[0] + x[1] * x[1] - 7.0])
//!  };
//!  let (x, iterations) = newton_raphson(f, &DVector::from_vec(vec![5.0, 4.0]), 1e-8, 100).unwrap();
//!  assert!((x[0] - 3.0).abs() < 1e-6 && (x[1] - 2.0).abs() < 1e-6);
//!  assert!(iterations < 100);
//!  ```
//! Example#2
//!  ```
//!    // struct based solver with logging and statistics
//!     use RustedNumLab::numerical::NR::NR;
//!     use nalgebra::DVector;
//!     let mut NR_instanse = NR::new();
//!     NR_instanse
//!         .set_equation_system(
//!             Box::new(|x: &DVector<f64>| DVector::from_vec(vec![x[0] * x[0] + x[1] * x[1] - 10.0, x[0] - x[1] - 4.0])),
//!             vec![1.0, 1.0],
//!             1e-6,
//!             100,
//!         )
//!         .unwrap();
//!     NR_instanse.set_solver_params(Some("off".to_string()), None, Some(true), None).unwrap();
//!     NR_instanse.solve().unwrap();
//!     let solution = NR_instanse.get_result().unwrap();
//!     assert!((solution[0] - 3.0).abs() < 1e-6 || (solution[0] - 1.0).abs() < 1e-6);
//!  ```
use crate::Utils::logger::{elapsed_time, init_logger};
use crate::numerical::Differentiation::{derivative1, jacobian_traced};
use crate::numerical::NR_damped::halving_search;
use crate::numerical::config::{LinearSysMethod, SolverConfig};
use crate::numerical::num_errors::NumError;
use crate::numerical::trace::{LogTrace, NoTrace, TraceSink};
use crate::somelinalg::dense_solvers::{max_abs, norm2, solve_linear_system};
use log::{info, warn};
use nalgebra::DVector;
use std::cell::Cell;
use std::collections::HashMap;
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

/// state of an iterative solver at termination
#[derive(Debug, Clone, PartialEq)]
pub struct IterationResult {
    pub solution: DVector<f64>,
    pub iterations: usize,
    /// last step fell below the tolerance
    pub converged: bool,
}

impl IterationResult {
    pub fn into_tuple(self) -> (DVector<f64>, usize) {
        (self.solution, self.iterations)
    }
}

/// how a Newton step is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damping {
    /// x <- x + δ
    Undamped,
    /// x <- x + δ/2^k with the smallest k that does not increase the residual norm
    Halving { max_halvings: Option<usize> },
}

////////////////////////////////////////////////////////////////////////////////////////////////
//                     SCALAR NEWTON
////////////////////////////////////////////////////////////////////////////////////////////////
/// Newton's method for `f(x) = 0`, the derivative is a central difference with step `prec`.
/// Stops when `|Δx| < prec` or after `max_iter` steps; returns `(x, iterations)`.
/// The first step is taken from `start_x` itself, so the iterates are not those of a variant
/// that first moves to `start_x + 1`.
pub fn newton<F>(f: F, start_x: f64, prec: f64, max_iter: usize) -> (f64, usize)
where
    F: Fn(f64) -> f64,
{
    newton_traced(f, start_x, prec, max_iter, &mut NoTrace)
}

pub fn newton_traced<F>(
    f: F,
    start_x: f64,
    prec: f64,
    max_iter: usize,
    sink: &mut dyn TraceSink,
) -> (f64, usize)
where
    F: Fn(f64) -> f64,
{
    sink.section("NEWTON");
    let mut x = start_x;
    let mut dx = prec + 10.0;
    let mut iter_count = 0;
    while iter_count < max_iter && dx.abs() >= prec {
        iter_count += 1;
        let fx = f(x);
        let dfx = derivative1(&f, x, prec);
        dx = -fx / dfx;
        x += dx;
        sink.iteration(iter_count);
        sink.scalar("f(x)", fx);
        sink.scalar("f'(x)", dfx);
        sink.scalar("x", x);
    }
    sink.section("DONE");
    (x, iter_count)
}

pub fn newton_print<F>(f: F, start_x: f64, prec: f64, max_iter: usize, digits: usize) -> (f64, usize)
where
    F: Fn(f64) -> f64,
{
    newton_traced(f, start_x, prec, max_iter, &mut LogTrace::new(digits))
}

////////////////////////////////////////////////////////////////////////////////////////////////
//                     NEWTON-RAPHSON FOR SYSTEMS
////////////////////////////////////////////////////////////////////////////////////////////////
/// Iterates `J(x) δ = -f(x)`, `x <- x + δ` until `max|δ| < eps` or `max_iterations` steps were made.
/// The Jacobian is a central difference with step `eps`.
pub fn newton_raphson<F>(
    f: F,
    x0: &DVector<f64>,
    eps: f64,
    max_iterations: usize,
) -> Result<(DVector<f64>, usize), NumError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    newton_raphson_traced(
        f,
        x0,
        eps,
        max_iterations,
        LinearSysMethod::Lu,
        Damping::Undamped,
        &mut NoTrace,
    )
    .map(IterationResult::into_tuple)
}

pub fn newton_raphson_print<F>(
    f: F,
    x0: &DVector<f64>,
    eps: f64,
    max_iterations: usize,
    digits: usize,
) -> Result<(DVector<f64>, usize), NumError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    newton_raphson_traced(
        f,
        x0,
        eps,
        max_iterations,
        LinearSysMethod::Lu,
        Damping::Undamped,
        &mut LogTrace::new(digits),
    )
    .map(IterationResult::into_tuple)
}

/// Newton-Raphson engine shared by the plain and the damped variants.
pub fn newton_raphson_traced<F>(
    f: F,
    x0: &DVector<f64>,
    eps: f64,
    max_iterations: usize,
    method: LinearSysMethod,
    damping: Damping,
    sink: &mut dyn TraceSink,
) -> Result<IterationResult, NumError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    if x0.is_empty() {
        return Err(NumError::InvalidArgument(
            "Initial guess should not be empty.".to_string(),
        ));
    }
    match damping {
        Damping::Undamped => sink.section("NEWTON-RAPHSON"),
        Damping::Halving { .. } => sink.section("NEWTON-RAPHSON DAMPED"),
    }
    let mut x = x0.clone();
    // sentinel larger than eps so that the first iteration always runs
    let mut delta = DVector::from_element(x0.len(), eps + 10.0);
    let mut iter_count = 0;
    while iter_count < max_iterations && max_abs(&delta) >= eps {
        iter_count += 1;
        let Df = jacobian_traced(&f, &x, eps, &mut NoTrace)?;
        let fx_neg = -f(&x);
        delta = solve_linear_system(method, &Df, &fx_neg)?;
        sink.iteration(iter_count);
        sink.matrix("Df(x)", &Df);
        sink.vector("-f(x)", &fx_neg);
        sink.vector("δ", &delta);
        match damping {
            Damping::Undamped => x += &delta,
            Damping::Halving { max_halvings } => {
                let residual_norm = |y: &DVector<f64>| norm2(&f(y));
                let (_k, x_new) =
                    halving_search("f", residual_norm, &x, &delta, iter_count, max_halvings, sink)?;
                x = x_new;
            }
        }
        sink.vector("x", &x);
    }
    sink.section("DONE");
    let converged = max_abs(&delta) < eps;
    if !converged {
        warn!(
            "Newton-Raphson stopped after {} iterations without reaching max|δ| < {}",
            iter_count, eps
        );
    }
    Ok(IterationResult {
        solution: x,
        iterations: iter_count,
        converged,
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////
//                     STRUCT BASED SOLVER
////////////////////////////////////////////////////////////////////////////////////////////////
pub type VectorFunction = Box<dyn Fn(&DVector<f64>) -> DVector<f64>>;

pub struct NR {
    pub fun: VectorFunction,   // system of equations f(x) = 0
    pub initial_guess: DVector<f64>,
    pub config: SolverConfig,
    pub damped: bool,
    pub log_to_file: bool,
    pub i: usize,                     // iteration counter
    pub converged: bool,
    pub result: Option<DVector<f64>>, // result of the iteration
    calc_statistics: HashMap<String, usize>,
}

impl NR {
    pub fn new() -> NR {
        NR {
            fun: Box::new(|x: &DVector<f64>| DVector::zeros(x.len())),
            initial_guess: DVector::zeros(0),
            config: SolverConfig::default(),
            damped: false,
            log_to_file: false,
            i: 0,
            converged: false,
            result: None,
            calc_statistics: HashMap::new(),
        }
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    pub fn set_equation_system(
        &mut self,
        fun: VectorFunction,
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
        self.fun = fun;
        self.initial_guess = DVector::from_vec(initial_guess);
        Ok(())
    }

    /// `damped` switches step halving on or off, `max_damping_halvings` caps the halving search
    pub fn set_solver_params(
        &mut self,
        loglevel: Option<String>,
        linear_sys_method: Option<String>,
        damped: Option<bool>,
        max_damping_halvings: Option<usize>,
    ) -> Result<(), NumError> {
        self.config
            .set_solver_params(loglevel, linear_sys_method, max_damping_halvings, None)?;
        if let Some(damped) = damped {
            self.damped = damped;
        }
        Ok(())
    }

    fn damping(&self) -> Damping {
        if self.damped {
            Damping::Halving {
                max_halvings: self.config.max_damping_halvings,
            }
        } else {
            Damping::Undamped
        }
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                ITERATIONS
    /////////////////////////////////////////////////////////////////////////////////////////////
    /// main function to solve the system of equations
    pub fn main_loop(&mut self) -> Result<DVector<f64>, NumError> {
        let evaluations = Cell::new(0usize);
        let fun = &self.fun;
        let counted = |x: &DVector<f64>| {
            evaluations.set(evaluations.get() + 1);
            fun(x)
        };
        let res = if self.config.loglevel.as_deref() == Some("debug") {
            newton_raphson_traced(
                counted,
                &self.initial_guess,
                self.config.tolerance,
                self.config.max_iterations,
                self.config.linear_sys_method,
                self.damping(),
                &mut LogTrace::new(self.config.digits),
            )
        } else {
            newton_raphson_traced(
                counted,
                &self.initial_guess,
                self.config.tolerance,
                self.config.max_iterations,
                self.config.linear_sys_method,
                self.damping(),
                &mut NoTrace,
            )
        }?;
        self.calc_statistics
            .insert("number of function evaluations".to_string(), evaluations.get());
        self.i = res.iterations;
        self.converged = res.converged;
        self.result = Some(res.solution.clone());
        Ok(res.solution)
    }
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    //                                       main functions to start the solver and caclulate statistics
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
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
                info!("Program started with loglevel: {}", level);
                let res = self.solver();
                info!("Program ended");
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
        let n = self.initial_guess.len();
        self.calc_statistics
            .insert("number of jacobian elements".to_string(), n * n);
        self.calc_statistics
            .insert("length of x vector".to_string(), n);
        self.calc_statistics
            .insert("number of iterations".to_string(), self.i);
        self.calc_statistics
            .insert("converged".to_string(), self.converged as usize);
        let mut table = Builder::from(self.calc_statistics.clone()).build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table.to_string());
    }
}

impl Default for NR {
    fn default() -> Self {
        Self::new()
    }
}
