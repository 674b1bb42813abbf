//! Romberg extrapolation on top of a composite quadrature rule.
//!
//! `T(j, 0)` is the base rule with step `(b - a)/2^j` and
//! `T(j, k) = (4^k·T(j+1, k-1) - T(j, k-1)) / (4^k - 1)`. The result is `T(0, depth)`.
//! Entries are memoized by `(j, k)`, so the base rule runs `depth + 1` times.
use super::quadrature::IntMethod;
use crate::numerical::trace::{LogTrace, NoTrace, TraceSink};
use log::info;
use nalgebra::DMatrix;
use std::collections::HashMap;

struct Tableau<'a, F>
where
    F: Fn(f64) -> f64,
{
    f: &'a F,
    a: f64,
    b: f64,
    method: IntMethod,
    /// also trace the inner sums of the base rule
    trace_base_rule: bool,
    cache: HashMap<(usize, usize), f64>,
}

impl<'a, F> Tableau<'a, F>
where
    F: Fn(f64) -> f64,
{
    fn new(f: &'a F, a: f64, b: f64, method: IntMethod, trace_base_rule: bool) -> Self {
        Tableau {
            f,
            a,
            b,
            method,
            trace_base_rule,
            cache: HashMap::new(),
        }
    }

    fn entry(&mut self, j: usize, k: usize, sink: &mut dyn TraceSink) -> f64 {
        if let Some(value) = self.cache.get(&(j, k)) {
            return *value;
        }
        let letter = self.method.letter();
        let value = if k == 0 {
            let h = (self.b - self.a) / 2f64.powi(j as i32);
            let result = if self.trace_base_rule {
                self.method.integrate_traced(self.f, self.a, self.b, h, sink)
            } else {
                self.method.integrate(self.f, self.a, self.b, h)
            };
            sink.scalar(&format!("{}{},0({})", letter, j, h), result);
            result
        } else {
            // finer level first
            let finer = self.entry(j + 1, k - 1, sink);
            let coarser = self.entry(j, k - 1, sink);
            let four_k = 4f64.powi(k as i32);
            let result = (four_k * finer - coarser) / (four_k - 1.0);
            if sink.enabled() {
                sink.note(&format!(
                    "{l}{j},{k} = (4^{k}·{l}{j1},{k1} - {l}{j},{k1})/(4^{k}-1)",
                    l = letter,
                    j = j,
                    k = k,
                    j1 = j + 1,
                    k1 = k - 1
                ));
            }
            sink.scalar(&format!("{}{},{}", letter, j, k), result);
            result
        };
        self.cache.insert((j, k), value);
        value
    }
}

/// integral of `f` over `[a, b]` by Romberg extrapolation of depth `depth`
pub fn romberg<F>(f: F, a: f64, b: f64, depth: usize, method: IntMethod) -> f64
where
    F: Fn(f64) -> f64,
{
    romberg_traced(f, a, b, depth, method, false, &mut NoTrace)
}

/// `print_int_results` also narrates the sums of every base rule evaluation
pub fn romberg_print<F>(
    f: F,
    a: f64,
    b: f64,
    depth: usize,
    method: IntMethod,
    digits: usize,
    print_int_results: bool,
) -> f64
where
    F: Fn(f64) -> f64,
{
    romberg_traced(
        f,
        a,
        b,
        depth,
        method,
        print_int_results,
        &mut LogTrace::new(digits),
    )
}

pub fn romberg_traced<F>(
    f: F,
    a: f64,
    b: f64,
    depth: usize,
    method: IntMethod,
    trace_base_rule: bool,
    sink: &mut dyn TraceSink,
) -> f64
where
    F: Fn(f64) -> f64,
{
    sink.section(&format!("ROMBERG ({})", method));
    let mut tableau = Tableau::new(&f, a, b, method, trace_base_rule);
    let result = tableau.entry(0, depth, sink);
    sink.section("DONE");
    result
}

/// Lower left part of the tableau, `T[(j, k)]` for `j + k <= depth`; the other cells are NaN.
pub fn romberg_tableau<F>(f: F, a: f64, b: f64, depth: usize, method: IntMethod) -> DMatrix<f64>
where
    F: Fn(f64) -> f64,
{
    let mut tableau = Tableau::new(&f, a, b, method, false);
    let mut T = DMatrix::from_element(depth + 1, depth + 1, f64::NAN);
    for k in 0..=depth {
        for j in 0..=(depth - k) {
            T[(j, k)] = tableau.entry(j, k, &mut NoTrace);
        }
    }
    info!(
        "Romberg tableau of depth {} computed with {} base rule evaluations",
        depth,
        depth + 1
    );
    T
}
