//! Composite quadrature rules on a uniform grid of step `h`.
//!
//! The rules use `n = ceil((b - a) / h)` segments. A negative step and an empty interval give
//! zero segments. On a nonempty interval a zero or NaN step has no segment count and the rules
//! return NaN.
use crate::numerical::num_errors::NumError;
use crate::numerical::trace::{LogTrace, NoTrace, TraceSink};
use log::error;
use strum_macros::{Display, EnumIter, EnumString};

/// base rule for the Romberg extrapolation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum IntMethod {
    /// midpoint rectangles
    Rect,
    Trapez,
    Simpson,
}

impl IntMethod {
    pub fn integrate<F>(&self, f: F, a: f64, b: f64, h: f64) -> f64
    where
        F: Fn(f64) -> f64,
    {
        self.integrate_traced(f, a, b, h, &mut NoTrace)
    }

    pub fn integrate_traced<F>(&self, f: F, a: f64, b: f64, h: f64, sink: &mut dyn TraceSink) -> f64
    where
        F: Fn(f64) -> f64,
    {
        match self {
            IntMethod::Rect => rect_traced(f, a, b, h, sink),
            IntMethod::Trapez => trapez_traced(f, a, b, h, sink),
            IntMethod::Simpson => simpson_traced(f, a, b, h, sink),
        }
    }

    /// R, T or S as used in the tableau notation
    pub fn letter(&self) -> &'static str {
        match self {
            IntMethod::Rect => "R",
            IntMethod::Trapez => "T",
            IntMethod::Simpson => "S",
        }
    }
}

/// number of segments of width `h` covering `[a, b]`
pub fn segments(a: f64, b: f64, h: f64) -> Result<usize, NumError> {
    if a == b {
        return Ok(0);
    }
    let ratio = (b - a) / h;
    if !ratio.is_finite() {
        return Err(NumError::InvalidArgument(format!(
            "step h = {} gives no finite number of segments on [{}, {}]",
            h, a, b
        )));
    }
    // negative ratios saturate to 0
    Ok(ratio.ceil() as usize)
}

// NaN stands for the failed rule, the f64 API has no error channel
fn segments_or_log(a: f64, b: f64, h: f64) -> Option<usize> {
    match segments(a, b, h) {
        Ok(n) => Some(n),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////
//                     RECTANGLES
////////////////////////////////////////////////////////////////////////////////////////////////
/// h · Σ f(a + i·h + h/2), i = 0..n-1
pub fn rect<F>(f: F, a: f64, b: f64, h: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    rect_traced(f, a, b, h, &mut NoTrace)
}

pub fn rect_print<F>(f: F, a: f64, b: f64, h: f64, digits: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    rect_traced(f, a, b, h, &mut LogTrace::new(digits))
}

pub fn rect_traced<F>(f: F, a: f64, b: f64, h: f64, sink: &mut dyn TraceSink) -> f64
where
    F: Fn(f64) -> f64,
{
    let Some(n) = segments_or_log(a, b, h) else {
        sink.scalar("R(h)", f64::NAN);
        return f64::NAN;
    };
    let mut sum = 0.0;
    for i in 0..n {
        let sigma = f(a + (i as f64) * h + h / 2.0);
        sum += sigma;
        sink.scalar(&format!("f(a + {}·h + ½h)", i), sigma);
    }
    let result = h * sum;
    sink.scalar("Σ", sum);
    sink.scalar("R(h)", result);
    result
}

////////////////////////////////////////////////////////////////////////////////////////////////
//                     TRAPEZOIDS
////////////////////////////////////////////////////////////////////////////////////////////////
/// h · (½(f(a) + f(b)) + Σ f(a + i·h)), i = 1..n-1
pub fn trapez<F>(f: F, a: f64, b: f64, h: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    trapez_traced(f, a, b, h, &mut NoTrace)
}

pub fn trapez_print<F>(f: F, a: f64, b: f64, h: f64, digits: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    trapez_traced(f, a, b, h, &mut LogTrace::new(digits))
}

pub fn trapez_traced<F>(f: F, a: f64, b: f64, h: f64, sink: &mut dyn TraceSink) -> f64
where
    F: Fn(f64) -> f64,
{
    let Some(n) = segments_or_log(a, b, h) else {
        sink.scalar("T(h)", f64::NAN);
        return f64::NAN;
    };
    let mut sum = 0.0;
    for i in 1..n {
        let sigma = f(a + (i as f64) * h);
        sum += sigma;
        sink.scalar(&format!("f(a + {}·h)", i), sigma);
    }
    let (fa, fb) = (f(a), f(b));
    let result = h * ((fa + fb) / 2.0 + sum);
    sink.scalar("f(a)", fa);
    sink.scalar("f(b)", fb);
    sink.scalar("Σ", sum);
    sink.scalar("T(h)", result);
    result
}

////////////////////////////////////////////////////////////////////////////////////////////////
//                     SIMPSON
////////////////////////////////////////////////////////////////////////////////////////////////
/// (h/3) · (½f(a) + Σ1 + 2·Σ2 + ½f(b)), Σ1 over the inner grid points, Σ2 over the segment midpoints
pub fn simpson<F>(f: F, a: f64, b: f64, h: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    simpson_traced(f, a, b, h, &mut NoTrace)
}

pub fn simpson_print<F>(f: F, a: f64, b: f64, h: f64, digits: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    simpson_traced(f, a, b, h, &mut LogTrace::new(digits))
}

pub fn simpson_traced<F>(f: F, a: f64, b: f64, h: f64, sink: &mut dyn TraceSink) -> f64
where
    F: Fn(f64) -> f64,
{
    let Some(n) = segments_or_log(a, b, h) else {
        sink.scalar("S(h)", f64::NAN);
        return f64::NAN;
    };
    let mut sum1 = 0.0;
    let mut sum2 = 0.0;
    for i in 1..n {
        let sigma1 = f(a + (i as f64) * h);
        sum1 += sigma1;
        sink.scalar(&format!("f(a + {}·h)", i), sigma1);
    }
    for i in 1..=n {
        let left = a + ((i - 1) as f64) * h;
        let right = a + (i as f64) * h;
        let sigma2 = f((left + right) / 2.0);
        sum2 += sigma2;
        sink.scalar(&format!("f(½(a + {}·h + a + {}·h))", i - 1, i), sigma2);
    }
    let (fa, fb) = (f(a), f(b));
    let result = (h / 3.0) * (fa / 2.0 + sum1 + 2.0 * sum2 + fb / 2.0);
    sink.scalar("Σ1", sum1);
    sink.scalar("Σ2", sum2);
    sink.scalar("S(h)", result);
    result
}

////////////////////////////////////////////////////////////////////////////////////////////////
//                     CLOSED NEWTON-COTES PANELS
////////////////////////////////////////////////////////////////////////////////////////////////
// The panel rules below use floor((b - a) / h / p) panels of p steps each; a remainder of the
// interval that does not fill a whole panel is left out.
fn panels(a: f64, b: f64, h: f64, p: usize) -> Option<usize> {
    segments_or_log(a, b, h)?;
    Some(((b - a) / h / p as f64).floor() as usize)
}

/// composite Simpson 1/3 rule, weights (1, 4, 1) on panels of two steps
pub fn simpson_third<F>(f: F, a: f64, b: f64, h: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    let x = |i: usize| a + (i as f64) * h;
    let Some(n) = panels(a, b, h, 2) else {
        return f64::NAN;
    };
    let sum: f64 = (1..=n)
        .map(|i| f(x(2 * i - 2)) + 4.0 * f(x(2 * i - 1)) + f(x(2 * i)))
        .sum();
    h / 3.0 * sum
}

/// composite Simpson 3/8 rule, weights (1, 3, 3, 1) on panels of three steps
pub fn simpson_three_eighths<F>(f: F, a: f64, b: f64, h: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    let x = |i: usize| a + (i as f64) * h;
    let Some(n) = panels(a, b, h, 3) else {
        return f64::NAN;
    };
    let sum: f64 = (1..=n)
        .map(|i| f(x(3 * i - 3)) + 3.0 * f(x(3 * i - 2)) + 3.0 * f(x(3 * i - 1)) + f(x(3 * i)))
        .sum();
    3.0 / 8.0 * h * sum
}

/// composite Boole rule, weights (7, 32, 12, 32, 7) on panels of four steps
pub fn boole<F>(f: F, a: f64, b: f64, h: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    let x = |i: usize| a + (i as f64) * h;
    let Some(n) = panels(a, b, h, 4) else {
        return f64::NAN;
    };
    let sum: f64 = (1..=n)
        .map(|i| {
            7.0 * f(x(4 * i - 4))
                + 32.0 * f(x(4 * i - 3))
                + 12.0 * f(x(4 * i - 2))
                + 32.0 * f(x(4 * i - 1))
                + 7.0 * f(x(4 * i))
        })
        .sum();
    2.0 / 45.0 * h * sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::trace::TraceRecorder;
    use approx::assert_relative_eq;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    const A: f64 = 0.0;
    const B: f64 = 5.0;

    fn exact() -> f64 {
        B.sin() - A.sin()
    }

    #[test]
    fn test_rules_converge_for_cos() {
        for method in IntMethod::iter() {
            let coarse = (method.integrate(f64::cos, A, B, 0.5) - exact()).abs();
            let fine = (method.integrate(f64::cos, A, B, 0.125) - exact()).abs();
            assert!(fine < coarse, "{} does not converge", method);
        }
    }

    #[test]
    fn test_simpson_beats_trapez() {
        for h in [0.5, 0.25, 0.125] {
            let e_trapez = (trapez(f64::cos, A, B, h) - exact()).abs();
            let e_simpson = (simpson(f64::cos, A, B, h) - exact()).abs();
            assert!(e_simpson < e_trapez);
        }
        assert_relative_eq!(simpson(f64::cos, A, B, 0.01), exact(), epsilon = 1e-9);
    }

    #[test]
    fn test_exact_for_low_degree_polynomials() {
        // midpoint and trapezoid are exact for lines, Simpson for cubics
        let line = |x: f64| 3.0 * x - 1.0;
        assert_relative_eq!(rect(line, 0.0, 2.0, 0.5), 4.0, epsilon = 1e-12);
        assert_relative_eq!(trapez(line, 0.0, 2.0, 0.5), 4.0, epsilon = 1e-12);
        let cubic = |x: f64| x.powi(3) - x;
        assert_relative_eq!(simpson(cubic, 0.0, 2.0, 1.0), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments(0.0, 1.0, 0.25), Ok(4));
        assert_eq!(segments(0.0, 1.0, 0.3), Ok(4));
        assert_eq!(segments(0.0, 1.0, -0.5), Ok(0));
        assert!(matches!(segments(0.0, 1.0, 0.0), Err(NumError::InvalidArgument(_))));
        assert!(matches!(segments(0.0, 1.0, f64::NAN), Err(NumError::InvalidArgument(_))));
        assert_eq!(segments(1.0, 1.0, 0.0), Ok(0));
    }

    #[test]
    fn test_zero_step_gives_nan() {
        for method in IntMethod::iter() {
            assert!(method.integrate(f64::cos, A, B, 0.0).is_nan(), "{}", method);
        }
        let mut rec = TraceRecorder::new();
        assert!(simpson_traced(f64::cos, A, B, 0.0, &mut rec).is_nan());
        assert!(rec.scalars("S(h)")[0].is_nan());
        assert!(simpson_third(f64::cos, A, B, 0.0).is_nan());
        assert!(simpson_three_eighths(f64::cos, A, B, 0.0).is_nan());
        assert!(boole(f64::cos, A, B, 0.0).is_nan());
        // an empty interval integrates to zero whatever the step
        assert_eq!(trapez(f64::cos, 1.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_newton_cotes_panels() {
        let exact = exact();
        assert_relative_eq!(simpson_third(f64::cos, A, B, 1e-2), exact, epsilon = 1e-8);
        assert_relative_eq!(simpson_three_eighths(f64::cos, A, B, 1e-2), exact, epsilon = 1e-2);
        assert_relative_eq!(boole(f64::cos, A, B, 1e-2), exact, epsilon = 1e-2);
        // whole panels only: exact for polynomials of the rule degree
        let quartic = |x: f64| x.powi(4);
        assert_relative_eq!(boole(quartic, 0.0, 1.0, 0.25), 0.2, epsilon = 1e-14);
        let cubic = |x: f64| x.powi(3);
        assert_relative_eq!(simpson_three_eighths(cubic, 0.0, 3.0, 1.0), 20.25, epsilon = 1e-12);
        assert_relative_eq!(simpson_third(cubic, 0.0, 2.0, 1.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_int_method_parsing() {
        assert_eq!(IntMethod::from_str("simpson").unwrap(), IntMethod::Simpson);
        assert_eq!(IntMethod::Trapez.to_string(), "Trapez");
        assert_eq!(IntMethod::Rect.letter(), "R");
    }

    #[test]
    fn test_trapez_trace() {
        let mut rec = TraceRecorder::new();
        let result = trapez_traced(|x| x, 0.0, 1.0, 0.25, &mut rec);
        assert_eq!(rec.scalars("T(h)"), vec![result]);
        assert_relative_eq!(rec.scalars("Σ")[0], 0.25 + 0.5 + 0.75);
    }
}
