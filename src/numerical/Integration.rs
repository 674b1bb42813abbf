//! Numerical integration of functions of one variable.
/// rectangle, trapezoid and Simpson composite rules, Newton-Cotes panel rules
pub mod quadrature;
/// Romberg extrapolation over any of the composite rules
pub mod Romberg;
