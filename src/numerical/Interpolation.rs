//! Polynomial and piecewise cubic interpolation of sample sets.
/// Lagrange interpolating polynomial, evaluated point by point
pub mod lagrange;
/// natural cubic spline fit and piecewise evaluation
pub mod CubicSplines;
