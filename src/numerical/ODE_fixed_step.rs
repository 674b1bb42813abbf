//! Fixed step explicit solvers of initial value problems: Euler, midpoint, modified Euler,
//! Runge-Kutta 4 and a ten stage Runge-Kutta 8, for scalar equations and for systems.
/// Butcher tableaus of the schemes
pub mod tableaus;
/// generic stepping over scalar and vector states
pub mod fixed_step_engine;
/// solve_ivp dispatchers and one function per scheme
pub mod fixed_step_api;
