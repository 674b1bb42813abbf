//! solver parameters shared by the iterative engines (Newton-Raphson, Gauss-Newton)
use super::num_errors::NumError;
use simplelog::LevelFilter;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// method used by the dense linear solver facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LinearSysMethod {
    /// LU decomposition with partial pivoting
    Lu,
    /// explicit inverse, A^-1 * b
    Inv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
    /// upper bound on step halvings in the damped variants, `None` keeps the search unbounded
    pub max_damping_halvings: Option<usize>,
    pub linear_sys_method: LinearSysMethod,
    /// "debug", "info", "warn", "error", "off" or "none"
    pub loglevel: Option<String>,
    /// decimals shown in traces
    pub digits: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
            max_damping_halvings: None,
            linear_sys_method: LinearSysMethod::Lu,
            loglevel: Some("info".to_string()),
            digits: 4,
        }
    }
}

impl SolverConfig {
    pub fn new(tolerance: f64, max_iterations: usize) -> Result<Self, NumError> {
        let mut config = SolverConfig::default();
        config.set_tolerance(tolerance)?;
        config.set_max_iterations(max_iterations)?;
        Ok(config)
    }

    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<(), NumError> {
        if !(tolerance >= 0.0) {
            return Err(NumError::InvalidArgument(
                "Tolerance should be a non-negative number.".to_string(),
            ));
        }
        self.tolerance = tolerance;
        Ok(())
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) -> Result<(), NumError> {
        if max_iterations == 0 {
            return Err(NumError::InvalidArgument(
                "Max iterations should be a positive number.".to_string(),
            ));
        }
        self.max_iterations = max_iterations;
        Ok(())
    }

    /// Only the parameters passed as `Some` are changed
    pub fn set_solver_params(
        &mut self,
        loglevel: Option<String>,
        linear_sys_method: Option<String>,
        max_damping_halvings: Option<usize>,
        digits: Option<usize>,
    ) -> Result<(), NumError> {
        if let Some(level) = loglevel {
            let level = level.to_lowercase();
            // validated here so that `solve` cannot fail on it later
            level_filter(&level)?;
            self.loglevel = Some(level);
        }
        if let Some(method) = linear_sys_method {
            self.linear_sys_method = LinearSysMethod::from_str(method.trim()).map_err(|_| {
                NumError::InvalidArgument(format!(
                    "linear_sys_method must be lu or inv, got {}",
                    method
                ))
            })?;
        }
        if max_damping_halvings.is_some() {
            self.max_damping_halvings = max_damping_halvings;
        }
        if let Some(digits) = digits {
            self.digits = digits;
        }
        Ok(())
    }

    /// `None` means logging is switched off
    pub fn level_filter(&self) -> Result<Option<LevelFilter>, NumError> {
        match &self.loglevel {
            Some(level) => level_filter(level),
            None => Ok(Some(LevelFilter::Info)),
        }
    }
}

pub(crate) fn level_filter(level: &str) -> Result<Option<LevelFilter>, NumError> {
    match level {
        "debug" => Ok(Some(LevelFilter::Debug)),
        "info" => Ok(Some(LevelFilter::Info)),
        "warn" => Ok(Some(LevelFilter::Warn)),
        "error" => Ok(Some(LevelFilter::Error)),
        "off" | "none" => Ok(None),
        _ => Err(NumError::InvalidArgument(format!(
            "loglevel must be debug, info, warn, error, off or none, got {}",
            level
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.linear_sys_method, LinearSysMethod::Lu);
        assert_eq!(config.max_damping_halvings, None);
        assert_eq!(config.level_filter().unwrap(), Some(LevelFilter::Info));
    }

    #[test]
    fn test_set_solver_params() {
        let mut config = SolverConfig::default();
        config
            .set_solver_params(Some("WARN".to_string()), Some("Inv".to_string()), Some(30), None)
            .unwrap();
        assert_eq!(config.loglevel.as_deref(), Some("warn"));
        assert_eq!(config.linear_sys_method, LinearSysMethod::Inv);
        assert_eq!(config.max_damping_halvings, Some(30));
        assert_eq!(config.digits, 4);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut config = SolverConfig::default();
        assert!(config
            .set_solver_params(Some("verbose".to_string()), None, None, None)
            .is_err());
        assert!(config
            .set_solver_params(None, Some("gmres".to_string()), None, None)
            .is_err());
        assert!(SolverConfig::new(-1.0, 10).is_err());
        assert!(SolverConfig::new(1e-6, 0).is_err());
    }

    #[test]
    fn test_logging_off() {
        let mut config = SolverConfig::default();
        config
            .set_solver_params(Some("off".to_string()), None, None, None)
            .unwrap();
        assert_eq!(config.level_filter().unwrap(), None);
    }
}
