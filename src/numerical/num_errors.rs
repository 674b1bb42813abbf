use std::fmt;

/// Error types shared by all numerical engines of the crate
#[derive(Debug, Clone, PartialEq)]
pub enum NumError {
    /// x and y data vectors differ in length
    LengthMismatch { x_len: usize, y_len: usize },
    /// not enough data points for the requested method
    TooFewPoints { required: usize, got: usize },
    /// x data must be strictly increasing, violated between `index - 1` and `index`
    NotStrictlyIncreasing { index: usize },
    /// component index outside of the input vector
    IndexOutOfRange { index: usize, len: usize },
    /// shapes of vectors/matrices do not fit together
    DimensionMismatch(String),
    /// linear system (Jacobian, spline system, R factor) could not be solved
    SingularMatrix(String),
    /// step halving reached the configured cap without reducing the residual
    DampingExhausted { iteration: usize, halvings: usize },
    /// malformed argument or solver parameter
    InvalidArgument(String),
}

impl fmt::Display for NumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NumError::LengthMismatch { x_len, y_len } => write!(
                f,
                "x and y vectors need to have the same length! (len(x) = {}, len(y) = {})",
                x_len, y_len
            ),
            NumError::TooFewPoints { required, got } => write!(
                f,
                "at least {} data points are required, got {}",
                required, got
            ),
            NumError::NotStrictlyIncreasing { index } => write!(
                f,
                "x data must be strictly increasing (violated at index {})",
                index
            ),
            NumError::IndexOutOfRange { index, len } => write!(
                f,
                "component index {} is out of range for a vector of length {}",
                index, len
            ),
            NumError::DimensionMismatch(msg) => write!(f, "Dimension mismatch: {}", msg),
            NumError::SingularMatrix(msg) => write!(f, "Failed to solve the system: {}", msg),
            NumError::DampingExhausted {
                iteration,
                halvings,
            } => write!(
                f,
                "No damping coefficient found in iteration {} after {} halvings",
                iteration, halvings
            ),
            NumError::InvalidArgument(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for NumError {}

/// checks the input contract of every x/y sample set
pub(crate) fn check_sample_set(x: &[f64], y: &[f64], required: usize) -> Result<(), NumError> {
    if x.len() != y.len() {
        return Err(NumError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    if x.len() < required {
        return Err(NumError::TooFewPoints {
            required,
            got: x.len(),
        });
    }
    Ok(())
}
