//! Central finite differences: scalar derivatives, partial derivatives and the Jacobian.
//!
//! Step sizes are not validated, `h == 0` produces NaN/inf like any division by zero.
use crate::numerical::num_errors::NumError;
use crate::numerical::trace::{LogTrace, TraceSink};
use nalgebra::{DMatrix, DVector};

/// first derivative, (f(x+h) - f(x-h)) / 2h
pub fn derivative1<F>(f: F, x: f64, h: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    (f(x + h) - f(x - h)) / (2.0 * h)
}

/// second derivative, (f(x+h) - 2f(x) + f(x-h)) / h^2
pub fn derivative2<F>(f: F, x: f64, h: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    (f(x + h) - 2.0 * f(x) + f(x - h)) / (h * h)
}

fn check_index(x: &DVector<f64>, i: usize) -> Result<(), NumError> {
    if i >= x.len() {
        return Err(NumError::IndexOutOfRange {
            index: i,
            len: x.len(),
        });
    }
    Ok(())
}

fn shifted(x: &DVector<f64>, i: usize, eps: f64) -> (DVector<f64>, DVector<f64>) {
    let mut x_plus = x.clone();
    let mut x_minus = x.clone();
    x_plus[i] += eps;
    x_minus[i] -= eps;
    (x_plus, x_minus)
}

/// partial derivative of a scalar field `f: R^n -> R` with respect to `x[i]`
pub fn partial_single<F>(f: F, x: &DVector<f64>, i: usize, eps: f64) -> Result<f64, NumError>
where
    F: Fn(&DVector<f64>) -> f64,
{
    check_index(x, i)?;
    let (x_plus, x_minus) = shifted(x, i, eps);
    Ok((f(&x_plus) - f(&x_minus)) / (2.0 * eps))
}

/// partial derivative of a vector field `f: R^n -> R^m` with respect to `x[i]`, a column of the Jacobian
pub fn partial<F>(f: F, x: &DVector<f64>, i: usize, eps: f64) -> Result<DVector<f64>, NumError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    check_index(x, i)?;
    let (x_plus, x_minus) = shifted(x, i, eps);
    let f_plus = f(&x_plus);
    let f_minus = f(&x_minus);
    if f_plus.len() != f_minus.len() {
        return Err(NumError::DimensionMismatch(format!(
            "function returned vectors of length {} and {}",
            f_plus.len(),
            f_minus.len()
        )));
    }
    Ok((f_plus - f_minus) / (2.0 * eps))
}

/// m x n Jacobian, J[(i, j)] = df_i/dx_j, 2n evaluations of `f`
pub fn jacobian<F>(f: F, x: &DVector<f64>, eps: f64) -> Result<DMatrix<f64>, NumError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    jacobian_traced(f, x, eps, &mut crate::numerical::trace::NoTrace)
}

pub fn jacobian_traced<F>(
    f: F,
    x: &DVector<f64>,
    eps: f64,
    sink: &mut dyn TraceSink,
) -> Result<DMatrix<f64>, NumError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let n = x.len();
    if n == 0 {
        return Err(NumError::InvalidArgument(
            "Jacobian of a function of zero variables".to_string(),
        ));
    }
    let mut columns: Vec<DVector<f64>> = Vec::with_capacity(n);
    for j in 0..n {
        let column = partial(&f, x, j, eps)?;
        if let Some(first) = columns.first() {
            if first.len() != column.len() {
                return Err(NumError::DimensionMismatch(format!(
                    "partial derivative {} has length {}, expected {}",
                    j,
                    column.len(),
                    first.len()
                )));
            }
        }
        sink.vector(&format!("df/dx{}", j), &column);
        columns.push(column);
    }
    let J = DMatrix::from_columns(&columns);
    sink.matrix("Df", &J);
    Ok(J)
}

/// Jacobian narrated through the logger
pub fn jacobian_print<F>(f: F, x: &DVector<f64>, eps: f64, digits: usize) -> Result<DMatrix<f64>, NumError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    jacobian_traced(f, x, eps, &mut LogTrace::new(digits))
}

/// First order Taylor model of `f` around `x0`: g(x) = f(x0) + Df(x0) (x - x0)
pub fn linearize<F>(
    f: F,
    x0: &DVector<f64>,
    eps: f64,
) -> Result<impl Fn(&DVector<f64>) -> DVector<f64> + use<F>, NumError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let J = jacobian(&f, x0, eps)?;
    let f0 = f(x0);
    let x0 = x0.clone();
    Ok(move |x: &DVector<f64>| &f0 + &J * (x - &x0))
}
