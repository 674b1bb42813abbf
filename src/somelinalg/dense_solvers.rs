//! Dense solvers used by the engines: `Ax = b` and the QR least-squares step.
use super::linear_sys_diagnostics::linear_system_report;
use crate::numerical::config::LinearSysMethod;
use crate::numerical::num_errors::NumError;
use log::debug;
use nalgebra::{DMatrix, DVector};

pub fn solve_linear_system(
    method: LinearSysMethod,
    A: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<DVector<f64>, NumError> {
    let (nrows, ncols) = A.shape();
    if nrows != ncols {
        return Err(NumError::DimensionMismatch(format!(
            "matrix must be square, got {}x{}",
            nrows, ncols
        )));
    }
    if b.len() != nrows {
        return Err(NumError::DimensionMismatch(format!(
            "right-hand side has length {}, matrix has {} rows",
            b.len(),
            nrows
        )));
    }
    let x = match method {
        LinearSysMethod::Lu => A.clone().lu().solve(b),
        LinearSysMethod::Inv => A.clone().try_inverse().map(|A_inv| A_inv * b),
    };
    match x {
        // a zero pivot below the exact-zero test still shows up as inf/NaN
        Some(x) if x.iter().all(|v| v.is_finite()) => Ok(x),
        _ => {
            debug!("solve failed for A = {}", A);
            Err(NumError::SingularMatrix(linear_system_report(A, b)))
        }
    }
}

/// Result of one QR least-squares step `R·δ = -Qᵀ·g`
#[derive(Debug, Clone)]
pub struct QrStep {
    pub q: DMatrix<f64>,
    pub r: DMatrix<f64>,
    pub delta: DVector<f64>,
}

/// Reduced QR of the m×n matrix `A` (m >= n) and solution of `R·δ = -Qᵀ·g`.
pub fn qr_step(A: &DMatrix<f64>, g: &DVector<f64>) -> Result<QrStep, NumError> {
    let (m, n) = A.shape();
    if m < n {
        return Err(NumError::DimensionMismatch(format!(
            "least squares needs at least as many residuals as parameters, got {} residuals for {} parameters",
            m, n
        )));
    }
    if g.len() != m {
        return Err(NumError::DimensionMismatch(format!(
            "residual vector has length {}, Jacobian has {} rows",
            g.len(),
            m
        )));
    }
    let qr = A.clone().qr();
    let q = qr.q();
    let r = qr.r();
    let rhs = -(q.transpose() * g);
    match r.solve_upper_triangular(&rhs) {
        Some(delta) if delta.iter().all(|v| v.is_finite()) => Ok(QrStep { q, r, delta }),
        _ => Err(NumError::SingularMatrix(format!(
            "R factor of the Jacobian is rank deficient, diag(R) = {}",
            r.diagonal().transpose()
        ))),
    }
}

/// Euclidean norm
pub fn norm2(v: &DVector<f64>) -> f64 {
    v.norm()
}

/// largest absolute component, 0 for an empty vector
pub fn max_abs(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0, |acc: f64, x| acc.max(x.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_lu_and_inv_agree() {
        let A = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0]);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let x_lu = solve_linear_system(LinearSysMethod::Lu, &A, &b).unwrap();
        let x_inv = solve_linear_system(LinearSysMethod::Inv, &A, &b).unwrap();
        for i in 0..3 {
            assert_relative_eq!(x_lu[i], x_inv[i], epsilon = 1e-12);
        }
        let residual = &A * &x_lu - &b;
        assert!(residual.norm() < 1e-12);
    }

    #[test]
    fn test_singular_system_is_reported() {
        let A = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        let err = solve_linear_system(LinearSysMethod::Lu, &A, &b).unwrap_err();
        assert!(matches!(err, NumError::SingularMatrix(_)));
        let err = solve_linear_system(LinearSysMethod::Inv, &A, &b).unwrap_err();
        assert!(matches!(err, NumError::SingularMatrix(_)));
    }

    #[test]
    fn test_non_square_rejected() {
        let A = DMatrix::zeros(2, 3);
        let b = DVector::zeros(2);
        assert!(matches!(
            solve_linear_system(LinearSysMethod::Lu, &A, &b),
            Err(NumError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_qr_step_linear_least_squares() {
        // residual g(x) = A x - y at x = 0 is -y, so δ solves min ||A δ - y||
        let A = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let g = -&y;
        let step = qr_step(&A, &g).unwrap();
        assert_relative_eq!(step.delta[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(step.delta[1], 1.0, epsilon = 1e-12);
        assert_eq!(step.q.shape(), (3, 2));
        assert_eq!(step.r.shape(), (2, 2));
    }

    #[test]
    fn test_qr_step_rank_deficient() {
        let A = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
        let g = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(matches!(qr_step(&A, &g), Err(NumError::SingularMatrix(_))));
    }

    #[test]
    fn test_norms() {
        let v = DVector::from_vec(vec![3.0, -4.0]);
        assert_relative_eq!(norm2(&v), 5.0);
        assert_relative_eq!(max_abs(&v), 4.0);
    }
}
