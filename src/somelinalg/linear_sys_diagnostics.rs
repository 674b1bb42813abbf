use log::warn;
use nalgebra::{DMatrix, DVector, stack};
/// Rouché–Capelli: Ax = b has a solution iff rank(A) == rank([A b]).
/// Used to explain why a dense solve failed.
pub fn rouche_capelli(A: &DMatrix<f64>, b: &DVector<f64>) -> (usize, usize) {
    let Ab: DMatrix<f64> = stack![A, b];
    let eps = 1e3 * f64::EPSILON * A.amax().max(1.0);
    (A.rank(eps), Ab.rank(eps))
}

/// condition number in the 2-norm, ratio of the largest to the smallest singular value
pub fn condition_number(A: &DMatrix<f64>) -> f64 {
    let singular_values = A.singular_values();
    if singular_values.is_empty() {
        return f64::NAN;
    }
    let max_sigma = singular_values.max();
    let min_sigma = singular_values.min();
    max_sigma / min_sigma
}

pub fn poorly_conditioned(A: &DMatrix<f64>, threshold: f64) -> bool {
    let cond = condition_number(A);
    let poorly_conditioned = !(cond <= threshold);
    if poorly_conditioned {
        warn!(
            "The system of linear equations is poorly conditioned. Condition number = {:.2e}",
            cond
        );
    }
    poorly_conditioned
}

/// human readable reason for a failed solve, logged and carried in the error
pub fn linear_system_report(A: &DMatrix<f64>, b: &DVector<f64>) -> String {
    let (rank_A, rank_Ab) = rouche_capelli(A, b);
    let n = A.ncols();
    let report = if rank_A != rank_Ab {
        format!(
            "the system has no solution: rank(A) = {} != rank([A b]) = {}",
            rank_A, rank_Ab
        )
    } else if rank_A < n {
        format!(
            "matrix is singular: rank(A) = {} < {} unknowns, solution is not unique",
            rank_A, n
        )
    } else {
        format!(
            "matrix is numerically singular, condition number = {:.2e}",
            condition_number(A)
        )
    };
    warn!("{}", report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hilbert_matrix(n: usize) -> DMatrix<f64> {
        DMatrix::from_fn(n, n, |i, j| 1.0 / (i as f64 + j as f64 + 1.0))
    }

    #[test]
    fn test_rouche_capelli_inconsistent() {
        // rows 0 and 1 equal, right-hand sides differ
        let A = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 1.0, 2.0]);
        let b = DVector::from_vec(vec![3.0, 1.0]);
        let (rank_A, rank_Ab) = rouche_capelli(&A, &b);
        assert_eq!(rank_A, 1);
        assert_eq!(rank_Ab, 2);
        assert!(linear_system_report(&A, &b).contains("no solution"));
    }

    #[test]
    fn test_rank_deficient_but_consistent() {
        let A = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(linear_system_report(&A, &b).contains("not unique"));
    }

    #[test]
    fn test_poorly_conditioned_hilbert() {
        assert!(poorly_conditioned(&hilbert_matrix(6), 1e5));
        assert!(!poorly_conditioned(&DMatrix::identity(3, 3), 1e5));
    }

    #[test]
    fn test_condition_number_identity() {
        let cond = condition_number(&DMatrix::identity(4, 4));
        assert!((cond - 1.0).abs() < 1e-12);
    }
}
