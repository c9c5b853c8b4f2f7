//! Least squares solver.
//!
//! The relaxivity model is linear in its parameters:
//!
//! ```text
//! minimize Σ (rate_i - (r0 + c_i · ri))^2
//! ```
//!
//! so a single linear solve is exact; no iterative optimizer is involved.
//! We solve through SVD so that tall design matrices (more samples than
//! parameters) work, and so that rank deficiency is detectable instead of
//! silently producing a minimum-norm answer.

use nalgebra::{DMatrix, DVector};

/// Singular values below `RANK_TOL * σ_max` are treated as zero.
const RANK_TOL: f64 = 1e-12;

/// Solve a least squares problem using SVD.
///
/// Returns `None` when the design matrix is rank deficient or the solution
/// is not finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() < x.ncols() || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    if !(sigma_max.is_finite() && sigma_max > 0.0) {
        return None;
    }
    let eps = RANK_TOL * sigma_max;
    if svd.singular_values.iter().any(|&s| s <= eps) {
        return None;
    }

    let beta = svd.solve(y, eps).ok()?;
    if beta.iter().all(|v| v.is_finite()) {
        Some(beta)
    } else {
        None
    }
}

/// Residual sum of squares `‖y - Xβ‖²`.
pub fn residual_sum_of_squares(x: &DMatrix<f64>, y: &DVector<f64>, beta: &DVector<f64>) -> f64 {
    (y - x * beta).norm_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
        assert!(residual_sum_of_squares(&x, &y, &beta) < 1e-20);
    }

    #[test]
    fn least_squares_rejects_collinear_columns() {
        // Every row has the same x, so intercept and slope are not identifiable.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(solve_least_squares(&x, &y).is_none());
    }

    #[test]
    fn least_squares_rejects_underdetermined() {
        let x = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0]);
        assert!(solve_least_squares(&x, &y).is_none());
    }
}
