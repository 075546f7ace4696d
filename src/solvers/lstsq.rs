//! Numerically stable least-squares primitives.
//!
//! Everything here assumes (and verifies) full column rank: a design whose
//! numerical rank falls below its column count fails with
//! [`FactorError::SingularMatrix`], and subset searches skip that candidate
//! rather than aborting.

use crate::core::FactorError;
use faer::{Col, Mat};

/// Solve min ‖y − Xβ‖² via column-pivoted QR with back-substitution.
///
/// Numerical rank is read off the R diagonal against `rank_tolerance`; a
/// rank-deficient design is an error, not an NaN-filled answer.
pub fn solve(x: &Mat<f64>, y: &Col<f64>, rank_tolerance: f64) -> Result<Col<f64>, FactorError> {
    let n = x.nrows();
    let p = x.ncols();

    if y.nrows() != n {
        return Err(FactorError::DimensionMismatch {
            x_rows: n,
            y_len: y.nrows(),
        });
    }
    if n < p {
        return Err(FactorError::InsufficientObservations { needed: p, got: n });
    }

    let qr = x.col_piv_qr();
    let q = qr.compute_Q();
    let r = qr.R();
    let perm = qr.P();

    let rank = numerical_rank(&r.to_owned(), p.min(n), rank_tolerance);
    if rank < p {
        return Err(FactorError::SingularMatrix { rank, ncols: p });
    }

    // perm_inv[j] = position original column j was pivoted to.
    let perm_arr = perm.arrays().0;
    let mut perm_inv: Vec<usize> = vec![0; p];
    perm_inv[..p].copy_from_slice(&perm_arr[..p]);

    // Solve R·β_perm = Qᵗy by back-substitution.
    let qty = q.transpose() * y;
    let mut beta_perm = Col::zeros(p);
    for i in (0..p).rev() {
        let mut sum = qty[i];
        for j in (i + 1)..p {
            sum -= r[(i, j)] * beta_perm[j];
        }
        beta_perm[i] = sum / r[(i, i)];
    }

    // Map back to original column order.
    Ok(Col::from_fn(p, |j| beta_perm[perm_inv[j]]))
}

/// Numerical rank from the leading diagonal of an upper-triangular factor.
fn numerical_rank(r: &Mat<f64>, limit: usize, tolerance: f64) -> usize {
    let mut rank = 0;
    for i in 0..limit {
        if r[(i, i)].abs() > tolerance {
            rank += 1;
        } else {
            break;
        }
    }
    rank
}

/// Compute (XᵗX)⁻¹ via QR of the Gram matrix with back-substitution.
pub fn gram_inverse(x: &Mat<f64>, rank_tolerance: f64) -> Result<Mat<f64>, FactorError> {
    let p = x.ncols();
    let xtx = x.transpose() * x;

    let qr = xtx.qr();
    let q = qr.compute_Q();
    let r = qr.R().to_owned();
    let qt = q.transpose().to_owned();

    let rank = numerical_rank(&r, p, rank_tolerance);
    if rank < p {
        return Err(FactorError::SingularMatrix { rank, ncols: p });
    }

    let mut inv = Mat::zeros(p, p);
    for col in 0..p {
        // Solve R·v = Qᵗ·e_col for one column of the inverse.
        let mut solution = vec![0.0; p];
        for i in (0..p).rev() {
            let mut sum = qt[(i, col)];
            for j in (i + 1)..p {
                sum -= r[(i, j)] * solution[j];
            }
            solution[i] = sum / r[(i, i)];
        }
        for row in 0..p {
            inv[(row, col)] = solution[row];
        }
    }

    Ok(inv)
}

/// Hat-matrix diagonal hᵢ = xᵢ(XᵗX)⁻¹xᵢᵗ, clamped to [0, 1].
pub fn hat_diagonal(x: &Mat<f64>, rank_tolerance: f64) -> Result<Col<f64>, FactorError> {
    let n = x.nrows();
    let p = x.ncols();
    let xtx_inv = gram_inverse(x, rank_tolerance)?;

    Ok(Col::from_fn(n, |i| {
        let mut h_ii = 0.0;
        for j in 0..p {
            for k in 0..p {
                h_ii += x[(i, j)] * xtx_inv[(j, k)] * x[(i, k)];
            }
        }
        h_ii.clamp(0.0, 1.0)
    }))
}

/// Singular values of a matrix, in descending order.
pub fn singular_values(x: &Mat<f64>) -> Result<Vec<f64>, FactorError> {
    let svd = x
        .svd()
        .map_err(|_| FactorError::FitFailure("SVD did not converge".to_string()))?;
    let s = svd.S().column_vector();
    Ok((0..s.nrows()).map(|i| s[i]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_exact_line() {
        // y = 2 + 3x, intercept column explicit.
        let x = Mat::from_fn(5, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let y = Col::from_fn(5, |i| 2.0 + 3.0 * i as f64);

        let beta = solve(&x, &y, 1e-10).expect("full-rank solve");
        assert_relative_eq!(beta[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(beta[1], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_solve_rejects_collinear_columns() {
        let x = Mat::from_fn(10, 2, |i, j| if j == 0 { i as f64 } else { 2.0 * i as f64 });
        let y = Col::from_fn(10, |i| i as f64);

        let err = solve(&x, &y, 1e-10).unwrap_err();
        assert!(matches!(
            err,
            FactorError::SingularMatrix { rank: 1, ncols: 2 }
        ));
    }

    #[test]
    fn test_solve_rejects_underdetermined_system() {
        let x = Mat::from_fn(2, 3, |i, j| ((i + 1) * (j + 1)) as f64);
        let y = Col::from_fn(2, |i| i as f64);

        let err = solve(&x, &y, 1e-10).unwrap_err();
        assert!(matches!(err, FactorError::InsufficientObservations { .. }));
    }

    #[test]
    fn test_gram_inverse_identity_product() {
        let x = Mat::from_fn(20, 2, |i, j| if j == 0 { 1.0 } else { (i as f64).sin() });
        let xtx = x.transpose() * &x;
        let inv = gram_inverse(&x, 1e-10).expect("well-conditioned gram matrix");

        let product = &xtx * &inv;
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(product[(i, j)], expected, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_hat_diagonal_bounds_and_sum() {
        let x = Mat::from_fn(30, 2, |i, j| if j == 0 { 1.0 } else { (i as f64).sin() });
        let h = hat_diagonal(&x, 1e-10).expect("full-rank design");

        for i in 0..30 {
            assert!(h[i] >= 0.0 && h[i] <= 1.0);
        }
        // Σhᵢ equals the number of parameters.
        let sum: f64 = h.iter().sum();
        assert_relative_eq!(sum, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_singular_values_descending() {
        let x = Mat::from_fn(10, 3, |i, j| ((i * (j + 1)) as f64).cos());
        let sv = singular_values(&x).expect("svd converges");

        assert_eq!(sv.len(), 3);
        for w in sv.windows(2) {
            assert!(w[0] >= w[1]);
        }
        assert!(sv.iter().all(|&s| s >= 0.0));
    }
}
