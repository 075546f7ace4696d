//! Matrix utility functions.

use faer::Mat;

/// Standardize columns to mean 0 and population standard deviation 1.
///
/// Columns whose population standard deviation falls below `tolerance` are
/// left as all-zero and flagged in the returned mask so callers can report
/// sentinel diagnostics instead of dividing by zero.
pub fn standardize_columns(x: &Mat<f64>, tolerance: f64) -> (Mat<f64>, Vec<bool>) {
    let n_rows = x.nrows();
    let n_cols = x.ncols();

    let mut standardized = Mat::zeros(n_rows, n_cols);
    let mut degenerate = vec![false; n_cols];

    if n_rows == 0 {
        return (standardized, vec![true; n_cols]);
    }

    for j in 0..n_cols {
        let mean: f64 = (0..n_rows).map(|i| x[(i, j)]).sum::<f64>() / n_rows as f64;
        let var: f64 =
            (0..n_rows).map(|i| (x[(i, j)] - mean).powi(2)).sum::<f64>() / n_rows as f64;
        let std = var.sqrt();

        if std < tolerance {
            degenerate[j] = true;
            continue;
        }

        for i in 0..n_rows {
            standardized[(i, j)] = (x[(i, j)] - mean) / std;
        }
    }

    (standardized, degenerate)
}
