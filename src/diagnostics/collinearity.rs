//! Multicollinearity diagnostics: variance inflation factors and the design
//! condition number.
//!
//! Both are computed on standardized factor columns so scale differences
//! between factors do not masquerade as collinearity.

use crate::core::{Dataset, FactorError};
use crate::solvers::lstsq;
use crate::utils::standardize_columns;
use faer::{Col, Mat};

/// Variance inflation factor for one factor.
#[derive(Debug, Clone)]
pub struct VifEntry {
    pub name: String,
    /// 1/(1−R²ⱼ) from regressing factor j on the remaining factors;
    /// infinite when the factor is degenerate or exactly collinear.
    pub vif: f64,
}

/// Multicollinearity summary for a factor subset.
#[derive(Debug, Clone)]
pub struct CollinearityReport {
    pub vif: Vec<VifEntry>,
    /// σ_max/σ_min of the standardized factor matrix; infinite when the
    /// smallest singular value is numerically zero.
    pub condition_number: f64,
}

/// Compute VIFs and the condition number for the named factors.
pub fn collinearity_report(
    dataset: &Dataset,
    subset: &[String],
    rank_tolerance: f64,
) -> Result<CollinearityReport, FactorError> {
    let x = dataset.factor_matrix(subset)?;
    let n = x.nrows();
    let k = x.ncols();
    let (z, degenerate) = standardize_columns(&x, 1e-12);

    let mut vif = Vec::with_capacity(k);
    for j in 0..k {
        let value = if degenerate[j] {
            f64::INFINITY
        } else {
            // Degenerate columns carry no information and would make every
            // auxiliary design singular, so they are left out of the pool.
            let others: Vec<usize> = (0..k).filter(|&c| c != j && !degenerate[c]).collect();
            if others.is_empty() {
                // Nothing to regress on; a lone factor cannot inflate.
                1.0
            } else {
                auxiliary_vif(&z, j, &others, rank_tolerance)
            }
        };
        vif.push(VifEntry {
            name: subset[j].clone(),
            vif: value,
        });
    }

    let condition_number = condition_number(&z, n, k)?;

    Ok(CollinearityReport {
        vif,
        condition_number,
    })
}

/// VIF of column `j` via the auxiliary regression z_j ~ const + Z_{others}.
fn auxiliary_vif(z: &Mat<f64>, j: usize, others: &[usize], rank_tolerance: f64) -> f64 {
    let n = z.nrows();
    let k = others.len() + 1;

    // Intercept plus the remaining standardized columns.
    let design = Mat::from_fn(n, k, |row, col| {
        if col == 0 {
            1.0
        } else {
            z[(row, others[col - 1])]
        }
    });
    let target = Col::from_fn(n, |row| z[(row, j)]);

    let beta = match lstsq::solve(&design, &target, rank_tolerance) {
        Ok(beta) => beta,
        Err(_) => return f64::INFINITY,
    };

    let mut rss = 0.0;
    let mut tss = 0.0;
    for row in 0..n {
        let mut pred = 0.0;
        for col in 0..k {
            pred += design[(row, col)] * beta[col];
        }
        let resid = target[row] - pred;
        rss += resid * resid;
        // Standardized columns have mean zero.
        tss += target[row] * target[row];
    }

    if tss <= 0.0 {
        return f64::INFINITY;
    }
    let unexplained = rss / tss;
    if unexplained < 1e-12 {
        f64::INFINITY
    } else {
        1.0 / unexplained
    }
}

/// Condition number σ_max/σ_min of the standardized factor matrix.
fn condition_number(z: &Mat<f64>, n: usize, k: usize) -> Result<f64, FactorError> {
    if n == 0 || k == 0 {
        return Ok(f64::NAN);
    }
    let sv = lstsq::singular_values(z)?;
    let sigma_max = sv.first().copied().unwrap_or(f64::NAN);
    let sigma_min = sv.last().copied().unwrap_or(f64::NAN);
    if !sigma_min.is_finite() || sigma_min < 1e-12 {
        Ok(f64::INFINITY)
    } else {
        Ok(sigma_max / sigma_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lcg_uniform(state: &mut u64) -> f64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((*state >> 33) as f64) / (u32::MAX as f64) * 2.0 - 1.0
    }

    fn build_dataset(names: &[&str], rows: Vec<Vec<f64>>) -> Dataset {
        let n = rows.len();
        Dataset::new(
            (0..n as i64).collect(),
            vec![0.0; n],
            names.iter().map(|s| s.to_string()).collect(),
            rows,
        )
        .expect("valid dataset")
    }

    #[test]
    fn test_independent_factors_have_low_vif() {
        let mut state = 11u64;
        let rows: Vec<Vec<f64>> = (0..200)
            .map(|_| vec![lcg_uniform(&mut state), lcg_uniform(&mut state)])
            .collect();
        let dataset = build_dataset(&["a", "b"], rows);
        let subset = dataset.factor_names().to_vec();

        let report = collinearity_report(&dataset, &subset, 1e-10).expect("report computes");
        for entry in &report.vif {
            assert!(entry.vif < 1.5, "{} has VIF {}", entry.name, entry.vif);
        }
        assert!(report.condition_number.is_finite());
    }

    #[test]
    fn test_near_duplicate_factor_inflates_vif() {
        let mut state = 13u64;
        let rows: Vec<Vec<f64>> = (0..200)
            .map(|_| {
                let a = lcg_uniform(&mut state);
                vec![a, a + 0.001 * lcg_uniform(&mut state)]
            })
            .collect();
        let dataset = build_dataset(&["a", "a_copy"], rows);
        let subset = dataset.factor_names().to_vec();

        let report = collinearity_report(&dataset, &subset, 1e-10).expect("report computes");
        assert!(report.vif[0].vif > 100.0);
        assert!(report.vif[1].vif > 100.0);
        assert!(report.condition_number > 10.0);
    }

    #[test]
    fn test_exact_duplicate_is_infinite() {
        let rows: Vec<Vec<f64>> = (0..50)
            .map(|i| {
                let a = (i as f64).sin();
                vec![a, 2.0 * a]
            })
            .collect();
        let dataset = build_dataset(&["a", "double_a"], rows);
        let subset = dataset.factor_names().to_vec();

        let report = collinearity_report(&dataset, &subset, 1e-10).expect("report computes");
        assert!(report.vif[0].vif.is_infinite());
        assert!(report.condition_number.is_infinite());
    }

    #[test]
    fn test_single_factor_vif_is_one() {
        let rows: Vec<Vec<f64>> = (0..40).map(|i| vec![(i as f64).cos()]).collect();
        let dataset = build_dataset(&["solo"], rows);
        let subset = dataset.factor_names().to_vec();

        let report = collinearity_report(&dataset, &subset, 1e-10).expect("report computes");
        assert_relative_eq!(report.vif[0].vif, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_factor_is_flagged_infinite() {
        let rows: Vec<Vec<f64>> = (0..40).map(|i| vec![(i as f64).sin(), 3.0]).collect();
        let dataset = build_dataset(&["a", "flat"], rows);
        let subset = dataset.factor_names().to_vec();

        let report = collinearity_report(&dataset, &subset, 1e-10).expect("report computes");
        assert!(report.vif[1].vif.is_infinite());
    }
}
