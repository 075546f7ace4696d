//! Ordinary least squares with ordinary or Newey-West HAC covariance.

use crate::core::{CovarianceMode, DesignMatrix, FactorError, FitOptions, FittedModel};
use crate::solvers::lstsq;
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// OLS fitter for a named design matrix.
///
/// A fit is a pure function of (design, response, options): it allocates a
/// fresh [`FittedModel`] snapshot and touches no shared state.
///
/// # Example
///
/// ```rust,ignore
/// use factor_regress::prelude::*;
///
/// let design = dataset.design_matrix(&["mkt", "smb"], true)?;
/// let model = OlsModel::new(FitOptions::default());
/// let fitted = model.fit(&design, dataset.response())?;
/// println!("R² = {}", fitted.r_squared);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OlsModel {
    options: FitOptions,
}

impl OlsModel {
    /// Create a fitter with the given options.
    pub fn new(options: FitOptions) -> Self {
        Self { options }
    }

    /// Fit the model to a design matrix and response vector.
    pub fn fit(&self, design: &DesignMatrix, y: &Col<f64>) -> Result<FittedModel, FactorError> {
        let x = &design.matrix;
        let n = x.nrows();
        let p = x.ncols();

        if y.nrows() != n {
            return Err(FactorError::DimensionMismatch {
                x_rows: n,
                y_len: y.nrows(),
            });
        }
        if p == 0 {
            return Err(FactorError::FitFailure("design has no columns".to_string()));
        }
        // Residual df must be positive for σ² and inference.
        if n <= p {
            return Err(FactorError::InsufficientObservations {
                needed: p + 1,
                got: n,
            });
        }

        let coefficients = lstsq::solve(x, y, self.options.rank_tolerance)?;

        let mut fitted_values = Col::zeros(n);
        let mut residuals = Col::zeros(n);
        for i in 0..n {
            let mut pred = 0.0;
            for j in 0..p {
                pred += x[(i, j)] * coefficients[j];
            }
            fitted_values[i] = pred;
            residuals[i] = y[i] - pred;
        }

        let rss: f64 = residuals.iter().map(|&e| e * e).sum();
        let y_mean: f64 = y.iter().sum::<f64>() / n as f64;
        let tss: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();

        let r_squared = if tss > 0.0 {
            (1.0 - rss / tss).clamp(0.0, 1.0)
        } else if rss < 1e-10 {
            1.0
        } else {
            0.0
        };

        // Shared-constant information criteria: only the relative ranking
        // across fits of the same response is consumed.
        let (aic, bic) = information_criteria(n, p, rss);

        let xtx_inv = lstsq::gram_inverse(x, self.options.rank_tolerance)?;
        let covariance = match self.options.covariance {
            CovarianceMode::Ordinary => {
                let sigma2 = rss / (n - p) as f64;
                Mat::from_fn(p, p, |i, j| sigma2 * xtx_inv[(i, j)])
            }
            CovarianceMode::NeweyWest { max_lag } => {
                newey_west_covariance(x, &residuals, &xtx_inv, max_lag)
            }
        };

        let df = (n - p) as f64;
        let mut std_errors = Col::zeros(p);
        let mut t_statistics = Col::zeros(p);
        for j in 0..p {
            let var = covariance[(j, j)];
            std_errors[j] = if var >= 0.0 { var.sqrt() } else { f64::NAN };
            t_statistics[j] = if std_errors[j] > 0.0 {
                coefficients[j] / std_errors[j]
            } else {
                f64::NAN
            };
        }
        let p_values = two_sided_p_values(&t_statistics, df);

        Ok(FittedModel {
            column_names: design.column_names.clone(),
            has_intercept: design.has_intercept,
            coefficients,
            residuals,
            fitted_values,
            covariance,
            covariance_mode: self.options.covariance,
            std_errors,
            t_statistics,
            p_values,
            n_observations: n,
            n_parameters: p,
            rss,
            tss,
            r_squared,
            aic,
            bic,
        })
    }
}

/// AIC = n·ln(RSS/n) + 2(p+1), BIC = n·ln(RSS/n) + (p+1)·ln(n).
///
/// A perfect fit (RSS = 0) ranks ahead of everything else.
fn information_criteria(n: usize, p: usize, rss: f64) -> (f64, f64) {
    let n_f = n as f64;
    let k = (p + 1) as f64;
    if rss > 0.0 {
        let base = n_f * (rss / n_f).ln();
        (base + 2.0 * k, base + k * n_f.ln())
    } else {
        (f64::NEG_INFINITY, f64::NEG_INFINITY)
    }
}

/// Newey-West sandwich covariance with Bartlett weights.
///
/// S = Σₜ uₜ²xₜxₜᵗ + Σₗ wₗ Σ_{t>l} uₜu_{t−l}(xₜx_{t−l}ᵗ + x_{t−l}xₜᵗ),
/// wₗ = 1 − l/(L+1), covariance = (XᵗX)⁻¹ S (XᵗX)⁻¹.
fn newey_west_covariance(
    x: &Mat<f64>,
    residuals: &Col<f64>,
    xtx_inv: &Mat<f64>,
    max_lag: usize,
) -> Mat<f64> {
    let n = x.nrows();
    let p = x.ncols();
    let max_lag = max_lag.min(n.saturating_sub(1));

    let mut s: Mat<f64> = Mat::zeros(p, p);

    // Lag-0 heteroscedasticity term.
    for t in 0..n {
        let u2 = residuals[t] * residuals[t];
        for i in 0..p {
            for j in 0..p {
                s[(i, j)] += u2 * x[(t, i)] * x[(t, j)];
            }
        }
    }

    // Bartlett-weighted lagged cross products, symmetrized.
    for lag in 1..=max_lag {
        let weight = 1.0 - lag as f64 / (max_lag as f64 + 1.0);
        for t in lag..n {
            let uu = residuals[t] * residuals[t - lag];
            for i in 0..p {
                for j in 0..p {
                    s[(i, j)] +=
                        weight * uu * (x[(t, i)] * x[(t - lag, j)] + x[(t - lag, i)] * x[(t, j)]);
                }
            }
        }
    }

    xtx_inv * &s * xtx_inv
}

/// Two-sided p-values from Student-t with `df` degrees of freedom.
fn two_sided_p_values(t_statistics: &Col<f64>, df: f64) -> Col<f64> {
    let p = t_statistics.nrows();
    if df <= 0.0 {
        return Col::from_fn(p, |_| f64::NAN);
    }
    let t_dist = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => dist,
        Err(_) => return Col::from_fn(p, |_| f64::NAN),
    };
    Col::from_fn(p, |j| {
        let t = t_statistics[j];
        if t.is_finite() {
            2.0 * (1.0 - t_dist.cdf(t.abs()))
        } else {
            f64::NAN
        }
    })
}
