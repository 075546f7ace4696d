//! Fitted-model snapshot.

use crate::core::CovarianceMode;
use faer::{Col, Mat};

/// One row of a coefficient summary table.
#[derive(Debug, Clone)]
pub struct CoefficientEntry {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
}

/// An immutable snapshot of a single OLS fit.
///
/// Regenerated on every fit, never mutated in place; diagnostics derive their
/// tables from a snapshot and recompute when the model changes.
#[derive(Debug, Clone)]
pub struct FittedModel {
    /// Design column names; `"const"` first when the intercept is present.
    pub column_names: Vec<String>,
    /// Whether the design included an intercept column.
    pub has_intercept: bool,
    /// Estimated coefficients, aligned with `column_names`.
    pub coefficients: Col<f64>,
    /// Residuals y − ŷ.
    pub residuals: Col<f64>,
    /// Fitted values ŷ.
    pub fitted_values: Col<f64>,
    /// Coefficient covariance matrix under `covariance_mode`.
    pub covariance: Mat<f64>,
    /// Which covariance estimator produced `covariance`.
    pub covariance_mode: CovarianceMode,
    /// Standard errors (square root of the covariance diagonal).
    pub std_errors: Col<f64>,
    /// t-statistics β/se.
    pub t_statistics: Col<f64>,
    /// Two-sided p-values from Student-t with `residual_df` degrees of freedom.
    pub p_values: Col<f64>,
    /// Number of observations.
    pub n_observations: usize,
    /// Number of estimated parameters (design columns).
    pub n_parameters: usize,
    /// Residual sum of squares.
    pub rss: f64,
    /// Total sum of squares about the response mean.
    pub tss: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// n·ln(RSS/n) + 2(p+1); comparable across fits of the same response.
    pub aic: f64,
    /// n·ln(RSS/n) + (p+1)·ln(n); same constants as `aic`.
    pub bic: f64,
}

impl FittedModel {
    /// Residual degrees of freedom (n − p).
    pub fn residual_df(&self) -> usize {
        self.n_observations.saturating_sub(self.n_parameters)
    }

    /// Residual variance estimate σ² = RSS/(n−p).
    pub fn sigma2(&self) -> f64 {
        let df = self.residual_df();
        if df > 0 {
            self.rss / df as f64
        } else {
            f64::NAN
        }
    }

    /// Names of the non-intercept columns.
    pub fn factor_names(&self) -> &[String] {
        if self.has_intercept {
            &self.column_names[1..]
        } else {
            &self.column_names
        }
    }

    /// Coefficient by column name.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.column_names
            .iter()
            .position(|c| c == name)
            .map(|j| self.coefficients[j])
    }

    /// Full coefficient table for export collaborators.
    pub fn coefficient_table(&self) -> Vec<CoefficientEntry> {
        (0..self.n_parameters)
            .map(|j| CoefficientEntry {
                name: self.column_names[j].clone(),
                estimate: self.coefficients[j],
                std_error: self.std_errors[j],
                t_statistic: self.t_statistics[j],
                p_value: self.p_values[j],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_model() -> FittedModel {
        FittedModel {
            column_names: vec!["const".to_string(), "mkt".to_string()],
            has_intercept: true,
            coefficients: Col::from_fn(2, |j| (j + 1) as f64),
            residuals: Col::zeros(10),
            fitted_values: Col::zeros(10),
            covariance: Mat::identity(2, 2),
            covariance_mode: CovarianceMode::Ordinary,
            std_errors: Col::from_fn(2, |_| 1.0),
            t_statistics: Col::from_fn(2, |j| (j + 1) as f64),
            p_values: Col::from_fn(2, |_| 0.05),
            n_observations: 10,
            n_parameters: 2,
            rss: 4.0,
            tss: 20.0,
            r_squared: 0.8,
            aic: 1.0,
            bic: 2.0,
        }
    }

    #[test]
    fn test_degrees_of_freedom_and_sigma2() {
        let model = toy_model();
        assert_eq!(model.residual_df(), 8);
        assert!((model.sigma2() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_coefficient_lookup() {
        let model = toy_model();
        assert_eq!(model.coefficient("const"), Some(1.0));
        assert_eq!(model.coefficient("mkt"), Some(2.0));
        assert_eq!(model.coefficient("smb"), None);
        assert_eq!(model.factor_names(), &["mkt".to_string()]);
    }

    #[test]
    fn test_coefficient_table_alignment() {
        let model = toy_model();
        let table = model.coefficient_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table[1].name, "mkt");
        assert_eq!(table[1].estimate, 2.0);
    }
}
