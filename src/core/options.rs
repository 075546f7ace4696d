//! Fit and pipeline configuration.

use crate::core::FactorError;

/// Coefficient-covariance estimator used by a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CovarianceMode {
    /// Ordinary OLS covariance: σ²(XᵗX)⁻¹ with σ² = RSS/(n−p).
    #[default]
    Ordinary,
    /// Newey-West HAC sandwich with Bartlett weights over a fixed bandwidth.
    NeweyWest { max_lag: usize },
}

impl CovarianceMode {
    /// Human-readable label carried on fit summaries.
    pub fn label(&self) -> String {
        match self {
            CovarianceMode::Ordinary => "ordinary".to_string(),
            CovarianceMode::NeweyWest { max_lag } => format!("newey-west(maxlag={max_lag})"),
        }
    }
}

/// How the pipeline picks the final variable set from the search results.
///
/// All candidate sets are reported regardless of the policy in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Subset minimizing BIC in the exhaustive table (ties broken by
    /// enumeration order). Falls back to the full universe when the table is
    /// empty.
    #[default]
    BestBic,
    /// Subset minimizing AIC in the exhaustive table.
    BestAic,
    /// Result of forward selection on AIC.
    ForwardAic,
    /// Result of backward elimination on AIC.
    BackwardAic,
    /// Result of bidirectional stepwise selection on AIC.
    StepwiseAic,
}

/// Configuration for a single OLS fit.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Whether to prepend a constant-1 intercept column (default: true).
    pub with_intercept: bool,
    /// Coefficient-covariance estimator (default: ordinary).
    pub covariance: CovarianceMode,
    /// Tolerance on the R diagonal for numerical-rank decisions.
    pub rank_tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            with_intercept: true,
            covariance: CovarianceMode::Ordinary,
            rank_tolerance: 1e-10,
        }
    }
}

impl FitOptions {
    /// Create a builder with default options.
    pub fn builder() -> FitOptionsBuilder {
        FitOptionsBuilder::default()
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<(), FactorError> {
        if !(self.rank_tolerance > 0.0) {
            return Err(FactorError::InvalidOptions(format!(
                "rank_tolerance must be positive, got {}",
                self.rank_tolerance
            )));
        }
        Ok(())
    }
}

/// Builder for [`FitOptions`].
#[derive(Debug, Clone, Default)]
pub struct FitOptionsBuilder {
    options: FitOptions,
}

impl FitOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include an intercept column.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.options.with_intercept = include;
        self
    }

    /// Set the covariance estimator.
    pub fn covariance(mut self, mode: CovarianceMode) -> Self {
        self.options.covariance = mode;
        self
    }

    /// Set the rank tolerance.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options.rank_tolerance = tol;
        self
    }

    /// Build and validate the options.
    pub fn build(self) -> Result<FitOptions, FactorError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

/// Configuration for the end-to-end analysis pipeline.
///
/// Everything tunable is carried here and passed explicitly into
/// [`crate::pipeline::run_analysis`]; the crate holds no ambient state.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Bandwidth for the Newey-West covariance of the final model (default: 6).
    pub hac_max_lag: usize,
    /// Lower bound of the Box-Cox λ search range (default: -5).
    pub boxcox_lambda_min: f64,
    /// Upper bound of the Box-Cox λ search range (default: 5).
    pub boxcox_lambda_max: f64,
    /// Transform adopted only when |λ−1| exceeds this (default: 0.10).
    pub boxcox_adoption_threshold: f64,
    /// Positivity-shift epsilon: shift = max(0, ε − min y). A numerical
    /// safety margin with no semantic meaning; fixed for reproducibility.
    pub boxcox_shift_epsilon: f64,
    /// Strict AIC improvement required by the stepwise searches (default: 1e-8).
    pub aic_improvement_threshold: f64,
    /// Exhaustive search runs only when the universe has at most this many
    /// factors; above the cap the pipeline selects via stepwise (default: 20).
    pub exhaustive_cap: usize,
    /// Final variable-set policy (default: best BIC from exhaustive search).
    pub selection_policy: SelectionPolicy,
    /// Ljung-Box lag horizons, truncated to the residual length
    /// (default: 1, 5, 10, 20).
    pub ljung_box_lags: Vec<usize>,
    /// Rank tolerance forwarded to every fit.
    pub rank_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            hac_max_lag: 6,
            boxcox_lambda_min: -5.0,
            boxcox_lambda_max: 5.0,
            boxcox_adoption_threshold: 0.10,
            boxcox_shift_epsilon: 1e-6,
            aic_improvement_threshold: 1e-8,
            exhaustive_cap: 20,
            selection_policy: SelectionPolicy::BestBic,
            ljung_box_lags: vec![1, 5, 10, 20],
            rank_tolerance: 1e-10,
        }
    }
}

impl AnalysisConfig {
    /// Create a builder with default configuration.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), FactorError> {
        if self.hac_max_lag == 0 {
            return Err(FactorError::InvalidOptions(
                "hac_max_lag must be at least 1".to_string(),
            ));
        }
        if !(self.boxcox_lambda_min < self.boxcox_lambda_max) {
            return Err(FactorError::InvalidOptions(format!(
                "Box-Cox λ range is empty: [{}, {}]",
                self.boxcox_lambda_min, self.boxcox_lambda_max
            )));
        }
        if !(self.boxcox_adoption_threshold >= 0.0) {
            return Err(FactorError::InvalidOptions(
                "Box-Cox adoption threshold must be non-negative".to_string(),
            ));
        }
        if !(self.boxcox_shift_epsilon > 0.0) {
            return Err(FactorError::InvalidOptions(
                "Box-Cox shift epsilon must be positive".to_string(),
            ));
        }
        if !(self.aic_improvement_threshold > 0.0) {
            return Err(FactorError::InvalidOptions(
                "AIC improvement threshold must be positive".to_string(),
            ));
        }
        if self.ljung_box_lags.iter().any(|&l| l == 0) {
            return Err(FactorError::InvalidOptions(
                "Ljung-Box lags must be at least 1".to_string(),
            ));
        }
        if !(self.rank_tolerance > 0.0) {
            return Err(FactorError::InvalidOptions(format!(
                "rank_tolerance must be positive, got {}",
                self.rank_tolerance
            )));
        }
        Ok(())
    }

    /// Fit options for ordinary-covariance fits under this configuration.
    pub fn ordinary_fit_options(&self) -> FitOptions {
        FitOptions {
            with_intercept: true,
            covariance: CovarianceMode::Ordinary,
            rank_tolerance: self.rank_tolerance,
        }
    }

    /// Fit options for the HAC-covariance final fit.
    pub fn hac_fit_options(&self) -> FitOptions {
        FitOptions {
            with_intercept: true,
            covariance: CovarianceMode::NeweyWest {
                max_lag: self.hac_max_lag,
            },
            rank_tolerance: self.rank_tolerance,
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Newey-West bandwidth.
    pub fn hac_max_lag(mut self, lag: usize) -> Self {
        self.config.hac_max_lag = lag;
        self
    }

    /// Set the Box-Cox λ search range.
    pub fn boxcox_lambda_range(mut self, min: f64, max: f64) -> Self {
        self.config.boxcox_lambda_min = min;
        self.config.boxcox_lambda_max = max;
        self
    }

    /// Set the Box-Cox adoption threshold on |λ−1|.
    pub fn boxcox_adoption_threshold(mut self, threshold: f64) -> Self {
        self.config.boxcox_adoption_threshold = threshold;
        self
    }

    /// Set the strict AIC improvement threshold for stepwise searches.
    pub fn aic_improvement_threshold(mut self, threshold: f64) -> Self {
        self.config.aic_improvement_threshold = threshold;
        self
    }

    /// Set the exhaustive-search factor cap.
    pub fn exhaustive_cap(mut self, cap: usize) -> Self {
        self.config.exhaustive_cap = cap;
        self
    }

    /// Set the final variable-set policy.
    pub fn selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.config.selection_policy = policy;
        self
    }

    /// Set the Ljung-Box lag horizons.
    pub fn ljung_box_lags(mut self, lags: Vec<usize>) -> Self {
        self.config.ljung_box_lags = lags;
        self
    }

    /// Set the rank tolerance forwarded to fits.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.config.rank_tolerance = tol;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<AnalysisConfig, FactorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.hac_max_lag, 6);
        assert_eq!(config.ljung_box_lags, vec![1, 5, 10, 20]);
        assert_eq!(config.selection_policy, SelectionPolicy::BestBic);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = AnalysisConfig::builder()
            .hac_max_lag(4)
            .selection_policy(SelectionPolicy::StepwiseAic)
            .exhaustive_cap(10)
            .build()
            .expect("valid configuration");

        assert_eq!(config.hac_max_lag, 4);
        assert_eq!(config.selection_policy, SelectionPolicy::StepwiseAic);
        assert_eq!(config.exhaustive_cap, 10);
    }

    #[test]
    fn test_validation_rejects_empty_lambda_range() {
        let result = AnalysisConfig::builder()
            .boxcox_lambda_range(2.0, -2.0)
            .build();
        assert!(matches!(result, Err(FactorError::InvalidOptions(_))));
    }

    #[test]
    fn test_validation_rejects_zero_hac_lag() {
        let result = AnalysisConfig::builder().hac_max_lag(0).build();
        assert!(matches!(result, Err(FactorError::InvalidOptions(_))));
    }

    #[test]
    fn test_validation_rejects_zero_ljung_box_lag() {
        let result = AnalysisConfig::builder()
            .ljung_box_lags(vec![0, 5])
            .build();
        assert!(matches!(result, Err(FactorError::InvalidOptions(_))));
    }

    #[test]
    fn test_fit_options_validation() {
        let result = FitOptions::builder().rank_tolerance(-1.0).build();
        assert!(matches!(result, Err(FactorError::InvalidOptions(_))));

        let options = FitOptions::builder()
            .with_intercept(false)
            .covariance(CovarianceMode::NeweyWest { max_lag: 6 })
            .build()
            .expect("valid options");
        assert!(!options.with_intercept);
        assert_eq!(options.covariance.label(), "newey-west(maxlag=6)");
    }
}
