//! A multi-factor linear regression engine for explaining portfolio excess
//! returns with candidate risk factors.
//!
//! The crate fits OLS models on a caller-supplied table of observations,
//! decides whether a Box-Cox transform of the response is worthwhile, searches
//! factor subsets by information criteria (exhaustive and stepwise), and
//! diagnoses the chosen model: multicollinearity (VIF, condition number),
//! Newey-West HAC standard errors, per-observation influence (studentized
//! residuals, leverage, DFFITS, DFBETAS, COVRATIO), residual autocorrelation
//! (Ljung-Box), and single-drop ΔR² importance.
//!
//! Data loading, date filtering, plotting, and export live outside this crate:
//! callers hand in a [`core::Dataset`] that is already ordered and free of
//! missing values, and receive back plain result tables.
//!
//! # Example
//!
//! ```rust,ignore
//! use factor_regress::prelude::*;
//!
//! let dataset = Dataset::new(timestamps, excess_returns, factor_names, factor_rows)?;
//! let config = AnalysisConfig::builder().hac_max_lag(6).build()?;
//! let report = run_analysis(&dataset, &config)?;
//!
//! println!("final factors: {:?}", report.final_variables);
//! println!("R² = {}", report.final_model.r_squared);
//! ```

pub mod core;
pub mod diagnostics;
pub mod pipeline;
pub mod selection;
pub mod solvers;
pub mod transform;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        AnalysisConfig, AnalysisConfigBuilder, CoefficientEntry, CovarianceMode, Dataset,
        DesignMatrix, FactorError, FitOptions, FitOptionsBuilder, FittedModel, SelectionPolicy,
    };
    pub use crate::diagnostics::{
        collinearity_report, delta_r_squared, influence_table, ljung_box, CollinearityReport,
        ImportanceRecord, InfluenceRecord, LjungBoxRow, VifEntry,
    };
    pub use crate::pipeline::{run_analysis, AnalysisReport};
    pub use crate::selection::{ExhaustiveSearch, ModelSelector, SubsetResult};
    pub use crate::solvers::OlsModel;
    pub use crate::transform::{BoxCoxTransform, BoxCoxTransformer};
}

pub use crate::core::{
    AnalysisConfig, CovarianceMode, Dataset, DesignMatrix, FactorError, FitOptions, FittedModel,
    SelectionPolicy,
};
pub use crate::pipeline::{run_analysis, AnalysisReport};
pub use crate::solvers::OlsModel;
