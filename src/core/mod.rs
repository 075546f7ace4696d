//! Core types: dataset, design matrices, configuration, fit results, errors.

mod dataset;
mod error;
mod options;
mod result;

pub use dataset::{Dataset, DesignMatrix};
pub use error::FactorError;
pub use options::{
    AnalysisConfig, AnalysisConfigBuilder, CovarianceMode, FitOptions, FitOptionsBuilder,
    SelectionPolicy,
};
pub use result::{CoefficientEntry, FittedModel};
