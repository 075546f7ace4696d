//! Least-squares kernel and the OLS model fitter.

pub mod lstsq;
mod ols;

pub use ols::OlsModel;
