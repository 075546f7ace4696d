//! Crate-wide error type.

use thiserror::Error;

/// Errors raised while building datasets, fitting models, or running the
/// analysis pipeline.
///
/// Subset searches treat `SingularMatrix` as a skippable candidate failure;
/// everything else propagates to the caller.
#[derive(Debug, Error)]
pub enum FactorError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("design matrix is rank deficient: rank {rank} < {ncols} columns")]
    SingularMatrix { rank: usize, ncols: usize },

    #[error("missing or non-finite value in column `{column}` at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("unknown factor `{0}`")]
    UnknownFactor(String),

    #[error("Box-Cox transform unavailable: {0}")]
    TransformUnavailable(String),

    #[error("no usable model could be fit: {0}")]
    FitFailure(String),

    #[error("invalid configuration: {0}")]
    InvalidOptions(String),
}
