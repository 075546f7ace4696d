//! Shared matrix utilities.

mod matrix;

pub use matrix::standardize_columns;
