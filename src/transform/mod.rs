//! Response transformations.

mod boxcox;

pub use boxcox::{BoxCoxTransform, BoxCoxTransformer};
