//! Post-fit diagnostics: multicollinearity, per-observation influence,
//! residual autocorrelation, and single-drop factor importance.

mod autocorrelation;
mod collinearity;
mod importance;
mod influence;

pub use autocorrelation::{ljung_box, LjungBoxRow};
pub use collinearity::{collinearity_report, CollinearityReport, VifEntry};
pub use importance::{delta_r_squared, ImportanceRecord};
pub use influence::{influence_table, InfluenceRecord};
