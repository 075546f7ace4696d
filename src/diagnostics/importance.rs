//! Factor importance by single-drop ΔR².

use crate::core::{Dataset, FactorError, FitOptions};
use crate::solvers::OlsModel;
use faer::Col;
use std::cmp::Ordering;

/// R² lost when one factor is removed from the final model.
#[derive(Debug, Clone)]
pub struct ImportanceRecord {
    pub variable: String,
    /// R²(full) − R²(without this factor); NaN when the reduced design
    /// cannot be fit.
    pub delta_r_squared: f64,
}

/// Rank factors by the R² each one uniquely contributes.
///
/// Refits the model once per factor with that factor removed. The table is
/// sorted by ΔR² descending, NaN entries last.
pub fn delta_r_squared(
    dataset: &Dataset,
    response: &Col<f64>,
    subset: &[String],
    options: &FitOptions,
) -> Result<Vec<ImportanceRecord>, FactorError> {
    let model = OlsModel::new(options.clone());
    let full_design = dataset.design_matrix(subset, options.with_intercept)?;
    let full_r2 = model.fit(&full_design, response)?.r_squared;

    let mut records = Vec::with_capacity(subset.len());
    for dropped in subset {
        let reduced: Vec<String> = subset.iter().filter(|v| *v != dropped).cloned().collect();
        let delta = match dataset
            .design_matrix(&reduced, options.with_intercept)
            .and_then(|design| model.fit(&design, response))
        {
            Ok(fitted) => full_r2 - fitted.r_squared,
            Err(FactorError::SingularMatrix { .. }) => f64::NAN,
            Err(other) => return Err(other),
        };
        records.push(ImportanceRecord {
            variable: dropped.clone(),
            delta_r_squared: delta,
        });
    }

    records.sort_by(|a, b| match (a.delta_r_squared.is_nan(), b.delta_r_squared.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b
            .delta_r_squared
            .partial_cmp(&a.delta_r_squared)
            .unwrap_or(Ordering::Equal),
    });

    Ok(records)
}
