//! End-to-end analysis pipeline: transform decision, subset searches, final
//! fits, and diagnostics, in a fixed order.

use crate::core::{AnalysisConfig, Dataset, FactorError, FittedModel, SelectionPolicy};
use crate::diagnostics::{
    collinearity_report, delta_r_squared, influence_table, ljung_box, CollinearityReport,
    ImportanceRecord, InfluenceRecord, LjungBoxRow,
};
use crate::selection::{ModelSelector, SubsetResult};
use crate::solvers::OlsModel;
use crate::transform::{BoxCoxTransform, BoxCoxTransformer};

/// Everything one analysis run produces.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Label of the response actually modeled, e.g. `"untransformed"` or
    /// `"boxcox(lambda=0.3127, shift=0.000000)"`.
    pub response_label: String,
    /// The adopted Box-Cox transform, when one was material.
    pub transform: Option<BoxCoxTransform>,
    /// Ordinary fit on the full factor universe before any selection; absent
    /// when the full design is rank deficient.
    pub initial_model: Option<FittedModel>,
    /// All exhaustive-search candidates ranked by (AIC, BIC); empty when the
    /// universe exceeded the exhaustive cap.
    pub subset_table: Vec<SubsetResult>,
    pub best_by_aic: Vec<String>,
    pub best_by_bic: Vec<String>,
    pub forward_selected: Vec<String>,
    pub backward_selected: Vec<String>,
    pub stepwise_selected: Vec<String>,
    /// The variable set the configured policy settled on.
    pub final_variables: Vec<String>,
    /// Final ordinary-covariance fit on `final_variables`.
    pub final_model: FittedModel,
    /// The same fit with Newey-West HAC standard errors.
    pub final_model_hac: FittedModel,
    pub collinearity: CollinearityReport,
    pub influence: Vec<InfluenceRecord>,
    pub ljung_box: Vec<LjungBoxRow>,
    pub importance: Vec<ImportanceRecord>,
}

/// Run the full analysis on a prepared dataset.
///
/// Order of operations: full-universe baseline fit, Box-Cox decision on the
/// response, subset searches on the working response, final variable set by
/// the configured policy, final ordinary and HAC fits, then diagnostics of the
/// final model.
pub fn run_analysis(
    dataset: &Dataset,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, FactorError> {
    config.validate()?;

    let universe: Vec<String> = dataset.factor_names().to_vec();
    if universe.is_empty() {
        return Err(FactorError::FitFailure(
            "dataset has no candidate factors".to_string(),
        ));
    }

    let ordinary_options = config.ordinary_fit_options();
    let ordinary = OlsModel::new(ordinary_options.clone());

    // Baseline: all factors, untransformed response. A rank-deficient full
    // design is tolerable here since the searches skip such candidates.
    let initial_model = match dataset
        .design_matrix(&universe, ordinary_options.with_intercept)
        .and_then(|design| ordinary.fit(&design, dataset.response()))
    {
        Ok(fitted) => Some(fitted),
        Err(FactorError::SingularMatrix { .. }) => None,
        Err(other) => return Err(other),
    };

    // Box-Cox decision. An unavailable transform is not an error: the
    // pipeline silently continues with the raw response.
    let transformer = BoxCoxTransformer::new(
        config.boxcox_lambda_min,
        config.boxcox_lambda_max,
        config.boxcox_shift_epsilon,
    );
    let (working_response, transform, response_label) = match transformer.fit(dataset.response()) {
        Ok(t) if t.is_material(config.boxcox_adoption_threshold) => {
            let label = format!("boxcox(lambda={:.4}, shift={:.6})", t.lambda, t.shift);
            (t.apply(dataset.response()), Some(t), label)
        }
        Ok(_) | Err(FactorError::TransformUnavailable(_)) => (
            dataset.response().clone(),
            None,
            "untransformed".to_string(),
        ),
        Err(other) => return Err(other),
    };

    let selector = ModelSelector::new(
        dataset,
        &working_response,
        ordinary_options.clone(),
        config.aic_improvement_threshold,
    );

    let (subset_table, best_by_aic, best_by_bic) = if universe.len() <= config.exhaustive_cap {
        let search = selector.exhaustive()?;
        (search.table, search.best_by_aic, search.best_by_bic)
    } else {
        (Vec::new(), Vec::new(), Vec::new())
    };

    let forward_selected = selector.forward()?;
    let backward_selected = selector.backward()?;
    let stepwise_selected = selector.stepwise()?;

    // Above the exhaustive cap the BIC/AIC policies fall through to the
    // stepwise result; an empty policy outcome falls back to all factors.
    let chosen = match config.selection_policy {
        SelectionPolicy::BestBic => {
            if best_by_bic.is_empty() {
                &stepwise_selected
            } else {
                &best_by_bic
            }
        }
        SelectionPolicy::BestAic => {
            if best_by_aic.is_empty() {
                &stepwise_selected
            } else {
                &best_by_aic
            }
        }
        SelectionPolicy::ForwardAic => &forward_selected,
        SelectionPolicy::BackwardAic => &backward_selected,
        SelectionPolicy::StepwiseAic => &stepwise_selected,
    };
    let final_variables: Vec<String> = if chosen.is_empty() {
        universe.clone()
    } else {
        chosen.clone()
    };

    // Final fits. A singular final design means the fallback universe itself
    // is degenerate, which is fatal.
    let final_design = dataset.design_matrix(&final_variables, ordinary_options.with_intercept)?;
    let final_model = ordinary
        .fit(&final_design, &working_response)
        .map_err(|e| match e {
            FactorError::SingularMatrix { rank, ncols } => FactorError::FitFailure(format!(
                "final design is rank deficient ({rank}/{ncols})"
            )),
            other => other,
        })?;
    let final_model_hac = OlsModel::new(config.hac_fit_options())
        .fit(&final_design, &working_response)
        .map_err(|e| match e {
            FactorError::SingularMatrix { rank, ncols } => FactorError::FitFailure(format!(
                "final design is rank deficient ({rank}/{ncols})"
            )),
            other => other,
        })?;

    let collinearity = collinearity_report(dataset, &final_variables, config.rank_tolerance)?;
    let influence = influence_table(&final_model, &final_design, config.rank_tolerance)?;
    let ljung_box = ljung_box(&final_model.residuals, &config.ljung_box_lags);
    let importance = delta_r_squared(
        dataset,
        &working_response,
        &final_variables,
        &ordinary_options,
    )?;

    Ok(AnalysisReport {
        response_label,
        transform,
        initial_model,
        subset_table,
        best_by_aic,
        best_by_bic,
        forward_selected,
        backward_selected,
        stepwise_selected,
        final_variables,
        final_model,
        final_model_hac,
        collinearity,
        influence,
        ljung_box,
        importance,
    })
}
