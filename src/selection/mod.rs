//! Subset search over the factor universe by information criteria.
//!
//! Every candidate fit is a pure function of (subset, data); candidates whose
//! design is rank deficient are skipped, never fatal. Ranking sorts are stable
//! so ties resolve by enumeration order.

use crate::core::{Dataset, FactorError, FitOptions, FittedModel};
use crate::solvers::OlsModel;
use faer::Col;
use std::cmp::Ordering;

/// One ranking entry from a subset search.
#[derive(Debug, Clone)]
pub struct SubsetResult {
    /// Factor names in the candidate subset, in universe order.
    pub variables: Vec<String>,
    pub aic: f64,
    pub bic: f64,
    pub r_squared: f64,
}

/// Result of the exhaustive all-subsets search.
#[derive(Debug, Clone)]
pub struct ExhaustiveSearch {
    /// All fit candidates, ranked by (AIC, BIC).
    pub table: Vec<SubsetResult>,
    /// Subset minimizing AIC; empty when nothing could be fit.
    pub best_by_aic: Vec<String>,
    /// Subset minimizing BIC; empty when nothing could be fit.
    pub best_by_bic: Vec<String>,
}

/// Subset search engine over a factor universe.
///
/// The response is taken explicitly (rather than from the dataset) so searches
/// run on a transformed working response when the Box-Cox step adopted one.
pub struct ModelSelector<'a> {
    dataset: &'a Dataset,
    response: &'a Col<f64>,
    universe: Vec<String>,
    fit_options: FitOptions,
    improvement_threshold: f64,
}

impl<'a> ModelSelector<'a> {
    /// Create a selector over the full factor universe of `dataset`.
    pub fn new(
        dataset: &'a Dataset,
        response: &'a Col<f64>,
        fit_options: FitOptions,
        improvement_threshold: f64,
    ) -> Self {
        Self {
            dataset,
            response,
            universe: dataset.factor_names().to_vec(),
            fit_options,
            improvement_threshold,
        }
    }

    /// The factor universe being searched.
    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    /// Fit one candidate subset.
    pub fn fit_subset(&self, subset: &[String]) -> Result<FittedModel, FactorError> {
        let design = self
            .dataset
            .design_matrix(subset, self.fit_options.with_intercept)?;
        OlsModel::new(self.fit_options.clone()).fit(&design, self.response)
    }

    /// AIC of one candidate, or `None` when its design is rank deficient.
    fn candidate_aic(&self, subset: &[String]) -> Result<Option<f64>, FactorError> {
        match self.fit_subset(subset) {
            Ok(fitted) => Ok(Some(fitted.aic)),
            Err(FactorError::SingularMatrix { .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Enumerate and rank every non-empty subset of the universe.
    ///
    /// Costs up to 2^k fits; callers gate it with a universe cap and fall back
    /// to stepwise search above the cap.
    pub fn exhaustive(&self) -> Result<ExhaustiveSearch, FactorError> {
        let k = self.universe.len();
        let mut table = Vec::new();

        for mask in 1u64..(1u64 << k) {
            let subset: Vec<String> = (0..k)
                .filter(|j| mask & (1 << j) != 0)
                .map(|j| self.universe[j].clone())
                .collect();

            match self.fit_subset(&subset) {
                Ok(fitted) => table.push(SubsetResult {
                    variables: subset,
                    aic: fitted.aic,
                    bic: fitted.bic,
                    r_squared: fitted.r_squared,
                }),
                Err(FactorError::SingularMatrix { .. }) => continue,
                Err(other) => return Err(other),
            }
        }

        table.sort_by(|a, b| {
            compare_f64(a.aic, b.aic).then_with(|| compare_f64(a.bic, b.bic))
        });

        let best_by_aic = table.first().map(|r| r.variables.clone()).unwrap_or_default();
        let best_by_bic = table
            .iter()
            .min_by(|a, b| compare_f64(a.bic, b.bic))
            .map(|r| r.variables.clone())
            .unwrap_or_default();

        Ok(ExhaustiveSearch {
            table,
            best_by_aic,
            best_by_bic,
        })
    }

    /// Forward selection: add the unused variable with the lowest AIC while it
    /// strictly improves the current best.
    pub fn forward(&self) -> Result<Vec<String>, FactorError> {
        let mut selected: Vec<String> = Vec::new();
        let mut remaining: Vec<String> = self.universe.clone();
        let mut current_aic = f64::INFINITY;

        while !remaining.is_empty() {
            let mut best: Option<(f64, usize)> = None;
            for (idx, var) in remaining.iter().enumerate() {
                let mut candidate = selected.clone();
                candidate.push(var.clone());
                if let Some(aic) = self.candidate_aic(&candidate)? {
                    if best.map_or(true, |(b, _)| aic < b) {
                        best = Some((aic, idx));
                    }
                }
            }

            match best {
                Some((aic, idx)) if aic < current_aic - self.improvement_threshold => {
                    selected.push(remaining.remove(idx));
                    current_aic = aic;
                }
                _ => break,
            }
        }

        Ok(selected)
    }

    /// Backward elimination: drop the variable whose removal gives the lowest
    /// AIC while that strictly beats the current model.
    pub fn backward(&self) -> Result<Vec<String>, FactorError> {
        let mut selected: Vec<String> = self.universe.clone();
        let mut current_aic = self
            .candidate_aic(&selected)?
            .unwrap_or(f64::INFINITY);

        // The empty candidate is a legal intercept-only fit, so elimination
        // may run all the way down to no factors.
        while !selected.is_empty() {
            let mut best: Option<(f64, usize)> = None;
            for idx in 0..selected.len() {
                let mut candidate = selected.clone();
                candidate.remove(idx);
                if let Some(aic) = self.candidate_aic(&candidate)? {
                    if best.map_or(true, |(b, _)| aic < b) {
                        best = Some((aic, idx));
                    }
                }
            }

            match best {
                Some((aic, idx)) if aic < current_aic - self.improvement_threshold => {
                    selected.remove(idx);
                    current_aic = aic;
                }
                _ => break,
            }
        }

        Ok(selected)
    }

    /// Bidirectional stepwise: one add attempt then one remove attempt per
    /// round, stopping when a full round changes nothing.
    pub fn stepwise(&self) -> Result<Vec<String>, FactorError> {
        let mut selected: Vec<String> = Vec::new();
        let mut remaining: Vec<String> = self.universe.clone();
        let mut current_aic = f64::INFINITY;

        loop {
            let mut changed = false;

            // Add attempt.
            let mut best_add: Option<(f64, usize)> = None;
            for (idx, var) in remaining.iter().enumerate() {
                let mut candidate = selected.clone();
                candidate.push(var.clone());
                if let Some(aic) = self.candidate_aic(&candidate)? {
                    if best_add.map_or(true, |(b, _)| aic < b) {
                        best_add = Some((aic, idx));
                    }
                }
            }
            if let Some((aic, idx)) = best_add {
                if aic < current_aic - self.improvement_threshold {
                    selected.push(remaining.remove(idx));
                    current_aic = aic;
                    changed = true;
                }
            }

            // Remove attempt; an intercept-only candidate is allowed.
            if !selected.is_empty() {
                let mut best_remove: Option<(f64, usize)> = None;
                for idx in 0..selected.len() {
                    let mut candidate = selected.clone();
                    candidate.remove(idx);
                    if let Some(aic) = self.candidate_aic(&candidate)? {
                        if best_remove.map_or(true, |(b, _)| aic < b) {
                            best_remove = Some((aic, idx));
                        }
                    }
                }
                if let Some((aic, idx)) = best_remove {
                    if aic < current_aic - self.improvement_threshold {
                        let removed = selected.remove(idx);
                        remaining.push(removed);
                        current_aic = aic;
                        changed = true;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        Ok(selected)
    }
}

/// Total order on f64 ranking keys; NaN sorts last.
fn compare_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}
