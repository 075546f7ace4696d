//! Box-Cox power transform of the response.

use crate::core::FactorError;
use faer::Col;

/// Fraction of the λ interval below which the golden-section search stops.
const GOLDEN_TOLERANCE: f64 = 1e-6;
/// Coarse grid points used to bracket the maximum before refining.
const GRID_POINTS: usize = 41;

/// A fitted Box-Cox transform: the optimal exponent and the positivity shift
/// that was applied before estimation.
#[derive(Debug, Clone, Copy)]
pub struct BoxCoxTransform {
    /// Exponent maximizing the profile log-likelihood.
    pub lambda: f64,
    /// Shift added to the response so it is strictly positive; recorded so
    /// the transform is reproducible.
    pub shift: f64,
}

impl BoxCoxTransform {
    /// Apply the transform: (z^λ − 1)/λ, or ln z when λ ≈ 0, with
    /// z = y + shift.
    pub fn apply(&self, y: &Col<f64>) -> Col<f64> {
        Col::from_fn(y.nrows(), |i| {
            let z = y[i] + self.shift;
            if self.lambda.abs() < 1e-10 {
                z.ln()
            } else {
                (z.powf(self.lambda) - 1.0) / self.lambda
            }
        })
    }

    /// Adoption rule: the transform is only worth using when λ is far enough
    /// from 1 (identity) to matter.
    pub fn is_material(&self, threshold: f64) -> bool {
        (self.lambda - 1.0).abs() > threshold
    }
}

/// Finds the Box-Cox exponent maximizing the profile log-likelihood over a
/// bounded λ range.
///
/// llf(λ) = −n/2·ln σ̂²(y^(λ)) + (λ−1)·Σ ln yᵢ, where σ̂² is the population
/// variance of the transformed series and the second term is the Jacobian of
/// the transform.
#[derive(Debug, Clone)]
pub struct BoxCoxTransformer {
    lambda_min: f64,
    lambda_max: f64,
    shift_epsilon: f64,
}

impl Default for BoxCoxTransformer {
    fn default() -> Self {
        Self {
            lambda_min: -5.0,
            lambda_max: 5.0,
            shift_epsilon: 1e-6,
        }
    }
}

impl BoxCoxTransformer {
    /// Create a transformer searching λ ∈ [lambda_min, lambda_max] with the
    /// given positivity-shift epsilon.
    pub fn new(lambda_min: f64, lambda_max: f64, shift_epsilon: f64) -> Self {
        Self {
            lambda_min,
            lambda_max,
            shift_epsilon,
        }
    }

    /// Fit the transform to a response series.
    ///
    /// Fails with [`FactorError::TransformUnavailable`] on degenerate input
    /// (constant series, too few observations, or a likelihood that never
    /// evaluates finite); the caller is expected to keep the untransformed
    /// response in that case.
    pub fn fit(&self, y: &Col<f64>) -> Result<BoxCoxTransform, FactorError> {
        let n = y.nrows();
        if n < 3 {
            return Err(FactorError::TransformUnavailable(format!(
                "need at least 3 observations, got {n}"
            )));
        }

        let min_y = y.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_y = y.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if max_y - min_y < 1e-12 {
            return Err(FactorError::TransformUnavailable(
                "response series is constant".to_string(),
            ));
        }

        let shift = if min_y <= 0.0 {
            self.shift_epsilon - min_y
        } else {
            0.0
        };
        let z = Col::from_fn(n, |i| y[i] + shift);
        let log_sum: f64 = z.iter().map(|&v| v.ln()).sum();

        let objective = |lambda: f64| profile_log_likelihood(&z, log_sum, lambda);

        // Coarse grid to bracket the maximum, then golden-section refinement.
        let (mut lo, mut hi) = (self.lambda_min, self.lambda_max);
        let step = (hi - lo) / (GRID_POINTS - 1) as f64;
        let mut best_idx = 0;
        let mut best_llf = f64::NEG_INFINITY;
        for idx in 0..GRID_POINTS {
            let llf = objective(lo + idx as f64 * step);
            if llf > best_llf {
                best_llf = llf;
                best_idx = idx;
            }
        }
        if !best_llf.is_finite() {
            return Err(FactorError::TransformUnavailable(
                "profile log-likelihood is not finite anywhere in range".to_string(),
            ));
        }
        if best_idx > 0 {
            lo = self.lambda_min + (best_idx - 1) as f64 * step;
        }
        if best_idx + 1 < GRID_POINTS {
            hi = self.lambda_min + (best_idx + 1) as f64 * step;
        }

        let lambda = golden_section_maximize(objective, lo, hi);
        if !objective(lambda).is_finite() {
            return Err(FactorError::TransformUnavailable(
                "profile log-likelihood did not converge".to_string(),
            ));
        }

        Ok(BoxCoxTransform { lambda, shift })
    }
}

/// Profile log-likelihood of λ for a strictly positive series.
fn profile_log_likelihood(z: &Col<f64>, log_sum: f64, lambda: f64) -> f64 {
    let n = z.nrows();
    let n_f = n as f64;

    let transformed: Vec<f64> = if lambda.abs() < 1e-10 {
        z.iter().map(|&v| v.ln()).collect()
    } else {
        z.iter().map(|&v| (v.powf(lambda) - 1.0) / lambda).collect()
    };

    if transformed.iter().any(|v| !v.is_finite()) {
        return f64::NEG_INFINITY;
    }

    let mean = transformed.iter().sum::<f64>() / n_f;
    let var = transformed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n_f;
    if var <= 0.0 || !var.is_finite() {
        return f64::NEG_INFINITY;
    }

    -0.5 * n_f * var.ln() + (lambda - 1.0) * log_sum
}

/// Golden-section search for the maximum of a unimodal function on [lo, hi].
fn golden_section_maximize<F: Fn(f64) -> f64>(f: F, mut lo: f64, mut hi: f64) -> f64 {
    let inv_phi = (5.0_f64.sqrt() - 1.0) / 2.0;
    let tolerance = GOLDEN_TOLERANCE * (hi - lo).abs().max(1.0);

    let mut a = hi - inv_phi * (hi - lo);
    let mut b = lo + inv_phi * (hi - lo);
    let mut fa = f(a);
    let mut fb = f(b);

    while hi - lo > tolerance {
        if fa > fb {
            hi = b;
            b = a;
            fb = fa;
            a = hi - inv_phi * (hi - lo);
            fa = f(a);
        } else {
            lo = a;
            a = b;
            fa = fb;
            b = lo + inv_phi * (hi - lo);
            fb = f(b);
        }
    }

    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lcg_uniform(state: &mut u64) -> f64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((*state >> 33) as f64) / (u32::MAX as f64)
    }

    #[test]
    fn test_lognormal_data_pulls_lambda_toward_zero() {
        // y = exp(w) with w roughly normal: the log branch is the right
        // transform, so λ̂ should land near 0.
        let mut state = 42u64;
        let y = Col::from_fn(400, |_| {
            // Sum of uniforms approximates a normal via CLT.
            let w: f64 = (0..12).map(|_| lcg_uniform(&mut state)).sum::<f64>() - 6.0;
            w.exp()
        });

        let transform = BoxCoxTransformer::default().fit(&y).expect("fit succeeds");
        assert!(
            transform.lambda.abs() < 0.4,
            "λ = {} should be near 0 for log-normal data",
            transform.lambda
        );
        assert_eq!(transform.shift, 0.0);
        assert!(transform.is_material(0.10));
    }

    #[test]
    fn test_constant_series_is_unavailable() {
        let y = Col::from_fn(50, |_| 1.5);
        let err = BoxCoxTransformer::default().fit(&y).unwrap_err();
        assert!(matches!(err, FactorError::TransformUnavailable(_)));
    }

    #[test]
    fn test_short_series_is_unavailable() {
        let y = Col::from_fn(2, |i| i as f64 + 1.0);
        let err = BoxCoxTransformer::default().fit(&y).unwrap_err();
        assert!(matches!(err, FactorError::TransformUnavailable(_)));
    }

    #[test]
    fn test_shift_applied_to_non_positive_series() {
        let y = Col::from_fn(30, |i| i as f64 - 10.0);
        let transform = BoxCoxTransformer::default().fit(&y).expect("fit succeeds");

        // shift = ε − min(y), so min(y) + shift = ε > 0.
        assert_relative_eq!(transform.shift, 1e-6 + 10.0, epsilon = 1e-12);
        let transformed = transform.apply(&y);
        assert!(transformed.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_apply_log_branch() {
        let transform = BoxCoxTransform {
            lambda: 0.0,
            shift: 0.0,
        };
        let y = Col::from_fn(3, |i| (i + 1) as f64);
        let out = transform.apply(&y);
        assert_relative_eq!(out[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(out[1], 2.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_apply_power_branch() {
        let transform = BoxCoxTransform {
            lambda: 2.0,
            shift: 0.0,
        };
        let y = Col::from_fn(2, |i| (i + 2) as f64);
        let out = transform.apply(&y);
        // (y² − 1)/2
        assert_relative_eq!(out[0], 1.5, epsilon = 1e-12);
        assert_relative_eq!(out[1], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_adoption_rule_threshold() {
        let near_identity = BoxCoxTransform {
            lambda: 1.05,
            shift: 0.0,
        };
        assert!(!near_identity.is_material(0.10));

        let material = BoxCoxTransform {
            lambda: 0.3,
            shift: 0.0,
        };
        assert!(material.is_material(0.10));
    }
}
