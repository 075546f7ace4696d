//! Common test utilities and data generators.
#![allow(dead_code)]

use factor_regress::prelude::*;

/// Deterministic pseudo-random draw in [-1, 1].
pub fn next_uniform(state: &mut u64) -> f64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    ((*state >> 32) as f64) / (u32::MAX as f64) * 2.0 - 1.0
}

/// Roughly standard-normal draw via a sum of uniforms.
pub fn next_gaussian(state: &mut u64) -> f64 {
    (0..12).map(|_| next_uniform(state)).sum::<f64>() / 2.0
}

/// Build a dataset where the response is an exact linear combination of the
/// named factors plus iid noise: y = intercept + Σ betaⱼ·xⱼ + σ·ε.
pub fn linear_dataset(
    n: usize,
    factor_names: &[&str],
    betas: &[f64],
    intercept: f64,
    noise_std: f64,
    seed: u64,
) -> Dataset {
    assert_eq!(factor_names.len(), betas.len());
    let mut state = seed;
    let mut rows = Vec::with_capacity(n);
    let mut response = Vec::with_capacity(n);

    for _ in 0..n {
        let row: Vec<f64> = (0..factor_names.len())
            .map(|_| next_uniform(&mut state))
            .collect();
        let mut y = intercept;
        for (value, beta) in row.iter().zip(betas) {
            y += value * beta;
        }
        y += noise_std * next_gaussian(&mut state);
        response.push(y);
        rows.push(row);
    }

    Dataset::new(
        (0..n as i64).collect(),
        response,
        factor_names.iter().map(|s| s.to_string()).collect(),
        rows,
    )
    .expect("generated dataset is valid")
}

/// Build a dataset whose regression errors follow an AR(1) process, for
/// exercising HAC standard errors and the Ljung-Box test.
pub fn ar1_error_dataset(n: usize, phi: f64, seed: u64) -> Dataset {
    let mut state = seed;
    let mut rows = Vec::with_capacity(n);
    let mut response = Vec::with_capacity(n);
    let mut e = 0.0;

    for _ in 0..n {
        let x = next_uniform(&mut state);
        e = phi * e + 0.2 * next_gaussian(&mut state);
        response.push(1.0 + 2.0 * x + e);
        rows.push(vec![x]);
    }

    Dataset::new(
        (0..n as i64).collect(),
        response,
        vec!["mkt".to_string()],
        rows,
    )
    .expect("generated dataset is valid")
}
