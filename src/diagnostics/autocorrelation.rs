//! Ljung-Box test for residual autocorrelation.

use faer::Col;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Ljung-Box statistic and p-value at one lag depth.
#[derive(Debug, Clone, Copy)]
pub struct LjungBoxRow {
    pub lag: usize,
    /// Q_m = n(n+2)·Σ_{l=1..m} ρ̂ₗ²/(n−l).
    pub statistic: f64,
    /// Right-tail χ²(m) probability of Q_m.
    pub p_value: f64,
}

/// Run the Ljung-Box test on a residual series at each requested lag depth.
///
/// Lags at or beyond the series length are dropped. A zero-variance series
/// has no defined autocorrelation, so its rows carry NaN.
pub fn ljung_box(residuals: &Col<f64>, lags: &[usize]) -> Vec<LjungBoxRow> {
    let n = residuals.nrows();
    let usable: Vec<usize> = lags.iter().copied().filter(|&l| l > 0 && l < n).collect();
    let Some(&max_lag) = usable.iter().max() else {
        return Vec::new();
    };

    let acf = autocorrelations(residuals, max_lag);

    usable
        .into_iter()
        .map(|lag| match &acf {
            Some(rho) => {
                let n_f = n as f64;
                let statistic = n_f
                    * (n_f + 2.0)
                    * (1..=lag)
                        .map(|l| rho[l - 1] * rho[l - 1] / (n_f - l as f64))
                        .sum::<f64>();
                let p_value = match ChiSquared::new(lag as f64) {
                    Ok(dist) => 1.0 - dist.cdf(statistic),
                    Err(_) => f64::NAN,
                };
                LjungBoxRow {
                    lag,
                    statistic,
                    p_value,
                }
            }
            None => LjungBoxRow {
                lag,
                statistic: f64::NAN,
                p_value: f64::NAN,
            },
        })
        .collect()
}

/// Biased sample autocorrelations ρ̂₁..ρ̂_max of a centered series, or `None`
/// when the series has no variance.
fn autocorrelations(series: &Col<f64>, max_lag: usize) -> Option<Vec<f64>> {
    let n = series.nrows();
    let mean = series.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = series.iter().map(|&v| v - mean).collect();
    let denom: f64 = centered.iter().map(|&v| v * v).sum();
    if denom < 1e-300 {
        return None;
    }

    Some(
        (1..=max_lag)
            .map(|lag| {
                let num: f64 = (lag..n).map(|t| centered[t] * centered[t - lag]).sum();
                num / denom
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcg_uniform(state: &mut u64) -> f64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((*state >> 33) as f64) / (u32::MAX as f64) * 2.0 - 1.0
    }

    #[test]
    fn test_white_noise_is_not_flagged() {
        let mut state = 17u64;
        let e = Col::from_fn(300, |_| lcg_uniform(&mut state));

        let rows = ljung_box(&e, &[1, 5, 10, 20]);
        assert_eq!(rows.len(), 4);
        // Independent noise should not reject everywhere.
        assert!(rows.iter().any(|r| r.p_value > 0.05));
        for row in &rows {
            assert!(row.statistic >= 0.0);
            assert!((0.0..=1.0).contains(&row.p_value));
        }
    }

    #[test]
    fn test_ar1_series_is_flagged() {
        let mut state = 23u64;
        let mut prev = 0.0;
        let e = Col::from_fn(300, |_| {
            prev = 0.8 * prev + lcg_uniform(&mut state);
            prev
        });

        let rows = ljung_box(&e, &[1, 5, 10, 20]);
        assert!(rows[0].p_value < 0.01, "lag-1 p = {}", rows[0].p_value);
        // Statistics accumulate with lag depth.
        for pair in rows.windows(2) {
            assert!(pair[1].statistic >= pair[0].statistic);
        }
    }

    #[test]
    fn test_lags_beyond_series_length_are_dropped() {
        let e = Col::from_fn(8, |i| (i as f64).sin());
        let rows = ljung_box(&e, &[1, 5, 10, 20]);

        let lags: Vec<usize> = rows.iter().map(|r| r.lag).collect();
        assert_eq!(lags, vec![1, 5]);
    }

    #[test]
    fn test_zero_variance_series_is_nan() {
        let e = Col::from_fn(50, |_| 0.0);
        let rows = ljung_box(&e, &[1, 5]);

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert!(row.statistic.is_nan());
            assert!(row.p_value.is_nan());
        }
    }

    #[test]
    fn test_empty_lag_list_yields_empty_table() {
        let e = Col::from_fn(50, |i| i as f64);
        assert!(ljung_box(&e, &[]).is_empty());
    }
}
