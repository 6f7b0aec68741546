//! Trailing-window statistics over plain value columns.
//!
//! These work on `&[f64]` so the same code serves closes, volumes and highs.
//! Output is aligned with the input; the first `window - 1` entries are `None`.
//! Callers validate `window > 0`.

/// Trailing arithmetic mean.
pub fn sma_values(values: &[f64], window: usize) -> Vec<Option<f64>> {
    window_map(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing population variance around the trailing mean.
pub fn variance_values(values: &[f64], window: usize) -> Vec<Option<f64>> {
    window_map(values, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        w.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
    })
}

pub fn rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    window_map(values, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    window_map(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

fn window_map<F>(values: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                Some(f(&values[i + 1 - window..=i]))
            }
        })
        .collect()
}
