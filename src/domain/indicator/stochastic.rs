//! Stochastic Oscillator (%K).
//!
//! %K = (C - LL(n)) / (HH(n) - LL(n)) * 100
//! where HH/LL are the highest high and lowest low over the trailing n bars.
//! A flat window (HH == LL) yields 50. Values are clamped to [0, 100].
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::{require_window, ScanError};
use crate::domain::indicator::rolling::{rolling_max, rolling_min};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const FLAT_WINDOW_VALUE: f64 = 50.0;

pub fn calculate_stochastic(
    bars: &[OhlcvBar],
    period: usize,
) -> Result<IndicatorSeries, ScanError> {
    require_window("stochastic_window", period)?;

    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let values = rolling_max(&highs, period)
        .into_iter()
        .zip(rolling_min(&lows, period))
        .zip(bars)
        .map(|((hh, ll), bar)| Some(percent_k(bar.close, hh?, ll?)))
        .collect();

    Ok(IndicatorSeries::from_simple(
        IndicatorType::Stochastic(period),
        bars,
        values,
    ))
}

fn percent_k(close: f64, highest: f64, lowest: f64) -> f64 {
    let range = highest - lowest;
    if range == 0.0 {
        return FLAT_WINDOW_VALUE;
    }
    ((close - lowest) / range * 100.0).clamp(0.0, 100.0)
}
