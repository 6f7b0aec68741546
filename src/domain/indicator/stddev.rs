//! Standard Deviation indicator.
//!
//! Population standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::{require_window, ScanError};
use crate::domain::indicator::rolling::variance_values;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub(crate) fn stddev_values(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    variance_values(closes, period)
        .into_iter()
        .map(|v| v.map(f64::sqrt))
        .collect()
}

pub fn calculate_stddev(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, ScanError> {
    require_window("stddev_window", period)?;
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    Ok(IndicatorSeries::from_simple(
        IndicatorType::Stddev(period),
        bars,
        stddev_values(&closes, period),
    ))
}
