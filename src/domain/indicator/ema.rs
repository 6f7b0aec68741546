//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::{require_window, ScanError};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, ScanError> {
    require_window("ema_window", period)?;

    let mut values = Vec::with_capacity(bars.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < period - 1 {
            sum += bar.close;
            values.push(None);
        } else if i == period - 1 {
            sum += bar.close;
            ema = sum / period as f64;
            values.push(Some(ema));
        } else {
            ema = bar.close * k + ema * (1.0 - k);
            values.push(Some(ema));
        }
    }

    Ok(IndicatorSeries::from_simple(
        IndicatorType::Ema(period),
        bars,
        values,
    ))
}
