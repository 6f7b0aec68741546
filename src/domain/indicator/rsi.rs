//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are undefined (need n price changes to seed the averages).

use crate::domain::error::{require_window, ScanError};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

/// Running Wilder averages carried from one bar to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WilderState {
    pub avg_gain: f64,
    pub avg_loss: f64,
}

impl WilderState {
    /// Seeds the averages from the first `changes.len()` price changes.
    pub fn seed(changes: &[f64]) -> Self {
        let n = changes.len() as f64;
        let avg_gain = changes.iter().filter(|&&c| c > 0.0).sum::<f64>() / n;
        let avg_loss = changes.iter().filter(|&&c| c < 0.0).map(|c| -c).sum::<f64>() / n;
        Self { avg_gain, avg_loss }
    }

    /// Folds one more price change into the averages.
    pub fn step(self, change: f64, period: usize) -> Self {
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };
        let n = period as f64;
        Self {
            avg_gain: (self.avg_gain * (n - 1.0) + gain) / n,
            avg_loss: (self.avg_loss * (n - 1.0) + loss) / n,
        }
    }

    pub fn rsi(&self) -> f64 {
        if self.avg_loss == 0.0 {
            return 100.0;
        }
        100.0 - (100.0 / (1.0 + self.avg_gain / self.avg_loss))
    }
}

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, ScanError> {
    require_window("rsi_window", period)?;

    let mut values = vec![None; bars.len()];
    if bars.len() <= period {
        return Ok(IndicatorSeries::from_simple(
            IndicatorType::Rsi(period),
            bars,
            values,
        ));
    }

    let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

    let seed = WilderState::seed(&changes[..period]);
    values[period] = Some(seed.rsi());

    changes[period..]
        .iter()
        .enumerate()
        .fold(seed, |state, (offset, &change)| {
            let next = state.step(change, period);
            values[period + 1 + offset] = Some(next.rsi());
            next
        });

    Ok(IndicatorSeries::from_simple(
        IndicatorType::Rsi(period),
        bars,
        values,
    ))
}
