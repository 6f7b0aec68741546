//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::{require_window, ScanError};
use crate::domain::indicator::rolling::sma_values;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, ScanError> {
    require_window("sma_window", period)?;
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    Ok(IndicatorSeries::from_simple(
        IndicatorType::Sma(period),
        bars,
        sma_values(&closes, period),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn sma_known_values() {
        let bars = make_bars(&[10.0, 9.0, 11.0, 12.0, 8.0]);
        let series = calculate_sma(&bars, 3).unwrap();

        assert_eq!(series.len(), 5);
        assert_eq!(series.simple(0), None);
        assert_eq!(series.simple(1), None);
        assert_abs_diff_eq!(series.simple(2).unwrap(), 10.0);
        assert_abs_diff_eq!(series.simple(3).unwrap(), 10.667, epsilon = 1e-3);
        assert_abs_diff_eq!(series.simple(4).unwrap(), 10.333, epsilon = 1e-3);
    }

    #[test]
    fn sma_dates_follow_bars() {
        let bars = make_bars(&[1.0, 2.0]);
        let series = calculate_sma(&bars, 1).unwrap();
        assert_eq!(series.values[1].date, bars[1].date);
    }

    #[test]
    fn sma_shorter_than_window_is_undefined() {
        let bars = make_bars(&[1.0, 2.0]);
        let series = calculate_sma(&bars, 5).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.values.iter().all(|p| !p.is_defined()));
    }

    #[test]
    fn sma_empty_bars() {
        let series = calculate_sma(&[], 5).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn sma_zero_period_is_error() {
        let bars = make_bars(&[1.0, 2.0]);
        assert!(matches!(
            calculate_sma(&bars, 0),
            Err(ScanError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn sma_indicator_type() {
        let series = calculate_sma(&make_bars(&[1.0]), 20).unwrap();
        assert_eq!(series.indicator_type, IndicatorType::Sma(20));
    }
}
