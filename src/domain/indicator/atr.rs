//! Average True Range.
//!
//! Seed: mean true range of the first n bars (bar 0 uses high - low).
//! Subsequent: ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::{require_window, ScanError};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, ScanError> {
    require_window("atr_window", period)?;

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    let mut values: Vec<Option<f64>> = Vec::with_capacity(bars.len());
    let mut atr = 0.0;

    for i in 0..bars.len() {
        if i < period - 1 {
            values.push(None);
        } else if i == period - 1 {
            atr = tr_values[..=i].iter().sum::<f64>() / period as f64;
            values.push(Some(atr));
        } else {
            atr = (atr * (period - 1) as f64 + tr_values[i]) / period as f64;
            values.push(Some(atr));
        }
    }

    Ok(IndicatorSeries::from_simple(
        IndicatorType::Atr(period),
        bars,
        values,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(day: u32, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn atr_basic() {
        let bars: Vec<OhlcvBar> = (1..=5).map(|d| make_bar(d, 110.0, 90.0, 100.0)).collect();
        let series = calculate_atr(&bars, 3).unwrap();

        assert_eq!(series.values.len(), 5);
        assert_eq!(series.warmup_len(), 2);
        assert!((series.simple(4).unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn atr_seed_is_average() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 115.0, 105.0, 110.0),
            make_bar(3, 120.0, 110.0, 115.0),
        ];
        let series = calculate_atr(&bars, 3).unwrap();
        assert!((series.simple(2).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 115.0, 105.0, 110.0),
            make_bar(3, 120.0, 110.0, 115.0),
            make_bar(4, 125.0, 115.0, 120.0),
        ];
        let series = calculate_atr(&bars, 3).unwrap();
        let expected = (10.0 * 2.0 + 10.0) / 3.0;
        assert!((series.simple(3).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn atr_insufficient_bars() {
        let bars: Vec<OhlcvBar> = (1..=2).map(|d| make_bar(d, 110.0, 90.0, 100.0)).collect();
        let series = calculate_atr(&bars, 5).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.warmup_len(), 2);
    }

    #[test]
    fn atr_handles_gaps() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 130.0, 120.0, 125.0),
            make_bar(3, 120.0, 110.0, 115.0),
        ];
        let series = calculate_atr(&bars, 2).unwrap();
        // TR: 10, 25, 15 → seed 17.5, then (17.5 + 15) / 2
        assert!((series.simple(1).unwrap() - 17.5).abs() < 1e-9);
        assert!((series.simple(2).unwrap() - 16.25).abs() < 1e-9);
    }
}
