//! Average Directional Index (Wilder).
//!
//! Per transition i (i >= 1):
//! - +DM = H[i] - H[i-1] when it exceeds L[i-1] - L[i] and is positive, else 0
//! - -DM = L[i-1] - L[i] when it exceeds H[i] - H[i-1] and is positive, else 0
//! - TR  = true range against C[i-1]
//!
//! +DM, -DM and TR are Wilder-summed over n transitions (seed is the plain
//! sum, then S = S - S/n + x). DI = 100 * S(DM) / S(TR), 0 when S(TR) == 0.
//! DX = 100 * |+DI - -DI| / (+DI + -DI), 0 when both DI are 0.
//! ADX seeds as the mean of the first n DX values, then
//! ADX[i] = (ADX[i-1] * (n-1) + DX[i]) / n.
//!
//! Warmup: first (2n-1) bars are undefined.

use crate::domain::error::{require_window, ScanError};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, Default)]
struct Directional {
    plus_dm: f64,
    minus_dm: f64,
    tr: f64,
}

impl Directional {
    fn between(prev: &OhlcvBar, bar: &OhlcvBar) -> Self {
        let up_move = bar.high - prev.high;
        let down_move = prev.low - bar.low;
        Self {
            plus_dm: if up_move > down_move && up_move > 0.0 {
                up_move
            } else {
                0.0
            },
            minus_dm: if down_move > up_move && down_move > 0.0 {
                down_move
            } else {
                0.0
            },
            tr: bar.true_range(prev.close),
        }
    }

    fn dx(&self) -> f64 {
        if self.tr == 0.0 {
            return 0.0;
        }
        let plus_di = 100.0 * self.plus_dm / self.tr;
        let minus_di = 100.0 * self.minus_dm / self.tr;
        let sum = plus_di + minus_di;
        if sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / sum
        }
    }
}

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, ScanError> {
    require_window("adx_window", period)?;

    let mut values: Vec<Option<f64>> = vec![None; bars.len()];
    let first_adx = match period.checked_mul(2) {
        Some(twice) if bars.len() >= twice => twice - 1,
        _ => {
            return Ok(IndicatorSeries::from_simple(
                IndicatorType::Adx(period),
                bars,
                values,
            ));
        }
    };

    let moves: Vec<Directional> = bars
        .windows(2)
        .map(|w| Directional::between(&w[0], &w[1]))
        .collect();

    let n = period as f64;
    let mut smoothed = moves[..period]
        .iter()
        .fold(Directional::default(), |acc, m| Directional {
            plus_dm: acc.plus_dm + m.plus_dm,
            minus_dm: acc.minus_dm + m.minus_dm,
            tr: acc.tr + m.tr,
        });

    // dx[k] belongs to bar index period + k
    let mut dx = vec![smoothed.dx()];
    for m in &moves[period..] {
        smoothed = Directional {
            plus_dm: smoothed.plus_dm - smoothed.plus_dm / n + m.plus_dm,
            minus_dm: smoothed.minus_dm - smoothed.minus_dm / n + m.minus_dm,
            tr: smoothed.tr - smoothed.tr / n + m.tr,
        };
        dx.push(smoothed.dx());
    }

    let mut adx = dx[..period].iter().sum::<f64>() / n;
    values[first_adx] = Some(adx);
    for (k, &d) in dx.iter().enumerate().skip(period) {
        adx = (adx * (n - 1.0) + d) / n;
        values[period + k] = Some(adx);
    }

    Ok(IndicatorSeries::from_simple(
        IndicatorType::Adx(period),
        bars,
        values,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, NaiveDate};

    fn make_bars(ranges: &[(f64, f64, f64)]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ranges
            .iter()
            .enumerate()
            .map(|(i, &(high, low, close))| OhlcvBar {
                date: start + Duration::days(i as i64),
                open: close,
                high,
                low,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn uptrend(n: usize) -> Vec<OhlcvBar> {
        let ranges: Vec<(f64, f64, f64)> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                (base + 1.0, base - 1.0, base)
            })
            .collect();
        make_bars(&ranges)
    }

    #[test]
    fn adx_warmup_is_two_periods_minus_one() {
        let series = calculate_adx(&uptrend(10), 3).unwrap();
        assert_eq!(series.len(), 10);
        assert_eq!(series.warmup_len(), 5);
    }

    #[test]
    fn adx_steady_uptrend_is_100() {
        // every move is pure +DM, so DX is 100 throughout
        let series = calculate_adx(&uptrend(12), 3).unwrap();
        for i in 5..12 {
            assert_abs_diff_eq!(series.simple(i).unwrap(), 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn adx_flat_market_is_zero_not_nan() {
        let bars = make_bars(&[(10.0, 10.0, 10.0); 8]);
        let series = calculate_adx(&bars, 3).unwrap();
        for i in 5..8 {
            assert_eq!(series.simple(i), Some(0.0));
        }
    }

    #[test]
    fn adx_stays_in_range_on_choppy_data() {
        let ranges: Vec<(f64, f64, f64)> = (0..30)
            .map(|i| {
                let base = 100.0 + ((i * 7) % 11) as f64 - 5.0;
                (base + 2.0, base - 2.0, base)
            })
            .collect();
        let series = calculate_adx(&make_bars(&ranges), 5).unwrap();
        for i in 0..series.len() {
            if let Some(v) = series.simple(i) {
                assert!((0.0..=100.0).contains(&v), "ADX {} out of range", v);
            }
        }
    }

    #[test]
    fn adx_insufficient_bars() {
        let series = calculate_adx(&uptrend(5), 3).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.warmup_len(), 5);
        assert_eq!(series.indicator_type, IndicatorType::Adx(3));
    }

    #[test]
    fn adx_huge_period_is_all_undefined() {
        let series = calculate_adx(&uptrend(5), usize::MAX).unwrap();
        assert_eq!(series.warmup_len(), 5);
    }

    #[test]
    fn adx_zero_period() {
        assert!(calculate_adx(&uptrend(5), 0).is_err());
    }
}
