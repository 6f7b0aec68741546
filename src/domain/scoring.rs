//! Condition flags and composite scores.
//!
//! Two outputs are kept apart:
//! - the per-index score, counting flags that are true at that bar;
//! - per-flag activity, true when the flag fired at least once in the
//!   trailing `days` bars.
//!
//! A predicate whose inputs are not yet defined (no previous bar, rolling
//! window still warming up) evaluates to `false`.

use crate::domain::error::ScanError;
use crate::domain::indicator::rolling::{rolling_max, sma_values};
use crate::domain::ohlcv::Series;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

pub const VOLUME_SPIKE_WINDOW: usize = 10;
pub const VOLUME_SPIKE_MULTIPLIER: f64 = 1.5;
pub const LONG_TERM_LOOKBACK: usize = 5;
pub const CROSSOVER_WINDOW: usize = 10;
pub const TREND_SMA_WINDOW: usize = 20;
pub const YEAR_HIGH_WINDOW: usize = 252;
pub const PRICE_CHANGE_THRESHOLD: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timeframe {
    DayTrading,
    ShortTerm,
    LongTerm,
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::DayTrading => write!(f, "Day Trading"),
            Timeframe::ShortTerm => write!(f, "Short Term"),
            Timeframe::LongTerm => write!(f, "Long Term"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionFlag {
    MovingAverageUpwardTrend,
    ShortTermUpwardTrend,
    ShortTermPriceGapUp,
    ShortTermVolumeSpike,
    LongTermUpwardTrend,
    LongTermBullishCrossover,
    LongTerm52WeekHigh,
    PriceGapDown,
    PriceChangeAboveThreshold,
}

impl ConditionFlag {
    pub const ALL: [ConditionFlag; 9] = [
        ConditionFlag::MovingAverageUpwardTrend,
        ConditionFlag::ShortTermUpwardTrend,
        ConditionFlag::ShortTermPriceGapUp,
        ConditionFlag::ShortTermVolumeSpike,
        ConditionFlag::LongTermUpwardTrend,
        ConditionFlag::LongTermBullishCrossover,
        ConditionFlag::LongTerm52WeekHigh,
        ConditionFlag::PriceGapDown,
        ConditionFlag::PriceChangeAboveThreshold,
    ];

    pub fn timeframe(self) -> Timeframe {
        match self {
            ConditionFlag::ShortTermUpwardTrend
            | ConditionFlag::ShortTermPriceGapUp
            | ConditionFlag::ShortTermVolumeSpike => Timeframe::ShortTerm,
            ConditionFlag::MovingAverageUpwardTrend
            | ConditionFlag::LongTermUpwardTrend
            | ConditionFlag::LongTermBullishCrossover
            | ConditionFlag::LongTerm52WeekHigh => Timeframe::LongTerm,
            ConditionFlag::PriceGapDown | ConditionFlag::PriceChangeAboveThreshold => {
                Timeframe::DayTrading
            }
        }
    }

    /// False for an index past the end of the series.
    pub fn evaluate(self, ctx: &ConditionContext<'_>, i: usize) -> bool {
        let bars = ctx.series.bars();
        let Some(bar) = bars.get(i) else {
            return false;
        };
        let prev_close = i.checked_sub(1).map(|p| bars[p].close);
        match self {
            ConditionFlag::MovingAverageUpwardTrend => {
                above(bar.close, ctx.close_trend_sma[i])
            }
            ConditionFlag::ShortTermUpwardTrend => above(bar.close, prev_close),
            ConditionFlag::ShortTermPriceGapUp => above(bar.open, prev_close),
            ConditionFlag::ShortTermVolumeSpike => above(
                bar.volume as f64,
                ctx.volume_mean[i].map(|m| m * VOLUME_SPIKE_MULTIPLIER),
            ),
            ConditionFlag::LongTermUpwardTrend => above(
                bar.close,
                i.checked_sub(LONG_TERM_LOOKBACK).map(|p| bars[p].close),
            ),
            ConditionFlag::LongTermBullishCrossover => above(bar.close, ctx.close_mean[i]),
            ConditionFlag::LongTerm52WeekHigh => ctx.close_year_high[i] == Some(bar.close),
            ConditionFlag::PriceGapDown => prev_close.is_some_and(|p| bar.open < p),
            ConditionFlag::PriceChangeAboveThreshold => prev_close
                .is_some_and(|p| (bar.close - p).abs() > PRICE_CHANGE_THRESHOLD * p),
        }
    }
}

fn above(value: f64, reference: Option<f64>) -> bool {
    reference.is_some_and(|r| value > r)
}

impl fmt::Display for ConditionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionFlag::MovingAverageUpwardTrend => "Moving Average Upward Trend",
            ConditionFlag::ShortTermUpwardTrend => "Short Term Upward Trend",
            ConditionFlag::ShortTermPriceGapUp => "Short Term Price Gap Up",
            ConditionFlag::ShortTermVolumeSpike => "Short Term Volume Spike",
            ConditionFlag::LongTermUpwardTrend => "Long Term Upward Trend",
            ConditionFlag::LongTermBullishCrossover => "Long Term Bullish Crossover",
            ConditionFlag::LongTerm52WeekHigh => "Long Term 52 Week High",
            ConditionFlag::PriceGapDown => "Day Trading Price Gap Down",
            ConditionFlag::PriceChangeAboveThreshold => "Day Trading Price Change Above Threshold",
        };
        f.write_str(name)
    }
}

/// Rolling statistics shared by every predicate, computed once per series.
pub struct ConditionContext<'a> {
    pub series: &'a Series,
    close_trend_sma: Vec<Option<f64>>,
    close_mean: Vec<Option<f64>>,
    close_year_high: Vec<Option<f64>>,
    volume_mean: Vec<Option<f64>>,
}

impl<'a> ConditionContext<'a> {
    pub fn new(series: &'a Series) -> Self {
        let closes = series.closes();
        let volumes = series.volumes();
        Self {
            series,
            close_trend_sma: sma_values(&closes, TREND_SMA_WINDOW),
            close_mean: sma_values(&closes, CROSSOVER_WINDOW),
            close_year_high: rolling_max(&closes, YEAR_HIGH_WINDOW),
            volume_mean: sma_values(&volumes, VOLUME_SPIKE_WINDOW),
        }
    }
}

/// The fixed set of flags that contribute to a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionRegistry {
    flags: Vec<ConditionFlag>,
}

impl Default for ConditionRegistry {
    fn default() -> Self {
        Self {
            flags: ConditionFlag::ALL.to_vec(),
        }
    }
}

impl ConditionRegistry {
    pub fn new(flags: Vec<ConditionFlag>) -> Result<Self, ScanError> {
        let mut seen = std::collections::HashSet::new();
        for flag in &flags {
            if !seen.insert(*flag) {
                return Err(ScanError::invalid_parameter(
                    "condition_flags",
                    format!("duplicate flag {}", flag),
                ));
            }
        }
        Ok(Self { flags })
    }

    pub fn flags(&self) -> &[ConditionFlag] {
        &self.flags
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn by_timeframe(&self, timeframe: Timeframe) -> Vec<ConditionFlag> {
        self.flags
            .iter()
            .copied()
            .filter(|f| f.timeframe() == timeframe)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub index: usize,
    pub date: NaiveDate,
    pub flags: BTreeMap<ConditionFlag, bool>,
    pub activity: BTreeMap<ConditionFlag, bool>,
    pub score: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    pub days: usize,
    pub max_score: usize,
    pub rows: Vec<ScoreRow>,
}

impl ScoreReport {
    pub fn latest(&self) -> Option<&ScoreRow> {
        self.rows.last()
    }
}

fn evaluate_all(ctx: &ConditionContext<'_>, registry: &ConditionRegistry) -> Vec<Vec<bool>> {
    (0..ctx.series.len())
        .map(|i| registry.flags.iter().map(|f| f.evaluate(ctx, i)).collect())
        .collect()
}

/// Score at every index of the series.
pub fn score_series(series: &Series, registry: &ConditionRegistry) -> Vec<usize> {
    let ctx = ConditionContext::new(series);
    evaluate_all(&ctx, registry)
        .iter()
        .map(|row| row.iter().filter(|&&b| b).count())
        .collect()
}

/// Flags, score and recent activity for the trailing `days` bars.
pub fn aggregate_scores(
    series: &Series,
    registry: &ConditionRegistry,
    days: usize,
) -> Result<ScoreReport, ScanError> {
    if days == 0 {
        return Err(ScanError::invalid_parameter(
            "score_days",
            "must be positive",
        ));
    }

    let ctx = ConditionContext::new(series);
    let evaluated = evaluate_all(&ctx, registry);
    let bars = series.bars();
    let start = bars.len().saturating_sub(days);

    let rows = (start..bars.len())
        .map(|i| {
            let flags: BTreeMap<ConditionFlag, bool> = registry
                .flags
                .iter()
                .enumerate()
                .map(|(k, &flag)| (flag, evaluated[i][k]))
                .collect();

            let full_window = i + 1 >= days;
            let activity = registry
                .flags
                .iter()
                .enumerate()
                .map(|(k, &flag)| {
                    let fired =
                        full_window && evaluated[i + 1 - days..=i].iter().any(|row| row[k]);
                    (flag, fired)
                })
                .collect();

            let score = flags.values().filter(|&&b| b).count();
            ScoreRow {
                index: i,
                date: bars[i].date,
                flags,
                activity,
                score,
            }
        })
        .collect();

    Ok(ScoreReport {
        days,
        max_score: registry.len(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::Duration;

    fn bar(i: usize, open: f64, close: f64, volume: i64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i as i64),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume,
        }
    }

    fn series(bars: Vec<OhlcvBar>) -> Series {
        Series::new("TEST", bars).unwrap()
    }

    fn registry(flags: &[ConditionFlag]) -> ConditionRegistry {
        ConditionRegistry::new(flags.to_vec()).unwrap()
    }

    #[test]
    fn evaluate_past_end_is_false() {
        let s = series(vec![bar(0, 100.0, 100.0, 1000), bar(1, 101.0, 105.0, 1000)]);
        let ctx = ConditionContext::new(&s);
        assert!(ConditionFlag::ShortTermUpwardTrend.evaluate(&ctx, 1));
        for flag in ConditionFlag::ALL {
            assert!(!flag.evaluate(&ctx, 2));
            assert!(!flag.evaluate(&ctx, usize::MAX));
        }
    }

    #[test]
    fn three_flags_all_true_scores_three() {
        // gap up, close up, and a >2% move
        let s = series(vec![bar(0, 100.0, 100.0, 1000), bar(1, 101.0, 105.0, 1000)]);
        let reg = registry(&[
            ConditionFlag::ShortTermUpwardTrend,
            ConditionFlag::ShortTermPriceGapUp,
            ConditionFlag::PriceChangeAboveThreshold,
        ]);
        let report = aggregate_scores(&s, &reg, 1).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].score, 3);
        assert_eq!(report.max_score, 3);
    }

    #[test]
    fn three_flags_none_true_scores_zero() {
        // flat open and close
        let s = series(vec![bar(0, 100.0, 100.0, 1000), bar(1, 100.0, 100.0, 1000)]);
        let reg = registry(&[
            ConditionFlag::ShortTermUpwardTrend,
            ConditionFlag::ShortTermPriceGapUp,
            ConditionFlag::PriceChangeAboveThreshold,
        ]);
        let report = aggregate_scores(&s, &reg, 1).unwrap();
        assert_eq!(report.rows[0].score, 0);
    }

    #[test]
    fn first_bar_has_no_previous_close() {
        let s = series(vec![bar(0, 100.0, 200.0, 1000)]);
        let scores = score_series(&s, &ConditionRegistry::default());
        assert_eq!(scores, vec![0]);
    }

    #[test]
    fn gap_down_and_threshold() {
        let s = series(vec![bar(0, 100.0, 100.0, 1000), bar(1, 99.0, 97.0, 1000)]);
        let ctx = ConditionContext::new(&s);
        assert!(ConditionFlag::PriceGapDown.evaluate(&ctx, 1));
        assert!(ConditionFlag::PriceChangeAboveThreshold.evaluate(&ctx, 1));
        assert!(!ConditionFlag::ShortTermUpwardTrend.evaluate(&ctx, 1));
    }

    #[test]
    fn volume_spike_needs_full_window() {
        let mut bars: Vec<OhlcvBar> = (0..9).map(|i| bar(i, 10.0, 10.0, 100)).collect();
        bars.push(bar(9, 10.0, 10.0, 1000));
        let s = series(bars);
        let ctx = ConditionContext::new(&s);
        // mean of 9×100 + 1000 = 190, × 1.5 = 285 < 1000
        assert!(ConditionFlag::ShortTermVolumeSpike.evaluate(&ctx, 9));
        assert!(!ConditionFlag::ShortTermVolumeSpike.evaluate(&ctx, 8));
    }

    #[test]
    fn long_term_trend_compares_five_bars_back() {
        let bars: Vec<OhlcvBar> = (0..6).map(|i| bar(i, 10.0, 10.0 + i as f64, 100)).collect();
        let s = series(bars);
        let ctx = ConditionContext::new(&s);
        assert!(!ConditionFlag::LongTermUpwardTrend.evaluate(&ctx, 4));
        assert!(ConditionFlag::LongTermUpwardTrend.evaluate(&ctx, 5));
    }

    #[test]
    fn year_high_requires_full_year_of_history() {
        let bars: Vec<OhlcvBar> = (0..YEAR_HIGH_WINDOW)
            .map(|i| bar(i, 10.0, 10.0 + i as f64, 100))
            .collect();
        let s = series(bars);
        let ctx = ConditionContext::new(&s);
        assert!(ConditionFlag::LongTerm52WeekHigh.evaluate(&ctx, YEAR_HIGH_WINDOW - 1));
        assert!(!ConditionFlag::LongTerm52WeekHigh.evaluate(&ctx, YEAR_HIGH_WINDOW - 2));
    }

    #[test]
    fn activity_differs_from_score() {
        // up, then flat, flat
        let s = series(vec![
            bar(0, 10.0, 10.0, 100),
            bar(1, 10.0, 11.0, 100),
            bar(2, 11.0, 11.0, 100),
            bar(3, 11.0, 11.0, 100),
        ]);
        let reg = registry(&[ConditionFlag::ShortTermUpwardTrend]);
        let report = aggregate_scores(&s, &reg, 3).unwrap();

        assert_eq!(report.rows.len(), 3);
        let last = report.latest().unwrap();
        assert_eq!(last.index, 3);
        assert_eq!(last.score, 0);
        assert!(last.activity[&ConditionFlag::ShortTermUpwardTrend]);
        assert!(!last.flags[&ConditionFlag::ShortTermUpwardTrend]);

        // index 1 has only two bars of history: window incomplete
        assert_eq!(report.rows[0].index, 1);
        assert_eq!(report.rows[0].score, 1);
        assert!(!report.rows[0].activity[&ConditionFlag::ShortTermUpwardTrend]);
    }

    #[test]
    fn score_stays_within_registry_size() {
        let bars: Vec<OhlcvBar> = (0..40)
            .map(|i| {
                let close = 50.0 + (i as f64 * 0.9).sin() * 5.0;
                bar(i, close - 0.5, close, 100 + (i as i64 % 7) * 200)
            })
            .collect();
        let s = series(bars);
        let reg = ConditionRegistry::default();
        for score in score_series(&s, &reg) {
            assert!(score <= reg.len());
        }
    }

    #[test]
    fn rows_limited_to_days() {
        let bars: Vec<OhlcvBar> = (0..10).map(|i| bar(i, 10.0, 10.0, 100)).collect();
        let report = aggregate_scores(&series(bars), &ConditionRegistry::default(), 5).unwrap();
        assert_eq!(report.rows.len(), 5);
        assert_eq!(report.rows[0].index, 5);
    }

    #[test]
    fn short_series_yields_fewer_rows() {
        let bars: Vec<OhlcvBar> = (0..2).map(|i| bar(i, 10.0, 10.0, 100)).collect();
        let report = aggregate_scores(&series(bars), &ConditionRegistry::default(), 5).unwrap();
        assert_eq!(report.rows.len(), 2);
    }

    #[test]
    fn zero_days_is_invalid() {
        let s = series(vec![bar(0, 10.0, 10.0, 100)]);
        assert!(matches!(
            aggregate_scores(&s, &ConditionRegistry::default(), 0),
            Err(ScanError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn registry_rejects_duplicates() {
        let err = ConditionRegistry::new(vec![
            ConditionFlag::PriceGapDown,
            ConditionFlag::PriceGapDown,
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn registry_groups_by_timeframe() {
        let reg = ConditionRegistry::default();
        assert_eq!(reg.len(), ConditionFlag::ALL.len());
        assert_eq!(
            reg.by_timeframe(Timeframe::DayTrading),
            vec![
                ConditionFlag::PriceGapDown,
                ConditionFlag::PriceChangeAboveThreshold
            ]
        );
        assert_eq!(reg.by_timeframe(Timeframe::ShortTerm).len(), 3);
        assert_eq!(reg.by_timeframe(Timeframe::LongTerm).len(), 4);
    }
}
