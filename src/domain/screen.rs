//! Latest-bar screen grouped by trading timeframe.
//!
//! Evaluates only the final bar of a series. Undefined indicator values never
//! produce a hit.

use crate::domain::analysis::AnalysisConfig;
use crate::domain::indicator_helpers::IndicatorSet;
use crate::domain::ohlcv::Series;
use crate::domain::scoring::Timeframe;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScreenCheck {
    Momentum,
    Pullback,
    Breakout,
    LowerBandTouch,
    RsiOversold,
    StochasticOversold,
    AboveSma,
    AboveEma,
}

impl ScreenCheck {
    pub fn timeframe(self) -> Timeframe {
        match self {
            ScreenCheck::Momentum
            | ScreenCheck::Pullback
            | ScreenCheck::Breakout
            | ScreenCheck::LowerBandTouch => Timeframe::DayTrading,
            ScreenCheck::RsiOversold | ScreenCheck::StochasticOversold => Timeframe::ShortTerm,
            ScreenCheck::AboveSma | ScreenCheck::AboveEma => Timeframe::LongTerm,
        }
    }
}

impl fmt::Display for ScreenCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenCheck::Momentum => "Momentum",
            ScreenCheck::Pullback => "Pullback",
            ScreenCheck::Breakout => "Breakout",
            ScreenCheck::LowerBandTouch => "Bollinger Bands",
            ScreenCheck::RsiOversold => "Rsi",
            ScreenCheck::StochasticOversold => "Stochastic Oscillator",
            ScreenCheck::AboveSma => "Sma",
            ScreenCheck::AboveEma => "Ema",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenResult {
    pub hits: BTreeMap<Timeframe, Vec<ScreenCheck>>,
}

impl ScreenResult {
    pub fn is_empty(&self) -> bool {
        self.hits.values().all(|v| v.is_empty())
    }

    pub fn contains(&self, check: ScreenCheck) -> bool {
        self.hits
            .get(&check.timeframe())
            .is_some_and(|v| v.contains(&check))
    }
}

impl fmt::Display for ScreenResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (timeframe, checks) in &self.hits {
            if checks.is_empty() {
                continue;
            }
            let names: Vec<String> = checks.iter().map(|c| c.to_string()).collect();
            writeln!(f, "  {}: {}", timeframe, names.join(", "))?;
        }
        Ok(())
    }
}

pub fn screen_latest(
    series: &Series,
    indicators: &IndicatorSet,
    config: &AnalysisConfig,
) -> ScreenResult {
    let mut result = ScreenResult::default();
    let bars = series.bars();
    let Some(last) = bars.len().checked_sub(1) else {
        return result;
    };
    let close = bars[last].close;
    let prev_close = last.checked_sub(1).map(|p| bars[p].close);
    let bands = indicators.bollinger.bands(last);

    let checks = [
        (ScreenCheck::Momentum, prev_close.is_some_and(|p| close > p)),
        (ScreenCheck::Pullback, prev_close.is_some_and(|p| close < p)),
        (
            ScreenCheck::Breakout,
            bands.is_some_and(|(upper, _, _)| close > upper),
        ),
        (
            ScreenCheck::LowerBandTouch,
            bands.is_some_and(|(_, _, lower)| close < lower),
        ),
        (
            ScreenCheck::RsiOversold,
            indicators
                .rsi
                .simple(last)
                .is_some_and(|v| v < config.rsi_oversold),
        ),
        (
            ScreenCheck::StochasticOversold,
            indicators
                .stochastic
                .simple(last)
                .is_some_and(|v| v < config.stochastic_oversold),
        ),
        (
            ScreenCheck::AboveSma,
            indicators.sma.simple(last).is_some_and(|v| close > v),
        ),
        (
            ScreenCheck::AboveEma,
            indicators.ema.simple(last).is_some_and(|v| close > v),
        ),
    ];

    for (check, hit) in checks {
        if hit {
            result.hits.entry(check.timeframe()).or_default().push(check);
        }
    }
    result
}
