//! Signal detection over consecutive bars.
//!
//! Every rule compares bar `i` with bar `i - 1`, so nothing fires at index 0.
//! A pair is skipped for a given indicator when either side is undefined.
//! Within one index signals are emitted in the order SMA, EMA, RSI,
//! Stochastic, Bollinger.

use crate::domain::analysis::{AnalysisConfig, BreakoutMode};
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator_helpers::IndicatorSet;
use crate::domain::ohlcv::Series;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalSource {
    Sma,
    Ema,
    Rsi,
    Stochastic,
    BollingerBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalReason {
    CrossAbove,
    CrossBelow,
    OversoldEntry,
    OverboughtEntry,
    UpperBandBreakout,
    LowerBandBreakdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub index: usize,
    pub date: NaiveDate,
    pub kind: SignalKind,
    pub source: SignalSource,
    pub reason: SignalReason,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
        }
    }
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalSource::Sma => write!(f, "SMA"),
            SignalSource::Ema => write!(f, "EMA"),
            SignalSource::Rsi => write!(f, "RSI"),
            SignalSource::Stochastic => write!(f, "STOCHASTIC"),
            SignalSource::BollingerBand => write!(f, "BOLLINGER"),
        }
    }
}

impl fmt::Display for SignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SignalReason::CrossAbove => "close crossed above",
            SignalReason::CrossBelow => "close crossed below",
            SignalReason::OversoldEntry => "entered oversold",
            SignalReason::OverboughtEntry => "entered overbought",
            SignalReason::UpperBandBreakout => "broke above upper band",
            SignalReason::LowerBandBreakdown => "broke below lower band",
        };
        write!(f, "{}", text)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.date, self.kind, self.source, self.reason
        )
    }
}

/// Thresholds the detector compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub oversold: f64,
    pub overbought: f64,
}

/// Value at `i - 1` and `i`, or `None` when either is undefined.
type Pair = (f64, f64);

fn pair(series: &IndicatorSeries, i: usize) -> Option<Pair> {
    Some((series.simple(i - 1)?, series.simple(i)?))
}

/// close/line crossover; `None` when the close did not cross.
fn crossover(close: Pair, line: Pair) -> Option<(SignalKind, SignalReason)> {
    let (prev_close, curr_close) = close;
    let (prev_line, curr_line) = line;
    if curr_close > curr_line && prev_close <= prev_line {
        Some((SignalKind::Buy, SignalReason::CrossAbove))
    } else if curr_close < curr_line && prev_close >= prev_line {
        Some((SignalKind::Sell, SignalReason::CrossBelow))
    } else {
        None
    }
}

/// Oscillator crossing into an oversold or overbought zone.
fn threshold_cross(value: Pair, t: Thresholds) -> Option<(SignalKind, SignalReason)> {
    let (prev, curr) = value;
    if curr < t.oversold && prev >= t.oversold {
        Some((SignalKind::Buy, SignalReason::OversoldEntry))
    } else if curr > t.overbought && prev <= t.overbought {
        Some((SignalKind::Sell, SignalReason::OverboughtEntry))
    } else {
        None
    }
}

fn band_break(
    close: Pair,
    bollinger: &IndicatorSeries,
    i: usize,
    mode: BreakoutMode,
) -> Option<(SignalKind, SignalReason)> {
    let (prev_upper, _, prev_lower) = bollinger.bands(i - 1)?;
    let (upper, _, lower) = bollinger.bands(i)?;
    let (prev_close, curr_close) = close;

    let reason = if curr_close > upper && prev_close <= prev_upper {
        SignalReason::UpperBandBreakout
    } else if curr_close < lower && prev_close >= prev_lower {
        SignalReason::LowerBandBreakdown
    } else {
        return None;
    };

    let kind = match (mode, reason) {
        (BreakoutMode::MeanReversion, SignalReason::UpperBandBreakout) => SignalKind::Sell,
        (BreakoutMode::MeanReversion, _) => SignalKind::Buy,
        (BreakoutMode::Momentum, SignalReason::UpperBandBreakout) => SignalKind::Buy,
        (BreakoutMode::Momentum, _) => SignalKind::Sell,
    };
    Some((kind, reason))
}

pub fn detect_signals(
    series: &Series,
    indicators: &IndicatorSet,
    config: &AnalysisConfig,
) -> Vec<Signal> {
    let bars = series.bars();
    let mut signals = Vec::new();
    if bars.len() < 2 {
        return signals;
    }

    let rsi_thresholds = Thresholds {
        oversold: config.rsi_oversold,
        overbought: config.rsi_overbought,
    };
    let stochastic_thresholds = Thresholds {
        oversold: config.stochastic_oversold,
        overbought: config.stochastic_overbought,
    };

    for i in 1..bars.len() {
        let close = (bars[i - 1].close, bars[i].close);

        let fired = [
            (
                SignalSource::Sma,
                pair(&indicators.sma, i).and_then(|line| crossover(close, line)),
            ),
            (
                SignalSource::Ema,
                pair(&indicators.ema, i).and_then(|line| crossover(close, line)),
            ),
            (
                SignalSource::Rsi,
                pair(&indicators.rsi, i).and_then(|v| threshold_cross(v, rsi_thresholds)),
            ),
            (
                SignalSource::Stochastic,
                pair(&indicators.stochastic, i)
                    .and_then(|v| threshold_cross(v, stochastic_thresholds)),
            ),
            (
                SignalSource::BollingerBand,
                band_break(close, &indicators.bollinger, i, config.breakout_mode),
            ),
        ];

        for (source, hit) in fired {
            if let Some((kind, reason)) = hit {
                signals.push(Signal {
                    index: i,
                    date: bars[i].date,
                    kind,
                    source,
                    reason,
                });
            }
        }
    }

    signals
}
