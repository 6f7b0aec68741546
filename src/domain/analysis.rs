//! Per-instrument analysis pipeline and its parameters.
//!
//! [`analyze`] runs indicators, signals, scores, the latest-bar screen and the
//! recovery scan over one series. [`analyze_universe`] fans that out across a
//! symbol list with rayon.

use crate::domain::error::{ScanError, require_window};
use crate::domain::indicator_helpers::{IndicatorSet, compute_indicators};
use crate::domain::ohlcv::{DateRange, Series};
use crate::domain::recovery::{
    DEFAULT_DROP_THRESHOLD, DEFAULT_RECOVERY_DAYS, DownturnRecovery, find_downturn_recoveries,
};
use crate::domain::scoring::{ConditionRegistry, ScoreReport, aggregate_scores};
use crate::domain::screen::{ScreenResult, screen_latest};
use crate::domain::signal::{Signal, detect_signals};
use crate::domain::universe::{SkippedSymbol, load_universe};
use crate::ports::price_history_port::PriceHistoryPort;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// How a close crossing a Bollinger band is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakoutMode {
    /// Crossing above the upper band sells, crossing below the lower band buys.
    #[default]
    MeanReversion,
    /// Crossing above the upper band buys, crossing below the lower band sells.
    Momentum,
}

impl FromStr for BreakoutMode {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean_reversion" => Ok(BreakoutMode::MeanReversion),
            "momentum" => Ok(BreakoutMode::Momentum),
            other => Err(ScanError::invalid_parameter(
                "breakout_mode",
                format!("unknown mode '{}' (expected mean_reversion or momentum)", other),
            )),
        }
    }
}

impl fmt::Display for BreakoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakoutMode::MeanReversion => write!(f, "mean_reversion"),
            BreakoutMode::Momentum => write!(f, "momentum"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub sma_window: usize,
    pub ema_window: usize,
    pub rsi_window: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub stochastic_window: usize,
    pub stochastic_oversold: f64,
    pub stochastic_overbought: f64,
    pub bollinger_window: usize,
    pub bollinger_num_stddev: f64,
    pub adx_window: usize,
    pub breakout_mode: BreakoutMode,
    pub score_days: usize,
    pub recovery_drop_threshold: f64,
    pub recovery_days: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sma_window: 20,
            ema_window: 20,
            rsi_window: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            stochastic_window: 14,
            stochastic_oversold: 20.0,
            stochastic_overbought: 80.0,
            bollinger_window: 20,
            bollinger_num_stddev: 2.0,
            adx_window: 14,
            breakout_mode: BreakoutMode::MeanReversion,
            score_days: 5,
            recovery_drop_threshold: DEFAULT_DROP_THRESHOLD,
            recovery_days: DEFAULT_RECOVERY_DAYS,
        }
    }
}

impl AnalysisConfig {
    /// Rejects parameters no indicator or detector can run with.
    pub fn validate(&self) -> Result<(), ScanError> {
        for (name, window) in [
            ("sma_window", self.sma_window),
            ("ema_window", self.ema_window),
            ("rsi_window", self.rsi_window),
            ("stochastic_window", self.stochastic_window),
            ("bollinger_window", self.bollinger_window),
            ("adx_window", self.adx_window),
            ("score_days", self.score_days),
            ("recovery_days", self.recovery_days),
        ] {
            require_window(name, window)?;
        }
        check_thresholds(
            ("rsi_oversold", self.rsi_oversold),
            ("rsi_overbought", self.rsi_overbought),
        )?;
        check_thresholds(
            ("stochastic_oversold", self.stochastic_oversold),
            ("stochastic_overbought", self.stochastic_overbought),
        )?;
        if !(self.bollinger_num_stddev >= 0.0 && self.bollinger_num_stddev.is_finite()) {
            return Err(ScanError::invalid_parameter(
                "bollinger_num_stddev",
                "must be non-negative",
            ));
        }
        if !(self.recovery_drop_threshold > 0.0 && self.recovery_drop_threshold.is_finite()) {
            return Err(ScanError::invalid_parameter(
                "recovery_drop_threshold",
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// Both levels must lie in [0, 100] with oversold strictly below overbought.
pub fn check_thresholds(
    (oversold_name, oversold): (&str, f64),
    (overbought_name, overbought): (&str, f64),
) -> Result<(), ScanError> {
    for (name, value) in [(oversold_name, oversold), (overbought_name, overbought)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(ScanError::invalid_parameter(name, "must be between 0 and 100"));
        }
    }
    if oversold >= overbought {
        return Err(ScanError::invalid_parameter(
            oversold_name,
            format!("must be below {}", overbought_name),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub symbol: String,
    pub indicators: IndicatorSet,
    pub signals: Vec<Signal>,
    pub scores: ScoreReport,
    pub screen: ScreenResult,
    pub recoveries: Vec<DownturnRecovery>,
}

pub fn analyze(series: &Series, config: &AnalysisConfig) -> Result<Analysis, ScanError> {
    config.validate()?;
    let indicators = compute_indicators(series, config)?;
    let signals = detect_signals(series, &indicators, config);
    let scores = aggregate_scores(series, &ConditionRegistry::default(), config.score_days)?;
    let screen = screen_latest(series, &indicators, config);
    let recoveries =
        find_downturn_recoveries(series, config.recovery_drop_threshold, config.recovery_days)?;

    debug!(
        symbol = series.symbol(),
        bars = series.len(),
        signals = signals.len(),
        recoveries = recoveries.len(),
        "analyzed series"
    );

    Ok(Analysis {
        symbol: series.symbol().to_string(),
        indicators,
        signals,
        scores,
        screen,
        recoveries,
    })
}

#[derive(Debug)]
pub struct UniverseAnalysis {
    pub analyses: Vec<Analysis>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Fetches every symbol, then analyzes the loaded series in parallel.
///
/// Results keep the order of `symbols`. Symbols the provider cannot serve
/// are reported in `skipped`; an invalid `config` fails the whole call.
pub fn analyze_universe(
    port: &dyn PriceHistoryPort,
    symbols: &[String],
    range: DateRange,
    config: &AnalysisConfig,
) -> Result<UniverseAnalysis, ScanError> {
    config.validate()?;
    let universe = load_universe(port, symbols, range)?;

    let analyses = universe
        .series
        .par_iter()
        .map(|series| analyze(series, config))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        analyzed = analyses.len(),
        skipped = universe.skipped.len(),
        "universe analysis complete"
    );

    Ok(UniverseAnalysis {
        analyses,
        skipped: universe.skipped,
    })
}
