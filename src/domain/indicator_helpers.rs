//! Computes the full set of configured indicators for one series.

use crate::domain::analysis::AnalysisConfig;
use crate::domain::error::ScanError;
use crate::domain::indicator::adx::calculate_adx;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stddev::calculate_stddev;
use crate::domain::indicator::stochastic::calculate_stochastic;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Series;

/// Every indicator the signal detector and screener read, plus the volatility
/// and trend-strength series reported alongside them. Each is aligned with
/// the source series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub sma: IndicatorSeries,
    pub ema: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub stochastic: IndicatorSeries,
    pub bollinger: IndicatorSeries,
    pub stddev: IndicatorSeries,
    pub atr: IndicatorSeries,
    pub adx: IndicatorSeries,
}

impl IndicatorSet {
    pub fn get(&self, indicator_type: &IndicatorType) -> Option<&IndicatorSeries> {
        self.iter().find(|s| &s.indicator_type == indicator_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorSeries> {
        [
            &self.sma,
            &self.ema,
            &self.rsi,
            &self.stochastic,
            &self.bollinger,
            &self.stddev,
            &self.atr,
            &self.adx,
        ]
        .into_iter()
    }
}

pub fn compute_indicators(
    series: &Series,
    config: &AnalysisConfig,
) -> Result<IndicatorSet, ScanError> {
    let bars = series.bars();
    Ok(IndicatorSet {
        sma: calculate_sma(bars, config.sma_window)?,
        ema: calculate_ema(bars, config.ema_window)?,
        rsi: calculate_rsi(bars, config.rsi_window)?,
        stochastic: calculate_stochastic(bars, config.stochastic_window)?,
        bollinger: calculate_bollinger(
            bars,
            config.bollinger_window,
            config.bollinger_num_stddev,
        )?,
        stddev: calculate_stddev(bars, config.bollinger_window)?,
        atr: calculate_atr(bars, config.adx_window)?,
        adx: calculate_adx(bars, config.adx_window)?,
    })
}
