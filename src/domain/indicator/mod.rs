//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values aligned with its input
//!
//! Every calculator returns one point per input bar. Points inside the warmup
//! window carry `None`, never a placeholder number.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

impl IndicatorPoint {
    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger { upper: f64, middle: f64, lower: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Stochastic(usize),
    Stddev(usize),
    Atr(usize),
    Adx(usize),
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Builds a series by pairing each bar's date with the matching value.
    pub(crate) fn from_values(
        indicator_type: IndicatorType,
        bars: &[OhlcvBar],
        values: Vec<Option<IndicatorValue>>,
    ) -> Self {
        debug_assert_eq!(bars.len(), values.len());
        let values = bars
            .iter()
            .zip(values)
            .map(|(bar, value)| IndicatorPoint {
                date: bar.date,
                value,
            })
            .collect();
        Self {
            indicator_type,
            values,
        }
    }

    pub(crate) fn from_simple(
        indicator_type: IndicatorType,
        bars: &[OhlcvBar],
        values: Vec<Option<f64>>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.map(IndicatorValue::Simple))
            .collect();
        Self::from_values(indicator_type, bars, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Scalar value at `index`, or `None` when undefined or out of range.
    pub fn simple(&self, index: usize) -> Option<f64> {
        match self.values.get(index)?.value? {
            IndicatorValue::Simple(v) => Some(v),
            IndicatorValue::Bollinger { middle, .. } => Some(middle),
        }
    }

    /// `(upper, middle, lower)` at `index` for band-shaped series.
    pub fn bands(&self, index: usize) -> Option<(f64, f64, f64)> {
        match self.values.get(index)?.value? {
            IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            } => Some((upper, middle, lower)),
            IndicatorValue::Simple(_) => None,
        }
    }

    /// Number of leading undefined points.
    pub fn warmup_len(&self) -> usize {
        self.values.iter().take_while(|p| !p.is_defined()).count()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stochastic(period) => write!(f, "STOCHASTIC({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
