//! OHLCV bar and price series representation.

use crate::domain::error::ScanError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Inclusive calendar range used when requesting price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScanError> {
        if start > end {
            return Err(ScanError::invalid_parameter(
                "date_range",
                format!("start {} is after end {}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// An immutable, strictly date-ordered sequence of bars for one symbol.
///
/// Indices are dense: bar `i` is the `i`-th sample regardless of calendar
/// gaps between trading days.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, ScanError> {
        for (i, bar) in bars.iter().enumerate() {
            if bar.volume < 0 {
                return Err(ScanError::InvalidSeries {
                    reason: format!("negative volume {} on {}", bar.volume, bar.date),
                });
            }
            if ![bar.open, bar.high, bar.low, bar.close].iter().all(|p| p.is_finite()) {
                return Err(ScanError::InvalidSeries {
                    reason: format!("non-finite price on {}", bar.date),
                });
            }
            if bar.high < bar.low {
                return Err(ScanError::InvalidSeries {
                    reason: format!("high {} below low {} on {}", bar.high, bar.low, bar.date),
                });
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(ScanError::InvalidSeries {
                    reason: format!(
                        "dates not strictly increasing: {} followed by {}",
                        bars[i - 1].date,
                        bar.date
                    ),
                });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }
}
