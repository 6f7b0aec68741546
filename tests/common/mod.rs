#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use stockscan::domain::error::ScanError;
pub use stockscan::domain::ohlcv::{DateRange, OhlcvBar, Series};
use stockscan::ports::price_history_port::PriceHistoryPort;
use std::collections::BTreeMap;

pub enum MockFailure {
    Unavailable,
    Partial,
    Data(String),
}

pub struct MockPriceHistory {
    pub data: BTreeMap<String, Vec<OhlcvBar>>,
    pub failures: BTreeMap<String, MockFailure>,
}

impl MockPriceHistory {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            failures: BTreeMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_failure(mut self, symbol: &str, failure: MockFailure) -> Self {
        self.failures.insert(symbol.to_string(), failure);
        self
    }
}

impl PriceHistoryPort for MockPriceHistory {
    fn fetch_history(&self, symbol: &str, range: DateRange) -> Result<Series, ScanError> {
        match self.failures.get(symbol) {
            Some(MockFailure::Unavailable) => {
                return Err(ScanError::DataUnavailable {
                    symbol: symbol.to_string(),
                });
            }
            Some(MockFailure::Partial) => {
                return Err(ScanError::PartialData {
                    symbol: symbol.to_string(),
                    requested_start: range.start,
                    requested_end: range.end,
                    available_start: range.start + Duration::days(30),
                    available_end: range.end,
                });
            }
            Some(MockFailure::Data(reason)) => {
                return Err(ScanError::Data {
                    reason: reason.clone(),
                });
            }
            None => {}
        }

        let bars: Vec<OhlcvBar> = self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| range.contains(b.date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if bars.is_empty() {
            return Err(ScanError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        }
        Series::new(symbol, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScanError> {
        Ok(self.data.keys().cloned().collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64) -> OhlcvBar {
    OhlcvBar {
        date,
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

/// Consecutive daily bars starting at 2024-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(start + Duration::days(i as i64), c))
        .collect()
}

pub fn series_from_closes(symbol: &str, closes: &[f64]) -> Series {
    Series::new(symbol, bars_from_closes(closes)).unwrap()
}

/// Deterministic oscillating price path.
pub fn wave(n: usize, base: f64, amplitude: f64) -> Vec<f64> {
    (0..n)
        .map(|i| base + (i as f64 * 0.3).sin() * amplitude + i as f64 * 0.05)
        .collect()
}

pub fn full_range() -> DateRange {
    DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap()
}
