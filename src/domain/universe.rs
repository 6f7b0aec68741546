//! Symbol universe for multi-instrument scans.
//!
//! Parses symbol lists from configuration and fetches each symbol's history,
//! recording the symbols that could not be loaded instead of aborting.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::{DateRange, Series};
use crate::ports::price_history_port::PriceHistoryPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("all symbols failed to load")]
    AllSymbolsFailed,
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    PartialData {
        available_start: NaiveDate,
        available_end: NaiveDate,
    },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct LoadedUniverse {
    pub series: Vec<Series>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Fetches every symbol; provider errors are kept per symbol, unmodified in
/// kind, and never retried.
pub fn load_universe(
    port: &dyn PriceHistoryPort,
    symbols: &[String],
    range: DateRange,
) -> Result<LoadedUniverse, ScanError> {
    let mut series = Vec::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        match port.fetch_history(symbol, range) {
            Ok(s) => {
                debug!(symbol = %symbol, bars = s.len(), "loaded price history");
                series.push(s);
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "skipping symbol");
                let reason = match e {
                    ScanError::DataUnavailable { .. } => SkipReason::NoData,
                    ScanError::PartialData {
                        available_start,
                        available_end,
                        ..
                    } => SkipReason::PartialData {
                        available_start,
                        available_end,
                    },
                    other => SkipReason::Failed(other.to_string()),
                };
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                });
            }
        }
    }

    if series.is_empty() {
        return Err(UniverseError::AllSymbolsFailed.into());
    }

    if !skipped.is_empty() {
        info!(
            loaded = series.len(),
            requested = symbols.len(),
            "scanning partial universe"
        );
    }

    Ok(LoadedUniverse { series, skipped })
}
