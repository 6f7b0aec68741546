//! CSV file price history adapter.
//!
//! One `<SYMBOL>.csv` per symbol with header `date,open,high,low,close,volume`.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::{DateRange, OhlcvBar, Series};
use crate::ports::price_history_port::PriceHistoryPort;
use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use std::fmt::Display;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Weekdays a file may miss at either edge of the requested range before
/// the history counts as partial. Covers market holidays next to a weekend.
const EDGE_HOLIDAY_ALLOWANCE: usize = 2;

fn missing_weekdays(days: impl Iterator<Item = NaiveDate>) -> usize {
    days.filter(|d| d.weekday().number_from_monday() <= 5).count()
}

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

fn field<T>(record: &StringRecord, idx: usize, name: &str) -> Result<T, ScanError>
where
    T: FromStr,
    T::Err: Display,
{
    record
        .get(idx)
        .ok_or_else(|| ScanError::Data {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| ScanError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn parse_record(record: &StringRecord) -> Result<OhlcvBar, ScanError> {
    let date_str: String = field(record, 0, "date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| ScanError::Data {
        reason: format!("invalid date format: {}", e),
    })?;

    Ok(OhlcvBar {
        date,
        open: field(record, 1, "open")?,
        high: field(record, 2, "high")?,
        low: field(record, 3, "low")?,
        close: field(record, 4, "close")?,
        volume: field(record, 5, "volume")?,
    })
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, ScanError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ScanError::DataUnavailable {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| ScanError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            bars.push(parse_record(&record)?);
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl PriceHistoryPort for CsvPriceAdapter {
    fn fetch_history(&self, symbol: &str, range: DateRange) -> Result<Series, ScanError> {
        let all = self.read_all(symbol)?;
        let (Some(first), Some(last)) = (all.first(), all.last()) else {
            return Err(ScanError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        };
        let (available_start, available_end) = (first.date, last.date);

        let bars: Vec<OhlcvBar> = all.into_iter().filter(|b| range.contains(b.date)).collect();
        if bars.is_empty() {
            return Err(ScanError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        }

        let lead = missing_weekdays(range.start.iter_days().take_while(|d| *d < available_start));
        let tail = missing_weekdays(
            available_end
                .iter_days()
                .skip(1)
                .take_while(|d| *d <= range.end),
        );
        if lead > EDGE_HOLIDAY_ALLOWANCE || tail > EDGE_HOLIDAY_ALLOWANCE {
            return Err(ScanError::PartialData {
                symbol: symbol.to_string(),
                requested_start: range.start,
                requested_end: range.end,
                available_start,
                available_end,
            });
        }

        debug!(symbol, bars = bars.len(), "read CSV history");
        Series::new(symbol, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScanError> {
        let entries = fs::read_dir(&self.base_path)?;

        let mut symbols = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
