//! Price history provider port.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::{DateRange, Series};

/// Source of daily OHLCV history.
///
/// `Sync` so a single provider can be shared by parallel scans.
pub trait PriceHistoryPort: Sync {
    /// Bars for `symbol` within `range`, inclusive.
    ///
    /// Fails with [`ScanError::DataUnavailable`] when nothing is stored for
    /// the symbol in that range, and [`ScanError::PartialData`] when the
    /// stored history only partly covers it.
    fn fetch_history(&self, symbol: &str, range: DateRange) -> Result<Series, ScanError>;

    fn list_symbols(&self) -> Result<Vec<String>, ScanError>;
}
