//! Domain error types.

use crate::domain::universe::UniverseError;
use chrono::NaiveDate;

/// Top-level error type for stockscan.
///
/// Insufficient history is never reported here: indicators mark warmup
/// positions as undefined instead.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("invalid series: {reason}")]
    InvalidSeries { reason: String },

    #[error("no price history for {symbol}")]
    DataUnavailable { symbol: String },

    #[error(
        "partial price history for {symbol}: requested {requested_start}..{requested_end}, available {available_start}..{available_end}"
    )]
    PartialData {
        symbol: String,
        requested_start: NaiveDate,
        requested_end: NaiveDate,
        available_start: NaiveDate,
        available_end: NaiveDate,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        ScanError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Rejects a zero window, the only window value that is a caller error.
pub fn require_window(name: &str, window: usize) -> Result<(), ScanError> {
    if window == 0 {
        return Err(ScanError::invalid_parameter(name, "window must be positive"));
    }
    Ok(())
}

impl From<&ScanError> for std::process::ExitCode {
    fn from(err: &ScanError) -> Self {
        let code: u8 = match err {
            ScanError::Io(_) => 1,
            ScanError::ConfigParse { .. }
            | ScanError::ConfigMissing { .. }
            | ScanError::ConfigInvalid { .. } => 2,
            ScanError::InvalidParameter { .. } | ScanError::InvalidSeries { .. } => 3,
            ScanError::DataUnavailable { .. }
            | ScanError::PartialData { .. }
            | ScanError::Data { .. } => 4,
            ScanError::Universe(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
