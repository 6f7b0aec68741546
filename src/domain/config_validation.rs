//! Configuration validation.
//!
//! Validates the `[analysis]` and `[data]` sections before a scan runs.
//! Missing analysis keys fall back to [`AnalysisConfig::default`].

use crate::domain::analysis::{AnalysisConfig, BreakoutMode, check_thresholds};
use crate::domain::error::ScanError;
use crate::domain::universe::parse_symbols;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

const ANALYSIS: &str = "analysis";
const DATA: &str = "data";

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ScanError {
    ScanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), ScanError> {
    validate_windows(config)?;
    let d = AnalysisConfig::default();
    validate_thresholds(
        config,
        ("rsi_oversold", d.rsi_oversold),
        ("rsi_overbought", d.rsi_overbought),
    )?;
    validate_thresholds(
        config,
        ("stochastic_oversold", d.stochastic_oversold),
        ("stochastic_overbought", d.stochastic_overbought),
    )?;
    validate_num_stddev(config)?;
    validate_recovery(config)?;
    validate_breakout_mode(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let start_date = parse_date(config.get_string(DATA, "start_date").as_deref(), "start_date")?;
    let end_date = parse_date(config.get_string(DATA, "end_date").as_deref(), "end_date")?;

    if start_date > end_date {
        return Err(invalid(
            DATA,
            "start_date",
            "start_date must not be after end_date",
        ));
    }

    if let Some(symbols) = config.get_string(DATA, "symbols") {
        parse_symbols(&symbols).map_err(|e| invalid(DATA, "symbols", e.to_string()))?;
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let d = AnalysisConfig::default();
    let windows = [
        ("sma_window", d.sma_window),
        ("ema_window", d.ema_window),
        ("rsi_window", d.rsi_window),
        ("stochastic_window", d.stochastic_window),
        ("bollinger_window", d.bollinger_window),
        ("adx_window", d.adx_window),
        ("score_days", d.score_days),
    ];

    for (key, default) in windows {
        if config.get_int(ANALYSIS, key, default as i64) < 1 {
            return Err(invalid(ANALYSIS, key, format!("{} must be positive", key)));
        }
    }
    Ok(())
}

fn validate_thresholds(
    config: &dyn ConfigPort,
    (oversold_key, oversold_default): (&str, f64),
    (overbought_key, overbought_default): (&str, f64),
) -> Result<(), ScanError> {
    let oversold = config.get_double(ANALYSIS, oversold_key, oversold_default);
    let overbought = config.get_double(ANALYSIS, overbought_key, overbought_default);

    check_thresholds((oversold_key, oversold), (overbought_key, overbought)).map_err(|e| match e {
        ScanError::InvalidParameter { name, reason } => {
            invalid(ANALYSIS, &name, format!("{} {}", name, reason))
        }
        other => other,
    })
}

fn validate_num_stddev(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let default = AnalysisConfig::default().bollinger_num_stddev;
    let value = config.get_double(ANALYSIS, "bollinger_num_stddev", default);
    if !(value >= 0.0 && value.is_finite()) {
        return Err(invalid(
            ANALYSIS,
            "bollinger_num_stddev",
            "bollinger_num_stddev must be non-negative",
        ));
    }
    Ok(())
}

fn validate_recovery(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let d = AnalysisConfig::default();
    let threshold = config.get_double(ANALYSIS, "recovery_drop_threshold", d.recovery_drop_threshold);
    if !(threshold > 0.0 && threshold.is_finite()) {
        return Err(invalid(
            ANALYSIS,
            "recovery_drop_threshold",
            "recovery_drop_threshold must be positive",
        ));
    }
    if config.get_int(ANALYSIS, "recovery_days", d.recovery_days as i64) < 1 {
        return Err(invalid(
            ANALYSIS,
            "recovery_days",
            "recovery_days must be positive",
        ));
    }
    Ok(())
}

fn validate_breakout_mode(config: &dyn ConfigPort) -> Result<(), ScanError> {
    if let Some(mode) = config.get_string(ANALYSIS, "breakout_mode") {
        mode.parse::<BreakoutMode>()
            .map_err(|_| invalid(ANALYSIS, "breakout_mode", "expected mean_reversion or momentum"))?;
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, ScanError> {
    match value {
        None => Err(ScanError::ConfigMissing {
            section: DATA.to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                DATA,
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}
