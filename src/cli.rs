//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{Analysis, AnalysisConfig, BreakoutMode, analyze_universe};
use crate::domain::config_validation::{parse_date, validate_analysis_config, validate_data_config};
use crate::domain::error::ScanError;
use crate::domain::ohlcv::DateRange;
use crate::domain::universe::{SkipReason, SkippedSymbol, parse_symbols};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_history_port::PriceHistoryPort;

const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Parser, Debug)]
#[command(name = "stockscan", about = "Technical indicator and signal scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze symbols and print signals, scores and the latest screen
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols, overriding [data] symbols
        #[arg(long)]
        symbols: Option<String>,
        /// Directory of <SYMBOL>.csv files, overriding [data] dir
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate the [data] and [analysis] sections of a config file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in a data directory
    ListSymbols {
        #[arg(long)]
        data_dir: PathBuf,
    },
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
/// Logs go to stderr so stdout carries only the report.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Scan {
            config,
            symbols,
            data_dir,
        } => run_scan(&config, symbols.as_deref(), data_dir.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data_dir } => run_list_symbols(&data_dir),
    }
}

fn fail(e: &ScanError) -> ExitCode {
    error!("{e}");
    e.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn run_scan(config_path: &Path, symbols_override: Option<&str>, data_dir: Option<&Path>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_data_config(&config).and_then(|_| validate_analysis_config(&config)) {
        return fail(&e);
    }

    let (analysis_config, range) = match build_analysis_config(&config)
        .and_then(|a| build_date_range(&config).map(|r| (a, r)))
    {
        Ok(v) => v,
        Err(e) => return fail(&e),
    };

    let adapter = CsvPriceAdapter::new(resolve_data_dir(data_dir, &config));
    let symbols = match resolve_symbols(symbols_override, &config, &adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    info!(
        "Scanning {} symbols from {} to {}",
        symbols.len(),
        range.start,
        range.end
    );

    let result = match analyze_universe(&adapter, &symbols, range, &analysis_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    for skipped in &result.skipped {
        warn!("{}", describe_skip(skipped));
    }
    for analysis in &result.analyses {
        print!("{}", render_analysis(analysis));
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_data_config(&config).and_then(|_| validate_analysis_config(&config)) {
        return fail(&e);
    }

    match build_analysis_config(&config) {
        Ok(c) => {
            println!("{:#?}", c);
            info!("Configuration is valid");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_list_symbols(data_dir: &Path) -> ExitCode {
    let adapter = CsvPriceAdapter::new(data_dir.to_path_buf());
    match adapter.list_symbols() {
        Ok(symbols) if symbols.is_empty() => {
            warn!("No symbols found in {}", data_dir.display());
            ExitCode::SUCCESS
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            info!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn get_count(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, ScanError> {
    let value = config.get_int("analysis", key, default as i64);
    usize::try_from(value).map_err(|_| ScanError::ConfigInvalid {
        section: "analysis".into(),
        key: key.into(),
        reason: format!("{} must be non-negative", key),
    })
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, ScanError> {
    let d = AnalysisConfig::default();

    let breakout_mode = match config.get_string("analysis", "breakout_mode") {
        Some(s) => s
            .parse::<BreakoutMode>()
            .map_err(|e| ScanError::ConfigInvalid {
                section: "analysis".into(),
                key: "breakout_mode".into(),
                reason: e.to_string(),
            })?,
        None => d.breakout_mode,
    };

    Ok(AnalysisConfig {
        sma_window: get_count(config, "sma_window", d.sma_window)?,
        ema_window: get_count(config, "ema_window", d.ema_window)?,
        rsi_window: get_count(config, "rsi_window", d.rsi_window)?,
        rsi_oversold: config.get_double("analysis", "rsi_oversold", d.rsi_oversold),
        rsi_overbought: config.get_double("analysis", "rsi_overbought", d.rsi_overbought),
        stochastic_window: get_count(config, "stochastic_window", d.stochastic_window)?,
        stochastic_oversold: config.get_double(
            "analysis",
            "stochastic_oversold",
            d.stochastic_oversold,
        ),
        stochastic_overbought: config.get_double(
            "analysis",
            "stochastic_overbought",
            d.stochastic_overbought,
        ),
        bollinger_window: get_count(config, "bollinger_window", d.bollinger_window)?,
        bollinger_num_stddev: config.get_double(
            "analysis",
            "bollinger_num_stddev",
            d.bollinger_num_stddev,
        ),
        adx_window: get_count(config, "adx_window", d.adx_window)?,
        breakout_mode,
        score_days: get_count(config, "score_days", d.score_days)?,
        recovery_drop_threshold: config.get_double(
            "analysis",
            "recovery_drop_threshold",
            d.recovery_drop_threshold,
        ),
        recovery_days: get_count(config, "recovery_days", d.recovery_days)?,
    })
}

pub fn build_date_range(config: &dyn ConfigPort) -> Result<DateRange, ScanError> {
    let start = parse_date(config.get_string("data", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("data", "end_date").as_deref(), "end_date")?;
    DateRange::new(start, end)
}

pub fn resolve_data_dir(data_dir: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    match data_dir {
        Some(d) => d.to_path_buf(),
        None => config
            .get_string("data", "dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
    }
}

/// Command-line symbols win over `[data] symbols`; with neither, every
/// symbol the provider knows is scanned.
pub fn resolve_symbols(
    symbols_override: Option<&str>,
    config: &dyn ConfigPort,
    port: &dyn PriceHistoryPort,
) -> Result<Vec<String>, ScanError> {
    if let Some(s) = symbols_override {
        return Ok(parse_symbols(s)?);
    }
    if let Some(s) = config.get_string("data", "symbols").filter(|s| !s.trim().is_empty()) {
        return Ok(parse_symbols(&s)?);
    }
    port.list_symbols()
}

fn describe_skip(skipped: &SkippedSymbol) -> String {
    match &skipped.reason {
        SkipReason::NoData => format!("skipping {}: no data in range", skipped.symbol),
        SkipReason::PartialData {
            available_start,
            available_end,
        } => format!(
            "skipping {}: data only covers {} to {}",
            skipped.symbol, available_start, available_end
        ),
        SkipReason::Failed(reason) => format!("skipping {}: {}", skipped.symbol, reason),
    }
}

pub fn render_analysis(analysis: &Analysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", analysis.symbol);

    let latest: Vec<String> = analysis
        .indicators
        .iter()
        .filter_map(|s| {
            let i = s.len().checked_sub(1)?;
            match s.bands(i) {
                Some((upper, middle, lower)) => Some(format!(
                    "{}={:.2}/{:.2}/{:.2}",
                    s.indicator_type, upper, middle, lower
                )),
                None => s
                    .simple(i)
                    .map(|v| format!("{}={:.2}", s.indicator_type, v)),
            }
        })
        .collect();
    if !latest.is_empty() {
        let _ = writeln!(out, "Latest: {}", latest.join("  "));
    }

    let _ = writeln!(out, "Signals ({}):", analysis.signals.len());
    for signal in &analysis.signals {
        let _ = writeln!(out, "  {}", signal);
    }

    let scores = &analysis.scores;
    let _ = writeln!(
        out,
        "Scores (last {} days, max {}):",
        scores.days, scores.max_score
    );
    for row in &scores.rows {
        let active: Vec<String> = row
            .flags
            .iter()
            .filter(|&(_, &on)| on)
            .map(|(flag, _)| flag.to_string())
            .collect();
        let _ = writeln!(out, "  {}  {}  [{}]", row.date, row.score, active.join(", "));
    }

    if analysis.screen.is_empty() {
        let _ = writeln!(out, "Screen: none");
    } else {
        let _ = writeln!(out, "Screen:");
        let _ = write!(out, "{}", analysis.screen);
    }

    if !analysis.recoveries.is_empty() {
        let _ = writeln!(out, "Downturn recoveries:");
        for r in &analysis.recoveries {
            let _ = writeln!(
                out,
                "  {}  {:+.1}% then {:+.1}%",
                r.date,
                r.drop * 100.0,
                r.recovered * 100.0
            );
        }
    }

    out
}
