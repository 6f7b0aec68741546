//! Sharp single-day downturns followed by a consistent recovery.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::Series;
use chrono::NaiveDate;

pub const DEFAULT_DROP_THRESHOLD: f64 = 0.05;
pub const DEFAULT_RECOVERY_DAYS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct DownturnRecovery {
    pub index: usize,
    pub date: NaiveDate,
    /// Return on the downturn day, e.g. -0.07 for a 7% drop.
    pub drop: f64,
    /// Cumulative return over the recovery run.
    pub recovered: f64,
}

/// Simple daily returns; index 0 and days after a zero close are undefined.
fn daily_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    out.push(None);
    for pair in closes.windows(2) {
        out.push((pair[0] != 0.0).then(|| pair[1] / pair[0] - 1.0));
    }
    out.truncate(closes.len());
    out
}

pub fn find_downturn_recoveries(
    series: &Series,
    drop_threshold: f64,
    recovery_days: usize,
) -> Result<Vec<DownturnRecovery>, ScanError> {
    if drop_threshold.is_nan() || drop_threshold <= 0.0 {
        return Err(ScanError::invalid_parameter(
            "drop_threshold",
            "must be positive",
        ));
    }
    if recovery_days == 0 {
        return Err(ScanError::invalid_parameter(
            "recovery_days",
            "must be positive",
        ));
    }

    let bars = series.bars();
    let returns = daily_returns(&series.closes());
    let mut found = Vec::new();

    for (i, ret) in returns.iter().enumerate() {
        let Some(drop) = *ret else { continue };
        if drop >= -drop_threshold {
            continue;
        }
        let Some(run) = i
            .checked_add(recovery_days)
            .and_then(|end| returns.get(i + 1..=end))
        else {
            break;
        };
        if run.iter().all(|r| r.is_some_and(|v| v > 0.0)) {
            let recovered = bars[i + run.len()].close / bars[i].close - 1.0;
            found.push(DownturnRecovery {
                index: i,
                date: bars[i].date,
                drop,
                recovered,
            });
        }
    }

    Ok(found)
}
