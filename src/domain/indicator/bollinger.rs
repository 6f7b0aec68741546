//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::error::{require_window, ScanError};
use crate::domain::indicator::rolling::sma_values;
use crate::domain::indicator::stddev::stddev_values;
use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    num_stddev: f64,
) -> Result<IndicatorSeries, ScanError> {
    require_window("bollinger_window", period)?;
    if !num_stddev.is_finite() || num_stddev < 0.0 {
        return Err(ScanError::invalid_parameter(
            "bollinger_num_stddev",
            format!("must be a finite non-negative number, got {}", num_stddev),
        ));
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = sma_values(&closes, period)
        .into_iter()
        .zip(stddev_values(&closes, period))
        .map(|(middle, stddev)| {
            let middle = middle?;
            let offset = num_stddev * stddev?;
            Some(IndicatorValue::Bollinger {
                upper: middle + offset,
                middle,
                lower: middle - offset,
            })
        })
        .collect();

    Ok(IndicatorSeries::from_values(
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100: (num_stddev * 100.0).round() as u32,
        },
        bars,
        values,
    ))
}
