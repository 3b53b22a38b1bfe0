pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::ema_series;
pub use macd::{macd_series, MacdSeries};
pub use rsi::rsi_series;

use serde::{Deserialize, Serialize};

use common::{Error, IndicatorSnapshot, PriceBar, Result};

/// Indicator periods. The defaults are the classic daily-bar settings; the
/// engine itself makes no assumption about bar granularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub ema_fast_span: usize,
    pub ema_slow_span: usize,
    pub macd_signal_span: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_fast_span: 12,
            ema_slow_span: 26,
            macd_signal_span: 9,
        }
    }
}

/// Compute one indicator snapshot per input bar, same length and order as
/// the input.
///
/// Ordering is validated before any indicator math runs: a timestamp at or
/// before its predecessor fails with `Error::DataOrder`. A series of fewer
/// than two bars yields all-undefined snapshots rather than an error —
/// indicators are best-effort and callers must check for `None`.
pub fn compute_indicators(
    bars: &[PriceBar],
    config: &IndicatorConfig,
) -> Result<Vec<IndicatorSnapshot>> {
    validate_ordering(bars)?;

    if bars.len() < 2 {
        return Ok(vec![IndicatorSnapshot::default(); bars.len()]);
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let rsi = rsi_series(&closes, config.rsi_period);
    let ema_fast = ema_series(&closes, config.ema_fast_span);
    let ema_slow = ema_series(&closes, config.ema_slow_span);
    let macd = macd_series(
        &closes,
        config.ema_fast_span,
        config.ema_slow_span,
        config.macd_signal_span,
    );

    Ok((0..bars.len())
        .map(|i| IndicatorSnapshot {
            rsi: rsi[i],
            ema_fast: Some(ema_fast[i]),
            ema_slow: Some(ema_slow[i]),
            macd: Some(macd.macd[i]),
            macd_signal: Some(macd.signal[i]),
            macd_histogram: Some(macd.histogram[i]),
        })
        .collect())
}

fn validate_ordering(bars: &[PriceBar]) -> Result<()> {
    for pair in bars.windows(2) {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(Error::DataOrder {
                instrument_id: pair[1].instrument_id.clone(),
                timestamp: pair[1].timestamp,
                previous: pair[0].timestamp,
            });
        }
    }
    Ok(())
}
