use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{BacktestSummary, PriceBar, Result, Signal, WriteResult};

/// Inbound collaborator supplying ordered bar series.
///
/// Implementations must return bars deduplicated and sorted ascending by
/// timestamp. The engine re-validates ordering anyway and fails with
/// `Error::DataOrder` on violation rather than reordering.
#[async_trait]
pub trait BarSource: Send + Sync {
    /// The most recent `limit` bars for an instrument, oldest first.
    async fn recent_bars(&self, instrument_id: &str, limit: u32) -> Result<Vec<PriceBar>>;

    /// All bars for an instrument within [start, end], oldest first.
    async fn bars_between(
        &self,
        instrument_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>>;
}

/// Outbound collaborator persisting signals and backtest summaries.
///
/// Upserts are keyed on the signal's idempotency key; a key conflict is the
/// expected, handled case and must never surface as an error. Only a real
/// storage failure is returned to the caller.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Fetch a stored signal by idempotency key, if any.
    async fn fetch_signal(&self, idempotency_key: &str) -> Result<Option<Signal>>;

    /// Insert or overwrite-in-place the signal for its idempotency key.
    async fn upsert_signal(&self, signal: &Signal) -> Result<WriteResult>;

    /// Replace the summary for (instrument, range_label, rule_version)
    /// wholesale.
    async fn replace_backtest(&self, summary: &BacktestSummary) -> Result<()>;
}
