use std::sync::Arc;

use tracing::debug;

use common::{Result, Signal, SignalStore, WriteResult};

/// Persists fully-constructed signals through the signal store.
///
/// Re-running the engine for the same (instrument, bar, rule version) is
/// safe: the store upserts on the idempotency key, so a scheduler retry or
/// a manual replay-and-promote overwrites the existing row in place instead
/// of duplicating it. A key conflict never surfaces as an error — only a
/// storage outage does, and that is propagated as-is without retrying.
pub struct SignalWriter {
    store: Arc<dyn SignalStore>,
}

impl SignalWriter {
    pub fn new(store: Arc<dyn SignalStore>) -> Self {
        Self { store }
    }

    pub async fn write(&self, signal: &Signal) -> Result<WriteResult> {
        let result = self.store.upsert_signal(signal).await?;
        debug!(
            instrument = %signal.instrument_id,
            key = %signal.idempotency_key(),
            outcome = %result,
            "Signal written"
        );
        Ok(result)
    }
}
