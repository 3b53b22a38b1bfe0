pub mod config;
pub mod indicators;
pub mod registry;
pub mod scorer;
pub mod strategies;

pub use config::{InstrumentConfig, RegistryConfig};
pub use indicators::{compute_indicators, IndicatorConfig};
pub use registry::StrategyRegistry;

use common::{IndicatorSnapshot, PriceBar, Result, StrategyDecision};

/// All strategy implementations must satisfy this trait.
pub trait Strategy: Send + Sync {
    /// Short identifier used in configuration lookups and logs.
    fn name(&self) -> &str;

    /// Version tag stored on every signal this strategy produces; part of
    /// the idempotency key, so bumping it creates a fresh signal row per
    /// bar instead of overwriting the old version's.
    fn rule_version(&self) -> &str;

    /// Classify the market state at one bar.
    ///
    /// Must be pure and deterministic given the same `(bar, snapshot,
    /// previous)` — no I/O, no wall-clock reads, no randomness — so replay
    /// and live evaluation produce identical results for identical inputs.
    /// Undefined indicator fields are a legitimate HOLD trigger, never a
    /// zero substitute.
    fn evaluate(
        &self,
        bar: &PriceBar,
        snapshot: &IndicatorSnapshot,
        previous: Option<&IndicatorSnapshot>,
    ) -> Result<StrategyDecision>;
}
