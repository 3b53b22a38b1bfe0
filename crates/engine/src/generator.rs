use common::{Error, IndicatorSnapshot, PriceBar, Result, Signal, StrategyDecision};
use strategy::{compute_indicators, scorer, IndicatorConfig, StrategyRegistry};

/// The live evaluation pipeline: indicators → strategy → scorer.
///
/// Stateless per invocation — all inputs arrive as arguments and nothing is
/// cached between calls, so evaluations for different instruments can run
/// concurrently without coordination.
pub struct SignalEngine {
    pub(crate) registry: StrategyRegistry,
    pub(crate) indicator_config: IndicatorConfig,
}

impl SignalEngine {
    pub fn new(registry: StrategyRegistry, indicator_config: IndicatorConfig) -> Self {
        Self {
            registry,
            indicator_config,
        }
    }

    /// Evaluate the strategy at the latest bar of an ordered series and
    /// return a fully-constructed signal, ready for the writer.
    ///
    /// Returns `None` for an empty series. Out-of-order input fails with
    /// `Error::DataOrder` before any indicator is computed; a strategy
    /// failure surfaces as `Error::StrategyEvaluation` with enough context
    /// to diagnose without re-deriving state.
    pub fn evaluate_latest(&self, bars: &[PriceBar]) -> Result<Option<Signal>> {
        let snapshots = compute_indicators(bars, &self.indicator_config)?;
        let Some(bar) = bars.last() else {
            return Ok(None);
        };

        let index = bars.len() - 1;
        let previous = index.checked_sub(1).map(|i| &snapshots[i]);
        let (decision, strength, rule_version) = self.decide(bar, &snapshots[index], previous)?;

        Ok(Some(Signal::from_decision(
            bar,
            decision,
            strength,
            rule_version,
        )))
    }

    /// Resolve, evaluate, and score one bar. Shared between live evaluation
    /// and replay so both paths stay identical.
    pub(crate) fn decide(
        &self,
        bar: &PriceBar,
        snapshot: &IndicatorSnapshot,
        previous: Option<&IndicatorSnapshot>,
    ) -> Result<(StrategyDecision, u8, String)> {
        let strat = self.registry.resolve(&bar.instrument_id);
        let decision = strat.evaluate(bar, snapshot, previous).map_err(|e| {
            Error::StrategyEvaluation {
                instrument_id: bar.instrument_id.clone(),
                timestamp: bar.timestamp,
                rule_version: strat.rule_version().to_string(),
                message: e.to_string(),
            }
        })?;
        let strength = scorer::score(&decision);
        Ok((decision, strength, strat.rule_version().to_string()))
    }
}
