use common::{BacktestSummary, PriceBar, Result, SignalType};
use strategy::compute_indicators;

use crate::generator::SignalEngine;

/// Long-only position state. SELL signals while flat are ignored — there is
/// no shorting in the replay model.
enum PositionState {
    Flat,
    Long { entry_price: f64 },
}

impl SignalEngine {
    /// Replay the live pipeline over a historical bar series and aggregate
    /// trade statistics. Writes nothing: the summary is returned for the
    /// caller to persist.
    ///
    /// Each bar is evaluated with the previous bar's snapshot as context,
    /// exactly like live evaluation — no lookahead. A BUY while flat opens
    /// a position at the bar's close; a SELL while long closes it at the
    /// bar's close and records one trade with
    /// `return = (exit - entry) / entry * 100`. An unclosed position at the
    /// end of the series is excluded from the statistics, not force-closed.
    /// `total_return` is the simple sum of per-trade returns, not
    /// compounded.
    pub fn replay(
        &self,
        bars: &[PriceBar],
        instrument_id: &str,
        range_label: &str,
    ) -> Result<BacktestSummary> {
        let snapshots = compute_indicators(bars, &self.indicator_config)?;
        let rule_version = self.registry.resolve(instrument_id).rule_version().to_string();

        let mut returns: Vec<f64> = Vec::new();
        let mut state = PositionState::Flat;

        for (i, bar) in bars.iter().enumerate() {
            let previous = i.checked_sub(1).map(|p| &snapshots[p]);
            let (decision, _strength, _) = self.decide(bar, &snapshots[i], previous)?;

            match (decision.signal_type, &state) {
                (SignalType::Buy, PositionState::Flat) => {
                    state = PositionState::Long {
                        entry_price: bar.close,
                    };
                }
                (SignalType::Sell, PositionState::Long { entry_price }) => {
                    if *entry_price != 0.0 {
                        returns.push((bar.close - entry_price) / entry_price * 100.0);
                    }
                    state = PositionState::Flat;
                }
                _ => {}
            }
        }

        Ok(summarize(
            instrument_id,
            range_label,
            rule_version,
            bars,
            &returns,
        ))
    }
}

fn summarize(
    instrument_id: &str,
    range_label: &str,
    rule_version: String,
    bars: &[PriceBar],
    returns: &[f64],
) -> BacktestSummary {
    let trades = returns.len() as u32;
    let wins = returns.iter().filter(|r| **r > 0.0).count();
    let win_rate = if trades == 0 {
        0.0
    } else {
        wins as f64 / trades as f64 * 100.0
    };
    let total_return: f64 = returns.iter().sum();
    let avg_return = if trades == 0 {
        0.0
    } else {
        total_return / trades as f64
    };

    BacktestSummary {
        instrument_id: instrument_id.to_string(),
        range_label: range_label.to_string(),
        start_timestamp: bars.first().map(|b| b.timestamp),
        end_timestamp: bars.last().map(|b| b.timestamp),
        trades,
        win_rate,
        avg_return,
        total_return,
        rule_version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::bars_from_closes;
    use common::{IndicatorSnapshot, Result, StrategyDecision};
    use strategy::{IndicatorConfig, Strategy, StrategyRegistry};

    /// Emits a fixed decision per close price, so tests can script an exact
    /// BUY/SELL/HOLD sequence through real bars.
    struct ScriptedStrategy;

    impl Strategy for ScriptedStrategy {
        fn name(&self) -> &str {
            "scripted"
        }

        fn rule_version(&self) -> &str {
            "scripted-v1"
        }

        fn evaluate(
            &self,
            bar: &PriceBar,
            _snapshot: &IndicatorSnapshot,
            _previous: Option<&IndicatorSnapshot>,
        ) -> Result<StrategyDecision> {
            let mut decision = StrategyDecision::hold("scripted hold");
            if bar.close == 100.0 || bar.close == 105.0 {
                decision.signal_type = SignalType::Buy;
                decision.reasoning = vec!["scripted buy".into()];
            } else if bar.close == 110.0 || bar.close == 95.0 {
                decision.signal_type = SignalType::Sell;
                decision.reasoning = vec!["scripted sell".into()];
            }
            Ok(decision)
        }
    }

    fn scripted_engine() -> SignalEngine {
        let mut registry = StrategyRegistry::new();
        registry.register("TEST", Box::new(ScriptedStrategy));
        SignalEngine::new(registry, IndicatorConfig::default())
    }

    #[test]
    fn pairs_trades_and_excludes_open_position() {
        // BUY @100, HOLD, SELL @110, BUY @105, HOLD:
        // one closed trade (+10%), one open position left uncounted
        let bars = bars_from_closes("TEST", &[100.0, 101.0, 110.0, 105.0, 108.0]);
        let summary = scripted_engine().replay(&bars, "TEST", "test").unwrap();

        assert_eq!(summary.trades, 1);
        assert!((summary.total_return - 10.0).abs() < 1e-9);
        assert!((summary.avg_return - 10.0).abs() < 1e-9);
        assert!((summary.win_rate - 100.0).abs() < 1e-9);
        assert_eq!(summary.rule_version, "scripted-v1");
        assert_eq!(summary.start_timestamp, Some(bars[0].timestamp));
        assert_eq!(summary.end_timestamp, Some(bars[4].timestamp));
    }

    #[test]
    fn sell_while_flat_is_ignored() {
        // SELL @110 arrives before any BUY — no trade must be recorded
        let bars = bars_from_closes("TEST", &[110.0, 101.0, 100.0, 110.0]);
        let summary = scripted_engine().replay(&bars, "TEST", "test").unwrap();
        assert_eq!(summary.trades, 1); // only the 100 → 110 round trip
        assert!((summary.total_return - 10.0).abs() < 1e-9);
    }

    #[test]
    fn losing_trade_counts_against_win_rate() {
        // 100 → 95 (-5%), then 105 → 110 (+4.76%): one win, one loss
        let bars = bars_from_closes("TEST", &[100.0, 95.0, 105.0, 110.0]);
        let summary = scripted_engine().replay(&bars, "TEST", "test").unwrap();
        assert_eq!(summary.trades, 2);
        let loss = (95.0 - 100.0) / 100.0 * 100.0;
        let win = (110.0 - 105.0) / 105.0 * 100.0;
        assert!((summary.total_return - (loss + win)).abs() < 1e-9);
        assert!((summary.avg_return - (loss + win) / 2.0).abs() < 1e-9);
        assert!((summary.win_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn no_trades_yields_zeroed_summary() {
        let bars = bars_from_closes("TEST", &[101.0, 102.0, 103.0]);
        let summary = scripted_engine().replay(&bars, "TEST", "quiet").unwrap();
        assert_eq!(summary.trades, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.avg_return, 0.0);
        assert_eq!(summary.total_return, 0.0);
    }

    #[test]
    fn empty_range_yields_empty_summary() {
        let summary = scripted_engine().replay(&[], "TEST", "empty").unwrap();
        assert_eq!(summary.trades, 0);
        assert_eq!(summary.start_timestamp, None);
        assert_eq!(summary.end_timestamp, None);
    }
}
