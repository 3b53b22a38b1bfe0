use common::{
    Error, IndicatorSnapshot, PriceBar, Result, SignalType, StrategyDecision,
    RAW_EMA_SPREAD_PCT, RAW_RSI_DISTANCE,
};

use crate::Strategy;

/// Mean-reversion entries for equities: RSI stretched away from neutral,
/// gated on the EMA spread pointing the same way.
///
/// Diverges from the baseline: both legs must agree before anything fires
/// (there is no single-rule entry), so every BUY/SELL it emits carries the
/// confirmation flag.
pub struct MeanReversionStrategy {
    buy_rsi: f64,
    sell_rsi: f64,
}

impl MeanReversionStrategy {
    pub const DEFAULT_BUY_RSI: f64 = 35.0;
    pub const DEFAULT_SELL_RSI: f64 = 70.0;

    pub fn new(buy_rsi: f64, sell_rsi: f64) -> Result<Self> {
        if !(0.0..=100.0).contains(&buy_rsi) || !(0.0..=100.0).contains(&sell_rsi) {
            return Err(Error::Config(format!(
                "mean_reversion RSI thresholds must be within 0-100, got {buy_rsi}/{sell_rsi}"
            )));
        }
        if buy_rsi >= sell_rsi {
            return Err(Error::Config(format!(
                "mean_reversion buy_rsi ({buy_rsi}) must be below sell_rsi ({sell_rsi})"
            )));
        }
        Ok(Self { buy_rsi, sell_rsi })
    }
}

impl Default for MeanReversionStrategy {
    fn default() -> Self {
        Self {
            buy_rsi: Self::DEFAULT_BUY_RSI,
            sell_rsi: Self::DEFAULT_SELL_RSI,
        }
    }
}

impl Strategy for MeanReversionStrategy {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn rule_version(&self) -> &str {
        "mean-reversion-v1"
    }

    fn evaluate(
        &self,
        _bar: &PriceBar,
        snapshot: &IndicatorSnapshot,
        _previous: Option<&IndicatorSnapshot>,
    ) -> Result<StrategyDecision> {
        let Some(rsi) = snapshot.rsi else {
            return Ok(StrategyDecision::hold("Insufficient history for RSI"));
        };
        let (Some(ema_fast), Some(ema_slow)) = (snapshot.ema_fast, snapshot.ema_slow) else {
            return Ok(StrategyDecision::hold("Insufficient history for EMA trend"));
        };

        let spread = ema_fast - ema_slow;
        let spread_pct = if ema_slow != 0.0 {
            spread / ema_slow * 100.0
        } else {
            0.0
        };

        let mut decision = StrategyDecision {
            signal_type: SignalType::Hold,
            reasoning: Vec::new(),
            raw_inputs: Default::default(),
            confirmed: false,
        };

        if rsi <= self.buy_rsi && spread >= 0.0 {
            decision.signal_type = SignalType::Buy;
            decision.confirmed = true;
            decision
                .reasoning
                .push(format!("RSI {rsi:.1} <= {} (oversold stretch)", self.buy_rsi));
            decision
                .reasoning
                .push("EMA fast above EMA slow (uptrend intact)".into());
        } else if rsi >= self.sell_rsi && spread < 0.0 {
            decision.signal_type = SignalType::Sell;
            decision.confirmed = true;
            decision.reasoning.push(format!(
                "RSI {rsi:.1} >= {} (overbought stretch)",
                self.sell_rsi
            ));
            decision
                .reasoning
                .push("EMA fast below EMA slow (downtrend intact)".into());
        } else {
            decision
                .reasoning
                .push("RSI and EMA spread neutral; holding".into());
        }

        let rsi_distance = match decision.signal_type {
            SignalType::Buy => (50.0 - rsi).max(0.0),
            SignalType::Sell => (rsi - 50.0).max(0.0),
            SignalType::Hold => 0.0,
        };
        decision
            .raw_inputs
            .insert(RAW_RSI_DISTANCE.into(), rsi_distance);
        decision
            .raw_inputs
            .insert(RAW_EMA_SPREAD_PCT.into(), spread_pct);

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::tests::{bar, snapshot};

    #[test]
    fn holds_without_rsi() {
        let strat = MeanReversionStrategy::default();
        let decision = strat
            .evaluate(&bar(100.0), &IndicatorSnapshot::default(), None)
            .unwrap();
        assert_eq!(decision.signal_type, SignalType::Hold);
    }

    #[test]
    fn stretched_rsi_in_uptrend_buys() {
        let strat = MeanReversionStrategy::default();
        let snap = snapshot(Some(30.0), Some(101.0), Some(100.0));
        let decision = strat.evaluate(&bar(100.0), &snap, None).unwrap();
        assert_eq!(decision.signal_type, SignalType::Buy);
        assert!(decision.confirmed);
        assert_eq!(decision.reasoning.len(), 2);
    }

    #[test]
    fn stretched_rsi_against_trend_holds() {
        let strat = MeanReversionStrategy::default();
        let snap = snapshot(Some(30.0), Some(99.0), Some(100.0));
        let decision = strat.evaluate(&bar(100.0), &snap, None).unwrap();
        assert_eq!(decision.signal_type, SignalType::Hold);
    }

    #[test]
    fn overbought_in_downtrend_sells() {
        let strat = MeanReversionStrategy::default();
        let snap = snapshot(Some(75.0), Some(99.0), Some(100.0));
        let decision = strat.evaluate(&bar(100.0), &snap, None).unwrap();
        assert_eq!(decision.signal_type, SignalType::Sell);
        assert!(decision.confirmed);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        assert!(MeanReversionStrategy::new(70.0, 35.0).is_err());
        assert!(MeanReversionStrategy::new(35.0, 70.0).is_ok());
    }
}
