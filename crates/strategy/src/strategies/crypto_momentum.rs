use common::{
    Error, IndicatorSnapshot, PriceBar, Result, SignalType, StrategyDecision,
    RAW_EMA_SPREAD_PCT, RAW_MACD_HISTOGRAM, RAW_RSI_DISTANCE,
};

use crate::Strategy;

/// Momentum strategy for crypto instruments, emphasizing MACD histogram and
/// EMA trend alignment.
///
/// Diverges from the baseline: RSI thresholds never open a position on
/// their own here — entries require the MACD histogram to clear a threshold
/// while the EMA spread points the same way. RSI only adds context, and
/// marks the decision confirmed when it leaves headroom in the trade
/// direction.
pub struct CryptoMomentumStrategy {
    macd_buy: f64,
    macd_sell: f64,
}

impl CryptoMomentumStrategy {
    pub const DEFAULT_MACD_BUY: f64 = 0.5;
    pub const DEFAULT_MACD_SELL: f64 = -0.5;

    pub fn new(macd_buy: f64, macd_sell: f64) -> Result<Self> {
        if macd_sell >= macd_buy {
            return Err(Error::Config(format!(
                "crypto_momentum macd_sell ({macd_sell}) must be below macd_buy ({macd_buy})"
            )));
        }
        Ok(Self {
            macd_buy,
            macd_sell,
        })
    }
}

impl Default for CryptoMomentumStrategy {
    fn default() -> Self {
        Self {
            macd_buy: Self::DEFAULT_MACD_BUY,
            macd_sell: Self::DEFAULT_MACD_SELL,
        }
    }
}

impl Strategy for CryptoMomentumStrategy {
    fn name(&self) -> &str {
        "crypto_momentum"
    }

    fn rule_version(&self) -> &str {
        "crypto-momentum-v1"
    }

    fn evaluate(
        &self,
        _bar: &PriceBar,
        snapshot: &IndicatorSnapshot,
        _previous: Option<&IndicatorSnapshot>,
    ) -> Result<StrategyDecision> {
        let (Some(macd_hist), Some(ema_fast), Some(ema_slow)) = (
            snapshot.macd_histogram,
            snapshot.ema_fast,
            snapshot.ema_slow,
        ) else {
            return Ok(StrategyDecision::hold("Insufficient history for MACD"));
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

        if macd_hist >= self.macd_buy && spread >= 0.0 {
            decision.signal_type = SignalType::Buy;
            decision.reasoning.push(format!(
                "MACD histogram {macd_hist:.2} >= {}",
                self.macd_buy
            ));
            decision
                .reasoning
                .push("EMA fast above EMA slow (bullish momentum)".into());
            if let Some(rsi) = snapshot.rsi {
                if rsi < 40.0 {
                    decision
                        .reasoning
                        .push(format!("RSI {rsi:.1} still below 40 (room to run)"));
                    decision.confirmed = true;
                }
            }
        } else if macd_hist <= self.macd_sell && spread < 0.0 {
            decision.signal_type = SignalType::Sell;
            decision.reasoning.push(format!(
                "MACD histogram {macd_hist:.2} <= {}",
                self.macd_sell
            ));
            decision
                .reasoning
                .push("EMA fast below EMA slow (bearish momentum)".into());
            if let Some(rsi) = snapshot.rsi {
                if rsi > 60.0 {
                    decision
                        .reasoning
                        .push(format!("RSI {rsi:.1} elevated (selling pressure likely)"));
                    decision.confirmed = true;
                }
            }
        } else {
            decision
                .reasoning
                .push("Momentum neutral; holding position".into());
        }

        let rsi_distance = match (decision.signal_type, snapshot.rsi) {
            (SignalType::Buy, Some(rsi)) => (50.0 - rsi).max(0.0),
            (SignalType::Sell, Some(rsi)) => (rsi - 50.0).max(0.0),
            _ => 0.0,
        };
        decision
            .raw_inputs
            .insert(RAW_RSI_DISTANCE.into(), rsi_distance);
        decision
            .raw_inputs
            .insert(RAW_EMA_SPREAD_PCT.into(), spread_pct);
        decision
            .raw_inputs
            .insert(RAW_MACD_HISTOGRAM.into(), macd_hist);

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::tests::bar;

    fn snap(rsi: Option<f64>, fast: f64, slow: f64, hist: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi,
            ema_fast: Some(fast),
            ema_slow: Some(slow),
            macd: Some(fast - slow),
            macd_signal: Some(fast - slow - hist),
            macd_histogram: Some(hist),
        }
    }

    #[test]
    fn holds_without_macd_history() {
        let strat = CryptoMomentumStrategy::default();
        let decision = strat
            .evaluate(&bar(100.0), &IndicatorSnapshot::default(), None)
            .unwrap();
        assert_eq!(decision.signal_type, SignalType::Hold);
        assert_eq!(decision.reasoning, vec!["Insufficient history for MACD"]);
    }

    #[test]
    fn strong_histogram_with_bullish_spread_buys() {
        let strat = CryptoMomentumStrategy::default();
        let decision = strat
            .evaluate(&bar(100.0), &snap(Some(35.0), 102.0, 100.0, 0.8), None)
            .unwrap();
        assert_eq!(decision.signal_type, SignalType::Buy);
        assert!(decision.confirmed, "RSI below 40 should confirm");
        assert!(decision.reasoning[0].starts_with("MACD histogram"));
    }

    #[test]
    fn strong_histogram_against_spread_holds() {
        // Histogram clears the buy threshold but the EMAs point down
        let strat = CryptoMomentumStrategy::default();
        let decision = strat
            .evaluate(&bar(100.0), &snap(Some(45.0), 99.0, 100.0, 0.8), None)
            .unwrap();
        assert_eq!(decision.signal_type, SignalType::Hold);
    }

    #[test]
    fn bearish_momentum_sells() {
        let strat = CryptoMomentumStrategy::default();
        let decision = strat
            .evaluate(&bar(100.0), &snap(Some(65.0), 98.0, 100.0, -0.9), None)
            .unwrap();
        assert_eq!(decision.signal_type, SignalType::Sell);
        assert!(decision.confirmed, "RSI above 60 should confirm");
    }

    #[test]
    fn weak_histogram_holds() {
        let strat = CryptoMomentumStrategy::default();
        let decision = strat
            .evaluate(&bar(100.0), &snap(Some(50.0), 100.1, 100.0, 0.1), None)
            .unwrap();
        assert_eq!(decision.signal_type, SignalType::Hold);
        assert_eq!(decision.reasoning, vec!["Momentum neutral; holding position"]);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        assert!(CryptoMomentumStrategy::new(-0.5, 0.5).is_err());
        assert!(CryptoMomentumStrategy::new(0.5, -0.5).is_ok());
    }
}
