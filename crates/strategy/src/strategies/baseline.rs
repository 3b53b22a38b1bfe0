use common::{
    Error, IndicatorSnapshot, PriceBar, Result, SignalType, StrategyDecision,
    RAW_EMA_SPREAD_PCT, RAW_RSI_DISTANCE,
};

use crate::Strategy;

/// Reference strategy used when no instrument or asset-class assignment is
/// configured.
///
/// RSI thresholds drive the primary classification; an EMA fast/slow
/// crossover on the current bar either opens a position on its own or
/// confirms the RSI direction. When both rules agree the decision carries
/// the confirmation flag the scorer rewards. A crossover that contradicts
/// the RSI direction is ignored.
pub struct BaselineStrategy {
    oversold: f64,
    overbought: f64,
}

impl BaselineStrategy {
    pub const DEFAULT_OVERSOLD: f64 = 30.0;
    pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

    pub fn new(oversold: f64, overbought: f64) -> Result<Self> {
        if !(0.0..=100.0).contains(&oversold) || !(0.0..=100.0).contains(&overbought) {
            return Err(Error::Config(format!(
                "baseline RSI thresholds must be within 0-100, got {oversold}/{overbought}"
            )));
        }
        if oversold >= overbought {
            return Err(Error::Config(format!(
                "baseline oversold threshold ({oversold}) must be below overbought ({overbought})"
            )));
        }
        Ok(Self {
            oversold,
            overbought,
        })
    }
}

impl Default for BaselineStrategy {
    fn default() -> Self {
        Self {
            oversold: Self::DEFAULT_OVERSOLD,
            overbought: Self::DEFAULT_OVERBOUGHT,
        }
    }
}

/// Crossover of the fast EMA through the slow EMA between two snapshots.
fn ema_crossover(
    previous: Option<&IndicatorSnapshot>,
    current: &IndicatorSnapshot,
) -> Option<SignalType> {
    let prev = previous?;
    let (pf, ps) = (prev.ema_fast?, prev.ema_slow?);
    let (cf, cs) = (current.ema_fast?, current.ema_slow?);

    if pf <= ps && cf > cs {
        Some(SignalType::Buy)
    } else if pf >= ps && cf < cs {
        Some(SignalType::Sell)
    } else {
        None
    }
}

impl Strategy for BaselineStrategy {
    fn name(&self) -> &str {
        "baseline"
    }

    fn rule_version(&self) -> &str {
        "baseline-v1"
    }

    fn evaluate(
        &self,
        _bar: &PriceBar,
        snapshot: &IndicatorSnapshot,
        previous: Option<&IndicatorSnapshot>,
    ) -> Result<StrategyDecision> {
        let Some(rsi) = snapshot.rsi else {
            return Ok(StrategyDecision::hold("Insufficient history for RSI"));
        };

        let mut decision = StrategyDecision {
            signal_type: SignalType::Hold,
            reasoning: Vec::new(),
            raw_inputs: Default::default(),
            confirmed: false,
        };

        if rsi < self.oversold {
            decision.signal_type = SignalType::Buy;
            decision.reasoning.push(format!("RSI oversold ({rsi:.1})"));
        } else if rsi > self.overbought {
            decision.signal_type = SignalType::Sell;
            decision
                .reasoning
                .push(format!("RSI overbought ({rsi:.1})"));
        }

        match (ema_crossover(previous, snapshot), decision.signal_type) {
            (Some(SignalType::Buy), SignalType::Buy) => {
                decision.confirmed = true;
                decision.reasoning.push("EMA bullish crossover".into());
            }
            (Some(SignalType::Buy), SignalType::Hold) => {
                decision.signal_type = SignalType::Buy;
                decision.reasoning.push("EMA bullish crossover".into());
            }
            (Some(SignalType::Sell), SignalType::Sell) => {
                decision.confirmed = true;
                decision.reasoning.push("EMA bearish crossover".into());
            }
            (Some(SignalType::Sell), SignalType::Hold) => {
                decision.signal_type = SignalType::Sell;
                decision.reasoning.push("EMA bearish crossover".into());
            }
            _ => {}
        }

        if decision.reasoning.is_empty() {
            decision.reasoning.push("No strong setup detected".into());
        }

        let rsi_distance = match decision.signal_type {
            SignalType::Buy => (50.0 - rsi).max(0.0),
            SignalType::Sell => (rsi - 50.0).max(0.0),
            SignalType::Hold => 0.0,
        };
        decision
            .raw_inputs
            .insert(RAW_RSI_DISTANCE.into(), rsi_distance);
        if let (Some(fast), Some(slow)) = (snapshot.ema_fast, snapshot.ema_slow) {
            if slow != 0.0 {
                decision
                    .raw_inputs
                    .insert(RAW_EMA_SPREAD_PCT.into(), (fast - slow) / slow * 100.0);
            }
        }

        Ok(decision)
    }
}
