//! Confidence scorer: converts a strategy decision into a bounded 0–100
//! integer strength.
//!
//! HOLD scores 0. For BUY/SELL the score is the larger of two heuristics,
//! plus a confirmation bonus, clamped to [0, 100]:
//!
//! - RSI distance: `rsi_distance * 2.0` — RSI at 0 or 100 saturates the
//!   scale, RSI at the neutral midpoint contributes nothing.
//! - EMA separation: `|ema_spread_pct| * 40.0`, capped at 80 so a runaway
//!   spread cannot monopolize the score (a 2% fast/slow gap hits the cap).
//!
//! When the strategy marked the decision confirmed (RSI and EMA rules
//! independently agreed on direction), 20 points are added before clamping.

use common::{SignalType, StrategyDecision, RAW_EMA_SPREAD_PCT, RAW_RSI_DISTANCE};

/// Points per RSI point of distance from the neutral midpoint (50).
pub const RSI_DISTANCE_SCALE: f64 = 2.0;
/// Points per percent of EMA fast/slow separation.
pub const EMA_SPREAD_SCALE: f64 = 40.0;
/// Ceiling on the EMA separation heuristic.
pub const EMA_SPREAD_CAP: f64 = 80.0;
/// Added when RSI and EMA rules independently agreed on the direction.
pub const CONFIRMATION_BONUS: f64 = 20.0;

pub fn score(decision: &StrategyDecision) -> u8 {
    if decision.signal_type == SignalType::Hold {
        return 0;
    }

    // Non-finite inputs contribute nothing rather than poisoning the max
    let rsi_distance = decision
        .raw_inputs
        .get(RAW_RSI_DISTANCE)
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    let ema_spread_pct = decision
        .raw_inputs
        .get(RAW_EMA_SPREAD_PCT)
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);

    let rsi_score = rsi_distance.max(0.0) * RSI_DISTANCE_SCALE;
    let ema_score = (ema_spread_pct.abs() * EMA_SPREAD_SCALE).min(EMA_SPREAD_CAP);

    let mut strength = rsi_score.max(ema_score);
    if decision.confirmed {
        strength += CONFIRMATION_BONUS;
    }
    strength.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn decision(
        signal_type: SignalType,
        rsi_distance: f64,
        ema_spread_pct: f64,
        confirmed: bool,
    ) -> StrategyDecision {
        let mut raw_inputs = HashMap::new();
        raw_inputs.insert(RAW_RSI_DISTANCE.to_string(), rsi_distance);
        raw_inputs.insert(RAW_EMA_SPREAD_PCT.to_string(), ema_spread_pct);
        StrategyDecision {
            signal_type,
            reasoning: vec!["test".into()],
            raw_inputs,
            confirmed,
        }
    }

    #[test]
    fn hold_scores_zero() {
        assert_eq!(score(&decision(SignalType::Hold, 50.0, 10.0, true)), 0);
    }

    #[test]
    fn neutral_rsi_scores_zero() {
        assert_eq!(score(&decision(SignalType::Buy, 0.0, 0.0, false)), 0);
    }

    #[test]
    fn rsi_extremes_saturate_the_scale() {
        // RSI 0 for a BUY → distance 50 → 100 points
        assert_eq!(score(&decision(SignalType::Buy, 50.0, 0.0, false)), 100);
        // RSI 100 for a SELL
        assert_eq!(score(&decision(SignalType::Sell, 50.0, 0.0, false)), 100);
    }

    #[test]
    fn ema_spread_is_capped() {
        // A 1000% spread must not exceed the cap
        assert_eq!(
            score(&decision(SignalType::Buy, 0.0, 1000.0, false)),
            EMA_SPREAD_CAP as u8
        );
    }

    #[test]
    fn heuristics_combine_via_max_not_sum() {
        // rsi: 10*2 = 20, ema: 1.5*40 = 60 → 60, not 80
        assert_eq!(score(&decision(SignalType::Buy, 10.0, 1.5, false)), 60);
    }

    #[test]
    fn confirmation_bonus_applies_and_clamps() {
        // rsi distance 25 → 50, + bonus 20 → 70
        assert_eq!(score(&decision(SignalType::Buy, 25.0, 0.0, true)), 70);
        // already saturated → still 100
        assert_eq!(score(&decision(SignalType::Buy, 50.0, 1000.0, true)), 100);
    }

    #[test]
    fn missing_raw_inputs_score_zero() {
        let bare = StrategyDecision {
            signal_type: SignalType::Buy,
            reasoning: vec!["test".into()],
            raw_inputs: HashMap::new(),
            confirmed: false,
        };
        assert_eq!(score(&bare), 0);
    }

    #[test]
    fn non_finite_inputs_contribute_nothing() {
        // Only the confirmation bonus survives
        assert_eq!(
            score(&decision(SignalType::Buy, f64::NAN, f64::INFINITY, true)),
            CONFIRMATION_BONUS as u8
        );
        assert_eq!(
            score(&decision(SignalType::Buy, f64::NAN, f64::NAN, false)),
            0
        );
    }
}
