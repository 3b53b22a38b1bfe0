use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV observation for an instrument.
///
/// Bars for a given instrument are unique by timestamp and must be consumed
/// in strictly increasing timestamp order. The engine rejects out-of-order
/// input instead of reordering it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub instrument_id: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Per-bar derived indicator values. `None` means the indicator is still in
/// its warm-up window — callers must check before using a value, never treat
/// it as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
}

/// Classification of market state at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalType::Buy => write!(f, "BUY"),
            SignalType::Sell => write!(f, "SELL"),
            SignalType::Hold => write!(f, "HOLD"),
        }
    }
}

/// Well-known `raw_inputs` keys shared between strategies and the scorer.
pub const RAW_RSI_DISTANCE: &str = "rsi_distance";
pub const RAW_EMA_SPREAD_PCT: &str = "ema_spread_pct";
pub const RAW_MACD_HISTOGRAM: &str = "macd_histogram";

/// Ephemeral output of one strategy evaluation, consumed by the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDecision {
    pub signal_type: SignalType,
    /// Human-readable reasons, insertion order meaningful. The first entry
    /// is the primary driver. Always at least one entry.
    pub reasoning: Vec<String>,
    /// Named numeric inputs used by the scorer (see the `RAW_*` constants).
    pub raw_inputs: HashMap<String, f64>,
    /// Set when two independent rules (RSI and EMA) agreed on the same
    /// direction; the scorer adds a confirmation bonus for it.
    pub confirmed: bool,
}

impl StrategyDecision {
    pub fn hold(reason: impl Into<String>) -> Self {
        Self {
            signal_type: SignalType::Hold,
            reasoning: vec![reason.into()],
            raw_inputs: HashMap::new(),
            confirmed: false,
        }
    }
}

/// The persisted unit: one scored recommendation for one (instrument, bar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub instrument_id: String,
    /// Equals the timestamp of the bar the signal was evaluated at.
    pub timestamp: DateTime<Utc>,
    pub signal_type: SignalType,
    /// Confidence score, 0–100 inclusive.
    pub strength: u8,
    pub reasoning: Vec<String>,
    /// Close price of the bar at evaluation time.
    pub price_at_signal: f64,
    /// Identifies which strategy implementation/version produced the signal.
    pub rule_version: String,
}

impl Signal {
    /// Build a fully-constructed signal from a scored decision. The signal
    /// is complete before any write call is made.
    pub fn from_decision(
        bar: &PriceBar,
        decision: StrategyDecision,
        strength: u8,
        rule_version: impl Into<String>,
    ) -> Self {
        Self {
            instrument_id: bar.instrument_id.clone(),
            timestamp: bar.timestamp,
            signal_type: decision.signal_type,
            strength,
            reasoning: decision.reasoning,
            price_at_signal: bar.close,
            rule_version: rule_version.into(),
        }
    }

    /// Deterministic upsert key: at most one stored signal exists per
    /// (instrument, rule version, bar timestamp).
    pub fn idempotency_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.instrument_id,
            self.rule_version,
            self.timestamp.to_rfc3339()
        )
    }
}

/// Outcome of an idempotent signal write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Created,
    Updated,
    Unchanged,
}

impl std::fmt::Display for WriteResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteResult::Created => write!(f, "created"),
            WriteResult::Updated => write!(f, "updated"),
            WriteResult::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Aggregate statistics from replaying a strategy over a historical window.
/// Replaced wholesale on each run for a given (instrument, range, rule
/// version) key, never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub instrument_id: String,
    pub range_label: String,
    pub start_timestamp: Option<DateTime<Utc>>,
    pub end_timestamp: Option<DateTime<Utc>>,
    /// Count of closed BUY → SELL round trips.
    pub trades: u32,
    /// Percentage of closed trades with a positive return; 0 when no trades.
    pub win_rate: f64,
    /// Mean percentage return per closed trade.
    pub avg_return: f64,
    /// Simple sum of per-trade percentage returns (not compounded).
    pub total_return: f64,
    pub rule_version: String,
}

/// Asset classes a strategy default can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Crypto,
    Equity,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::Crypto => write!(f, "crypto"),
            AssetClass::Equity => write!(f, "equity"),
        }
    }
}

/// Whether the binary evaluates the latest bar or replays history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Live,
    Replay,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Live => write!(f, "live"),
            RunMode::Replay => write!(f, "replay"),
        }
    }
}
