use std::collections::HashMap;

use tracing::info;

use common::{Error, Result};

use crate::config::{InstrumentConfig, RegistryConfig};
use crate::strategies::{BaselineStrategy, CryptoMomentumStrategy, MeanReversionStrategy};
use crate::Strategy;

/// Maps instrument identifiers to strategy instances.
///
/// Resolution happens once at construction: an exact per-instrument
/// override wins, then the asset-class default, then the baseline. Lookups
/// at evaluation time are a plain map hit — strategies are never
/// re-discovered per call. An empty or missing configuration is valid and
/// resolves every instrument to the baseline.
pub struct StrategyRegistry {
    by_instrument: HashMap<String, Box<dyn Strategy>>,
    baseline: Box<dyn Strategy>,
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field(
                "by_instrument",
                &self.by_instrument.keys().collect::<Vec<_>>(),
            )
            .field("baseline", &self.baseline.name())
            .finish()
    }
}

impl StrategyRegistry {
    /// An empty registry: everything resolves to the default baseline.
    pub fn new() -> Self {
        Self {
            by_instrument: HashMap::new(),
            baseline: Box::new(BaselineStrategy::default()),
        }
    }

    /// Build the registry from explicit configuration. Unknown strategy
    /// names and invalid parameter overrides are configuration errors.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut registry = Self::new();

        for instrument in &config.instruments {
            let name = resolve_strategy_name(instrument, config);
            let strategy = build_strategy(&name, &instrument.params)?;
            info!(
                instrument = %instrument.id,
                strategy = %strategy.name(),
                rule_version = %strategy.rule_version(),
                "Registered strategy"
            );
            registry.register(instrument.id.clone(), strategy);
        }

        Ok(registry)
    }

    /// Register a strategy for one instrument, replacing any previous one.
    pub fn register(&mut self, instrument_id: impl Into<String>, strategy: Box<dyn Strategy>) {
        self.by_instrument.insert(instrument_id.into(), strategy);
    }

    /// Resolve the strategy for an instrument, falling back to the baseline.
    pub fn resolve(&self, instrument_id: &str) -> &dyn Strategy {
        self.by_instrument
            .get(instrument_id)
            .map(|s| s.as_ref())
            .unwrap_or(self.baseline.as_ref())
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_strategy_name(instrument: &InstrumentConfig, config: &RegistryConfig) -> String {
    instrument
        .strategy
        .clone()
        .or_else(|| {
            instrument
                .asset_class
                .and_then(|class| config.class_defaults.get(&class).cloned())
        })
        .unwrap_or_else(|| "baseline".to_string())
}

// ─── Strategy builders ────────────────────────────────────────────────────────

fn build_strategy(
    name: &str,
    params: &HashMap<String, toml::Value>,
) -> Result<Box<dyn Strategy>> {
    match name {
        "baseline" => {
            let oversold = param_f64(params, "oversold", BaselineStrategy::DEFAULT_OVERSOLD);
            let overbought =
                param_f64(params, "overbought", BaselineStrategy::DEFAULT_OVERBOUGHT);
            Ok(Box::new(BaselineStrategy::new(oversold, overbought)?))
        }
        "crypto_momentum" => {
            let macd_buy =
                param_f64(params, "macd_buy", CryptoMomentumStrategy::DEFAULT_MACD_BUY);
            let macd_sell =
                param_f64(params, "macd_sell", CryptoMomentumStrategy::DEFAULT_MACD_SELL);
            Ok(Box::new(CryptoMomentumStrategy::new(macd_buy, macd_sell)?))
        }
        "mean_reversion" => {
            let buy_rsi = param_f64(params, "buy_rsi", MeanReversionStrategy::DEFAULT_BUY_RSI);
            let sell_rsi =
                param_f64(params, "sell_rsi", MeanReversionStrategy::DEFAULT_SELL_RSI);
            Ok(Box::new(MeanReversionStrategy::new(buy_rsi, sell_rsi)?))
        }
        other => Err(Error::Config(format!("unknown strategy '{other}'"))),
    }
}

fn param_f64(params: &HashMap<String, toml::Value>, key: &str, default: f64) -> f64 {
    params
        .get(key)
        .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AssetClass;

    fn config(toml_str: &str) -> RegistryConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn empty_config_resolves_to_baseline() {
        let registry = StrategyRegistry::from_config(&RegistryConfig::default()).unwrap();
        assert_eq!(registry.resolve("ANYTHING").name(), "baseline");
    }

    #[test]
    fn exact_override_beats_class_default() {
        let cfg = config(
            r#"
            [class_defaults]
            crypto = "crypto_momentum"

            [[instrument]]
            id = "BTC-USD"
            asset_class = "crypto"
            strategy = "mean_reversion"
            "#,
        );
        let registry = StrategyRegistry::from_config(&cfg).unwrap();
        assert_eq!(registry.resolve("BTC-USD").name(), "mean_reversion");
    }

    #[test]
    fn class_default_applies_without_override() {
        let cfg = config(
            r#"
            [class_defaults]
            crypto = "crypto_momentum"
            equity = "mean_reversion"

            [[instrument]]
            id = "BTC-USD"
            asset_class = "crypto"

            [[instrument]]
            id = "AAPL"
            asset_class = "equity"
            "#,
        );
        let registry = StrategyRegistry::from_config(&cfg).unwrap();
        assert_eq!(registry.resolve("BTC-USD").name(), "crypto_momentum");
        assert_eq!(registry.resolve("AAPL").name(), "mean_reversion");
        // Undeclared instruments fall back to the baseline
        assert_eq!(registry.resolve("MSFT").name(), "baseline");
    }

    #[test]
    fn declared_instrument_without_assignment_gets_baseline_with_params() {
        let cfg = config(
            r#"
            [[instrument]]
            id = "ETH-USD"

            [instrument.params]
            oversold = 25.0
            "#,
        );
        let registry = StrategyRegistry::from_config(&cfg).unwrap();
        assert_eq!(registry.resolve("ETH-USD").name(), "baseline");
    }

    #[test]
    fn unknown_strategy_name_is_a_config_error() {
        let cfg = config(
            r#"
            [[instrument]]
            id = "BTC-USD"
            strategy = "hodl_forever"
            "#,
        );
        let err = StrategyRegistry::from_config(&cfg).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn invalid_param_override_is_a_config_error() {
        let cfg = config(
            r#"
            [[instrument]]
            id = "AAPL"
            strategy = "baseline"

            [instrument.params]
            oversold = 80.0
            overbought = 20.0
            "#,
        );
        assert!(StrategyRegistry::from_config(&cfg).is_err());
    }

    #[test]
    fn class_default_with_unknown_name_is_rejected() {
        let mut cfg = RegistryConfig::default();
        cfg.class_defaults
            .insert(AssetClass::Crypto, "nope".to_string());
        cfg.instruments.push(crate::config::InstrumentConfig {
            id: "BTC-USD".into(),
            asset_class: Some(AssetClass::Crypto),
            strategy: None,
            params: HashMap::new(),
        });
        assert!(StrategyRegistry::from_config(&cfg).is_err());
    }
}
