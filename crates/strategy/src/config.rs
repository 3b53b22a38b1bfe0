use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use common::AssetClass;

/// Strategy assignment config (TOML), passed into the registry explicitly
/// at construction time — never read from ambient process state.
///
/// Example `config/strategies.toml`:
/// ```toml
/// [class_defaults]
/// crypto = "crypto_momentum"
/// equity = "mean_reversion"
///
/// [[instrument]]
/// id = "BTC-USD"
/// asset_class = "crypto"
///
/// [[instrument]]
/// id = "AAPL"
/// asset_class = "equity"
/// strategy = "mean_reversion"
///
/// [instrument.params]
/// buy_rsi = 32.0
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// Per-asset-class default strategy names.
    #[serde(default)]
    pub class_defaults: HashMap<AssetClass, String>,

    #[serde(rename = "instrument", default)]
    pub instruments: Vec<InstrumentConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstrumentConfig {
    /// Instrument identifier, e.g. "BTC-USD".
    pub id: String,
    /// Asset class used for default-strategy lookup when no exact override
    /// is given.
    pub asset_class: Option<AssetClass>,
    /// Exact strategy override; takes precedence over the class default.
    pub strategy: Option<String>,
    /// Strategy-specific numeric parameter overrides.
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

impl RegistryConfig {
    /// Load from a TOML file. Exits process on error.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read strategy config at '{path}': {e}"));
        toml::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse strategy config at '{path}': {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let cfg: RegistryConfig = toml::from_str(
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
            strategy = "baseline"

            [instrument.params]
            oversold = 25.0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.instruments.len(), 2);
        assert_eq!(
            cfg.class_defaults.get(&AssetClass::Crypto).unwrap(),
            "crypto_momentum"
        );
        let aapl = &cfg.instruments[1];
        assert_eq!(aapl.strategy.as_deref(), Some("baseline"));
        assert_eq!(aapl.params["oversold"].as_float(), Some(25.0));
    }

    #[test]
    fn empty_config_is_valid() {
        let cfg: RegistryConfig = toml::from_str("").unwrap();
        assert!(cfg.instruments.is_empty());
        assert!(cfg.class_defaults.is_empty());
    }
}
