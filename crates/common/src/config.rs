use crate::RunMode;

/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Run mode: evaluate the latest bar or replay history
    pub run_mode: RunMode,

    /// Instruments to process. `None` means "every instrument declared in
    /// the strategy config file".
    pub instruments: Option<Vec<String>>,

    // Strategy config file path
    pub strategy_config_path: String,

    /// Number of recent bars fed to the indicator engine in live mode.
    pub indicator_window: u32,

    /// Minimum strength at which a written signal is surfaced for the
    /// external notifier (logged, never delivered from here).
    pub notify_min_strength: u8,

    // Replay window
    pub replay_days: i64,
    pub replay_range_label: String,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let run_mode = match optional_env("RUN_MODE")
            .unwrap_or_else(|| "live".to_string())
            .to_lowercase()
            .as_str()
        {
            "live" => RunMode::Live,
            "replay" => RunMode::Replay,
            other => panic!("ERROR: RUN_MODE must be 'live' or 'replay', got: '{other}'"),
        };

        let instruments = optional_env("INSTRUMENTS").map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Config {
            database_url: required_env("DATABASE_URL"),
            run_mode,
            instruments,
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or_else(|| "config/strategies.toml".to_string()),
            indicator_window: optional_env("INDICATOR_WINDOW")
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            notify_min_strength: optional_env("NOTIFY_MIN_STRENGTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            replay_days: optional_env("REPLAY_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(365),
            replay_range_label: optional_env("REPLAY_RANGE_LABEL")
                .unwrap_or_else(|| "1y".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
