use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "Out-of-order bar for {instrument_id}: {timestamp} is not after {previous}"
    )]
    DataOrder {
        instrument_id: String,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },

    #[error(
        "Strategy '{rule_version}' failed for {instrument_id} at {timestamp}: {message}"
    )]
    StrategyEvaluation {
        instrument_id: String,
        timestamp: DateTime<Utc>,
        rule_version: String,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
