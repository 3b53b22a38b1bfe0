use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::{
    BacktestSummary, BarSource, Config, Result, RunMode, Signal, SignalStore, SignalType,
    WriteResult,
};
use engine::{SignalEngine, SignalWriter, SqliteBarSource, SqliteSignalStore};
use strategy::{IndicatorConfig, RegistryConfig, StrategyRegistry};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(mode = %cfg.run_mode, "SignalBot starting");

    // ── Database ──────────────────────────────────────────────────────────────
    let db = SqlitePool::connect(&cfg.database_url)
        .await
        .unwrap_or_else(|e| panic!("Failed to connect to database: {e}"));
    sqlx::migrate!("../../migrations")
        .run(&db)
        .await
        .unwrap_or_else(|e| panic!("Database migration failed: {e}"));
    info!("Database ready");

    // ── Strategy registry (explicit config, resolved once) ────────────────────
    // A missing config file is tolerated: everything falls back to baseline.
    let registry_cfg = if std::path::Path::new(&cfg.strategy_config_path).exists() {
        RegistryConfig::load(&cfg.strategy_config_path)
    } else {
        warn!(
            path = %cfg.strategy_config_path,
            "Strategy config not found — using the baseline strategy for all instruments"
        );
        RegistryConfig::default()
    };
    let instruments: Vec<String> = cfg.instruments.clone().unwrap_or_else(|| {
        registry_cfg
            .instruments
            .iter()
            .map(|i| i.id.clone())
            .collect()
    });
    if instruments.is_empty() {
        warn!("No instruments configured — nothing to do");
        return;
    }
    let registry = StrategyRegistry::from_config(&registry_cfg)
        .unwrap_or_else(|e| panic!("Invalid strategy config: {e}"));

    // ── Engine and collaborators ──────────────────────────────────────────────
    let engine = SignalEngine::new(registry, IndicatorConfig::default());
    let bar_source = SqliteBarSource::new(db.clone());
    let store: Arc<dyn SignalStore> = Arc::new(SqliteSignalStore::new(db.clone()));
    let writer = SignalWriter::new(store.clone());

    match cfg.run_mode {
        RunMode::Live => run_live(&cfg, &instruments, &bar_source, &engine, &writer).await,
        RunMode::Replay => {
            run_replay(&cfg, &instruments, &bar_source, &engine, store.as_ref()).await
        }
    }
}

/// Evaluate the latest bar for every instrument and persist the signal.
/// A failure on one instrument is logged and does not abort the batch.
async fn run_live(
    cfg: &Config,
    instruments: &[String],
    bar_source: &SqliteBarSource,
    engine: &SignalEngine,
    writer: &SignalWriter,
) {
    info!(count = instruments.len(), "Starting signal generation");

    for instrument in instruments {
        match evaluate_instrument(cfg, bar_source, engine, writer, instrument).await {
            Ok(Some((signal, outcome))) => {
                info!(
                    instrument = %instrument,
                    signal = %signal.signal_type,
                    strength = signal.strength,
                    outcome = %outcome,
                    "Signal generated"
                );
                if signal.signal_type != SignalType::Hold
                    && signal.strength >= cfg.notify_min_strength
                {
                    // Surfaced for the external notifier; delivery is not
                    // this binary's job.
                    info!(
                        instrument = %instrument,
                        signal = %signal.signal_type,
                        strength = signal.strength,
                        reasoning = ?signal.reasoning,
                        "Strong signal"
                    );
                }
            }
            Ok(None) => warn!(instrument = %instrument, "No bars available — skipped"),
            Err(e) => error!(instrument = %instrument, error = %e, "Signal generation failed"),
        }
    }

    info!("Signal generation complete");
}

async fn evaluate_instrument(
    cfg: &Config,
    bar_source: &SqliteBarSource,
    engine: &SignalEngine,
    writer: &SignalWriter,
    instrument: &str,
) -> Result<Option<(Signal, WriteResult)>> {
    let bars = bar_source
        .recent_bars(instrument, cfg.indicator_window)
        .await?;
    let Some(signal) = engine.evaluate_latest(&bars)? else {
        return Ok(None);
    };
    let outcome = writer.write(&signal).await?;
    Ok(Some((signal, outcome)))
}

/// Replay the configured window for every instrument and replace the stored
/// backtest summary wholesale.
async fn run_replay(
    cfg: &Config,
    instruments: &[String],
    bar_source: &SqliteBarSource,
    engine: &SignalEngine,
    store: &dyn SignalStore,
) {
    let end = Utc::now();
    let start = end - Duration::days(cfg.replay_days);
    info!(
        count = instruments.len(),
        range = %cfg.replay_range_label,
        from = %start,
        to = %end,
        "Starting signal replay"
    );

    for instrument in instruments {
        match replay_instrument(cfg, bar_source, engine, store, instrument, start, end).await {
            Ok(Some(summary)) => info!(
                instrument = %instrument,
                trades = summary.trades,
                win_rate = format!("{:.2}%", summary.win_rate),
                avg_return = format!("{:.2}%", summary.avg_return),
                total_return = format!("{:.2}%", summary.total_return),
                "Replay complete"
            ),
            Ok(None) => {
                warn!(instrument = %instrument, "No bar history in the selected window")
            }
            Err(e) => error!(instrument = %instrument, error = %e, "Replay failed"),
        }
    }

    info!("Signal replay complete");
}

async fn replay_instrument(
    cfg: &Config,
    bar_source: &SqliteBarSource,
    engine: &SignalEngine,
    store: &dyn SignalStore,
    instrument: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Option<BacktestSummary>> {
    let bars = bar_source.bars_between(instrument, start, end).await?;
    if bars.is_empty() {
        return Ok(None);
    }
    let summary = engine.replay(&bars, instrument, &cfg.replay_range_label)?;
    store.replace_backtest(&summary).await?;
    Ok(Some(summary))
}
