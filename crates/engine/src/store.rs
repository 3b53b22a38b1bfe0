use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use common::{
    BacktestSummary, BarSource, Error, PriceBar, Result, Signal, SignalStore, SignalType,
    WriteResult,
};

/// Sqlite-backed bar source reading the `market_data` table.
///
/// Timestamps are stored as RFC 3339 TEXT in UTC, so lexicographic ordering
/// matches chronological ordering.
pub struct SqliteBarSource {
    pool: SqlitePool,
}

impl SqliteBarSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BarSource for SqliteBarSource {
    async fn recent_bars(&self, instrument_id: &str, limit: u32) -> Result<Vec<PriceBar>> {
        let rows = sqlx::query(
            r#"
            SELECT instrument_id, timestamp, open, high, low, close, volume
            FROM (
                SELECT instrument_id, timestamp, open, high, low, close, volume
                FROM market_data
                WHERE instrument_id = ?1
                ORDER BY timestamp DESC
                LIMIT ?2
            )
            ORDER BY timestamp ASC
            "#,
        )
        .bind(instrument_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(bar_from_row).collect()
    }

    async fn bars_between(
        &self,
        instrument_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        let rows = sqlx::query(
            r#"
            SELECT instrument_id, timestamp, open, high, low, close, volume
            FROM market_data
            WHERE instrument_id = ?1 AND timestamp >= ?2 AND timestamp <= ?3
            ORDER BY timestamp ASC
            "#,
        )
        .bind(instrument_id)
        .bind(start.to_rfc3339())
        .bind(end.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(bar_from_row).collect()
    }
}

impl SqliteBarSource {
    /// Upsert one bar, used by ingestion jobs and test seeding.
    pub async fn upsert_bar(&self, bar: &PriceBar) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO market_data (instrument_id, timestamp, open, high, low, close, volume)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (instrument_id, timestamp) DO UPDATE SET
                open = excluded.open,
                high = excluded.high,
                low = excluded.low,
                close = excluded.close,
                volume = excluded.volume
            "#,
        )
        .bind(&bar.instrument_id)
        .bind(bar.timestamp.to_rfc3339())
        .bind(bar.open)
        .bind(bar.high)
        .bind(bar.low)
        .bind(bar.close)
        .bind(bar.volume as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Sqlite-backed signal store.
///
/// `upsert_signal` is the engine's only concurrency-control point: the
/// idempotency key is the primary key, conflicts overwrite the mutable
/// fields in place, and last-write-wins is the intended semantic.
pub struct SqliteSignalStore {
    pool: SqlitePool,
}

impl SqliteSignalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SignalStore for SqliteSignalStore {
    async fn fetch_signal(&self, idempotency_key: &str) -> Result<Option<Signal>> {
        let row = sqlx::query(
            r#"
            SELECT instrument_id, timestamp, signal_type, strength, reasoning,
                   price_at_signal, rule_version
            FROM signals
            WHERE idempotency_key = ?1
            "#,
        )
        .bind(idempotency_key)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(signal_from_row).transpose()
    }

    async fn upsert_signal(&self, signal: &Signal) -> Result<WriteResult> {
        let key = signal.idempotency_key();

        let existing = self.fetch_signal(&key).await?;
        if let Some(existing) = &existing {
            if existing == signal {
                return Ok(WriteResult::Unchanged);
            }
        }

        let reasoning = serde_json::to_string(&signal.reasoning)?;
        sqlx::query(
            r#"
            INSERT INTO signals
                (idempotency_key, instrument_id, timestamp, signal_type, strength,
                 reasoning, price_at_signal, rule_version)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (idempotency_key) DO UPDATE SET
                signal_type = excluded.signal_type,
                strength = excluded.strength,
                reasoning = excluded.reasoning,
                price_at_signal = excluded.price_at_signal,
                updated_at = datetime('now')
            "#,
        )
        .bind(&key)
        .bind(&signal.instrument_id)
        .bind(signal.timestamp.to_rfc3339())
        .bind(signal.signal_type)
        .bind(signal.strength as i64)
        .bind(reasoning)
        .bind(signal.price_at_signal)
        .bind(&signal.rule_version)
        .execute(&self.pool)
        .await?;

        Ok(if existing.is_some() {
            WriteResult::Updated
        } else {
            WriteResult::Created
        })
    }

    async fn replace_backtest(&self, summary: &BacktestSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO backtests
                (instrument_id, range_label, rule_version, start_timestamp,
                 end_timestamp, trades, win_rate, avg_return, total_return)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (instrument_id, range_label, rule_version) DO UPDATE SET
                start_timestamp = excluded.start_timestamp,
                end_timestamp = excluded.end_timestamp,
                trades = excluded.trades,
                win_rate = excluded.win_rate,
                avg_return = excluded.avg_return,
                total_return = excluded.total_return,
                generated_at = datetime('now')
            "#,
        )
        .bind(&summary.instrument_id)
        .bind(&summary.range_label)
        .bind(&summary.rule_version)
        .bind(summary.start_timestamp.map(|t| t.to_rfc3339()))
        .bind(summary.end_timestamp.map(|t| t.to_rfc3339()))
        .bind(summary.trades as i64)
        .bind(summary.win_rate)
        .bind(summary.avg_return)
        .bind(summary.total_return)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Other(format!("invalid stored timestamp '{raw}': {e}")))
}

fn bar_from_row(row: &SqliteRow) -> Result<PriceBar> {
    let raw_ts: String = row.try_get("timestamp")?;
    Ok(PriceBar {
        instrument_id: row.try_get("instrument_id")?,
        timestamp: parse_timestamp(&raw_ts)?,
        open: row.try_get("open")?,
        high: row.try_get("high")?,
        low: row.try_get("low")?,
        close: row.try_get("close")?,
        volume: row.try_get::<i64, _>("volume")?.max(0) as u64,
    })
}

fn signal_from_row(row: &SqliteRow) -> Result<Signal> {
    let raw_ts: String = row.try_get("timestamp")?;
    let reasoning: String = row.try_get("reasoning")?;
    let signal_type: SignalType = row.try_get("signal_type")?;
    Ok(Signal {
        instrument_id: row.try_get("instrument_id")?,
        timestamp: parse_timestamp(&raw_ts)?,
        signal_type,
        strength: row.try_get::<i64, _>("strength")?.clamp(0, 100) as u8,
        reasoning: serde_json::from_str(&reasoning)?,
        price_at_signal: row.try_get("price_at_signal")?,
        rule_version: row.try_get("rule_version")?,
    })
}
