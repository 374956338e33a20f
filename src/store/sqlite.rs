//! SQLite-backed row source and version counter

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{parse_expiry, RowSource};
use crate::error::{ProtocolError, Result};
use crate::version::{VersionRecord, VersionSequencer, VERSION_SETTING_KEY};
use crate::wire::{EtfComponentRow, InstrumentRow, OptionMetaRow, RiskLimitRow, SnapshotRows};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS instruments (
    id              INTEGER PRIMARY KEY,
    symbol          TEXT NOT NULL,
    type            INTEGER NOT NULL,
    currency        TEXT,
    tick_size_nanos INTEGER NOT NULL,
    tick_size_ticks INTEGER NOT NULL,
    lot_size_lots   INTEGER NOT NULL,
    meta            INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS etf_components (
    etf_instrument_id       INTEGER NOT NULL,
    component_instrument_id INTEGER NOT NULL,
    weight_num              INTEGER NOT NULL,
    weight_den              INTEGER NOT NULL,
    PRIMARY KEY (etf_instrument_id, component_instrument_id)
);
CREATE TABLE IF NOT EXISTS options_meta (
    instrument_id            INTEGER PRIMARY KEY,
    underlying_instrument_id INTEGER NOT NULL,
    strike_ticks             INTEGER NOT NULL,
    "right"                  INTEGER NOT NULL,
    expiry                   TEXT NOT NULL,
    multiplier               INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS risk_limits (
    team_id            INTEGER NOT NULL,
    instrument_id      INTEGER NOT NULL,
    pos_min_lots       INTEGER NOT NULL,
    pos_max_lots       INTEGER NOT NULL,
    notional_max_ticks INTEGER NOT NULL,
    max_orders_per_sec INTEGER NOT NULL,
    PRIMARY KEY (team_id, instrument_id)
);
"#;

/// Reference data and the version counter in one SQLite file.
///
/// Every call opens its own connection on a blocking thread, so the four row
/// fetches of a publish cycle run side by side.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Open (creating if needed) the database and its tables
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let conn = connect(&path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        debug!(path = %path.display(), "sqlite store ready");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert rows, replacing any with the same key
    pub fn seed(&self, rows: &SnapshotRows) -> Result<()> {
        let mut conn = connect(&self.path)?;
        let tx = conn.transaction()?;
        for r in &rows.instruments {
            tx.execute(
                "INSERT OR REPLACE INTO instruments
                 (id, symbol, type, currency, tick_size_nanos, tick_size_ticks, lot_size_lots, meta)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    r.id,
                    r.symbol,
                    r.kind,
                    r.currency,
                    r.tick_size_nanos,
                    r.tick_size_ticks,
                    r.lot_size_lots,
                    r.meta
                ],
            )?;
        }
        for r in &rows.etf {
            tx.execute(
                "INSERT OR REPLACE INTO etf_components
                 (etf_instrument_id, component_instrument_id, weight_num, weight_den)
                 VALUES (?1, ?2, ?3, ?4)",
                params![r.etf_instrument_id, r.component_instrument_id, r.weight_num, r.weight_den],
            )?;
        }
        for r in &rows.options {
            tx.execute(
                r#"INSERT OR REPLACE INTO options_meta
                 (instrument_id, underlying_instrument_id, strike_ticks, "right", expiry, multiplier)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                params![
                    r.instrument_id,
                    r.underlying_instrument_id,
                    r.strike_ticks,
                    r.right,
                    r.expiry.format("%Y-%m-%d").to_string(),
                    r.multiplier
                ],
            )?;
        }
        for r in &rows.risk_limits {
            tx.execute(
                "INSERT OR REPLACE INTO risk_limits
                 (team_id, instrument_id, pos_min_lots, pos_max_lots, notional_max_ticks, max_orders_per_sec)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    r.team_id,
                    r.instrument_id,
                    r.pos_min_lots,
                    r.pos_max_lots,
                    r.notional_max_ticks,
                    r.max_orders_per_sec
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = connect(&path)?;
            op(&conn)
        })
        .await
        .map_err(|e| ProtocolError::Store(format!("sqlite task failed: {}", e)))?
    }
}

fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

#[async_trait]
impl RowSource for SqliteStore {
    async fn instruments(&self) -> Result<Vec<InstrumentRow>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, symbol, type, currency, tick_size_nanos, tick_size_ticks, lot_size_lots, meta
                 FROM instruments ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], |r| {
                    Ok(InstrumentRow {
                        id: r.get(0)?,
                        symbol: r.get(1)?,
                        kind: r.get(2)?,
                        currency: r.get(3)?,
                        tick_size_nanos: r.get(4)?,
                        tick_size_ticks: r.get(5)?,
                        lot_size_lots: r.get(6)?,
                        meta: r.get(7)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    async fn etf_components(&self) -> Result<Vec<EtfComponentRow>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(
                "SELECT etf_instrument_id, component_instrument_id, weight_num, weight_den
                 FROM etf_components ORDER BY 1, 2",
            )?;
            let rows = stmt
                .query_map([], |r| {
                    Ok(EtfComponentRow {
                        etf_instrument_id: r.get(0)?,
                        component_instrument_id: r.get(1)?,
                        weight_num: r.get(2)?,
                        weight_den: r.get(3)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    async fn options(&self) -> Result<Vec<OptionMetaRow>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(
                r#"SELECT instrument_id, underlying_instrument_id, strike_ticks, "right", expiry, multiplier
                 FROM options_meta ORDER BY instrument_id"#,
            )?;
            let raw = stmt
                .query_map([], |r| {
                    Ok((
                        r.get::<_, i64>(0)?,
                        r.get::<_, i64>(1)?,
                        r.get::<_, i64>(2)?,
                        r.get::<_, i64>(3)?,
                        r.get::<_, String>(4)?,
                        r.get::<_, i64>(5)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            raw.into_iter()
                .map(|(instrument_id, underlying, strike_ticks, right, expiry, multiplier)| -> Result<OptionMetaRow> {
                    Ok(OptionMetaRow {
                        instrument_id,
                        underlying_instrument_id: underlying,
                        strike_ticks,
                        right,
                        expiry: parse_expiry(&expiry)?,
                        multiplier,
                    })
                })
                .collect()
        })
        .await
    }

    async fn risk_limits(&self) -> Result<Vec<RiskLimitRow>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(
                "SELECT team_id, instrument_id, pos_min_lots, pos_max_lots, notional_max_ticks, max_orders_per_sec
                 FROM risk_limits ORDER BY 1, 2",
            )?;
            let rows = stmt
                .query_map([], |r| {
                    Ok(RiskLimitRow {
                        team_id: r.get(0)?,
                        instrument_id: r.get(1)?,
                        pos_min_lots: r.get(2)?,
                        pos_max_lots: r.get(3)?,
                        notional_max_ticks: r.get(4)?,
                        max_orders_per_sec: r.get(5)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }
}

#[async_trait]
impl VersionSequencer for SqliteStore {
    async fn current(&self) -> Result<u64> {
        self.blocking(|conn| {
            let stored: Option<String> = conn
                .query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    params![VERSION_SETTING_KEY],
                    |r| r.get(0),
                )
                .optional()?;
            match stored {
                Some(raw) => Ok(serde_json::from_str::<VersionRecord>(&raw)?.version),
                None => {
                    let initial = serde_json::to_string(&VersionRecord::default())?;
                    conn.execute(
                        "INSERT INTO settings (key, value) VALUES (?1, ?2)
                         ON CONFLICT (key) DO NOTHING",
                        params![VERSION_SETTING_KEY, initial],
                    )?;
                    debug!("version counter initialized at 0");
                    Ok(0)
                }
            }
        })
        .await
    }

    async fn advance(&self, next: u64) -> Result<()> {
        self.blocking(move |conn| {
            let value = serde_json::to_string(&VersionRecord::new(next))?;
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT (key) DO UPDATE SET value = excluded.value",
                params![VERSION_SETTING_KEY, value],
            )?;
            Ok(())
        })
        .await
    }
}
