//! Row sources and durable version storage

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{ProtocolError, Result};
use crate::wire::{EtfComponentRow, InstrumentRow, OptionMetaRow, RiskLimitRow, SnapshotRows};

/// Source of the rows a snapshot is built from. Each set comes back in key order.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn instruments(&self) -> Result<Vec<InstrumentRow>>;

    async fn etf_components(&self) -> Result<Vec<EtfComponentRow>>;

    async fn options(&self) -> Result<Vec<OptionMetaRow>>;

    async fn risk_limits(&self) -> Result<Vec<RiskLimitRow>>;
}

/// Fetch all four row sets concurrently; the first failure wins
pub async fn fetch_rows(source: &dyn RowSource) -> Result<SnapshotRows> {
    let (instruments, etf, options, risk_limits) = tokio::try_join!(
        source.instruments(),
        source.etf_components(),
        source.options(),
        source.risk_limits(),
    )?;
    Ok(SnapshotRows {
        instruments,
        etf,
        options,
        risk_limits,
    })
}

/// Parse a stored expiry: a plain `YYYY-MM-DD` date or an RFC 3339 timestamp (taken in UTC)
pub fn parse_expiry(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc).date_naive())
        .map_err(|e| ProtocolError::Store(format!("invalid expiry {:?}: {}", raw, e)))
}
