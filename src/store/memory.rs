//! In-memory store for tests and local runs

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::RowSource;
use crate::error::{ProtocolError, Result};
use crate::version::VersionSequencer;
use crate::wire::{EtfComponentRow, InstrumentRow, OptionMetaRow, RiskLimitRow, SnapshotRows};

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<SnapshotRows>,
    /// `None` until `current()` bootstraps it
    version: Mutex<Option<u64>>,
}

impl MemoryStore {
    pub fn new(rows: SnapshotRows) -> Self {
        Self {
            rows: Mutex::new(rows),
            version: Mutex::new(None),
        }
    }

    pub fn with_version(self, version: u64) -> Self {
        Self {
            version: Mutex::new(Some(version)),
            ..self
        }
    }

    pub fn set_rows(&self, rows: SnapshotRows) -> Result<()> {
        *lock(&self.rows)? = rows;
        Ok(())
    }

    /// Stored counter without bootstrapping it
    pub fn stored_version(&self) -> Result<Option<u64>> {
        Ok(*lock(&self.version)?)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| ProtocolError::Store("memory store mutex poisoned".into()))
}

#[async_trait]
impl RowSource for MemoryStore {
    async fn instruments(&self) -> Result<Vec<InstrumentRow>> {
        Ok(lock(&self.rows)?.instruments.clone())
    }

    async fn etf_components(&self) -> Result<Vec<EtfComponentRow>> {
        Ok(lock(&self.rows)?.etf.clone())
    }

    async fn options(&self) -> Result<Vec<OptionMetaRow>> {
        Ok(lock(&self.rows)?.options.clone())
    }

    async fn risk_limits(&self) -> Result<Vec<RiskLimitRow>> {
        Ok(lock(&self.rows)?.risk_limits.clone())
    }
}

#[async_trait]
impl VersionSequencer for MemoryStore {
    async fn current(&self) -> Result<u64> {
        let mut version = lock(&self.version)?;
        Ok(*version.get_or_insert(0))
    }

    async fn advance(&self, next: u64) -> Result<()> {
        *lock(&self.version)? = Some(next);
        Ok(())
    }
}
