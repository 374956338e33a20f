//! Snapshot version counter
//!
//! One durable integer. It starts at 0 and moves only after a payload has been
//! delivered, so a recorded version N means payload N reached the receiver.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Key of the counter record in the `settings` table
pub const VERSION_SETTING_KEY: &str = "configVersion";

/// Stored form of the counter: `{"version": n}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: u64,
}

impl VersionRecord {
    pub fn new(version: u64) -> Self {
        Self { version }
    }

    /// The version the next publish cycle should carry
    pub fn next(&self) -> Result<u64> {
        self.version
            .checked_add(1)
            .ok_or(ProtocolError::VersionOverflow(self.version))
    }
}

/// Durable last-published version
#[async_trait]
pub trait VersionSequencer: Send + Sync {
    /// Last published version; an uninitialized counter is stored as 0 and returned.
    async fn current(&self) -> Result<u64>;

    /// Record `next` as published. Last write wins.
    async fn advance(&self, next: u64) -> Result<()>;
}
