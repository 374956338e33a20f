//! Publisher service
//!
//! One cycle: fetch rows → read the counter → build payload `current + 1` →
//! transmit → record the new version. The counter moves only after the
//! receiver has accepted the payload, so a failed cycle can simply be run again
//! and will reuse the same version number.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::{ProtocolError, Result};
use crate::store::{fetch_rows, RowSource};
use crate::transport::SnapshotTransport;
use crate::version::{VersionRecord, VersionSequencer};
use crate::wire::{build_snapshot, decode_summary, RowCounts};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// What a successful cycle published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    pub version: u64,
    pub counts: RowCounts,
    pub bytes: usize,
    pub ts_nanos: u64,
}

pub struct Publisher {
    rows: Arc<dyn RowSource>,
    sequencer: Arc<dyn VersionSequencer>,
    transport: Arc<dyn SnapshotTransport>,
    store_timeout: Duration,
    /// Held for a whole cycle; two overlapping cycles would compute the same version
    cycle: Mutex<()>,
}

impl Publisher {
    pub fn new(
        rows: Arc<dyn RowSource>,
        sequencer: Arc<dyn VersionSequencer>,
        transport: Arc<dyn SnapshotTransport>,
    ) -> Self {
        Self {
            rows,
            sequencer,
            transport,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            cycle: Mutex::new(()),
        }
    }

    /// Bound on each store round trip (row fetch, counter read, counter write)
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub async fn publish_once(&self) -> Result<PublishReceipt> {
        let _cycle = self.cycle.lock().await;

        let rows = self
            .bounded("fetch rows", fetch_rows(self.rows.as_ref()))
            .await?;
        let current = self
            .bounded("read version", self.sequencer.current())
            .await?;
        let next = VersionRecord::new(current).next()?;

        let payload = build_snapshot(next, &rows)?;
        let summary = decode_summary(&payload)?;
        let bytes = payload.len();

        if let Err(e) = self.transport.transmit(payload).await {
            warn!(version = next, error = %e, "snapshot not delivered; version counter unchanged");
            return Err(e);
        }

        if let Err(e) = self.bounded("record version", self.sequencer.advance(next)).await {
            error!(
                version = next,
                error = %e,
                "snapshot delivered but version was not recorded; the next cycle will reuse this version"
            );
            return Err(e);
        }

        info!(
            version = next,
            bytes,
            instruments = summary.counts.instruments,
            etf = summary.counts.etf,
            options = summary.counts.options,
            risk_limits = summary.counts.risk_limits,
            "published config snapshot"
        );
        Ok(PublishReceipt {
            version: next,
            counts: summary.counts,
            bytes,
            ts_nanos: summary.ts_nanos,
        })
    }

    async fn bounded<T>(&self, step: &'static str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| ProtocolError::Timeout {
                step,
                millis: self.store_timeout.as_millis() as u64,
            })?
    }
}

/// `POST /publish` runs one cycle; `GET /healthz` is a liveness probe
pub fn router(publisher: Arc<Publisher>) -> Router {
    Router::new()
        .route("/publish", post(publish_handler))
        .route("/healthz", get(healthz))
        .with_state(publisher)
}

async fn publish_handler(State(publisher): State<Arc<Publisher>>) -> (StatusCode, String) {
    match publisher.publish_once().await {
        Ok(_) => (StatusCode::OK, "ok\n".to_string()),
        Err(e) => {
            error!(error = %e, "publish cycle failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn healthz() -> &'static str {
    "ok\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::wire::{
        decode_snapshot, EtfComponentRow, InstrumentRow, OptionMetaRow, RiskLimitRow, SnapshotRows,
    };
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: StdMutex<Vec<Bytes>>,
        fail: StdMutex<bool>,
    }

    impl RecordingTransport {
        fn set_failing(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }
    }

    #[async_trait]
    impl SnapshotTransport for RecordingTransport {
        async fn transmit(&self, payload: Bytes) -> Result<()> {
            if *self.fail.lock().unwrap() {
                return Err(ProtocolError::Transmission {
                    status: Some(503),
                    reason: "engine unavailable".into(),
                });
            }
            self.sent.lock().unwrap().push(payload);
            Ok(())
        }
    }

    fn rows() -> SnapshotRows {
        SnapshotRows {
            instruments: vec![InstrumentRow {
                id: 1,
                symbol: "AAPL".into(),
                kind: 0,
                currency: None,
                tick_size_nanos: 10_000_000,
                tick_size_ticks: 1,
                lot_size_lots: 1,
                meta: 0,
            }],
            ..Default::default()
        }
    }

    fn publisher(store: &Arc<MemoryStore>, transport: &Arc<RecordingTransport>) -> Publisher {
        Publisher::new(store.clone(), store.clone(), transport.clone())
    }

    #[tokio::test]
    async fn test_successful_cycle_advances_counter() {
        let store = Arc::new(MemoryStore::new(rows()));
        let transport = Arc::new(RecordingTransport::default());
        let publisher = publisher(&store, &transport);

        let receipt = publisher.publish_once().await.unwrap();
        assert_eq!(receipt.version, 1);
        assert_eq!(receipt.counts.instruments, 1);
        assert_eq!(store.current().await.unwrap(), 1);

        let sent = transport.sent.lock().unwrap();
        let snapshot = decode_snapshot(&sent[0]).unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.instruments[0].symbol, "AAPL");
    }

    #[tokio::test]
    async fn test_failed_transmit_keeps_counter_and_retry_reuses_version() {
        let store = Arc::new(MemoryStore::new(rows()).with_version(4));
        let transport = Arc::new(RecordingTransport::default());
        transport.set_failing(true);
        let publisher = publisher(&store, &transport);

        let err = publisher.publish_once().await.unwrap_err();
        assert!(matches!(err, ProtocolError::Transmission { status: Some(503), .. }));
        assert_eq!(store.current().await.unwrap(), 4);

        transport.set_failing(false);
        let receipt = publisher.publish_once().await.unwrap();
        assert_eq!(receipt.version, 5);
        assert_eq!(store.current().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_counter_overflow_stops_before_transmit() {
        let store = Arc::new(MemoryStore::new(rows()).with_version(u64::MAX));
        let transport = Arc::new(RecordingTransport::default());
        let err = publisher(&store, &transport).publish_once().await.unwrap_err();
        assert!(matches!(err, ProtocolError::VersionOverflow(_)));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_cycles_get_distinct_versions() {
        let store = Arc::new(MemoryStore::new(rows()));
        let transport = Arc::new(RecordingTransport::default());
        let publisher = Arc::new(publisher(&store, &transport));

        let (a, b) = tokio::join!(publisher.publish_once(), publisher.publish_once());
        let mut versions = vec![a.unwrap().version, b.unwrap().version];
        versions.sort();
        assert_eq!(versions, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_each_cycle_reads_fresh_rows() {
        let store = Arc::new(MemoryStore::new(rows()));
        let transport = Arc::new(RecordingTransport::default());
        let publisher = publisher(&store, &transport);
        publisher.publish_once().await.unwrap();

        let mut changed = rows();
        changed.instruments[0].symbol = "MSFT".into();
        store.set_rows(changed).unwrap();
        let receipt = publisher.publish_once().await.unwrap();
        assert_eq!(receipt.version, 2);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(decode_snapshot(&sent[1]).unwrap().instruments[0].symbol, "MSFT");
    }

    /// Store whose selected call never completes in time
    struct StallingStore {
        inner: MemoryStore,
        stall: &'static str,
    }

    impl StallingStore {
        fn new(stall: &'static str) -> Self {
            Self {
                inner: MemoryStore::new(rows()).with_version(3),
                stall,
            }
        }

        async fn maybe_stall(&self, call: &str) {
            if self.stall == call {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        }
    }

    #[async_trait]
    impl RowSource for StallingStore {
        async fn instruments(&self) -> Result<Vec<InstrumentRow>> {
            self.maybe_stall("instruments").await;
            self.inner.instruments().await
        }

        async fn etf_components(&self) -> Result<Vec<EtfComponentRow>> {
            self.inner.etf_components().await
        }

        async fn options(&self) -> Result<Vec<OptionMetaRow>> {
            self.inner.options().await
        }

        async fn risk_limits(&self) -> Result<Vec<RiskLimitRow>> {
            self.inner.risk_limits().await
        }
    }

    #[async_trait]
    impl VersionSequencer for StallingStore {
        async fn current(&self) -> Result<u64> {
            self.maybe_stall("current").await;
            self.inner.current().await
        }

        async fn advance(&self, next: u64) -> Result<()> {
            self.maybe_stall("advance").await;
            self.inner.advance(next).await
        }
    }

    async fn run_stalled(call: &'static str) -> (ProtocolError, Arc<StallingStore>, usize) {
        let store = Arc::new(StallingStore::new(call));
        let transport = Arc::new(RecordingTransport::default());
        let publisher = Publisher::new(store.clone(), store.clone(), transport.clone())
            .with_store_timeout(Duration::from_millis(50));
        let err = publisher.publish_once().await.unwrap_err();
        let sent = transport.sent.lock().unwrap().len();
        (err, store, sent)
    }

    #[tokio::test]
    async fn test_stalled_row_fetch_times_out_without_touching_counter() {
        let (err, store, sent) = run_stalled("instruments").await;
        assert!(matches!(
            err,
            ProtocolError::Timeout {
                step: "fetch rows",
                millis: 50
            }
        ));
        assert!(err.is_retryable());
        assert_eq!(store.inner.stored_version().unwrap(), Some(3));
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn test_stalled_counter_read_times_out_without_transmitting() {
        let (err, store, sent) = run_stalled("current").await;
        assert!(matches!(err, ProtocolError::Timeout { step: "read version", .. }));
        assert_eq!(store.inner.stored_version().unwrap(), Some(3));
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn test_stalled_counter_write_is_reported_after_delivery() {
        let (err, store, sent) = run_stalled("advance").await;
        assert!(matches!(err, ProtocolError::Timeout { step: "record version", .. }));
        assert_eq!(store.inner.stored_version().unwrap(), Some(3));
        assert_eq!(sent, 1);
    }
}
