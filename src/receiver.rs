//! Receiver side of the snapshot contract
//!
//! Verifies the FlatBuffer and reads only the root's version and vector
//! lengths; rows are never materialized. No state is kept between requests;
//! every verdict goes to the `audit` log target.

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tracing::{info, warn};

use crate::checksum::Checksum;
use crate::wire::{decode_summary, DecodeError, RowCounts, MIN_PAYLOAD_BYTES};

pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Verdict on one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acceptance {
    Accepted { version: u64, counts: RowCounts },
    Rejected(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("version must be positive")]
    ZeroVersion,
    #[error("snapshot carries no instruments")]
    NoInstruments,
    #[error("payload failed verification: {0}")]
    Integrity(DecodeError),
}

/// Check a payload. `Err` means the bytes are not a config snapshot at all
/// (too short or a different file identifier).
pub fn accept(payload: &[u8]) -> Result<Acceptance, DecodeError> {
    let summary = match decode_summary(payload) {
        Ok(summary) => summary,
        Err(e @ DecodeError::Invalid(_)) => {
            return Ok(Acceptance::Rejected(RejectReason::Integrity(e)));
        }
        Err(e) => return Err(e),
    };

    if summary.version == 0 {
        return Ok(Acceptance::Rejected(RejectReason::ZeroVersion));
    }
    if summary.counts.instruments == 0 {
        return Ok(Acceptance::Rejected(RejectReason::NoInstruments));
    }
    Ok(Acceptance::Accepted {
        version: summary.version,
        counts: summary.counts,
    })
}

/// Run `accept` and map the verdict to an HTTP status and body
pub fn handle_payload(payload: &[u8]) -> (StatusCode, String) {
    let digest = Checksum::from_bytes(payload);
    match accept(payload) {
        Ok(Acceptance::Accepted { version, counts }) => {
            info!(
                target: "audit",
                version,
                instruments = counts.instruments,
                etf = counts.etf,
                options = counts.options,
                risk_limits = counts.risk_limits,
                bytes = payload.len(),
                digest = digest.short(),
                "config snapshot accepted"
            );
            (StatusCode::OK, "ok\n".to_string())
        }
        Ok(Acceptance::Rejected(reason)) => {
            warn!(
                target: "audit",
                reason = %reason,
                bytes = payload.len(),
                digest = digest.short(),
                "config snapshot rejected"
            );
            (StatusCode::BAD_REQUEST, format!("bad snapshot: {}\n", reason))
        }
        Err(e) => {
            warn!(
                target: "audit",
                error = %e,
                bytes = payload.len(),
                min_bytes = MIN_PAYLOAD_BYTES,
                "config snapshot undecodable"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, format!("error: {}\n", e))
        }
    }
}

/// `POST /config`, `GET /healthz`; anything else is 404
pub fn router(max_body_bytes: usize) -> Router {
    Router::new()
        .route("/config", post(config_handler))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

async fn config_handler(body: Bytes) -> (StatusCode, String) {
    handle_payload(&body)
}

async fn healthz() -> &'static str {
    "ok\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::tables as fb;
    use crate::wire::{build_snapshot_at, InstrumentRow, SnapshotRows};

    fn rows(instruments: usize) -> SnapshotRows {
        SnapshotRows {
            instruments: (0..instruments)
                .map(|i| InstrumentRow {
                    id: i as i64 + 1,
                    symbol: format!("SYM{}", i),
                    kind: 0,
                    currency: None,
                    tick_size_nanos: 1,
                    tick_size_ticks: 1,
                    lot_size_lots: 1,
                    meta: 0,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_accepts_well_formed_snapshot() {
        let payload = build_snapshot_at(3, &rows(2), 0).unwrap();
        match accept(&payload).unwrap() {
            Acceptance::Accepted { version, counts } => {
                assert_eq!(version, 3);
                assert_eq!(counts.instruments, 2);
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
        assert_eq!(handle_payload(&payload).0, StatusCode::OK);
    }

    #[test]
    fn test_rejects_empty_instrument_list() {
        let payload = build_snapshot_at(1, &rows(0), 0).unwrap();
        assert_eq!(
            accept(&payload).unwrap(),
            Acceptance::Rejected(RejectReason::NoInstruments)
        );
        assert_eq!(handle_payload(&payload).0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_rejects_zero_version() {
        // The builder refuses version 0, so write the root by hand
        let mut fbb = flatbuffers::FlatBufferBuilder::new();
        let symbol = fbb.create_string("SPY");
        let instrument = fb::Instrument::create(
            &mut fbb,
            &fb::InstrumentArgs {
                id: 1,
                symbol: Some(symbol),
                ..Default::default()
            },
        );
        let instruments = fbb.create_vector(&[instrument]);
        let root = fb::ConfigSnapshot::create(
            &mut fbb,
            &fb::ConfigSnapshotArgs {
                version: 0,
                instruments: Some(instruments),
                ..Default::default()
            },
        );
        fb::finish_config_snapshot_buffer(&mut fbb, root);

        assert_eq!(
            accept(fbb.finished_data()).unwrap(),
            Acceptance::Rejected(RejectReason::ZeroVersion)
        );
    }

    #[test]
    fn test_unverifiable_buffer_is_rejected_not_errored() {
        let mut payload = build_snapshot_at(1, &rows(1), 0).unwrap().to_vec();
        payload[0..4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            accept(&payload).unwrap(),
            Acceptance::Rejected(RejectReason::Integrity(DecodeError::Invalid(_)))
        ));
        let (status, body) = handle_payload(&payload);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("bad snapshot: payload failed verification"));
        assert!(body.ends_with('\n'));
    }

    #[test]
    fn test_other_file_identifier_is_a_decode_error() {
        let mut payload = build_snapshot_at(1, &rows(1), 0).unwrap().to_vec();
        payload[4..8].copy_from_slice(b"KENV");
        assert!(matches!(
            accept(&payload),
            Err(DecodeError::WrongIdentifier { .. })
        ));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        assert!(accept(b"hello").is_err());
        assert_eq!(handle_payload(b"hello").0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(handle_payload(&[0u8; 64]).0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
