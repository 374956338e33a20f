//! Snapshot decoding
//!
//! Every entry point checks the file identifier and runs the FlatBuffers
//! verifier over the whole buffer before touching a field, so accessors never
//! read out of bounds.

use flatbuffers::{ForwardsUOffset, Vector};
use serde::Serialize;

use super::rows::{
    ConfigSnapshot, EtfComponent, Instrument, OptionMeta, RiskLimit, DEFAULT_CURRENCY,
};
use super::tables as fb;
use super::DecodeError;

/// Root offset plus file identifier
pub const MIN_PAYLOAD_BYTES: usize = 8;

/// Vector lengths of the root table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub instruments: u32,
    pub etf: u32,
    pub options: u32,
    pub risk_limits: u32,
}

impl RowCounts {
    fn of(root: &fb::ConfigSnapshot<'_>) -> Self {
        Self {
            instruments: len(root.instruments()),
            etf: len(root.etf()),
            options: len(root.options()),
            risk_limits: len(root.risk_limits()),
        }
    }
}

/// Root scalars and vector lengths; rows are not materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub version: u64,
    pub ts_nanos: u64,
    pub counts: RowCounts,
    pub bytes: usize,
}

/// Verify the buffer and read the root's version, timestamp and row counts
pub fn decode_summary(bytes: &[u8]) -> Result<SnapshotSummary, DecodeError> {
    let root = verified_root(bytes)?;
    Ok(SnapshotSummary {
        version: root.version(),
        ts_nanos: root.ts_nanos(),
        counts: RowCounts::of(&root),
        bytes: bytes.len(),
    })
}

/// Decode every row
pub fn decode_snapshot(bytes: &[u8]) -> Result<ConfigSnapshot, DecodeError> {
    let root = verified_root(bytes)?;
    Ok(ConfigSnapshot {
        version: root.version(),
        instruments: rows(root.instruments(), instrument),
        etf: rows(root.etf(), etf_component),
        options: rows(root.options(), option_meta),
        risk_limits: rows(root.risk_limits(), risk_limit),
        ts_nanos: root.ts_nanos(),
    })
}

fn verified_root(bytes: &[u8]) -> Result<fb::ConfigSnapshot<'_>, DecodeError> {
    if bytes.len() < MIN_PAYLOAD_BYTES {
        return Err(DecodeError::TooShort {
            need: MIN_PAYLOAD_BYTES,
            got: bytes.len(),
        });
    }
    if !fb::config_snapshot_buffer_has_identifier(bytes) {
        return Err(DecodeError::WrongIdentifier {
            found: String::from_utf8_lossy(&bytes[4..MIN_PAYLOAD_BYTES]).into_owned(),
        });
    }
    Ok(fb::root_as_config_snapshot(bytes)?)
}

fn len<T>(vector: Option<Vector<'_, T>>) -> u32 {
    // Vector lengths are u32 on the wire
    vector.map_or(0, |v| v.len() as u32)
}

fn rows<'a, T, R>(
    vector: Option<Vector<'a, ForwardsUOffset<T>>>,
    convert: impl Fn(T) -> R,
) -> Vec<R>
where
    T: flatbuffers::Follow<'a, Inner = T> + 'a,
{
    vector
        .map(|v| v.iter().map(convert).collect())
        .unwrap_or_default()
}

fn instrument(t: fb::Instrument<'_>) -> Instrument {
    Instrument {
        id: t.id(),
        symbol: t.symbol().unwrap_or_default().to_string(),
        kind: t.type_(),
        currency: t.currency().unwrap_or(DEFAULT_CURRENCY).to_string(),
        tick_size_nanos: t.tick_size_nanos(),
        tick_size_ticks: t.tick_size_ticks(),
        lot_size_lots: t.lot_size_lots(),
        meta: t.meta(),
    }
}

fn etf_component(t: fb::EtfComponent<'_>) -> EtfComponent {
    EtfComponent {
        etf_instrument_id: t.etf_instrument_id(),
        component_instrument_id: t.component_instrument_id(),
        weight_num: t.weight_num(),
        weight_den: t.weight_den(),
    }
}

fn option_meta(t: fb::OptionMeta<'_>) -> OptionMeta {
    OptionMeta {
        instrument_id: t.instrument_id(),
        underlying_instrument_id: t.underlying_instrument_id(),
        strike_ticks: t.strike_ticks(),
        right: t.right(),
        expiry_epoch_days: t.expiry_epoch_days(),
        multiplier: t.multiplier(),
    }
}

fn risk_limit(t: fb::RiskLimit<'_>) -> RiskLimit {
    RiskLimit {
        team_id: t.team_id(),
        instrument_id: t.instrument_id(),
        pos_min_lots: t.pos_min_lots(),
        pos_max_lots: t.pos_max_lots(),
        notional_max_ticks: t.notional_max_ticks(),
        max_orders_per_sec: t.max_orders_per_sec(),
    }
}
