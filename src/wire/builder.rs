//! Snapshot builder

use bytes::Bytes;
use chrono::Utc;
use flatbuffers::{FlatBufferBuilder, WIPOffset};

use super::rows::{
    EtfComponent, Instrument, OptionMeta, RiskLimit, SnapshotRows, DEFAULT_CURRENCY,
};
use super::tables as fb;
use crate::error::{ProtocolError, Result};

/// Largest payload the builder will attempt; FlatBuffers offsets are 31-bit
pub const MAX_PAYLOAD_BYTES: usize = 1 << 30;

/// Upper bound on one encoded row excluding its string bytes
const ROW_OVERHEAD: usize = 96;

/// Length prefix, terminator and padding around one string
const STRING_OVERHEAD: usize = 8;

/// Wall-clock nanoseconds since the Unix epoch
pub fn now_nanos() -> u64 {
    Utc::now()
        .timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or_default()
}

/// Build a snapshot payload stamped with the current time
pub fn build_snapshot(version: u64, rows: &SnapshotRows) -> Result<Bytes> {
    build_snapshot_at(version, rows, now_nanos())
}

/// Build a snapshot payload with an explicit timestamp.
///
/// Rows are written in the order given; the store is responsible for
/// ordering them by key. Nothing is cached between calls.
pub fn build_snapshot_at(version: u64, rows: &SnapshotRows, ts_nanos: u64) -> Result<Bytes> {
    if version == 0 {
        return Err(ProtocolError::Encode {
            field: "version",
            reason: "snapshot versions start at 1".to_string(),
        });
    }

    let estimate = estimated_size(rows);
    if estimate > MAX_PAYLOAD_BYTES {
        return Err(ProtocolError::Encode {
            field: "rows",
            reason: format!(
                "about {} bytes exceeds the {} byte payload limit",
                estimate, MAX_PAYLOAD_BYTES
            ),
        });
    }

    let mut fbb = FlatBufferBuilder::with_capacity(estimate);

    let instruments: Vec<_> = rows
        .instruments
        .iter()
        .map(|row| write_instrument(&mut fbb, &Instrument::from(row)))
        .collect();
    let etf: Vec<_> = rows
        .etf
        .iter()
        .map(|row| write_etf_component(&mut fbb, &EtfComponent::from(row)))
        .collect();
    let options: Vec<_> = rows
        .options
        .iter()
        .map(|row| write_option_meta(&mut fbb, &OptionMeta::from(row)))
        .collect();
    let risk_limits: Vec<_> = rows
        .risk_limits
        .iter()
        .map(|row| write_risk_limit(&mut fbb, &RiskLimit::from(row)))
        .collect();

    let args = fb::ConfigSnapshotArgs {
        version,
        instruments: Some(fbb.create_vector(&instruments)),
        etf: Some(fbb.create_vector(&etf)),
        options: Some(fbb.create_vector(&options)),
        risk_limits: Some(fbb.create_vector(&risk_limits)),
        ts_nanos,
    };
    let root = fb::ConfigSnapshot::create(&mut fbb, &args);
    fb::finish_config_snapshot_buffer(&mut fbb, root);

    let (buf, head) = fbb.collapse();
    Ok(Bytes::from(buf).slice(head..))
}

fn estimated_size(rows: &SnapshotRows) -> usize {
    let row_count =
        rows.instruments.len() + rows.etf.len() + rows.options.len() + rows.risk_limits.len();
    let string_bytes: usize = rows
        .instruments
        .iter()
        .map(|row| {
            let currency = row.currency.as_deref().unwrap_or(DEFAULT_CURRENCY).len();
            row.symbol.len() + currency + 2 * STRING_OVERHEAD
        })
        .sum();
    ROW_OVERHEAD
        .saturating_mul(row_count + 1)
        .saturating_add(string_bytes)
}

fn write_instrument<'a>(
    fbb: &mut FlatBufferBuilder<'a>,
    wire: &Instrument,
) -> WIPOffset<fb::Instrument<'a>> {
    let symbol = fbb.create_string(&wire.symbol);
    let currency = fbb.create_string(&wire.currency);
    fb::Instrument::create(
        fbb,
        &fb::InstrumentArgs {
            id: wire.id,
            symbol: Some(symbol),
            type_: wire.kind,
            currency: Some(currency),
            tick_size_nanos: wire.tick_size_nanos,
            tick_size_ticks: wire.tick_size_ticks,
            lot_size_lots: wire.lot_size_lots,
            meta: wire.meta,
        },
    )
}

fn write_etf_component<'a>(
    fbb: &mut FlatBufferBuilder<'a>,
    wire: &EtfComponent,
) -> WIPOffset<fb::EtfComponent<'a>> {
    fb::EtfComponent::create(
        fbb,
        &fb::EtfComponentArgs {
            etf_instrument_id: wire.etf_instrument_id,
            component_instrument_id: wire.component_instrument_id,
            weight_num: wire.weight_num,
            weight_den: wire.weight_den,
        },
    )
}

fn write_option_meta<'a>(
    fbb: &mut FlatBufferBuilder<'a>,
    wire: &OptionMeta,
) -> WIPOffset<fb::OptionMeta<'a>> {
    fb::OptionMeta::create(
        fbb,
        &fb::OptionMetaArgs {
            instrument_id: wire.instrument_id,
            underlying_instrument_id: wire.underlying_instrument_id,
            strike_ticks: wire.strike_ticks,
            right: wire.right,
            expiry_epoch_days: wire.expiry_epoch_days,
            multiplier: wire.multiplier,
        },
    )
}

fn write_risk_limit<'a>(
    fbb: &mut FlatBufferBuilder<'a>,
    wire: &RiskLimit,
) -> WIPOffset<fb::RiskLimit<'a>> {
    fb::RiskLimit::create(
        fbb,
        &fb::RiskLimitArgs {
            team_id: wire.team_id,
            instrument_id: wire.instrument_id,
            pos_min_lots: wire.pos_min_lots,
            pos_max_lots: wire.pos_max_lots,
            notional_max_ticks: wire.notional_max_ticks,
            max_orders_per_sec: wire.max_orders_per_sec,
        },
    )
}
