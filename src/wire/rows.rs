//! Row types
//!
//! `*Row` structs are what the store hands over (wide signed integers, dates,
//! optional strings). The wire records next to them are what the payload
//! carries after coercion. Conversion applies one fixed rule per field:
//!
//! | field                                                        | wire  | rule                     |
//! |--------------------------------------------------------------|-------|--------------------------|
//! | ids, tick/lot sizes, multiplier, max_orders_per_sec          | `u32` | modular truncation       |
//! | weight_num, weight_den, strike_ticks                         | `i32` | sign-preserving wrap     |
//! | instrument type, option right                                | `u8`  | modular truncation       |
//! | meta, pos_min_lots, pos_max_lots, notional_max_ticks         | `i64` | unchanged                |
//! | expiry                                                       | `u32` | days since 1970-01-01 UTC, modular truncation |
//! | currency                                                     | str   | `USD` when absent        |

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default currency for instruments stored without one
pub const DEFAULT_CURRENCY: &str = "USD";

/// Days from 0001-01-01 (CE day 1) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

pub mod coerce {
    //! Explicit integer coercions used when rows become wire records

    use super::*;

    pub fn wrap_u32(value: i64) -> u32 {
        value as u32
    }

    pub fn wrap_i32(value: i64) -> i32 {
        value as i32
    }

    pub fn wrap_u8(value: i64) -> u8 {
        value as u8
    }

    /// Whole days since 1970-01-01, truncated to `u32`
    pub fn epoch_days(date: NaiveDate) -> u32 {
        wrap_u32(i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE)
    }
}

// =============================================================================
// Store rows
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRow {
    pub id: i64,
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: i64,
    #[serde(default)]
    pub currency: Option<String>,
    pub tick_size_nanos: i64,
    pub tick_size_ticks: i64,
    pub lot_size_lots: i64,
    pub meta: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtfComponentRow {
    pub etf_instrument_id: i64,
    pub component_instrument_id: i64,
    pub weight_num: i64,
    pub weight_den: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionMetaRow {
    pub instrument_id: i64,
    pub underlying_instrument_id: i64,
    pub strike_ticks: i64,
    pub right: i64,
    pub expiry: NaiveDate,
    pub multiplier: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLimitRow {
    pub team_id: i64,
    pub instrument_id: i64,
    pub pos_min_lots: i64,
    pub pos_max_lots: i64,
    pub notional_max_ticks: i64,
    pub max_orders_per_sec: i64,
}

/// The four row sets one snapshot is built from, each already in key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRows {
    pub instruments: Vec<InstrumentRow>,
    pub etf: Vec<EtfComponentRow>,
    pub options: Vec<OptionMetaRow>,
    pub risk_limits: Vec<RiskLimitRow>,
}

// =============================================================================
// Wire records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: u32,
    pub symbol: String,
    pub kind: u8,
    pub currency: String,
    pub tick_size_nanos: u32,
    pub tick_size_ticks: u32,
    pub lot_size_lots: u32,
    pub meta: i64,
}

impl From<&InstrumentRow> for Instrument {
    fn from(row: &InstrumentRow) -> Self {
        Self {
            id: coerce::wrap_u32(row.id),
            symbol: row.symbol.clone(),
            kind: coerce::wrap_u8(row.kind),
            currency: row
                .currency
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            tick_size_nanos: coerce::wrap_u32(row.tick_size_nanos),
            tick_size_ticks: coerce::wrap_u32(row.tick_size_ticks),
            lot_size_lots: coerce::wrap_u32(row.lot_size_lots),
            meta: row.meta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtfComponent {
    pub etf_instrument_id: u32,
    pub component_instrument_id: u32,
    pub weight_num: i32,
    pub weight_den: i32,
}

impl From<&EtfComponentRow> for EtfComponent {
    fn from(row: &EtfComponentRow) -> Self {
        Self {
            etf_instrument_id: coerce::wrap_u32(row.etf_instrument_id),
            component_instrument_id: coerce::wrap_u32(row.component_instrument_id),
            weight_num: coerce::wrap_i32(row.weight_num),
            weight_den: coerce::wrap_i32(row.weight_den),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionMeta {
    pub instrument_id: u32,
    pub underlying_instrument_id: u32,
    pub strike_ticks: i32,
    pub right: u8,
    pub expiry_epoch_days: u32,
    pub multiplier: u32,
}

impl From<&OptionMetaRow> for OptionMeta {
    fn from(row: &OptionMetaRow) -> Self {
        Self {
            instrument_id: coerce::wrap_u32(row.instrument_id),
            underlying_instrument_id: coerce::wrap_u32(row.underlying_instrument_id),
            strike_ticks: coerce::wrap_i32(row.strike_ticks),
            right: coerce::wrap_u8(row.right),
            expiry_epoch_days: coerce::epoch_days(row.expiry),
            multiplier: coerce::wrap_u32(row.multiplier),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLimit {
    pub team_id: u32,
    pub instrument_id: u32,
    pub pos_min_lots: i64,
    pub pos_max_lots: i64,
    pub notional_max_ticks: i64,
    pub max_orders_per_sec: u32,
}

impl From<&RiskLimitRow> for RiskLimit {
    fn from(row: &RiskLimitRow) -> Self {
        Self {
            team_id: coerce::wrap_u32(row.team_id),
            instrument_id: coerce::wrap_u32(row.instrument_id),
            pos_min_lots: row.pos_min_lots,
            pos_max_lots: row.pos_max_lots,
            notional_max_ticks: row.notional_max_ticks,
            max_orders_per_sec: coerce::wrap_u32(row.max_orders_per_sec),
        }
    }
}

/// Fully decoded payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub version: u64,
    pub instruments: Vec<Instrument>,
    pub etf: Vec<EtfComponent>,
    pub options: Vec<OptionMeta>,
    pub risk_limits: Vec<RiskLimit>,
    pub ts_nanos: u64,
}
