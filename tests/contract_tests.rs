//! The shipped schema, its baseline and the bytes on the wire must agree

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use flatbuffers::{
    field_index_to_field_offset, root_unchecked, Follow, ForwardsUOffset, Table, VOffsetT, Vector,
};
use ctc_protocol::baseline::{BaselineStore, FileBaselineStore};
use ctc_protocol::compatibility::check;
use ctc_protocol::extract::extract;
use ctc_protocol::schema::StructuralSnapshot;
use ctc_protocol::wire::tables as fb;
use ctc_protocol::wire::{
    build_snapshot_at, coerce, decode_summary, EtfComponentRow, InstrumentRow, OptionMetaRow,
    RiskLimitRow, SnapshotRows,
};

fn repo_path(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(rel)
}

fn shipped_schema() -> StructuralSnapshot {
    let source = fs::read_to_string(repo_path("schema/config_snapshot.fbs")).unwrap();
    let extraction = extract(&source);
    assert!(
        extraction.diagnostics.is_empty(),
        "unexpected diagnostics:\n{}",
        extraction.diagnostics
    );
    extraction.snapshot
}

#[test]
fn test_shipped_schema_matches_committed_baseline() {
    let baseline = FileBaselineStore::new(repo_path("schema/config_snapshot.abi.json"))
        .load()
        .unwrap()
        .expect("baseline is committed");
    let current = shipped_schema();

    let violations = check(&baseline, &current);
    assert!(violations.is_empty(), "{:?}", violations);
    assert_eq!(baseline, current);
}

#[test]
fn test_committed_baseline_is_canonical_json() {
    let raw = fs::read_to_string(repo_path("schema/config_snapshot.abi.json")).unwrap();
    assert_eq!(raw, shipped_schema().to_pretty_json().unwrap());
}

/// Slot offset of `record.field`, derived from the field's position in the
/// schema text. None of the records carry union fields, so every field takes
/// exactly one slot.
fn slot(schema: &StructuralSnapshot, record: &str, field: &str) -> VOffsetT {
    let fields = schema
        .records
        .get(record)
        .unwrap_or_else(|| panic!("{} missing from schema", record));
    let index = fields
        .iter()
        .position(|f| f == field)
        .unwrap_or_else(|| panic!("{}.{} missing from schema", record, field));
    field_index_to_field_offset(index as VOffsetT)
}

struct Record<'s, 'a> {
    schema: &'s StructuralSnapshot,
    name: &'static str,
    table: Table<'a>,
}

impl<'s, 'a> Record<'s, 'a> {
    fn scalar<T>(&self, field: &str) -> T
    where
        T: Follow<'a, Inner = T> + Default + 'a,
    {
        let slot = slot(self.schema, self.name, field);
        // Safe: the buffer passed the verifier before any table was taken
        unsafe { self.table.get::<T>(slot, Some(T::default())) }.unwrap_or_default()
    }

    fn string(&self, field: &str) -> &'a str {
        let slot = slot(self.schema, self.name, field);
        unsafe { self.table.get::<ForwardsUOffset<&str>>(slot, None) }
            .unwrap_or_else(|| panic!("{}.{} not written", self.name, field))
    }

    fn tables(&self, field: &str, of: &'static str) -> Vec<Record<'s, 'a>> {
        let slot = slot(self.schema, self.name, field);
        let vector = unsafe {
            self.table
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<Table<'a>>>>>(slot, None)
        }
        .unwrap_or_else(|| panic!("{}.{} not written", self.name, field));
        vector
            .iter()
            .map(|table| Record {
                schema: self.schema,
                name: of,
                table,
            })
            .collect()
    }
}

fn sample_rows() -> SnapshotRows {
    SnapshotRows {
        instruments: vec![InstrumentRow {
            id: 11,
            symbol: "SPY".into(),
            kind: 1,
            currency: Some("EUR".into()),
            tick_size_nanos: 10_000_000,
            tick_size_ticks: 2,
            lot_size_lots: 100,
            meta: -42,
        }],
        etf: vec![EtfComponentRow {
            etf_instrument_id: 11,
            component_instrument_id: 12,
            weight_num: -3,
            weight_den: 7,
        }],
        options: vec![OptionMetaRow {
            instrument_id: 13,
            underlying_instrument_id: 11,
            strike_ticks: 45_000,
            right: 1,
            expiry: NaiveDate::from_ymd_opt(2027, 3, 19).unwrap(),
            multiplier: 100,
        }],
        risk_limits: vec![RiskLimitRow {
            team_id: 5,
            instrument_id: 11,
            pos_min_lots: -250,
            pos_max_lots: 250,
            notional_max_ticks: 9_000_000_000,
            max_orders_per_sec: 40,
        }],
    }
}

#[test]
fn test_built_payload_reads_back_through_schema_slots() {
    let schema = shipped_schema();
    let rows = sample_rows();
    let payload = build_snapshot_at(77, &rows, 1_700_000_000_000_000_000).unwrap();
    decode_summary(&payload).unwrap();

    let root = Record {
        schema: &schema,
        name: "ConfigSnapshot",
        table: unsafe { root_unchecked::<Table>(&payload) },
    };
    assert_eq!(root.scalar::<u64>("version"), 77);
    assert_eq!(root.scalar::<u64>("ts_nanos"), 1_700_000_000_000_000_000);

    let instruments = root.tables("instruments", "Instrument");
    assert_eq!(instruments.len(), 1);
    let instrument = &instruments[0];
    assert_eq!(instrument.scalar::<u32>("id"), 11);
    assert_eq!(instrument.string("symbol"), "SPY");
    assert_eq!(instrument.scalar::<u8>("type"), 1);
    assert_eq!(instrument.string("currency"), "EUR");
    assert_eq!(instrument.scalar::<u32>("tick_size_nanos"), 10_000_000);
    assert_eq!(instrument.scalar::<u32>("tick_size_ticks"), 2);
    assert_eq!(instrument.scalar::<u32>("lot_size_lots"), 100);
    assert_eq!(instrument.scalar::<i64>("meta"), -42);

    let etf = root.tables("etf", "EtfComponent");
    assert_eq!(etf.len(), 1);
    assert_eq!(etf[0].scalar::<u32>("etf_instrument_id"), 11);
    assert_eq!(etf[0].scalar::<u32>("component_instrument_id"), 12);
    assert_eq!(etf[0].scalar::<i32>("weight_num"), -3);
    assert_eq!(etf[0].scalar::<i32>("weight_den"), 7);

    let options = root.tables("options", "OptionMeta");
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].scalar::<u32>("instrument_id"), 13);
    assert_eq!(options[0].scalar::<u32>("underlying_instrument_id"), 11);
    assert_eq!(options[0].scalar::<i32>("strike_ticks"), 45_000);
    assert_eq!(options[0].scalar::<u8>("right"), 1);
    assert_eq!(
        options[0].scalar::<u32>("expiry_epoch_days"),
        coerce::epoch_days(rows.options[0].expiry)
    );
    assert_eq!(options[0].scalar::<u32>("multiplier"), 100);

    let limits = root.tables("risk_limits", "RiskLimit");
    assert_eq!(limits.len(), 1);
    assert_eq!(limits[0].scalar::<u32>("team_id"), 5);
    assert_eq!(limits[0].scalar::<u32>("instrument_id"), 11);
    assert_eq!(limits[0].scalar::<i64>("pos_min_lots"), -250);
    assert_eq!(limits[0].scalar::<i64>("pos_max_lots"), 250);
    assert_eq!(limits[0].scalar::<i64>("notional_max_ticks"), 9_000_000_000);
    assert_eq!(limits[0].scalar::<u32>("max_orders_per_sec"), 40);
}

#[test]
fn test_every_schema_field_is_checked_on_the_wire() {
    // Keeps the slot test above honest when a field is appended
    let schema = shipped_schema();
    let counts: Vec<(&str, usize)> = [
        "Instrument",
        "EtfComponent",
        "OptionMeta",
        "RiskLimit",
        "ConfigSnapshot",
    ]
    .iter()
    .map(|name| (*name, schema.records[*name].len()))
    .collect();
    assert_eq!(
        counts,
        vec![
            ("Instrument", 8),
            ("EtfComponent", 4),
            ("OptionMeta", 6),
            ("RiskLimit", 6),
            ("ConfigSnapshot", 6),
        ]
    );
}

#[test]
fn test_table_views_use_schema_slots() {
    let schema = shipped_schema();
    let views: &[(&str, &str, VOffsetT)] = &[
        ("Instrument", "id", fb::Instrument::VT_ID),
        ("Instrument", "symbol", fb::Instrument::VT_SYMBOL),
        ("Instrument", "type", fb::Instrument::VT_TYPE_),
        ("Instrument", "currency", fb::Instrument::VT_CURRENCY),
        ("Instrument", "tick_size_nanos", fb::Instrument::VT_TICK_SIZE_NANOS),
        ("Instrument", "tick_size_ticks", fb::Instrument::VT_TICK_SIZE_TICKS),
        ("Instrument", "lot_size_lots", fb::Instrument::VT_LOT_SIZE_LOTS),
        ("Instrument", "meta", fb::Instrument::VT_META),
        ("ConfigSnapshot", "version", fb::ConfigSnapshot::VT_VERSION),
        ("ConfigSnapshot", "instruments", fb::ConfigSnapshot::VT_INSTRUMENTS),
        ("ConfigSnapshot", "etf", fb::ConfigSnapshot::VT_ETF),
        ("ConfigSnapshot", "options", fb::ConfigSnapshot::VT_OPTIONS),
        ("ConfigSnapshot", "risk_limits", fb::ConfigSnapshot::VT_RISK_LIMITS),
        ("ConfigSnapshot", "ts_nanos", fb::ConfigSnapshot::VT_TS_NANOS),
    ];
    for (record, field, vt) in views {
        assert_eq!(slot(&schema, record, field), *vt, "{}.{}", record, field);
    }
}

#[test]
fn test_enum_values_match_wire_bytes() {
    let schema = shipped_schema();
    let right: Vec<(String, i64)> = schema.enums["Right"]
        .iter()
        .map(|e| (e.name.clone(), e.value))
        .collect();
    assert_eq!(right, vec![("CALL".to_string(), 0), ("PUT".to_string(), 1)]);
    assert!(schema.enums["InstrumentType"]
        .iter()
        .all(|e| (0..=i64::from(u8::MAX)).contains(&e.value)));
}
