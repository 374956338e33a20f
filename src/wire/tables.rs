//! Table views for `schema/config_snapshot.fbs`
//!
//! Laid out the way `flatc --rust` emits them: one zero-copy view per table
//! over a `flatbuffers::Table`, `VT_*` slot offsets in declaration order, an
//! `*Args` struct plus `create()` for writing, and a `Verifiable` impl so a
//! root can be checked before any accessor runs. Enum-typed fields are read
//! and written as their underlying `u8`.
//!
//! Slot offsets must follow the schema's field order; appending a field means
//! appending a slot here. `tests/contract_tests.rs` reads built payloads back
//! through slots derived from the schema text.

use flatbuffers::{
    FlatBufferBuilder, Follow, ForwardsUOffset, InvalidFlatbuffer, Table, Vector, Verifiable,
    Verifier, VOffsetT, WIPOffset,
};

/// File identifier stamped at bytes 4..8 of every snapshot
pub const CONFIG_SNAPSHOT_IDENTIFIER: &str = "CTCS";

// =============================================================================
// Instrument
// =============================================================================

#[derive(Copy, Clone, PartialEq)]
pub struct Instrument<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for Instrument<'a> {
    type Inner = Instrument<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: Table::new(buf, loc),
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct InstrumentArgs<'a> {
    pub id: u32,
    pub symbol: Option<WIPOffset<&'a str>>,
    pub type_: u8,
    pub currency: Option<WIPOffset<&'a str>>,
    pub tick_size_nanos: u32,
    pub tick_size_ticks: u32,
    pub lot_size_lots: u32,
    pub meta: i64,
}

impl<'a> Instrument<'a> {
    pub const VT_ID: VOffsetT = 4;
    pub const VT_SYMBOL: VOffsetT = 6;
    pub const VT_TYPE_: VOffsetT = 8;
    pub const VT_CURRENCY: VOffsetT = 10;
    pub const VT_TICK_SIZE_NANOS: VOffsetT = 12;
    pub const VT_TICK_SIZE_TICKS: VOffsetT = 14;
    pub const VT_LOT_SIZE_LOTS: VOffsetT = 16;
    pub const VT_META: VOffsetT = 18;

    pub fn create<'bldr>(
        fbb: &mut FlatBufferBuilder<'bldr>,
        args: &InstrumentArgs<'bldr>,
    ) -> WIPOffset<Instrument<'bldr>> {
        let start = fbb.start_table();
        fbb.push_slot::<i64>(Self::VT_META, args.meta, 0);
        fbb.push_slot::<u32>(Self::VT_LOT_SIZE_LOTS, args.lot_size_lots, 0);
        fbb.push_slot::<u32>(Self::VT_TICK_SIZE_TICKS, args.tick_size_ticks, 0);
        fbb.push_slot::<u32>(Self::VT_TICK_SIZE_NANOS, args.tick_size_nanos, 0);
        if let Some(x) = args.currency {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_CURRENCY, x);
        }
        if let Some(x) = args.symbol {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_SYMBOL, x);
        }
        fbb.push_slot::<u32>(Self::VT_ID, args.id, 0);
        fbb.push_slot::<u8>(Self::VT_TYPE_, args.type_, 0);
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }

    // Safety for every accessor below: the view was built over a verified
    // table whose slots hold the declared types.

    #[inline]
    pub fn id(&self) -> u32 {
        unsafe { self._tab.get::<u32>(Self::VT_ID, Some(0)).unwrap_or_default() }
    }

    #[inline]
    pub fn symbol(&self) -> Option<&'a str> {
        unsafe { self._tab.get::<ForwardsUOffset<&str>>(Self::VT_SYMBOL, None) }
    }

    #[inline]
    pub fn type_(&self) -> u8 {
        unsafe { self._tab.get::<u8>(Self::VT_TYPE_, Some(0)).unwrap_or_default() }
    }

    #[inline]
    pub fn currency(&self) -> Option<&'a str> {
        unsafe { self._tab.get::<ForwardsUOffset<&str>>(Self::VT_CURRENCY, None) }
    }

    #[inline]
    pub fn tick_size_nanos(&self) -> u32 {
        unsafe {
            self._tab
                .get::<u32>(Self::VT_TICK_SIZE_NANOS, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn tick_size_ticks(&self) -> u32 {
        unsafe {
            self._tab
                .get::<u32>(Self::VT_TICK_SIZE_TICKS, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn lot_size_lots(&self) -> u32 {
        unsafe {
            self._tab
                .get::<u32>(Self::VT_LOT_SIZE_LOTS, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn meta(&self) -> i64 {
        unsafe { self._tab.get::<i64>(Self::VT_META, Some(0)).unwrap_or_default() }
    }
}

impl Verifiable for Instrument<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u32>("id", Self::VT_ID, false)?
            .visit_field::<ForwardsUOffset<&str>>("symbol", Self::VT_SYMBOL, false)?
            .visit_field::<u8>("type", Self::VT_TYPE_, false)?
            .visit_field::<ForwardsUOffset<&str>>("currency", Self::VT_CURRENCY, false)?
            .visit_field::<u32>("tick_size_nanos", Self::VT_TICK_SIZE_NANOS, false)?
            .visit_field::<u32>("tick_size_ticks", Self::VT_TICK_SIZE_TICKS, false)?
            .visit_field::<u32>("lot_size_lots", Self::VT_LOT_SIZE_LOTS, false)?
            .visit_field::<i64>("meta", Self::VT_META, false)?
            .finish();
        Ok(())
    }
}

// =============================================================================
// EtfComponent
// =============================================================================

#[derive(Copy, Clone, PartialEq)]
pub struct EtfComponent<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for EtfComponent<'a> {
    type Inner = EtfComponent<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: Table::new(buf, loc),
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct EtfComponentArgs {
    pub etf_instrument_id: u32,
    pub component_instrument_id: u32,
    pub weight_num: i32,
    pub weight_den: i32,
}

impl<'a> EtfComponent<'a> {
    pub const VT_ETF_INSTRUMENT_ID: VOffsetT = 4;
    pub const VT_COMPONENT_INSTRUMENT_ID: VOffsetT = 6;
    pub const VT_WEIGHT_NUM: VOffsetT = 8;
    pub const VT_WEIGHT_DEN: VOffsetT = 10;

    pub fn create<'bldr>(
        fbb: &mut FlatBufferBuilder<'bldr>,
        args: &EtfComponentArgs,
    ) -> WIPOffset<EtfComponent<'bldr>> {
        let start = fbb.start_table();
        fbb.push_slot::<i32>(Self::VT_WEIGHT_DEN, args.weight_den, 0);
        fbb.push_slot::<i32>(Self::VT_WEIGHT_NUM, args.weight_num, 0);
        fbb.push_slot::<u32>(
            Self::VT_COMPONENT_INSTRUMENT_ID,
            args.component_instrument_id,
            0,
        );
        fbb.push_slot::<u32>(Self::VT_ETF_INSTRUMENT_ID, args.etf_instrument_id, 0);
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }

    #[inline]
    pub fn etf_instrument_id(&self) -> u32 {
        unsafe {
            self._tab
                .get::<u32>(Self::VT_ETF_INSTRUMENT_ID, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn component_instrument_id(&self) -> u32 {
        unsafe {
            self._tab
                .get::<u32>(Self::VT_COMPONENT_INSTRUMENT_ID, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn weight_num(&self) -> i32 {
        unsafe {
            self._tab
                .get::<i32>(Self::VT_WEIGHT_NUM, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn weight_den(&self) -> i32 {
        unsafe {
            self._tab
                .get::<i32>(Self::VT_WEIGHT_DEN, Some(0))
                .unwrap_or_default()
        }
    }
}

impl Verifiable for EtfComponent<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u32>("etf_instrument_id", Self::VT_ETF_INSTRUMENT_ID, false)?
            .visit_field::<u32>(
                "component_instrument_id",
                Self::VT_COMPONENT_INSTRUMENT_ID,
                false,
            )?
            .visit_field::<i32>("weight_num", Self::VT_WEIGHT_NUM, false)?
            .visit_field::<i32>("weight_den", Self::VT_WEIGHT_DEN, false)?
            .finish();
        Ok(())
    }
}

// =============================================================================
// OptionMeta
// =============================================================================

#[derive(Copy, Clone, PartialEq)]
pub struct OptionMeta<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for OptionMeta<'a> {
    type Inner = OptionMeta<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: Table::new(buf, loc),
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct OptionMetaArgs {
    pub instrument_id: u32,
    pub underlying_instrument_id: u32,
    pub strike_ticks: i32,
    pub right: u8,
    pub expiry_epoch_days: u32,
    pub multiplier: u32,
}

impl<'a> OptionMeta<'a> {
    pub const VT_INSTRUMENT_ID: VOffsetT = 4;
    pub const VT_UNDERLYING_INSTRUMENT_ID: VOffsetT = 6;
    pub const VT_STRIKE_TICKS: VOffsetT = 8;
    pub const VT_RIGHT: VOffsetT = 10;
    pub const VT_EXPIRY_EPOCH_DAYS: VOffsetT = 12;
    pub const VT_MULTIPLIER: VOffsetT = 14;

    pub fn create<'bldr>(
        fbb: &mut FlatBufferBuilder<'bldr>,
        args: &OptionMetaArgs,
    ) -> WIPOffset<OptionMeta<'bldr>> {
        let start = fbb.start_table();
        fbb.push_slot::<u32>(Self::VT_MULTIPLIER, args.multiplier, 0);
        fbb.push_slot::<u32>(Self::VT_EXPIRY_EPOCH_DAYS, args.expiry_epoch_days, 0);
        fbb.push_slot::<i32>(Self::VT_STRIKE_TICKS, args.strike_ticks, 0);
        fbb.push_slot::<u32>(
            Self::VT_UNDERLYING_INSTRUMENT_ID,
            args.underlying_instrument_id,
            0,
        );
        fbb.push_slot::<u32>(Self::VT_INSTRUMENT_ID, args.instrument_id, 0);
        fbb.push_slot::<u8>(Self::VT_RIGHT, args.right, 0);
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }

    #[inline]
    pub fn instrument_id(&self) -> u32 {
        unsafe {
            self._tab
                .get::<u32>(Self::VT_INSTRUMENT_ID, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn underlying_instrument_id(&self) -> u32 {
        unsafe {
            self._tab
                .get::<u32>(Self::VT_UNDERLYING_INSTRUMENT_ID, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn strike_ticks(&self) -> i32 {
        unsafe {
            self._tab
                .get::<i32>(Self::VT_STRIKE_TICKS, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn right(&self) -> u8 {
        unsafe { self._tab.get::<u8>(Self::VT_RIGHT, Some(0)).unwrap_or_default() }
    }

    #[inline]
    pub fn expiry_epoch_days(&self) -> u32 {
        unsafe {
            self._tab
                .get::<u32>(Self::VT_EXPIRY_EPOCH_DAYS, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn multiplier(&self) -> u32 {
        unsafe {
            self._tab
                .get::<u32>(Self::VT_MULTIPLIER, Some(0))
                .unwrap_or_default()
        }
    }
}

impl Verifiable for OptionMeta<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u32>("instrument_id", Self::VT_INSTRUMENT_ID, false)?
            .visit_field::<u32>(
                "underlying_instrument_id",
                Self::VT_UNDERLYING_INSTRUMENT_ID,
                false,
            )?
            .visit_field::<i32>("strike_ticks", Self::VT_STRIKE_TICKS, false)?
            .visit_field::<u8>("right", Self::VT_RIGHT, false)?
            .visit_field::<u32>("expiry_epoch_days", Self::VT_EXPIRY_EPOCH_DAYS, false)?
            .visit_field::<u32>("multiplier", Self::VT_MULTIPLIER, false)?
            .finish();
        Ok(())
    }
}

// =============================================================================
// RiskLimit
// =============================================================================

#[derive(Copy, Clone, PartialEq)]
pub struct RiskLimit<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for RiskLimit<'a> {
    type Inner = RiskLimit<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: Table::new(buf, loc),
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct RiskLimitArgs {
    pub team_id: u32,
    pub instrument_id: u32,
    pub pos_min_lots: i64,
    pub pos_max_lots: i64,
    pub notional_max_ticks: i64,
    pub max_orders_per_sec: u32,
}

impl<'a> RiskLimit<'a> {
    pub const VT_TEAM_ID: VOffsetT = 4;
    pub const VT_INSTRUMENT_ID: VOffsetT = 6;
    pub const VT_POS_MIN_LOTS: VOffsetT = 8;
    pub const VT_POS_MAX_LOTS: VOffsetT = 10;
    pub const VT_NOTIONAL_MAX_TICKS: VOffsetT = 12;
    pub const VT_MAX_ORDERS_PER_SEC: VOffsetT = 14;

    pub fn create<'bldr>(
        fbb: &mut FlatBufferBuilder<'bldr>,
        args: &RiskLimitArgs,
    ) -> WIPOffset<RiskLimit<'bldr>> {
        let start = fbb.start_table();
        fbb.push_slot::<i64>(Self::VT_NOTIONAL_MAX_TICKS, args.notional_max_ticks, 0);
        fbb.push_slot::<i64>(Self::VT_POS_MAX_LOTS, args.pos_max_lots, 0);
        fbb.push_slot::<i64>(Self::VT_POS_MIN_LOTS, args.pos_min_lots, 0);
        fbb.push_slot::<u32>(Self::VT_MAX_ORDERS_PER_SEC, args.max_orders_per_sec, 0);
        fbb.push_slot::<u32>(Self::VT_INSTRUMENT_ID, args.instrument_id, 0);
        fbb.push_slot::<u32>(Self::VT_TEAM_ID, args.team_id, 0);
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }

    #[inline]
    pub fn team_id(&self) -> u32 {
        unsafe { self._tab.get::<u32>(Self::VT_TEAM_ID, Some(0)).unwrap_or_default() }
    }

    #[inline]
    pub fn instrument_id(&self) -> u32 {
        unsafe {
            self._tab
                .get::<u32>(Self::VT_INSTRUMENT_ID, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn pos_min_lots(&self) -> i64 {
        unsafe {
            self._tab
                .get::<i64>(Self::VT_POS_MIN_LOTS, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn pos_max_lots(&self) -> i64 {
        unsafe {
            self._tab
                .get::<i64>(Self::VT_POS_MAX_LOTS, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn notional_max_ticks(&self) -> i64 {
        unsafe {
            self._tab
                .get::<i64>(Self::VT_NOTIONAL_MAX_TICKS, Some(0))
                .unwrap_or_default()
        }
    }

    #[inline]
    pub fn max_orders_per_sec(&self) -> u32 {
        unsafe {
            self._tab
                .get::<u32>(Self::VT_MAX_ORDERS_PER_SEC, Some(0))
                .unwrap_or_default()
        }
    }
}

impl Verifiable for RiskLimit<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u32>("team_id", Self::VT_TEAM_ID, false)?
            .visit_field::<u32>("instrument_id", Self::VT_INSTRUMENT_ID, false)?
            .visit_field::<i64>("pos_min_lots", Self::VT_POS_MIN_LOTS, false)?
            .visit_field::<i64>("pos_max_lots", Self::VT_POS_MAX_LOTS, false)?
            .visit_field::<i64>("notional_max_ticks", Self::VT_NOTIONAL_MAX_TICKS, false)?
            .visit_field::<u32>("max_orders_per_sec", Self::VT_MAX_ORDERS_PER_SEC, false)?
            .finish();
        Ok(())
    }
}

// =============================================================================
// ConfigSnapshot (root)
// =============================================================================

#[derive(Copy, Clone, PartialEq)]
pub struct ConfigSnapshot<'a> {
    pub _tab: Table<'a>,
}

impl<'a> Follow<'a> for ConfigSnapshot<'a> {
    type Inner = ConfigSnapshot<'a>;
    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: Table::new(buf, loc),
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct ConfigSnapshotArgs<'a> {
    pub version: u64,
    pub instruments: Option<WIPOffset<Vector<'a, ForwardsUOffset<Instrument<'a>>>>>,
    pub etf: Option<WIPOffset<Vector<'a, ForwardsUOffset<EtfComponent<'a>>>>>,
    pub options: Option<WIPOffset<Vector<'a, ForwardsUOffset<OptionMeta<'a>>>>>,
    pub risk_limits: Option<WIPOffset<Vector<'a, ForwardsUOffset<RiskLimit<'a>>>>>,
    pub ts_nanos: u64,
}

impl<'a> ConfigSnapshot<'a> {
    pub const VT_VERSION: VOffsetT = 4;
    pub const VT_INSTRUMENTS: VOffsetT = 6;
    pub const VT_ETF: VOffsetT = 8;
    pub const VT_OPTIONS: VOffsetT = 10;
    pub const VT_RISK_LIMITS: VOffsetT = 12;
    pub const VT_TS_NANOS: VOffsetT = 14;

    pub fn create<'bldr>(
        fbb: &mut FlatBufferBuilder<'bldr>,
        args: &ConfigSnapshotArgs<'bldr>,
    ) -> WIPOffset<ConfigSnapshot<'bldr>> {
        let start = fbb.start_table();
        fbb.push_slot::<u64>(Self::VT_TS_NANOS, args.ts_nanos, 0);
        fbb.push_slot::<u64>(Self::VT_VERSION, args.version, 0);
        if let Some(x) = args.risk_limits {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_RISK_LIMITS, x);
        }
        if let Some(x) = args.options {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_OPTIONS, x);
        }
        if let Some(x) = args.etf {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_ETF, x);
        }
        if let Some(x) = args.instruments {
            fbb.push_slot_always::<WIPOffset<_>>(Self::VT_INSTRUMENTS, x);
        }
        let o = fbb.end_table(start);
        WIPOffset::new(o.value())
    }

    #[inline]
    pub fn version(&self) -> u64 {
        unsafe { self._tab.get::<u64>(Self::VT_VERSION, Some(0)).unwrap_or_default() }
    }

    #[inline]
    pub fn instruments(&self) -> Option<Vector<'a, ForwardsUOffset<Instrument<'a>>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<Instrument>>>>(
                    Self::VT_INSTRUMENTS,
                    None,
                )
        }
    }

    #[inline]
    pub fn etf(&self) -> Option<Vector<'a, ForwardsUOffset<EtfComponent<'a>>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<EtfComponent>>>>(
                    Self::VT_ETF,
                    None,
                )
        }
    }

    #[inline]
    pub fn options(&self) -> Option<Vector<'a, ForwardsUOffset<OptionMeta<'a>>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<OptionMeta>>>>(
                    Self::VT_OPTIONS,
                    None,
                )
        }
    }

    #[inline]
    pub fn risk_limits(&self) -> Option<Vector<'a, ForwardsUOffset<RiskLimit<'a>>>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, ForwardsUOffset<RiskLimit>>>>(
                    Self::VT_RISK_LIMITS,
                    None,
                )
        }
    }

    #[inline]
    pub fn ts_nanos(&self) -> u64 {
        unsafe { self._tab.get::<u64>(Self::VT_TS_NANOS, Some(0)).unwrap_or_default() }
    }
}

impl Verifiable for ConfigSnapshot<'_> {
    #[inline]
    fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<u64>("version", Self::VT_VERSION, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<Instrument>>>>(
                "instruments",
                Self::VT_INSTRUMENTS,
                false,
            )?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<EtfComponent>>>>(
                "etf",
                Self::VT_ETF,
                false,
            )?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<OptionMeta>>>>(
                "options",
                Self::VT_OPTIONS,
                false,
            )?
            .visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<RiskLimit>>>>(
                "risk_limits",
                Self::VT_RISK_LIMITS,
                false,
            )?
            .visit_field::<u64>("ts_nanos", Self::VT_TS_NANOS, false)?
            .finish();
        Ok(())
    }
}

/// Verify `buf` and return its root. Does not check the file identifier.
pub fn root_as_config_snapshot(buf: &[u8]) -> Result<ConfigSnapshot<'_>, InvalidFlatbuffer> {
    flatbuffers::root::<ConfigSnapshot>(buf)
}

/// `buf` must be at least 8 bytes; shorter input panics inside `flatbuffers`
pub fn config_snapshot_buffer_has_identifier(buf: &[u8]) -> bool {
    flatbuffers::buffer_has_identifier(buf, CONFIG_SNAPSHOT_IDENTIFIER, false)
}

pub fn finish_config_snapshot_buffer<'a>(
    fbb: &mut FlatBufferBuilder<'a>,
    root: WIPOffset<ConfigSnapshot<'a>>,
) {
    fbb.finish(root, Some(CONFIG_SNAPSHOT_IDENTIFIER));
}
