//! Config snapshot wire format
//!
//! A payload is one FlatBuffer whose root is the `ConfigSnapshot` table of
//! `schema/config_snapshot.fbs`, finished with file identifier `CTCS`:
//!
//! ```text
//! +-----------------+  u32 root offset
//! | "CTCS"          |  file identifier
//! +-----------------+
//! | ConfigSnapshot  |  version, instruments, etf, options, risk_limits, ts_nanos
//! | vtables, rows   |  one table per row, slots in schema field order
//! +-----------------+
//! ```
//!
//! Every binding the gate generates reads these bytes directly. Rows are
//! tables with their own vtables, so a reader built before an appended field
//! skips the new slot instead of misreading the rows after it.
//!
//! The receiver only needs the root's version and vector lengths. Full row
//! decoding is available for consumers and tests.

mod builder;
mod decoder;
mod rows;
pub mod tables;

pub use builder::{build_snapshot, build_snapshot_at, now_nanos, MAX_PAYLOAD_BYTES};
pub use decoder::{decode_snapshot, decode_summary, RowCounts, SnapshotSummary, MIN_PAYLOAD_BYTES};
pub use rows::{
    coerce, ConfigSnapshot, EtfComponent, EtfComponentRow, Instrument, InstrumentRow, OptionMeta,
    OptionMetaRow, RiskLimit, RiskLimitRow, SnapshotRows, DEFAULT_CURRENCY,
};
pub use tables::CONFIG_SNAPSHOT_IDENTIFIER;

use flatbuffers::InvalidFlatbuffer;
use thiserror::Error;

/// Why a byte buffer could not be read as a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("need at least {need} bytes, got {got}")]
    TooShort { need: usize, got: usize },

    #[error("file identifier {found:?}, expected {CONFIG_SNAPSHOT_IDENTIFIER:?}")]
    WrongIdentifier { found: String },

    #[error("invalid flatbuffer: {}", .0.to_string().trim_end())]
    Invalid(#[from] InvalidFlatbuffer),
}
