//! CTC config snapshot protocol
//!
//! Two pipelines share one schema definition as their contract.
//!
//! ## Build time: schema evolution gate
//!
//! - **Extraction**: structural snapshot (enums, records, unions) from schema text
//! - **Compatibility**: append-only check against the accepted baseline
//! - **Baseline**: last accepted snapshot, written only after a passing check
//! - **Codegen**: language bindings regenerated from scratch after acceptance
//!
//! ## Run time: versioned config snapshots
//!
//! - **Wire**: one verified FlatBuffer rooted at `ConfigSnapshot`
//! - **Version sequencing**: durable counter, advanced only after delivery
//! - **Publisher**: fetch rows → next version → build → transmit → commit
//! - **Receiver**: verified root, version and row counts only
//!
//! ## Layout
//!
//! ```text
//! schema/
//! ├── config_snapshot.fbs         # the contract
//! └── config_snapshot.abi.json    # accepted baseline
//! ```

pub mod baseline;
pub mod checksum;
pub mod codegen;
pub mod compatibility;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod gate;
pub mod logging;
pub mod publisher;
pub mod receiver;
pub mod schema;
pub mod store;
pub mod transport;
pub mod version;
pub mod wire;

pub use baseline::{BaselineStore, FileBaselineStore, MemoryBaselineStore};
pub use checksum::Checksum;
pub use codegen::{CodegenInvoker, CodegenTarget, FlatcInvoker, TargetLanguage};
pub use compatibility::{check, CompatibilityViolation, ViolationKind, ViolationReport};
pub use config::ProtocolConfig;
pub use error::{ProtocolError, Result};
pub use extract::{extract, Extraction};
pub use gate::{GateMode, GateOutcome, SchemaGate};
pub use publisher::{PublishReceipt, Publisher};
pub use receiver::{accept, Acceptance, RejectReason};
pub use schema::{EntityKind, EnumEntry, StructuralSnapshot};
pub use store::{MemoryStore, RowSource, SqliteStore};
pub use transport::{HttpTransport, SnapshotTransport};
pub use version::{VersionRecord, VersionSequencer};
pub use wire::{build_snapshot, decode_snapshot, decode_summary, DecodeError, SnapshotRows};
