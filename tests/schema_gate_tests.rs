//! Schema gate tests
//!
//! Drive the full extract → check → save → codegen flow against on-disk
//! baselines and the fixtures in `tests/fixtures/`.

use std::fs;
use std::path::{Path, PathBuf};

use ctc_protocol::baseline::{BaselineLock, BaselineStore, FileBaselineStore};
use ctc_protocol::codegen::{CodegenTarget, FlatcInvoker, TargetLanguage};
use ctc_protocol::compatibility::ViolationKind;
use ctc_protocol::gate::{GateMode, SchemaGate};
use ctc_protocol::ProtocolError;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Temp workspace holding a copy of one fixture as `envelope.fbs`
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn with_schema(name: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::copy(fixture(name), dir.path().join("envelope.fbs")).unwrap();
        Self { dir }
    }

    fn schema(&self) -> PathBuf {
        self.dir.path().join("envelope.fbs")
    }

    fn baseline(&self) -> FileBaselineStore {
        FileBaselineStore::new(self.dir.path().join("abi/envelope.abi.json"))
    }

    fn evolve_to(&self, name: &str) {
        fs::copy(fixture(name), self.schema()).unwrap();
    }

    fn out(&self, lang: &str) -> PathBuf {
        self.dir.path().join("gen").join(lang)
    }
}

#[test]
fn test_first_run_establishes_baseline_then_append_passes() {
    let ws = Workspace::with_schema("envelope_v1.fbs");
    let store = ws.baseline();

    let first = SchemaGate::new(ws.schema(), &store)
        .run(GateMode::BaselineOnly)
        .unwrap();
    assert!(first.baseline_was_absent);
    assert!(first.diagnostics.is_empty());

    ws.evolve_to("envelope_v2_append.fbs");
    let second = SchemaGate::new(ws.schema(), &store)
        .run(GateMode::BaselineOnly)
        .unwrap();
    assert!(!second.baseline_was_absent);

    let saved = store.load().unwrap().unwrap();
    assert_eq!(saved.enums["Right"].len(), 3);
    assert_eq!(saved.unions["Payload"], vec!["Quote", "Trade"]);
    assert!(saved.records.contains_key("Trade"));
}

#[test]
fn test_breaking_change_reports_every_violation_and_keeps_baseline() {
    let ws = Workspace::with_schema("envelope_v1.fbs");
    let store = ws.baseline();
    SchemaGate::new(ws.schema(), &store)
        .run(GateMode::BaselineOnly)
        .unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    ws.evolve_to("envelope_v2_breaking.fbs");
    let err = SchemaGate::new(ws.schema(), &store)
        .run(GateMode::BaselineOnly)
        .unwrap_err();

    let report = match err {
        ProtocolError::Incompatible(report) => report,
        other => panic!("expected incompatibility, got {:?}", other),
    };
    let kinds: Vec<ViolationKind> = report.violations().iter().map(|v| v.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ViolationKind::EnumEntryChanged,
            ViolationKind::EnumEntryChanged,
            ViolationKind::FieldChanged,
            ViolationKind::FieldChanged,
            ViolationKind::UnionRemoved,
        ]
    );
    let rendered = report.to_string();
    assert!(rendered.contains("Quote"));
    assert!(rendered.contains("Payload"));

    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    assert!(!store.lock_path().unwrap().exists());
}

#[test]
fn test_check_mode_does_not_create_baseline() {
    let ws = Workspace::with_schema("envelope_v1.fbs");
    let store = ws.baseline();
    let outcome = SchemaGate::new(ws.schema(), &store).run(GateMode::Check).unwrap();
    assert!(outcome.baseline_was_absent);
    assert!(!store.path().exists());
}

#[test]
fn test_held_lock_blocks_writing_runs_but_not_checks() {
    let ws = Workspace::with_schema("envelope_v1.fbs");
    let store = ws.baseline();
    let _held = BaselineLock::acquire(store.lock_path().unwrap()).unwrap();

    let err = SchemaGate::new(ws.schema(), &store)
        .run(GateMode::BaselineOnly)
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Locked(_)));

    assert!(SchemaGate::new(ws.schema(), &store).run(GateMode::Check).is_ok());
}

#[test]
fn test_legacy_tables_key_is_read() {
    let ws = Workspace::with_schema("envelope_v1.fbs");
    let store = ws.baseline();
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(
        store.path(),
        r#"{"version":1,"enums":{},"tables":{"Quote":["instrument_id","ask_ticks"]},"unions":{}}"#,
    )
    .unwrap();

    let err = SchemaGate::new(ws.schema(), &store).run(GateMode::Check).unwrap_err();
    let report = match err {
        ProtocolError::Incompatible(report) => report,
        other => panic!("expected incompatibility, got {:?}", other),
    };
    assert_eq!(report.len(), 1);
    assert_eq!(report.violations()[0].index, Some(1));
}

#[cfg(unix)]
mod codegen {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn install_fake_compiler(ws: &Workspace) -> PathBuf {
        let path = ws.dir.path().join("fake_flatc.sh");
        fs::copy(fixture("fake_flatc.sh"), &path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_generate_clears_and_regenerates_each_target() {
        let ws = Workspace::with_schema("envelope_v1.fbs");
        let store = ws.baseline();
        let compiler = install_fake_compiler(&ws);

        fs::create_dir_all(ws.out("ts")).unwrap();
        fs::write(ws.out("ts").join("stale.ts"), "old").unwrap();

        let invoker = FlatcInvoker::new(
            compiler,
            vec![
                CodegenTarget::new(TargetLanguage::Ts, ws.out("ts")),
                CodegenTarget::new(TargetLanguage::Python, ws.out("py")),
            ],
        );
        let outcome = SchemaGate::new(ws.schema(), &store)
            .with_codegen(&invoker)
            .run(GateMode::Generate)
            .unwrap();

        assert_eq!(outcome.generated.len(), 2);
        assert!(!ws.out("ts").join("stale.ts").exists());
        let ts_args = fs::read_to_string(ws.out("ts").join("ARGS")).unwrap();
        assert!(ts_args.starts_with("--ts --gen-object-api -o"));
        assert!(ts_args.trim_end().ends_with("envelope.fbs"));
        let py_args = fs::read_to_string(ws.out("py").join("ARGS")).unwrap();
        assert!(py_args.starts_with("--python -o"));
        assert!(store.path().exists());
    }

    #[test]
    fn test_failing_compiler_fails_the_run() {
        let ws = Workspace::with_schema("envelope_v1.fbs");
        let store = ws.baseline();
        let invoker = FlatcInvoker::new(
            "false",
            vec![CodegenTarget::new(TargetLanguage::Cpp, ws.out("cpp"))],
        );
        let err = SchemaGate::new(ws.schema(), &store)
            .with_codegen(&invoker)
            .run(GateMode::Generate)
            .unwrap_err();

        match err {
            ProtocolError::Codegen { target, reason } => {
                assert_eq!(target, "cpp");
                assert!(reason.contains("exited with code 1"));
            }
            other => panic!("expected codegen failure, got {:?}", other),
        }
        // The baseline was already accepted before codegen ran
        assert!(store.path().exists());
    }
}
