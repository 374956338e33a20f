//! Schema evolution gate
//!
//! Extract → check against baseline → save baseline → regenerate bindings.
//! Any violation stops the run before the baseline or the bindings are touched.

use std::fs;
use std::path::PathBuf;

use tracing::{error, info};

use crate::baseline::{BaselineLock, BaselineStore};
use crate::checksum::Checksum;
use crate::codegen::{CodegenInvoker, GeneratedTarget};
use crate::compatibility::{check, ViolationReport};
use crate::diagnostics::Diagnostics;
use crate::error::{ProtocolError, Result};
use crate::extract::extract;
use crate::schema::StructuralSnapshot;

/// How far a gate run goes after a passing check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// Compare only; never writes the baseline
    Check,
    /// Compare, then record the new baseline; skip codegen
    BaselineOnly,
    /// Compare, record the baseline, regenerate bindings
    Generate,
}

impl GateMode {
    pub fn label(&self) -> &'static str {
        match self {
            GateMode::Check => "check",
            GateMode::BaselineOnly => "baseline",
            GateMode::Generate => "generate",
        }
    }

    fn writes_baseline(&self) -> bool {
        !matches!(self, GateMode::Check)
    }
}

/// What a successful gate run did
#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub mode: GateMode,
    pub schema_digest: Checksum,
    pub snapshot: StructuralSnapshot,
    /// No baseline existed, so the check was skipped
    pub baseline_was_absent: bool,
    pub baseline_updated: bool,
    pub diagnostics: Diagnostics,
    pub generated: Vec<GeneratedTarget>,
}

pub struct SchemaGate<'a> {
    schema_path: PathBuf,
    baseline: &'a dyn BaselineStore,
    codegen: Option<&'a dyn CodegenInvoker>,
}

impl<'a> SchemaGate<'a> {
    pub fn new(schema_path: impl Into<PathBuf>, baseline: &'a dyn BaselineStore) -> Self {
        Self {
            schema_path: schema_path.into(),
            baseline,
            codegen: None,
        }
    }

    pub fn with_codegen(mut self, codegen: &'a dyn CodegenInvoker) -> Self {
        self.codegen = Some(codegen);
        self
    }

    pub fn run(&self, mode: GateMode) -> Result<GateOutcome> {
        // Resolved up front so a missing invoker never leaves a saved baseline behind
        let codegen = match mode {
            GateMode::Generate => Some(self.codegen.ok_or_else(|| ProtocolError::Codegen {
                target: "*".to_string(),
                reason: "no codegen invoker configured".to_string(),
            })?),
            _ => None,
        };

        let _lock = match (mode.writes_baseline(), self.baseline.lock_path()) {
            (true, Some(path)) => Some(BaselineLock::acquire(path)?),
            _ => None,
        };

        let source = fs::read_to_string(&self.schema_path)?;
        let schema_digest = Checksum::from_str(&source);
        let extraction = extract(&source);
        extraction.diagnostics.log();

        let previous = self.baseline.load()?;
        let baseline_was_absent = previous.is_none();
        match &previous {
            Some(previous) => {
                let violations = check(previous, &extraction.snapshot);
                if !violations.is_empty() {
                    error!(
                        schema = %self.schema_path.display(),
                        violations = violations.len(),
                        "schema compatibility check failed"
                    );
                    return Err(ProtocolError::Incompatible(ViolationReport(violations)));
                }
            }
            None => {
                info!(schema = %self.schema_path.display(), "no baseline yet; accepting schema as the first baseline");
            }
        }

        let mut outcome = GateOutcome {
            mode,
            schema_digest,
            snapshot: extraction.snapshot,
            baseline_was_absent,
            baseline_updated: false,
            diagnostics: extraction.diagnostics,
            generated: Vec::new(),
        };

        if mode == GateMode::Check {
            info!(digest = outcome.schema_digest.short(), "schema compatibility OK");
            return Ok(outcome);
        }

        self.baseline.save(&outcome.snapshot)?;
        outcome.baseline_updated = true;

        if let Some(codegen) = codegen {
            outcome.generated = codegen.generate(&self.schema_path)?;
        }

        info!(
            digest = outcome.schema_digest.short(),
            generated = outcome.generated.len(),
            "schema gate passed"
        );
        Ok(outcome)
    }
}
