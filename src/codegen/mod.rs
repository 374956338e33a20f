//! Code Generation
//!
//! Drives the external schema compiler to regenerate language bindings once the
//! gate has accepted a schema. Bindings always reflect the current schema in
//! full, so every target directory is wiped before the compiler runs.
//!
//! An invocation is all-or-nothing from the caller's point of view: the first
//! compiler failure aborts the run and is reported, even though directories
//! already cleared (or partly regenerated) stay that way.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ProtocolError, Result};

// =============================================================================
// Targets
// =============================================================================

/// Binding language understood by the schema compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    Ts,
    Python,
    Java,
    Cpp,
    Rust,
}

impl TargetLanguage {
    /// Compiler flags selecting this language
    pub fn flags(&self) -> &'static [&'static str] {
        match self {
            TargetLanguage::Ts => &["--ts", "--gen-object-api"],
            TargetLanguage::Python => &["--python"],
            TargetLanguage::Java => &["--java"],
            TargetLanguage::Cpp => &["--cpp"],
            TargetLanguage::Rust => &["--rust"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetLanguage::Ts => "ts",
            TargetLanguage::Python => "python",
            TargetLanguage::Java => "java",
            TargetLanguage::Cpp => "cpp",
            TargetLanguage::Rust => "rust",
        }
    }
}

/// One output area of the codegen step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodegenTarget {
    pub language: TargetLanguage,
    pub out_dir: PathBuf,
    /// Extra compiler arguments placed before `-o`
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl CodegenTarget {
    pub fn new(language: TargetLanguage, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            language,
            out_dir: out_dir.into(),
            extra_args: Vec::new(),
        }
    }
}

/// A target the compiler regenerated successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTarget {
    pub language: TargetLanguage,
    pub out_dir: PathBuf,
}

// =============================================================================
// Invoker
// =============================================================================

/// Regenerates bindings for an accepted schema
pub trait CodegenInvoker: Send + Sync {
    fn generate(&self, schema_path: &Path) -> Result<Vec<GeneratedTarget>>;
}

/// Runs a `flatc`-compatible compiler once per target
#[derive(Debug, Clone)]
pub struct FlatcInvoker {
    compiler: PathBuf,
    targets: Vec<CodegenTarget>,
}

impl FlatcInvoker {
    pub fn new(compiler: impl Into<PathBuf>, targets: Vec<CodegenTarget>) -> Self {
        Self {
            compiler: compiler.into(),
            targets,
        }
    }

    fn run_compiler(&self, target: &CodegenTarget, schema_path: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.compiler);
        cmd.args(target.language.flags())
            .args(&target.extra_args)
            .arg("-o")
            .arg(&target.out_dir)
            .arg(schema_path);

        info!(
            compiler = %self.compiler.display(),
            target = target.language.name(),
            out = %target.out_dir.display(),
            "running schema compiler"
        );

        let status = cmd.status().map_err(|e| ProtocolError::Codegen {
            target: target.language.name().to_string(),
            reason: format!("failed to launch {}: {}", self.compiler.display(), e),
        })?;

        if !status.success() {
            let reason = match status.code() {
                Some(code) => format!("{} exited with code {}", self.compiler.display(), code),
                None => format!("{} was terminated by a signal", self.compiler.display()),
            };
            return Err(ProtocolError::Codegen {
                target: target.language.name().to_string(),
                reason,
            });
        }
        Ok(())
    }
}

impl CodegenInvoker for FlatcInvoker {
    fn generate(&self, schema_path: &Path) -> Result<Vec<GeneratedTarget>> {
        if self.targets.is_empty() {
            warn!("no codegen targets configured; nothing regenerated");
            return Ok(Vec::new());
        }

        for target in &self.targets {
            clean_dir(&target.out_dir)?;
        }

        let mut generated = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            self.run_compiler(target, schema_path)?;
            generated.push(GeneratedTarget {
                language: target.language,
                out_dir: target.out_dir.clone(),
            });
        }

        info!(targets = generated.len(), "protocol codegen complete");
        Ok(generated)
    }
}

/// Remove a directory tree if present and recreate it empty
pub fn clean_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_clean_dir_removes_stale_artifacts() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("gen");
        fs::create_dir_all(out.join("old")).unwrap();
        fs::write(out.join("old/stale.ts"), "x").unwrap();
        clean_dir(&out).unwrap();
        assert!(out.exists());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_compiler_is_a_codegen_failure() {
        let dir = tempdir().unwrap();
        let invoker = FlatcInvoker::new(
            dir.path().join("no-such-flatc"),
            vec![CodegenTarget::new(TargetLanguage::Ts, dir.path().join("ts"))],
        );
        let err = invoker.generate(&dir.path().join("schema.fbs")).unwrap_err();
        match err {
            ProtocolError::Codegen { target, reason } => {
                assert_eq!(target, "ts");
                assert!(reason.contains("failed to launch"));
            }
            other => panic!("expected codegen failure, got {:?}", other),
        }
    }

    #[test]
    fn test_language_flags() {
        assert_eq!(TargetLanguage::Ts.flags(), &["--ts", "--gen-object-api"]);
        assert_eq!(TargetLanguage::Cpp.name(), "cpp");
        let target: CodegenTarget =
            toml::from_str("language = \"python\"\nout_dir = \"sdk-py/gen\"").unwrap();
        assert_eq!(target.language, TargetLanguage::Python);
        assert!(target.extra_args.is_empty());
    }
}
