//! Diagnostics
//!
//! Collects the constructs the structural extractor skipped. None of these are
//! fatal: they are reported so an operator can see what the gate ignored.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing skipped constructs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Top-level keyword the extractor does not classify
    UnknownDeclaration,
    /// Entry inside a recognized declaration that could not be reduced
    MalformedEntry,
    /// Same name declared twice; the later declaration wins
    DuplicateDeclaration,
    /// Declaration body never closed before end of input
    UnterminatedDeclaration,
    /// Character sequence the tokenizer could not classify
    UnexpectedCharacter,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownDeclaration => "W001",
            Self::MalformedEntry => "W002",
            Self::DuplicateDeclaration => "W003",
            Self::UnterminatedDeclaration => "W004",
            Self::UnexpectedCharacter => "W005",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single skipped construct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    pub code: DiagnosticCode,
    /// 1-based source line
    pub line: usize,
    /// Declaration the construct belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] line {}: {}", self.code, self.line, self.message)?;
        if let Some(subject) = &self.subject {
            write!(f, " ({})", subject)?;
        }
        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        code: DiagnosticCode,
        line: usize,
        subject: Option<&str>,
        message: impl Into<String>,
    ) {
        self.items.push(DiagnosticItem {
            code,
            line,
            subject: subject.map(str::to_string),
            message: message.into(),
        });
    }

    pub fn items(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.items.iter().filter(|i| i.code == code).count()
    }

    /// Emit every item at warn level
    pub fn log(&self) {
        for item in &self.items {
            tracing::warn!(code = %item.code, line = item.line, "extractor skipped construct: {}", item);
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        Ok(())
    }
}
