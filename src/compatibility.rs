//! Schema compatibility checking
//!
//! Enforces append-only evolution between the accepted baseline and a freshly
//! extracted snapshot. Record field order decides wire offsets and enum values
//! are what travels on the wire, so every existing position is part of the
//! identity of an entry: only trailing additions are compatible.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{EntityKind, StructuralSnapshot};

/// Kind of compatibility break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A previously declared enum is gone
    EnumRemoved,
    /// An enum entry changed name or value at an existing index
    EnumEntryChanged,
    /// A previously declared record is gone
    RecordRemoved,
    /// A record field changed at an existing index
    FieldChanged,
    /// A previously declared union is gone
    UnionRemoved,
    /// A union variant changed at an existing index
    VariantChanged,
}

impl ViolationKind {
    pub fn entity(&self) -> EntityKind {
        match self {
            ViolationKind::EnumRemoved | ViolationKind::EnumEntryChanged => EntityKind::Enum,
            ViolationKind::RecordRemoved | ViolationKind::FieldChanged => EntityKind::Record,
            ViolationKind::UnionRemoved | ViolationKind::VariantChanged => EntityKind::Union,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(
            self,
            ViolationKind::EnumRemoved | ViolationKind::RecordRemoved | ViolationKind::UnionRemoved
        )
    }
}

/// A single structural break between two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityViolation {
    pub kind: ViolationKind,
    /// Name of the enum, record or union
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// `None` when the new declaration is shorter than the old one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl CompatibilityViolation {
    fn removed(kind: ViolationKind, subject: &str) -> Self {
        Self {
            kind,
            subject: subject.to_string(),
            index: None,
            expected: None,
            actual: None,
        }
    }

    fn changed(kind: ViolationKind, subject: &str, index: usize, expected: String, actual: Option<String>) -> Self {
        Self {
            kind,
            subject: subject.to_string(),
            index: Some(index),
            expected: Some(expected),
            actual,
        }
    }
}

impl fmt::Display for CompatibilityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = self.kind.entity().label();
        if self.kind.is_removal() {
            return write!(f, "{} removed: {}", entity, self.subject);
        }
        let what = match self.kind {
            ViolationKind::FieldChanged => " field",
            ViolationKind::VariantChanged => " variant",
            _ => "",
        };
        write!(
            f,
            "{} {}{} changed at index {}: {} -> {}",
            entity,
            self.subject,
            what,
            self.index.unwrap_or_default(),
            self.expected.as_deref().unwrap_or("<none>"),
            self.actual.as_deref().unwrap_or("<missing>"),
        )
    }
}

/// Ordered list of violations from one check, rendered one per line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationReport(pub Vec<CompatibilityViolation>);

impl ViolationReport {
    pub fn violations(&self) -> &[CompatibilityViolation] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, " - {}", v)?;
        }
        Ok(())
    }
}

/// Compare `previous` against `next` under the append-only policy.
///
/// Returns every violation, enums first, then records, then unions, each in
/// name order. An empty list means `next` is safe to accept.
pub fn check(previous: &StructuralSnapshot, next: &StructuralSnapshot) -> Vec<CompatibilityViolation> {
    let mut violations = Vec::new();

    for (name, old) in &previous.enums {
        let Some(new) = next.enums.get(name) else {
            violations.push(CompatibilityViolation::removed(ViolationKind::EnumRemoved, name));
            continue;
        };
        for (i, a) in old.iter().enumerate() {
            let b = new.get(i);
            if b != Some(a) {
                violations.push(CompatibilityViolation::changed(
                    ViolationKind::EnumEntryChanged,
                    name,
                    i,
                    a.to_string(),
                    b.map(|e| e.to_string()),
                ));
            }
        }
    }

    compare_lists(&previous.records, &next.records, ViolationKind::RecordRemoved, ViolationKind::FieldChanged, &mut violations);
    compare_lists(&previous.unions, &next.unions, ViolationKind::UnionRemoved, ViolationKind::VariantChanged, &mut violations);

    violations
}

fn compare_lists(
    previous: &std::collections::BTreeMap<String, Vec<String>>,
    next: &std::collections::BTreeMap<String, Vec<String>>,
    removed: ViolationKind,
    changed: ViolationKind,
    violations: &mut Vec<CompatibilityViolation>,
) {
    for (name, old) in previous {
        let Some(new) = next.get(name) else {
            violations.push(CompatibilityViolation::removed(removed, name));
            continue;
        };
        for (i, a) in old.iter().enumerate() {
            let b = new.get(i);
            if b != Some(a) {
                violations.push(CompatibilityViolation::changed(changed, name, i, a.clone(), b.cloned()));
            }
        }
    }
}
