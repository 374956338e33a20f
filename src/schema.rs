//! Structural snapshot types
//!
//! A [`StructuralSnapshot`] is the normalized, order-preserving summary of a
//! schema that the compatibility gate compares and the baseline store persists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Baseline artifact format version
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// One `name = value` entry of an enumeration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumEntry {
    pub name: String,
    pub value: i64,
}

impl EnumEntry {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl std::fmt::Display for EnumEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Kind of declaration a snapshot entity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Enum,
    Record,
    Union,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Enum => "Enum",
            EntityKind::Record => "Record",
            EntityKind::Union => "Union",
        }
    }
}

/// Order-preserving structural summary of a schema.
///
/// Map keys are sorted so serialization is stable; the per-entity lists keep
/// declaration order, which is what the compatibility policy relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralSnapshot {
    #[serde(default = "default_format_version")]
    pub version: u32,
    #[serde(default)]
    pub enums: BTreeMap<String, Vec<EnumEntry>>,
    #[serde(default, alias = "tables")]
    pub records: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub unions: BTreeMap<String, Vec<String>>,
}

fn default_format_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

impl Default for StructuralSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_FORMAT_VERSION,
            enums: BTreeMap::new(),
            records: BTreeMap::new(),
            unions: BTreeMap::new(),
        }
    }
}

impl StructuralSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of named entities across all kinds
    pub fn entity_count(&self) -> usize {
        self.enums.len() + self.records.len() + self.unions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }

    /// Pretty JSON with sorted keys and a trailing newline, as written to disk
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_tables_key_is_read_as_records() {
        let json = r#"{
            "version": 1,
            "enums": { "Right": [ { "name": "CALL", "value": 0 } ] },
            "tables": { "Instrument": ["id", "symbol"] },
            "unions": {}
        }"#;
        let snapshot = StructuralSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.records["Instrument"], vec!["id", "symbol"]);
        assert_eq!(snapshot.enums["Right"][0], EnumEntry::new("CALL", 0));
    }

    #[test]
    fn test_serialized_keys_are_sorted() {
        let mut snapshot = StructuralSnapshot::new();
        snapshot.records.insert("Zeta".into(), vec!["a".into()]);
        snapshot.records.insert("Alpha".into(), vec!["b".into()]);
        let json = snapshot.to_pretty_json().unwrap();
        assert!(json.find("Alpha").unwrap() < json.find("Zeta").unwrap());
        assert!(json.ends_with('\n'));
        assert!(json.contains("\"records\""));
    }
}
