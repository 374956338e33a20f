//! Schema structural extraction
//!
//! Reduces schema IDL text to a [`StructuralSnapshot`]. The parse is purely
//! structural: enums keep their `(name, value)` entries, tables and structs keep
//! their field names, unions keep their member names, all in declaration order.
//! Types, attributes, defaults and cross-references are not interpreted.

pub mod lexer;

use std::collections::BTreeMap;

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::schema::{EnumEntry, StructuralSnapshot};

use lexer::{parse_int, Token, TokenKind};

/// Keywords whose statements carry no structure the gate cares about
const IGNORED_STATEMENTS: &[&str] = &[
    "namespace",
    "include",
    "native_include",
    "attribute",
    "root_type",
    "file_identifier",
    "file_extension",
    "rpc_service",
];

/// Snapshot plus whatever the extractor had to skip
#[derive(Debug, Clone)]
pub struct Extraction {
    pub snapshot: StructuralSnapshot,
    pub diagnostics: Diagnostics,
}

/// Extract the structural snapshot from schema source text
pub fn extract(source: &str) -> Extraction {
    let mut diagnostics = Diagnostics::new();
    let tokens = lexer::tokenize(source, &mut diagnostics);
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        diagnostics,
        snapshot: StructuralSnapshot::new(),
    };
    parser.run();
    Extraction {
        snapshot: parser.snapshot,
        diagnostics: parser.diagnostics,
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    diagnostics: Diagnostics,
    snapshot: StructuralSnapshot,
}

/// A declaration header and the token range of its braced body
struct Declaration<'a> {
    name: String,
    line: usize,
    body: &'a [Token],
}

impl<'a> Parser<'a> {
    fn run(&mut self) {
        let tokens = self.tokens;
        while let Some(token) = tokens.get(self.pos) {
            match token.ident() {
                Some("enum") => {
                    self.pos += 1;
                    if let Some(decl) = self.declaration("enum") {
                        let entries = self.enum_entries(&decl);
                        insert(&mut self.snapshot.enums, decl, entries, &mut self.diagnostics);
                    }
                }
                Some("table") | Some("struct") => {
                    let keyword = if token.ident() == Some("table") { "table" } else { "struct" };
                    self.pos += 1;
                    if let Some(decl) = self.declaration(keyword) {
                        let fields = self.record_fields(&decl);
                        insert(&mut self.snapshot.records, decl, fields, &mut self.diagnostics);
                    }
                }
                Some("union") => {
                    self.pos += 1;
                    if let Some(decl) = self.declaration("union") {
                        let members = self.union_members(&decl);
                        insert(&mut self.snapshot.unions, decl, members, &mut self.diagnostics);
                    }
                }
                Some(keyword) if IGNORED_STATEMENTS.contains(&keyword) => {
                    self.skip_statement();
                }
                _ => {
                    let line = token.line;
                    let what = describe(token);
                    self.diagnostics.push(
                        DiagnosticCode::UnknownDeclaration,
                        line,
                        None,
                        format!("unrecognized declaration starting with {}", what),
                    );
                    self.skip_statement();
                }
            }
        }
    }

    /// Parse `Name [: type] [(attrs)] { ... }` after the keyword
    fn declaration(&mut self, keyword: &str) -> Option<Declaration<'a>> {
        let tokens = self.tokens;
        let line = tokens.get(self.pos.saturating_sub(1)).map(|t| t.line).unwrap_or(1);

        let name = match qualified_name(tokens, self.pos) {
            Some((name, next)) => {
                self.pos = next;
                name
            }
            None => {
                self.diagnostics.push(
                    DiagnosticCode::MalformedEntry,
                    line,
                    None,
                    format!("{} declaration without a name", keyword),
                );
                // Re-skip from the keyword so a following body is consumed whole
                self.pos = self.pos.saturating_sub(1);
                self.skip_statement();
                return None;
            }
        };

        // Scan to the opening brace, stepping over attribute groups
        while let Some(token) = tokens.get(self.pos) {
            if token.is_punct('{') {
                break;
            }
            if token.is_punct(';') {
                self.diagnostics.push(
                    DiagnosticCode::MalformedEntry,
                    token.line,
                    Some(&name),
                    format!("{} declaration has no body", keyword),
                );
                self.pos += 1;
                return None;
            }
            if token.is_punct('(') || token.is_punct('[') {
                match matching_close(tokens, self.pos) {
                    Some(close) => self.pos = close + 1,
                    None => {
                        return self.unterminated(keyword, &name, line);
                    }
                }
                continue;
            }
            self.pos += 1;
        }

        let open = self.pos;
        if open >= tokens.len() {
            return self.unterminated(keyword, &name, line);
        }
        let close = match matching_close(tokens, open) {
            Some(close) => close,
            None => return self.unterminated(keyword, &name, line),
        };
        self.pos = close + 1;

        Some(Declaration {
            name,
            line,
            body: &tokens[open + 1..close],
        })
    }

    fn unterminated(&mut self, keyword: &str, name: &str, line: usize) -> Option<Declaration<'a>> {
        self.diagnostics.push(
            DiagnosticCode::UnterminatedDeclaration,
            line,
            Some(name),
            format!("{} body is not closed before end of input", keyword),
        );
        self.pos = self.tokens.len();
        None
    }

    fn enum_entries(&mut self, decl: &Declaration<'_>) -> Vec<EnumEntry> {
        let mut entries = Vec::new();
        let mut next_value: i64 = 0;

        for segment in split_top_level(decl.body, ',') {
            let Some(first) = segment.first() else {
                continue;
            };
            let Some(name) = first.ident() else {
                self.malformed(decl, first.line, format!("enum entry starts with {}", describe(first)));
                continue;
            };

            let value = match segment.get(1) {
                None => Some(next_value),
                Some(t) if t.is_punct('=') => signed_int(&segment[2..]),
                Some(t) if t.is_punct('(') => Some(next_value),
                Some(t) => {
                    self.malformed(decl, t.line, format!("unexpected {} after enum entry {}", describe(t), name));
                    continue;
                }
            };

            match value {
                Some(value) => {
                    entries.push(EnumEntry::new(name, value));
                    next_value = value.wrapping_add(1);
                }
                None => {
                    self.malformed(decl, first.line, format!("enum entry {} has a non-integer value", name));
                }
            }
        }

        entries
    }

    fn record_fields(&mut self, decl: &Declaration<'_>) -> Vec<String> {
        let mut fields = Vec::new();
        for segment in split_top_level(decl.body, ';') {
            let Some(first) = segment.first() else {
                continue;
            };
            match (first.ident(), segment.get(1)) {
                (Some(name), Some(colon)) if colon.is_punct(':') => fields.push(name.to_string()),
                _ => {
                    self.malformed(decl, first.line, format!("field declaration starts with {}", describe(first)));
                }
            }
        }
        fields
    }

    fn union_members(&mut self, decl: &Declaration<'_>) -> Vec<String> {
        let mut members = Vec::new();
        for segment in split_top_level(decl.body, ',') {
            let Some(first) = segment.first() else {
                continue;
            };
            match qualified_name(segment, 0) {
                Some((name, _)) => members.push(name),
                None => {
                    self.malformed(decl, first.line, format!("union member starts with {}", describe(first)));
                }
            }
        }
        members
    }

    fn malformed(&mut self, decl: &Declaration<'_>, line: usize, message: String) {
        self.diagnostics
            .push(DiagnosticCode::MalformedEntry, line, Some(&decl.name), message);
    }

    /// Advance past the next `;` or balanced `{...}` group at depth zero
    fn skip_statement(&mut self) {
        let tokens = self.tokens;
        self.pos += 1;
        while let Some(token) = tokens.get(self.pos) {
            if token.is_punct(';') {
                self.pos += 1;
                return;
            }
            if token.is_punct('{') || token.is_punct('(') || token.is_punct('[') {
                match matching_close(tokens, self.pos) {
                    Some(close) => {
                        self.pos = close + 1;
                        if token.is_punct('{') {
                            return;
                        }
                        continue;
                    }
                    None => {
                        self.pos = tokens.len();
                        return;
                    }
                }
            }
            // A new top-level declaration keyword ends a statement missing its `;`
            if matches!(token.ident(), Some("enum" | "table" | "struct" | "union")) {
                return;
            }
            self.pos += 1;
        }
    }
}

fn insert<T>(
    map: &mut BTreeMap<String, Vec<T>>,
    decl: Declaration<'_>,
    entries: Vec<T>,
    diagnostics: &mut Diagnostics,
) {
    if map.insert(decl.name.clone(), entries).is_some() {
        diagnostics.push(
            DiagnosticCode::DuplicateDeclaration,
            decl.line,
            Some(&decl.name),
            "declared more than once; keeping the later declaration",
        );
    }
}

fn describe(token: &Token) -> String {
    match &token.kind {
        TokenKind::Ident(s) => format!("identifier `{}`", s),
        TokenKind::Number(s) => format!("number `{}`", s),
        TokenKind::Str(_) => "a string literal".to_string(),
        TokenKind::Punct(c) => format!("`{}`", c),
    }
}

/// `a.b.C` starting at `start`; returns the joined name and the next position
fn qualified_name(tokens: &[Token], start: usize) -> Option<(String, usize)> {
    let mut name = tokens.get(start)?.ident()?.to_string();
    let mut pos = start + 1;
    while let (Some(dot), Some(part)) = (tokens.get(pos), tokens.get(pos + 1)) {
        match (dot.is_punct('.'), part.ident()) {
            (true, Some(part)) => {
                name.push('.');
                name.push_str(part);
                pos += 2;
            }
            _ => break,
        }
    }
    Some((name, pos))
}

fn signed_int(tokens: &[Token]) -> Option<i64> {
    let (negative, rest) = match tokens.first() {
        Some(t) if t.is_punct('-') => (true, &tokens[1..]),
        Some(t) if t.is_punct('+') => (false, &tokens[1..]),
        _ => (false, tokens),
    };
    let value = match rest.first().map(|t| &t.kind) {
        Some(TokenKind::Number(text)) => parse_int(text)?,
        _ => return None,
    };
    // Trailing tokens other than an attribute group make the value ambiguous
    match rest.get(1) {
        None => {}
        Some(t) if t.is_punct('(') => {}
        Some(_) => return None,
    }
    Some(if negative { value.checked_neg()? } else { value })
}

/// Index of the bracket closing the one at `open`, honoring all bracket kinds
fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::Punct('{') | TokenKind::Punct('(') | TokenKind::Punct('[') => depth += 1,
            TokenKind::Punct('}') | TokenKind::Punct(')') | TokenKind::Punct(']') => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a body on `separator`, ignoring separators nested inside brackets
fn split_top_level(tokens: &[Token], separator: char) -> Vec<&[Token]> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Punct('{') | TokenKind::Punct('(') | TokenKind::Punct('[') => depth += 1,
            TokenKind::Punct('}') | TokenKind::Punct(')') | TokenKind::Punct(']') => {
                depth = depth.saturating_sub(1)
            }
            TokenKind::Punct(c) if c == separator && depth == 0 => {
                segments.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&tokens[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_entries_keep_order_and_values() {
        let ex = extract("enum Right : ubyte { CALL = 0, PUT = 1 }");
        assert_eq!(
            ex.snapshot.enums["Right"],
            vec![EnumEntry::new("CALL", 0), EnumEntry::new("PUT", 1)]
        );
        assert!(ex.diagnostics.is_empty());
    }

    #[test]
    fn test_enum_implicit_values_follow_previous() {
        let ex = extract("enum Side : byte { Buy, Sell = 5, Cross, Neg = -2, After }");
        let values: Vec<i64> = ex.snapshot.enums["Side"].iter().map(|e| e.value).collect();
        assert_eq!(values, vec![0, 5, 6, -2, -1]);
    }

    #[test]
    fn test_table_fields_ignore_types_and_attributes() {
        let src = r#"
            table Instrument {
                id: uint (key);
                symbol: string (required);
                tags: [string];
                price: long = 0;
                nested: Foo (deprecated, id: 7);
            }
        "#;
        let ex = extract(src);
        assert_eq!(
            ex.snapshot.records["Instrument"],
            vec!["id", "symbol", "tags", "price", "nested"]
        );
    }

    #[test]
    fn test_struct_is_a_record() {
        let ex = extract("struct Vec2 { x: float; y: float; }");
        assert_eq!(ex.snapshot.records["Vec2"], vec!["x", "y"]);
    }

    #[test]
    fn test_union_members_take_qualified_name() {
        let ex = extract("union Payload { ConfigSnapshot, ctc.Heartbeat, Alias: Other }");
        assert_eq!(
            ex.snapshot.unions["Payload"],
            vec!["ConfigSnapshot", "ctc.Heartbeat", "Alias"]
        );
    }

    #[test]
    fn test_comment_with_braces_does_not_truncate_body() {
        let src = "table T {\n  a: int; // closing } here\n  /* { */ b: int;\n}";
        let ex = extract(src);
        assert_eq!(ex.snapshot.records["T"], vec!["a", "b"]);
    }

    #[test]
    fn test_ignored_statements_are_silent() {
        let src = r#"
            namespace ctc.config;
            include "common.fbs";
            attribute "priority";
            file_identifier "CTCS";
            root_type ConfigSnapshot;
            rpc_service Control { Push(ConfigSnapshot): Ack; }
            table ConfigSnapshot { version: ulong; }
        "#;
        let ex = extract(src);
        assert!(ex.diagnostics.is_empty(), "{}", ex.diagnostics);
        assert_eq!(ex.snapshot.records.len(), 1);
    }

    #[test]
    fn test_unknown_declaration_is_reported_and_skipped() {
        let ex = extract("service Foo { bar: int; }\ntable T { a: int; }");
        assert_eq!(ex.diagnostics.count(DiagnosticCode::UnknownDeclaration), 1);
        assert_eq!(ex.snapshot.records["T"], vec!["a"]);
        assert!(!ex.snapshot.records.contains_key("Foo"));
    }

    #[test]
    fn test_malformed_enum_entry_is_skipped() {
        let ex = extract("enum E : int { A = 1, B = 2.5, C = 3 }");
        assert_eq!(
            ex.snapshot.enums["E"],
            vec![EnumEntry::new("A", 1), EnumEntry::new("C", 3)]
        );
        assert_eq!(ex.diagnostics.count(DiagnosticCode::MalformedEntry), 1);
    }

    #[test]
    fn test_duplicate_declaration_keeps_later() {
        let ex = extract("table T { a: int; }\ntable T { b: int; }");
        assert_eq!(ex.snapshot.records["T"], vec!["b"]);
        assert_eq!(ex.diagnostics.count(DiagnosticCode::DuplicateDeclaration), 1);
    }

    #[test]
    fn test_unterminated_body_is_reported() {
        let ex = extract("table T { a: int;");
        assert!(ex.snapshot.records.is_empty());
        assert_eq!(ex.diagnostics.count(DiagnosticCode::UnterminatedDeclaration), 1);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let src = "enum A : byte { X = 1 } table B { f: int; g: int; } union C { B }";
        let a = extract(src).snapshot.to_pretty_json().unwrap();
        let b = extract(src).snapshot.to_pretty_json().unwrap();
        assert_eq!(a, b);
    }
}
