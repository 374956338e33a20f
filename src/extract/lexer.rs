//! Tokenizer for the schema IDL
//!
//! Produces identifiers, numeric literals, string literals and single-character
//! punctuation. Comments are dropped. Anything else is reported and skipped.

use crate::diagnostics::{DiagnosticCode, Diagnostics};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    /// Raw numeric literal text (`12`, `0x1F`, `1.5`); sign is a separate `-` token
    Number(String),
    Str(String),
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(s) => Some(s),
            _ => None,
        }
    }
}

const PUNCTUATION: &[char] = &['{', '}', '[', ']', '(', ')', ':', ';', ',', '=', '.', '-', '+', '<', '>'];

/// Split schema source into tokens
pub fn tokenize(source: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Comments
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            let start_line = line;
            i += 2;
            let mut closed = false;
            while i < chars.len() {
                if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                    i += 2;
                    closed = true;
                    break;
                }
                if chars[i] == '\n' {
                    line += 1;
                }
                i += 1;
            }
            if !closed {
                diagnostics.push(
                    DiagnosticCode::UnexpectedCharacter,
                    start_line,
                    None,
                    "unterminated block comment",
                );
            }
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(chars[start..i].iter().collect()),
                line,
            });
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number(chars[start..i].iter().collect()),
                line,
            });
            continue;
        }

        if c == '"' {
            let start_line = line;
            let mut value = String::new();
            i += 1;
            let mut closed = false;
            while i < chars.len() {
                match chars[i] {
                    '"' => {
                        i += 1;
                        closed = true;
                        break;
                    }
                    '\\' if i + 1 < chars.len() => {
                        value.push(chars[i + 1]);
                        i += 2;
                    }
                    '\n' => {
                        line += 1;
                        value.push('\n');
                        i += 1;
                    }
                    other => {
                        value.push(other);
                        i += 1;
                    }
                }
            }
            if !closed {
                diagnostics.push(
                    DiagnosticCode::UnexpectedCharacter,
                    start_line,
                    None,
                    "unterminated string literal",
                );
            }
            tokens.push(Token {
                kind: TokenKind::Str(value),
                line: start_line,
            });
            continue;
        }

        if PUNCTUATION.contains(&c) {
            tokens.push(Token {
                kind: TokenKind::Punct(c),
                line,
            });
        } else {
            diagnostics.push(
                DiagnosticCode::UnexpectedCharacter,
                line,
                None,
                format!("unexpected character {:?}", c),
            );
        }
        i += 1;
    }

    tokens
}

/// Parse an IDL integer literal (decimal or `0x` hex)
pub fn parse_int(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        cleaned.parse::<i64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut d = Diagnostics::new();
        tokenize(src, &mut d).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_comments_are_dropped() {
        let k = kinds("// enum A { }\n/* table B { x: int; } */ union C {}");
        assert_eq!(
            k,
            vec![
                TokenKind::Ident("union".into()),
                TokenKind::Ident("C".into()),
                TokenKind::Punct('{'),
                TokenKind::Punct('}'),
            ]
        );
    }

    #[test]
    fn test_line_numbers_track_newlines() {
        let mut d = Diagnostics::new();
        let tokens = tokenize("a\n/* x\ny */\nb", &mut d);
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 4);
    }

    #[test]
    fn test_unexpected_character_is_reported() {
        let mut d = Diagnostics::new();
        let tokens = tokenize("enum A @ {}", &mut d);
        assert_eq!(tokens.len(), 4);
        assert_eq!(d.count(DiagnosticCode::UnexpectedCharacter), 1);
    }

    #[test]
    fn test_parse_int_forms() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("1.5"), None);
    }
}
