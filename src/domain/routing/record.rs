//! Parser for the flat literal records the classification oracle replies with.
//!
//! The oracle is instructed to answer with a mapping such as
//! `{'agent': 'gino_agent', 'message': 'hello'}`. Models emit either Python
//! literal syntax (single quotes, `None`, `True`) or JSON, sometimes wrapped
//! in a Markdown code fence; all of those are accepted. Only flat mappings of
//! scalar values are supported.

use std::collections::BTreeMap;
use thiserror::Error;

/// Scalar value inside a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    Str(String),
    Bool(bool),
    /// Numbers are kept as written.
    Number(String),
    Null,
}

impl LiteralValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Textual form, as `str()` would print it.
    pub fn to_text(&self) -> String {
        match self {
            LiteralValue::Str(s) => s.clone(),
            LiteralValue::Bool(true) => "True".to_string(),
            LiteralValue::Bool(false) => "False".to_string(),
            LiteralValue::Number(n) => n.clone(),
            LiteralValue::Null => "None".to_string(),
        }
    }
}

/// Why a reply could not be read as a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("empty reply")]
    Empty,

    #[error("expected {expected} at offset {offset}")]
    Unexpected { expected: &'static str, offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },

    #[error("unsupported value at offset {offset}")]
    UnsupportedValue { offset: usize },

    #[error("unexpected trailing input at offset {offset}")]
    TrailingInput { offset: usize },
}

/// Parses a flat `{key: value, ...}` literal.
pub fn parse_record(raw: &str) -> Result<BTreeMap<String, LiteralValue>, RecordError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(RecordError::Empty);
    }
    let mut parser = Parser {
        chars: body.char_indices().collect(),
        pos: 0,
    };
    let record = parser.record()?;
    parser.skip_ws();
    if let Some(offset) = parser.offset() {
        return Err(RecordError::TrailingInput { offset });
    }
    Ok(record)
}

/// Removes a surrounding Markdown fence (```json ... ```), if any.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string (e.g. `python`) on the opening line.
    match rest.find('\n') {
        Some(newline) if !rest[..newline].contains('{') => rest[newline + 1..].trim(),
        _ => rest.trim(),
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn offset(&self) -> Option<usize> {
        self.chars.get(self.pos).map(|(i, _)| *i)
    }

    fn end_offset(&self) -> usize {
        self.chars.last().map(|(i, c)| i + c.len_utf8()).unwrap_or(0)
    }

    fn here(&self) -> usize {
        self.offset().unwrap_or_else(|| self.end_offset())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, wanted: char, expected: &'static str) -> Result<(), RecordError> {
        self.skip_ws();
        if self.peek() == Some(wanted) {
            self.pos += 1;
            Ok(())
        } else {
            Err(RecordError::Unexpected {
                expected,
                offset: self.here(),
            })
        }
    }

    fn record(&mut self) -> Result<BTreeMap<String, LiteralValue>, RecordError> {
        self.expect('{', "'{'")?;
        let mut record = BTreeMap::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(record);
            }
            let key = match self.peek() {
                Some('\'') | Some('"') => self.string()?,
                _ => {
                    return Err(RecordError::Unexpected {
                        expected: "quoted key",
                        offset: self.here(),
                    })
                }
            };
            self.expect(':', "':'")?;
            self.skip_ws();
            let value = self.value()?;
            // Later duplicates win, as in a dict literal.
            record.insert(key, value);

            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(record),
                _ => {
                    return Err(RecordError::Unexpected {
                        expected: "',' or '}'",
                        offset: self.here(),
                    })
                }
            }
        }
    }

    fn value(&mut self) -> Result<LiteralValue, RecordError> {
        let start = self.here();
        match self.peek() {
            Some('\'') | Some('"') => self.string().map(LiteralValue::Str),
            Some(c) if c == '-' || c.is_ascii_digit() => Ok(LiteralValue::Number(self.word())),
            Some(c) if c.is_ascii_alphabetic() => match self.word().as_str() {
                "None" | "null" => Ok(LiteralValue::Null),
                "True" | "true" => Ok(LiteralValue::Bool(true)),
                "False" | "false" => Ok(LiteralValue::Bool(false)),
                _ => Err(RecordError::UnsupportedValue { offset: start }),
            },
            _ => Err(RecordError::UnsupportedValue { offset: start }),
        }
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_') {
                word.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        word
    }

    fn string(&mut self) -> Result<String, RecordError> {
        let start = self.here();
        let quote = self.bump().ok_or(RecordError::UnterminatedString { offset: start })?;
        let mut out = String::new();
        loop {
            let escape_at = self.here();
            match self.bump() {
                None => return Err(RecordError::UnterminatedString { offset: start }),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or(RecordError::UnterminatedString { offset: start })?;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        '\\' | '\'' | '"' | '/' => out.push(escaped),
                        '\n' => {}
                        'u' => out.push(self.unicode_escape(escape_at)?),
                        _ => return Err(RecordError::InvalidEscape { offset: escape_at }),
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self, offset: usize) -> Result<char, RecordError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or(RecordError::InvalidEscape { offset })?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(RecordError::InvalidEscape { offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text(record: &BTreeMap<String, LiteralValue>, key: &str) -> Option<String> {
        record.get(key).and_then(|v| v.as_str()).map(str::to_string)
    }

    #[test]
    fn parses_python_literal() {
        let record = parse_record("{'agent': 'gino_agent', 'message': 'hello'}").unwrap();
        assert_eq!(text(&record, "agent").as_deref(), Some("gino_agent"));
        assert_eq!(text(&record, "message").as_deref(), Some("hello"));
    }

    #[test]
    fn parses_json_and_code_fences() {
        let raw = "```json\n{\"agent\": \"aima_agent\", \"message\": \"Jenis kargo?\"}\n```";
        let record = parse_record(raw).unwrap();
        assert_eq!(text(&record, "agent").as_deref(), Some("aima_agent"));
        assert_eq!(text(&record, "message").as_deref(), Some("Jenis kargo?"));
    }

    #[test]
    fn handles_escapes_and_mixed_quotes() {
        let record = parse_record(r#"{"message": 'it\'s "quoted"\n', 'n': "é"}"#).unwrap();
        assert_eq!(text(&record, "message").as_deref(), Some("it's \"quoted\"\n"));
        assert_eq!(text(&record, "n").as_deref(), Some("é"));
    }

    #[test]
    fn scalar_values() {
        let record = parse_record("{'a': None, 'b': True, 'c': -1.5, 'd': false,}").unwrap();
        assert_eq!(record["a"], LiteralValue::Null);
        assert_eq!(record["b"], LiteralValue::Bool(true));
        assert_eq!(record["c"], LiteralValue::Number("-1.5".into()));
        assert_eq!(record["d"].to_text(), "False");
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_record("   "), Err(RecordError::Empty));
        assert!(matches!(
            parse_record("I think gino_agent fits best"),
            Err(RecordError::Unexpected { .. })
        ));
        assert!(matches!(
            parse_record("{'agent': 'gino"),
            Err(RecordError::UnterminatedString { .. })
        ));
        assert!(matches!(
            parse_record("{'agent': gino_agent}"),
            Err(RecordError::UnsupportedValue { .. })
        ));
        assert!(matches!(
            parse_record("{'agent': 'x'} trailing"),
            Err(RecordError::TrailingInput { .. })
        ));
        assert!(matches!(
            parse_record("{'agent': ['a']}"),
            Err(RecordError::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn later_duplicate_keys_win() {
        let record = parse_record("{'agent': 'a', 'agent': 'b'}").unwrap();
        assert_eq!(text(&record, "agent").as_deref(), Some("b"));
    }

    proptest! {
        #[test]
        fn json_encoded_strings_parse_back(agent in "[a-z_]{1,20}", message in "\\PC{0,80}") {
            let raw = serde_json::json!({"agent": agent, "message": message}).to_string();
            let record = parse_record(&raw).unwrap();
            prop_assert_eq!(text(&record, "agent"), Some(agent));
            prop_assert_eq!(text(&record, "message"), Some(message));
        }

        #[test]
        fn never_panics(raw in "\\PC{0,64}") {
            let _ = parse_record(&raw);
        }
    }
}
