//! The recursive-descent parser and its collaborators.

pub mod pool;
pub(crate) mod scan;
pub mod scanner;
pub mod validation;

use std::cell::RefCell;

use smallvec::SmallVec;

use crate::arena::{Arena, Entry, Key, Node, NodeId, ObjectInner, Span, StrNode};
use crate::error::{tail_snippet, JsonError, JsonResult};
use crate::types::Value;

/// Hard limit on nesting depth. Exceeding it is a structural error rather
/// than a stack overflow.
pub const MAX_DEPTH: usize = 300;

/// Parses JSON documents into a tree of values.
///
/// The parser owns a backing buffer and a node arena, both reused across
/// parses: values returned by one call stay valid until the next `parse`
/// call, which the borrow checker enforces.
///
/// A parser must not be shared between threads; keep one per worker (see
/// [`pool`]) and it is `!Sync` by construction.
#[derive(Debug, Default)]
pub struct Parser {
    doc: Document,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a single JSON document, rejecting trailing garbage.
    ///
    /// The returned value borrows the parser and is valid until the next
    /// `parse` / `parse_bytes` call.
    pub fn parse(&mut self, input: &str) -> JsonResult<Value<'_>> {
        let root = self.doc.parse_single(input)?;
        Ok(Value::new(&self.doc, root))
    }

    /// Like [`Parser::parse`] for raw bytes. The bytes must be UTF-8.
    pub fn parse_bytes(&mut self, input: &[u8]) -> JsonResult<Value<'_>> {
        let text = std::str::from_utf8(input)
            .map_err(|err| JsonError::parse(format!("invalid utf-8 in input: {err}")))?;
        self.parse(text)
    }
}

/// Backing buffer plus arena. Every value handle resolves spans and node
/// ids against this pair.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) buf: String,
    pub(crate) arena: Arena,
}

impl Document {
    fn parse_single(&mut self, input: &str) -> JsonResult<NodeId> {
        let input = input.trim_start_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));
        self.buf.clear();
        self.buf.push_str(input);
        self.arena.reset();

        let Document { buf, arena } = self;
        let (root, pos) = parse_value(buf, 0, arena, 0)
            .map_err(|err| err.context("cannot parse JSON"))?;
        let pos = skip_ws(buf, pos);
        if pos < buf.len() {
            return Err(JsonError::parse(format!(
                "unexpected tail: {:?}",
                tail_snippet(&buf[pos..])
            )));
        }
        Ok(root)
    }

    /// Replaces the working copy without parsing. Used by the scanner.
    pub(crate) fn load(&mut self, input: &str) {
        self.buf.clear();
        self.buf.push_str(input);
        self.arena.reset();
    }

    /// Parses one value starting at `pos`, resetting the arena first. Used
    /// by the scanner; prior node ids become invalid.
    pub(crate) fn parse_next(&mut self, pos: usize) -> JsonResult<(NodeId, usize)> {
        self.arena.reset();
        let Document { buf, arena } = self;
        parse_value(buf, pos, arena, 0)
    }
}

/// Advances past the four JSON whitespace bytes.
pub(crate) fn skip_ws(buf: &str, mut pos: usize) -> usize {
    let bytes = buf.as_bytes();
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    pos
}

fn parse_value(buf: &str, pos: usize, arena: &mut Arena, depth: usize) -> JsonResult<(NodeId, usize)> {
    let bytes = buf.as_bytes();
    if pos >= bytes.len() {
        return Err(JsonError::parse("cannot parse empty string"));
    }
    let depth = depth + 1;
    if depth > MAX_DEPTH {
        return Err(JsonError::parse(format!(
            "too deeply nested JSON; the limit is {MAX_DEPTH} levels"
        )));
    }

    match bytes[pos] {
        b'{' => parse_object(buf, pos + 1, arena, depth)
            .map_err(|err| err.context("cannot parse object")),
        b'[' => parse_array(buf, pos + 1, arena, depth)
            .map_err(|err| err.context("cannot parse array")),
        b'"' => {
            let (span, next) = scan::scan_raw_string(buf, pos + 1)
                .map_err(|err| err.context("cannot parse string"))?;
            Ok((arena.acquire(Node::String(StrNode::new(span))), next))
        }
        b't' => {
            if !match_literal(bytes, pos, b"true") {
                return Err(unexpected_value(buf, pos));
            }
            Ok((NodeId::TRUE, pos + 4))
        }
        b'f' => {
            if !match_literal(bytes, pos, b"false") {
                return Err(unexpected_value(buf, pos));
            }
            Ok((NodeId::FALSE, pos + 5))
        }
        b'n' => {
            if match_literal(bytes, pos, b"null") {
                return Ok((NodeId::NULL, pos + 4));
            }
            if bytes.len() - pos >= 3 && bytes[pos..pos + 3].eq_ignore_ascii_case(b"nan") {
                let span = Span { start: pos, end: pos + 3 };
                return Ok((arena.acquire(Node::Number(span)), pos + 3));
            }
            Err(unexpected_value(buf, pos))
        }
        _ => {
            let (span, next) = scan::scan_raw_number(buf, pos)
                .map_err(|err| err.context("cannot parse number"))?;
            Ok((arena.acquire(Node::Number(span)), next))
        }
    }
}

fn parse_array(buf: &str, pos: usize, arena: &mut Arena, depth: usize) -> JsonResult<(NodeId, usize)> {
    let bytes = buf.as_bytes();
    let mut pos = skip_ws(buf, pos);
    if pos >= bytes.len() {
        return Err(JsonError::parse("missing ']'"));
    }
    if bytes[pos] == b']' {
        return Ok((arena.acquire(Node::Array(RefCell::new(Vec::new()))), pos + 1));
    }

    let mut items: SmallVec<[NodeId; 8]> = SmallVec::new();
    loop {
        pos = skip_ws(buf, pos);
        let (item, next) = parse_value(buf, pos, arena, depth)
            .map_err(|err| err.context("cannot parse array value"))?;
        items.push(item);

        pos = skip_ws(buf, next);
        if pos >= bytes.len() {
            return Err(JsonError::parse("unexpected end of array"));
        }
        match bytes[pos] {
            b',' => pos += 1,
            b']' => {
                let node = Node::Array(RefCell::new(items.into_vec()));
                return Ok((arena.acquire(node), pos + 1));
            }
            _ => return Err(JsonError::parse("missing ',' after array value")),
        }
    }
}

fn parse_object(buf: &str, pos: usize, arena: &mut Arena, depth: usize) -> JsonResult<(NodeId, usize)> {
    let bytes = buf.as_bytes();
    let mut pos = skip_ws(buf, pos);
    if pos >= bytes.len() {
        return Err(JsonError::parse("missing '}'"));
    }
    if bytes[pos] == b'}' {
        let node = Node::Object(RefCell::new(ObjectInner::default()));
        return Ok((arena.acquire(node), pos + 1));
    }

    let mut entries = Vec::new();
    loop {
        pos = skip_ws(buf, pos);
        if pos >= bytes.len() || bytes[pos] != b'"' {
            return Err(JsonError::parse("cannot find opening '\"' for object key"));
        }
        let (key, next) = scan::scan_raw_key(buf, pos + 1)
            .map_err(|err| err.context("cannot parse object key"))?;

        pos = skip_ws(buf, next);
        if pos >= bytes.len() || bytes[pos] != b':' {
            return Err(JsonError::parse("missing ':' after object key"));
        }

        pos = skip_ws(buf, pos + 1);
        let (value, next) = parse_value(buf, pos, arena, depth)
            .map_err(|err| err.context("cannot parse object value"))?;
        entries.push(Entry { key: Key::Raw(key), value });

        pos = skip_ws(buf, next);
        if pos >= bytes.len() {
            return Err(JsonError::parse("unexpected end of object"));
        }
        match bytes[pos] {
            b',' => pos += 1,
            b'}' => {
                let node = Node::Object(RefCell::new(ObjectInner {
                    entries,
                    keys_unescaped: false,
                }));
                return Ok((arena.acquire(node), pos + 1));
            }
            _ => return Err(JsonError::parse("missing ',' after object value")),
        }
    }
}

fn match_literal(bytes: &[u8], pos: usize, literal: &[u8]) -> bool {
    bytes.len() - pos >= literal.len() && &bytes[pos..pos + literal.len()] == literal
}

fn unexpected_value(buf: &str, pos: usize) -> JsonError {
    JsonError::parse(format!(
        "unexpected value found: {:?}",
        tail_snippet(&buf[pos..])
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueType;

    #[rstest::rstest]
    fn test_parse_literals() {
        let mut parser = Parser::new();
        assert_eq!(parser.parse("true").unwrap().value_type(), ValueType::True);
        assert_eq!(parser.parse("false").unwrap().value_type(), ValueType::False);
        assert_eq!(parser.parse("null").unwrap().value_type(), ValueType::Null);
        assert_eq!(parser.parse("42").unwrap().value_type(), ValueType::Number);
        assert_eq!(parser.parse("\"x\"").unwrap().value_type(), ValueType::String);
    }

    #[rstest::rstest]
    fn test_parse_skips_surrounding_whitespace() {
        let mut parser = Parser::new();
        let value = parser.parse(" \t\r\n {\"a\": 1 } \n").unwrap();
        assert_eq!(value.get_i64(&["a"]), 1);
    }

    #[rstest::rstest]
    #[case("")]
    #[case("   \n\t ")]
    #[case("{")]
    #[case("{\"a\"")]
    #[case("{\"a\":}")]
    #[case("{\"a\":1,}")]
    #[case("{\"a\" 1}")]
    #[case("{a:1}")]
    #[case("[")]
    #[case("[1,")]
    #[case("[1 2]")]
    #[case("\"unclosed")]
    #[case("tru")]
    #[case("truex")]
    #[case("falsy")]
    #[case("nul")]
    #[case("{}garbage")]
    #[case("1 2")]
    fn test_parse_rejects_malformed(#[case] input: &str) {
        let mut parser = Parser::new();
        assert!(parser.parse(input).is_err(), "input {input:?}");
    }

    #[rstest::rstest]
    fn test_parse_bytes_requires_utf8() {
        let mut parser = Parser::new();
        assert!(parser.parse_bytes(b"[1,2]").is_ok());
        assert!(parser.parse_bytes(&[b'"', 0xFF, b'"']).is_err());
    }

    #[rstest::rstest]
    fn test_parse_nan_after_n_dispatch() {
        let mut parser = Parser::new();
        let value = parser.parse("nan").unwrap();
        assert_eq!(value.value_type(), ValueType::Number);
        assert!(value.get_f64(&[]).is_nan());

        let value = parser.parse("NaN").unwrap();
        assert_eq!(value.value_type(), ValueType::Number);
        assert!(value.get_f64(&[]).is_nan());
    }

    #[rstest::rstest]
    fn test_parse_signed_nan_and_inf() {
        let mut parser = Parser::new();
        assert!(parser.parse("+nan").unwrap().get_f64(&[]).is_nan());
        assert_eq!(parser.parse("-inf").unwrap().get_f64(&[]), f64::NEG_INFINITY);
        assert_eq!(parser.parse("Inf").unwrap().get_f64(&[]), f64::INFINITY);
        // The tokenizer takes the three-byte prefix; the rest is a tail.
        assert!(parser.parse("Infinity").is_err());
    }

    #[rstest::rstest]
    fn test_parse_depth_limit() {
        let mut parser = Parser::new();

        let mut nested = String::new();
        nested.push_str(&"[".repeat(MAX_DEPTH - 1));
        nested.push('1');
        nested.push_str(&"]".repeat(MAX_DEPTH - 1));
        assert!(parser.parse(&nested).is_ok());

        let mut too_deep = String::new();
        too_deep.push_str(&"[".repeat(MAX_DEPTH));
        too_deep.push('1');
        too_deep.push_str(&"]".repeat(MAX_DEPTH));
        let err = parser.parse(&too_deep).unwrap_err();
        assert!(err.message.contains("too deeply nested"));
    }

    #[rstest::rstest]
    fn test_parse_duplicate_keys_first_wins() {
        let mut parser = Parser::new();
        let value = parser.parse("{\"k\":1,\"k\":2}").unwrap();
        assert_eq!(value.get_i64(&["k"]), 1);
        let object = value.get_object(&[]).unwrap();
        assert_eq!(object.len(), 2);
    }

    #[rstest::rstest]
    fn test_parse_control_chars_in_strings_accepted() {
        // The parser tolerates raw control bytes inside strings; only the
        // validator rejects them.
        let mut parser = Parser::new();
        let input = "\"a\u{1}b\"";
        let value = parser.parse(input).unwrap();
        assert_eq!(value.get_str(&[]), Some("a\u{1}b"));
    }

    #[rstest::rstest]
    fn test_parser_reuse_resets_state() {
        let mut parser = Parser::new();
        assert_eq!(parser.parse("[1,2,3]").unwrap().get_i64(&["2"]), 3);
        assert!(parser.parse("{\"a\":true}").unwrap().get_bool(&["a"]));
        assert!(parser.parse("oops").is_err());
        assert_eq!(parser.parse("7").unwrap().get_i64(&[]), 7);
    }
}
