use crate::arena::NodeId;
use crate::decode::{skip_ws, Document};
use crate::error::{ErrorKind, JsonError};
use crate::types::Value;

/// Scans a series of JSON values delimited by whitespace, such as JSON
/// lines. The scanner may be re-used for subsequent inputs.
///
/// Each `next` call recycles the node arena, so the value from the previous
/// iteration is only valid until then; the borrow checker enforces it.
///
/// ```
/// let mut scanner = lazyjson::Scanner::new();
/// scanner.init("{\"n\":1}\n{\"n\":2}");
/// let mut total = 0;
/// while scanner.next() {
///     total += scanner.value().map(|v| v.get_i64(&["n"])).unwrap_or(0);
/// }
/// assert!(scanner.error().is_none());
/// assert_eq!(total, 3);
/// ```
#[derive(Debug, Default)]
pub struct Scanner {
    doc: Document,
    pos: usize,
    err: Option<JsonError>,
    value: Option<NodeId>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `input` into the working buffer and rewinds the scanner.
    pub fn init(&mut self, input: &str) {
        self.doc.load(input);
        self.pos = 0;
        self.err = None;
        self.value = None;
    }

    /// Like [`Scanner::init`] for raw bytes. Invalid UTF-8 becomes the
    /// sticky error reported by the first `next` call.
    pub fn init_bytes(&mut self, input: &[u8]) {
        match std::str::from_utf8(input) {
            Ok(text) => self.init(text),
            Err(err) => {
                self.doc.load("");
                self.pos = 0;
                self.value = None;
                self.err = Some(JsonError::parse(format!("invalid utf-8 in input: {err}")));
            }
        }
    }

    /// Parses the next value. Returns true on success; false on the end of
    /// input or on error, distinguished via [`Scanner::error`]. Errors are
    /// sticky.
    pub fn next(&mut self) -> bool {
        if self.err.is_some() {
            return false;
        }
        self.pos = skip_ws(&self.doc.buf, self.pos);
        if self.pos >= self.doc.buf.len() {
            self.err = Some(JsonError::eof());
            return false;
        }
        self.value = None;
        match self.doc.parse_next(self.pos) {
            Ok((id, next)) => {
                self.pos = next;
                self.value = Some(id);
                true
            }
            Err(err) => {
                self.err = Some(err);
                false
            }
        }
    }

    /// The last successfully parsed value, valid until the next `next`
    /// call.
    pub fn value(&self) -> Option<Value<'_>> {
        self.value.map(|id| Value::new(&self.doc, id))
    }

    /// The sticky error, with plain end-of-input reported as `None`.
    pub fn error(&self) -> Option<&JsonError> {
        match &self.err {
            Some(err) if err.kind == ErrorKind::Eof => None,
            other => other.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueType;

    #[rstest::rstest]
    fn test_scanner_iterates_values() {
        let mut scanner = Scanner::new();
        scanner.init("{\"k\":\"v\"} {\"k\":2}\n{\"k\":true}");

        assert!(scanner.next());
        assert_eq!(scanner.value().unwrap().get_str(&["k"]), Some("v"));

        assert!(scanner.next());
        assert_eq!(scanner.value().unwrap().get_i64(&["k"]), 2);

        assert!(scanner.next());
        assert!(scanner.value().unwrap().get_bool(&["k"]));

        assert!(!scanner.next());
        assert!(scanner.error().is_none());
    }

    #[rstest::rstest]
    fn test_scanner_empty_input() {
        let mut scanner = Scanner::new();
        scanner.init("");
        assert!(!scanner.next());
        assert!(scanner.error().is_none());

        scanner.init("  \n\t ");
        assert!(!scanner.next());
        assert!(scanner.error().is_none());
    }

    #[rstest::rstest]
    fn test_scanner_error_is_sticky() {
        let mut scanner = Scanner::new();
        scanner.init("[1] oops [2]");
        assert!(scanner.next());
        assert!(!scanner.next());
        assert!(scanner.error().is_some());
        assert!(!scanner.next());
        assert!(scanner.error().is_some());
    }

    #[rstest::rstest]
    fn test_scanner_reinit_clears_error() {
        let mut scanner = Scanner::new();
        scanner.init("oops");
        assert!(!scanner.next());
        assert!(scanner.error().is_some());

        scanner.init("1 2 3");
        let mut count = 0;
        while scanner.next() {
            assert_eq!(scanner.value().unwrap().value_type(), ValueType::Number);
            count += 1;
        }
        assert_eq!(count, 3);
        assert!(scanner.error().is_none());
    }

    #[rstest::rstest]
    fn test_scanner_init_bytes_rejects_invalid_utf8() {
        let mut scanner = Scanner::new();
        scanner.init_bytes(&[0xFF, 0xFE]);
        assert!(!scanner.next());
        assert!(scanner.error().is_some());

        scanner.init_bytes(b"true false");
        assert!(scanner.next());
        assert!(scanner.next());
        assert!(!scanner.next());
        assert!(scanner.error().is_none());
    }
}
