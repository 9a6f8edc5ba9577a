use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: unexpected byte, missing delimiter, truncated
    /// document, unclosed string, nesting too deep.
    Parse,
    /// A numeric payload that neither the fast path nor the standard
    /// library decoder accepts.
    Number,
    /// A strict getter found a value of the wrong type.
    TypeMismatch,
    /// End of input reached by the scanner. Translated to "no error" by
    /// `Scanner::error`.
    Eof,
}

#[derive(Debug, Clone)]
pub struct JsonError {
    pub kind: ErrorKind,
    pub message: String,
}

impl JsonError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parse,
            message: message.into(),
        }
    }

    pub(crate) fn number(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Number,
            message: message.into(),
        }
    }

    pub(crate) fn type_mismatch(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::TypeMismatch,
            message: message.into(),
        }
    }

    pub(crate) fn eof() -> Self {
        Self {
            kind: ErrorKind::Eof,
            message: "end of input".to_string(),
        }
    }

    /// Prepends a production name to the message while bubbling up through
    /// the recursive descent.
    pub(crate) fn context(mut self, production: &str) -> Self {
        self.message = format!("{production}: {}", self.message);
        self
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for JsonError {}

pub type JsonResult<T> = std::result::Result<T, JsonError>;

/// Clips an unparsed tail for diagnostics. Long tails are cut at 40 bytes
/// (backed off to a char boundary) and elided with an ellipsis.
pub(crate) fn tail_snippet(s: &str) -> String {
    const MAX_LEN: usize = 40;
    if s.len() <= MAX_LEN {
        return s.to_string();
    }
    let mut end = MAX_LEN;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&s[..end]);
    out.push_str("...");
    out
}
