use memchr::memchr;

use crate::arena::Span;
use crate::error::{JsonError, JsonResult};

/// Locates the closing quote of a string whose opening quote sits just
/// before `pos`. Returns the raw contents (escape sequences intact) and the
/// position past the closing quote.
pub(crate) fn scan_raw_string(buf: &str, pos: usize) -> JsonResult<(Span, usize)> {
    let bytes = buf.as_bytes();
    let mut from = pos;
    loop {
        let Some(offset) = memchr(b'"', &bytes[from..]) else {
            return Err(JsonError::parse("missing closing '\"'"));
        };
        let quote = from + offset;
        if quote == pos || bytes[quote - 1] != b'\\' {
            // Fast path - no escaped quote.
            return Ok((Span { start: pos, end: quote }, quote + 1));
        }

        // Slow path. Walk back over the run of backslashes; an even run
        // means the quote itself is unescaped and terminates the string.
        let mut run_start = quote - 1;
        while run_start > pos && bytes[run_start - 1] == b'\\' {
            run_start -= 1;
        }
        if (quote - run_start) % 2 == 0 {
            return Ok((Span { start: pos, end: quote }, quote + 1));
        }
        from = quote + 1;
    }
}

/// Like [`scan_raw_string`], but optimized for object keys, which rarely
/// contain escape sequences.
pub(crate) fn scan_raw_key(buf: &str, pos: usize) -> JsonResult<(Span, usize)> {
    let bytes = buf.as_bytes();
    for i in pos..bytes.len() {
        match bytes[i] {
            b'"' => return Ok((Span { start: pos, end: i }, i + 1)),
            b'\\' => return scan_raw_string(buf, pos),
            _ => {}
        }
    }
    Err(JsonError::parse("missing closing '\"'"))
}

/// Consumes the maximal prefix of number characters starting at `pos`. When
/// that prefix is empty or a bare sign, falls back to matching `inf` / `nan`
/// (any case) behind the sign. Digit-level validation is left to the
/// validator.
pub(crate) fn scan_raw_number(buf: &str, pos: usize) -> JsonResult<(Span, usize)> {
    let bytes = buf.as_bytes();
    let mut i = pos;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' | b'.' | b'-' | b'+' | b'e' | b'E' => {
                i += 1;
            }
            _ => {
                if i == pos || (i == pos + 1 && matches!(bytes[pos], b'-' | b'+')) {
                    if bytes.len() - i >= 3 {
                        let token = &bytes[i..i + 3];
                        if token.eq_ignore_ascii_case(b"inf") || token.eq_ignore_ascii_case(b"nan")
                        {
                            return Ok((Span { start: pos, end: i + 3 }, i + 3));
                        }
                    }
                    let ch = buf[pos..].chars().next().unwrap_or('\u{0}');
                    return Err(JsonError::parse(format!("unexpected char: {ch:?}")));
                }
                return Ok((Span { start: pos, end: i }, i));
            }
        }
    }
    // Input exhausted inside the number-character set: the whole tail is the
    // token, even a degenerate one. Digit validation is the validator's job.
    Ok((Span { start: pos, end: i }, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(buf: &str, span: Span) -> &str {
        &buf[span.start..span.end]
    }

    #[rstest::rstest]
    fn test_scan_raw_string_fast_path() {
        let buf = r#"hello" tail"#;
        let (span, next) = scan_raw_string(buf, 0).unwrap();
        assert_eq!(raw(buf, span), "hello");
        assert_eq!(&buf[next..], " tail");
    }

    #[rstest::rstest]
    fn test_scan_raw_string_empty() {
        let buf = r#""rest"#;
        let (span, next) = scan_raw_string(buf, 0).unwrap();
        assert_eq!(raw(buf, span), "");
        assert_eq!(next, 1);
    }

    #[rstest::rstest]
    fn test_scan_raw_string_escaped_quote() {
        let buf = r#"a\"b" tail"#;
        let (span, next) = scan_raw_string(buf, 0).unwrap();
        assert_eq!(raw(buf, span), r#"a\"b"#);
        assert_eq!(&buf[next..], " tail");
    }

    #[rstest::rstest]
    fn test_scan_raw_string_even_backslash_run() {
        // Two backslashes: an escaped backslash, then a real closing quote.
        let buf = r#"a\\" tail"#;
        let (span, next) = scan_raw_string(buf, 0).unwrap();
        assert_eq!(raw(buf, span), r#"a\\"#);
        assert_eq!(&buf[next..], " tail");
    }

    #[rstest::rstest]
    fn test_scan_raw_string_odd_backslash_run() {
        let buf = r#"a\\\"b" tail"#;
        let (span, _) = scan_raw_string(buf, 0).unwrap();
        assert_eq!(raw(buf, span), r#"a\\\"b"#);
    }

    #[rstest::rstest]
    fn test_scan_raw_string_unterminated() {
        assert!(scan_raw_string("abc", 0).is_err());
        assert!(scan_raw_string(r#"abc\""#, 0).is_err());
    }

    #[rstest::rstest]
    fn test_scan_raw_key_falls_back_on_escape() {
        let buf = r#"plain":1"#;
        let (span, next) = scan_raw_key(buf, 0).unwrap();
        assert_eq!(raw(buf, span), "plain");
        assert_eq!(&buf[next..], ":1");

        let buf = r#"es\"caped":1"#;
        let (span, _) = scan_raw_key(buf, 0).unwrap();
        assert_eq!(raw(buf, span), r#"es\"caped"#);
    }

    #[rstest::rstest]
    #[case("123,rest", "123", ",rest")]
    #[case("-12.5e+3]", "-12.5e+3", "]")]
    #[case("0", "0", "")]
    #[case("1e3", "1e3", "")]
    #[case(".5}", ".5", "}")]
    #[case("5. ", "5.", " ")]
    fn test_scan_raw_number_prefixes(
        #[case] buf: &str,
        #[case] number: &str,
        #[case] tail: &str,
    ) {
        let (span, next) = scan_raw_number(buf, 0).unwrap();
        assert_eq!(raw(buf, span), number);
        assert_eq!(&buf[next..], tail);
    }

    #[rstest::rstest]
    #[case("inf", "inf")]
    #[case("Inf]", "Inf")]
    #[case("-inf,", "-inf")]
    #[case("+NaN", "+NaN")]
    #[case("nan", "nan")]
    #[case("Infinity", "Inf")]
    fn test_scan_raw_number_special_tokens(#[case] buf: &str, #[case] number: &str) {
        let (span, _) = scan_raw_number(buf, 0).unwrap();
        assert_eq!(raw(buf, span), number);
    }

    #[rstest::rstest]
    #[case("x")]
    #[case("-x")]
    #[case("in")]
    #[case("+n")]
    fn test_scan_raw_number_rejects(#[case] buf: &str) {
        assert!(scan_raw_number(buf, 0).is_err());
    }

    #[rstest::rstest]
    fn test_scan_raw_number_defers_digit_validation() {
        // A bare sign or dot scans as a number token; rejecting it is the
        // validator's concern, and the numeric decoders read it as zero.
        for buf in ["+", "-", ".", "1-2e++5"] {
            let (span, next) = scan_raw_number(buf, 0).unwrap();
            assert_eq!(raw(buf, span), buf);
            assert_eq!(next, buf.len());
        }
    }
}
