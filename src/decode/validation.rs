//! Standalone grammar checker. Shares no state with the parser and is
//! strict where the parser is permissive: RFC number syntax only, escape
//! sequences whitelisted, control characters rejected.

use memchr::memchr;

use crate::arena::Span;
use crate::decode::scan::scan_raw_string;
use crate::decode::{skip_ws, MAX_DEPTH};
use crate::error::{tail_snippet, JsonError, JsonResult};

/// Validates that `input` is a single well-formed JSON document.
///
/// ```
/// assert!(lazyjson::validate(r#"{"a":[1,2.5e3,"x"]}"#).is_ok());
/// assert!(lazyjson::validate("[1,]").is_err());
/// ```
pub fn validate(input: &str) -> JsonResult<()> {
    let pos = skip_ws(input, 0);
    let pos = validate_value(input, pos, 0).map_err(|err| err.context("cannot parse JSON"))?;
    let pos = skip_ws(input, pos);
    if pos < input.len() {
        return Err(JsonError::parse(format!(
            "unexpected tail: {:?}",
            tail_snippet(&input[pos..])
        )));
    }
    Ok(())
}

/// Like [`validate`] for raw bytes. The bytes must be UTF-8.
pub fn validate_bytes(input: &[u8]) -> JsonResult<()> {
    let text = std::str::from_utf8(input)
        .map_err(|err| JsonError::parse(format!("invalid utf-8 in input: {err}")))?;
    validate(text)
}

fn validate_value(buf: &str, pos: usize, depth: usize) -> JsonResult<usize> {
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
        b'{' => validate_object(buf, pos + 1, depth).map_err(|err| err.context("cannot parse object")),
        b'[' => validate_array(buf, pos + 1, depth).map_err(|err| err.context("cannot parse array")),
        b'"' => {
            let (span, next) =
                validate_string(buf, pos + 1).map_err(|err| err.context("cannot parse string"))?;
            for &b in &bytes[span.start..span.end] {
                if b < 0x20 {
                    return Err(JsonError::parse(format!(
                        "string cannot contain control char 0x{b:02X}"
                    )));
                }
            }
            Ok(next)
        }
        b't' => validate_literal(buf, pos, "true"),
        b'f' => validate_literal(buf, pos, "false"),
        b'n' => validate_literal(buf, pos, "null"),
        _ => validate_number(buf, pos).map_err(|err| err.context("cannot parse number")),
    }
}

fn validate_literal(buf: &str, pos: usize, literal: &str) -> JsonResult<usize> {
    if buf.as_bytes()[pos..].starts_with(literal.as_bytes()) {
        Ok(pos + literal.len())
    } else {
        Err(JsonError::parse(format!(
            "unexpected value found: {:?}",
            tail_snippet(&buf[pos..])
        )))
    }
}

fn validate_array(buf: &str, pos: usize, depth: usize) -> JsonResult<usize> {
    let bytes = buf.as_bytes();
    let mut pos = skip_ws(buf, pos);
    if pos >= bytes.len() {
        return Err(JsonError::parse("missing ']'"));
    }
    if bytes[pos] == b']' {
        return Ok(pos + 1);
    }

    loop {
        pos = skip_ws(buf, pos);
        pos = validate_value(buf, pos, depth)
            .map_err(|err| err.context("cannot parse array value"))?;

        pos = skip_ws(buf, pos);
        if pos >= bytes.len() {
            return Err(JsonError::parse("unexpected end of array"));
        }
        match bytes[pos] {
            b',' => pos += 1,
            b']' => return Ok(pos + 1),
            _ => return Err(JsonError::parse("missing ',' after array value")),
        }
    }
}

fn validate_object(buf: &str, pos: usize, depth: usize) -> JsonResult<usize> {
    let bytes = buf.as_bytes();
    let mut pos = skip_ws(buf, pos);
    if pos >= bytes.len() {
        return Err(JsonError::parse("missing '}'"));
    }
    if bytes[pos] == b'}' {
        return Ok(pos + 1);
    }

    loop {
        pos = skip_ws(buf, pos);
        if pos >= bytes.len() || bytes[pos] != b'"' {
            return Err(JsonError::parse("cannot find opening '\"' for object key"));
        }
        let (key, next) =
            validate_key(buf, pos + 1).map_err(|err| err.context("cannot parse object key"))?;
        for &b in &bytes[key.start..key.end] {
            if b < 0x20 {
                return Err(JsonError::parse(format!(
                    "object key cannot contain control char 0x{b:02X}"
                )));
            }
        }

        pos = skip_ws(buf, next);
        if pos >= bytes.len() || bytes[pos] != b':' {
            return Err(JsonError::parse("missing ':' after object key"));
        }

        pos = skip_ws(buf, pos + 1);
        pos = validate_value(buf, pos, depth)
            .map_err(|err| err.context("cannot parse object value"))?;

        pos = skip_ws(buf, pos);
        if pos >= bytes.len() {
            return Err(JsonError::parse("unexpected end of object"));
        }
        match bytes[pos] {
            b',' => pos += 1,
            b'}' => return Ok(pos + 1),
            _ => return Err(JsonError::parse("missing ',' after object value")),
        }
    }
}

/// Like `validate_string`, but optimized for typical object keys, which are
/// small and escape-free.
fn validate_key(buf: &str, pos: usize) -> JsonResult<(Span, usize)> {
    let bytes = buf.as_bytes();
    for i in pos..bytes.len() {
        match bytes[i] {
            b'"' => return Ok((Span { start: pos, end: i }, i + 1)),
            b'\\' => return validate_string(buf, pos),
            _ => {}
        }
    }
    Err(JsonError::parse("missing closing '\"'"))
}

fn validate_string(buf: &str, pos: usize) -> JsonResult<(Span, usize)> {
    let bytes = buf.as_bytes();
    // Fast path - a string without escape sequences.
    if let Some(offset) = memchr(b'"', &bytes[pos..]) {
        if memchr(b'\\', &bytes[pos..pos + offset]).is_none() {
            return Ok((Span { start: pos, end: pos + offset }, pos + offset + 1));
        }
    }

    // Slow path - take the raw string, then whitelist its escapes.
    let (span, next) = scan_raw_string(buf, pos)?;
    let mut rest = &bytes[span.start..span.end];
    loop {
        let Some(n) = memchr(b'\\', rest) else {
            return Ok((span, next));
        };
        if n + 1 >= rest.len() {
            return Err(JsonError::parse("missing escaped char after backslash"));
        }
        let ch = rest[n + 1];
        rest = &rest[n + 2..];
        match ch {
            b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => {}
            b'u' => {
                if rest.len() < 4 {
                    return Err(JsonError::parse(format!(
                        "too short escape sequence: \\u{}",
                        String::from_utf8_lossy(rest)
                    )));
                }
                let hex = &rest[..4];
                if !hex.iter().all(|b| b.is_ascii_hexdigit()) {
                    return Err(JsonError::parse(format!(
                        "invalid escape sequence \\u{}",
                        String::from_utf8_lossy(hex)
                    )));
                }
                rest = &rest[4..];
            }
            _ => {
                return Err(JsonError::parse(format!(
                    "unknown escape sequence \\{}",
                    char::from(ch)
                )));
            }
        }
    }
}

fn validate_number(buf: &str, pos: usize) -> JsonResult<usize> {
    let bytes = buf.as_bytes();
    if pos >= bytes.len() {
        return Err(JsonError::parse("zero-length number"));
    }
    let mut i = pos;
    if bytes[i] == b'-' {
        i += 1;
        if i >= bytes.len() {
            return Err(JsonError::parse("missing number after minus"));
        }
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start {
        return Err(JsonError::parse(format!(
            "expecting 0..9 digit, got {}",
            char::from(bytes[i])
        )));
    }
    if bytes[int_start] == b'0' && i != int_start + 1 {
        return Err(JsonError::parse("unexpected number starting from 0"));
    }
    if i >= bytes.len() {
        return Ok(i);
    }

    if bytes[i] == b'.' {
        // Validate the fractional part.
        i += 1;
        if i >= bytes.len() {
            return Err(JsonError::parse("missing fractional part"));
        }
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return Err(JsonError::parse(format!(
                "expecting 0..9 digit in fractional part, got {}",
                char::from(bytes[i])
            )));
        }
        if i >= bytes.len() {
            return Ok(i);
        }
    }

    if bytes[i] == b'e' || bytes[i] == b'E' {
        // Validate the exponent part.
        i += 1;
        if i >= bytes.len() {
            return Err(JsonError::parse("missing exponent part"));
        }
        if bytes[i] == b'-' || bytes[i] == b'+' {
            i += 1;
            if i >= bytes.len() {
                return Err(JsonError::parse("missing exponent part"));
            }
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return Err(JsonError::parse(format!(
                "expecting 0..9 digit in exponent part, got {}",
                char::from(bytes[i])
            )));
        }
    }
    Ok(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case("null")]
    #[case("true")]
    #[case("false")]
    #[case("0")]
    #[case("-12.5e-3")]
    #[case("\"\"")]
    #[case(r#""plain""#)]
    #[case(r#""es\"c\\a\/p\b\f\n\r\teé""#)]
    #[case("[]")]
    #[case("[1,2,3]")]
    #[case("{}")]
    #[case(r#"{"a":1,"b":[true,null],"c":{"d":"e"}}"#)]
    #[case("  [ 1 , 2 ]  ")]
    fn test_validate_accepts(#[case] input: &str) {
        assert!(validate(input).is_ok(), "input {input:?}");
    }

    #[rstest::rstest]
    #[case("")]
    #[case("   ")]
    #[case("nan")]
    #[case("inf")]
    #[case("-inf")]
    #[case("01")]
    #[case("-0.")]
    #[case("1.")]
    #[case(".5")]
    #[case("1e")]
    #[case("1e+")]
    #[case("+1")]
    #[case("[1,]")]
    #[case("[1 2]")]
    #[case("{\"a\":1,}")]
    #[case("{\"a\" 1}")]
    #[case("\"unclosed")]
    #[case(r#""bad\q""#)]
    #[case(r#""bad\u12""#)]
    #[case(r#""bad\uZZZZ""#)]
    #[case("[1] extra")]
    fn test_validate_rejects(#[case] input: &str) {
        assert!(validate(input).is_err(), "input {input:?}");
    }

    #[rstest::rstest]
    fn test_validate_rejects_control_chars() {
        let err = validate("\"a\u{1}b\"").unwrap_err();
        assert!(err.message.contains("control char 0x01"));

        let err = validate("{\"k\u{2}\":1}").unwrap_err();
        assert!(err.message.contains("control char 0x02"));
    }

    #[rstest::rstest]
    fn test_validate_depth_capped() {
        let mut too_deep = String::new();
        too_deep.push_str(&"[".repeat(MAX_DEPTH + 1));
        too_deep.push('1');
        too_deep.push_str(&"]".repeat(MAX_DEPTH + 1));
        let err = validate(&too_deep).unwrap_err();
        assert!(err.message.contains("too deeply nested"));
    }

    #[rstest::rstest]
    fn test_validate_bytes() {
        assert!(validate_bytes(b"[1,2]").is_ok());
        assert!(validate_bytes(&[0xFF]).is_err());
    }

    #[rstest::rstest]
    fn test_validate_escaped_keys() {
        assert!(validate(r#"{"a\nb":1}"#).is_ok());
        assert!(validate(r#"{"a\qb":1}"#).is_err());
    }
}
