use std::borrow::Cow;

use memchr::{memchr, memchr2};

/// Decodes JSON escape sequences. Returns the input unchanged when it
/// contains no backslash.
///
/// Malformed escapes never abort: an unknown `\?` pair, a `\u` with fewer
/// than four hex digits, and an unpaired surrogate are all preserved
/// literally. An invalid surrogate pair decodes to U+FFFD.
pub(crate) fn unescape_best_effort(raw: &str) -> Cow<'_, str> {
    let src = raw.as_bytes();
    let Some(first) = memchr(b'\\', src) else {
        // Fast path - nothing to unescape.
        return Cow::Borrowed(raw);
    };

    let mut out = Vec::with_capacity(src.len());
    out.extend_from_slice(&src[..first]);
    let mut s = &src[first + 1..];
    while let Some((&ch, rest)) = s.split_first() {
        s = rest;
        match ch {
            b'"' => out.push(b'"'),
            b'\\' => out.push(b'\\'),
            b'/' => out.push(b'/'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => match s.get(..4).and_then(parse_hex4) {
                None => {
                    // Truncated or non-hex sequence. Keep it unchanged; the
                    // run copy below re-emits the bytes after `\u`.
                    out.extend_from_slice(b"\\u");
                }
                Some(code) => {
                    let hex = &s[..4];
                    s = &s[4..];
                    let code = u32::from(code);
                    if !(0xD800..=0xDFFF).contains(&code) {
                        push_code_point(&mut out, code);
                    } else if s.len() >= 6 && s[0] == b'\\' && s[1] == b'u' {
                        match parse_hex4(&s[2..6]) {
                            Some(second) => {
                                push_code_point(&mut out, combine_surrogates(code, second.into()));
                                s = &s[6..];
                            }
                            None => {
                                out.extend_from_slice(b"\\u");
                                out.extend_from_slice(hex);
                            }
                        }
                    } else {
                        // Unpaired surrogate, stored unchanged.
                        out.extend_from_slice(b"\\u");
                        out.extend_from_slice(hex);
                    }
                }
            },
            _ => {
                // Unknown escape sequence, stored unchanged.
                out.push(b'\\');
                out.push(ch);
            }
        }

        match memchr(b'\\', s) {
            None => {
                out.extend_from_slice(s);
                break;
            }
            Some(n) => {
                out.extend_from_slice(&s[..n]);
                s = &s[n + 1..];
            }
        }
    }

    // The output interleaves whole runs of the input with ASCII escape
    // replacements and UTF-8 encoded code points, so it stays valid UTF-8.
    let text = String::from_utf8(out)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());
    Cow::Owned(text)
}

fn parse_hex4(hex: &[u8]) -> Option<u16> {
    let mut code: u16 = 0;
    for &b in hex {
        let digit = (b as char).to_digit(16)?;
        code = (code << 4) | digit as u16;
    }
    Some(code)
}

fn combine_surrogates(first: u32, second: u32) -> u32 {
    if (0xD800..=0xDBFF).contains(&first) && (0xDC00..=0xDFFF).contains(&second) {
        0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00)
    } else {
        0xFFFD
    }
}

fn push_code_point(out: &mut Vec<u8>, code: u32) {
    let ch = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
    let mut buf = [0u8; 4];
    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Appends `s` as a quoted JSON string, escaping the characters strict JSON
/// cannot carry raw.
pub(crate) fn escape_into(dst: &mut String, s: &str) {
    if !has_special_chars(s) {
        // Fast path - nothing to escape.
        dst.push('"');
        dst.push_str(s);
        dst.push('"');
        return;
    }

    dst.push('"');
    let bytes = s.as_bytes();
    let mut start = 0;
    for (idx, &byte) in bytes.iter().enumerate() {
        let replacement = match byte {
            b'"' => Some("\\\""),
            b'\\' => Some("\\\\"),
            0x08 => Some("\\b"),
            0x0C => Some("\\f"),
            b'\n' => Some("\\n"),
            b'\r' => Some("\\r"),
            b'\t' => Some("\\t"),
            _ if byte < 0x20 => None,
            _ => continue,
        };
        if start < idx {
            dst.push_str(&s[start..idx]);
        }
        match replacement {
            Some(text) => dst.push_str(text),
            None => {
                dst.push_str("\\u00");
                dst.push(char::from(HEX_DIGITS[(byte >> 4) as usize]));
                dst.push(char::from(HEX_DIGITS[(byte & 0x0F) as usize]));
            }
        }
        start = idx + 1;
    }
    if start < s.len() {
        dst.push_str(&s[start..]);
    }
    dst.push('"');
}

fn has_special_chars(s: &str) -> bool {
    if memchr2(b'"', b'\\', s.as_bytes()).is_some() {
        return true;
    }
    s.bytes().any(|b| b < 0x20)
}
