//! Hand-rolled decimal decoders for the hot path.
//!
//! Each decoder accumulates digits into a 64-bit register and bails out to
//! the standard library once the input can no longer be handled exactly:
//! integers after 18 digits, floats once the mantissa fills the power-of-ten
//! table or the exponent passes 300. The strict forms report failures, the
//! best-effort forms return zero.

use crate::error::{JsonError, JsonResult};

/// Exact powers of ten. Multiplying by a table entry avoids the rounding
/// that repeated multiplication would accumulate.
const POW10: [f64; 17] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
];

/// Parses a decimal u64, returning 0 when the input is not a valid number.
///
/// ```
/// assert_eq!(lazyjson::num::parse_u64_best_effort("12345"), 12345);
/// assert_eq!(lazyjson::num::parse_u64_best_effort("12x"), 0);
/// ```
pub fn parse_u64_best_effort(s: &str) -> u64 {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return 0;
    }
    let mut i = 0;
    let mut d: u64 = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            break;
        }
        d = d * 10 + u64::from(bytes[i] - b'0');
        i += 1;
        if i > 18 {
            // The value may overflow the accumulator. Let the standard
            // library sort it out over the original input.
            return s.parse::<u64>().unwrap_or(0);
        }
    }
    if i == 0 {
        return 0;
    }
    if i < bytes.len() {
        // Unparsed tail left.
        return 0;
    }
    d
}

/// Parses a decimal u64, reporting malformed input as an error.
pub fn parse_u64(s: &str) -> JsonResult<u64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return Err(JsonError::number("cannot parse u64 from empty string"));
    }
    let mut i = 0;
    let mut d: u64 = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            break;
        }
        d = d * 10 + u64::from(bytes[i] - b'0');
        i += 1;
        if i > 18 {
            return s
                .parse::<u64>()
                .map_err(|err| JsonError::number(format!("cannot parse u64 from {s:?}: {err}")));
        }
    }
    if i == 0 {
        return Err(JsonError::number(format!("cannot parse u64 from {s:?}")));
    }
    if i < bytes.len() {
        return Err(JsonError::number(format!(
            "unparsed tail left after parsing u64 from {:?}: {:?}",
            s,
            &s[i..]
        )));
    }
    Ok(d)
}

/// Parses a decimal i64, returning 0 when the input is not a valid number.
pub fn parse_i64_best_effort(s: &str) -> i64 {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return 0;
    }
    let minus = bytes[0] == b'-';
    let mut i = usize::from(minus);
    if i >= bytes.len() {
        return 0;
    }

    // Accumulate unsigned: at most 18 digits reach the success path, so the
    // value always fits i64 once the sign is applied.
    let start = i;
    let mut d: u64 = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            break;
        }
        d = d * 10 + u64::from(bytes[i] - b'0');
        i += 1;
        if i > 18 {
            return s.parse::<i64>().unwrap_or(0);
        }
    }
    if i == start {
        return 0;
    }
    if i < bytes.len() {
        // Unparsed tail left.
        return 0;
    }
    if minus {
        -(d as i64)
    } else {
        d as i64
    }
}

/// Parses a decimal i64, reporting malformed input as an error.
pub fn parse_i64(s: &str) -> JsonResult<i64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return Err(JsonError::number("cannot parse i64 from empty string"));
    }
    let minus = bytes[0] == b'-';
    let mut i = usize::from(minus);
    if i >= bytes.len() {
        return Err(JsonError::number(format!("cannot parse i64 from {s:?}")));
    }

    let start = i;
    let mut d: u64 = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            break;
        }
        d = d * 10 + u64::from(bytes[i] - b'0');
        i += 1;
        if i > 18 {
            return s
                .parse::<i64>()
                .map_err(|err| JsonError::number(format!("cannot parse i64 from {s:?}: {err}")));
        }
    }
    if i == start {
        return Err(JsonError::number(format!("cannot parse i64 from {s:?}")));
    }
    if i < bytes.len() {
        return Err(JsonError::number(format!(
            "unparsed tail left after parsing i64 from {:?}: {:?}",
            s,
            &s[i..]
        )));
    }
    Ok(if minus { -(d as i64) } else { d as i64 })
}

/// Parses a decimal f64, returning 0 when the input is not a valid number.
///
/// Accepts `inf`, `infinity` and `nan` (any case, optionally signed) in
/// place of digits. The integer or fractional part may be elided when the
/// remaining form is unambiguous (`.5`, `5.`).
pub fn parse_f64_best_effort(s: &str) -> f64 {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return 0.0;
    }
    let minus = bytes[0] == b'-';
    let mut i = usize::from(minus);
    if i >= bytes.len() {
        return 0.0;
    }

    // The integer part may only be elided when a fractional digit follows
    // the dot.
    if bytes[i] == b'.' && (i + 1 >= bytes.len() || !bytes[i + 1].is_ascii_digit()) {
        return 0.0;
    }

    let mut d: u64 = 0;
    let int_start = i;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            break;
        }
        d = d * 10 + u64::from(bytes[i] - b'0');
        i += 1;
        if i > 18 {
            // The integer part may overflow the accumulator.
            return s.parse::<f64>().unwrap_or(0.0);
        }
    }

    if i == int_start && bytes[i] != b'.' {
        let mut rest = &s[i..];
        rest = rest.strip_prefix('+').unwrap_or(rest);
        if rest.eq_ignore_ascii_case("inf") || rest.eq_ignore_ascii_case("infinity") {
            return if minus {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
        }
        if rest.eq_ignore_ascii_case("nan") {
            return f64::NAN;
        }
        return 0.0;
    }

    let mut f = d as f64;
    if i >= bytes.len() {
        // Fast path - just an integer.
        return if minus { -f } else { f };
    }

    if bytes[i] == b'.' {
        i += 1;
        if i >= bytes.len() {
            // Elided fractional part.
            return if minus { -f } else { f };
        }
        let frac_start = i;
        while i < bytes.len() {
            if !bytes[i].is_ascii_digit() {
                break;
            }
            d = d * 10 + u64::from(bytes[i] - b'0');
            i += 1;
            if i - int_start >= POW10.len() {
                // The mantissa no longer fits the table.
                return s.parse::<f64>().unwrap_or(0.0);
            }
        }
        // One divide over the whole mantissa rather than a divide per digit.
        f = d as f64 / POW10[i - frac_start];
        if i >= bytes.len() {
            return if minus { -f } else { f };
        }
    }

    if bytes[i] == b'e' || bytes[i] == b'E' {
        i += 1;
        if i >= bytes.len() {
            return 0.0;
        }
        let mut exp_minus = false;
        if bytes[i] == b'+' || bytes[i] == b'-' {
            exp_minus = bytes[i] == b'-';
            i += 1;
            if i >= bytes.len() {
                return 0.0;
            }
        }
        let mut exp: i32 = 0;
        let exp_start = i;
        while i < bytes.len() {
            if !bytes[i].is_ascii_digit() {
                break;
            }
            exp = exp * 10 + i32::from(bytes[i] - b'0');
            i += 1;
            if exp > 300 {
                // The exponent may not fit an f64.
                return s.parse::<f64>().unwrap_or(0.0);
            }
        }
        if i == exp_start {
            return 0.0;
        }
        if exp_minus {
            exp = -exp;
        }
        f *= 10f64.powi(exp);
        if i >= bytes.len() {
            return if minus { -f } else { f };
        }
    }
    0.0
}

/// Parses a decimal f64, reporting malformed input as an error.
///
/// Same grammar as [`parse_f64_best_effort`].
pub fn parse_f64(s: &str) -> JsonResult<f64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return Err(JsonError::number("cannot parse f64 from empty string"));
    }
    let minus = bytes[0] == b'-';
    let mut i = usize::from(minus);
    if i >= bytes.len() {
        return Err(JsonError::number(format!("cannot parse f64 from {s:?}")));
    }

    if bytes[i] == b'.' && (i + 1 >= bytes.len() || !bytes[i + 1].is_ascii_digit()) {
        return Err(JsonError::number(format!(
            "missing integer and fractional part in {s:?}"
        )));
    }

    let mut d: u64 = 0;
    let int_start = i;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            break;
        }
        d = d * 10 + u64::from(bytes[i] - b'0');
        i += 1;
        if i > 18 {
            return s
                .parse::<f64>()
                .map_err(|err| JsonError::number(format!("cannot parse f64 from {s:?}: {err}")));
        }
    }

    if i == int_start && bytes[i] != b'.' {
        let mut rest = &s[i..];
        rest = rest.strip_prefix('+').unwrap_or(rest);
        if rest.eq_ignore_ascii_case("inf") || rest.eq_ignore_ascii_case("infinity") {
            return Ok(if minus {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            });
        }
        if rest.eq_ignore_ascii_case("nan") {
            return Ok(f64::NAN);
        }
        return Err(JsonError::number(format!(
            "unparsed tail left after parsing f64 from {s:?}: {rest:?}"
        )));
    }

    let mut f = d as f64;
    if i >= bytes.len() {
        return Ok(if minus { -f } else { f });
    }

    if bytes[i] == b'.' {
        i += 1;
        if i >= bytes.len() {
            return Ok(if minus { -f } else { f });
        }
        let frac_start = i;
        while i < bytes.len() {
            if !bytes[i].is_ascii_digit() {
                break;
            }
            d = d * 10 + u64::from(bytes[i] - b'0');
            i += 1;
            if i - int_start >= POW10.len() {
                return s.parse::<f64>().map_err(|err| {
                    JsonError::number(format!("cannot parse mantissa in {s:?}: {err}"))
                });
            }
        }
        f = d as f64 / POW10[i - frac_start];
        if i >= bytes.len() {
            return Ok(if minus { -f } else { f });
        }
    }

    if bytes[i] == b'e' || bytes[i] == b'E' {
        i += 1;
        if i >= bytes.len() {
            return Err(JsonError::number(format!("cannot parse exponent in {s:?}")));
        }
        let mut exp_minus = false;
        if bytes[i] == b'+' || bytes[i] == b'-' {
            exp_minus = bytes[i] == b'-';
            i += 1;
            if i >= bytes.len() {
                return Err(JsonError::number(format!("cannot parse exponent in {s:?}")));
            }
        }
        let mut exp: i32 = 0;
        let exp_start = i;
        while i < bytes.len() {
            if !bytes[i].is_ascii_digit() {
                break;
            }
            exp = exp * 10 + i32::from(bytes[i] - b'0');
            i += 1;
            if exp > 300 {
                return s.parse::<f64>().map_err(|err| {
                    JsonError::number(format!("cannot parse exponent in {s:?}: {err}"))
                });
            }
        }
        if i == exp_start {
            return Err(JsonError::number(format!("cannot parse exponent in {s:?}")));
        }
        if exp_minus {
            exp = -exp;
        }
        f *= 10f64.powi(exp);
        if i >= bytes.len() {
            return Ok(if minus { -f } else { f });
        }
    }
    Err(JsonError::number(format!("cannot parse f64 from {s:?}")))
}
