//! Conversion of native values into JavaScript literal text.
//!
//! Rules:
//! - numbers (and strings that look numeric) pass through unchanged;
//! - strings starting with [`RAW_PREFIX`] are code, emitted verbatim without
//!   the prefix;
//! - other strings are single quoted with `'` and newlines escaped;
//! - arrays and objects become JSON text;
//! - booleans and null are rejected.

use serde_json::Value;

use crate::error::EncodingError;

/// Marks a string as a JavaScript fragment instead of a string literal.
pub const RAW_PREFIX: &str = "js:";

/// Encode a value as a call argument or property value.
pub fn encode(value: &Value) -> Result<String, EncodingError> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(encode_str(s)),
        Value::Array(_) | Value::Object(_) => Ok(serde_json::to_string(value)?),
        Value::Bool(_) => Err(EncodingError::Unsupported("boolean")),
        Value::Null => Err(EncodingError::Unsupported("null")),
    }
}

/// Encode a string argument: numeric text and raw code pass through.
pub fn encode_str(s: &str) -> String {
    if looks_numeric(s) {
        return s.to_string();
    }
    match strip_raw(s) {
        Some(code) => code.to_string(),
        None => quote(s),
    }
}

/// Selectors never pass through as numbers, only as raw code or strings.
pub fn encode_selector(selector: &str) -> String {
    match strip_raw(selector) {
        Some(code) => code.to_string(),
        None => quote(selector),
    }
}

/// Single-quoted JavaScript string literal.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "\\'").replace('\n', "\\n"))
}

/// Mark `code` as raw so [`encode`] emits it verbatim.
pub fn raw(code: impl AsRef<str>) -> String {
    format!("{RAW_PREFIX}{}", code.as_ref())
}

/// The prefix only counts when something follows it.
pub fn strip_raw(s: &str) -> Option<&str> {
    if s.len() > RAW_PREFIX.len() {
        s.strip_prefix(RAW_PREFIX)
    } else {
        None
    }
}

pub fn is_raw(s: &str) -> bool {
    strip_raw(s).is_some()
}

/// Decimal or exponent notation with optional sign and surrounding
/// whitespace, e.g. `42`, ` -1.5`, `.5`, `1e3`.
pub fn looks_numeric(s: &str) -> bool {
    let s = s.trim_matches(|c: char| c.is_ascii_whitespace());
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !frac_part.map_or(true, all_digits) {
        return false;
    }
    if int_part.is_empty() && frac_part.map_or(true, str::is_empty) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && all_digits(exp)
        }
    }
}
