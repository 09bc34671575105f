//! Scalar inference for untyped text formats
//!
//! CSV, TSV, Properties and Tags only carry text. Their decoders run every
//! token through [`infer_scalar`] exactly once:
//!
//! 1. integer lexical form (`0`, `-12`, `+7`; no leading zeros) that fits
//!    in an `i64` → `Int`
//! 2. float lexical form (`1.5`, `.5`, `-2e3`, `6.02E23`) → `Float`
//! 3. `true` / `false`, any case → `Bool`
//! 4. anything else stays a `String`
//!
//! A field the schema hint marks as `string` skips inference and keeps the
//! token as written (see [`infer_field`]). Formats with native typing never
//! call this.

use crate::schema::{FieldType, Schema};
use crate::value::Value;

/// Infers a field's token unless the schema pins the field to `string`.
pub fn infer_field(schema: Option<&Schema>, field: &str, token: &str) -> Value {
    match schema.and_then(|schema| schema.field_type(field)) {
        Some(FieldType::String) => Value::String(token.to_string()),
        _ => infer_scalar(token),
    }
}

/// Applies the untyped-text coercion rule to a single token.
pub fn infer_scalar(token: &str) -> Value {
    if is_integer_literal(token) {
        if let Ok(i) = token.parse::<i64>() {
            return Value::Int(i);
        }
    }
    if is_float_literal(token) {
        if let Ok(f) = token.parse::<f64>() {
            return Value::Float(f);
        }
    }
    if token.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(token.to_string())
}

fn strip_sign(token: &str) -> &str {
    token
        .strip_prefix('-')
        .or_else(|| token.strip_prefix('+'))
        .unwrap_or(token)
}

/// `[-+]?(0|[1-9][0-9]*)`
pub fn is_integer_literal(token: &str) -> bool {
    let digits = strip_sign(token);
    match digits.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    }
}

/// `[-+]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][-+]?[0-9]+)?`, requiring a
/// fraction or an exponent so that integers are never classified as floats.
pub fn is_float_literal(token: &str) -> bool {
    let body = strip_sign(token);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) {
        return false;
    }
    match frac_part {
        Some(f) if !all_digits(f) => return false,
        Some(f) if int_part.is_empty() && f.is_empty() => return false,
        None if int_part.is_empty() => return false,
        _ => {}
    }

    match exponent {
        Some(exp) => {
            let digits = strip_sign(exp);
            !digits.is_empty() && all_digits(digits)
        }
        None => frac_part.is_some(),
    }
}
