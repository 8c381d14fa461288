//! Coercion helpers shared by the operations and template rendering.

use crate::error::EvalError;
use serde_json::{Number, Value};

/// Reads a decimal number out of text: optional `-`, digits, optional
/// fraction. Exponents, `inf`, `NaN` and surrounding text do not count.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    text.parse().ok()
}

/// The value as a number when it is one or looks like one.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// The value as an integer when it is an integral number or integer text.
pub fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if !s.contains('.') => parse_numeric(s).and_then(|_| s.parse().ok()),
        _ => None,
    }
}

/// String form of a value, as used when a binding is interpolated into text.
/// `null` renders as nothing.
pub fn str_val(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Boolean operand: `true`/`false` or their text.
pub fn boolean(operation: &'static str, value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        other => Err(EvalError::InvalidOperand {
            operation,
            detail: format!("expected a boolean, got {other}"),
        }),
    }
}

pub fn number_operand(operation: &'static str, value: &Value) -> Result<f64, EvalError> {
    numeric(value).ok_or_else(|| EvalError::InvalidOperand {
        operation,
        detail: format!("expected a number, got {value}"),
    })
}

pub fn array_operand<'a>(operation: &'static str, value: &'a Value) -> Result<&'a Vec<Value>, EvalError> {
    value.as_array().ok_or_else(|| EvalError::InvalidOperand {
        operation,
        detail: format!("expected an array, got {value}"),
    })
}

pub fn f64_to_value(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_text_is_plain_decimal_only() {
        assert_eq!(parse_numeric("12"), Some(12.0));
        assert_eq!(parse_numeric("-1.5"), Some(-1.5));
        assert_eq!(parse_numeric("1e3"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric(" 1"), None);
        assert_eq!(parse_numeric("1."), None);
        assert_eq!(parse_numeric("true"), None);
    }

    #[test]
    fn integral_accepts_integer_text() {
        assert_eq!(integral(&json!("7")), Some(7));
        assert_eq!(integral(&json!("7.0")), None);
        assert_eq!(integral(&json!(7.5)), None);
    }

    #[test]
    fn null_interpolates_as_empty() {
        assert_eq!(str_val(&Value::Null), "");
        assert_eq!(str_val(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
