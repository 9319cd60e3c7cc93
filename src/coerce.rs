//! Lenient scalar coercion over loosely typed payload JSON.
//!
//! Payload sections come from sources we don't control, so numbers show up
//! as strings, booleans, nulls or not at all. These helpers centralize the
//! rules every normalizer relies on.

use serde_json::Value;

/// `null`, `false`, zero, and empty strings/arrays/objects.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Integer coercion. Floats truncate toward zero, strings must hold a
/// base-10 integer.
pub fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            if let Some(u) = n.as_u64() {
                return i64::try_from(u).ok();
            }
            n.as_f64().and_then(truncate_float)
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Absent or falsy reads as zero, anything else must coerce.
pub fn int_or_zero(value: Option<&Value>) -> Option<i64> {
    match value {
        None => Some(0),
        Some(v) if is_falsy(v) => Some(0),
        Some(v) => to_int(v),
    }
}

pub fn float_or_zero(value: Option<&Value>) -> Option<f64> {
    match value {
        None => Some(0.0),
        Some(v) if is_falsy(v) => Some(0.0),
        Some(v) => to_float(v),
    }
}

/// Rounds half to even on the exact decimal expansion of `value`.
///
/// Going through the formatter keeps ties like `0.125` stable instead of
/// drifting with the binary error of `value * 10^places`.
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.places$}").parse().unwrap_or(value)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn truncate_float(f: f64) -> Option<i64> {
    if !f.is_finite() {
        return None;
    }
    let t = f.trunc();
    if t < i64::MIN as f64 || t > i64::MAX as f64 {
        return None;
    }
    Some(t as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(is_falsy(&v), "{v} should be falsy");
        }
        for v in [json!(true), json!(1), json!(-0.5), json!(" "), json!([0]), json!({"a": 1})] {
            assert!(!is_falsy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn int_coercion() {
        assert_eq!(to_int(&json!(42)), Some(42));
        assert_eq!(to_int(&json!(42.9)), Some(42));
        assert_eq!(to_int(&json!(-3.7)), Some(-3));
        assert_eq!(to_int(&json!(" 18 ")), Some(18));
        assert_eq!(to_int(&json!(true)), Some(1));
        assert_eq!(to_int(&json!("12.5")), None);
        assert_eq!(to_int(&json!("abc")), None);
        assert_eq!(to_int(&json!(null)), None);
        assert_eq!(to_int(&json!([1])), None);
    }

    #[test]
    fn float_coercion() {
        assert_eq!(to_float(&json!(0.25)), Some(0.25));
        assert_eq!(to_float(&json!(3)), Some(3.0));
        assert_eq!(to_float(&json!("0.5")), Some(0.5));
        assert_eq!(to_float(&json!(false)), Some(0.0));
        assert_eq!(to_float(&json!("n/a")), None);
        assert_eq!(to_float(&json!({})), None);
    }

    #[test]
    fn or_zero_defaults() {
        assert_eq!(int_or_zero(None), Some(0));
        assert_eq!(int_or_zero(Some(&json!(null))), Some(0));
        assert_eq!(int_or_zero(Some(&json!(""))), Some(0));
        assert_eq!(int_or_zero(Some(&json!("7"))), Some(7));
        assert_eq!(int_or_zero(Some(&json!("x"))), None);
        assert_eq!(float_or_zero(Some(&json!(false))), Some(0.0));
        assert_eq!(float_or_zero(Some(&json!("bad"))), None);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(123.333_333, 2), 123.33);
        assert_eq!(round_to(0.666_666, 3), 0.667);
        assert_eq!(round_to(0.5, 3), 0.5);
        assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
        assert!(round_to(f64::NAN, 2).is_nan());
    }
}
