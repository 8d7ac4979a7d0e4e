use std::cmp::Ordering;

use serde_json::{Number, Value};

/// Equality that treats `29` and `29.0` as the same number
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_cmp(x, y) == Some(Ordering::Equal),
        _ => a == b,
    }
}

/// Ordering between two values of comparable kinds; `None` when the kinds differ
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_cmp(x, y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total order used for sorting: missing and null first, then booleans,
/// numbers, strings, and anything else last
pub fn sort_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = |v: Option<&Value>| match v {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(_) => 4,
    };
    match (a, b) {
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or_else(|| rank(a).cmp(&rank(b))),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn numbers_cmp(x: &Number, y: &Number) -> Option<Ordering> {
    match (x.as_i64(), y.as_i64()) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_and_floats_compare_numerically() {
        assert!(values_equal(&json!(29), &json!(29.0)));
        assert_eq!(compare_values(&json!(30), &json!(29.5)), Some(Ordering::Greater));
    }

    #[test]
    fn mismatched_kinds_do_not_compare() {
        assert_eq!(compare_values(&json!("30"), &json!(29)), None);
        assert!(!values_equal(&json!("29"), &json!(29)));
    }

    #[test]
    fn sort_puts_missing_first() {
        assert_eq!(sort_cmp(None, Some(&json!(1))), Ordering::Less);
        assert_eq!(sort_cmp(Some(&json!("a")), Some(&json!(5))), Ordering::Greater);
    }
}
