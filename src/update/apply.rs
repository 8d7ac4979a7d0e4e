use serde_json::Value;

use super::error::UpdateError;
use super::expr;
use super::types::{Num, UpdateOp, UpdateSpec};
use crate::database::record::Record;

/// Applies an [`UpdateSpec`] to a record, producing the new record.
/// The input record is never modified; the caller persists the result.
pub struct UpdateApplier;

impl UpdateApplier {
    pub fn apply(record: &Record, spec: &UpdateSpec) -> Result<Record, UpdateError> {
        let mut out = record.clone();
        for (field, op) in &spec.changes {
            let value = Self::apply_op(record.get(field), field, op)?;
            out.set(field.clone(), value);
        }
        Ok(out)
    }

    fn apply_op(current: Option<&Value>, field: &str, op: &UpdateOp) -> Result<Value, UpdateError> {
        match op {
            UpdateOp::Set(value) => Ok(value.clone()),
            UpdateOp::Inc(delta) => {
                let base = Self::current_number("$inc", field, current)?;
                Self::finish("$inc", field, base.add(*delta))
            }
            UpdateOp::Mul(factor) => {
                // An absent field counts as zero, so the product is zero as well
                let base = Self::current_number("$mul", field, current)?;
                Self::finish("$mul", field, base.mul(*factor))
            }
            UpdateOp::Expr(raw) => Ok(Self::evaluate_expr(current, field, raw)),
        }
    }

    /// Evaluate `$expr`. On any failure the field takes the raw payload.
    fn evaluate_expr(current: Option<&Value>, field: &str, raw: &Value) -> Value {
        let source = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let result = match current {
            None => Ok(Num::Int(0)),
            Some(v) => Num::from_value(v).ok_or(super::error::ExprError::NonNumericCurrent),
        }
        .and_then(|base| expr::evaluate(&source, base))
        .and_then(|n| n.to_value().ok_or(super::error::ExprError::NonFinite));

        match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Error evaluating $expr {:?} on '{}': {}; storing raw expression", source, field, e);
                raw.clone()
            }
        }
    }

    fn current_number(operator: &'static str, field: &str, current: Option<&Value>) -> Result<Num, UpdateError> {
        match current {
            None => Ok(Num::Int(0)),
            Some(v) => Num::from_value(v).ok_or_else(|| UpdateError::NonNumericField {
                operator,
                field: field.to_string(),
                value: v.to_string(),
            }),
        }
    }

    fn finish(operator: &'static str, field: &str, n: Num) -> Result<Value, UpdateError> {
        n.to_value().ok_or_else(|| UpdateError::NonFinite { operator, field: field.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        Record::from_stored(v.as_object().cloned().unwrap_or_default())
    }

    fn spec(v: Value) -> UpdateSpec {
        UpdateSpec::parse(Some(&v)).unwrap()
    }

    #[test]
    fn literal_assignment_leaves_input_untouched() {
        let before = record(json!({"name": "Amit", "location": "Hyderabad"}));
        let after = UpdateApplier::apply(&before, &spec(json!({"location": "Pune"}))).unwrap();
        assert_eq!(after.get("location"), Some(&json!("Pune")));
        assert_eq!(before.get("location"), Some(&json!("Hyderabad")));
        assert_eq!(after.get("name"), Some(&json!("Amit")));
    }

    #[test]
    fn inc_is_additive() {
        let start = record(json!({"age": 29}));
        let twice = UpdateApplier::apply(
            &UpdateApplier::apply(&start, &spec(json!({"age": {"$inc": 3}}))).unwrap(),
            &spec(json!({"age": {"$inc": 4}})),
        )
        .unwrap();
        let once = UpdateApplier::apply(&start, &spec(json!({"age": {"$inc": 7}}))).unwrap();
        assert_eq!(twice, once);
        assert_eq!(once.get("age"), Some(&json!(36)));
    }

    #[test]
    fn inc_defaults_absent_field_to_zero() {
        let after = UpdateApplier::apply(&record(json!({})), &spec(json!({"bonus": {"$inc": 5}}))).unwrap();
        assert_eq!(after.get("bonus"), Some(&json!(5)));
    }

    #[test]
    fn mul_on_absent_field_yields_zero() {
        let after = UpdateApplier::apply(&record(json!({"age": 30})), &spec(json!({"bonus": {"$mul": 10}}))).unwrap();
        assert_eq!(after.get("bonus"), Some(&json!(0)));
    }

    #[test]
    fn mul_scales_salary() {
        let after = UpdateApplier::apply(
            &record(json!({"salary_amount": 50000})),
            &spec(json!({"salary_amount": {"$mul": 1.5}})),
        )
        .unwrap();
        assert_eq!(after.get("salary_amount").and_then(|v| v.as_f64()), Some(75000.0));
    }

    #[test]
    fn inc_on_text_field_is_an_error() {
        let err = UpdateApplier::apply(&record(json!({"name": "Raj"})), &spec(json!({"name": {"$inc": 1}})));
        assert!(matches!(err, Err(UpdateError::NonNumericField { .. })));
    }

    #[test]
    fn expr_evaluates_against_current() {
        let after = UpdateApplier::apply(
            &record(json!({"age": 30})),
            &spec(json!({"age": {"$expr": "current * 2 - 10"}})),
        )
        .unwrap();
        assert_eq!(after.get("age"), Some(&json!(50)));
    }

    #[test]
    fn unparseable_expr_falls_back_to_raw_payload() {
        let raw = "current ** __import__('os')";
        let after = UpdateApplier::apply(
            &record(json!({"age": 30})),
            &spec(json!({"age": {"$expr": raw}})),
        )
        .unwrap();
        assert_eq!(after.get("age"), Some(&json!(raw)));
    }

    #[test]
    fn expr_on_text_field_falls_back() {
        let after = UpdateApplier::apply(
            &record(json!({"name": "Neha"})),
            &spec(json!({"name": {"$expr": "current + 1"}})),
        )
        .unwrap();
        assert_eq!(after.get("name"), Some(&json!("current + 1")));
    }

    #[test]
    fn deeply_nested_expr_falls_back_to_raw_payload() {
        let raw = format!("{}current{}", "(".repeat(5_000), ")".repeat(5_000));
        let after = UpdateApplier::apply(
            &record(json!({"age": 30})),
            &spec(json!({"age": {"$expr": raw.clone()}})),
        )
        .unwrap();
        assert_eq!(after.get("age"), Some(&json!(raw)));
    }
}
