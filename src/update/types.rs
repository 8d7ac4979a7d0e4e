use serde_json::{Number, Value};

use super::error::UpdateError;
use crate::database::record::is_identity_field;

/// Numeric value used by update arithmetic. Integers stay integral until
/// an operation needs a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub fn from_value(value: &Value) -> Option<Self> {
        let Value::Number(n) = value else {
            return None;
        };
        match n.as_i64() {
            Some(i) => Some(Num::Int(i)),
            None => n.as_f64().map(Num::Float),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    pub fn add(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a.checked_add(b).map(Num::Int).unwrap_or(Num::Float(a as f64 + b as f64)),
            (a, b) => Num::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub fn sub(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a.checked_sub(b).map(Num::Int).unwrap_or(Num::Float(a as f64 - b as f64)),
            (a, b) => Num::Float(a.as_f64() - b.as_f64()),
        }
    }

    pub fn mul(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a.checked_mul(b).map(Num::Int).unwrap_or(Num::Float(a as f64 * b as f64)),
            (a, b) => Num::Float(a.as_f64() * b.as_f64()),
        }
    }

    /// True division; the result is always a float
    pub fn div(self, other: Num) -> Option<Num> {
        let divisor = other.as_f64();
        if divisor == 0.0 {
            return None;
        }
        Some(Num::Float(self.as_f64() / divisor))
    }

    pub fn neg(self) -> Num {
        match self {
            Num::Int(i) => i.checked_neg().map(Num::Int).unwrap_or(Num::Float(-(i as f64))),
            Num::Float(f) => Num::Float(-f),
        }
    }

    /// `None` for NaN and infinities, which JSON cannot carry
    pub fn to_value(self) -> Option<Value> {
        match self {
            Num::Int(i) => Some(Value::from(i)),
            Num::Float(f) => Number::from_f64(f).map(Value::Number),
        }
    }
}

/// How one field changes
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Direct assignment of a literal
    Set(Value),
    /// Add a delta to the current value
    Inc(Num),
    /// Multiply the current value by a factor
    Mul(Num),
    /// Arithmetic over `current`; keeps the raw payload for the fail-soft path
    Expr(Value),
}

impl UpdateOp {
    /// Map one field's update value to an operator.
    /// Returns `None` for an operator-object with no recognized operator.
    pub fn parse(field: &str, value: &Value) -> Result<Option<Self>, UpdateError> {
        let Value::Object(obj) = value else {
            return Ok(Some(UpdateOp::Set(value.clone())));
        };

        if let Some(delta) = obj.get("$inc") {
            return Self::numeric_operand("$inc", field, delta).map(|n| Some(UpdateOp::Inc(n)));
        }
        if let Some(factor) = obj.get("$mul") {
            return Self::numeric_operand("$mul", field, factor).map(|n| Some(UpdateOp::Mul(n)));
        }
        if let Some(expr) = obj.get("$expr") {
            return Ok(Some(UpdateOp::Expr(expr.clone())));
        }
        Ok(None)
    }

    fn numeric_operand(operator: &'static str, field: &str, value: &Value) -> Result<Num, UpdateError> {
        Num::from_value(value).ok_or_else(|| UpdateError::NonNumericOperand {
            operator,
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

/// Parsed update object: field name to operator, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    pub changes: Vec<(String, UpdateOp)>,
}

impl UpdateSpec {
    pub fn parse(update: Option<&Value>) -> Result<Self, UpdateError> {
        let obj = match update {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Object(obj)) => obj,
            Some(other) => {
                return Err(UpdateError::InvalidUpdate(format!("update must be an object, got {}", other)))
            }
        };

        let mut changes = Vec::with_capacity(obj.len());
        for (field, value) in obj {
            if is_identity_field(field) {
                tracing::warn!("Ignoring update of identity field '{}'", field);
                continue;
            }
            match UpdateOp::parse(field, value)? {
                Some(op) => changes.push((field.clone(), op)),
                None => tracing::debug!("No recognized update operator for '{}', leaving it unchanged", field),
            }
        }
        Ok(Self { changes })
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_literals_and_operators() {
        let spec = UpdateSpec::parse(Some(&json!({
            "location": "Pune",
            "age": {"$inc": 1},
            "salary_amount": {"$mul": 1.1},
            "bonus": {"$expr": "current + 5"},
            "ignored": {"$set": 3},
            "id": 9
        })))
        .unwrap();
        assert_eq!(spec.changes.len(), 4);
        assert!(spec.changes.contains(&("age".to_string(), UpdateOp::Inc(Num::Int(1)))));
        assert!(spec.changes.contains(&("salary_amount".to_string(), UpdateOp::Mul(Num::Float(1.1)))));
        assert!(spec.changes.iter().all(|(f, _)| f != "ignored" && f != "id"));
    }

    #[test]
    fn inc_takes_precedence_over_other_operators() {
        let op = UpdateOp::parse("age", &json!({"$mul": 2, "$inc": 3})).unwrap();
        assert_eq!(op, Some(UpdateOp::Inc(Num::Int(3))));
    }

    #[test]
    fn non_numeric_operand_is_rejected() {
        assert!(UpdateOp::parse("age", &json!({"$inc": "one"})).is_err());
    }

    #[test]
    fn integer_overflow_promotes_to_float() {
        assert_eq!(Num::Int(i64::MAX).add(Num::Int(1)), Num::Float(i64::MAX as f64 + 1.0));
    }
}
