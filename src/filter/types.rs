use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::FilterError;

/// Comparison operators accepted inside a field's operator-object.
/// Each variant carries its operand, already converted to the type it needs.
#[derive(Debug, Clone)]
pub enum FilterOp {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    NIn(Vec<Value>),
    Regex(Regex),
}

impl FilterOp {
    /// Map an operator key and its operand to a typed operator.
    /// Returns `None` for keys this filter does not recognize.
    pub fn from_operator(key: &str, operand: &Value) -> Option<Result<Self, FilterError>> {
        let op = match key {
            "$gt" => FilterOp::Gt(operand.clone()),
            "$gte" => FilterOp::Gte(operand.clone()),
            "$lt" => FilterOp::Lt(operand.clone()),
            "$lte" => FilterOp::Lte(operand.clone()),
            "$ne" => FilterOp::Ne(operand.clone()),
            "$in" => FilterOp::In(Self::operand_list(operand)),
            "$nin" => FilterOp::NIn(Self::operand_list(operand)),
            "$regex" => return Some(Self::regex(operand)),
            _ => return None,
        };
        Some(Ok(op))
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterOp::Eq(_) => "$eq",
            FilterOp::Ne(_) => "$ne",
            FilterOp::Gt(_) => "$gt",
            FilterOp::Gte(_) => "$gte",
            FilterOp::Lt(_) => "$lt",
            FilterOp::Lte(_) => "$lte",
            FilterOp::In(_) => "$in",
            FilterOp::NIn(_) => "$nin",
            FilterOp::Regex(_) => "$regex",
        }
    }

    fn operand_list(operand: &Value) -> Vec<Value> {
        match operand {
            Value::Array(values) => values.clone(),
            other => vec![other.clone()],
        }
    }

    fn regex(operand: &Value) -> Result<Self, FilterError> {
        let pattern = match operand {
            Value::String(s) => s.clone(),
            other => {
                return Err(FilterError::InvalidOperatorData(format!(
                    "$regex requires a string pattern, got {}",
                    other
                )))
            }
        };
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map(FilterOp::Regex)
            .map_err(|source| FilterError::InvalidRegex { pattern, source })
    }
}

/// One compiled condition over a single field
#[derive(Debug, Clone)]
pub struct FieldCondition {
    pub field: String,
    pub op: FilterOp,
}

/// Read query shape returned by the generator for the document store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterData {
    #[serde(default)]
    pub filter: Option<Value>,
    #[serde(default)]
    pub sort: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}
