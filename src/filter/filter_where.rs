use serde_json::{Map, Value};

use super::compare::{compare_values, values_equal};
use super::error::FilterError;
use super::types::{FieldCondition, FilterOp};
use crate::database::record::Record;

/// Compiled filter. `All` selects every record; `And` requires every condition to hold.
#[derive(Debug, Clone)]
pub enum Predicate {
    All,
    And(Vec<FieldCondition>),
}

impl Predicate {
    /// Conjoin two predicates. `All` is the identity element.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::All, p) | (p, Predicate::All) => p,
            (Predicate::And(mut a), Predicate::And(b)) => {
                a.extend(b);
                Predicate::And(a)
            }
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Predicate::All)
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::And(conditions) => conditions.iter().all(|c| c.matches(record)),
        }
    }
}

impl FieldCondition {
    /// Any condition over a field the record does not have is false
    pub fn matches(&self, record: &Record) -> bool {
        let Some(value) = record.get(&self.field) else {
            return false;
        };
        match &self.op {
            FilterOp::Eq(expected) => values_equal(value, expected),
            FilterOp::Ne(expected) => !values_equal(value, expected),
            FilterOp::Gt(bound) => compare_values(value, bound).is_some_and(|o| o.is_gt()),
            FilterOp::Gte(bound) => compare_values(value, bound).is_some_and(|o| o.is_ge()),
            FilterOp::Lt(bound) => compare_values(value, bound).is_some_and(|o| o.is_lt()),
            FilterOp::Lte(bound) => compare_values(value, bound).is_some_and(|o| o.is_le()),
            FilterOp::In(values) => values.iter().any(|v| values_equal(value, v)),
            FilterOp::NIn(values) => !values.iter().any(|v| values_equal(value, v)),
            FilterOp::Regex(re) => value.as_str().is_some_and(|s| re.is_match(s)),
        }
    }
}

/// Compiles a Mongo-style filter object into a [`Predicate`]
pub struct FilterWhere {
    conditions: Vec<FieldCondition>,
}

impl FilterWhere {
    fn new() -> Self {
        Self { conditions: vec![] }
    }

    /// Compile a filter. A missing, empty, or fully unrecognized filter selects every record.
    pub fn compile(where_data: Option<&Value>) -> Result<Predicate, FilterError> {
        let mut filter_where = Self::new();
        match where_data {
            None | Some(Value::Null) => {}
            Some(Value::Object(obj)) => filter_where.parse_where_data(obj)?,
            Some(other) => {
                return Err(FilterError::InvalidWhereClause(format!(
                    "filter must be an object, got {}",
                    other
                )))
            }
        }

        if filter_where.conditions.is_empty() {
            tracing::debug!("Filter has no recognized conditions, selecting all records");
            return Ok(Predicate::All);
        }
        Ok(Predicate::And(filter_where.conditions))
    }

    fn parse_where_data(&mut self, obj: &Map<String, Value>) -> Result<(), FilterError> {
        for (key, value) in obj {
            if key.starts_with('$') {
                tracing::debug!("Ignoring unsupported top-level operator {}", key);
                continue;
            }
            self.parse_field_condition(key, value)?;
        }
        Ok(())
    }

    fn parse_field_condition(&mut self, field: &str, value: &Value) -> Result<(), FilterError> {
        if let Value::Object(obj) = value {
            for (op_key, op_val) in obj {
                match FilterOp::from_operator(op_key, op_val) {
                    Some(op) => self.conditions.push(FieldCondition { field: field.to_string(), op: op? }),
                    None => tracing::debug!("Ignoring unrecognized operator {} on {}", op_key, field),
                }
            }
        } else {
            // Implicit equality: { field: value }
            self.conditions.push(FieldCondition { field: field.to_string(), op: FilterOp::Eq(value.clone()) });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        Record::from_stored(v.as_object().cloned().unwrap_or_default())
    }

    fn compile(v: Value) -> Predicate {
        FilterWhere::compile(Some(&v)).unwrap()
    }

    #[test]
    fn empty_and_missing_filters_select_all() {
        assert!(FilterWhere::compile(None).unwrap().is_all());
        assert!(compile(json!({})).is_all());
    }

    #[test]
    fn only_unrecognized_operators_fail_open() {
        let p = compile(json!({"age": {"$between": [1, 2]}, "name": {"$foo": "x"}, "$or": []}));
        assert!(p.is_all());
        assert!(p.matches(&record(json!({"age": 99}))));
    }

    #[test]
    fn literal_means_equality() {
        let p = compile(json!({"department": "IT"}));
        assert!(p.matches(&record(json!({"department": "IT"}))));
        assert!(!p.matches(&record(json!({"department": "HR"}))));
    }

    #[test]
    fn operators_on_one_field_are_conjoined() {
        let p = compile(json!({"age": {"$gte": 25, "$lt": 30, "$unknown": 1}}));
        assert!(p.matches(&record(json!({"age": 25}))));
        assert!(p.matches(&record(json!({"age": 29}))));
        assert!(!p.matches(&record(json!({"age": 30}))));
        assert!(!p.matches(&record(json!({"age": 24}))));
    }

    #[test]
    fn fields_are_conjoined() {
        let p = compile(json!({"department": "IT", "salary_amount": {"$gt": 70000}}));
        assert!(p.matches(&record(json!({"department": "IT", "salary_amount": 75000}))));
        assert!(!p.matches(&record(json!({"department": "IT", "salary_amount": 67000}))));
        assert!(!p.matches(&record(json!({"department": "HR", "salary_amount": 90000}))));
    }

    #[test]
    fn membership_operators() {
        let p = compile(json!({"location": {"$in": ["Pune", "Delhi"]}}));
        assert!(p.matches(&record(json!({"location": "Pune"}))));
        assert!(!p.matches(&record(json!({"location": "Mumbai"}))));

        let p = compile(json!({"location": {"$nin": ["Pune", "Delhi"]}}));
        assert!(p.matches(&record(json!({"location": "Mumbai"}))));
        assert!(!p.matches(&record(json!({"location": "Delhi"}))));
    }

    #[test]
    fn regex_is_case_insensitive_search() {
        let p = compile(json!({"name": {"$regex": "ra"}}));
        assert!(p.matches(&record(json!({"name": "Karan"}))));
        assert!(p.matches(&record(json!({"name": "Raj"}))));
        assert!(!p.matches(&record(json!({"name": "Neha"}))));
        assert!(!p.matches(&record(json!({"name": 12}))));
    }

    #[test]
    fn invalid_regex_is_an_error() {
        let err = FilterWhere::compile(Some(&json!({"name": {"$regex": "(unclosed"}}))).unwrap_err();
        assert!(matches!(err, FilterError::InvalidRegex { .. }));
    }

    #[test]
    fn missing_field_never_matches() {
        let p = compile(json!({"location": {"$ne": "Pune"}}));
        assert!(!p.matches(&record(json!({"name": "Amit"}))));
    }

    #[test]
    fn mismatched_types_do_not_match_ranges() {
        let p = compile(json!({"age": {"$gt": "20"}}));
        assert!(!p.matches(&record(json!({"age": 29}))));
    }

    #[test]
    fn non_object_filter_is_rejected() {
        assert!(FilterWhere::compile(Some(&json!("age > 3"))).is_err());
    }

    #[test]
    fn and_combinator_treats_all_as_identity() {
        let p = Predicate::All.and(compile(json!({"age": 29})));
        assert!(!p.is_all());
        let q = compile(json!({"age": 29})).and(compile(json!({"name": "Amit"})));
        match q {
            Predicate::And(conditions) => assert_eq!(conditions.len(), 2),
            Predicate::All => panic!("expected conjunction"),
        }
    }
}
