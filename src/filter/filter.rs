use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::{FilterWhere, Predicate};
use super::types::{FilterData, FilterOrderInfo};
use crate::database::record::{Record, StoredRecord};

/// Compiled read/mutation filter with optional ordering
#[derive(Debug, Clone)]
pub struct Filter {
    predicate: Predicate,
    order_data: Vec<FilterOrderInfo>,
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter {
    /// A filter that selects every record
    pub fn new() -> Self {
        Self {
            predicate: Predicate::All,
            order_data: vec![],
        }
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.filter { self.where_clause(&where_clause)?; }
        if let Some(order) = data.sort { self.order(&order)?; }
        Ok(self)
    }

    /// Build a filter from just a filter object (mutations have no ordering)
    pub fn from_where(where_data: Option<&Value>) -> Result<Self, FilterError> {
        let mut filter = Self::new();
        if let Some(where_data) = where_data {
            filter.where_clause(where_data)?;
        }
        Ok(filter)
    }

    pub fn where_clause(&mut self, conditions: &Value) -> Result<&mut Self, FilterError> {
        let predicate = FilterWhere::compile(Some(conditions))?;
        self.predicate = std::mem::replace(&mut self.predicate, Predicate::All).and(predicate);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: &Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(order_spec)?;
        Ok(self)
    }

    /// True when this filter selects every record
    pub fn selects_all(&self) -> bool {
        self.predicate.is_all()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.predicate.matches(record)
    }

    /// Keep the matching records and order them
    pub fn apply(&self, records: Vec<StoredRecord>) -> Vec<StoredRecord> {
        let mut out: Vec<StoredRecord> = records
            .into_iter()
            .filter(|r| self.matches(&r.record))
            .collect();
        FilterOrder::apply(&self.order_data, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::seed::seed_employees;
    use serde_json::json;

    fn seeded() -> Vec<StoredRecord> {
        seed_employees()
            .into_iter()
            .enumerate()
            .map(|(i, r)| StoredRecord::new(i as i64 + 1, r))
            .collect()
    }

    #[test]
    fn department_filter_ignores_sort_field_for_membership() {
        for sort in [json!("age"), json!("name desc"), json!("salary_amount"), Value::Null] {
            let mut filter = Filter::new();
            filter
                .assign(FilterData { filter: Some(json!({"department": "IT"})), sort: Some(sort) })
                .unwrap();
            let out = filter.apply(seeded());
            let mut names: Vec<&str> = out
                .iter()
                .filter_map(|r| r.record.get("name").and_then(|v| v.as_str()))
                .collect();
            names.sort();
            assert_eq!(names, vec!["Amit", "Neha", "Suresh"]);
        }
    }

    #[test]
    fn regex_scenario_matches_substring_case_insensitively() {
        let filter = Filter::from_where(Some(&json!({"name": {"$regex": "ra"}}))).unwrap();
        let names: Vec<String> = filter
            .apply(seeded())
            .iter()
            .filter_map(|r| r.record.get("name").and_then(|v| v.as_str()).map(String::from))
            .collect();
        assert_eq!(names, vec!["Karan", "Raj", "Vikram"]);
    }

    #[test]
    fn sorted_read() {
        let mut filter = Filter::new();
        filter
            .assign(FilterData { filter: Some(json!({"age": {"$gt": 30}})), sort: Some(json!("age")) })
            .unwrap();
        let ages: Vec<i64> = filter
            .apply(seeded())
            .iter()
            .filter_map(|r| r.record.get("age").and_then(|v| v.as_i64()))
            .collect();
        assert_eq!(ages, vec![31, 33, 35, 40]);
    }
}
