use serde_json::{json, Value};

use super::record::Record;

/// Demo employees written into a freshly created store
pub fn seed_employees() -> Vec<Record> {
    let rows: [Value; 10] = [
        json!({"name": "Amit",   "age": 29, "department": "IT",        "salary_amount": 75000,  "salary_currency": "INR", "location": "Hyderabad"}),
        json!({"name": "Priya",  "age": 24, "department": "HR",        "salary_amount": 52000,  "salary_currency": "INR", "location": "Chennai"}),
        json!({"name": "Karan",  "age": 31, "department": "Finance",   "salary_amount": 88000,  "salary_currency": "INR", "location": "Mumbai"}),
        json!({"name": "Neha",   "age": 27, "department": "IT",        "salary_amount": 67000,  "salary_currency": "INR", "location": "Bangalore"}),
        json!({"name": "Raj",    "age": 35, "department": "Finance",   "salary_amount": 95000,  "salary_currency": "INR", "location": "Pune"}),
        json!({"name": "Anita",  "age": 22, "department": "HR",        "salary_amount": 48000,  "salary_currency": "INR", "location": "Delhi"}),
        json!({"name": "Suresh", "age": 40, "department": "IT",        "salary_amount": 110000, "salary_currency": "INR", "location": "Hyderabad"}),
        json!({"name": "Divya",  "age": 28, "department": "Marketing", "salary_amount": 61000,  "salary_currency": "INR", "location": "Chennai"}),
        json!({"name": "Vikram", "age": 33, "department": "Finance",   "salary_amount": 79000,  "salary_currency": "INR", "location": "Mumbai"}),
        json!({"name": "Pooja",  "age": 26, "department": "Marketing", "salary_amount": 55000,  "salary_currency": "INR", "location": "Bangalore"}),
    ];

    rows.into_iter()
        .filter_map(|v| v.as_object().cloned())
        .map(Record::from_stored)
        .collect()
}

/// Schema text used when the document store has no sample document
pub const SCHEMA_DESCRIPTION: &str = "\
Fields (same in both stores):
  name            (str)   - employee name
  age             (int)   - age in years
  department      (str)   - IT | HR | Finance | Marketing
  salary_amount   (float) - monthly salary in INR
  salary_currency (str)   - always \"INR\"
  location        (str)   - city
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_ten_employees_with_three_in_it() {
        let seed = seed_employees();
        assert_eq!(seed.len(), 10);
        let it = seed
            .iter()
            .filter(|r| r.get("department").and_then(|v| v.as_str()) == Some("IT"))
            .count();
        assert_eq!(it, 3);
    }
}
