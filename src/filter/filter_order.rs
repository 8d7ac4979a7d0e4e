use serde_json::Value;

use super::compare::sort_cmp;
use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};
use crate::database::record::StoredRecord;

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        match order {
            Value::Null => Ok(vec![]),
            Value::String(s) => Ok(Self::parse_order_string(s)),
            Value::Array(arr) => {
                // ["age desc", "name"]
                let mut out = Vec::new();
                for v in arr {
                    match v {
                        Value::String(s) => out.extend(Self::parse_order_string(s)),
                        other => return Err(FilterError::InvalidSort(format!("expected string, got {}", other))),
                    }
                }
                Ok(out)
            }
            Value::Object(obj) => {
                // { "age": "desc", "name": "asc" }
                let mut out = Vec::new();
                for (k, v) in obj {
                    let desc = match v {
                        Value::String(s) => s.eq_ignore_ascii_case("desc"),
                        Value::Number(n) => n.as_i64() == Some(-1),
                        _ => false,
                    };
                    let sort = if desc { SortDirection::Desc } else { SortDirection::Asc };
                    out.push(FilterOrderInfo { column: k.clone(), sort });
                }
                Ok(out)
            }
            other => Err(FilterError::InvalidSort(format!("unsupported sort value {}", other))),
        }
    }

    fn parse_order_string(s: &str) -> Vec<FilterOrderInfo> {
        // split on commas, then each token into column and direction
        let mut out = Vec::new();
        for part in s.split(',') {
            let mut it = part.split_whitespace();
            if let Some(col) = it.next() {
                let dir = it.next().unwrap_or("asc");
                let sort = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
                out.push(FilterOrderInfo { column: col.to_string(), sort });
            }
        }
        out
    }

    /// Stable sort by each key in turn
    pub fn apply(infos: &[FilterOrderInfo], records: &mut [StoredRecord]) {
        if infos.is_empty() {
            return;
        }
        records.sort_by(|a, b| {
            for info in infos {
                let ord = sort_cmp(a.record.get(&info.column), b.record.get(&info.column));
                let ord = match info.sort {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                };
                if ord.is_ne() {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::record::Record;
    use serde_json::json;

    fn rec(id: i64, v: Value) -> StoredRecord {
        StoredRecord::new(id, Record::from_stored(v.as_object().cloned().unwrap_or_default()))
    }

    #[test]
    fn parses_string_forms() {
        let infos = FilterOrder::validate_and_parse(&json!("age desc, name")).unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].sort, SortDirection::Desc);
        assert_eq!(infos[1].column, "name");
        assert_eq!(infos[1].sort, SortDirection::Asc);
    }

    #[test]
    fn sorts_by_field_with_missing_first() {
        let mut records = vec![
            rec(1, json!({"age": 31})),
            rec(2, json!({"name": "no age"})),
            rec(3, json!({"age": 24})),
        ];
        let infos = FilterOrder::validate_and_parse(&json!("age")).unwrap();
        FilterOrder::apply(&infos, &mut records);
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let infos = FilterOrder::validate_and_parse(&json!({"age": "desc"})).unwrap();
        FilterOrder::apply(&infos, &mut records);
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }
}
