//! Predicate evaluation and ordering over JSON documents.
//!
//! These rules follow managed document-store semantics rather than plain JSON
//! equality: integers and floats compare numerically, range and `in` filters
//! only match values of a comparable type, and a missing field never matches.

use std::cmp::Ordering;

use docgate::{Direction, FilterValue, Operator, Predicate, Scalar, SortKey};
use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::{StoreError, StoreResult};

/// Upper bound on `in` list length accepted by the store.
pub const MAX_IN_VALUES: usize = 30;

/// Resolve a dotted field path (`address.city`) inside a document.
pub fn lookup<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn validate_path(path: &str) -> StoreResult<()> {
    if path.is_empty() {
        return Err(StoreError::InvalidFilter("field path must not be empty".into()));
    }
    if path.split('.').any(str::is_empty) {
        return Err(StoreError::InvalidFilter(format!(
            "field path {path:?} contains an empty segment"
        )));
    }
    Ok(())
}

/// Reject predicates and sort keys the store cannot execute.
pub fn validate(predicates: &[Predicate], sort: &[SortKey]) -> StoreResult<()> {
    for predicate in predicates {
        validate_path(&predicate.field)?;
        if let FilterValue::List(items) = &predicate.value {
            if items.is_empty() {
                return Err(StoreError::InvalidFilter(format!(
                    "'in' filter on {:?} needs at least one value",
                    predicate.field
                )));
            }
            if items.len() > MAX_IN_VALUES {
                return Err(StoreError::InvalidFilter(format!(
                    "'in' filter on {:?} supports at most {MAX_IN_VALUES} values, got {}",
                    predicate.field,
                    items.len()
                )));
            }
        }
    }
    for key in sort {
        validate_path(&key.field)?;
    }
    Ok(())
}

fn scalar_cmp(stored: &Value, wanted: &Scalar) -> Option<Ordering> {
    match (stored, wanted) {
        (Value::Number(n), Scalar::Int(i)) => {
            if let Some(v) = n.as_i64() {
                Some(v.cmp(i))
            } else {
                n.as_f64()?.partial_cmp(&(*i as f64))
            }
        }
        (Value::Number(n), Scalar::Float(f)) => n.as_f64()?.partial_cmp(f),
        (Value::String(s), Scalar::Str(w)) => Some(s.as_str().cmp(w.as_str())),
        _ => None,
    }
}

fn scalar_eq(stored: &Value, wanted: &Scalar) -> bool {
    scalar_cmp(stored, wanted) == Some(Ordering::Equal)
}

/// Whether `fields` satisfies one predicate.
pub fn matches(fields: &Map<String, Value>, predicate: &Predicate) -> bool {
    let Some(stored) = lookup(fields, &predicate.field) else {
        return false;
    };
    match (&predicate.op, &predicate.value) {
        (Operator::Eq, FilterValue::Scalar(wanted)) => scalar_eq(stored, wanted),
        (Operator::In, FilterValue::List(items)) => items.iter().any(|w| scalar_eq(stored, w)),
        (op, FilterValue::Scalar(wanted)) if op.is_range() => {
            let Some(ordering) = scalar_cmp(stored, wanted) else {
                return false;
            };
            match op {
                Operator::Gt => ordering == Ordering::Greater,
                Operator::Gte => ordering != Ordering::Less,
                Operator::Lt => ordering == Ordering::Less,
                Operator::Lte => ordering != Ordering::Greater,
                _ => false,
            }
        }
        _ => false,
    }
}

/// Whether `fields` satisfies every predicate.
pub fn matches_all(fields: &Map<String, Value>, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|p| matches(fields, p))
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order on JSON values: null < bool < number < string < array < object.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let x = x.as_f64().unwrap_or(0.0);
                    let y = y.as_f64().unwrap_or(0.0);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
            }
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y) {
                let ord = compare_values(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Order documents by `sort`, dropping those missing any ordered field.
///
/// The sort is stable, so documents that tie keep their incoming (id) order.
pub fn sort_documents(documents: &mut Vec<Document>, sort: &[SortKey]) {
    if sort.is_empty() {
        return;
    }
    documents.retain(|doc| sort.iter().all(|key| lookup(&doc.fields, &key.field).is_some()));
    documents.sort_by(|a, b| {
        for key in sort {
            let (Some(left), Some(right)) =
                (lookup(&a.fields, &key.field), lookup(&b.fields, &key.field))
            else {
                continue;
            };
            let ordering = match key.direction {
                Direction::Ascending => compare_values(left, right),
                Direction::Descending => compare_values(left, right).reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("object expected"),
        }
    }

    fn scalar(field: &str, op: Operator, value: Scalar) -> Predicate {
        Predicate::new(field, op, FilterValue::Scalar(value))
    }

    #[test]
    fn test_numeric_equality_crosses_int_and_float() {
        let doc = fields(json!({"qty": 3.0, "price": 10}));
        assert!(matches(&doc, &scalar("qty", Operator::Eq, Scalar::Int(3))));
        assert!(matches(&doc, &scalar("price", Operator::Eq, Scalar::Float(10.0))));
    }

    #[test]
    fn test_range_requires_comparable_types() {
        let doc = fields(json!({"price": 10, "name": "b"}));
        assert!(matches(&doc, &scalar("price", Operator::Gte, Scalar::Int(10))));
        assert!(!matches(&doc, &scalar("price", Operator::Gt, Scalar::Int(10))));
        assert!(matches(&doc, &scalar("price", Operator::Lt, Scalar::Float(10.5))));
        assert!(!matches(&doc, &scalar("price", Operator::Lt, Scalar::Str("z".into()))));
        assert!(matches(&doc, &scalar("name", Operator::Gt, Scalar::Str("a".into()))));
        assert!(matches(&doc, &scalar("name", Operator::Lte, Scalar::Str("b".into()))));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let doc = fields(json!({"a": 1}));
        assert!(!matches(&doc, &scalar("b", Operator::Eq, Scalar::Int(1))));
        assert!(!matches(&doc, &scalar("b", Operator::Lt, Scalar::Int(100))));
    }

    #[test]
    fn test_in_and_dotted_paths() {
        let doc = fields(json!({"status": "paid", "address": {"city": "Oslo"}}));
        let in_pred = Predicate::new(
            "status",
            Operator::In,
            FilterValue::List(vec![Scalar::Str("new".into()), Scalar::Str("paid".into())]),
        );
        assert!(matches(&doc, &in_pred));
        assert!(matches(
            &doc,
            &scalar("address.city", Operator::Eq, Scalar::Str("Oslo".into()))
        ));
        assert!(!matches(
            &doc,
            &scalar("address.zip", Operator::Eq, Scalar::Str("0150".into()))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_filters() {
        let empty = scalar("", Operator::Eq, Scalar::Int(1));
        assert!(matches!(validate(&[empty], &[]), Err(StoreError::InvalidFilter(_))));

        let dotted = scalar("a..b", Operator::Eq, Scalar::Int(1));
        assert!(validate(&[dotted], &[]).is_err());

        let too_many = Predicate::new(
            "n",
            Operator::In,
            FilterValue::List((0..31).map(Scalar::Int).collect()),
        );
        assert!(validate(&[too_many], &[]).is_err());

        let fine = Predicate::new(
            "n",
            Operator::In,
            FilterValue::List((0..30).map(Scalar::Int).collect()),
        );
        assert!(validate(&[fine], &[]).is_ok());
    }

    #[test]
    fn test_sort_drops_missing_and_orders_by_priority() {
        let mut docs = vec![
            Document::new("a", fields(json!({"group": 1, "score": 5}))),
            Document::new("b", fields(json!({"group": 2, "score": 1}))),
            Document::new("c", fields(json!({"score": 9}))),
            Document::new("d", fields(json!({"group": 1, "score": 7}))),
        ];
        let sort = vec![
            SortKey {
                field: "group".into(),
                direction: Direction::Ascending,
            },
            SortKey {
                field: "score".into(),
                direction: Direction::Descending,
            },
        ];
        sort_documents(&mut docs, &sort);
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "a", "b"]);
    }

    #[test]
    fn test_compare_values_type_order() {
        assert_eq!(compare_values(&json!(null), &json!(false)), Ordering::Less);
        assert_eq!(compare_values(&json!(1), &json!("1")), Ordering::Less);
        assert_eq!(compare_values(&json!(2), &json!(1.5)), Ordering::Greater);
        assert_eq!(compare_values(&json!([1, 2]), &json!([1])), Ordering::Greater);
    }
}
