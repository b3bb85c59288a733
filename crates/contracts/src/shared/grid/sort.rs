//! Multi-key stable sort over records.

use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::fields::FieldResolver;
use crate::shared::query::{SortDirection, SortSpec};
use crate::shared::record::{parse_instant, value_text, Record};

/// Field-specific ordering; `None` is a missing value
pub type FieldComparator = fn(Option<&Value>, Option<&Value>) -> Ordering;

/// Default value ordering.
///
/// Missing sorts below anything present. Numbers compare numerically.
/// Strings that read as dates sort before other strings and compare by
/// instant among themselves; the rest compare by code point. Mixed kinds
/// fall back to a fixed kind rank.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_present(a, b),
    }
}

fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => match (parse_instant(x), parse_instant(y)) {
            (Some(dx), Some(dy)) => dx.cmp(&dy),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => x.as_str().cmp(y.as_str()),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            value_text(a).cmp(&value_text(b))
        }
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Compares two records key by key; the first non-equal key decides.
pub fn compare_records(
    a: &Record,
    b: &Record,
    spec: &SortSpec,
    resolver: &FieldResolver,
    comparators: &HashMap<String, FieldComparator>,
) -> Ordering {
    for key in spec.keys() {
        let compare = comparators
            .get(&key.field)
            .copied()
            .unwrap_or(compare_values as FieldComparator);
        let left = resolver.get(a, &key.field);
        let right = resolver.get(b, &key.field);
        let ordering = compare(left.as_deref(), right.as_deref());
        let ordering = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Sorts in place; ties keep their current relative order.
pub fn sort_records(
    records: &mut [&Record],
    spec: &SortSpec,
    resolver: &FieldResolver,
    comparators: &HashMap<String, FieldComparator>,
) {
    if spec.is_empty() {
        return;
    }
    records.sort_by(|a, b| compare_records(a, b, spec, resolver, comparators));
}
