//! Field filters: equality per field, truthiness for presence fields.

use serde_json::Value;

use super::fields::FieldResolver;
use crate::shared::query::{is_presence_field, FilterSpec, PRESENCE_HAS, PRESENCE_NONE};
use crate::shared::record::{is_truthy, value_text, Record};

/// Whether `record` satisfies every active constraint of `spec`.
pub fn matches_filters(record: &Record, resolver: &FieldResolver, spec: &FilterSpec) -> bool {
    spec.active()
        .all(|(field, wanted)| matches_field(record, resolver, field, wanted))
}

fn matches_field(record: &Record, resolver: &FieldResolver, field: &str, wanted: &Value) -> bool {
    let actual = resolver.get(record, field);

    if is_presence_field(field) {
        match wanted.as_str() {
            Some(PRESENCE_HAS) => return is_truthy(actual.as_deref()),
            Some(PRESENCE_NONE) => return !is_truthy(actual.as_deref()),
            _ => {}
        }
    }

    // A field the record does not carry never matches a real constraint.
    let Some(actual) = actual else {
        return false;
    };
    values_equal(&actual, wanted)
}

fn values_equal(actual: &Value, wanted: &Value) -> bool {
    match (actual, wanted) {
        (Value::Array(items), _) => items.iter().any(|item| values_equal(item, wanted)),
        (_, Value::String(text)) => value_text(actual) == text.trim(),
        _ => actual == wanted,
    }
}

/// Records satisfying `spec`, in input order.
pub fn filter_by_fields<'a>(
    records: &'a [Record],
    resolver: &FieldResolver,
    spec: &FilterSpec,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| matches_filters(record, resolver, spec))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::query::ALL_SENTINEL;
    use serde_json::json;

    fn rows() -> Vec<Record> {
        vec![
            json!({"key": 1, "warehouse": "A", "qty": 10, "qualityRequirement": "GB/T 700"}),
            json!({"key": 2, "warehouse": "B", "qty": 5, "qualityRequirement": ""}),
            json!({"key": 3, "qty": 10, "tags": ["urgent", "steel"]}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
    }

    fn keys(found: &[&Record]) -> Vec<i64> {
        found.iter().map(|r| r["key"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_equality_and_missing_field() {
        let rows = rows();
        let spec = FilterSpec::new().with("warehouse", "A");
        assert_eq!(keys(&filter_by_fields(&rows, &FieldResolver::new(), &spec)), vec![1]);
    }

    #[test]
    fn test_number_matches_textual_filter() {
        let rows = rows();
        let spec = FilterSpec::new().with("qty", "10");
        assert_eq!(keys(&filter_by_fields(&rows, &FieldResolver::new(), &spec)), vec![1, 3]);
        let spec = FilterSpec::new().with("qty", 5);
        assert_eq!(keys(&filter_by_fields(&rows, &FieldResolver::new(), &spec)), vec![2]);
    }

    #[test]
    fn test_all_sentinel_keeps_records_without_field() {
        let rows = rows();
        let spec = FilterSpec::new().with("warehouse", ALL_SENTINEL);
        assert_eq!(keys(&filter_by_fields(&rows, &FieldResolver::new(), &spec)), vec![1, 2, 3]);
    }

    #[test]
    fn test_presence_semantics() {
        let rows = rows();
        let has = FilterSpec::new().with("qualityRequirement", "has");
        assert_eq!(keys(&filter_by_fields(&rows, &FieldResolver::new(), &has)), vec![1]);
        let none = FilterSpec::new().with("qualityRequirement", "none");
        assert_eq!(keys(&filter_by_fields(&rows, &FieldResolver::new(), &none)), vec![2, 3]);
    }

    #[test]
    fn test_array_field_matches_any_element() {
        let rows = rows();
        let spec = FilterSpec::new().with("tags", "steel");
        assert_eq!(keys(&filter_by_fields(&rows, &FieldResolver::new(), &spec)), vec![3]);
    }

    #[test]
    fn test_derived_field_filter() {
        let rows = rows();
        let resolver = FieldResolver::new().with_derived("big", |r| {
            json!(r.get("qty").and_then(|v| v.as_i64()).unwrap_or(0) >= 10)
        });
        let spec = FilterSpec::new().with("big", true);
        assert_eq!(keys(&filter_by_fields(&rows, &resolver, &spec)), vec![1, 3]);
    }
}
