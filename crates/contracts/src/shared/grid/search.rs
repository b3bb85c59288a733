//! Keyword search: case-insensitive substring match over a list of fields.

use super::fields::FieldResolver;
use crate::shared::query::SearchState;
use crate::shared::record::{value_text, Record};

/// `needle` must already be case-folded.
pub fn matches_keyword(
    record: &Record,
    resolver: &FieldResolver,
    fields: &[String],
    needle: &str,
) -> bool {
    fields.iter().any(|field| {
        resolver
            .get(record, field)
            .map(|value| value_text(&value).to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

/// Records matching the search, in input order. An empty keyword keeps all.
pub fn filter_by_keyword<'a>(
    records: &'a [Record],
    resolver: &FieldResolver,
    search: &SearchState,
) -> Vec<&'a Record> {
    match search.needle() {
        None => records.iter().collect(),
        Some(needle) => records
            .iter()
            .filter(|record| matches_keyword(record, resolver, &search.fields, &needle))
            .collect(),
    }
}
