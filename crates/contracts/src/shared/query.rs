//! Declarative inputs of the grid pipeline: search, filters, sort, page.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Filter value meaning "no constraint on this field"
pub const ALL_SENTINEL: &str = "全部";

/// Presence filter value: field must be truthy
pub const PRESENCE_HAS: &str = "has";

/// Presence filter value: field must be falsy
pub const PRESENCE_NONE: &str = "none";

/// Field name suffix that switches a filter to presence semantics
pub const PRESENCE_MARKER: &str = "requirement";

/// Keyword search over a fixed list of fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub keyword: String,
    pub fields: Vec<String>,
}

impl SearchState {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            keyword: String::new(),
            fields,
        }
    }

    /// Case-folded keyword, `None` when the search is inactive.
    pub fn needle(&self) -> Option<String> {
        let keyword = self.keyword.trim();
        if keyword.is_empty() {
            None
        } else {
            Some(keyword.to_lowercase())
        }
    }
}

/// Field name -> required value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec(BTreeMap<String, Value>);

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Constraints that actually restrict the collection.
    pub fn active(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(_, value)| is_constraint(value))
            .map(|(field, value)| (field.as_str(), value))
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }
}

/// Null, empty text and the "all" sentinel do not constrain a field.
pub fn is_constraint(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s != ALL_SENTINEL
        }
        _ => true,
    }
}

/// Presence fields compare truthiness instead of values.
pub fn is_presence_field(field: &str) -> bool {
    field.to_lowercase().ends_with(PRESENCE_MARKER)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Asc
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Ordered sort keys; earlier keys win
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec(pub Vec<SortKey>);

impl SortSpec {
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn by(key: SortKey) -> Self {
        Self(vec![key])
    }

    pub fn then(mut self, key: SortKey) -> Self {
        self.0.push(key);
        self
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Direction of `field` when it is the primary key.
    pub fn primary_direction(&self, field: &str) -> Option<SortDirection> {
        self.0
            .first()
            .filter(|key| key.field == field)
            .map(|key| key.direction)
    }
}

/// Zero-based page index and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub index: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(index: usize, size: usize) -> Self {
        Self { index, size }
    }

    pub fn first(size: usize) -> Self {
        Self { index: 0, size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_sentinel_is_not_a_constraint() {
        let spec = FilterSpec::new()
            .with("status", ALL_SENTINEL)
            .with("supplier", "")
            .with("warehouse", Value::Null)
            .with("priority", "high");
        let active: Vec<_> = spec.active().map(|(f, _)| f).collect();
        assert_eq!(active, vec!["priority"]);
    }

    #[test]
    fn test_presence_field_detection() {
        assert!(is_presence_field("qualityRequirement"));
        assert!(is_presence_field("sample_requirement"));
        assert!(!is_presence_field("requirementNo"));
    }

    #[test]
    fn test_search_needle() {
        let mut search = SearchState::new(vec!["supplier".into()]);
        assert_eq!(search.needle(), None);
        search.keyword = "  ABC ".into();
        assert_eq!(search.needle().as_deref(), Some("abc"));
    }

    #[test]
    fn test_sort_spec_serde_shape() {
        let spec = SortSpec::by(SortKey::desc("signDate")).then(SortKey::asc("contractNo"));
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!([
                {"field": "signDate", "direction": "desc"},
                {"field": "contractNo", "direction": "asc"}
            ])
        );
        assert_eq!(spec.primary_direction("signDate"), Some(SortDirection::Desc));
        assert_eq!(spec.primary_direction("contractNo"), None);
    }
}
