use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

use crate::shared::record::Record;

/// Computes a field from the rest of the record
pub type DerivedField = fn(&Record) -> Value;

/// Reads stored and derived fields through one lookup
#[derive(Debug, Clone, Default)]
pub struct FieldResolver {
    derived: HashMap<String, DerivedField>,
}

impl FieldResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_derived(mut self, field: impl Into<String>, compute: DerivedField) -> Self {
        self.register(field, compute);
        self
    }

    pub fn register(&mut self, field: impl Into<String>, compute: DerivedField) {
        self.derived.insert(field.into(), compute);
    }

    pub fn is_derived(&self, field: &str) -> bool {
        self.derived.contains_key(field)
    }

    /// Derived fields shadow stored ones. Null reads as missing.
    pub fn get<'a>(&self, record: &'a Record, field: &str) -> Option<Cow<'a, Value>> {
        let value = match self.derived.get(field) {
            Some(compute) => Cow::Owned(compute(record)),
            None => Cow::Borrowed(record.get(field)?),
        };
        if value.is_null() {
            None
        } else {
            Some(value)
        }
    }
}
