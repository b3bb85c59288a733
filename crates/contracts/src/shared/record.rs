//! Records, keys and value helpers shared by the grid, form and export code.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One row of page data: field name -> JSON value.
pub type Record = Map<String, Value>;

/// Unique identifier of a record inside a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    Number(i64),
    Text(String),
}

impl RecordKey {
    /// Reads a key out of a stored field value. Null, empty strings and
    /// non-integral numbers are not keys.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordKey::Number),
            Value::String(s) if !s.trim().is_empty() => Some(RecordKey::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordKey::Number(n) => Value::from(*n),
            RecordKey::Text(s) => Value::String(s.clone()),
        }
    }

    /// Generates a collision-resistant key: unix millis plus a random suffix.
    pub fn generate() -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        RecordKey::Text(format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            &suffix[..8]
        ))
    }

    /// Generates keys until one is not taken.
    pub fn generate_unique(is_taken: impl Fn(&RecordKey) -> bool) -> Self {
        loop {
            let key = Self::generate();
            if !is_taken(&key) {
                return key;
            }
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Number(n) => write!(f, "{}", n),
            RecordKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        RecordKey::Text(value.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(value: String) -> Self {
        RecordKey::Text(value)
    }
}

impl From<i64> for RecordKey {
    fn from(value: i64) -> Self {
        RecordKey::Number(value)
    }
}

/// Reads the key of `record` stored under `key_field`.
pub fn record_key(record: &Record, key_field: &str) -> Option<RecordKey> {
    record.get(key_field).and_then(RecordKey::from_value)
}

/// Missing and null are the same thing for every consumer.
pub fn is_present(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

/// Truthiness used by presence filters and dependency predicates.
///
/// Empty strings, empty arrays, `false`, `0` and null are falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(_)) => true,
    }
}

/// Blank in the form sense: missing, null, whitespace-only text or an empty list.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

/// Plain text rendition of a value, used for search and equality filters.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Numeric reading of a value: numbers as is, numeric strings parsed.
pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parses the date shapes the pages store: `YYYY-MM-DD`,
/// `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339. Offsets are
/// normalized to UTC so values compare by instant.
pub fn parse_instant(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    match DateTime::parse_from_rfc3339(text) {
        Ok(dt) => Some(dt.naive_utc()),
        Err(_) => parse_naive(text),
    }
}

/// Same shapes as [`parse_instant`], but an RFC 3339 value keeps the wall
/// clock of its own offset. Used for display.
pub fn parse_wall_clock(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    match DateTime::parse_from_rfc3339(text) {
        Ok(dt) => Some(dt.naive_local()),
        Err(_) => parse_naive(text),
    }
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_from_value() {
        assert_eq!(RecordKey::from_value(&json!(7)), Some(RecordKey::Number(7)));
        assert_eq!(RecordKey::from_value(&json!("c-1")), Some(RecordKey::from("c-1")));
        assert_eq!(RecordKey::from_value(&json!("  ")), None);
        assert_eq!(RecordKey::from_value(&json!(null)), None);
        assert_eq!(RecordKey::from_value(&json!(1.5)), None);
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = RecordKey::generate();
        let b = RecordKey::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!([]))));
        assert!(is_truthy(Some(&json!("需要"))));
        assert!(is_truthy(Some(&json!({"a": 1}))));
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!(12)), "12");
        assert_eq!(value_text(&json!(["钢板", "螺栓"])), "钢板,螺栓");
    }

    #[test]
    fn test_parse_instant() {
        assert!(parse_instant("2024-03-15").is_some());
        assert!(parse_instant("2024-03-15 08:30:00").is_some());
        assert!(parse_instant("2024-03-15T08:30:00Z").is_some());
        assert!(parse_instant("15.03.2024").is_none());
        assert!(
            parse_instant("2024-03-15").unwrap() < parse_instant("2024-03-15 00:00:01").unwrap()
        );
    }

    #[test]
    fn test_wall_clock_keeps_offset() {
        let text = "2024-03-15T01:00:00+08:00";
        assert_eq!(parse_instant(text).unwrap().to_string(), "2024-03-14 17:00:00");
        assert_eq!(parse_wall_clock(text).unwrap().to_string(), "2024-03-15 01:00:00");
        assert_eq!(parse_wall_clock("2024-03-15"), parse_instant("2024-03-15"));
    }
}
