//! Validation rules for form fields

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::Values;
use crate::shared::record::{is_blank, parse_instant, value_number, value_text};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

/// Mainland mobile numbers or landlines with area code
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(1[3-9]\d{9}|0\d{2,3}-?\d{7,8})$").unwrap());

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap());

/// Well-known textual formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    Email,
    Phone,
    Url,
    Date,
}

impl FieldFormat {
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            Self::Email => EMAIL_RE.is_match(text),
            Self::Phone => PHONE_RE.is_match(text),
            Self::Url => URL_RE.is_match(text),
            Self::Date => parse_instant(text).is_some(),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Email => "请输入有效的邮箱地址",
            Self::Phone => "请输入有效的电话号码",
            Self::Url => "请输入有效的网址",
            Self::Date => "请输入有效的日期",
        }
    }
}

/// Predicate over the field value and the whole form
pub type CustomCheck = fn(&Value, &Values) -> bool;

#[derive(Debug, Clone)]
pub struct CustomRule {
    pub check: CustomCheck,
    pub message: String,
}

/// Validation rules for a field
#[derive(Debug, Clone, Default)]
pub struct ValidationRules {
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub format: Option<FieldFormat>,
    pub custom: Vec<CustomRule>,
    /// Message shown when `pattern` does not match
    pub custom_error: Option<String>,
}

impl ValidationRules {
    /// Create empty validation rules (all optional, no constraints)
    pub fn none() -> Self {
        Self::default()
    }

    /// Create validation rules for required field
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_pattern(
        mut self,
        pattern: &str,
        message: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        self.pattern = Some(Regex::new(pattern)?);
        self.custom_error = Some(message.into());
        Ok(self)
    }

    pub fn with_format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_custom(mut self, check: CustomCheck, message: impl Into<String>) -> Self {
        self.custom.push(CustomRule {
            check,
            message: message.into(),
        });
        self
    }

    /// Check if field is required
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// All messages for `value`. A blank optional value passes every rule.
    pub fn validate(&self, value: Option<&Value>, values: &Values, field_label: &str) -> Vec<String> {
        let value = match value {
            Some(v) if !is_blank(Some(v)) => v,
            _ => {
                return if self.required {
                    vec![format!("{}不能为空", field_label)]
                } else {
                    Vec::new()
                };
            }
        };

        let mut errors = Vec::new();

        if self.min.is_some() || self.max.is_some() {
            if let Err(e) = self.validate_number(value, field_label) {
                errors.push(e);
            }
        }

        let text = value_text(value);
        if let Err(e) = self.validate_string(&text, field_label) {
            errors.push(e);
        }

        if let Some(format) = self.format {
            if !format.accepts(text.trim()) {
                errors.push(format.message().to_string());
            }
        }

        for rule in &self.custom {
            if !(rule.check)(value, values) {
                errors.push(rule.message.clone());
            }
        }

        errors
    }

    /// Validate a string value against length and pattern rules
    pub fn validate_string(&self, value: &str, field_label: &str) -> Result<(), String> {
        let length = value.chars().count();

        if let Some(min) = self.min_length {
            if length < min {
                return Err(format!("{}至少需要{}个字符", field_label, min));
            }
        }

        if let Some(max) = self.max_length {
            if length > max {
                return Err(format!("{}不能超过{}个字符", field_label, max));
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return Err(self
                    .custom_error
                    .clone()
                    .unwrap_or_else(|| format!("{}格式不正确", field_label)));
            }
        }

        Ok(())
    }

    /// Validate a numeric value against min/max rules
    pub fn validate_number(&self, value: &Value, field_label: &str) -> Result<(), String> {
        let Some(number) = value_number(value) else {
            return Err(format!("{}必须是数字", field_label));
        };

        if let Some(min) = self.min {
            if number < min {
                return Err(format!("{}不能小于{}", field_label, min));
            }
        }

        if let Some(max) = self.max {
            if number > max {
                return Err(format!("{}不能大于{}", field_label, max));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(rules: &ValidationRules, value: Value) -> Vec<String> {
        rules.validate(Some(&value), &Values::new(), "数量")
    }

    #[test]
    fn test_required() {
        let rules = ValidationRules::required();
        assert_eq!(check(&rules, json!("  ")), vec!["数量不能为空"]);
        assert_eq!(rules.validate(None, &Values::new(), "数量"), vec!["数量不能为空"]);
        assert!(check(&rules, json!("x")).is_empty());
    }

    #[test]
    fn test_optional_blank_skips_other_rules() {
        let rules = ValidationRules::none().with_format(FieldFormat::Email);
        assert!(check(&rules, json!("")).is_empty());
        assert!(check(&rules, json!(null)).is_empty());
    }

    #[test]
    fn test_numeric_range() {
        let rules = ValidationRules::required().with_range(Some(1.0), Some(100.0));
        assert_eq!(check(&rules, json!(0)), vec!["数量不能小于1"]);
        assert_eq!(check(&rules, json!("250")), vec!["数量不能大于100"]);
        assert_eq!(check(&rules, json!("abc")), vec!["数量必须是数字"]);
        assert!(check(&rules, json!(42)).is_empty());
    }

    #[test]
    fn test_length_counts_characters() {
        let rules = ValidationRules::none().with_length(Some(2), Some(4));
        assert!(check(&rules, json!("北京钢铁")).is_empty());
        assert_eq!(check(&rules, json!("北")), vec!["数量至少需要2个字符"]);
    }

    #[test]
    fn test_pattern_with_message() {
        let rules = ValidationRules::required()
            .with_pattern(r"^HT-\d{3}$", "合同编号格式为 HT-000")
            .unwrap();
        assert_eq!(check(&rules, json!("HT-1")), vec!["合同编号格式为 HT-000"]);
        assert!(check(&rules, json!("HT-001")).is_empty());
    }

    #[test]
    fn test_formats() {
        assert!(FieldFormat::Email.accepts("buyer@plant.cn"));
        assert!(!FieldFormat::Email.accepts("buyer@plant"));
        assert!(FieldFormat::Phone.accepts("13812345678"));
        assert!(FieldFormat::Phone.accepts("010-12345678"));
        assert!(!FieldFormat::Phone.accepts("12345"));
        assert!(FieldFormat::Url.accepts("https://erp.example.com/po/1"));
        assert!(!FieldFormat::Url.accepts("ftp://x"));
        assert!(FieldFormat::Date.accepts("2024-02-29"));
        assert!(!FieldFormat::Date.accepts("2023-02-29"));
    }

    #[test]
    fn test_custom_sees_whole_form() {
        let rules = ValidationRules::none().with_custom(
            |value, values| {
                let limit = values.get("limit").and_then(|v| v.as_f64()).unwrap_or(0.0);
                value.as_f64().map(|v| v <= limit).unwrap_or(false)
            },
            "超过上限",
        );
        let mut values = Values::new();
        values.insert("limit".into(), json!(10));
        assert!(rules.validate(Some(&json!(5)), &values, "到货").is_empty());
        assert_eq!(rules.validate(Some(&json!(11)), &values, "到货"), vec!["超过上限"]);
    }
}
