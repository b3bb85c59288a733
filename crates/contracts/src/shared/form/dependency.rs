//! Field dependencies as data: a trigger field, the fields it affects and
//! a tagged effect. [`evaluate`] is the only interpreter; it is a pure
//! function of (dependency, new trigger value, current values).

use serde_json::Value;

use super::Values;
use crate::shared::record::{is_truthy, value_text};

pub type ValuePredicate = fn(&Value, &Values) -> bool;
pub type ValueCompute = fn(&Value, &Values) -> Value;

/// Condition on the trigger's new value
#[derive(Debug, Clone)]
pub enum Predicate {
    Always,
    Equals(Value),
    NotEquals(Value),
    OneOf(Vec<Value>),
    Truthy,
    Falsy,
    Custom(ValuePredicate),
}

impl Predicate {
    pub fn holds(&self, value: &Value, values: &Values) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Equals(expected) => loosely_equal(value, expected),
            Predicate::NotEquals(expected) => !loosely_equal(value, expected),
            Predicate::OneOf(options) => options.iter().any(|o| loosely_equal(value, o)),
            Predicate::Truthy => is_truthy(Some(value)),
            Predicate::Falsy => !is_truthy(Some(value)),
            Predicate::Custom(check) => check(value, values),
        }
    }
}

/// Text and numbers compare by their text so `"3"` equals `3`.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::String(_), Value::Number(_)) | (Value::Number(_), Value::String(_)) => {
            value_text(a) == value_text(b)
        }
        _ => false,
    }
}

/// Where a forced value comes from
#[derive(Debug, Clone)]
pub enum ValueSource {
    Constant(Value),
    /// Copy of the trigger's new value
    Trigger,
    Computed(ValueCompute),
}

#[derive(Debug, Clone)]
pub enum FieldEffect {
    /// Targets are visible exactly when the predicate holds
    Visible(Predicate),
    /// Targets are disabled exactly when the predicate holds
    Disabled(Predicate),
    /// Targets take the value when the predicate holds, otherwise untouched
    SetValue { when: Predicate, value: ValueSource },
}

#[derive(Debug, Clone)]
pub struct FieldDependency {
    pub trigger: String,
    pub targets: Vec<String>,
    pub effect: FieldEffect,
}

impl FieldDependency {
    pub fn new(trigger: impl Into<String>, targets: &[&str], effect: FieldEffect) -> Self {
        Self {
            trigger: trigger.into(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
            effect,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Visible(bool),
    Disabled(bool),
    Value(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectOutcome {
    pub field: String,
    pub change: FieldChange,
}

pub fn evaluate(dependency: &FieldDependency, new_value: &Value, values: &Values) -> Vec<EffectOutcome> {
    let change = match &dependency.effect {
        FieldEffect::Visible(when) => Some(FieldChange::Visible(when.holds(new_value, values))),
        FieldEffect::Disabled(when) => Some(FieldChange::Disabled(when.holds(new_value, values))),
        FieldEffect::SetValue { when, value } => when.holds(new_value, values).then(|| {
            FieldChange::Value(match value {
                ValueSource::Constant(v) => v.clone(),
                ValueSource::Trigger => new_value.clone(),
                ValueSource::Computed(compute) => compute(new_value, values),
            })
        }),
    };

    match change {
        Some(change) => dependency
            .targets
            .iter()
            .map(|field| EffectOutcome {
                field: field.clone(),
                change: change.clone(),
            })
            .collect(),
        None => Vec::new(),
    }
}

/// Outcomes of every dependency declared on `trigger`.
pub fn evaluate_trigger(
    dependencies: &[FieldDependency],
    trigger: &str,
    new_value: &Value,
    values: &Values,
) -> Vec<EffectOutcome> {
    dependencies
        .iter()
        .filter(|d| d.trigger == trigger)
        .flat_map(|d| evaluate(d, new_value, values))
        .collect()
}
