use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::dependency::{evaluate, evaluate_trigger, EffectOutcome, FieldChange, FieldDependency};
use super::history::History;
use super::validation::ValidationRules;
use super::Values;
use crate::shared::error::SubmitError;

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub rules: ValidationRules,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            rules: ValidationRules::none(),
        }
    }

    pub fn rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }
}

/// Declared fields (in display order) and their dependencies
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    pub fields: Vec<FieldSpec>,
    pub dependencies: Vec<FieldDependency>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn dependency(mut self, dependency: FieldDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldState {
    pub visible: bool,
    pub disabled: bool,
}

impl Default for FieldState {
    fn default() -> Self {
        Self {
            visible: true,
            disabled: false,
        }
    }
}

/// Idle -> Validating -> (Invalid | Submitting -> (Submitted | SubmitFailed)).
/// Invalid, Submitted and SubmitFailed go back to Idle on the next edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Validating,
    Invalid,
    Submitting,
    Submitted,
    SubmitFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted,
    /// Validation failed; `first_invalid` is the field to focus
    Invalid { first_invalid: Option<String> },
    Failed(SubmitError),
    /// Another submission is in flight
    Ignored,
    /// The form was reset or re-initialized while the handler ran
    Stale,
}

/// Handed out by [`FormController::begin_submit`]; carries the values to send
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    pub id: u64,
    pub values: Values,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub errors: BTreeMap<String, Vec<String>>,
    /// First failing field in declaration order
    pub first_invalid: Option<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// State of one editable record
#[derive(Debug, Clone)]
pub struct FormController {
    schema: FormSchema,
    initial: Values,
    values: Values,
    errors: BTreeMap<String, Vec<String>>,
    touched: BTreeSet<String>,
    dirty: bool,
    field_states: HashMap<String, FieldState>,
    history: Option<History>,
    status: SubmitStatus,
    /// Bumped by every submission start, reset and initialize
    submission: u64,
}

impl FormController {
    /// `history_depth` of `None` disables undo/redo.
    pub fn new(schema: FormSchema, history_depth: Option<usize>) -> Self {
        let mut form = Self {
            schema,
            initial: Values::new(),
            values: Values::new(),
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
            dirty: false,
            field_states: HashMap::new(),
            history: history_depth.map(History::with_capacity),
            status: SubmitStatus::Idle,
            submission: 0,
        };
        form.initialize(Values::new());
        form
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    pub fn field_errors(&self, name: &str) -> &[String] {
        self.errors.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn field_state(&self, name: &str) -> FieldState {
        self.field_states.get(name).copied().unwrap_or_default()
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.field_state(name).visible
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.field_state(name).disabled
    }

    pub fn status(&self) -> SubmitStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SubmitStatus::Submitting
    }

    pub fn can_undo(&self) -> bool {
        self.history.as_ref().map(History::can_undo).unwrap_or(false)
    }

    pub fn can_redo(&self) -> bool {
        self.history.as_ref().map(History::can_redo).unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Installs `values` as the new initial snapshot and history root.
    /// Every dependency is evaluated once against them.
    pub fn initialize(&mut self, values: Values) {
        self.values = values;
        self.field_states.clear();
        let outcomes: Vec<EffectOutcome> = self
            .schema
            .dependencies
            .iter()
            .flat_map(|d| {
                let trigger = self.values.get(&d.trigger).cloned().unwrap_or(Value::Null);
                evaluate(d, &trigger, &self.values)
            })
            .collect();
        self.apply(outcomes, true);

        self.initial = self.values.clone();
        self.errors.clear();
        self.touched.clear();
        self.dirty = false;
        self.status = SubmitStatus::Idle;
        self.submission += 1;
        if let Some(history) = self.history.as_mut() {
            history.reset(self.values.clone());
        }
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let mut patch = Values::new();
        patch.insert(name.into(), value.into());
        self.set_fields(patch);
    }

    /// Applies `patch`, then the dependencies triggered by each patched
    /// field. Forced values do not trigger further dependencies.
    pub fn set_fields(&mut self, patch: Values) {
        if patch.is_empty() {
            return;
        }
        let changed: Vec<String> = patch.keys().cloned().collect();
        for (name, value) in patch {
            self.errors.remove(&name);
            self.touched.insert(name.clone());
            self.values.insert(name, value);
        }

        let mut outcomes = Vec::new();
        for name in &changed {
            let new_value = self.values.get(name).cloned().unwrap_or(Value::Null);
            outcomes.extend(evaluate_trigger(
                &self.schema.dependencies,
                name,
                &new_value,
                &self.values,
            ));
        }
        self.apply(outcomes, true);

        self.dirty = self.values != self.initial;
        if matches!(
            self.status,
            SubmitStatus::Invalid | SubmitStatus::Submitted | SubmitStatus::SubmitFailed
        ) {
            self.status = SubmitStatus::Idle;
        }
        if let Some(history) = self.history.as_mut() {
            history.push(self.values.clone());
        }
    }

    fn apply(&mut self, outcomes: Vec<EffectOutcome>, with_values: bool) {
        for outcome in outcomes {
            match outcome.change {
                FieldChange::Visible(visible) => {
                    self.field_states.entry(outcome.field).or_default().visible = visible;
                }
                FieldChange::Disabled(disabled) => {
                    self.field_states.entry(outcome.field).or_default().disabled = disabled;
                }
                FieldChange::Value(value) => {
                    if with_values {
                        self.values.insert(outcome.field, value);
                    }
                }
            }
        }
    }

    /// Recomputes visibility and disablement from the current values.
    fn rederive_field_states(&mut self) {
        self.field_states.clear();
        let outcomes: Vec<EffectOutcome> = self
            .schema
            .dependencies
            .iter()
            .flat_map(|d| {
                let trigger = self.values.get(&d.trigger).cloned().unwrap_or(Value::Null);
                evaluate(d, &trigger, &self.values)
            })
            .collect();
        self.apply(outcomes, false);
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.as_mut().and_then(|h| h.undo().cloned()) else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.as_mut().and_then(|h| h.redo().cloned()) else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: Values) {
        self.values = snapshot;
        self.dirty = self.values != self.initial;
        self.rederive_field_states();
    }

    /// Back to the initial snapshot; errors, touched and history cleared.
    pub fn reset(&mut self) {
        let initial = self.initial.clone();
        self.initialize(initial);
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Validates `fields` (all declared fields when `None`). Hidden fields
    /// are skipped. Error entries of the checked fields are replaced.
    pub fn validate(&mut self, fields: Option<&[&str]>) -> ValidationResult {
        let result = self.check(fields);
        for spec in self.selected_specs(fields) {
            self.errors.remove(&spec.name);
        }
        for (name, messages) in &result.errors {
            self.errors.insert(name.clone(), messages.clone());
        }
        result
    }

    /// Same as [`validate`](Self::validate) without recording the errors.
    pub fn check(&self, fields: Option<&[&str]>) -> ValidationResult {
        let mut result = ValidationResult::default();
        for spec in self.selected_specs(fields) {
            if !self.is_visible(&spec.name) {
                continue;
            }
            let messages = spec
                .rules
                .validate(self.values.get(&spec.name), &self.values, &spec.label);
            if !messages.is_empty() {
                if result.first_invalid.is_none() {
                    result.first_invalid = Some(spec.name.clone());
                }
                result.errors.insert(spec.name.clone(), messages);
            }
        }
        result
    }

    fn selected_specs(&self, fields: Option<&[&str]>) -> Vec<FieldSpec> {
        self.schema
            .fields
            .iter()
            .filter(|spec| fields.map(|f| f.contains(&spec.name.as_str())).unwrap_or(true))
            .cloned()
            .collect()
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Validates everything and, when valid, moves to Submitting and hands
    /// out a ticket. A second call while Submitting is ignored.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SubmitOutcome> {
        if self.status == SubmitStatus::Submitting {
            log::debug!("submit ignored: another submission is in flight");
            return Err(SubmitOutcome::Ignored);
        }

        self.status = SubmitStatus::Validating;
        let result = self.validate(None);
        if !result.is_valid() {
            for spec in &self.schema.fields {
                self.touched.insert(spec.name.clone());
            }
            self.status = SubmitStatus::Invalid;
            return Err(SubmitOutcome::Invalid {
                first_invalid: result.first_invalid,
            });
        }

        self.submission += 1;
        self.status = SubmitStatus::Submitting;
        Ok(SubmitTicket {
            id: self.submission,
            values: self.values.clone(),
        })
    }

    /// Records the handler's result. Results for an outdated ticket are
    /// dropped without touching the form.
    pub fn complete_submit(&mut self, ticket: &SubmitTicket, result: Result<(), String>) -> SubmitOutcome {
        if self.status != SubmitStatus::Submitting || ticket.id != self.submission {
            log::debug!("stale submit result for ticket {} dropped", ticket.id);
            return SubmitOutcome::Stale;
        }
        match result {
            Ok(()) => {
                self.status = SubmitStatus::Submitted;
                self.initial = ticket.values.clone();
                self.dirty = self.values != self.initial;
                SubmitOutcome::Submitted
            }
            Err(message) => {
                log::warn!("submit failed: {}", message);
                self.status = SubmitStatus::SubmitFailed;
                SubmitOutcome::Failed(SubmitError::Handler(message))
            }
        }
    }

    /// Synchronous submission through `handler`.
    pub fn submit<F, E>(&mut self, handler: F) -> SubmitOutcome
    where
        F: FnOnce(&Values) -> Result<(), E>,
        E: std::fmt::Display,
    {
        let ticket = match self.begin_submit() {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };
        let result = handler(&ticket.values).map_err(|e| e.to_string());
        self.complete_submit(&ticket, result)
    }
}
