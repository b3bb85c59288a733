//! Form engine: one editable record with validation, dependencies,
//! dirty/touched tracking, bounded undo/redo and guarded submission.

mod controller;
pub mod dependency;
mod history;
pub mod validation;

pub use controller::{
    FieldSpec, FieldState, FormController, FormSchema, SubmitOutcome, SubmitStatus, SubmitTicket,
    ValidationResult,
};
pub use dependency::{FieldDependency, FieldEffect, Predicate, ValueSource};
pub use history::History;
pub use validation::{FieldFormat, ValidationRules};

/// Field name -> value of one form
pub type Values = serde_json::Map<String, serde_json::Value>;
