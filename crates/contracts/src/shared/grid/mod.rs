//! Client-side grid engine: raw collection -> search -> filters -> sort -> page.
//!
//! The primitives are pure functions over record slices; [`TableController`]
//! owns one page's collection and keeps the derived view current.

mod controller;
mod fields;
pub mod filter;
pub mod pagination;
pub mod search;
pub mod selection;
pub mod sort;

pub use controller::{TableConfig, TableController, TableView};
pub use fields::{DerivedField, FieldResolver};
pub use selection::{Selection, SelectionState};
pub use sort::FieldComparator;
