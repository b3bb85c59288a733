pub mod autosave;
pub mod columns;
pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod grid;
pub mod query;
pub mod record;
