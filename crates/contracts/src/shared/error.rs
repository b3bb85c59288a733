use super::record::RecordKey;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("record not found: {0}")]
    NotFound(RecordKey),
    #[error("failed to load records: {0}")]
    Load(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("submit handler failed: {0}")]
    Handler(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("row {row}, field `{field}`: {message}")]
    Coercion {
        row: usize,
        field: String,
        message: String,
    },
    #[error("failed to write spreadsheet: {0}")]
    Write(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("failed to write `{key}`: {message}")]
    Write { key: String, message: String },
    #[error("failed to serialize snapshot: {0}")]
    Serialize(String),
}
