//! Spreadsheet export: records + column declarations -> one-sheet workbook
//! encoded as delimited UTF-8 text that spreadsheet programs open directly.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt::Write;

use crate::shared::columns::{ColumnDef, ColumnKind};
use crate::shared::error::ExportError;
use crate::shared::grid::FieldResolver;
use crate::shared::record::{parse_wall_clock, value_text, Record};

pub const CSV_MIME: &str = "text/csv;charset=utf-8;";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub delimiter: u8,
    pub date_format: String,
    pub datetime_format: String,
    pub list_delimiter: String,
    /// UTF-8 BOM so spreadsheet programs detect the encoding of CJK text
    pub utf8_bom: bool,
    pub sheet_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
            list_delimiter: ", ".to_string(),
            utf8_bom: true,
            sheet_name: "Sheet1".to_string(),
        }
    }
}

/// A single worksheet of display strings
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Encoded file ready for download
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Builds the sheet; rows keep the order of `records`.
pub fn build_sheet<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    columns: &[ColumnDef],
    resolver: &FieldResolver,
    options: &ExportOptions,
) -> Result<Sheet, ExportError> {
    let headers = columns.iter().map(|c| c.title.clone()).collect();
    let mut rows = Vec::new();

    for (row_index, record) in records.into_iter().enumerate() {
        let mut row = Vec::with_capacity(columns.len());
        for column in columns {
            let value = resolver.get(record, &column.field);
            let cell = format_cell(value.as_deref(), column.kind, options).map_err(|message| {
                ExportError::Coercion {
                    row: row_index + 1,
                    field: column.field.clone(),
                    message,
                }
            })?;
            row.push(cell);
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ExportError::Empty);
    }

    Ok(Sheet {
        name: options.sheet_name.clone(),
        headers,
        rows,
    })
}

/// Display form of one cell. Missing and null become an empty string.
pub fn format_cell(
    value: Option<&Value>,
    kind: ColumnKind,
    options: &ExportOptions,
) -> Result<String, String> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(String::new());
    };

    match kind {
        ColumnKind::Date | ColumnKind::DateTime => {
            let pattern = if matches!(kind, ColumnKind::Date) {
                &options.date_format
            } else {
                &options.datetime_format
            };
            let text = value_text(value);
            if text.trim().is_empty() {
                return Ok(String::new());
            }
            let instant =
                parse_wall_clock(&text).ok_or_else(|| format!("无法识别的日期: {}", text))?;
            let mut cell = String::new();
            write!(cell, "{}", instant.format(pattern))
                .map_err(|_| format!("无效的日期格式: {}", pattern))?;
            Ok(cell)
        }
        ColumnKind::Status(lookup) => {
            let code = value_text(value);
            Ok(lookup(&code).map(str::to_string).unwrap_or(code))
        }
        _ => Ok(match value {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(_) | Value::Array(_) => item.to_string(),
                    other => value_text(other),
                })
                .collect::<Vec<_>>()
                .join(options.list_delimiter.as_str()),
            Value::Object(_) => value.to_string(),
            other => value_text(other),
        }),
    }
}

/// Serializes the sheet as delimited text.
pub fn encode_sheet(sheet: &Sheet, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(Vec::new());

    writer
        .write_record(&sheet.headers)
        .map_err(|e| ExportError::Write(e.to_string()))?;
    for row in &sheet.rows {
        writer
            .write_record(row)
            .map_err(|e| ExportError::Write(e.to_string()))?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| ExportError::Write(e.to_string()))?;

    let mut bytes = Vec::with_capacity(body.len() + 3);
    if options.utf8_bom {
        bytes.extend_from_slice("\u{FEFF}".as_bytes());
    }
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// `<base>_<YYYYMMDD_HHMMSS>.csv`
pub fn export_file_name(base_name: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}.csv", base_name, at.format("%Y%m%d_%H%M%S"))
}

/// Builds and encodes in memory; nothing is produced unless every row
/// converts.
pub fn export_records<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    columns: &[ColumnDef],
    resolver: &FieldResolver,
    options: &ExportOptions,
    base_name: &str,
) -> Result<ExportFile, ExportError> {
    let result = build_sheet(records, columns, resolver, options)
        .and_then(|sheet| encode_sheet(&sheet, options));
    match result {
        Ok(bytes) => Ok(ExportFile {
            file_name: export_file_name(base_name, Utc::now()),
            mime_type: CSV_MIME,
            bytes,
        }),
        Err(e) => {
            log::warn!("export of {} failed: {}", base_name, e);
            Err(e)
        }
    }
}
