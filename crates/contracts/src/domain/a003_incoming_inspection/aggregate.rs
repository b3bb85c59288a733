use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::record::{Record, RecordKey};

/// Incoming inspection row (a003)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingInspection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<RecordKey>,

    pub inspection_no: String,

    /// Contract the delivery belongs to (a001)
    pub contract_no: String,

    pub material: String,

    pub inspector: String,

    /// Inspection time (YYYY-MM-DD HH:MM:SS)
    pub inspected_at: String,

    pub sample_size: i64,

    /// Sampling instructions; filtered by presence
    #[serde(default)]
    pub sample_requirement: Option<String>,

    pub result: InspectionResult,

    #[serde(default)]
    pub reject_reason: Option<String>,
}

impl IncomingInspection {
    pub fn to_record(&self) -> serde_json::Result<Record> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Record::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectionResult {
    Pending,
    Passed,
    Rejected,
    Concession,
}

/// (code, label, tag colour), indexed by the enum discriminant
static RESULT_TABLE: [(InspectionResult, &str, &str, &str); 4] = [
    (InspectionResult::Pending, "pending", "待检", "warning"),
    (InspectionResult::Passed, "passed", "合格", "success"),
    (InspectionResult::Rejected, "rejected", "不合格", "danger"),
    (InspectionResult::Concession, "concession", "让步接收", "informative"),
];

impl InspectionResult {
    pub fn all() -> Vec<InspectionResult> {
        RESULT_TABLE.iter().map(|row| row.0).collect()
    }

    pub fn code(&self) -> &'static str {
        RESULT_TABLE[*self as usize].1
    }

    pub fn label(&self) -> &'static str {
        RESULT_TABLE[*self as usize].2
    }

    pub fn color(&self) -> &'static str {
        RESULT_TABLE[*self as usize].3
    }

    pub fn from_code(code: &str) -> Option<Self> {
        RESULT_TABLE.iter().find(|row| row.1 == code).map(|row| row.0)
    }
}

pub fn result_label(code: &str) -> Option<&'static str> {
    InspectionResult::from_code(code).map(|r| r.label())
}
