use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::record::{value_number, Record, RecordKey};

/// Delivery mode that needs no delivery address
pub const SELF_PICKUP: &str = "自提";

/// Procurement contract row (a001)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<RecordKey>,

    /// Contract number, e.g. "HT-2024-001"
    pub contract_no: String,

    pub supplier: String,

    pub purchase_quantity: i64,

    #[serde(default)]
    pub arrival_quantity: i64,

    #[serde(default)]
    pub warehouse_quantity: i64,

    /// Sign date (YYYY-MM-DD)
    pub sign_date: String,

    #[serde(default)]
    pub materials: Vec<String>,

    #[serde(default)]
    pub quality_requirement: Option<String>,

    #[serde(default)]
    pub delivery_mode: String,

    #[serde(default)]
    pub delivery_address: Option<String>,

    #[serde(default)]
    pub contact_phone: Option<String>,

    #[serde(default)]
    pub contact_email: Option<String>,
}

impl ProcurementContract {
    pub fn to_record(&self) -> serde_json::Result<Record> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Record::new()),
        }
    }

    pub fn from_record(record: &Record) -> serde_json::Result<Self> {
        serde_json::from_value(Value::Object(record.clone()))
    }

    pub fn status(&self) -> ContractStatus {
        ContractStatus::from_quantities(
            self.purchase_quantity as f64,
            self.arrival_quantity as f64,
            self.warehouse_quantity as f64,
        )
    }
}

/// Contract fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Pending,
    Partial,
    Completed,
}

/// Display data for one status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo {
    pub code: &'static str,
    pub label: &'static str,
    /// Tag colour name used by the list page
    pub color: &'static str,
}

/// Indexed by the enum discriminant
static STATUS_TABLE: [(ContractStatus, StatusInfo); 3] = [
    (
        ContractStatus::Pending,
        StatusInfo {
            code: "pending",
            label: "待到货",
            color: "warning",
        },
    ),
    (
        ContractStatus::Partial,
        StatusInfo {
            code: "partial",
            label: "部分到货",
            color: "informative",
        },
    ),
    (
        ContractStatus::Completed,
        StatusInfo {
            code: "completed",
            label: "已完成",
            color: "success",
        },
    ),
];

impl ContractStatus {
    pub fn all() -> Vec<ContractStatus> {
        STATUS_TABLE.iter().map(|(status, _)| *status).collect()
    }

    pub fn info(&self) -> &'static StatusInfo {
        &STATUS_TABLE[*self as usize].1
    }

    pub fn code(&self) -> &'static str {
        self.info().code
    }

    pub fn label(&self) -> &'static str {
        self.info().label
    }

    pub fn from_code(code: &str) -> Option<Self> {
        STATUS_TABLE
            .iter()
            .find(|(_, info)| info.code == code)
            .map(|(status, _)| *status)
    }

    /// Completed once everything purchased is warehoused
    pub fn from_quantities(purchase: f64, arrival: f64, warehouse: f64) -> Self {
        if warehouse == purchase {
            ContractStatus::Completed
        } else if arrival > 0.0 || warehouse > 0.0 {
            ContractStatus::Partial
        } else {
            ContractStatus::Pending
        }
    }
}

/// Label lookup for the status column
pub fn status_label(code: &str) -> Option<&'static str> {
    ContractStatus::from_code(code).map(|s| s.label())
}

/// Derived `status` field of a contract record
pub fn derive_status(record: &Record) -> Value {
    let quantity = |field: &str| record.get(field).and_then(value_number);
    let Some(purchase) = quantity("purchaseQuantity") else {
        return Value::Null;
    };
    let arrival = quantity("arrivalQuantity").unwrap_or(0.0);
    let warehouse = quantity("warehouseQuantity").unwrap_or(0.0);
    Value::from(ContractStatus::from_quantities(purchase, arrival, warehouse).code())
}
