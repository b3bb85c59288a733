use serde_json::json;

use super::aggregate::{result_label, IncomingInspection, InspectionResult};
use crate::shared::columns::{ColumnDef, ColumnKind};
use crate::shared::config::Config;
use crate::shared::form::dependency::FieldEffect;
use crate::shared::form::{FieldDependency, FieldSpec, FormSchema, Predicate, ValidationRules};
use crate::shared::grid::TableController;
use crate::shared::record::{Record, RecordKey};

pub const SEARCH_FIELDS: [&str; 4] = ["inspectionNo", "contractNo", "material", "inspector"];

pub fn columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("inspectionNo", "检验单号"),
        ColumnDef::new("contractNo", "合同编号"),
        ColumnDef::new("material", "物料"),
        ColumnDef::new("inspector", "检验员"),
        ColumnDef::new("inspectedAt", "检验时间").kind(ColumnKind::DateTime),
        ColumnDef::new("sampleSize", "抽样数").kind(ColumnKind::Number),
        ColumnDef::new("sampleRequirement", "抽样要求"),
        ColumnDef::new("result", "检验结果").kind(ColumnKind::Status(result_label)),
    ]
}

pub fn new_table(config: &Config, records: Vec<Record>) -> TableController {
    TableController::new(config.table_config(&SEARCH_FIELDS)).with_records(records)
}

pub fn form_schema() -> FormSchema {
    FormSchema::new()
        .field(FieldSpec::new("inspectionNo", "检验单号").rules(ValidationRules::required()))
        .field(FieldSpec::new("contractNo", "合同编号").rules(ValidationRules::required()))
        .field(FieldSpec::new("material", "物料").rules(ValidationRules::required()))
        .field(
            FieldSpec::new("sampleSize", "抽样数")
                .rules(ValidationRules::required().with_range(Some(1.0), Some(10000.0))),
        )
        .field(FieldSpec::new("result", "检验结果").rules(ValidationRules::required()))
        .field(
            FieldSpec::new("rejectReason", "不合格原因")
                .rules(ValidationRules::required().with_length(None, Some(200))),
        )
        .dependency(FieldDependency::new(
            "result",
            &["rejectReason"],
            FieldEffect::Visible(Predicate::OneOf(vec![
                json!(InspectionResult::Rejected.code()),
                json!(InspectionResult::Concession.code()),
            ])),
        ))
}

pub fn mock_inspections() -> Vec<IncomingInspection> {
    let row = |key: i64,
               no: &str,
               contract_no: &str,
               material: &str,
               requirement: Option<&str>,
               result: InspectionResult| IncomingInspection {
        key: Some(RecordKey::Number(key)),
        inspection_no: no.to_string(),
        contract_no: contract_no.to_string(),
        material: material.to_string(),
        inspector: "王工".to_string(),
        inspected_at: format!("2024-03-{:02} 09:30:00", key + 10),
        sample_size: 20,
        sample_requirement: requirement.map(str::to_string),
        result,
        reject_reason: None,
    };
    vec![
        row(1, "JY-001", "HT-2024-001", "螺纹钢", Some("每批抽 3 根"), InspectionResult::Passed),
        row(2, "JY-002", "HT-2024-002", "轴承", None, InspectionResult::Pending),
        row(3, "JY-003", "HT-2024-003", "工业酒精", Some("每桶取样"), InspectionResult::Rejected),
        row(4, "JY-004", "HT-2024-005", "纸箱", None, InspectionResult::Concession),
    ]
}

pub fn mock_records() -> Vec<Record> {
    mock_inspections()
        .iter()
        .filter_map(|i| i.to_record().ok())
        .collect()
}
