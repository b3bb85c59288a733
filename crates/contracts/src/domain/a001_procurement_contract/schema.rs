//! List columns, table setup and edit form of the procurement contract page.

use serde_json::{json, Value};

use super::aggregate::{derive_status, status_label, SELF_PICKUP};
use crate::shared::columns::{ColumnDef, ColumnKind};
use crate::shared::config::Config;
use crate::shared::form::dependency::FieldEffect;
use crate::shared::form::{
    FieldDependency, FieldFormat, FieldSpec, FormSchema, Predicate, ValidationRules, ValueSource,
    Values,
};
use crate::shared::grid::TableController;
use crate::shared::query::{SortKey, SortSpec};
use crate::shared::record::{value_number, Record};

pub const SEARCH_FIELDS: [&str; 3] = ["contractNo", "supplier", "materials"];

/// Storage key of the edit form's autosave snapshot
pub const AUTOSAVE_KEY: &str = "a001_procurement_contract.edit";

pub fn columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("contractNo", "合同编号").width(140),
        ColumnDef::new("supplier", "供应商").width(180),
        ColumnDef::new("materials", "物料")
            .kind(ColumnKind::List)
            .unsortable(),
        ColumnDef::new("purchaseQuantity", "采购数量").kind(ColumnKind::Number),
        ColumnDef::new("arrivalQuantity", "到货数量").kind(ColumnKind::Number),
        ColumnDef::new("warehouseQuantity", "入库数量").kind(ColumnKind::Number),
        ColumnDef::new("signDate", "签订日期").kind(ColumnKind::Date),
        ColumnDef::new("qualityRequirement", "质量要求"),
        ColumnDef::new("status", "状态").kind(ColumnKind::Status(status_label)),
    ]
}

/// Table controller with the derived status, newest contracts first.
pub fn new_table(config: &Config, records: Vec<Record>) -> TableController {
    TableController::new(config.table_config(&SEARCH_FIELDS))
        .with_derived("status", derive_status)
        .with_sort(SortSpec::by(SortKey::desc("signDate")))
        .with_records(records)
}

fn not_above(value: &Value, values: &Values, limit_field: &str) -> bool {
    let limit = values.get(limit_field).and_then(value_number);
    match (value_number(value), limit) {
        (Some(v), Some(limit)) => v <= limit,
        _ => true,
    }
}

pub fn form_schema() -> FormSchema {
    FormSchema::new()
        .field(
            FieldSpec::new("contractNo", "合同编号")
                .rules(ValidationRules::required().with_length(None, Some(32))),
        )
        .field(
            FieldSpec::new("supplier", "供应商")
                .rules(ValidationRules::required().with_length(Some(2), Some(64))),
        )
        .field(
            FieldSpec::new("purchaseQuantity", "采购数量")
                .rules(ValidationRules::required().with_range(Some(1.0), None)),
        )
        .field(
            FieldSpec::new("arrivalQuantity", "到货数量").rules(
                ValidationRules::none()
                    .with_range(Some(0.0), None)
                    .with_custom(
                        |v, all| not_above(v, all, "purchaseQuantity"),
                        "到货数量不能超过采购数量",
                    ),
            ),
        )
        .field(
            FieldSpec::new("warehouseQuantity", "入库数量").rules(
                ValidationRules::none()
                    .with_range(Some(0.0), None)
                    .with_custom(
                        |v, all| not_above(v, all, "arrivalQuantity"),
                        "入库数量不能超过到货数量",
                    ),
            ),
        )
        .field(
            FieldSpec::new("signDate", "签订日期")
                .rules(ValidationRules::required().with_format(FieldFormat::Date)),
        )
        .field(FieldSpec::new("qualityRequirement", "质量要求"))
        .field(FieldSpec::new("deliveryMode", "交货方式").rules(ValidationRules::required()))
        .field(FieldSpec::new("deliveryAddress", "交货地址").rules(ValidationRules::required()))
        .field(
            FieldSpec::new("contactPhone", "联系电话")
                .rules(ValidationRules::none().with_format(FieldFormat::Phone)),
        )
        .field(
            FieldSpec::new("contactEmail", "联系邮箱")
                .rules(ValidationRules::none().with_format(FieldFormat::Email)),
        )
        .dependency(FieldDependency::new(
            "deliveryMode",
            &["deliveryAddress"],
            FieldEffect::Visible(Predicate::NotEquals(json!(SELF_PICKUP))),
        ))
        .dependency(FieldDependency::new(
            "deliveryMode",
            &["deliveryAddress"],
            FieldEffect::SetValue {
                when: Predicate::Equals(json!(SELF_PICKUP)),
                value: ValueSource::Constant(json!("")),
            },
        ))
        .dependency(FieldDependency::new(
            "purchaseQuantity",
            &["arrivalQuantity", "warehouseQuantity"],
            FieldEffect::Disabled(Predicate::Falsy),
        ))
}

/// Values of a fresh contract form
pub fn empty_values() -> Values {
    let mut values = Values::new();
    values.insert("contractNo".into(), json!(""));
    values.insert("supplier".into(), json!(""));
    values.insert("purchaseQuantity".into(), Value::Null);
    values.insert("arrivalQuantity".into(), json!(0));
    values.insert("warehouseQuantity".into(), json!(0));
    values.insert("signDate".into(), json!(""));
    values.insert("qualityRequirement".into(), json!(""));
    values.insert("deliveryMode".into(), json!("送货"));
    values.insert("deliveryAddress".into(), json!(""));
    values.insert("contactPhone".into(), json!(""));
    values.insert("contactEmail".into(), json!(""));
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_procurement_contract::mock::mock_records;
    use crate::shared::form::FormController;

    #[test]
    fn test_new_table_sorts_newest_first() {
        let table = new_table(&Config::default(), mock_records());
        let view = table.view();
        assert_eq!(view.total_count, 5);
        let dates: Vec<&Value> = view.records.iter().map(|r| &r["signDate"]).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.as_str().cmp(&a.as_str()));
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_self_pickup_hides_address() {
        let mut form = FormController::new(form_schema(), Some(10));
        form.initialize(empty_values());
        assert!(form.is_disabled("arrivalQuantity"));
        form.set_field("purchaseQuantity", 100);
        assert!(!form.is_disabled("arrivalQuantity"));

        form.set_field("deliveryAddress", "二号仓库");
        form.set_field("deliveryMode", SELF_PICKUP);
        assert!(!form.is_visible("deliveryAddress"));
        assert_eq!(form.value("deliveryAddress"), Some(&json!("")));
    }

    #[test]
    fn test_cross_field_quantity_rules() {
        let mut form = FormController::new(form_schema(), None);
        let mut values = empty_values();
        values.insert("contractNo".into(), json!("HT-2024-010"));
        values.insert("supplier".into(), json!("北京钢铁集团"));
        values.insert("purchaseQuantity".into(), json!(50));
        values.insert("arrivalQuantity".into(), json!(60));
        values.insert("signDate".into(), json!("2024-06-01"));
        values.insert("deliveryAddress".into(), json!("一号仓库"));
        form.initialize(values);

        let result = form.validate(None);
        assert_eq!(result.first_invalid.as_deref(), Some("arrivalQuantity"));
        assert_eq!(form.field_errors("arrivalQuantity"), &["到货数量不能超过采购数量".to_string()]);

        form.set_field("arrivalQuantity", 50);
        assert!(form.validate(None).is_valid());
    }
}
