use std::collections::HashMap;

use contracts::domain::a001_procurement_contract::mock::mock_records;
use contracts::domain::a001_procurement_contract::schema::{columns, new_table};
use contracts::shared::columns::{ColumnDef, ColumnKind};
use contracts::shared::config::Config;
use contracts::shared::export::ExportOptions;
use contracts::shared::form::{FieldSpec, FormController, FormSchema, SubmitOutcome, ValidationRules};
use contracts::shared::grid::pagination::{paginate, total_pages};
use contracts::shared::grid::sort::sort_records;
use contracts::shared::grid::{FieldResolver, TableConfig, TableController};
use contracts::shared::query::{FilterSpec, SortKey, SortSpec};
use contracts::shared::record::{Record, RecordKey};
use proptest::prelude::*;
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    value.as_object().unwrap().clone()
}

fn decode(bytes: &[u8]) -> Vec<Vec<String>> {
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text).to_string();
    text.lines()
        .map(|line| line.split(';').map(str::to_string).collect())
        .collect()
}

#[test]
fn test_search_beijing_suppliers() {
    let mut table = new_table(&Config::default(), mock_records());
    table.set_search("北京");
    let view = table.view();
    let suppliers: Vec<&str> = view
        .records
        .iter()
        .filter_map(|r| r.get("supplier").and_then(Value::as_str))
        .collect();
    assert_eq!(suppliers.len(), 2);
    assert!(suppliers.iter().all(|s| s.contains("北京")));

    let expected = mock_records()
        .iter()
        .filter(|r| r["supplier"].as_str().unwrap().contains("北京"))
        .count();
    assert_eq!(view.total_count, expected);
}

#[test]
fn test_completed_status_filter() {
    let mut table = new_table(&Config::default(), mock_records());
    table.set_filters(FilterSpec::new().with("status", "completed"));
    let view = table.view();
    assert_eq!(view.total_count, 2);
    for r in &view.records {
        assert_eq!(r["warehouseQuantity"], r["purchaseQuantity"]);
    }
}

#[test]
fn test_two_quick_adds_get_distinct_keys() {
    let mut table = new_table(&Config::default(), mock_records());
    let first = table.add(record(json!({"contractNo": "HT-2024-006", "supplier": "甲"})));
    let second = table.add(record(json!({"contractNo": "HT-2024-007", "supplier": "乙"})));
    assert_ne!(first, second);
    assert!(table.get(&first).is_some());
    assert!(table.get(&second).is_some());
    assert_eq!(table.records().len(), 7);
}

#[test]
fn test_export_formats_dates_and_nulls_in_row_order() {
    let records = vec![
        record(json!({"key": 3, "name": "丙", "signed": "2024-03-05 14:20:00", "note": null})),
        record(json!({"key": 1, "name": "甲", "signed": "2024-01-02", "note": "加急"})),
        record(json!({"key": 2, "name": "乙", "signed": null, "note": null})),
    ];
    let table = TableController::new(TableConfig::default()).with_records(records);
    let columns = vec![
        ColumnDef::new("name", "名称"),
        ColumnDef::new("signed", "签订日期").kind(ColumnKind::Date),
        ColumnDef::new("note", "备注"),
    ];
    let file = table
        .export_all(&columns, &ExportOptions::default(), "contracts")
        .unwrap();
    assert!(file.file_name.starts_with("contracts_"));
    assert!(file.file_name.ends_with(".csv"));

    let rows = decode(&file.bytes);
    assert_eq!(rows[0], vec!["名称", "签订日期", "备注"]);
    assert_eq!(rows[1], vec!["丙", "2024-03-05", ""]);
    assert_eq!(rows[2], vec!["甲", "2024-01-02", "加急"]);
    assert_eq!(rows[3], vec!["乙", "", ""]);
}

#[test]
fn test_export_selected_contracts_with_status_labels() {
    let mut table = new_table(&Config::default(), mock_records());
    table.select(&[RecordKey::Number(1), RecordKey::Number(3)]);
    let file = table
        .export_selected(&columns(), &Config::default().export_options(), "采购合同")
        .unwrap();
    let rows = decode(&file.bytes);
    assert_eq!(rows.len(), 3);
    // newest first: HT-2024-003 was signed after HT-2024-001
    assert_eq!(rows[1][0], "HT-2024-003");
    assert_eq!(rows[1].last().map(String::as_str), Some("待到货"));
    assert_eq!(rows[2].last().map(String::as_str), Some("已完成"));
}

#[test]
fn test_undo_redo_after_single_edit() {
    let schema = FormSchema::new().field(FieldSpec::new("supplier", "供应商"));
    let mut form = FormController::new(schema, Some(50));
    form.initialize(mock_records().remove(0));
    let before = form.values().clone();
    form.set_field("supplier", "北京新钢");
    let after = form.values().clone();

    assert!(form.undo());
    assert_eq!(
        serde_json::to_vec(form.values()).unwrap(),
        serde_json::to_vec(&before).unwrap()
    );
    assert!(form.redo());
    assert_eq!(form.values(), &after);
}

#[test]
fn test_invalid_submit_never_calls_handler() {
    let schema = FormSchema::new()
        .field(FieldSpec::new("supplier", "供应商").rules(ValidationRules::required()));
    let mut form = FormController::new(schema, None);
    let mut calls = 0;
    let outcome = form.submit(|_| {
        calls += 1;
        Ok::<(), String>(())
    });
    assert_eq!(calls, 0);
    assert!(matches!(outcome, SubmitOutcome::Invalid { .. }));
}

// ----------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------

fn rows_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(
        (prop::option::of(0i64..20), prop::sample::select(vec!["a", "b", "c"])),
        0..30,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (qty, group))| {
                let mut r = record(json!({"key": i as i64, "group": group}));
                if let Some(qty) = qty {
                    r.insert("qty".into(), json!(qty));
                }
                r
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_pages_concatenate_to_full_sequence(items in prop::collection::vec(any::<u16>(), 0..60), size in 1usize..12) {
        let mut joined = Vec::new();
        for index in 0..total_pages(items.len(), size) {
            joined.extend_from_slice(paginate(&items, index, size));
        }
        prop_assert_eq!(joined, items.clone());
        prop_assert!(paginate(&items, total_pages(items.len(), size), size).is_empty());
    }

    #[test]
    fn prop_sort_is_idempotent(rows in rows_strategy(), descending in any::<bool>()) {
        let key = if descending { SortKey::desc("qty") } else { SortKey::asc("qty") };
        let spec = SortSpec::by(key).then(SortKey::asc("group"));
        let resolver = FieldResolver::new();
        let comparators = HashMap::new();

        let mut once: Vec<&Record> = rows.iter().collect();
        sort_records(&mut once, &spec, &resolver, &comparators);
        let mut twice = once.clone();
        sort_records(&mut twice, &spec, &resolver, &comparators);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_filter_then_reset_restores_view(rows in rows_strategy(), group in prop::sample::select(vec!["a", "b", "c", "全部"])) {
        let mut table = TableController::new(TableConfig::default())
            .with_sort(SortSpec::by(SortKey::asc("qty")))
            .with_records(rows);
        let before = table.visible_keys();
        table.set_filter("group", group);
        table.clear_filters();
        prop_assert_eq!(table.visible_keys(), before);
    }

    #[test]
    fn prop_remove_prunes_selection(rows in rows_strategy(), picks in prop::collection::vec(any::<bool>(), 30), target in 0usize..30) {
        let mut table = TableController::new(TableConfig::default()).with_records(rows);
        let keys = table.visible_keys();
        let chosen: Vec<RecordKey> = keys
            .iter()
            .zip(picks.iter())
            .filter(|(_, pick)| **pick)
            .map(|(k, _)| k.clone())
            .collect();
        table.select(&chosen);

        let key = keys.get(target).cloned().unwrap_or(RecordKey::Number(999));
        let _ = table.remove(&key);
        prop_assert!(!table.is_selected(&key));
        prop_assert!(table.selection().keys().iter().all(|k| table.get(k).is_some()));
    }
}
