use serde_json::Value;
use std::collections::{HashMap, HashSet};

use super::fields::{DerivedField, FieldResolver};
use super::filter::matches_filters;
use super::pagination::{paginate, total_pages};
use super::search::matches_keyword;
use super::selection::{Selection, SelectionState};
use super::sort::{compare_records, FieldComparator};
use crate::shared::columns::ColumnDef;
use crate::shared::error::{ExportError, TableError};
use crate::shared::export::{export_records, ExportFile, ExportOptions};
use crate::shared::query::{FilterSpec, PageRequest, SearchState, SortKey, SortSpec};
use crate::shared::record::{record_key, Record, RecordKey};

#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Field holding each record's key
    pub key_field: String,
    /// Fields the keyword search looks at
    pub search_fields: Vec<String>,
    pub page_size: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            key_field: "key".to_string(),
            search_fields: Vec::new(),
            page_size: 20,
        }
    }
}

/// Derived, displayable state of a table
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<'a> {
    /// Searched, filtered and sorted records (all pages)
    pub records: Vec<&'a Record>,
    pub total_count: usize,
    pub current_page_records: Vec<&'a Record>,
    pub page: PageRequest,
    pub total_pages: usize,
}

/// Single source of truth for one page's records and their derived view.
///
/// Every input change re-runs search -> filters -> sort over the raw
/// collection and prunes the selection to what is still visible. The
/// page slice is cut on read.
#[derive(Debug, Clone)]
pub struct TableController {
    config: TableConfig,
    records: Vec<Record>,
    search: SearchState,
    filters: FilterSpec,
    sort: SortSpec,
    page: PageRequest,
    resolver: FieldResolver,
    comparators: HashMap<String, FieldComparator>,
    selection: Selection,
    /// Indices into `records` after search, filters and sort
    visible: Vec<usize>,
}

impl TableController {
    pub fn new(config: TableConfig) -> Self {
        let search = SearchState::new(config.search_fields.clone());
        let page = PageRequest::first(config.page_size);
        Self {
            config,
            records: Vec::new(),
            search,
            filters: FilterSpec::new(),
            sort: SortSpec::none(),
            page,
            resolver: FieldResolver::new(),
            comparators: HashMap::new(),
            selection: Selection::new(),
            visible: Vec::new(),
        }
    }

    pub fn with_derived(mut self, field: impl Into<String>, compute: DerivedField) -> Self {
        self.resolver.register(field, compute);
        self.rederive();
        self
    }

    pub fn with_comparator(mut self, field: impl Into<String>, compare: FieldComparator) -> Self {
        self.comparators.insert(field.into(), compare);
        self.rederive();
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self.rederive();
        self
    }

    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.replace_all(records);
        self
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn key_field(&self) -> &str {
        &self.config.key_field
    }

    /// Raw collection in insertion order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn key_of(&self, record: &Record) -> Option<RecordKey> {
        record_key(record, &self.config.key_field)
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Record> {
        self.position(key).map(|i| &self.records[i])
    }

    fn position(&self, key: &RecordKey) -> Option<usize> {
        self.records
            .iter()
            .position(|record| self.key_of(record).as_ref() == Some(key))
    }

    fn is_taken(&self, key: &RecordKey) -> bool {
        self.position(key).is_some()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Installs a new collection. Missing keys are generated; a repeated
    /// key is replaced on every occurrence after the first.
    pub fn replace_all(&mut self, records: Vec<Record>) {
        let key_field = self.config.key_field.clone();
        let mut seen: HashSet<RecordKey> = HashSet::with_capacity(records.len());
        let mut installed = Vec::with_capacity(records.len());

        for mut record in records {
            let key = match record_key(&record, &key_field) {
                Some(key) if !seen.contains(&key) => key,
                existing => {
                    if let Some(duplicate) = existing {
                        log::warn!("duplicate record key {} re-keyed", duplicate);
                    }
                    let key = RecordKey::generate_unique(|k| seen.contains(k));
                    record.insert(key_field.clone(), key.to_value());
                    key
                }
            };
            seen.insert(key);
            installed.push(record);
        }

        log::debug!("table collection replaced: {} records", installed.len());
        self.records = installed;
        self.rederive();
    }

    /// Calls `fetch` and installs its records. On failure the current
    /// collection is kept.
    pub fn load_from<F, E>(&mut self, fetch: F) -> Result<usize, TableError>
    where
        F: FnOnce() -> Result<Vec<Record>, E>,
        E: std::fmt::Display,
    {
        match fetch() {
            Ok(records) => {
                self.replace_all(records);
                Ok(self.records.len())
            }
            Err(e) => {
                log::warn!("table load failed: {}", e);
                Err(TableError::Load(e.to_string()))
            }
        }
    }

    /// Appends a record, generating its key when absent or already taken.
    pub fn add(&mut self, mut record: Record) -> RecordKey {
        let key = match self.key_of(&record) {
            Some(key) if !self.is_taken(&key) => key,
            _ => {
                let key = RecordKey::generate_unique(|k| self.is_taken(k));
                record.insert(self.config.key_field.clone(), key.to_value());
                log::debug!("generated record key {}", key);
                key
            }
        };
        self.records.push(record);
        self.rederive();
        key
    }

    /// Merges `patch` into the record with `key`. The key field itself is
    /// never patched.
    pub fn update(&mut self, key: &RecordKey, patch: Record) -> Result<(), TableError> {
        let Some(index) = self.position(key) else {
            log::warn!("update: record {} not found", key);
            return Err(TableError::NotFound(key.clone()));
        };
        let record = &mut self.records[index];
        for (field, value) in patch {
            if field == self.config.key_field {
                continue;
            }
            record.insert(field, value);
        }
        self.rederive();
        Ok(())
    }

    pub fn remove(&mut self, key: &RecordKey) -> Result<Record, TableError> {
        let Some(index) = self.position(key) else {
            log::warn!("remove: record {} not found", key);
            return Err(TableError::NotFound(key.clone()));
        };
        let removed = self.records.remove(index);
        self.selection.deselect(key);
        self.rederive();
        Ok(removed)
    }

    /// Removes every record whose key is listed; returns how many went.
    pub fn remove_many<'a>(&mut self, keys: impl IntoIterator<Item = &'a RecordKey>) -> usize {
        let doomed: HashSet<&RecordKey> = keys.into_iter().collect();
        let before = self.records.len();
        let key_field = &self.config.key_field;
        self.records.retain(|record| {
            record_key(record, key_field)
                .map(|key| !doomed.contains(&key))
                .unwrap_or(true)
        });
        for key in &doomed {
            self.selection.deselect(key);
        }
        let removed = before - self.records.len();
        if removed < doomed.len() {
            log::warn!("remove_many: {} keys not found", doomed.len() - removed);
        }
        self.rederive();
        removed
    }

    // ------------------------------------------------------------------
    // Pipeline inputs
    // ------------------------------------------------------------------

    pub fn set_search(&mut self, keyword: impl Into<String>) {
        self.search.keyword = keyword.into();
        self.page.index = 0;
        self.rederive();
    }

    pub fn set_search_fields(&mut self, fields: Vec<String>) {
        self.search.fields = fields;
        self.page.index = 0;
        self.rederive();
    }

    pub fn set_filters(&mut self, filters: FilterSpec) {
        self.filters = filters;
        self.page.index = 0;
        self.rederive();
    }

    pub fn set_filter(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.filters.set(field, value);
        self.page.index = 0;
        self.rederive();
    }

    pub fn clear_filters(&mut self) {
        self.set_filters(FilterSpec::new());
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.page.index = 0;
        self.rederive();
    }

    /// Same primary field flips its direction, another field becomes the
    /// only ascending key.
    pub fn toggle_sort(&mut self, field: &str) {
        let next = match self.sort.primary_direction(field) {
            Some(direction) => SortKey {
                field: field.to_string(),
                direction: direction.toggled(),
            },
            None => SortKey::asc(field),
        };
        self.set_sort(SortSpec::by(next));
    }

    pub fn set_page(&mut self, index: usize, size: usize) {
        self.page = PageRequest::new(index, size);
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    pub fn view(&self) -> TableView<'_> {
        let records: Vec<&Record> = self.visible.iter().map(|&i| &self.records[i]).collect();
        let current_page_records = paginate(&records, self.page.index, self.page.size).to_vec();
        TableView {
            total_count: records.len(),
            total_pages: total_pages(records.len(), self.page.size),
            page: self.page,
            current_page_records,
            records,
        }
    }

    /// Keys of the searched, filtered and sorted view, in view order.
    pub fn visible_keys(&self) -> Vec<RecordKey> {
        self.visible
            .iter()
            .filter_map(|&i| self.key_of(&self.records[i]))
            .collect()
    }

    fn rederive(&mut self) {
        let needle = self.search.needle();
        let mut visible: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| match &needle {
                Some(needle) => {
                    matches_keyword(record, &self.resolver, &self.search.fields, needle)
                }
                None => true,
            })
            .filter(|(_, record)| matches_filters(record, &self.resolver, &self.filters))
            .map(|(i, _)| i)
            .collect();

        if !self.sort.is_empty() {
            let records = &self.records;
            visible.sort_by(|&a, &b| {
                compare_records(
                    &records[a],
                    &records[b],
                    &self.sort,
                    &self.resolver,
                    &self.comparators,
                )
            });
        }
        self.visible = visible;

        let keys = self.visible_keys();
        self.selection.retain_visible(&keys.iter().collect());
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, key: &RecordKey) -> bool {
        self.selection.contains(key)
    }

    pub fn select<'a>(&mut self, keys: impl IntoIterator<Item = &'a RecordKey>) {
        let visible = self.visible_keys();
        self.selection.select(keys, &visible.iter().collect());
    }

    pub fn toggle_selection(&mut self, key: &RecordKey, checked: bool) {
        if checked {
            self.select([key]);
        } else {
            self.selection.deselect(key);
        }
    }

    /// Selects the whole filtered view, not just the current page.
    pub fn select_all(&mut self) {
        let visible = self.visible_keys();
        self.selection.select_all(&visible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn invert_selection(&mut self) {
        let visible = self.visible_keys();
        self.selection.invert(&visible);
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selection.state(self.visible.len())
    }

    /// Selected records in view order
    pub fn selected_records(&self) -> Vec<&Record> {
        self.visible
            .iter()
            .map(|&i| &self.records[i])
            .filter(|record| {
                self.key_of(record)
                    .map(|key| self.selection.contains(&key))
                    .unwrap_or(false)
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    pub fn export_all(
        &self,
        columns: &[ColumnDef],
        options: &ExportOptions,
        base_name: &str,
    ) -> Result<ExportFile, ExportError> {
        export_records(&self.records, columns, &self.resolver, options, base_name)
    }

    pub fn export_view(
        &self,
        columns: &[ColumnDef],
        options: &ExportOptions,
        base_name: &str,
    ) -> Result<ExportFile, ExportError> {
        export_records(self.view().records, columns, &self.resolver, options, base_name)
    }

    pub fn export_selected(
        &self,
        columns: &[ColumnDef],
        options: &ExportOptions,
        base_name: &str,
    ) -> Result<ExportFile, ExportError> {
        export_records(self.selected_records(), columns, &self.resolver, options, base_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::query::{SortDirection, ALL_SENTINEL};
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().unwrap().clone()
    }

    fn controller() -> TableController {
        let config = TableConfig {
            search_fields: vec!["name".into()],
            page_size: 2,
            ..TableConfig::default()
        };
        TableController::new(config).with_records(vec![
            record(json!({"key": 1, "name": "alpha", "group": "x", "qty": 3})),
            record(json!({"key": 2, "name": "beta", "group": "y", "qty": 1})),
            record(json!({"key": 3, "name": "gamma", "group": "x", "qty": 2})),
            record(json!({"key": 4, "name": "delta", "group": "y"})),
        ])
    }

    fn keys(records: &[&Record]) -> Vec<i64> {
        records.iter().map(|r| r["key"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_empty_collection_view() {
        let table = TableController::new(TableConfig::default());
        let view = table.view();
        assert_eq!(view.total_count, 0);
        assert!(view.records.is_empty());
        assert!(view.current_page_records.is_empty());
        assert_eq!(view.total_pages, 0);
    }

    #[test]
    fn test_pipeline_order_and_paging() {
        let mut table = controller();
        table.set_filter("group", "x");
        table.set_sort(SortSpec::by(SortKey::asc("qty")));
        let view = table.view();
        assert_eq!(keys(&view.records), vec![3, 1]);
        assert_eq!(view.total_count, 2);
        assert_eq!(view.total_pages, 1);

        table.clear_filters();
        table.set_page(1, 2);
        let view = table.view();
        assert_eq!(keys(&view.records), vec![4, 2, 3, 1]);
        assert_eq!(keys(&view.current_page_records), vec![3, 1]);
    }

    #[test]
    fn test_input_changes_reset_page() {
        let mut table = controller();
        table.set_page(1, 2);
        table.set_search("a");
        assert_eq!(table.page().index, 0);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let mut table = controller();
        table.set_page(9, 2);
        let view = table.view();
        assert!(view.current_page_records.is_empty());
        assert_eq!(view.total_count, 4);
    }

    #[test]
    fn test_update_merges_and_reports_missing() {
        let mut table = controller();
        table
            .update(&RecordKey::Number(2), record(json!({"qty": 9, "key": 77})))
            .unwrap();
        let updated = table.get(&RecordKey::Number(2)).unwrap();
        assert_eq!(updated["qty"], json!(9));
        assert_eq!(updated["name"], json!("beta"));
        assert!(table.get(&RecordKey::Number(77)).is_none());

        let err = table.update(&RecordKey::Number(42), Record::new()).unwrap_err();
        assert_eq!(err, TableError::NotFound(RecordKey::Number(42)));
    }

    #[test]
    fn test_remove_prunes_selection() {
        let mut table = controller();
        table.select_all();
        assert_eq!(table.selection().len(), 4);
        table.remove(&RecordKey::Number(3)).unwrap();
        assert!(!table.is_selected(&RecordKey::Number(3)));
        assert_eq!(table.selection().len(), 3);

        let removed = table.remove_many(&[RecordKey::Number(1), RecordKey::Number(99)]);
        assert_eq!(removed, 1);
        assert!(!table.is_selected(&RecordKey::Number(1)));
        assert!(table.remove(&RecordKey::Number(99)).is_err());
    }

    #[test]
    fn test_filtering_drops_hidden_selection() {
        let mut table = controller();
        table.select_all();
        table.set_filter("group", "y");
        assert_eq!(table.selection().len(), 2);
        table.set_filter("group", ALL_SENTINEL);
        assert_eq!(table.selection().len(), 2);
        assert_eq!(table.selection_state(), SelectionState::Some);
    }

    #[test]
    fn test_select_all_covers_filtered_view_not_page() {
        let mut table = controller();
        table.set_page(0, 1);
        table.select_all();
        assert_eq!(table.selection().len(), 4);
        table.invert_selection();
        assert!(table.selection().is_empty());
    }

    #[test]
    fn test_select_ignores_hidden_keys() {
        let mut table = controller();
        table.set_filter("group", "x");
        table.select(&[RecordKey::Number(1), RecordKey::Number(2)]);
        assert_eq!(table.selection().len(), 1);
        let selected = table.selected_records();
        assert_eq!(keys(&selected), vec![1]);
    }

    #[test]
    fn test_replace_all_generates_and_dedupes_keys() {
        let mut table = controller();
        table.select_all();
        table.replace_all(vec![
            record(json!({"key": 1, "name": "alpha"})),
            record(json!({"key": 1, "name": "alpha copy"})),
            record(json!({"name": "no key"})),
        ]);
        let keys: HashSet<RecordKey> = table.visible_keys().into_iter().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(table.selection().len(), 1);
        assert!(table.is_selected(&RecordKey::Number(1)));
    }

    #[test]
    fn test_add_generates_distinct_keys() {
        let mut table = controller();
        let a = table.add(record(json!({"name": "new"})));
        let b = table.add(record(json!({"name": "new"})));
        assert_ne!(a, b);
        assert_eq!(table.records().len(), 6);
        let taken = table.add(record(json!({"key": 1, "name": "clash"})));
        assert_ne!(taken, RecordKey::Number(1));
    }

    #[test]
    fn test_toggle_sort() {
        let mut table = controller();
        table.toggle_sort("qty");
        assert_eq!(table.sort().primary_direction("qty"), Some(SortDirection::Asc));
        table.toggle_sort("qty");
        assert_eq!(table.sort().primary_direction("qty"), Some(SortDirection::Desc));
        table.toggle_sort("name");
        assert_eq!(table.sort().primary_direction("name"), Some(SortDirection::Asc));
    }

    #[test]
    fn test_load_failure_keeps_collection() {
        let mut table = controller();
        let result = table.load_from(|| Err::<Vec<Record>, _>("timeout"));
        assert_eq!(result, Err(TableError::Load("timeout".into())));
        assert_eq!(table.records().len(), 4);

        let loaded = table.load_from(|| Ok::<_, String>(vec![record(json!({"key": 5}))]));
        assert_eq!(loaded, Ok(1));
    }

    #[test]
    fn test_derived_field_drives_pipeline() {
        let mut table = controller().with_derived("stocked", |r| {
            serde_json::Value::from(if r.get("qty").is_some() { "yes" } else { "no" })
        });
        table.set_filter("stocked", "no");
        assert_eq!(keys(&table.view().records), vec![4]);
    }
}
