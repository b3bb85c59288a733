use contracts::domain::a001_procurement_contract::mock::mock_records;
use contracts::domain::a001_procurement_contract::schema::new_table;
use contracts::shared::config::Config;
use contracts::shared::grid::TableController;
use contracts::shared::record::RecordKey;
use leptos::prelude::*;

/// What the edit drawer is showing
#[derive(Clone, Debug, PartialEq)]
pub enum EditTarget {
    New,
    Existing(RecordKey),
}

#[derive(Clone, Debug)]
pub struct ContractListState {
    pub table: TableController,
    pub editing: Option<EditTarget>,
    /// Last non-fatal failure shown above the table
    pub notice: Option<String>,
}

impl ContractListState {
    pub fn new(config: &Config) -> Self {
        Self {
            table: new_table(config, mock_records()),
            editing: None,
            notice: None,
        }
    }
}

pub fn create_state(config: &Config) -> RwSignal<ContractListState> {
    RwSignal::new(ContractListState::new(config))
}
