use crate::domain::a001_procurement_contract::ui::list::ProcurementContractList;
use contracts::shared::config::Config;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    let config = Config::load().unwrap_or_else(|e| {
        log::error!("invalid embedded configuration, using defaults: {}", e);
        Config::default()
    });
    provide_context(config);

    view! {
        <ProcurementContractList />
    }
}
