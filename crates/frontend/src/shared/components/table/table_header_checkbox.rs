//! Header checkbox selecting every row of the filtered view

use contracts::shared::grid::SelectionState;
use leptos::prelude::*;
use thaw::*;
use wasm_bindgen::JsCast;

/// Shows checked / unchecked / indeterminate from the selection state.
/// `on_change(true)` asks to select all, `on_change(false)` to clear.
#[component]
pub fn TableHeaderCheckbox(
    #[prop(into)]
    state: Signal<SelectionState>,

    on_change: Callback<bool>,
) -> impl IntoView {
    let checkbox_ref = NodeRef::<leptos::html::Input>::new();

    Effect::new(move |_| {
        if let Some(input) = checkbox_ref.get() {
            let indeterminate = matches!(state.get(), SelectionState::Some);
            if let Some(input_el) = input.dyn_ref::<web_sys::HtmlInputElement>() {
                input_el.set_indeterminate(indeterminate);
            }
        }
    });

    view! {
        <TableHeaderCell resizable=false class="fixed-checkbox-column">
            <input
                node_ref=checkbox_ref
                type="checkbox"
                class="table__checkbox"
                prop:checked=move || matches!(state.get(), SelectionState::All)
                on:change=move |ev| on_change.run(event_target_checked(&ev))
            />
        </TableHeaderCell>
    }
}
