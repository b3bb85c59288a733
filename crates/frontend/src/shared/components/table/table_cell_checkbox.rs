//! Row selection checkbox cell
//!
//! ```ignore
//! <TableCellCheckbox
//!     checked=Signal::derive(move || state.with(|s| s.table.is_selected(&key)))
//!     on_change=Callback::new(move |checked| toggle_select(key.clone(), checked))
//! />
//! ```

use leptos::prelude::*;
use thaw::*;

/// Checkbox cell; its click never reaches the row
#[component]
pub fn TableCellCheckbox(
    #[prop(into)]
    checked: Signal<bool>,

    on_change: Callback<bool>,
) -> impl IntoView {
    view! {
        <TableCell class="fixed-checkbox-column" on:click=|e| e.stop_propagation()>
            <input
                type="checkbox"
                class="table__checkbox"
                prop:checked=move || checked.get()
                on:change=move |ev| {
                    let checked = event_target_checked(&ev);
                    on_change.run(checked);
                }
            />
        </TableCell>
    }
}
