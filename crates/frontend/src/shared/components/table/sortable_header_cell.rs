//! Sortable table header cell
//!
//! ```ignore
//! <SortableHeaderCell
//!     label="采购数量"
//!     sort_field="purchaseQuantity"
//!     sort=Signal::derive(move || state.with(|s| s.table.sort().clone()))
//!     on_sort=Callback::new(move |field: String| toggle_sort(field))
//! />
//! ```

use crate::shared::list_utils::{get_sort_class, get_sort_indicator};
use contracts::shared::query::SortSpec;
use leptos::prelude::*;
use thaw::*;

#[component]
pub fn SortableHeaderCell(
    #[prop(into)]
    label: String,

    /// Field the header sorts by
    #[prop(into)]
    sort_field: String,

    /// Current sort of the table
    #[prop(into)]
    sort: Signal<SortSpec>,

    on_sort: Callback<String>,

    #[prop(optional, default = 100.0)]
    min_width: f64,

    /// `false` renders a plain header without click handling
    #[prop(optional, default = true)]
    sortable: bool,
) -> impl IntoView {
    if !sortable {
        return view! {
            <TableHeaderCell resizable=false min_width=min_width>
                {label}
            </TableHeaderCell>
        }
        .into_any();
    }

    let sort_field_for_click = sort_field.clone();
    let sort_field_for_indicator = sort_field.clone();
    let sort_field_for_class = sort_field;

    view! {
        <TableHeaderCell resizable=false min_width=min_width>
            <div
                class="table__sortable-header"
                style="cursor: pointer;"
                on:click=move |_| on_sort.run(sort_field_for_click.clone())
            >
                {label}
                <span class=move || sort.with(|s| get_sort_class(s, &sort_field_for_class))>
                    {move || sort.with(|s| get_sort_indicator(s, &sort_field_for_indicator))}
                </span>
            </div>
        </TableHeaderCell>
    }
    .into_any()
}
