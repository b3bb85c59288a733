pub mod state;

use self::state::{create_state, EditTarget};
use super::details::ContractDetails;
use crate::shared::components::pagination_controls::PaginationControls;
use crate::shared::components::table::{SortableHeaderCell, TableCellCheckbox, TableHeaderCheckbox};
use crate::shared::export::download_file;
use crate::shared::list_utils::{highlight_matches, SearchInput};
use contracts::domain::a001_procurement_contract::aggregate::ContractStatus;
use contracts::domain::a001_procurement_contract::schema::{columns, empty_values, AUTOSAVE_KEY};
use contracts::shared::columns::ColumnKind;
use contracts::shared::config::Config;
use contracts::shared::export::format_cell;
use contracts::shared::form::Values;
use contracts::shared::query::{ALL_SENTINEL, PRESENCE_HAS, PRESENCE_NONE};
use contracts::shared::record::{value_text, RecordKey};
use leptos::prelude::*;
use thaw::*;

const EXPORT_BASE_NAME: &str = "采购合同";

/// One rendered row of the current page
#[derive(Clone, Debug, PartialEq)]
struct RowView {
    key: RecordKey,
    cells: Vec<String>,
    status_color: Option<&'static str>,
}

#[component]
pub fn ProcurementContractList() -> impl IntoView {
    let config = use_context::<Config>().unwrap_or_default();
    let state = create_state(&config);
    let columns = StoredValue::new(columns());
    let export_options = StoredValue::new(config.export_options());
    let page_size_options = config.table.page_size_options.clone();

    let rows = Memo::new(move |_| {
        state.with(|s| {
            columns.with_value(|cols| {
                export_options.with_value(|options| {
                    s.table
                        .view()
                        .current_page_records
                        .into_iter()
                        .filter_map(|record| {
                            let key = s.table.key_of(record)?;
                            let cells = cols
                                .iter()
                                .map(|col| {
                                    let value = s.table.resolver().get(record, &col.field);
                                    format_cell(value.as_deref(), col.kind, options)
                                        .unwrap_or_else(|_| value.map(|v| value_text(&v)).unwrap_or_default())
                                })
                                .collect();
                            let status_color = s
                                .table
                                .resolver()
                                .get(record, "status")
                                .and_then(|v| v.as_str().and_then(ContractStatus::from_code))
                                .map(|status| status.info().color);
                            Some(RowView {
                                key,
                                cells,
                                status_color,
                            })
                        })
                        .collect::<Vec<_>>()
                })
            })
        })
    });

    let editing = Memo::new(move |_| state.with(|s| s.editing.clone()));
    let keyword = Signal::derive(move || state.with(|s| s.table.search().keyword.clone()));

    let toggle_sort = move |field: String| state.update(|s| s.table.toggle_sort(&field));

    let go_to_page = move |page: usize| {
        state.update(|s| {
            let size = s.table.page().size;
            s.table.set_page(page, size);
        })
    };

    let change_page_size = move |size: usize| state.update(|s| s.table.set_page(0, size));

    let set_filter = move |field: &'static str, value: String| {
        state.update(|s| s.table.set_filter(field, value));
    };

    let delete_selected = move || {
        state.update(|s| {
            let keys: Vec<RecordKey> = s.table.selection().keys().iter().cloned().collect();
            let removed = s.table.remove_many(&keys);
            log::info!("deleted {} contracts", removed);
        });
    };

    let export = move |selected_only: bool| {
        let result = state.with_untracked(|s| {
            columns.with_value(|cols| {
                export_options.with_value(|options| {
                    if selected_only {
                        s.table.export_selected(cols, options, EXPORT_BASE_NAME)
                    } else {
                        s.table.export_view(cols, options, EXPORT_BASE_NAME)
                    }
                })
            })
        });
        let result = result
            .map_err(|e| e.to_string())
            .and_then(|file| download_file(&file));
        state.update(|s| s.notice = result.err().map(|e| format!("导出失败: {}", e)));
    };

    let save = move |target: EditTarget, values: Values| -> Result<(), String> {
        state
            .try_update(|s| match target {
                EditTarget::New => {
                    let key = s.table.add(values);
                    log::info!("contract {} added", key);
                    Ok(())
                }
                EditTarget::Existing(key) => s.table.update(&key, values).map_err(|e| e.to_string()),
            })
            .unwrap_or_else(|| Err("列表已关闭".to_string()))
    };

    let has_selection = Signal::derive(move || state.with(|s| !s.table.selection().is_empty()));

    view! {
        <div class="page" id="a001_procurement_contract--list">
            <div class="page__header">
                <div class="page__header-left">
                    <h1 class="page__title">"采购合同"</h1>
                    <span class="page__badge">
                        {move || state.with(|s| s.table.records().len()).to_string()}
                    </span>
                </div>
                <div class="page__header-right">
                    <Flex gap=FlexGap::Small>
                        <Button
                            appearance=ButtonAppearance::Primary
                            on_click=move |_| state.update(|s| s.editing = Some(EditTarget::New))
                        >
                            "新增"
                        </Button>
                        <Button
                            on_click=move |_| delete_selected()
                            disabled=Signal::derive(move || !has_selection.get())
                        >
                            "删除所选"
                        </Button>
                        <Button
                            on_click=move |_| export(true)
                            disabled=Signal::derive(move || !has_selection.get())
                        >
                            "导出所选"
                        </Button>
                        <Button on_click=move |_| export(false)>"导出当前视图"</Button>
                    </Flex>
                </div>
            </div>

            <div class="page__content">
                <div class="filter-panel">
                    <Flex gap=FlexGap::Small align=FlexAlign::End>
                        <Flex vertical=true gap=FlexGap::Small>
                            <Label>"搜索:"</Label>
                            <SearchInput
                                value=keyword
                                on_change=Callback::new(move |v: String| state.update(|s| s.table.set_search(v)))
                                placeholder="合同编号、供应商、物料"
                            />
                        </Flex>
                        <Flex vertical=true gap=FlexGap::Small>
                            <Label>"状态:"</Label>
                            <select
                                class="filter-panel__select"
                                on:change=move |ev| set_filter("status", event_target_value(&ev))
                            >
                                <option value=ALL_SENTINEL>{ALL_SENTINEL}</option>
                                {ContractStatus::all()
                                    .into_iter()
                                    .map(|status| view! { <option value=status.code()>{status.label()}</option> })
                                    .collect_view()}
                            </select>
                        </Flex>
                        <Flex vertical=true gap=FlexGap::Small>
                            <Label>"质量要求:"</Label>
                            <select
                                class="filter-panel__select"
                                on:change=move |ev| set_filter("qualityRequirement", event_target_value(&ev))
                            >
                                <option value=ALL_SENTINEL>{ALL_SENTINEL}</option>
                                <option value=PRESENCE_HAS>"有"</option>
                                <option value=PRESENCE_NONE>"无"</option>
                            </select>
                        </Flex>
                        <PaginationControls
                            current_page=Signal::derive(move || state.with(|s| s.table.page().index))
                            total_pages=Signal::derive(move || state.with(|s| s.table.view().total_pages))
                            total_count=Signal::derive(move || state.with(|s| s.table.view().total_count))
                            page_size=Signal::derive(move || state.with(|s| s.table.page().size))
                            on_page_change=Callback::new(go_to_page)
                            on_page_size_change=Callback::new(change_page_size)
                            page_size_options=page_size_options
                        />
                    </Flex>
                </div>

                {move || {
                    state.with(|s| s.notice.clone()).map(|notice| view! {
                        <div class="alert alert--error">{notice}</div>
                    })
                }}

                <div class="table-wrapper">
                    <Table attr:style="width: 100%; min-width: 900px;">
                        <TableHeader>
                            <TableRow>
                                <TableHeaderCheckbox
                                    state=Signal::derive(move || state.with(|s| s.table.selection_state()))
                                    on_change=Callback::new(move |check_all: bool| {
                                        state.update(|s| {
                                            if check_all {
                                                s.table.select_all();
                                            } else {
                                                s.table.clear_selection();
                                            }
                                        })
                                    })
                                />
                                {columns.with_value(|cols| {
                                    cols.iter()
                                        .map(|col| view! {
                                            <SortableHeaderCell
                                                label=col.title.clone()
                                                sort_field=col.field.clone()
                                                sort=Signal::derive(move || state.with(|s| s.table.sort().clone()))
                                                on_sort=Callback::new(toggle_sort)
                                                min_width=col.width.map(f64::from).unwrap_or(100.0)
                                                sortable=col.sortable
                                            />
                                        })
                                        .collect_view()
                                })}
                            </TableRow>
                        </TableHeader>

                        <TableBody>
                            <For
                                each=move || rows.get()
                                key=|row| (row.key.to_string(), row.cells.join("\u{1f}"))
                                children=move |row| {
                                    let key_for_check = row.key.clone();
                                    let key_for_toggle = row.key.clone();
                                    let key_for_open = row.key.clone();
                                    let cells = columns.with_value(|cols| {
                                        cols.iter()
                                            .zip(row.cells.iter())
                                            .map(|(col, text)| {
                                                let content = match col.kind {
                                                    ColumnKind::Status(_) => view! {
                                                        <span class=format!("tag tag--{}", row.status_color.unwrap_or("neutral"))>
                                                            {text.clone()}
                                                        </span>
                                                    }.into_any(),
                                                    ColumnKind::Text => highlight_matches(text, &keyword.get_untracked()),
                                                    _ => view! { <span>{text.clone()}</span> }.into_any(),
                                                };
                                                view! {
                                                    <TableCell>
                                                        <TableCellLayout truncate=true>{content}</TableCellLayout>
                                                    </TableCell>
                                                }
                                            })
                                            .collect_view()
                                    });

                                    view! {
                                        <TableRow
                                            class="table__row--clickable"
                                            on:click=move |_| {
                                                let key = key_for_open.clone();
                                                state.update(|s| s.editing = Some(EditTarget::Existing(key)));
                                            }
                                        >
                                            <TableCellCheckbox
                                                checked=Signal::derive(move || state.with(|s| s.table.is_selected(&key_for_check)))
                                                on_change=Callback::new(move |checked: bool| {
                                                    state.update(|s| s.table.toggle_selection(&key_for_toggle, checked))
                                                })
                                            />
                                            {cells}
                                        </TableRow>
                                    }
                                }
                            />
                        </TableBody>
                    </Table>
                </div>
            </div>

            {move || {
                editing.get().map(|target| {
                    let (initial, draft_key) = match &target {
                        EditTarget::New => (empty_values(), format!("{}.new", AUTOSAVE_KEY)),
                        EditTarget::Existing(key) => (
                            state.with_untracked(|s| s.table.get(key).cloned()).unwrap_or_else(empty_values),
                            format!("{}.{}", AUTOSAVE_KEY, key),
                        ),
                    };
                    let title = match &target {
                        EditTarget::New => "新增采购合同".to_string(),
                        EditTarget::Existing(_) => {
                            let no = initial.get("contractNo").map(value_text).unwrap_or_default();
                            format!("编辑采购合同 {}", no)
                        }
                    };
                    view! {
                        <ContractDetails
                            title=title
                            initial=initial
                            autosave_key=draft_key
                            on_save=Callback::new(move |values: Values| save(target.clone(), values))
                            on_close=Callback::new(move |_| state.update(|s| s.editing = None))
                        />
                    }
                })
            }}
        </div>
    }
}
