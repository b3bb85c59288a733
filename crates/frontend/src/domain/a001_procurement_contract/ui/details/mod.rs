use crate::shared::autosave::start_autosave;
use crate::shared::storage::LocalStorage;
use chrono::Utc;
use contracts::domain::a001_procurement_contract::aggregate::SELF_PICKUP;
use contracts::domain::a001_procurement_contract::schema::form_schema;
use contracts::shared::autosave::Autosave;
use contracts::shared::config::Config;
use contracts::shared::form::{FormController, SubmitOutcome, SubmitTicket, Values};
use contracts::shared::record::value_text;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;
use thaw::*;
use wasm_bindgen::JsCast;

const NUMBER_FIELDS: [&str; 3] = ["purchaseQuantity", "arrivalQuantity", "warehouseQuantity"];
const DATE_FIELDS: [&str; 1] = ["signDate"];
const DELIVERY_MODES: [&str; 2] = ["送货", SELF_PICKUP];

fn field_id(name: &str) -> String {
    format!("a001-field-{}", name)
}

/// Number fields keep unparsable text so validation can report it.
fn parse_input(name: &str, text: String) -> Value {
    if NUMBER_FIELDS.contains(&name) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        return trimmed
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::String(text));
    }
    Value::String(text)
}

fn focus_field(name: &str) {
    let element = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(&field_id(name)));
    if let Some(Ok(element)) = element.map(|e| e.dyn_into::<web_sys::HtmlElement>()) {
        let _ = element.focus();
    }
}

fn field_input(form: RwSignal<FormController>, name: String) -> AnyView {
    let name_value = name.clone();
    let name_disabled = name.clone();
    let name_blur = name.clone();
    let name_input = name.clone();
    let value_text_of = move || form.with(|f| f.value(&name_value).map(value_text).unwrap_or_default());
    let disabled = move || form.with(|f| f.is_disabled(&name_disabled));
    let on_blur = move |_| {
        form.update(|f| {
            f.validate(Some(&[name_blur.as_str()]));
        })
    };

    if name == "deliveryMode" {
        return view! {
            <select
                id=field_id(&name)
                class="form__input"
                prop:value=value_text_of
                prop:disabled=disabled
                on:change=move |ev| {
                    let value = parse_input(&name_input, event_target_value(&ev));
                    form.update(|f| f.set_field(name_input.clone(), value));
                }
                on:blur=on_blur
            >
                {DELIVERY_MODES
                    .iter()
                    .map(|mode| view! { <option value=*mode>{*mode}</option> })
                    .collect_view()}
            </select>
        }
        .into_any();
    }

    let input_type = if NUMBER_FIELDS.contains(&name.as_str()) {
        "number"
    } else if DATE_FIELDS.contains(&name.as_str()) {
        "date"
    } else {
        "text"
    };

    view! {
        <input
            id=field_id(&name)
            type=input_type
            class="form__input"
            prop:value=value_text_of
            prop:disabled=disabled
            on:input=move |ev| {
                let value = parse_input(&name_input, event_target_value(&ev));
                form.update(|f| f.set_field(name_input.clone(), value));
            }
            on:blur=on_blur
        />
    }
    .into_any()
}

/// Runs the save handler and settles `ticket`. `None` once the handler's
/// owner or the form has been disposed.
fn finish_submit(
    form: RwSignal<FormController>,
    on_save: Callback<Values, Result<(), String>>,
    ticket: &SubmitTicket,
) -> Option<SubmitOutcome> {
    let result = on_save.try_run(ticket.values.clone())?;
    form.try_update(|f| f.complete_submit(ticket, result))
}

/// Edit drawer of one contract. Restores an unexpired draft on open and
/// keeps autosaving while the form is dirty.
#[component]
pub fn ContractDetails(
    #[prop(into)]
    title: String,
    initial: Values,
    /// Storage key of this record's draft
    #[prop(into)]
    autosave_key: String,
    on_save: Callback<Values, Result<(), String>>,
    on_close: Callback<()>,
) -> impl IntoView {
    let config = use_context::<Config>().unwrap_or_default();
    let schema = form_schema();
    let fields = schema.fields.clone();

    let mut controller = FormController::new(schema, Some(config.form.history_depth));
    controller.initialize(initial);
    let form = RwSignal::new(controller);

    let autosave = StoredValue::new(Autosave::new(
        LocalStorage,
        autosave_key,
        config.autosave_ttl(),
    ));
    let (notice, set_notice) = signal(None::<String>);

    match autosave.try_update_value(|a| a.restore(Utc::now())) {
        Some(Ok(Some(draft))) => {
            form.update(|f| f.set_fields(draft));
            set_notice.set(Some("已恢复未保存的草稿".to_string()));
        }
        Some(Err(e)) => log::warn!("draft restore failed: {}", e),
        _ => {}
    }
    start_autosave(form, autosave, config.autosave.interval_secs);

    let submit = move || {
        let ticket = match form.try_update(|f| f.begin_submit()) {
            Some(Ok(ticket)) => ticket,
            Some(Err(SubmitOutcome::Invalid { first_invalid })) => {
                set_notice.set(Some("请检查标红的字段".to_string()));
                if let Some(name) = first_invalid {
                    focus_field(&name);
                }
                return;
            }
            _ => return,
        };
        set_notice.set(None);

        spawn_local(async move {
            // let the Submitting state render before the handler runs
            TimeoutFuture::new(0).await;
            match finish_submit(form, on_save, &ticket) {
                Some(SubmitOutcome::Submitted) => {
                    if let Some(Err(e)) = autosave.try_update_value(|a| a.clear()) {
                        log::warn!("draft cleanup failed: {}", e);
                    }
                    on_close.try_run(());
                }
                Some(SubmitOutcome::Failed(e)) => {
                    set_notice.try_set(Some(format!("保存失败: {}", e)));
                }
                Some(_) => {}
                None => log::debug!("submit finished after the drawer closed"),
            }
        });
    };

    let field_views = fields
        .into_iter()
        .map(|spec| {
            let name_visible = spec.name.clone();
            let name_errors = spec.name.clone();
            let required = spec.rules.is_required();
            view! {
                <div class=move || {
                    if form.with(|f| f.is_visible(&name_visible)) {
                        "form__group"
                    } else {
                        "form__group form__group--hidden"
                    }
                }>
                    <label class="form__label" for=field_id(&spec.name)>
                        {spec.label.clone()}
                        {required.then_some(" *")}
                    </label>
                    {field_input(form, spec.name.clone())}
                    <div class="form__error">
                        {move || form.with(|f| f.field_errors(&name_errors).join("；"))}
                    </div>
                </div>
            }
        })
        .collect_view();

    view! {
        <div class="drawer">
            <div class="drawer__header">
                <h2 class="drawer__title">{title}</h2>
                <Show when=move || form.with(|f| f.is_dirty())>
                    <span class="drawer__dirty">"未保存"</span>
                </Show>
            </div>

            {move || notice.get().map(|text| view! { <div class="alert">{text}</div> })}

            <div class="drawer__body">{field_views}</div>

            <div class="drawer__footer">
                <Flex gap=FlexGap::Small>
                    <Button
                        on_click=move |_| {
                            form.update(|f| {
                                f.undo();
                            })
                        }
                        disabled=Signal::derive(move || !form.with(|f| f.can_undo()))
                    >
                        "撤销"
                    </Button>
                    <Button
                        on_click=move |_| {
                            form.update(|f| {
                                f.redo();
                            })
                        }
                        disabled=Signal::derive(move || !form.with(|f| f.can_redo()))
                    >
                        "重做"
                    </Button>
                    <Button on_click=move |_| form.update(|f| f.reset())>"重置"</Button>
                    <Button on_click=move |_| on_close.run(())>"取消"</Button>
                    <Button
                        appearance=ButtonAppearance::Primary
                        on_click=move |_| submit()
                        disabled=Signal::derive(move || form.with(|f| f.is_submitting()))
                    >
                        {move || if form.with(|f| f.is_submitting()) { "保存中..." } else { "保存" }}
                    </Button>
                </Flex>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::form::{FieldSpec, FormSchema};
    use leptos::reactive::owner::Owner;
    use serde_json::json;

    fn submitting_form() -> (FormController, SubmitTicket) {
        let mut form = FormController::new(FormSchema::new().field(FieldSpec::new("note", "备注")), None);
        form.set_field("note", json!("changed"));
        let ticket = form.begin_submit().unwrap();
        (form, ticket)
    }

    #[test]
    fn test_submit_settles_while_drawer_is_open() {
        let owner = Owner::new();
        owner.with(|| {
            let (controller, ticket) = submitting_form();
            let form = RwSignal::new(controller);
            let on_save = Callback::new(|_: Values| Ok(()));
            assert_eq!(finish_submit(form, on_save, &ticket), Some(SubmitOutcome::Submitted));
            assert!(!form.with_untracked(|f| f.is_dirty()));
        });
    }

    #[test]
    fn test_submit_after_drawer_closed_is_dropped() {
        let owner = Owner::new();
        let (form, on_save, ticket) = owner.with(|| {
            let (controller, ticket) = submitting_form();
            let form = RwSignal::new(controller);
            let on_save = Callback::new(|_: Values| Ok(()));
            (form, on_save, ticket)
        });
        owner.cleanup();
        assert_eq!(finish_submit(form, on_save, &ticket), None);
    }
}
