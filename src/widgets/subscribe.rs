use crate::api::{ApiClient, ApiResult};
use crate::components::sortable_list::SortableList;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, ConfirmDialog, FormField, Input, NativeSelect, Spinner, TextArea,
};
use crate::drawer::{DrawerEvent, WidgetDrawer};
use crate::forms::{patch_diff, validate_subscribe_option, FieldErrors};
use crate::models::{sorted_by_index, CallToActionType, SubscribeFormType, SubscribeOption, Widget};
use crate::ordering::DragEnd;
use crate::state::{handle_drag_end, use_sort_sync, AppContext, ListStore, SortableEntity};
use crate::widgets::{field_error, field_invalid, select_options, SaveCancel, NEW_ITEM_ID};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;

impl SortableEntity for SubscribeOption {
    const LABEL: &'static str = "subscribe option";

    fn persist_order(
        api: ApiClient,
        scope_id: i64,
        items: Vec<Self>,
    ) -> impl Future<Output = ApiResult<()>> + 'static {
        async move { api.sort_subscribe_options(scope_id, &items).await }
    }
}

pub(crate) fn form_type_label(t: SubscribeFormType) -> &'static str {
    match t {
        SubscribeFormType::EmailList => "Email list",
        SubscribeFormType::SignUp => "Sign-up form",
    }
}

pub(crate) fn call_to_action_label(t: CallToActionType) -> &'static str {
    match t {
        CallToActionType::Link => "Link",
        CallToActionType::Button => "Button",
    }
}

/// Apply the form fields to `before`. Unknown select values fall back to the defaults.
fn edited_option(
    before: &SubscribeOption,
    form_type: &str,
    description: &str,
    call_to_action_type: &str,
    call_to_action_text: &str,
    list_len: usize,
) -> Result<SubscribeOption, FieldErrors> {
    let mut edited = before.clone();
    edited.form_type = form_type.parse().unwrap_or_default();
    edited.description = description.trim().to_string();
    edited.call_to_action_type = call_to_action_type.parse().unwrap_or_default();
    edited.call_to_action_text = call_to_action_text.trim().to_string();
    validate_subscribe_option(&edited)?;
    if edited.id == NEW_ITEM_ID {
        edited.sort_index = list_len as i64 + 1;
    }
    Ok(edited)
}

#[component]
pub fn SubscribeBlock(widget: Widget, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let widget_id = widget.id;

    let store = ListStore::<SubscribeOption>::new();
    let sync = use_sort_sync::<SubscribeOption>(&app_state.0, store, widget_id);

    let api_client = app_state.0.api_client.get_untracked();
    store.load(async move {
        api_client
            .list_subscribe_options(widget_id)
            .await
            .map(|options| sorted_by_index(&options, |o| o.sort_index))
    });

    let on_drag_end = Callback::new(move |drag: DragEnd| handle_drag_end(&sync, drag));

    let pending_delete: RwSignal<Option<SubscribeOption>> = RwSignal::new(None);
    let delete_open: RwSignal<bool> = RwSignal::new(false);
    let deleting: RwSignal<bool> = RwSignal::new(false);

    let on_confirm_delete = Callback::new(move |_: ()| {
        let Some(option) = pending_delete.get_untracked() else {
            return;
        };
        if deleting.get_untracked() {
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        let notifier = app_state.0.notifier;
        deleting.set(true);
        spawn_local(async move {
            match api_client.delete_subscribe_option(widget_id, option.id).await {
                Ok(()) => {
                    store.remove(option.id);
                    notifier.success("Sign-up option deleted");
                }
                Err(e) => notifier.error(format!("Could not delete the sign-up option: {e}")),
            }
            deleting.set(false);
            delete_open.set(false);
            pending_delete.set(None);
        });
    });

    let editing = Memo::new(move |_| drawer.state().editing_item());

    view! {
        <Show
            when=move || editing.get().is_none()
            fallback=move || {
                editing.get().map(|item_id| {
                    let option = store.find(item_id).unwrap_or_else(|| SubscribeOption {
                        id: NEW_ITEM_ID,
                        widget_id,
                        ..Default::default()
                    });
                    view! { <SubscribeOptionForm option=option store=store drawer=drawer /> }
                })
            }
        >
            <div class="flex flex-col gap-3" data-name="SubscribeBlock">
                <div class="flex justify-end">
                    <Button
                        size=ButtonSize::Sm
                        on:click=move |_| drawer.dispatch(DrawerEvent::EditItem { item_id: NEW_ITEM_ID })
                    >
                        "Add sign-up option"
                    </Button>
                </div>

                <Show when=move || store.loading.get() fallback=|| ().into_view()>
                    <Spinner />
                </Show>
                {move || store.error.get().map(|e| view! { <p class="text-xs text-destructive">{e}</p> })}

                <SortableList
                    items=Signal::derive(move || store.get())
                    on_drag_end=on_drag_end
                    render_item=move |option: SubscribeOption| view! {
                        <SubscribePaper
                            option=option
                            drawer=drawer
                            on_delete=Callback::new(move |o: SubscribeOption| {
                                pending_delete.set(Some(o));
                                delete_open.set(true);
                            })
                        />
                    }
                    empty_text="No sign-up options yet."
                />
            </div>
        </Show>

        <ConfirmDialog
            open=delete_open
            title="Delete sign-up option?"
            message=Signal::derive(move || {
                pending_delete
                    .get()
                    .map(|o| format!("The \"{}\" option will be removed.", o.call_to_action_text))
                    .unwrap_or_default()
            })
            busy=deleting
            on_confirm=on_confirm_delete
        />
    }
}

#[component]
fn SubscribePaper(option: SubscribeOption, drawer: WidgetDrawer, on_delete: Callback<SubscribeOption>) -> impl IntoView {
    let id = option.id;
    let heading = form_type_label(option.form_type);
    let cta = format!(
        "{}: {}",
        call_to_action_label(option.call_to_action_type),
        option.call_to_action_text
    );

    view! {
        <div class="flex items-center justify-between gap-2">
            <div class="min-w-0">
                <div class="truncate text-sm font-medium">{heading}</div>
                <div class="truncate text-xs text-muted-foreground">{cta}</div>
            </div>
            <div class="flex shrink-0 items-center gap-1">
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    on:click=move |_| drawer.dispatch(DrawerEvent::EditItem { item_id: id })
                >
                    "Edit"
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    class="text-destructive"
                    on:click=move |_| on_delete.run(option.clone())
                >
                    "Delete"
                </Button>
            </div>
        </div>
    }
}

#[component]
fn SubscribeOptionForm(
    option: SubscribeOption,
    store: ListStore<SubscribeOption>,
    drawer: WidgetDrawer,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let form_type = RwSignal::new(<&'static str>::from(option.form_type).to_string());
    let description = RwSignal::new(option.description.clone());
    let call_to_action_type = RwSignal::new(<&'static str>::from(option.call_to_action_type).to_string());
    let call_to_action_text = RwSignal::new(option.call_to_action_text.clone());

    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());
    let saving: RwSignal<bool> = RwSignal::new(false);
    let original = StoredValue::new(option);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let before = original.get_value();
        let edited = match edited_option(
            &before,
            &form_type.get_untracked(),
            &description.get_untracked(),
            &call_to_action_type.get_untracked(),
            &call_to_action_text.get_untracked(),
            store.len(),
        ) {
            Ok(edited) => edited,
            Err(e) => {
                errors.set(e);
                return;
            }
        };
        errors.set(FieldErrors::default());

        let is_new = before.id == NEW_ITEM_ID;
        let patch = patch_diff(&before, &edited);
        if !is_new && patch.is_none() {
            drawer.dispatch(DrawerEvent::SaveAndClose);
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        let notifier = app_state.0.notifier;
        saving.set(true);
        spawn_local(async move {
            let result = match patch {
                Some(patch) if !is_new => {
                    api_client
                        .update_subscribe_option(edited.widget_id, edited.id, &patch)
                        .await
                }
                _ => api_client.create_subscribe_option(&edited).await,
            };
            match result {
                Ok(saved) => {
                    store.upsert(saved);
                    notifier.success("Sign-up option saved");
                    drawer.dispatch(DrawerEvent::SaveAndClose);
                }
                Err(e) => notifier.error(format!("Could not save the sign-up option: {e}")),
            }
            saving.set(false);
        });
    };

    view! {
        <form class="flex flex-col gap-4" on:submit=on_submit>
            <FormField label="Form" html_for="subscribe-form-type" error=field_error(errors, "form_type")>
                <NativeSelect
                    id="subscribe-form-type"
                    options={select_options::<SubscribeFormType>(form_type_label)}
                    bind_value=form_type
                />
            </FormField>
            <FormField label="Description" html_for="subscribe-description" error=field_error(errors, "description")>
                <TextArea id="subscribe-description" bind_value=description invalid=field_invalid(errors, "description") />
            </FormField>
            <FormField label="Call to action" html_for="subscribe-cta-type" error=field_error(errors, "call_to_action_type")>
                <NativeSelect
                    id="subscribe-cta-type"
                    options={select_options::<CallToActionType>(call_to_action_label)}
                    bind_value=call_to_action_type
                />
            </FormField>
            <FormField label="Call to action text" html_for="subscribe-cta-text" error=field_error(errors, "call_to_action_text")>
                <Input
                    id="subscribe-cta-text"
                    placeholder="Sign up"
                    bind_value=call_to_action_text
                    invalid=field_invalid(errors, "call_to_action_text")
                />
            </FormField>
            <SaveCancel saving=saving drawer=drawer />
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_values_parse_with_fallback() {
        let blank = SubscribeOption::default();
        let opt = edited_option(&blank, "sign_up", " Join us ", "button", " Sign up ", 2).expect("valid");
        assert_eq!(opt.form_type, SubscribeFormType::SignUp);
        assert_eq!(opt.call_to_action_type, CallToActionType::Button);
        assert_eq!(opt.description, "Join us");
        assert_eq!(opt.call_to_action_text, "Sign up");
        assert_eq!(opt.sort_index, 3);

        let opt = edited_option(&blank, "fax", "Join us", "", "Go", 0).expect("valid");
        assert_eq!(opt.form_type, SubscribeFormType::EmailList);
        assert_eq!(opt.call_to_action_type, CallToActionType::Link);
    }

    #[test]
    fn test_call_to_action_text_is_capped() {
        let existing = SubscribeOption {
            id: 4,
            sort_index: 1,
            ..Default::default()
        };
        let errs = edited_option(&existing, "email_list", "News", "link", &"x".repeat(26), 5)
            .expect_err("should fail");
        assert!(errs.get("call_to_action_text").is_some());

        let ok = edited_option(&existing, "email_list", "News", "link", "Subscribe", 5).expect("valid");
        assert_eq!(ok.sort_index, 1);
    }

    #[test]
    fn test_labels_cover_every_variant() {
        use strum::IntoEnumIterator;
        assert!(SubscribeFormType::iter().all(|t| !form_type_label(t).is_empty()));
        assert_eq!(call_to_action_label(CallToActionType::Button), "Button");
    }
}
