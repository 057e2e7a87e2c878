use crate::api::{ApiClient, ApiResult};
use crate::components::sortable_list::SortableList;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, ConfirmDialog, FormField, Input, Spinner};
use crate::drawer::{DrawerEvent, WidgetDrawer};
use crate::forms::{patch_diff, validate_document, FieldErrors};
use crate::models::{sorted_by_index, Widget, WidgetDocument};
use crate::ordering::DragEnd;
use crate::state::{handle_drag_end, use_sort_sync, AppContext, ListStore, SortableEntity};
use crate::widgets::{field_error, field_invalid, SaveCancel, NEW_ITEM_ID};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;

impl SortableEntity for WidgetDocument {
    const LABEL: &'static str = "document";

    fn persist_order(
        api: ApiClient,
        scope_id: i64,
        items: Vec<Self>,
    ) -> impl Future<Output = ApiResult<()>> + 'static {
        async move { api.sort_documents(scope_id, &items).await }
    }
}

/// Apply the form fields to `before`. New documents go to the end of a list of `list_len`.
fn edited_document(
    before: &WidgetDocument,
    title: &str,
    url: &str,
    list_len: usize,
) -> Result<WidgetDocument, FieldErrors> {
    let mut edited = before.clone();
    edited.title = title.trim().to_string();
    edited.url = url.trim().to_string();
    validate_document(&edited)?;
    if edited.id == NEW_ITEM_ID {
        edited.sort_index = list_len as i64 + 1;
    }
    Ok(edited)
}

#[component]
pub fn DocumentsBlock(widget: Widget, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let widget_id = widget.id;

    let store = ListStore::<WidgetDocument>::new();
    let sync = use_sort_sync::<WidgetDocument>(&app_state.0, store, widget_id);

    let api_client = app_state.0.api_client.get_untracked();
    store.load(async move {
        api_client
            .list_documents(widget_id)
            .await
            .map(|docs| sorted_by_index(&docs, |d| d.sort_index))
    });

    let on_drag_end = Callback::new(move |drag: DragEnd| handle_drag_end(&sync, drag));

    let pending_delete: RwSignal<Option<WidgetDocument>> = RwSignal::new(None);
    let delete_open: RwSignal<bool> = RwSignal::new(false);
    let deleting: RwSignal<bool> = RwSignal::new(false);

    let on_confirm_delete = Callback::new(move |_: ()| {
        let Some(doc) = pending_delete.get_untracked() else {
            return;
        };
        if deleting.get_untracked() {
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        let notifier = app_state.0.notifier;
        deleting.set(true);
        spawn_local(async move {
            match api_client.delete_document(widget_id, doc.id).await {
                Ok(()) => {
                    store.remove(doc.id);
                    notifier.success(format!("Deleted \"{}\"", doc.title));
                }
                Err(e) => notifier.error(format!("Could not delete the document: {e}")),
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
                    let doc = store.find(item_id).unwrap_or_else(|| WidgetDocument {
                        id: NEW_ITEM_ID,
                        widget_id,
                        ..Default::default()
                    });
                    view! { <DocumentForm doc=doc store=store drawer=drawer /> }
                })
            }
        >
            <div class="flex flex-col gap-3" data-name="DocumentsBlock">
                <div class="flex justify-end">
                    <Button
                        size=ButtonSize::Sm
                        on:click=move |_| drawer.dispatch(DrawerEvent::EditItem { item_id: NEW_ITEM_ID })
                    >
                        "Add document"
                    </Button>
                </div>

                <Show when=move || store.loading.get() fallback=|| ().into_view()>
                    <Spinner />
                </Show>
                {move || store.error.get().map(|e| view! { <p class="text-xs text-destructive">{e}</p> })}

                <SortableList
                    items=Signal::derive(move || store.get())
                    on_drag_end=on_drag_end
                    render_item=move |doc: WidgetDocument| view! {
                        <DocumentPaper
                            doc=doc
                            drawer=drawer
                            on_delete=Callback::new(move |d: WidgetDocument| {
                                pending_delete.set(Some(d));
                                delete_open.set(true);
                            })
                        />
                    }
                    empty_text="No documents yet."
                />
            </div>
        </Show>

        <ConfirmDialog
            open=delete_open
            title="Delete document?"
            message=Signal::derive(move || {
                pending_delete
                    .get()
                    .map(|d| format!("\"{}\" will be removed from this widget.", d.title))
                    .unwrap_or_default()
            })
            busy=deleting
            on_confirm=on_confirm_delete
        />
    }
}

#[component]
fn DocumentPaper(doc: WidgetDocument, drawer: WidgetDrawer, on_delete: Callback<WidgetDocument>) -> impl IntoView {
    let id = doc.id;
    let title = doc.title.clone();
    let url = doc.url.clone();

    view! {
        <div class="flex items-center justify-between gap-2">
            <div class="min-w-0">
                <div class="truncate text-sm font-medium">{title}</div>
                <a class="block truncate text-xs text-primary underline-offset-4 hover:underline" href=url.clone() target="_blank" rel="noopener">
                    {url.clone()}
                </a>
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
                    on:click=move |_| on_delete.run(doc.clone())
                >
                    "Delete"
                </Button>
            </div>
        </div>
    }
}

#[component]
fn DocumentForm(doc: WidgetDocument, store: ListStore<WidgetDocument>, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let title = RwSignal::new(doc.title.clone());
    let url = RwSignal::new(doc.url.clone());
    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());
    let saving: RwSignal<bool> = RwSignal::new(false);
    let original = StoredValue::new(doc);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let before = original.get_value();
        let edited = match edited_document(&before, &title.get_untracked(), &url.get_untracked(), store.len()) {
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
                        .update_document(edited.widget_id, edited.id, &patch)
                        .await
                }
                _ => api_client.create_document(&edited).await,
            };
            match result {
                Ok(saved) => {
                    store.upsert(saved);
                    notifier.success("Document saved");
                    drawer.dispatch(DrawerEvent::SaveAndClose);
                }
                Err(e) => notifier.error(format!("Could not save the document: {e}")),
            }
            saving.set(false);
        });
    };

    view! {
        <form class="flex flex-col gap-4" on:submit=on_submit>
            <FormField label="Title" html_for="document-title" error=field_error(errors, "title")>
                <Input id="document-title" bind_value=title invalid=field_invalid(errors, "title") />
            </FormField>
            <FormField label="Link" html_for="document-url" error=field_error(errors, "url")>
                <Input
                    id="document-url"
                    r#type="url"
                    placeholder="https://"
                    bind_value=url
                    invalid=field_invalid(errors, "url")
                />
            </FormField>
            <SaveCancel saving=saving drawer=drawer />
        </form>
    }
}
