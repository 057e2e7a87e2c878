use crate::api::{ApiClient, ApiResult};
use crate::components::sortable_list::SortableList;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, ConfirmDialog, FormField, Input, NativeSelect, Spinner, TextArea,
};
use crate::drawer::{DrawerEvent, WidgetDrawer};
use crate::forms::{patch_diff, validate_event, FieldErrors};
use crate::models::{sorted_by_index, EngagementEvent, EventItem, EventType, Widget};
use crate::ordering::DragEnd;
use crate::state::{handle_drag_end, use_sort_sync, AppContext, ListStore, SortableEntity};
use crate::util::display_datetime;
use crate::widgets::{field_error, field_invalid, select_options, SaveCancel, NEW_ITEM_ID};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;

impl SortableEntity for EngagementEvent {
    const LABEL: &'static str = "event";

    fn persist_order(
        api: ApiClient,
        scope_id: i64,
        items: Vec<Self>,
    ) -> impl Future<Output = ApiResult<()>> + 'static {
        async move { api.sort_events(scope_id, &items).await }
    }
}

pub(crate) fn event_type_label(t: EventType) -> &'static str {
    match t {
        EventType::InPerson => "In person",
        EventType::Virtual => "Virtual",
    }
}

/// One-line schedule for the list row: `start - end`, or just the start.
pub(crate) fn schedule_summary(item: &EventItem) -> String {
    match (item.start_date.is_empty(), item.end_date.is_empty()) {
        (true, _) => String::new(),
        (false, true) => display_datetime(&item.start_date),
        (false, false) => format!(
            "{} - {}",
            display_datetime(&item.start_date),
            display_datetime(&item.end_date)
        ),
    }
}

#[component]
pub fn EventsBlock(widget: Widget, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let widget_id = widget.id;

    let store = ListStore::<EngagementEvent>::new();
    let sync = use_sort_sync::<EngagementEvent>(&app_state.0, store, widget_id);

    let api_client = app_state.0.api_client.get_untracked();
    store.load(async move {
        api_client
            .list_events(widget_id)
            .await
            .map(|events| sorted_by_index(&events, |e| e.sort_index))
    });

    let on_drag_end = Callback::new(move |drag: DragEnd| handle_drag_end(&sync, drag));

    let pending_delete: RwSignal<Option<EngagementEvent>> = RwSignal::new(None);
    let delete_open: RwSignal<bool> = RwSignal::new(false);
    let deleting: RwSignal<bool> = RwSignal::new(false);

    let on_confirm_delete = Callback::new(move |_: ()| {
        let Some(event) = pending_delete.get_untracked() else {
            return;
        };
        if deleting.get_untracked() {
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        let notifier = app_state.0.notifier;
        deleting.set(true);
        spawn_local(async move {
            match api_client.delete_event(widget_id, event.id).await {
                Ok(()) => {
                    store.remove(event.id);
                    notifier.success(format!("Deleted \"{}\"", event.title));
                }
                Err(e) => notifier.error(format!("Could not delete the event: {e}")),
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
                    let event = store.find(item_id).unwrap_or_else(|| EngagementEvent {
                        id: NEW_ITEM_ID,
                        widget_id,
                        ..Default::default()
                    });
                    view! { <EventForm event=event store=store drawer=drawer /> }
                })
            }
        >
            <div class="flex flex-col gap-3" data-name="EventsBlock">
                <div class="flex justify-end">
                    <Button
                        size=ButtonSize::Sm
                        on:click=move |_| drawer.dispatch(DrawerEvent::EditItem { item_id: NEW_ITEM_ID })
                    >
                        "Add event"
                    </Button>
                </div>

                <Show when=move || store.loading.get() fallback=|| ().into_view()>
                    <Spinner />
                </Show>
                {move || store.error.get().map(|e| view! { <p class="text-xs text-destructive">{e}</p> })}

                <SortableList
                    items=Signal::derive(move || store.get())
                    on_drag_end=on_drag_end
                    render_item=move |event: EngagementEvent| view! {
                        <EventPaper
                            event=event
                            drawer=drawer
                            on_delete=Callback::new(move |e: EngagementEvent| {
                                pending_delete.set(Some(e));
                                delete_open.set(true);
                            })
                        />
                    }
                    empty_text="No events yet."
                />
            </div>
        </Show>

        <ConfirmDialog
            open=delete_open
            title="Delete event?"
            message=Signal::derive(move || {
                pending_delete
                    .get()
                    .map(|e| format!("\"{}\" will be removed from this widget.", e.title))
                    .unwrap_or_default()
            })
            busy=deleting
            on_confirm=on_confirm_delete
        />
    }
}

#[component]
fn EventPaper(event: EngagementEvent, drawer: WidgetDrawer, on_delete: Callback<EngagementEvent>) -> impl IntoView {
    let id = event.id;
    let title = event.title.clone();
    let kind = event_type_label(event.event_type);
    let when = event.items.first().map(schedule_summary).unwrap_or_default();

    view! {
        <div class="flex items-center justify-between gap-2">
            <div class="min-w-0">
                <div class="truncate text-sm font-medium">{title}</div>
                <div class="truncate text-xs text-muted-foreground">{kind} " · " {when}</div>
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
                    on:click=move |_| on_delete.run(event.clone())
                >
                    "Delete"
                </Button>
            </div>
        </div>
    }
}

#[component]
fn EventForm(event: EngagementEvent, store: ListStore<EngagementEvent>, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let item = event.items.first().cloned().unwrap_or_default();

    let title = RwSignal::new(event.title.clone());
    let event_type = RwSignal::new(<&'static str>::from(event.event_type).to_string());
    let description = RwSignal::new(item.description.clone());
    let location_name = RwSignal::new(item.location_name.clone());
    let location_address = RwSignal::new(item.location_address.clone());
    let url = RwSignal::new(item.url.clone());
    let url_label = RwSignal::new(item.url_label.clone());
    let start_date = RwSignal::new(item.start_date.clone());
    let end_date = RwSignal::new(item.end_date.clone());

    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());
    let saving: RwSignal<bool> = RwSignal::new(false);
    let original = StoredValue::new(event);
    let item_id = item.id;

    let is_virtual = move || event_type.get() == <&'static str>::from(EventType::Virtual);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let before = original.get_value();
        let mut edited = before.clone();
        edited.title = title.get_untracked().trim().to_string();
        edited.event_type = event_type.get_untracked().parse().unwrap_or_default();
        edited.items = vec![EventItem {
            id: item_id,
            description: description.get_untracked(),
            location_name: location_name.get_untracked().trim().to_string(),
            location_address: location_address.get_untracked().trim().to_string(),
            url: url.get_untracked().trim().to_string(),
            url_label: url_label.get_untracked().trim().to_string(),
            start_date: start_date.get_untracked(),
            end_date: end_date.get_untracked(),
        }];

        if let Err(e) = validate_event(&edited) {
            errors.set(e);
            return;
        }
        errors.set(FieldErrors::default());

        let is_new = before.id == NEW_ITEM_ID;
        let patch = patch_diff(&before, &edited);
        if !is_new && patch.is_none() {
            drawer.dispatch(DrawerEvent::SaveAndClose);
            return;
        }
        if is_new {
            edited.sort_index = store.len() as i64 + 1;
        }

        let api_client = app_state.0.api_client.get_untracked();
        let notifier = app_state.0.notifier;
        saving.set(true);
        spawn_local(async move {
            let result = match patch {
                Some(patch) if !is_new => api_client.update_event(edited.widget_id, edited.id, &patch).await,
                _ => api_client.create_event(&edited).await,
            };
            match result {
                Ok(saved) => {
                    store.upsert(saved);
                    notifier.success("Event saved");
                    drawer.dispatch(DrawerEvent::SaveAndClose);
                }
                Err(e) => notifier.error(format!("Could not save the event: {e}")),
            }
            saving.set(false);
        });
    };

    view! {
        <form class="flex flex-col gap-4" on:submit=on_submit>
            <FormField label="Title" html_for="event-title" error=field_error(errors, "title")>
                <Input id="event-title" bind_value=title invalid=field_invalid(errors, "title") />
            </FormField>
            <FormField label="Type" html_for="event-type" error=field_error(errors, "event_type")>
                <NativeSelect id="event-type" options={select_options::<EventType>(event_type_label)} bind_value=event_type />
            </FormField>
            <FormField label="Description" html_for="event-description" error=field_error(errors, "description")>
                <TextArea id="event-description" bind_value=description />
            </FormField>

            <Show
                when=is_virtual
                fallback=move || view! {
                    <FormField label="Location" html_for="event-location" error=field_error(errors, "location_name")>
                        <Input id="event-location" bind_value=location_name invalid=field_invalid(errors, "location_name") />
                    </FormField>
                    <FormField label="Address" html_for="event-address" error=field_error(errors, "location_address")>
                        <Input id="event-address" bind_value=location_address />
                    </FormField>
                }
            >
                <FormField label="Session link" html_for="event-url" error=field_error(errors, "url")>
                    <Input id="event-url" r#type="url" placeholder="https://" bind_value=url invalid=field_invalid(errors, "url") />
                </FormField>
                <FormField label="Link text" html_for="event-url-label" error=field_error(errors, "url_label")>
                    <Input id="event-url-label" bind_value=url_label />
                </FormField>
            </Show>

            <div class="grid grid-cols-2 gap-3">
                <FormField label="Starts" html_for="event-start" error=field_error(errors, "start_date")>
                    <Input id="event-start" r#type="datetime-local" bind_value=start_date invalid=field_invalid(errors, "start_date") />
                </FormField>
                <FormField label="Ends" html_for="event-end" error=field_error(errors, "end_date")>
                    <Input id="event-end" r#type="datetime-local" bind_value=end_date invalid=field_invalid(errors, "end_date") />
                </FormField>
            </div>

            <SaveCancel saving=saving drawer=drawer />
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_summary() {
        let mut item = EventItem {
            start_date: "2024-06-01T18:00".to_string(),
            end_date: "2024-06-01T20:30".to_string(),
            ..Default::default()
        };
        assert_eq!(schedule_summary(&item), "2024-06-01 18:00 - 2024-06-01 20:30");

        item.end_date.clear();
        assert_eq!(schedule_summary(&item), "2024-06-01 18:00");

        item.start_date.clear();
        assert_eq!(schedule_summary(&item), "");
    }
}
