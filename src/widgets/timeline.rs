use crate::components::sortable_list::SortableList;
use crate::components::ui::{FormField, Input, NativeSelect, Spinner, TextArea};
use crate::drawer::{DrawerEvent, WidgetDrawer};
use crate::forms::{validate_timeline, FieldErrors};
use crate::models::{sorted_by_index, Timeline, TimelineEvent, TimelineStatus, Widget};
use crate::ordering::{apply_drag_end, write_positions, DragEnd};
use crate::state::AppContext;
use crate::widgets::{field_error, field_invalid, select_options, SaveCancel, GHOST_SM, OUTLINE_SM};
use leptos::prelude::*;
use leptos::task::spawn_local;

pub(crate) fn status_label(s: TimelineStatus) -> &'static str {
    match s {
        TimelineStatus::Pending => "Pending",
        TimelineStatus::InProgress => "In progress",
        TimelineStatus::Completed => "Completed",
    }
}

/// Events in display order with `position` matching their index.
pub(crate) fn normalized_events(events: &[TimelineEvent]) -> Vec<TimelineEvent> {
    let mut out = sorted_by_index(events, |e| e.position);
    write_positions(&mut out);
    out
}

/// Insert or replace the event at `index`, then renumber.
pub(crate) fn put_event(events: &[TimelineEvent], index: Option<usize>, event: TimelineEvent) -> Vec<TimelineEvent> {
    let mut out = events.to_vec();
    match index.filter(|i| *i < out.len()) {
        Some(i) => out[i] = event,
        None => out.push(event),
    }
    write_positions(&mut out);
    out
}

pub(crate) fn remove_event(events: &[TimelineEvent], index: usize) -> Vec<TimelineEvent> {
    let mut out = events.to_vec();
    if index < out.len() {
        out.remove(index);
    }
    write_positions(&mut out);
    out
}

/// Timelines are saved as a whole, so their events are reordered in place and
/// the new positions go out with the next save.
#[component]
pub fn TimelineForm(widget: Widget, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let notifier = app_state.0.notifier;

    let loading: RwSignal<bool> = RwSignal::new(true);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());
    let record: RwSignal<Timeline> = RwSignal::new(Timeline {
        widget_id: widget.id,
        engagement_id: widget.engagement_id,
        ..Default::default()
    });

    let title = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let events: RwSignal<Vec<TimelineEvent>> = RwSignal::new(vec![]);

    // Event sub-form. `editing_index` is None while adding a new event.
    let event_description = RwSignal::new(String::new());
    let event_time = RwSignal::new(String::new());
    let event_status = RwSignal::new(<&'static str>::from(TimelineStatus::default()).to_string());
    let editing_index: RwSignal<Option<usize>> = RwSignal::new(None);

    let api_client = app_state.0.api_client.get_untracked();
    let widget_id = widget.id;
    spawn_local(async move {
        match api_client.get_timeline(widget_id).await {
            Ok(Some(t)) => {
                title.set(t.title.clone());
                description.set(t.description.clone());
                events.set(normalized_events(&t.events));
                record.set(t);
            }
            Ok(None) => {}
            Err(e) => notifier.error(format!("Could not load the timeline: {e}")),
        }
        loading.set(false);
    });

    let reset_event_form = move || {
        event_description.set(String::new());
        event_time.set(String::new());
        event_status.set(<&'static str>::from(TimelineStatus::default()).to_string());
        editing_index.set(None);
    };

    let on_put_event = move |_: web_sys::MouseEvent| {
        let text = event_description.get_untracked().trim().to_string();
        if text.is_empty() {
            return;
        }
        let index = editing_index.get_untracked();
        let id = index
            .and_then(|i| events.with_untracked(|xs| xs.get(i).map(|e| e.id)))
            .unwrap_or_default();
        let event = TimelineEvent {
            id,
            description: text,
            time: event_time.get_untracked().trim().to_string(),
            status: event_status.get_untracked().parse().unwrap_or_default(),
            position: 0,
        };
        events.update(|xs| *xs = put_event(xs, index, event));
        reset_event_form();
    };

    let on_edit_event = move |index: usize| {
        if let Some(e) = events.with_untracked(|xs| xs.get(index).cloned()) {
            event_description.set(e.description);
            event_time.set(e.time);
            event_status.set(<&'static str>::from(e.status).to_string());
            editing_index.set(Some(index));
        }
    };

    let on_drag_end = Callback::new(move |drag: DragEnd| {
        match apply_drag_end(&events.get_untracked(), drag) {
            Ok(Some(next)) => events.set(next),
            Ok(None) => {}
            Err(e) => tracing::warn!(entity = "timeline event", "ignoring drag: {e}"),
        }
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let original = record.get_untracked();
        let timeline = Timeline {
            title: title.get_untracked().trim().to_string(),
            description: description.get_untracked(),
            events: normalized_events(&events.get_untracked()),
            ..original.clone()
        };

        if let Err(e) = validate_timeline(&timeline) {
            errors.set(e);
            return;
        }
        errors.set(FieldErrors::default());

        let api_client = app_state.0.api_client.get_untracked();
        saving.set(true);
        spawn_local(async move {
            match api_client.save_timeline(&original, &timeline).await {
                Ok(saved) => {
                    events.set(normalized_events(&saved.events));
                    record.set(saved);
                    notifier.success("Timeline saved");
                    drawer.dispatch(DrawerEvent::SaveAndClose);
                }
                Err(e) => notifier.error(format!("Could not save the timeline: {e}")),
            }
            saving.set(false);
        });
    };

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <form class="flex flex-col gap-4" on:submit=on_submit>
                <FormField label="Title" html_for="timeline-title" error=field_error(errors, "title")>
                    <Input id="timeline-title" bind_value=title invalid=field_invalid(errors, "title") />
                </FormField>
                <FormField label="Description" html_for="timeline-description" error=field_error(errors, "description")>
                    <TextArea id="timeline-description" bind_value=description />
                </FormField>

                <FormField label="Events" html_for="timeline-event-description" error=field_error(errors, "events")>
                    <SortableList
                        items=Signal::derive(move || events.get())
                        on_drag_end=on_drag_end
                        render_item=move |e: TimelineEvent| {
                            let index = e.position.max(0) as usize;
                            view! {
                                <div class="flex items-center justify-between gap-2">
                                    <div class="min-w-0">
                                        <div class="truncate text-sm">{e.description.clone()}</div>
                                        <div class="text-xs text-muted-foreground">
                                            {e.time.clone()} " · " {status_label(e.status)}
                                        </div>
                                    </div>
                                    <div class="flex shrink-0 items-center gap-1">
                                        <button type="button" class=GHOST_SM on:click=move |_| on_edit_event(index)>
                                            "Edit"
                                        </button>
                                        <button
                                            type="button"
                                            class=format!("{GHOST_SM} text-destructive")
                                            on:click=move |_| {
                                                events.update(|xs| *xs = remove_event(xs, index));
                                                if editing_index.get_untracked() == Some(index) {
                                                    reset_event_form();
                                                }
                                            }
                                        >
                                            "Remove"
                                        </button>
                                    </div>
                                </div>
                            }
                        }
                        empty_text="No events yet."
                    />

                    <div class="flex flex-col gap-2 rounded-md border border-dashed p-3">
                        <Input id="timeline-event-description" placeholder="What happens" bind_value=event_description />
                        <div class="grid grid-cols-2 gap-2">
                            <Input placeholder="When (e.g. Spring 2025)" bind_value=event_time />
                            <NativeSelect options={select_options::<TimelineStatus>(status_label)} bind_value=event_status />
                        </div>
                        <div class="flex justify-end gap-2">
                            <Show when=move || editing_index.get().is_some() fallback=|| ().into_view()>
                                <button type="button" class=OUTLINE_SM on:click=move |_| reset_event_form()>
                                    "Cancel edit"
                                </button>
                            </Show>
                            <button type="button" class=OUTLINE_SM on:click=on_put_event>
                                {move || if editing_index.get().is_some() { "Update event" } else { "Add event" }}
                            </button>
                        </div>
                    </div>
                </FormField>

                <SaveCancel saving=saving drawer=drawer />
            </form>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64, description: &str, position: i64) -> TimelineEvent {
        TimelineEvent {
            id,
            description: description.to_string(),
            position,
            ..Default::default()
        }
    }

    fn descriptions(events: &[TimelineEvent]) -> Vec<&str> {
        events.iter().map(|e| e.description.as_str()).collect()
    }

    #[test]
    fn test_normalized_events_sort_and_renumber() {
        let out = normalized_events(&[event(1, "b", 5), event(2, "a", 2), event(3, "c", 9)]);
        assert_eq!(descriptions(&out), vec!["a", "b", "c"]);
        assert_eq!(out.iter().map(|e| e.position).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_put_event_appends_or_replaces() {
        let xs = normalized_events(&[event(1, "a", 0), event(2, "b", 1)]);
        let appended = put_event(&xs, None, event(0, "c", 0));
        assert_eq!(descriptions(&appended), vec!["a", "b", "c"]);
        assert_eq!(appended[2].position, 2);

        let replaced = put_event(&xs, Some(0), event(1, "A", 0));
        assert_eq!(descriptions(&replaced), vec!["A", "b"]);

        let out_of_range = put_event(&xs, Some(7), event(0, "z", 0));
        assert_eq!(out_of_range.len(), 3);
    }

    #[test]
    fn test_remove_event_renumbers() {
        let xs = normalized_events(&[event(1, "a", 0), event(2, "b", 1), event(3, "c", 2)]);
        let out = remove_event(&xs, 0);
        assert_eq!(descriptions(&out), vec!["b", "c"]);
        assert_eq!(out[0].position, 0);
        assert_eq!(remove_event(&xs, 10).len(), 3);
    }

    #[test]
    fn test_drag_writes_positions_before_save() {
        let xs = normalized_events(&[event(1, "a", 0), event(2, "b", 1), event(3, "c", 2)]);
        let next = apply_drag_end(&xs, DragEnd::dropped(2, 0))
            .expect("in range")
            .expect("changed");
        assert_eq!(descriptions(&next), vec!["c", "a", "b"]);
        assert_eq!(next[0].position, 0);
        assert_eq!(next[0].id, 3);
    }
}
