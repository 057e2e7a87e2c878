//! Admin editors for every widget type, plus the drawer that hosts them.

pub(crate) mod contacts;
pub(crate) mod documents;
pub(crate) mod events;
pub(crate) mod list;
pub(crate) mod map;
pub(crate) mod poll;
pub(crate) mod subscribe;
pub(crate) mod timeline;
pub(crate) mod video;

use crate::api::{ApiClient, ApiResult, CreateWidgetRequest};
use crate::components::ui::{Button, ButtonSize, ButtonVariant, FormField, Input, Spinner};
use crate::drawer::{DrawerEvent, DrawerState, WidgetDrawer};
use crate::forms::{patch_diff, validate_widget, FieldErrors};
use crate::models::{Widget, WidgetType};
use crate::state::{AppContext, ListStore, SortableEntity};
use crate::util::window_listener;
use icons::X;
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;
use strum::IntoEnumIterator;

/// Outline small button styling for `type="button"` controls inside forms.
pub(crate) const OUTLINE_SM: &str = "inline-flex h-8 items-center justify-center gap-1.5 rounded-md border bg-border/30 px-3 text-sm font-medium shadow-xs hover:bg-border/50 disabled:pointer-events-none disabled:opacity-50";

pub(crate) const GHOST_SM: &str = "inline-flex h-8 items-center justify-center gap-1.5 rounded-md px-3 text-sm font-medium hover:bg-accent hover:text-accent-foreground disabled:pointer-events-none disabled:opacity-50";

/// Item id used while the drawer edits a record that does not exist yet.
pub(crate) const NEW_ITEM_ID: i64 = 0;

impl SortableEntity for Widget {
    const LABEL: &'static str = "widget";

    fn persist_order(
        api: ApiClient,
        scope_id: i64,
        items: Vec<Self>,
    ) -> impl Future<Output = ApiResult<()>> + 'static {
        async move { api.sort_widgets(scope_id, &items).await }
    }
}

/// How a widget type is edited in the drawer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EditorKind {
    /// A sortable list of child records, each edited on its own.
    ItemList,
    /// One record owned by the widget, saved as a whole.
    SingleRecord,
    /// Only the widget's own title.
    TitleOnly,
}

pub(crate) fn editor_kind(widget_type: WidgetType) -> EditorKind {
    match widget_type {
        WidgetType::WhoIsListening
        | WidgetType::Subscribe
        | WidgetType::Events
        | WidgetType::Documents => EditorKind::ItemList,
        WidgetType::Map | WidgetType::Video | WidgetType::Timeline | WidgetType::Poll => {
            EditorKind::SingleRecord
        }
        WidgetType::Phases => EditorKind::TitleOnly,
    }
}

/// The engagement's widget of `widget_type`, if one was already added.
pub(crate) fn find_widget(widgets: &[Widget], widget_type: WidgetType) -> Option<&Widget> {
    widgets.iter().find(|w| w.widget_type == widget_type)
}

pub(crate) fn field_error(errors: RwSignal<FieldErrors>, field: &'static str) -> Signal<Option<String>> {
    Signal::derive(move || errors.with(|e| e.get(field).map(str::to_string)))
}

pub(crate) fn field_invalid(errors: RwSignal<FieldErrors>, field: &'static str) -> Signal<bool> {
    Signal::derive(move || errors.with(|e| e.get(field).is_some()))
}

/// `(value, label)` pairs for a `<select>` over a string-backed enum.
pub(crate) fn select_options<E>(label: fn(E) -> &'static str) -> Vec<(&'static str, &'static str)>
where
    E: IntoEnumIterator + Into<&'static str> + Copy,
{
    E::iter().map(|v| (v.into(), label(v))).collect()
}

/// Open the drawer on `widget`, closing whatever it showed before.
pub(crate) fn open_widget(drawer: WidgetDrawer, widget: &Widget) {
    if drawer.state_untracked().is_open() {
        drawer.dispatch(DrawerEvent::Close);
    }
    drawer.dispatch(DrawerEvent::Open {
        existing: Some((widget.widget_type, widget.id)),
    });
}

/// Slide-in panel: widget type picker, then the editor for the chosen widget.
#[component]
pub fn WidgetEditorDrawer(
    engagement_id: i64,
    widgets: ListStore<Widget>,
    drawer: WidgetDrawer,
) -> impl IntoView {
    let showing_options = Memo::new(move |_| drawer.state() == DrawerState::Options);
    // Only changes when a different widget is opened, so item edits keep the editor mounted.
    let current_widget = Memo::new(move |_| drawer.state().widget());

    window_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" && drawer.state_untracked().is_open() {
            drawer.dispatch(DrawerEvent::Close);
        }
    });

    let heading = move || match current_widget.get() {
        Some((widget_type, _)) => widget_type.label(),
        None => "Add a widget",
    };

    view! {
        <Show when=move || drawer.state().is_open() fallback=|| ().into_view()>
            <div
                class="fixed inset-0 z-[100] flex justify-end bg-black/20"
                on:click=move |_| drawer.dispatch(DrawerEvent::Close)
            >
                <aside
                    data-name="WidgetEditorDrawer"
                    class="flex h-full w-full max-w-md flex-col gap-4 overflow-y-auto border-l border-border bg-background p-4 shadow-lg"
                    on:click=|ev: web_sys::MouseEvent| ev.stop_propagation()
                >
                    <div class="flex items-center justify-between">
                        <h2 class="text-base font-semibold">{heading}</h2>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Icon
                            attr:aria-label="Close"
                            on:click=move |_| drawer.dispatch(DrawerEvent::Close)
                        >
                            <X class="size-4" />
                        </Button>
                    </div>

                    {move || showing_options.get().then(|| view! {
                        <WidgetOptions engagement_id=engagement_id widgets=widgets drawer=drawer />
                    })}

                    {move || current_widget.get().map(|(_, widget_id)| view! {
                        <WidgetEditor widget_id=widget_id widgets=widgets drawer=drawer />
                    })}
                </aside>
            </div>
        </Show>
    }
}

/// Picks a widget type. Types without a backing widget are created first.
#[component]
fn WidgetOptions(engagement_id: i64, widgets: ListStore<Widget>, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let creating: RwSignal<Option<WidgetType>> = RwSignal::new(None);

    let on_pick = move |widget_type: WidgetType| {
        if creating.get_untracked().is_some() {
            return;
        }

        let existing = find_widget(&widgets.get_untracked(), widget_type).map(|w| w.id);
        if existing.is_some() {
            drawer.dispatch(DrawerEvent::Select {
                widget_type,
                widget_id: existing,
            });
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        let notifier = app_state.0.notifier;
        let req = CreateWidgetRequest {
            engagement_id,
            widget_type,
            title: widget_type.label().to_string(),
        };

        creating.set(Some(widget_type));
        spawn_local(async move {
            match api_client.create_widget(&req).await {
                Ok(widget) => {
                    tracing::info!(widget_id = widget.id, ?widget_type, "widget created");
                    let widget_id = Some(widget.id);
                    widgets.upsert(widget);
                    drawer.dispatch(DrawerEvent::Select {
                        widget_type,
                        widget_id,
                    });
                }
                Err(e) => notifier.error(format!("Could not add the {} widget: {e}", widget_type.label())),
            }
            creating.set(None);
        });
    };

    view! {
        <div class="flex flex-col gap-2">
            {WidgetType::iter()
                .map(|widget_type| {
                    let added = move || find_widget(&widgets.get(), widget_type).is_some();
                    view! {
                        <button
                            class="flex flex-col items-start gap-1 rounded-md border border-border px-3 py-2 text-left hover:bg-accent disabled:opacity-50"
                            disabled=move || creating.get().is_some()
                            on:click=move |_| on_pick(widget_type)
                        >
                            <span class="flex w-full items-center justify-between text-sm font-medium">
                                {widget_type.label()}
                                <Show when=move || creating.get() == Some(widget_type) fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                <Show when=added fallback=|| ().into_view()>
                                    <span class="text-xs text-muted-foreground">"Added"</span>
                                </Show>
                            </span>
                            <span class="text-xs text-muted-foreground">{widget_type.description()}</span>
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

/// One arm per widget type.
#[component]
fn WidgetEditor(widget_id: i64, widgets: ListStore<Widget>, drawer: WidgetDrawer) -> impl IntoView {
    let Some(widget) = widgets.find(widget_id) else {
        return view! { <p class="text-sm text-muted-foreground">"This widget no longer exists."</p> }
            .into_any();
    };

    let hint = match editor_kind(widget.widget_type) {
        EditorKind::ItemList => "Drag items to change the order shown to the public.",
        EditorKind::SingleRecord => "Changes are published when you save.",
        EditorKind::TitleOnly => "Phases are always shown first on the engagement page.",
    };

    let body = match widget.widget_type {
        WidgetType::WhoIsListening => {
            view! { <contacts::ContactsBlock widget=widget widgets=widgets drawer=drawer /> }.into_any()
        }
        WidgetType::Phases => view! { <TitleForm widget=widget widgets=widgets drawer=drawer /> }.into_any(),
        WidgetType::Subscribe => view! { <subscribe::SubscribeBlock widget=widget drawer=drawer /> }.into_any(),
        WidgetType::Events => view! { <events::EventsBlock widget=widget drawer=drawer /> }.into_any(),
        WidgetType::Documents => view! { <documents::DocumentsBlock widget=widget drawer=drawer /> }.into_any(),
        WidgetType::Map => view! { <map::MapForm widget=widget drawer=drawer /> }.into_any(),
        WidgetType::Video => view! { <video::VideoForm widget=widget drawer=drawer /> }.into_any(),
        WidgetType::Timeline => view! { <timeline::TimelineForm widget=widget drawer=drawer /> }.into_any(),
        WidgetType::Poll => view! { <poll::PollForm widget=widget drawer=drawer /> }.into_any(),
    };

    view! {
        <div class="flex flex-col gap-4">
            <p class="text-xs text-muted-foreground">{hint}</p>
            {body}
        </div>
    }
    .into_any()
}

/// Rename a widget. Used on its own for Phases, which has no other settings.
#[component]
fn TitleForm(widget: Widget, widgets: ListStore<Widget>, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let title: RwSignal<String> = RwSignal::new(widget.title.clone());
    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());
    let saving: RwSignal<bool> = RwSignal::new(false);
    let original = StoredValue::new(widget);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let before = original.get_value();
        let mut edited = before.clone();
        edited.title = title.get_untracked().trim().to_string();

        if let Err(e) = validate_widget(&edited) {
            errors.set(e);
            return;
        }
        errors.set(FieldErrors::default());

        let Some(patch) = patch_diff(&before, &edited) else {
            drawer.dispatch(DrawerEvent::SaveAndClose);
            return;
        };

        let api_client = app_state.0.api_client.get_untracked();
        let notifier = app_state.0.notifier;
        saving.set(true);
        spawn_local(async move {
            match api_client
                .update_widget(edited.engagement_id, edited.id, &patch)
                .await
            {
                Ok(saved) => {
                    widgets.upsert(saved);
                    notifier.success("Widget saved");
                    drawer.dispatch(DrawerEvent::SaveAndClose);
                }
                Err(e) => notifier.error(format!("Could not save the widget: {e}")),
            }
            saving.set(false);
        });
    };

    view! {
        <form class="flex flex-col gap-4" on:submit=on_submit>
            <FormField label="Title" html_for="widget-title" error=field_error(errors, "title")>
                <Input id="widget-title" bind_value=title invalid=field_invalid(errors, "title") />
            </FormField>
            <SaveCancel saving=saving drawer=drawer />
        </form>
    }
}

/// Footer shared by every drawer form.
#[component]
pub(crate) fn SaveCancel(
    #[prop(into)] saving: Signal<bool>,
    drawer: WidgetDrawer,
) -> impl IntoView {
    view! {
        <div class="flex items-center justify-end gap-2 pt-2">
            // Plain button: inside a form the default type would submit.
            <button
                type="button"
                class=OUTLINE_SM
                disabled=move || saving.get()
                on:click=move |_| drawer.dispatch(DrawerEvent::Close)
            >
                "Cancel"
            </button>
            <Button size=ButtonSize::Sm attr:disabled=move || saving.get()>
                <span class="inline-flex items-center gap-2">
                    <Show when=move || saving.get() fallback=|| ().into_view()>
                        <Spinner />
                    </Show>
                    "Save"
                </span>
            </Button>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallToActionType, EventType};

    fn widget(id: i64, widget_type: WidgetType) -> Widget {
        Widget {
            id,
            engagement_id: 1,
            widget_type,
            title: widget_type.label().to_string(),
            sort_index: id,
            items: vec![],
        }
    }

    #[test]
    fn test_every_type_has_an_editor() {
        let lists: Vec<_> = WidgetType::iter()
            .filter(|t| editor_kind(*t) == EditorKind::ItemList)
            .collect();
        assert_eq!(
            lists,
            vec![
                WidgetType::WhoIsListening,
                WidgetType::Subscribe,
                WidgetType::Events,
                WidgetType::Documents
            ]
        );
        assert_eq!(editor_kind(WidgetType::Phases), EditorKind::TitleOnly);
        assert_eq!(editor_kind(WidgetType::Poll), EditorKind::SingleRecord);
    }

    #[test]
    fn test_find_widget_by_type() {
        let widgets = vec![widget(1, WidgetType::Phases), widget(2, WidgetType::Documents)];
        assert_eq!(find_widget(&widgets, WidgetType::Documents).map(|w| w.id), Some(2));
        assert!(find_widget(&widgets, WidgetType::Map).is_none());
    }

    #[test]
    fn test_select_options_use_wire_values() {
        let opts = select_options::<EventType>(events::event_type_label);
        assert_eq!(opts, vec![("in_person", "In person"), ("virtual", "Virtual")]);

        let opts = select_options::<CallToActionType>(subscribe::call_to_action_label);
        assert_eq!(opts[1].0, "button");
    }
}
