use crate::components::sortable_list::SortableList;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, ConfirmDialog, Spinner};
use crate::drawer::{DrawerEvent, WidgetDrawer};
use crate::models::Widget;
use crate::ordering::DragEnd;
use crate::state::{handle_drag_end, use_sort_sync, AppContext, ListStore};
use crate::widgets::open_widget;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// The engagement's widgets: Phases pinned on top, the rest draggable.
#[component]
pub fn WidgetsBlock(engagement_id: i64, widgets: ListStore<Widget>, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let sync = use_sort_sync::<Widget>(&app_state.0, widgets, engagement_id);
    let saving_order = sync.saving;

    let pending_delete: RwSignal<Option<Widget>> = RwSignal::new(None);
    let delete_open: RwSignal<bool> = RwSignal::new(false);
    let deleting: RwSignal<bool> = RwSignal::new(false);

    let on_drag_end = Callback::new(move |drag: DragEnd| handle_drag_end(&sync, drag));

    let ask_delete = move |w: Widget| {
        pending_delete.set(Some(w));
        delete_open.set(true);
    };

    let on_confirm_delete = Callback::new(move |_: ()| {
        let Some(w) = pending_delete.get_untracked() else {
            return;
        };
        if deleting.get_untracked() {
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        let notifier = app_state.0.notifier;
        deleting.set(true);
        spawn_local(async move {
            match api_client.delete_widget(engagement_id, w.id).await {
                Ok(()) => {
                    widgets.remove(w.id);
                    if drawer.state_untracked().widget().map(|(_, id)| id) == Some(w.id) {
                        drawer.dispatch(DrawerEvent::Close);
                    }
                    notifier.success(format!("Removed the {} widget", w.widget_type.label()));
                }
                Err(e) => notifier.error(format!("Could not remove the widget: {e}")),
            }
            deleting.set(false);
            delete_open.set(false);
            pending_delete.set(None);
        });
    });

    let delete_message = Signal::derive(move || {
        pending_delete
            .get()
            .map(|w| format!("\"{}\" and everything in it will be removed from this engagement.", w.title))
            .unwrap_or_default()
    });

    view! {
        <section class="flex flex-col gap-3" data-name="WidgetsBlock">
            <div class="flex items-center justify-between">
                <div class="flex items-center gap-2 text-sm font-medium">
                    "Widgets"
                    <Show when=move || saving_order.get() fallback=|| ().into_view()>
                        <Spinner class="size-3" />
                    </Show>
                </div>
                <Button
                    size=ButtonSize::Sm
                    on:click=move |_| drawer.dispatch(DrawerEvent::Open { existing: None })
                >
                    "Add widget"
                </Button>
            </div>

            <Show when=move || widgets.loading.get() fallback=|| ().into_view()>
                <div class="flex items-center gap-2 text-xs text-muted-foreground">
                    <Spinner /> "Loading widgets..."
                </div>
            </Show>

            {move || widgets.error.get().map(|e| view! { <p class="text-xs text-destructive">{e}</p> })}

            <For
                each=move || widgets.fixed()
                key=|w| w.id
                children=move |w| {
                    view! {
                        <div class="flex items-center gap-2 rounded-md border border-dashed bg-muted/30 px-2 py-2">
                            <span class="px-1 text-xs text-muted-foreground">"Pinned"</span>
                            <div class="min-w-0 flex-1">
                                <WidgetPaper widget=w drawer=drawer on_delete=Callback::new(ask_delete) />
                            </div>
                        </div>
                    }
                }
            />

            <SortableList
                items=Signal::derive(move || widgets.sortable())
                on_drag_end=on_drag_end
                render_item=move |w: Widget| view! {
                    <WidgetPaper widget=w drawer=drawer on_delete=Callback::new(ask_delete) />
                }
                empty_text="No widgets yet. Use \"Add widget\" to start building the page."
            />

            <ConfirmDialog
                open=delete_open
                title="Remove widget?"
                message=delete_message
                confirm_label="Remove"
                busy=deleting
                on_confirm=on_confirm_delete
            />
        </section>
    }
}

#[component]
fn WidgetPaper(widget: Widget, drawer: WidgetDrawer, on_delete: Callback<Widget>) -> impl IntoView {
    let label = widget.widget_type.label();
    let title = widget.title.clone();
    let for_edit = widget.clone();

    view! {
        <div class="flex items-center justify-between gap-2">
            <div class="min-w-0">
                <div class="truncate text-sm font-medium">{title}</div>
                <div class="text-xs text-muted-foreground">{label}</div>
            </div>
            <div class="flex shrink-0 items-center gap-1">
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    on:click=move |_| open_widget(drawer, &for_edit)
                >
                    "Edit"
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    class="text-destructive"
                    on:click=move |_| on_delete.run(widget.clone())
                >
                    "Remove"
                </Button>
            </div>
        </div>
    }
}
