use crate::ordering::DragEnd;
use icons::{ChevronDown, ChevronUp};
use leptos::prelude::*;

/// Vertical list whose rows can be dragged into a new order.
///
/// The list never reorders itself: it reports the finished gesture through
/// `on_drag_end` and re-renders from `items` once the owner has applied it.
/// Up/down buttons emit the same events for keyboard users.
#[component]
pub fn SortableList<T, R, IV>(
    #[prop(into)] items: Signal<Vec<T>>,
    on_drag_end: Callback<DragEnd>,
    render_item: R,
    #[prop(into, optional)] empty_text: String,
) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
    R: Fn(T) -> IV + Clone + Send + Sync + 'static,
    IV: IntoView + 'static,
{
    let drag_source: RwSignal<Option<usize>> = RwSignal::new(None);
    let drop_target: RwSignal<Option<usize>> = RwSignal::new(None);
    let dropped: RwSignal<bool> = RwSignal::new(false);

    let len = move || items.with(|xs| xs.len());
    let rows = move || items.get().into_iter().enumerate().collect::<Vec<_>>();
    let empty_text = StoredValue::new(empty_text);
    let render_item = StoredValue::new(render_item);

    view! {
        <Show
            when=move || { len() > 0 }
            fallback=move || view! {
                <div class="rounded-md border border-dashed px-3 py-6 text-center text-xs text-muted-foreground">
                    {empty_text.get_value()}
                </div>
            }
        >
            <ul class="flex flex-col gap-2" data-name="SortableList">
                // Rows are rebuilt on every change: indexes feed the handlers and an
                // edited item keeps its id, so keyed reuse would show stale rows.
                {move || rows().into_iter().map(|(idx, item)| {
                        let render = render_item.get_value();
                        view! {
                            <li
                                draggable="true"
                                class=move || {
                                    if drop_target.get() == Some(idx) && drag_source.get() != Some(idx) {
                                        "flex items-center gap-2 rounded-md border border-primary/50 bg-primary/5 px-2 py-2"
                                    } else {
                                        "flex items-center gap-2 rounded-md border bg-background px-2 py-2"
                                    }
                                }
                                on:dragstart=move |ev: web_sys::DragEvent| {
                                    drag_source.set(Some(idx));
                                    dropped.set(false);
                                    if let Some(dt) = ev.data_transfer() {
                                        // Firefox will not start a drag without a payload.
                                        if let Err(e) = dt.set_data("text/plain", &idx.to_string()) {
                                            tracing::debug!(?e, "drag payload not set");
                                        }
                                        dt.set_drop_effect("move");
                                    }
                                }
                                on:dragover=move |ev: web_sys::DragEvent| {
                                    ev.prevent_default();
                                    drop_target.set(Some(idx));
                                    if let Some(dt) = ev.data_transfer() {
                                        dt.set_drop_effect("move");
                                    }
                                }
                                on:drop=move |ev: web_sys::DragEvent| {
                                    ev.prevent_default();
                                    drop_target.set(None);
                                    let Some(source) = drag_source.get_untracked() else {
                                        return;
                                    };
                                    dropped.set(true);
                                    on_drag_end.run(DragEnd::dropped(source, idx));
                                }
                                on:dragend=move |_ev: web_sys::DragEvent| {
                                    // Released outside every row: report a cancelled drag.
                                    if !dropped.get_untracked() {
                                        if let Some(source) = drag_source.get_untracked() {
                                            on_drag_end.run(DragEnd::cancelled(source));
                                        }
                                    }
                                    drag_source.set(None);
                                    drop_target.set(None);
                                }
                            >
                                <span class="cursor-grab select-none px-1 text-muted-foreground" aria-hidden="true">
                                    "⠿"
                                </span>
                                <div class="min-w-0 flex-1">{render(item)}</div>
                                <div class="flex flex-col">
                                    <button
                                        type="button"
                                        class="rounded-sm p-0.5 text-muted-foreground hover:text-foreground disabled:opacity-30"
                                        aria-label="Move up"
                                        disabled=move || idx == 0
                                        on:click=move |_| on_drag_end.run(DragEnd::dropped(idx, idx.saturating_sub(1)))
                                    >
                                        <ChevronUp class="size-3.5" />
                                    </button>
                                    <button
                                        type="button"
                                        class="rounded-sm p-0.5 text-muted-foreground hover:text-foreground disabled:opacity-30"
                                        aria-label="Move down"
                                        disabled=move || { idx + 1 >= len() }
                                        on:click=move |_| on_drag_end.run(DragEnd::dropped(idx, idx + 1))
                                    >
                                        <ChevronDown class="size-3.5" />
                                    </button>
                                </div>
                            </li>
                        }
                    }).collect_view()}
            </ul>
        </Show>
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn host() -> web_sys::HtmlElement {
        let document = web_sys::window().and_then(|w| w.document()).expect("document");
        let el = document.create_element("div").expect("div");
        document.body().expect("body").append_child(&el).expect("append");
        el.unchecked_into()
    }

    #[wasm_bindgen_test]
    fn test_empty_list_shows_fallback_text() {
        let parent = host();
        let _mounted = leptos::mount::mount_to(parent.clone(), || {
            view! {
                <SortableList
                    items=Signal::derive(Vec::<String>::new)
                    on_drag_end=Callback::new(|_: DragEnd| {})
                    render_item=|s: String| s
                    empty_text="No documents yet"
                />
            }
        });

        let text = parent.text_content().unwrap_or_default();
        assert!(text.contains("No documents yet"));
        assert!(parent.query_selector("li").expect("query").is_none());
    }

    #[wasm_bindgen_test]
    fn test_move_down_reports_drag_and_last_row_is_disabled() {
        let parent = host();
        let seen: Arc<Mutex<Vec<DragEnd>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let _mounted = leptos::mount::mount_to(parent.clone(), move || {
            let sink = Arc::clone(&sink);
            view! {
                <SortableList
                    items=Signal::derive(|| vec!["a".to_string(), "b".to_string()])
                    on_drag_end=Callback::new(move |d: DragEnd| {
                        if let Ok(mut v) = sink.lock() {
                            v.push(d);
                        }
                    })
                    render_item=|s: String| s
                />
            }
        });

        let down: web_sys::HtmlElement = parent
            .query_selector("li button[aria-label='Move down']")
            .expect("query")
            .expect("first row has a down button")
            .unchecked_into();
        down.click();
        assert_eq!(seen.lock().map(|v| v.clone()).unwrap_or_default(), vec![DragEnd::dropped(0, 1)]);

        let last_down = parent
            .query_selector("li:last-child button[aria-label='Move down']")
            .expect("query")
            .expect("last row has a down button");
        assert!(last_down.has_attribute("disabled"));
    }
}
