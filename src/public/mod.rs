//! Read-only rendering of an engagement's widgets for the public page.

use crate::api::ApiResult;
use crate::components::ui::{Card, CardContent, CardHeader, CardTitle, Spinner};
use crate::models::{
    sorted_by_index, CallToActionType, Contact, Engagement, EngagementEvent, EventType, Poll, PollStatus,
    SubscribeOption, Timeline, TimelineStatus, Widget, WidgetDocument, WidgetType,
};
use crate::state::{AppContext, ListStore};
use crate::widgets::contacts::contacts_in_widget;
use crate::widgets::events::schedule_summary;
use crate::widgets::timeline::{normalized_events, status_label};
use crate::widgets::video::embed_url;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;

/// Display order: pinned widgets first, then by `sort_index`.
pub(crate) fn public_order(widgets: &[Widget]) -> Vec<Widget> {
    let mut out = sorted_by_index(widgets, |w| w.sort_index);
    out.sort_by_key(|w| !w.widget_type.is_pinned());
    out
}

/// OpenStreetMap link centred on a marker.
pub(crate) fn map_link(latitude: f64, longitude: f64) -> String {
    format!("https://www.openstreetmap.org/?mlat={latitude}&mlon={longitude}#map=15/{latitude}/{longitude}")
}

fn load_record<T: Send + Sync + 'static>(
    fetch: impl Future<Output = ApiResult<Option<T>>> + 'static,
) -> (RwSignal<Option<T>>, RwSignal<bool>) {
    let record: RwSignal<Option<T>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(true);
    spawn_local(async move {
        match fetch.await {
            Ok(r) => record.set(r),
            Err(e) => tracing::warn!(kind = ?e.kind, "public widget load failed: {e}"),
        }
        loading.set(false);
    });
    (record, loading)
}

#[component]
pub fn PublicWidgets(engagement: Engagement, widgets: Vec<Widget>) -> impl IntoView {
    let status = engagement.status.clone();

    view! {
        <div class="flex flex-col gap-4" data-name="PublicWidgets">
            {public_order(&widgets)
                .into_iter()
                .map(|widget| {
                    let title = widget.title.clone();
                    let body = match widget.widget_type {
                        WidgetType::WhoIsListening => view! { <PublicContacts widget=widget /> }.into_any(),
                        WidgetType::Phases => view! { <PublicPhases status=status.clone() /> }.into_any(),
                        WidgetType::Subscribe => view! { <PublicSubscribe widget=widget /> }.into_any(),
                        WidgetType::Events => view! { <PublicEvents widget=widget /> }.into_any(),
                        WidgetType::Documents => view! { <PublicDocuments widget=widget /> }.into_any(),
                        WidgetType::Map => view! { <PublicMap widget=widget /> }.into_any(),
                        WidgetType::Video => view! { <PublicVideo widget=widget /> }.into_any(),
                        WidgetType::Timeline => view! { <PublicTimeline widget=widget /> }.into_any(),
                        WidgetType::Poll => view! { <PublicPoll widget=widget /> }.into_any(),
                    };
                    view! {
                        <Card>
                            <CardHeader>
                                <CardTitle>{title}</CardTitle>
                            </CardHeader>
                            <CardContent>{body}</CardContent>
                        </Card>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
fn PublicPhases(status: String) -> impl IntoView {
    let status = if status.trim().is_empty() { "Open".to_string() } else { status };
    view! {
        <div class="flex items-center gap-2 text-sm">
            "Current status:"
            <span class="rounded-full border px-2 py-0.5 text-xs font-medium">{status}</span>
        </div>
    }
}

#[component]
fn PublicContacts(widget: Widget) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let store = ListStore::<Contact>::new();
    let api_client = app_state.0.api_client.get_untracked();
    let links = widget.items.clone();
    store.load(async move {
        api_client
            .list_contacts()
            .await
            .map(|all| contacts_in_widget(&all, &links))
    });

    view! {
        <Show when=move || !store.loading.get() fallback=|| view! { <Spinner /> }>
            <ul class="grid gap-3 sm:grid-cols-2">
                <For
                    each=move || store.get()
                    key=|c| c.id
                    children=move |c| view! {
                        <li class="flex flex-col gap-0.5 text-sm">
                            <span class="font-medium">{c.name}</span>
                            <span class="text-xs text-muted-foreground">{c.title}</span>
                            <a class="text-xs text-primary" href=format!("mailto:{}", c.email)>{c.email.clone()}</a>
                            <span class="text-xs">{c.phone_number}</span>
                            <p class="text-xs text-muted-foreground">{c.bio}</p>
                        </li>
                    }
                />
            </ul>
        </Show>
    }
}

#[component]
fn PublicDocuments(widget: Widget) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let store = ListStore::<WidgetDocument>::new();
    let api_client = app_state.0.api_client.get_untracked();
    let widget_id = widget.id;
    store.load(async move {
        api_client
            .list_documents(widget_id)
            .await
            .map(|docs| sorted_by_index(&docs, |d| d.sort_index))
    });

    view! {
        <Show when=move || !store.loading.get() fallback=|| view! { <Spinner /> }>
            <ul class="flex flex-col gap-1 text-sm">
                <For
                    each=move || store.get()
                    key=|d| d.id
                    children=move |d| view! {
                        <li>
                            <a class="text-primary underline-offset-4 hover:underline" href=d.url target="_blank" rel="noopener">
                                {d.title}
                            </a>
                        </li>
                    }
                />
            </ul>
        </Show>
    }
}

#[component]
fn PublicEvents(widget: Widget) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let store = ListStore::<EngagementEvent>::new();
    let api_client = app_state.0.api_client.get_untracked();
    let widget_id = widget.id;
    store.load(async move {
        api_client
            .list_events(widget_id)
            .await
            .map(|events| sorted_by_index(&events, |e| e.sort_index))
    });

    view! {
        <Show when=move || !store.loading.get() fallback=|| view! { <Spinner /> }>
            <ul class="flex flex-col gap-3 text-sm">
                <For
                    each=move || store.get()
                    key=|e| e.id
                    children=move |e| {
                        let item = e.items.first().cloned().unwrap_or_default();
                        let when = schedule_summary(&item);
                        let place = match e.event_type {
                            EventType::InPerson => view! {
                                <span class="text-xs">{item.location_name.clone()} " " {item.location_address.clone()}</span>
                            }
                            .into_any(),
                            EventType::Virtual => {
                                let label = if item.url_label.is_empty() { "Join online".to_string() } else { item.url_label.clone() };
                                view! { <a class="text-xs text-primary" href=item.url.clone() target="_blank" rel="noopener">{label}</a> }
                                    .into_any()
                            }
                        };
                        view! {
                            <li class="flex flex-col gap-0.5">
                                <span class="font-medium">{e.title}</span>
                                <span class="text-xs text-muted-foreground">{when}</span>
                                {place}
                                <p class="text-xs text-muted-foreground">{item.description.clone()}</p>
                            </li>
                        }
                    }
                />
            </ul>
        </Show>
    }
}

#[component]
fn PublicSubscribe(widget: Widget) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let store = ListStore::<SubscribeOption>::new();
    let api_client = app_state.0.api_client.get_untracked();
    let widget_id = widget.id;
    store.load(async move {
        api_client
            .list_subscribe_options(widget_id)
            .await
            .map(|options| sorted_by_index(&options, |o| o.sort_index))
    });

    view! {
        <Show when=move || !store.loading.get() fallback=|| view! { <Spinner /> }>
            <div class="flex flex-col gap-3 text-sm">
                <For
                    each=move || store.get()
                    key=|o| o.id
                    children=move |o| {
                        let cta = match o.call_to_action_type {
                            CallToActionType::Link => view! {
                                <a class="text-primary underline-offset-4 hover:underline" href="#subscribe">{o.call_to_action_text.clone()}</a>
                            }
                            .into_any(),
                            CallToActionType::Button => view! {
                                <button class="w-fit rounded-md bg-primary px-3 py-1.5 text-sm text-primary-foreground">
                                    {o.call_to_action_text.clone()}
                                </button>
                            }
                            .into_any(),
                        };
                        view! {
                            <div class="flex flex-col gap-1">
                                <p>{o.description}</p>
                                {cta}
                            </div>
                        }
                    }
                />
            </div>
        </Show>
    }
}

#[component]
fn PublicMap(widget: Widget) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let api_client = app_state.0.api_client.get_untracked();
    let widget_id = widget.id;
    let (map, loading) = load_record(async move { api_client.get_map(widget_id).await });

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            {move || map.get().map(|m| view! {
                <div class="flex flex-col gap-1 text-sm">
                    <span class="font-medium">{m.marker_label.clone()}</span>
                    <a class="text-xs text-primary" href=map_link(m.latitude, m.longitude) target="_blank" rel="noopener">
                        {format!("{:.5}, {:.5}", m.latitude, m.longitude)}
                    </a>
                    <p class="text-xs text-muted-foreground">{m.description.clone()}</p>
                </div>
            })}
        </Show>
    }
}

#[component]
fn PublicVideo(widget: Widget) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let api_client = app_state.0.api_client.get_untracked();
    let widget_id = widget.id;
    let (video, loading) = load_record(async move { api_client.get_video(widget_id).await });

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            {move || video.get().map(|v| view! {
                <div class="flex flex-col gap-2">
                    <iframe
                        class="aspect-video w-full rounded-md border"
                        src=embed_url(&v.video_url)
                        title=v.title.clone()
                        allowfullscreen=true
                    ></iframe>
                    <p class="text-xs text-muted-foreground">{v.description.clone()}</p>
                </div>
            })}
        </Show>
    }
}

#[component]
fn PublicTimeline(widget: Widget) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let api_client = app_state.0.api_client.get_untracked();
    let widget_id = widget.id;
    let (timeline, loading) = load_record(async move { api_client.get_timeline(widget_id).await });

    let marker = |s: TimelineStatus| match s {
        TimelineStatus::Completed => "bg-primary",
        TimelineStatus::InProgress => "bg-primary/50",
        TimelineStatus::Pending => "bg-border",
    };

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            {move || timeline.get().map(|t: Timeline| view! {
                <div class="flex flex-col gap-3 text-sm">
                    <p class="text-xs text-muted-foreground">{t.description.clone()}</p>
                    <ol class="flex flex-col gap-2">
                        {normalized_events(&t.events)
                            .into_iter()
                            .map(|e| view! {
                                <li class="flex items-start gap-2">
                                    <span class=format!("mt-1 size-2 shrink-0 rounded-full {}", marker(e.status))></span>
                                    <div class="flex flex-col">
                                        <span>{e.description}</span>
                                        <span class="text-xs text-muted-foreground">
                                            {e.time} " · " {status_label(e.status)}
                                        </span>
                                    </div>
                                </li>
                            })
                            .collect_view()}
                    </ol>
                </div>
            })}
        </Show>
    }
}

#[component]
fn PublicPoll(widget: Widget) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let api_client = app_state.0.api_client.get_untracked();
    let widget_id = widget.id;
    let (poll, loading) = load_record(async move { api_client.get_poll(widget_id).await });

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            {move || poll.get().map(|p: Poll| {
                let closed = p.status == PollStatus::Inactive;
                let name = format!("poll-{}", p.id);
                view! {
                    <fieldset class="flex flex-col gap-2 text-sm" disabled=closed>
                        <legend class="font-medium">{p.title.clone()}</legend>
                        <p class="text-xs text-muted-foreground">{p.description.clone()}</p>
                        {p.answers
                            .iter()
                            .map(|a| view! {
                                <label class="flex items-center gap-2">
                                    <input type="radio" name=name.clone() value=a.id.to_string() />
                                    {a.answer_text.clone()}
                                </label>
                            })
                            .collect_view()}
                        <Show when=move || closed fallback=|| ().into_view()>
                            <p class="text-xs text-muted-foreground">"This poll is closed."</p>
                        </Show>
                    </fieldset>
                }
            })}
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(id: i64, widget_type: WidgetType, sort_index: i64) -> Widget {
        Widget {
            id,
            engagement_id: 1,
            widget_type,
            title: String::new(),
            sort_index,
            items: vec![],
        }
    }

    #[test]
    fn test_public_order_pins_phases_first() {
        let widgets = vec![
            widget(1, WidgetType::Documents, 2),
            widget(2, WidgetType::Map, 1),
            widget(3, WidgetType::Phases, 5),
            widget(4, WidgetType::Poll, 3),
        ];
        let ids: Vec<_> = public_order(&widgets).iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_map_link() {
        assert_eq!(
            map_link(48.5, -123.25),
            "https://www.openstreetmap.org/?mlat=48.5&mlon=-123.25#map=15/48.5/-123.25"
        );
    }
}
