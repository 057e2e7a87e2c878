use crate::api::ApiErrorKind;
use crate::components::ui::{
    Alert, AlertDescription, Card, CardContent, CardDescription, CardHeader, CardTitle, Spinner,
};
use crate::drawer::WidgetDrawer;
use crate::models::{sorted_by_index, Engagement, Widget};
use crate::public::PublicWidgets;
use crate::state::{AppContext, ListStore};
use crate::storage::{load_recent_engagements, write_recent_engagement};
use crate::widgets::list::WidgetsBlock;
use crate::widgets::WidgetEditorDrawer;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params;
use leptos_router::params::Params;

const LINK_PRIMARY: &str = "inline-flex h-8 items-center rounded-md bg-primary px-3 text-sm font-medium text-primary-foreground shadow-xs hover:bg-primary/90";
const LINK_OUTLINE: &str = "inline-flex h-8 items-center rounded-md border bg-border/30 px-3 text-sm font-medium shadow-xs hover:bg-border/50";

#[derive(Params, PartialEq, Clone, Debug)]
pub struct EngagementFormParams {
    pub engagement_id: Option<i64>,
}

#[derive(Params, PartialEq, Clone, Debug)]
pub struct EngagementViewParams {
    pub slug: Option<String>,
}

#[component]
fn ErrorAlert(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <Alert class="border-destructive/30">
            <AlertDescription class="text-destructive text-xs">{message}</AlertDescription>
        </Alert>
    }
}

/// Shown when the backend rejects the stored bearer token.
#[component]
fn SignInNotice() -> impl IntoView {
    view! {
        <ErrorAlert message="Your session is missing or has expired. Sign in again through the main site." />
    }
}

#[component]
pub fn EngagementListPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let engagements: RwSignal<Vec<Engagement>> = RwSignal::new(vec![]);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let error: RwSignal<Option<ApiErrorKind>> = RwSignal::new(None);
    let error_message: RwSignal<String> = RwSignal::new(String::new());
    let recents = StoredValue::new(load_recent_engagements());

    let api_client = app_state.0.api_client.get_untracked();
    spawn_local(async move {
        match api_client.list_engagements().await {
            Ok(list) => engagements.set(list),
            Err(e) => {
                tracing::warn!(kind = ?e.kind, "engagement list failed: {e}");
                error_message.set(e.to_string());
                error.set(Some(e.kind));
            }
        }
        loading.set(false);
    });

    view! {
        <div class="mx-auto flex w-full max-w-3xl flex-col gap-6 px-4 py-8">
            <div class="flex flex-col gap-1">
                <h1 class="text-lg font-semibold">"Engagements"</h1>
                <p class="text-sm text-muted-foreground">"Pick an engagement to edit its page or preview it."</p>
            </div>

            <Show when=move || recents.with_value(|r| !r.is_empty()) fallback=|| ().into_view()>
                <div class="flex flex-wrap items-center gap-2 text-xs">
                    <span class="text-muted-foreground">"Recent:"</span>
                    {recents
                        .get_value()
                        .into_iter()
                        .map(|r| view! {
                            <a class="rounded-full border px-2 py-0.5 hover:bg-accent" href=format!("/engagements/{}/form", r.id)>
                                {r.name}
                            </a>
                        })
                        .collect_view()}
                </div>
            </Show>

            <Show when=move || loading.get() fallback=|| ().into_view()>
                <div class="flex items-center gap-2 text-xs text-muted-foreground">
                    <Spinner /> "Loading engagements..."
                </div>
            </Show>

            {move || match error.get() {
                Some(ApiErrorKind::Unauthorized) => view! { <SignInNotice /> }.into_any(),
                Some(_) => view! { <ErrorAlert message=error_message.get() /> }.into_any(),
                None => ().into_any(),
            }}

            <div class="flex flex-col gap-3">
                <For
                    each=move || engagements.get()
                    key=|e| e.id
                    children=move |e| {
                        let form_href = format!("/engagements/{}/form", e.id);
                        let view_href = format!("/engagements/{}/view", e.slug);
                        view! {
                            <Card>
                                <CardHeader>
                                    <CardTitle>{e.name.clone()}</CardTitle>
                                    <CardDescription>{e.description.clone()}</CardDescription>
                                </CardHeader>
                                <CardContent>
                                    <div class="flex items-center gap-2">
                                        <a class=LINK_PRIMARY href=form_href>"Edit"</a>
                                        <a class=LINK_OUTLINE href=view_href>"View"</a>
                                    </div>
                                </CardContent>
                            </Card>
                        }
                    }
                />
            </div>
        </div>
    }
}

/// Authoring page: the widget list plus the editor drawer.
#[component]
pub fn EngagementFormPage() -> impl IntoView {
    let params = use_params::<EngagementFormParams>();
    let engagement_id = move || params.get().ok().and_then(|p| p.engagement_id);

    view! {
        {move || match engagement_id() {
            Some(id) => view! { <EngagementEditor engagement_id=id /> }.into_any(),
            None => view! {
                <div class="px-4 py-8"><ErrorAlert message="That engagement link is not valid." /></div>
            }
            .into_any(),
        }}
    }
}

#[component]
fn EngagementEditor(engagement_id: i64) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let engagement: RwSignal<Option<Engagement>> = RwSignal::new(None);
    let load_error: RwSignal<Option<(ApiErrorKind, String)>> = RwSignal::new(None);
    let widgets = ListStore::<Widget>::new();
    let drawer = WidgetDrawer::new();

    let api_client = app_state.0.api_client.get_untracked();
    spawn_local(async move {
        match api_client.get_engagement(engagement_id).await {
            Ok(e) => {
                write_recent_engagement(&e);
                engagement.set(Some(e));
            }
            Err(e) => {
                tracing::warn!(engagement_id, kind = ?e.kind, "engagement load failed: {e}");
                load_error.set(Some((e.kind.clone(), e.to_string())));
            }
        }
    });

    let api_client = app_state.0.api_client.get_untracked();
    widgets.load(async move {
        api_client
            .list_widgets(engagement_id)
            .await
            .map(|ws| sorted_by_index(&ws, |w| w.sort_index))
    });

    view! {
        <div class="mx-auto flex w-full max-w-3xl flex-col gap-6 px-4 py-8">
            {move || match load_error.get() {
                Some((ApiErrorKind::Unauthorized, _)) => view! { <SignInNotice /> }.into_any(),
                Some((ApiErrorKind::NotFound, _)) => view! { <ErrorAlert message="This engagement does not exist." /> }.into_any(),
                Some((_, message)) => view! { <ErrorAlert message=message /> }.into_any(),
                None => ().into_any(),
            }}

            {move || engagement.get().map(|e| {
                let view_href = format!("/engagements/{}/view", e.slug);
                view! {
                    <div class="flex items-start justify-between gap-4">
                        <div class="flex flex-col gap-1">
                            <a class="text-xs text-muted-foreground hover:underline" href="/">"All engagements"</a>
                            <h1 class="text-lg font-semibold">{e.name.clone()}</h1>
                            <p class="text-sm text-muted-foreground">{e.description.clone()}</p>
                        </div>
                        <a class=LINK_OUTLINE href=view_href>"Preview"</a>
                    </div>
                }
            })}

            <WidgetsBlock engagement_id=engagement_id widgets=widgets drawer=drawer />
            <WidgetEditorDrawer engagement_id=engagement_id widgets=widgets drawer=drawer />
        </div>
    }
}

/// Public page for an engagement, addressed by slug.
#[component]
pub fn EngagementViewPage() -> impl IntoView {
    let params = use_params::<EngagementViewParams>();
    let slug = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.slug)
            .unwrap_or_default()
    };

    view! {
        {move || {
            let slug = slug();
            if slug.trim().is_empty() {
                view! { <div class="px-4 py-8"><ErrorAlert message="That page link is not valid." /></div> }.into_any()
            } else {
                view! { <PublicEngagement slug=slug /> }.into_any()
            }
        }}
    }
}

#[component]
fn PublicEngagement(slug: String) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let loaded: RwSignal<Option<(Engagement, Vec<Widget>)>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let api_client = app_state.0.api_client.get_untracked();
    spawn_local(async move {
        let result = match api_client.get_engagement_by_slug(&slug).await {
            Ok(e) => api_client.list_widgets(e.id).await.map(|ws| (e, ws)),
            Err(e) => Err(e),
        };
        match result {
            Ok(pair) => loaded.set(Some(pair)),
            Err(e) => {
                tracing::warn!(%slug, kind = ?e.kind, "public engagement load failed: {e}");
                let message = match e.kind {
                    ApiErrorKind::NotFound => "This engagement could not be found.".to_string(),
                    _ => e.to_string(),
                };
                error.set(Some(message));
            }
        }
        loading.set(false);
    });

    view! {
        <div class="mx-auto flex w-full max-w-3xl flex-col gap-6 px-4 py-8">
            <Show when=move || loading.get() fallback=|| ().into_view()>
                <div class="flex items-center gap-2 text-xs text-muted-foreground">
                    <Spinner /> "Loading..."
                </div>
            </Show>
            {move || error.get().map(|e| view! { <ErrorAlert message=e /> })}
            {move || loaded.get().map(|(engagement, widgets)| view! {
                <div class="flex flex-col gap-1">
                    <h1 class="text-xl font-semibold">{engagement.name.clone()}</h1>
                    <p class="text-sm text-muted-foreground">{engagement.description.clone()}</p>
                </div>
                <PublicWidgets engagement=engagement widgets=widgets />
            })}
        </div>
    }
}
