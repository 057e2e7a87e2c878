use crate::notifications::Toasts;
use crate::pages::{EngagementFormPage, EngagementListPage, EngagementViewPage};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    let notifier = state.notifier;
    provide_context(AppContext(state));

    // Router hooks (`use_params`) need the <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("engagements/:engagement_id/form") view=EngagementFormPage />
                <Route path=path!("engagements/:slug/view") view=EngagementViewPage />
                <Route path=path!("") view=EngagementListPage />
            </Routes>
        </Router>
        <Toasts notifier=notifier />
    }
}
