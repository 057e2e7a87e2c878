mod list_store;
mod sort_sync;

pub(crate) use list_store::ListStore;
pub(crate) use sort_sync::{handle_drag_end, use_sort_sync, SortableEntity};

use crate::api::ApiClient;
use crate::notifications::Notifier;
use leptos::prelude::*;

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// App-wide toast channel; every persistence failure ends up here.
    pub notifier: Notifier,
}

impl AppState {
    pub fn new() -> Self {
        let client = ApiClient::load_from_storage();
        if !client.is_authenticated() {
            tracing::info!("no stored token, requests go out without Authorization");
        }
        Self {
            api_client: RwSignal::new(client),
            notifier: Notifier::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
