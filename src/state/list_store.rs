use crate::api::ApiResult;
use crate::ordering::{has_unique_ids, remove_by_id, upsert_by_id, OrderedItem};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;

/// Owned, observable list of one entity kind for one view.
///
/// Passed down as a prop instead of being looked up from context, so the owner
/// of a list is always visible at the call site. Every write replaces the vector.
pub(crate) struct ListStore<T: Send + Sync + 'static> {
    items: RwSignal<Vec<T>>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
}

impl<T: Send + Sync + 'static> Clone for ListStore<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for ListStore<T> {}

impl<T> ListStore<T>
where
    T: OrderedItem + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            items: RwSignal::new(vec![]),
            loading: RwSignal::new(false),
            error: RwSignal::new(None),
        }
    }

    /// Tracked read.
    pub fn get(&self) -> Vec<T> {
        self.items.get()
    }

    pub fn get_untracked(&self) -> Vec<T> {
        self.items.get_untracked()
    }

    pub fn len(&self) -> usize {
        self.items.with(|xs| xs.len())
    }

    pub fn set(&self, items: Vec<T>) {
        if !has_unique_ids(&items) {
            tracing::warn!(count = items.len(), "list holds duplicate ids");
        }
        self.items.set(items);
    }

    pub fn upsert(&self, item: T) {
        let next = upsert_by_id(&self.items.get_untracked(), item);
        self.items.set(next);
    }

    pub fn remove(&self, id: i64) {
        let next = remove_by_id(&self.items.get_untracked(), id);
        self.items.set(next);
    }

    pub fn find(&self, id: i64) -> Option<T> {
        self.items
            .with_untracked(|xs| xs.iter().find(|x| x.item_id() == id).cloned())
    }

    /// Replace the list with the result of `fetch`, tracking `loading` and `error`.
    pub fn load(&self, fetch: impl Future<Output = ApiResult<Vec<T>>> + 'static) {
        let store = *self;
        store.loading.set(true);
        store.error.set(None);
        spawn_local(async move {
            match fetch.await {
                Ok(items) => store.set(items),
                Err(e) => {
                    tracing::warn!(kind = ?e.kind, "list load failed: {e}");
                    store.error.set(Some(e.to_string()));
                }
            }
            store.loading.set(false);
        });
    }

    /// Only the items a user can drag, in display order.
    pub fn sortable(&self) -> Vec<T> {
        self.items
            .with(|xs| xs.iter().filter(|x| !x.is_fixed()).cloned().collect())
    }

    pub fn fixed(&self) -> Vec<T> {
        self.items
            .with(|xs| xs.iter().filter(|x| x.is_fixed()).cloned().collect())
    }
}

impl<T> Default for ListStore<T>
where
    T: OrderedItem + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
