use crate::api::{ApiClient, ApiResult};
use crate::notifications::Notifier;
use crate::ordering::debounce::{TrailingDebounce, SORT_DEBOUNCE_MS};
use crate::ordering::{apply_drag_end, order_to_persist, DragEnd, OrderedItem};
use crate::state::{AppState, ListStore};
use crate::util::{clear_timeout, now_ms, set_timeout, window_listener};
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// An entity whose order can be saved with a single "set sort order" call.
pub(crate) trait SortableEntity: OrderedItem + Clone + Send + Sync + 'static {
    /// Human-readable name used in notifications and logs.
    const LABEL: &'static str;

    /// Send the full ordered list belonging to `scope_id` (a widget or engagement id).
    fn persist_order(
        api: ApiClient,
        scope_id: i64,
        items: Vec<Self>,
    ) -> impl Future<Output = ApiResult<()>> + 'static;
}

/// Debounced "save order" for one list.
///
/// Every `schedule` restarts an 800ms quiet period. When it elapses the store's
/// list at that moment is persisted exactly once, so deletes and additions made
/// after the drag are part of what gets saved. The local list is never rolled
/// back when saving fails.
pub(crate) struct SortSync<E: SortableEntity> {
    scope_id: i64,
    api_client: RwSignal<ApiClient>,
    notifier: Notifier,
    store: ListStore<E>,

    pending: Arc<Mutex<TrailingDebounce<()>>>,
    timer_id: Arc<Mutex<Option<i32>>>,

    /// True while a persist request is on the wire.
    pub saving: RwSignal<bool>,
}

impl<E: SortableEntity> Clone for SortSync<E> {
    fn clone(&self) -> Self {
        Self {
            scope_id: self.scope_id,
            api_client: self.api_client,
            notifier: self.notifier,
            store: self.store,
            pending: Arc::clone(&self.pending),
            timer_id: Arc::clone(&self.timer_id),
            saving: self.saving,
        }
    }
}

impl<E: SortableEntity> SortSync<E> {
    pub fn new(app_state: &AppState, store: ListStore<E>, scope_id: i64) -> Self {
        Self {
            scope_id,
            api_client: app_state.api_client,
            notifier: app_state.notifier,
            store,
            pending: Arc::new(Mutex::new(TrailingDebounce::new(SORT_DEBOUNCE_MS as i64))),
            timer_id: Arc::new(Mutex::new(None)),
            saving: RwSignal::new(false),
        }
    }

    /// Mark the order dirty and restart the quiet period.
    pub fn schedule(&self) {
        if let Ok(mut p) = self.pending.lock() {
            p.push(now_ms(), ());
        }
        tracing::debug!(entity = E::LABEL, scope_id = self.scope_id, "sort order queued");
        self.arm(SORT_DEBOUNCE_MS);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().map(|p| p.is_pending()).unwrap_or(false)
    }

    /// Send the current order right away if one is queued.
    pub fn flush(&self) {
        self.disarm();
        let queued = self.pending.lock().ok().and_then(|mut p| p.flush());
        if queued.is_some() {
            self.persist();
        }
    }

    /// Drop a queued save without sending it. Returns whether one was queued.
    ///
    /// Used when another request already carries the full order.
    pub fn discard(&self) -> bool {
        self.disarm();
        self.pending
            .lock()
            .ok()
            .and_then(|mut p| p.cancel())
            .is_some()
    }

    /// Stop the timer. A queued order is dropped; the drop is logged so it can be traced.
    pub fn teardown(&self) {
        if self.discard() {
            tracing::warn!(
                entity = E::LABEL,
                scope_id = self.scope_id,
                "unsaved sort order discarded on teardown"
            );
        }
    }

    fn arm(&self, delay_ms: i32) {
        self.disarm();

        let s2 = self.clone();
        let tid = set_timeout(delay_ms, move || s2.on_timer());

        if let Ok(mut slot) = self.timer_id.lock() {
            *slot = tid;
        }
    }

    fn disarm(&self) {
        let tid = self.timer_id.lock().ok().and_then(|mut slot| slot.take());
        if let Some(tid) = tid {
            clear_timeout(tid);
        }
    }

    fn on_timer(&self) {
        if let Ok(mut slot) = self.timer_id.lock() {
            *slot = None;
        }

        let now = now_ms();
        let (due, remaining) = match self.pending.lock() {
            Ok(mut p) => {
                let due = p.take_due(now);
                (due, p.remaining_ms(now))
            }
            Err(_) => return,
        };

        match (due, remaining) {
            (Some(()), _) => self.persist(),
            // Timer fired early (clock rounding); wait out the rest.
            (None, Some(left)) => self.arm(left.max(1) as i32),
            (None, None) => {}
        }
    }

    fn persist(&self) {
        let items = order_to_persist(&self.store.get_untracked());
        let api_client = self.api_client.get_untracked();
        let notifier = self.notifier;
        let scope_id = self.scope_id;
        let saving = self.saving;
        let count = items.len();

        saving.set(true);
        spawn_local(async move {
            match E::persist_order(api_client, scope_id, items).await {
                Ok(()) => {
                    tracing::info!(entity = E::LABEL, scope_id, count, "sort order saved");
                }
                Err(e) => {
                    notifier.error(format!("Could not save the {} order: {e}", E::LABEL));
                }
            }
            saving.set(false);
        });
    }
}

/// Create the debounced sort for `store` and tie its teardown to the current owner.
///
/// Leaving the page sends a queued order right away; unmounting the list drops it.
pub(crate) fn use_sort_sync<E: SortableEntity>(
    app_state: &AppState,
    store: ListStore<E>,
    scope_id: i64,
) -> SortSync<E> {
    let sync = SortSync::<E>::new(app_state, store, scope_id);

    let s2 = sync.clone();
    window_listener(ev::pagehide, move |_ev: web_sys::PageTransitionEvent| {
        if s2.is_pending() {
            s2.flush();
        }
    });

    let s3 = sync.clone();
    on_cleanup(move || s3.teardown());
    sync
}

/// Apply a finished drag to the store right away, then queue the order for saving.
pub(crate) fn handle_drag_end<E: SortableEntity>(sync: &SortSync<E>, drag: DragEnd) {
    let store = sync.store;
    match apply_drag_end(&store.get_untracked(), drag) {
        Ok(Some(next)) => {
            store.set(next);
            sync.schedule();
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(entity = E::LABEL, "ignoring drag: {e}");
        }
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use std::cell::RefCell;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    thread_local! {
        static SENT: RefCell<Vec<(i64, Vec<i64>)>> = const { RefCell::new(Vec::new()) };
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: i64,
        position: usize,
    }

    impl OrderedItem for Row {
        fn item_id(&self) -> i64 {
            self.id
        }

        fn set_position(&mut self, position: usize) {
            self.position = position;
        }
    }

    impl SortableEntity for Row {
        const LABEL: &'static str = "row";

        fn persist_order(
            _api: ApiClient,
            scope_id: i64,
            items: Vec<Self>,
        ) -> impl Future<Output = ApiResult<()>> + 'static {
            let ids: Vec<i64> = items.iter().map(|r| r.id).collect();
            async move {
                SENT.with(|s| s.borrow_mut().push((scope_id, ids)));
                Ok(())
            }
        }
    }

    fn rows(ids: &[i64]) -> Vec<Row> {
        ids.iter()
            .enumerate()
            .map(|(position, id)| Row { id: *id, position })
            .collect()
    }

    fn sent_for(scope_id: i64) -> Vec<Vec<i64>> {
        SENT.with(|s| {
            s.borrow()
                .iter()
                .filter(|(scope, _)| *scope == scope_id)
                .map(|(_, ids)| ids.clone())
                .collect()
        })
    }

    async fn sleep(ms: i32) {
        let (tx, rx) = futures::channel::oneshot::channel::<()>();
        set_timeout(ms, move || {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }

    fn sync_over(ids: &[i64], scope_id: i64) -> SortSync<Row> {
        let store = ListStore::<Row>::new();
        store.set(rows(ids));
        SortSync::new(&AppState::new(), store, scope_id)
    }

    #[wasm_bindgen_test]
    async fn test_burst_sends_latest_order_once() {
        let sync = sync_over(&[1, 2, 3, 4], 101);

        handle_drag_end(&sync, DragEnd::dropped(0, 1));
        sleep(200).await;
        handle_drag_end(&sync, DragEnd::dropped(3, 0));
        sleep(200).await;
        handle_drag_end(&sync, DragEnd::cancelled(2));
        assert!(sync_sent_nothing(101));

        sleep(SORT_DEBOUNCE_MS + 300).await;
        assert_eq!(sent_for(101), vec![vec![4, 2, 1, 3]]);
        assert!(!sync.is_pending());
    }

    fn sync_sent_nothing(scope_id: i64) -> bool {
        sent_for(scope_id).is_empty()
    }

    #[wasm_bindgen_test]
    async fn test_delete_while_pending_is_not_resent() {
        let sync = sync_over(&[1, 2, 3], 102);

        handle_drag_end(&sync, DragEnd::dropped(2, 0));
        sync.store.remove(1);

        sleep(SORT_DEBOUNCE_MS + 300).await;
        assert_eq!(sent_for(102), vec![vec![3, 2]]);
    }

    #[wasm_bindgen_test]
    async fn test_discard_drops_queued_order() {
        let sync = sync_over(&[1, 2], 103);

        handle_drag_end(&sync, DragEnd::dropped(0, 1));
        assert!(sync.discard());
        assert!(!sync.discard());

        sleep(SORT_DEBOUNCE_MS + 300).await;
        assert!(sync_sent_nothing(103));
    }

    #[wasm_bindgen_test]
    async fn test_teardown_discards_and_flush_sends_now() {
        let torn = sync_over(&[1, 2], 104);
        handle_drag_end(&torn, DragEnd::dropped(0, 1));
        torn.teardown();

        let flushed = sync_over(&[1, 2], 105);
        handle_drag_end(&flushed, DragEnd::dropped(1, 0));
        flushed.flush();
        sleep(10).await;
        assert_eq!(sent_for(105), vec![vec![2, 1]]);

        sleep(SORT_DEBOUNCE_MS + 300).await;
        assert!(sync_sent_nothing(104));
        assert_eq!(sent_for(105).len(), 1);
    }

    #[wasm_bindgen_test]
    async fn test_unmount_tears_down_pending_order() {
        let owner = Owner::new();
        let sync = owner.with(|| {
            let store = ListStore::<Row>::new();
            store.set(rows(&[1, 2, 3]));
            use_sort_sync(&AppState::new(), store, 106)
        });

        handle_drag_end(&sync, DragEnd::dropped(0, 2));
        assert!(sync.is_pending());
        owner.cleanup();
        assert!(!sync.is_pending());

        sleep(SORT_DEBOUNCE_MS + 300).await;
        assert!(sync_sent_nothing(106));
    }
}
