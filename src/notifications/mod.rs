use crate::util::set_timeout;
use icons::X;
use leptos::prelude::*;

const AUTO_DISMISS_MS: i32 = 4_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Severity {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
}

/// Append-only queue of toasts with manual and timed dismissal.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NotificationQueue {
    next_id: u64,
    items: Vec<Notification>,
}

impl NotificationQueue {
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Notification {
            id,
            severity,
            message: message.into(),
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }
}

/// Handle for the app-wide notification channel.
#[derive(Clone, Copy)]
pub(crate) struct Notifier {
    queue: RwSignal<NotificationQueue>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            queue: RwSignal::new(NotificationQueue::default()),
        }
    }

    pub fn notify(&self, severity: Severity, message: impl Into<String>) {
        let mut id = 0;
        self.queue.update(|q| id = q.push(severity, message));

        let queue = self.queue;
        let _ = set_timeout(AUTO_DISMISS_MS, move || {
            queue.update(|q| q.dismiss(id));
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Severity::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");
        self.notify(Severity::Error, message);
    }

    pub fn dismiss(&self, id: u64) {
        self.queue.update(|q| q.dismiss(id));
    }

    pub fn items(&self) -> Vec<Notification> {
        self.queue.with(|q| q.items().to_vec())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
pub fn Toasts(notifier: Notifier) -> impl IntoView {
    view! {
        <div class="pointer-events-none fixed bottom-4 right-4 z-[200] flex w-80 flex-col gap-2">
            <For
                each=move || notifier.items()
                key=|n| n.id
                children=move |n| {
                    let tone = match n.severity {
                        Severity::Success => "border-success/40 bg-success/10",
                        Severity::Error => "border-destructive/40 bg-destructive/10 text-destructive",
                    };
                    let id = n.id;
                    view! {
                        <div
                            role="status"
                            class=format!("pointer-events-auto flex items-start gap-2 rounded-md border px-3 py-2 text-sm shadow-sm {tone}")
                        >
                            <div class="min-w-0 flex-1">{n.message}</div>
                            <button
                                class="rounded-sm p-0.5 opacity-70 hover:opacity-100"
                                aria-label="Dismiss"
                                on:click=move |_| notifier.dismiss(id)
                            >
                                <X class="size-3.5" />
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
