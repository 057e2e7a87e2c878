use crate::components::hooks::use_random::use_random_id_for;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Spinner};
use leptos::prelude::*;

/// Modal asking the user to confirm a destructive action.
#[component]
pub fn ConfirmDialog(
    #[prop(into)] open: RwSignal<bool>,
    #[prop(into)] title: String,
    #[prop(into)] message: Signal<String>,
    #[prop(into, default = "Delete".to_string())] confirm_label: String,
    #[prop(into)] busy: Signal<bool>,
    on_confirm: Callback<()>,
) -> impl IntoView {
    let title = StoredValue::new(title);
    let confirm_label = StoredValue::new(confirm_label);
    let title_id = StoredValue::new(use_random_id_for("confirm_title"));

    view! {
        <Show when=move || open.get() fallback=|| ().into_view()>
            <div class="fixed inset-0 z-[150] flex items-center justify-center bg-black/30 px-4">
                <div
                    role="alertdialog"
                    aria-modal="true"
                    aria-labelledby=title_id.get_value()
                    class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg"
                >
                    <div class="mb-3 space-y-1">
                        <div id=title_id.get_value() class="text-sm font-medium">{title.get_value()}</div>
                        <div class="text-xs text-muted-foreground">{move || message.get()}</div>
                    </div>

                    <div class="flex items-center justify-end gap-2 pt-2">
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || busy.get()
                            on:click=move |_| open.set(false)
                        >
                            "Cancel"
                        </Button>
                        <Button
                            variant=ButtonVariant::Destructive
                            size=ButtonSize::Sm
                            attr:disabled=move || busy.get()
                            on:click=move |_| on_confirm.run(())
                        >
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || busy.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {confirm_label.get_value()}
                            </span>
                        </Button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
