use leptos::prelude::*;
use tw_merge::*;

#[component]
pub fn Label(
    #[prop(optional, into)] class: String,
    #[prop(optional, into)] html_for: String,
    children: Children,
) -> impl IntoView {
    let class = tw_merge!(
        "flex items-center gap-2 text-sm leading-none font-medium select-none",
        class
    );

    view! {
        <label class=class r#for=html_for>
            {children()}
        </label>
    }
}

/// Label, control and the inline validation message for one form field.
#[component]
pub fn FormField(
    #[prop(into)] label: String,
    #[prop(into)] html_for: String,
    #[prop(into)] error: Signal<Option<String>>,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="flex flex-col gap-2">
            <Label html_for=html_for>{label}</Label>
            {children()}
            {move || error.get().map(|e| view! { <p class="text-xs text-destructive">{e}</p> })}
        </div>
    }
}
