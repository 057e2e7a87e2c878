use crate::components::ui::{FormField, Input, Spinner, TextArea};
use crate::drawer::{DrawerEvent, WidgetDrawer};
use crate::forms::{validate_video, FieldErrors};
use crate::models::{VideoWidget, Widget};
use crate::state::AppContext;
use crate::widgets::{field_error, field_invalid, SaveCancel};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Embeddable player URL for the common hosts; other links are used as-is.
pub(crate) fn embed_url(video_url: &str) -> String {
    let url = video_url.trim();
    let youtube_id = url
        .split_once("youtube.com/watch?v=")
        .map(|(_, rest)| rest)
        .or_else(|| url.split_once("youtu.be/").map(|(_, rest)| rest))
        .map(|rest| rest.split(['&', '?', '#']).next().unwrap_or(rest));
    if let Some(id) = youtube_id.filter(|id| !id.is_empty()) {
        return format!("https://www.youtube.com/embed/{id}");
    }

    if let Some((_, rest)) = url.split_once("vimeo.com/") {
        let id = rest.split(['/', '?', '#']).next().unwrap_or(rest);
        if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
            return format!("https://player.vimeo.com/video/{id}");
        }
    }

    url.to_string()
}

#[component]
pub fn VideoForm(widget: Widget, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let widget_id = widget.id;

    let loading: RwSignal<bool> = RwSignal::new(true);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());
    let record: RwSignal<VideoWidget> = RwSignal::new(VideoWidget {
        widget_id,
        ..Default::default()
    });

    let title = RwSignal::new(String::new());
    let video_url = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());

    let api_client = app_state.0.api_client.get_untracked();
    let notifier = app_state.0.notifier;
    spawn_local(async move {
        match api_client.get_video(widget_id).await {
            Ok(Some(video)) => {
                title.set(video.title.clone());
                video_url.set(video.video_url.clone());
                description.set(video.description.clone());
                record.set(video);
            }
            Ok(None) => {}
            Err(e) => notifier.error(format!("Could not load the video: {e}")),
        }
        loading.set(false);
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let original = record.get_untracked();
        let video = VideoWidget {
            title: title.get_untracked().trim().to_string(),
            video_url: video_url.get_untracked().trim().to_string(),
            description: description.get_untracked(),
            ..original.clone()
        };

        if let Err(e) = validate_video(&video) {
            errors.set(e);
            return;
        }
        errors.set(FieldErrors::default());

        let api_client = app_state.0.api_client.get_untracked();
        saving.set(true);
        spawn_local(async move {
            match api_client.save_video(&original, &video).await {
                Ok(saved) => {
                    record.set(saved);
                    notifier.success("Video saved");
                    drawer.dispatch(DrawerEvent::SaveAndClose);
                }
                Err(e) => notifier.error(format!("Could not save the video: {e}")),
            }
            saving.set(false);
        });
    };

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <form class="flex flex-col gap-4" on:submit=on_submit>
                <FormField label="Title" html_for="video-title" error=field_error(errors, "title")>
                    <Input id="video-title" bind_value=title invalid=field_invalid(errors, "title") />
                </FormField>
                <FormField label="Video link" html_for="video-url" error=field_error(errors, "video_url")>
                    <Input
                        id="video-url"
                        r#type="url"
                        placeholder="https://www.youtube.com/watch?v=..."
                        bind_value=video_url
                        invalid=field_invalid(errors, "video_url")
                    />
                </FormField>
                <FormField label="Description" html_for="video-description" error=field_error(errors, "description")>
                    <TextArea id="video-description" bind_value=description />
                </FormField>
                <SaveCancel saving=saving drawer=drawer />
            </form>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_url_for_known_hosts() {
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=abc123&t=10"),
            "https://www.youtube.com/embed/abc123"
        );
        assert_eq!(embed_url("https://youtu.be/xyz?si=1"), "https://www.youtube.com/embed/xyz");
        assert_eq!(embed_url("https://vimeo.com/76979871"), "https://player.vimeo.com/video/76979871");
    }

    #[test]
    fn test_embed_url_passthrough() {
        assert_eq!(embed_url(" https://example.org/clip.mp4 "), "https://example.org/clip.mp4");
        assert_eq!(embed_url("https://vimeo.com/channels/staff"), "https://vimeo.com/channels/staff");
    }
}
