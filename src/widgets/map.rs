use crate::components::ui::{FormField, Input, Spinner, TextArea};
use crate::drawer::{DrawerEvent, WidgetDrawer};
use crate::forms::{validate_map, FieldErrors};
use crate::models::{MapWidget, Widget};
use crate::state::AppContext;
use crate::widgets::{field_error, field_invalid, SaveCancel};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Parse a coordinate typed by the user. Blank or malformed input is `None`.
pub(crate) fn parse_coordinate(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[component]
pub fn MapForm(widget: Widget, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let widget_id = widget.id;

    let loading: RwSignal<bool> = RwSignal::new(true);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());
    let record: RwSignal<MapWidget> = RwSignal::new(MapWidget {
        widget_id,
        ..Default::default()
    });

    let marker_label = RwSignal::new(String::new());
    let latitude = RwSignal::new(String::new());
    let longitude = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());

    let api_client = app_state.0.api_client.get_untracked();
    let notifier = app_state.0.notifier;
    spawn_local(async move {
        match api_client.get_map(widget_id).await {
            Ok(Some(map)) => {
                marker_label.set(map.marker_label.clone());
                latitude.set(map.latitude.to_string());
                longitude.set(map.longitude.to_string());
                description.set(map.description.clone());
                record.set(map);
            }
            Ok(None) => {}
            Err(e) => notifier.error(format!("Could not load the map: {e}")),
        }
        loading.set(false);
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let lat = parse_coordinate(&latitude.get_untracked());
        let lng = parse_coordinate(&longitude.get_untracked());
        let original = record.get_untracked();
        let map = MapWidget {
            marker_label: marker_label.get_untracked().trim().to_string(),
            // NaN fails the range checks below.
            latitude: lat.unwrap_or(f64::NAN),
            longitude: lng.unwrap_or(f64::NAN),
            description: description.get_untracked(),
            ..original.clone()
        };

        if let Err(e) = validate_map(&map) {
            errors.set(e);
            return;
        }
        errors.set(FieldErrors::default());

        let api_client = app_state.0.api_client.get_untracked();
        saving.set(true);
        spawn_local(async move {
            match api_client.save_map(&original, &map).await {
                Ok(saved) => {
                    record.set(saved);
                    notifier.success("Map saved");
                    drawer.dispatch(DrawerEvent::SaveAndClose);
                }
                Err(e) => notifier.error(format!("Could not save the map: {e}")),
            }
            saving.set(false);
        });
    };

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <form class="flex flex-col gap-4" on:submit=on_submit>
                <FormField label="Marker label" html_for="map-marker" error=field_error(errors, "marker_label")>
                    <Input id="map-marker" bind_value=marker_label invalid=field_invalid(errors, "marker_label") />
                </FormField>
                <div class="grid grid-cols-2 gap-3">
                    <FormField label="Latitude" html_for="map-lat" error=field_error(errors, "latitude")>
                        <Input id="map-lat" placeholder="48.4284" bind_value=latitude invalid=field_invalid(errors, "latitude") />
                    </FormField>
                    <FormField label="Longitude" html_for="map-lng" error=field_error(errors, "longitude")>
                        <Input id="map-lng" placeholder="-123.3656" bind_value=longitude invalid=field_invalid(errors, "longitude") />
                    </FormField>
                </div>
                <FormField label="Description" html_for="map-description" error=field_error(errors, "description")>
                    <TextArea id="map-description" bind_value=description />
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
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate(" 48.5 "), Some(48.5));
        assert_eq!(parse_coordinate("-123"), Some(-123.0));
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("north"), None);
        assert_eq!(parse_coordinate("inf"), None);
    }

    #[test]
    fn test_unparsed_coordinate_fails_validation() {
        let map = MapWidget {
            widget_id: 1,
            marker_label: "Site".to_string(),
            latitude: parse_coordinate("abc").unwrap_or(f64::NAN),
            longitude: 0.0,
            ..Default::default()
        };
        let errs = validate_map(&map).expect_err("should fail");
        assert!(errs.get("latitude").is_some());
    }
}
