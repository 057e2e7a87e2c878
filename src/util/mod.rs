use leptos::ev::EventDescriptor;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use wasm_bindgen::JsCast;

pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Run `f` once after `delay_ms`. Returns the browser timer handle.
pub(crate) fn set_timeout(delay_ms: i32, f: impl FnOnce() + 'static) -> Option<i32> {
    let win = web_sys::window()?;
    let cb = wasm_bindgen::closure::Closure::once_into_js(f);
    win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), delay_ms)
        .ok()
}

pub(crate) fn clear_timeout(handle: i32) {
    if let Some(win) = web_sys::window() {
        win.clear_timeout_with_handle(handle);
    }
}

/// Listen on `window` until the current reactive owner is cleaned up.
///
/// Dropping a `WindowListenerHandle` leaves the listener attached, and a callback
/// that outlives its owner would read disposed signals.
pub(crate) fn window_listener<E>(event: E, cb: impl Fn(E::EventType) + 'static)
where
    E: EventDescriptor + 'static,
    E::EventType: JsCast,
{
    let handle = window_event_listener(event, cb);
    on_cleanup(move || handle.remove());
}

/// `2024-05-01T18:30` -> `2024-05-01 18:30`. Anything else is shown unchanged.
pub(crate) fn display_datetime(iso: &str) -> String {
    let s = iso.trim();
    match s.split_once('T') {
        Some((date, time)) => format!("{date} {}", time.get(..5).unwrap_or(time)),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_datetime() {
        assert_eq!(display_datetime("2024-05-01T18:30"), "2024-05-01 18:30");
        assert_eq!(display_datetime("2024-05-01T18:30:00"), "2024-05-01 18:30");
        assert_eq!(display_datetime("2024-05-01"), "2024-05-01");
        assert_eq!(display_datetime(""), "");
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use leptos::ev;
    use std::cell::Cell;
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn press_key() {
        let event = web_sys::KeyboardEvent::new("keydown").expect("keyboard event");
        web_sys::window()
            .expect("window")
            .dispatch_event(&event)
            .expect("dispatch");
    }

    #[wasm_bindgen_test]
    fn test_window_listener_detached_on_cleanup() {
        let hits = Rc::new(Cell::new(0));
        let owner = Owner::new();
        owner.with(|| {
            let hits = Rc::clone(&hits);
            window_listener(ev::keydown, move |_ev: web_sys::KeyboardEvent| {
                hits.set(hits.get() + 1);
            });
        });

        press_key();
        assert_eq!(hits.get(), 1);

        owner.cleanup();
        press_key();
        assert_eq!(hits.get(), 1);
    }
}
