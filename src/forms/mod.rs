//! Client-side form checks and PATCH diffing.
//!
//! Validators mirror the backend's rules closely enough that a submit blocked here
//! would also have been rejected by the server.

use crate::models::{
    Contact, EngagementEvent, EventType, MapWidget, Poll, SubscribeOption, Timeline, VideoWidget,
    Widget, WidgetDocument,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// field name -> message shown under that field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        // First failing rule wins.
        self.0.entry(field).or_insert_with(|| message.into());
    }

    fn required(&mut self, field: &'static str, value: &str, label: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{label} is required"));
        }
    }

    fn max_len(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("Must be {max} characters or fewer"));
        }
    }

    fn http_url(&mut self, field: &'static str, value: &str) {
        if !value.trim().is_empty() && !is_http_url(value) {
            self.add(field, "Must start with http:// or https://");
        }
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub(crate) fn is_http_url(s: &str) -> bool {
    let s = s.trim();
    let rest = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/') && !host.contains(char::is_whitespace))
}

pub(crate) fn is_email(s: &str) -> bool {
    let s = s.trim();
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.contains(char::is_whitespace)
}

fn is_phone(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
        && s.chars().any(|c| c.is_ascii_digit())
}

pub(crate) fn validate_contact(c: &Contact) -> Result<(), FieldErrors> {
    let mut e = FieldErrors::default();
    e.required("name", &c.name, "Name");
    e.max_len("name", &c.name, 50);
    e.max_len("title", &c.title, 50);
    e.required("email", &c.email, "Email");
    if !c.email.trim().is_empty() && !is_email(&c.email) {
        e.add("email", "Enter a valid email address");
    }
    if !c.phone_number.trim().is_empty() && !is_phone(&c.phone_number) {
        e.add("phone_number", "Enter a valid phone number");
    }
    e.max_len("bio", &c.bio, 500);
    e.into_result()
}

pub(crate) fn validate_widget(w: &Widget) -> Result<(), FieldErrors> {
    let mut e = FieldErrors::default();
    e.required("title", &w.title, "Title");
    e.max_len("title", &w.title, 100);
    e.into_result()
}

pub(crate) fn validate_document(d: &WidgetDocument) -> Result<(), FieldErrors> {
    let mut e = FieldErrors::default();
    e.required("title", &d.title, "Title");
    e.required("url", &d.url, "Link");
    e.http_url("url", &d.url);
    e.into_result()
}

pub(crate) fn validate_event(ev: &EngagementEvent) -> Result<(), FieldErrors> {
    let mut e = FieldErrors::default();
    e.required("title", &ev.title, "Title");

    let Some(item) = ev.items.first() else {
        e.add("start_date", "Start date is required");
        return e.into_result();
    };

    e.required("start_date", &item.start_date, "Start date");
    e.required("end_date", &item.end_date, "End date");
    // ISO-8601 local date-times compare correctly as strings.
    if !item.start_date.is_empty() && !item.end_date.is_empty() && item.end_date <= item.start_date {
        e.add("end_date", "End must be after start");
    }

    match ev.event_type {
        EventType::InPerson => e.required("location_name", &item.location_name, "Location"),
        EventType::Virtual => {
            e.required("url", &item.url, "Session link");
            e.http_url("url", &item.url);
        }
    }
    e.into_result()
}

pub(crate) fn validate_subscribe_option(o: &SubscribeOption) -> Result<(), FieldErrors> {
    let mut e = FieldErrors::default();
    e.required("description", &o.description, "Description");
    e.required("call_to_action_text", &o.call_to_action_text, "Call to action");
    e.max_len("call_to_action_text", &o.call_to_action_text, 25);
    e.into_result()
}

pub(crate) fn validate_video(v: &VideoWidget) -> Result<(), FieldErrors> {
    let mut e = FieldErrors::default();
    e.required("video_url", &v.video_url, "Video link");
    e.http_url("video_url", &v.video_url);
    e.max_len("title", &v.title, 255);
    e.into_result()
}

pub(crate) fn validate_map(m: &MapWidget) -> Result<(), FieldErrors> {
    let mut e = FieldErrors::default();
    e.required("marker_label", &m.marker_label, "Marker label");
    if !(-90.0..=90.0).contains(&m.latitude) {
        e.add("latitude", "Latitude must be between -90 and 90");
    }
    if !(-180.0..=180.0).contains(&m.longitude) {
        e.add("longitude", "Longitude must be between -180 and 180");
    }
    e.into_result()
}

pub(crate) fn validate_poll(p: &Poll) -> Result<(), FieldErrors> {
    let mut e = FieldErrors::default();
    e.required("title", &p.title, "Title");
    let answers = p
        .answers
        .iter()
        .filter(|a| !a.answer_text.trim().is_empty())
        .count();
    if answers < 2 {
        e.add("answers", "Add at least two answers");
    }
    e.into_result()
}

pub(crate) fn validate_timeline(t: &Timeline) -> Result<(), FieldErrors> {
    let mut e = FieldErrors::default();
    e.required("title", &t.title, "Title");
    if !t.events.iter().any(|ev| !ev.description.trim().is_empty()) {
        e.add("events", "Add at least one event");
    }
    e.into_result()
}

/// Top-level fields of `edited` that differ from `original`, plus `id`.
///
/// Returns `None` when nothing changed so the caller can skip the request.
pub(crate) fn patch_diff<T: Serialize>(original: &T, edited: &T) -> Option<serde_json::Value> {
    let (Ok(serde_json::Value::Object(before)), Ok(serde_json::Value::Object(after))) =
        (serde_json::to_value(original), serde_json::to_value(edited))
    else {
        return None;
    };

    let mut out = serde_json::Map::new();
    for (k, v) in after.iter() {
        if before.get(k) != Some(v) {
            out.insert(k.clone(), v.clone());
        }
    }
    if out.is_empty() {
        return None;
    }
    if let Some(id) = after.get("id") {
        out.insert("id".to_string(), id.clone());
    }
    Some(serde_json::Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventItem, PollAnswer, TimelineEvent};

    fn contact() -> Contact {
        Contact {
            id: 4,
            name: "Jordan Lee".to_string(),
            title: "Project Lead".to_string(),
            email: "jordan.lee@example.org".to_string(),
            phone_number: "+1 (250) 555-0100".to_string(),
            address: String::new(),
            bio: String::new(),
        }
    }

    #[test]
    fn test_valid_contact_passes() {
        assert_eq!(validate_contact(&contact()), Ok(()));
    }

    #[test]
    fn test_contact_rules() {
        let mut c = contact();
        c.name = "  ".to_string();
        c.email = "not-an-email".to_string();
        c.phone_number = "call me".to_string();
        c.bio = "x".repeat(501);
        let errs = validate_contact(&c).expect_err("should fail");
        assert_eq!(errs.get("name"), Some("Name is required"));
        assert_eq!(errs.get("email"), Some("Enter a valid email address"));
        assert!(errs.get("phone_number").is_some());
        assert!(errs.get("bio").is_some());
    }

    #[test]
    fn test_email_and_url_shapes() {
        assert!(is_email("a@b.co"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.co"));
        assert!(!is_email("a b@c.co"));
        assert!(!is_email("a@@b.co"));

        assert!(is_http_url("https://example.org/report.pdf"));
        assert!(is_http_url("http://example.org"));
        assert!(!is_http_url("ftp://example.org"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("example.org"));
    }

    #[test]
    fn test_widget_title_required() {
        let mut w = Widget {
            id: 1,
            engagement_id: 1,
            widget_type: crate::models::WidgetType::Phases,
            title: "Engagement Phases".to_string(),
            sort_index: 1,
            items: vec![],
        };
        assert_eq!(validate_widget(&w), Ok(()));
        w.title = " ".to_string();
        let errs = validate_widget(&w).expect_err("should fail");
        assert_eq!(errs.get("title"), Some("Title is required"));
    }

    #[test]
    fn test_document_requires_http_link() {
        let mut d = WidgetDocument {
            id: 1,
            widget_id: 2,
            title: "Engagement summary".to_string(),
            url: "www.example.org".to_string(),
            sort_index: 1,
        };
        let errs = validate_document(&d).expect_err("should fail");
        assert!(errs.get("url").is_some());

        d.url = "https://www.example.org/summary.pdf".to_string();
        assert_eq!(validate_document(&d), Ok(()));
    }

    #[test]
    fn test_event_rules_depend_on_type() {
        let mut ev = EngagementEvent {
            id: 1,
            widget_id: 2,
            title: "Open house".to_string(),
            event_type: EventType::InPerson,
            sort_index: 1,
            items: vec![EventItem {
                start_date: "2024-06-01T18:00".to_string(),
                end_date: "2024-06-01T17:00".to_string(),
                ..Default::default()
            }],
        };
        let errs = validate_event(&ev).expect_err("should fail");
        assert_eq!(errs.get("end_date"), Some("End must be after start"));
        assert_eq!(errs.get("location_name"), Some("Location is required"));

        ev.items[0].end_date = "2024-06-01T20:00".to_string();
        ev.items[0].location_name = "Community hall".to_string();
        assert_eq!(validate_event(&ev), Ok(()));

        ev.event_type = EventType::Virtual;
        let errs = validate_event(&ev).expect_err("virtual needs a link");
        assert_eq!(errs.get("url"), Some("Session link is required"));
    }

    #[test]
    fn test_event_without_items() {
        let ev = EngagementEvent {
            title: "Open house".to_string(),
            ..Default::default()
        };
        assert!(validate_event(&ev).is_err());
    }

    #[test]
    fn test_subscribe_cta_limit() {
        let mut o = SubscribeOption {
            description: "Get updates by email".to_string(),
            call_to_action_text: "Sign up".to_string(),
            ..Default::default()
        };
        assert_eq!(validate_subscribe_option(&o), Ok(()));
        o.call_to_action_text = "x".repeat(26);
        assert!(validate_subscribe_option(&o).is_err());
    }

    #[test]
    fn test_map_bounds() {
        let mut m = MapWidget {
            marker_label: "Site".to_string(),
            latitude: 48.42,
            longitude: -123.36,
            ..Default::default()
        };
        assert_eq!(validate_map(&m), Ok(()));
        m.latitude = 91.0;
        m.longitude = -181.0;
        let errs = validate_map(&m).expect_err("should fail");
        assert!(errs.get("latitude").is_some());
        assert!(errs.get("longitude").is_some());
    }

    #[test]
    fn test_poll_needs_two_answers() {
        let mut p = Poll {
            title: "Which design?".to_string(),
            answers: vec![
                PollAnswer { id: 0, answer_text: "A".to_string() },
                PollAnswer { id: 0, answer_text: " ".to_string() },
            ],
            ..Default::default()
        };
        assert!(validate_poll(&p).is_err());
        p.answers[1].answer_text = "B".to_string();
        assert_eq!(validate_poll(&p), Ok(()));
    }

    #[test]
    fn test_timeline_and_video() {
        let mut t = Timeline {
            title: "Project milestones".to_string(),
            ..Default::default()
        };
        assert!(validate_timeline(&t).is_err());
        t.events.push(TimelineEvent {
            description: "Survey opens".to_string(),
            ..Default::default()
        });
        assert_eq!(validate_timeline(&t), Ok(()));

        let v = VideoWidget {
            video_url: "youtube.com/watch".to_string(),
            ..Default::default()
        };
        assert!(validate_video(&v).is_err());
    }

    #[test]
    fn test_patch_diff_only_changed_fields() {
        let before = contact();
        let mut after = before.clone();
        assert_eq!(patch_diff(&before, &after), None);

        after.title = "Director".to_string();
        after.bio = "Leads the project team.".to_string();
        let diff = patch_diff(&before, &after).expect("should differ");
        assert_eq!(
            diff,
            serde_json::json!({
                "id": 4,
                "title": "Director",
                "bio": "Leads the project team."
            })
        );
    }

    #[test]
    fn test_patch_diff_non_object_is_none() {
        assert_eq!(patch_diff(&1, &2), None);
    }
}
