use crate::ordering::OrderedItem;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Engagement {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
}

/// Widget discriminant as stored by the backend.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
#[serde(try_from = "u8", into = "u8")]
pub(crate) enum WidgetType {
    WhoIsListening,
    Phases,
    Subscribe,
    Events,
    Documents,
    Map,
    Video,
    Timeline,
    Poll,
}

impl WidgetType {
    pub fn label(self) -> &'static str {
        match self {
            WidgetType::WhoIsListening => "Who is Listening",
            WidgetType::Phases => "Engagement Phases",
            WidgetType::Subscribe => "Sign Up for Updates",
            WidgetType::Events => "Events",
            WidgetType::Documents => "Documents",
            WidgetType::Map => "Map",
            WidgetType::Video => "Video",
            WidgetType::Timeline => "Timeline",
            WidgetType::Poll => "Poll",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WidgetType::WhoIsListening => "Add contacts for people the public can reach out to",
            WidgetType::Phases => "Show where this engagement sits in the overall process",
            WidgetType::Subscribe => "Let the public sign up for news about this engagement",
            WidgetType::Events => "List open houses and virtual sessions",
            WidgetType::Documents => "Link to reports and other supporting files",
            WidgetType::Map => "Pin the project location on a map",
            WidgetType::Video => "Embed a video about this engagement",
            WidgetType::Timeline => "Describe the milestones of this engagement",
            WidgetType::Poll => "Ask the public a quick multiple-choice question",
        }
    }

    /// Phases always renders above every other widget and cannot be dragged.
    pub fn is_pinned(self) -> bool {
        matches!(self, WidgetType::Phases)
    }
}

impl From<WidgetType> for u8 {
    fn from(value: WidgetType) -> Self {
        match value {
            WidgetType::WhoIsListening => 1,
            WidgetType::Phases => 2,
            WidgetType::Subscribe => 3,
            WidgetType::Events => 4,
            WidgetType::Documents => 5,
            WidgetType::Map => 6,
            WidgetType::Video => 7,
            WidgetType::Timeline => 8,
            WidgetType::Poll => 9,
        }
    }
}

impl TryFrom<u8> for WidgetType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => WidgetType::WhoIsListening,
            2 => WidgetType::Phases,
            3 => WidgetType::Subscribe,
            4 => WidgetType::Events,
            5 => WidgetType::Documents,
            6 => WidgetType::Map,
            7 => WidgetType::Video,
            8 => WidgetType::Timeline,
            9 => WidgetType::Poll,
            other => return Err(format!("unknown widget type {other}")),
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Widget {
    pub id: i64,
    pub engagement_id: i64,
    pub widget_type: WidgetType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sort_index: i64,
    #[serde(default)]
    pub items: Vec<WidgetItem>,
}

/// Link between a widget and one of its data rows (e.g. a contact).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct WidgetItem {
    #[serde(default)]
    pub id: i64,
    pub widget_id: i64,
    pub widget_data_id: i64,
    #[serde(default)]
    pub sort_index: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Contact {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct WidgetDocument {
    pub id: i64,
    pub widget_id: i64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub sort_index: i64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, IntoStaticStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum EventType {
    #[default]
    InPerson,
    Virtual,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct EventItem {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub location_address: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub url_label: String,
    /// ISO-8601 local date-time (`YYYY-MM-DDTHH:MM`).
    pub start_date: String,
    pub end_date: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct EngagementEvent {
    pub id: i64,
    pub widget_id: i64,
    pub title: String,
    pub event_type: EventType,
    #[serde(default)]
    pub sort_index: i64,
    #[serde(default)]
    pub items: Vec<EventItem>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, IntoStaticStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum SubscribeFormType {
    #[default]
    EmailList,
    SignUp,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, IntoStaticStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum CallToActionType {
    #[default]
    Link,
    Button,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct SubscribeOption {
    pub id: i64,
    pub widget_id: i64,
    pub form_type: SubscribeFormType,
    pub description: String,
    pub call_to_action_type: CallToActionType,
    pub call_to_action_text: String,
    #[serde(default)]
    pub sort_index: i64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, IntoStaticStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum TimelineStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct TimelineEvent {
    #[serde(default)]
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub status: TimelineStatus,
    #[serde(default)]
    pub position: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Timeline {
    #[serde(default)]
    pub id: i64,
    pub widget_id: i64,
    pub engagement_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, IntoStaticStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum PollStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct PollAnswer {
    #[serde(default)]
    pub id: i64,
    pub answer_text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Poll {
    #[serde(default)]
    pub id: i64,
    pub widget_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: PollStatus,
    #[serde(default)]
    pub answers: Vec<PollAnswer>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct MapWidget {
    #[serde(default)]
    pub id: i64,
    pub widget_id: i64,
    pub marker_label: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct VideoWidget {
    #[serde(default)]
    pub id: i64,
    pub widget_id: i64,
    #[serde(default)]
    pub title: String,
    pub video_url: String,
    #[serde(default)]
    pub description: String,
}

// Backend sort indexes are 1-based.
fn sort_index_for(position: usize) -> i64 {
    position as i64 + 1
}

impl OrderedItem for Widget {
    fn item_id(&self) -> i64 {
        self.id
    }

    fn set_position(&mut self, position: usize) {
        self.sort_index = sort_index_for(position);
    }

    fn is_fixed(&self) -> bool {
        self.widget_type.is_pinned()
    }
}

impl OrderedItem for WidgetItem {
    fn item_id(&self) -> i64 {
        self.widget_data_id
    }

    fn set_position(&mut self, position: usize) {
        self.sort_index = sort_index_for(position);
    }
}

impl OrderedItem for Contact {
    fn item_id(&self) -> i64 {
        self.id
    }
}

impl OrderedItem for WidgetDocument {
    fn item_id(&self) -> i64 {
        self.id
    }

    fn set_position(&mut self, position: usize) {
        self.sort_index = sort_index_for(position);
    }
}

impl OrderedItem for EngagementEvent {
    fn item_id(&self) -> i64 {
        self.id
    }

    fn set_position(&mut self, position: usize) {
        self.sort_index = sort_index_for(position);
    }
}

impl OrderedItem for SubscribeOption {
    fn item_id(&self) -> i64 {
        self.id
    }

    fn set_position(&mut self, position: usize) {
        self.sort_index = sort_index_for(position);
    }
}

impl OrderedItem for TimelineEvent {
    fn item_id(&self) -> i64 {
        self.id
    }

    fn set_position(&mut self, position: usize) {
        self.position = position as i64;
    }
}

/// Sort a freshly loaded list by its stored index. Stable for equal indexes.
pub(crate) fn sorted_by_index<T: Clone>(items: &[T], index: impl Fn(&T) -> i64) -> Vec<T> {
    let mut out = items.to_vec();
    out.sort_by_key(|x| index(x));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_widget_type_discriminants_roundtrip() {
        for t in WidgetType::iter() {
            let n: u8 = t.into();
            assert_eq!(WidgetType::try_from(n), Ok(t));
        }
        assert!(WidgetType::try_from(0).is_err());
        assert!(WidgetType::try_from(42).is_err());
    }

    #[test]
    fn test_widget_contract_deserialize() {
        let json = r#"{
            "id": 7,
            "engagement_id": 3,
            "widget_type": 5,
            "title": "Documents",
            "sort_index": 2,
            "items": []
        }"#;
        let w: Widget = serde_json::from_str(json).expect("widget should parse");
        assert_eq!(w.widget_type, WidgetType::Documents);
        assert_eq!(w.sort_index, 2);
        assert!(!w.is_fixed());
    }

    #[test]
    fn test_widget_unknown_type_rejected() {
        let json = r#"{"id": 1, "engagement_id": 1, "widget_type": 99}"#;
        assert!(serde_json::from_str::<Widget>(json).is_err());
    }

    #[test]
    fn test_widget_type_serializes_as_number() {
        let v = serde_json::to_value(WidgetType::Poll).expect("should serialize");
        assert_eq!(v, serde_json::json!(9));
    }

    #[test]
    fn test_phases_widget_is_fixed() {
        let w = Widget {
            id: 1,
            engagement_id: 1,
            widget_type: WidgetType::Phases,
            title: String::new(),
            sort_index: 5,
            items: vec![],
        };
        assert!(w.is_fixed());
    }

    #[test]
    fn test_enum_fields_use_snake_case() {
        let e = EngagementEvent {
            event_type: EventType::InPerson,
            ..Default::default()
        };
        let v = serde_json::to_value(e).expect("should serialize");
        assert_eq!(v["event_type"], "in_person");

        let s: TimelineStatus = serde_json::from_str("\"in_progress\"").expect("should parse");
        assert_eq!(s, TimelineStatus::InProgress);
    }

    #[test]
    fn test_select_values_match_wire_names() {
        // Form selects carry the same strings the backend stores.
        for t in CallToActionType::iter() {
            let value: &'static str = t.into();
            let wire = serde_json::to_value(t).expect("should serialize");
            assert_eq!(wire, value);
            assert_eq!(value.parse::<CallToActionType>(), Ok(t));
        }
        let sign_up: &'static str = SubscribeFormType::SignUp.into();
        assert_eq!(sign_up, "sign_up");
        assert!("nope".parse::<PollStatus>().is_err());
    }

    #[test]
    fn test_positions_written_back() {
        let mut events = vec![
            TimelineEvent { id: 4, description: "a".into(), position: 9, ..Default::default() },
            TimelineEvent { id: 5, description: "b".into(), position: 3, ..Default::default() },
        ];
        crate::ordering::write_positions(&mut events);
        assert_eq!(events[0].position, 0);
        assert_eq!(events[1].position, 1);

        let mut docs = vec![WidgetDocument::default(), WidgetDocument::default()];
        crate::ordering::write_positions(&mut docs);
        assert_eq!(docs[1].sort_index, 2);
    }

    #[test]
    fn test_sorted_by_index_is_stable() {
        let xs = vec![(1, 2), (2, 1), (3, 2), (4, 0)];
        let out = sorted_by_index(&xs, |x| x.1);
        assert_eq!(out, vec![(4, 0), (2, 1), (1, 2), (3, 2)]);
    }
}
