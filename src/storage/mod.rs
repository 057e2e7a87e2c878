use crate::models::Engagement;
use crate::util::now_ms;
use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_KEY: &str = "engage_admin_token";
pub(crate) const RECENT_ENGAGEMENTS_KEY: &str = "engage_admin_recent_engagements";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct RecentEngagement {
    pub id: i64,
    pub name: String,
    pub last_opened_ms: i64,
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn upsert_lru_by_key<T: Clone>(
    mut items: Vec<T>,
    item: T,
    same_key: impl Fn(&T, &T) -> bool,
    max: usize,
) -> Vec<T> {
    items.retain(|x| !same_key(x, &item));
    items.insert(0, item);
    items.truncate(max);
    items
}

pub(crate) fn load_recent_engagements() -> Vec<RecentEngagement> {
    load_json_from_storage::<Vec<RecentEngagement>>(RECENT_ENGAGEMENTS_KEY).unwrap_or_default()
}

pub(crate) fn write_recent_engagement(engagement: &Engagement) {
    let item = RecentEngagement {
        id: engagement.id,
        name: engagement.name.clone(),
        last_opened_ms: now_ms(),
    };

    let next = upsert_lru_by_key(load_recent_engagements(), item, |a, b| a.id == b.id, 8);
    save_json_to_storage(RECENT_ENGAGEMENTS_KEY, &next);
}
