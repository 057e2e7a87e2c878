use crate::models::{
    Contact, Engagement, EngagementEvent, MapWidget, Poll, SubscribeOption, Timeline, VideoWidget,
    Widget, WidgetDocument, WidgetItem, WidgetType,
};
use crate::forms::patch_diff;
use crate::ordering::OrderedItem;
use crate::storage::TOKEN_KEY;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    NotFound,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => Self {
                kind: ApiErrorKind::Unauthorized,
                message: "You are not allowed to do this".to_string(),
            },
            404 => Self {
                kind: ApiErrorKind::NotFound,
                message: "Not found".to_string(),
            },
            _ => Self {
                kind: ApiErrorKind::Http,
                message: format!("Request failed ({status}): {body}"),
            },
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub const DEFAULT_API_URL: &'static str = "http://localhost:5000/api";

    pub fn new() -> Self {
        // `window.ENV.API_URL` is the documented key; `api_url` is accepted for older deployments.
        if let Some(env) = web_sys::window().and_then(|w| w.get("ENV")) {
            if !env.is_undefined() && env.is_object() {
                for key in ["API_URL", "api_url"] {
                    if let Some(url) = js_sys::Reflect::get(&env, &key.into())
                        .ok()
                        .and_then(|v| v.as_string())
                    {
                        return Self::from_url(&url);
                    }
                }
            }
        }

        Self::from_url(Self::DEFAULT_API_URL)
    }

    pub fn from_url(url: &str) -> Self {
        Self {
            api_url: url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of a "set sort order" request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SortEntry {
    pub id: i64,
    pub sort_index: i64,
}

/// Build the sort payload from an already ordered list. Indexes are 1-based.
pub(crate) fn sort_entries<T: OrderedItem>(items: &[T]) -> Vec<SortEntry> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| SortEntry {
            id: item.item_id(),
            sort_index: idx as i64 + 1,
        })
        .collect()
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct CreateWidgetRequest {
    pub engagement_id: i64,
    pub widget_type: WidgetType,
    pub title: String,
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let mut client = Self::new(EnvConfig::new().api_url);
        if let Some(token) = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten())
        {
            client.set_token(token);
        }
        client
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<(reqwest::StatusCode, String)> {
        let client = reqwest::Client::new();
        let mut req = client.request(method, self.url(path));
        if let Some(header) = self.auth_header() {
            req = req.header("Authorization", header);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status();
        let text = res.text().await.map_err(ApiError::network)?;
        Ok((status, text))
    }

    async fn request_api<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<T> {
        let (status, text) = self.send(method, path, body).await?;
        parse_body(&checked(status, text)?)
    }

    /// For calls whose success is the status alone; the body is not decoded.
    async fn request_unit(&self, method: Method, path: &str, body: Option<&impl Serialize>) -> ApiResult<()> {
        let (status, text) = self.send(method, path, body).await?;
        unit_result(status, text)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request_api(Method::GET, path, None::<&()>).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> ApiResult<T> {
        self.request_api(Method::POST, path, Some(body)).await
    }

    async fn patch<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> ApiResult<T> {
        self.request_api(Method::PATCH, path, Some(body)).await
    }

    async fn post_unit(&self, path: &str, body: &impl Serialize) -> ApiResult<()> {
        self.request_unit(Method::POST, path, Some(body)).await
    }

    async fn patch_unit(&self, path: &str, body: &impl Serialize) -> ApiResult<()> {
        self.request_unit(Method::PATCH, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        self.request_unit(Method::DELETE, path, None::<&()>).await
    }

    // Engagements

    pub async fn list_engagements(&self) -> ApiResult<Vec<Engagement>> {
        let data: serde_json::Value = self.get("/engagements").await?;
        parse_list(data, "items")
    }

    pub async fn get_engagement(&self, engagement_id: i64) -> ApiResult<Engagement> {
        self.get(&format!("/engagements/{engagement_id}")).await
    }

    pub async fn get_engagement_by_slug(&self, slug: &str) -> ApiResult<Engagement> {
        self.get(&format!("/engagements/slug/{}", urlencoding::encode(slug)))
            .await
    }

    // Widgets

    pub async fn list_widgets(&self, engagement_id: i64) -> ApiResult<Vec<Widget>> {
        self.get(&format!("/widgets/engagement/{engagement_id}")).await
    }

    pub async fn create_widget(&self, req: &CreateWidgetRequest) -> ApiResult<Widget> {
        self.post(&format!("/widgets/engagement/{}", req.engagement_id), req)
            .await
    }

    pub async fn update_widget(
        &self,
        engagement_id: i64,
        widget_id: i64,
        patch: &serde_json::Value,
    ) -> ApiResult<Widget> {
        self.patch(
            &format!("/widgets/{widget_id}/engagements/{engagement_id}"),
            patch,
        )
        .await
    }

    pub async fn delete_widget(&self, engagement_id: i64, widget_id: i64) -> ApiResult<()> {
        self.delete(&format!("/widgets/{widget_id}/engagements/{engagement_id}"))
            .await
    }

    pub async fn sort_widgets(&self, engagement_id: i64, widgets: &[Widget]) -> ApiResult<()> {
        self.patch_unit(
            &format!("/widgets/engagement/{engagement_id}/sort_index"),
            &sort_entries(widgets),
        )
        .await
    }

    /// Replace the item links of a widget. The order of `items` is the display order.
    pub async fn set_widget_items(&self, widget_id: i64, items: &[WidgetItem]) -> ApiResult<()> {
        self.post_unit(&format!("/widgets/{widget_id}/items"), &items).await
    }

    // Contacts

    pub async fn list_contacts(&self) -> ApiResult<Vec<Contact>> {
        self.get("/contacts").await
    }

    pub async fn create_contact(&self, contact: &Contact) -> ApiResult<Contact> {
        self.post("/contacts", contact).await
    }

    pub async fn update_contact(&self, contact_id: i64, patch: &serde_json::Value) -> ApiResult<Contact> {
        self.patch(&format!("/contacts/{contact_id}"), patch).await
    }

    // Documents

    pub async fn list_documents(&self, widget_id: i64) -> ApiResult<Vec<WidgetDocument>> {
        self.get(&format!("/widgets/{widget_id}/documents")).await
    }

    pub async fn create_document(&self, doc: &WidgetDocument) -> ApiResult<WidgetDocument> {
        self.post(&format!("/widgets/{}/documents", doc.widget_id), doc)
            .await
    }

    pub async fn update_document(
        &self,
        widget_id: i64,
        document_id: i64,
        patch: &serde_json::Value,
    ) -> ApiResult<WidgetDocument> {
        self.patch(&format!("/widgets/{widget_id}/documents/{document_id}"), patch)
            .await
    }

    pub async fn delete_document(&self, widget_id: i64, document_id: i64) -> ApiResult<()> {
        self.delete(&format!("/widgets/{widget_id}/documents/{document_id}"))
            .await
    }

    pub async fn sort_documents(&self, widget_id: i64, docs: &[WidgetDocument]) -> ApiResult<()> {
        self.patch_unit(
            &format!("/widgets/{widget_id}/documents/sort_index"),
            &sort_entries(docs),
        )
        .await
    }

    // Events

    pub async fn list_events(&self, widget_id: i64) -> ApiResult<Vec<EngagementEvent>> {
        self.get(&format!("/widgets/{widget_id}/events")).await
    }

    pub async fn create_event(&self, event: &EngagementEvent) -> ApiResult<EngagementEvent> {
        self.post(&format!("/widgets/{}/events", event.widget_id), event)
            .await
    }

    pub async fn update_event(
        &self,
        widget_id: i64,
        event_id: i64,
        patch: &serde_json::Value,
    ) -> ApiResult<EngagementEvent> {
        self.patch(&format!("/widgets/{widget_id}/events/{event_id}"), patch)
            .await
    }

    pub async fn delete_event(&self, widget_id: i64, event_id: i64) -> ApiResult<()> {
        self.delete(&format!("/widgets/{widget_id}/events/{event_id}"))
            .await
    }

    pub async fn sort_events(&self, widget_id: i64, events: &[EngagementEvent]) -> ApiResult<()> {
        self.patch_unit(
            &format!("/widgets/{widget_id}/events/sort_index"),
            &sort_entries(events),
        )
        .await
    }

    // Subscribe options

    pub async fn list_subscribe_options(&self, widget_id: i64) -> ApiResult<Vec<SubscribeOption>> {
        self.get(&format!("/widgets/{widget_id}/subscribe")).await
    }

    pub async fn create_subscribe_option(&self, option: &SubscribeOption) -> ApiResult<SubscribeOption> {
        self.post(&format!("/widgets/{}/subscribe", option.widget_id), option)
            .await
    }

    pub async fn update_subscribe_option(
        &self,
        widget_id: i64,
        option_id: i64,
        patch: &serde_json::Value,
    ) -> ApiResult<SubscribeOption> {
        self.patch(&format!("/widgets/{widget_id}/subscribe/{option_id}"), patch)
            .await
    }

    pub async fn delete_subscribe_option(&self, widget_id: i64, option_id: i64) -> ApiResult<()> {
        self.delete(&format!("/widgets/{widget_id}/subscribe/{option_id}"))
            .await
    }

    pub async fn sort_subscribe_options(
        &self,
        widget_id: i64,
        options: &[SubscribeOption],
    ) -> ApiResult<()> {
        self.patch_unit(
            &format!("/widgets/{widget_id}/subscribe/sort_index"),
            &sort_entries(options),
        )
        .await
    }

    // Single-record widgets. Each widget owns at most one record; the list endpoints
    // return zero or one element.

    pub async fn get_timeline(&self, widget_id: i64) -> ApiResult<Option<Timeline>> {
        first(self.get(&format!("/widgets/{widget_id}/timelines")).await)
    }

    pub async fn save_timeline(&self, original: &Timeline, timeline: &Timeline) -> ApiResult<Timeline> {
        save_record(self, "timelines", timeline.widget_id, timeline.id, original, timeline).await
    }

    pub async fn get_poll(&self, widget_id: i64) -> ApiResult<Option<Poll>> {
        first(self.get(&format!("/widgets/{widget_id}/polls")).await)
    }

    pub async fn save_poll(&self, original: &Poll, poll: &Poll) -> ApiResult<Poll> {
        save_record(self, "polls", poll.widget_id, poll.id, original, poll).await
    }

    pub async fn get_map(&self, widget_id: i64) -> ApiResult<Option<MapWidget>> {
        first(self.get(&format!("/widgets/{widget_id}/maps")).await)
    }

    pub async fn save_map(&self, original: &MapWidget, map: &MapWidget) -> ApiResult<MapWidget> {
        save_record(self, "maps", map.widget_id, map.id, original, map).await
    }

    pub async fn get_video(&self, widget_id: i64) -> ApiResult<Option<VideoWidget>> {
        first(self.get(&format!("/widgets/{widget_id}/videos")).await)
    }

    pub async fn save_video(&self, original: &VideoWidget, video: &VideoWidget) -> ApiResult<VideoWidget> {
        save_record(self, "videos", video.widget_id, video.id, original, video).await
    }
}

/// How a single widget record reaches the backend.
#[derive(Debug, PartialEq)]
pub(crate) enum SaveStep {
    Create,
    Update(serde_json::Value),
    Unchanged,
}

/// Records without an id are created whole; existing ones send only changed fields.
pub(crate) fn save_step<T: Serialize>(id: i64, original: &T, edited: &T) -> SaveStep {
    if id == 0 {
        return SaveStep::Create;
    }
    match patch_diff(original, edited) {
        Some(patch) => SaveStep::Update(patch),
        None => SaveStep::Unchanged,
    }
}

async fn save_record<T: Serialize + DeserializeOwned + Clone>(
    api: &ApiClient,
    collection: &str,
    widget_id: i64,
    id: i64,
    original: &T,
    edited: &T,
) -> ApiResult<T> {
    match save_step(id, original, edited) {
        SaveStep::Create => {
            api.post(&format!("/widgets/{widget_id}/{collection}"), edited)
                .await
        }
        SaveStep::Update(patch) => {
            api.patch(&format!("/widgets/{widget_id}/{collection}/{id}"), &patch)
                .await
        }
        SaveStep::Unchanged => {
            tracing::debug!(collection, widget_id, id, "record unchanged, nothing to send");
            Ok(edited.clone())
        }
    }
}

fn first<T>(list: ApiResult<Vec<T>>) -> ApiResult<Option<T>> {
    list.map(|xs| xs.into_iter().next())
}

fn checked(status: reqwest::StatusCode, text: String) -> ApiResult<String> {
    if !status.is_success() {
        return Err(ApiError::from_status(status, text));
    }
    Ok(text)
}

/// Success is decided by the status; bodies like `{"message": "..."}` are ignored.
pub(crate) fn unit_result(status: reqwest::StatusCode, text: String) -> ApiResult<()> {
    checked(status, text).map(|_| ())
}

/// Empty bodies (204) decode as JSON `null`.
pub(crate) fn parse_body<T: DeserializeOwned>(text: &str) -> ApiResult<T> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(ApiError::parse)
}

/// Accept either a bare array or a paged envelope `{ "<key>": [...] }`.
pub(crate) fn parse_list<T: DeserializeOwned>(data: serde_json::Value, key: &str) -> ApiResult<Vec<T>> {
    let list = match data {
        serde_json::Value::Array(_) => data,
        serde_json::Value::Object(mut obj) => obj.remove(key).unwrap_or_default(),
        _ => serde_json::Value::Null,
    };
    if list.is_null() {
        return Ok(vec![]);
    }
    serde_json::from_value(list).map_err(ApiError::parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WidgetType;

    fn widget(id: i64, widget_type: WidgetType) -> Widget {
        Widget {
            id,
            engagement_id: 1,
            widget_type,
            title: String::new(),
            sort_index: 0,
            items: vec![],
        }
    }

    #[test]
    fn test_api_client_new() {
        let client = ApiClient::new("http://localhost:5000/api".to_string());
        assert_eq!(client.base_url, "http://localhost:5000/api");
        assert!(!client.is_authenticated());
        assert!(client.auth_header().is_none());
    }

    #[test]
    fn test_api_client_auth_header_with_token() {
        let mut client = ApiClient::new("http://localhost:5000/api".to_string());
        client.set_token("jwt".to_string());
        assert!(client.is_authenticated());
        assert_eq!(client.auth_header().as_deref(), Some("Bearer jwt"));
    }

    #[test]
    fn test_env_config_trims_trailing_slash() {
        let cfg = EnvConfig::from_url("https://engage.example.org/api/");
        assert_eq!(cfg.api_url, "https://engage.example.org/api");
        let client = ApiClient::new(cfg.api_url);
        assert_eq!(client.url("/contacts"), "https://engage.example.org/api/contacts");
    }

    #[test]
    fn test_sort_entries_are_one_based_in_list_order() {
        let widgets = vec![
            widget(9, WidgetType::Phases),
            widget(4, WidgetType::Documents),
            widget(6, WidgetType::Map),
        ];
        let v = serde_json::to_value(sort_entries(&widgets)).expect("should serialize");
        assert_eq!(
            v,
            serde_json::json!([
                {"id": 9, "sort_index": 1},
                {"id": 4, "sort_index": 2},
                {"id": 6, "sort_index": 3}
            ])
        );
    }

    #[test]
    fn test_parse_body_empty_is_unit() {
        assert!(parse_body::<()>("").is_ok());
        let none: Option<Contact> = parse_body("  ").expect("blank body should parse");
        assert!(none.is_none());
    }

    #[test]
    fn test_parse_body_invalid_json_is_parse_error() {
        let err = parse_body::<Contact>("{not json").expect_err("should fail");
        assert_eq!(err.kind, ApiErrorKind::Parse);
    }

    #[test]
    fn test_parse_list_accepts_array_and_envelope() {
        let bare: Vec<Engagement> = parse_list(
            serde_json::json!([{"id": 1, "name": "Park", "slug": "park"}]),
            "items",
        )
        .expect("array should parse");
        assert_eq!(bare.len(), 1);

        let paged: Vec<Engagement> = parse_list(
            serde_json::json!({"items": [{"id": 2, "name": "Bridge", "slug": "bridge"}], "total": 1}),
            "items",
        )
        .expect("envelope should parse");
        assert_eq!(paged[0].slug, "bridge");

        let missing: Vec<Engagement> =
            parse_list(serde_json::json!({"total": 0}), "items").expect("missing key is empty");
        assert!(missing.is_empty());
    }

    #[test]
    fn test_status_mapping() {
        let e = ApiError::from_status(reqwest::StatusCode::UNAUTHORIZED, String::new());
        assert_eq!(e.kind, ApiErrorKind::Unauthorized);
        let e = ApiError::from_status(reqwest::StatusCode::NOT_FOUND, String::new());
        assert_eq!(e.kind, ApiErrorKind::NotFound);
        let e = ApiError::from_status(reqwest::StatusCode::BAD_REQUEST, "bad".to_string());
        assert_eq!(e.kind, ApiErrorKind::Http);
        assert!(e.to_string().contains("bad"));
    }

    #[test]
    fn test_create_widget_request_contract() {
        let req = CreateWidgetRequest {
            engagement_id: 3,
            widget_type: WidgetType::Subscribe,
            title: "Sign Up for Updates".to_string(),
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["widget_type"], 3);
        assert_eq!(v["engagement_id"], 3);
    }

    #[test]
    fn test_unit_result_ignores_success_body() {
        let body = r#"{"message":"Widget successfully removed"}"#.to_string();
        assert!(unit_result(reqwest::StatusCode::OK, body).is_ok());
        assert!(unit_result(reqwest::StatusCode::NO_CONTENT, String::new()).is_ok());
        assert!(unit_result(reqwest::StatusCode::OK, "removed".to_string()).is_ok());

        let e = unit_result(reqwest::StatusCode::NOT_FOUND, String::new()).expect_err("404 fails");
        assert_eq!(e.kind, ApiErrorKind::NotFound);
    }

    #[test]
    fn test_save_step_sends_only_changed_fields() {
        let original = VideoWidget {
            id: 5,
            widget_id: 9,
            title: "Walkthrough".to_string(),
            video_url: "https://youtu.be/a".to_string(),
            description: "Site tour".to_string(),
        };
        let edited = VideoWidget {
            video_url: "https://youtu.be/b".to_string(),
            ..original.clone()
        };

        assert_eq!(
            save_step(edited.id, &original, &edited),
            SaveStep::Update(serde_json::json!({"id": 5, "video_url": "https://youtu.be/b"}))
        );
        assert_eq!(save_step(original.id, &original, &original.clone()), SaveStep::Unchanged);
    }

    #[test]
    fn test_save_step_creates_records_without_id() {
        let blank = VideoWidget {
            widget_id: 9,
            ..Default::default()
        };
        assert_eq!(save_step(blank.id, &blank, &blank.clone()), SaveStep::Create);
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn storage() -> web_sys::Storage {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .expect("localStorage should be available")
    }

    #[wasm_bindgen_test]
    fn test_token_is_read_from_storage() {
        let _ = storage().remove_item(TOKEN_KEY);
        assert!(!ApiClient::load_from_storage().is_authenticated());

        let _ = storage().set_item(TOKEN_KEY, "t1");
        let c = ApiClient::load_from_storage();
        assert_eq!(c.auth_header().as_deref(), Some("Bearer t1"));

        let _ = storage().remove_item(TOKEN_KEY);
    }
}
