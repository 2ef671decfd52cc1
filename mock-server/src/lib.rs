//! In-memory fake of the MVP activities backend.
//!
//! Serves the same endpoints as the real service under `/api`. It checks
//! the bearer token and the `request-id` header on every call, and it
//! counts search requests so tests can assert how many pages a client asked
//! for. Deleting an activity succeeds without removing it, which is how the
//! real service behaves.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

type Activity = Map<String, Value>;
type ApiResult<T> = Result<T, (StatusCode, String)>;

/// Identity and seed data for a `MockBackend`.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub token: String,
    pub email: String,
    pub user_id: i64,
    pub user_profile_identifier: String,
    /// Pre-existing activities. Missing `id`s are assigned and missing
    /// `userProfileId`s default to `user_id`.
    pub activities: Vec<Value>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            token: "test-token".to_string(),
            email: "me@example.com".to_string(),
            user_id: 4242,
            user_profile_identifier: "9f1c-profile".to_string(),
            activities: Vec::new(),
        }
    }
}

/// A blog activity numbered `n`, handy for seeding.
pub fn sample_activity(n: u64) -> Value {
    json!({
        "activityTypeName": "Blog",
        "typeName": "Blog",
        "date": format!("2024-01-{:02}T00:00:00.000Z", n % 28 + 1),
        "title": format!("Post {n}"),
        "description": format!("Blog post number {n}"),
        "isPrivate": false,
        "targetAudience": ["Developer"],
        "tenant": "MVP",
        "url": format!("https://blog.example.com/{n}"),
        "reach": 100,
        "quantity": 1,
        "role": "Author",
        "technologyFocusArea": "Web Development",
    })
}

struct Store {
    activities: Vec<Activity>,
    next_id: u64,
}

/// Cheaply cloneable handle to the fake backend's state.
#[derive(Clone)]
pub struct MockBackend {
    config: Arc<MockConfig>,
    store: Arc<RwLock<Store>>,
    requests: Arc<AtomicUsize>,
    search_calls: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new(config: MockConfig) -> Self {
        let mut store = Store {
            activities: Vec::new(),
            next_id: 1,
        };
        for seed in &config.activities {
            if let Value::Object(activity) = seed.clone() {
                store.insert(activity, config.user_id);
            }
        }
        Self {
            config: Arc::new(config),
            store: Arc::new(RwLock::new(store)),
            requests: Arc::new(AtomicUsize::new(0)),
            search_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/UserStatus/{email}", get(user_status))
            .route(
                "/api/Contributions/CommunityLeaderActivities/search",
                post(search_activities),
            )
            .route("/api/Activities/", post(create_activity).put(update_activity))
            .route("/api/Activities/{id}", delete(delete_activity))
            .route("/api/Contributions/HighImpact/{id}", put(mark_high_impact))
            .layer(middleware::from_fn_with_state(self.clone(), check_headers))
            .with_state(self.clone())
    }

    /// Requests that got past header validation.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub async fn activities(&self) -> Vec<Value> {
        let store = self.store.read().await;
        store.activities.iter().cloned().map(Value::Object).collect()
    }

    fn profile(&self) -> Value {
        json!({
            "userStatusModel": {
                "id": self.config.user_id,
                "userProfileIdentifier": self.config.user_profile_identifier,
                "email": self.config.email,
                "firstName": "Test",
                "lastName": "User",
            },
            "isMvp": true,
        })
    }
}

impl Store {
    fn insert(&mut self, mut activity: Activity, default_user: i64) -> Activity {
        let id = match activity.get("id").and_then(Value::as_u64) {
            Some(id) if id != 0 => {
                self.next_id = self.next_id.max(id + 1);
                id
            }
            _ => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        };
        activity.insert("id".to_string(), json!(id));
        activity
            .entry("userProfileId")
            .or_insert_with(|| json!(default_user));
        activity.entry("isHighImpact").or_insert(json!(false));
        self.activities.push(activity.clone());
        activity
    }

    fn find(&self, id: u64) -> Option<&Activity> {
        self.activities
            .iter()
            .find(|a| a.get("id").and_then(Value::as_u64) == Some(id))
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut Activity> {
        self.activities
            .iter_mut()
            .find(|a| a.get("id").and_then(Value::as_u64) == Some(id))
    }
}

/// Rejects requests without the right bearer token or a `|<uuid>` request id.
async fn check_headers(State(backend): State<MockBackend>, request: Request, next: Next) -> Response {
    let headers = request.headers();
    let expected = format!("Bearer {}", backend.config.token);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let request_id_ok = headers
        .get("request-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix('|'))
        .is_some_and(|v| Uuid::parse_str(v).is_ok());
    if !request_id_ok {
        return (StatusCode::BAD_REQUEST, "Missing or malformed request-id").into_response();
    }

    backend.requests.fetch_add(1, Ordering::SeqCst);
    debug!(method = %request.method(), uri = %request.uri(), "mock request");
    next.run(request).await
}

async fn user_status(State(backend): State<MockBackend>, Path(email): Path<String>) -> ApiResult<Json<Value>> {
    if email != backend.config.email {
        return Err((StatusCode::NOT_FOUND, format!("User {email} not found")));
    }
    Ok(Json(backend.profile()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub page_index: u64,
    pub page_size: u64,
    pub tenant: String,
    pub user_profile_identifier: String,
    #[serde(default)]
    pub contribution_target_audience: Vec<String>,
    #[serde(default)]
    pub technology_focus_area: Vec<String>,
    #[serde(default)]
    pub r#type: Vec<String>,
}

impl SearchRequest {
    fn matches(&self, activity: &Activity) -> bool {
        let str_field = |key: &str| activity.get(key).and_then(Value::as_str).unwrap_or_default();
        if !self.r#type.is_empty() && !self.r#type.iter().any(|t| t == str_field("typeName")) {
            return false;
        }
        if !self.technology_focus_area.is_empty()
            && !self
                .technology_focus_area
                .iter()
                .any(|t| t == str_field("technologyFocusArea"))
        {
            return false;
        }
        if !self.contribution_target_audience.is_empty() {
            let audience = activity
                .get("targetAudience")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if !self
                .contribution_target_audience
                .iter()
                .any(|t| audience.iter().any(|a| a.as_str() == Some(t.as_str())))
            {
                return false;
            }
        }
        true
    }
}

async fn search_activities(
    State(backend): State<MockBackend>,
    Json(search): Json<SearchRequest>,
) -> ApiResult<Json<Value>> {
    backend.search_calls.fetch_add(1, Ordering::SeqCst);
    if search.tenant != "MVP" {
        return Err((StatusCode::BAD_REQUEST, format!("Unknown tenant {}", search.tenant)));
    }
    if search.user_profile_identifier != backend.config.user_profile_identifier {
        return Err((StatusCode::FORBIDDEN, "Profile identifier mismatch".to_string()));
    }
    if search.page_index == 0 || search.page_size == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "pageIndex and pageSize must be positive".to_string(),
        ));
    }

    let store = backend.store.read().await;
    let matched: Vec<&Activity> = store
        .activities
        .iter()
        .filter(|a| a.get("userProfileId").and_then(Value::as_i64) == Some(backend.config.user_id))
        .filter(|a| search.matches(a))
        .collect();
    let out_of_range = || (StatusCode::BAD_REQUEST, "pageIndex or pageSize out of range".to_string());
    let skip = (search.page_index - 1)
        .checked_mul(search.page_size)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(out_of_range)?;
    let take = usize::try_from(search.page_size).map_err(|_| out_of_range())?;
    let page: Vec<&Activity> = matched.iter().copied().skip(skip).take(take).collect();

    Ok(Json(json!({
        "communityLeaderActivities": page,
        "filteredCount": matched.len(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ActivityEnvelope {
    pub activity: Activity,
}

/// Checks shared by create and update.
fn validate(backend: &MockBackend, activity: &Activity) -> ApiResult<()> {
    let has_title = activity
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty());
    if !has_title {
        return Err((StatusCode::BAD_REQUEST, "Activity title is required".to_string()));
    }
    if activity.get("userProfileId").and_then(Value::as_i64) != Some(backend.config.user_id) {
        return Err((
            StatusCode::FORBIDDEN,
            "userProfileId does not match the authenticated user".to_string(),
        ));
    }
    Ok(())
}

async fn create_activity(
    State(backend): State<MockBackend>,
    Json(envelope): Json<ActivityEnvelope>,
) -> ApiResult<Json<Value>> {
    validate(&backend, &envelope.activity)?;
    let mut store = backend.store.write().await;
    let created = store.insert(envelope.activity, backend.config.user_id);
    Ok(Json(Value::Object(created)))
}

async fn update_activity(
    State(backend): State<MockBackend>,
    Json(envelope): Json<ActivityEnvelope>,
) -> ApiResult<Json<Value>> {
    validate(&backend, &envelope.activity)?;
    let id = envelope
        .activity
        .get("id")
        .and_then(Value::as_u64)
        .ok_or((StatusCode::BAD_REQUEST, "Activity id is required".to_string()))?;

    let mut store = backend.store.write().await;
    let existing = store
        .find_mut(id)
        .ok_or((StatusCode::NOT_FOUND, format!("Activity {id} not found")))?;
    let high_impact = existing.get("isHighImpact").cloned().unwrap_or(json!(false));
    *existing = envelope.activity;
    existing.entry("isHighImpact").or_insert(high_impact);
    Ok(Json(Value::Object(existing.clone())))
}

async fn mark_high_impact(
    State(backend): State<MockBackend>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let flagged = &body["contribution"];
    if flagged["Id"].as_u64() != Some(id) || flagged["IsHighImpact"] != json!(true) {
        return Err((StatusCode::BAD_REQUEST, "Contribution does not match path".to_string()));
    }
    let mut store = backend.store.write().await;
    let activity = store
        .find_mut(id)
        .ok_or((StatusCode::NOT_FOUND, format!("Activity {id} not found")))?;
    activity.insert("isHighImpact".to_string(), json!(true));
    Ok(Json(json!(true)))
}

/// Answers success and keeps the activity, like the real service.
async fn delete_activity(State(backend): State<MockBackend>, Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    let store = backend.store.read().await;
    if store.find(id).is_none() {
        return Err((StatusCode::NOT_FOUND, format!("Activity {id} not found")));
    }
    Ok(Json(json!(true)))
}

pub fn app() -> Router {
    MockBackend::new(MockConfig::default()).router()
}

pub async fn run(listener: TcpListener, backend: MockBackend) -> Result<(), std::io::Error> {
    axum::serve(listener, backend.router()).await
}
