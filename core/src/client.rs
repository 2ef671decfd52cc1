//! Client for the MVP activities API.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a parse step that consumes the `HttpResponse`. The
//! executing methods (`initialize`, `submit_activity`, ...) glue the two
//! together through the client's `Transport`, so hosts that want to do
//! their own I/O can call the `build_*` methods directly.
//!
//! The only state is the user profile fetched by `initialize()`. Until it is
//! present every data operation fails with `ApiError::NotInitialized` before
//! anything is sent.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{ClientConfig, Credentials};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{
    Activity, ActivityFilter, ActivityPage, ActivitySearch, HighImpactFlag, HighImpactUpdate, UserProfile, TENANT,
};

/// Activities requested per search page.
pub const PAGE_SIZE: u64 = 50;

/// Headers sent verbatim with every request. The service rejects calls that
/// don't look like they came from the MVP portal.
const STATIC_HEADERS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    ("accept-language", "en-GB,en-US;q=0.9,en;q=0.8"),
    ("content-type", "application/json"),
    ("request-context", "appId=cid-v1:2db9d7c1-6193-4a5a-b311-b0996a53daee"),
    (
        "sec-ch-ua",
        r#""Not A(Brand";v="99", "Google Chrome";v="121", "Chromium";v="121""#,
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""macOS""#),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "cross-site"),
    ("referer", "https://mvp.microsoft.com/"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
];

/// Blocking client for the MVP activities API.
///
/// # Example
/// ```no_run
/// use mvp_activities::MvpActivitiesClient;
///
/// // Falls back to MVP_API_TOKEN / MVP_API_EMAIL.
/// let mut client = MvpActivitiesClient::new(None, None)?;
/// client.initialize()?;
/// for activity in client.list_submitted_activities()? {
///     println!("{}", activity["title"]);
/// }
/// # Ok::<(), mvp_activities::ApiError>(())
/// ```
#[derive(Debug)]
pub struct MvpActivitiesClient<T = UreqTransport> {
    base_url: String,
    credentials: Credentials,
    transport: T,
    profile: Option<UserProfile>,
}

impl MvpActivitiesClient<UreqTransport> {
    /// Create a client over HTTPS, resolving any missing credential from
    /// `MVP_API_TOKEN` / `MVP_API_EMAIL`.
    pub fn new(auth_token: Option<&str>, email: Option<&str>) -> Result<Self, ApiError> {
        let config = ClientConfig::from_env(auth_token, email)?;
        Ok(Self::with_transport(config, UreqTransport::new()))
    }
}

impl<T: Transport> MvpActivitiesClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            base_url: config.base_url,
            credentials: config.credentials,
            transport,
            profile: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn email(&self) -> &str {
        &self.credentials.email
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The cached profile, or `None` before `initialize()`.
    pub fn user_profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.profile.is_some()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Fetch and cache the user profile. Must succeed before any other call.
    ///
    /// On failure the client stays uninitialized. Calling it again refetches.
    pub fn initialize(&mut self) -> Result<&UserProfile, ApiError> {
        let request = self.build_get_user_profile();
        let profile = parse_user_profile(self.send(request)?)?;
        info!(
            email = %self.credentials.email,
            user_id = profile.user_id(),
            "client initialized"
        );
        Ok(&*self.profile.insert(profile))
    }

    /// Create an activity. `userProfileId` and `id: 0` are injected; fields
    /// present in `activity` override them.
    pub fn submit_activity<A: Serialize + ?Sized>(&self, activity: &A) -> Result<Value, ApiError> {
        let request = self.build_submit_activity(activity)?;
        parse_json(self.send(request)?)
    }

    /// Update an existing activity. `activity` must carry the activity `id`.
    pub fn update_activity<A: Serialize + ?Sized>(&self, activity: &A) -> Result<Value, ApiError> {
        let request = self.build_update_activity(activity)?;
        parse_json(self.send(request)?)
    }

    pub fn mark_as_high_impact(&self, activity_id: u64) -> Result<Value, ApiError> {
        let request = self.build_mark_as_high_impact(activity_id)?;
        parse_json(self.send(request)?)
    }

    /// Delete an activity.
    ///
    /// The service currently answers successfully without removing
    /// anything: the activity shows up again in the next listing. The MVP
    /// portal behaves the same way.
    pub fn delete_activity(&self, activity_id: u64) -> Result<Value, ApiError> {
        let request = self.build_delete_activity(activity_id)?;
        parse_json(self.send(request)?)
    }

    /// All activities submitted by the user, in page order.
    pub fn list_submitted_activities(&self) -> Result<Vec<Activity>, ApiError> {
        self.list_submitted_activities_matching(&ActivityFilter::default())
    }

    /// Like `list_submitted_activities`, restricted by `filter`.
    ///
    /// Pages are fetched one at a time. The page count is recomputed from
    /// `filteredCount` after every response, and any failing page aborts the
    /// whole listing.
    pub fn list_submitted_activities_matching(&self, filter: &ActivityFilter) -> Result<Vec<Activity>, ApiError> {
        let mut activities = Vec::new();
        let mut num_pages = 1;
        let mut page_index = 1;
        while page_index <= num_pages {
            let request = self.build_search_page(page_index, filter)?;
            let page = parse_activity_page(self.send(request)?)?;
            activities.extend(page.community_leader_activities);
            num_pages = page.filtered_count.div_ceil(PAGE_SIZE);
            debug!(page_index, num_pages, fetched = activities.len(), "fetched activity page");
            page_index += 1;
        }
        Ok(activities)
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_get_user_profile(&self) -> HttpRequest {
        self.request(HttpMethod::Get, format!("/UserStatus/{}", self.credentials.email), None)
    }

    pub fn build_submit_activity<A: Serialize + ?Sized>(&self, activity: &A) -> Result<HttpRequest, ApiError> {
        let profile = self.require_profile()?;
        let mut injected = Activity::new();
        injected.insert("userProfileId".to_string(), json!(profile.user_id()));
        injected.insert("id".to_string(), json!(0));
        let body = activity_body(activity, injected)?;
        Ok(self.request(HttpMethod::Post, "/Activities/".to_string(), Some(body)))
    }

    pub fn build_update_activity<A: Serialize + ?Sized>(&self, activity: &A) -> Result<HttpRequest, ApiError> {
        let profile = self.require_profile()?;
        let mut injected = Activity::new();
        injected.insert("userProfileId".to_string(), json!(profile.user_id()));
        let body = activity_body(activity, injected)?;
        Ok(self.request(HttpMethod::Put, "/Activities/".to_string(), Some(body)))
    }

    pub fn build_mark_as_high_impact(&self, activity_id: u64) -> Result<HttpRequest, ApiError> {
        self.require_profile()?;
        let payload = HighImpactUpdate {
            contribution: HighImpactFlag {
                id: activity_id,
                is_high_impact: true,
            },
        };
        let body = serde_json::to_string(&payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(
            HttpMethod::Put,
            format!("/Contributions/HighImpact/{activity_id}"),
            Some(body),
        ))
    }

    pub fn build_delete_activity(&self, activity_id: u64) -> Result<HttpRequest, ApiError> {
        self.require_profile()?;
        Ok(self.request(HttpMethod::Delete, format!("/Activities/{activity_id}"), None))
    }

    /// Request for one search page. `page_index` is 1-based.
    pub fn build_search_page(&self, page_index: u64, filter: &ActivityFilter) -> Result<HttpRequest, ApiError> {
        let profile = self.require_profile()?;
        let search = ActivitySearch {
            page_index,
            page_size: PAGE_SIZE,
            tenant: TENANT.to_string(),
            user_profile_identifier: profile.user_profile_identifier().to_string(),
            contribution_target_audience: filter.target_audience.clone(),
            technology_focus_area: filter.technology_focus_area.clone(),
            r#type: filter.types.clone(),
        };
        let body = serde_json::to_string(&search).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(
            HttpMethod::Post,
            "/Contributions/CommunityLeaderActivities/search".to_string(),
            Some(body),
        ))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_profile(&self) -> Result<&UserProfile, ApiError> {
        self.profile.as_ref().ok_or(ApiError::NotInitialized)
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: self.headers(),
            body,
        }
    }

    /// Static headers plus a fresh `request-id` and the bearer token.
    fn headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = STATIC_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        headers.push(("request-id".to_string(), format!("|{}", Uuid::new_v4())));
        headers.push((
            "authorization".to_string(),
            format!("Bearer {}", self.credentials.auth_token),
        ));
        headers
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}

/// Merge the caller's fields over `injected` and wrap them as `{"activity": ..}`.
fn activity_body<A: Serialize + ?Sized>(activity: &A, injected: Activity) -> Result<String, ApiError> {
    let fields = match serde_json::to_value(activity).map_err(|e| ApiError::Serialization(e.to_string()))? {
        Value::Object(fields) => fields,
        other => {
            return Err(ApiError::Serialization(format!(
                "activity must serialize to a JSON object, got {other}"
            )))
        }
    };
    let mut merged = injected;
    merged.extend(fields);
    serde_json::to_string(&json!({ "activity": merged })).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Any status >= 400 is a failure carrying the raw body.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status >= 400 {
        return Err(ApiError::Request {
            status: response.status,
            body: response.body.clone(),
        });
    }
    Ok(())
}

/// Decode a successful response. An empty body decodes to `null`.
fn parse_json(response: HttpResponse) -> Result<Value, ApiError> {
    check_status(&response)?;
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn parse_user_profile(response: HttpResponse) -> Result<UserProfile, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn parse_activity_page(response: HttpResponse) -> Result<ActivityPage, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
