//! DTOs for the MVP activities API.
//!
//! # Design
//! Activities are forwarded as opaque JSON objects: the service owns their
//! schema and the client only injects the owner's id. `NewActivity` is a
//! typed convenience for the well-known fields. It serializes to the same
//! camelCase object the service expects, but callers may pass any `Serialize`
//! value that produces a JSON object.
//!
//! The user profile keeps every field it was sent (`extra`) so callers can
//! read whatever the service returns beyond the two ids the client needs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Program identifier sent with every search and every typed activity.
pub const TENANT: &str = "MVP";

/// An activity as the service sees it: an arbitrary JSON object.
pub type Activity = Map<String, Value>;

/// Profile returned by `UserStatus/{email}`, fetched once at initialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_status_model: UserStatusModel,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusModel {
    /// Internal user id, injected as `userProfileId` into activity payloads.
    pub id: i64,
    /// Identifier used to scope activity searches.
    pub user_profile_identifier: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn user_id(&self) -> i64 {
        self.user_status_model.id
    }

    pub fn user_profile_identifier(&self) -> &str {
        &self.user_status_model.user_profile_identifier
    }
}

/// Typed form of an activity submission.
///
/// Fields left as `None` are omitted from the payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub activity_type_name: String,
    pub type_name: String,
    /// ISO-8601 timestamp, e.g. `2023-05-08T23:00:00.000Z`.
    pub date: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub target_audience: Vec<String>,
    pub tenant: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reach: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology_focus_area: Option<String>,
    #[serde(default)]
    pub additional_technology_areas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewActivity {
    /// Activity of the given type with the tenant filled in and everything
    /// optional left empty.
    pub fn new(type_name: &str, title: &str, date: &str, url: &str, description: &str) -> Self {
        Self {
            id: None,
            activity_type_name: type_name.to_string(),
            type_name: type_name.to_string(),
            date: date.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            private_description: None,
            is_private: false,
            target_audience: Vec::new(),
            tenant: TENANT.to_string(),
            url: url.to_string(),
            reach: None,
            quantity: None,
            role: None,
            technology_focus_area: None,
            additional_technology_areas: Vec::new(),
            image_url: None,
        }
    }
}

/// Filters accepted by the activity search endpoint. Empty lists match all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub target_audience: Vec<String>,
    pub technology_focus_area: Vec<String>,
    pub types: Vec<String>,
}

/// Body of `Contributions/CommunityLeaderActivities/search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySearch {
    /// 1-based.
    pub page_index: u64,
    pub page_size: u64,
    pub tenant: String,
    pub user_profile_identifier: String,
    pub contribution_target_audience: Vec<String>,
    pub technology_focus_area: Vec<String>,
    pub r#type: Vec<String>,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPage {
    #[serde(default)]
    pub community_leader_activities: Vec<Activity>,
    /// Total matches across all pages.
    pub filtered_count: u64,
}

/// Body of `Contributions/HighImpact/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HighImpactUpdate {
    pub contribution: HighImpactFlag,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct HighImpactFlag {
    pub id: u64,
    pub is_high_impact: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_profile_keeps_unknown_fields() {
        let raw = r#"{
            "userStatusModel": {"id": 42, "userProfileIdentifier": "abc-123", "firstName": "Ada"},
            "isMvp": true
        }"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.user_id(), 42);
        assert_eq!(profile.user_profile_identifier(), "abc-123");
        assert_eq!(profile.user_status_model.extra["firstName"], "Ada");
        assert_eq!(profile.extra["isMvp"], true);
    }

    #[test]
    fn user_profile_requires_ids() {
        let raw = r#"{"userStatusModel": {"userProfileIdentifier": "abc-123"}}"#;
        assert!(serde_json::from_str::<UserProfile>(raw).is_err());
    }

    #[test]
    fn new_activity_serializes_camel_case_and_skips_empty_options() {
        let mut activity = NewActivity::new(
            "Blog",
            "My blog post",
            "2023-05-08T23:00:00.000Z",
            "https://myblog.com/my-post",
            "A blog post about something",
        );
        activity.reach = Some(2000);
        activity.target_audience = vec!["Developer".to_string()];

        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["activityTypeName"], "Blog");
        assert_eq!(json["typeName"], "Blog");
        assert_eq!(json["tenant"], "MVP");
        assert_eq!(json["reach"], 2000);
        assert_eq!(json["isPrivate"], false);
        assert_eq!(json["targetAudience"][0], "Developer");
        assert!(json.get("id").is_none());
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn search_body_uses_wire_names() {
        let search = ActivitySearch {
            page_index: 1,
            page_size: 50,
            tenant: TENANT.to_string(),
            user_profile_identifier: "abc".to_string(),
            contribution_target_audience: Vec::new(),
            technology_focus_area: Vec::new(),
            r#type: vec!["Blog".to_string()],
        };
        let json = serde_json::to_value(&search).unwrap();
        assert_eq!(json["pageIndex"], 1);
        assert_eq!(json["pageSize"], 50);
        assert_eq!(json["userProfileIdentifier"], "abc");
        assert_eq!(json["type"][0], "Blog");
        assert!(json["contributionTargetAudience"].as_array().unwrap().is_empty());
    }

    #[test]
    fn high_impact_body_is_pascal_case() {
        let body = HighImpactUpdate {
            contribution: HighImpactFlag {
                id: 7,
                is_high_impact: true,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"contribution": {"Id": 7, "IsHighImpact": true}}));
    }

    #[test]
    fn activity_page_tolerates_missing_list() {
        let page: ActivityPage = serde_json::from_str(r#"{"filteredCount": 0}"#).unwrap();
        assert!(page.community_leader_activities.is_empty());
        assert_eq!(page.filtered_count, 0);
    }
}
