//! Organization entities as they appear on the wire.
//!
//! Every field name maps to the camelCase selection used by the dashboard
//! queries; anything the server sends beyond these selections is ignored.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier shared by all organization entities.
pub type ID = String;

/// Membership role within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Administrator,
    Regular,
    /// Role values this client does not know about yet.
    #[serde(other)]
    Unknown,
}

/// A member of the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: ID,
    pub name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    pub role: MemberRole,
}

impl Member {
    /// Whether this member holds the administrator role.
    pub fn is_administrator(&self) -> bool {
        self.role == MemberRole::Administrator
    }
}

/// An event scheduled by the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgEvent {
    pub id: ID,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_registerable: bool,
}

impl OrgEvent {
    /// Whether the event starts strictly after the given instant.
    pub fn starts_after(&self, instant: DateTime<Utc>) -> bool {
        self.start_at > instant
    }
}

/// A post published to the organization feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: ID,
    pub caption: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub creator: Option<PostCreator>,
}

/// The author of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCreator {
    pub id: ID,
    pub name: String,
}

/// A user blocked from the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedUser {
    pub id: ID,
    pub name: String,
    #[serde(default)]
    pub email_address: Option<String>,
}

/// A venue registered with the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: ID,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// A pending request to join the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub id: ID,
    pub user: RequestingUser,
}

/// The user behind a membership request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestingUser {
    pub name: String,
    #[serde(default)]
    pub email_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_deserializes_from_camel_case() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "id": "member:1",
            "name": "Ada",
            "emailAddress": "ada@example.org",
            "role": "administrator"
        }))
        .unwrap();

        assert_eq!(member.role, MemberRole::Administrator);
        assert!(member.is_administrator());
    }

    #[test]
    fn unknown_role_does_not_fail_deserialization() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "id": "member:2",
            "name": "Grace",
            "emailAddress": null,
            "role": "steward"
        }))
        .unwrap();

        assert_eq!(member.role, MemberRole::Unknown);
        assert!(!member.is_administrator());
    }

    #[test]
    fn event_parses_rfc3339_timestamps() {
        let event: OrgEvent = serde_json::from_value(serde_json::json!({
            "id": "event:1",
            "name": "Town hall",
            "description": null,
            "startAt": "2031-05-01T18:00:00Z",
            "endAt": "2031-05-01T19:30:00Z",
            "allDay": false,
            "location": "Main hall",
            "isPublic": true,
            "isRegisterable": true
        }))
        .unwrap();

        let cutoff: DateTime<Utc> = "2031-05-01T00:00:00Z".parse().unwrap();
        assert!(event.starts_after(cutoff));
        assert!(!event.starts_after(event.start_at));
    }
}
