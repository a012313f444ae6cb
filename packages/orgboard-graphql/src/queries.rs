//! Query documents for the organization dashboard sources.
//!
//! Every paginated document shares the same variable set (`$id`, `$first`,
//! `$after`) and the same `edges`/`pageInfo` selection, which is all the
//! engine requires of a source. Entity and field names are carried as data
//! so the engine itself stays agnostic to them.

/// Describes one paginated source: where its connection lives in the
/// response and how it is fetched.
#[derive(Debug, Clone)]
pub struct ConnectionQuery {
    /// Response key the parent entity is returned under.
    pub entity: &'static str,
    /// Connection field on the parent entity.
    pub field: &'static str,
    /// The query document sent to the server.
    pub document: &'static str,
    /// Edges requested per page, fixed for the lifetime of the source.
    pub page_size: u32,
}

impl ConnectionQuery {
    pub fn members(page_size: u32) -> Self {
        Self {
            entity: "organization",
            field: "members",
            document: GET_ORGANIZATION_MEMBERS,
            page_size,
        }
    }

    pub fn events(page_size: u32) -> Self {
        Self {
            entity: "organization",
            field: "events",
            document: GET_ORGANIZATION_EVENTS,
            page_size,
        }
    }

    pub fn posts(page_size: u32) -> Self {
        Self {
            entity: "organization",
            field: "posts",
            document: GET_ORGANIZATION_POSTS,
            page_size,
        }
    }

    pub fn blocked_users(page_size: u32) -> Self {
        Self {
            entity: "organization",
            field: "blockedUsers",
            document: GET_ORGANIZATION_BLOCKED_USERS,
            page_size,
        }
    }

    pub fn venues(page_size: u32) -> Self {
        Self {
            entity: "organization",
            field: "venues",
            document: GET_ORGANIZATION_VENUES,
            page_size,
        }
    }
}

pub const GET_ORGANIZATION_MEMBERS: &str = r#"
query GetOrganizationMembers($id: String!, $first: Int, $after: String) {
  organization(input: { id: $id }) {
    members(first: $first, after: $after) {
      edges {
        node {
          id
          name
          emailAddress
          role
        }
        cursor
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

pub const GET_ORGANIZATION_EVENTS: &str = r#"
query GetOrganizationEvents($id: String!, $first: Int, $after: String) {
  organization(input: { id: $id }) {
    events(first: $first, after: $after) {
      edges {
        node {
          id
          name
          description
          startAt
          endAt
          allDay
          location
          isPublic
          isRegisterable
        }
        cursor
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

pub const GET_ORGANIZATION_POSTS: &str = r#"
query GetOrganizationPosts($id: String!, $first: Int, $after: String) {
  organization(input: { id: $id }) {
    posts(first: $first, after: $after) {
      edges {
        node {
          id
          caption
          createdAt
          creator {
            id
            name
          }
        }
        cursor
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

pub const GET_ORGANIZATION_BLOCKED_USERS: &str = r#"
query GetOrganizationBlockedUsers($id: String!, $first: Int, $after: String) {
  organization(input: { id: $id }) {
    blockedUsers(first: $first, after: $after) {
      edges {
        node {
          id
          name
          emailAddress
        }
        cursor
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

pub const GET_ORGANIZATION_VENUES: &str = r#"
query GetOrganizationVenues($id: String!, $first: Int, $after: String) {
  organization(input: { id: $id }) {
    venues(first: $first, after: $after) {
      edges {
        node {
          id
          name
          description
          capacity
        }
        cursor
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

pub const GET_MEMBERSHIP_REQUESTS: &str = r#"
query GetMembershipRequests($id: String!, $first: Int) {
  organization(input: { id: $id }) {
    membershipRequests(first: $first) {
      id
      user {
        name
        emailAddress
      }
    }
  }
}
"#;
