//! Pure aggregation over accumulated connection edges.
//!
//! Aggregates are recomputed from the full edge list every time it changes
//! rather than maintained incrementally, so a reducer is always a pure
//! function of the edges it is handed.
use crate::state::{ConnectionState, MembershipSlot, Source, SourceSlot};
use chrono::Utc;
use orgboard_graphql::connection::Edge;
use orgboard_lib::defaults;
use orgboard_types::prelude::*;
use std::collections::HashMap;

/// Count edges whose node satisfies the predicate.
pub fn count_matching<N>(edges: &[Edge<N>], predicate: impl Fn(&N) -> bool) -> usize {
    edges.iter().filter(|edge| predicate(&edge.node)).count()
}

/// Collect nodes satisfying the predicate, preserving source order and
/// truncating once `cap` nodes have been kept.
pub fn filter_capped<N: Clone>(
    edges: &[Edge<N>],
    predicate: impl Fn(&N) -> bool,
    cap: usize,
) -> Vec<N> {
    edges
        .iter()
        .filter(|edge| predicate(&edge.node))
        .take(cap)
        .map(|edge| edge.node.clone())
        .collect()
}

/// Scalars derived from one source's accumulated edges.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceStats {
    Members {
        member_count: usize,
        admin_count: usize,
    },
    Events {
        event_count: usize,
        upcoming_events: Vec<OrgEvent>,
    },
    Posts {
        post_count: usize,
    },
    BlockedUsers {
        blocked_count: usize,
    },
    Venues {
        venue_count: usize,
    },
}

impl SourceStats {
    /// The value a source contributes before any page has arrived.
    pub fn zero(source: Source) -> Self {
        match source {
            Source::Members => SourceStats::Members {
                member_count: 0,
                admin_count: 0,
            },
            Source::Events => SourceStats::Events {
                event_count: 0,
                upcoming_events: Vec::new(),
            },
            Source::Posts => SourceStats::Posts { post_count: 0 },
            Source::BlockedUsers => SourceStats::BlockedUsers { blocked_count: 0 },
            Source::Venues => SourceStats::Venues { venue_count: 0 },
        }
    }
}

pub fn member_stats(edges: &[Edge<Member>]) -> SourceStats {
    SourceStats::Members {
        member_count: edges.len(),
        admin_count: count_matching(edges, Member::is_administrator),
    }
}

pub fn event_stats(edges: &[Edge<OrgEvent>]) -> SourceStats {
    let now = Utc::now();
    SourceStats::Events {
        event_count: edges.len(),
        upcoming_events: filter_capped(
            edges,
            |event| event.starts_after(now),
            defaults::UPCOMING_EVENTS_CAP,
        ),
    }
}

pub fn post_stats(edges: &[Edge<Post>]) -> SourceStats {
    SourceStats::Posts {
        post_count: edges.len(),
    }
}

pub fn blocked_user_stats(edges: &[Edge<BlockedUser>]) -> SourceStats {
    SourceStats::BlockedUsers {
        blocked_count: edges.len(),
    }
}

pub fn venue_stats(edges: &[Edge<Venue>]) -> SourceStats {
    SourceStats::Venues {
        venue_count: edges.len(),
    }
}

/// The assembled dashboard view handed to consumers.
///
/// Each scalar is only guaranteed accurate once its backing connection has
/// been exhausted; before that it reflects the pages merged so far, a
/// strictly smaller prefix of the true value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateRecord {
    pub member_count: usize,
    pub admin_count: usize,
    pub event_count: usize,
    pub post_count: usize,
    pub blocked_count: usize,
    pub venue_count: usize,
    /// Events starting in the future, capped and in source order.
    pub upcoming_events: Vec<OrgEvent>,
    pub membership_requests: Vec<MembershipRequest>,
    pub loading_membership_requests: bool,
    /// True while any tracked source has yet to produce its first
    /// response. A source that is mid-exhaustion (page one merged, page
    /// two in flight) is not loading, so aggregates can briefly
    /// under-count while deeper pages arrive.
    pub is_loading: bool,
    /// True if any tracked source failed terminally.
    pub has_error: bool,
}

/// Union the per-source slots into the record consumers see.
pub fn build_record(
    slots: &HashMap<Source, SourceSlot>,
    membership: &MembershipSlot,
) -> AggregateRecord {
    let mut record = AggregateRecord {
        membership_requests: membership.requests.clone(),
        loading_membership_requests: membership.loading,
        ..Default::default()
    };

    for slot in slots.values() {
        record.is_loading |= slot.is_loading();
        record.has_error |= slot.state == ConnectionState::Failed;

        match &slot.stats {
            SourceStats::Members {
                member_count,
                admin_count,
            } => {
                record.member_count = *member_count;
                record.admin_count = *admin_count;
            }
            SourceStats::Events {
                event_count,
                upcoming_events,
            } => {
                record.event_count = *event_count;
                record.upcoming_events = upcoming_events.clone();
            }
            SourceStats::Posts { post_count } => record.post_count = *post_count,
            SourceStats::BlockedUsers { blocked_count } => {
                record.blocked_count = *blocked_count
            }
            SourceStats::Venues { venue_count } => record.venue_count = *venue_count,
        }
    }

    record
}
