//! Per-connection bookkeeping for the exhaustion engine.
use crate::aggregate::SourceStats;
use orgboard_types::org::MembershipRequest;
use std::fmt;

/// The paginated sources the dashboard tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Members,
    Events,
    Posts,
    BlockedUsers,
    Venues,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Members,
        Source::Events,
        Source::Posts,
        Source::BlockedUsers,
        Source::Venues,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Source::Members => "members",
            Source::Events => "events",
            Source::Posts => "posts",
            Source::BlockedUsers => "blockedUsers",
            Source::Venues => "venues",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of one connection instance.
///
/// `Exhausted` and `Failed` are terminal: a connection never leaves them.
/// A parent swap tears the instance down and builds a fresh one starting
/// over at `Fetching`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No request issued yet.
    Idle,
    /// One page request in flight.
    Fetching,
    /// Every page has been fetched and merged.
    Exhausted,
    /// A page request failed; pages merged before the failure are kept.
    Failed,
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Exhausted | ConnectionState::Failed)
    }
}

/// Tracking for one connection instance owned by the service.
#[derive(Debug, Clone)]
pub struct SourceSlot {
    pub state: ConnectionState,
    /// Whether any response (page, exhaustion, or failure) has arrived.
    pub first_response: bool,
    /// The last aggregate reported by the driver. Final once `state` is
    /// `Exhausted`, a prefix of the true value before that.
    pub stats: SourceStats,
}

impl SourceSlot {
    pub fn new(source: Source) -> Self {
        Self {
            state: ConnectionState::Fetching,
            first_response: false,
            stats: SourceStats::zero(source),
        }
    }

    /// A source counts as loading only until its first response; deeper
    /// page fetches do not.
    pub fn is_loading(&self) -> bool {
        !self.first_response && !self.state.is_terminal()
    }
}

/// Tracking for the one-shot membership request fetch.
#[derive(Debug, Clone)]
pub struct MembershipSlot {
    pub loading: bool,
    pub requests: Vec<MembershipRequest>,
}

impl MembershipSlot {
    pub fn new() -> Self {
        Self {
            loading: true,
            requests: Vec::new(),
        }
    }
}

impl Default for MembershipSlot {
    fn default() -> Self {
        Self::new()
    }
}
