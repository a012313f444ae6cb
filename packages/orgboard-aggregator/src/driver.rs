//! Exhaustion drivers: one task per connection, fetching pages in strict
//! sequence until the source reports no further pages.
use crate::aggregate::SourceStats;
use crate::state::Source;
use orgboard_graphql::client::ConnectionClient;
use orgboard_graphql::connection::{Connection, Edge};
use orgboard_graphql::queries::ConnectionQuery;
use orgboard_types::org::MembershipRequest;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Progress reported by a driver task back to the service.
#[derive(Debug, Clone)]
pub enum DriverEvent {
    /// A page was merged and more pages remain.
    Page {
        source: Source,
        generation: u64,
        stats: SourceStats,
    },
    /// The source reported no further pages. Terminal.
    Exhausted {
        source: Source,
        generation: u64,
        stats: SourceStats,
    },
    /// A page fetch failed. Terminal; pages merged before the failure
    /// stay in the stats last reported for the source.
    Failed { source: Source, generation: u64 },
    /// Result of the one-shot membership request fetch, `None` on failure.
    MembershipRequests {
        generation: u64,
        requests: Option<Vec<MembershipRequest>>,
    },
}

impl DriverEvent {
    /// Generation of the dashboard instance the event belongs to. The
    /// service discards events from retired generations.
    pub fn generation(&self) -> u64 {
        match self {
            DriverEvent::Page { generation, .. }
            | DriverEvent::Exhausted { generation, .. }
            | DriverEvent::Failed { generation, .. }
            | DriverEvent::MembershipRequests { generation, .. } => *generation,
        }
    }
}

/// Everything a driver task needs to run one connection to exhaustion.
pub struct DriverContext<N> {
    pub source: Source,
    pub query: ConnectionQuery,
    pub parent_id: String,
    pub generation: u64,
    pub client: Arc<dyn ConnectionClient>,
    pub events: mpsc::Sender<DriverEvent>,
    pub kill_switch: Arc<AtomicBool>,
    pub reduce: fn(&[Edge<N>]) -> SourceStats,
}

/// Run one connection until it is exhausted, fails, or is torn down.
///
/// Pages are requested strictly in order: page N+1 is never requested
/// before page N's response has been merged, since each request's cursor
/// comes from the previous page. `Exhausted` and `Failed` end the task,
/// which is what makes them one-shot; only a parent swap (a new driver
/// for a new connection instance) fetches this source again.
pub fn run_driver<N>(ctx: DriverContext<N>) -> impl Future<Output = ()>
where
    N: DeserializeOwned + Send + Sync + 'static,
{
    let DriverContext {
        source,
        query,
        parent_id,
        generation,
        client,
        events,
        kill_switch,
        reduce,
    } = ctx;

    async move {
        let mut connection: Connection<N> = Connection::default();
        let mut after: Option<String> = None;

        loop {
            if kill_switch.load(Ordering::SeqCst) {
                debug!("Driver({source}) for Org({parent_id}) torn down. Stopping.");
                return;
            }

            debug!("Driver({source}) fetching page after cursor {after:?}");

            let page = match client
                .fetch_page(&query, &parent_id, after.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    error!("Driver({source}) page fetch failed: {e:?}");
                    let _ = events.send(DriverEvent::Failed { source, generation }).await;
                    return;
                }
            };

            let page = match page.into_typed::<N>() {
                Ok(page) => page,
                Err(e) => {
                    error!("Driver({source}) received misshapen nodes: {e:?}");
                    let _ = events.send(DriverEvent::Failed { source, generation }).await;
                    return;
                }
            };

            connection.merge(page);
            let stats = reduce(connection.edges());

            if !connection.has_next_page() {
                debug!("Driver({source}) exhausted after {} edges.", connection.len());
                let _ = events
                    .send(DriverEvent::Exhausted {
                        source,
                        generation,
                        stats,
                    })
                    .await;
                return;
            }

            match connection.end_cursor() {
                Some(cursor) if after.as_deref() != Some(cursor) => {
                    after = Some(cursor.to_string());
                    if events
                        .send(DriverEvent::Page {
                            source,
                            generation,
                            stats,
                        })
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
                _ => {
                    warn!("Driver({source}) cursor did not advance. Treating source as exhausted.");
                    let _ = events
                        .send(DriverEvent::Exhausted {
                            source,
                            generation,
                            stats,
                        })
                        .await;
                    return;
                }
            }
        }
    }
}

/// Everything the membership fetch task needs.
pub struct MembershipContext {
    pub parent_id: String,
    pub generation: u64,
    pub first: u32,
    pub client: Arc<dyn ConnectionClient>,
    pub events: mpsc::Sender<DriverEvent>,
    pub kill_switch: Arc<AtomicBool>,
}

/// Fetch the first page of membership requests. This source is bounded by
/// design and never paginated further.
pub fn run_membership_fetch(ctx: MembershipContext) -> impl Future<Output = ()> {
    let MembershipContext {
        parent_id,
        generation,
        first,
        client,
        events,
        kill_switch,
    } = ctx;

    async move {
        if kill_switch.load(Ordering::SeqCst) {
            return;
        }

        let requests = match client.fetch_membership_requests(&parent_id, first).await {
            Ok(requests) => Some(requests),
            Err(e) => {
                warn!("Fetching membership requests for Org({parent_id}) failed: {e:?}");
                None
            }
        };

        let _ = events
            .send(DriverEvent::MembershipRequests {
                generation,
                requests,
            })
            .await;
    }
}
