//! Primary service used to drive all dashboard sources for one
//! organization and publish the assembled aggregate view.
use crate::aggregate::{self, AggregateRecord, SourceStats};
use crate::driver::{
    run_driver, run_membership_fetch, DriverContext, DriverEvent, MembershipContext,
};
use crate::sink::ErrorSink;
use crate::state::{ConnectionState, MembershipSlot, Source, SourceSlot};
use crate::{AggregatorError, AggregatorResult};
use futures::channel::oneshot;
use orgboard_graphql::client::ConnectionClient;
use orgboard_graphql::connection::Edge;
use orgboard_graphql::queries::ConnectionQuery;
use orgboard_lib::defaults;
use orgboard_types::prelude::*;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// A request sent from a handle to the running service.
#[derive(Debug)]
pub enum ServiceCommand {
    /// Tear down the current dashboard (if any) and, when an id is given,
    /// build a fresh one for it.
    SetParent { parent_id: Option<String> },
    /// Notify once every source of the current dashboard is terminal.
    Quiesce { notify: oneshot::Sender<()> },
}

/// Consumer-facing handle to a spawned [`DashboardService`].
#[derive(Clone)]
pub struct DashboardHandle {
    commands: mpsc::Sender<ServiceCommand>,
    records: watch::Receiver<AggregateRecord>,
}

impl DashboardHandle {
    /// Swap the organization the dashboard aggregates. `None` clears it
    /// and publishes a zeroed record.
    pub async fn set_parent(&self, parent_id: Option<String>) -> AggregatorResult<()> {
        self.commands
            .send(ServiceCommand::SetParent { parent_id })
            .await
            .map_err(|_| AggregatorError::ServiceStopped)
    }

    /// Watch the aggregate record as it evolves.
    pub fn subscribe(&self) -> watch::Receiver<AggregateRecord> {
        self.records.clone()
    }

    /// The most recently published record.
    pub fn latest(&self) -> AggregateRecord {
        self.records.borrow().clone()
    }

    /// Wait until every source of the current dashboard has reached a
    /// terminal state. Resolves immediately when no dashboard is active.
    pub async fn quiesce(&self) -> AggregatorResult<()> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(ServiceCommand::Quiesce { notify: tx })
            .await
            .map_err(|_| AggregatorError::ServiceStopped)?;
        rx.await.map_err(|_| AggregatorError::QuiesceInterrupted)
    }
}

/// State for the dashboard instance currently being aggregated.
struct ActiveDashboard {
    parent_id: String,
    generation: u64,
    slots: HashMap<Source, SourceSlot>,
    membership: MembershipSlot,
    /// Flipped on teardown so the generation's drivers stop fetching.
    kill_switch: Arc<AtomicBool>,
    /// Driver tasks (including the membership fetch) not yet terminal.
    remaining_drivers: usize,
    quiesce_waiters: Vec<oneshot::Sender<()>>,
}

impl ActiveDashboard {
    fn new(parent_id: String, generation: u64) -> Self {
        let slots = Source::ALL
            .into_iter()
            .map(|source| (source, SourceSlot::new(source)))
            .collect();

        Self {
            parent_id,
            generation,
            slots,
            membership: MembershipSlot::new(),
            kill_switch: Arc::new(AtomicBool::new(false)),
            remaining_drivers: Source::ALL.len() + 1,
            quiesce_waiters: Vec::new(),
        }
    }
}

/// Owns the driver tasks and the published record for one consumer.
pub struct DashboardService {
    client: Arc<dyn ConnectionClient>,
    error_sink: Arc<dyn ErrorSink>,
    commands: mpsc::Receiver<ServiceCommand>,
    events_tx: mpsc::Sender<DriverEvent>,
    events_rx: mpsc::Receiver<DriverEvent>,
    records: watch::Sender<AggregateRecord>,
    generation: u64,
    active: Option<ActiveDashboard>,
}

impl DashboardService {
    /// Create a service and the handle used to talk to it. The service
    /// does nothing until [`DashboardService::run`] is awaited, typically
    /// inside `tokio::spawn`.
    pub fn new(
        client: Arc<dyn ConnectionClient>,
        error_sink: Arc<dyn ErrorSink>,
    ) -> (DashboardService, DashboardHandle) {
        let (commands_tx, commands_rx) =
            mpsc::channel(defaults::SERVICE_COMMAND_CHANNEL_SIZE);
        let (events_tx, events_rx) = mpsc::channel(defaults::DRIVER_EVENT_CHANNEL_SIZE);
        let (records_tx, records_rx) = watch::channel(AggregateRecord::default());

        let service = DashboardService {
            client,
            error_sink,
            commands: commands_rx,
            events_tx,
            events_rx,
            records: records_tx,
            generation: 0,
            active: None,
        };

        let handle = DashboardHandle {
            commands: commands_tx,
            records: records_rx,
        };

        (service, handle)
    }

    /// Kick it off! Runs until every handle has been dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(ServiceCommand::SetParent { parent_id }) => {
                        self.set_parent(parent_id)
                    }
                    Some(ServiceCommand::Quiesce { notify }) => self.quiesce(notify),
                    None => {
                        info!("All dashboard handles dropped. Stopping service.");
                        break;
                    }
                },
                Some(event) = self.events_rx.recv() => self.apply(event),
            }
        }
    }

    fn set_parent(&mut self, parent_id: Option<String>) {
        if let Some(previous) = self.active.take() {
            info!("Tearing down dashboard for Org({}).", previous.parent_id);
            previous.kill_switch.store(true, Ordering::SeqCst);
            for notify in previous.quiesce_waiters {
                let _ = notify.send(());
            }
        }

        self.generation += 1;

        if let Some(parent_id) = parent_id {
            info!("Building dashboard for Org({parent_id}).");
            let active = ActiveDashboard::new(parent_id, self.generation);
            self.spawn_drivers(&active);
            self.active = Some(active);
        }

        self.publish();
    }

    fn spawn_drivers(&self, active: &ActiveDashboard) {
        for source in Source::ALL {
            match source {
                Source::Members => self.spawn_driver::<Member>(
                    source,
                    ConnectionQuery::members(defaults::MEMBERS_PAGE_SIZE),
                    aggregate::member_stats,
                    active,
                ),
                Source::Events => self.spawn_driver::<OrgEvent>(
                    source,
                    ConnectionQuery::events(defaults::EVENTS_PAGE_SIZE),
                    aggregate::event_stats,
                    active,
                ),
                Source::Posts => self.spawn_driver::<Post>(
                    source,
                    ConnectionQuery::posts(defaults::POSTS_PAGE_SIZE),
                    aggregate::post_stats,
                    active,
                ),
                Source::BlockedUsers => self.spawn_driver::<BlockedUser>(
                    source,
                    ConnectionQuery::blocked_users(defaults::BLOCKED_USERS_PAGE_SIZE),
                    aggregate::blocked_user_stats,
                    active,
                ),
                Source::Venues => self.spawn_driver::<Venue>(
                    source,
                    ConnectionQuery::venues(defaults::VENUES_PAGE_SIZE),
                    aggregate::venue_stats,
                    active,
                ),
            }
        }

        tokio::spawn(run_membership_fetch(MembershipContext {
            parent_id: active.parent_id.clone(),
            generation: active.generation,
            first: defaults::MEMBERSHIP_REQUESTS_FIRST,
            client: Arc::clone(&self.client),
            events: self.events_tx.clone(),
            kill_switch: Arc::clone(&active.kill_switch),
        }));
    }

    fn spawn_driver<N>(
        &self,
        source: Source,
        query: ConnectionQuery,
        reduce: fn(&[Edge<N>]) -> SourceStats,
        active: &ActiveDashboard,
    ) where
        N: DeserializeOwned + Send + Sync + 'static,
    {
        tokio::spawn(run_driver(DriverContext {
            source,
            query,
            parent_id: active.parent_id.clone(),
            generation: active.generation,
            client: Arc::clone(&self.client),
            events: self.events_tx.clone(),
            kill_switch: Arc::clone(&active.kill_switch),
            reduce,
        }));
    }

    fn apply(&mut self, event: DriverEvent) {
        let generation = event.generation();
        let Some(active) = self.active.as_mut() else {
            debug!("Discarding driver event with no active dashboard.");
            return;
        };
        if generation != active.generation {
            debug!("Discarding stale driver event from generation {generation}.");
            return;
        }

        let mut failed_source = None;

        match event {
            DriverEvent::Page { source, stats, .. } => {
                if let Some(slot) = active.slots.get_mut(&source) {
                    if slot.state == ConnectionState::Fetching {
                        slot.first_response = true;
                        slot.stats = stats;
                    }
                }
            }
            DriverEvent::Exhausted { source, stats, .. } => {
                if let Some(slot) = active.slots.get_mut(&source) {
                    // One-shot: terminal slots never transition again.
                    if slot.state == ConnectionState::Fetching {
                        slot.state = ConnectionState::Exhausted;
                        slot.first_response = true;
                        slot.stats = stats;
                        active.remaining_drivers -= 1;
                    }
                }
            }
            DriverEvent::Failed { source, .. } => {
                if let Some(slot) = active.slots.get_mut(&source) {
                    if slot.state == ConnectionState::Fetching {
                        slot.state = ConnectionState::Failed;
                        slot.first_response = true;
                        active.remaining_drivers -= 1;
                        failed_source = Some(source);
                    }
                }
            }
            DriverEvent::MembershipRequests { requests, .. } => {
                if active.membership.loading {
                    active.membership.loading = false;
                    active.membership.requests = requests.unwrap_or_default();
                    active.remaining_drivers -= 1;
                }
            }
        }

        if active.remaining_drivers == 0 {
            for notify in active.quiesce_waiters.drain(..) {
                let _ = notify.send(());
            }
        }

        if let Some(source) = failed_source {
            self.error_sink.report(source);
        }

        self.publish();
    }

    fn quiesce(&mut self, notify: oneshot::Sender<()>) {
        match self.active.as_mut() {
            Some(active) if active.remaining_drivers > 0 => {
                active.quiesce_waiters.push(notify)
            }
            _ => {
                let _ = notify.send(());
            }
        }
    }

    fn publish(&self) {
        let record = match &self.active {
            Some(active) => aggregate::build_record(&active.slots, &active.membership),
            None => AggregateRecord::default(),
        };
        let _ = self.records.send(record);
    }
}
