//! Service-level tests driving the full engine against scripted sources.
use orgboard_aggregator::{
    AggregateRecord, DashboardHandle, DashboardService, ErrorSink, Source,
};
use orgboard_graphql::testing::{ScriptedClient, ScriptedPage};
use orgboard_types::org::{MembershipRequest, RequestingUser};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct CountingSink {
    reports: AtomicUsize,
}

impl CountingSink {
    fn new() -> Self {
        Self {
            reports: AtomicUsize::new(0),
        }
    }

    fn reports(&self) -> usize {
        self.reports.load(Ordering::SeqCst)
    }
}

impl ErrorSink for CountingSink {
    fn report(&self, _source: Source) {
        self.reports.fetch_add(1, Ordering::SeqCst);
    }
}

fn spawn_service(client: Arc<ScriptedClient>) -> (DashboardHandle, Arc<CountingSink>) {
    let sink = Arc::new(CountingSink::new());
    let (service, handle) = DashboardService::new(client, sink.clone());
    tokio::spawn(service.run());
    (handle, sink)
}

fn member(id: &str, role: &str) -> Value {
    json!({ "id": id, "name": id, "role": role })
}

fn event(id: &str, start_at: &str) -> Value {
    json!({ "id": id, "name": id, "startAt": start_at })
}

fn post(id: &str) -> Value {
    json!({ "id": id, "caption": format!("caption {id}") })
}

fn named(id: &str) -> Value {
    json!({ "id": id, "name": id })
}

#[tokio::test]
async fn undefined_parent_yields_a_zeroed_record_and_no_fetches() {
    let client = Arc::new(ScriptedClient::new());
    let (handle, sink) = spawn_service(client.clone());

    handle.quiesce().await.unwrap();

    assert_eq!(handle.latest(), AggregateRecord::default());
    assert_eq!(client.total_calls(), 0);
    assert_eq!(sink.reports(), 0);
}

#[tokio::test]
async fn full_dashboard_aggregates_every_source() {
    let client = Arc::new(ScriptedClient::new());
    client.script(
        "org123",
        "members",
        vec![
            ScriptedPage::of(
                vec![member("m1", "administrator"), member("m2", "regular")],
                Some("c1"),
                true,
            ),
            ScriptedPage::of(
                vec![member("m3", "regular"), member("m4", "administrator")],
                Some("c2"),
                true,
            ),
            ScriptedPage::of(vec![member("m5", "regular")], Some("c3"), false),
        ],
    );
    client.script(
        "org123",
        "events",
        vec![ScriptedPage::of(
            vec![
                event("past", "2001-06-01T10:00:00Z"),
                event("reunion", "2999-06-01T10:00:00Z"),
                event("gala", "2999-07-01T10:00:00Z"),
            ],
            None,
            false,
        )],
    );
    client.script(
        "org123",
        "posts",
        vec![
            ScriptedPage::of(vec![post("p1"), post("p2"), post("p3")], Some("c1"), true),
            ScriptedPage::of(vec![post("p4")], Some("c2"), false),
        ],
    );
    client.script(
        "org123",
        "blockedUsers",
        vec![ScriptedPage::of(vec![named("b1"), named("b2")], None, false)],
    );
    client.script(
        "org123",
        "venues",
        vec![ScriptedPage::of(vec![named("v1")], None, false)],
    );
    client.script_membership(
        "org123",
        vec![MembershipRequest {
            id: "req1".to_string(),
            user: RequestingUser {
                name: "Joan".to_string(),
                email_address: None,
            },
        }],
    );

    let (handle, sink) = spawn_service(client.clone());
    handle.set_parent(Some("org123".to_string())).await.unwrap();
    handle.quiesce().await.unwrap();

    let record = handle.latest();
    assert_eq!(record.member_count, 5);
    assert_eq!(record.admin_count, 2);
    assert_eq!(record.event_count, 3);
    assert_eq!(record.post_count, 4);
    assert_eq!(record.blocked_count, 2);
    assert_eq!(record.venue_count, 1);
    let upcoming: Vec<&str> = record.upcoming_events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(upcoming, ["reunion", "gala"]);
    assert_eq!(record.membership_requests.len(), 1);
    assert!(!record.loading_membership_requests);
    assert!(!record.is_loading);
    assert!(!record.has_error);
    assert_eq!(sink.reports(), 0);

    // Once every source is exhausted, observing the record issues no
    // further requests.
    let settled_calls = client.total_calls();
    assert_eq!(client.calls("org123", "members"), 3);
    assert_eq!(client.calls("org123", "posts"), 2);

    let _ = handle.latest();
    let _ = handle.subscribe();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.total_calls(), settled_calls);

    // Clearing the parent resets the view.
    handle.set_parent(None).await.unwrap();
    handle.quiesce().await.unwrap();
    assert_eq!(handle.latest(), AggregateRecord::default());
    assert_eq!(client.total_calls(), settled_calls);
}

#[tokio::test]
async fn fast_sources_finalize_without_waiting_for_slow_ones() {
    let client = Arc::new(ScriptedClient::new());
    client.script(
        "org42",
        "members",
        vec![ScriptedPage::of(
            vec![member("m1", "regular"), member("m2", "regular")],
            None,
            false,
        )],
    );
    client.script(
        "org42",
        "venues",
        vec![
            ScriptedPage::of(vec![named("v1")], Some("c1"), true)
                .delayed(Duration::from_millis(200)),
            ScriptedPage::of(vec![named("v2")], Some("c2"), true)
                .delayed(Duration::from_millis(200)),
            ScriptedPage::of(vec![named("v3")], Some("c3"), false)
                .delayed(Duration::from_millis(200)),
        ],
    );

    let (handle, _sink) = spawn_service(client.clone());
    let mut records = handle.subscribe();
    handle.set_parent(Some("org42".to_string())).await.unwrap();

    // The one-page members source becomes final while the venues source
    // is still grinding through its pages.
    loop {
        records.changed().await.unwrap();
        let record = records.borrow().clone();
        if record.member_count == 2 {
            assert_eq!(record.venue_count, 0);
            assert!(record.is_loading);
            break;
        }
    }

    handle.quiesce().await.unwrap();
    let record = handle.latest();
    assert_eq!(record.member_count, 2);
    assert_eq!(record.venue_count, 3);
    assert!(!record.is_loading);
}

#[tokio::test]
async fn parent_swap_discards_stale_results() {
    let client = Arc::new(ScriptedClient::new());
    client.script(
        "orgA",
        "members",
        vec![ScriptedPage::of(
            vec![
                member("a1", "regular"),
                member("a2", "regular"),
                member("a3", "regular"),
            ],
            None,
            false,
        )
        .delayed(Duration::from_millis(300))],
    );
    client.script(
        "orgB",
        "members",
        vec![ScriptedPage::of(vec![member("b1", "regular")], None, false)],
    );

    let (handle, _sink) = spawn_service(client.clone());
    handle.set_parent(Some("orgA".to_string())).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.set_parent(Some("orgB".to_string())).await.unwrap();
    handle.quiesce().await.unwrap();

    assert_eq!(handle.latest().member_count, 1);

    // orgA's slow page resolves after the swap; its result must not leak
    // into orgB's aggregates.
    tokio::time::sleep(Duration::from_millis(350)).await;
    let record = handle.latest();
    assert_eq!(record.member_count, 1);
    assert!(!record.has_error);
}

#[tokio::test]
async fn failed_source_keeps_partial_data_and_reports_once() {
    let client = Arc::new(ScriptedClient::new());
    client.script(
        "org9",
        "members",
        vec![
            ScriptedPage::of(
                vec![member("m1", "administrator"), member("m2", "regular")],
                Some("c1"),
                true,
            ),
            ScriptedPage::error("bad gateway"),
        ],
    );

    let (handle, sink) = spawn_service(client.clone());
    handle.set_parent(Some("org9".to_string())).await.unwrap();
    handle.quiesce().await.unwrap();

    let record = handle.latest();
    assert_eq!(record.member_count, 2);
    assert_eq!(record.admin_count, 1);
    assert!(record.has_error);
    assert!(!record.is_loading);
    assert_eq!(sink.reports(), 1);

    // Failed is terminal: no retries show up later.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.calls("org9", "members"), 2);
    assert_eq!(sink.reports(), 1);
}
