//! In-memory client doubles for exercising pagination without a server.
use crate::client::ConnectionClient;
use crate::connection::{ConnectionPage, Edge, PageInfo};
use crate::queries::ConnectionQuery;
use crate::{GraphqlError, GraphqlResult};
use async_trait::async_trait;
use orgboard_types::org::MembershipRequest;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted response for a `fetch_page` call.
pub struct ScriptedPage {
    result: Result<ConnectionPage<Value>, String>,
    delay: Option<Duration>,
}

impl ScriptedPage {
    /// A successful page carrying the given nodes.
    pub fn of(nodes: Vec<Value>, end_cursor: Option<&str>, has_next_page: bool) -> Self {
        Self {
            result: Ok(ConnectionPage {
                edges: nodes
                    .into_iter()
                    .map(|node| Edge {
                        node,
                        cursor: end_cursor.map(str::to_string),
                    })
                    .collect(),
                page_info: PageInfo {
                    has_next_page,
                    end_cursor: end_cursor.map(str::to_string),
                },
            }),
            delay: None,
        }
    }

    /// A page request that fails with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            delay: None,
        }
    }

    /// Delay resolution of this page, simulating a slow source.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type SourceKey = (String, String);

/// `ConnectionClient` that serves pre-scripted pages and records every
/// call it receives. Sources with no script respond with a single empty,
/// exhausted page.
#[derive(Default)]
pub struct ScriptedClient {
    pages: Mutex<HashMap<SourceKey, VecDeque<ScriptedPage>>>,
    membership: Mutex<HashMap<String, Vec<MembershipRequest>>>,
    calls: Mutex<HashMap<SourceKey, usize>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue pages for one `(parent, connection field)` source. Pages are
    /// served in the order given, one per `fetch_page` call.
    pub fn script(&self, parent_id: &str, field: &str, pages: Vec<ScriptedPage>) {
        self.pages
            .lock()
            .unwrap()
            .entry((parent_id.to_string(), field.to_string()))
            .or_default()
            .extend(pages);
    }

    pub fn script_membership(&self, parent_id: &str, requests: Vec<MembershipRequest>) {
        self.membership
            .lock()
            .unwrap()
            .insert(parent_id.to_string(), requests);
    }

    /// Number of `fetch_page` calls issued for one source.
    pub fn calls(&self, parent_id: &str, field: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&(parent_id.to_string(), field.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Number of `fetch_page` calls issued across all sources.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn empty_page() -> ConnectionPage<Value> {
        ConnectionPage {
            edges: Vec::new(),
            page_info: PageInfo {
                has_next_page: false,
                end_cursor: None,
            },
        }
    }
}

#[async_trait]
impl ConnectionClient for ScriptedClient {
    async fn fetch_page(
        &self,
        query: &ConnectionQuery,
        parent_id: &str,
        _after: Option<&str>,
    ) -> GraphqlResult<ConnectionPage<Value>> {
        let key = (parent_id.to_string(), query.field.to_string());

        let page = {
            let mut calls = self.calls.lock().unwrap();
            *calls.entry(key.clone()).or_insert(0) += 1;
            drop(calls);

            self.pages
                .lock()
                .unwrap()
                .get_mut(&key)
                .and_then(VecDeque::pop_front)
        };

        match page {
            Some(page) => {
                if let Some(delay) = page.delay {
                    tokio::time::sleep(delay).await;
                }
                page.result
                    .map_err(|message| GraphqlError::ResponseErrors(vec![message]))
            }
            None => Ok(Self::empty_page()),
        }
    }

    async fn fetch_membership_requests(
        &self,
        parent_id: &str,
        _first: u32,
    ) -> GraphqlResult<Vec<MembershipRequest>> {
        Ok(self
            .membership
            .lock()
            .unwrap()
            .get(parent_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn scripted_pages_drain_in_order() {
        let client = ScriptedClient::new();
        client.script(
            "org1",
            "members",
            vec![
                ScriptedPage::of(vec![json!({"id": "m1"})], Some("c1"), true),
                ScriptedPage::of(vec![json!({"id": "m2"})], Some("c2"), false),
            ],
        );

        let query = ConnectionQuery::members(32);
        let first = client.fetch_page(&query, "org1", None).await.unwrap();
        assert!(first.page_info.has_next_page);

        let second = client.fetch_page(&query, "org1", Some("c1")).await.unwrap();
        assert!(!second.page_info.has_next_page);

        assert_eq!(client.calls("org1", "members"), 2);
    }

    #[tokio::test]
    async fn unscripted_sources_are_empty_and_exhausted() {
        let client = ScriptedClient::new();
        let page = client
            .fetch_page(&ConnectionQuery::venues(32), "org1", None)
            .await
            .unwrap();

        assert!(page.edges.is_empty());
        assert!(!page.page_info.has_next_page);
    }

    #[tokio::test]
    async fn scripted_errors_surface_as_response_errors() {
        let client = ScriptedClient::new();
        client.script("org1", "posts", vec![ScriptedPage::error("boom")]);

        let err = client
            .fetch_page(&ConnectionQuery::posts(5), "org1", None)
            .await
            .unwrap_err();

        assert!(matches!(err, GraphqlError::ResponseErrors(..)));
    }
}
