//! Relay-style cursor connections.
//! See: https://relay.dev/graphql/connections.htm#sec-Connection-Types
use crate::GraphqlResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Opaque token marking a position in a paginated list.
pub type Cursor = String;

/// See: https://relay.dev/graphql/connections.htm#sec-PageInfo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<Cursor>,
}

/// A single node/cursor pair within a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<N> {
    pub node: N,
    #[serde(default)]
    pub cursor: Option<Cursor>,
}

/// One fetched page of a connection, exactly as the server returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPage<N> {
    pub edges: Vec<Edge<N>>,
    pub page_info: PageInfo,
}

impl ConnectionPage<serde_json::Value> {
    /// Decode every node into `N`. Fails on the first node that does not
    /// match the expected shape.
    pub fn into_typed<N: DeserializeOwned>(self) -> GraphqlResult<ConnectionPage<N>> {
        let edges = self
            .edges
            .into_iter()
            .map(|edge| {
                Ok(Edge {
                    node: serde_json::from_value::<N>(edge.node)?,
                    cursor: edge.cursor,
                })
            })
            .collect::<GraphqlResult<Vec<_>>>()?;

        Ok(ConnectionPage {
            edges,
            page_info: self.page_info,
        })
    }
}

/// Pages of one connection accumulated in fetch order.
///
/// Edges are append-only; each merged page replaces the page-info, so the
/// accumulated value always reflects the most recently fetched page's
/// position in the source.
#[derive(Debug, Clone)]
pub struct Connection<N> {
    edges: Vec<Edge<N>>,
    page_info: Option<PageInfo>,
}

impl<N> Default for Connection<N> {
    fn default() -> Self {
        Self {
            edges: Vec::new(),
            page_info: None,
        }
    }
}

impl<N> Connection<N> {
    /// Append a page's edges after the existing ones and adopt its
    /// page-info. Edges are trusted not to repeat across pages and are
    /// never deduplicated.
    pub fn merge(&mut self, page: ConnectionPage<N>) {
        self.edges.extend(page.edges);
        self.page_info = Some(page.page_info);
    }

    pub fn edges(&self) -> &[Edge<N>] {
        &self.edges
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.edges.iter().map(|edge| &edge.node)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether the most recent page reported another page after it.
    /// `false` before any page has been merged.
    pub fn has_next_page(&self) -> bool {
        self.page_info
            .as_ref()
            .map(|info| info.has_next_page)
            .unwrap_or(false)
    }

    /// Cursor of the most recent page, if the source provided one.
    pub fn end_cursor(&self) -> Option<&str> {
        self.page_info
            .as_ref()
            .and_then(|info| info.end_cursor.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(nodes: &[&str], end_cursor: Option<&str>, has_next_page: bool) -> ConnectionPage<String> {
        ConnectionPage {
            edges: nodes
                .iter()
                .map(|node| Edge {
                    node: node.to_string(),
                    cursor: None,
                })
                .collect(),
            page_info: PageInfo {
                has_next_page,
                end_cursor: end_cursor.map(str::to_string),
            },
        }
    }

    #[test]
    fn merge_appends_edges_in_order() {
        let mut connection = Connection::default();
        connection.merge(page(&["a", "b"], Some("c1"), true));
        connection.merge(page(&["c"], Some("c2"), false));

        let nodes: Vec<&String> = connection.nodes().collect();
        assert_eq!(nodes, [&"a".to_string(), &"b".to_string(), &"c".to_string()]);
        assert_eq!(connection.len(), 3);
    }

    #[test]
    fn merge_replaces_page_info() {
        let mut connection = Connection::default();
        connection.merge(page(&["a"], Some("c1"), true));
        assert!(connection.has_next_page());
        assert_eq!(connection.end_cursor(), Some("c1"));

        connection.merge(page(&[], Some("c2"), false));
        assert!(!connection.has_next_page());
        assert_eq!(connection.end_cursor(), Some("c2"));
    }

    #[test]
    fn empty_connection_has_no_next_page() {
        let connection: Connection<String> = Connection::default();
        assert!(!connection.has_next_page());
        assert!(connection.end_cursor().is_none());
        assert!(connection.is_empty());
    }

    #[test]
    fn into_typed_rejects_misshapen_nodes() {
        let raw = ConnectionPage {
            edges: vec![Edge {
                node: serde_json::json!({ "unexpected": true }),
                cursor: None,
            }],
            page_info: PageInfo {
                has_next_page: false,
                end_cursor: None,
            },
        };

        assert!(raw.into_typed::<u64>().is_err());
    }
}
