//! Transport seam between the engine and a GraphQL endpoint.
use crate::connection::ConnectionPage;
use crate::queries::{ConnectionQuery, GET_MEMBERSHIP_REQUESTS};
use crate::{GraphqlError, GraphqlResult};
use async_trait::async_trait;
use orgboard_types::org::MembershipRequest;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Issues page requests on behalf of the engine's drivers.
///
/// Implementations must resolve each call with exactly one request; the
/// engine serializes calls per connection, so no interior queueing is
/// needed.
#[async_trait]
pub trait ConnectionClient: Send + Sync {
    /// Fetch one page of the described connection for the given parent.
    /// `after` is `None` for the first page.
    async fn fetch_page(
        &self,
        query: &ConnectionQuery,
        parent_id: &str,
        after: Option<&str>,
    ) -> GraphqlResult<ConnectionPage<Value>>;

    /// Fetch the first `first` pending membership requests for the parent.
    async fn fetch_membership_requests(
        &self,
        parent_id: &str,
        first: u32,
    ) -> GraphqlResult<Vec<MembershipRequest>>;
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphQlResponseError>>,
}

#[derive(Deserialize)]
struct GraphQlResponseError {
    message: String,
}

fn decode_response(response: GraphQlResponse) -> GraphqlResult<Value> {
    match (response.data, response.errors) {
        (Some(data), _) => Ok(data),
        (_, Some(errors)) => Err(GraphqlError::ResponseErrors(
            errors.into_iter().map(|e| e.message).collect(),
        )),
        _ => Err(GraphqlError::MissingData),
    }
}

/// Pull the connection field out of a decoded `data` payload.
fn connection_from_data(
    data: &Value,
    query: &ConnectionQuery,
) -> GraphqlResult<ConnectionPage<Value>> {
    let entity = data
        .get(query.entity)
        .filter(|value| !value.is_null())
        .ok_or_else(|| GraphqlError::MissingEntity(query.entity.to_string()))?;
    let field = entity
        .get(query.field)
        .filter(|value| !value.is_null())
        .ok_or_else(|| {
            GraphqlError::MissingConnectionField(
                query.entity.to_string(),
                query.field.to_string(),
            )
        })?;

    Ok(serde_json::from_value(field.clone())?)
}

/// `ConnectionClient` backed by a reqwest HTTP client.
pub struct HttpConnectionClient {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpConnectionClient {
    /// Build a client for the given endpoint. A bare `host:port` is
    /// accepted and normalized to `http://host:port/graphql`.
    pub fn new(endpoint: &str) -> GraphqlResult<Self> {
        let mut raw_url = endpoint.to_string();
        if !raw_url.starts_with("http") {
            raw_url = format!("http://{raw_url}");
        }

        let mut url = reqwest::Url::parse(&raw_url)
            .map_err(|e| GraphqlError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if url.path() == "/" || url.path().is_empty() {
            url.set_path("/graphql");
        }

        Ok(Self {
            client: reqwest::Client::new(),
            url,
        })
    }

    async fn execute(&self, document: &str, variables: Value) -> GraphqlResult<Value> {
        debug!("Posting GraphQL operation to {}", self.url);

        let response: GraphQlResponse = self
            .client
            .post(self.url.clone())
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await?
            .json()
            .await?;

        decode_response(response)
    }
}

#[async_trait]
impl ConnectionClient for HttpConnectionClient {
    async fn fetch_page(
        &self,
        query: &ConnectionQuery,
        parent_id: &str,
        after: Option<&str>,
    ) -> GraphqlResult<ConnectionPage<Value>> {
        let data = self
            .execute(
                query.document,
                json!({ "id": parent_id, "first": query.page_size, "after": after }),
            )
            .await?;

        connection_from_data(&data, query)
    }

    async fn fetch_membership_requests(
        &self,
        parent_id: &str,
        first: u32,
    ) -> GraphqlResult<Vec<MembershipRequest>> {
        let data = self
            .execute(
                GET_MEMBERSHIP_REQUESTS,
                json!({ "id": parent_id, "first": first }),
            )
            .await?;

        let entity = data
            .get("organization")
            .filter(|value| !value.is_null())
            .ok_or_else(|| GraphqlError::MissingEntity("organization".to_string()))?;
        let requests = entity.get("membershipRequests").cloned().unwrap_or(Value::Null);
        if requests.is_null() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_value(requests)?)
    }
}
