pub mod client;
pub mod connection;
pub mod queries;
pub mod testing;

use thiserror::Error;

pub type GraphqlResult<T> = Result<T, GraphqlError>;

#[derive(Debug, Error)]
pub enum GraphqlError {
    #[error("Transport error: {0:?}")]
    TransportError(#[from] reqwest::Error),
    #[error("Invalid GraphQL endpoint: {0:?}")]
    InvalidEndpoint(String),
    #[error("Response errors: {0:?}")]
    ResponseErrors(Vec<String>),
    #[error("Response is missing 'data'.")]
    MissingData,
    #[error("Response is missing entity {0:?}.")]
    MissingEntity(String),
    #[error("Entity {0:?} has no connection field {1:?}.")]
    MissingConnectionField(String, String),
    #[error("Connection shape error: {0:?}")]
    ShapeError(#[from] serde_json::Error),
}

pub mod prelude {
    pub use crate::client::{ConnectionClient, HttpConnectionClient};
    pub use crate::connection::{Connection, ConnectionPage, Cursor, Edge, PageInfo};
    pub use crate::queries::ConnectionQuery;
    pub use crate::{GraphqlError, GraphqlResult};
}
