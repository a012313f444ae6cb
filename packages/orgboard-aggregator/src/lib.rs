#![deny(unused_crate_dependencies)]
// serde_json is a dev-dependency used only by the integration tests under
// tests/, which are separate crates. The lib's own test target links it but
// does not reference it, so silence unused_crate_dependencies there.
#[cfg(test)]
use serde_json as _;

pub mod aggregate;
pub mod cli;
pub(crate) mod commands;
pub mod driver;
pub mod service;
pub mod sink;
pub mod state;

pub use aggregate::AggregateRecord;
pub use service::{DashboardHandle, DashboardService, ServiceCommand};
pub use sink::{ErrorSink, TracingErrorSink};
pub use state::{ConnectionState, Source};

use thiserror::Error;

pub mod prelude {
    pub use super::{
        AggregateRecord, AggregatorError, AggregatorResult, ConnectionState,
        DashboardHandle, DashboardService, ErrorSink, Source, TracingErrorSink,
    };
    pub use orgboard_graphql::prelude::*;
    pub use orgboard_types::prelude::*;
}

pub type AggregatorResult<T> = core::result::Result<T, AggregatorError>;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Service is no longer running.")]
    ServiceStopped,
    #[error("Quiesce wait was interrupted.")]
    QuiesceInterrupted,
}
