use crate::{DashboardService, TracingErrorSink};
use orgboard_graphql::client::HttpConnectionClient;
use orgboard_lib::config::{DashboardArgs, DashboardConfig, MutableConfig};
use orgboard_lib::utils::init_logging;
use std::sync::Arc;
use tracing::info;

pub async fn exec(args: DashboardArgs) -> anyhow::Result<()> {
    let org_id = args.org_id.clone();

    let config = args
        .config
        .clone()
        .map(DashboardConfig::from_file)
        .unwrap_or(Ok(DashboardConfig::from(args)))?;

    init_logging(&config).await?;

    info!("Configuration: {config:?}");

    let org_id = org_id
        .ok_or_else(|| anyhow::anyhow!("An organization id is required. Pass --org-id."))?;

    let endpoint = config.derive_http_url();
    info!("Aggregating dashboard from GraphQL API at {endpoint}");

    let client = Arc::new(HttpConnectionClient::new(&endpoint)?);
    let (service, handle) = DashboardService::new(client, Arc::new(TracingErrorSink));
    let service_handle = tokio::spawn(service.run());

    handle.set_parent(Some(org_id.clone())).await?;
    handle.quiesce().await?;

    let record = handle.latest();
    info!("Dashboard for Org({org_id}): {record:#?}");

    drop(handle);
    service_handle.await?;

    Ok(())
}
