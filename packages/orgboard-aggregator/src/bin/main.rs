use orgboard_aggregator::cli::run_cli;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    run_cli().await
}
