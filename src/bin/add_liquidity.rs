use tracing::debug;
use tracing_subscriber::EnvFilter;
use v3_liquidity_rs::{LiquidityProvider, apis::ConsoleReporter, types::LiquidityConfig};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = LiquidityConfig::from_env()?;
    let provider = LiquidityProvider::from_config(&config)
        .await?
        .with_reporter(ConsoleReporter);

    let request = config.mint_request(provider.account().address())?;
    let report = provider.run(&request).await?;

    debug!(report = %serde_json::to_string(&report)?, "liquidity added");
    Ok(())
}
