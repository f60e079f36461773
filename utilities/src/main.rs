pub mod config;
pub mod functions;

use anyhow::Context;
use clap::Parser;
use shared::rpc::RpcClient;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();

    config.log.init();

    let client = match &config.proxy_url {
        Some(proxy_url) => RpcClient::via_proxy(&config.rpc, proxy_url),
        None => RpcClient::from_config(&config.rpc),
    }
    .context("Failed to build the RPC client")?;
    let readiness = client.initialize().await;
    tracing::debug!(?readiness, network = %client.endpoints().network, "RPC client ready");

    let output = functions::query::run(&client, &config.command).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&output)
            .context("Failed to render the result")?
    );

    Ok(())
}
