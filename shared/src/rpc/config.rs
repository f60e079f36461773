use std::time::Duration;

use serde::Serialize;
use strum_macros::Display;

use crate::network::{EndpointResolver, EndpointRole, Network};

pub const MAX_FETCH_CONCURRENCY: usize = 5;

#[derive(
    clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Commitment {
    #[default]
    Confirmed,
    Finalized,
}

#[derive(clap::Args, Clone, Debug)]
pub struct RpcConfig {
    /// devnet, testnet or mainnet; anything else selects devnet.
    #[clap(long = "solana-network", env = "SOLANA_NETWORK", default_value = "devnet")]
    pub network: String,

    #[clap(long, env = "SOLANA_RPC_URL_DEVNET")]
    pub rpc_url_devnet: Option<String>,

    #[clap(long, env = "SOLANA_FALLBACK_URL_DEVNET")]
    pub fallback_url_devnet: Option<String>,

    #[clap(long, env = "SOLANA_RPC_URL_TESTNET")]
    pub rpc_url_testnet: Option<String>,

    #[clap(long, env = "SOLANA_FALLBACK_URL_TESTNET")]
    pub fallback_url_testnet: Option<String>,

    #[clap(long, env = "SOLANA_RPC_URL_MAINNET")]
    pub rpc_url_mainnet: Option<String>,

    #[clap(long, env = "SOLANA_FALLBACK_URL_MAINNET")]
    pub fallback_url_mainnet: Option<String>,

    /// Attempts against the primary endpoint before failing over.
    #[clap(long, env, default_value_t = 3)]
    pub rpc_max_retries: u32,

    #[clap(long, env, default_value_t = 1000)]
    pub rpc_base_delay_ms: u64,

    #[clap(long, env, default_value_t = 30)]
    pub rpc_request_timeout_secs: u64,

    #[clap(long, env, default_value_t = 60)]
    pub rpc_call_deadline_secs: u64,

    #[clap(long, env, default_value_t = 10)]
    pub rpc_init_timeout_secs: u64,

    /// Blocks fetched in flight by the recent blocks listing.
    #[clap(long, env, default_value_t = 1)]
    pub rpc_fetch_concurrency: usize,

    #[clap(long, env, value_enum, default_value_t = Commitment::Confirmed)]
    pub rpc_commitment: Commitment,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            network: Network::Devnet.to_string(),
            rpc_url_devnet: None,
            fallback_url_devnet: None,
            rpc_url_testnet: None,
            fallback_url_testnet: None,
            rpc_url_mainnet: None,
            fallback_url_mainnet: None,
            rpc_max_retries: 3,
            rpc_base_delay_ms: 1000,
            rpc_request_timeout_secs: 30,
            rpc_call_deadline_secs: 60,
            rpc_init_timeout_secs: 10,
            rpc_fetch_concurrency: 1,
            rpc_commitment: Commitment::Confirmed,
        }
    }
}

impl RpcConfig {
    pub fn network(&self) -> Network {
        Network::normalize(&self.network)
    }

    pub fn resolver(&self) -> EndpointResolver {
        EndpointResolver::new()
            .with_endpoint(
                Network::Devnet,
                EndpointRole::Primary,
                self.rpc_url_devnet.clone(),
            )
            .with_endpoint(
                Network::Devnet,
                EndpointRole::Fallback,
                self.fallback_url_devnet.clone(),
            )
            .with_endpoint(
                Network::Testnet,
                EndpointRole::Primary,
                self.rpc_url_testnet.clone(),
            )
            .with_endpoint(
                Network::Testnet,
                EndpointRole::Fallback,
                self.fallback_url_testnet.clone(),
            )
            .with_endpoint(
                Network::Mainnet,
                EndpointRole::Primary,
                self.rpc_url_mainnet.clone(),
            )
            .with_endpoint(
                Network::Mainnet,
                EndpointRole::Fallback,
                self.fallback_url_mainnet.clone(),
            )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_request_timeout_secs)
    }

    pub fn call_deadline(&self) -> Duration {
        Duration::from_secs(self.rpc_call_deadline_secs)
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_init_timeout_secs)
    }

    pub fn fetch_concurrency(&self) -> usize {
        self.rpc_fetch_concurrency.clamp(1, MAX_FETCH_CONCURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_concurrency_is_capped() {
        let config = RpcConfig {
            rpc_fetch_concurrency: 64,
            ..RpcConfig::default()
        };
        assert_eq!(config.fetch_concurrency(), MAX_FETCH_CONCURRENCY);

        let config = RpcConfig {
            rpc_fetch_concurrency: 0,
            ..RpcConfig::default()
        };
        assert_eq!(config.fetch_concurrency(), 1);
    }

    #[test]
    fn network_is_normalized() {
        let config = RpcConfig {
            network: "Mainnet".to_string(),
            ..RpcConfig::default()
        };
        assert_eq!(config.network(), Network::Mainnet);

        let config = RpcConfig {
            network: "mainnet-beta".to_string(),
            ..RpcConfig::default()
        };
        assert_eq!(config.network(), Network::Devnet);
    }

    #[test]
    fn resolver_uses_configured_urls() {
        let config = RpcConfig {
            fallback_url_mainnet: Some("https://backup.example.com".into()),
            ..RpcConfig::default()
        };
        let resolver = config.resolver();

        assert_eq!(
            resolver
                .resolve(Network::Mainnet, EndpointRole::Fallback)
                .url,
            "https://backup.example.com"
        );
    }
}
