use std::sync::Arc;

use shared::network::{EndpointSource, Network, ResolvedEndpoint};
use shared::rpc::{RpcClient, RpcConfig, RpcEndpoints};

use crate::transport::MockTransport;

pub const PRIMARY_URL: &str = "http://primary.test";
pub const FALLBACK_URL: &str = "http://fallback.test";

pub fn test_endpoints(network: Network) -> RpcEndpoints {
    let configured = |url: &str| ResolvedEndpoint {
        url: url.to_string(),
        source: EndpointSource::Configured,
    };

    RpcEndpoints {
        network,
        primary: configured(PRIMARY_URL),
        fallback: configured(FALLBACK_URL),
    }
}

pub fn test_client(transport: Arc<MockTransport>, config: &RpcConfig) -> RpcClient {
    RpcClient::new(transport, test_endpoints(config.network()), config)
}

/// Client over `transport`, already through [`RpcClient::initialize`].
pub async fn ready_client(
    transport: Arc<MockTransport>,
    config: &RpcConfig,
) -> RpcClient {
    let client = test_client(transport, config);
    client.initialize().await;
    client
}
