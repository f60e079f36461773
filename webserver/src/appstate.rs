use std::sync::Arc;

use shared::error::RpcError;
use shared::network::EndpointResolver;
use shared::rpc::{RpcClient, RpcConfig};

#[derive(Clone)]
pub struct AppState {
    client: Arc<RpcClient>,
    resolver: EndpointResolver,
}

impl AppState {
    /// Builds the client and waits for its readiness check.
    pub async fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let client = RpcClient::from_config(config)?;
        client.initialize().await;

        Ok(Self::from_parts(Arc::new(client), config.resolver()))
    }

    pub fn from_parts(client: Arc<RpcClient>, resolver: EndpointResolver) -> Self {
        Self { client, resolver }
    }

    pub fn client(&self) -> Arc<RpcClient> {
        self.client.clone()
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }
}
