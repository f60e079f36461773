use std::sync::Arc;

use shared::explorer::{self, ChainStatus};
use shared::network::{EndpointResolver, EndpointRole, Network};
use shared::rpc::{Readiness, RpcClient};
use strum::IntoEnumIterator;

use crate::appstate::AppState;
use crate::error::chain::ChainError;
use crate::response::chain::{DebugEnvResponse, EndpointState};

#[derive(Clone)]
pub struct ChainService {
    client: Arc<RpcClient>,
    resolver: EndpointResolver,
}

impl ChainService {
    pub fn new(app_state: AppState) -> Self {
        Self {
            client: app_state.client(),
            resolver: app_state.resolver().clone(),
        }
    }

    pub fn get_network(&self) -> String {
        explorer::get_network(&self.client)
    }

    pub async fn get_chain_status(&self) -> Result<ChainStatus, ChainError> {
        let status = explorer::get_chain_status(&self.client).await?;

        Ok(status)
    }

    pub fn debug_env(&self) -> DebugEnvResponse {
        let rpc_endpoints = Network::iter()
            .flat_map(|network| {
                [EndpointRole::Primary, EndpointRole::Fallback]
                    .map(|role| (network, role))
            })
            .map(|(network, role)| {
                let state = if self.resolver.is_configured(network, role) {
                    EndpointState::Configured
                } else {
                    EndpointState::Default
                };
                (role.env_key(network), state)
            })
            .collect();

        let readiness = match self.client.readiness() {
            Readiness::Uninitialized => "uninitialized",
            Readiness::Ready(_) => "ready",
            Readiness::Defaulted(_) => "defaulted",
        };

        DebugEnvResponse {
            network: self.get_network(),
            readiness: readiness.to_string(),
            server_side: true,
            rpc_endpoints,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
