use std::sync::Arc;

use serde_json::Value;
use shared::error::RpcError;
use shared::explorer;
use shared::rpc::RpcClient;

use crate::appstate::AppState;
use crate::error::proxy::ProxyError;
use crate::response::rpc::ProxyResponse;

/// Forwards raw JSON-RPC calls through the resilient client.
#[derive(Clone)]
pub struct RpcProxyService {
    client: Arc<RpcClient>,
}

impl RpcProxyService {
    pub fn new(app_state: AppState) -> Self {
        Self {
            client: app_state.client(),
        }
    }

    pub async fn forward(
        &self,
        method: String,
        params: Vec<Value>,
    ) -> Result<ProxyResponse, ProxyError> {
        tracing::debug!(%method, "Proxying RPC call");

        match self.client.call(&method, &params).await {
            Ok(outcome) => Ok(ProxyResponse::new(
                outcome.result,
                outcome.network.to_string(),
            )),
            Err(RpcError::NotFound) => Ok(ProxyResponse::new(
                Value::Null,
                explorer::get_network(&self.client),
            )),
            Err(error) => Err(ProxyError::Rpc {
                error,
                network: explorer::get_network(&self.client),
                method,
            }),
        }
    }
}
