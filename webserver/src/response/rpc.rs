use serde::Serialize;
use serde_json::Value;
use shared::rpc::transport::JSONRPC_VERSION;

const RESPONSE_ID: u64 = 1;

#[derive(Clone, Debug, Serialize)]
pub struct ProxyResponse {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub result: Value,
    pub network: String,
}

impl ProxyResponse {
    pub fn new(result: Value, network: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: RESPONSE_ID,
            result,
            network,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ProxyErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}
