use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct NetworkResponse {
    pub network: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EndpointState {
    Configured,
    Default,
}

/// Which endpoints are configured, without ever revealing the URLs.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugEnvResponse {
    pub network: String,
    pub readiness: String,
    pub server_side: bool,
    pub rpc_endpoints: BTreeMap<String, EndpointState>,
    pub timestamp: String,
}
