use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug, Deserialize)]
pub struct ProxyRequest {
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Vec<Value>>,
}
