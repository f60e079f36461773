use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::truncate_message;
use crate::network::Network;

pub const JSONRPC_VERSION: &str = "2.0";
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

const REQUEST_ID: u64 = 1;
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error(
        "Rejected by proxy rate limiter ({remaining}/{limit} left, resets \
         at {reset_at})"
    )]
    RateLimited {
        limit: u32,
        remaining: u32,
        reset_at: i64,
    },
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub result: Value,
    /// Network reported by the answering side, when it reports one.
    pub network: Option<Network>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a [Value],
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(method: &'a str, params: &'a [Value]) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: REQUEST_ID,
            method,
            params,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ErrorField {
    Rpc(JsonRpcErrorObject),
    Message(String),
}

/// A JSON-RPC response body, or the same-origin proxy's variant of it which
/// adds the serving `network`.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<ErrorField>,
    #[serde(default)]
    pub network: Option<String>,
}

impl JsonRpcResponse {
    pub fn into_transport_result(
        self,
    ) -> Result<TransportResponse, TransportError> {
        match self.error {
            Some(ErrorField::Rpc(error)) => Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            }),
            Some(ErrorField::Message(message)) => {
                Err(TransportError::Rpc { code: 0, message })
            }
            None => Ok(TransportResponse {
                result: self.result,
                network: self
                    .network
                    .and_then(|network| network.parse::<Network>().ok()),
            }),
        }
    }
}

/// Performs exactly one request against one endpoint.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn send(
        &self,
        url: &str,
        method: &str,
        params: &[Value],
    ) -> Result<TransportResponse, TransportError>;
}

fn request_error(error: reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(timeout)
    } else if error.is_decode() {
        TransportError::Malformed(error.to_string())
    } else {
        TransportError::Connection(error.to_string())
    }
}

async fn decode_body(
    response: Response,
    timeout: Duration,
) -> Result<TransportResponse, TransportError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| request_error(e, timeout))?;

    serde_json::from_slice::<JsonRpcResponse>(&body)
        .map_err(|e| TransportError::Malformed(e.to_string()))?
        .into_transport_result()
}

fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Talks JSON-RPC 2.0 straight to a Solana node.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            timeout,
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        method: &str,
        params: &[Value],
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .json(&JsonRpcRequest::new(method, params))
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Http {
                status: status.as_u16(),
                body: truncate_message(&body, ERROR_BODY_LIMIT),
            });
        }

        decode_body(response, self.timeout).await
    }
}

#[derive(Debug, Serialize)]
struct ProxyRequest<'a> {
    method: &'a str,
    params: &'a [Value],
}

#[derive(Debug, Deserialize)]
struct ProxyErrorBody {
    error: String,
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Talks to the explorer's own `POST /api/solana` proxy, which fronts the
/// node with its rate limiter and reports the network it serves.
#[derive(Debug, Clone)]
pub struct ProxyTransport {
    client: Client,
    timeout: Duration,
}

impl ProxyTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            timeout,
        })
    }
}

#[async_trait]
impl RpcTransport for ProxyTransport {
    async fn send(
        &self,
        url: &str,
        method: &str,
        params: &[Value],
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .json(&ProxyRequest { method, params })
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let headers = response.headers();
            if let (Some(limit), Some(reset_at)) = (
                header_number(headers, RATE_LIMIT_LIMIT_HEADER),
                header_number(headers, RATE_LIMIT_RESET_HEADER),
            ) {
                return Err(TransportError::RateLimited {
                    limit: u32::try_from(limit).unwrap_or(u32::MAX),
                    remaining: header_number(
                        headers,
                        RATE_LIMIT_REMAINING_HEADER,
                    )
                    .and_then(|remaining| u32::try_from(remaining).ok())
                    .unwrap_or(0),
                    reset_at,
                });
            }
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = serde_json::from_str::<ProxyErrorBody>(&body)
                .map(|parsed| parsed.error)
                .unwrap_or(body);
            return Err(TransportError::Http {
                status: status.as_u16(),
                body: truncate_message(&body, ERROR_BODY_LIMIT),
            });
        }

        decode_body(response, self.timeout).await
    }
}
