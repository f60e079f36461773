use thiserror::Error;

/// Errors surfaced by the RPC client and the explorer operations built on
/// it. `NotFound` is only ever seen by code that talks to [`crate::rpc`]
/// directly; explorer operations turn it into `None` or an empty list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("Not found")]
    NotFound,
    #[error(
        "Rate limited: {remaining} of {limit} requests left, window resets \
         at {reset_at}"
    )]
    RateLimited {
        limit: u32,
        remaining: u32,
        reset_at: i64,
    },
    #[error("Transient network failure: {0}")]
    TransientNetworkFailure(String),
    #[error(
        "Both primary and fallback RPC endpoints failed (primary: \
         {primary}; fallback: {fallback})"
    )]
    UpstreamUnavailable { primary: String, fallback: String },
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RpcError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RpcError::NotFound)
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RpcError::RateLimited { .. })
    }

    /// Kind name used in logs and JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::NotFound => "NotFound",
            RpcError::RateLimited { .. } => "RateLimited",
            RpcError::TransientNetworkFailure(_) => "TransientNetworkFailure",
            RpcError::UpstreamUnavailable { .. } => "UpstreamUnavailable",
            RpcError::Protocol(_) => "ProtocolError",
            RpcError::Internal(_) => "InternalError",
        }
    }
}

pub trait AsInternalError<T> {
    fn into_internal_error(self) -> Result<T, RpcError>;
}

impl<T> AsInternalError<T> for anyhow::Result<T> {
    #[inline]
    fn into_internal_error(self) -> Result<T, RpcError> {
        self.map_err(|reason| {
            tracing::error!(?reason, "Internal error");
            RpcError::Internal(format!("{reason:#}"))
        })
    }
}

pub trait AsProtocolError<T> {
    fn into_protocol_error(self, method: &str) -> Result<T, RpcError>;
}

impl<T> AsProtocolError<T> for Result<T, serde_json::Error> {
    #[inline]
    fn into_protocol_error(self, method: &str) -> Result<T, RpcError> {
        self.map_err(|reason| {
            tracing::error!(%reason, method, "Malformed RPC result");
            RpcError::Protocol(format!(
                "malformed {method} result: {reason}"
            ))
        })
    }
}

/// Cuts a diagnostic down to `max` characters, marking the cut.
pub fn truncate_message(message: &str, max: usize) -> String {
    if message.chars().count() <= max {
        return message.to_string();
    }
    let cut: String = message.chars().take(max).collect();
    format!("{cut}...")
}
