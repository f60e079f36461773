use axum::http::StatusCode;
use shared::error::RpcError;

pub mod api;
pub mod block;
pub mod chain;
pub mod proxy;
pub mod transaction;

pub fn rpc_status(error: &RpcError) -> StatusCode {
    match error {
        RpcError::NotFound => StatusCode::NOT_FOUND,
        RpcError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        RpcError::TransientNetworkFailure(_) => StatusCode::GATEWAY_TIMEOUT,
        RpcError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
        RpcError::Protocol(_) => StatusCode::BAD_REQUEST,
        RpcError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
