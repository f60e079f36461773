use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::error::RpcError;
use thiserror::Error;

use super::rpc_status;
use crate::response::rpc::ProxyErrorBody;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Missing required parameters: method")]
    MissingMethod,
    #[error("{error}")]
    Rpc {
        error: RpcError,
        network: String,
        method: String,
    },
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status_code, body) = match self {
            ProxyError::MissingMethod => (
                StatusCode::BAD_REQUEST,
                ProxyErrorBody {
                    error: ProxyError::MissingMethod.to_string(),
                    network: None,
                    method: None,
                },
            ),
            ProxyError::Rpc {
                error,
                network,
                method,
            } => (
                rpc_status(&error),
                ProxyErrorBody {
                    error: error.to_string(),
                    network: Some(network),
                    method: Some(method),
                },
            ),
        };

        (status_code, Json(body)).into_response()
    }
}
