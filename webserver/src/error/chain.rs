use axum::response::{IntoResponse, Response};
use shared::error::RpcError;
use thiserror::Error;

use super::rpc_status;
use crate::response::api::ApiErrorResponse;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl IntoResponse for ChainError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            ChainError::Rpc(error) => rpc_status(error),
        };

        ApiErrorResponse::send(status_code.as_u16(), Some(self.to_string()))
    }
}
