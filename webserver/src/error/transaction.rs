use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use shared::error::RpcError;
use thiserror::Error;

use super::rpc_status;
use crate::response::api::ApiErrorResponse;
use crate::response::cache::NO_STORE;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Transaction not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl IntoResponse for TransactionError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            TransactionError::NotFound(_) => StatusCode::NOT_FOUND,
            TransactionError::Rpc(error) => rpc_status(error),
        };

        let mut response =
            ApiErrorResponse::send(status_code.as_u16(), Some(self.to_string()));
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, NO_STORE.clone());
        response
    }
}
