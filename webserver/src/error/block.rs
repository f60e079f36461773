use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use shared::block::Slot;
use shared::error::RpcError;
use thiserror::Error;

use super::rpc_status;
use crate::response::api::ApiErrorResponse;
use crate::response::cache::NO_STORE;

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Block not found at slot {0}")]
    NotFound(Slot),
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl IntoResponse for BlockError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            BlockError::NotFound(_) => StatusCode::NOT_FOUND,
            BlockError::Rpc(error) => rpc_status(error),
        };

        let mut response =
            ApiErrorResponse::send(status_code.as_u16(), Some(self.to_string()));
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, NO_STORE.clone());
        response
    }
}
