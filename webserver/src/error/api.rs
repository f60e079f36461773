use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::block::BlockError;
use super::chain::ChainError;
use super::proxy::ProxyError;
use super::transaction::TransactionError;
use crate::response::api::ApiErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    BlockError(#[from] BlockError),
    #[error(transparent)]
    TransactionError(#[from] TransactionError),
    #[error(transparent)]
    ChainError(#[from] ChainError),
    #[error(transparent)]
    ProxyError(#[from] ProxyError),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Too many requests, retry after {reset_at}")]
    RateLimited { limit: u32, reset_at: i64 },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BlockError(error) => error.into_response(),
            ApiError::TransactionError(error) => error.into_response(),
            ApiError::ChainError(error) => error.into_response(),
            ApiError::ProxyError(error) => error.into_response(),
            ApiError::InvalidQuery(_) => ApiErrorResponse::send(
                StatusCode::BAD_REQUEST.as_u16(),
                Some(self.to_string()),
            ),
            ApiError::RateLimited { .. } => ApiErrorResponse::send(
                StatusCode::TOO_MANY_REQUESTS.as_u16(),
                Some(self.to_string()),
            ),
        }
    }
}
