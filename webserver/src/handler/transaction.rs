use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use axum_macros::debug_handler;
use shared::transaction::TransactionDetailData;

use crate::error::api::ApiError;
use crate::response::cache::commitment_policy;
use crate::state::common::CommonState;

#[debug_handler]
pub async fn get_transaction(
    _headers: HeaderMap,
    Path(signature): Path<String>,
    State(state): State<CommonState>,
) -> Result<
    ([(header::HeaderName, header::HeaderValue); 1], Json<TransactionDetailData>),
    ApiError,
> {
    let transaction = state
        .transaction_service
        .get_transaction_by_signature(signature)
        .await?;

    let policy = commitment_policy(state.transaction_service.commitment());

    Ok(([(header::CACHE_CONTROL, policy.clone())], Json(transaction)))
}
