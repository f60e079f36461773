use axum::extract::State;
use axum::Json;
use axum_macros::debug_handler;

use crate::dto::rpc::ProxyRequest;
use crate::error::api::ApiError;
use crate::error::proxy::ProxyError;
use crate::response::rpc::ProxyResponse;
use crate::state::common::CommonState;

#[debug_handler]
pub async fn proxy(
    State(state): State<CommonState>,
    Json(request): Json<ProxyRequest>,
) -> Result<Json<ProxyResponse>, ApiError> {
    let method = request
        .method
        .filter(|method| !method.trim().is_empty())
        .ok_or(ProxyError::MissingMethod)?;

    let response = state
        .rpc_service
        .forward(method, request.params.unwrap_or_default())
        .await?;

    Ok(Json(response))
}
