use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use axum_macros::debug_handler;
use shared::explorer::ChainStatus;

use crate::error::api::ApiError;
use crate::response::chain::NetworkResponse;
use crate::state::common::CommonState;

#[debug_handler]
pub async fn get_network(
    _headers: HeaderMap,
    State(state): State<CommonState>,
) -> Json<NetworkResponse> {
    Json(NetworkResponse {
        network: state.chain_service.get_network(),
    })
}

#[debug_handler]
pub async fn get_chain_status(
    _headers: HeaderMap,
    State(state): State<CommonState>,
) -> Result<Json<ChainStatus>, ApiError> {
    let status = state.chain_service.get_chain_status().await?;

    Ok(Json(status))
}
