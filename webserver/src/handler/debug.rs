use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use axum_macros::debug_handler;

use crate::response::cache::NO_STORE;
use crate::response::chain::DebugEnvResponse;
use crate::state::common::CommonState;

#[debug_handler]
pub async fn get_debug_env(
    _headers: HeaderMap,
    State(state): State<CommonState>,
) -> ([(header::HeaderName, header::HeaderValue); 1], Json<DebugEnvResponse>) {
    (
        [(header::CACHE_CONTROL, NO_STORE.clone())],
        Json(state.chain_service.debug_env()),
    )
}
