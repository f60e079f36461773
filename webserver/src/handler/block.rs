use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::Json;
use axum_macros::debug_handler;
use shared::block::{BlockData, Slot};
use shared::transaction::TransactionData;
use validator::Validate;

use crate::dto::block::RecentBlocksQueryParams;
use crate::error::api::ApiError;
use crate::response::block::{ChildrenResponse, LeaderResponse};
use crate::response::cache::{
    block_policy, commitment_policy, NO_STORE, RECENT,
};
use crate::state::common::CommonState;

type Cached<T> = ([(header::HeaderName, HeaderValue); 1], Json<T>);

fn cached<T>(policy: &HeaderValue, body: T) -> Cached<T> {
    ([(header::CACHE_CONTROL, policy.clone())], Json(body))
}

#[debug_handler]
pub async fn get_recent_blocks(
    _headers: HeaderMap,
    Query(query): Query<RecentBlocksQueryParams>,
    State(state): State<CommonState>,
) -> Result<Cached<Vec<BlockData>>, ApiError> {
    query
        .validate()
        .map_err(|e| ApiError::InvalidQuery(e.to_string()))?;

    let blocks = state.block_service.get_recent_blocks(query.limit()).await?;

    Ok(cached(&RECENT, blocks))
}

#[debug_handler]
pub async fn get_block(
    _headers: HeaderMap,
    Path(slot): Path<Slot>,
    State(state): State<CommonState>,
) -> Result<Cached<BlockData>, ApiError> {
    let block = state.block_service.get_block_by_slot(slot).await?;
    let policy = block_policy(&block, state.block_service.commitment());

    Ok(cached(policy, block))
}

#[debug_handler]
pub async fn get_block_transactions(
    _headers: HeaderMap,
    Path(slot): Path<Slot>,
    State(state): State<CommonState>,
) -> Result<Cached<Vec<TransactionData>>, ApiError> {
    let transactions =
        state.block_service.get_block_transactions(slot).await?;

    // An empty list may just be a block the node does not have yet.
    let policy = if transactions.is_empty() {
        &*NO_STORE
    } else {
        commitment_policy(state.block_service.commitment())
    };

    Ok(cached(policy, transactions))
}

#[debug_handler]
pub async fn get_block_leader(
    _headers: HeaderMap,
    Path(slot): Path<Slot>,
    State(state): State<CommonState>,
) -> Json<LeaderResponse> {
    let leader = state.block_service.get_slot_leader(slot).await;

    Json(LeaderResponse { slot, leader })
}

#[debug_handler]
pub async fn get_block_children(
    _headers: HeaderMap,
    Path(slot): Path<Slot>,
    State(state): State<CommonState>,
) -> Json<ChildrenResponse> {
    let child_slots = state.block_service.get_child_slots(slot).await;

    Json(ChildrenResponse { slot, child_slots })
}
