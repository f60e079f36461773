use axum::http::HeaderValue;
use lazy_static::lazy_static;
use shared::block::BlockData;
use shared::rpc::Commitment;

lazy_static! {
    /// Finalized content never changes.
    pub static ref IMMUTABLE: HeaderValue =
        HeaderValue::from_static("public, max-age=31536000, immutable");
    pub static ref RECENT: HeaderValue =
        HeaderValue::from_static("public, max-age=10");
    pub static ref NO_STORE: HeaderValue = HeaderValue::from_static("no-store");
}

/// Immutable only when read at `finalized` commitment.
pub fn commitment_policy(commitment: Commitment) -> &'static HeaderValue {
    match commitment {
        Commitment::Finalized => &*IMMUTABLE,
        Commitment::Confirmed => &*RECENT,
    }
}

/// A block response also carries its leader and child slot, which are only
/// settled once both are known.
pub fn block_policy(
    block: &BlockData,
    commitment: Commitment,
) -> &'static HeaderValue {
    let enrichment_settled = block.leader.is_some()
        && block
            .child_slots
            .as_ref()
            .is_some_and(|children| !children.is_empty());

    if enrichment_settled {
        commitment_policy(commitment)
    } else {
        &*RECENT
    }
}
