//! Explorer-shaped operations on top of [`RpcClient`].
//!
//! Missing records come back as `None` or an empty list. Enrichment lookups
//! (leader, child slots, block time) are best effort and never fail the
//! caller. Every operation finishes within one call deadline of the client.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::block::{BlockData, Slot};
use crate::error::RpcError;
use crate::futures::with_fallback_value;
use crate::rpc::client::RpcClient;
use crate::rpc::types::{
    RawBlock, RawConfirmedTransaction, RawLatestBlockhash, RawWithContext,
};
use crate::transaction::{TransactionData, TransactionDetailData};

pub const CHILD_SLOT_LOOKAHEAD: Slot = 10;
pub const UNKNOWN_NETWORK: &str = "unknown";

const SIGNATURE_BYTES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionDetails {
    Signatures,
    Full,
}

impl TransactionDetails {
    fn as_str(&self) -> &'static str {
        match self {
            TransactionDetails::Signatures => "signatures",
            TransactionDetails::Full => "full",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatus {
    pub network: String,
    pub slot: Slot,
    pub latest_blockhash: String,
    pub last_valid_block_height: u64,
}

fn block_params(
    client: &RpcClient,
    slot: Slot,
    details: TransactionDetails,
) -> Vec<Value> {
    vec![
        json!(slot),
        json!({
            "encoding": "json",
            "maxSupportedTransactionVersion": 0,
            "transactionDetails": details.as_str(),
            "rewards": false,
            "commitment": client.commitment(),
        }),
    ]
}

async fn fetch_block(
    client: &RpcClient,
    slot: Slot,
    details: TransactionDetails,
) -> Result<Option<RawBlock>, RpcError> {
    match client
        .call_as::<Option<RawBlock>>(
            "getBlock",
            &block_params(client, slot, details),
        )
        .await
    {
        Ok(block) => Ok(block),
        Err(RpcError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn get_current_slot(client: &RpcClient) -> Result<Slot, RpcError> {
    client
        .call_as("getSlot", &[json!({"commitment": client.commitment()})])
        .await
}

/// The newest `limit` blocks, newest first. Slots without a block are
/// skipped, so fewer than `limit` entries may come back. When the call
/// deadline runs out the blocks collected so far are returned.
pub async fn get_recent_blocks(
    client: &RpcClient,
    limit: usize,
) -> Result<Vec<BlockData>, RpcError> {
    let budget_end = Instant::now() + client.call_deadline();
    let current = get_current_slot(client).await?;
    let slots = (0..=current).rev().take(limit);

    let mut fetches = stream::iter(slots)
        .map(|slot| async move {
            let block = fetch_block(client, slot, TransactionDetails::Signatures)
                .await;
            (slot, block)
        })
        .buffered(client.fetch_concurrency());

    let mut blocks = Vec::new();
    loop {
        let (slot, block) =
            match tokio::time::timeout_at(budget_end, fetches.next()).await {
                Ok(Some(fetched)) => fetched,
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        collected = blocks.len(),
                        limit,
                        "Recent blocks deadline reached, returning partial list"
                    );
                    break;
                }
            };

        match block {
            Ok(Some(raw)) => blocks.push(BlockData::from_raw(slot, &raw)),
            Ok(None) => tracing::debug!(slot, "No block at slot, skipping"),
            Err(e @ RpcError::RateLimited { .. }) => return Err(e),
            Err(reason) => {
                tracing::warn!(slot, %reason, "Could not fetch block, skipping")
            }
        }
    }

    Ok(blocks)
}

pub async fn get_block_by_slot(
    client: &RpcClient,
    slot: Slot,
) -> Result<Option<BlockData>, RpcError> {
    let deadline = Instant::now() + client.call_deadline();
    let (block, leader, child_slots) = tokio::join!(
        fetch_block(client, slot, TransactionDetails::Signatures),
        get_slot_leader(client, slot),
        get_child_slots(client, slot),
    );

    let Some(raw) = block? else {
        return Ok(None);
    };

    let block_time = match raw.block_time {
        Some(time) => Some(time),
        None => tokio::time::timeout_at(deadline, get_block_time(client, slot))
            .await
            .unwrap_or_else(|_| {
                tracing::warn!(slot, "No time left to look up block time");
                None
            }),
    };

    Ok(Some(
        BlockData::from_raw(slot, &raw)
            .with_block_time(block_time)
            .with_leader(leader)
            .with_child_slots(child_slots),
    ))
}

pub async fn get_transactions_from_block(
    client: &RpcClient,
    slot: Slot,
) -> Result<Vec<TransactionData>, RpcError> {
    let Some(raw) = fetch_block(client, slot, TransactionDetails::Full).await?
    else {
        return Ok(vec![]);
    };

    Ok(raw
        .transactions
        .unwrap_or_default()
        .iter()
        .map(|entry| {
            TransactionData::from_block_entry(
                entry,
                slot,
                raw.block_time,
                client.commitment(),
            )
        })
        .collect())
}

/// Base58 text that decodes to a 64-byte ed25519 signature.
pub fn is_valid_signature(signature: &str) -> bool {
    bs58::decode(signature)
        .into_vec()
        .is_ok_and(|bytes| bytes.len() == SIGNATURE_BYTES)
}

pub async fn get_transaction_by_signature(
    client: &RpcClient,
    signature: &str,
) -> Result<Option<TransactionDetailData>, RpcError> {
    if !is_valid_signature(signature) {
        tracing::debug!(signature, "Not a transaction signature");
        return Ok(None);
    }

    let params = [
        json!(signature),
        json!({
            "encoding": "jsonParsed",
            "maxSupportedTransactionVersion": 0,
            "commitment": client.commitment(),
        }),
    ];

    let raw = match client
        .call_as::<Option<RawConfirmedTransaction>>("getTransaction", &params)
        .await
    {
        Ok(raw) => raw,
        Err(RpcError::NotFound) => None,
        Err(e) => return Err(e),
    };

    Ok(raw.map(|raw| {
        TransactionDetailData::from_raw(signature, &raw, client.commitment())
    }))
}

pub async fn get_slot_leader(client: &RpcClient, slot: Slot) -> Option<String> {
    let params = [json!(slot), json!(1)];
    let leaders = client.call_as::<Vec<String>>("getSlotLeaders", &params);

    with_fallback_value(leaders, vec![], "slot leader")
        .await
        .into_iter()
        .next()
}

/// At most one child: the first produced slot after `slot`.
pub async fn get_child_slots(client: &RpcClient, slot: Slot) -> Vec<Slot> {
    let params = [
        json!(slot.saturating_add(1)),
        json!(slot.saturating_add(CHILD_SLOT_LOOKAHEAD)),
    ];

    let children = client.call_as::<Vec<Slot>>("getBlocks", &params);

    with_fallback_value(children, vec![], "child slots")
        .await
        .into_iter()
        .take(1)
        .collect()
}

pub async fn get_block_time(client: &RpcClient, slot: Slot) -> Option<i64> {
    let params = [json!(slot)];
    let block_time = client.call_as::<Option<i64>>("getBlockTime", &params);

    with_fallback_value(block_time, None, "block time").await
}

pub fn get_network(client: &RpcClient) -> String {
    client
        .network()
        .map(|network| network.to_string())
        .unwrap_or_else(|| UNKNOWN_NETWORK.to_string())
}

pub async fn get_chain_status(
    client: &RpcClient,
) -> Result<ChainStatus, RpcError> {
    let params = [json!({"commitment": client.commitment()})];
    let (slot, latest) = tokio::try_join!(
        get_current_slot(client),
        client.call_as::<RawWithContext<RawLatestBlockhash>>(
            "getLatestBlockhash",
            &params,
        ),
    )?;

    Ok(ChainStatus {
        network: get_network(client),
        slot,
        latest_blockhash: latest.value.blockhash,
        last_valid_block_height: latest.value.last_valid_block_height,
    })
}
