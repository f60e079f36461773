use serde::{Deserialize, Serialize};

use crate::rpc::types::RawBlock;

pub type Slot = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockData {
    /// The slot; the explorer uses slot and height interchangeably.
    pub block_height: Slot,
    pub block_hash: String,
    pub block_time: Option<i64>,
    pub parent_slot: Slot,
    pub previous_blockhash: String,
    pub transaction_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_slots: Option<Vec<Slot>>,
}

impl BlockData {
    pub fn from_raw(slot: Slot, block: &RawBlock) -> Self {
        Self {
            block_height: slot,
            block_hash: block.blockhash.clone(),
            block_time: block.block_time,
            parent_slot: block.parent_slot,
            previous_blockhash: block.previous_blockhash.clone(),
            transaction_count: block.transaction_count(),
            leader: None,
            child_slots: None,
        }
    }

    pub fn with_leader(self, leader: Option<String>) -> Self {
        Self { leader, ..self }
    }

    pub fn with_child_slots(self, child_slots: Vec<Slot>) -> Self {
        Self {
            child_slots: Some(child_slots),
            ..self
        }
    }

    /// Keeps the node's timestamp and only fills a missing one.
    pub fn with_block_time(self, block_time: Option<i64>) -> Self {
        Self {
            block_time: self.block_time.or(block_time),
            ..self
        }
    }
}
