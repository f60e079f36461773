use std::sync::Arc;

use shared::block::{BlockData, Slot};
use shared::explorer;
use shared::rpc::{Commitment, RpcClient};
use shared::transaction::TransactionData;

use crate::appstate::AppState;
use crate::error::block::BlockError;

#[derive(Clone)]
pub struct BlockService {
    client: Arc<RpcClient>,
}

impl BlockService {
    pub fn new(app_state: AppState) -> Self {
        Self {
            client: app_state.client(),
        }
    }

    pub fn commitment(&self) -> Commitment {
        self.client.commitment()
    }

    pub async fn get_recent_blocks(
        &self,
        limit: usize,
    ) -> Result<Vec<BlockData>, BlockError> {
        let blocks = explorer::get_recent_blocks(&self.client, limit).await?;

        Ok(blocks)
    }

    pub async fn get_block_by_slot(
        &self,
        slot: Slot,
    ) -> Result<BlockData, BlockError> {
        explorer::get_block_by_slot(&self.client, slot)
            .await?
            .ok_or(BlockError::NotFound(slot))
    }

    pub async fn get_block_transactions(
        &self,
        slot: Slot,
    ) -> Result<Vec<TransactionData>, BlockError> {
        let transactions =
            explorer::get_transactions_from_block(&self.client, slot).await?;

        Ok(transactions)
    }

    pub async fn get_slot_leader(&self, slot: Slot) -> Option<String> {
        explorer::get_slot_leader(&self.client, slot).await
    }

    pub async fn get_child_slots(&self, slot: Slot) -> Vec<Slot> {
        explorer::get_child_slots(&self.client, slot).await
    }
}
