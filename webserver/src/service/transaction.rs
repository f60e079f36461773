use std::sync::Arc;

use shared::explorer;
use shared::rpc::{Commitment, RpcClient};
use shared::transaction::TransactionDetailData;

use crate::appstate::AppState;
use crate::error::transaction::TransactionError;

#[derive(Clone)]
pub struct TransactionService {
    client: Arc<RpcClient>,
}

impl TransactionService {
    pub fn new(app_state: AppState) -> Self {
        Self {
            client: app_state.client(),
        }
    }

    pub fn commitment(&self) -> Commitment {
        self.client.commitment()
    }

    pub async fn get_transaction_by_signature(
        &self,
        signature: String,
    ) -> Result<TransactionDetailData, TransactionError> {
        explorer::get_transaction_by_signature(&self.client, &signature)
            .await?
            .ok_or(TransactionError::NotFound(signature))
    }
}
