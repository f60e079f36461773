use crate::appstate::AppState;
use crate::service::block::BlockService;
use crate::service::chain::ChainService;
use crate::service::rpc::RpcProxyService;
use crate::service::transaction::TransactionService;

#[derive(Clone)]
pub struct CommonState {
    pub block_service: BlockService,
    pub transaction_service: TransactionService,
    pub chain_service: ChainService,
    pub rpc_service: RpcProxyService,
}

impl CommonState {
    pub fn new(data: AppState) -> Self {
        Self {
            block_service: BlockService::new(data.clone()),
            transaction_service: TransactionService::new(data.clone()),
            chain_service: ChainService::new(data.clone()),
            rpc_service: RpcProxyService::new(data),
        }
    }
}
