pub mod block;
pub mod chain;
pub mod rpc;
pub mod transaction;
