pub mod block;
pub mod rpc;
