pub mod api;
pub mod block;
pub mod cache;
pub mod chain;
pub mod rpc;
