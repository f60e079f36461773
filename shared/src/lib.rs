pub mod block;
pub mod error;
pub mod explorer;
pub mod futures;
pub mod log_config;
pub mod network;
pub mod rpc;
pub mod transaction;
