pub mod block;
pub mod chain;
pub mod debug;
pub mod rpc;
pub mod transaction;
