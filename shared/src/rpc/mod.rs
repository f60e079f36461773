pub mod client;
pub mod config;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::{CallOutcome, Readiness, RpcClient, RpcEndpoints};
pub use config::{Commitment, RpcConfig};
pub use retry::{CallState, Disposition, RetryPolicy};
pub use transport::{
    HttpTransport, ProxyTransport, RpcTransport, TransportError,
    TransportResponse,
};
