use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_retry::strategy::{jitter, FixedInterval};
use tokio_retry::RetryIf;

use crate::error::{truncate_message, AsInternalError, AsProtocolError, RpcError};
use crate::network::{
    sanitize_url, EndpointResolver, EndpointRole, Network, ResolvedEndpoint,
};
use crate::rpc::config::{Commitment, RpcConfig};
use crate::rpc::retry::{CallEvent, CallState, Disposition, RetryPolicy};
use crate::rpc::transport::{
    HttpTransport, ProxyTransport, RpcTransport, TransportError,
};

const ERROR_CONTEXT_LIMIT: usize = 100;
const INIT_CHECK_METHOD: &str = "getSlot";
const INIT_CHECK_INTERVAL_MS: u64 = 500;
const INIT_CHECK_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcEndpoints {
    pub network: Network,
    pub primary: ResolvedEndpoint,
    pub fallback: ResolvedEndpoint,
}

impl RpcEndpoints {
    /// Resolves both roles for `network` and logs where they came from.
    pub fn resolve(resolver: &EndpointResolver, network: Network) -> Self {
        let primary = resolver.resolve(network, EndpointRole::Primary);
        let fallback = resolver.resolve(network, EndpointRole::Fallback);

        tracing::info!(
            %network,
            primary = %sanitize_url(&primary.url),
            primary_source = %primary.source,
            fallback = %sanitize_url(&fallback.url),
            fallback_source = %fallback.source,
            "Selected Solana network"
        );

        Self {
            network,
            primary,
            fallback,
        }
    }

    /// Both roles pointed at the same-origin proxy.
    pub fn proxy(network: Network, url: &str) -> Self {
        let endpoint = ResolvedEndpoint {
            url: url.to_string(),
            source: crate::network::EndpointSource::Configured,
        };

        tracing::info!(
            %network,
            proxy = %sanitize_url(url),
            "Using explorer proxy"
        );

        Self {
            network,
            primary: endpoint.clone(),
            fallback: endpoint,
        }
    }

    fn url(&self, role: EndpointRole) -> &str {
        match role {
            EndpointRole::Primary => &self.primary.url,
            EndpointRole::Fallback => &self.fallback.url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Uninitialized,
    /// The endpoint answered the startup check.
    Ready(Network),
    /// The startup check failed or timed out; serving the configured network.
    Defaulted(Network),
}

impl Readiness {
    pub fn network(&self) -> Option<Network> {
        match self {
            Readiness::Uninitialized => None,
            Readiness::Ready(network) | Readiness::Defaulted(network) => {
                Some(*network)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub result: Value,
    pub network: Network,
    pub endpoint: EndpointRole,
}

/// JSON-RPC client with retry, backoff and primary/fallback failover.
///
/// Construction is synchronous; [`RpcClient::initialize`] must run before
/// the first [`RpcClient::call`].
pub struct RpcClient {
    transport: Arc<dyn RpcTransport>,
    endpoints: RpcEndpoints,
    policy: RetryPolicy,
    commitment: Commitment,
    call_deadline: Duration,
    init_timeout: Duration,
    fetch_concurrency: usize,
    readiness: RwLock<Readiness>,
}

impl RpcClient {
    pub fn new(
        transport: Arc<dyn RpcTransport>,
        endpoints: RpcEndpoints,
        config: &RpcConfig,
    ) -> Self {
        Self {
            transport,
            endpoints,
            policy: RetryPolicy::from(config),
            commitment: config.rpc_commitment,
            call_deadline: config.call_deadline(),
            init_timeout: config.init_timeout(),
            fetch_concurrency: config.fetch_concurrency(),
            readiness: RwLock::new(Readiness::Uninitialized),
        }
    }

    /// Direct-to-node client for the configured network.
    pub fn from_config(config: &RpcConfig) -> Result<Self, RpcError> {
        let transport =
            HttpTransport::new(config.request_timeout()).into_internal_error()?;
        let endpoints = RpcEndpoints::resolve(&config.resolver(), config.network());

        Ok(Self::new(Arc::new(transport), endpoints, config))
    }

    /// Client that goes through the explorer's own proxy endpoint.
    pub fn via_proxy(config: &RpcConfig, proxy_url: &str) -> Result<Self, RpcError> {
        let transport =
            ProxyTransport::new(config.request_timeout()).into_internal_error()?;
        let endpoints = RpcEndpoints::proxy(config.network(), proxy_url);

        Ok(Self::new(Arc::new(transport), endpoints, config))
    }

    pub fn endpoints(&self) -> &RpcEndpoints {
        &self.endpoints
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }

    /// Upper bound on one [`RpcClient::call`], retries and failover included.
    pub fn call_deadline(&self) -> Duration {
        self.call_deadline
    }

    pub fn readiness(&self) -> Readiness {
        *self
            .readiness
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_ready(&self) -> bool {
        self.readiness() != Readiness::Uninitialized
    }

    /// Network currently served, `None` until initialized.
    pub fn network(&self) -> Option<Network> {
        self.readiness().network()
    }

    fn set_readiness(&self, readiness: Readiness) {
        *self
            .readiness
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = readiness;
    }

    /// Checks the endpoint once so the serving network is known before the
    /// first call. Never fails: on error or timeout the client falls back to
    /// the configured network.
    pub async fn initialize(&self) -> Readiness {
        let retry_strategy = FixedInterval::from_millis(INIT_CHECK_INTERVAL_MS)
            .map(jitter)
            .take(INIT_CHECK_ATTEMPTS);

        let check = RetryIf::spawn(
            retry_strategy,
            || self.execute(INIT_CHECK_METHOD, &[]),
            |e: &RpcError| {
                matches!(
                    e,
                    RpcError::UpstreamUnavailable { .. }
                        | RpcError::TransientNetworkFailure(_)
                )
            },
        );

        let readiness = match tokio::time::timeout(self.init_timeout, check).await
        {
            Ok(Ok(outcome)) => {
                tracing::info!(
                    network = %outcome.network,
                    endpoint = %outcome.endpoint,
                    "RPC client ready"
                );
                Readiness::Ready(outcome.network)
            }
            Ok(Err(reason)) => {
                tracing::warn!(
                    %reason,
                    network = %self.endpoints.network,
                    "RPC readiness check failed, using configured network"
                );
                Readiness::Defaulted(self.endpoints.network)
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.init_timeout,
                    network = %self.endpoints.network,
                    "RPC readiness check timed out, using configured network"
                );
                Readiness::Defaulted(self.endpoints.network)
            }
        };

        self.set_readiness(readiness);
        readiness
    }

    pub async fn call(
        &self,
        method: &str,
        params: &[Value],
    ) -> Result<CallOutcome, RpcError> {
        let Some(cached) = self.network() else {
            return Err(RpcError::Internal(
                "RPC client used before initialize()".to_string(),
            ));
        };

        let outcome = self.execute(method, params).await?;

        if outcome.network != cached {
            tracing::warn!(
                previous = %cached,
                current = %outcome.network,
                "Serving network changed"
            );
            self.set_readiness(Readiness::Ready(outcome.network));
        }

        Ok(outcome)
    }

    /// [`RpcClient::call`] plus decoding of the result.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[Value],
    ) -> Result<T, RpcError> {
        let outcome = self.call(method, params).await?;

        serde_json::from_value(outcome.result).into_protocol_error(method)
    }

    async fn execute(
        &self,
        method: &str,
        params: &[Value],
    ) -> Result<CallOutcome, RpcError> {
        match tokio::time::timeout(self.call_deadline, self.drive(method, params))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(method, deadline = ?self.call_deadline, "RPC call deadline exceeded");
                Err(RpcError::TransientNetworkFailure(format!(
                    "{method} exceeded the {:?} deadline",
                    self.call_deadline
                )))
            }
        }
    }

    async fn drive(
        &self,
        method: &str,
        params: &[Value],
    ) -> Result<CallOutcome, RpcError> {
        let mut state = CallState::initial();
        let mut primary_error: Option<TransportError> = None;
        let mut last_failure: Option<(TransportError, Disposition)> = None;

        loop {
            let role = match state {
                CallState::TryPrimary { .. } => EndpointRole::Primary,
                CallState::TryFallback => EndpointRole::Fallback,
                CallState::BackoffPrimary { attempt, delay } => {
                    tracing::debug!(method, attempt, ?delay, "Backing off");
                    tokio::time::sleep(delay).await;
                    state = self.policy.transition(state, CallEvent::BackoffElapsed);
                    continue;
                }
                CallState::Succeeded(_) | CallState::Failed => break,
            };

            match self
                .transport
                .send(self.endpoints.url(role), method, params)
                .await
            {
                Ok(response) => {
                    return Ok(CallOutcome {
                        result: response.result,
                        network: response.network.unwrap_or(self.endpoints.network),
                        endpoint: role,
                    });
                }
                Err(error) => {
                    let disposition = Disposition::classify(&error);
                    tracing::warn!(
                        method,
                        %role,
                        %error,
                        ?disposition,
                        "RPC attempt failed"
                    );
                    state = self
                        .policy
                        .transition(state, CallEvent::Failed(disposition));
                    if role == EndpointRole::Primary {
                        primary_error = Some(error.clone());
                    }
                    last_failure = Some((error, disposition));
                }
            }
        }

        Err(match last_failure {
            Some((error, Disposition::NotFound)) => {
                tracing::debug!(method, %error, "Node has no such record");
                RpcError::NotFound
            }
            Some((error, Disposition::Abort)) => RpcError::Protocol(
                truncate_message(&error.to_string(), ERROR_CONTEXT_LIMIT),
            ),
            Some((
                TransportError::RateLimited {
                    limit,
                    remaining,
                    reset_at,
                },
                _,
            )) => RpcError::RateLimited {
                limit,
                remaining,
                reset_at,
            },
            Some((fallback_error, _)) => {
                let primary = primary_error
                    .map(|error| error.to_string())
                    .unwrap_or_default();
                tracing::error!(
                    method,
                    %primary,
                    fallback = %fallback_error,
                    "Both RPC endpoints failed"
                );
                RpcError::UpstreamUnavailable {
                    primary: truncate_message(&primary, ERROR_CONTEXT_LIMIT),
                    fallback: truncate_message(
                        &fallback_error.to_string(),
                        ERROR_CONTEXT_LIMIT,
                    ),
                }
            }
            None => RpcError::Internal(format!(
                "{method} finished without an attempt"
            )),
        })
    }
}
