use std::time::Duration;

use crate::network::EndpointRole;
use crate::rpc::config::RpcConfig;
use crate::rpc::transport::TransportError;

const TOO_MANY_REQUESTS: &str = "too many requests";

// JSON-RPC codes that mean the request itself is wrong.
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const UNSUPPORTED_TRANSACTION_VERSION: i64 = -32015;

// Solana codes for slots the node has no block for.
const BLOCK_NOT_AVAILABLE: i64 = -32004;
const SLOT_SKIPPED: i64 = -32007;
const LONG_TERM_STORAGE_SLOT_SKIPPED: i64 = -32009;
const BLOCK_STATUS_NOT_AVAILABLE_YET: i64 = -32014;

/// What a failed attempt means for the rest of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Throttled: wait and try the same endpoint again.
    Retry,
    /// This endpoint is unhealthy: move on to the next one.
    Failover,
    /// The request is malformed; no endpoint will accept it.
    Abort,
    /// The node answered that the record does not exist.
    NotFound,
    /// The same-origin proxy rejected us; hand it to the caller as is.
    Surface,
}

impl Disposition {
    pub fn classify(error: &TransportError) -> Self {
        match error {
            TransportError::RateLimited { .. } => Disposition::Surface,
            TransportError::Http { status: 429 | 403, .. } => Disposition::Retry,
            TransportError::Http { body, .. } if mentions_throttling(body) => {
                Disposition::Retry
            }
            TransportError::Http { status: 400, .. } => Disposition::Abort,
            TransportError::Rpc { message, .. }
                if mentions_throttling(message) =>
            {
                Disposition::Retry
            }
            TransportError::Rpc { code, .. } => match *code {
                INVALID_REQUEST
                | METHOD_NOT_FOUND
                | INVALID_PARAMS
                | UNSUPPORTED_TRANSACTION_VERSION => Disposition::Abort,
                BLOCK_NOT_AVAILABLE
                | SLOT_SKIPPED
                | LONG_TERM_STORAGE_SLOT_SKIPPED
                | BLOCK_STATUS_NOT_AVAILABLE_YET => Disposition::NotFound,
                _ => Disposition::Failover,
            },
            TransportError::Malformed(_) => Disposition::Abort,
            TransportError::Http { .. }
            | TransportError::Timeout(_)
            | TransportError::Connection(_) => Disposition::Failover,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Disposition::Abort | Disposition::NotFound | Disposition::Surface
        )
    }
}

fn mentions_throttling(message: &str) -> bool {
    message.to_lowercase().contains(TOO_MANY_REQUESTS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    TryPrimary { attempt: u32 },
    BackoffPrimary { attempt: u32, delay: Duration },
    TryFallback,
    Succeeded(EndpointRole),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    Succeeded,
    Failed(Disposition),
    BackoffElapsed,
}

impl CallState {
    pub fn initial() -> Self {
        CallState::TryPrimary { attempt: 0 }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, CallState::Succeeded(_) | CallState::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts against the primary endpoint, including the first.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&RpcConfig> for RetryPolicy {
    fn from(config: &RpcConfig) -> Self {
        Self {
            max_retries: config.rpc_max_retries.max(1),
            base_delay: Duration::from_millis(config.rpc_base_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// `base_delay * 2^attempt`, saturating.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    pub fn transition(&self, state: CallState, event: CallEvent) -> CallState {
        match (state, event) {
            (CallState::TryPrimary { .. }, CallEvent::Succeeded) => {
                CallState::Succeeded(EndpointRole::Primary)
            }
            (CallState::TryFallback, CallEvent::Succeeded) => {
                CallState::Succeeded(EndpointRole::Fallback)
            }
            (
                CallState::TryPrimary { .. } | CallState::TryFallback,
                CallEvent::Failed(disposition),
            ) if disposition.is_terminal() => CallState::Failed,
            (
                CallState::TryPrimary { attempt },
                CallEvent::Failed(Disposition::Retry),
            ) if attempt + 1 < self.max_retries => CallState::BackoffPrimary {
                attempt,
                delay: self.backoff_delay(attempt),
            },
            (CallState::TryPrimary { .. }, CallEvent::Failed(_)) => {
                CallState::TryFallback
            }
            (CallState::TryFallback, CallEvent::Failed(_)) => CallState::Failed,
            (
                CallState::BackoffPrimary { attempt, .. },
                CallEvent::BackoffElapsed,
            ) => CallState::TryPrimary {
                attempt: attempt + 1,
            },
            (state, event) => {
                tracing::error!(?state, ?event, "Unexpected call transition");
                CallState::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> TransportError {
        TransportError::Http {
            status,
            body: String::new(),
        }
    }

    fn rpc(code: i64, message: &str) -> TransportError {
        TransportError::Rpc {
            code,
            message: message.to_string(),
        }
    }

    #[test]
    fn throttling_is_retried() {
        assert_eq!(Disposition::classify(&http(429)), Disposition::Retry);
        assert_eq!(Disposition::classify(&http(403)), Disposition::Retry);
        assert_eq!(
            Disposition::classify(&rpc(
                -32005,
                "Too many requests for a specific RPC call"
            )),
            Disposition::Retry
        );
        assert_eq!(
            Disposition::classify(&TransportError::Http {
                status: 503,
                body: "Too Many Requests".to_string()
            }),
            Disposition::Retry
        );
    }

    #[test]
    fn malformed_requests_abort() {
        assert_eq!(
            Disposition::classify(&rpc(
                -32015,
                "Transaction version (1) is not supported"
            )),
            Disposition::Abort
        );
        assert_eq!(
            Disposition::classify(&rpc(-32601, "Method not found")),
            Disposition::Abort
        );
        assert_eq!(Disposition::classify(&http(400)), Disposition::Abort);
    }

    #[test]
    fn missing_blocks_are_not_found() {
        for code in [-32004, -32007, -32009, -32014] {
            assert_eq!(
                Disposition::classify(&rpc(code, "no block")),
                Disposition::NotFound
            );
        }
    }

    #[test]
    fn outages_fail_over() {
        assert_eq!(Disposition::classify(&http(502)), Disposition::Failover);
        assert_eq!(
            Disposition::classify(&TransportError::Timeout(
                Duration::from_secs(30)
            )),
            Disposition::Failover
        );
        assert_eq!(
            Disposition::classify(&TransportError::Connection(
                "refused".to_string()
            )),
            Disposition::Failover
        );
        assert_eq!(
            Disposition::classify(&rpc(-32603, "Internal error")),
            Disposition::Failover
        );
    }

    #[test]
    fn proxy_rejections_surface() {
        let error = TransportError::RateLimited {
            limit: 60,
            remaining: 0,
            reset_at: 1_700_000_000,
        };
        assert_eq!(Disposition::classify(&error), Disposition::Surface);
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff_delay(0), Duration::from_millis(1000));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(2000));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(4000));
        assert_eq!(policy.backoff_delay(64), Duration::MAX);
    }

    #[test]
    fn retries_primary_then_fails_over() {
        let policy = RetryPolicy::default();
        let throttled = CallEvent::Failed(Disposition::Retry);

        let mut state = CallState::initial();
        let mut primary_attempts = 1;
        loop {
            state = policy.transition(state, throttled);
            match state {
                CallState::BackoffPrimary { .. } => {
                    state = policy.transition(state, CallEvent::BackoffElapsed);
                    primary_attempts += 1;
                }
                _ => break,
            }
        }

        assert_eq!(primary_attempts, 3);
        assert_eq!(state, CallState::TryFallback);
    }

    #[test]
    fn backoff_carries_delay_for_attempt() {
        let policy = RetryPolicy::default();
        let state = policy.transition(
            CallState::TryPrimary { attempt: 1 },
            CallEvent::Failed(Disposition::Retry),
        );

        assert_eq!(
            state,
            CallState::BackoffPrimary {
                attempt: 1,
                delay: Duration::from_millis(2000)
            }
        );
        assert_eq!(
            policy.transition(state, CallEvent::BackoffElapsed),
            CallState::TryPrimary { attempt: 2 }
        );
    }

    #[test]
    fn outage_switches_endpoint_without_backoff() {
        let policy = RetryPolicy::default();

        assert_eq!(
            policy.transition(
                CallState::initial(),
                CallEvent::Failed(Disposition::Failover)
            ),
            CallState::TryFallback
        );
    }

    #[test]
    fn abort_never_reaches_fallback() {
        let policy = RetryPolicy::default();

        for disposition in
            [Disposition::Abort, Disposition::NotFound, Disposition::Surface]
        {
            assert_eq!(
                policy.transition(
                    CallState::initial(),
                    CallEvent::Failed(disposition)
                ),
                CallState::Failed
            );
        }
    }

    #[test]
    fn fallback_gets_one_attempt() {
        let policy = RetryPolicy::default();

        assert_eq!(
            policy.transition(
                CallState::TryFallback,
                CallEvent::Failed(Disposition::Retry)
            ),
            CallState::Failed
        );
        assert_eq!(
            policy.transition(CallState::TryFallback, CallEvent::Succeeded),
            CallState::Succeeded(EndpointRole::Fallback)
        );
    }

    #[test]
    fn single_attempt_policy_fails_over_immediately() {
        let policy = RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(10),
        };

        assert_eq!(
            policy.transition(
                CallState::initial(),
                CallEvent::Failed(Disposition::Retry)
            ),
            CallState::TryFallback
        );
    }
}
