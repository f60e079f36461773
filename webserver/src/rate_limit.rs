//! Fixed-window, per-client request limiting for the `/api` routes.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use shared::rpc::transport::{
    RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER,
    RATE_LIMIT_RESET_HEADER,
};
use tokio::task::JoinHandle;

use crate::error::api::ApiError;

pub const ANONYMOUS_CLIENT: &str = "anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Unix seconds at which the client's window ends.
    pub reset_at: i64,
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    count: u32,
    reset_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: chrono::Duration,
    clients: Mutex<HashMap<String, ClientWindow>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window: chrono::Duration::from_std(window)
                .unwrap_or_else(|_| chrono::Duration::days(1)),
            clients: Mutex::default(),
        }
    }

    pub fn check_limit(&self, client_id: &str) -> RateLimitDecision {
        self.check_limit_at(client_id, Utc::now())
    }

    pub fn check_limit_at(
        &self,
        client_id: &str,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let window = clients
            .entry(client_id.to_string())
            .and_modify(|window| {
                if window.reset_at <= now {
                    *window = ClientWindow {
                        count: 0,
                        reset_at: self.window_end(now),
                    };
                }
            })
            .or_insert_with(|| ClientWindow {
                count: 0,
                reset_at: self.window_end(now),
            });

        let reset_at = window.reset_at.timestamp();
        if window.count < self.max_requests {
            window.count += 1;
            RateLimitDecision {
                allowed: true,
                limit: self.max_requests,
                remaining: self.max_requests - window.count,
                reset_at,
            }
        } else {
            RateLimitDecision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                reset_at,
            }
        }
    }

    /// Saturates at the latest representable instant.
    fn window_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Drops windows that ended before `now`. Returns how many were dropped.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = clients.len();
        clients.retain(|_, window| window.reset_at > now);
        before - clients.len()
    }

    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let dropped = self.sweep_expired();
                if dropped > 0 {
                    tracing::debug!(dropped, "Swept expired rate limit windows");
                }
            }
        })
    }
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the peer address.
pub fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .or_else(|| header("x-real-ip"))
        .map(str::to_string)
        .or_else(|| peer.map(|peer| peer.ip().to_string()))
        .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string())
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let values = [
        (RATE_LIMIT_LIMIT_HEADER, i64::from(decision.limit)),
        (RATE_LIMIT_REMAINING_HEADER, i64::from(decision.remaining)),
        (RATE_LIMIT_RESET_HEADER, decision.reset_at),
    ];
    for (name, value) in values {
        headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(peer)| *peer);
    let client = client_id(request.headers(), peer);
    let decision = limiter.check_limit(&client);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(
            %client,
            path = %request.uri().path(),
            reset_at = decision.reset_at,
            "Rate limit exceeded"
        );
        ApiError::RateLimited {
            limit: decision.limit,
            reset_at: decision.reset_at,
        }
        .into_response()
    };

    apply_headers(response.headers_mut(), &decision);
    response
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn admits_until_the_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        let remaining: Vec<_> = (0..3)
            .map(|_| limiter.check_limit_at("1.2.3.4", at(0)))
            .map(|decision| {
                assert!(decision.allowed);
                decision.remaining
            })
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let rejected = limiter.check_limit_at("1.2.3.4", at(1));
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);
        assert_eq!(rejected.limit, 3);
        assert_eq!(rejected.reset_at, at(60).timestamp());
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.check_limit_at("a", at(0)).allowed);
        assert!(limiter.check_limit_at("b", at(0)).allowed);
        assert!(!limiter.check_limit_at("a", at(0)).allowed);
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        limiter.check_limit_at("a", at(0));
        limiter.check_limit_at("a", at(0));
        assert!(!limiter.check_limit_at("a", at(59)).allowed);

        let fresh = limiter.check_limit_at("a", at(60));

        assert!(fresh.allowed);
        assert_eq!(fresh.remaining, 1);
        assert_eq!(fresh.reset_at, at(120).timestamp());
    }

    #[test]
    fn huge_window_saturates_reset_time() {
        // Fits a chrono::Duration but not a DateTime offset.
        let limiter =
            RateLimiter::new(1, Duration::from_secs(1_000_000_000_000_000));

        let decision = limiter.check_limit_at("a", at(0));

        assert!(decision.allowed);
        assert_eq!(decision.reset_at, DateTime::<Utc>::MAX_UTC.timestamp());
        assert!(!limiter.check_limit_at("a", at(1)).allowed);
    }

    #[test]
    fn sweep_drops_only_expired_windows() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        limiter.check_limit_at("old", at(0));
        limiter.check_limit_at("new", at(30));

        assert_eq!(limiter.sweep_expired_at(at(61)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn client_identity_precedence() {
        let peer: SocketAddr = "10.0.0.9:4000".parse().unwrap();
        let mut headers = HeaderMap::new();

        assert_eq!(client_id(&headers, None), ANONYMOUS_CLIENT);
        assert_eq!(client_id(&headers, Some(peer)), "10.0.0.9");

        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.1"));
        assert_eq!(client_id(&headers, Some(peer)), "192.168.1.1");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 70.41.3.18"),
        );
        assert_eq!(client_id(&headers, Some(peer)), "203.0.113.7");
    }
}
