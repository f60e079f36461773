use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::error_handling::HandleErrorLayer;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{BoxError, Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::appstate::AppState;
use crate::config::AppConfig;
use crate::handler::{
    block as block_handlers, chain as chain_handlers,
    debug as debug_handlers, rpc as rpc_handlers,
    transaction as transaction_handlers,
};
use crate::rate_limit::{self, RateLimiter};
use crate::state::common::CommonState;

pub struct ApplicationServer;

impl ApplicationServer {
    pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
        let app_state = AppState::new(&config.rpc)
            .await
            .context("Failed to build the RPC client")?;

        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit_max_requests,
            config.rate_limit_window(),
        ));
        let sweeper = limiter
            .clone()
            .spawn_sweeper(config.rate_limit_sweep_interval());

        let router = Self::router(app_state, limiter, config.http_timeout());

        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        tracing::info!("🚀 Server has launched on http://{addr}");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(Self::shutdown_signal())
        .await
        .context("Server error")?;

        sweeper.abort();

        Ok(())
    }

    pub fn router(
        app_state: AppState,
        limiter: Arc<RateLimiter>,
        timeout: Duration,
    ) -> Router {
        let common_state = CommonState::new(app_state);

        let routes = Router::new()
            .route("/blocks", get(block_handlers::get_recent_blocks))
            .route("/block/:slot", get(block_handlers::get_block))
            .route(
                "/block/:slot/transactions",
                get(block_handlers::get_block_transactions),
            )
            .route("/block/:slot/leader", get(block_handlers::get_block_leader))
            .route(
                "/block/:slot/children",
                get(block_handlers::get_block_children),
            )
            .route(
                "/transaction/:signature",
                get(transaction_handlers::get_transaction),
            )
            .route("/chain/network", get(chain_handlers::get_network))
            .route("/chain/status", get(chain_handlers::get_chain_status));

        let api = Router::new()
            .nest("/v1", routes)
            .route("/solana", post(rpc_handlers::proxy))
            .route("/debug-env", get(debug_handlers::get_debug_env))
            .with_state(common_state)
            .layer(middleware::from_fn_with_state(
                limiter,
                rate_limit::rate_limit,
            ));

        let cors = CorsLayer::new()
            .allow_origin(HeaderValue::from_static("*"))
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .nest("/api", api)
            .route("/health", get(|| async { "ok" }))
            .fallback(Self::handle_404)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(HandleErrorLayer::new(move |err| {
                        Self::handle_timeout_error(err, timeout)
                    }))
                    .timeout(timeout)
                    .layer(cors),
            )
    }

    async fn handle_timeout_error(
        err: BoxError,
        timeout: Duration,
    ) -> (StatusCode, Json<serde_json::Value>) {
        if err.is::<tower::timeout::error::Elapsed>() {
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(json!({
                    "error":
                        format!(
                            "request took longer than the configured {} second timeout",
                            timeout.as_secs()
                        )
                })),
            )
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("unhandled internal error: {}", err)
                })),
            )
        }
    }

    async fn shutdown_signal() {
        if let Err(reason) = tokio::signal::ctrl_c().await {
            tracing::error!(%reason, "Failed to listen for ctrl-c");
        }
        tracing::warn!("signal shutdown");
    }

    async fn handle_404() -> impl IntoResponse {
        (
            StatusCode::NOT_FOUND,
            Json(json!({
                "errors": {
                    "message": vec![String::from(
                        "The requested resource does not exist on this server!"
                    )],
                }
            })),
        )
    }
}
