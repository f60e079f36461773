use std::time::Duration;

use shared::log_config::LogConfig;
use shared::rpc::RpcConfig;

/// Headroom over the RPC call deadline for routing and rendering.
pub const HTTP_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Every explorer operation finishes within one RPC call deadline, so the
/// HTTP layer waits a little longer than that.
pub fn http_timeout(rpc: &RpcConfig) -> Duration {
    rpc.call_deadline() + HTTP_TIMEOUT_MARGIN
}

#[derive(clap::Parser)]
pub struct AppConfig {
    #[clap(long, env, default_value = "5000")]
    pub port: u16,

    /// Requests admitted per client within one window.
    #[clap(long, env, default_value_t = 60)]
    pub rate_limit_max_requests: u32,

    #[clap(long, env, default_value_t = 60)]
    pub rate_limit_window_secs: u64,

    /// How often expired rate limit windows are dropped.
    #[clap(long, env, default_value_t = 300)]
    pub rate_limit_sweep_secs: u64,

    #[clap(flatten)]
    pub rpc: RpcConfig,

    #[clap(flatten)]
    pub log: LogConfig,
}

impl AppConfig {
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn rate_limit_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_secs.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        http_timeout(&self.rpc)
    }
}
