use shared::block::Slot;
use shared::log_config::LogConfig;
use shared::rpc::RpcConfig;

#[derive(clap::Parser)]
#[command(name = "explorer", about = "Query a Solana cluster the way the explorer does")]
pub struct AppConfig {
    #[command(subcommand)]
    pub command: Command,

    /// Go through an explorer webserver's `/api/solana` proxy instead of
    /// talking to the node directly.
    #[clap(long, env = "EXPLORER_PROXY_URL")]
    pub proxy_url: Option<String>,

    #[clap(flatten)]
    pub rpc: RpcConfig,

    #[clap(flatten)]
    pub log: LogConfig,
}

#[derive(clap::Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Most recent blocks, newest first.
    Blocks {
        #[clap(long, default_value_t = 10)]
        limit: usize,
    },
    Block { slot: Slot },
    Transactions { slot: Slot },
    Transaction { signature: String },
    Leader { slot: Slot },
    Children { slot: Slot },
    Status,
    Network,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_subcommands() {
        let config =
            AppConfig::try_parse_from(["explorer", "block", "95"]).unwrap();
        assert_eq!(config.command, Command::Block { slot: 95 });
        assert_eq!(config.proxy_url, None);

        let config = AppConfig::try_parse_from([
            "explorer",
            "--proxy-url",
            "http://localhost:5000/api/solana",
            "blocks",
            "--limit",
            "3",
        ])
        .unwrap();
        assert_eq!(config.command, Command::Blocks { limit: 3 });
        assert_eq!(
            config.proxy_url.as_deref(),
            Some("http://localhost:5000/api/solana")
        );
    }

    #[test]
    fn slot_must_be_a_number() {
        assert!(AppConfig::try_parse_from(["explorer", "block", "tip"]).is_err());
    }
}
