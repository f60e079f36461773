use std::collections::HashMap;
use std::str::FromStr;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Placeholder some deployment templates leave in unset URL variables.
const URL_PLACEHOLDER: &str = "%";
const REDACTED: &str = "[REDACTED]";
const SECRET_QUERY_KEYS: [&str; 4] = ["api-key", "apikey", "api_key", "dkey"];
const SECRET_PATH_SEGMENT_LEN: usize = 20;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Network {
    #[default]
    Devnet,
    Testnet,
    Mainnet,
}

impl Network {
    /// Lenient parse used for configuration values: anything that is not a
    /// known network name, including an empty string, means devnet.
    pub fn normalize(value: &str) -> Self {
        Network::from_str(value.trim()).unwrap_or_default()
    }

    fn env_suffix(&self) -> &'static str {
        match self {
            Network::Devnet => "DEVNET",
            Network::Testnet => "TESTNET",
            Network::Mainnet => "MAINNET",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EndpointRole {
    Primary,
    Fallback,
}

impl EndpointRole {
    pub fn env_key(&self, network: Network) -> String {
        match self {
            EndpointRole::Primary => {
                format!("SOLANA_RPC_URL_{}", network.env_suffix())
            }
            EndpointRole::Fallback => {
                format!("SOLANA_FALLBACK_URL_{}", network.env_suffix())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EndpointSource {
    Configured,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub url: String,
    pub source: EndpointSource,
}

/// Public endpoints used when nothing usable is configured.
pub fn default_endpoint(network: Network, role: EndpointRole) -> &'static str {
    match (network, role) {
        (Network::Devnet, EndpointRole::Primary) => {
            "https://api.devnet.solana.com"
        }
        (Network::Devnet, EndpointRole::Fallback) => {
            "https://explorer-api.devnet.solana.com"
        }
        (Network::Testnet, EndpointRole::Primary) => {
            "https://api.testnet.solana.com"
        }
        (Network::Testnet, EndpointRole::Fallback) => {
            "https://explorer-api.testnet.solana.com"
        }
        (Network::Mainnet, EndpointRole::Primary) => {
            "https://solana-mainnet-rpc.publicnode.com"
        }
        (Network::Mainnet, EndpointRole::Fallback) => {
            "https://solana-mainnet.g.alchemy.com/v2/demo"
        }
    }
}

fn is_usable_url(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && url != URL_PLACEHOLDER && url.starts_with("http")
}

#[derive(Debug, Clone, Default)]
pub struct EndpointResolver {
    configured: HashMap<(Network, EndpointRole), String>,
}

impl EndpointResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(
        mut self,
        network: Network,
        role: EndpointRole,
        url: Option<String>,
    ) -> Self {
        if let Some(url) = url {
            self.configured.insert((network, role), url);
        }
        self
    }

    pub fn is_configured(&self, network: Network, role: EndpointRole) -> bool {
        self.resolve(network, role).source == EndpointSource::Configured
    }

    pub fn resolve(
        &self,
        network: Network,
        role: EndpointRole,
    ) -> ResolvedEndpoint {
        match self.configured.get(&(network, role)) {
            Some(url) if is_usable_url(url) => ResolvedEndpoint {
                url: url.trim().to_string(),
                source: EndpointSource::Configured,
            },
            _ => ResolvedEndpoint {
                url: default_endpoint(network, role).to_string(),
                source: EndpointSource::Default,
            },
        }
    }
}

/// Hides API keys embedded in an endpoint URL so it can be logged.
pub fn sanitize_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return REDACTED.to_string();
    };

    let segments = parsed.path_segments().map(|segments| {
        segments
            .map(|segment| {
                let looks_like_key = segment.len() >= SECRET_PATH_SEGMENT_LEN
                    && segment.chars().all(|c| c.is_ascii_alphanumeric());
                if looks_like_key {
                    REDACTED.to_string()
                } else {
                    segment.to_string()
                }
            })
            .collect::<Vec<_>>()
    });
    if let Some(segments) = segments {
        parsed.set_path(&segments.join("/"));
    }

    if parsed.query().is_some() {
        let pairs = parsed
            .query_pairs()
            .map(|(key, value)| {
                let is_secret = SECRET_QUERY_KEYS
                    .iter()
                    .any(|secret| key.eq_ignore_ascii_case(secret));
                if is_secret {
                    (key.into_owned(), REDACTED.to_string())
                } else {
                    (key.into_owned(), value.into_owned())
                }
            })
            .collect::<Vec<_>>();
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }

    // The query serializer percent-encodes the brackets.
    parsed
        .to_string()
        .replace("%5BREDACTED%5D", REDACTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_network_names_mean_devnet() {
        assert_eq!(Network::normalize(""), Network::Devnet);
        assert_eq!(Network::normalize("localnet"), Network::Devnet);
        assert_eq!(Network::normalize(" Mainnet "), Network::Mainnet);
        assert_eq!(Network::normalize("TESTNET"), Network::Testnet);
    }

    #[test]
    fn network_displays_lowercase() {
        assert_eq!(Network::Mainnet.to_string(), "mainnet");
    }

    #[test]
    fn configured_endpoint_wins() {
        let resolver = EndpointResolver::new().with_endpoint(
            Network::Mainnet,
            EndpointRole::Primary,
            Some("https://rpc.example.com/".to_string()),
        );

        let resolved = resolver.resolve(Network::Mainnet, EndpointRole::Primary);
        assert_eq!(resolved.url, "https://rpc.example.com/");
        assert_eq!(resolved.source, EndpointSource::Configured);
    }

    #[test]
    fn invalid_configured_endpoints_fall_back_to_defaults() {
        for bad in ["", "%", "ws://rpc.example.com", "   "] {
            let resolver = EndpointResolver::new().with_endpoint(
                Network::Devnet,
                EndpointRole::Fallback,
                Some(bad.to_string()),
            );

            let resolved =
                resolver.resolve(Network::Devnet, EndpointRole::Fallback);
            assert_eq!(resolved.url, "https://explorer-api.devnet.solana.com");
            assert_eq!(resolved.source, EndpointSource::Default);
        }
    }

    #[test]
    fn roles_are_resolved_independently() {
        let resolver = EndpointResolver::new().with_endpoint(
            Network::Testnet,
            EndpointRole::Primary,
            Some("https://primary.example.com".to_string()),
        );

        assert!(resolver.is_configured(Network::Testnet, EndpointRole::Primary));
        assert!(
            !resolver.is_configured(Network::Testnet, EndpointRole::Fallback)
        );
        assert_eq!(
            resolver.resolve(Network::Testnet, EndpointRole::Fallback).url,
            "https://explorer-api.testnet.solana.com"
        );
    }

    #[test]
    fn env_keys_follow_network() {
        assert_eq!(
            EndpointRole::Primary.env_key(Network::Mainnet),
            "SOLANA_RPC_URL_MAINNET"
        );
        assert_eq!(
            EndpointRole::Fallback.env_key(Network::Devnet),
            "SOLANA_FALLBACK_URL_DEVNET"
        );
    }

    #[test]
    fn sanitize_hides_query_keys() {
        let sanitized =
            sanitize_url("https://rpc.example.com/?api-key=abc123&cluster=1");

        assert!(!sanitized.contains("abc123"));
        assert!(sanitized.contains("api-key=[REDACTED]"));
        assert!(sanitized.contains("cluster=1"));
    }

    #[test]
    fn sanitize_hides_path_keys() {
        let sanitized = sanitize_url(
            "https://solana-mainnet.g.alchemy.com/v2/AbCdEfGhIjKlMnOpQrStUvWx",
        );

        assert_eq!(
            sanitized,
            "https://solana-mainnet.g.alchemy.com/v2/[REDACTED]"
        );
    }

    #[test]
    fn sanitize_keeps_public_urls() {
        assert_eq!(
            sanitize_url("https://api.devnet.solana.com/"),
            "https://api.devnet.solana.com/"
        );
    }
}
