//! Process configuration, read once at startup.
//!
//! Every recognised environment variable doubles as a long CLI flag so the
//! service can be started from a `.env` file, the shell environment, or the
//! command line. Missing values fall back to built-in defaults.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::http::HeaderValue;
use clap::Parser;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_INDEXER_URL: &str = "http://localhost:8080/v1/graphql";
pub const DEFAULT_APP_URL: &str = "staging.themetadao.org";
pub const DEFAULT_ACTION_VERSION: &str = "2.1.3";
/// CAIP-2 identifier of Solana mainnet-beta.
pub const DEFAULT_BLOCKCHAIN_ID: &str = "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp";
pub const DEFAULT_INDEXER_TIMEOUT_SECS: u64 = 10;

/// Raw command line / environment arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "proposal-blink-server",
    version,
    about = "Serves action metadata that links governance proposals to their trading page."
)]
pub struct Args {
    /// Port the HTTP server listens on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// GraphQL endpoint of the proposal indexer.
    #[arg(long, env = "NEXT_PUBLIC_INDEXER_URL")]
    pub indexer_url: Option<String>,

    /// Alternate name for the indexer endpoint, used when `--indexer-url` is unset.
    #[arg(long, env = "GRAPHQL_URL")]
    pub graphql_url: Option<String>,

    /// Public base URL of this service, used in action links.
    #[arg(long, env = "DEPLOYMENT_URL")]
    pub deployment_url: Option<String>,

    /// Host of the trading web app that links resolve to.
    #[arg(long, env = "APP_URL", default_value = DEFAULT_APP_URL)]
    pub app_url: String,

    /// Attach `X-Action-Version` and `X-Blockchain-Ids` to every response.
    #[arg(long)]
    pub action_headers: bool,

    /// Value of the `X-Action-Version` header.
    #[arg(long, default_value = DEFAULT_ACTION_VERSION)]
    pub action_version: String,

    /// Value of the `X-Blockchain-Ids` header.
    #[arg(long, default_value = DEFAULT_BLOCKCHAIN_ID)]
    pub blockchain_id: String,

    /// Upper bound on a single indexer query, in seconds.
    #[arg(long, default_value_t = DEFAULT_INDEXER_TIMEOUT_SECS)]
    pub indexer_timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} is not a valid header value")]
    InvalidHeaderValue { name: &'static str, value: String },

    #[error("indexer timeout must be greater than zero")]
    ZeroTimeout,
}

/// Header values emitted by the action-protocol middleware.
#[derive(Debug, Clone)]
pub struct ActionHeaderValues {
    pub action_version: HeaderValue,
    pub blockchain_ids: HeaderValue,
}

/// Immutable, resolved service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub indexer_url: String,
    /// Base URL of this service without a trailing slash.
    pub base_url: String,
    /// Bare host of the trading web app.
    pub app_host: String,
    pub action_headers: Option<ActionHeaderValues>,
    pub indexer_timeout: Duration,
}

impl ServiceConfig {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        if args.indexer_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let indexer_url = args
            .indexer_url
            .filter(|url| !url.trim().is_empty())
            .or(args.graphql_url.filter(|url| !url.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_INDEXER_URL.to_string());

        let base_url = args
            .deployment_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{}", args.port));

        let action_headers = if args.action_headers {
            Some(ActionHeaderValues {
                action_version: header_value("--action-version", &args.action_version)?,
                blockchain_ids: header_value("--blockchain-id", &args.blockchain_id)?,
            })
        } else {
            None
        };

        Ok(Self {
            port: args.port,
            indexer_url,
            base_url,
            app_host: normalize_host(&args.app_url),
            action_headers,
            indexer_timeout: Duration::from_secs(args.indexer_timeout_secs),
        })
    }

    /// Parses CLI arguments and the environment, after loading `.env` if present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_args(Args::parse())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeaderValue {
        name,
        value: value.to_string(),
    })
}

/// Reduces `https://example.org/` style values to `example.org`.
fn normalize_host(app_url: &str) -> String {
    let trimmed = app_url.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let host = without_scheme.trim_end_matches('/');
    if host.is_empty() {
        DEFAULT_APP_URL.to_string()
    } else {
        host.to_string()
    }
}
