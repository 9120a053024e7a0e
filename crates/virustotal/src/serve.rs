//! Shared bootstrap for the VirusTotal-family binaries.

use crate::catalog;
use crate::client::{DEFAULT_BASE_URL, VirusTotalClient};
use clap::Parser;
use intelgate_core::engine::{Engine, ServerInfo, serve_stdio};
use intelgate_core::ratelimit::RateLimiter;
use intelgate_core::upstream::Adapter;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about = "VirusTotal tool-invocation gateway over stdio")]
pub struct Opts {
    /// Upstream API base URL.
    #[arg(long, env = "VT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Upstream request timeout, seconds.
    #[arg(long, env = "VT_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Calls admitted per rate window.
    #[arg(long, env = "VT_RATE_LIMIT", default_value_t = 60)]
    pub rate_limit: u32,

    /// Rate window length, seconds.
    #[arg(long, env = "VT_RATE_WINDOW_SECS", default_value_t = 60)]
    pub rate_window_secs: u64,
}

/// Start one gateway over stdio. The API key is read from `key_var`;
/// a missing or malformed key aborts startup before any input is read.
///
/// # Errors
///
/// Returns startup failures (credential, catalog, client construction)
/// and stdio channel failures.
pub async fn run(server_name: &str, key_var: &str) -> anyhow::Result<()> {
    let opts = Opts::parse();
    let api_key = intelgate_core::env::required(key_var)?;
    let client = VirusTotalClient::new(&opts.base_url, &api_key)?;
    let registry = catalog::registry()?;

    let engine = Engine::new(
        ServerInfo {
            name: server_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        registry,
        RateLimiter::new(opts.rate_limit, Duration::from_secs(opts.rate_window_secs)),
        Adapter::new(client, Duration::from_secs(opts.timeout_secs)),
    );

    info!(server = server_name, "gateway listening on stdio");
    serve_stdio(&engine).await
}
