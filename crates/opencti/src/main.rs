use clap::Parser;
use intelgate_core::engine::{Engine, ServerInfo, serve_stdio};
use intelgate_core::ratelimit::RateLimiter;
use intelgate_core::upstream::Adapter;
use intelgate_core::{env, telemetry};
use intelgate_opencti::catalog;
use intelgate_opencti::client::{DEFAULT_BASE_URL, OpenCtiClient};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about = "OpenCTI tool-invocation gateway over stdio")]
struct Opts {
    /// OpenCTI platform base URL.
    #[arg(long, env = "OPENCTI_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Upstream request timeout, seconds.
    #[arg(long, env = "OPENCTI_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Calls admitted per rate window.
    #[arg(long, env = "OPENCTI_RATE_LIMIT", default_value_t = 60)]
    rate_limit: u32,

    /// Rate window length, seconds.
    #[arg(long, env = "OPENCTI_RATE_WINDOW_SECS", default_value_t = 60)]
    rate_window_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let opts = Opts::parse();

    let token = env::required("OPENCTI_TOKEN")?;
    let client = OpenCtiClient::new(&opts.base_url, &token)?;

    let engine = Engine::new(
        ServerInfo {
            name: "opencti-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        catalog::registry()?,
        RateLimiter::new(opts.rate_limit, Duration::from_secs(opts.rate_window_secs)),
        Adapter::new(client, Duration::from_secs(opts.timeout_secs)),
    );

    info!(server = "opencti-server", "gateway listening on stdio");
    serve_stdio(&engine).await
}
