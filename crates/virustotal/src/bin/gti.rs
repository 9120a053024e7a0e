//! Google Threat Intelligence entry point. Same catalog and wire shapes
//! as the VirusTotal binary; only the credential variable differs.

use intelgate_core::telemetry;
use intelgate_virustotal::serve;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    serve::run("gti-hunting-mcp-server", "GTI_APIKEY").await
}
