use intelgate_core::telemetry;
use intelgate_virustotal::serve;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    serve::run("virustotal-mcp-server", "VIRUSTOTAL_API_KEY").await
}
