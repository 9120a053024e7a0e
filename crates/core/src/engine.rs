//! The protocol engine: reads line-delimited JSON-RPC from an input
//! channel, dispatches, and writes one complete response line per request.
//!
//! Processing is strictly serialized: while an upstream call is
//! outstanding the engine does not begin the next input line, so responses
//! leave in arrival order and the rate window sees calls one at a time.
//! Diagnostics go to `tracing` (stderr in the binaries), never to the
//! protocol stream.

use crate::jsonrpc::{self, Request, RpcError};
use crate::ratelimit::RateLimiter;
use crate::registry::Registry;
use crate::upstream::{Adapter, UpstreamClient, UpstreamError, UpstreamOutcome};
use crate::validate;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _, BufReader};
use tracing::{debug, info, warn};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Static identity reported by the handshake.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// One gateway instance: catalog + limiter + upstream adapter behind the
/// stdio protocol.
pub struct Engine<C> {
    info: ServerInfo,
    registry: Registry,
    limiter: RateLimiter,
    adapter: Adapter<C>,
}

impl<C: UpstreamClient> Engine<C> {
    #[must_use]
    pub fn new(
        info: ServerInfo,
        registry: Registry,
        limiter: RateLimiter,
        adapter: Adapter<C>,
    ) -> Self {
        Self {
            info,
            registry,
            limiter,
            adapter,
        }
    }

    /// Process the input channel to EOF.
    ///
    /// Blank lines are framing noise and skipped; every other line yields
    /// exactly one newline-terminated response. Per-call failures never
    /// abort the loop.
    ///
    /// # Errors
    ///
    /// Returns an error only when the input or output channel itself
    /// fails.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response = self.handle_line(&line).await;
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok(())
    }

    /// Handle one framed input line, producing the response line (without
    /// the trailing newline).
    pub async fn handle_line(&self, line: &str) -> String {
        if line.len() > jsonrpc::MAX_LINE_BYTES {
            warn!(bytes = line.len(), "rejecting oversized request line");
            return jsonrpc::failure(
                &Value::Null,
                &RpcError::invalid_request("request too large"),
            );
        }

        let request = match jsonrpc::parse_line(line) {
            Ok(request) => request,
            Err((id, error)) => {
                warn!(code = error.code, "rejecting malformed request");
                return jsonrpc::failure(&id, &error);
            }
        };

        let id = request.id.clone();
        match self.dispatch(&request).await {
            Ok(result) => jsonrpc::success(&id, &result),
            Err(error) => jsonrpc::failure(&id, &error),
        }
    }

    async fn dispatch(&self, request: &Request) -> Result<Value, RpcError> {
        debug!(method = %request.method, "dispatch");
        match request.method.as_str() {
            "initialize" => Ok(self.initialize_result()),
            // The peer's post-handshake acknowledgement; nothing to do,
            // but under the one-response-per-line contract it is still
            // answered.
            "notifications/initialized" => Ok(json!({})),
            "tools/list" => Ok(self.registry.catalog_json()),
            "tools/call" => self.call_tool(request.params.as_ref()).await,
            _ => Err(RpcError::method_not_found()),
        }
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.info.name,
                "version": self.info.version,
            },
        })
    }

    async fn call_tool(&self, params: Option<&Value>) -> Result<Value, RpcError> {
        let Some(params) = params else {
            return Err(RpcError::invalid_params("missing params"));
        };
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("missing tool name"))?;
        if name.is_empty() || name.len() > jsonrpc::MAX_METHOD_LEN {
            return Err(RpcError::invalid_params("invalid tool name"));
        }

        let call = validate::validate(&self.registry, name, params.get("arguments"))
            .map_err(|e| RpcError::invalid_params(e.to_string()))?;

        if !self.limiter.admit() {
            warn!(tool = %call.tool, "rate limit exceeded");
            return Err(RpcError::rate_limited());
        }

        match self.adapter.invoke(&call).await {
            Ok(UpstreamOutcome::Success { status, body }) => {
                debug!(tool = %call.tool, status, "upstream success");
                Ok(body)
            }
            Ok(UpstreamOutcome::Failed { status, error }) => {
                warn!(tool = %call.tool, status, "upstream returned error status");
                Err(RpcError::upstream(format!("upstream status {status}")).with_data(error))
            }
            Err(UpstreamError::Domain(message)) => Err(RpcError::invalid_params(message)),
            Err(err @ UpstreamError::Mapping(_)) => {
                // Catalog/client mismatch is a defect in this gateway, not
                // a caller problem; keep the detail off the wire.
                tracing::error!(tool = %call.tool, error = %err, "tool mapping defect");
                Err(RpcError::internal())
            }
            Err(UpstreamError::Timeout) => Err(RpcError::upstream("upstream request timed out")),
            Err(UpstreamError::Transport(message)) => {
                warn!(tool = %call.tool, error = %message, "upstream transport failure");
                Err(RpcError::upstream(format!(
                    "upstream transport error: {message}"
                )))
            }
        }
    }
}

/// Run an engine over the process stdio channels until EOF or a
/// termination signal.
///
/// On a signal the engine stops accepting input and returns success; an
/// in-flight upstream call is not drained — process exit is allowed to
/// race it.
///
/// # Errors
///
/// Returns an error only for stdio channel failures.
pub async fn serve_stdio<C: UpstreamClient>(engine: &Engine<C>) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = engine.run(stdin, stdout) => {
            info!("input channel closed");
            result.map_err(Into::into)
        }
        () = shutdown_signal() => {
            info!("termination signal received, shutting down");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
