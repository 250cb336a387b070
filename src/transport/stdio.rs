//! Line-delimited stdio transport
//!
//! One JSON-RPC request per stdin line, one response per stdout line.
//! Requests run concurrently; a single writer task owns stdout so response
//! lines never interleave.

use std::sync::{Arc, Once};

use serde_json::{json, Map};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::{GatewayError, McpError, Result};
use crate::mcp::types::{JsonRpcResponse, RequestId};
use crate::transport::{decode_request, enriched_error, RequestHandler, RequestMeta, TransportAdapter};

/// Adapter for the stdio host
#[derive(Debug, Default)]
pub struct StdioAdapter;

impl TransportAdapter for StdioAdapter {
    fn name(&self) -> &'static str {
        "stdio"
    }

    fn format_error(&self, id: RequestId, error: &GatewayError, debug: bool) -> JsonRpcResponse {
        let mut fields = Map::new();
        fields.insert("transport".into(), json!("stdio"));
        enriched_error(id, error, debug, fields)
    }
}

/// Keep a serialized message on one line
pub fn sanitize_line(line: &str) -> String {
    line.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            tracing::error!(panic = %info, "panic in request task");
        }));
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }
}

/// Serve requests from stdin until EOF or a shutdown signal
pub async fn run_stdio(handler: Arc<dyn RequestHandler>, debug: bool) -> Result<()> {
    serve_lines(
        handler,
        tokio::io::stdin(),
        tokio::io::stdout(),
        shutdown_signal(),
        debug,
    )
    .await
}

/// Serve requests from `reader`, writing responses to `writer`.
///
/// Returns once `reader` hits EOF or `shutdown` completes, after every
/// in-flight request has been answered.
pub async fn serve_lines<R, W, S>(
    handler: Arc<dyn RequestHandler>,
    reader: R,
    writer: W,
    shutdown: S,
    debug: bool,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    S: std::future::Future<Output = ()>,
{
    install_panic_hook();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    });

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut in_flight = JoinSet::new();
    tokio::pin!(shutdown);

    tracing::info!("stdio transport ready");

    // Raw bytes, so a line that is not UTF-8 still gets a parse error reply.
    // A cancelled read keeps its partial line in `buf`.
    loop {
        tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => match read {
                Ok(0) => {
                    tracing::info!("stdin closed");
                    break;
                }
                Ok(_) => {
                    let line = std::mem::take(&mut buf);
                    in_flight.spawn(process_line(handler.clone(), line, tx.clone(), debug));
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to read stdin");
                    break;
                }
            },
            _ = &mut shutdown => break,
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "stdio task failed");
                }
            }
        }
    }

    if !in_flight.is_empty() {
        tracing::info!(pending = in_flight.len(), "waiting for in-flight requests");
    }
    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "stdio task failed");
        }
    }

    drop(tx);
    writer_task.await.map_err(|e| McpError::Transport {
        message: format!("stdout writer failed: {}", e),
    })??;
    Ok(())
}

async fn process_line(
    handler: Arc<dyn RequestHandler>,
    line: Vec<u8>,
    tx: mpsc::UnboundedSender<String>,
    debug: bool,
) {
    if line.iter().all(u8::is_ascii_whitespace) {
        return;
    }

    let response = match decode_request(&line) {
        Err((id, error)) => {
            tracing::warn!(error = %error, "rejected stdin line");
            Some(StdioAdapter.format_error(id, &error, debug))
        }
        Ok(request) => {
            let id = request.id.clone();
            let task = tokio::spawn(async move { handler.handle(request, RequestMeta::default()).await });
            match task.await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, "request handler panicked");
                    let error: GatewayError = McpError::Transport {
                        message: "request handler panicked".into(),
                    }
                    .into();
                    id.map(|id| StdioAdapter.format_error(id, &error, debug))
                }
            }
        }
    };

    let Some(response) = response else {
        return;
    };
    match serde_json::to_string(&response) {
        Ok(text) => {
            if tx.send(sanitize_line(&text)).is_err() {
                tracing::warn!("stdout writer closed; dropping response");
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to serialize response"),
    }
}
