//! Stdio transport: newline-delimited JSON-RPC over stdin/stdout.
//!
//! Stdout carries protocol messages only; logging goes to stderr.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::protocol::ProtocolHandler;
use crate::types::{JsonRpcMessage, McpError, McpResult, RequestId};

const OUTBOUND_CAPACITY: usize = 64;

/// Serves one MCP client over the process's standard streams.
pub struct StdioTransport {
    handler: Arc<ProtocolHandler>,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Serve until stdin closes.
    pub async fn run(&self) -> McpResult<()> {
        tracing::info!("Starting Zep Cloud MCP server (stdio)");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve `input` and write responses to `output`.
    ///
    /// Tool calls run on their own tasks so a cancellation notification read
    /// while a call is in flight can still reach it. Everything else is
    /// handled in arrival order. A single writer task owns `output`, so
    /// responses are never interleaved mid-line.
    pub async fn serve<R, W>(&self, input: R, output: W) -> McpResult<()>
    where
        R: tokio::io::AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Value>(OUTBOUND_CAPACITY);
        let writer = tokio::spawn(write_responses(rx, output));

        let mut lines = BufReader::new(input).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let msg = match JsonRpcMessage::parse(line) {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("Discarding unparsable message: {e}");
                    let error = e.to_json_rpc_error(RequestId::Null);
                    let _ = tx.send(serde_json::to_value(error)?).await;
                    continue;
                }
            };

            if msg.method() == Some("tools/call") {
                let handler = self.handler.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(response) = handler.handle_message(msg).await {
                        let _ = tx.send(response).await;
                    }
                });
            } else if let Some(response) = self.handler.handle_message(msg).await {
                let _ = tx.send(response).await;
            }
        }

        tracing::info!("stdin closed, draining in-flight responses");
        drop(tx);
        writer
            .await
            .map_err(|e| McpError::Transport(format!("writer task failed: {e}")))?
    }
}

async fn write_responses<W>(mut rx: mpsc::Receiver<Value>, mut output: W) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        output.write_all(line.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}
