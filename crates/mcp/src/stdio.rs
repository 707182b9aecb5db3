//! Stdio transport: newline-delimited JSON-RPC on stdin/stdout.

use {
    tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    tracing::{debug, info, warn},
};

use crate::{Result, server::McpServer};

/// Serve the process's stdin/stdout until stdin closes.
pub async fn serve_stdio(server: &McpServer) -> Result<()> {
    info!(server = %server.name(), "MCP server listening on stdio");
    serve_lines(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Read frames from `reader` and write one response line per request to `writer`.
pub async fn serve_lines<R, W>(server: &McpServer, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("stdin closed");
                break;
            },
            Ok(_) => {
                let Some(mut reply) = server.handle_line(&line).await else {
                    continue;
                };
                reply.push('\n');
                writer.write_all(reply.as_bytes()).await?;
                writer.flush().await?;
            },
            Err(e) => {
                warn!(error = %e, "error reading MCP input");
                return Err(e.into());
            },
        }
    }
    info!("MCP stdio session ended");
    Ok(())
}
