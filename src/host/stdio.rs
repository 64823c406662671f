//! Stdin/stdout JSON bridge for the host command channel.
//!
//! Reads newline-delimited JSON `CommandEnvelope` messages from stdin,
//! dispatches them through [`HostCommandHandler`], and writes
//! `ResponseEnvelope` and `EventEnvelope` messages as newline-delimited JSON
//! to stdout.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr by the embedding
//! application.

use crate::host::contract::{CommandEnvelope, EventEnvelope, PROGRESS_EVENT, ResponseEnvelope};
use crate::host::handler::HostCommandHandler;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;

/// Run the stdin/stdout JSON bridge until stdin closes.
///
/// Two concurrent tasks operate in parallel:
///
/// 1. **Reader** -- reads newline-delimited JSON from stdin, dispatches each
///    `CommandEnvelope`, and writes the resulting `ResponseEnvelope` to
///    stdout. Malformed lines produce a parse-error response and the bridge
///    continues.
/// 2. **Event forwarder** -- wraps audiobook progress events in
///    `EventEnvelope` messages and writes them as JSON lines to stdout.
///
/// # Errors
///
/// Returns an error when stdin or stdout fails.
pub async fn run_stdio_bridge(handler: HostCommandHandler) -> crate::Result<()> {
    let stdout = tokio::io::stdout();
    let writer = Arc::new(Mutex::new(BufWriter::new(stdout)));

    // Forward progress events as long as the bridge runs.
    let event_writer = Arc::clone(&writer);
    let mut progress_rx = handler.speech().subscribe_progress();
    let event_handle = tokio::spawn(async move {
        loop {
            match progress_rx.recv().await {
                Ok(event) => {
                    let payload = match serde_json::to_value(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to serialize progress event");
                            continue;
                        }
                    };
                    let envelope = EventEnvelope::new(
                        uuid::Uuid::new_v4().to_string(),
                        PROGRESS_EVENT,
                        payload,
                    );
                    let json = match serde_json::to_string(&envelope) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to serialize event envelope");
                            continue;
                        }
                    };
                    let mut w = event_writer.lock().await;
                    if let Err(e) = write_line(&mut w, &json).await {
                        tracing::warn!(
                            error = %e,
                            "failed to write event envelope to stdout; stopping event forwarder"
                        );
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event forwarder lagged; events were dropped");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    tracing::info!("progress channel closed; stopping event forwarder");
                    break;
                }
            }
        }
    });

    let reader_result = run_reader(&handler, Arc::clone(&writer)).await;

    event_handle.abort();
    let _ = event_handle.await;

    reader_result
}

/// Read stdin line-by-line, dispatch each command, and write responses.
async fn run_reader(
    handler: &HostCommandHandler,
    writer: Arc<Mutex<BufWriter<tokio::io::Stdout>>>,
) -> crate::Result<()> {
    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await.map_err(|e| {
            crate::SpeechError::Channel(format!("failed to read from stdin: {e}"))
        })?;

        // EOF
        if bytes_read == 0 {
            tracing::info!("stdin closed (EOF); shutting down stdio bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    raw_line = %trimmed,
                    "failed to parse command envelope from stdin"
                );
                let response = ResponseEnvelope::error(
                    "parse-error",
                    "INVALID_ARGUMENTS",
                    format!("failed to parse command envelope: {e}"),
                );
                write_response(&writer, &response).await?;
                continue;
            }
        };

        let response = handler.dispatch(envelope).await;
        write_response(&writer, &response).await?;
    }

    Ok(())
}

async fn write_response(
    writer: &Arc<Mutex<BufWriter<tokio::io::Stdout>>>,
    response: &ResponseEnvelope,
) -> crate::Result<()> {
    let json = serde_json::to_string(response).map_err(|e| {
        crate::SpeechError::Channel(format!("failed to serialize response envelope: {e}"))
    })?;
    let mut w = writer.lock().await;
    write_line(&mut w, &json).await
}

/// Write a single JSON line to the buffered writer and flush.
async fn write_line(writer: &mut BufWriter<tokio::io::Stdout>, json: &str) -> crate::Result<()> {
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| crate::SpeechError::Channel(format!("failed to write to stdout: {e}")))?;
    writer.write_all(b"\n").await.map_err(|e| {
        crate::SpeechError::Channel(format!("failed to write newline to stdout: {e}"))
    })?;
    writer
        .flush()
        .await
        .map_err(|e| crate::SpeechError::Channel(format!("failed to flush stdout: {e}")))?;
    Ok(())
}
