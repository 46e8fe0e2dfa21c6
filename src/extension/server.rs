//! Line-delimited JSON transport over stdio.
//!
//! Each input line is one activity. Each answered activity produces one
//! `{replyToId, status, body}` line; ignored activities produce nothing.
//! Activities run concurrently, and a single writer task serializes output.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::error::ExtensionError;
use crate::extension::handlers::{QueryDispatcher, QueryOutcome};
use crate::extension::protocol::{Activity, ReplyLine};

/// Status returned to the client for a failed activity.
pub fn status_for_error(err: &ExtensionError) -> u16 {
    match err {
        ExtensionError::MalformedRequest(_) => 400,
        _ => 500,
    }
}

/// Run the service loop over the process's stdin/stdout.
pub async fn run_server(dispatcher: QueryDispatcher) -> Result<(), ExtensionError> {
    info!("Extension query server ready, waiting for activities on stdin");
    serve_lines(dispatcher, tokio::io::stdin(), tokio::io::stdout()).await?;
    info!("stdin closed, shutting down");
    Ok(())
}

/// Upper bound on activities being dispatched at the same time.
pub const MAX_IN_FLIGHT: usize = 64;

/// Encoded replies waiting for the writer task.
const REPLY_QUEUE_CAPACITY: usize = 256;

/// Serve activities read line by line from `reader`, writing replies to `writer`.
/// Returns once the reader hits EOF and every in-flight activity has been answered.
/// Reading stops early if the writer fails; its error is returned.
pub async fn serve_lines<R, W>(dispatcher: QueryDispatcher, reader: R, mut writer: W) -> Result<(), ExtensionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<String>(REPLY_QUEUE_CAPACITY);

    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            debug!(response = %line, "Outgoing reply");
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    });

    let slots = Arc::new(Semaphore::new(MAX_IN_FLIGHT));
    let mut lines = BufReader::new(reader).lines();
    let mut in_flight = JoinSet::new();
    let mut writer_open = true;

    while writer_open {
        let next = tokio::select! {
            line = lines.next_line() => line?,
            _ = tx.closed() => {
                writer_open = false;
                break;
            }
        };
        let Some(line) = next else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        debug!(request = %line, "Incoming activity");

        let activity: Activity = match serde_json::from_str(line) {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, "Failed to parse activity");
                let reply = ReplyLine::error(None, 400, format!("Parse error: {}", e));
                if let Some(text) = encode_reply(&reply) {
                    writer_open = tx.send(text).await.is_ok();
                }
                continue;
            }
        };

        let permit = slots.clone().acquire_owned().await.map_err(std::io::Error::other)?;
        let dispatcher = dispatcher.clone();
        let tx = tx.clone();
        in_flight.spawn(async move {
            let _permit = permit;
            match answer_activity(&dispatcher, activity).await {
                Some(text) => tx.send(text).await.is_ok(),
                None => true,
            }
        });

        while let Some(done) = in_flight.try_join_next() {
            writer_open &= reply_delivered(done);
        }
    }

    if !writer_open {
        warn!("Reply writer stopped, no longer reading activities");
    }

    while let Some(done) = in_flight.join_next().await {
        reply_delivered(done);
    }

    drop(tx);
    writer_task.await.map_err(std::io::Error::other)??;
    Ok(())
}

/// `false` when the task's reply could not be queued because the writer is gone.
fn reply_delivered(done: Result<bool, JoinError>) -> bool {
    match done {
        Ok(delivered) => delivered,
        Err(e) => {
            error!(error = %e, "Activity task failed");
            true
        }
    }
}

/// Dispatch one activity and encode the reply line. `None` means nothing is sent back.
pub async fn answer_activity(dispatcher: &QueryDispatcher, activity: Activity) -> Option<String> {
    let reply_to_id = activity.id.clone();
    match dispatcher.handle_query(&activity).await {
        Ok(QueryOutcome::Ignore) => None,
        Ok(QueryOutcome::Respond(response)) => encode_reply(&ReplyLine {
            reply_to_id,
            status: response.status,
            body: response.body,
        }),
        Err(e) => encode_reply(&ReplyLine::error(reply_to_id, status_for_error(&e), e.to_string())),
    }
}

fn encode_reply<B: serde::Serialize>(reply: &ReplyLine<B>) -> Option<String> {
    match serde_json::to_string(reply) {
        Ok(text) => Some(text),
        Err(e) => {
            error!(error = %e, "Failed to encode reply");
            None
        }
    }
}
