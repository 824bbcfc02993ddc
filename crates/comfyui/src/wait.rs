//! Bounded completion wait over the engine's event channel.
//!
//! Reads frames from a ComfyUI WebSocket until the defined completion
//! signal arrives: an `executing` event whose `node` field is `null`.
//! Non-JSON frames, unknown message types, and binary preview frames
//! are transport noise and are silently discarded.
//!
//! The upstream protocol has no terminal-event guarantee -- an engine
//! that never emits the completion signal would stall the reader
//! forever, so the whole wait runs under an explicit timeout that
//! surfaces as [`WaitError::Timeout`], distinct from engine rejection.

use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::messages::{parse_message, ComfyUIMessage};

/// Errors from the completion wait.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    /// The completion signal did not arrive within the bound.
    #[error("timed out after {0:?} waiting for the engine to finish")]
    Timeout(Duration),

    /// The WebSocket closed or failed before the completion signal.
    #[error("event channel closed before completion: {0}")]
    ChannelClosed(String),

    /// The engine reported an execution error for this prompt.
    #[error("execution failed on node {node_id}: {message}")]
    Execution { node_id: String, message: String },
}

/// Block on the event stream until `prompt_id` completes.
///
/// Completion is `executing { node: null }`; frames carrying a
/// different `prompt_id` are ignored, frames without one are assumed
/// to belong to this subscription (the connection is per-request).
/// An `execution_error` for this prompt short-circuits with
/// [`WaitError::Execution`].
pub async fn await_completion<S>(
    stream: &mut S,
    prompt_id: &str,
    timeout: Duration,
) -> Result<(), WaitError>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    tokio::time::timeout(timeout, read_until_complete(stream, prompt_id))
        .await
        .map_err(|_| WaitError::Timeout(timeout))?
}

async fn read_until_complete<S>(stream: &mut S, prompt_id: &str) -> Result<(), WaitError>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if handle_text_frame(&text, prompt_id)? {
                    return Ok(());
                }
            }
            Ok(Message::Binary(_)) => {
                // Binary frames carry preview images; not our concern.
                tracing::trace!("Ignoring binary preview frame");
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // Handled automatically by tungstenite.
            }
            Ok(Message::Close(frame)) => {
                return Err(WaitError::ChannelClosed(format!(
                    "close frame received: {frame:?}"
                )));
            }
            Ok(Message::Frame(_)) => {}
            Err(e) => {
                return Err(WaitError::ChannelClosed(e.to_string()));
            }
        }
    }
    Err(WaitError::ChannelClosed("stream exhausted".to_string()))
}

/// Process one text frame. Returns `Ok(true)` on the completion signal.
fn handle_text_frame(text: &str, prompt_id: &str) -> Result<bool, WaitError> {
    let msg = match parse_message(text) {
        Ok(msg) => msg,
        Err(_) => {
            // Empty lines, non-JSON progress chatter, unknown types.
            tracing::trace!(raw = %text, "Discarding unparseable frame");
            return Ok(false);
        }
    };

    match msg {
        ComfyUIMessage::Executing(data) => {
            let ours = data.prompt_id.as_deref().map_or(true, |id| id == prompt_id);
            if !ours {
                return Ok(false);
            }
            match data.node {
                Some(node) => {
                    tracing::debug!(prompt_id, node = %node, "Executing node");
                    Ok(false)
                }
                None => {
                    tracing::debug!(prompt_id, "Execution completed (all nodes done)");
                    Ok(true)
                }
            }
        }
        ComfyUIMessage::ExecutionError(data) if data.prompt_id == prompt_id => {
            Err(WaitError::Execution {
                node_id: data.node_id,
                message: data.exception_message,
            })
        }
        ComfyUIMessage::Progress(data) => {
            tracing::trace!(value = data.value, max = data.max, "Generation progress");
            Ok(false)
        }
        _ => Ok(false),
    }
}
