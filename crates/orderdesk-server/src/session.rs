use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use orderdesk_core::SessionId;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Per-session limits taken from the server configuration.
#[derive(Clone, Copy, Debug)]
pub struct SessionSettings {
    pub max_message_size: usize,
    pub idle_timeout: Option<Duration>,
}

/// Bounded pool of echo-session slots.
///
/// Only counts live sessions. No message data passes through it.
#[derive(Clone)]
pub struct SessionSlots {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl SessionSlots {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Claim a slot, or `None` when every slot is taken.
    pub fn try_claim(&self) -> Option<SessionSlot> {
        Arc::clone(&self.permits)
            .try_acquire_owned()
            .ok()
            .map(|permit| SessionSlot { _permit: permit })
    }

    /// Number of sessions currently holding a slot.
    pub fn active(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A claimed session slot. Returned to the pool on drop.
pub struct SessionSlot {
    _permit: OwnedSemaphorePermit,
}

/// Why an echo session left the `Open` state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// Peer sent a close frame.
    PeerClosed,
    /// Inbound stream ended without a close frame.
    StreamEnded,
    ReadFailed(String),
    WriteFailed(String),
    /// An echo could not be written within the idle timeout.
    WriteStalled,
    IdleTimeout,
}

impl CloseReason {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ReadFailed(_) | Self::WriteFailed(_) | Self::WriteStalled)
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerClosed => f.write_str("peer closed"),
            Self::StreamEnded => f.write_str("stream ended"),
            Self::ReadFailed(e) => write!(f, "read failed: {e}"),
            Self::WriteFailed(e) => write!(f, "write failed: {e}"),
            Self::WriteStalled => f.write_str("write stalled"),
            Self::IdleTimeout => f.write_str("idle timeout"),
        }
    }
}

/// Result of one session's echo loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EchoOutcome {
    pub reason: CloseReason,
    pub echoed: u64,
}

/// Echo every data frame from `inbound` back through `outbound`, unchanged.
///
/// Frames are handled strictly one at a time: the echo of a frame is fully
/// written before the next one is read. Ping and pong frames are answered by
/// the protocol layer and are not echoed.
///
/// `idle_timeout` bounds both the wait for the next frame and the write of
/// each echo.
pub async fn echo_frames<S, R, E>(
    outbound: &mut S,
    inbound: &mut R,
    idle_timeout: Option<Duration>,
) -> EchoOutcome
where
    S: Sink<WsMessage> + Unpin,
    S::Error: fmt::Display,
    R: Stream<Item = Result<WsMessage, E>> + Unpin,
    E: fmt::Display,
{
    let mut echoed = 0;
    let reason = loop {
        let next = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, inbound.next()).await {
                Ok(next) => next,
                Err(_) => break CloseReason::IdleTimeout,
            },
            None => inbound.next().await,
        };

        let frame = match next {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => break CloseReason::ReadFailed(e.to_string()),
            None => break CloseReason::StreamEnded,
        };

        let reply = match frame {
            WsMessage::Text(ref text) => {
                tracing::debug!(kind = "text", len = text.len(), "echoing frame");
                frame
            }
            WsMessage::Binary(ref bytes) => {
                tracing::debug!(kind = "binary", len = bytes.len(), "echoing frame");
                frame
            }
            WsMessage::Close(_) => break CloseReason::PeerClosed,
            WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
        };

        let sent = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, outbound.send(reply)).await {
                Ok(sent) => sent,
                Err(_) => break CloseReason::WriteStalled,
            },
            None => outbound.send(reply).await,
        };
        if let Err(e) = sent {
            break CloseReason::WriteFailed(e.to_string());
        }
        echoed += 1;
    };

    EchoOutcome { reason, echoed }
}

/// Run one echo session until it closes.
///
/// The socket and the slot are owned by this call and released on every
/// return path.
pub async fn run_session(socket: WebSocket, settings: SessionSettings, slot: SessionSlot) {
    let session_id = SessionId::new();
    tracing::info!(session_id = %session_id, "echo session open");

    let (mut outbound, mut inbound) = socket.split();
    let outcome = echo_frames(&mut outbound, &mut inbound, settings.idle_timeout).await;

    if !matches!(
        outcome.reason,
        CloseReason::WriteFailed(_) | CloseReason::WriteStalled
    ) {
        // Best effort; the peer may already be gone.
        let _ = outbound.close().await;
    }
    drop(slot);

    if outcome.reason.is_error() {
        tracing::warn!(
            session_id = %session_id,
            echoed = outcome.echoed,
            reason = %outcome.reason,
            "echo session closed with error"
        );
    } else {
        tracing::info!(
            session_id = %session_id,
            echoed = outcome.echoed,
            reason = %outcome.reason,
            "echo session closed"
        );
    }
}
