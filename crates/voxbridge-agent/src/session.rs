//! Voice-framework boundary — user turns in, synthesis events out.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{error_kind, ConversationAdapter, SessionEvent};

/// The bridge's side of the voice framework boundary: the framework delivers
/// transcribed user turns and consumes [`SessionEvent`]s for synthesis.
/// Disconnect is signalled through the cancellation token.
pub struct VoiceLink {
    pub user_rx: mpsc::UnboundedReceiver<String>,
    pub event_tx: mpsc::UnboundedSender<SessionEvent>,
    pub cancel: CancellationToken,
}

/// The framework's side of the boundary.
pub struct VoiceLinkHandle {
    pub user_tx: mpsc::UnboundedSender<String>,
    pub event_rx: mpsc::UnboundedReceiver<SessionEvent>,
    pub cancel: CancellationToken,
}

/// Create a connected link/handle pair.
pub fn voice_link() -> (VoiceLink, VoiceLinkHandle) {
    let (user_tx, user_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    (
        VoiceLink {
            user_rx,
            event_tx,
            cancel: cancel.clone(),
        },
        VoiceLinkHandle {
            user_tx,
            event_rx,
            cancel,
        },
    )
}

/// Cooperative session loop.
///
/// Turns are processed strictly in arrival order; the next turn waits until
/// the prior reply is produced or fails. A completion failure becomes a
/// [`SessionEvent::TurnFailed`] and the loop keeps running. Cancellation
/// drops any in-flight call without signalling the remote side; a detached
/// transcript write may still land afterwards.
pub async fn run_session(mut adapter: ConversationAdapter, mut link: VoiceLink) {
    info!(conversation_id = %adapter.conversation_id(), "Conversation session started");

    loop {
        tokio::select! {
            _ = link.cancel.cancelled() => break,
            maybe_turn = link.user_rx.recv() => {
                let Some(text) = maybe_turn else { break };
                // The turn itself races cancellation too, so a disconnect
                // mid-completion drops the in-flight call.
                tokio::select! {
                    _ = link.cancel.cancelled() => break,
                    result = adapter.handle_user_turn(&text) => match result {
                        Ok(reply) => {
                            let _ = link.event_tx.send(SessionEvent::Reply { text: reply.text });
                        }
                        Err(e) => {
                            warn!(error = %e, "Turn processing failed");
                            let _ = link.event_tx.send(SessionEvent::TurnFailed {
                                kind: error_kind(&e).into(),
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    info!(conversation_id = %adapter.conversation_id(), "Conversation session ended");
}
