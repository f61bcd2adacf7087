//! Per-conversation turn processing.

use std::sync::Arc;

use tracing::{debug, info};

use voxbridge_backend::TranscriptSink;
use voxbridge_core::{Result, Role, Turn};
use voxbridge_provider::CompletionProvider;

/// Orchestrates one conversation: persist the user turn, produce a reply,
/// persist it, hand it back for synthesis.
///
/// `&mut self` on [`handle_user_turn`](Self::handle_user_turn) is the
/// non-reentrancy guarantee: a new turn cannot start until the prior turn's
/// reply production has finished or failed, because the history mutation is
/// not safe to interleave. One adapter per conversation; history is held in
/// process memory only and never restored across restarts.
pub struct ConversationAdapter {
    conversation_id: String,
    directive: String,
    history: Vec<Turn>,
    completions: Arc<dyn CompletionProvider>,
    sink: Arc<TranscriptSink>,
}

impl ConversationAdapter {
    pub fn new(
        conversation_id: impl Into<String>,
        directive: impl Into<String>,
        completions: Arc<dyn CompletionProvider>,
        sink: Arc<TranscriptSink>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            directive: directive.into(),
            history: Vec::new(),
            completions,
            sink,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Append-only turn history for this conversation.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Process one user turn and return the assistant reply.
    ///
    /// On a completion failure the error surfaces to the caller unchanged
    /// (no retry here); the user turn stays in history so the next attempt
    /// sees the full conversation.
    pub async fn handle_user_turn(&mut self, text: &str) -> Result<Turn> {
        debug!(
            conversation_id = %self.conversation_id,
            turns = self.history.len(),
            "Processing user turn"
        );

        self.history.push(Turn::user(text));
        self.sink.record_detached(Role::User, text.to_string());

        let reply = self
            .completions
            .complete(&self.history, &self.directive)
            .await?;

        self.history.push(reply.clone());
        self.sink.record_detached(Role::Assistant, reply.text.clone());

        info!(
            conversation_id = %self.conversation_id,
            reply_chars = reply.text.len(),
            "Produced assistant reply"
        );
        Ok(reply)
    }
}
