//! Conversation orchestration between the voice framework and the
//! completion provider.
//!
//! The [`adapter::ConversationAdapter`] turns each user utterance into one
//! completion call plus two transcript writes; [`session::run_session`] is
//! the cooperative loop the voice framework drives through a
//! [`session::VoiceLink`].

use serde::{Deserialize, Serialize};

use voxbridge_core::BridgeError;

pub mod adapter;
pub mod directive;
pub mod session;

pub use adapter::ConversationAdapter;
pub use session::{run_session, voice_link, VoiceLink, VoiceLinkHandle};

/// Events handed back to the voice framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// An assistant turn ready for speech synthesis.
    #[serde(rename = "reply")]
    Reply { text: String },

    /// A turn that could not be completed. The framework decides whether to
    /// retry, stay silent, or terminate; the bridge does not retry.
    #[serde(rename = "turn_failed")]
    TurnFailed { kind: String, message: String },
}

/// Stable error kind strings for [`SessionEvent::TurnFailed`].
pub fn error_kind(error: &BridgeError) -> &'static str {
    match error {
        BridgeError::Auth { .. } => "auth_failure",
        BridgeError::Provider { .. } => "provider_error",
        BridgeError::Http(_) => "transport_error",
        _ => "internal_error",
    }
}
