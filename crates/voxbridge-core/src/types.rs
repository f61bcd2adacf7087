//! Conversation turn model and per-conversation configuration.

use serde::{Deserialize, Serialize};

/// Speaker role for a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One utterance in the conversation. Immutable once created; an ordered
/// `Vec<Turn>` forms the history for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    #[serde(rename = "content")]
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, text: text.into() }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, text: text.into() }
    }
}

/// Named persona knobs loaded alongside the directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneParameters {
    #[serde(default = "default_personality")]
    pub personality: String,
    #[serde(default = "default_empathy_level")]
    pub empathy_level: u8,
}

fn default_personality() -> String {
    "rational".into()
}

fn default_empathy_level() -> u8 {
    5
}

impl Default for ToneParameters {
    fn default() -> Self {
        Self {
            personality: default_personality(),
            empathy_level: default_empathy_level(),
        }
    }
}

/// Built-in directive used when the backend cannot supply one. The session
/// must still start with a degraded but functional persona.
pub const DEFAULT_DIRECTIVE: &str =
    "You are an experienced specialist. Hold a professional, courteous \
     conversation with the caller and be demanding about the details.";

/// Per-conversation configuration, loaded once at session start and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    pub directive: String,
    pub persona_label: String,
    #[serde(default)]
    pub tone: ToneParameters,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            directive: DEFAULT_DIRECTIVE.into(),
            persona_label: "Assistant".into(),
            tone: ToneParameters::default(),
        }
    }
}

/// Wire body for a transcript write. Identity and storage belong to the
/// backend store; this side only ever writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedMessage {
    pub role: Role,
    pub content: String,
    pub metadata: serde_json::Value,
}

impl PersistedMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            metadata: serde_json::json!({ "source": "voice-bridge" }),
        }
    }
}
