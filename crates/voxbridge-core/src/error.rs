use thiserror::Error;

/// Error taxonomy for the bridge.
///
/// Only `Configuration` halts the controller before session start. `Auth`
/// and `Provider` are fatal for the turn that produced them; `ConfigLoad`
/// is recovered with built-in defaults. Transcript-persistence failures are
/// logged inside the sink and never surface here.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Config load error: {0}")]
    ConfigLoad(String),

    #[error("Auth exchange failed ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("Provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
