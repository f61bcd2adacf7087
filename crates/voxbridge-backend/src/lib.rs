//! Backend store client.
//!
//! Write-only transcript persistence ([`TranscriptSink`]) and the
//! per-conversation configuration fetch ([`SessionConfigLoader`]). Both talk
//! to the same REST surface; neither is allowed to take the live
//! conversation down.

pub mod session_config;
pub mod transcript;

pub use session_config::SessionConfigLoader;
pub use transcript::TranscriptSink;

pub(crate) const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
