//! Chat-completion provider client.
//!
//! Two pieces: [`TokenCache`] owns the OAuth access token and refreshes it
//! when stale, and [`ChatClient`] maps a turn history plus a system
//! directive into one completion call. The [`CompletionProvider`] trait is
//! the seam the conversation adapter talks to.

use async_trait::async_trait;

use voxbridge_core::{Result, Turn};

pub mod chat;
pub mod token;

pub use chat::ChatClient;
pub use token::TokenCache;

/// Completion seam: turn history + directive in, one assistant turn out.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, history: &[Turn], directive: &str) -> Result<Turn>;
}

/// Single request timeout applied to every outbound call; no retries are
/// performed anywhere in the bridge.
pub(crate) const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
