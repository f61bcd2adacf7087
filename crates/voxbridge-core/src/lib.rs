//! Shared foundation for the Voxbridge voice-agent bridge.
//!
//! Voxbridge sits between a real-time voice session (speech pipeline managed
//! by an external framework) and a remote chat-completion provider, with
//! transcript persistence to a backend store. This crate holds the pieces
//! every other crate needs: the [`types::Turn`] model, the
//! [`error::BridgeError`] taxonomy, the [`clock::Clock`] abstraction, and the
//! process [`config::Config`].

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use error::{BridgeError, Result};
pub use types::{ConversationConfig, PersistedMessage, Role, ToneParameters, Turn};
