//! Completion client — one request per user turn, no streaming.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use voxbridge_core::config::ProviderConfig;
use voxbridge_core::{BridgeError, Result, Role, Turn};

use crate::token::TokenCache;
use crate::CompletionProvider;

// Fixed tuning for a conservative conversational tone; deliberately not
// caller-configurable.
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Prepend a system turn built from the directive unless the history already
/// carries one.
pub fn build_messages(history: &[Turn], directive: &str) -> Vec<Turn> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    if !history.iter().any(|t| t.role == Role::System) {
        messages.push(Turn::system(directive));
    }
    messages.extend_from_slice(history);
    messages
}

/// Stateless request/response mapper onto the provider's completion API.
pub struct ChatClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
    tokens: Arc<TokenCache>,
}

impl ChatClient {
    pub fn new(provider: &ProviderConfig, tokens: Arc<TokenCache>) -> Result<Self> {
        Ok(Self {
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            model: provider.model.clone(),
            client: reqwest::Client::builder()
                .timeout(crate::REQUEST_TIMEOUT)
                .build()?,
            tokens,
        })
    }

    pub async fn complete(&self, history: &[Turn], directive: &str) -> Result<Turn> {
        let token = self.tokens.fetch().await?;
        let messages = build_messages(history, directive);

        debug!(model = %self.model, turns = messages.len(), "Requesting completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {token}"))
            .json(&ChatRequest {
                model: &self.model,
                messages: &messages,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Provider { status, body });
        }

        let body: ChatResponse = response.json().await?;
        let Some(first) = body.choices.into_iter().next() else {
            return Err(BridgeError::Provider {
                status: 0,
                body: "empty candidates".into(),
            });
        };

        Ok(Turn::assistant(first.message.content))
    }
}

#[async_trait]
impl CompletionProvider for ChatClient {
    async fn complete(&self, history: &[Turn], directive: &str) -> Result<Turn> {
        ChatClient::complete(self, history, directive).await
    }
}
