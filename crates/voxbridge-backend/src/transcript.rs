//! Best-effort transcript persistence.

use std::sync::Arc;

use tracing::warn;

use voxbridge_core::config::BackendConfig;
use voxbridge_core::{PersistedMessage, Result, Role};

/// Fire-and-forget writer for conversation turns.
///
/// A transcript-persistence failure must never abort or alter the live
/// conversation: every failure path here logs a warning and returns
/// normally. No retries, no queueing; deduplication is the backend's job.
pub struct TranscriptSink {
    base_url: String,
    conversation_id: String,
    service_token: Option<String>,
    client: reqwest::Client,
}

impl TranscriptSink {
    pub fn new(backend: &BackendConfig, conversation_id: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: backend.base_url.trim_end_matches('/').to_string(),
            conversation_id: conversation_id.into(),
            service_token: backend.resolve_service_token(),
            client: reqwest::Client::builder()
                .timeout(crate::REQUEST_TIMEOUT)
                .build()?,
        })
    }

    /// Attempt one write. Never raises.
    pub async fn record(&self, role: Role, text: &str) {
        let url = format!(
            "{}/conversations/{}/messages",
            self.base_url, self.conversation_id
        );

        let mut request = self
            .client
            .post(&url)
            .json(&PersistedMessage::new(role, text));
        if let Some(token) = &self.service_token {
            request = request.header("x-service-token", token);
        }

        match request.send().await {
            Ok(response) if matches!(response.status().as_u16(), 200 | 201) => {}
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!(%status, body, role = %role, "Transcript write rejected");
            }
            Err(e) => {
                warn!(error = %e, role = %role, "Transcript write failed");
            }
        }
    }

    /// Spawn the write as a detached task. No caller awaits completion and
    /// no error propagates; the task may outlive the turn that started it.
    pub fn record_detached(self: &Arc<Self>, role: Role, text: String) {
        let sink = Arc::clone(self);
        tokio::spawn(async move {
            sink.record(role, &text).await;
        });
    }
}
