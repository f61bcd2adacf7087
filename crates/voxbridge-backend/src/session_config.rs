//! Per-conversation configuration fetch with agent-scoped-first routing.

use serde::Deserialize;
use tracing::debug;

use voxbridge_core::config::BackendConfig;
use voxbridge_core::types::DEFAULT_DIRECTIVE;
use voxbridge_core::{BridgeError, ConversationConfig, Result, ToneParameters};

#[derive(Debug, Default, Deserialize)]
struct ConversationRecord {
    #[serde(default)]
    agent: Option<AgentRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentRecord {
    #[serde(default)]
    directive: Option<String>,
    #[serde(default)]
    prompt_template: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    personality_type: Option<String>,
    #[serde(default)]
    empathy_level: Option<u8>,
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}

fn extract(record: ConversationRecord) -> ConversationConfig {
    let agent = record.agent.unwrap_or_default();
    let defaults = ToneParameters::default();
    ConversationConfig {
        // Each field is checked for emptiness on its own, so a blank
        // directive does not shadow a populated template.
        directive: non_empty(agent.directive)
            .or_else(|| non_empty(agent.prompt_template))
            .unwrap_or_else(|| DEFAULT_DIRECTIVE.into()),
        persona_label: agent.name.unwrap_or_else(|| "Assistant".into()),
        tone: ToneParameters {
            personality: agent.personality_type.unwrap_or(defaults.personality),
            empathy_level: agent.empathy_level.unwrap_or(defaults.empathy_level),
        },
    }
}

/// Fetches the persona configuration for one conversation. Tries the
/// agent-scoped endpoint, falling back to the generic conversation record
/// on 404. Any other failure surfaces as [`BridgeError::ConfigLoad`]; the
/// caller substitutes defaults and keeps going.
pub struct SessionConfigLoader {
    base_url: String,
    service_token: Option<String>,
    client: reqwest::Client,
}

impl SessionConfigLoader {
    pub fn new(backend: &BackendConfig) -> Result<Self> {
        Ok(Self {
            base_url: backend.base_url.trim_end_matches('/').to_string(),
            service_token: backend.resolve_service_token(),
            client: reqwest::Client::builder()
                .timeout(crate::REQUEST_TIMEOUT)
                .build()?,
        })
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(token) = &self.service_token {
            request = request.header("x-service-token", token);
        }
        request
    }

    pub async fn load(&self, conversation_id: &str) -> Result<ConversationConfig> {
        let agent_url = format!("{}/conversations/{}/agent", self.base_url, conversation_id);
        let response = self
            .get(agent_url)
            .send()
            .await
            .map_err(|e| BridgeError::ConfigLoad(e.to_string()))?;

        let response = if response.status().as_u16() == 404 {
            debug!(conversation_id, "Agent-scoped config missing, trying conversation record");
            self.get(format!("{}/conversations/{}", self.base_url, conversation_id))
                .send()
                .await
                .map_err(|e| BridgeError::ConfigLoad(e.to_string()))?
        } else {
            response
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::ConfigLoad(format!(
                "config endpoint returned {status}: {body}"
            )));
        }

        let record: ConversationRecord = response
            .json()
            .await
            .map_err(|e| BridgeError::ConfigLoad(e.to_string()))?;
        Ok(extract(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_prefers_directive_over_template() {
        let record: ConversationRecord = serde_json::from_str(
            r#"{"agent": {"directive": "Use the directive.", "prompt_template": "Not me."}}"#,
        )
        .unwrap();
        let config = extract(record);
        assert_eq!(config.directive, "Use the directive.");
    }

    #[test]
    fn test_extract_falls_back_to_prompt_template() {
        let record: ConversationRecord = serde_json::from_str(
            r#"{"agent": {"prompt_template": "Template text.", "personality_type": "warm", "empathy_level": 8}}"#,
        )
        .unwrap();
        let config = extract(record);
        assert_eq!(config.directive, "Template text.");
        assert_eq!(config.tone.personality, "warm");
        assert_eq!(config.tone.empathy_level, 8);
    }

    #[test]
    fn test_extract_blank_directive_does_not_shadow_template() {
        let record: ConversationRecord = serde_json::from_str(
            r#"{"agent": {"directive": "", "prompt_template": "Template text."}}"#,
        )
        .unwrap();
        let config = extract(record);
        assert_eq!(config.directive, "Template text.");
    }

    #[test]
    fn test_extract_empty_record_uses_defaults() {
        let config = extract(ConversationRecord::default());
        assert_eq!(config.directive, DEFAULT_DIRECTIVE);
        assert_eq!(config.persona_label, "Assistant");
        assert_eq!(config.tone.personality, "rational");
    }
}
