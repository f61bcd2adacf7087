//! Process configuration: endpoints, credentials, and speech selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level Voxbridge configuration, loaded from a JSON5 file with
/// `${ENV_VAR}` substitution. Every secret can alternatively be referenced
/// through a `*_env` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<SpeechConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Chat-completion provider configuration (OAuth exchange + completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Authorization endpoint for the credential exchange.
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,

    /// Completion API base URL.
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_key_env: Option<String>,

    /// OAuth scope sent in the exchange body.
    #[serde(default = "default_scope")]
    pub scope: String,

    #[serde(default = "default_model")]
    pub model: String,
}

fn default_oauth_url() -> String {
    "https://ngw.devices.sberbank.ru:9443/api/v2/oauth".into()
}

fn default_provider_base_url() -> String {
    "https://gigachat.devices.sberbank.ru/api/v1".into()
}

fn default_scope() -> String {
    "GIGACHAT_API_PERS".into()
}

fn default_model() -> String {
    "GigaChat".into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            oauth_url: default_oauth_url(),
            base_url: default_provider_base_url(),
            authorization_key: None,
            authorization_key_env: Some("PROVIDER_AUTHORIZATION_KEY".into()),
            scope: default_scope(),
            model: default_model(),
        }
    }
}

impl ProviderConfig {
    pub fn resolve_authorization_key(&self) -> Option<String> {
        resolve_secret_field(&self.authorization_key, &self.authorization_key_env)
    }
}

/// Backend store configuration (transcripts + per-conversation config).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_token_env: Option<String>,
}

fn default_backend_base_url() -> String {
    "http://localhost:3000".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
            service_token: None,
            service_token_env: Some("AGENT_SERVICE_TOKEN".into()),
        }
    }
}

impl BackendConfig {
    pub fn resolve_service_token(&self) -> Option<String> {
        resolve_secret_field(&self.service_token, &self.service_token_env)
    }
}

/// Speech provider selection handed to the voice framework. A configuration
/// contract, not runtime introspection: the bridge never touches audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub stt: SttProvider,
    #[serde(default)]
    pub tts: TtsProvider,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".into()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt: SttProvider::default(),
            tts: TtsProvider::default(),
            voice: None,
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SttProvider {
    #[default]
    Openai,
    WhisperLocal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtsProvider {
    #[default]
    Openai,
    Silero,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "voxbridge_provider=debug").
    #[serde(default)]
    pub filters: Vec<String>,
}

fn default_log_format() -> String {
    "plain".into()
}

/// Resolve a secret: check the direct value first, then the env-var reference.
pub fn resolve_secret_field(direct: &Option<String>, env_var: &Option<String>) -> Option<String> {
    if let Some(val) = direct {
        if !val.is_empty() {
            return Some(val.clone());
        }
    }
    if let Some(env) = env_var {
        if let Ok(val) = std::env::var(env) {
            if !val.is_empty() {
                return Some(val);
            }
        }
    }
    None
}

/// Substitute `${ENV_VAR}` patterns in a string with their environment
/// variable values.
fn substitute_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .into_owned()
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::BridgeError::Io)?;
        let substituted = substitute_env_vars(&raw);

        let config: Config = json5::from_str(&substituted)
            .map_err(|e| crate::error::BridgeError::Configuration(e.to_string()))?;

        Ok(config)
    }

    /// Default config file location: `./voxbridge.json5`.
    pub fn default_path() -> PathBuf {
        PathBuf::from("voxbridge.json5")
    }

    pub fn provider(&self) -> ProviderConfig {
        self.provider.clone().unwrap_or_default()
    }

    pub fn backend(&self) -> BackendConfig {
        self.backend.clone().unwrap_or_default()
    }

    pub fn speech(&self) -> SpeechConfig {
        self.speech.clone().unwrap_or_default()
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        let provider = self.provider();
        if provider.resolve_authorization_key().is_none() {
            warnings.push("Provider has no authorization key configured".to_string());
        }
        if provider.oauth_url.is_empty() {
            errors.push("Provider oauth_url cannot be empty".to_string());
        }
        if provider.base_url.is_empty() {
            errors.push("Provider base_url cannot be empty".to_string());
        }

        let backend = self.backend();
        if backend.base_url.is_empty() {
            errors.push("Backend base_url cannot be empty".to_string());
        }
        if backend.resolve_service_token().is_none() {
            warnings.push("Backend has no service token configured".to_string());
        }

        (warnings, errors)
    }
}
