//! OAuth access-token cache with proactive refresh.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use voxbridge_core::clock::Clock;
use voxbridge_core::config::ProviderConfig;
use voxbridge_core::{BridgeError, Result};

/// Tokens within this margin of expiry are refreshed before use.
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 300;

/// TTL applied when the exchange response omits `expires_at`.
const DEFAULT_TTL_SECS: i64 = 1800;

/// Upper bound on a reported TTL. The field is untrusted wire input; values
/// past this would overflow the expiry math anyway.
const MAX_TTL_SECS: i64 = 86_400;

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
}

/// Caches one access token for the process lifetime and exchanges the static
/// authorization key for a fresh one when the cache is empty or stale.
///
/// Duplicate refreshes under concurrent callers are tolerated (last write
/// wins); a redundant exchange has no side effect beyond the wasted call.
pub struct TokenCache {
    oauth_url: String,
    authorization_key: String,
    scope: String,
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("oauth_url", &self.oauth_url)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// True while the token is outside the refresh safety margin.
fn still_fresh(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now < expires_at - Duration::seconds(EXPIRY_SAFETY_MARGIN_SECS)
}

impl TokenCache {
    pub fn new(
        oauth_url: impl Into<String>,
        authorization_key: impl Into<String>,
        scope: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Ok(Self {
            oauth_url: oauth_url.into(),
            authorization_key: authorization_key.into(),
            scope: scope.into(),
            client: reqwest::Client::builder()
                .timeout(crate::REQUEST_TIMEOUT)
                .build()?,
            clock,
            cached: Mutex::new(None),
        })
    }

    /// Build from process configuration; the authorization key is required.
    pub fn from_config(provider: &ProviderConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let key = provider.resolve_authorization_key().ok_or_else(|| {
            BridgeError::Configuration("provider authorization key is not configured".into())
        })?;
        Self::new(provider.oauth_url.clone(), key, provider.scope.clone(), clock)
    }

    /// Return a token valid beyond the safety margin, exchanging the
    /// authorization key for a new one if needed. A failed exchange leaves
    /// any previously cached token untouched so the next call can retry.
    pub async fn fetch(&self) -> Result<String> {
        let now = self.clock.now();
        if let Some(token) = self.cached.lock().await.as_ref() {
            if still_fresh(token.expires_at, now) {
                return Ok(token.value.clone());
            }
        }

        let rq_uid = Uuid::new_v4().to_string();
        debug!(rq_uid = %rq_uid, "Exchanging authorization key for access token");

        let response = self
            .client
            .post(&self.oauth_url)
            .header("Authorization", format!("Bearer {}", self.authorization_key))
            .header("RqUID", &rq_uid)
            .form(&[("scope", self.scope.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Auth { status, body });
        }

        let body: TokenResponse = response.json().await?;
        // The exchange reports a TTL in seconds; the clock anchors it.
        // Clamped because the value is untrusted wire input.
        let ttl = body
            .expires_at
            .unwrap_or(DEFAULT_TTL_SECS)
            .clamp(0, MAX_TTL_SECS);
        let token = AccessToken {
            value: body.access_token,
            expires_at: self.clock.now() + Duration::seconds(ttl),
        };

        let value = token.value.clone();
        *self.cached.lock().await = Some(token);
        Ok(value)
    }
}
