//! Provider tests against a mock HTTP server.
//!
//! Covers the token-lifecycle rules (cache hit, proactive refresh, failed
//! exchange) and the completion request/response mapping.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voxbridge_core::clock::FixedClock;
use voxbridge_core::config::ProviderConfig;
use voxbridge_core::{BridgeError, Role, Turn};
use voxbridge_provider::{ChatClient, TokenCache};

fn provider_config(server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        oauth_url: format!("{}/oauth", server.uri()),
        base_url: server.uri(),
        authorization_key: Some("static-auth-key".into()),
        authorization_key_env: None,
        scope: "API_SCOPE".into(),
        model: "GigaChat".into(),
    }
}

async fn mount_oauth(server: &MockServer, token: &str, ttl: i64, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth"))
        .and(header("Authorization", "Bearer static-auth-key"))
        .and(header_exists("RqUID"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": token, "expires_at": ttl })),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_token_cache_hit_makes_no_second_call() {
    let server = MockServer::start().await;
    mount_oauth(&server, "tok-1", 1800, 1).await;

    let clock = Arc::new(FixedClock::new(Utc::now()));
    let cache = TokenCache::from_config(&provider_config(&server), clock).unwrap();

    assert_eq!(cache.fetch().await.unwrap(), "tok-1");
    // Inside the safety margin: served from cache, mock would panic on a
    // second request via expect(1).
    assert_eq!(cache.fetch().await.unwrap(), "tok-1");
}

#[tokio::test]
async fn test_token_refreshed_inside_safety_margin() {
    let server = MockServer::start().await;
    mount_oauth(&server, "tok", 1800, 2).await;

    let clock = Arc::new(FixedClock::new(Utc::now()));
    let cache = TokenCache::new(
        format!("{}/oauth", server.uri()),
        "static-auth-key",
        "API_SCOPE",
        clock.clone(),
    )
    .unwrap();

    cache.fetch().await.unwrap();
    // 1800s TTL - 300s margin: anything past 1500s forces a new exchange.
    clock.advance(Duration::seconds(1501));
    cache.fetch().await.unwrap();
}

#[tokio::test]
async fn test_failed_exchange_keeps_previous_token() {
    let server = MockServer::start().await;
    mount_oauth(&server, "tok-old", 1800, 1).await;

    let clock = Arc::new(FixedClock::new(Utc::now()));
    let cache = TokenCache::new(
        format!("{}/oauth", server.uri()),
        "static-auth-key",
        "API_SCOPE",
        clock.clone(),
    )
    .unwrap();

    assert_eq!(cache.fetch().await.unwrap(), "tok-old");

    // Exchange starts failing while the token goes stale.
    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/oauth"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    clock.advance(Duration::seconds(1700));
    let err = cache.fetch().await.unwrap_err();
    match err {
        BridgeError::Auth { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream down");
        }
        other => panic!("expected Auth error, got {other:?}"),
    }

    // Cache was not poisoned: once the endpoint recovers, fetch succeeds.
    server.reset().await;
    mount_oauth(&server, "tok-new", 1800, 1).await;
    assert_eq!(cache.fetch().await.unwrap(), "tok-new");
}

#[tokio::test]
async fn test_absurd_ttl_is_clamped_not_fatal() {
    let server = MockServer::start().await;
    // A conforming response with a TTL no calendar can hold.
    mount_oauth(&server, "tok-1", i64::MAX, 1).await;

    let clock = Arc::new(FixedClock::new(Utc::now()));
    let cache = TokenCache::from_config(&provider_config(&server), clock.clone()).unwrap();

    assert_eq!(cache.fetch().await.unwrap(), "tok-1");
    // The clamped expiry still honours the safety margin: a day later the
    // token is stale and a new exchange happens.
    server.reset().await;
    mount_oauth(&server, "tok-2", 1800, 1).await;
    clock.advance(Duration::seconds(86_400));
    assert_eq!(cache.fetch().await.unwrap(), "tok-2");
}

#[tokio::test]
async fn test_complete_prepends_system_directive() {
    let server = MockServer::start().await;
    mount_oauth(&server, "tok-1", 1800, 1).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hi there" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = provider_config(&server);
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let tokens = Arc::new(TokenCache::from_config(&config, clock).unwrap());
    let chat = ChatClient::new(&config, tokens).unwrap();

    let reply = chat
        .complete(&[Turn::user("Hello")], "You are concise.")
        .await
        .unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.text, "Hi there");

    let requests = server.received_requests().await.unwrap();
    let completion = requests
        .iter()
        .find(|r| r.url.path() == "/chat/completions")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&completion.body).unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "You are concise.");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "Hello");
    assert_eq!(body["temperature"], 0.7);
    assert_eq!(body["max_tokens"], 1024);
}

#[tokio::test]
async fn test_complete_empty_choices_is_provider_error() {
    let server = MockServer::start().await;
    mount_oauth(&server, "tok-1", 1800, 1).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let config = provider_config(&server);
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let tokens = Arc::new(TokenCache::from_config(&config, clock).unwrap());
    let chat = ChatClient::new(&config, tokens).unwrap();

    let err = chat.complete(&[Turn::user("Hello")], "D").await.unwrap_err();
    match err {
        BridgeError::Provider { status, body } => {
            assert_eq!(status, 0);
            assert_eq!(body, "empty candidates");
        }
        other => panic!("expected Provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_complete_surfaces_http_status_and_body() {
    let server = MockServer::start().await;
    mount_oauth(&server, "tok-1", 1800, 1).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let config = provider_config(&server);
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let tokens = Arc::new(TokenCache::from_config(&config, clock).unwrap());
    let chat = ChatClient::new(&config, tokens).unwrap();

    let err = chat.complete(&[Turn::user("Hello")], "D").await.unwrap_err();
    match err {
        BridgeError::Provider { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected Provider error, got {other:?}"),
    }
}
