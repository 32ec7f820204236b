// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use nomercy_community::config::Config;
use nomercy_community::db::MemoryDb;
use nomercy_community::models::{NewUser, User, UserRole};
use nomercy_community::routes::create_router;
use nomercy_community::services::IdentityVerifier;
use nomercy_community::AppState;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const TEST_KID: &str = "test-kid";

const TEST_PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/test_id_token_private.pem");
const TEST_PUBLIC_KEY: &[u8] = include_bytes!("../fixtures/test_id_token_public.pem");

/// Create a test app backed by a fresh store and a static-key verifier.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let decoding_key =
        DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY).expect("Failed to parse test public key");
    let identity_verifier = IdentityVerifier::new_with_static_key(&config, TEST_KID, decoding_key)
        .expect("Failed to build test verifier");

    let state = Arc::new(AppState {
        config,
        db: MemoryDb::new(),
        identity_verifier: Arc::new(identity_verifier),
    });

    (create_router(state.clone()), state)
}

#[derive(Serialize)]
struct TestClaims<'a> {
    iss: String,
    aud: &'a str,
    sub: &'a str,
    iat: u64,
    exp: u64,
    email: Option<&'a str>,
    email_verified: bool,
}

/// Mint an ID token the way the identity provider would.
#[allow(dead_code)]
pub fn create_test_id_token(config: &Config, subject: &str, email: Option<&str>) -> String {
    create_test_id_token_for_audience(config, &config.firebase_project_id, subject, email)
}

#[allow(dead_code)]
pub fn create_test_id_token_for_audience(
    config: &Config,
    audience: &str,
    subject: &str,
    email: Option<&str>,
) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let claims = TestClaims {
        iss: config.token_issuer(),
        aud: audience,
        sub: subject,
        iat: now,
        exp: now + 3600,
        email,
        email_verified: true,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());

    encode(
        &header,
        &claims,
        &EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY).expect("Failed to parse test private key"),
    )
    .unwrap()
}

/// Insert a user straight into the store.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, username: &str, role: UserRole) -> User {
    state
        .db
        .create_user(NewUser {
            external_auth_id: format!("uid-{username}"),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            full_name: format!("{username} Player"),
            role: Some(role),
            games_played: None,
            wins: None,
            rank_points: None,
        })
        .await
        .expect("Failed to seed user")
}

/// Build a JSON request.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
