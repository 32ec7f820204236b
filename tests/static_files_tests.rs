// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health check, fallback and PWA asset tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use nomercy_community::config::Config;
use std::fs;
use std::path::PathBuf;
use tower::ServiceExt;

mod common;

/// Write a tiny front-end build into a fresh temp directory.
fn static_fixture(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "nomercy-static-{}-{}",
        name,
        std::process::id()
    ));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("index.html"), "<!doctype html><title>NoMercy</title>").unwrap();
    fs::write(dir.join("manifest.json"), r#"{"name": "NoMercy"}"#).unwrap();
    fs::write(dir.join("sw.js"), "self.addEventListener('install', () => {});").unwrap();
    dir
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    let body = common::body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(body["users"], 0);
}

#[tokio::test]
async fn test_unknown_api_route_is_json_404() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_missing_front_end() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Application not found");
}

#[tokio::test]
async fn test_client_routes_fall_back_to_index() {
    let config = Config {
        static_dir: static_fixture("spa"),
        ..Config::test_default()
    };
    let (app, _) = common::create_test_app_with_config(config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(std::str::from_utf8(&bytes).unwrap().contains("NoMercy"));
}

#[tokio::test]
async fn test_pwa_assets_served_with_types() {
    let config = Config {
        static_dir: static_fixture("pwa"),
        ..Config::test_default()
    };
    let (app, _) = common::create_test_app_with_config(config);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/manifest.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/manifest+json"
    );

    let response = app
        .oneshot(Request::builder().uri("/sw.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("Service-Worker-Allowed").unwrap(), "/");
}
