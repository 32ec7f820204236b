// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security and PWA asset headers middleware.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Add security headers to all responses.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}

/// Browsers only install the app and register the service worker when these
/// two assets carry the right types.
pub async fn add_pwa_asset_headers(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    match path.as_str() {
        "/manifest.json" => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/manifest+json"),
            );
        }
        "/sw.js" => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/javascript"),
            );
            headers.insert("Service-Worker-Allowed", HeaderValue::from_static("/"));
        }
        _ => {}
    }

    response
}
