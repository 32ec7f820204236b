// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ID token authentication middleware.

use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Cookie the front-end stores the ID token in.
pub const SESSION_COOKIE: &str = "__session";

/// Caller identity extracted from a verified ID token.
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub external_auth_id: String,
}

/// Local user record of an authenticated administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// Middleware that requires a valid ID token.
pub async fn require_identity(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authenticate(&state, &jar, request.headers()).await?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Middleware that requires a valid ID token belonging to an admin user.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authenticate(&state, &jar, request.headers()).await?;

    let user = state
        .db
        .get_user_by_external_auth_id(&identity.external_auth_id)
        .await
        .ok_or_else(|| {
            tracing::warn!(
                subject = %identity.external_auth_id,
                "Blocked admin request from unregistered identity"
            );
            AppError::Forbidden("admin access required".to_string())
        })?;

    if !user.is_admin() {
        tracing::warn!(
            user_id = user.id,
            username = %user.username,
            "Blocked admin request from non-admin user"
        );
        return Err(AppError::Forbidden("admin access required".to_string()));
    }

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(AdminUser(user));

    Ok(next.run(request).await)
}

async fn authenticate(
    state: &AppState,
    jar: &CookieJar,
    headers: &HeaderMap,
) -> Result<AuthIdentity, AppError> {
    // Try cookie first, then header
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => bearer_token(headers)
            .ok_or(AppError::Unauthorized)?
            .to_string(),
    };

    let verified = state.identity_verifier.verify_id_token(&token).await?;

    Ok(AuthIdentity {
        external_auth_id: verified.external_auth_id,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }
}
