// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the signed-in member.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthIdentity;
use crate::models::{ProfileUpdate, User};
use crate::routes::extract::ValidatedJson;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use std::sync::Arc;

/// API routes (require a verified ID token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me).patch(update_me))
}

// ─── User Profile ────────────────────────────────────────────

/// Get the caller's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
) -> Result<Json<User>> {
    let user = state
        .db
        .get_user_by_external_auth_id(&identity.external_auth_id)
        .await
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No profile registered for {}",
                identity.external_auth_id
            ))
        })?;

    Ok(Json(user))
}

/// Edit the caller's username, email or display name.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
    ValidatedJson(profile): ValidatedJson<ProfileUpdate>,
) -> Result<Json<User>> {
    let user = state
        .db
        .get_user_by_external_auth_id(&identity.external_auth_id)
        .await
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No profile registered for {}",
                identity.external_auth_id
            ))
        })?;

    tracing::debug!(
        user_id = user.id,
        username = ?profile.username,
        email = ?profile.email,
        "Updating profile"
    );

    let updated = state
        .db
        .update_user(user.id, profile.into())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;

    Ok(Json(updated))
}
