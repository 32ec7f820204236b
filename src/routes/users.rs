// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member and activity routes used by the registration flow and dashboard.

use crate::error::{AppError, Result};
use crate::models::{
    Activity, NewActivity, NewUser, StatsUpdate, User, UserRole, UserStats,
};
use crate::routes::extract::{ValidatedJson, ValidatedPath};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/users/profile/{external_auth_id}",
            get(get_profile_by_external_id),
        )
        .route("/api/users", post(create_user))
        .route(
            "/api/users/{id}/stats",
            get(get_user_stats).patch(update_user_stats),
        )
        .route("/api/users/{id}/activities", get(get_user_activities))
        .route("/api/activities", post(create_activity))
}

// ─── Users ───────────────────────────────────────────────────

/// Look up the local profile linked to an identity-provider subject.
async fn get_profile_by_external_id(
    State(state): State<Arc<AppState>>,
    ValidatedPath(external_auth_id): ValidatedPath<String>,
) -> Result<Json<User>> {
    let user = state
        .db
        .get_user_by_external_auth_id(&external_auth_id)
        .await
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Register a member after sign-up with the identity provider.
async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(mut input): ValidatedJson<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    // Admins are promoted through the admin API only.
    if input.role == Some(UserRole::Admin) {
        tracing::warn!(
            username = %input.username,
            "Ignoring admin role requested at registration"
        );
    }
    input.role = None;

    let user = state.db.create_user(input).await?;

    tracing::info!(user_id = user.id, username = %user.username, "Member registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Overwrite stat counters after a match.
async fn update_user_stats(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<u64>,
    ValidatedJson(stats): ValidatedJson<StatsUpdate>,
) -> Result<Json<User>> {
    let user = state
        .db
        .update_user(id, stats.into())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Dashboard stats card.
async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<u64>,
) -> Result<Json<UserStats>> {
    let stats = state
        .db
        .get_user_stats(id)
        .await
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(stats))
}

// ─── Activities ──────────────────────────────────────────────

/// Activity feed for a user, newest first.
async fn get_user_activities(
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<u64>,
) -> Json<Vec<Activity>> {
    Json(state.db.list_user_activities(id).await)
}

async fn create_activity(
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<NewActivity>,
) -> Result<(StatusCode, Json<Activity>)> {
    let activity = state.db.create_activity(input).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}
