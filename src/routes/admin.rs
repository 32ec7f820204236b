// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin-only routes. `require_admin` is applied in routes/mod.rs.

use crate::error::{AppError, Result};
use crate::middleware::auth::AdminUser;
use crate::models::{User, UserRole, UserUpdate};
use crate::routes::extract::{ValidatedJson, ValidatedPath};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}/role", patch(set_user_role))
}

/// Every registered member, in registration order.
async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(AdminUser(admin)): Extension<AdminUser>,
) -> Json<Vec<User>> {
    let users = state.db.list_users().await;
    tracing::debug!(admin_id = admin.id, count = users.len(), "Listing users");
    Json(users)
}

#[derive(Deserialize, Validate)]
struct RoleUpdate {
    role: UserRole,
}

/// Promote or demote a user.
async fn set_user_role(
    State(state): State<Arc<AppState>>,
    Extension(AdminUser(admin)): Extension<AdminUser>,
    ValidatedPath(id): ValidatedPath<u64>,
    ValidatedJson(body): ValidatedJson<RoleUpdate>,
) -> Result<Json<User>> {
    if admin.id == id && body.role != UserRole::Admin {
        return Err(AppError::BadRequest(
            "Admins cannot demote themselves".to_string(),
        ));
    }

    let update = UserUpdate {
        role: Some(body.role),
        ..Default::default()
    };

    let user = state
        .db
        .update_user(id, update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

    tracing::info!(
        admin_id = admin.id,
        user_id = user.id,
        role = ?user.role,
        "User role changed"
    );
    Ok(Json(user))
}
