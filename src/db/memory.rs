// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles, unique email/username/external identity)
//! - Activities (per-user feed, newest first)
//!
//! Every table and index sits behind a single lock, so a uniqueness check and
//! the write it guards happen in one critical section.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use validator::Validate;

use crate::db::{StoreError, UniqueField};
use crate::models::{Activity, NewActivity, NewUser, User, UserStats, UserUpdate};

/// Shared handle to the in-memory store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    /// Keyed by ID; IDs only grow, so iteration order is insertion order.
    users: BTreeMap<u64, User>,
    activities: BTreeMap<u64, Activity>,
    user_id_by_email: HashMap<String, u64>,
    user_id_by_username: HashMap<String, u64>,
    user_id_by_external_auth_id: HashMap<String, u64>,
    activity_ids_by_user: HashMap<u64, Vec<u64>>,
    last_user_id: u64,
    last_activity_id: u64,
}

impl Tables {
    /// First unique field already held by another user, checked in the order
    /// email, username, external identity.
    fn find_conflict(
        &self,
        email: Option<&str>,
        username: Option<&str>,
        external_auth_id: Option<&str>,
        exclude_id: Option<u64>,
    ) -> Option<UniqueField> {
        let taken = |index: &HashMap<String, u64>, value: Option<&str>| {
            value
                .and_then(|v| index.get(v))
                .is_some_and(|owner| Some(*owner) != exclude_id)
        };

        if taken(&self.user_id_by_email, email) {
            Some(UniqueField::Email)
        } else if taken(&self.user_id_by_username, username) {
            Some(UniqueField::Username)
        } else if taken(&self.user_id_by_external_auth_id, external_auth_id) {
            Some(UniqueField::ExternalAuthId)
        } else {
            None
        }
    }

    fn index_user(&mut self, user: &User) {
        self.user_id_by_email.insert(user.email.clone(), user.id);
        self.user_id_by_username
            .insert(user.username.clone(), user.id);
        self.user_id_by_external_auth_id
            .insert(user.external_auth_id.clone(), user.id);
    }

    fn unindex_user(&mut self, user: &User) {
        self.user_id_by_email.remove(&user.email);
        self.user_id_by_username.remove(&user.username);
        self.user_id_by_external_auth_id
            .remove(&user.external_auth_id);
    }
}

impl MemoryDb {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, id: u64) -> Option<User> {
        self.tables.read().await.users.get(&id).cloned()
    }

    /// Resolve an identity-provider subject to a local user.
    pub async fn get_user_by_external_auth_id(&self, external_auth_id: &str) -> Option<User> {
        let tables = self.tables.read().await;
        tables
            .user_id_by_external_auth_id
            .get(external_auth_id)
            .and_then(|id| tables.users.get(id))
            .cloned()
    }

    pub async fn get_user_by_username(&self, username: &str) -> Option<User> {
        let tables = self.tables.read().await;
        tables
            .user_id_by_username
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned()
    }

    pub async fn get_user_by_email(&self, email: &str) -> Option<User> {
        let tables = self.tables.read().await;
        tables
            .user_id_by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned()
    }

    /// Register a new user.
    ///
    /// Fails with [`StoreError::Conflict`] if the email, username or external
    /// identity is already taken; the store is left untouched in that case.
    pub async fn create_user(&self, input: NewUser) -> Result<User, StoreError> {
        input.validate()?;

        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        if let Some(field) = tables.find_conflict(
            Some(&input.email),
            Some(&input.username),
            Some(&input.external_auth_id),
            None,
        ) {
            tracing::info!(field = %field, "Rejected user registration: duplicate field");
            return Err(StoreError::Conflict(field));
        }

        tables.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.last_user_id,
            external_auth_id: input.external_auth_id,
            username: input.username,
            email: input.email,
            full_name: input.full_name,
            role: input.role.unwrap_or_default(),
            games_played: input.games_played.unwrap_or(0),
            wins: input.wins.unwrap_or(0),
            rank_points: input.rank_points.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        tables.index_user(&user);
        tables.users.insert(user.id, user.clone());

        tracing::debug!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Merge a partial update into an existing user.
    ///
    /// Returns `Ok(None)` if no user has this ID. `id` and `created_at` never
    /// change; `updated_at` is refreshed on every successful call.
    pub async fn update_user(
        &self,
        id: u64,
        update: UserUpdate,
    ) -> Result<Option<User>, StoreError> {
        update.validate()?;

        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        let Some(current) = tables.users.get(&id).cloned() else {
            return Ok(None);
        };

        if let Some(field) = tables.find_conflict(
            update.email.as_deref(),
            update.username.as_deref(),
            update.external_auth_id.as_deref(),
            Some(id),
        ) {
            tracing::info!(user_id = id, field = %field, "Rejected user update: duplicate field");
            return Err(StoreError::Conflict(field));
        }

        let mut updated = current.clone();
        if let Some(external_auth_id) = update.external_auth_id {
            updated.external_auth_id = external_auth_id;
        }
        if let Some(username) = update.username {
            updated.username = username;
        }
        if let Some(email) = update.email {
            updated.email = email;
        }
        if let Some(full_name) = update.full_name {
            updated.full_name = full_name;
        }
        if let Some(role) = update.role {
            updated.role = role;
        }
        if let Some(games_played) = update.games_played {
            updated.games_played = games_played;
        }
        if let Some(wins) = update.wins {
            updated.wins = wins;
        }
        if let Some(rank_points) = update.rank_points {
            updated.rank_points = rank_points;
        }
        updated.updated_at = Utc::now();

        tables.unindex_user(&current);
        tables.index_user(&updated);
        tables.users.insert(id, updated.clone());

        tracing::debug!(user_id = id, "User updated");
        Ok(Some(updated))
    }

    /// All users in registration order.
    pub async fn list_users(&self) -> Vec<User> {
        self.tables.read().await.users.values().cloned().collect()
    }

    /// Dashboard stats for a user.
    pub async fn get_user_stats(&self, id: u64) -> Option<UserStats> {
        self.tables
            .read()
            .await
            .users
            .get(&id)
            .map(UserStats::from_user)
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Record an activity for an existing user.
    pub async fn create_activity(&self, input: NewActivity) -> Result<Activity, StoreError> {
        self.insert_activity(input, Utc::now()).await
    }

    async fn insert_activity(
        &self,
        input: NewActivity,
        created_at: DateTime<Utc>,
    ) -> Result<Activity, StoreError> {
        input.validate()?;

        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        if !tables.users.contains_key(&input.user_id) {
            return Err(StoreError::NotFound(format!(
                "User {} not found",
                input.user_id
            )));
        }

        tables.last_activity_id += 1;
        let activity = Activity {
            id: tables.last_activity_id,
            user_id: input.user_id,
            description: input.description,
            game: input.game,
            points: input.points.unwrap_or(0),
            created_at,
        };

        tables
            .activity_ids_by_user
            .entry(activity.user_id)
            .or_default()
            .push(activity.id);
        tables.activities.insert(activity.id, activity.clone());

        tracing::debug!(
            activity_id = activity.id,
            user_id = activity.user_id,
            game = %activity.game,
            "Activity recorded"
        );
        Ok(activity)
    }

    /// A user's activities, most recent first (ties: higher ID first).
    pub async fn list_user_activities(&self, user_id: u64) -> Vec<Activity> {
        let tables = self.tables.read().await;
        let mut activities: Vec<Activity> = tables
            .activity_ids_by_user
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| tables.activities.get(id))
            .cloned()
            .collect();

        activities.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        activities
    }

    pub async fn activity_count(&self) -> usize {
        self.tables.read().await.activities.len()
    }
}
