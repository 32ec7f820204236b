// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model and the validated inputs that create or change it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// Community role of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/types/generated/")
)]
pub enum UserRole {
    #[default]
    Member,
    Admin,
}

/// Stored user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/types/generated/")
)]
pub struct User {
    /// Store-assigned ID, never reused
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    /// Subject identifier issued by the identity provider
    pub external_auth_id: String,
    pub username: String,
    pub email: String,
    /// Display name
    pub full_name: String,
    pub role: UserRole,
    pub games_played: u32,
    pub wins: u32,
    pub rank_points: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Registration input.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(alias = "firebaseUid")]
    #[validate(length(min = 1, max = 128))]
    pub external_auth_id: String,
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub games_played: Option<u32>,
    #[serde(default)]
    pub wins: Option<u32>,
    #[serde(default)]
    pub rank_points: Option<u32>,
}

/// Partial update merged into an existing user. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, alias = "firebaseUid")]
    #[validate(length(min = 1, max = 128))]
    pub external_auth_id: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub games_played: Option<u32>,
    #[serde(default)]
    pub wins: Option<u32>,
    #[serde(default)]
    pub rank_points: Option<u32>,
}

impl UserUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.external_auth_id.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.full_name.is_none()
            && self.role.is_none()
            && self.games_played.is_none()
            && self.wins.is_none()
            && self.rank_points.is_none()
    }
}

/// Stat counters a client may overwrite.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatsUpdate {
    #[serde(default)]
    pub games_played: Option<u32>,
    #[serde(default)]
    pub wins: Option<u32>,
    #[serde(default)]
    pub rank_points: Option<u32>,
}

impl From<StatsUpdate> for UserUpdate {
    fn from(stats: StatsUpdate) -> Self {
        Self {
            games_played: stats.games_played,
            wins: stats.wins,
            rank_points: stats.rank_points,
            ..Default::default()
        }
    }
}

/// Fields editable from the profile page.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: Option<String>,
}

impl From<ProfileUpdate> for UserUpdate {
    fn from(profile: ProfileUpdate) -> Self {
        Self {
            username: profile.username,
            email: profile.email,
            full_name: profile.full_name,
            ..Default::default()
        }
    }
}

const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 32;
const FULL_NAME_MIN_CHARS: usize = 2;
const FULL_NAME_MAX_CHARS: usize = 100;

/// Usernames: 3-32 ASCII letters, digits or underscores.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
        return Err(ValidationError::new("username_length")
            .with_message("Username must be 3 to 32 characters".into()));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ValidationError::new("username_charset").with_message(
            "Username can only contain letters, numbers, and underscores".into(),
        ));
    }
    Ok(())
}

fn validate_full_name(full_name: &str) -> Result<(), ValidationError> {
    let len = full_name.trim().chars().count();
    if !(FULL_NAME_MIN_CHARS..=FULL_NAME_MAX_CHARS).contains(&len) {
        return Err(ValidationError::new("full_name_length")
            .with_message("Full name must be 2 to 100 characters".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str, full_name: &str) -> NewUser {
        NewUser {
            external_auth_id: "uid-1".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            role: None,
            games_played: None,
            wins: None,
            rank_points: None,
        }
    }

    #[test]
    fn test_valid_new_user() {
        assert!(new_user("night_owl", "owl@example.com", "Night Owl")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_username_rules() {
        let errors = new_user("ab", "a@example.com", "Al Bo")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("username"));

        let errors = new_user("bad name!", "a@example.com", "Al Bo")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_email_and_full_name_rules() {
        let errors = new_user("gamer", "not-an-email", " x ")
            .validate()
            .unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_legacy_firebase_uid_alias() {
        let json = r#"{
            "firebaseUid": "abc123",
            "username": "gamer",
            "email": "g@example.com",
            "fullName": "Game R"
        }"#;
        let user: NewUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.external_auth_id, "abc123");
        assert_eq!(user.role, None);
    }

    #[test]
    fn test_negative_stats_rejected() {
        let result: Result<StatsUpdate, _> = serde_json::from_str(r#"{"wins": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_update_touches_only_counters() {
        let update: UserUpdate = StatsUpdate {
            games_played: Some(5),
            ..Default::default()
        }
        .into();
        assert_eq!(update.games_played, Some(5));
        assert!(update.username.is_none());
        assert!(update.role.is_none());
        assert!(!update.is_empty());
        assert!(UserUpdate::default().is_empty());
    }
}
