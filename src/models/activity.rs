// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity feed model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Stored activity record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/types/generated/")
)]
pub struct Activity {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    /// Owning user
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: u64,
    /// Free text shown in the feed (e.g. "Won a ranked match")
    pub description: String,
    /// Game tag
    pub game: String,
    pub points: u32,
    pub created_at: DateTime<Utc>,
}

/// Input for recording an activity.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub user_id: u64,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(length(min = 1, max = 64))]
    pub game: String,
    #[serde(default)]
    pub points: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_game_rejected() {
        let activity = NewActivity {
            user_id: 1,
            description: "Joined a tournament".to_string(),
            game: String::new(),
            points: None,
        };
        let errors = activity.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("game"));
    }

    #[test]
    fn test_points_default_to_none() {
        let activity: NewActivity =
            serde_json::from_str(r#"{"userId": 3, "description": "GG", "game": "valorant"}"#)
                .unwrap();
        assert_eq!(activity.user_id, 3);
        assert_eq!(activity.points, None);
    }
}
