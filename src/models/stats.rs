//! Dashboard statistics derived from a user's counters.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::User;

/// Stats card shown on the member dashboard.
///
/// Never stored: computed from the user record on every request so it can
/// not drift from the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/types/generated/")
)]
pub struct UserStats {
    pub games_played: u32,
    pub wins: u32,
    /// Whole-number percentage of games won
    pub win_rate: u32,
    pub rank_points: u32,
}

impl UserStats {
    pub fn from_user(user: &User) -> Self {
        Self {
            games_played: user.games_played,
            wins: user.wins,
            win_rate: win_rate(user.wins, user.games_played),
            rank_points: user.rank_points,
        }
    }
}

/// Rounded win percentage; 0 before the first game.
fn win_rate(wins: u32, games_played: u32) -> u32 {
    if games_played == 0 {
        return 0;
    }
    ((wins as f64 / games_played as f64) * 100.0).round() as u32
}
