// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod stats;
pub mod user;

pub use activity::{Activity, NewActivity};
pub use stats::UserStats;
pub use user::{NewUser, ProfileUpdate, StatsUpdate, User, UserRole, UserUpdate};
