// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NoMercy Community: backend for a gaming-community site
//!
//! This crate provides the member API (registration, profiles, stats and
//! activity feeds) on top of an in-memory store, with identities issued by
//! an external identity provider.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::MemoryDb;
use services::IdentityVerifier;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: MemoryDb,
    pub identity_verifier: Arc<IdentityVerifier>,
}
