// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_STATIC_DIR: &str = "dist/public";
const FALLBACK_STATIC_DIR: &str = "public";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity provider project ID (expected audience of ID tokens)
    pub firebase_project_id: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Directory holding the built front-end and PWA assets
    pub static_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let firebase_project_id = env::var("FIREBASE_PROJECT_ID")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("FIREBASE_PROJECT_ID"))?;
        if firebase_project_id.is_empty() {
            return Err(ConfigError::Invalid(
                "FIREBASE_PROJECT_ID",
                "must not be empty".to_string(),
            ));
        }

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", format!("not a port number: {raw}")))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            firebase_project_id,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            port,
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_static_dir()),
        })
    }

    /// Config for tests (no environment access).
    pub fn test_default() -> Self {
        Self {
            firebase_project_id: "nomercy-test".to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("target/test-static-missing"),
        }
    }

    /// Issuer expected in identity-provider ID tokens.
    pub fn token_issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.firebase_project_id)
    }
}

/// Prefer the bundled build output, otherwise the plain `public/` tree.
fn default_static_dir() -> PathBuf {
    let dist = PathBuf::from(DEFAULT_STATIC_DIR);
    if dist.exists() {
        dist
    } else {
        PathBuf::from(FALLBACK_STATIC_DIR)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
