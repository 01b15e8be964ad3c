// SPDX-License-Identifier: MIT

//! Configuration module for the stale connection sweeper
//!
//! Loads the connection target and selection policy from environment
//! variables, with a JSON list for the exclusion patterns.

use std::time::Duration;

use crate::policy::SelectionPolicy;


/// Default configuration values
pub mod defaults {
    /// Idle-age threshold in seconds (5 minutes)
    pub const MAX_IDLE_SECONDS: u64 = 300;
}

/// Environment variable names used by the application
pub mod env_vars {
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const MAX_IDLE_SECONDS: &str = "PGSWEEP_MAX_IDLE_SECONDS";
    pub const EXCLUDED_APPLICATIONS: &str = "PGSWEEP_EXCLUDED_APPLICATIONS";
    pub const SCOPE_DATABASE: &str = "PGSWEEP_SCOPE_DATABASE";
    pub const SCOPE_USER: &str = "PGSWEEP_SCOPE_USER";
}

/// Application-wide configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub policy: SelectionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: String::new(),
            policy: SelectionPolicy::default(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_url = std::env::var(env_vars::DATABASE_URL).unwrap_or_default();

        let max_idle_age = std::env::var(env_vars::MAX_IDLE_SECONDS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(
                Duration::from_secs(defaults::MAX_IDLE_SECONDS),
                Duration::from_secs,
            );

        // JSON array of regex patterns, e.g. ["(?:psql)", "(?:pgAdmin.+)"]
        let excluded_applications = match std::env::var(env_vars::EXCLUDED_APPLICATIONS) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to parse {}: {}. Using preset exclusions.",
                    env_vars::EXCLUDED_APPLICATIONS,
                    e
                );
                crate::policy::default_excluded_applications()
            }),
            Err(_) => crate::policy::default_excluded_applications(),
        };

        let scope_to_current_database = std::env::var(env_vars::SCOPE_DATABASE)
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(true);
        let scope_to_current_user = std::env::var(env_vars::SCOPE_USER)
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(true);

        Config {
            database_url,
            policy: SelectionPolicy {
                max_idle_age,
                excluded_applications,
                scope_to_current_database,
                scope_to_current_user,
            },
        }
    }

    /// Validates the loaded configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.trim().is_empty() {
            return Err(format!("{} must be set", env_vars::DATABASE_URL));
        }
        self.policy.validate().map_err(|e| e.to_string())
    }
}

/// Accepts the usual spellings of boolean environment values
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
