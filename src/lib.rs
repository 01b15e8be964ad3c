// SPDX-License-Identifier: MIT

//! # pg-sweeper
//!
//! One-shot reclamation of leaked or abandoned PostgreSQL connections.
//!
//! A host service runs the sweep once at startup: the cleaner connects,
//! ranks the server's sessions per client address, terminates idle
//! duplicates past an age threshold in a single statement, and reports the
//! count. The earliest session of every address survives, as does the
//! cleaner's own session. Failures never block the host.
//!
//! ## Main modules
//! - `cleaner`: cleanup orchestrator (connect, execute, count, log)
//! - `config`: configuration management
//! - `error`: error types
//! - `hook`: host lifecycle startup adapter
//! - `pg_errors`: constraint-violation classification helpers
//! - `policy`: stale session selection policy and query push-down
//! - `provider`: session-table capability seam for other backends
//! - `session`: server-reported session metadata
//! - `prelude`: commonly used types

mod cleaner;
mod config;
mod error;
mod hook;
mod pg_errors;
mod policy;
mod provider;
mod session;
pub mod prelude;

// Re-export commonly used types
/// Application configuration
pub use config::{Config, defaults, env_vars};

/// Application error and result type
pub use error::{Error, Result};

/// Cleanup orchestrator
pub use cleaner::StaleConnectionCleaner;

/// Host lifecycle startup adapter
pub use hook::StartupHook;

/// Selection policy and the pure selector
pub use policy::{
    DEFAULT_MAX_IDLE_AGE, SelectionPolicy, default_excluded_applications, select_stale,
};

/// Session-table capability seam
pub use provider::{SessionProvider, clear_with_provider};

/// Session metadata types
pub use session::{SessionRecord, SessionState};

/// Constraint-violation classification helpers
pub use pg_errors::{
    error_is_primary_key_violation, error_is_unique_constraint_violation,
    is_primary_key_violation, is_unique_constraint_violation,
};
