// SPDX-License-Identifier: MIT

//! Session metadata as reported by the server's `pg_stat_activity` view
//!
//! One `SessionRecord` per backend process. The sweeper only reads these;
//! the session table itself lives on the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend state from `pg_stat_activity.state`
///
/// Serializes with the exact strings the server uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "idle in transaction")]
    IdleInTransaction,
    #[serde(rename = "idle in transaction (aborted)")]
    IdleInTransactionAborted,
    #[serde(rename = "disabled")]
    Disabled,
    /// Anything the server reports that we do not model (e.g. fastpath)
    #[serde(rename = "other")]
    Other,
}

impl SessionState {
    /// Parses the exact strings the server uses
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "idle" => Self::Idle,
            "idle in transaction" => Self::IdleInTransaction,
            "idle in transaction (aborted)" => Self::IdleInTransactionAborted,
            "disabled" => Self::Disabled,
            _ => Self::Other,
        }
    }

    /// True when the session is not currently executing a statement
    #[must_use]
    pub fn is_idle_family(self) -> bool {
        matches!(
            self,
            Self::Idle | Self::IdleInTransaction | Self::IdleInTransactionAborted | Self::Disabled
        )
    }
}

/// One row of the server's live session table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Server-assigned backend process id, unique at any instant
    pub pid: i32,
    /// Network origin; `None` for unix-socket sessions
    pub client_addr: Option<String>,
    /// When the session was established
    pub backend_start: DateTime<Utc>,
    pub state: SessionState,
    /// Free-text client-declared label
    pub application_name: String,
    pub database: String,
    pub user: String,
    /// Most recent state transition
    pub state_change: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_state_strings() {
        assert_eq!(SessionState::parse("active"), SessionState::Active);
        assert_eq!(SessionState::parse("idle"), SessionState::Idle);
        assert_eq!(
            SessionState::parse("idle in transaction"),
            SessionState::IdleInTransaction
        );
        assert_eq!(
            SessionState::parse("idle in transaction (aborted)"),
            SessionState::IdleInTransactionAborted
        );
        assert_eq!(SessionState::parse("disabled"), SessionState::Disabled);
        assert_eq!(SessionState::parse("fastpath function call"), SessionState::Other);
    }

    #[test]
    fn test_idle_family_membership() {
        assert!(SessionState::Idle.is_idle_family());
        assert!(SessionState::IdleInTransaction.is_idle_family());
        assert!(SessionState::IdleInTransactionAborted.is_idle_family());
        assert!(SessionState::Disabled.is_idle_family());
        assert!(!SessionState::Active.is_idle_family());
        assert!(!SessionState::Other.is_idle_family());
    }
}
