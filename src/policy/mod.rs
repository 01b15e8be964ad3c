// SPDX-License-Identifier: MIT

//! Stale session selection policy
//!
//! Sessions are ranked per client address by establishment time; the
//! earliest one is that address's primary connection and is always
//! preserved, whatever its idle state. Younger sessions from the same
//! address are reclaimed once they have sat idle past the age threshold.
//! This protects a client's one legitimate long-lived connection per host
//! while aggressively collecting leaked duplicates from the same origin.

mod query;

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::RegexSet;

use crate::error::{Error, Result};
use crate::session::SessionRecord;

/// Idle-age threshold applied when none is configured (5 minutes)
pub const DEFAULT_MAX_IDLE_AGE: Duration = Duration::from_secs(300);

/// Preset exclusion patterns for interactive admin clients
#[must_use]
pub fn default_excluded_applications() -> Vec<String> {
    vec!["(?:psql)".to_string(), "(?:pgAdmin.+)".to_string()]
}

/// Which sessions may be terminated; immutable per invocation
///
/// The sweeper's own session is always excluded and is not represented
/// here.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    /// Sessions idle longer than this are eligible
    pub max_idle_age: Duration,
    /// Regex patterns over `application_name`; matching sessions are never
    /// terminated
    pub excluded_applications: Vec<String>,
    /// Restrict candidates to the sweeper's own database
    pub scope_to_current_database: bool,
    /// Restrict candidates to the sweeper's own user
    pub scope_to_current_user: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            max_idle_age: DEFAULT_MAX_IDLE_AGE,
            excluded_applications: default_excluded_applications(),
            scope_to_current_database: true,
            scope_to_current_user: true,
        }
    }
}

impl SelectionPolicy {
    /// Checks that every exclusion pattern is a valid regex
    pub fn validate(&self) -> Result<()> {
        self.exclusion_set()?;
        Ok(())
    }

    fn exclusion_set(&self) -> Result<RegexSet> {
        RegexSet::new(&self.excluded_applications)
            .map_err(|e| Error::Config(format!("Invalid application exclusion pattern: {e}")))
    }
}

/// Computes the pids eligible for termination under `policy`.
///
/// All sessions participate in the per-address ranking, so the primary is
/// the earliest-established session of the address regardless of its
/// state. Ties on `backend_start` break by ascending `pid`, keeping the
/// result stable across repeated runs on an unchanged snapshot. The
/// returned pids are sorted ascending.
pub fn select_stale(
    sessions: &[SessionRecord],
    now: DateTime<Utc>,
    self_pid: i32,
    current_database: &str,
    current_user: &str,
    policy: &SelectionPolicy,
) -> Result<Vec<i32>> {
    let excluded = policy.exclusion_set()?;
    let max_idle = chrono::Duration::from_std(policy.max_idle_age)
        .map_err(|e| Error::Config(format!("Idle age out of range: {e}")))?;

    // Unix-socket sessions (no client address) form their own partition,
    // matching how the server's window partitioning groups NULLs.
    let mut partitions: HashMap<Option<&str>, Vec<&SessionRecord>> = HashMap::new();
    for session in sessions {
        partitions
            .entry(session.client_addr.as_deref())
            .or_default()
            .push(session);
    }

    let mut selected = Vec::new();
    for partition in partitions.values_mut() {
        partition.sort_by(|a, b| {
            a.backend_start
                .cmp(&b.backend_start)
                .then(a.pid.cmp(&b.pid))
        });
        // partition[0] is the primary connection for this address
        for session in partition.iter().skip(1) {
            if session.pid == self_pid {
                continue;
            }
            if !session.state.is_idle_family() {
                continue;
            }
            if now - session.state_change <= max_idle {
                continue;
            }
            if policy.scope_to_current_database && session.database != current_database {
                continue;
            }
            if policy.scope_to_current_user && session.user != current_user {
                continue;
            }
            if excluded.is_match(&session.application_name) {
                continue;
            }
            selected.push(session.pid);
        }
    }

    selected.sort_unstable();
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    fn record(pid: i32, addr: &str, start_mins_ago: i64, idle_mins: i64) -> SessionRecord {
        let now = Utc::now();
        SessionRecord {
            pid,
            client_addr: Some(addr.to_string()),
            backend_start: now - chrono::Duration::minutes(start_mins_ago),
            state: SessionState::Idle,
            application_name: "worker".to_string(),
            database: "app".to_string(),
            user: "app".to_string(),
            state_change: now - chrono::Duration::minutes(idle_mins),
        }
    }

    #[test]
    fn test_default_policy_carries_admin_presets() {
        let policy = SelectionPolicy::default();
        assert_eq!(policy.max_idle_age, Duration::from_secs(300));
        assert!(policy.excluded_applications.iter().any(|p| p.contains("pgAdmin")));
        assert!(policy.scope_to_current_database);
        assert!(policy.scope_to_current_user);
    }

    #[test]
    fn test_validate_rejects_malformed_pattern() {
        let policy = SelectionPolicy {
            excluded_applications: vec!["(unclosed".to_string()],
            ..SelectionPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_pattern_list_excludes_nothing() {
        let policy = SelectionPolicy {
            excluded_applications: vec![],
            ..SelectionPolicy::default()
        };
        let sessions = vec![record(1, "10.0.0.5", 60, 30), record(2, "10.0.0.5", 30, 30)];
        let stale =
            select_stale(&sessions, Utc::now(), 999, "app", "app", &policy).unwrap();
        assert_eq!(stale, vec![2]);
    }

    #[test]
    fn test_tie_on_backend_start_breaks_by_pid() {
        let now = Utc::now();
        let start = now - chrono::Duration::minutes(60);
        let mut a = record(7, "10.0.0.5", 60, 30);
        let mut b = record(3, "10.0.0.5", 60, 30);
        a.backend_start = start;
        b.backend_start = start;

        let policy = SelectionPolicy::default();
        let stale = select_stale(&[a, b], now, 999, "app", "app", &policy).unwrap();
        // pid 3 ranks first and is preserved as the primary
        assert_eq!(stale, vec![7]);
    }

    #[test]
    fn test_active_primary_still_shields_only_itself() {
        let now = Utc::now();
        let mut primary = record(1, "10.0.0.5", 90, 0);
        primary.state = SessionState::Active;
        let idle = record(2, "10.0.0.5", 30, 30);

        let policy = SelectionPolicy::default();
        let stale = select_stale(&[primary, idle], now, 999, "app", "app", &policy).unwrap();
        assert_eq!(stale, vec![2]);
    }

    #[test]
    fn test_unix_socket_sessions_share_one_partition() {
        let now = Utc::now();
        let mut a = record(1, "", 60, 30);
        let mut b = record(2, "", 30, 30);
        a.client_addr = None;
        b.client_addr = None;

        let policy = SelectionPolicy::default();
        let stale = select_stale(&[a, b], now, 999, "app", "app", &policy).unwrap();
        assert_eq!(stale, vec![2]);
    }
}
