// SPDX-License-Identifier: MIT

//! Server-side push-down of the selection policy
//!
//! Selection, ranking, and termination run as one statement in one round
//! trip, so no session can change state between being selected and being
//! terminated.

use super::SelectionPolicy;

/// The combined select+rank+terminate statement and its bind values
pub(crate) struct TerminationQuery {
    pub sql: String,
    /// Bound first when present; alternation of the exclusion patterns
    pub exclusion_pattern: Option<String>,
    /// Always bound last
    pub max_idle_secs: f64,
}

impl SelectionPolicy {
    /// Builds the termination statement for this policy.
    ///
    /// Every session participates in the per-address ranking; the filters
    /// apply outside the window so the primary connection is the earliest
    /// session of the address regardless of its state.
    pub(crate) fn termination_query(&self) -> TerminationQuery {
        let exclusion_pattern = if self.excluded_applications.is_empty() {
            None
        } else {
            Some(self.excluded_applications.join("|"))
        };

        let mut sql = String::from(
            "WITH ranked_sessions AS (\n\
                 SELECT\n\
                 pid,\n\
                 application_name,\n\
                 datname,\n\
                 usename,\n\
                 state,\n\
                 state_change,\n\
                 rank() OVER (PARTITION BY client_addr ORDER BY backend_start ASC, pid ASC) AS session_rank\n\
             FROM pg_stat_activity\n\
             )\n\
             SELECT pg_terminate_backend(pid)\n\
             FROM ranked_sessions\n\
             WHERE session_rank > 1\n\
             AND pid <> pg_backend_pid()\n\
             AND state IN ('idle', 'idle in transaction', 'idle in transaction (aborted)', 'disabled')\n",
        );

        let mut placeholder = 1;
        if exclusion_pattern.is_some() {
            sql.push_str(&format!("AND application_name !~ ${placeholder}\n"));
            placeholder += 1;
        }
        if self.scope_to_current_database {
            sql.push_str("AND datname = current_database()\n");
        }
        if self.scope_to_current_user {
            sql.push_str("AND usename = current_user\n");
        }
        sql.push_str(&format!(
            "AND current_timestamp - state_change > make_interval(secs => ${placeholder})"
        ));

        TerminationQuery {
            sql,
            exclusion_pattern,
            max_idle_secs: self.max_idle_age.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_policy_query_shape() {
        let query = SelectionPolicy::default().termination_query();
        assert!(query.sql.contains("PARTITION BY client_addr"));
        assert!(query.sql.contains("ORDER BY backend_start ASC, pid ASC"));
        assert!(query.sql.contains("session_rank > 1"));
        assert!(query.sql.contains("pid <> pg_backend_pid()"));
        assert!(query.sql.contains("pg_terminate_backend(pid)"));
        assert!(query.sql.contains("application_name !~ $1"));
        assert!(query.sql.contains("datname = current_database()"));
        assert!(query.sql.contains("usename = current_user"));
        assert!(query.sql.contains("make_interval(secs => $2)"));
        assert_eq!(query.exclusion_pattern.as_deref(), Some("(?:psql)|(?:pgAdmin.+)"));
        assert_eq!(query.max_idle_secs, 300.0);
    }

    #[test]
    fn test_placeholders_shift_without_exclusions() {
        let policy = SelectionPolicy {
            excluded_applications: vec![],
            ..SelectionPolicy::default()
        };
        let query = policy.termination_query();
        assert!(query.exclusion_pattern.is_none());
        assert!(!query.sql.contains("!~"));
        assert!(query.sql.contains("make_interval(secs => $1)"));
    }

    #[test]
    fn test_scope_clauses_are_optional() {
        let policy = SelectionPolicy {
            scope_to_current_database: false,
            scope_to_current_user: false,
            ..SelectionPolicy::default()
        };
        let query = policy.termination_query();
        assert!(!query.sql.contains("current_database()"));
        assert!(!query.sql.contains("usename = current_user"));
    }

    #[test]
    fn test_idle_age_binds_in_seconds() {
        let policy = SelectionPolicy {
            max_idle_age: Duration::from_secs(90),
            ..SelectionPolicy::default()
        };
        assert_eq!(policy.termination_query().max_idle_secs, 90.0);
    }
}
