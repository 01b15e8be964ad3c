// SPDX-License-Identifier: MIT

//! Stale connection cleanup orchestrator
//!
//! One invocation means one connection, one round trip, one result. The
//! orchestrator recovers nothing locally: every failure is logged with its
//! server context and propagated to the caller unchanged.

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use crate::error::{Error, Result};
use crate::policy::SelectionPolicy;

/// Terminates leaked sessions on the configured server
///
/// Construction is explicit: the connection target, policy, and logger
/// context all arrive through arguments, never ambient state.
pub struct StaleConnectionCleaner {
    connect_options: PgConnectOptions,
    policy: SelectionPolicy,
}

impl StaleConnectionCleaner {
    /// Creates a cleaner for the given connection string and policy.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when the connection string does not parse
    /// or the policy carries an invalid exclusion pattern.
    pub fn new(connection_string: &str, policy: SelectionPolicy) -> Result<Self> {
        let connect_options: PgConnectOptions = connection_string
            .parse()
            .map_err(|e| Error::Config(format!("Invalid connection string: {e}")))?;
        policy.validate()?;
        Ok(Self {
            connect_options,
            policy,
        })
    }

    /// Runs the cleanup once and returns how many sessions were terminated.
    ///
    /// A targeted session that disappears (or turns active) before the
    /// server reaches it simply does not count; that race is accepted.
    ///
    /// # Errors
    ///
    /// `Error::Connection` when the server cannot be reached or refuses
    /// the credentials, `Error::Execution` when the termination statement
    /// fails server-side. No internal retry either way.
    pub async fn clear(&self) -> Result<u64> {
        let server = self.connect_options.get_host();
        let database = self.connect_options.get_database().unwrap_or_default();
        let user = self.connect_options.get_username();

        tracing::info!(
            server,
            database,
            user,
            max_idle_secs = self.policy.max_idle_age.as_secs(),
            excluded_applications = self.policy.excluded_applications.len(),
            scope_database = self.policy.scope_to_current_database,
            scope_user = self.policy.scope_to_current_user,
            "Stale connection cleanup starting"
        );

        match self.clear_inner().await {
            Ok(terminated) => {
                tracing::info!(
                    server,
                    database,
                    user,
                    terminated,
                    "Stale connection cleanup completed"
                );
                Ok(terminated)
            }
            Err(e) => {
                tracing::error!(
                    server,
                    database,
                    user,
                    error = %e,
                    "Stale connection cleanup failed"
                );
                Err(e)
            }
        }
    }

    async fn clear_inner(&self) -> Result<u64> {
        let mut conn = PgConnection::connect_with(&self.connect_options)
            .await
            .map_err(Error::Connection)?;

        let query = self.policy.termination_query();
        let mut statement = sqlx::query_scalar::<_, bool>(&query.sql);
        if let Some(pattern) = &query.exclusion_pattern {
            statement = statement.bind(pattern.as_str());
        }
        let outcomes = statement
            .bind(query.max_idle_secs)
            .fetch_all(&mut conn)
            .await
            .map_err(Error::Execution)?;

        // Best effort; the server reaps the session either way
        let _ = conn.close().await;

        Ok(outcomes.into_iter().filter(|terminated| *terminated).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_malformed_connection_string() {
        let result = StaleConnectionCleaner::new("not a url", SelectionPolicy::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_new_rejects_invalid_exclusion_pattern() {
        let policy = SelectionPolicy {
            excluded_applications: vec!["[".to_string()],
            ..SelectionPolicy::default()
        };
        let result = StaleConnectionCleaner::new("postgres://app@localhost/app", policy);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_new_accepts_standard_url() {
        let result =
            StaleConnectionCleaner::new("postgres://app:secret@db:5432/app", SelectionPolicy::default());
        assert!(result.is_ok());
    }
}
