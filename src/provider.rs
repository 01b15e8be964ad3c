// SPDX-License-Identifier: MIT

//! Capability contract over a session-table backend
//!
//! The Postgres cleaner pushes selection and termination down as a single
//! statement and never goes through this seam. Backends without
//! window-function push-down implement `SessionProvider` instead and use
//! [`clear_with_provider`], which applies the same selection policy over a
//! snapshot; such implementations should wrap snapshot and termination in
//! one transaction to keep the select/terminate pair atomic. The trait
//! also backs deterministic unit tests with a fake provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::policy::{self, SelectionPolicy};
use crate::session::SessionRecord;

/// What the sweeper needs from a session-table backend
#[async_trait]
pub trait SessionProvider {
    /// Current snapshot of the server's session table
    async fn snapshot(&self) -> Result<Vec<SessionRecord>>;

    /// Forcibly disconnects a session.
    ///
    /// Returns `false` when the session is already gone; that is not an
    /// error.
    async fn terminate(&self, pid: i32) -> Result<bool>;

    /// Process id of the provider's own session, never terminated
    fn self_pid(&self) -> i32;

    /// Database the provider is connected to
    fn current_database(&self) -> &str;

    /// User the provider is connected as
    fn current_user(&self) -> &str;
}

/// Select-then-terminate path over a [`SessionProvider`].
///
/// Counts only terminations the backend confirmed, matching the push-down
/// path: a request against an already-gone session neither fails nor
/// increments the count.
pub async fn clear_with_provider<P: SessionProvider + Sync>(
    provider: &P,
    policy: &SelectionPolicy,
    now: DateTime<Utc>,
) -> Result<u64> {
    let sessions = provider.snapshot().await?;
    let stale = policy::select_stale(
        &sessions,
        now,
        provider.self_pid(),
        provider.current_database(),
        provider.current_user(),
        policy,
    )?;

    let mut terminated = 0u64;
    for pid in stale {
        if provider.terminate(pid).await? {
            terminated += 1;
        }
    }
    Ok(terminated)
}
