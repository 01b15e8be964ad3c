// SPDX-License-Identifier: MIT

//! Host lifecycle hook adapter
//!
//! Participates in startup only; stop takes no action. This is the single
//! place where cleanup errors are suppressed — the host must come up
//! whether or not the sweep worked. Everything below this layer
//! propagates faithfully.

use tokio::sync::watch;

use crate::cleaner::StaleConnectionCleaner;
use crate::error::Error;

/// Startup-only hook around a [`StaleConnectionCleaner`]
pub struct StartupHook {
    cleaner: StaleConnectionCleaner,
}

impl StartupHook {
    #[must_use]
    pub fn new(cleaner: StaleConnectionCleaner) -> Self {
        Self { cleaner }
    }

    /// Runs the cleanup once, logging and swallowing any failure.
    ///
    /// A shutdown signal on `shutdown_rx` aborts the outstanding database
    /// operation; the abort is logged as a cancellation and swallowed like
    /// any other hook error.
    pub async fn on_start(&self, mut shutdown_rx: watch::Receiver<bool>) {
        let clear = self.cleaner.clear();
        tokio::pin!(clear);

        let result = loop {
            tokio::select! {
                result = &mut clear => break result,
                changed = shutdown_rx.changed() => {
                    match changed {
                        Ok(()) if *shutdown_rx.borrow() => break Err(Error::Cancelled),
                        Ok(()) => {}
                        // Sender gone; no cancellation can arrive anymore
                        Err(_) => break clear.await,
                    }
                }
            }
        };

        match result {
            Ok(terminated) => {
                tracing::debug!(terminated, "Startup connection sweep done");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to clean stale connections");
            }
        }
    }

    /// Shutdown takes no action
    pub async fn on_stop(&self) {}
}
