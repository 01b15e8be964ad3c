// SPDX-License-Identifier: MIT

//! Prelude module for convenient imports
//!
//! ```rust
//! use pg_sweeper::prelude::*;
//! ```

// Core types
pub use crate::config::Config;
pub use crate::error::{Error, Result};

// Cleanup
pub use crate::cleaner::StaleConnectionCleaner;
pub use crate::hook::StartupHook;

// Policy and session model
pub use crate::policy::{SelectionPolicy, select_stale};
pub use crate::provider::{SessionProvider, clear_with_provider};
pub use crate::session::{SessionRecord, SessionState};
