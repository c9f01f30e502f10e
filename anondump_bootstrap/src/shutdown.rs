// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Shutdown Coordination
//!
//! A run is not interruptible mid-statement: killing a half-finished
//! restore or a mass UPDATE leaves the working database in a state nobody
//! wants to reason about. Instead, Ctrl-C sets a flag that the pipeline
//! checks **between steps**; the current step finishes, then the run stops
//! with a cancellation error (and the usual drop-on-failure cleanup).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

/// Clone-able cancellation flag shared between the signal handler and the
/// pipeline.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown at the next step boundary.
    pub fn request_shutdown(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested (non-blocking).
    pub fn is_shutdown(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Installs a Ctrl-C handler that trips a [`ShutdownFlag`].
///
/// Must be called from within a tokio runtime.
pub fn install_signal_handler() -> ShutdownFlag {
    let flag = ShutdownFlag::new();
    let handle = flag.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; stopping after the current step");
            handle.request_shutdown();
        }
    });

    flag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_starts_clear() {
        assert!(!ShutdownFlag::new().is_shutdown());
    }

    #[test]
    fn test_request_is_visible_through_clones() {
        let flag = ShutdownFlag::new();
        let clone = flag.clone();
        clone.request_shutdown();
        assert!(flag.is_shutdown());
    }
}
