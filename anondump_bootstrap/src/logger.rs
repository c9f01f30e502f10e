// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging Setup
//!
//! Initializes the tracing subscriber for the process. All log output goes
//! to **stderr**: stdout is reserved for dump bytes when the output path is
//! `-`. `--verbose` raises the level from INFO to DEBUG.

use tracing::Level;

/// Initializes the global tracing subscriber.
///
/// Safe to call once per process; a second call is ignored (relevant in
/// test binaries where multiple tests may race to initialize).
pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
