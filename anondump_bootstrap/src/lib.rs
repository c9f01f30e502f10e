// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Bootstrap Module
//!
//! The bootstrap module sits **outside** the enterprise application layers
//! (domain, application, infrastructure) and provides:
//!
//! - **Argument parsing** - the CLI surface, with `ANONDUMP_*` environment
//!   fallbacks and legacy unprefixed variables
//! - **Validation** - conversion of raw flags into validated domain values
//!   (process steps, worker/seed-row counts)
//! - **Environment loading** - `.env` discovery from the working directory
//! - **Logging** - tracing subscriber initialization on stderr
//! - **Exit codes** - mapping domain errors onto the process exit contract
//!   (0 success, 1 runtime failure, 2 usage error)
//! - **Shutdown coordination** - Ctrl-C observed between pipeline steps
//!
//! Bootstrap can reach the domain crate; the enterprise layers never reach
//! back into bootstrap's parsing internals; they receive a [`ValidatedCli`].

pub mod cli;
pub mod exit_code;
pub mod logger;
pub mod shutdown;

// Re-export commonly used types
pub use cli::{parse_cli, validate_cli, Cli, ValidatedCli};
pub use exit_code::{exit_code_for, ExitCode};
pub use shutdown::{install_signal_handler, ShutdownFlag};

/// Loads a `.env` file discovered from the current working directory, when
/// one exists. Must run before CLI parsing so environment fallbacks see it.
pub fn load_dotenv() {
    // A missing .env is the normal case, not an error.
    let _ = dotenvy::dotenv();
}
