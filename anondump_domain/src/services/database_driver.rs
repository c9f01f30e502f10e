// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Database Driver Port
//!
//! The async I/O contract between the process pipeline / anonymization
//! engine and a concrete backend. Implementations wrap the backend's native
//! client tools (subprocesses) or network driver.
//!
//! ## Contract notes
//!
//! - `execute` runs outside the working database (CREATE/DROP DATABASE);
//!   `db_execute` runs inside it.
//! - Drivers tolerate absent host/port/user/password and fall through to the
//!   backend's native credential sources.
//! - Statements issued through `db_execute` must be safe to run from
//!   concurrent worker tasks: a driver either spawns a client process per
//!   call or opens a session per call, so workers never share a session.
//! - Any error text derived from a subprocess invocation masks the password
//!   before it can reach a log sink.
//! - A missing or failing client tool surfaces as
//!   [`AnonymizerError::Dependency`] naming the tool.

use async_trait::async_trait;

use crate::error::AnonymizerError;
use crate::services::query_factory::QueryFactory;

/// Async port over one database backend.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// The pure SQL factory matching this driver's backend.
    fn query_factory(&self) -> &dyn QueryFactory;

    /// Proves the connection is viable; a fast-fail check for bad
    /// credentials or an unreachable server.
    async fn test_connection(&self) -> bool;

    /// Runs statement(s) outside the working database.
    async fn execute(&self, statements: &[String]) -> Result<(), AnonymizerError>;

    /// Runs statement(s) inside the working database, returning any captured
    /// output per statement (scripts may produce result sets worth logging).
    async fn db_execute(&self, statements: &[String]) -> Result<Vec<String>, AnonymizerError>;

    /// Returns one scalar cell decoded as text.
    async fn single_result(&self, statement: &str) -> Result<String, AnonymizerError>;

    /// Creates the working database.
    async fn create_database(&self) -> Result<(), AnonymizerError>;

    /// Drops the working database, forcing connection closure where the
    /// backend requires it.
    async fn drop_database(&self) -> Result<(), AnonymizerError>;

    /// Restores the dump at `input_path` (or stdin for `-`) into the working
    /// database.
    async fn restore_database(&self, input_path: &str) -> Result<(), AnonymizerError>;

    /// Dumps the working database to `output_path` (or stdout for `-`).
    async fn dump_database(&self, output_path: &str) -> Result<(), AnonymizerError>;

    /// Called after the anonymization phase, before any dump. Backends with
    /// trailing transactional work after mass UPDATEs may wait here so the
    /// dump does not race it.
    async fn settle_after_anonymize(&self) {}
}
