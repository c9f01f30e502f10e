// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! This module provides the error system for the anonymization domain. Errors
//! are organized by where they surface in the process lifecycle so that the
//! bootstrap layer can map them onto exit codes without inspecting message
//! text.
//!
//! ## Error Categories
//!
//! - **Usage errors** (exit code 2): `ArgumentValidation`, where the caller asked
//!   for something impossible before any work began.
//! - **Strategy errors** (exit code 1, raised before any destructive step):
//!   `UnsupportedFakeType`, `UnsupportedFakeArguments`,
//!   `UnknownTableStrategy`, `UnknownColumnStrategy`, `ConfigSyntax`.
//! - **Runtime errors** (exit code 1): `DatabaseConnection`, `Dependency`,
//!   `UnknownInputType`, `UnknownOutputType`, `Anonymization`, `IoError`,
//!   `DatabaseError`, `Cancelled`, `InternalError`,
//!   `UnsupportedTableStrategy`.
//!
//! ## Design Notes
//!
//! - Variants carry pre-rendered `String` context rather than source error
//!   chains, so errors stay `Clone` and can be collected per table during the
//!   parallel anonymization phase and reported in aggregate afterwards.
//! - `Anonymization` is the aggregated form: one [`TableError`] per failed
//!   table, produced after every table task has finished.

use thiserror::Error;

/// One failed table inside an aggregated anonymization error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableError {
    /// Qualified name of the table whose strategy failed.
    pub table: String,
    /// Rendered cause of the failure.
    pub message: String,
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.table, self.message)
    }
}

/// Domain-specific errors for the anonymization system.
///
/// Each variant includes a descriptive message and is designed to provide
/// clear information about what went wrong and potentially how to fix it.
#[derive(Error, Debug, Clone)]
pub enum AnonymizerError {
    #[error("Missing values for required arguments: {}", .0.join(", "))]
    ArgumentValidation(Vec<String>),

    #[error("Failed to connect to database: {0}")]
    DatabaseConnection(String),

    #[error("Dependency `{tool}` failed: {message}")]
    Dependency { tool: String, message: String },

    #[error("Unsupported fake type: {0}")]
    UnsupportedFakeType(String),

    #[error("Unsupported fake arguments for \"{method}\": {arguments}")]
    UnsupportedFakeArguments { method: String, arguments: String },

    #[error("Unknown table strategy: {0}")]
    UnknownTableStrategy(String),

    #[error("Unknown column strategy: {0}")]
    UnknownColumnStrategy(String),

    #[error("Strategy syntax error: {0}")]
    ConfigSyntax(String),

    #[error("Unsupported table strategy: {0}")]
    UnsupportedTableStrategy(String),

    #[error("Unable to detect input type for file: {0}")]
    UnknownInputType(String),

    #[error("Unable to detect output type for file: {0}")]
    UnknownOutputType(String),

    #[error("Error during anonymization of {} table(s): [{}]", .0.len(), format_table_errors(.0))]
    Anonymization(Vec<TableError>),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

fn format_table_errors(errors: &[TableError]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
}

impl AnonymizerError {
    /// Creates a new argument validation error
    pub fn argument_validation(messages: Vec<String>) -> Self {
        Self::ArgumentValidation(messages)
    }

    /// Creates a new database connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::DatabaseConnection(msg.into())
    }

    /// Creates a new dependency error naming the failing tool
    pub fn dependency(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dependency {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Creates a new strategy syntax error
    pub fn config_syntax(msg: impl Into<String>) -> Self {
        Self::ConfigSyntax(msg.into())
    }

    /// Creates a new IO error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Creates a new database error
    pub fn database_error(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    /// Creates a new internal error
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Checks if the error is a usage error (argument validation)
    ///
    /// Usage errors map to exit code 2; everything else maps to exit code 1.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, AnonymizerError::ArgumentValidation(_))
    }

    /// Checks if the error was produced while parsing or validating a
    /// strategy, before any destructive step could have run.
    pub fn is_strategy_error(&self) -> bool {
        matches!(
            self,
            AnonymizerError::UnsupportedFakeType(_)
                | AnonymizerError::UnsupportedFakeArguments { .. }
                | AnonymizerError::UnknownTableStrategy(_)
                | AnonymizerError::UnknownColumnStrategy(_)
                | AnonymizerError::ConfigSyntax(_)
        )
    }

    /// Gets the error category
    pub fn category(&self) -> &'static str {
        match self {
            AnonymizerError::ArgumentValidation(_) => "arguments",
            AnonymizerError::DatabaseConnection(_) => "connection",
            AnonymizerError::Dependency { .. } => "dependency",
            AnonymizerError::UnsupportedFakeType(_) => "strategy",
            AnonymizerError::UnsupportedFakeArguments { .. } => "strategy",
            AnonymizerError::UnknownTableStrategy(_) => "strategy",
            AnonymizerError::UnknownColumnStrategy(_) => "strategy",
            AnonymizerError::ConfigSyntax(_) => "strategy",
            AnonymizerError::UnsupportedTableStrategy(_) => "internal",
            AnonymizerError::UnknownInputType(_) => "io",
            AnonymizerError::UnknownOutputType(_) => "io",
            AnonymizerError::Anonymization(_) => "anonymization",
            AnonymizerError::IoError(_) => "io",
            AnonymizerError::DatabaseError(_) => "database",
            AnonymizerError::Cancelled(_) => "cancellation",
            AnonymizerError::InternalError(_) => "internal",
        }
    }
}

// Implement conversion from standard library errors
impl From<std::io::Error> for AnonymizerError {
    fn from(err: std::io::Error) -> Self {
        AnonymizerError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AnonymizerError {
    fn from(err: serde_json::Error) -> Self {
        AnonymizerError::ConfigSyntax(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_classification() {
        let usage = AnonymizerError::ArgumentValidation(vec!["Missing INPUT".to_string()]);
        assert!(usage.is_usage_error());

        let runtime = AnonymizerError::DatabaseConnection("refused".to_string());
        assert!(!runtime.is_usage_error());
    }

    #[test]
    fn test_strategy_error_classification() {
        assert!(AnonymizerError::UnsupportedFakeType("nope".to_string()).is_strategy_error());
        assert!(AnonymizerError::config_syntax("bad node").is_strategy_error());
        assert!(!AnonymizerError::database_error("boom").is_strategy_error());
    }

    #[test]
    fn test_aggregated_error_message_lists_tables() {
        let err = AnonymizerError::Anonymization(vec![
            TableError {
                table: "customers".to_string(),
                message: "syntax error".to_string(),
            },
            TableError {
                table: "public.orders".to_string(),
                message: "lock timeout".to_string(),
            },
        ]);

        let rendered = err.to_string();
        assert!(rendered.contains("2 table(s)"));
        assert!(rendered.contains("customers: syntax error"));
        assert!(rendered.contains("public.orders: lock timeout"));
    }

    #[test]
    fn test_category() {
        assert_eq!(AnonymizerError::connection("x").category(), "connection");
        assert_eq!(AnonymizerError::dependency("mysqldump", "exit 2").category(), "dependency");
        assert_eq!(AnonymizerError::UnknownInputType("a.rar".to_string()).category(), "io");
    }
}
