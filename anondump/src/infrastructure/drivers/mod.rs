// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Database Drivers
//!
//! Implementations of the [`DatabaseDriver`](anondump_domain::DatabaseDriver)
//! port:
//!
//! - [`mysql`] - `mysql` / `mysqldump` client tools, streaming SQL dumps
//! - [`postgres`] - `psql` / `pg_dump` client tools, streaming SQL dumps
//! - [`mssql`] - native TDS driver; file-level `BACKUP` / `RESTORE`
//!
//! Drivers tolerate absent connection fields and fall through to the
//! backend's native credential sources (`.my.cnf`, `.pgpass`, the server's
//! default authentication).

pub mod mssql;
pub mod mssql_connection_string;
pub mod mysql;
pub mod postgres;
pub mod subprocess;

use std::sync::Arc;

use anondump_domain::{AnonymizerError, DatabaseDriver};

/// Connection parameters common to every backend. Any field but the
/// database name may be absent.
#[derive(Debug, Clone, Default)]
pub struct ConnectionParams {
    pub host: Option<String>,
    pub port: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: String,
}

/// Backend-specific options gathered from the CLI surface.
#[derive(Debug, Clone)]
pub struct BackendOptions {
    pub mysql_cmd_opts: Option<String>,
    pub mysql_dump_opts: Option<String>,
    pub postgres_cmd_opts: Option<String>,
    pub postgres_dump_opts: Option<String>,
    pub mssql_connection_string: Option<String>,
    pub mssql_driver: Option<String>,
    pub mssql_backup_compression: bool,
    pub mssql_ansi_warnings_off: bool,
    pub mssql_timeout: Option<u64>,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            mysql_cmd_opts: None,
            mysql_dump_opts: None,
            postgres_cmd_opts: None,
            postgres_dump_opts: None,
            mssql_connection_string: None,
            mssql_driver: None,
            mssql_backup_compression: false,
            mssql_ansi_warnings_off: true,
            mssql_timeout: None,
        }
    }
}

/// Constructs the driver for `db_type`.
///
/// # Errors
///
/// - [`AnonymizerError::ArgumentValidation`] for an unknown backend name
/// - [`AnonymizerError::Dependency`] when a required client tool is missing
pub fn create_driver(
    db_type: &str,
    params: ConnectionParams,
    options: &BackendOptions,
) -> Result<Arc<dyn DatabaseDriver>, AnonymizerError> {
    match db_type.to_ascii_lowercase().as_str() {
        "mysql" => Ok(Arc::new(mysql::MySqlDriver::new(params, options)?)),
        "postgres" => Ok(Arc::new(postgres::PostgresDriver::new(params, options)?)),
        "mssql" => Ok(Arc::new(mssql::MsSqlDriver::new(params, options)?)),
        other => Err(AnonymizerError::ArgumentValidation(vec![format!(
            "unknown db-type `{}`; expected mysql, postgres or mssql",
            other
        )])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_db_type_rejected() {
        match create_driver("oracle", ConnectionParams::default(), &BackendOptions::default()) {
            Err(err) => assert!(matches!(err, AnonymizerError::ArgumentValidation(_))),
            Ok(_) => panic!("expected an error"),
        }
    }
}
