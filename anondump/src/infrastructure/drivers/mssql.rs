// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # MSSQL Driver
//!
//! A native TDS driver for SQL Server. Backup and restore are file-level
//! operations: the `.bak` paths are interpreted by the *server* process, so
//! they must be visible on the server's filesystem, and the working
//! database's files are laid down in the server's default data/log folders
//! (discovered from `sys.master_files` via the `model` database).
//!
//! `CREATE DATABASE` is a no-op on this backend; `RESTORE DATABASE` creates
//! the database. `DROP DATABASE` forces single-user mode first.
//!
//! ## Sessions
//!
//! Statements inside the working database open a session per call, so the
//! engine's parallel table workers never multiplex one connection. The
//! master-scoped operations (restore, backup, drop) each use their own
//! short-lived session too; SQL Server cannot run them concurrently anyway.

use std::time::Duration;

use anondump_domain::{AnonymizerError, DatabaseDriver, QueryFactory};
use async_trait::async_trait;
use tiberius::{Client, Config, Row};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info, warn};

use crate::infrastructure::drivers::mssql_connection_string::AdoConnectionString;
use crate::infrastructure::drivers::{BackendOptions, ConnectionParams};
use crate::infrastructure::sql::mssql::MsSqlQueryFactory;

type SqlClient = Client<Compat<TcpStream>>;

const DATA_FOLDER_QUERY: &str = "SELECT physical_name FROM sys.master_files mf \
     INNER JOIN sys.[databases] d ON mf.[database_id] = d.[database_id] \
     WHERE d.[name] = 'model' AND type = 0;";

const LOG_FOLDER_QUERY: &str = "SELECT physical_name FROM sys.master_files mf \
     INNER JOIN sys.[databases] d ON mf.[database_id] = d.[database_id] \
     WHERE d.[name] = 'model' AND type = 1;";

/// One logical file enumerated by `RESTORE FILELISTONLY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub logical_name: String,
    pub physical_name: String,
    /// `D` for data, `L` for log.
    pub file_type: String,
}

/// MSSQL implementation of the driver port.
pub struct MsSqlDriver {
    params: ConnectionParams,
    connection_string: Option<String>,
    timeout: Option<u64>,
    backup_compression: bool,
    factory: MsSqlQueryFactory,
}

impl MsSqlDriver {
    pub fn new(params: ConnectionParams, options: &BackendOptions) -> Result<Self, AnonymizerError> {
        if options.mssql_driver.is_some() {
            warn!("--mssql-driver is ignored; the TDS driver is built in");
        }

        Ok(Self {
            params,
            connection_string: options.mssql_connection_string.clone(),
            timeout: options.mssql_timeout,
            backup_compression: options.mssql_backup_compression,
            factory: MsSqlQueryFactory::new(options.mssql_ansi_warnings_off),
        })
    }

    /// Builds the effective ADO string: the user's own string with only the
    /// missing keys filled in. `database` is forced only for working-db
    /// sessions.
    fn ado_string(&self, database: Option<&str>) -> Result<String, AnonymizerError> {
        let mut builder = match &self.connection_string {
            Some(raw) => AdoConnectionString::parse(raw)?,
            None => AdoConnectionString::new(),
        };

        let server = match (non_empty(&self.params.host), non_empty(&self.params.port)) {
            (Some(host), Some(port)) => format!("tcp:{},{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, Some(port)) => format!("tcp:localhost,{}", port),
            (None, None) => "localhost".to_string(),
        };
        builder.set_if_absent("Server", server);

        if let Some(user) = non_empty(&self.params.user) {
            builder.set_if_absent("User ID", user);
        }
        if let Some(password) = non_empty(&self.params.password) {
            builder.set_if_absent("Password", password);
        }
        builder.set_if_absent("TrustServerCertificate", "true");

        if let Some(database) = database {
            builder.set("Database", database);
        }

        Ok(builder.build())
    }

    fn scrub(&self, text: &str) -> String {
        match non_empty(&self.params.password) {
            Some(password) => text.replace(password, "******"),
            None => text.to_string(),
        }
    }

    async fn connect(&self, database: Option<&str>) -> Result<SqlClient, AnonymizerError> {
        let config = Config::from_ado_string(&self.ado_string(database)?)
            .map_err(|err| AnonymizerError::connection(self.scrub(&err.to_string())))?;

        let timeout = Duration::from_secs(self.timeout.unwrap_or(30));
        let tcp = tokio::time::timeout(timeout, TcpStream::connect(config.get_addr()))
            .await
            .map_err(|_| AnonymizerError::connection(format!("timed out connecting to {}", config.get_addr())))?
            .map_err(|err| AnonymizerError::connection(self.scrub(&err.to_string())))?;
        tcp.set_nodelay(true)
            .map_err(|err| AnonymizerError::connection(err.to_string()))?;

        tokio::time::timeout(timeout, Client::connect(config, tcp.compat_write()))
            .await
            .map_err(|_| AnonymizerError::connection("timed out during TDS handshake".to_string()))?
            .map_err(|err| AnonymizerError::connection(self.scrub(&err.to_string())))
    }

    async fn run(&self, client: &mut SqlClient, statement: &str) -> Result<Vec<Vec<Row>>, AnonymizerError> {
        client
            .simple_query(statement)
            .await
            .map_err(|err| AnonymizerError::database_error(self.scrub(&err.to_string())))?
            .into_results()
            .await
            .map_err(|err| AnonymizerError::database_error(self.scrub(&err.to_string())))
    }

    async fn first_cell(&self, client: &mut SqlClient, statement: &str) -> Result<String, AnonymizerError> {
        let results = self.run(client, statement).await?;
        let row = results
            .first()
            .and_then(|rows| rows.first())
            .ok_or_else(|| AnonymizerError::database_error(format!("no rows returned by `{}`", statement)))?;
        Ok(render_cell(row, 0))
    }
}

#[async_trait]
impl DatabaseDriver for MsSqlDriver {
    fn query_factory(&self) -> &dyn QueryFactory {
        &self.factory
    }

    async fn test_connection(&self) -> bool {
        let Ok(mut client) = self.connect(None).await else {
            return false;
        };
        self.run(&mut client, "SELECT @@VERSION;").await.is_ok()
    }

    async fn execute(&self, statements: &[String]) -> Result<(), AnonymizerError> {
        let mut client = self.connect(None).await?;
        for statement in statements {
            self.run(&mut client, statement).await?;
        }
        Ok(())
    }

    async fn db_execute(&self, statements: &[String]) -> Result<Vec<String>, AnonymizerError> {
        // One session per call keeps parallel table workers off a shared
        // connection.
        let mut client = self.connect(Some(&self.params.name)).await?;
        let mut outputs = Vec::with_capacity(statements.len());
        for statement in statements {
            let results = self.run(&mut client, statement).await?;
            outputs.push(render_results(&results));
        }
        Ok(outputs)
    }

    async fn single_result(&self, statement: &str) -> Result<String, AnonymizerError> {
        let mut client = self.connect(Some(&self.params.name)).await?;
        self.first_cell(&mut client, statement).await
    }

    async fn create_database(&self) -> Result<(), AnonymizerError> {
        debug!("create_database ignored: RESTORE DATABASE creates the database on this backend");
        Ok(())
    }

    async fn drop_database(&self) -> Result<(), AnonymizerError> {
        self.execute(&self.factory.drop_database(&self.params.name)).await
    }

    async fn restore_database(&self, input_path: &str) -> Result<(), AnonymizerError> {
        let mut client = self.connect(None).await?;

        let data_file = self.first_cell(&mut client, DATA_FOLDER_QUERY).await?;
        let log_file = self.first_cell(&mut client, LOG_FOLDER_QUERY).await?;
        let data_dir = server_dirname(&data_file);
        let log_dir = server_dirname(&log_file);

        let filelist_statement = format!(
            "RESTORE FILELISTONLY FROM DISK = N'{}';",
            escape_literal(input_path)
        );
        let results = self.run(&mut client, &filelist_statement).await?;
        let files = parse_file_list(results.first().map(Vec::as_slice).unwrap_or(&[]))?;
        if files.is_empty() {
            return Err(AnonymizerError::database_error(format!(
                "RESTORE FILELISTONLY found no files in {}",
                input_path
            )));
        }

        let statement = build_restore_statement(&self.params.name, input_path, &files, data_dir, log_dir);
        info!("restoring {} files from {}", files.len(), input_path);
        self.run(&mut client, &statement).await?;
        Ok(())
    }

    async fn dump_database(&self, output_path: &str) -> Result<(), AnonymizerError> {
        let compression = if self.backup_compression { ", COMPRESSION" } else { "" };
        let statement = format!(
            "BACKUP DATABASE [{}] TO DISK = N'{}' WITH STATS = 5{};",
            self.params.name,
            escape_literal(output_path),
            compression
        );
        let mut client = self.connect(None).await?;
        self.run(&mut client, &statement).await?;
        Ok(())
    }
}

/// Builds the `RESTORE DATABASE ... WITH MOVE ...` statement redirecting
/// data files into `data_dir` and log files into `log_dir`, prefixing each
/// target file with the working database's name.
pub fn build_restore_statement(
    db_name: &str,
    disk_path: &str,
    files: &[BackupFile],
    data_dir: &str,
    log_dir: &str,
) -> String {
    let move_clauses = files
        .iter()
        .map(|file| {
            let target_dir = if file.file_type.eq_ignore_ascii_case("L") {
                log_dir
            } else {
                data_dir
            };
            let basename = server_basename(&file.physical_name);
            let target = server_join(target_dir, &format!("{}_{}", db_name, basename));
            format!(
                "MOVE N'{}' TO N'{}'",
                escape_literal(&file.logical_name),
                escape_literal(&target)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "RESTORE DATABASE [{}] FROM DISK = N'{}' WITH {}, STATS = 5;",
        db_name,
        escape_literal(disk_path),
        move_clauses
    )
}

fn parse_file_list(rows: &[Row]) -> Result<Vec<BackupFile>, AnonymizerError> {
    rows.iter()
        .map(|row| {
            let logical_name = try_str(row, 0)?;
            let physical_name = try_str(row, 1)?;
            let file_type = try_str(row, 2)?;
            Ok(BackupFile {
                logical_name,
                physical_name,
                file_type,
            })
        })
        .collect()
}

fn try_str(row: &Row, index: usize) -> Result<String, AnonymizerError> {
    row.try_get::<&str, _>(index)
        .map_err(|err| AnonymizerError::database_error(err.to_string()))?
        .map(str::to_string)
        .ok_or_else(|| AnonymizerError::database_error(format!("NULL in RESTORE FILELISTONLY column {}", index)))
}

fn render_results(results: &[Vec<Row>]) -> String {
    results
        .iter()
        .flat_map(|rows| rows.iter())
        .map(|row| {
            (0..row.len())
                .map(|index| render_cell(row, index))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_cell(row: &Row, index: usize) -> String {
    if let Ok(Some(text)) = row.try_get::<&str, _>(index) {
        return text.to_string();
    }
    if let Ok(Some(int)) = row.try_get::<i64, _>(index) {
        return int.to_string();
    }
    if let Ok(Some(int)) = row.try_get::<i32, _>(index) {
        return int.to_string();
    }
    if let Ok(Some(int)) = row.try_get::<u8, _>(index) {
        return int.to_string();
    }
    if let Ok(Some(float)) = row.try_get::<f64, _>(index) {
        return float.to_string();
    }
    if let Ok(Some(bit)) = row.try_get::<bool, _>(index) {
        return bit.to_string();
    }
    String::new()
}

fn escape_literal(text: &str) -> String {
    text.replace('\'', "''")
}

/// Path helpers that work on *server-side* paths, which are usually Windows
/// style even when this process runs elsewhere.
fn server_basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn server_dirname(path: &str) -> &str {
    let basename = server_basename(path);
    let prefix_len = path.len() - basename.len();
    path[..prefix_len].trim_end_matches(['/', '\\'])
}

fn server_join(dir: &str, file: &str) -> String {
    let separator = if dir.contains('\\') { '\\' } else { '/' };
    format!("{}{}{}", dir, separator, file)
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}
