// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # PostgreSQL Driver
//!
//! A command-line based PostgreSQL driver over `psql` and `pg_dump`. The
//! password travels to child processes through the `PGPASSWORD` environment
//! variable (never argv); absent fields fall through to `.pgpass` and the
//! client's defaults. Statements outside the working database run against
//! the user's default database, which is where `CREATE DATABASE` / `DROP
//! DATABASE` must execute anyway.

use std::sync::Arc;

use anondump_domain::{AnonymizerError, DatabaseDriver, QueryFactory};
use async_trait::async_trait;

use crate::infrastructure::drivers::subprocess::{require_tool, split_extra_opts, ClientTool};
use crate::infrastructure::drivers::{BackendOptions, ConnectionParams};
use crate::infrastructure::io::{copy_stream, resolve_input, resolve_output};
use crate::infrastructure::sql::postgres::PostgresQueryFactory;

const PSQL: &str = "psql";
const PG_DUMP: &str = "pg_dump";

struct Inner {
    params: ConnectionParams,
    cmd_opts: Vec<String>,
    dump_opts: Vec<String>,
}

impl Inner {
    fn client_args(&self, extra: &[String]) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(host) = non_empty(&self.params.host) {
            args.push("--host".to_string());
            args.push(host.to_string());
        }
        if let Some(port) = non_empty(&self.params.port) {
            args.push("--port".to_string());
            args.push(port.to_string());
        }
        if let Some(user) = non_empty(&self.params.user) {
            args.push("--username".to_string());
            args.push(user.to_string());
        }
        args.extend(extra.iter().cloned());
        args
    }

    fn with_password(&self, tool: ClientTool) -> ClientTool {
        match non_empty(&self.params.password) {
            Some(password) => tool.env("PGPASSWORD", password).mask_secret(password),
            None => tool,
        }
    }

    fn cmd_tool(&self) -> ClientTool {
        self.with_password(ClientTool::new(PSQL).args(self.client_args(&self.cmd_opts)))
    }

    fn dump_tool(&self) -> ClientTool {
        self.with_password(ClientTool::new(PG_DUMP).args(self.client_args(&self.dump_opts)))
    }

    fn execute(&self, statement: &str) -> Result<String, AnonymizerError> {
        self.cmd_tool().arg("--command").arg(statement).run_capture()
    }

    fn db_execute(&self, statement: &str) -> Result<String, AnonymizerError> {
        self.cmd_tool()
            .arg("--dbname")
            .arg(&self.params.name)
            .arg("--command")
            .arg(statement)
            .run_capture()
    }

    fn single_result(&self, statement: &str) -> Result<String, AnonymizerError> {
        self.cmd_tool()
            .arg("--dbname")
            .arg(&self.params.name)
            .arg("-tA")
            .arg("--command")
            .arg(statement)
            .run_capture()
    }

    fn restore(&self, input_path: &str) -> Result<(), AnonymizerError> {
        let source = resolve_input(input_path)?;
        let size = source.size();
        let mut reader = source.open()?;

        let tool = self
            .cmd_tool()
            .arg("--dbname")
            .arg(&self.params.name)
            .arg("--quiet");
        let mut child = tool.spawn_writer()?;
        {
            let stdin = child
                .stdin
                .as_mut()
                .ok_or_else(|| AnonymizerError::dependency(PSQL, "failed to open restore pipe"))?;
            copy_stream(&mut reader, stdin, size, "Restoring")?;
        }
        drop(child.stdin.take());
        tool.finish(child)
    }

    fn dump(&self, output_path: &str) -> Result<(), AnonymizerError> {
        let target = resolve_output(output_path)?;
        let mut writer = target.open()?;

        let tool = self.dump_tool().arg(&self.params.name);
        let mut child = tool.spawn_reader()?;
        {
            let stdout = child
                .stdout
                .as_mut()
                .ok_or_else(|| AnonymizerError::dependency(PG_DUMP, "failed to open dump pipe"))?;
            copy_stream(stdout, &mut writer, None, "Dumping")?;
        }
        drop(child.stdout.take());
        tool.finish(child)?;
        writer.finish()
    }
}

/// PostgreSQL implementation of the driver port.
pub struct PostgresDriver {
    inner: Arc<Inner>,
    factory: PostgresQueryFactory,
}

impl PostgresDriver {
    /// Creates the driver, failing fast when the client tools are missing
    /// or the extra options cannot be shell-split.
    pub fn new(params: ConnectionParams, options: &BackendOptions) -> Result<Self, AnonymizerError> {
        require_tool(PSQL)?;
        require_tool(PG_DUMP)?;

        let cmd_opts = split_extra_opts(options.postgres_cmd_opts.as_deref())?;
        let dump_opts = split_extra_opts(options.postgres_dump_opts.as_deref())?;

        Ok(Self {
            inner: Arc::new(Inner {
                params,
                cmd_opts,
                dump_opts,
            }),
            factory: PostgresQueryFactory,
        })
    }

    async fn blocking<T, F>(&self, operation: F) -> Result<T, AnonymizerError>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Inner>) -> Result<T, AnonymizerError> + Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || operation(inner))
            .await
            .map_err(|err| AnonymizerError::internal_error(format!("driver task failed: {}", err)))?
    }
}

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    fn query_factory(&self) -> &dyn QueryFactory {
        &self.factory
    }

    async fn test_connection(&self) -> bool {
        self.blocking(|inner| inner.execute("SELECT 1;")).await.is_ok()
    }

    async fn execute(&self, statements: &[String]) -> Result<(), AnonymizerError> {
        let statements = statements.to_vec();
        self.blocking(move |inner| {
            for statement in &statements {
                inner.execute(statement)?;
            }
            Ok(())
        })
        .await
    }

    async fn db_execute(&self, statements: &[String]) -> Result<Vec<String>, AnonymizerError> {
        let statements = statements.to_vec();
        self.blocking(move |inner| statements.iter().map(|statement| inner.db_execute(statement)).collect())
            .await
    }

    async fn single_result(&self, statement: &str) -> Result<String, AnonymizerError> {
        let statement = statement.to_string();
        self.blocking(move |inner| inner.single_result(&statement)).await
    }

    async fn create_database(&self) -> Result<(), AnonymizerError> {
        let statements = self.factory.create_database(&self.inner.params.name);
        self.execute(&statements).await
    }

    async fn drop_database(&self) -> Result<(), AnonymizerError> {
        // Terminates other sessions first; postgres refuses to drop a
        // database with live connections.
        let statements = self.factory.drop_database(&self.inner.params.name);
        self.execute(&statements).await
    }

    async fn restore_database(&self, input_path: &str) -> Result<(), AnonymizerError> {
        let input_path = input_path.to_string();
        self.blocking(move |inner| inner.restore(&input_path)).await
    }

    async fn dump_database(&self, output_path: &str) -> Result<(), AnonymizerError> {
        let output_path = output_path.to_string();
        self.blocking(move |inner| inner.dump(&output_path)).await
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_args_use_long_flags() {
        let inner = Inner {
            params: ConnectionParams {
                host: Some("db.internal".to_string()),
                port: Some("5433".to_string()),
                user: Some("postgres".to_string()),
                password: Some("hunter2".to_string()),
                name: "workdb".to_string(),
            },
            cmd_opts: Vec::new(),
            dump_opts: Vec::new(),
        };
        assert_eq!(
            inner.client_args(&inner.cmd_opts),
            vec![
                "--host".to_string(),
                "db.internal".to_string(),
                "--port".to_string(),
                "5433".to_string(),
                "--username".to_string(),
                "postgres".to_string(),
            ]
        );
    }

    #[test]
    fn test_password_never_lands_in_argv() {
        let inner = Inner {
            params: ConnectionParams {
                host: None,
                port: None,
                user: None,
                password: Some("hunter2".to_string()),
                name: "workdb".to_string(),
            },
            cmd_opts: Vec::new(),
            dump_opts: Vec::new(),
        };
        let rendered = inner.cmd_tool().masked_command_line();
        assert!(!rendered.contains("hunter2"));
        assert!(inner.client_args(&inner.cmd_opts).is_empty());
    }

    #[test]
    fn test_absent_fields_add_no_flags() {
        let inner = Inner {
            params: ConnectionParams {
                host: None,
                port: None,
                user: None,
                password: None,
                name: "workdb".to_string(),
            },
            cmd_opts: Vec::new(),
            dump_opts: Vec::new(),
        };
        assert!(inner.client_args(&inner.cmd_opts).is_empty());
    }
}
