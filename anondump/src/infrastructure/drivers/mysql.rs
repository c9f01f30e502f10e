// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # MySQL Driver
//!
//! A command-line based MySQL driver. Uses `mysql` and `mysqldump` because
//! of the efficiency of piping mass amounts of SQL through the client;
//! the trade-off is limited feedback when things go wrong.
//!
//! Connection flags are only added for fields the caller supplied, so absent
//! credentials fall through to `.my.cnf`. User-supplied extra options
//! (`--mysql-cmd-opts`, `--mysql-dump-opts`) are shell-split and spliced
//! into the argv of the respective tool. Every statement spawns its own
//! client process, which is what lets the engine's table workers run
//! concurrently without sharing a session.

use std::sync::Arc;
use std::time::Duration;

use anondump_domain::{AnonymizerError, DatabaseDriver, QueryFactory};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::infrastructure::drivers::subprocess::{require_tool, split_extra_opts, ClientTool};
use crate::infrastructure::drivers::{BackendOptions, ConnectionParams};
use crate::infrastructure::io::{copy_stream, resolve_input, resolve_output};
use crate::infrastructure::sql::mysql::{MySqlQueryFactory, DUMPSIZE_ESTIMATE_INFLATION};

const MYSQL: &str = "mysql";
const MYSQLDUMP: &str = "mysqldump";

// A short settle window between the last UPDATE and a transactional dump.
const SETTLE_AFTER_ANONYMIZE: Duration = Duration::from_millis(200);

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
            args.push("--user".to_string());
            args.push(user.to_string());
        }
        if let Some(password) = non_empty(&self.params.password) {
            args.push(format!("-p{}", password));
        }
        args.extend(extra.iter().cloned());
        args
    }

    fn cmd_tool(&self) -> ClientTool {
        ClientTool::new(MYSQL)
            .args(self.client_args(&self.cmd_opts))
            .mask_secret(self.params.password.clone().unwrap_or_default())
    }

    fn dump_tool(&self) -> ClientTool {
        ClientTool::new(MYSQLDUMP)
            .args(self.client_args(&self.dump_opts))
            .mask_secret(self.params.password.clone().unwrap_or_default())
    }

    fn execute(&self, statement: &str) -> Result<String, AnonymizerError> {
        self.cmd_tool().arg("--execute").arg(statement).run_capture()
    }

    fn db_execute(&self, statement: &str) -> Result<String, AnonymizerError> {
        self.cmd_tool()
            .arg(&self.params.name)
            .arg("--execute")
            .arg(statement)
            .run_capture()
    }

    fn single_result(&self, statement: &str) -> Result<String, AnonymizerError> {
        self.cmd_tool()
            .arg("-sN")
            .arg(&self.params.name)
            .arg("--execute")
            .arg(statement)
            .run_capture()
    }

    fn restore(&self, input_path: &str) -> Result<(), AnonymizerError> {
        let source = resolve_input(input_path)?;
        let size = source.size();
        let mut reader = source.open()?;

        let tool = self.cmd_tool().arg(&self.params.name);
        let mut child = tool.spawn_writer()?;
        {
            let stdin = child
                .stdin
                .as_mut()
                .ok_or_else(|| AnonymizerError::dependency(MYSQL, "failed to open restore pipe"))?;
            copy_stream(&mut reader, stdin, size, "Restoring")?;
        }
        drop(child.stdin.take());
        tool.finish(child)
    }

    fn dump(&self, output_path: &str, size_estimate: Option<u64>) -> Result<(), AnonymizerError> {
        let target = resolve_output(output_path)?;
        let mut writer = target.open()?;

        let tool = self.dump_tool().arg(&self.params.name);
        let mut child = tool.spawn_reader()?;
        {
            let stdout = child
                .stdout
                .as_mut()
                .ok_or_else(|| AnonymizerError::dependency(MYSQLDUMP, "failed to open dump pipe"))?;
            copy_stream(stdout, &mut writer, size_estimate, "Dumping")?;
        }
        drop(child.stdout.take());
        tool.finish(child)?;
        writer.finish()
    }
}

/// MySQL implementation of the driver port.
pub struct MySqlDriver {
    inner: Arc<Inner>,
    factory: MySqlQueryFactory,
}

impl MySqlDriver {
    /// Creates the driver, failing fast when the client tools are missing
    /// or the extra options cannot be shell-split.
    pub fn new(params: ConnectionParams, options: &BackendOptions) -> Result<Self, AnonymizerError> {
        require_tool(MYSQL)?;
        require_tool(MYSQLDUMP)?;

        let cmd_opts = split_extra_opts(options.mysql_cmd_opts.as_deref())?;
        let dump_opts = split_extra_opts(options.mysql_dump_opts.as_deref())?;

        Ok(Self {
            inner: Arc::new(Inner {
                params,
                cmd_opts,
                dump_opts,
            }),
            factory: MySqlQueryFactory,
        })
    }

    /// Makes a guess at the dump size using internal database metrics.
    /// `None` when the server reports nothing usable.
    async fn estimate_dump_size(&self) -> Option<u64> {
        let statement = self
            .factory
            .dump_size_estimate(&self.inner.params.name)?;
        let raw = self.single_result(&statement).await.ok()?;
        let bytes: f64 = raw.trim().parse().ok()?;
        Some((bytes * DUMPSIZE_ESTIMATE_INFLATION) as u64)
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
impl DatabaseDriver for MySqlDriver {
    fn query_factory(&self) -> &dyn QueryFactory {
        &self.factory
    }

    async fn test_connection(&self) -> bool {
        self.blocking(|inner| inner.execute("SELECT @@VERSION;")).await.is_ok()
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
        let statements = self.factory.drop_database(&self.inner.params.name);
        self.execute(&statements).await
    }

    async fn restore_database(&self, input_path: &str) -> Result<(), AnonymizerError> {
        let input_path = input_path.to_string();
        self.blocking(move |inner| inner.restore(&input_path)).await
    }

    async fn dump_database(&self, output_path: &str) -> Result<(), AnonymizerError> {
        let size_estimate = self.estimate_dump_size().await;
        if let Some(bytes) = size_estimate {
            info!("estimated dump size: {} bytes", bytes);
        }
        let output_path = output_path.to_string();
        self.blocking(move |inner| inner.dump(&output_path, size_estimate)).await
    }

    async fn settle_after_anonymize(&self) {
        // Prevent trailing UPDATE transactions from interacting with a
        // transactional dump that starts immediately afterwards.
        debug!("waiting for trailing operations to complete...");
        tokio::time::sleep(SETTLE_AFTER_ANONYMIZE).await;
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}
