// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Run Command
//!
//! The fully-validated input of one anonymization run, assembled by the
//! bootstrap layer from CLI flags, environment variables and defaults.
//! Whether each path/name is actually *required* depends on which steps are
//! active, so requiredness is checked by the use case, not here.

use anondump_bootstrap::ValidatedCli;
use anondump_domain::{ProcessStep, SeedRowCount, WorkerCount};

use crate::infrastructure::drivers::BackendOptions;

/// Configuration for one run of the process pipeline.
#[derive(Debug, Clone)]
pub struct RunCommand {
    pub input: Option<String>,
    pub strategy: Option<String>,
    pub output: Option<String>,
    pub db_type: String,
    pub db_host: Option<String>,
    pub db_port: Option<String>,
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub fake_locale: Option<String>,
    pub start_at: Option<ProcessStep>,
    pub stop_at: Option<ProcessStep>,
    pub only_step: Option<ProcessStep>,
    pub skip_steps: Vec<ProcessStep>,
    pub dry_run: bool,
    pub workers: WorkerCount,
    pub seed_rows: SeedRowCount,
    pub ignore_anonymization_errors: bool,
    pub backend: BackendOptions,
}

impl Default for RunCommand {
    fn default() -> Self {
        Self {
            input: None,
            strategy: None,
            output: None,
            db_type: "mysql".to_string(),
            db_host: None,
            db_port: None,
            db_name: None,
            db_user: None,
            db_password: None,
            fake_locale: None,
            start_at: None,
            stop_at: None,
            only_step: None,
            skip_steps: Vec::new(),
            dry_run: false,
            workers: WorkerCount::default(),
            seed_rows: SeedRowCount::default(),
            ignore_anonymization_errors: false,
            backend: BackendOptions::default(),
        }
    }
}

impl From<ValidatedCli> for RunCommand {
    fn from(cli: ValidatedCli) -> Self {
        Self {
            input: cli.input,
            strategy: cli.strategy,
            output: cli.output,
            db_type: cli.db_type,
            db_host: cli.db_host,
            db_port: cli.db_port,
            db_name: cli.db_name,
            db_user: cli.db_user,
            db_password: cli.db_password,
            fake_locale: cli.fake_locale,
            start_at: cli.start_at,
            stop_at: cli.stop_at,
            only_step: cli.only_step,
            skip_steps: cli.skip_steps,
            dry_run: cli.dry_run,
            workers: cli.workers,
            seed_rows: cli.seed_rows,
            ignore_anonymization_errors: cli.ignore_anonymization_errors,
            backend: BackendOptions {
                mysql_cmd_opts: cli.mysql_cmd_opts,
                mysql_dump_opts: cli.mysql_dump_opts,
                postgres_cmd_opts: cli.postgres_cmd_opts,
                postgres_dump_opts: cli.postgres_dump_opts,
                mssql_connection_string: cli.mssql_connection_string,
                mssql_driver: cli.mssql_driver,
                mssql_backup_compression: cli.mssql_backup_compression,
                mssql_ansi_warnings_off: cli.mssql_ansi_warnings_off,
                mssql_timeout: cli.mssql_timeout,
            },
        }
    }
}
