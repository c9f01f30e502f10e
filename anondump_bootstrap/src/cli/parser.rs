// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Structure
//!
//! The clap definition of the command line. Every flag can also be supplied
//! by an `ANONDUMP_`-prefixed environment variable (upper-snake-case flag
//! name); precedence is flag over environment over default.

use clap::{ArgAction, Parser};

/// A tool for producing anonymized dumps of production databases.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "anondump",
    version,
    about = "Produce an anonymized dump of a database from a production dump, using declarative per-column rewriting rules."
)]
pub struct Cli {
    /// The source dump filepath to read from. Use `-` for stdin.
    #[arg(long, short = 'i', env = "ANONDUMP_INPUT", value_name = "PATH")]
    pub input: Option<String>,

    /// A strategyfile to use during anonymization.
    #[arg(long, short = 's', env = "ANONDUMP_STRATEGY", value_name = "PATH")]
    pub strategy: Option<String>,

    /// The destination filepath to write the dumped output to. Use `-` for stdout.
    #[arg(long, short = 'o', env = "ANONDUMP_OUTPUT", value_name = "PATH")]
    pub output: Option<String>,

    /// Type of database to interact with: mysql, postgres or mssql. Default: mysql.
    #[arg(long, short = 't', env = "ANONDUMP_DB_TYPE", value_name = "TYPE")]
    pub db_type: Option<String>,

    /// Database hostname or IP address.
    #[arg(long, short = 'd', env = "ANONDUMP_DB_HOST", value_name = "HOST")]
    pub db_host: Option<String>,

    /// Database port. Defaults to the backend's default.
    #[arg(long, short = 'P', env = "ANONDUMP_DB_PORT", value_name = "PORT")]
    pub db_port: Option<String>,

    /// Name of the working database to restore and anonymize in. If not
    /// provided, a unique name is generated from the strategy name; the
    /// database is dropped at the end of the run.
    #[arg(long, short = 'n', env = "ANONDUMP_DB_NAME", value_name = "NAME")]
    pub db_name: Option<String>,

    /// Database credentials: username. Falls through to the backend's
    /// native credential sources when absent.
    #[arg(long, short = 'u', env = "ANONDUMP_DB_USER", value_name = "USER")]
    pub db_user: Option<String>,

    /// Database credentials: password. Falls through to the backend's
    /// native credential sources when absent.
    #[arg(long, short = 'p', env = "ANONDUMP_DB_PASSWORD", value_name = "PASSWORD")]
    pub db_password: Option<String>,

    /// Locale for fake data generation. Deprecated: use the `locale:` key
    /// in your strategyfile instead.
    #[arg(long, short = 'l', env = "ANONDUMP_FAKE_LOCALE", value_name = "LOCALE")]
    pub fake_locale: Option<String>,

    /// Step to begin the process at (inclusive).
    #[arg(long = "start-at", env = "ANONDUMP_START_AT", value_name = "STEP")]
    pub start_at: Option<String>,

    /// Step to stop the process at (inclusive).
    #[arg(long = "stop-at", env = "ANONDUMP_STOP_AT", value_name = "STEP")]
    pub stop_at: Option<String>,

    /// Perform exactly one step.
    #[arg(long, env = "ANONDUMP_ONLY_STEP", value_name = "STEP")]
    pub only_step: Option<String>,

    /// One or more steps to skip.
    #[arg(
        long,
        env = "ANONDUMP_SKIP_STEPS",
        value_name = "STEP",
        value_delimiter = ',',
        num_args = 1..
    )]
    pub skip_steps: Vec<String>,

    /// Skip all process steps. Useful for testing safely.
    #[arg(long, env = "ANONDUMP_DRY_RUN")]
    pub dry_run: bool,

    /// Worker-pool width for table-level anonymization.
    #[arg(long, env = "ANONDUMP_WORKERS", value_name = "N", default_value_t = 1)]
    pub workers: usize,

    /// Number of rows to populate the fake-data seed table with.
    #[arg(long, env = "ANONDUMP_SEED_ROWS", value_name = "N", default_value_t = 150)]
    pub seed_rows: usize,

    /// Ignore errors during the anonymization process and continue.
    #[arg(long, env = "ANONDUMP_IGNORE_ANONYMIZATION_ERRORS")]
    pub ignore_anonymization_errors: bool,

    /// Increase logging verbosity, to help when troubleshooting issues.
    #[arg(long, env = "ANONDUMP_VERBOSE")]
    pub verbose: bool,

    /// [MYSQL] Pass additional arguments to the restore process (advanced use only!).
    #[arg(long, env = "ANONDUMP_MYSQL_CMD_OPTS", value_name = "OPTS")]
    pub mysql_cmd_opts: Option<String>,

    /// [MYSQL] Pass additional arguments to the dump process (advanced use only!).
    #[arg(long, env = "ANONDUMP_MYSQL_DUMP_OPTS", value_name = "OPTS")]
    pub mysql_dump_opts: Option<String>,

    /// [POSTGRES] Pass additional arguments to the restore process (advanced use only!).
    #[arg(long, env = "ANONDUMP_POSTGRES_CMD_OPTS", value_name = "OPTS")]
    pub postgres_cmd_opts: Option<String>,

    /// [POSTGRES] Pass additional arguments to the dump process (advanced use only!).
    #[arg(long, env = "ANONDUMP_POSTGRES_DUMP_OPTS", value_name = "OPTS")]
    pub postgres_dump_opts: Option<String>,

    /// [MSSQL] Connection string; user-supplied keys are preserved verbatim.
    #[arg(long, env = "ANONDUMP_MSSQL_CONNECTION_STRING", value_name = "STRING")]
    pub mssql_connection_string: Option<String>,

    /// [MSSQL] Accepted for compatibility; the TDS driver is built in.
    #[arg(long, env = "ANONDUMP_MSSQL_DRIVER", value_name = "DRIVER")]
    pub mssql_driver: Option<String>,

    /// [MSSQL] Use compression when backing up the database.
    #[arg(long, env = "ANONDUMP_MSSQL_BACKUP_COMPRESSION")]
    pub mssql_backup_compression: bool,

    /// [MSSQL] Wrap anonymization UPDATEs in SET ANSI_WARNINGS OFF/ON so
    /// oversized fake values truncate instead of aborting the batch.
    #[arg(
        long,
        env = "ANONDUMP_MSSQL_ANSI_WARNINGS_OFF",
        value_name = "BOOL",
        action = ArgAction::Set,
        default_value_t = true
    )]
    pub mssql_ansi_warnings_off: bool,

    /// [MSSQL] Connection/handshake timeout in seconds.
    #[arg(long, env = "ANONDUMP_MSSQL_TIMEOUT", value_name = "SECONDS")]
    pub mssql_timeout: Option<u64>,
}

/// Parses the command line (and environment fallbacks) into a [`Cli`].
///
/// Clap handles `--help` and `--version` itself and exits the process.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
