// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Validation
//!
//! Converts the raw [`Cli`](super::parser::Cli) into a [`ValidatedCli`]
//! holding domain values: step names resolved to [`ProcessStep`], counts
//! wrapped in their validated value objects, and legacy unprefixed
//! environment variables folded in (with deprecation warnings) where the
//! prefixed form is absent.

use anondump_domain::{AnonymizerError, ProcessStep, SeedRowCount, WorkerCount};
use tracing::warn;

use super::parser::Cli;

/// Legacy unprefixed environment variables, honored only when the prefixed
/// form (and the flag) is absent.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("DB_TYPE", "ANONDUMP_DB_TYPE"),
    ("DB_HOST", "ANONDUMP_DB_HOST"),
    ("DB_NAME", "ANONDUMP_DB_NAME"),
    ("DB_USER", "ANONDUMP_DB_USER"),
    ("DB_PASS", "ANONDUMP_DB_PASSWORD"),
    ("FAKE_LOCALE", "ANONDUMP_FAKE_LOCALE"),
];

/// CLI arguments after validation and legacy-environment resolution.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
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
    pub verbose: bool,
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

/// Validates parsed CLI arguments.
///
/// # Errors
///
/// [`AnonymizerError::ArgumentValidation`] listing every invalid value; the
/// caller prints the list and exits 2.
pub fn validate_cli(cli: Cli) -> Result<ValidatedCli, AnonymizerError> {
    warn_deprecated_env();

    let mut messages = Vec::new();

    let start_at = parse_step(cli.start_at.as_deref(), "--start-at", &mut messages);
    let stop_at = parse_step(cli.stop_at.as_deref(), "--stop-at", &mut messages);
    let only_step = parse_step(cli.only_step.as_deref(), "--only-step", &mut messages);

    let mut skip_steps = Vec::new();
    for raw in &cli.skip_steps {
        match ProcessStep::from_name(raw) {
            Some(step) => skip_steps.push(step),
            None => messages.push(unknown_step_message("--skip-steps", raw)),
        }
    }

    let workers = match WorkerCount::new(cli.workers) {
        Ok(workers) => workers,
        Err(_) => {
            messages.push("workers must be at least 1".to_string());
            WorkerCount::default()
        }
    };
    let seed_rows = match SeedRowCount::new(cli.seed_rows) {
        Ok(seed_rows) => seed_rows,
        Err(_) => {
            messages.push("seed-rows must be at least 1".to_string());
            SeedRowCount::default()
        }
    };

    if cli.fake_locale.is_some() {
        warn!("the -l/--fake-locale option is deprecated; use the locale: key in your strategyfile instead");
    }

    if !messages.is_empty() {
        return Err(AnonymizerError::ArgumentValidation(messages));
    }

    Ok(ValidatedCli {
        input: cli.input,
        strategy: cli.strategy,
        output: cli.output,
        db_type: cli
            .db_type
            .or_else(|| legacy_env("DB_TYPE"))
            .unwrap_or_else(|| "mysql".to_string()),
        db_host: cli.db_host.or_else(|| legacy_env("DB_HOST")),
        db_port: cli.db_port,
        db_name: cli.db_name.or_else(|| legacy_env("DB_NAME")),
        db_user: cli.db_user.or_else(|| legacy_env("DB_USER")),
        db_password: cli.db_password.or_else(|| legacy_env("DB_PASS")),
        fake_locale: cli.fake_locale.or_else(|| legacy_env("FAKE_LOCALE")),
        start_at,
        stop_at,
        only_step,
        skip_steps,
        dry_run: cli.dry_run,
        workers,
        seed_rows,
        ignore_anonymization_errors: cli.ignore_anonymization_errors,
        verbose: cli.verbose,
        mysql_cmd_opts: cli.mysql_cmd_opts,
        mysql_dump_opts: cli.mysql_dump_opts,
        postgres_cmd_opts: cli.postgres_cmd_opts,
        postgres_dump_opts: cli.postgres_dump_opts,
        mssql_connection_string: cli.mssql_connection_string,
        mssql_driver: cli.mssql_driver,
        mssql_backup_compression: cli.mssql_backup_compression,
        mssql_ansi_warnings_off: cli.mssql_ansi_warnings_off,
        mssql_timeout: cli.mssql_timeout,
    })
}

fn parse_step(raw: Option<&str>, flag: &str, messages: &mut Vec<String>) -> Option<ProcessStep> {
    let raw = raw?;
    match ProcessStep::from_name(raw) {
        Some(step) => Some(step),
        None => {
            messages.push(unknown_step_message(flag, raw));
            None
        }
    }
}

fn unknown_step_message(flag: &str, raw: &str) -> String {
    format!(
        "{}: unknown step `{}` (expected one of {})",
        flag,
        raw,
        ProcessStep::names().join(", ")
    )
}

fn legacy_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn warn_deprecated_env() {
    for (old, new) in LEGACY_ENV {
        if std::env::var_os(old).is_some() {
            warn!("environment variable ${} is deprecated. Use ${}", old, new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("anondump").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_step_names_resolve_case_insensitively() {
        let validated = validate_cli(cli(&["--start-at", "restore_db", "--stop-at", "DUMP_DB"])).unwrap();
        assert_eq!(validated.start_at, Some(ProcessStep::RestoreDb));
        assert_eq!(validated.stop_at, Some(ProcessStep::DumpDb));
    }

    #[test]
    fn test_unknown_step_collected_as_validation_message() {
        let err = validate_cli(cli(&["--start-at", "TELEPORT_DB"])).unwrap_err();
        let AnonymizerError::ArgumentValidation(messages) = err else {
            panic!("expected ArgumentValidation");
        };
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("TELEPORT_DB"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = validate_cli(cli(&["--workers", "0"])).unwrap_err();
        assert!(matches!(err, AnonymizerError::ArgumentValidation(_)));
    }

    #[test]
    fn test_db_type_defaults_to_mysql() {
        let validated = validate_cli(cli(&[])).unwrap();
        assert_eq!(validated.db_type, "mysql");
    }

    #[test]
    fn test_skip_steps_resolved() {
        let validated = validate_cli(cli(&["--skip-steps", "ANONYMIZE_DB,DROP_DB"])).unwrap();
        assert_eq!(validated.skip_steps, vec![ProcessStep::AnonymizeDb, ProcessStep::DropDb]);
    }
}
