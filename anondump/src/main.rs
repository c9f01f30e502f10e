// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Anondump Binary
//!
//! Process entry point: wires bootstrap (env, CLI, logging, signals) to the
//! run-process use case and maps the outcome onto the exit contract.

use anondump::application::commands::RunCommand;
use anondump::application::use_cases::RunProcessUseCase;
use anondump_bootstrap::{exit_code_for, install_signal_handler, load_dotenv, logger, parse_cli, validate_cli};
use anondump_domain::AnonymizerError;
use tracing::error;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    // .env first: the CLI's environment fallbacks must see it.
    load_dotenv();
    let cli = parse_cli();
    logger::init(cli.verbose);

    let validated = match validate_cli(cli) {
        Ok(validated) => validated,
        Err(err) => return report(&err),
    };

    let shutdown = install_signal_handler();
    let use_case = RunProcessUseCase::new(shutdown);
    let command = RunCommand::from(validated);

    match use_case.execute(command).await {
        Ok(()) => anondump_bootstrap::ExitCode::Success.into(),
        Err(err) => report(&err),
    }
}

fn report(err: &AnonymizerError) -> std::process::ExitCode {
    match err {
        AnonymizerError::ArgumentValidation(messages) => {
            error!(
                "Missing or invalid values for required arguments:\n{}\nSet these using the command-line options or with environment variables. See --help for a complete list.",
                messages.join("\n")
            );
        }
        AnonymizerError::UnsupportedFakeType(fake_type) => {
            error!(
                "There was an error while parsing the strategyfile. Unknown fake type: {}\nThis happens when a fake_update column strategy is used with a generator that doesn't exist.",
                fake_type
            );
        }
        AnonymizerError::DatabaseConnection(detail) => {
            error!("Failed to connect to database: {}", detail);
        }
        other => error!("{}", other),
    }
    exit_code_for(err).into()
}
