// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Run Process Use Case
//!
//! Drives one complete anonymization run through the step lifecycle:
//!
//! ```text
//! CREATE_DB → RESTORE_DB → ANONYMIZE_DB → DUMP_DB → DROP_DB
//! ```
//!
//! The [`StepActionMap`] is computed once from the process-control flags and
//! each step's action (run or skip, with reasons) is logged as the step
//! comes up.
//!
//! ## Fail-fast ordering
//!
//! Everything that can be validated without touching the database happens
//! before any destructive step: step-aware argument validation, strategy
//! parsing (including fake-generator capability checks), driver
//! construction (client tools on `$PATH`), and a connection test. A dry run
//! stops after the connection test, which is the only driver call a dry run
//! may issue.
//!
//! ## Cleanup on failure
//!
//! Once CREATE_DB has run, a failure in a later step still attempts
//! DROP_DB (unless that step was explicitly skipped) so working databases
//! are not leaked. Cancellation is observed between steps only; a running
//! statement is never interrupted mid-flight.

use std::sync::Arc;

use anondump_bootstrap::shutdown::ShutdownFlag;
use anondump_domain::{
    read_generator_overrides, AnonymizerError, DatabaseDriver, DatabaseStrategy, FakeColumnGenerator, ProcessStep,
    StepActionMap, StrategyParser,
};
use tracing::{error, info, warn};

use crate::application::commands::RunCommand;
use crate::application::services::AnonymizationEngine;
use crate::infrastructure::drivers::{create_driver, BackendOptions, ConnectionParams};
use crate::infrastructure::fake::{FakerColumnGenerator, DEFAULT_LOCALE};
use crate::infrastructure::strategy_file;

/// Pluggable driver construction, for tests that substitute a recording
/// driver.
pub type DriverFactory = Box<
    dyn Fn(&str, ConnectionParams, &BackendOptions) -> Result<Arc<dyn DatabaseDriver>, AnonymizerError>
        + Send
        + Sync,
>;

/// Use case for running the anonymization process end to end.
pub struct RunProcessUseCase {
    shutdown: ShutdownFlag,
    driver_factory: DriverFactory,
}

impl RunProcessUseCase {
    /// Creates the use case with the real backend drivers.
    pub fn new(shutdown: ShutdownFlag) -> Self {
        Self::with_driver_factory(
            shutdown,
            Box::new(|db_type, params, options| create_driver(db_type, params, options)),
        )
    }

    /// Creates the use case with a custom driver factory.
    pub fn with_driver_factory(shutdown: ShutdownFlag, driver_factory: DriverFactory) -> Self {
        Self {
            shutdown,
            driver_factory,
        }
    }

    /// Executes one run.
    pub async fn execute(&self, mut command: RunCommand) -> Result<(), AnonymizerError> {
        let actions = StepActionMap::new(
            command.start_at,
            command.stop_at,
            &command.skip_steps,
            command.dry_run,
            command.only_step,
        );

        self.validate_arguments(&mut command, &actions)?;

        // Strategy parsing relies on I/O; failing here is preferred to
        // failing after a restore.
        let strategy = if !actions.skipped(ProcessStep::AnonymizeDb) {
            Some(self.load_strategy(&command)?)
        } else {
            None
        };

        let db_name = command
            .db_name
            .clone()
            .unwrap_or_default();
        let params = ConnectionParams {
            host: command.db_host.clone(),
            port: command.db_port.clone(),
            user: command.db_user.clone(),
            password: command.db_password.clone(),
            name: db_name.clone(),
        };
        info!(
            "database: ({}:{}){}@{} name: {}",
            command.db_host.as_deref().unwrap_or("-"),
            command.db_port.as_deref().unwrap_or("-"),
            command.db_type,
            command.db_user.as_deref().unwrap_or("-"),
            db_name
        );
        let driver = (self.driver_factory)(&command.db_type, params, &command.backend)?;

        if !driver.test_connection().await {
            return Err(AnonymizerError::connection(
                "the database server did not accept a test connection",
            ));
        }

        // Main process: no destructive, non-retryable actions above this line.
        let mut creation_ran = false;
        let result = self
            .run_steps(&command, &actions, driver.clone(), strategy, &mut creation_ran)
            .await;

        if let Err(run_error) = result {
            if creation_ran && !actions.skipped(ProcessStep::DropDb) {
                warn!("run failed; dropping working database {}", db_name);
                if let Err(drop_error) = driver.drop_database().await {
                    error!("failed to drop working database {}: {}", db_name, drop_error);
                }
            }
            return Err(run_error);
        }

        info!("{}", actions.summary(ProcessStep::DropDb));
        if !actions.skipped(ProcessStep::DropDb) {
            driver.drop_database().await?;
        }

        info!("process complete!");
        Ok(())
    }

    /// Step-aware argument validation: each path is only required when the
    /// step consuming it will actually run. Also resolves a fresh working
    /// database name when anonymization is active and none was given.
    fn validate_arguments(&self, command: &mut RunCommand, actions: &StepActionMap) -> Result<(), AnonymizerError> {
        let mut validations = Vec::new();

        if !actions.skipped(ProcessStep::RestoreDb) && command.input.is_none() {
            validations.push("Missing INPUT".to_string());
        }

        if !actions.skipped(ProcessStep::AnonymizeDb) {
            match &command.strategy {
                None => validations.push("Missing STRATEGYFILE".to_string()),
                Some(strategy_path) => {
                    // Only auto-resolve the db name with a strategy file in
                    // hand AND anonymization active.
                    if command.db_name.is_none() {
                        command.db_name = Some(strategy_file::temp_db_name(strategy_path));
                    }
                }
            }
        }

        if !actions.skipped(ProcessStep::DumpDb) && command.output.is_none() {
            validations.push("Missing OUTPUT".to_string());
        }

        if command.db_name.is_none() {
            validations.push("Missing DB_NAME: Auto-resolve failed.".to_string());
        }

        if validations.is_empty() {
            Ok(())
        } else {
            Err(AnonymizerError::ArgumentValidation(validations))
        }
    }

    /// Loads, normalizes and validates the strategy file, constructing the
    /// fake generator the strategy's own `locale`/`providers` ask for. The
    /// engine later seeds with the same generator the parser validated
    /// against.
    fn load_strategy(
        &self,
        command: &RunCommand,
    ) -> Result<(Arc<DatabaseStrategy>, Arc<dyn FakeColumnGenerator>), AnonymizerError> {
        let strategy_path = command
            .strategy
            .as_deref()
            .ok_or_else(|| AnonymizerError::internal_error("strategy path missing after validation"))?;

        info!("loading strategyfile {}...", strategy_path);
        let config = strategy_file::read_config(strategy_path)?;

        let overrides = read_generator_overrides(&config)?;
        let locale = overrides
            .locale
            .or_else(|| command.fake_locale.clone())
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());
        let generator: Arc<dyn FakeColumnGenerator> =
            Arc::new(FakerColumnGenerator::new(&locale, &overrides.providers)?);

        let strategy = StrategyParser::new(generator.as_ref()).parse(&config)?;
        Ok((Arc::new(strategy), generator))
    }

    async fn run_steps(
        &self,
        command: &RunCommand,
        actions: &StepActionMap,
        driver: Arc<dyn DatabaseDriver>,
        strategy: Option<(Arc<DatabaseStrategy>, Arc<dyn FakeColumnGenerator>)>,
        creation_ran: &mut bool,
    ) -> Result<(), AnonymizerError> {
        self.check_cancelled()?;
        info!("{}", actions.summary(ProcessStep::CreateDb));
        if !actions.skipped(ProcessStep::CreateDb) {
            driver.create_database().await?;
            *creation_ran = true;
        }

        self.check_cancelled()?;
        info!("{}", actions.summary(ProcessStep::RestoreDb));
        if !actions.skipped(ProcessStep::RestoreDb) {
            let input = command
                .input
                .as_deref()
                .ok_or_else(|| AnonymizerError::internal_error("input path missing after validation"))?;
            driver.restore_database(input).await?;
        }

        self.check_cancelled()?;
        info!("{}", actions.summary(ProcessStep::AnonymizeDb));
        if !actions.skipped(ProcessStep::AnonymizeDb) {
            let (strategy, generator) = strategy
                .ok_or_else(|| AnonymizerError::internal_error("strategy missing after validation"))?;
            let engine = AnonymizationEngine::new(
                driver.clone(),
                generator,
                command.workers,
                command.seed_rows,
                command.ignore_anonymization_errors,
            );
            engine.anonymize(strategy).await?;
        }

        self.check_cancelled()?;
        info!("{}", actions.summary(ProcessStep::DumpDb));
        if !actions.skipped(ProcessStep::DumpDb) {
            let output = command
                .output
                .as_deref()
                .ok_or_else(|| AnonymizerError::internal_error("output path missing after validation"))?;
            driver.dump_database(output).await?;
        }

        self.check_cancelled()?;
        Ok(())
    }

    fn check_cancelled(&self) -> Result<(), AnonymizerError> {
        if self.shutdown.is_shutdown() {
            Err(AnonymizerError::Cancelled(
                "shutdown requested; stopping between steps".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
