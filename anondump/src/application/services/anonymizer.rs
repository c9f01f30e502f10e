// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Anonymization Engine
//!
//! Orchestrates the ANONYMIZE_DB phase against a restored working database:
//!
//! 1. Build the qualifier map over every fake-update column and, when it is
//!    non-empty, create and populate the seed table.
//! 2. Run before-scripts, in order.
//! 3. Dispatch per-table work to a bounded worker pool.
//! 4. Aggregate per-table errors; raise them unless told to ignore.
//! 5. Run after-scripts, in order.
//! 6. Drop the seed table.
//!
//! ## Phase ordering
//!
//! Create-seed strictly precedes every insert-seed; every insert-seed
//! strictly precedes every table operation; every table operation strictly
//! precedes drop-seed. Before-scripts precede all table work; after-scripts
//! follow all of it. *Within* the table phase, execution order across tables
//! is unspecified; strategy scripts must not rely on it.
//!
//! ## Concurrency
//!
//! Table strategies are independent work items. A semaphore bounds the pool
//! to exactly the configured worker count; each permit holder executes one
//! table strategy start-to-finish. The driver gives each call its own client
//! process or session, so workers never share a connection. Errors do not
//! halt sibling workers; they are collected and reported after the phase.
//!
//! The seed table is written once before any worker starts and is read-only
//! during table work, so no locking beyond the backend's row semantics is
//! needed. The fake generator is only invoked during (single-threaded)
//! seeding.

use std::sync::Arc;

use anondump_domain::{
    AnonymizerError, DatabaseDriver, DatabaseStrategy, FakeColumnGenerator, FakeSpec, SeedColumn, SeedRowCount,
    SeedValue, TableError, TableStrategy, TableStrategyKind, WorkerCount, SEED_TABLE_NAME,
};
use indexmap::IndexMap;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Longest prefix of a script echoed into the log.
const SCRIPT_PREVIEW_LEN: usize = 50;

/// The ANONYMIZE_DB phase orchestrator.
pub struct AnonymizationEngine {
    driver: Arc<dyn DatabaseDriver>,
    generator: Arc<dyn FakeColumnGenerator>,
    workers: WorkerCount,
    seed_rows: SeedRowCount,
    ignore_anonymization_errors: bool,
}

impl AnonymizationEngine {
    pub fn new(
        driver: Arc<dyn DatabaseDriver>,
        generator: Arc<dyn FakeColumnGenerator>,
        workers: WorkerCount,
        seed_rows: SeedRowCount,
        ignore_anonymization_errors: bool,
    ) -> Self {
        Self {
            driver,
            generator,
            workers,
            seed_rows,
            ignore_anonymization_errors,
        }
    }

    /// Anonymizes the working database according to `strategy`.
    ///
    /// # Errors
    ///
    /// [`AnonymizerError::Anonymization`] aggregating every failed table
    /// (unless ignoring anonymization errors), or the first error from
    /// seeding or script execution.
    pub async fn anonymize(&self, strategy: Arc<DatabaseStrategy>) -> Result<(), AnonymizerError> {
        let qualifier_map = strategy.fake_update_qualifier_map();
        if !qualifier_map.is_empty() {
            self.seed(&qualifier_map).await?;
        }

        self.run_scripts(&strategy.before_scripts, "before").await?;

        info!("anonymizing {} tables", strategy.tables.len());
        let errors = self.anonymize_tables(&strategy).await;
        if !errors.is_empty() {
            if self.ignore_anonymization_errors {
                for error in &errors {
                    warn!("ignoring anonymization error on {}: {}", error.table, error.message);
                }
            } else {
                return Err(AnonymizerError::Anonymization(errors));
            }
        }

        self.run_scripts(&strategy.after_scripts, "after").await?;

        info!("dropping seed table");
        let drop_seed = self.driver.query_factory().drop_seed_table(SEED_TABLE_NAME);
        self.driver.db_execute(&[drop_seed]).await?;

        self.driver.settle_after_anonymize().await;
        Ok(())
    }

    /// Seeds the working database with pre-generated random records so the
    /// table phase can run set-based updates against them.
    async fn seed(&self, qualifier_map: &IndexMap<String, FakeSpec>) -> Result<(), AnonymizerError> {
        info!("creating seed table with {} columns", qualifier_map.len());
        let columns: Vec<SeedColumn> = qualifier_map
            .iter()
            .map(|(qualifier, spec)| SeedColumn {
                qualifier: qualifier.clone(),
                data_type: spec.data_type(),
            })
            .collect();
        let create = self
            .driver
            .query_factory()
            .create_seed_table(SEED_TABLE_NAME, &columns)?;
        self.driver.db_execute(&[create]).await?;

        info!("inserting {} seed rows", self.seed_rows);
        for row_index in 0..self.seed_rows.get() {
            // One generator call per row and column: every seed row is an
            // independent sample.
            let row: Vec<SeedValue> = qualifier_map
                .iter()
                .map(|(qualifier, spec)| {
                    Ok(SeedValue {
                        qualifier: qualifier.clone(),
                        value: self.generator.value(spec.method(), spec.args())?,
                    })
                })
                .collect::<Result<_, AnonymizerError>>()?;

            debug!("inserting seed row {}", row_index);
            let insert = self.driver.query_factory().insert_seed_row(SEED_TABLE_NAME, &row);
            self.driver.db_execute(&[insert]).await?;
        }
        Ok(())
    }

    async fn run_scripts(&self, scripts: &[String], title: &str) -> Result<(), AnonymizerError> {
        for (index, script) in scripts.iter().enumerate() {
            let preview: String = script.chars().take(SCRIPT_PREVIEW_LEN).collect();
            info!("running {} script #{} \"{}\"", title, index, preview);
            let outputs = self.driver.db_execute(std::slice::from_ref(script)).await?;
            for output in outputs {
                if !output.trim().is_empty() {
                    info!("{}", output.trim_end());
                }
            }
        }
        Ok(())
    }

    /// Runs every table strategy to completion on a bounded worker pool,
    /// collecting failures instead of aborting siblings.
    async fn anonymize_tables(&self, strategy: &DatabaseStrategy) -> Vec<TableError> {
        let semaphore = Arc::new(Semaphore::new(self.workers.get()));
        let mut tasks: JoinSet<Option<TableError>> = JoinSet::new();

        for table in &strategy.tables {
            let driver = self.driver.clone();
            let semaphore = semaphore.clone();
            let table = table.clone();

            tasks.spawn(async move {
                // A closed semaphore cannot happen; it lives as long as the
                // task set.
                let _permit = semaphore.acquire_owned().await.ok()?;
                let name = table.qualified_name();
                debug!("anonymizing {}", name);
                match anonymize_table(driver, &table).await {
                    Ok(()) => None,
                    Err(error) => Some(TableError {
                        table: name,
                        message: error.to_string(),
                    }),
                }
            });
        }

        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(error)) => {
                    warn!("error while anonymizing table {}: {}", error.table, error.message);
                    errors.push(error);
                }
                Ok(None) => {}
                Err(join_error) => errors.push(TableError {
                    table: "<worker>".to_string(),
                    message: join_error.to_string(),
                }),
            }
        }
        errors
    }
}

async fn anonymize_table(driver: Arc<dyn DatabaseDriver>, table: &TableStrategy) -> Result<(), AnonymizerError> {
    let factory = driver.query_factory();

    if table.schema.is_some() && !factory.supports_schema() {
        warn!(
            "{}: this backend does not support table schema; the option is ignored",
            table.table_name
        );
    }

    let statements = match &table.kind {
        TableStrategyKind::Truncate => vec![factory.truncate_table(table)],
        TableStrategyKind::Delete => vec![factory.delete_table(table)],
        TableStrategyKind::UpdateColumns(_) => factory.update_table(SEED_TABLE_NAME, table)?,
    };

    driver.db_execute(&statements).await?;
    Ok(())
}
