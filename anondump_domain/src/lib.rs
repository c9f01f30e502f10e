// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Anondump Domain
//!
//! Pure business logic for the anondump anonymization system: the strategy
//! model and its parser, the process-step machinery, validated value objects,
//! and the ports (traits) the anonymization engine drives.
//!
//! ## Overview
//!
//! Anondump produces an anonymized dump of a relational database from a
//! source production dump. The flow restores the dump into a transient
//! working database, rewrites values according to a declarative per-column
//! strategy, dumps the working database to the destination, and drops the
//! working database. This crate holds everything about that flow that is
//! independent of any particular database backend or I/O mechanism:
//!
//! - **Strategy model**: immutable [`DatabaseStrategy`] /
//!   [`TableStrategy`] / [`ColumnStrategy`] value types describing what to do
//!   to each table and column.
//! - **Strategy parser**: [`StrategyParser`] normalizes the flexible
//!   user-authored configuration tree (shorthand and verbose forms) and
//!   validates it against a fake-value generator's capability set.
//! - **Process steps**: the ordered lifecycle
//!   (`START < CREATE_DB < RESTORE_DB < ANONYMIZE_DB < DUMP_DB < DROP_DB <
//!   END`) and the [`StepActionMap`] computed from start/stop/only/skip/dry-run
//!   flags.
//! - **Ports**: [`FakeColumnGenerator`] (value source),
//!   [`QueryFactory`] (pure SQL generation per backend) and
//!   [`DatabaseDriver`] (async I/O against a backend).
//!
//! ## Architecture Position
//!
//! The domain layer has no I/O and no runtime dependency. Infrastructure
//! implements the ports; the application layer orchestrates them. Everything
//! in this crate is safely shareable across worker threads after
//! construction.

pub mod entities;
pub mod error;
pub mod services;
pub mod value_objects;

// Re-export commonly used types at the crate root
pub use entities::database_strategy::DatabaseStrategy;
pub use error::{AnonymizerError, TableError};
pub use services::database_driver::DatabaseDriver;
pub use services::fake_generator::{FakeArg, FakeArgs, FakeColumnGenerator, FakeDataType, FakeValue};
pub use services::query_factory::{QueryFactory, SeedColumn, SeedValue, SEED_TABLE_NAME};
pub use services::strategy_parser::{read_generator_overrides, GeneratorOverrides, StrategyParser};
pub use value_objects::column_strategy::{ColumnStrategy, ColumnStrategyKind};
pub use value_objects::fake_spec::FakeSpec;
pub use value_objects::process_step::ProcessStep;
pub use value_objects::seed_row_count::SeedRowCount;
pub use value_objects::step_action::{SkipReason, StepAction, StepActionMap};
pub use value_objects::table_strategy::{TableStrategy, TableStrategyKind, UpdateColumns};
pub use value_objects::worker_count::WorkerCount;
