// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Query Factory Port
//!
//! Pure SQL generation, one implementation per backend. Factories map
//! strategy nodes to backend-specific SQL strings and never perform I/O;
//! they are the single exhaustive match site over
//! [`ColumnStrategyKind`](crate::value_objects::column_strategy::ColumnStrategyKind)
//! per backend.
//!
//! ## Update generation
//!
//! [`QueryFactory::update_table`] groups a table's column strategies by
//! `where` predicate and emits one UPDATE per group. The fake-update
//! assignment must be written so the planner cannot cache the subquery result
//! across outer rows; each backend has its own correlated-subquery
//! realization for that (documented on the implementations).

use crate::error::AnonymizerError;
use crate::services::fake_generator::{FakeDataType, FakeValue};
use crate::value_objects::table_strategy::TableStrategy;

/// Fixed name of the transient seed table inside the working database.
pub const SEED_TABLE_NAME: &str = "_anondump_seed_fake_data";

/// One seed-table column: a qualifier and the storage class of its values.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedColumn {
    pub qualifier: String,
    pub data_type: FakeDataType,
}

/// One cell of one seed row.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedValue {
    pub qualifier: String,
    pub value: FakeValue,
}

/// Pure per-backend SQL generation.
///
/// Statement-sequence returns (`Vec<String>`) exist because some operations
/// are multi-statement on some backends (e.g. terminating sessions before a
/// PostgreSQL `DROP DATABASE`).
pub trait QueryFactory: Send + Sync {
    /// Statement(s) creating the working database.
    fn create_database(&self, name: &str) -> Vec<String>;

    /// Statement(s) dropping the working database, including any forced
    /// connection closure the backend requires.
    fn drop_database(&self, name: &str) -> Vec<String>;

    /// Statement emptying `table` via the backend's truncate mechanism,
    /// including any foreign-key-check toggling required to make truncation
    /// safe mid-database.
    fn truncate_table(&self, table: &TableStrategy) -> String;

    /// Statement emptying `table` row-wise (or the backend's closest
    /// equivalent).
    fn delete_table(&self, table: &TableStrategy) -> String;

    /// Statement creating the seed table with one column per entry.
    ///
    /// # Errors
    ///
    /// Fails with an internal error when `columns` is empty; the engine only
    /// seeds when at least one fake-update column exists.
    fn create_seed_table(&self, name: &str, columns: &[SeedColumn]) -> Result<String, AnonymizerError>;

    /// Statement dropping the seed table (idempotent).
    fn drop_seed_table(&self, name: &str) -> String;

    /// Statement inserting one pre-sampled row into the seed table.
    fn insert_seed_row(&self, name: &str, row: &[SeedValue]) -> String;

    /// Statements rewriting `table`'s columns: exactly one UPDATE per
    /// distinct `where` group, in first-seen group order.
    ///
    /// # Errors
    ///
    /// Fails with an internal error when `table` is not an `update_columns`
    /// strategy; the engine dispatches on the strategy kind before calling.
    fn update_table(&self, seed_table: &str, table: &TableStrategy) -> Result<Vec<String>, AnonymizerError>;

    /// A single-numeric-cell query estimating the dump size in bytes, or
    /// `None` when the backend has no usable estimate.
    fn dump_size_estimate(&self, database: &str) -> Option<String>;

    /// Whether this backend honors a table strategy's `schema` field. The
    /// engine warns (and the factory ignores the field) when it does not.
    fn supports_schema(&self) -> bool {
        true
    }
}
