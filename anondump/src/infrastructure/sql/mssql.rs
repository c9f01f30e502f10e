// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # MSSQL Query Factory
//!
//! T-SQL generation for the SQL Server backend. Identifiers are
//! bracket-quoted; tables may be schema-qualified. The update target is
//! aliased `[updatetarget]` via the T-SQL `UPDATE alias ... FROM table AS
//! alias` form so fake-update subqueries can reference the outer row.
//!
//! Fake updates use `TOP 1 ... ORDER BY NEWID()` with a vacuous outer-row
//! predicate (`[updatetarget].[col] LIKE '%' OR [updatetarget].[col] IS
//! NULL`); the predicate is always true but correlates the subquery, which
//! stops the planner from caching one sample across the whole table.
//!
//! Each UPDATE can be wrapped in `SET ANSI_WARNINGS OFF/ON` so oversized
//! fake strings are truncated into the target column instead of aborting the
//! batch.

use anondump_domain::services::fake_generator::{FakeDataType, FakeValue};
use anondump_domain::value_objects::column_strategy::{ColumnStrategy, ColumnStrategyKind};
use anondump_domain::value_objects::table_strategy::{TableStrategy, TableStrategyKind};
use anondump_domain::{AnonymizerError, QueryFactory, SeedColumn, SeedValue};

const UPDATE_ALIAS: &str = "updatetarget";

/// Pure SQL generation for MSSQL.
#[derive(Debug, Clone)]
pub struct MsSqlQueryFactory {
    /// Wrap UPDATEs in `SET ANSI_WARNINGS OFF/ON` so string truncation does
    /// not abort the batch.
    ansi_warnings_off: bool,
}

impl MsSqlQueryFactory {
    pub fn new(ansi_warnings_off: bool) -> Self {
        Self { ansi_warnings_off }
    }
}

impl Default for MsSqlQueryFactory {
    fn default() -> Self {
        Self::new(true)
    }
}

fn quote(identifier: &str) -> String {
    format!("[{}]", identifier)
}

fn qualified_table_name(table: &TableStrategy) -> String {
    match &table.schema {
        Some(schema) => format!("{}.{}", quote(schema), quote(&table.table_name)),
        None => quote(&table.table_name),
    }
}

fn seed_column_type(data_type: FakeDataType) -> &'static str {
    match data_type {
        FakeDataType::String => "VARCHAR(MAX)",
        FakeDataType::Date => "DATE",
        FakeDataType::DateTime => "DATETIME",
        FakeDataType::Int => "INT",
    }
}

fn escape_sql_value(value: &FakeValue) -> String {
    match value {
        FakeValue::Int(i) => i.to_string(),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}

fn column_assignment(seed_table: &str, column: &ColumnStrategy) -> String {
    let rhs = match &column.kind {
        ColumnStrategyKind::Empty => "('')".to_string(),
        ColumnStrategyKind::UniqueEmail => {
            "( SELECT CONCAT(NEWID(), '@', NEWID(), '.com') )".to_string()
        }
        ColumnStrategyKind::UniqueLogin => "( SELECT NEWID() )".to_string(),
        ColumnStrategyKind::FakeUpdate { spec, sql_type } => {
            let mut seed_column = quote(spec.qualifier());
            if let Some(sql_type) = sql_type {
                seed_column = format!("CAST({} AS {})", seed_column, sql_type);
            }
            let outer_column = format!("{}.{}", quote(UPDATE_ALIAS), quote(&column.column_name));
            format!(
                "( SELECT TOP 1 {} FROM {} WHERE {} LIKE '%' OR {} IS NULL ORDER BY NEWID())",
                seed_column,
                quote(seed_table),
                outer_column,
                outer_column
            )
        }
        ColumnStrategyKind::Literal { value } => value.clone(),
    };

    format!("{} = {}", quote(&column.column_name), rhs)
}

impl QueryFactory for MsSqlQueryFactory {
    fn create_database(&self, name: &str) -> Vec<String> {
        vec![format!("CREATE DATABASE {};", quote(name))]
    }

    fn drop_database(&self, name: &str) -> Vec<String> {
        // Force other sessions off the database before dropping it.
        vec![
            format!(
                "IF DB_ID('{0}') IS NOT NULL ALTER DATABASE {1} SET SINGLE_USER WITH ROLLBACK IMMEDIATE;",
                name.replace('\'', "''"),
                quote(name)
            ),
            format!("DROP DATABASE IF EXISTS {};", quote(name)),
        ]
    }

    fn truncate_table(&self, table: &TableStrategy) -> String {
        format!("TRUNCATE TABLE {};", qualified_table_name(table))
    }

    fn delete_table(&self, table: &TableStrategy) -> String {
        format!("DELETE FROM {};", qualified_table_name(table))
    }

    fn create_seed_table(&self, name: &str, columns: &[SeedColumn]) -> Result<String, AnonymizerError> {
        if columns.is_empty() {
            return Err(AnonymizerError::internal_error(
                "cannot create a seed table with no columns",
            ));
        }

        let column_defs = columns
            .iter()
            .map(|column| format!("{} {}", quote(&column.qualifier), seed_column_type(column.data_type)))
            .collect::<Vec<_>>()
            .join(",");

        Ok(format!("CREATE TABLE {} ({});", quote(name), column_defs))
    }

    fn drop_seed_table(&self, name: &str) -> String {
        format!("DROP TABLE IF EXISTS {};", quote(name))
    }

    fn insert_seed_row(&self, name: &str, row: &[SeedValue]) -> String {
        let column_names = row
            .iter()
            .map(|cell| quote(&cell.qualifier))
            .collect::<Vec<_>>()
            .join(",");
        let column_values = row
            .iter()
            .map(|cell| escape_sql_value(&cell.value))
            .collect::<Vec<_>>()
            .join(",");

        format!("INSERT INTO {}({}) VALUES ({});", quote(name), column_names, column_values)
    }

    fn update_table(&self, seed_table: &str, table: &TableStrategy) -> Result<Vec<String>, AnonymizerError> {
        let TableStrategyKind::UpdateColumns(update) = &table.kind else {
            return Err(AnonymizerError::internal_error(format!(
                "update_table called with a {} strategy for `{}`",
                table.kind.name(),
                table.table_name
            )));
        };

        let statements = update
            .group_by_where()
            .iter()
            .map(|(where_condition, columns)| {
                let assignments = columns
                    .iter()
                    .map(|column| column_assignment(seed_table, column))
                    .collect::<Vec<_>>()
                    .join(",");
                let where_clause = match where_condition {
                    Some(predicate) => format!(" WHERE {}", predicate),
                    None => String::new(),
                };
                let update = format!(
                    "UPDATE {} SET {} FROM {} AS {}{};",
                    quote(UPDATE_ALIAS),
                    assignments,
                    qualified_table_name(table),
                    quote(UPDATE_ALIAS),
                    where_clause
                );
                if self.ansi_warnings_off {
                    format!("SET ANSI_WARNINGS OFF; {} SET ANSI_WARNINGS ON;", update)
                } else {
                    update
                }
            })
            .collect();

        Ok(statements)
    }

    // Progress comes from the STATS clause of BACKUP itself.
    fn dump_size_estimate(&self, _database: &str) -> Option<String> {
        None
    }
}
