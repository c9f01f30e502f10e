// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # PostgreSQL Query Factory
//!
//! SQL generation for the PostgreSQL backend. Identifiers are double-quoted;
//! tables may be schema-qualified. The update target is aliased
//! `"updatetarget"` so fake-update subqueries can key their pseudo-random
//! seed-row index on the outer row (`MD5(updatetarget::text)`), which forces
//! the planner to re-evaluate the subquery per row.
//!
//! Dropping the working database first terminates other sessions connected
//! to it; PostgreSQL refuses to drop a database with live connections.

use anondump_domain::services::fake_generator::{FakeDataType, FakeValue};
use anondump_domain::value_objects::column_strategy::{ColumnStrategy, ColumnStrategyKind};
use anondump_domain::value_objects::table_strategy::{TableStrategy, TableStrategyKind};
use anondump_domain::{AnonymizerError, QueryFactory, SeedColumn, SeedValue};

// Random text expression
const RAND_MD5: &str = "md5(random()::text)";

// Pseudo random integer keyed on the outer row
const PSEUDO_RANDOM_INT: &str = "ABS(('x' || MD5(updatetarget::text))::bit(32)::int)";

// Seed table id column name
const ID_COLUMN: &str = "_id";

/// Pure SQL generation for PostgreSQL.
#[derive(Debug, Default, Clone)]
pub struct PostgresQueryFactory;

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

fn qualified_table_name(table: &TableStrategy) -> String {
    match &table.schema {
        Some(schema) => format!("{}.{}", quote(schema), quote(&table.table_name)),
        None => quote(&table.table_name),
    }
}

fn seed_column_type(data_type: FakeDataType) -> &'static str {
    match data_type {
        FakeDataType::String => "VARCHAR(65535)",
        FakeDataType::Date => "DATE",
        FakeDataType::DateTime => "TIMESTAMP",
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
        ColumnStrategyKind::UniqueEmail => format!(
            "( SELECT CONCAT({}, '@', {}, '.com') ORDER BY MD5(\"updatetarget\"::text) LIMIT 1)",
            RAND_MD5, RAND_MD5
        ),
        ColumnStrategyKind::UniqueLogin => format!(
            "( SELECT {} ORDER BY MD5(\"updatetarget\"::text) LIMIT 1)",
            RAND_MD5
        ),
        ColumnStrategyKind::FakeUpdate { spec, sql_type } => {
            let mut seed_column = quote(spec.qualifier());
            if let Some(sql_type) = sql_type {
                seed_column = format!("{}::{}", seed_column, sql_type);
            }
            let row_count = format!("(SELECT MAX({}) FROM {})", quote(ID_COLUMN), quote(seed_table));
            let pseudo_random_row_id = format!("MOD({}, {}) + 1", PSEUDO_RANDOM_INT, row_count);
            format!(
                "( SELECT {} FROM {} WHERE {}={})",
                seed_column,
                quote(seed_table),
                quote(ID_COLUMN),
                pseudo_random_row_id
            )
        }
        ColumnStrategyKind::Literal { value } => value.clone(),
    };

    format!("{} = {}", quote(&column.column_name), rhs)
}

impl QueryFactory for PostgresQueryFactory {
    fn create_database(&self, name: &str) -> Vec<String> {
        vec![format!("CREATE DATABASE {};", name)]
    }

    fn drop_database(&self, name: &str) -> Vec<String> {
        vec![
            // terminate other connections so we can drop
            format!(
                "SELECT pid, pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}' AND pid != pg_backend_pid();",
                name
            ),
            format!("DROP DATABASE IF EXISTS {};", name),
        ]
    }

    // postgres truncates can cascade and are faster than unqualified deletes
    fn truncate_table(&self, table: &TableStrategy) -> String {
        format!("TRUNCATE TABLE {} CASCADE;", qualified_table_name(table))
    }

    fn delete_table(&self, table: &TableStrategy) -> String {
        format!("TRUNCATE TABLE {} CASCADE;", qualified_table_name(table))
    }

    fn create_seed_table(&self, name: &str, columns: &[SeedColumn]) -> Result<String, AnonymizerError> {
        if columns.is_empty() {
            return Err(AnonymizerError::internal_error(
                "cannot create a seed table with no columns",
            ));
        }

        let mut column_defs = vec![format!("{} SERIAL NOT NULL PRIMARY KEY", ID_COLUMN)];
        column_defs.extend(
            columns
                .iter()
                .map(|column| format!("{} {}", quote(&column.qualifier), seed_column_type(column.data_type))),
        );

        Ok(format!("CREATE TABLE {} ({});", quote(name), column_defs.join(",")))
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

        format!("INSERT INTO {} ({}) VALUES ({});", quote(name), column_names, column_values)
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
                format!(
                    "UPDATE {} AS \"updatetarget\" SET {}{};",
                    qualified_table_name(table),
                    assignments,
                    where_clause
                )
            })
            .collect();

        Ok(statements)
    }

    // No usable size estimate on this backend.
    fn dump_size_estimate(&self, _database: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anondump_domain::services::fake_generator::FakeArgs;
    use anondump_domain::value_objects::fake_spec::FakeSpec;
    use anondump_domain::value_objects::table_strategy::UpdateColumns;

    fn factory() -> PostgresQueryFactory {
        PostgresQueryFactory
    }

    fn fake_column(name: &str, method: &str) -> ColumnStrategy {
        ColumnStrategy::new(
            name,
            None,
            ColumnStrategyKind::FakeUpdate {
                spec: FakeSpec::new(method, FakeArgs::new(), FakeDataType::String),
                sql_type: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_drop_database_terminates_sessions_first() {
        let statements = factory().drop_database("workdb");
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("pg_terminate_backend"));
        assert!(statements[0].contains("pg_backend_pid()"));
        assert!(statements[1].starts_with("DROP DATABASE IF EXISTS workdb"));
    }

    #[test]
    fn test_truncate_cascades_and_respects_schema() {
        let table = TableStrategy::new("users", Some("app".to_string()), TableStrategyKind::Truncate).unwrap();
        assert_eq!(
            factory().truncate_table(&table),
            "TRUNCATE TABLE \"app\".\"users\" CASCADE;"
        );
    }

    #[test]
    fn test_delete_renders_as_cascading_truncate() {
        let table = TableStrategy::new("users", None, TableStrategyKind::Delete).unwrap();
        assert_eq!(factory().delete_table(&table), "TRUNCATE TABLE \"users\" CASCADE;");
    }

    #[test]
    fn test_create_seed_table_has_serial_id() {
        let sql = factory()
            .create_seed_table(
                "seed",
                &[SeedColumn {
                    qualifier: "first_name".to_string(),
                    data_type: FakeDataType::String,
                }],
            )
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE \"seed\" (_id SERIAL NOT NULL PRIMARY KEY,\"first_name\" VARCHAR(65535));"
        );
    }

    #[test]
    fn test_update_correlates_on_outer_row() {
        let table = TableStrategy::new(
            "actor",
            None,
            TableStrategyKind::UpdateColumns(
                UpdateColumns::new(vec![fake_column("first_name", "first_name")]).unwrap(),
            ),
        )
        .unwrap();

        let statement = &factory().update_table("seed", &table).unwrap()[0];
        assert!(statement.starts_with("UPDATE \"actor\" AS \"updatetarget\" SET"));
        assert!(statement.contains("MD5(updatetarget::text)"));
        assert!(statement.contains("MOD(ABS(('x' || MD5(updatetarget::text))::bit(32)::int)"));
        assert!(statement.contains("(SELECT MAX(\"_id\") FROM \"seed\")"));
    }

    #[test]
    fn test_update_sql_type_uses_postgres_cast() {
        let table = TableStrategy::new(
            "orders",
            None,
            TableStrategyKind::UpdateColumns(
                UpdateColumns::new(vec![ColumnStrategy::new(
                    "total",
                    None,
                    ColumnStrategyKind::FakeUpdate {
                        spec: FakeSpec::new("random_int", FakeArgs::new(), FakeDataType::Int),
                        sql_type: Some("NUMERIC".to_string()),
                    },
                )
                .unwrap()])
                .unwrap(),
            ),
        )
        .unwrap();

        let statement = &factory().update_table("seed", &table).unwrap()[0];
        assert!(statement.contains("\"random_int\"::NUMERIC"));
    }

    #[test]
    fn test_unique_assignments_are_correlated() {
        let table = TableStrategy::new(
            "users",
            None,
            TableStrategyKind::UpdateColumns(
                UpdateColumns::new(vec![
                    ColumnStrategy::new("login", None, ColumnStrategyKind::UniqueLogin).unwrap(),
                    ColumnStrategy::new("email", None, ColumnStrategyKind::UniqueEmail).unwrap(),
                ])
                .unwrap(),
            ),
        )
        .unwrap();

        let statement = &factory().update_table("seed", &table).unwrap()[0];
        assert!(statement.contains("\"login\" = ( SELECT md5(random()::text) ORDER BY MD5(\"updatetarget\"::text) LIMIT 1)"));
        assert!(statement.contains("'@'"));
        assert!(statement.contains("'.com'"));
    }

    #[test]
    fn test_no_dump_size_estimate() {
        assert!(factory().dump_size_estimate("workdb").is_none());
    }
}
