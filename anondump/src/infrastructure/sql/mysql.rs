// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # MySQL Query Factory
//!
//! SQL generation for the MySQL backend. Identifiers are backtick-quoted.
//! Truncation toggles `FOREIGN_KEY_CHECKS` so mid-database truncates do not
//! trip referential constraints. MySQL has no schema concept matching the
//! strategy model's `schema` field; the driver warns and the factory ignores
//! it.

use anondump_domain::services::fake_generator::{FakeDataType, FakeValue};
use anondump_domain::value_objects::column_strategy::{ColumnStrategy, ColumnStrategyKind};
use anondump_domain::value_objects::table_strategy::{TableStrategy, TableStrategyKind};
use anondump_domain::{AnonymizerError, QueryFactory, SeedColumn, SeedValue};

// For preservation of unique values across versions of mysql (UUID() has a
// known uniqueness bug inside subqueries), unique values use md5-based rand
// expressions rather than UUIDs.
const RAND_MD5: &str = "MD5(FLOOR((NOW() + RAND()) * (RAND() * RAND() / RAND()) + RAND()))";

// Dumps come out a little larger than the table-data estimate; inflate so
// progress against the estimate lands under 100%.
pub const DUMPSIZE_ESTIMATE_INFLATION: f64 = 1.15;

/// Pure SQL generation for MySQL.
#[derive(Debug, Default, Clone)]
pub struct MySqlQueryFactory;

fn quote(identifier: &str) -> String {
    format!("`{}`", identifier)
}

fn seed_column_type(data_type: FakeDataType) -> &'static str {
    match data_type {
        FakeDataType::String => "TEXT",
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
            format!("( SELECT CONCAT({}, '@', {}, '.com') )", RAND_MD5, RAND_MD5)
        }
        ColumnStrategyKind::UniqueLogin => format!("( SELECT {} )", RAND_MD5),
        ColumnStrategyKind::FakeUpdate { spec, sql_type } => {
            let mut seed_column = quote(spec.qualifier());
            if let Some(sql_type) = sql_type {
                seed_column = format!("CAST({} AS {})", seed_column, sql_type);
            }
            format!(
                "( SELECT {} FROM {} ORDER BY RAND() LIMIT 1)",
                seed_column,
                quote(seed_table)
            )
        }
        ColumnStrategyKind::Literal { value } => value.clone(),
    };

    format!("{} = {}", quote(&column.column_name), rhs)
}

impl QueryFactory for MySqlQueryFactory {
    fn create_database(&self, name: &str) -> Vec<String> {
        vec![format!("CREATE DATABASE {};", quote(name))]
    }

    fn drop_database(&self, name: &str) -> Vec<String> {
        vec![format!("DROP DATABASE IF EXISTS {};", quote(name))]
    }

    fn truncate_table(&self, table: &TableStrategy) -> String {
        format!(
            "SET FOREIGN_KEY_CHECKS=0; TRUNCATE TABLE {}; SET FOREIGN_KEY_CHECKS=1;",
            quote(&table.table_name)
        )
    }

    fn delete_table(&self, table: &TableStrategy) -> String {
        format!("DELETE FROM {};", quote(&table.table_name))
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
                format!(
                    "UPDATE {} SET {}{};",
                    quote(&table.table_name),
                    assignments,
                    where_clause
                )
            })
            .collect();

        Ok(statements)
    }

    fn dump_size_estimate(&self, database: &str) -> Option<String> {
        Some(format!(
            "SELECT data_bytes FROM (SELECT SUM(data_length) AS data_bytes FROM information_schema.tables WHERE table_schema = '{}') AS data;",
            database
        ))
    }

    // MySQL "schemas" are databases; a table strategy's schema field has no
    // meaning here and is ignored (the engine warns).
    fn supports_schema(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anondump_domain::services::fake_generator::FakeArgs;
    use anondump_domain::value_objects::fake_spec::FakeSpec;
    use anondump_domain::value_objects::table_strategy::UpdateColumns;
    use chrono::NaiveDate;

    fn factory() -> MySqlQueryFactory {
        MySqlQueryFactory
    }

    fn fake_column(name: &str, method: &str, where_condition: Option<&str>) -> ColumnStrategy {
        ColumnStrategy::new(
            name,
            where_condition.map(str::to_string),
            ColumnStrategyKind::FakeUpdate {
                spec: FakeSpec::new(method, FakeArgs::new(), FakeDataType::String),
                sql_type: None,
            },
        )
        .unwrap()
    }

    fn update_table_strategy(columns: Vec<ColumnStrategy>) -> TableStrategy {
        TableStrategy::new(
            "actor",
            None,
            TableStrategyKind::UpdateColumns(UpdateColumns::new(columns).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn test_truncate_toggles_foreign_key_checks() {
        let table = TableStrategy::new("customer", None, TableStrategyKind::Truncate).unwrap();
        assert_eq!(
            factory().truncate_table(&table),
            "SET FOREIGN_KEY_CHECKS=0; TRUNCATE TABLE `customer`; SET FOREIGN_KEY_CHECKS=1;"
        );
    }

    #[test]
    fn test_create_seed_table_maps_types() {
        let sql = factory()
            .create_seed_table(
                "seed",
                &[
                    SeedColumn {
                        qualifier: "first_name".to_string(),
                        data_type: FakeDataType::String,
                    },
                    SeedColumn {
                        qualifier: "dob".to_string(),
                        data_type: FakeDataType::Date,
                    },
                    SeedColumn {
                        qualifier: "age".to_string(),
                        data_type: FakeDataType::Int,
                    },
                ],
            )
            .unwrap();
        assert_eq!(sql, "CREATE TABLE `seed` (`first_name` TEXT,`dob` DATE,`age` INT);");
    }

    #[test]
    fn test_create_seed_table_rejects_empty_columns() {
        assert!(factory().create_seed_table("seed", &[]).is_err());
    }

    #[test]
    fn test_insert_seed_row_escapes_values() {
        let sql = factory().insert_seed_row(
            "seed",
            &[
                SeedValue {
                    qualifier: "last_name".to_string(),
                    value: FakeValue::String("O'Brien".to_string()),
                },
                SeedValue {
                    qualifier: "age".to_string(),
                    value: FakeValue::Int(42),
                },
                SeedValue {
                    qualifier: "dob".to_string(),
                    value: FakeValue::Date(NaiveDate::from_ymd_opt(1990, 1, 2).unwrap()),
                },
            ],
        );
        assert_eq!(
            sql,
            "INSERT INTO `seed`(`last_name`,`age`,`dob`) VALUES ('O''Brien',42,'1990-01-02');"
        );
    }

    #[test]
    fn test_update_emits_one_statement_per_where_group() {
        let table = update_table_strategy(vec![
            fake_column("first_name", "first_name", None),
            fake_column("last_name", "last_name", None),
            fake_column("nickname", "first_name", Some("active = 1")),
        ]);

        let statements = factory().update_table("seed", &table).unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("UPDATE `actor` SET `first_name` = "));
        assert!(statements[0].contains("`last_name` = "));
        assert!(!statements[0].contains("WHERE"));
        assert!(statements[1].ends_with("WHERE active = 1;"));
    }

    #[test]
    fn test_update_subquery_defeats_plan_caching() {
        let table = update_table_strategy(vec![fake_column("first_name", "first_name", None)]);
        let statements = factory().update_table("seed", &table).unwrap();
        assert!(statements[0].contains("( SELECT `first_name` FROM `seed` ORDER BY RAND() LIMIT 1)"));
    }

    #[test]
    fn test_update_renders_special_assignments() {
        let table = update_table_strategy(vec![
            ColumnStrategy::new("a", None, ColumnStrategyKind::Empty).unwrap(),
            ColumnStrategy::new("b", None, ColumnStrategyKind::UniqueLogin).unwrap(),
            ColumnStrategy::new("c", None, ColumnStrategyKind::UniqueEmail).unwrap(),
            ColumnStrategy::new(
                "d",
                None,
                ColumnStrategyKind::Literal {
                    value: "(NOW())".to_string(),
                },
            )
            .unwrap(),
        ]);

        let statement = &factory().update_table("seed", &table).unwrap()[0];
        assert!(statement.contains("`a` = ('')"));
        assert!(statement.contains(&format!("`b` = ( SELECT {} )", RAND_MD5)));
        assert!(statement.contains("'@'"));
        assert!(statement.contains("`d` = (NOW())"));
        // never the buggy UUID()
        assert!(!statement.contains("UUID()"));
    }

    #[test]
    fn test_update_with_sql_type_casts() {
        let table = update_table_strategy(vec![ColumnStrategy::new(
            "total",
            None,
            ColumnStrategyKind::FakeUpdate {
                spec: FakeSpec::new("random_int", FakeArgs::new(), FakeDataType::Int),
                sql_type: Some("DECIMAL(10,2)".to_string()),
            },
        )
        .unwrap()]);

        let statement = &factory().update_table("seed", &table).unwrap()[0];
        assert!(statement.contains("CAST(`random_int` AS DECIMAL(10,2))"));
    }

    #[test]
    fn test_update_rejects_non_update_strategy() {
        let table = TableStrategy::new("x", None, TableStrategyKind::Truncate).unwrap();
        assert!(factory().update_table("seed", &table).is_err());
    }

    #[test]
    fn test_dump_size_estimate_queries_information_schema() {
        let sql = factory().dump_size_estimate("workdb").unwrap();
        assert!(sql.contains("information_schema.tables"));
        assert!(sql.contains("'workdb'"));
    }

    #[test]
    fn test_schema_field_is_not_supported() {
        assert!(!factory().supports_schema());
    }
}
