// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Anonymization engine integration tests against a recording driver:
//! phase ordering, error aggregation, and seed-table lifecycle.

mod common;

use std::sync::Arc;

use anondump::application::services::AnonymizationEngine;
use anondump_domain::{
    AnonymizerError, ColumnStrategy, ColumnStrategyKind, DatabaseStrategy, FakeArgs, FakeDataType, FakeSpec,
    SeedRowCount, TableStrategy, TableStrategyKind, UpdateColumns, WorkerCount, SEED_TABLE_NAME,
};
use common::{RecordingDriver, StubGenerator};

fn fake_table(table_name: &str, column_name: &str) -> TableStrategy {
    let column = ColumnStrategy::new(
        column_name,
        None,
        ColumnStrategyKind::FakeUpdate {
            spec: FakeSpec::new("first_name", FakeArgs::new(), FakeDataType::String),
            sql_type: None,
        },
    )
    .unwrap();
    TableStrategy::new(
        table_name,
        None,
        TableStrategyKind::UpdateColumns(UpdateColumns::new(vec![column]).unwrap()),
    )
    .unwrap()
}

fn truncate_table(table_name: &str) -> TableStrategy {
    TableStrategy::new(table_name, None, TableStrategyKind::Truncate).unwrap()
}

fn strategy(tables: Vec<TableStrategy>, before: Vec<String>, after: Vec<String>) -> Arc<DatabaseStrategy> {
    Arc::new(DatabaseStrategy {
        tables,
        before_scripts: before,
        after_scripts: after,
        locale: None,
        providers: Vec::new(),
    })
}

fn engine(driver: Arc<RecordingDriver>, workers: usize, seed_rows: usize, ignore_errors: bool) -> AnonymizationEngine {
    AnonymizationEngine::new(
        driver,
        Arc::new(StubGenerator),
        WorkerCount::new(workers).unwrap(),
        SeedRowCount::new(seed_rows).unwrap(),
        ignore_errors,
    )
}

/// Positions of statement classes within the recorded db_execute sequence.
struct Phases {
    create_seed: usize,
    last_insert: usize,
    first_table_op: usize,
    last_table_op: usize,
    drop_seed: usize,
}

fn classify(statements: &[String]) -> Phases {
    let mut create_seed = None;
    let mut last_insert = None;
    let mut first_table_op = None;
    let mut last_table_op = None;
    let mut drop_seed = None;

    for (index, statement) in statements.iter().enumerate() {
        if statement.contains(&format!("CREATE TABLE `{}`", SEED_TABLE_NAME)) {
            create_seed = Some(index);
        } else if statement.contains(&format!("INSERT INTO `{}`", SEED_TABLE_NAME)) {
            last_insert = Some(index);
        } else if statement.contains(&format!("DROP TABLE IF EXISTS `{}`", SEED_TABLE_NAME)) {
            drop_seed = Some(index);
        } else if statement.starts_with("UPDATE ") || statement.contains("TRUNCATE TABLE") {
            first_table_op.get_or_insert(index);
            last_table_op = Some(index);
        }
    }

    Phases {
        create_seed: create_seed.expect("seed table created"),
        last_insert: last_insert.expect("seed rows inserted"),
        first_table_op: first_table_op.expect("table ops ran"),
        last_table_op: last_table_op.expect("table ops ran"),
        drop_seed: drop_seed.expect("seed table dropped"),
    }
}

#[tokio::test]
async fn seed_insert_update_drop_are_strictly_ordered() {
    let driver = Arc::new(RecordingDriver::new());
    let engine = engine(driver.clone(), 4, 3, false);

    let strategy = strategy(
        vec![fake_table("actor", "first_name"), fake_table("customer", "email"), truncate_table("logs")],
        vec![],
        vec![],
    );
    engine.anonymize(strategy).await.unwrap();

    let statements = driver.db_statements();
    let phases = classify(&statements);

    assert!(phases.create_seed < phases.last_insert);
    assert!(phases.last_insert < phases.first_table_op);
    assert!(phases.last_table_op < phases.drop_seed);

    // three seed rows inserted, one insert statement each
    let inserts = statements
        .iter()
        .filter(|s| s.contains(&format!("INSERT INTO `{}`", SEED_TABLE_NAME)))
        .count();
    assert_eq!(inserts, 3);
}

#[tokio::test]
async fn scripts_bracket_the_table_phase() {
    let driver = Arc::new(RecordingDriver::new());
    let engine = engine(driver.clone(), 2, 1, false);

    let strategy = strategy(
        vec![fake_table("actor", "first_name"), fake_table("staff", "first_name")],
        vec!["SELECT 'before';".to_string()],
        vec!["SELECT 'after';".to_string()],
    );
    engine.anonymize(strategy).await.unwrap();

    let statements = driver.db_statements();
    let before = statements.iter().position(|s| s.contains("'before'")).unwrap();
    let after = statements.iter().position(|s| s.contains("'after'")).unwrap();
    let first_update = statements.iter().position(|s| s.starts_with("UPDATE ")).unwrap();
    let last_update = statements.iter().rposition(|s| s.starts_with("UPDATE ")).unwrap();

    assert!(before < first_update);
    assert!(last_update < after);
}

#[tokio::test]
async fn errors_are_aggregated_and_all_tables_still_attempted() {
    let mut driver = RecordingDriver::new();
    driver.fail_on_statement.insert("`bad_one`".to_string());
    driver.fail_on_statement.insert("`bad_two`".to_string());
    let driver = Arc::new(driver);
    let engine = engine(driver.clone(), 2, 1, false);

    let strategy = strategy(
        vec![
            fake_table("good_one", "first_name"),
            fake_table("bad_one", "first_name"),
            truncate_table("bad_two"),
            truncate_table("good_two"),
        ],
        vec![],
        vec![],
    );

    let err = engine.anonymize(strategy).await.unwrap_err();
    let AnonymizerError::Anonymization(table_errors) = err else {
        panic!("expected aggregated anonymization error");
    };
    assert_eq!(table_errors.len(), 2);
    let mut failed: Vec<&str> = table_errors.iter().map(|e| e.table.as_str()).collect();
    failed.sort_unstable();
    assert_eq!(failed, vec!["bad_one", "bad_two"]);

    // every table op was issued despite the failures
    let statements = driver.db_statements();
    for table in ["good_one", "bad_one", "bad_two", "good_two"] {
        assert!(
            statements.iter().any(|s| s.contains(&format!("`{}`", table))),
            "table {} was never attempted",
            table
        );
    }
}

#[tokio::test]
async fn ignoring_errors_continues_to_after_scripts_and_drop_seed() {
    let mut driver = RecordingDriver::new();
    driver.fail_on_statement.insert("`broken`".to_string());
    let driver = Arc::new(driver);
    let engine = engine(driver.clone(), 1, 1, true);

    let strategy = strategy(
        vec![fake_table("broken", "first_name"), fake_table("fine", "first_name")],
        vec![],
        vec!["SELECT 'after';".to_string()],
    );
    engine.anonymize(strategy).await.unwrap();

    let statements = driver.db_statements();
    assert!(statements.iter().any(|s| s.contains("'after'")));
    assert!(statements
        .iter()
        .any(|s| s.contains(&format!("DROP TABLE IF EXISTS `{}`", SEED_TABLE_NAME))));
}

#[tokio::test]
async fn failed_run_stops_before_after_scripts() {
    let mut driver = RecordingDriver::new();
    driver.fail_on_statement.insert("`broken`".to_string());
    let driver = Arc::new(driver);
    let engine = engine(driver.clone(), 1, 1, false);

    let strategy = strategy(
        vec![fake_table("broken", "first_name")],
        vec![],
        vec!["SELECT 'after';".to_string()],
    );
    assert!(engine.anonymize(strategy).await.is_err());

    let statements = driver.db_statements();
    assert!(!statements.iter().any(|s| s.contains("'after'")));
}

#[tokio::test]
async fn truncate_only_strategy_creates_no_seed_table() {
    let driver = Arc::new(RecordingDriver::new());
    let engine = engine(driver.clone(), 1, 150, false);

    let strategy = strategy(vec![truncate_table("logs"), truncate_table("audit")], vec![], vec![]);
    engine.anonymize(strategy).await.unwrap();

    let statements = driver.db_statements();
    assert!(!statements
        .iter()
        .any(|s| s.contains(&format!("CREATE TABLE `{}`", SEED_TABLE_NAME))));
    assert!(!statements.iter().any(|s| s.contains("INSERT INTO")));
}

#[tokio::test]
async fn distinct_arg_sets_get_distinct_seed_columns() {
    use anondump_domain::FakeArg;

    let mut small = FakeArgs::new();
    small.insert("max".to_string(), FakeArg::Int(10));
    let mut large = FakeArgs::new();
    large.insert("max".to_string(), FakeArg::Int(1000));

    let columns = vec![
        ColumnStrategy::new(
            "quantity",
            None,
            ColumnStrategyKind::FakeUpdate {
                spec: FakeSpec::new("random_int", small, FakeDataType::Int),
                sql_type: None,
            },
        )
        .unwrap(),
        ColumnStrategy::new(
            "total",
            None,
            ColumnStrategyKind::FakeUpdate {
                spec: FakeSpec::new("random_int", large, FakeDataType::Int),
                sql_type: None,
            },
        )
        .unwrap(),
    ];
    let table = TableStrategy::new(
        "orders",
        None,
        TableStrategyKind::UpdateColumns(UpdateColumns::new(columns).unwrap()),
    )
    .unwrap();

    let driver = Arc::new(RecordingDriver::new());
    let engine = engine(driver.clone(), 1, 1, false);
    engine.anonymize(strategy(vec![table], vec![], vec![])).await.unwrap();

    let statements = driver.db_statements();
    let create = statements
        .iter()
        .find(|s| s.contains(&format!("CREATE TABLE `{}`", SEED_TABLE_NAME)))
        .unwrap();

    // two distinct qualifier columns, both derived from random_int
    assert_eq!(create.matches("`random_int_").count(), 2);
}
