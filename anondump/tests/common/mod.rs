// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared test support: a recording driver and a stub fake generator.

// Each test binary compiles this module separately and uses a subset of it.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use anondump::infrastructure::sql::mysql::MySqlQueryFactory;
use anondump_domain::{
    AnonymizerError, DatabaseDriver, FakeArgs, FakeColumnGenerator, FakeDataType, FakeValue, QueryFactory,
};
use async_trait::async_trait;
use parking_lot::Mutex;

/// One observed driver call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    TestConnection,
    Execute(Vec<String>),
    DbExecute(Vec<String>),
    SingleResult(String),
    CreateDatabase,
    DropDatabase,
    Restore(String),
    Dump(String),
}

/// A driver that records every call and can be told to fail on cue.
pub struct RecordingDriver {
    pub calls: Arc<Mutex<Vec<Call>>>,
    factory: MySqlQueryFactory,
    /// `db_execute` fails when a statement mentions one of these markers.
    pub fail_on_statement: HashSet<String>,
    pub fail_dump: bool,
    pub fail_restore: bool,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            factory: MySqlQueryFactory,
            fail_on_statement: HashSet::new(),
            fail_dump: false,
            fail_restore: false,
        }
    }

    pub fn recorded(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Flattened list of every statement passed to `db_execute`, in call
    /// order.
    pub fn db_statements(&self) -> Vec<String> {
        self.recorded()
            .into_iter()
            .filter_map(|call| match call {
                Call::DbExecute(statements) => Some(statements),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for RecordingDriver {
    fn query_factory(&self) -> &dyn QueryFactory {
        &self.factory
    }

    async fn test_connection(&self) -> bool {
        self.calls.lock().push(Call::TestConnection);
        true
    }

    async fn execute(&self, statements: &[String]) -> Result<(), AnonymizerError> {
        self.calls.lock().push(Call::Execute(statements.to_vec()));
        Ok(())
    }

    async fn db_execute(&self, statements: &[String]) -> Result<Vec<String>, AnonymizerError> {
        self.calls.lock().push(Call::DbExecute(statements.to_vec()));
        for statement in statements {
            for marker in &self.fail_on_statement {
                if statement.contains(marker) {
                    return Err(AnonymizerError::database_error(format!(
                        "injected failure on `{}`",
                        marker
                    )));
                }
            }
        }
        Ok(vec![String::new(); statements.len()])
    }

    async fn single_result(&self, statement: &str) -> Result<String, AnonymizerError> {
        self.calls.lock().push(Call::SingleResult(statement.to_string()));
        Ok("1".to_string())
    }

    async fn create_database(&self) -> Result<(), AnonymizerError> {
        self.calls.lock().push(Call::CreateDatabase);
        Ok(())
    }

    async fn drop_database(&self) -> Result<(), AnonymizerError> {
        self.calls.lock().push(Call::DropDatabase);
        Ok(())
    }

    async fn restore_database(&self, input_path: &str) -> Result<(), AnonymizerError> {
        self.calls.lock().push(Call::Restore(input_path.to_string()));
        if self.fail_restore {
            return Err(AnonymizerError::dependency("mysql", "injected restore failure"));
        }
        Ok(())
    }

    async fn dump_database(&self, output_path: &str) -> Result<(), AnonymizerError> {
        self.calls.lock().push(Call::Dump(output_path.to_string()));
        if self.fail_dump {
            return Err(AnonymizerError::dependency("mysqldump", "injected dump failure"));
        }
        Ok(())
    }
}

/// Deterministic generator covering the handful of methods the tests use.
pub struct StubGenerator;

impl FakeColumnGenerator for StubGenerator {
    fn supports(&self, method: &str) -> bool {
        matches!(method, "first_name" | "last_name" | "random_int")
    }

    fn supports_args(&self, method: &str, args: &FakeArgs) -> bool {
        match method {
            "random_int" => args.keys().all(|key| key == "min" || key == "max"),
            _ => args.is_empty(),
        }
    }

    fn data_type(&self, method: &str) -> FakeDataType {
        match method {
            "random_int" => FakeDataType::Int,
            _ => FakeDataType::String,
        }
    }

    fn value(&self, method: &str, _args: &FakeArgs) -> Result<FakeValue, AnonymizerError> {
        match method {
            "random_int" => Ok(FakeValue::Int(4)),
            known if self.supports(known) => Ok(FakeValue::String(format!("fake-{}", known))),
            unknown => Err(AnonymizerError::UnsupportedFakeType(unknown.to_string())),
        }
    }
}
