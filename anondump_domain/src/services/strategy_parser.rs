// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Strategy Parser
//!
//! Turns the loosely-structured configuration tree decoded from a strategy
//! file (YAML or JSON) into a validated, immutable
//! [`DatabaseStrategy`]. The parser accepts both the shorthand and the
//! verbose authoring forms and normalizes them before validation:
//!
//! - `tables:` may be a mapping `{name: body}` or a sequence of
//!   `{table_name: name, ...}` entries. The sequence form permits repeated
//!   table names; mapping-form duplicates are a decoder-level error.
//! - A table body may be the bare string `"truncate"` / `"delete"`, or a
//!   mapping. A mapping without `type` that contains `columns` is an
//!   `update_columns` table; anything else without a `type` is unknown.
//! - `columns:` likewise accepts mapping or sequence form.
//! - A column body may be a bare string: `"empty"`, `"unique_email"`,
//!   `"unique_login"`, a parenthesized literal `"(...)"`, or (any other
//!   string) a fake method name. A mapping must carry an explicit `type`.
//!
//! Normalization never mutates the caller's tree; the parser only reads.
//!
//! ## Validation
//!
//! Every `fake_update` column is checked against the fake generator's
//! capability set before the strategy is returned, so unusable strategies
//! fail before any destructive step. Keys unrelated to a node's declared
//! type (e.g. `columns` inside a `truncate`) are a syntax error. Two columns
//! of the same table with the same name *and* the same `where` predicate are
//! a syntax error; the same name under different predicates is legitimate.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::entities::database_strategy::DatabaseStrategy;
use crate::error::AnonymizerError;
use crate::services::fake_generator::{format_args, FakeArg, FakeArgs, FakeColumnGenerator};
use crate::value_objects::column_strategy::{ColumnStrategy, ColumnStrategyKind};
use crate::value_objects::fake_spec::FakeSpec;
use crate::value_objects::table_strategy::{TableStrategy, TableStrategyKind, UpdateColumns};

/// A column shorthand wrapped in parentheses is a verbatim SQL literal.
static LITERAL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(.*\)$").expect("literal pattern is valid"));

const ROOT_KEYS: &[&str] = &["tables", "scripts", "locale", "providers"];
const TABLE_BASE_KEYS: &[&str] = &["type", "table_name", "schema"];
const COLUMN_BASE_KEYS: &[&str] = &["type", "column_name", "where"];

/// Root-level generator overrides, readable without a constructed generator.
///
/// The generator must exist before the full parse (validation needs its
/// capability set), but `locale` and `providers` live in the strategy file.
/// This pre-scan breaks the cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorOverrides {
    pub locale: Option<String>,
    pub providers: Vec<String>,
}

/// Pre-scans the root of a configuration tree for `locale` and `providers`.
pub fn read_generator_overrides(config: &Value) -> Result<GeneratorOverrides, AnonymizerError> {
    let root = expect_object(config, "strategy root")?;

    let locale = match root.get("locale") {
        None => None,
        Some(value) => Some(
            expect_string(value, "locale")?.to_string(),
        ),
    };

    let providers = match root.get("providers") {
        None => Vec::new(),
        Some(value) => expect_string_array(value, "providers")?,
    };

    Ok(GeneratorOverrides { locale, providers })
}

/// Normalizes and validates strategy configuration trees.
pub struct StrategyParser<'a> {
    generator: &'a dyn FakeColumnGenerator,
}

impl<'a> StrategyParser<'a> {
    /// Creates a parser validating against `generator`'s capability set.
    pub fn new(generator: &'a dyn FakeColumnGenerator) -> Self {
        Self { generator }
    }

    /// Parses a configuration tree into a [`DatabaseStrategy`].
    ///
    /// # Errors
    ///
    /// - [`AnonymizerError::ConfigSyntax`] for structural problems
    /// - [`AnonymizerError::UnknownTableStrategy`] /
    ///   [`AnonymizerError::UnknownColumnStrategy`] for unrecognized types
    /// - [`AnonymizerError::UnsupportedFakeType`] /
    ///   [`AnonymizerError::UnsupportedFakeArguments`] when a `fake_update`
    ///   column is outside the generator's capability set
    pub fn parse(&self, config: &Value) -> Result<DatabaseStrategy, AnonymizerError> {
        let root = expect_object(config, "strategy root")?;

        for key in root.keys() {
            if !ROOT_KEYS.contains(&key.as_str()) {
                return Err(AnonymizerError::config_syntax(format!(
                    "unknown root-level key `{}`",
                    key
                )));
            }
        }

        let tables_node = root
            .get("tables")
            .ok_or_else(|| AnonymizerError::config_syntax("strategy is missing `tables`"))?;
        let tables = self.parse_tables(tables_node)?;

        let (before_scripts, after_scripts) = match root.get("scripts") {
            None => (Vec::new(), Vec::new()),
            Some(node) => parse_scripts(node)?,
        };

        let overrides = read_generator_overrides(config)?;

        Ok(DatabaseStrategy {
            tables,
            before_scripts,
            after_scripts,
            locale: overrides.locale,
            providers: overrides.providers,
        })
    }

    fn parse_tables(&self, node: &Value) -> Result<Vec<TableStrategy>, AnonymizerError> {
        match node {
            Value::Object(map) => map
                .iter()
                .map(|(name, body)| self.parse_table(name, body))
                .collect(),
            Value::Array(entries) => entries
                .iter()
                .map(|entry| {
                    let body = expect_object(entry, "table entry")?;
                    let name = body
                        .get("table_name")
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            AnonymizerError::config_syntax(
                                "table entries in sequence form require a `table_name` string",
                            )
                        })?;
                    self.parse_table(name, entry)
                })
                .collect(),
            _ => Err(AnonymizerError::config_syntax(
                "`tables` must be a mapping or a sequence",
            )),
        }
    }

    fn parse_table(&self, name: &str, body: &Value) -> Result<TableStrategy, AnonymizerError> {
        match body {
            Value::String(shorthand) => match shorthand.as_str() {
                "truncate" => TableStrategy::new(name, None, TableStrategyKind::Truncate),
                "delete" => TableStrategy::new(name, None, TableStrategyKind::Delete),
                other => Err(AnonymizerError::UnknownTableStrategy(format!(
                    "{}: \"{}\"",
                    name, other
                ))),
            },
            Value::Object(map) => self.parse_table_mapping(name, map),
            other => Err(AnonymizerError::UnknownTableStrategy(format!(
                "{}: {}",
                name,
                render_node(other)
            ))),
        }
    }

    fn parse_table_mapping(
        &self,
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<TableStrategy, AnonymizerError> {
        check_name_key(map, "table_name", name)?;

        let declared_type = match map.get("type") {
            None => {
                // Type inference: a mapping holding `columns` is an update
                // table; anything else without a type is unknown.
                if map.contains_key("columns") {
                    "update_columns".to_string()
                } else {
                    return Err(AnonymizerError::UnknownTableStrategy(format!(
                        "{}: mapping without `type` or `columns`",
                        name
                    )));
                }
            }
            Some(value) => expect_string(value, "table `type`")?.to_ascii_lowercase(),
        };

        let schema = match map.get("schema") {
            None => None,
            Some(value) => Some(expect_string(value, "table `schema`")?.to_string()),
        };

        match declared_type.as_str() {
            "truncate" => {
                check_allowed_keys(map, name, TABLE_BASE_KEYS)?;
                TableStrategy::new(name, schema, TableStrategyKind::Truncate)
            }
            "delete" => {
                check_allowed_keys(map, name, TABLE_BASE_KEYS)?;
                TableStrategy::new(name, schema, TableStrategyKind::Delete)
            }
            "update_columns" => {
                let allowed: Vec<&str> = TABLE_BASE_KEYS.iter().copied().chain(["columns"]).collect();
                check_allowed_keys(map, name, &allowed)?;
                let columns_node = map.get("columns").ok_or_else(|| {
                    AnonymizerError::config_syntax(format!("{}: update_columns requires `columns`", name))
                })?;
                let columns = self.parse_columns(name, columns_node)?;
                TableStrategy::new(name, schema, TableStrategyKind::UpdateColumns(UpdateColumns::new(columns)?))
            }
            other => Err(AnonymizerError::UnknownTableStrategy(format!(
                "{}: type \"{}\"",
                name, other
            ))),
        }
    }

    fn parse_columns(&self, table_name: &str, node: &Value) -> Result<Vec<ColumnStrategy>, AnonymizerError> {
        let columns: Vec<ColumnStrategy> = match node {
            Value::Object(map) => map
                .iter()
                .map(|(name, body)| self.parse_column(table_name, name, body))
                .collect::<Result<_, _>>()?,
            Value::Array(entries) => entries
                .iter()
                .map(|entry| {
                    let body = expect_object(entry, "column entry")?;
                    let name = body
                        .get("column_name")
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            AnonymizerError::config_syntax(format!(
                                "{}: column entries in sequence form require a `column_name` string",
                                table_name
                            ))
                        })?;
                    self.parse_column(table_name, name, entry)
                })
                .collect::<Result<_, _>>()?,
            _ => {
                return Err(AnonymizerError::config_syntax(format!(
                    "{}: `columns` must be a mapping or a sequence",
                    table_name
                )))
            }
        };

        // Repeated column names are fine as long as their predicates differ;
        // the same (name, where) pair would emit two conflicting assignments.
        let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
        for column in &columns {
            let key = (column.column_name.clone(), column.where_condition.clone());
            if !seen.insert(key) {
                return Err(AnonymizerError::config_syntax(format!(
                    "{}: duplicate column `{}` with identical `where`",
                    table_name, column.column_name
                )));
            }
        }

        Ok(columns)
    }

    fn parse_column(
        &self,
        table_name: &str,
        name: &str,
        body: &Value,
    ) -> Result<ColumnStrategy, AnonymizerError> {
        match body {
            Value::String(shorthand) => {
                let kind = self.column_kind_from_shorthand(shorthand)?;
                ColumnStrategy::new(name, None, kind)
            }
            Value::Object(map) => self.parse_column_mapping(table_name, name, map),
            other => Err(AnonymizerError::UnknownColumnStrategy(format!(
                "{}.{}: {}",
                table_name,
                name,
                render_node(other)
            ))),
        }
    }

    fn column_kind_from_shorthand(&self, shorthand: &str) -> Result<ColumnStrategyKind, AnonymizerError> {
        let kind = match shorthand {
            "empty" => ColumnStrategyKind::Empty,
            "unique_email" => ColumnStrategyKind::UniqueEmail,
            "unique_login" => ColumnStrategyKind::UniqueLogin,
            literal if LITERAL_PATTERN.is_match(literal) => ColumnStrategyKind::Literal {
                value: literal.to_string(),
            },
            fake_type => {
                let spec = self.resolve_fake_spec(fake_type, FakeArgs::new())?;
                ColumnStrategyKind::FakeUpdate {
                    spec,
                    sql_type: None,
                }
            }
        };
        Ok(kind)
    }

    fn parse_column_mapping(
        &self,
        table_name: &str,
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<ColumnStrategy, AnonymizerError> {
        check_name_key(map, "column_name", name)?;

        let declared_type = match map.get("type") {
            None => {
                return Err(AnonymizerError::UnknownColumnStrategy(format!(
                    "{}.{}: mapping without explicit `type`",
                    table_name, name
                )))
            }
            Some(value) => expect_string(value, "column `type`")?.to_ascii_lowercase(),
        };

        let where_condition = match map.get("where") {
            None => None,
            Some(value) => {
                let predicate = expect_string(value, "column `where`")?;
                // An empty predicate emits no WHERE clause; fold it into the
                // unconditioned group.
                if predicate.is_empty() {
                    None
                } else {
                    Some(predicate.to_string())
                }
            }
        };

        let node = format!("{}.{}", table_name, name);
        let kind = match declared_type.as_str() {
            "empty" => {
                check_allowed_keys(map, &node, COLUMN_BASE_KEYS)?;
                ColumnStrategyKind::Empty
            }
            "unique_login" => {
                check_allowed_keys(map, &node, COLUMN_BASE_KEYS)?;
                ColumnStrategyKind::UniqueLogin
            }
            "unique_email" => {
                check_allowed_keys(map, &node, COLUMN_BASE_KEYS)?;
                ColumnStrategyKind::UniqueEmail
            }
            "literal" => {
                let allowed: Vec<&str> = COLUMN_BASE_KEYS.iter().copied().chain(["value"]).collect();
                check_allowed_keys(map, &node, &allowed)?;
                let value = map
                    .get("value")
                    .ok_or_else(|| AnonymizerError::config_syntax(format!("{}: literal requires `value`", node)))?;
                ColumnStrategyKind::Literal {
                    value: expect_string(value, "literal `value`")?.to_string(),
                }
            }
            "fake_update" => {
                let allowed: Vec<&str> = COLUMN_BASE_KEYS
                    .iter()
                    .copied()
                    .chain(["fake_type", "fake_args", "sql_type"])
                    .collect();
                check_allowed_keys(map, &node, &allowed)?;

                let fake_type = map
                    .get("fake_type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        AnonymizerError::config_syntax(format!("{}: fake_update requires a `fake_type` string", node))
                    })?;

                let fake_args = match map.get("fake_args") {
                    None => FakeArgs::new(),
                    Some(value) => parse_fake_args(&node, value)?,
                };

                let sql_type = match map.get("sql_type") {
                    None => None,
                    Some(value) => Some(expect_string(value, "column `sql_type`")?.to_string()),
                };

                let spec = self.resolve_fake_spec(fake_type, fake_args)?;
                ColumnStrategyKind::FakeUpdate { spec, sql_type }
            }
            other => {
                return Err(AnonymizerError::UnknownColumnStrategy(format!(
                    "{}: type \"{}\"",
                    node, other
                )))
            }
        };

        ColumnStrategy::new(name, where_condition, kind)
    }

    /// Checks a fake method against the generator and binds its data type.
    fn resolve_fake_spec(&self, method: &str, args: FakeArgs) -> Result<FakeSpec, AnonymizerError> {
        if !self.generator.supports(method) {
            return Err(AnonymizerError::UnsupportedFakeType(method.to_string()));
        }
        if !self.generator.supports_args(method, &args) {
            return Err(AnonymizerError::UnsupportedFakeArguments {
                method: method.to_string(),
                arguments: format_args(&args),
            });
        }
        let data_type = self.generator.data_type(method);
        Ok(FakeSpec::new(method, args, data_type))
    }
}

fn parse_scripts(node: &Value) -> Result<(Vec<String>, Vec<String>), AnonymizerError> {
    let map = expect_object(node, "`scripts`")?;
    for key in map.keys() {
        if key != "before" && key != "after" {
            return Err(AnonymizerError::config_syntax(format!(
                "unknown `scripts` key `{}`",
                key
            )));
        }
    }

    let before = match map.get("before") {
        None => Vec::new(),
        Some(value) => expect_string_array(value, "scripts `before`")?,
    };
    let after = match map.get("after") {
        None => Vec::new(),
        Some(value) => expect_string_array(value, "scripts `after`")?,
    };
    Ok((before, after))
}

fn parse_fake_args(node: &str, value: &Value) -> Result<FakeArgs, AnonymizerError> {
    let map = expect_object(value, "`fake_args`")?;
    let mut args = FakeArgs::new();
    for (key, arg) in map {
        let parsed = match arg {
            Value::String(s) => FakeArg::Str(s.clone()),
            Value::Bool(b) => FakeArg::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FakeArg::Int(i)
                } else if let Some(f) = n.as_f64() {
                    FakeArg::Float(f)
                } else {
                    return Err(AnonymizerError::config_syntax(format!(
                        "{}: fake_args `{}` is out of range",
                        node, key
                    )));
                }
            }
            other => {
                return Err(AnonymizerError::config_syntax(format!(
                    "{}: fake_args `{}` must be a scalar, got {}",
                    node,
                    key,
                    render_node(other)
                )))
            }
        };
        args.insert(key.clone(), parsed);
    }
    Ok(args)
}

/// A `table_name`/`column_name` key inside mapping-form bodies must agree
/// with the mapping key it sits under.
fn check_name_key(map: &Map<String, Value>, key: &str, expected: &str) -> Result<(), AnonymizerError> {
    if let Some(value) = map.get(key) {
        let declared = expect_string(value, key)?;
        if declared != expected {
            return Err(AnonymizerError::config_syntax(format!(
                "`{}` \"{}\" conflicts with mapping key \"{}\"",
                key, declared, expected
            )));
        }
    }
    Ok(())
}

fn check_allowed_keys(map: &Map<String, Value>, node: &str, allowed: &[&str]) -> Result<(), AnonymizerError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(AnonymizerError::config_syntax(format!(
                "{}: key `{}` is not valid here",
                node, key
            )));
        }
    }
    Ok(())
}

fn expect_object<'v>(value: &'v Value, what: &str) -> Result<&'v Map<String, Value>, AnonymizerError> {
    value
        .as_object()
        .ok_or_else(|| AnonymizerError::config_syntax(format!("{} must be a mapping", what)))
}

fn expect_string<'v>(value: &'v Value, what: &str) -> Result<&'v str, AnonymizerError> {
    value
        .as_str()
        .ok_or_else(|| AnonymizerError::config_syntax(format!("{} must be a string", what)))
}

fn expect_string_array(value: &Value, what: &str) -> Result<Vec<String>, AnonymizerError> {
    let entries = value
        .as_array()
        .ok_or_else(|| AnonymizerError::config_syntax(format!("{} must be a sequence", what)))?;
    entries
        .iter()
        .map(|entry| Ok(expect_string(entry, what)?.to_string()))
        .collect()
}

fn render_node(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
