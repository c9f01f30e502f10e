// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Database Strategy
//!
//! The root of the parsed strategy: everything the anonymization engine
//! needs to transform one working database. A [`DatabaseStrategy`] is
//! immutable after parsing and safely shared across worker tasks.
//!
//! ## Structure
//!
//! - `tables` - per-table rules, in source-configuration order
//! - `before_scripts` / `after_scripts` - opaque SQL run around the table
//!   phase, in order
//! - `locale` / `providers` - fake-generator overrides read from the
//!   strategy file's root
//!
//! ## Qualifier map
//!
//! [`DatabaseStrategy::fake_update_qualifier_map`] collects every
//! `FakeUpdate` column's [`FakeSpec`] keyed by qualifier, preserving
//! first-seen order. The seed table's column set is exactly this map's key
//! set; two specs differing only in arguments occupy distinct entries.

use indexmap::IndexMap;

use crate::value_objects::fake_spec::FakeSpec;
use crate::value_objects::table_strategy::{TableStrategy, TableStrategyKind};

/// The parsed, validated, immutable per-database anonymization plan.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseStrategy {
    pub tables: Vec<TableStrategy>,
    pub before_scripts: Vec<String>,
    pub after_scripts: Vec<String>,
    pub locale: Option<String>,
    pub providers: Vec<String>,
}

impl DatabaseStrategy {
    /// Collects one entry per distinct fake specification across every
    /// `update_columns` table, keyed by qualifier, in first-seen order.
    pub fn fake_update_qualifier_map(&self) -> IndexMap<String, FakeSpec> {
        let mut map = IndexMap::new();
        for table in &self.tables {
            if let TableStrategyKind::UpdateColumns(update) = &table.kind {
                for column in &update.columns {
                    if let Some(spec) = column.fake_spec() {
                        map.entry(spec.qualifier().to_string())
                            .or_insert_with(|| spec.clone());
                    }
                }
            }
        }
        map
    }

    /// Whether any table requires the seed table at all.
    pub fn needs_seeding(&self) -> bool {
        !self.fake_update_qualifier_map().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fake_generator::{FakeArg, FakeArgs, FakeDataType};
    use crate::value_objects::column_strategy::{ColumnStrategy, ColumnStrategyKind};
    use crate::value_objects::table_strategy::UpdateColumns;

    fn fake_column(name: &str, method: &str, args: FakeArgs) -> ColumnStrategy {
        ColumnStrategy::new(
            name,
            None,
            ColumnStrategyKind::FakeUpdate {
                spec: FakeSpec::new(method, args, FakeDataType::String),
                sql_type: None,
            },
        )
        .unwrap()
    }

    fn strategy(tables: Vec<TableStrategy>) -> DatabaseStrategy {
        DatabaseStrategy {
            tables,
            before_scripts: Vec::new(),
            after_scripts: Vec::new(),
            locale: None,
            providers: Vec::new(),
        }
    }

    #[test]
    fn test_qualifier_map_deduplicates_identical_specs() {
        let table_a = TableStrategy::new(
            "users",
            None,
            TableStrategyKind::UpdateColumns(
                UpdateColumns::new(vec![fake_column("first_name", "first_name", FakeArgs::new())]).unwrap(),
            ),
        )
        .unwrap();
        let table_b = TableStrategy::new(
            "employees",
            None,
            TableStrategyKind::UpdateColumns(
                UpdateColumns::new(vec![fake_column("fname", "first_name", FakeArgs::new())]).unwrap(),
            ),
        )
        .unwrap();

        let map = strategy(vec![table_a, table_b]).fake_update_qualifier_map();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("first_name"));
    }

    #[test]
    fn test_qualifier_map_distinguishes_arg_variants() {
        let mut low = FakeArgs::new();
        low.insert("max".to_string(), FakeArg::Int(10));
        let mut high = FakeArgs::new();
        high.insert("max".to_string(), FakeArg::Int(1000));

        let table = TableStrategy::new(
            "orders",
            None,
            TableStrategyKind::UpdateColumns(
                UpdateColumns::new(vec![
                    fake_column("quantity", "random_int", low),
                    fake_column("total", "random_int", high),
                ])
                .unwrap(),
            ),
        )
        .unwrap();

        let map = strategy(vec![table]).fake_update_qualifier_map();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_needs_seeding_false_for_truncate_only() {
        let table = TableStrategy::new("logs", None, TableStrategyKind::Truncate).unwrap();
        assert!(!strategy(vec![table]).needs_seeding());
    }
}
