// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Table Strategy Value Object
//!
//! One declarative rule for one table: truncate it, delete its rows, or
//! rewrite a set of its columns. Table strategies carry the table name and an
//! optional schema; ordering of tables is preserved from the source
//! configuration by the parser.

use indexmap::IndexMap;

use crate::error::AnonymizerError;
use crate::value_objects::column_strategy::ColumnStrategy;

/// The column set of an `update_columns` table strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateColumns {
    pub columns: Vec<ColumnStrategy>,
}

impl UpdateColumns {
    /// Creates the column set, rejecting an empty one.
    pub fn new(columns: Vec<ColumnStrategy>) -> Result<Self, AnonymizerError> {
        if columns.is_empty() {
            return Err(AnonymizerError::config_syntax(
                "update_columns requires at least one column",
            ));
        }
        Ok(Self { columns })
    }

    /// Groups columns by their `where` predicate, preserving first-seen
    /// order of both groups and columns.
    ///
    /// The `None` group collects columns without a predicate. One UPDATE
    /// statement is emitted per group.
    pub fn group_by_where(&self) -> IndexMap<Option<String>, Vec<&ColumnStrategy>> {
        let mut grouped: IndexMap<Option<String>, Vec<&ColumnStrategy>> = IndexMap::new();
        for column in &self.columns {
            grouped
                .entry(column.where_condition.clone())
                .or_default()
                .push(column);
        }
        grouped
    }
}

/// What to do to the table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableStrategyKind {
    /// Empty the table with the backend's truncate mechanism.
    Truncate,
    /// Empty the table with a row-wise delete (or the backend's closest
    /// equivalent).
    Delete,
    /// Rewrite the listed columns in place.
    UpdateColumns(UpdateColumns),
}

impl TableStrategyKind {
    /// Strategy-file name of this kind, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TableStrategyKind::Truncate => "truncate",
            TableStrategyKind::Delete => "delete",
            TableStrategyKind::UpdateColumns(_) => "update_columns",
        }
    }
}

/// A single table rule.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStrategy {
    pub table_name: String,
    pub schema: Option<String>,
    pub kind: TableStrategyKind,
}

impl TableStrategy {
    /// Creates a table strategy, rejecting empty table names.
    pub fn new(
        table_name: impl Into<String>,
        schema: Option<String>,
        kind: TableStrategyKind,
    ) -> Result<Self, AnonymizerError> {
        let table_name = table_name.into();
        if table_name.is_empty() {
            return Err(AnonymizerError::config_syntax("table name must not be empty"));
        }
        Ok(Self {
            table_name,
            schema,
            kind,
        })
    }

    /// `schema.table` when a schema is present, bare table name otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table_name),
            None => self.table_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::column_strategy::ColumnStrategyKind;

    fn column(name: &str, where_condition: Option<&str>) -> ColumnStrategy {
        ColumnStrategy::new(
            name,
            where_condition.map(|w| w.to_string()),
            ColumnStrategyKind::Empty,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_table_name_rejected() {
        let result = TableStrategy::new("", None, TableStrategyKind::Truncate);
        assert!(result.is_err());
    }

    #[test]
    fn test_qualified_name() {
        let bare = TableStrategy::new("users", None, TableStrategyKind::Truncate).unwrap();
        assert_eq!(bare.qualified_name(), "users");

        let qualified = TableStrategy::new("users", Some("app".to_string()), TableStrategyKind::Truncate).unwrap();
        assert_eq!(qualified.qualified_name(), "app.users");
    }

    #[test]
    fn test_update_columns_rejects_empty_set() {
        assert!(UpdateColumns::new(Vec::new()).is_err());
    }

    #[test]
    fn test_group_by_where_preserves_order_and_collects_none_group() {
        let update = UpdateColumns::new(vec![
            column("a", None),
            column("b", Some("active = 1")),
            column("c", None),
            column("d", Some("active = 1")),
            column("e", Some("active = 0")),
        ])
        .unwrap();

        let grouped = update.group_by_where();
        let keys: Vec<_> = grouped.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                None,
                Some("active = 1".to_string()),
                Some("active = 0".to_string()),
            ]
        );

        let unconditioned: Vec<_> = grouped[&None].iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(unconditioned, vec!["a", "c"]);

        let active: Vec<_> = grouped[&Some("active = 1".to_string())]
            .iter()
            .map(|c| c.column_name.as_str())
            .collect();
        assert_eq!(active, vec!["b", "d"]);
    }

    #[test]
    fn test_group_count_matches_distinct_where_values() {
        let update = UpdateColumns::new(vec![
            column("a", Some("x = 1")),
            column("b", Some("x = 2")),
            column("c", Some("x = 1")),
        ])
        .unwrap();

        assert_eq!(update.group_by_where().len(), 2);
    }
}
