// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Column Strategy Value Object
//!
//! One declarative rule for one column of one table. The closed
//! [`ColumnStrategyKind`] enum is the single source of truth for what can be
//! done to a column; the per-backend SQL factories pattern-match on it
//! exhaustively.
//!
//! Every column strategy may carry a `where` predicate. Columns sharing an
//! identical predicate are rewritten in the same UPDATE statement; see
//! [`UpdateColumns::group_by_where`](crate::value_objects::table_strategy::UpdateColumns::group_by_where).

use crate::error::AnonymizerError;
use crate::value_objects::fake_spec::FakeSpec;

/// What to write into the column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnStrategyKind {
    /// Overwrite with the empty string.
    Empty,
    /// Overwrite with a per-row pseudo-unique token.
    UniqueLogin,
    /// Overwrite with a per-row pseudo-unique email address.
    UniqueEmail,
    /// Paste `value` into the assignment verbatim; it is expected to be a
    /// parenthesized SQL expression as written in the strategy file.
    Literal { value: String },
    /// Sample a fake value per row from the seed table column identified by
    /// `spec.qualifier()`, optionally casting to `sql_type`.
    FakeUpdate {
        spec: FakeSpec,
        sql_type: Option<String>,
    },
}

impl ColumnStrategyKind {
    /// Strategy-file name of this kind, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnStrategyKind::Empty => "empty",
            ColumnStrategyKind::UniqueLogin => "unique_login",
            ColumnStrategyKind::UniqueEmail => "unique_email",
            ColumnStrategyKind::Literal { .. } => "literal",
            ColumnStrategyKind::FakeUpdate { .. } => "fake_update",
        }
    }
}

/// A single column rewrite rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStrategy {
    pub column_name: String,
    pub where_condition: Option<String>,
    pub kind: ColumnStrategyKind,
}

impl ColumnStrategy {
    /// Creates a column strategy, rejecting empty column names.
    pub fn new(
        column_name: impl Into<String>,
        where_condition: Option<String>,
        kind: ColumnStrategyKind,
    ) -> Result<Self, AnonymizerError> {
        let column_name = column_name.into();
        if column_name.is_empty() {
            return Err(AnonymizerError::config_syntax("column name must not be empty"));
        }
        Ok(Self {
            column_name,
            where_condition,
            kind,
        })
    }

    /// The fake spec, when this is a fake-update column.
    pub fn fake_spec(&self) -> Option<&FakeSpec> {
        match &self.kind {
            ColumnStrategyKind::FakeUpdate { spec, .. } => Some(spec),
            _ => None,
        }
    }
}
