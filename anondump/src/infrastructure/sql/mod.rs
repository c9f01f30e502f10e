// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Per-Backend SQL Factories
//!
//! Pure implementations of the
//! [`QueryFactory`](anondump_domain::QueryFactory) port. Each backend
//! module is the single exhaustive match site over the column-strategy
//! variants for that backend's dialect.
//!
//! ## The correlated-subquery requirement
//!
//! The fake-update assignment samples one row from the seed table *per outer
//! row*. A plain scalar subquery would let the planner cache one sample and
//! smear it across the whole table, so every backend uses a correlation that
//! forces per-row re-evaluation:
//!
//! - **MySQL**: `ORDER BY RAND() LIMIT 1` inside the subquery (and
//!   MD5-of-time-and-rand expressions instead of `UUID()`, which has a known
//!   uniqueness bug inside subqueries).
//! - **PostgreSQL**: a deterministic pseudo-random seed-row index keyed on
//!   `MD5(updatetarget::text)`, i.e. on the outer row itself.
//! - **MSSQL**: `TOP 1 ... WHERE [outer].[col] LIKE '%' OR [outer].[col] IS
//!   NULL ORDER BY NEWID()`; the vacuous outer-row predicate defeats result
//!   caching.

pub mod mssql;
pub mod mysql;
pub mod postgres;
