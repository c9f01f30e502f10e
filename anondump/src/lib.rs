// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Anondump
//!
//! Application and infrastructure layers of the anondump anonymization
//! system. Anondump produces an anonymized dump of a relational database
//! from a source production dump:
//!
//! ```text
//! CREATE_DB → RESTORE_DB → ANONYMIZE_DB → DUMP_DB → DROP_DB
//! ```
//!
//! A transient working database receives the restored dump, is rewritten
//! in place according to a declarative per-table/per-column strategy (with
//! a generated seed table of fake values as the randomization source), is
//! dumped to the destination, and is dropped.
//!
//! ## Layers
//!
//! - **Application** ([`application`]): the anonymization engine
//!   (seed/scripts/worker-pool orchestration) and the run-process use case
//!   that walks the step lifecycle.
//! - **Infrastructure** ([`infrastructure`]): per-backend SQL factories and
//!   drivers (MySQL and PostgreSQL via their client tools, MSSQL via the
//!   native TDS driver), the fake-data adapter, and the streaming I/O codec
//!   with transparent gzip/xz handling.
//!
//! The domain types these layers orchestrate live in `anondump_domain`;
//! entry-point concerns (CLI, logging setup, exit codes) live in
//! `anondump_bootstrap`.

pub mod application;
pub mod infrastructure;
