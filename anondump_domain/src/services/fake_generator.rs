// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Fake Value Generator Port
//!
//! This module defines the contract between the strategy layer and the
//! locale-aware fake-data library that backs it. The generator is a value
//! source indexed by a string "method name" plus an optional keyed argument
//! set.
//!
//! ## Overview
//!
//! - **Capability checks**: [`FakeColumnGenerator::supports`] and
//!   [`FakeColumnGenerator::supports_args`] let the strategy parser reject a
//!   configuration before any destructive step runs.
//! - **Data types**: every method has a [`FakeDataType`] used to derive the
//!   seed table's column types. Unknown methods default to `String`; a fixed
//!   lookup in the implementation maps the known temporal and numeric
//!   producers.
//! - **Values**: [`FakeColumnGenerator::value`] produces one independently
//!   sampled scalar per call. The engine calls it once per seed row and
//!   column, so the seed table ends up with independently sampled rows.
//!
//! ## Thread Safety
//!
//! The generator is only invoked during seeding, which is single-threaded,
//! but implementations are still `Send + Sync` so the engine can hold them
//! behind an `Arc` alongside the rest of its collaborators.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::AnonymizerError;

/// Rough storage class of a generated value.
///
/// Backends map these onto concrete column types when creating the seed
/// table (`TEXT`/`VARCHAR`, `INT`, `DATE`, `DATETIME`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeDataType {
    String,
    Int,
    Date,
    DateTime,
}

/// One generated scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeValue {
    String(String),
    Int(i64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl FakeValue {
    /// The storage class this value belongs to.
    pub fn data_type(&self) -> FakeDataType {
        match self {
            FakeValue::String(_) => FakeDataType::String,
            FakeValue::Int(_) => FakeDataType::Int,
            FakeValue::Date(_) => FakeDataType::Date,
            FakeValue::DateTime(_) => FakeDataType::DateTime,
        }
    }
}

impl fmt::Display for FakeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FakeValue::String(s) => write!(f, "{}", s),
            FakeValue::Int(i) => write!(f, "{}", i),
            FakeValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FakeValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// One keyword argument to a fake method.
///
/// Argument values come from the strategy file and are limited to scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeArg {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for FakeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FakeArg::Str(s) => write!(f, "{}", s),
            FakeArg::Int(i) => write!(f, "{}", i),
            FakeArg::Float(x) => write!(f, "{}", x),
            FakeArg::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Keyed argument set for a fake method.
///
/// A `BTreeMap` keeps the keys sorted, which makes qualifier derivation
/// deterministic regardless of authoring order in the strategy file.
pub type FakeArgs = BTreeMap<String, FakeArg>;

/// Renders an argument set the way error messages and digests expect:
/// `key_value` pairs in key order, joined with `_`.
pub fn format_args(args: &FakeArgs) -> String {
    args.iter()
        .map(|(key, value)| format!("{}_{}", key, value))
        .collect::<Vec<_>>()
        .join("_")
}

/// Interface for locale-aware fake-value generation.
///
/// Implementations are backed by a fake-data library plus any custom
/// providers registered at construction time.
pub trait FakeColumnGenerator: Send + Sync {
    /// Returns true iff a producer named `method` exists.
    fn supports(&self, method: &str) -> bool;

    /// Returns true iff `method` exists and every key in `args` is an
    /// accepted keyword of that producer.
    fn supports_args(&self, method: &str, args: &FakeArgs) -> bool;

    /// Gets the storage class for `method`'s values.
    ///
    /// Defaults to [`FakeDataType::String`] for unknown methods.
    fn data_type(&self, method: &str) -> FakeDataType;

    /// Generates one value.
    ///
    /// # Errors
    ///
    /// - [`AnonymizerError::UnsupportedFakeType`] if no producer named
    ///   `method` exists
    /// - [`AnonymizerError::UnsupportedFakeArguments`] if an argument key is
    ///   not accepted by the producer
    fn value(&self, method: &str, args: &FakeArgs) -> Result<FakeValue, AnonymizerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_args_sorted_by_key() {
        let mut args = FakeArgs::new();
        args.insert("min".to_string(), FakeArg::Int(5));
        args.insert("max".to_string(), FakeArg::Int(9));

        // BTreeMap iteration order is key order, not insertion order
        assert_eq!(format_args(&args), "max_9_min_5");
    }

    #[test]
    fn test_fake_value_display() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert_eq!(FakeValue::Date(date).to_string(), "2021-03-04");
        assert_eq!(
            FakeValue::DateTime(date.and_hms_opt(10, 20, 30).unwrap()).to_string(),
            "2021-03-04 10:20:30"
        );
        assert_eq!(FakeValue::Int(42).to_string(), "42");
    }

    #[test]
    fn test_fake_value_data_type() {
        assert_eq!(FakeValue::String("x".to_string()).data_type(), FakeDataType::String);
        assert_eq!(FakeValue::Int(1).data_type(), FakeDataType::Int);
    }
}
