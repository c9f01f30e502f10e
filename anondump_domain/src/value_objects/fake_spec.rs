// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Fake Specification Value Object
//!
//! A [`FakeSpec`] identifies one fake-data producer invocation: a method name
//! plus an optional keyed argument set, together with the storage class the
//! generator reported for the method.
//!
//! ## Qualifiers
//!
//! Each spec derives a **qualifier**: a deterministic, args-aware identifier
//! used as the seed table's column name. Two specs with the same method but
//! different arguments must land in different seed columns, so the qualifier
//! appends a digest of the sorted argument pairs when arguments are present:
//!
//! ```text
//! first_name                      (no arguments)
//! random_int_5bbf0840...          (digest of "max_9_min_5")
//! ```
//!
//! The whole identifier is kept at or below 64 characters for maximum
//! database identifier compatibility.

use crate::services::fake_generator::{format_args, FakeArgs, FakeDataType};

/// Maximum qualifier length; the lowest common denominator of identifier
/// limits across the supported backends.
const QUALIFIER_MAX_LEN: usize = 64;

/// A resolved fake-data specification, bound at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeSpec {
    method: String,
    args: FakeArgs,
    data_type: FakeDataType,
    qualifier: String,
}

impl FakeSpec {
    /// Creates a spec with its qualifier precomputed.
    ///
    /// `data_type` is whatever the generator reported for `method`; the
    /// parser resolves it before constructing the spec so downstream code
    /// never needs the generator to describe a strategy.
    pub fn new(method: impl Into<String>, args: FakeArgs, data_type: FakeDataType) -> Self {
        let method = method.into();
        let qualifier = derive_qualifier(&method, &args);
        Self {
            method,
            args,
            data_type,
            qualifier,
        }
    }

    /// The fake method name, e.g. `first_name`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The keyword arguments passed to the method.
    pub fn args(&self) -> &FakeArgs {
        &self.args
    }

    /// The storage class of generated values.
    pub fn data_type(&self) -> FakeDataType {
        self.data_type
    }

    /// The deterministic, args-aware identifier for this spec.
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

fn derive_qualifier(method: &str, args: &FakeArgs) -> String {
    let qualifier = if args.is_empty() {
        method.to_string()
    } else {
        let digest = md5::compute(format_args(args).as_bytes());
        format!("{}_{:x}", method, digest)
    };
    if qualifier.chars().count() > QUALIFIER_MAX_LEN {
        qualifier.chars().take(QUALIFIER_MAX_LEN).collect()
    } else {
        qualifier
    }
}
