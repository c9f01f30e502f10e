// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Fake Data Adapter
//!
//! Implements the domain's
//! [`FakeColumnGenerator`](anondump_domain::FakeColumnGenerator) port on top
//! of a locale-aware fake-data library, extended with user-registered custom
//! providers.

pub mod faker_generator;
pub mod providers;

pub use faker_generator::{FakeLocale, FakerColumnGenerator, DEFAULT_LOCALE};
pub use providers::{register_provider, FakeProvider};
