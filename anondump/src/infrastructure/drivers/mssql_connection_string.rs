// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # ADO Connection String Builder
//!
//! SQL Server connections are configured with `key=value;` connection
//! strings. A user-supplied `--mssql-connection-string` is authoritative:
//! the driver only fills in keys the user left out, and key matching is
//! case-insensitive and alias-aware (`Server`/`Data Source`,
//! `Database`/`Initial Catalog`, `User ID`/`UID`, `Password`/`PWD`), so a
//! user key is never overridden through a synonym either.

use indexmap::IndexMap;

use anondump_domain::AnonymizerError;

/// An ordered `key=value;` connection string under construction.
#[derive(Debug, Clone, Default)]
pub struct AdoConnectionString {
    pairs: IndexMap<String, String>,
}

/// Folds key aliases together for collision checks.
fn canonical(key: &str) -> String {
    let folded = key.trim().to_ascii_lowercase();
    match folded.as_str() {
        "data source" | "addr" | "address" | "network address" => "server".to_string(),
        "initial catalog" => "database".to_string(),
        "uid" | "user" => "user id".to_string(),
        "pwd" => "password".to_string(),
        other => other.to_string(),
    }
}

impl AdoConnectionString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a user-supplied connection string, preserving key order and
    /// spelling.
    pub fn parse(raw: &str) -> Result<Self, AnonymizerError> {
        let mut pairs = IndexMap::new();
        for fragment in raw.split(';') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            let (key, value) = fragment.split_once('=').ok_or_else(|| {
                AnonymizerError::ArgumentValidation(vec![format!(
                    "invalid mssql connection string fragment `{}` (expected key=value)",
                    fragment
                )])
            })?;
            pairs.insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(Self { pairs })
    }

    /// Whether `key` (or an alias of it) is present.
    pub fn contains(&self, key: &str) -> bool {
        let wanted = canonical(key);
        self.pairs.keys().any(|existing| canonical(existing) == wanted)
    }

    /// Sets `key`, replacing an existing value under the same canonical key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let wanted = canonical(key);
        let existing = self
            .pairs
            .keys()
            .find(|existing| canonical(existing) == wanted)
            .cloned();
        match existing {
            Some(existing_key) => {
                self.pairs.insert(existing_key, value.into());
            }
            None => {
                self.pairs.insert(key.to_string(), value.into());
            }
        }
    }

    /// Sets `key` only when the user did not supply it (under any alias).
    pub fn set_if_absent(&mut self, key: &str, value: impl Into<String>) {
        if !self.contains(key) {
            self.pairs.insert(key.to_string(), value.into());
        }
    }

    /// Renders the `key=value;` string.
    pub fn build(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_build_round_trip() {
        let parsed = AdoConnectionString::parse("Server=tcp:db,1433;User ID=sa;Password=x").unwrap();
        assert_eq!(parsed.build(), "Server=tcp:db,1433;User ID=sa;Password=x");
    }

    #[test]
    fn test_user_keys_are_never_overridden() {
        let mut cs = AdoConnectionString::parse("Data Source=users-choice").unwrap();
        cs.set_if_absent("Server", "drivers-choice");
        assert_eq!(cs.build(), "Data Source=users-choice");
    }

    #[test]
    fn test_alias_aware_contains() {
        let cs = AdoConnectionString::parse("Initial Catalog=master;UID=sa;PWD=x").unwrap();
        assert!(cs.contains("Database"));
        assert!(cs.contains("User ID"));
        assert!(cs.contains("Password"));
        assert!(!cs.contains("Server"));
    }

    #[test]
    fn test_set_replaces_through_alias() {
        let mut cs = AdoConnectionString::parse("Initial Catalog=master").unwrap();
        cs.set("Database", "workdb");
        assert_eq!(cs.build(), "Initial Catalog=workdb");
    }

    #[test]
    fn test_fragment_without_equals_rejected() {
        assert!(AdoConnectionString::parse("Server=x;garbage").is_err());
    }

    #[test]
    fn test_fill_in_around_user_keys() {
        let mut cs = AdoConnectionString::parse("Encrypt=true").unwrap();
        cs.set_if_absent("Server", "localhost");
        cs.set_if_absent("TrustServerCertificate", "true");
        assert_eq!(cs.build(), "Encrypt=true;Server=localhost;TrustServerCertificate=true");
    }
}
