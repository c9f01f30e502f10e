// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Strategy File Loading
//!
//! Reads a strategy file from disk and decodes it into the configuration
//! tree the domain parser consumes. The format is selected by extension:
//! `.yml`/`.yaml` decode as YAML, `.json` as JSON. Key order is preserved so
//! the strategy's table order matches the file.

use std::path::Path;

use anondump_domain::AnonymizerError;
use serde_json::Value;

/// Reads and decodes the strategy file at `path`.
///
/// # Errors
///
/// - [`AnonymizerError::ConfigSyntax`] for an unrecognized extension or a
///   malformed document
/// - [`AnonymizerError::IoError`] when the file cannot be read
pub fn read_config(path: &str) -> Result<Value, AnonymizerError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|err| AnonymizerError::io_error(format!("failed to read strategy file {}: {}", path, err)))?;

    let extension = Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("yml") | Some("yaml") => serde_yaml::from_str(&contents)
            .map_err(|err| AnonymizerError::config_syntax(format!("invalid YAML in {}: {}", path, err))),
        Some("json") => serde_json::from_str(&contents)
            .map_err(|err| AnonymizerError::config_syntax(format!("invalid JSON in {}: {}", path, err))),
        _ => Err(AnonymizerError::config_syntax(format!(
            "unknown strategy file type for {}; expected .yml, .yaml or .json",
            path
        ))),
    }
}

/// Derives a working database name from the strategy file name plus a random
/// token, e.g. `strategy_0f8a...`. Used when no `--db-name` is supplied.
pub fn temp_db_name(strategy_path: &str) -> String {
    let stem = Path::new(strategy_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "anondump".to_string());
    format!("{}_{}", stem, uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_yaml_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strategy.yml");
        std::fs::write(&path, "tables:\n  logs: truncate\n").unwrap();

        let config = read_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config["tables"]["logs"], Value::String("truncate".to_string()));
    }

    #[test]
    fn test_reads_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strategy.json");
        std::fs::write(&path, r#"{"tables": {"logs": "truncate"}}"#).unwrap();

        let config = read_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config["tables"]["logs"], Value::String("truncate".to_string()));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strategy.toml");
        std::fs::write(&path, "x = 1").unwrap();

        let err = read_config(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, AnonymizerError::ConfigSyntax(_)));
    }

    #[test]
    fn test_temp_db_name_uses_file_stem() {
        let name = temp_db_name("strategies/customers.yml");
        assert!(name.starts_with("customers_"));
        assert!(name.len() > "customers_".len());

        // two calls differ in their random token
        assert_ne!(name, temp_db_name("strategies/customers.yml"));
    }
}
