// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Custom Fake Providers
//!
//! A strategy file may name custom providers to extend the generator's
//! capability set:
//!
//! ```yaml
//! providers: [acme_tokens]
//! ```
//!
//! Providers are discovered through a compiled-in registration table:
//! embedding code registers a [`FakeProvider`] implementation under an
//! identifier before the run starts, and the strategy file selects entries
//! by that identifier. Methods offered by a provider shadow built-in methods
//! of the same name.

use std::collections::HashMap;
use std::sync::Arc;

use anondump_domain::{AnonymizerError, FakeArgs, FakeDataType, FakeValue};
use parking_lot::RwLock;

/// A user-supplied source of additional fake methods.
pub trait FakeProvider: Send + Sync {
    /// The method names this provider offers.
    fn methods(&self) -> Vec<String>;

    /// Storage class of `method`'s values; only called for methods this
    /// provider offers.
    fn data_type(&self, method: &str) -> FakeDataType;

    /// Whether `args` is an acceptable argument set for `method`.
    fn accepts(&self, method: &str, args: &FakeArgs) -> bool;

    /// Generates one value.
    fn value(&self, method: &str, args: &FakeArgs) -> Result<FakeValue, AnonymizerError>;
}

static REGISTRY: once_cell::sync::Lazy<RwLock<HashMap<String, Arc<dyn FakeProvider>>>> =
    once_cell::sync::Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers `provider` under `name` for later selection by strategy files.
///
/// Registering the same name twice replaces the earlier provider.
pub fn register_provider(name: impl Into<String>, provider: Arc<dyn FakeProvider>) {
    REGISTRY.write().insert(name.into(), provider);
}

/// Resolves the providers a strategy file asked for.
///
/// # Errors
///
/// Fails with [`AnonymizerError::UnsupportedFakeType`] naming the first
/// unknown provider identifier.
pub fn resolve_providers(names: &[String]) -> Result<Vec<Arc<dyn FakeProvider>>, AnonymizerError> {
    let registry = REGISTRY.read();
    names
        .iter()
        .map(|name| {
            registry.get(name).cloned().ok_or_else(|| {
                AnonymizerError::UnsupportedFakeType(format!("custom provider `{}` is not registered", name))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TokenProvider;

    impl FakeProvider for TokenProvider {
        fn methods(&self) -> Vec<String> {
            vec!["acme_token".to_string()]
        }

        fn data_type(&self, _method: &str) -> FakeDataType {
            FakeDataType::String
        }

        fn accepts(&self, _method: &str, args: &FakeArgs) -> bool {
            args.is_empty()
        }

        fn value(&self, _method: &str, _args: &FakeArgs) -> Result<FakeValue, AnonymizerError> {
            Ok(FakeValue::String("tok_0000".to_string()))
        }
    }

    #[test]
    fn test_register_and_resolve() {
        register_provider("acme_tokens_test", Arc::new(TokenProvider));
        let resolved = resolve_providers(&["acme_tokens_test".to_string()]).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].methods(), vec!["acme_token".to_string()]);
    }

    #[test]
    fn test_unknown_provider_fails() {
        match resolve_providers(&["never_registered".to_string()]) {
            Err(err) => assert!(matches!(err, AnonymizerError::UnsupportedFakeType(_))),
            Ok(_) => panic!("expected an error"),
        }
    }
}
