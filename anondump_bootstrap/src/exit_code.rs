// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Codes
//!
//! The process exit contract:
//!
//! - `0` - success
//! - `1` - runtime failure: connection, dependency tool, unsupported fake
//!   type, anonymization errors, I/O
//! - `2` - argument validation failure (the validation messages are printed
//!   before exiting)

use anondump_domain::AnonymizerError;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    RuntimeError,
    UsageError,
}

impl ExitCode {
    /// The numeric code handed to the OS.
    pub fn code(self) -> u8 {
        match self {
            ExitCode::Success => 0,
            ExitCode::RuntimeError => 1,
            ExitCode::UsageError => 2,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}

/// Maps a domain error onto the exit contract.
pub fn exit_code_for(error: &AnonymizerError) -> ExitCode {
    if error.is_usage_error() {
        ExitCode::UsageError
    } else {
        ExitCode::RuntimeError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_validation_maps_to_usage_error() {
        let err = AnonymizerError::ArgumentValidation(vec!["Missing INPUT".to_string()]);
        assert_eq!(exit_code_for(&err), ExitCode::UsageError);
        assert_eq!(exit_code_for(&err).code(), 2);
    }

    #[test]
    fn test_runtime_errors_map_to_one() {
        assert_eq!(exit_code_for(&AnonymizerError::connection("boom")).code(), 1);
        assert_eq!(
            exit_code_for(&AnonymizerError::UnsupportedFakeType("x".to_string())).code(),
            1
        );
        assert_eq!(exit_code_for(&AnonymizerError::dependency("mysql", "gone")).code(), 1);
    }
}
