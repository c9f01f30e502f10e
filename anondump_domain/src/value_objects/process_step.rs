// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Process Step Enumeration
//!
//! The fixed, ordered lifecycle the run-process pipeline traverses:
//!
//! ```text
//! START < CREATE_DB < RESTORE_DB < ANONYMIZE_DB < DUMP_DB < DROP_DB < END
//! ```
//!
//! Values are sparse so future steps can be inserted without renumbering
//! everything downstream. `START` and `END` are markers for the
//! start-at/stop-at range arithmetic and have no step action of their own.

use std::fmt;

/// One element of the fixed process lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcessStep {
    Start,
    CreateDb,
    RestoreDb,
    AnonymizeDb,
    DumpDb,
    DropDb,
    End,
}

impl ProcessStep {
    /// Every step, in lifecycle order.
    pub const ALL: [ProcessStep; 7] = [
        ProcessStep::Start,
        ProcessStep::CreateDb,
        ProcessStep::RestoreDb,
        ProcessStep::AnonymizeDb,
        ProcessStep::DumpDb,
        ProcessStep::DropDb,
        ProcessStep::End,
    ];

    /// Sparse ordinal; gaps allow future insertion.
    pub fn value(self) -> u32 {
        match self {
            ProcessStep::Start => 0,
            ProcessStep::CreateDb => 200,
            ProcessStep::RestoreDb => 300,
            ProcessStep::AnonymizeDb => 400,
            ProcessStep::DumpDb => 500,
            ProcessStep::DropDb => 600,
            ProcessStep::End => 9999,
        }
    }

    /// Canonical upper-snake-case name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ProcessStep::Start => "START",
            ProcessStep::CreateDb => "CREATE_DB",
            ProcessStep::RestoreDb => "RESTORE_DB",
            ProcessStep::AnonymizeDb => "ANONYMIZE_DB",
            ProcessStep::DumpDb => "DUMP_DB",
            ProcessStep::DropDb => "DROP_DB",
            ProcessStep::End => "END",
        }
    }

    /// All canonical names, in lifecycle order.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|step| step.name()).collect()
    }

    /// Resolves a step from its case-insensitive name.
    pub fn from_name(name: &str) -> Option<ProcessStep> {
        let upper = name.trim().to_ascii_uppercase();
        Self::ALL.iter().copied().find(|step| step.name() == upper)
    }
}

impl fmt::Display for ProcessStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_ordered() {
        assert!(ProcessStep::Start < ProcessStep::CreateDb);
        assert!(ProcessStep::CreateDb < ProcessStep::RestoreDb);
        assert!(ProcessStep::RestoreDb < ProcessStep::AnonymizeDb);
        assert!(ProcessStep::AnonymizeDb < ProcessStep::DumpDb);
        assert!(ProcessStep::DumpDb < ProcessStep::DropDb);
        assert!(ProcessStep::DropDb < ProcessStep::End);
    }

    #[test]
    fn test_declaration_order_matches_value_order() {
        let values: Vec<u32> = ProcessStep::ALL.iter().map(|s| s.value()).collect();
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(values, sorted);
    }

    #[test]
    fn test_from_name_case_insensitive() {
        assert_eq!(ProcessStep::from_name("anonymize_db"), Some(ProcessStep::AnonymizeDb));
        assert_eq!(ProcessStep::from_name("ANONYMIZE_DB"), Some(ProcessStep::AnonymizeDb));
        assert_eq!(ProcessStep::from_name(" create_db "), Some(ProcessStep::CreateDb));
        assert_eq!(ProcessStep::from_name("bogus"), None);
    }

    #[test]
    fn test_names_round_trip() {
        for name in ProcessStep::names() {
            assert!(ProcessStep::from_name(name).is_some());
        }
    }
}
