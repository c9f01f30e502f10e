// /////////////////////////////////////////////////////////////////////////////
// Anondump RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Step Actions
//!
//! The pipeline never decides mid-flight whether to run a step. A
//! [`StepActionMap`] is computed once at the start of a run from the
//! `start-at` / `stop-at` / `only-step` / `skip-steps` / `dry-run` flags and
//! consulted (and logged) as each step comes up.
//!
//! ## The skip law
//!
//! For any step `s`:
//!
//! ```text
//! skipped(s)  ⇔  s < start_at  ∨  s > stop_at  ∨  s ∈ skip_steps  ∨  dry_run
//! ```
//!
//! `only-step X` is shorthand for `start-at X, stop-at X`. Every skip keeps
//! its reasons so the log explains *why* a step did not run.

use std::fmt;

use indexmap::IndexMap;

use crate::value_objects::process_step::ProcessStep;

/// Why a step will not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The run is a dry run; nothing runs.
    DryRun,
    /// The step precedes the requested starting point.
    BeforeStart(ProcessStep),
    /// The step follows the requested stopping point.
    AfterStop(ProcessStep),
    /// The step was listed in `skip-steps`.
    ExplicitSkip(Vec<ProcessStep>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DryRun => write!(f, "Skipping (DRY RUN)"),
            SkipReason::BeforeStart(start) => write!(f, "Starting at [{}]", start),
            SkipReason::AfterStop(stop) => write!(f, "Stopped at [{}]", stop),
            SkipReason::ExplicitSkip(steps) => {
                let formatted = steps
                    .iter()
                    .map(|step| format!("[{}]", step))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Skipping ({})", formatted)
            }
        }
    }
}

/// The action for one step: run, or skip for the recorded reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepAction {
    pub step: ProcessStep,
    pub skip_reasons: Vec<SkipReason>,
}

impl StepAction {
    fn new(
        step: ProcessStep,
        start_at: ProcessStep,
        stop_at: ProcessStep,
        skip_steps: &[ProcessStep],
        dry_run: bool,
    ) -> Self {
        let mut skip_reasons = Vec::new();

        if dry_run {
            skip_reasons.push(SkipReason::DryRun);
        }
        if start_at.value() > step.value() {
            skip_reasons.push(SkipReason::BeforeStart(start_at));
        }
        if stop_at.value() < step.value() {
            skip_reasons.push(SkipReason::AfterStop(stop_at));
        }
        if skip_steps.contains(&step) {
            skip_reasons.push(SkipReason::ExplicitSkip(skip_steps.to_vec()));
        }

        Self { step, skip_reasons }
    }

    /// A step is skipped iff at least one reason applies.
    pub fn skipped(&self) -> bool {
        !self.skip_reasons.is_empty()
    }

    /// Renders the log line announcing this step's fate.
    pub fn summary(&self) -> String {
        if self.skipped() {
            let reasons = self
                .skip_reasons
                .iter()
                .map(|reason| reason.to_string())
                .collect::<Vec<_>>()
                .join(",\n");
            format!("Skipped [{}]: ({})", self.step, reasons)
        } else {
            format!("[{}]", self.step)
        }
    }
}

/// The precomputed action for every step of the lifecycle.
#[derive(Debug, Clone)]
pub struct StepActionMap {
    actions: IndexMap<ProcessStep, StepAction>,
}

impl StepActionMap {
    /// Computes the action map from the process-control flags.
    ///
    /// `only_step` overrides both `start_at` and `stop_at`.
    pub fn new(
        start_at: Option<ProcessStep>,
        stop_at: Option<ProcessStep>,
        skip_steps: &[ProcessStep],
        dry_run: bool,
        only_step: Option<ProcessStep>,
    ) -> Self {
        let (start_at, stop_at) = match only_step {
            Some(only) => (only, only),
            None => (
                start_at.unwrap_or(ProcessStep::Start),
                stop_at.unwrap_or(ProcessStep::End),
            ),
        };

        let actions = ProcessStep::ALL
            .iter()
            .map(|&step| {
                (
                    step,
                    StepAction::new(step, start_at, stop_at, skip_steps, dry_run),
                )
            })
            .collect();

        Self { actions }
    }

    /// The action for `step`. The map covers every defined step.
    pub fn action(&self, step: ProcessStep) -> &StepAction {
        &self.actions[&step]
    }

    /// Whether `step` is skipped.
    pub fn skipped(&self, step: ProcessStep) -> bool {
        self.action(step).skipped()
    }

    /// The log line for `step`.
    pub fn summary(&self, step: ProcessStep) -> String {
        self.action(step).summary()
    }

    /// True if any of `steps` is skipped.
    pub fn any_skipped(&self, steps: &[ProcessStep]) -> bool {
        steps.iter().any(|&step| self.skipped(step))
    }

    /// True if all of `steps` are skipped.
    pub fn all_skipped(&self, steps: &[ProcessStep]) -> bool {
        steps.iter().all(|&step| self.skipped(step))
    }
}
