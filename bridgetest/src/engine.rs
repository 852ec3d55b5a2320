// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The seam between the bridge and an embedded test engine.
//!
//! Embedded engines usually keep their registry, active filter and listener chain in
//! process-wide state. The bridge never touches that state directly: it talks to an
//! [`EmbeddedEngine`] handle that it owns, which makes it possible to substitute a fake engine in
//! tests and observe every filter and listener call.

use crate::errors::EngineInitError;
use std::fmt;

/// A handle to an embedded test engine.
///
/// All methods take `&mut self` where they mutate engine-global state. The bridge never calls
/// two of them concurrently.
pub trait EmbeddedEngine {
    /// Initializes the engine with the process's argument vector.
    ///
    /// The engine parses its own flags (for example pre-filters) from `args`. Called at most once
    /// per bridge, before any other method.
    fn init(&mut self, args: &[String]) -> Result<(), EngineInitError>;

    /// Removes the engine's default console printer from the listener chain, so that the host is
    /// the only reporting sink.
    fn remove_default_printer(&mut self);

    /// Returns the engine's registry, in registration order.
    fn suites(&self) -> Vec<SuiteInfo>;

    /// Returns the engine's active filter.
    fn active_filter(&self) -> String;

    /// Replaces the engine's active filter with `filter`.
    fn set_filter(&mut self, filter: &str);

    /// Appends a listener to the engine's listener chain.
    fn append_listener(&mut self, listener: Box<dyn EngineListener>) -> ListenerId;

    /// Removes a previously appended listener, returning it if it was still attached.
    fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn EngineListener>>;

    /// Runs every case matching the active filter and returns the counts for this run.
    fn run_all(&mut self) -> RunCounts;
}

impl<E: EmbeddedEngine + ?Sized> EmbeddedEngine for Box<E> {
    fn init(&mut self, args: &[String]) -> Result<(), EngineInitError> {
        (**self).init(args)
    }

    fn remove_default_printer(&mut self) {
        (**self).remove_default_printer()
    }

    fn suites(&self) -> Vec<SuiteInfo> {
        (**self).suites()
    }

    fn active_filter(&self) -> String {
        (**self).active_filter()
    }

    fn set_filter(&mut self, filter: &str) {
        (**self).set_filter(filter)
    }

    fn append_listener(&mut self, listener: Box<dyn EngineListener>) -> ListenerId {
        (**self).append_listener(listener)
    }

    fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn EngineListener>> {
        (**self).remove_listener(id)
    }

    fn run_all(&mut self) -> RunCounts {
        (**self).run_all()
    }
}

/// A suite as registered with the embedded engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SuiteInfo {
    /// The suite's name, exactly as the engine knows it.
    pub name: String,

    /// The suite's cases, in registration order.
    pub cases: Vec<CaseInfo>,
}

/// A single case as registered with the embedded engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseInfo {
    /// The case's name.
    pub name: String,

    /// Whether the case survived the engine's own command-line pre-filtering.
    pub should_run: bool,
}

/// An observer attached to the embedded engine's listener chain.
pub trait EngineListener: Send {
    /// Called when a case starts.
    fn on_case_start(&mut self, _suite: &str, _case: &str) {}

    /// Called for every assertion result produced by the running case.
    fn on_assertion(&mut self, result: &AssertionResult);

    /// Called when a case finishes.
    fn on_case_end(&mut self, _suite: &str, _case: &str, _passed: bool) {}
}

/// Identifies a listener within an engine's listener chain.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// The outcome of a single assertion inside an embedded case.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AssertionOutcome {
    /// The assertion passed.
    Success,

    /// The case was skipped from inside its body.
    Skip,

    /// The assertion failed but the case kept running.
    NonFatalFailure,

    /// The assertion failed and aborted the case.
    FatalFailure,
}

impl AssertionOutcome {
    /// Returns true if this outcome is a failure of either severity.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            AssertionOutcome::NonFatalFailure | AssertionOutcome::FatalFailure
        )
    }
}

/// An assertion result event, as delivered to listeners.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssertionResult {
    /// The outcome of the assertion.
    pub outcome: AssertionOutcome,

    /// The source file the assertion lives in, if the engine knows it.
    pub file: Option<String>,

    /// The line of the assertion. Negative if unknown.
    pub line: i64,

    /// The failure message, or an empty string for passing assertions.
    pub message: String,
}

impl AssertionResult {
    /// Creates a passing assertion result.
    pub fn success(file: impl Into<String>, line: i64) -> Self {
        Self {
            outcome: AssertionOutcome::Success,
            file: Some(file.into()),
            line,
            message: String::new(),
        }
    }

    /// Creates a failing assertion result with the given severity.
    pub fn failure(
        outcome: AssertionOutcome,
        file: Option<String>,
        line: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            outcome,
            file,
            line,
            message: message.into(),
        }
    }
}

/// Per-run counts reported by the embedded engine.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RunCounts {
    /// The number of cases that passed.
    pub successful: usize,

    /// The number of cases that failed.
    pub failed: usize,
}

impl RunCounts {
    /// The total number of cases that ran.
    pub fn total(&self) -> usize {
        self.successful + self.failed
    }
}
