// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An in-memory embedded engine.
//!
//! [`FakeEngine`] behaves like a typical embedded engine: it keeps a registry of suites, a single
//! active filter, and a listener chain that starts out with a default console printer. Cases are
//! scripted as sequences of assertion results. Every filter and listener call is recorded so that
//! tests can assert on how the bridge drives the engine.
//!
//! Filters use the conventional `POSITIVE[-NEGATIVE]` syntax, where each half is a
//! `:`-separated list of patterns matched against `Suite.Case`, and `*` and `?` are wildcards.

use crate::{
    engine::{
        AssertionOutcome, AssertionResult, CaseInfo, EmbeddedEngine, EngineListener, ListenerId,
        RunCounts, SuiteInfo,
    },
    errors::EngineInitError,
    proxy::filter_expression,
};
use std::fmt;

/// The command-line flag the fake engine reads its pre-filter from.
pub const FILTER_FLAG: &str = "--filter=";

/// The filter that matches every case.
pub const MATCH_ALL: &str = "*";

/// A scripted suite.
#[derive(Clone, Debug)]
pub struct FakeSuite {
    name: String,
    cases: Vec<FakeCase>,
}

impl FakeSuite {
    /// Creates a new suite.
    pub fn new(name: impl Into<String>, cases: Vec<FakeCase>) -> Self {
        Self {
            name: name.into(),
            cases,
        }
    }
}

/// A scripted case: a name and the assertions it produces when run.
#[derive(Clone, Debug)]
pub struct FakeCase {
    name: String,
    assertions: Vec<FakeAssertion>,
    disabled: bool,
}

impl FakeCase {
    /// Creates a case producing `assertions` in order.
    pub fn new(name: impl Into<String>, assertions: Vec<FakeAssertion>) -> Self {
        Self {
            name: name.into(),
            assertions,
            disabled: false,
        }
    }

    /// Creates a case the engine never runs, whatever the filter.
    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            disabled: true,
            ..Self::passing(name)
        }
    }

    /// Creates a case with a single passing assertion.
    pub fn passing(name: impl Into<String>) -> Self {
        Self::new(name, vec![FakeAssertion::pass("fake_test.cc", 1)])
    }

    /// Creates a case with a single non-fatal failure.
    pub fn failing(
        name: impl Into<String>,
        file: &str,
        line: i64,
        message: impl Into<String>,
    ) -> Self {
        Self::new(name, vec![FakeAssertion::fail(file, line, message)])
    }
}

/// A scripted assertion result.
#[derive(Clone, Debug)]
pub struct FakeAssertion {
    result: AssertionResult,
}

impl FakeAssertion {
    /// A passing assertion.
    pub fn pass(file: &str, line: i64) -> Self {
        Self {
            result: AssertionResult::success(file, line),
        }
    }

    /// A non-fatal failure.
    pub fn fail(file: &str, line: i64, message: impl Into<String>) -> Self {
        Self::fail_with(AssertionOutcome::NonFatalFailure, file, line, message)
    }

    /// A failure with the given outcome.
    pub fn fail_with(
        outcome: AssertionOutcome,
        file: &str,
        line: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            result: AssertionResult::failure(outcome, Some(file.to_owned()), line, message),
        }
    }

    /// A failure the engine cannot attribute to a file.
    pub fn fail_without_file(message: impl Into<String>) -> Self {
        Self {
            result: AssertionResult::failure(AssertionOutcome::NonFatalFailure, None, -1, message),
        }
    }

    /// A skip from inside the case body.
    pub fn skip(file: &str, line: i64) -> Self {
        Self {
            result: AssertionResult::failure(
                AssertionOutcome::Skip,
                Some(file.to_owned()),
                line,
                "skipped",
            ),
        }
    }
}

/// A parsed `POSITIVE[-NEGATIVE]` filter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterPattern {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl FilterPattern {
    /// Parses a filter.
    pub fn parse(filter: &str) -> Self {
        let (positive, negative) = filter.split_once('-').unwrap_or((filter, ""));
        let split = |s: &str| -> Vec<String> {
            s.split(':')
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect()
        };
        let mut positive = split(positive);
        if positive.is_empty() {
            positive.push(MATCH_ALL.to_owned());
        }
        Self {
            positive,
            negative: split(negative),
        }
    }

    /// Returns true if `full_name` matches.
    pub fn matches(&self, full_name: &str) -> bool {
        self.positive.iter().any(|p| glob_match(p, full_name))
            && !self.negative.iter().any(|p| glob_match(p, full_name))
    }
}

fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    // Iterative matcher with single-star backtracking.
    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while n < name.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, n));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '?' || pattern[p] == name[n]) {
            p += 1;
            n += 1;
        } else if let Some((star_p, star_n)) = star {
            p = star_p + 1;
            n = star_n + 1;
            star = Some((star_p, star_n + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

/// An in-memory [`EmbeddedEngine`].
pub struct FakeEngine {
    suites: Vec<FakeSuite>,
    initialized: bool,
    init_calls: Vec<Vec<String>>,
    pre_filter: FilterPattern,
    active_filter: String,
    filter_history: Vec<String>,
    default_printer: bool,
    printed: Vec<String>,
    listeners: Vec<(ListenerId, Box<dyn EngineListener>)>,
    next_listener_id: u64,
    executed: Vec<String>,
}

impl FakeEngine {
    /// Creates a new engine with the given registry.
    pub fn new(suites: Vec<FakeSuite>) -> Self {
        Self {
            suites,
            initialized: false,
            init_calls: Vec::new(),
            pre_filter: FilterPattern::parse(MATCH_ALL),
            active_filter: MATCH_ALL.to_owned(),
            filter_history: Vec::new(),
            default_printer: true,
            printed: Vec::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
            executed: Vec::new(),
        }
    }

    /// Every argument vector passed to [`init`](EmbeddedEngine::init).
    pub fn init_calls(&self) -> &[Vec<String>] {
        &self.init_calls
    }

    /// Whether the default console printer is still in the listener chain.
    pub fn has_default_printer(&self) -> bool {
        self.default_printer
    }

    /// Lines written by the default console printer.
    pub fn printed(&self) -> &[String] {
        &self.printed
    }

    /// The number of listeners appended and not yet removed.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Every filter set, in order, including restorations.
    pub fn filter_history(&self) -> &[String] {
        &self.filter_history
    }

    /// The `Suite.Case` name of every case run, in order.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

impl fmt::Debug for FakeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeEngine")
            .field("suites", &self.suites)
            .field("initialized", &self.initialized)
            .field("active_filter", &self.active_filter)
            .field("default_printer", &self.default_printer)
            .field("listeners", &self.listeners.len())
            .field("executed", &self.executed)
            .finish_non_exhaustive()
    }
}

impl EmbeddedEngine for FakeEngine {
    fn init(&mut self, args: &[String]) -> Result<(), EngineInitError> {
        self.init_calls.push(args.to_vec());
        if self.initialized {
            return Err(EngineInitError::new("engine was already initialized"));
        }

        for arg in args.iter().skip(1) {
            if let Some(filter) = arg.strip_prefix(FILTER_FLAG) {
                if filter.is_empty() {
                    return Err(EngineInitError::new(format!(
                        "{FILTER_FLAG} requires a value"
                    )));
                }
                self.pre_filter = FilterPattern::parse(filter);
                self.active_filter = filter.to_owned();
            }
        }
        self.initialized = true;
        Ok(())
    }

    fn remove_default_printer(&mut self) {
        self.default_printer = false;
    }

    fn suites(&self) -> Vec<SuiteInfo> {
        self.suites
            .iter()
            .map(|suite| SuiteInfo {
                name: suite.name.clone(),
                cases: suite
                    .cases
                    .iter()
                    .map(|case| CaseInfo {
                        name: case.name.clone(),
                        should_run: !case.disabled
                            && self
                                .pre_filter
                                .matches(&filter_expression(&suite.name, &case.name)),
                    })
                    .collect(),
            })
            .collect()
    }

    fn active_filter(&self) -> String {
        self.active_filter.clone()
    }

    fn set_filter(&mut self, filter: &str) {
        self.active_filter = filter.to_owned();
        self.filter_history.push(filter.to_owned());
    }

    fn append_listener(&mut self, listener: Box<dyn EngineListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn EngineListener>> {
        let index = self.listeners.iter().position(|(other, _)| *other == id)?;
        Some(self.listeners.remove(index).1)
    }

    fn run_all(&mut self) -> RunCounts {
        let filter = FilterPattern::parse(&self.active_filter);
        let mut counts = RunCounts::default();

        for suite in &self.suites {
            for case in &suite.cases {
                let full_name = filter_expression(&suite.name, &case.name);
                if case.disabled || !filter.matches(&full_name) {
                    continue;
                }

                for (_, listener) in &mut self.listeners {
                    listener.on_case_start(&suite.name, &case.name);
                }
                let mut passed = true;
                for assertion in &case.assertions {
                    let result = &assertion.result;
                    for (_, listener) in &mut self.listeners {
                        listener.on_assertion(result);
                    }
                    if result.outcome.is_failure() {
                        passed = false;
                        if self.default_printer {
                            self.printed.push(format!(
                                "{}:{}: Failure\n{}",
                                result.file.as_deref().unwrap_or("unknown file"),
                                result.line,
                                result.message,
                            ));
                        }
                    }
                    if result.outcome == AssertionOutcome::FatalFailure {
                        break;
                    }
                }
                for (_, listener) in &mut self.listeners {
                    listener.on_case_end(&suite.name, &case.name, passed);
                }

                if passed {
                    counts.successful += 1;
                } else {
                    counts.failed += 1;
                }
                self.executed.push(full_name);
            }
        }

        counts
    }
}
