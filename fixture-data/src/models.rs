// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data models for fixture information.

/// An embedded suite, as the embedded engine names it.
#[derive(Copy, Clone, Debug)]
pub struct SuiteFixture {
    pub name: &'static str,
    pub cases: &'static [CaseFixture],
}

impl SuiteFixture {
    /// The number of cases in this suite that the engine will run.
    pub fn runnable_count(&self) -> usize {
        self.cases
            .iter()
            .filter(|case| case.status.should_run())
            .count()
    }
}

#[derive(Copy, Clone, Debug)]
pub struct CaseFixture {
    pub name: &'static str,
    pub status: CaseFixtureStatus,
}

impl CaseFixture {
    /// The filter expression that selects exactly this case.
    pub fn full_name(&self, suite: &SuiteFixture) -> String {
        format!("{}.{}", suite.name, self.name)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CaseFixtureStatus {
    Pass,
    Fail(FailureFixture),
    /// The case stops at its first failure; later assertions are never evaluated.
    FatalFail(FailureFixture),
    /// The case skips itself from inside its body.
    Skip,
    /// The engine never runs this case.
    Disabled,
}

impl CaseFixtureStatus {
    pub fn should_run(self) -> bool {
        !matches!(self, CaseFixtureStatus::Disabled)
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            CaseFixtureStatus::Fail(_) | CaseFixtureStatus::FatalFail(_)
        )
    }
}

/// A failing assertion as the embedded engine reports it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FailureFixture {
    pub file: Option<&'static str>,
    pub line: i64,
    pub message: &'static str,
}
