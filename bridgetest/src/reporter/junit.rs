// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code to generate JUnit XML reports from proxy executions.

use crate::{
    errors::WriteReportError,
    executor::ExecutionSummary,
    host::{FailureKind, FailureRecord, HostReporter},
    proxy::ProxyTest,
};
use camino::Utf8Path;
use indexmap::IndexMap;
use quick_junit::{NonSuccessKind, Report, TestCase, TestCaseStatus, TestSuite};
use std::{fs::File, time::Instant};

/// A [`HostReporter`] that collects proxy results into a JUnit report.
///
/// Each sanitized suite label becomes a `testsuite`; each executed proxy becomes a `testcase`
/// whose `classname` is the suite label and whose name is the embedded case name.
#[derive(Debug)]
pub struct JunitReporter {
    report_name: String,
    test_suites: IndexMap<String, TestSuite>,
    running: Option<RunningTest>,
}

#[derive(Debug)]
struct RunningTest {
    display_name: String,
    start: Instant,
    failures: Vec<FailureRecord>,
}

impl JunitReporter {
    /// Creates a new reporter for a report named `report_name`.
    pub fn new(report_name: impl Into<String>) -> Self {
        Self {
            report_name: report_name.into(),
            test_suites: IndexMap::new(),
            running: None,
        }
    }

    /// Builds the report from every proxy finished so far.
    pub fn to_report(&self) -> Report {
        let mut report = Report::new(self.report_name.as_str());
        report.add_test_suites(self.test_suites.values().cloned());
        report
    }

    /// Writes the report to `path`, creating parent directories as needed.
    pub fn write(&self, path: &Utf8Path) -> Result<(), WriteReportError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|error| WriteReportError::Fs {
                file: dir.to_path_buf(),
                error,
            })?;
        }

        let f = File::create(path).map_err(|error| WriteReportError::Fs {
            file: path.to_path_buf(),
            error,
        })?;
        self.to_report()
            .serialize(f)
            .map_err(|error| WriteReportError::Junit {
                file: path.to_path_buf(),
                error,
            })
    }
}

impl HostReporter for JunitReporter {
    fn test_started(&mut self, test: &ProxyTest) {
        self.running = Some(RunningTest {
            display_name: test.display_name().to_owned(),
            start: Instant::now(),
            failures: Vec::new(),
        });
    }

    fn record_failure(&mut self, test: &ProxyTest, failure: FailureRecord) {
        let running = self.running.get_or_insert_with(|| RunningTest {
            display_name: test.display_name().to_owned(),
            start: Instant::now(),
            failures: Vec::new(),
        });
        running.failures.push(failure);
    }

    fn test_finished(&mut self, test: &ProxyTest, _summary: &ExecutionSummary) {
        let running = match self.running.take() {
            Some(running) if running.display_name == test.display_name() => running,
            _ => RunningTest {
                display_name: test.display_name().to_owned(),
                start: Instant::now(),
                failures: Vec::new(),
            },
        };

        let status = match running.failures.first() {
            None => TestCaseStatus::success(),
            Some(first) => {
                let mut status = TestCaseStatus::non_success(non_success_kind(first.kind));
                status
                    .set_type(failure_type(first.kind))
                    .set_message(first.description.as_str())
                    .set_description(describe(&running.failures));
                status
            }
        };

        let mut testcase = TestCase::new(test.case_name(), status);
        testcase
            .set_classname(test.suite_label())
            .set_time(running.start.elapsed());

        self.test_suites
            .entry(test.suite_label().to_owned())
            .or_insert_with(|| TestSuite::new(test.suite_label()))
            .add_test_case(testcase);
    }
}

fn non_success_kind(kind: FailureKind) -> NonSuccessKind {
    match kind {
        FailureKind::Expected => NonSuccessKind::Failure,
        FailureKind::Unexpected => NonSuccessKind::Error,
    }
}

fn failure_type(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Expected => "embedded assertion failure",
        FailureKind::Unexpected => "embedded run count mismatch",
    }
}

fn describe(failures: &[FailureRecord]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
