// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests
//!
//! These drive a [`Bridge`] end to end against the in-memory engine, using the registries in
//! `fixture-data`.

use bridgetest::{
    bridge::Bridge,
    errors::{BridgeError, EnumerateError},
    fake::{FakeCase, FakeEngine, FakeSuite},
    host::{FailureKind, FailureRecord, HostEvent, RecordingReporter},
    proxy::ProxyTest,
    reporter::JunitReporter,
};
use camino_tempfile::Utf8TempDir;
use color_eyre::eyre::{Result, eyre};
use fixture_data::calc::{CALC_SUITES, EXPECTED_PROXIES};
use indoc::indoc;
use pretty_assertions::assert_eq;

mod fixtures;

use fixtures::*;

fn calc_bridge(extra_args: &[&str]) -> Result<Bridge<FakeEngine>> {
    let bridge = Bridge::new(
        fake_engine(CALC_SUITES),
        &engine_args(extra_args),
        &workspace_config(),
    )?;
    Ok(bridge)
}

#[test]
fn tree_contains_every_runnable_case() -> Result<()> {
    let bridge = calc_bridge(&[])?;
    let tree = bridge.tree();

    assert_eq!(tree.root().name(), "embedded");
    let actual: Vec<(&str, Vec<&str>)> = tree
        .suites()
        .map(|suite| {
            let names = suite
                .runnable_tests()
                .map(ProxyTest::display_name)
                .collect();
            (suite.name(), names)
        })
        .collect();
    let expected: Vec<(&str, Vec<&str>)> = EXPECTED_PROXIES
        .iter()
        .map(|(label, names)| (*label, names.clone()))
        .collect();
    assert_eq!(actual, expected);

    let runnable: usize = CALC_SUITES.iter().map(|suite| suite.runnable_count()).sum();
    assert_eq!(tree.test_case_count(), runnable);
    assert_eq!(bridge.snapshot().executable_count(), runnable);

    // Enumeration initializes the engine once and silences its own console output.
    assert_eq!(bridge.engine().init_calls().len(), 1);
    assert!(!bridge.engine().has_default_printer());
    Ok(())
}

#[test]
fn each_proxy_runs_exactly_its_case() -> Result<()> {
    // Every case fails with a message naming itself, so the output identifies what ran.
    let mut bridge = Bridge::new(
        marker_engine(CALC_SUITES),
        &engine_args(&[]),
        &workspace_config(),
    )?;

    let mut checked = 0;
    for suite in CALC_SUITES {
        for case in suite.cases.iter().filter(|case| case.status.should_run()) {
            let filter = case.full_name(suite);
            let proxy: ProxyTest = bridge
                .tree()
                .root()
                .runnable_tests()
                .find(|proxy| proxy.filter() == filter)
                .cloned()
                .ok_or_else(|| eyre!("no proxy selects {filter}"))?;
            assert_eq!(proxy.case_name(), case.name);

            let before = bridge.engine().executed().len();
            let mut reporter = RecordingReporter::new();
            let summary = bridge.run_test(&proxy, &mut reporter);

            assert!(
                summary.ran_exactly_one(),
                "{proxy} ran {:?}",
                summary.counts
            );
            assert_eq!(&bridge.engine().executed()[before..], [filter.as_str()]);
            let failures: Vec<_> = reporter
                .failures()
                .map(|(name, failure)| (name, failure.description.clone()))
                .collect();
            assert_eq!(
                failures,
                vec![(proxy.display_name(), marker_message(&filter))]
            );
            assert_eq!(
                bridge.engine().listener_count(),
                0,
                "listener detached after {proxy}"
            );
            checked += 1;
        }
    }
    assert_eq!(checked, bridge.tree().test_case_count());
    Ok(())
}

#[test]
fn pre_filtered_run_end_to_end() -> Result<()> {
    let engine = FakeEngine::new(vec![FakeSuite::new(
        "Calc",
        vec![FakeCase::passing("Add"), FakeCase::passing("Sub")],
    )]);
    let mut bridge = Bridge::new(
        engine,
        &engine_args(&["--filter=-Calc.Sub"]),
        &workspace_config(),
    )?;

    let labels: Vec<_> = bridge.tree().suites().map(|suite| suite.name()).collect();
    assert_eq!(labels, vec!["Calc"]);
    let proxy = bridge
        .tree()
        .find("Calc.Add")
        .ok_or_else(|| eyre!("Calc.Add is missing from the tree"))?;
    assert_eq!(proxy.filter(), "Calc.Add");
    assert_eq!(bridge.tree().find("Calc.Sub"), None);

    let mut reporter = RecordingReporter::new();
    let stats = bridge.run_all(&mut reporter);
    assert_eq!(stats.tests_run, 1);
    assert_eq!(stats.tests_failed, 0);
    assert_eq!(
        reporter.into_events(),
        vec![
            HostEvent::SuiteStarted {
                name: "embedded".to_owned()
            },
            HostEvent::SuiteStarted {
                name: "Calc".to_owned()
            },
            HostEvent::TestStarted {
                name: "Calc.Add".to_owned()
            },
            HostEvent::TestFinished {
                name: "Calc.Add".to_owned(),
                tests_run: 1,
            },
            HostEvent::SuiteFinished {
                name: "Calc".to_owned()
            },
            HostEvent::SuiteFinished {
                name: "embedded".to_owned()
            },
        ]
    );
    assert_eq!(bridge.engine().executed(), ["Calc.Add"]);
    Ok(())
}

#[test]
fn typed_suites_are_sanitized_but_filtered_by_engine_name() -> Result<()> {
    let mut bridge = calc_bridge(&["--filter=Foo/*"])?;

    let labels: Vec<_> = bridge.tree().suites().map(|suite| suite.name()).collect();
    assert_eq!(labels, vec!["Foo_0", "Foo_1"]);

    let mut reporter = RecordingReporter::new();
    let summary = bridge
        .run_named("Foo_1.Bar", &mut reporter)
        .ok_or_else(|| eyre!("Foo_1.Bar is missing from the tree"))?;
    assert!(summary.is_success());
    assert_eq!(bridge.engine().executed(), ["Foo/1.Bar"]);

    // A skip inside the case body is not a failure.
    let summary = bridge
        .run_named("Foo_1.Baz", &mut reporter)
        .ok_or_else(|| eyre!("Foo_1.Baz is missing from the tree"))?;
    assert!(summary.is_success());
    assert_eq!(reporter.failures().count(), 0);
    Ok(())
}

#[test]
fn failures_are_translated() -> Result<()> {
    let dir = Utf8TempDir::new()?;
    let config = write_config(
        dir.path(),
        indoc! {r#"
            [bridge]
            root-suite = "calc"
            source-root = "."
        "#},
    );
    let mut bridge = Bridge::new(
        fake_engine(CALC_SUITES),
        &engine_args(&["--filter=CalcFailures.*"]),
        &config,
    )?;
    assert_eq!(bridge.tree().root().name(), "calc");

    let mut reporter = RecordingReporter::new();
    let stats = bridge.run_all(&mut reporter);
    assert_eq!(stats.tests_run, 3);
    assert_eq!(stats.tests_failed, 3);

    let calc_test = dir.path().join("tests/calc_test.cc");
    let failures: Vec<_> = reporter
        .failures()
        .map(|(name, failure)| (name, failure.clone()))
        .collect();
    assert_eq!(
        failures,
        vec![
            (
                "CalcFailures.DivideByZero",
                FailureRecord {
                    description: "Expected: div(1, 0) throws\n  Actual: it returned 0".to_owned(),
                    path: Some(calc_test.clone()),
                    line: 42,
                    kind: FailureKind::Expected,
                },
            ),
            (
                "CalcFailures.Overflow",
                FailureRecord {
                    description: "Value of: add(INT_MAX, 1) > 0\n  Actual: false".to_owned(),
                    path: Some(calc_test),
                    line: 57,
                    kind: FailureKind::Expected,
                },
            ),
            (
                "CalcFailures.Unattributed",
                FailureRecord {
                    description: "uncaught exception in test body".to_owned(),
                    path: None,
                    line: FailureRecord::UNKNOWN_LINE,
                    kind: FailureKind::Expected,
                },
            ),
        ]
    );
    Ok(())
}

#[test]
fn duplicate_registrations_are_reported() -> Result<()> {
    let engine = FakeEngine::new(vec![
        FakeSuite::new("Dup", vec![FakeCase::passing("A")]),
        FakeSuite::new("Dup", vec![FakeCase::passing("A")]),
        FakeSuite::new("Other", vec![FakeCase::passing("B")]),
    ]);
    let mut bridge = Bridge::new(engine, &engine_args(&[]), &workspace_config())?;
    assert_eq!(bridge.tree().test_case_count(), 3);

    let mut reporter = RecordingReporter::new();
    let summary = bridge
        .run_named("Dup.A", &mut reporter)
        .ok_or_else(|| eyre!("Dup.A is missing from the tree"))?;
    assert_eq!(summary.counts.total(), 2);
    assert!(!summary.is_success());

    let failures: Vec<_> = reporter.failures().collect();
    assert_eq!(failures.len(), 1);
    let (name, failure) = failures[0];
    assert_eq!(name, "Dup.A");
    assert_eq!(failure.kind, FailureKind::Unexpected);
    assert_eq!(
        failure.description,
        "expected exactly 1 embedded test to run for filter `Dup.A`, but 2 ran"
    );

    // The engine is left in a usable state for the next proxy.
    let mut reporter = RecordingReporter::new();
    let summary = bridge
        .run_named("Other.B", &mut reporter)
        .ok_or_else(|| eyre!("Other.B is missing from the tree"))?;
    assert!(summary.is_success());
    Ok(())
}

#[test]
fn init_errors_are_surfaced() {
    let error = Bridge::new(
        fake_engine(CALC_SUITES),
        &engine_args(&["--filter="]),
        &workspace_config(),
    )
    .expect_err("empty filter is rejected");
    assert!(
        matches!(
            error,
            BridgeError::Enumerate(EnumerateError::Init { arg_count: 2, .. })
        ),
        "unexpected error: {error:?}"
    );
}

#[test]
fn junit_report_end_to_end() -> Result<()> {
    let dir = Utf8TempDir::new()?;
    let config = write_config(
        dir.path(),
        indoc! {r#"
            [bridge]
            source-root = "."

            [junit]
            path = "target/bridgetest/junit.xml"
            report-name = "calc"
        "#},
    );
    let junit = config
        .junit()
        .ok_or_else(|| eyre!("JUnit output is configured"))?;

    let mut bridge = Bridge::new(
        fake_engine(CALC_SUITES),
        &engine_args(&["--filter=Calc*"]),
        &config,
    )?;
    let mut reporter = JunitReporter::new(junit.report_name());
    let stats = bridge.run_all(&mut reporter);
    assert_eq!(stats.tests_run, 5);

    reporter.write(junit.path())?;
    let report = reporter.to_report();
    assert_eq!(report.tests, 5);
    assert_eq!(report.failures, 3);
    assert_eq!(report.errors, 0);

    let xml = std::fs::read_to_string(dir.path().join("target/bridgetest/junit.xml"))?;
    assert!(xml.contains(r#"name="calc""#), "{xml}");
    assert!(xml.contains(r#"classname="CalcFailures""#), "{xml}");
    assert!(
        xml.contains(r#"message="uncaught exception in test body""#),
        "{xml}"
    );
    Ok(())
}
