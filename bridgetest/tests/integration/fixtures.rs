// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use bridgetest::{
    config::BridgeConfig,
    engine::AssertionOutcome,
    fake::{FakeAssertion, FakeCase, FakeEngine, FakeSuite},
};
use camino::Utf8Path;
use fixture_data::{
    calc::CALC_FILE,
    models::{CaseFixture, CaseFixtureStatus, FailureFixture, SuiteFixture},
};

/// The workspace root used for tests that never touch the file system.
pub(crate) const WORKSPACE_ROOT: &str = "/work/project";

/// Builds a fake engine whose registry mirrors `suites`.
pub(crate) fn fake_engine(suites: &[SuiteFixture]) -> FakeEngine {
    FakeEngine::new(suites.iter().map(fake_suite).collect())
}

/// Builds a fake engine in which every runnable case fails with its own [`marker_message`].
pub(crate) fn marker_engine(suites: &[SuiteFixture]) -> FakeEngine {
    FakeEngine::new(suites.iter().map(marker_suite).collect())
}

/// The failure message reported by the case selected by `filter` in a [`marker_engine`].
pub(crate) fn marker_message(filter: &str) -> String {
    format!("marker:{filter}")
}

fn fake_suite(suite: &SuiteFixture) -> FakeSuite {
    FakeSuite::new(suite.name, suite.cases.iter().map(fake_case).collect())
}

fn marker_suite(suite: &SuiteFixture) -> FakeSuite {
    let cases = suite
        .cases
        .iter()
        .map(|case| match case.status {
            CaseFixtureStatus::Disabled => FakeCase::disabled(case.name),
            _ => {
                let message = marker_message(&case.full_name(suite));
                FakeCase::failing(case.name, CALC_FILE, 1, message)
            }
        })
        .collect();
    FakeSuite::new(suite.name, cases)
}

fn fake_case(case: &CaseFixture) -> FakeCase {
    match case.status {
        CaseFixtureStatus::Pass => FakeCase::passing(case.name),
        CaseFixtureStatus::Fail(failure) => FakeCase::new(
            case.name,
            vec![fake_failure(AssertionOutcome::NonFatalFailure, failure)],
        ),
        CaseFixtureStatus::FatalFail(failure) => FakeCase::new(
            case.name,
            vec![
                fake_failure(AssertionOutcome::FatalFailure, failure),
                // Never evaluated: the fatal failure above ends the case.
                FakeAssertion::fail(CALC_FILE, 999, "unreachable"),
            ],
        ),
        CaseFixtureStatus::Skip => {
            FakeCase::new(case.name, vec![FakeAssertion::skip(CALC_FILE, 12)])
        }
        CaseFixtureStatus::Disabled => FakeCase::disabled(case.name),
    }
}

fn fake_failure(outcome: AssertionOutcome, failure: FailureFixture) -> FakeAssertion {
    match failure.file {
        Some(file) => FakeAssertion::fail_with(outcome, file, failure.line, failure.message),
        None => FakeAssertion::fail_without_file(failure.message),
    }
}

/// The default config, rooted at [`WORKSPACE_ROOT`].
pub(crate) fn workspace_config() -> BridgeConfig {
    BridgeConfig::default_config(WORKSPACE_ROOT)
}

/// Writes `contents` to the config file under `root` and loads it.
pub(crate) fn write_config(root: &Utf8Path, contents: &str) -> BridgeConfig {
    let config_path = root.join(BridgeConfig::CONFIG_PATH);
    let dir = config_path.parent().expect("config path has a parent");
    std::fs::create_dir_all(dir).expect("created config dir");
    std::fs::write(&config_path, contents).expect("wrote config");
    BridgeConfig::from_sources(root, None).expect("config parsed")
}

/// The argument vector the embedded engine is initialized with.
pub(crate) fn engine_args(extra: &[&str]) -> Vec<String> {
    std::iter::once("calc_tests")
        .chain(extra.iter().copied())
        .map(str::to_owned)
        .collect()
}
