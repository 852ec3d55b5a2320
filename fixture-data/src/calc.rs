// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Information about the "calc" fixture: a small embedded registry with plain, typed, empty and
//! failing suites.

use crate::models::{CaseFixture, CaseFixtureStatus, FailureFixture, SuiteFixture};
use indexmap::{IndexMap, indexmap};
use std::sync::LazyLock;

pub const CALC_FILE: &str = "tests/calc_test.cc";

pub static CALC_SUITES: &[SuiteFixture] = &[
    SuiteFixture {
        name: "Calc",
        cases: &[
            CaseFixture {
                name: "Add",
                status: CaseFixtureStatus::Pass,
            },
            CaseFixture {
                name: "Sub",
                status: CaseFixtureStatus::Pass,
            },
        ],
    },
    SuiteFixture {
        name: "CalcFailures",
        cases: &[
            CaseFixture {
                name: "DivideByZero",
                status: CaseFixtureStatus::Fail(FailureFixture {
                    file: Some(CALC_FILE),
                    line: 42,
                    message: "Expected: div(1, 0) throws\n  Actual: it returned 0",
                }),
            },
            CaseFixture {
                name: "Overflow",
                status: CaseFixtureStatus::FatalFail(FailureFixture {
                    file: Some("./tests/../tests/calc_test.cc"),
                    line: 57,
                    message: "Value of: add(INT_MAX, 1) > 0\n  Actual: false",
                }),
            },
            CaseFixture {
                name: "Unattributed",
                status: CaseFixtureStatus::Fail(FailureFixture {
                    file: None,
                    line: -1,
                    message: "uncaught exception in test body",
                }),
            },
        ],
    },
    SuiteFixture {
        name: "Foo/0",
        cases: &[
            CaseFixture {
                name: "Bar",
                status: CaseFixtureStatus::Pass,
            },
        ],
    },
    SuiteFixture {
        name: "Foo/1",
        cases: &[
            CaseFixture {
                name: "Bar",
                status: CaseFixtureStatus::Pass,
            },
            CaseFixture {
                name: "Baz",
                status: CaseFixtureStatus::Skip,
            },
        ],
    },
    SuiteFixture {
        name: "Empty",
        cases: &[],
    },
    SuiteFixture {
        name: "Disabled",
        cases: &[CaseFixture {
            name: "Never",
            status: CaseFixtureStatus::Disabled,
        }],
    },
];

/// The proxies each host suite is expected to contain, keyed by suite label.
pub static EXPECTED_PROXIES: LazyLock<IndexMap<&'static str, Vec<&'static str>>> =
    LazyLock::new(|| {
        indexmap! {
            "Calc" => vec!["Calc.Add", "Calc.Sub"],
            "CalcFailures" => vec![
                "CalcFailures.DivideByZero",
                "CalcFailures.Overflow",
                "CalcFailures.Unattributed",
            ],
            "Foo_0" => vec!["Foo_0.Bar"],
            "Foo_1" => vec!["Foo_1.Bar", "Foo_1.Baz"],
        }
    });
