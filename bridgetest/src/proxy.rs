// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proxy tests: host-side stand-ins for individual embedded cases.

use crate::sanitize::sanitize_suite_name;
use std::fmt;

/// The separator between suite and case in an embedded filter expression.
pub const FILTER_SEPARATOR: char = '.';

/// A host-native test standing in for exactly one embedded case.
///
/// Running a proxy sets the embedded engine's filter to [`filter`](Self::filter), which names the
/// case using the engine's own, unsanitized suite name.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ProxyTest {
    suite_label: String,
    case_name: String,
    display_name: String,
    filter: String,
}

impl ProxyTest {
    /// The host-facing label of the suite this proxy belongs to.
    pub fn suite_label(&self) -> &str {
        &self.suite_label
    }

    /// The embedded case's name. Never transformed.
    pub fn case_name(&self) -> &str {
        &self.case_name
    }

    /// The name the host displays for this proxy: `<suite label>.<case name>`.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The filter expression selecting this proxy's case: `<original suite name>.<case name>`.
    pub fn filter(&self) -> &str {
        &self.filter
    }
}

impl fmt::Display for ProxyTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Builds [`ProxyTest`] instances from embedded suite and case names.
#[derive(Copy, Clone, Debug, Default)]
pub struct ProxyFactory;

impl ProxyFactory {
    /// Creates a new `ProxyFactory`.
    pub fn new() -> Self {
        Self
    }

    /// Creates a proxy for `case_name` within the embedded suite `suite_name`.
    pub fn create(&self, suite_name: &str, case_name: &str) -> ProxyTest {
        let suite_label = sanitize_suite_name(suite_name).into_owned();
        let display_name = format!("{suite_label}{FILTER_SEPARATOR}{case_name}");
        let filter = filter_expression(suite_name, case_name);
        ProxyTest {
            suite_label,
            case_name: case_name.to_owned(),
            display_name,
            filter,
        }
    }
}

/// Returns the exact filter expression selecting `case_name` within `suite_name`.
pub fn filter_expression(suite_name: &str, case_name: &str) -> String {
    format!("{suite_name}{FILTER_SEPARATOR}{case_name}")
}
