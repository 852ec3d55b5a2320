// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The proxy tree presented to the host.
//!
//! The tree is derived from a [`RegistrySnapshot`] by pure functions: build one proxy per
//! executable case, group the proxies by sanitized suite label, and drop any suite left without
//! proxies. Once built, the tree is never mutated.

use crate::{
    engine::EmbeddedEngine,
    executor::SingleTestExecutor,
    host::HostReporter,
    proxy::{ProxyFactory, ProxyTest},
    registry::RegistrySnapshot,
    sanitize::sanitize_suite_name,
};
use indexmap::IndexMap;
use std::fmt;
use tracing::debug;

/// A node in the proxy tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestNode {
    /// A suite containing further nodes.
    Suite(ProxySuite),

    /// A leaf proxy test.
    Test(ProxyTest),
}

impl TestNode {
    /// Returns the number of leaf tests under this node.
    pub fn test_case_count(&self) -> usize {
        match self {
            TestNode::Suite(suite) => suite.test_case_count(),
            TestNode::Test(_) => 1,
        }
    }

    /// Returns the host label for this node.
    pub fn name(&self) -> &str {
        match self {
            TestNode::Suite(suite) => suite.name(),
            TestNode::Test(test) => test.display_name(),
        }
    }
}

/// A suite of proxy tests, as displayed by the host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProxySuite {
    name: String,
    children: Vec<TestNode>,
}

impl ProxySuite {
    /// Creates a new suite from its children.
    pub fn new(name: impl Into<String>, children: Vec<TestNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// The host label of this suite.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The children of this suite, in discovery order.
    pub fn children(&self) -> &[TestNode] {
        &self.children
    }

    /// Returns the number of leaf tests in this suite, at any depth.
    pub fn test_case_count(&self) -> usize {
        self.children.iter().map(TestNode::test_case_count).sum()
    }

    /// Iterates over every leaf test that [`run`](Self::run) would execute, in execution order.
    pub fn runnable_tests(&self) -> impl Iterator<Item = &ProxyTest> + '_ {
        let mut leaves = Vec::new();
        collect_runnable(self, &mut leaves);
        leaves.into_iter()
    }

    /// Runs this suite.
    ///
    /// Children with no leaf tests are skipped entirely: they are neither executed nor reported
    /// to the host. This applies at every nesting level, including this suite itself.
    pub fn run<E, R>(
        &self,
        executor: &mut SingleTestExecutor<'_, E>,
        reporter: &mut R,
    ) -> SuiteRunStats
    where
        E: EmbeddedEngine + ?Sized,
        R: HostReporter + ?Sized,
    {
        let mut stats = SuiteRunStats::default();
        if self.test_case_count() == 0 {
            debug!(suite = %self.name, "nothing to run");
            return stats;
        }

        reporter.suite_started(self);
        for child in &self.children {
            if child.test_case_count() == 0 {
                debug!(suite = %self.name, child = child.name(), "skipping empty node");
                stats.skipped_suites += 1;
                continue;
            }
            match child {
                TestNode::Suite(suite) => {
                    stats += suite.run(executor, reporter);
                }
                TestNode::Test(test) => {
                    let summary = executor.execute(test, reporter);
                    stats.tests_run += 1;
                    if !summary.is_success() {
                        stats.tests_failed += 1;
                    }
                }
            }
        }
        reporter.suite_finished(self);
        stats
    }
}

fn collect_runnable<'a>(suite: &'a ProxySuite, out: &mut Vec<&'a ProxyTest>) {
    for child in &suite.children {
        match child {
            TestNode::Suite(inner) if inner.test_case_count() > 0 => collect_runnable(inner, out),
            TestNode::Suite(_) => {}
            TestNode::Test(test) => out.push(test),
        }
    }
}

/// Counts accumulated while running a [`ProxySuite`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SuiteRunStats {
    /// The number of proxies executed.
    pub tests_run: usize,

    /// The number of proxies that reported at least one failure.
    pub tests_failed: usize,

    /// The number of child nodes skipped because they had no leaf tests.
    pub skipped_suites: usize,
}

impl SuiteRunStats {
    /// Returns true if every executed proxy succeeded.
    pub fn is_success(&self) -> bool {
        self.tests_failed == 0
    }
}

impl std::ops::AddAssign for SuiteRunStats {
    fn add_assign(&mut self, rhs: Self) {
        self.tests_run += rhs.tests_run;
        self.tests_failed += rhs.tests_failed;
        self.skipped_suites += rhs.skipped_suites;
    }
}

/// The complete, immutable proxy tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProxyTree {
    root: ProxySuite,
}

impl ProxyTree {
    /// Builds the tree for `snapshot` under a root suite named `root_name`.
    ///
    /// Proxies are grouped by sanitized suite label in first-discovery order. Suites whose cases
    /// were all removed by the engine's pre-filter do not appear.
    pub fn build(root_name: impl Into<String>, snapshot: &RegistrySnapshot) -> Self {
        let factory = ProxyFactory::new();
        let mut groups: IndexMap<String, Vec<TestNode>> = IndexMap::new();
        for suite in snapshot.suites() {
            let label = sanitize_suite_name(&suite.name);
            groups.entry(label.into_owned()).or_default();
        }

        for proxy in snapshot.proxies(&factory) {
            groups
                .entry(proxy.suite_label().to_owned())
                .or_default()
                .push(TestNode::Test(proxy));
        }

        let children = groups
            .into_iter()
            .filter_map(|(label, proxies)| {
                if proxies.is_empty() {
                    debug!(suite = %label, "omitting suite with no executable cases");
                    None
                } else {
                    Some(TestNode::Suite(ProxySuite::new(label, proxies)))
                }
            })
            .collect();

        Self {
            root: ProxySuite::new(root_name, children),
        }
    }

    /// Returns the root suite.
    pub fn root(&self) -> &ProxySuite {
        &self.root
    }

    /// Returns the top-level suites, one per sanitized suite label.
    pub fn suites(&self) -> impl Iterator<Item = &ProxySuite> + '_ {
        self.root.children.iter().filter_map(|child| match child {
            TestNode::Suite(suite) => Some(suite),
            TestNode::Test(_) => None,
        })
    }

    /// Returns the number of proxies in the tree.
    pub fn test_case_count(&self) -> usize {
        self.root.test_case_count()
    }

    /// Finds a proxy by its display name.
    pub fn find(&self, display_name: &str) -> Option<&ProxyTest> {
        self.root
            .runnable_tests()
            .find(|test| test.display_name() == display_name)
    }
}

impl fmt::Display for ProxyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_suite(&self.root, 0, f)
    }
}

fn fmt_suite(suite: &ProxySuite, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let count = suite.test_case_count();
    writeln!(
        f,
        "{:indent$}{} ({} {})",
        "",
        suite.name,
        count,
        if count == 1 { "test" } else { "tests" },
        indent = depth * 2,
    )?;
    for child in &suite.children {
        match child {
            TestNode::Suite(inner) => fmt_suite(inner, depth + 1, f)?,
            TestNode::Test(test) => writeln!(
                f,
                "{:indent$}{} [filter: {}]",
                "",
                test.display_name(),
                test.filter(),
                indent = (depth + 1) * 2,
            )?,
        }
    }
    Ok(())
}
