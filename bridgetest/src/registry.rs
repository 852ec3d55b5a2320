// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-time enumeration of the embedded engine's registry.

use crate::{
    engine::{EmbeddedEngine, SuiteInfo},
    errors::EnumerateError,
    proxy::{ProxyFactory, ProxyTest},
};
use tracing::debug;

/// An immutable snapshot of the embedded engine's registry.
///
/// Built once, before any proxy runs, and never refreshed afterwards.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegistrySnapshot {
    suites: Vec<SuiteRecord>,
}

/// A suite within a [`RegistrySnapshot`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SuiteRecord {
    /// The suite's name, exactly as the engine reports it.
    pub name: String,

    /// The suite's cases, in registration order.
    pub cases: Vec<CaseRecord>,
}

impl SuiteRecord {
    /// Returns the number of cases that survived the engine's pre-filter.
    pub fn executable_count(&self) -> usize {
        self.cases.iter().filter(|case| case.should_run).count()
    }
}

/// A case within a [`SuiteRecord`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseRecord {
    /// The case's name.
    pub name: String,

    /// Whether the engine's pre-filter selected this case.
    pub should_run: bool,
}

impl RegistrySnapshot {
    /// Initializes `engine` with `args` and snapshots its registry.
    ///
    /// This forwards the full argument vector to the engine so that its own flags take effect,
    /// and removes the engine's default printer so the host is the only reporting sink.
    pub fn enumerate<E>(engine: &mut E, args: &[String]) -> Result<Self, EnumerateError>
    where
        E: EmbeddedEngine + ?Sized,
    {
        engine.init(args).map_err(|error| EnumerateError::Init {
            arg_count: args.len(),
            error,
        })?;
        engine.remove_default_printer();

        let snapshot = Self::from_suites(engine.suites());
        debug!(
            suites = snapshot.suites.len(),
            cases = snapshot.case_count(),
            executable = snapshot.executable_count(),
            "enumerated embedded registry",
        );
        Ok(snapshot)
    }

    /// Creates a snapshot directly from registry data, without an engine.
    pub fn from_suites(suites: impl IntoIterator<Item = SuiteInfo>) -> Self {
        let suites = suites
            .into_iter()
            .map(|suite| SuiteRecord {
                name: suite.name,
                cases: suite
                    .cases
                    .into_iter()
                    .map(|case| CaseRecord {
                        name: case.name,
                        should_run: case.should_run,
                    })
                    .collect(),
            })
            .collect();
        Self { suites }
    }

    /// Returns the suites in this snapshot, in registration order.
    pub fn suites(&self) -> &[SuiteRecord] {
        &self.suites
    }

    /// Returns the total number of cases, including those filtered out by the engine.
    pub fn case_count(&self) -> usize {
        self.suites.iter().map(|suite| suite.cases.len()).sum()
    }

    /// Returns the number of cases that survived the engine's pre-filter.
    pub fn executable_count(&self) -> usize {
        self.suites.iter().map(SuiteRecord::executable_count).sum()
    }

    /// Iterates over a proxy for every executable case, in registration order.
    pub fn proxies<'a>(
        &'a self,
        factory: &'a ProxyFactory,
    ) -> impl Iterator<Item = ProxyTest> + 'a {
        self.suites.iter().flat_map(move |suite| {
            suite
                .cases
                .iter()
                .filter(|case| case.should_run)
                .map(move |case| factory.create(&suite.name, &case.name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::CaseInfo,
        fake::{FakeCase, FakeEngine, FakeSuite},
    };
    use pretty_assertions::assert_eq;

    fn suite(name: &str, cases: &[(&str, bool)]) -> SuiteInfo {
        SuiteInfo {
            name: name.to_owned(),
            cases: cases
                .iter()
                .map(|(name, should_run)| CaseInfo {
                    name: (*name).to_owned(),
                    should_run: *should_run,
                })
                .collect(),
        }
    }

    #[test]
    fn proxies_follow_registry_order() {
        let snapshot = RegistrySnapshot::from_suites([
            suite("Calc", &[("Add", true), ("Sub", false), ("Mul", true)]),
            suite("Foo/1", &[("Bar", true)]),
        ]);
        assert_eq!(snapshot.case_count(), 4);
        assert_eq!(snapshot.executable_count(), 3);

        let factory = ProxyFactory::new();
        let filters: Vec<_> = snapshot
            .proxies(&factory)
            .map(|proxy| proxy.filter().to_owned())
            .collect();
        assert_eq!(filters, vec!["Calc.Add", "Calc.Mul", "Foo/1.Bar"]);
    }

    #[test]
    fn enumerate_initializes_engine_once() {
        let mut engine = FakeEngine::new(vec![FakeSuite::new(
            "Calc",
            vec![FakeCase::passing("Add"), FakeCase::passing("Sub")],
        )]);
        let args = vec!["calc-tests".to_owned(), "--filter=Calc.Add".to_owned()];
        let snapshot = RegistrySnapshot::enumerate(&mut engine, &args).expect("enumerated");

        assert_eq!(engine.init_calls(), &[args]);
        assert!(!engine.has_default_printer());
        assert_eq!(snapshot.executable_count(), 1);
        assert_eq!(snapshot.case_count(), 2);
    }

    #[test]
    fn enumerate_propagates_init_errors() {
        let mut engine = FakeEngine::new(vec![]);
        let args = vec!["calc-tests".to_owned(), "--filter=".to_owned()];
        let error = RegistrySnapshot::enumerate(&mut engine, &args).expect_err("init fails");
        assert!(matches!(error, EnumerateError::Init { arg_count: 2, .. }));
        assert!(
            engine.has_default_printer(),
            "printer is left alone when init fails"
        );
    }
}
