// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bridge between an embedded engine and a host runner.

use crate::{
    config::BridgeConfig,
    engine::EmbeddedEngine,
    errors::BridgeError,
    executor::{ExecutionSummary, SingleTestExecutor},
    host::{HostReporter, PathNormalizer},
    proxy::ProxyTest,
    registry::RegistrySnapshot,
    tree::{ProxyTree, SuiteRunStats},
};
use camino::Utf8PathBuf;
use tracing::debug;

/// Owns an embedded engine and the proxy tree derived from it.
///
/// The registry is enumerated exactly once, in [`Bridge::new`]. Every run method takes
/// `&mut self`, so proxies are executed one at a time against the engine.
#[derive(Debug)]
pub struct Bridge<E> {
    engine: E,
    snapshot: RegistrySnapshot,
    tree: ProxyTree,
    normalizer: PathNormalizer,
}

impl<E: EmbeddedEngine> Bridge<E> {
    /// Initializes `engine` with `args`, enumerates its registry, and builds the proxy tree.
    pub fn new(mut engine: E, args: &[String], config: &BridgeConfig) -> Result<Self, BridgeError> {
        let normalizer = PathNormalizer::new(source_root(config)?);
        let snapshot = RegistrySnapshot::enumerate(&mut engine, args)?;
        let tree = ProxyTree::build(config.root_suite(), &snapshot);
        debug!(
            proxies = tree.test_case_count(),
            source_root = %normalizer.base(),
            "built proxy tree",
        );
        Ok(Self {
            engine,
            snapshot,
            tree,
            normalizer,
        })
    }

    /// The proxy tree presented to the host.
    pub fn tree(&self) -> &ProxyTree {
        &self.tree
    }

    /// The registry snapshot the tree was built from.
    pub fn snapshot(&self) -> &RegistrySnapshot {
        &self.snapshot
    }

    /// The normalizer applied to failure paths.
    pub fn normalizer(&self) -> &PathNormalizer {
        &self.normalizer
    }

    /// The embedded engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Consumes the bridge, returning the embedded engine.
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Runs a single proxy in isolation.
    pub fn run_test<R>(&mut self, proxy: &ProxyTest, reporter: &mut R) -> ExecutionSummary
    where
        R: HostReporter + ?Sized,
    {
        SingleTestExecutor::new(&mut self.engine, &self.normalizer).execute(proxy, reporter)
    }

    /// Runs the proxy with the given display name, if it is part of the tree.
    pub fn run_named<R>(&mut self, display_name: &str, reporter: &mut R) -> Option<ExecutionSummary>
    where
        R: HostReporter + ?Sized,
    {
        let proxy = self.tree.find(display_name)?;
        let mut executor = SingleTestExecutor::new(&mut self.engine, &self.normalizer);
        Some(executor.execute(proxy, reporter))
    }

    /// Runs every proxy in the tree, skipping empty suites.
    pub fn run_all<R>(&mut self, reporter: &mut R) -> SuiteRunStats
    where
        R: HostReporter + ?Sized,
    {
        let mut executor = SingleTestExecutor::new(&mut self.engine, &self.normalizer);
        self.tree.root().run(&mut executor, reporter)
    }
}

fn source_root(config: &BridgeConfig) -> Result<Utf8PathBuf, BridgeError> {
    match config.source_root() {
        Some(dir) if dir.is_absolute() => Ok(dir),
        configured => {
            let cwd = std::env::current_dir().map_err(BridgeError::CurrentDir)?;
            let cwd = Utf8PathBuf::try_from(cwd).map_err(BridgeError::NonUtf8CurrentDir)?;
            Ok(match configured {
                Some(dir) => cwd.join(dir),
                None => cwd,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fake::{FakeCase, FakeEngine, FakeSuite},
        host::RecordingReporter,
    };
    use pretty_assertions::assert_eq;

    fn engine() -> FakeEngine {
        FakeEngine::new(vec![
            FakeSuite::new(
                "Calc",
                vec![FakeCase::passing("Add"), FakeCase::passing("Sub")],
            ),
            FakeSuite::new("Foo/1", vec![FakeCase::passing("Bar")]),
        ])
    }

    #[test]
    fn run_named_uses_display_name() {
        let config = BridgeConfig::default_config("/work");
        let mut bridge =
            Bridge::new(engine(), &["tests".to_owned()], &config).expect("bridge built");
        let mut reporter = RecordingReporter::new();

        let summary = bridge
            .run_named("Foo_1.Bar", &mut reporter)
            .expect("proxy exists");
        assert!(summary.ran_exactly_one());
        assert_eq!(bridge.engine().executed(), &["Foo/1.Bar"]);
        assert_eq!(bridge.run_named("Foo/1.Bar", &mut reporter), None);
    }

    #[test]
    fn run_all_runs_each_proxy_once() {
        let config = BridgeConfig::default_config("/work");
        let mut bridge =
            Bridge::new(engine(), &["tests".to_owned()], &config).expect("bridge built");
        let mut reporter = RecordingReporter::new();

        let stats = bridge.run_all(&mut reporter);
        assert_eq!(stats.tests_run, 3);
        assert!(stats.is_success());
        assert_eq!(
            bridge.into_engine().executed(),
            &["Calc.Add", "Calc.Sub", "Foo/1.Bar"]
        );
    }

    #[test]
    fn source_root_defaults_to_current_dir() {
        let config = BridgeConfig::default_config("/work");
        let bridge = Bridge::new(FakeEngine::new(vec![]), &[], &config).expect("bridge built");
        let cwd = Utf8PathBuf::try_from(std::env::current_dir().expect("cwd")).expect("UTF-8");
        assert_eq!(bridge.normalizer(), &PathNormalizer::new(cwd));
    }
}
