// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs proxies as `libtest-mimic` trials.
//!
//! A test binary built with `harness = false` can hand its embedded engine to [`run`]; each
//! runnable proxy then shows up as an ordinary test to `cargo test` and `cargo nextest`.
//!
//! The embedded engine is process-global state, so trials share one [`Bridge`] behind a mutex and
//! the thread count is forced to 1.

use crate::{
    bridge::Bridge,
    config::BridgeConfig,
    engine::EmbeddedEngine,
    errors::HarnessError,
    executor::ExecutionSummary,
    host::{FailureRecord, HostReporter},
    proxy::ProxyTest,
    reporter::JunitReporter,
};
use camino::Utf8Path;
use libtest_mimic::{Arguments, Conclusion, Failed, Trial};
use std::sync::{Arc, Mutex, MutexGuard, Once, PoisonError};
use tracing::{debug, info, warn};
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// The environment variable used to configure logging.
pub const LOG_ENV: &str = "BRIDGETEST_LOG";

static INIT_LOGGER: Once = Once::new();

/// Installs a stderr logger filtered by [`LOG_ENV`].
///
/// Only the first call has an effect. If the host process already installed a global subscriber,
/// that subscriber is left in place.
pub fn init_logging() {
    INIT_LOGGER.call_once(|| {
        let default_targets = Targets::new().with_default(LevelFilter::WARN);
        let level_str = std::env::var(LOG_ENV).unwrap_or_default();

        // An empty string means the default level.
        let (targets, parse_error) = if level_str.is_empty() {
            (default_targets, None)
        } else {
            match level_str.parse::<Targets>() {
                Ok(targets) => (targets, None),
                Err(error) => (default_targets, Some(error)),
            }
        };

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(targets);

        let installed = tracing_subscriber::registry()
            .with(layer)
            .try_init()
            .is_ok();
        if installed && let Some(error) = parse_error {
            warn!(
                "unable to parse {LOG_ENV}={level_str:?}, using default level: {error}"
            );
        }
    });
}

/// Builds a bridge from `config` and runs its proxies with `libtest-mimic`.
///
/// `engine_args` is forwarded to the embedded engine; `host_args` are the parsed arguments of the
/// test binary. If the config names a JUnit report, it is written once every trial has run.
pub fn run<E>(
    engine: E,
    engine_args: &[String],
    host_args: &Arguments,
    config: &BridgeConfig,
) -> Result<Conclusion, HarnessError>
where
    E: EmbeddedEngine + Send + 'static,
{
    init_logging();

    let bridge = Bridge::new(engine, engine_args, config)?;
    let junit = config.junit();
    let mut harness = Harness::new(bridge);
    if let Some(junit) = &junit {
        harness = harness.with_junit(JunitReporter::new(junit.report_name()));
    }

    let mut args = host_args.clone();
    if args.test_threads.is_some_and(|threads| threads != 1) {
        info!("running embedded tests on a single thread");
    }
    args.test_threads = Some(1);

    let conclusion = libtest_mimic::run(&args, harness.trials());

    if let (Some(junit), Some(reporter)) = (junit, harness.take_junit()) {
        reporter.write(junit.path())?;
        debug!(path = %junit.path(), "wrote JUnit report");
    }

    Ok(conclusion)
}

/// Like [`run`], but reads the config from `.config/bridgetest.toml` under `workspace_root`.
pub fn run_in_workspace<E>(
    engine: E,
    engine_args: &[String],
    host_args: &Arguments,
    workspace_root: &Utf8Path,
) -> Result<Conclusion, HarnessError>
where
    E: EmbeddedEngine + Send + 'static,
{
    let config = BridgeConfig::from_sources(workspace_root, None)?;
    run(engine, engine_args, host_args, &config)
}

/// A bridge shared between `libtest-mimic` trials.
#[derive(Debug)]
pub struct Harness<E> {
    state: Arc<Mutex<HarnessState<E>>>,
}

#[derive(Debug)]
struct HarnessState<E> {
    bridge: Bridge<E>,
    junit: Option<JunitReporter>,
}

impl<E> Harness<E>
where
    E: EmbeddedEngine + Send + 'static,
{
    /// Creates a new harness around `bridge`.
    pub fn new(bridge: Bridge<E>) -> Self {
        Self {
            state: Arc::new(Mutex::new(HarnessState {
                bridge,
                junit: None,
            })),
        }
    }

    /// Also feeds every trial's results into `reporter`.
    pub fn with_junit(self, reporter: JunitReporter) -> Self {
        lock(&self.state).junit = Some(reporter);
        self
    }

    /// Returns one trial per runnable proxy, in run order.
    ///
    /// Each trial is named after the proxy's display name and its kind is the suite label.
    pub fn trials(&self) -> Vec<Trial> {
        let proxies: Vec<ProxyTest> = lock(&self.state)
            .bridge
            .tree()
            .root()
            .runnable_tests()
            .cloned()
            .collect();

        proxies
            .into_iter()
            .map(|proxy| {
                let state = Arc::clone(&self.state);
                let name = proxy.display_name().to_owned();
                let kind = proxy.suite_label().to_owned();
                Trial::test(name, move || run_trial(&state, &proxy)).with_kind(kind)
            })
            .collect()
    }

    /// Takes the JUnit reporter, if one was set.
    pub fn take_junit(&self) -> Option<JunitReporter> {
        lock(&self.state).junit.take()
    }
}

fn lock<E>(state: &Mutex<HarnessState<E>>) -> MutexGuard<'_, HarnessState<E>> {
    // A panicking trial leaves the engine usable: listeners and filters are restored on unwind.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run_trial<E>(state: &Mutex<HarnessState<E>>, proxy: &ProxyTest) -> Result<(), Failed>
where
    E: EmbeddedEngine,
{
    let mut guard = lock(state);
    let HarnessState { bridge, junit } = &mut *guard;
    let mut reporter = TrialReporter {
        failures: Vec::new(),
        junit: junit.as_mut(),
    };
    let summary = bridge.run_test(proxy, &mut reporter);

    if summary.is_success() {
        return Ok(());
    }

    let message = reporter
        .failures
        .iter()
        .map(|failure| format!("{}: {failure}", failure.kind))
        .collect::<Vec<_>>()
        .join("\n");
    Err(Failed::from(message))
}

/// Collects one trial's failures, forwarding every notification to the JUnit reporter.
struct TrialReporter<'a> {
    failures: Vec<FailureRecord>,
    junit: Option<&'a mut JunitReporter>,
}

impl HostReporter for TrialReporter<'_> {
    fn test_started(&mut self, test: &ProxyTest) {
        if let Some(junit) = &mut self.junit {
            junit.test_started(test);
        }
    }

    fn record_failure(&mut self, test: &ProxyTest, failure: FailureRecord) {
        if let Some(junit) = &mut self.junit {
            junit.record_failure(test, failure.clone());
        }
        self.failures.push(failure);
    }

    fn test_finished(&mut self, test: &ProxyTest, summary: &ExecutionSummary) {
        if let Some(junit) = &mut self.junit {
            junit.test_finished(test, summary);
        }
    }
}
