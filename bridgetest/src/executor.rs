// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running a single proxy test against the embedded engine.

use crate::{
    engine::{EmbeddedEngine, RunCounts},
    host::{FailureKind, FailureRecord, HostReporter, PathNormalizer},
    listener::{AttachedListener, FailureSink, ResultListener, ScopedFilter},
    proxy::ProxyTest,
};
use tracing::{debug, warn};

/// The number of embedded cases a single proxy must run.
pub const EXPECTED_RUN_COUNT: usize = 1;

/// What happened during one proxy's execution window.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ExecutionSummary {
    /// The counts reported by the embedded engine for this window.
    pub counts: RunCounts,

    /// The number of failures reported to the host, including any run-count violation.
    pub failures_reported: usize,
}

impl ExecutionSummary {
    /// Returns true if exactly one embedded case ran.
    pub fn ran_exactly_one(&self) -> bool {
        self.counts.total() == EXPECTED_RUN_COUNT
    }

    /// Returns true if no failures were reported to the host.
    pub fn is_success(&self) -> bool {
        self.failures_reported == 0
    }
}

/// Runs proxies one at a time, each in isolation.
///
/// Every call to [`execute`](Self::execute) points the engine's filter at the proxy's exact
/// filter expression, attaches a fresh [`ResultListener`], runs the engine, and then restores
/// the filter and detaches the listener.
#[derive(Debug)]
pub struct SingleTestExecutor<'e, E: EmbeddedEngine + ?Sized> {
    engine: &'e mut E,
    normalizer: &'e PathNormalizer,
}

impl<'e, E: EmbeddedEngine + ?Sized> SingleTestExecutor<'e, E> {
    /// Creates a new executor driving `engine`.
    pub fn new(engine: &'e mut E, normalizer: &'e PathNormalizer) -> Self {
        Self { engine, normalizer }
    }

    /// Runs `proxy`, reporting every failure observed to `reporter`.
    ///
    /// If the engine does not run exactly one case, an additional
    /// [`FailureKind::Unexpected`] failure describing the mismatch is reported. This never
    /// panics or returns an error.
    pub fn execute<R>(&mut self, proxy: &ProxyTest, reporter: &mut R) -> ExecutionSummary
    where
        R: HostReporter + ?Sized,
    {
        debug!(proxy = %proxy, filter = proxy.filter(), "starting execution window");
        reporter.test_started(proxy);

        let sink = FailureSink::new();
        let counts = {
            let mut filtered = ScopedFilter::set(&mut *self.engine, proxy.filter());
            let listener =
                ResultListener::new(proxy.display_name(), self.normalizer.clone(), sink.clone());
            let mut attached = AttachedListener::attach(&mut *filtered, listener);
            attached.run_all()
        };

        let mut failures_reported = 0;
        for failure in sink.take() {
            reporter.record_failure(proxy, failure);
            failures_reported += 1;
        }

        if counts.total() != EXPECTED_RUN_COUNT {
            warn!(
                proxy = %proxy,
                filter = proxy.filter(),
                ran = counts.total(),
                "filter did not select exactly one embedded test",
            );
            reporter.record_failure(proxy, run_count_violation(proxy, counts));
            failures_reported += 1;
        }

        let summary = ExecutionSummary {
            counts,
            failures_reported,
        };
        debug!(
            proxy = %proxy,
            successful = counts.successful,
            failed = counts.failed,
            failures_reported,
            "finished execution window",
        );
        reporter.test_finished(proxy, &summary);
        summary
    }
}

fn run_count_violation(proxy: &ProxyTest, counts: RunCounts) -> FailureRecord {
    FailureRecord {
        description: format!(
            "expected exactly {EXPECTED_RUN_COUNT} embedded test to run for filter `{}`, \
             but {} ran",
            proxy.filter(),
            counts.total(),
        ),
        path: None,
        line: FailureRecord::UNKNOWN_LINE,
        kind: FailureKind::Unexpected,
    }
}
