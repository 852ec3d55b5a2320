// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The host runner's side of the bridge.
//!
//! The host owns scheduling, display and output. The bridge only needs a way to tell it that a
//! suite or proxy started and finished, and to record failures against the proxy currently
//! running. That contract is [`HostReporter`].

use crate::{executor::ExecutionSummary, proxy::ProxyTest, tree::ProxySuite};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::fmt;

/// How the host should classify a failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FailureKind {
    /// An anticipated failure, such as an assertion that did not hold.
    ///
    /// Every failure reported by the embedded engine is classified this way, regardless of the
    /// engine's own notion of severity.
    Expected,

    /// An unanticipated failure that points at a problem outside the test itself.
    Unexpected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Expected => write!(f, "failure"),
            FailureKind::Unexpected => write!(f, "error"),
        }
    }
}

/// A failure, expressed in the host's vocabulary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FailureRecord {
    /// A human-readable description of the failure.
    pub description: String,

    /// The absolute, normalized path of the file the failure was reported in, if known.
    pub path: Option<Utf8PathBuf>,

    /// The line the failure was reported on, or 0 if unknown.
    pub line: u32,

    /// The classification of this failure.
    pub kind: FailureKind,
}

impl FailureRecord {
    /// The line number used when the embedded engine does not know the line.
    pub const UNKNOWN_LINE: u32 = 0;
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}: {}", path, self.line, self.description),
            None => write!(f, "{}", self.description),
        }
    }
}

/// Operations a host runner exposes to the bridge.
///
/// Only [`record_failure`](Self::record_failure) is required; the other notifications default to
/// no-ops.
pub trait HostReporter {
    /// Called before the children of a non-empty suite run.
    fn suite_started(&mut self, _suite: &ProxySuite) {}

    /// Called after every child of a non-empty suite has run.
    fn suite_finished(&mut self, _suite: &ProxySuite) {}

    /// Called at the start of a proxy's execution window.
    fn test_started(&mut self, _test: &ProxyTest) {}

    /// Records a failure against the proxy currently running.
    fn record_failure(&mut self, test: &ProxyTest, failure: FailureRecord);

    /// Called at the end of a proxy's execution window.
    fn test_finished(&mut self, _test: &ProxyTest, _summary: &ExecutionSummary) {}
}

impl<R: HostReporter + ?Sized> HostReporter for &mut R {
    fn suite_started(&mut self, suite: &ProxySuite) {
        (**self).suite_started(suite)
    }

    fn suite_finished(&mut self, suite: &ProxySuite) {
        (**self).suite_finished(suite)
    }

    fn test_started(&mut self, test: &ProxyTest) {
        (**self).test_started(test)
    }

    fn record_failure(&mut self, test: &ProxyTest, failure: FailureRecord) {
        (**self).record_failure(test, failure)
    }

    fn test_finished(&mut self, test: &ProxyTest, summary: &ExecutionSummary) {
        (**self).test_finished(test, summary)
    }
}

/// An event observed by a [`RecordingReporter`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HostEvent {
    /// A suite started.
    SuiteStarted {
        /// The suite's host label.
        name: String,
    },

    /// A suite finished.
    SuiteFinished {
        /// The suite's host label.
        name: String,
    },

    /// A proxy started.
    TestStarted {
        /// The proxy's display name.
        name: String,
    },

    /// A failure was recorded against a proxy.
    Failure {
        /// The proxy's display name.
        name: String,

        /// The failure.
        failure: FailureRecord,
    },

    /// A proxy finished.
    TestFinished {
        /// The proxy's display name.
        name: String,

        /// The number of embedded cases that ran.
        tests_run: usize,
    },
}

/// A [`HostReporter`] that records every notification in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingReporter {
    events: Vec<HostEvent>,
}

impl RecordingReporter {
    /// Creates a new, empty `RecordingReporter`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the events observed so far.
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Returns every failure recorded so far, along with the display name of its proxy.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &FailureRecord)> + '_ {
        self.events.iter().filter_map(|event| match event {
            HostEvent::Failure { name, failure } => Some((name.as_str(), failure)),
            _ => None,
        })
    }

    /// Consumes the reporter, returning its events.
    pub fn into_events(self) -> Vec<HostEvent> {
        self.events
    }
}

impl HostReporter for RecordingReporter {
    fn suite_started(&mut self, suite: &ProxySuite) {
        self.events.push(HostEvent::SuiteStarted {
            name: suite.name().to_owned(),
        });
    }

    fn suite_finished(&mut self, suite: &ProxySuite) {
        self.events.push(HostEvent::SuiteFinished {
            name: suite.name().to_owned(),
        });
    }

    fn test_started(&mut self, test: &ProxyTest) {
        self.events.push(HostEvent::TestStarted {
            name: test.display_name().to_owned(),
        });
    }

    fn record_failure(&mut self, test: &ProxyTest, failure: FailureRecord) {
        self.events.push(HostEvent::Failure {
            name: test.display_name().to_owned(),
            failure,
        });
    }

    fn test_finished(&mut self, test: &ProxyTest, summary: &ExecutionSummary) {
        self.events.push(HostEvent::TestFinished {
            name: test.display_name().to_owned(),
            tests_run: summary.counts.total(),
        });
    }
}

/// Normalizes file paths reported by the embedded engine into absolute, lexically clean paths.
///
/// Relative paths are resolved against a base directory. `.` components are dropped and `..`
/// components pop their parent. The file system is never consulted, so symlinks are preserved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathNormalizer {
    base: Utf8PathBuf,
}

impl PathNormalizer {
    /// Creates a new normalizer resolving relative paths against `base`.
    ///
    /// `base` is expected to be absolute; it is normalized lexically.
    pub fn new(base: impl Into<Utf8PathBuf>) -> Self {
        let base = base.into();
        Self { base: clean(&base) }
    }

    /// Returns the base directory relative paths are resolved against.
    pub fn base(&self) -> &Utf8Path {
        &self.base
    }

    /// Normalizes `file`.
    pub fn normalize(&self, file: &str) -> Utf8PathBuf {
        let path = Utf8Path::new(file);
        if path.is_absolute() {
            clean(path)
        } else {
            clean(&self.base.join(path))
        }
    }
}

fn clean(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                // Popping past the root leaves the root in place.
                out.pop();
            }
            other => out.push(other.as_str()),
        }
    }
    out
}
