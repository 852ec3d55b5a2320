// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translating embedded assertion events into host failures.
//!
//! A [`ResultListener`] is attached to the embedded engine for exactly one proxy's execution
//! window. Attachment is scoped through [`AttachedListener`], which detaches the listener when it
//! is dropped, on every exit path.

use crate::{
    engine::{AssertionResult, EmbeddedEngine, EngineListener, ListenerId},
    host::{FailureKind, FailureRecord, PathNormalizer},
};
use std::{
    ops::{Deref, DerefMut},
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{debug, trace};

/// Converts a single assertion event into a host failure.
///
/// Returns `None` for passing and skipped assertions. Failing assertions of either severity are
/// reported as [`FailureKind::Expected`]; negative (unknown) lines become
/// [`FailureRecord::UNKNOWN_LINE`].
pub fn translate(result: &AssertionResult, normalizer: &PathNormalizer) -> Option<FailureRecord> {
    if !result.outcome.is_failure() {
        return None;
    }

    let line = u32::try_from(result.line).unwrap_or(FailureRecord::UNKNOWN_LINE);
    Some(FailureRecord {
        description: result.message.clone(),
        path: result
            .file
            .as_deref()
            .map(|file| normalizer.normalize(file)),
        line,
        kind: FailureKind::Expected,
    })
}

/// Shared storage for failures captured during one execution window.
///
/// The listener lives inside the engine's listener chain while the executor holds the other end,
/// so the two share this buffer.
#[derive(Clone, Debug, Default)]
pub struct FailureSink {
    failures: Arc<Mutex<Vec<FailureRecord>>>,
}

impl FailureSink {
    /// Creates a new, empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FailureRecord>> {
        // A panic inside the engine while holding the lock leaves the data intact.
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, failure: FailureRecord) {
        self.lock().push(failure);
    }

    /// Removes and returns every captured failure, in the order observed.
    pub fn take(&self) -> Vec<FailureRecord> {
        std::mem::take(&mut *self.lock())
    }
}

/// Forwards failing assertions for one proxy into a [`FailureSink`].
#[derive(Debug)]
pub struct ResultListener {
    proxy_name: String,
    normalizer: PathNormalizer,
    sink: FailureSink,
}

impl ResultListener {
    /// Creates a listener for the proxy named `proxy_name`.
    pub fn new(
        proxy_name: impl Into<String>,
        normalizer: PathNormalizer,
        sink: FailureSink,
    ) -> Self {
        Self {
            proxy_name: proxy_name.into(),
            normalizer,
            sink,
        }
    }
}

impl EngineListener for ResultListener {
    fn on_case_start(&mut self, suite: &str, case: &str) {
        trace!(proxy = %self.proxy_name, suite, case, "embedded case started");
    }

    fn on_assertion(&mut self, result: &AssertionResult) {
        if let Some(failure) = translate(result, &self.normalizer) {
            debug!(proxy = %self.proxy_name, %failure, "embedded assertion failed");
            self.sink.push(failure);
        }
    }

    fn on_case_end(&mut self, suite: &str, case: &str, passed: bool) {
        trace!(proxy = %self.proxy_name, suite, case, passed, "embedded case finished");
    }
}

/// A listener attached to an embedded engine for the lifetime of this guard.
///
/// Dereferences to the engine, so the engine can be driven while the listener is attached.
#[derive(Debug)]
pub struct AttachedListener<'e, E: EmbeddedEngine + ?Sized> {
    engine: &'e mut E,
    id: ListenerId,
}

impl<'e, E: EmbeddedEngine + ?Sized> AttachedListener<'e, E> {
    /// Appends `listener` to `engine`'s listener chain.
    pub fn attach(engine: &'e mut E, listener: impl EngineListener + 'static) -> Self {
        let id = engine.append_listener(Box::new(listener));
        trace!(%id, "attached result listener");
        Self { engine, id }
    }
}

impl<E: EmbeddedEngine + ?Sized> Deref for AttachedListener<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        &*self.engine
    }
}

impl<E: EmbeddedEngine + ?Sized> DerefMut for AttachedListener<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut *self.engine
    }
}

impl<E: EmbeddedEngine + ?Sized> Drop for AttachedListener<'_, E> {
    fn drop(&mut self) {
        if self.engine.remove_listener(self.id).is_none() {
            debug!(id = %self.id, "result listener was already detached");
        } else {
            trace!(id = %self.id, "detached result listener");
        }
    }
}

/// The engine's active filter, set for the lifetime of this guard.
///
/// The filter that was active before is restored on drop.
#[derive(Debug)]
pub struct ScopedFilter<'e, E: EmbeddedEngine + ?Sized> {
    engine: &'e mut E,
    previous: String,
}

impl<'e, E: EmbeddedEngine + ?Sized> ScopedFilter<'e, E> {
    /// Replaces `engine`'s active filter with `filter`.
    pub fn set(engine: &'e mut E, filter: &str) -> Self {
        let previous = engine.active_filter();
        engine.set_filter(filter);
        Self { engine, previous }
    }
}

impl<E: EmbeddedEngine + ?Sized> Deref for ScopedFilter<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        &*self.engine
    }
}

impl<E: EmbeddedEngine + ?Sized> DerefMut for ScopedFilter<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut *self.engine
    }
}

impl<E: EmbeddedEngine + ?Sized> Drop for ScopedFilter<'_, E> {
    fn drop(&mut self) {
        self.engine.set_filter(&self.previous);
    }
}
