// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Run the cases of an embedded test engine as individual tests inside a host test runner.
//!
//! An embedded engine owns its own registry, filter syntax and listener chain. `bridgetest`
//! enumerates that registry once into a tree of *proxy tests*, one per executable case, and runs
//! each proxy in isolation by pointing the engine's filter at exactly that case. Assertion
//! failures observed while a proxy runs are translated into the host's failure vocabulary with
//! their original file and line.
//!
//! The basic flow is:
//!
//! 1. Implement [`EmbeddedEngine`](engine::EmbeddedEngine) for the engine (or use
//!    [`FakeEngine`](fake::FakeEngine) in tests).
//! 2. Build a [`Bridge`](bridge::Bridge), which enumerates the registry into a
//!    [`ProxyTree`](tree::ProxyTree).
//! 3. Run proxies against a [`HostReporter`](host::HostReporter), for example the
//!    [`JunitReporter`](reporter::JunitReporter), or hand the tree to
//!    [`libtest-mimic`](harness) so each case shows up as its own test.

pub mod bridge;
pub mod config;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod fake;
pub mod harness;
pub mod host;
pub mod listener;
pub mod proxy;
pub mod registry;
pub mod reporter;
pub mod sanitize;
pub mod tree;
