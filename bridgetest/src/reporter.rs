// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host reporters shipped with bridgetest.
//!
//! [`RecordingReporter`](crate::host::RecordingReporter) lives next to the host contract; this
//! module contains reporters that produce output.

mod junit;

pub use junit::JunitReporter;
