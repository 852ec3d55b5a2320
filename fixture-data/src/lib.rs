// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture data for bridgetest integration tests.

pub mod calc;
pub mod models;
