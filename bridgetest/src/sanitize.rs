// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping embedded suite names to host-legal labels.

use std::borrow::Cow;

/// The character embedded engines use to separate the parts of parameterized and typed suite
/// names, e.g. `Foo/1` or `Instantiation/Suite`.
pub const SUITE_SEPARATOR: char = '/';

/// The replacement for [`SUITE_SEPARATOR`] in host-facing labels.
pub const SANITIZED_SEPARATOR: char = '_';

/// Converts an embedded suite name into a label the host can display.
///
/// Every [`SUITE_SEPARATOR`] is replaced by [`SANITIZED_SEPARATOR`]; nothing else changes. The
/// result is only ever used for display. Filter expressions always carry the original name.
///
/// Returns the input unchanged (and unallocated) if it contains no separators.
pub fn sanitize_suite_name(name: &str) -> Cow<'_, str> {
    if name.contains(SUITE_SEPARATOR) {
        Cow::Owned(name.replace(SUITE_SEPARATOR, &SANITIZED_SEPARATOR.to_string()))
    } else {
        Cow::Borrowed(name)
    }
}
