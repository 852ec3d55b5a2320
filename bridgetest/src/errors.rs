// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by bridgetest.

use camino::{FromPathBufError, Utf8PathBuf};
use config::ConfigError;
use std::{borrow::Cow, io};
use thiserror::Error;

/// An error reported by an embedded engine while it initialized from the argument vector.
#[derive(Clone, Debug, Error)]
#[error("embedded engine failed to initialize: {message}")]
pub struct EngineInitError {
    message: Cow<'static, str>,
}

impl EngineInitError {
    /// Creates a new `EngineInitError`.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the message reported by the engine.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An error that occurred while enumerating the embedded engine's registry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnumerateError {
    /// The engine could not be initialized with the given arguments.
    #[error("error initializing the embedded engine with {arg_count} arguments")]
    Init {
        /// The number of arguments forwarded to the engine.
        arg_count: usize,

        /// The underlying error.
        #[source]
        error: EngineInitError,
    },
}

/// An error that occurred while constructing a [`Bridge`](crate::bridge::Bridge).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BridgeError {
    /// The embedded registry could not be enumerated.
    #[error(transparent)]
    Enumerate(#[from] EnumerateError),

    /// The current directory could not be determined.
    #[error("error determining the current directory to resolve failure paths against")]
    CurrentDir(#[source] io::Error),

    /// The current directory is not valid UTF-8.
    #[error("current directory is not valid UTF-8")]
    NonUtf8CurrentDir(#[source] FromPathBufError),
}

/// An error that occurred while parsing the bridge config.
#[derive(Debug, Error)]
#[error("failed to parse bridgetest config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: Box<ConfigError>,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, err: ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err: Box::new(err),
        }
    }

    /// Returns the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }
}

/// An error that occurs while writing a host report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteReportError {
    /// An error occurred while operating on the file system.
    #[error("error operating on path {file}")]
    Fs {
        /// The file being operated on.
        file: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: io::Error,
    },

    /// An error occurred while producing JUnit XML.
    #[error("error writing JUnit output to {file}")]
    Junit {
        /// The output file.
        file: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: quick_junit::SerializeError,
    },
}

/// An error that occurred while running the `libtest-mimic` harness.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HarnessError {
    /// The config could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigParseError),

    /// The bridge could not be constructed.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// The JUnit report could not be written.
    #[error(transparent)]
    WriteReport(#[from] WriteReportError),
}
