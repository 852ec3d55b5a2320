// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the bridge.
//!
//! The configuration is a default TOML document, layered with an optional user file. See
//! `default-config.toml` for the available settings.

use crate::errors::ConfigParseError;
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use serde::Deserialize;

/// Bridge configuration, loaded from TOML.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    workspace_root: Utf8PathBuf,
    inner: BridgeConfigImpl,
}

impl BridgeConfig {
    /// The default location of the config within the workspace root.
    pub const CONFIG_PATH: &'static str = ".config/bridgetest.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from the given file, or from the default location under
    /// `workspace_root` if `config_file` is `None`.
    ///
    /// A missing file at the default location is not an error; an explicitly provided file must
    /// exist.
    pub fn from_sources(
        workspace_root: impl Into<Utf8PathBuf>,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let workspace_root = workspace_root.into();
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = workspace_root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let inner = Self::build_and_deserialize(builder)
            .map_err(|err| ConfigParseError::new(config_file, err))?;
        Ok(Self {
            workspace_root,
            inner,
        })
    }

    /// Returns the default configuration, rooted at `workspace_root`.
    pub fn default_config(workspace_root: impl Into<Utf8PathBuf>) -> Self {
        let inner = Self::build_and_deserialize(Self::make_default_config())
            .expect("default config is always valid");
        Self {
            workspace_root: workspace_root.into(),
            inner,
        }
    }

    /// The workspace root that relative paths in this config are resolved against.
    pub fn workspace_root(&self) -> &Utf8Path {
        &self.workspace_root
    }

    /// The host-facing name of the root suite.
    pub fn root_suite(&self) -> &str {
        &self.inner.bridge.root_suite
    }

    /// The directory relative failure paths are resolved against, if configured.
    ///
    /// Relative values are joined onto the workspace root.
    pub fn source_root(&self) -> Option<Utf8PathBuf> {
        self.inner
            .bridge
            .source_root
            .as_deref()
            .map(|dir| self.workspace_root.join(dir))
    }

    /// Returns the JUnit configuration, if a report path is configured.
    pub fn junit(&self) -> Option<JunitConfig<'_>> {
        let junit = &self.inner.junit;
        junit.path.as_deref().map(|path| JunitConfig {
            path: self.workspace_root.join(path),
            report_name: &junit.report_name,
        })
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<BridgeConfigImpl, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

/// JUnit report settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JunitConfig<'cfg> {
    path: Utf8PathBuf,
    report_name: &'cfg str,
}

impl<'cfg> JunitConfig<'cfg> {
    /// Returns the absolute path to the JUnit report.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the name of the JUnit report.
    pub fn report_name(&self) -> &'cfg str {
        self.report_name
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct BridgeConfigImpl {
    bridge: BridgeImpl,
    junit: JunitImpl,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct BridgeImpl {
    root_suite: String,
    #[serde(default)]
    source_root: Option<Utf8PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct JunitImpl {
    #[serde(default)]
    path: Option<Utf8PathBuf>,
    report_name: String,
}
