//! Configuration for the ctlmgr panel.
//!
//! Layered with figment: built-in defaults, then the TOML file under the
//! platform config dir, then `CTLMGR_*` environment variables, then
//! command-line overrides. The result is translated into the
//! `ctlmgr_core::PanelConfig` and `ctlmgr_api::RosbridgeConfig` the
//! binary needs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ctlmgr_api::RosbridgeConfig;
use ctlmgr_core::{DEFAULT_NAMESPACE_PREFIX, PanelConfig};

/// ROS parameter consulted when no source sets a namespace prefix.
pub const PREFIX_PARAM: &str = "/rqt_plugins/parameters/prefix_name_space";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Everything the panel reads from files and environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Namespace in front of `/controller_manager/...`. Unset means
    /// "ask the parameter server, then fall back to the default".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_prefix: Option<String>,

    /// rosbridge_server WebSocket URL.
    #[serde(default = "default_rosbridge_url")]
    pub rosbridge_url: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace_prefix: None,
            rosbridge_url: default_rosbridge_url(),
            timeout: default_timeout(),
        }
    }
}

fn default_rosbridge_url() -> String {
    ctlmgr_api::transport::DEFAULT_ROSBRIDGE_URL.into()
}
fn default_timeout() -> u64 {
    30
}

/// Command-line values layered over every other source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rosbridge_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Config {
    /// Apply command-line values on top of this config, skipping figment.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(prefix) = &overrides.namespace_prefix {
            self.namespace_prefix = Some(prefix.clone());
        }
        if let Some(url) = &overrides.rosbridge_url {
            self.rosbridge_url.clone_from(url);
        }
        if let Some(timeout) = overrides.timeout {
            self.timeout = timeout;
        }
        self
    }

    /// Connection settings for the rosbridge client.
    pub fn rosbridge_config(&self) -> Result<RosbridgeConfig, ConfigError> {
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        RosbridgeConfig::new(&self.rosbridge_url, Duration::from_secs(self.timeout)).map_err(|e| {
            ConfigError::Validation {
                field: "rosbridge_url".into(),
                reason: e.to_string(),
            }
        })
    }

    /// Panel settings, given the value of [`PREFIX_PARAM`] if it was read.
    ///
    /// An explicitly configured prefix wins, then a non-empty parameter
    /// value, then [`DEFAULT_NAMESPACE_PREFIX`]. An explicit empty string
    /// is honored as-is.
    pub fn panel_config(&self, param_value: Option<&str>) -> PanelConfig {
        let prefix = self
            .namespace_prefix
            .as_deref()
            .or(param_value.filter(|p| !p.is_empty()))
            .unwrap_or(DEFAULT_NAMESPACE_PREFIX);
        PanelConfig::new(prefix)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "ctlmgr", "ctlmgr").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("ctlmgr");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

fn figment(path: &Path, overrides: &Overrides) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CTLMGR_"))
        .merge(Serialized::defaults(overrides))
}

/// Load from an explicit file path plus environment and overrides.
pub fn load_config_from(path: &Path, overrides: &Overrides) -> Result<Config, ConfigError> {
    let config: Config = figment(path, overrides).extract()?;
    Ok(config)
}

/// Load from the canonical config path plus environment and overrides.
pub fn load_config(overrides: &Overrides) -> Result<Config, ConfigError> {
    load_config_from(&config_path(), overrides)
}

/// Like [`load_config`], but an unreadable file or environment falls back
/// to the defaults with `overrides` applied. The error is handed back so
/// the caller can report it.
pub fn load_config_or_default(overrides: &Overrides) -> (Config, Option<ConfigError>) {
    match load_config(overrides) {
        Ok(config) => (config, None),
        Err(e) => (Config::default().with_overrides(overrides), Some(e)),
    }
}
