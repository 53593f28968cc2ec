//! Per-watcher options for the nginx generator.
//!
//! Watchers carry one option map per generator. This module types the map
//! addressed to this generator and applies the documented defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key under which watchers carry options for this generator.
pub const GENERATOR_NAME: &str = "nginx";

/// Proxying mode of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Proxied inside the `http` context.
    Http,
    /// Proxied inside the `stream` context.
    Tcp,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Http => f.write_str("http"),
            Mode::Tcp => f.write_str("tcp"),
        }
    }
}

/// A mode string this generator does not know how to render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("nginx generator does not understand {0} as a service mode")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Mode::Http),
            "tcp" => Ok(Mode::Tcp),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// Ordering of `server` lines inside an upstream block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamOrder {
    /// Descending key order.
    Desc,
    /// Fresh random permutation on every regeneration.
    Shuffle,
    /// Order in which backends were reported.
    NoShuffle,
    /// Ascending key order. Unrecognized values fall back to this.
    #[default]
    #[serde(other)]
    Asc,
}

/// Options a watcher provides to the nginx generator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// `http` or `tcp`; kept raw so unknown values surface at generation time.
    pub mode: String,
    /// Listen port. Without one only the upstream block is emitted.
    pub port: Option<u16>,
    /// Overrides the generator-wide listen address.
    pub listen_address: Option<String>,
    /// Appended to the `listen` directive.
    pub listen_options: Option<String>,
    /// Upstream block name; defaults to the watcher name.
    pub upstream_name: Option<String>,
    /// Extra directives inside the server block.
    pub server: Vec<String>,
    /// Extra directives inside the upstream block.
    pub upstream: Vec<String>,
    /// Appended to every backend `server` line.
    pub server_options: Option<String>,
    pub upstream_order: UpstreamOrder,
    pub disabled: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            mode: "http".to_string(),
            port: None,
            listen_address: None,
            listen_options: None,
            upstream_name: None,
            server: Vec::new(),
            upstream: Vec::new(),
            server_options: None,
            upstream_order: UpstreamOrder::Asc,
            disabled: false,
        }
    }
}

impl WatcherConfig {
    pub fn mode(&self) -> Result<Mode, UnknownMode> {
        self.mode.parse()
    }
}

/// Apply defaults to the raw options a watcher provides for this generator.
///
/// A missing or `null` map yields the defaults. Logs a warning when the
/// service has no port and is not disabled, since traffic then has to be
/// routed to its upstream by hand.
pub fn normalize_watcher_config(
    watcher_name: &str,
    raw: Option<&serde_json::Value>,
) -> Result<WatcherConfig, serde_json::Error> {
    let config = match raw {
        None | Some(serde_json::Value::Null) => WatcherConfig::default(),
        Some(value) => WatcherConfig::deserialize(value)?,
    };

    if config.port.is_none() && !config.disabled {
        tracing::warn!(
            service = %watcher_name,
            "nginx config does not include a port; only upstream sections for the service \
             will be created; you must move traffic there manually using server sections"
        );
    }

    Ok(config)
}
