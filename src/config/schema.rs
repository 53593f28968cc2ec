//! Configuration schema definitions.
//!
//! This module defines the generator's configuration structure.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root configuration for the nginx generator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Named contexts in declaration order. `main` and `events` are required.
    pub contexts: IndexMap<String, Vec<String>>,

    /// Write generated documents to `config_file_path`.
    pub do_writes: bool,

    /// Start and reload the proxy process after accepted writes.
    pub do_reloads: bool,

    /// Destination of the generated document.
    pub config_file_path: Option<PathBuf>,

    /// Syntax check run against the freshly written file (e.g. `nginx -t`).
    pub check_command: Option<String>,

    /// Applies a new configuration to the running proxy.
    pub reload_command: Option<String>,

    /// Starts the proxy; expected to fail harmlessly when already running.
    pub start_command: Option<String>,

    /// Minimum number of ticks between two reloads.
    pub restart_interval: u64,

    /// Jitter factor applied on top of `restart_interval`.
    pub restart_jitter: f64,

    /// Default bind address for server stanzas.
    pub listen_address: Option<String>,

    /// Logging settings for the binary.
    pub logging: LoggingConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            contexts: IndexMap::new(),
            do_writes: true,
            do_reloads: true,
            config_file_path: None,
            check_command: None,
            reload_command: None,
            start_command: None,
            restart_interval: 2,
            restart_jitter: 0.0,
            listen_address: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Directives of a context, empty when the context is not declared.
    pub fn context(&self, name: &str) -> &[String] {
        self.contexts.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
