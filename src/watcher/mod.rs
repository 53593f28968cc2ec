//! Watcher input subsystem.
//!
//! # Data Flow
//! ```text
//! service discovery (external)
//!     → watcher state file (JSON)
//!     → source.rs (parse, normalize nginx options)
//!     → Vec<WatcherView>
//!     → NginxGenerator::update_config / tick
//!
//! On state change:
//!     file_watcher.rs detects the write
//!     → source.rs reloads
//!     → new Vec<WatcherView> sent to the control loop
//! ```
//!
//! # Design Decisions
//! - Watchers are read-only views; discovery itself happens elsewhere
//! - Revisions are opaque: equality means "backend set unchanged"
//! - Options for other generators are ignored

pub mod backend;
pub mod file_watcher;
pub mod options;
pub mod source;

pub use backend::{Backend, BackendKey};
pub use options::{normalize_watcher_config, Mode, UnknownMode, UpstreamOrder, WatcherConfig};
pub use source::{load_watchers, parse_watchers, SourceError};

/// Read-only projection of one service watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherView {
    /// Unique service name.
    pub name: String,
    /// Bumped by discovery whenever the backend set changes.
    pub revision: u64,
    /// Backends in the order discovery reported them.
    pub backends: Vec<Backend>,
    /// Normalized options for this generator.
    pub config: WatcherConfig,
}

impl WatcherView {
    pub fn new(name: impl Into<String>, revision: u64, config: WatcherConfig) -> Self {
        Self {
            name: name.into(),
            revision,
            backends: Vec::new(),
            config,
        }
    }

    pub fn with_backends(mut self, backends: Vec<Backend>) -> Self {
        self.backends = backends;
        self
    }

    /// Name of the upstream block this service renders into.
    pub fn upstream_name(&self) -> &str {
        self.config.upstream_name.as_deref().unwrap_or(&self.name)
    }
}
