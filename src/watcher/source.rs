//! Watcher state loading from disk.
//!
//! The state file is a JSON array of watchers:
//!
//! ```json
//! [
//!   {
//!     "name": "web",
//!     "revision": 3,
//!     "backends": [{"host": "10.0.0.1", "port": 3000}],
//!     "generators": {"nginx": {"port": 8080}}
//!   }
//! ]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::watcher::backend::Backend;
use crate::watcher::options::{normalize_watcher_config, GENERATOR_NAME};
use crate::watcher::WatcherView;

/// Error type for watcher state loading.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid nginx options for service {service}: {source}")]
    Options {
        service: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct RawWatcher {
    name: String,
    #[serde(default)]
    revision: u64,
    #[serde(default)]
    backends: Vec<Backend>,
    #[serde(default)]
    generators: HashMap<String, serde_json::Value>,
}

/// Parse watcher state from JSON text.
pub fn parse_watchers(content: &str) -> Result<Vec<WatcherView>, SourceError> {
    let raw: Vec<RawWatcher> = serde_json::from_str(content)?;

    raw.into_iter()
        .map(|watcher| {
            let config =
                normalize_watcher_config(&watcher.name, watcher.generators.get(GENERATOR_NAME))
                    .map_err(|source| SourceError::Options {
                        service: watcher.name.clone(),
                        source,
                    })?;
            Ok(WatcherView {
                name: watcher.name,
                revision: watcher.revision,
                backends: watcher.backends,
                config,
            })
        })
        .collect()
}

/// Load watcher state from a JSON file.
pub fn load_watchers(path: &Path) -> Result<Vec<WatcherView>, SourceError> {
    let content = fs::read_to_string(path)?;
    parse_watchers(&content)
}
