//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single discovered backend server
//! - Derive the key used for de-duplication and ordering in upstream stanzas

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single backend server reported by a watcher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Backend {
    /// Host name or IP address.
    pub host: String,
    /// Port the backend listens on.
    pub port: u16,
    /// Optional instance name, prefixed to the key when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Backend {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            name: None,
        }
    }

    pub fn named(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            name: Some(name.into()),
        }
    }

    /// `name_host:port` when the backend carries a non-empty name, else `host:port`.
    pub fn key(&self) -> BackendKey {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => {
                BackendKey(format!("{}_{}:{}", name, self.host, self.port))
            }
            _ => BackendKey(format!("{}:{}", self.host, self.port)),
        }
    }

    /// Address as written into an upstream `server` line.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Identity of a backend within one upstream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackendKey(String);

impl BackendKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
