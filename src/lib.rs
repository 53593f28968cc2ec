//! nginx configuration generator driven by service discovery watchers.

pub mod config;
pub mod generator;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod stanza;
pub mod watcher;

pub use config::GeneratorConfig;
pub use generator::{GenerateError, NginxGenerator};
pub use watcher::{Backend, WatcherView};
