//! Stanza builders.
//!
//! # Data Flow
//! ```text
//! WatcherView + generator defaults
//!     → server.rs   (server block with listen + proxy clause)
//!     → upstream.rs (upstream block with ordered backend lines)
//!     → Vec<String> fragments, one line per entry, tab indented
//! ```
//!
//! # Design Decisions
//! - Builders are pure apart from the random source used by `shuffle`
//! - An empty fragment means "emit nothing" (no port, no backends)
//! - Fragments are indented for their place inside `http {}` / `stream {}`

pub mod server;
pub mod upstream;

pub use server::{generate_proxy, generate_server, DEFAULT_LISTEN_ADDRESS};
pub use upstream::generate_upstream;
